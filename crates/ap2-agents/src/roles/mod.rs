//! Agent roles.

pub mod credentials_provider;
pub mod merchant;
pub mod payment_processor;

pub use credentials_provider::{CredentialsProviderExecutor, CREDENTIALS_PROVIDER_NAME};
pub use merchant::{MerchantExecutor, MERCHANT_NAME};
pub use payment_processor::{PaymentProcessorExecutor, PAYMENT_PROCESSOR_NAME};
