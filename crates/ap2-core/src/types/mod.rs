//! Protocol data model.

pub mod contact;
pub mod mandate;
pub mod payment_method;
pub mod payment_request;

pub use contact::ContactAddress;
pub use mandate::{
    CartContents, CartMandate, CredentialToken, IntentMandate, PaymentMandate,
    PaymentMandateContents,
};
pub use payment_method::{CardNetwork, PaymentMethod, PaymentMethodType};
pub use payment_request::{
    PaymentCurrencyAmount, PaymentDetailsInit, PaymentItem, PaymentMethodData, PaymentOptions,
    PaymentRequest, PaymentResponse, PaymentShippingOption,
};
