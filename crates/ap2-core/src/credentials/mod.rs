//! Credentials provider state: accounts, eligibility, tokens.

pub mod accounts;
pub mod matching;
pub mod tokens;

pub use accounts::{Account, AccountStore};
pub use matching::{eligible, is_eligible};
pub use tokens::{BindOutcome, TokenRecord, TokenStore};
