//! Merchant state: catalog, carts, caller allowlist.

pub mod allowlist;
pub mod carts;
pub mod catalog;

pub use allowlist::TrustedAgents;
pub use carts::CartStore;
pub use catalog::{Catalog, CatalogItem, ACCEPTED_CARD_NETWORKS};
