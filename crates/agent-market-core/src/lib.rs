pub mod catalog;
pub mod checkout;
pub mod compare;
pub mod config;
pub mod error;
pub mod estimate;
pub mod filter;
pub mod money;
pub mod pricing;
pub mod seed;
pub mod selection;
pub mod store;
pub mod templates;

#[cfg(feature = "network")]
pub mod api;
#[cfg(feature = "network")]
pub mod identity;
#[cfg(feature = "network")]
pub mod paths;
#[cfg(feature = "network")]
pub mod payment;

pub use catalog::{AgentRecord, Performance};
pub use error::MarketError;
pub use filter::{FilterCriteria, PriceTier};
pub use money::Money;
pub use pricing::{BillingModel, PricingDescriptor};
pub use selection::SelectionSet;
