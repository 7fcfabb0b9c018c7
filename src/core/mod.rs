pub mod billing;
pub mod currency;
pub mod decoder;
pub mod engine;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod validator;
pub mod wizard;

pub use crate::domain::model::{ImportError, ImportErrorKind, ImportResult, RawRecord};
pub use crate::domain::ports::{BillingDateCalculator, CurrencyCatalog, Storage, SubscriptionSink};
pub use crate::utils::error::Result;
