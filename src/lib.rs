pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ImportConfig;

pub use adapters::{HttpSubscriptionSink, LocalStorage};
pub use core::{
    billing::CalendarBillingCalculator, currency::CurrencyAllowList, engine::ImportEngine,
    pipeline::ImportPipeline, wizard::ImportWizard,
};
pub use domain::model::{
    BillingCycle, ImportError, ImportErrorKind, ImportResult, SubscriptionImportRecord,
    SubscriptionStatus,
};
pub use utils::error::{PipelineError, Result};
