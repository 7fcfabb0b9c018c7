use crate::domain::model::{BillingCycle, SubscriptionImportRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// 幣別白名單查詢
pub trait CurrencyCatalog: Send + Sync {
    fn is_valid_currency(&self, code: &str) -> bool;
}

/// 由開始日期與週期推算下次扣款日
pub trait BillingDateCalculator: Send + Sync {
    fn next_billing_date(&self, start: NaiveDate, cycle: BillingCycle) -> NaiveDate;
}

/// 批次寫入訂閱資料，回傳實際寫入筆數
#[async_trait]
pub trait SubscriptionSink: Send + Sync {
    async fn bulk_add(&self, records: &[SubscriptionImportRecord]) -> Result<usize>;
}

pub trait ConfigProvider: Send + Sync {
    fn max_file_size_bytes(&self) -> u64;
    fn api_endpoint(&self) -> Option<&str>;
}
