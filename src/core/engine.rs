use crate::core::decoder::FileDecoder;
use crate::core::pipeline::ImportPipeline;
use crate::core::wizard::{ensure_committable, ImportWizard};
use crate::domain::model::{ImportErrorKind, ImportResult, SubscriptionImportRecord};
use crate::domain::ports::{BillingDateCalculator, CurrencyCatalog, Storage, SubscriptionSink};
use crate::utils::error::Result;
use std::path::Path;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub submitted: usize,
    pub inserted: usize,
}

/// 讀檔 → 驗證 → (確認後) 批次寫入
pub struct ImportEngine<S: Storage, K: SubscriptionSink, C: CurrencyCatalog, D: BillingDateCalculator> {
    storage: S,
    sink: K,
    pipeline: ImportPipeline<C, D>,
}

impl<S, K, C, D> ImportEngine<S, K, C, D>
where
    S: Storage,
    K: SubscriptionSink,
    C: CurrencyCatalog,
    D: BillingDateCalculator,
{
    pub fn new(storage: S, sink: K, pipeline: ImportPipeline<C, D>) -> Self {
        Self {
            storage,
            sink,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &ImportPipeline<C, D> {
        &self.pipeline
    }

    /// 讀檔失敗會變成結果中唯一的 ReadError
    pub async fn read_and_run(&self, path: &str) -> ImportResult {
        let file_name = file_name_of(path);
        if let Err(kind) = FileDecoder::detect(&file_name) {
            tracing::error!("❌ {}", kind);
            return ImportResult::failed(kind);
        }

        tracing::info!("📁 Reading '{}'", path);
        match self.storage.read_file(path).await {
            Ok(bytes) => self.pipeline.run_bytes(&file_name, &bytes),
            Err(e) => {
                tracing::error!("❌ Failed to read '{}': {}", path, e);
                ImportResult::failed(ImportErrorKind::ReadError {
                    message: e.to_string(),
                })
            }
        }
    }

    /// 讀檔期間不持有鎖；精靈若在讀取中被重設，結果會被丟棄
    pub async fn validate_in_wizard(&self, wizard: &Mutex<ImportWizard>, path: &str) -> Result<bool> {
        let ticket = wizard.lock().await.begin_validation()?;
        let outcome = self.storage.read_file(path).await;
        wizard
            .lock()
            .await
            .finish_validation(ticket, outcome, &self.pipeline)
    }

    pub async fn commit(&self, result: &ImportResult) -> Result<CommitSummary> {
        ensure_committable(result)?;
        self.commit_records(&result.records).await
    }

    pub async fn commit_records(&self, records: &[SubscriptionImportRecord]) -> Result<CommitSummary> {
        tracing::info!("💾 Submitting {} subscriptions", records.len());
        let inserted = self.sink.bulk_add(records).await?;
        tracing::info!("✅ {} subscriptions imported", inserted);
        Ok(CommitSummary {
            submitted: records.len(),
            inserted,
        })
    }
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
