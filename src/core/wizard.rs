use crate::domain::model::{ImportErrorKind, ImportResult, SubscriptionImportRecord};
use crate::domain::ports::{BillingDateCalculator, CurrencyCatalog};
use crate::core::pipeline::ImportPipeline;
use crate::utils::error::{PipelineError, Result};
use std::fmt;

pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Upload,
    Validate,
    Review,
    Complete,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Upload => "Upload",
            WizardStep::Validate => "Validate",
            WizardStep::Review => "Review",
            WizardStep::Complete => "Complete",
        };
        f.write_str(name)
    }
}

/// 只允許往前一步；重設另外處理
const TRANSITIONS: &[(WizardStep, WizardStep)] = &[
    (WizardStep::Upload, WizardStep::Validate),
    (WizardStep::Validate, WizardStep::Review),
    (WizardStep::Review, WizardStep::Complete),
];

impl WizardStep {
    pub fn can_transition_to(self, next: WizardStep) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    /// 進度條百分比
    pub fn progress(self) -> u8 {
        match self {
            WizardStep::Upload => 0,
            WizardStep::Validate => 25,
            WizardStep::Review => 75,
            WizardStep::Complete => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

/// 讀檔請求的憑證。精靈重設後舊憑證會失效，且每張憑證只能用一次。
#[derive(Debug, PartialEq, Eq)]
pub struct ReadTicket {
    generation: u64,
    pub file_name: String,
}

/// 匯入精靈：Upload → Validate → Review → Complete
#[derive(Debug)]
pub struct ImportWizard {
    step: WizardStep,
    file: Option<SelectedFile>,
    result: Option<ImportResult>,
    generation: u64,
    in_flight: bool,
    max_upload_bytes: u64,
}

impl Default for ImportWizard {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}

impl ImportWizard {
    pub fn new(max_upload_bytes: u64) -> Self {
        Self {
            step: WizardStep::Upload,
            file: None,
            result: None,
            generation: 0,
            in_flight: false,
            max_upload_bytes,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight
    }

    fn advance(&mut self, next: WizardStep) -> Result<()> {
        if !self.step.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.step.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!("Import wizard: {} → {}", self.step, next);
        self.step = next;
        Ok(())
    }

    /// Upload → Validate，需要選定檔案且不超過大小上限
    pub fn select_file(&mut self, name: impl Into<String>, size: u64) -> Result<()> {
        if !self.step.can_transition_to(WizardStep::Validate) {
            return Err(PipelineError::InvalidTransition {
                from: self.step.to_string(),
                to: WizardStep::Validate.to_string(),
            });
        }
        if size > self.max_upload_bytes {
            return Err(PipelineError::FileTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        self.file = Some(SelectedFile {
            name: name.into(),
            size,
        });
        self.advance(WizardStep::Validate)
    }

    /// 開始讀檔。同一時間只允許一個讀取在進行。
    pub fn begin_validation(&mut self) -> Result<ReadTicket> {
        if self.step != WizardStep::Validate || self.in_flight {
            return Err(PipelineError::InvalidTransition {
                from: self.step.to_string(),
                to: WizardStep::Review.to_string(),
            });
        }
        let file_name = self
            .file
            .as_ref()
            .map(|file| file.name.clone())
            .ok_or_else(|| PipelineError::InvalidTransition {
                from: self.step.to_string(),
                to: WizardStep::Review.to_string(),
            })?;

        self.in_flight = true;
        Ok(ReadTicket {
            generation: self.generation,
            file_name,
        })
    }

    /// 套用讀檔結果並進入 Review。憑證過期，或精靈已不在等待讀檔時，
    /// 丟棄結果並回傳 false，不改動任何狀態。
    pub fn finish_validation<C, D>(
        &mut self,
        ticket: ReadTicket,
        outcome: std::result::Result<Vec<u8>, PipelineError>,
        pipeline: &ImportPipeline<C, D>,
    ) -> Result<bool>
    where
        C: CurrencyCatalog,
        D: BillingDateCalculator,
    {
        if ticket.generation != self.generation
            || self.step != WizardStep::Validate
            || !self.in_flight
        {
            tracing::debug!("Discarding stale read result for '{}'", ticket.file_name);
            return Ok(false);
        }

        let result = match outcome {
            Ok(bytes) => pipeline.run_bytes(&ticket.file_name, &bytes),
            Err(e) => {
                tracing::error!("❌ Failed to read '{}': {}", ticket.file_name, e);
                ImportResult::failed(ImportErrorKind::ReadError {
                    message: e.to_string(),
                })
            }
        };

        self.in_flight = false;
        self.result = Some(result);
        self.advance(WizardStep::Review)?;
        Ok(true)
    }

    /// Review → Complete。只要有錯誤或沒有任何有效資料就不能送出。
    pub fn confirm(&mut self) -> Result<Vec<SubscriptionImportRecord>> {
        if self.step != WizardStep::Review {
            return Err(PipelineError::InvalidTransition {
                from: self.step.to_string(),
                to: WizardStep::Complete.to_string(),
            });
        }
        let result = self.result.as_ref().ok_or_else(|| PipelineError::CommitBlocked {
            reason: "no validation result".to_string(),
        })?;
        ensure_committable(result)?;

        let records = result.records.clone();
        self.advance(WizardStep::Complete)?;
        Ok(records)
    }

    /// 關閉或重設：回到 Upload 並清除所有暫存狀態
    pub fn reset(&mut self) {
        self.generation += 1;
        self.step = WizardStep::Upload;
        self.file = None;
        self.result = None;
        self.in_flight = false;
    }
}

pub(crate) fn ensure_committable(result: &ImportResult) -> Result<()> {
    if result.has_errors() {
        return Err(PipelineError::CommitBlocked {
            reason: format!("{} rows have errors", result.errors.len()),
        });
    }
    if result.records.is_empty() {
        return Err(PipelineError::CommitBlocked {
            reason: "no valid subscriptions to import".to_string(),
        });
    }
    Ok(())
}
