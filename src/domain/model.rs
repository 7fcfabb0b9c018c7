use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// 匯入檔案格式，由副檔名判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

/// 尚未驗證的單筆資料 (CSV 一列或 JSON 陣列中的一個物件)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub index: usize,
    pub data: HashMap<String, serde_json::Value>,
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl RawRecord {
    pub fn new(index: usize, data: HashMap<String, serde_json::Value>) -> Self {
        Self { index, data }
    }

    /// 取得欄位的文字值，空字串與 null 視為不存在。
    /// 只接受字串與數字，布林、陣列、物件回傳 InvalidType。
    pub fn text(&self, field: &str) -> Result<Option<String>, ImportErrorKind> {
        let value = match self.data.get(field) {
            None | Some(serde_json::Value::Null) => return Ok(None),
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(ImportErrorKind::InvalidType {
                    field: field.to_string(),
                    found: json_type_name(other).to_string(),
                })
            }
        };

        Ok(if value.is_empty() { None } else { Some(value) })
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        match self.data.get(field) {
            Some(serde_json::Value::Null) | None => None,
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
            Some(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 3] = [
        BillingCycle::Monthly,
        BillingCycle::Yearly,
        BillingCycle::Quarterly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Yearly => 12,
        }
    }

    /// 不分大小寫比對
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|cycle| cycle.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trial,
    Cancelled,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 3] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trial,
        SubscriptionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通過驗證、可直接寫入後端的訂閱資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionImportRecord {
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: NaiveDate,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// 匯入錯誤種類。前三種為整批致命錯誤，其餘只影響單筆資料。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportErrorKind {
    #[error("Unsupported file format '{extension}'. Please upload a CSV or JSON file")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read file: {message}")]
    ReadError { message: String },

    #[error("Malformed JSON: {message}")]
    MalformedJson { message: String },

    #[error("expected {expected} fields but found {found}")]
    RowShapeMismatch { expected: usize, found: usize },

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' must be text or a number, found {found}")]
    InvalidType { field: String, found: String },

    #[error("invalid amount '{value}', expected a non-negative number")]
    InvalidAmount { value: String },

    #[error("invalid currency '{value}'")]
    InvalidCurrency { value: String },

    #[error("invalid billing cycle '{value}', expected monthly, yearly or quarterly")]
    InvalidBillingCycle { value: String },

    #[error("invalid date '{value}' in field '{field}'")]
    InvalidDate { field: String, value: String },

    #[error("invalid status '{value}', expected active, trial or cancelled")]
    InvalidStatus { value: String },
}

impl ImportErrorKind {
    pub fn missing(field: &str) -> Self {
        ImportErrorKind::MissingField {
            field: field.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportErrorKind::UnsupportedFormat { .. }
                | ImportErrorKind::ReadError { .. }
                | ImportErrorKind::MalformedJson { .. }
        )
    }
}

/// 綁定到輸入位置的錯誤訊息。整批錯誤沒有位置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub index: Option<usize>,
    #[serde(flatten)]
    pub kind: ImportErrorKind,
}

impl ImportError {
    pub fn at(index: usize, kind: ImportErrorKind) -> Self {
        Self {
            index: Some(index),
            kind,
        }
    }

    pub fn fatal(kind: ImportErrorKind) -> Self {
        Self { index: None, kind }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "Row {}: {}", index + 1, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// 單次匯入的最終結果：依輸入順序排列的有效資料與錯誤清單
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub records: Vec<SubscriptionImportRecord>,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    pub fn failed(kind: ImportErrorKind) -> Self {
        Self {
            records: Vec::new(),
            errors: vec![ImportError::fatal(kind)],
        }
    }

    pub fn valid_count(&self) -> usize {
        self.records.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(ImportError::is_fatal)
    }

    /// 全有或全無：只要有任何錯誤就不能送出
    pub fn can_commit(&self) -> bool {
        !self.records.is_empty() && self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}
