use crate::domain::model::{
    BillingCycle, ImportError, ImportErrorKind, RawRecord, SubscriptionImportRecord,
    SubscriptionStatus,
};
use crate::domain::ports::{BillingDateCalculator, CurrencyCatalog};
use chrono::{DateTime, NaiveDate};

pub const FIELD_NAME: &str = "name";
pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_CURRENCY: &str = "currency";
pub const FIELD_BILLING_CYCLE: &str = "billingCycle";
pub const FIELD_NEXT_BILLING_DATE: &str = "nextBillingDate";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_START_DATE: &str = "startDate";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_PAYMENT_METHOD: &str = "paymentMethod";
pub const FIELD_WEBSITE: &str = "website";
pub const FIELD_NOTES: &str = "notes";

/// 逐筆驗證。每筆資料在第一個致命欄位錯誤時即被拒絕，
/// 檢查順序固定為 name → amount → currency → billingCycle → 日期 → status。
pub struct RecordValidator<C: CurrencyCatalog, D: BillingDateCalculator> {
    currencies: C,
    dates: D,
}

impl<C: CurrencyCatalog, D: BillingDateCalculator> RecordValidator<C, D> {
    pub fn new(currencies: C, dates: D) -> Self {
        Self { currencies, dates }
    }

    pub fn validate(&self, raw: &RawRecord) -> Result<SubscriptionImportRecord, ImportError> {
        self.validate_fields(raw)
            .map_err(|kind| ImportError::at(raw.index, kind))
    }

    fn validate_fields(&self, raw: &RawRecord) -> Result<SubscriptionImportRecord, ImportErrorKind> {
        let name = raw
            .text(FIELD_NAME)?
            .ok_or_else(|| ImportErrorKind::missing(FIELD_NAME))?;
        let amount = parse_amount(raw)?;
        let currency = self.parse_currency(raw)?;
        let billing_cycle = parse_billing_cycle(raw)?;
        let start_date = optional_date(raw, FIELD_START_DATE)?;
        let next_billing_date = match optional_date(raw, FIELD_NEXT_BILLING_DATE)? {
            Some(date) => date,
            None => {
                let start = start_date.ok_or_else(|| ImportErrorKind::missing(FIELD_NEXT_BILLING_DATE))?;
                let derived = self.dates.next_billing_date(start, billing_cycle);
                tracing::debug!(
                    "Row {}: derived nextBillingDate {} from startDate {}",
                    raw.index + 1,
                    derived,
                    start
                );
                derived
            }
        };
        let status = match raw.text(FIELD_STATUS)? {
            None => SubscriptionStatus::default(),
            Some(value) => SubscriptionStatus::parse(&value)
                .ok_or(ImportErrorKind::InvalidStatus { value })?,
        };

        Ok(SubscriptionImportRecord {
            name,
            amount,
            currency,
            billing_cycle,
            next_billing_date,
            status,
            start_date,
            category: raw.text(FIELD_CATEGORY)?,
            payment_method: raw.text(FIELD_PAYMENT_METHOD)?,
            website: raw.text(FIELD_WEBSITE)?,
            notes: raw.text(FIELD_NOTES)?,
        })
    }

    fn parse_currency(&self, raw: &RawRecord) -> Result<String, ImportErrorKind> {
        let value = raw
            .text(FIELD_CURRENCY)?
            .ok_or_else(|| ImportErrorKind::missing(FIELD_CURRENCY))?;
        let code = value.to_ascii_uppercase();

        if code.len() == 3 && self.currencies.is_valid_currency(&code) {
            Ok(code)
        } else {
            Err(ImportErrorKind::InvalidCurrency { value })
        }
    }
}

fn parse_amount(raw: &RawRecord) -> Result<f64, ImportErrorKind> {
    let value = raw
        .get(FIELD_AMOUNT)
        .ok_or_else(|| ImportErrorKind::missing(FIELD_AMOUNT))?;

    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(ImportErrorKind::InvalidAmount {
            value: match value {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            },
        }),
    }
}

fn parse_billing_cycle(raw: &RawRecord) -> Result<BillingCycle, ImportErrorKind> {
    let value = raw
        .text(FIELD_BILLING_CYCLE)?
        .ok_or_else(|| ImportErrorKind::missing(FIELD_BILLING_CYCLE))?;
    BillingCycle::parse(&value).ok_or(ImportErrorKind::InvalidBillingCycle { value })
}

fn optional_date(raw: &RawRecord, field: &str) -> Result<Option<NaiveDate>, ImportErrorKind> {
    raw.text(field)?
        .map(|value| {
            parse_date(&value).ok_or_else(|| ImportErrorKind::InvalidDate {
                field: field.to_string(),
                value,
            })
        })
        .transpose()
}

/// 接受 YYYY-MM-DD 或 RFC 3339 時間戳 (只取日期部分)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}
