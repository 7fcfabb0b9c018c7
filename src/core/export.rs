use crate::core::validator::{
    FIELD_AMOUNT, FIELD_BILLING_CYCLE, FIELD_CATEGORY, FIELD_CURRENCY, FIELD_NAME,
    FIELD_NEXT_BILLING_DATE, FIELD_NOTES, FIELD_PAYMENT_METHOD, FIELD_START_DATE, FIELD_STATUS,
    FIELD_WEBSITE,
};
use crate::domain::model::SubscriptionImportRecord;
use crate::utils::error::{PipelineError, Result};

pub const CSV_HEADER: [&str; 11] = [
    FIELD_NAME,
    FIELD_AMOUNT,
    FIELD_CURRENCY,
    FIELD_BILLING_CYCLE,
    FIELD_NEXT_BILLING_DATE,
    FIELD_STATUS,
    FIELD_START_DATE,
    FIELD_CATEGORY,
    FIELD_PAYMENT_METHOD,
    FIELD_WEBSITE,
    FIELD_NOTES,
];

/// 匯出成可再次匯入的 CSV
pub fn export_csv(records: &[SubscriptionImportRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let start_date = record
            .start_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        writer.write_record([
            record.name.as_str(),
            &record.amount.to_string(),
            record.currency.as_str(),
            record.billing_cycle.as_str(),
            &record.next_billing_date.format("%Y-%m-%d").to_string(),
            record.status.as_str(),
            &start_date,
            record.category.as_deref().unwrap_or_default(),
            record.payment_method.as_deref().unwrap_or_default(),
            record.website.as_deref().unwrap_or_default(),
            record.notes.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| PipelineError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::ConfigValidationError {
        field: "export".to_string(),
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

pub fn export_json(records: &[SubscriptionImportRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
