use crate::core::decoder::FileDecoder;
use crate::core::parser::RecordParser;
use crate::core::validator::RecordValidator;
use crate::domain::model::{ImportErrorKind, ImportResult};
use crate::domain::ports::{BillingDateCalculator, CurrencyCatalog};

/// Decoder → Parser → Validator。
/// 不保留任何跨次執行的狀態，也不做網路或儲存操作。
pub struct ImportPipeline<C: CurrencyCatalog, D: BillingDateCalculator> {
    validator: RecordValidator<C, D>,
}

impl<C: CurrencyCatalog, D: BillingDateCalculator> ImportPipeline<C, D> {
    pub fn new(currencies: C, dates: D) -> Self {
        Self {
            validator: RecordValidator::new(currencies, dates),
        }
    }

    /// 致命錯誤會被收進結果中，成為唯一的一筆錯誤
    pub fn run(&self, file_name: &str, content: &str) -> ImportResult {
        self.try_run(file_name, content).unwrap_or_else(|kind| {
            tracing::error!("❌ Import of '{}' aborted: {}", file_name, kind);
            ImportResult::failed(kind)
        })
    }

    pub fn run_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult {
        // 格式不支援時不去碰內容
        if let Err(kind) = FileDecoder::detect(file_name) {
            return ImportResult::failed(kind);
        }
        match FileDecoder::decode_bytes(bytes) {
            Ok(content) => self.run(file_name, content),
            Err(kind) => ImportResult::failed(kind),
        }
    }

    pub fn try_run(&self, file_name: &str, content: &str) -> Result<ImportResult, ImportErrorKind> {
        tracing::info!("🚀 Starting import of '{}'", file_name);

        let decoded = FileDecoder::decode(file_name, content)?;
        let parsed = RecordParser::parse(&decoded)?;
        tracing::info!(
            "📊 Parsed {} {} records ({} malformed rows)",
            parsed.records.len(),
            decoded.format,
            parsed.errors.len()
        );

        let mut result = ImportResult {
            records: Vec::with_capacity(parsed.records.len()),
            errors: Vec::new(),
        };

        // 依列號合併形狀錯誤與驗證錯誤，維持輸入順序
        let mut shape_errors = parsed.errors.into_iter().peekable();
        for raw in &parsed.records {
            while let Some(error) = shape_errors.next_if(|e| e.index < Some(raw.index)) {
                result.errors.push(error);
            }

            match self.validator.validate(raw) {
                Ok(record) => result.records.push(record),
                Err(error) => {
                    tracing::warn!("⚠️ {}", error);
                    result.errors.push(error);
                }
            }
        }
        result.errors.extend(shape_errors);

        tracing::info!(
            "✅ Import validation complete: {} valid, {} errors",
            result.valid_count(),
            result.errors.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::billing::CalendarBillingCalculator;
    use crate::core::currency::CurrencyAllowList;
    use crate::domain::model::{BillingCycle, ImportError, SubscriptionStatus};
    use chrono::NaiveDate;

    fn pipeline() -> ImportPipeline<CurrencyAllowList, CalendarBillingCalculator> {
        ImportPipeline::new(
            CurrencyAllowList::default(),
            CalendarBillingCalculator::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
        )
    }

    #[test]
    fn test_single_csv_row() {
        let content = "name,amount,currency,billingCycle,nextBillingDate,status\nNetflix,15.99,USD,monthly,2024-06-01,active";
        let result = pipeline().run("subs.csv", content);

        assert!(result.errors.is_empty());
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.name, "Netflix");
        assert_eq!(record.amount, 15.99);
        assert_eq!(record.currency, "USD");
        assert_eq!(record.billing_cycle, BillingCycle::Monthly);
        assert_eq!(record.next_billing_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(record.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_errors_are_ordered_by_row() {
        let content = "name,amount,currency,billingCycle,nextBillingDate\n\
                       ,1,USD,monthly,2024-06-01\n\
                       B,2,USD\n\
                       C,x,USD,monthly,2024-06-01\n\
                       D,4,USD,monthly,2024-06-01\n\
                       E,5\n";
        let result = pipeline().run("subs.csv", content);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "D");
        let indexes: Vec<_> = result.errors.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![Some(0), Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn test_unsupported_format_does_not_read_content() {
        let result = pipeline().run_bytes("data.txt", &[0xff, 0x00]);
        assert!(result.records.is_empty());
        assert_eq!(
            result.errors,
            vec![ImportError::fatal(ImportErrorKind::UnsupportedFormat {
                extension: "txt".to_string()
            })]
        );
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let result = pipeline().run_bytes("data.csv", &[0xff, 0xfe, 0xfd]);
        assert!(result.is_fatal());
        assert!(matches!(result.errors[0].kind, ImportErrorKind::ReadError { .. }));
    }
}
