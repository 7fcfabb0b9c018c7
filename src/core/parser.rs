use crate::core::decoder::DecodedFile;
use crate::domain::model::{json_type_name, FileFormat, ImportError, ImportErrorKind, RawRecord};
use std::collections::HashMap;

/// 解析結果：依輸入順序的原始資料，加上 CSV 形狀不符的列錯誤
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<RawRecord>,
    pub errors: Vec<ImportError>,
}

pub struct RecordParser;

impl RecordParser {
    pub fn parse(file: &DecodedFile<'_>) -> Result<ParsedRecords, ImportErrorKind> {
        match file.format {
            FileFormat::Csv => Self::parse_csv(file.content),
            FileFormat::Json => Self::parse_json(file.content),
        }
    }

    /// 第一個非空行為標題列，之後每一列依標題轉成 RawRecord。
    /// 欄位數與標題不符的列只記錄錯誤並略過。
    pub fn parse_csv(content: &str) -> Result<ParsedRecords, ImportErrorKind> {
        let mut parsed = ParsedRecords::default();
        let content = content.trim_start_matches(['\r', '\n', ' ', '\t']);
        if content.trim().is_empty() {
            return Ok(parsed);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ImportErrorKind::ReadError {
                message: format!("unable to read CSV header: {}", e),
            })?
            .iter()
            .map(str::to_string)
            .collect();
        tracing::debug!("CSV headers: {:?}", headers);

        let mut index = 0;
        for row in reader.records() {
            let row = row.map_err(|e| ImportErrorKind::ReadError {
                message: format!("unable to read CSV row: {}", e),
            })?;

            // 空白列
            if row.len() == 1 && row.get(0).is_some_and(str::is_empty) {
                continue;
            }

            if row.len() != headers.len() {
                tracing::warn!(
                    "⚠️ CSV row {} has {} fields, header has {}",
                    index + 1,
                    row.len(),
                    headers.len()
                );
                parsed.errors.push(ImportError::at(
                    index,
                    ImportErrorKind::RowShapeMismatch {
                        expected: headers.len(),
                        found: row.len(),
                    },
                ));
                index += 1;
                continue;
            }

            let data: HashMap<String, serde_json::Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(key, value)| (key.clone(), serde_json::Value::String(value.to_string())))
                .collect();
            parsed.records.push(RawRecord::new(index, data));
            index += 1;
        }

        Ok(parsed)
    }

    /// 必須是物件陣列；任何其他結構都讓整批失敗
    pub fn parse_json(content: &str) -> Result<ParsedRecords, ImportErrorKind> {
        let mut parsed = ParsedRecords::default();
        if content.trim().is_empty() {
            return Ok(parsed);
        }

        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ImportErrorKind::MalformedJson {
                message: e.to_string(),
            })?;

        let serde_json::Value::Array(items) = value else {
            return Err(ImportErrorKind::MalformedJson {
                message: "expected a top-level array of subscription objects".to_string(),
            });
        };

        for (index, item) in items.into_iter().enumerate() {
            match item {
                serde_json::Value::Object(obj) => {
                    parsed.records.push(RawRecord::new(index, obj.into_iter().collect()));
                }
                other => {
                    return Err(ImportErrorKind::MalformedJson {
                        message: format!(
                            "element {} is not an object (found {})",
                            index,
                            json_type_name(&other)
                        ),
                    });
                }
            }
        }

        Ok(parsed)
    }
}
