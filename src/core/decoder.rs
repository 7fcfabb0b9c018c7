use crate::domain::model::{FileFormat, ImportErrorKind};
use std::path::Path;

/// 已分類格式、已解碼成文字的檔案內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile<'a> {
    pub format: FileFormat,
    pub content: &'a str,
}

pub struct FileDecoder;

impl FileDecoder {
    /// 依副檔名判斷格式 (不分大小寫)
    pub fn detect(file_name: &str) -> Result<FileFormat, ImportErrorKind> {
        // 以結尾比對，".csv" 這類只有副檔名的檔名也能辨識
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            return Ok(FileFormat::Csv);
        }
        if lower.ends_with(".json") {
            return Ok(FileFormat::Json);
        }

        let extension = Path::new(&lower)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();
        Err(ImportErrorKind::UnsupportedFormat { extension })
    }

    pub fn decode<'a>(file_name: &str, content: &'a str) -> Result<DecodedFile<'a>, ImportErrorKind> {
        let format = Self::detect(file_name)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        tracing::debug!("Decoded '{}' as {} ({} bytes)", file_name, format, content.len());
        Ok(DecodedFile { format, content })
    }

    /// 原始位元組轉為 UTF-8 文字，失敗視為讀檔錯誤
    pub fn decode_bytes(bytes: &[u8]) -> Result<&str, ImportErrorKind> {
        std::str::from_utf8(bytes).map_err(|e| ImportErrorKind::ReadError {
            message: format!("file is not valid UTF-8: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_by_extension() {
        assert_eq!(FileDecoder::detect("subs.csv"), Ok(FileFormat::Csv));
        assert_eq!(FileDecoder::detect("export/subs.JSON"), Ok(FileFormat::Json));
        assert_eq!(
            FileDecoder::detect("data.txt"),
            Err(ImportErrorKind::UnsupportedFormat {
                extension: "txt".to_string()
            })
        );
        assert!(FileDecoder::detect("no_extension").is_err());
    }

    #[test]
    fn test_detect_bare_extension_names() {
        assert_eq!(FileDecoder::detect(".csv"), Ok(FileFormat::Csv));
        assert_eq!(FileDecoder::detect(".JSON"), Ok(FileFormat::Json));
        assert_eq!(FileDecoder::detect("Export.JSON"), Ok(FileFormat::Json));
        assert_eq!(
            FileDecoder::detect(".txt"),
            Err(ImportErrorKind::UnsupportedFormat {
                extension: String::new()
            })
        );
    }

    #[test]
    fn test_decode_strips_byte_order_mark() {
        let decoded = FileDecoder::decode("a.csv", "\u{feff}name,amount").unwrap();
        assert_eq!(decoded.content, "name,amount");
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        assert_eq!(FileDecoder::decode_bytes(b"name"), Ok("name"));
        assert!(matches!(
            FileDecoder::decode_bytes(&[0xff, 0xfe, 0x00]),
            Err(ImportErrorKind::ReadError { .. })
        ));
    }
}
