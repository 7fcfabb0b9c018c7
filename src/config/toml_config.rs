use crate::core::currency::CurrencyAllowList;
use crate::core::wizard::MAX_UPLOAD_BYTES;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{
    validate_currency_code, validate_non_empty_string, validate_positive_number, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub import: ImportSettings,
    pub currencies: Option<CurrencySettings>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub max_file_size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencySettings {
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ImportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUBSCRIPTION_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PipelineError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.import.max_file_size_bytes.unwrap_or(MAX_UPLOAD_BYTES)
    }

    pub fn currency_allow_list(&self) -> CurrencyAllowList {
        match &self.currencies {
            Some(settings) => CurrencyAllowList::new(&settings.allowed),
            None => CurrencyAllowList::default(),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.api.as_ref().and_then(|api| api.api_key.clone())
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.api.as_ref().and_then(|api| api.timeout_seconds)
    }

    /// 命令列覆蓋 API 端點與金鑰
    pub fn override_api(&mut self, endpoint: Option<String>, api_key: Option<String>) {
        if let Some(endpoint) = endpoint {
            match &mut self.api {
                Some(api) => api.endpoint = endpoint,
                None => {
                    self.api = Some(ApiConfig {
                        endpoint,
                        api_key: None,
                        timeout_seconds: None,
                    })
                }
            }
        }
        if let (Some(api), Some(key)) = (&mut self.api, api_key) {
            api.api_key = Some(key);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_number("import.max_file_size_bytes", self.max_file_size_bytes(), 1)?;

        if let Some(settings) = &self.currencies {
            if settings.allowed.is_empty() {
                return Err(PipelineError::InvalidConfigValueError {
                    field: "currencies.allowed".to_string(),
                    value: "[]".to_string(),
                    reason: "At least one currency must be allowed".to_string(),
                });
            }
            for code in &settings.allowed {
                validate_currency_code("currencies.allowed", code)?;
            }
        }

        if let Some(api) = &self.api {
            validate_url("api.endpoint", &api.endpoint)?;
            if let Some(key) = &api.api_key {
                validate_non_empty_string("api.api_key", key)?;
            }
            if let Some(timeout) = api.timeout_seconds {
                validate_positive_number("api.timeout_seconds", timeout, 1)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for ImportConfig {
    fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes()
    }

    fn api_endpoint(&self) -> Option<&str> {
        self.api.as_ref().map(|api| api.endpoint.as_str())
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CurrencyCatalog;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[import]
max_file_size_bytes = 1048576

[currencies]
allowed = ["usd", "EUR", "CNY"]

[api]
endpoint = "https://api.example.com/v1"
api_key = "secret"
timeout_seconds = 10
"#;

        let config = ImportConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.max_file_size_bytes(), 1_048_576);
        assert!(config.currency_allow_list().is_valid_currency("USD"));
        assert!(!config.currency_allow_list().is_valid_currency("GBP"));
        assert_eq!(ConfigProvider::api_endpoint(&config), Some("https://api.example.com/v1"));
        assert_eq!(config.timeout_seconds(), Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ImportConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_file_size_bytes(), MAX_UPLOAD_BYTES);
        assert!(config.currency_allow_list().is_valid_currency("JPY"));
        assert!(config.api.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SUBSCRIPTION_IMPORT_TEST_KEY", "from-env");

        let toml_content = r#"
[api]
endpoint = "https://api.example.com"
api_key = "${SUBSCRIPTION_IMPORT_TEST_KEY}"
"#;

        let config = ImportConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key().as_deref(), Some("from-env"));

        std::env::remove_var("SUBSCRIPTION_IMPORT_TEST_KEY");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = ImportConfig::from_toml_str("[api]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_currency = ImportConfig::from_toml_str("[currencies]\nallowed = [\"DOLLAR\"]\n").unwrap();
        assert!(bad_currency.validate().is_err());

        let zero_limit = ImportConfig::from_toml_str("[import]\nmax_file_size_bytes = 0\n").unwrap();
        assert!(zero_limit.validate().is_err());
    }

    #[test]
    fn test_override_api() {
        let mut config = ImportConfig::default();
        config.override_api(Some("http://localhost:8080".to_string()), Some("k".to_string()));

        assert_eq!(ConfigProvider::api_endpoint(&config), Some("http://localhost:8080"));
        assert_eq!(config.api_key().as_deref(), Some("k"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[import]\nmax_file_size_bytes = 4096\n")
            .unwrap();

        let config = ImportConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.max_file_size_bytes(), 4096);
    }
}
