use crate::core::validator::parse_date;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "subscription-import")]
#[command(about = "Validate and import subscriptions from CSV or JSON files")]
pub struct CliConfig {
    /// CSV or JSON file to import
    pub file: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Submit the validated subscriptions to the API (only when no row has errors)
    #[arg(long)]
    pub commit: bool,

    /// Override the API endpoint from the config file
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Override the API key from the config file
    #[arg(long)]
    pub api_key: Option<String>,

    /// Reference date for deriving next billing dates (YYYY-MM-DD)
    #[arg(long, value_parser = parse_today)]
    pub today: Option<NaiveDate>,

    /// Write the valid subscriptions to a CSV file
    #[arg(long)]
    pub export_csv: Option<String>,

    /// Write the valid subscriptions to a JSON file
    #[arg(long)]
    pub export_json: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

fn parse_today(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("'{}' is not a valid date", value))
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("file", &self.file)?;
        if let Some(endpoint) = &self.api_endpoint {
            validate_url("api_endpoint", endpoint)?;
        }
        for path in [&self.export_csv, &self.export_json].into_iter().flatten() {
            validate_path("export", path)?;
        }
        Ok(())
    }
}
