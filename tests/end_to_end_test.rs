use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use subscription_import::core::wizard::WizardStep;
use subscription_import::{
    CalendarBillingCalculator, CurrencyAllowList, HttpSubscriptionSink, ImportConfig, ImportEngine,
    ImportErrorKind, ImportPipeline, ImportWizard, LocalStorage, PipelineError,
};
use tempfile::TempDir;
use tokio::sync::Mutex;

const CSV: &str = "name,amount,currency,billingCycle,nextBillingDate,status
Netflix,15.99,USD,monthly,2024-06-01,active
Spotify,9.99,EUR,monthly,2024-04-12,trial
";

fn today() -> CalendarBillingCalculator {
    CalendarBillingCalculator::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
}

#[tokio::test]
async fn test_end_to_end_import_and_commit() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(temp_dir.path().join("subs.csv"), CSV).await?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/subscriptions/bulk");
        then.status(200).json_body(serde_json::json!({"inserted": 2}));
    });

    let config = ImportConfig::from_toml_str(&format!(
        r#"
[currencies]
allowed = ["USD", "EUR"]

[api]
endpoint = "{}"
"#,
        server.base_url()
    ))?;

    let storage = LocalStorage::new(temp_dir.path()).with_max_file_size(config.max_file_size_bytes());
    let size = storage.file_size("subs.csv").await?;
    let sink = HttpSubscriptionSink::new(server.base_url());
    let engine = ImportEngine::new(
        storage,
        sink,
        ImportPipeline::new(config.currency_allow_list(), today()),
    );

    let wizard = Mutex::new(ImportWizard::new(config.max_file_size_bytes()));
    wizard.lock().await.select_file("subs.csv", size)?;
    assert!(engine.validate_in_wizard(&wizard, "subs.csv").await?);

    let mut wizard = wizard.into_inner();
    assert_eq!(wizard.step(), WizardStep::Review);
    assert_eq!(wizard.result().unwrap().valid_count(), 2);

    let records = wizard.confirm()?;
    let summary = engine.commit_records(&records).await?;

    api_mock.assert();
    assert_eq!(summary.inserted, 2);
    assert_eq!(wizard.step(), WizardStep::Complete);
    Ok(())
}

#[tokio::test]
async fn test_partial_result_is_never_committed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let content = format!("{}Hulu,7.99,ZZZ,monthly,2024-06-01,active\n", CSV);
    tokio::fs::write(temp_dir.path().join("subs.csv"), content).await?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/subscriptions/bulk");
        then.status(200);
    });

    let engine = ImportEngine::new(
        LocalStorage::new(temp_dir.path()),
        HttpSubscriptionSink::new(server.base_url()),
        ImportPipeline::new(CurrencyAllowList::default(), today()),
    );

    let result = engine.read_and_run("subs.csv").await;
    assert_eq!(result.valid_count(), 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].index, Some(2));

    let err = engine.commit(&result).await.unwrap_err();
    assert!(matches!(err, PipelineError::CommitBlocked { .. }));
    api_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_oversized_file_becomes_read_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(temp_dir.path().join("subs.json"), "[]".repeat(64)).await?;

    let engine = ImportEngine::new(
        LocalStorage::new(temp_dir.path()).with_max_file_size(16),
        HttpSubscriptionSink::new("http://localhost:9"),
        ImportPipeline::new(CurrencyAllowList::default(), today()),
    );

    let result = engine.read_and_run("subs.json").await;
    assert!(result.records.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0].kind, ImportErrorKind::ReadError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_file_is_not_read() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let engine = ImportEngine::new(
        LocalStorage::new(temp_dir.path()),
        HttpSubscriptionSink::new("http://localhost:9"),
        ImportPipeline::new(CurrencyAllowList::default(), today()),
    );

    // 檔案不存在；若有嘗試讀取會得到 ReadError
    let result = engine.read_and_run("data.txt").await;
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0].kind,
        ImportErrorKind::UnsupportedFormat { .. }
    ));
    Ok(())
}
