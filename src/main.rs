use clap::Parser;
use subscription_import::core::export::{export_csv, export_json};
use subscription_import::domain::ports::ConfigProvider;
use subscription_import::utils::error::ErrorSeverity;
use subscription_import::utils::{logger, validation::validate_required_field, validation::Validate};
use subscription_import::{
    CalendarBillingCalculator, CliConfig, HttpSubscriptionSink, ImportConfig, ImportEngine,
    ImportPipeline, ImportResult, ImportWizard, LocalStorage, PipelineError,
};
use tokio::sync::Mutex;

fn fail(e: &PipelineError) -> ! {
    tracing::error!(
        "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_review(result: &ImportResult) {
    println!("📋 {} valid subscriptions", result.valid_count());
    for record in &result.records {
        println!(
            "   • {}: {} {} {} (next {}, {})",
            record.name,
            record.amount,
            record.currency,
            record.billing_cycle,
            record.next_billing_date,
            record.status
        );
    }
    if result.has_errors() {
        println!("⚠️ {} errors", result.errors.len());
        for message in result.error_messages() {
            println!("   • {}", message);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::info!("Starting subscription-import");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 載入 TOML 配置 (可選)
    let mut import_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ImportConfig::from_file(path).unwrap_or_else(|e| fail(&e))
        }
        None => ImportConfig::default(),
    };
    import_config.override_api(config.api_endpoint.clone(), config.api_key.clone());
    if let Err(e) = import_config.validate() {
        fail(&e);
    }
    if config.commit {
        let endpoint = import_config.api_endpoint().map(str::to_string);
        if let Err(e) = validate_required_field("api.endpoint", &endpoint) {
            fail(&e);
        }
    }

    let calculator = config
        .today
        .map(CalendarBillingCalculator::new)
        .unwrap_or_else(CalendarBillingCalculator::from_local_clock);
    let currencies = import_config.currency_allow_list();
    tracing::debug!("Allowed currencies: {:?}", currencies.codes().collect::<Vec<_>>());
    let pipeline = ImportPipeline::new(currencies, calculator);
    let storage = LocalStorage::new(".").with_max_file_size(import_config.max_file_size_bytes());
    let sink = HttpSubscriptionSink::new(import_config.api_endpoint().unwrap_or_default())
        .with_api_key(import_config.api_key())
        .with_timeout(import_config.timeout_seconds());

    let size = storage
        .file_size(&config.file)
        .await
        .unwrap_or_else(|e| fail(&e));
    let engine = ImportEngine::new(storage, sink, pipeline);

    let wizard = Mutex::new(ImportWizard::new(import_config.max_file_size_bytes()));
    if let Err(e) = wizard.lock().await.select_file(config.file.clone(), size) {
        fail(&e);
    }
    if let Err(e) = engine.validate_in_wizard(&wizard, &config.file).await {
        fail(&e);
    }

    let mut wizard = wizard.into_inner();
    let Some(result) = wizard.result().cloned() else {
        fail(&PipelineError::CommitBlocked {
            reason: "validation did not produce a result".to_string(),
        });
    };
    println!("🔎 {} ({}%)", wizard.step(), wizard.step().progress());
    print_review(&result);

    if let Some(path) = &config.export_csv {
        tokio::fs::write(path, export_csv(&result.records)?).await?;
        println!("📁 CSV saved to: {}", path);
    }
    if let Some(path) = &config.export_json {
        tokio::fs::write(path, export_json(&result.records)?).await?;
        println!("📁 JSON saved to: {}", path);
    }

    if config.commit {
        let records = wizard.confirm().unwrap_or_else(|e| fail(&e));
        match engine.commit_records(&records).await {
            Ok(summary) => {
                println!("✅ Imported {} of {} subscriptions", summary.inserted, summary.submitted);
                println!("🔎 {} ({}%)", wizard.step(), wizard.step().progress());
            }
            Err(e) => fail(&e),
        }
    } else if result.has_errors() {
        std::process::exit(4);
    }

    Ok(())
}
