use clap::Parser;
use smartstore_uploader::core::ScrapeSource;
use smartstore_uploader::utils::error::ErrorSeverity;
use smartstore_uploader::utils::{logger, validation::Validate};
use smartstore_uploader::{AppConfig, CliConfig, LocalScrapeSource, Registrar, SmartstoreError, Transformer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("🚀 Starting smartstore-uploader");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let transformer = Transformer::new(config.defaults.clone());
    let registrar = Registrar::from_config(&config, transformer)?;
    let credentials = config.credentials();

    if cli.check_credentials {
        let valid = registrar.signer().validate_credentials(&credentials).await?;
        println!("{}", if valid { "✅ Credentials are valid" } else { "❌ Credentials were rejected" });
        std::process::exit(if valid { 0 } else { 1 });
    }

    let Some(input) = cli.input.as_deref() else {
        eprintln!("❌ --input is required unless --check-credentials is given");
        std::process::exit(1);
    };
    let source = LocalScrapeSource::new(input);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be sent to the platform");
        for product in source.scraped_products().await? {
            match registrar.transformer().format(&product) {
                Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
                Err(e) => eprintln!("❌ '{}': {}", product.title, e.user_friendly_message()),
            }
        }
        return Ok(());
    }

    if let Some(origin_product_no) = cli.update {
        let products = source.scraped_products().await?;
        let Some(product) = products.first() else {
            eprintln!("❌ Input file contains no products");
            std::process::exit(1);
        };
        match registrar.update(origin_product_no, product, &credentials).await {
            Ok(result) => println!("✅ Updated product {}", result.product_id),
            Err(e) => exit_with(&e),
        }
        return Ok(());
    }

    let outcomes = registrar.register_from_source(&source, &config).await?;
    let mut worst: Option<SmartstoreError> = None;
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => println!("✅ {} -> originProductNo {}", outcome.title, result.product_id),
            Err(e) => {
                eprintln!("❌ {}: {}", outcome.title, e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                if worst.as_ref().map_or(true, |w| e.severity() > w.severity()) {
                    worst = Some(e);
                }
            }
        }
    }

    if let Some(e) = worst {
        exit_with(&e);
    }
    Ok(())
}

fn exit_with(e: &SmartstoreError) -> ! {
    tracing::error!(
        "❌ Registration failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
