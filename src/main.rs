use clap::Parser;
use std::sync::Arc;
use substance_scan::config::load_env_file;
use substance_scan::core::ConfigProvider;
use substance_scan::utils::error::{ErrorSeverity, ScanError};
use substance_scan::utils::{logger, validation::Validate};
use substance_scan::{app, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 必須在解析命令列之前載入，clap 的 env fallback 才讀得到
    let env_file = load_env_file(None);

    let config = match ServerConfig::parse().load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting substance-scan server");
    if let Some(path) = &env_file {
        tracing::info!("📄 Loaded environment from {}", path.display());
    }
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Server failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(config: &ServerConfig) -> Result<(), ScanError> {
    let bind = config.bind_addr()?;
    let engine = app::build_engine(config)?;
    engine.monitor().log_stats("Startup");

    let router = app::router(Arc::new(engine), config.max_upload_bytes());
    app::serve(router, bind).await
}
