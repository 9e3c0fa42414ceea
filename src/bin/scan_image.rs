use clap::Parser;
use std::path::PathBuf;
use substance_scan::utils::{logger, validation::Validate};
use substance_scan::{app, ServerConfig, UploadRequest};

/// Scan a single image from disk, without starting the HTTP server.
#[derive(Parser)]
#[command(name = "scan-image")]
#[command(about = "Run one image through the banned-substance scan and print the result")]
struct Args {
    /// Image to scan (png, jpg, jpeg, gif)
    image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    #[command(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    substance_scan::config::load_env_file(None);
    let args = Args::parse();
    let config = args.server.load()?;

    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let file_name = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = tokio::fs::read(&args.image).await?;

    tracing::info!("📁 Scanning {} ({} bytes)", args.image.display(), data.len());

    let engine = app::build_engine(&config)?;
    let result = engine.run(UploadRequest::new(file_name, data)).await?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    if !result.found_substances.is_empty() {
        tracing::warn!(
            "⚠️ Banned substances found: {}",
            result.found_substances.join(", ")
        );
    }

    Ok(())
}
