use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use listing_gen::utils::{logger, validation::Validate};
use listing_gen::{
    CliConfig, GenerationPipeline, GenerationReport, GenerationRequest, HistoryEntry,
    HistoryStore, ImageInput, JsonlHistory, ModelConfig, OpenAiInvoker,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    dotenvy::dotenv().ok();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting listing-gen CLI");

    let config = match ModelConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            eprintln!("❌ {}", e.user_message());
            std::process::exit(2);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_message());
        std::process::exit(2);
    }

    let request = build_request(&cli)?;
    let image_names: Vec<String> = cli
        .images
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let pipeline = GenerationPipeline::new(OpenAiInvoker::new(config.clone()), config);

    match pipeline.generate(&request).await {
        Ok(report) => {
            tracing::info!(
                elapsed_ms = report.elapsed.as_millis() as u64,
                corrected = report.corrected,
                "✅ Listing bundle generated"
            );
            println!("{}", serde_json::to_string_pretty(&report.bundle)?);

            if let Some(path) = &cli.history_path {
                record_history(&JsonlHistory::new(path), &cli, &image_names, &report).await;
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Generation failed: {}", e);
            eprintln!("❌ {}", e.user_message());
            let exit_code = if matches!(e, listing_gen::GenError::InvalidInput { .. }) {
                2
            } else {
                1
            };
            std::process::exit(exit_code);
        }
    }
}

fn build_request(cli: &CliConfig) -> anyhow::Result<GenerationRequest> {
    let mut images = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        images.push(
            ImageInput::new(bytes)
                .with_mime(guess_mime(path))
                .with_name(path.display().to_string()),
        );
    }

    Ok(GenerationRequest {
        images,
        lang: cli.lang.clone(),
        hint: cli.hint.clone(),
    })
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// History is best-effort: a failed write is logged and never affects the
/// printed bundle or the exit code.
async fn record_history(
    store: &JsonlHistory,
    cli: &CliConfig,
    image_names: &[String],
    report: &GenerationReport,
) {
    let entry = HistoryEntry {
        requestor: "cli".to_string(),
        lang: report.bundle.lang,
        hint: cli.hint.clone(),
        image_count: image_names.len(),
        image_names: image_names.to_vec(),
        product_type: report.bundle.universal.product_type.clone(),
        brand: report.bundle.universal.brand.clone(),
        bundle: report.bundle.clone(),
        created_at: Utc::now(),
        elapsed_ms: report.elapsed.as_millis() as u64,
    };

    match store.record(&entry).await {
        Ok(()) => tracing::info!("📁 History record appended to {}", store.path().display()),
        Err(e) => tracing::warn!("History record failed (ignored): {}", e),
    }
}
