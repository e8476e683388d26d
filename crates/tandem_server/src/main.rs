//! Tandem API Server

use std::path::PathBuf;

use clap::Parser;
use miette::IntoDiagnostic;
use tandem_server::{ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tandem-server", version, about = "Tandem language-exchange API server")]
struct Args {
    /// TOML config file; environment variables override its values
    #[arg(short, long, env = "TANDEM_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();

    // Initialize tracing; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tandem_api=debug,tandem_server=debug,tandem_core=debug,tower_http=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .pretty()
        .init();

    let config = ServerConfig::load(args.config.as_deref()).into_diagnostic()?;

    // Start server
    start_server(config).await.into_diagnostic()?;

    Ok(())
}
