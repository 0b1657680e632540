use assist_panel::Provider;
use assist_panel::core::config::{self, PanelConfig};
use assist_panel::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "assist-panel", about = "Terminal assistant panel")]
struct Args {
    /// LLM provider to use (overrides config and env)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name (overrides config and env)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to assist-panel.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("assist-panel.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        PanelConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        args.provider.map(Provider::as_str),
        args.model.as_deref(),
    );

    log::info!(
        "Assistant panel starting up with provider: {}, model: {}",
        resolved.provider,
        resolved.model_name
    );

    tui::run(resolved)
}
