use clap::Parser;
use echo_chat::core::config::{CliOverrides, EchoConfig, load_config, resolve};
use echo_chat::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "echo-chat", about = "Terminal client for the Echo assistant")]
struct Args {
    /// Base URL of the Echo API (overrides ECHO_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token for the signed-in user (overrides ECHO_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Hide the /attach command and send text only
    #[arg(long)]
    no_attachments: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The TUI owns the terminal, so logs go to echo.log in the working directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("echo.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let config = load_config().unwrap_or_else(|e| {
        log::warn!("Config unusable, falling back to defaults: {}", e);
        EchoConfig::default()
    });
    let cli = CliOverrides {
        api_url: args.api_url,
        access_token: args.token,
        no_attachments: args.no_attachments,
    };
    let resolved = resolve(&config, &cli);

    log::info!(
        "Echo starting up against {} (signed in: {})",
        resolved.api_url,
        resolved.credentials.is_signed_in()
    );

    tui::run(resolved)
}
