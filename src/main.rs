use clap::Parser;
use colored::Colorize;

use affiliates::cli::Cli;
use affiliates::runtime::modes::{Mode, detect_mode, run_cli, run_server};
use affiliates::system::logging::init_logging;
use affiliates::system::panic_handler::{RunMode, install_panic_hook};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    affiliates::config::init_config_from(cli.config.as_deref());

    let command = cli.command_or_serve();
    match detect_mode(command) {
        Mode::Server => {
            install_panic_hook(RunMode::Server);
            let config = affiliates::config::get_config();
            let _guard = init_logging(&config.logging);

            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

            run_server().await
        }
        Mode::Cli => {
            install_panic_hook(RunMode::Command);
            let config = affiliates::config::get_config();
            let _guard = init_logging(&config.logging);

            if let Err(e) = run_cli(command).await {
                eprintln!("{}", e.format_colored());
                eprintln!("{}", "Run with --help for usage".dimmed());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
