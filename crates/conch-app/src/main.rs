//! CONCH demo console.
//!
//! Reads commands from stdin until `quit`, Ctrl-C or end of input. The
//! config file path comes from the first argument, then `CONCH_CONFIG`,
//! then `conch.toml` in the working directory.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use conch_terminal::{CommandRegistry, Console, StdTerminal, Terminal};
use conch_types::config::ConsoleConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CONCH_CONFIG").ok())
        .unwrap_or_else(|| "conch.toml".to_string())
        .into();
    let config = ConsoleConfig::load(&config_path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();
    log::info!("Starting CONCH (config: {})", config_path.display());

    let term: Arc<dyn Terminal> =
        Arc::new(StdTerminal::spawn()?.with_question_prefix(&config.question_prefix));
    let cancel = CancellationToken::new();

    let mut reg = CommandRegistry::builder();
    commands::register_demo_commands(&mut reg, &term, &cancel)?;
    if config.help {
        reg.with_help(Arc::clone(&term));
    }
    let console = Console::new(reg.build()?, term).configure(&config);

    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted");
            on_ctrl_c.cancel();
        }
    });

    console.run(&cancel).await;
    Ok(())
}
