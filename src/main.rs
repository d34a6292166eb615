use std::io::IsTerminal;

use hiveq::cli::Cli;
use hiveq_core::config::Config;
use hiveq_term::OutputStyle;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_normalized();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    tracing::debug!(?cli, "hiveq started");

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("config: {err:#}; using defaults");
        Config::defaults()
    });
    let stdout = std::io::stdout();
    let style = OutputStyle::from_config(&config, stdout.is_terminal());

    hiveq::run::run(&cli, &style, &mut stdout.lock());
    Ok(())
}
