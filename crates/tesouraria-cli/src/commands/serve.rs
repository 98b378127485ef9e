//! Serve command - run the HTTP functions.

use clap::Args;

use tesouraria_functions::AppState;

use super::config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = config::load(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config);
    tesouraria_functions::serve(&config.server, state).await?;

    Ok(())
}
