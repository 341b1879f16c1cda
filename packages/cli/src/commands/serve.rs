use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pharmasite_server::{observability, Config};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Config file (defaults to pharmasite.config.json in the root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the config
    #[arg(short, long)]
    pub bind: Option<String>,
}

pub async fn serve(args: ServeArgs, cwd: &Path) -> Result<()> {
    observability::init_tracing();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(cwd)?,
    }
    .with_env()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    println!(
        "{} Pharmasite on {}",
        "🚀".green(),
        format!("http://{}", config.bind).bright_white()
    );
    if config.accounts.is_empty() && std::env::var("ADMIN_EMAIL").is_err() {
        println!(
            "{} No accounts configured; the admin area will refuse every login",
            "⚠️".yellow()
        );
    }

    pharmasite_server::serve(config, cwd).await?;
    Ok(())
}
