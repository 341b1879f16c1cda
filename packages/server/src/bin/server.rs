use anyhow::Context;
use pharmasite_server::{observability, serve, Config};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let mut cwd = std::env::current_dir().context("no working directory")?;
    let mut config_path: Option<PathBuf> = None;
    let mut bind: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                config_path = args.get(i).map(PathBuf::from);
            }
            "--bind" | "-b" => {
                i += 1;
                bind = args.get(i).cloned();
            }
            "--root" | "-r" => {
                i += 1;
                if let Some(root) = args.get(i) {
                    cwd = PathBuf::from(root);
                }
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load(&cwd)?,
    }
    .with_env()?;
    if let Some(bind) = bind {
        config.bind = bind;
    }

    serve(config, &cwd).await?;
    Ok(())
}
