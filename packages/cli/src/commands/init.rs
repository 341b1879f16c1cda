use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pharmasite_editor::seed_defaults;
use pharmasite_server::auth::hash_password;
use pharmasite_server::config::{AccountConfig, Config, DEFAULT_CONFIG_NAME};
use pharmasite_store::{AccessRules, ContentStore, Principal, Role};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where the content store lives, relative to the root
    #[arg(short, long, default_value = "data/content.json")]
    pub data_file: String,

    /// Add an editor account with this email
    #[arg(long, requires = "admin_password")]
    pub admin_email: Option<String>,

    /// Password for --admin-email
    #[arg(long, requires = "admin_email")]
    pub admin_password: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub async fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pharmasite...".bright_blue().bold());

    let config = build_config(&args)?;

    let uploads = config.resolve(cwd, &config.uploads_dir);
    if !uploads.exists() {
        fs::create_dir_all(&uploads)
            .with_context(|| format!("creating {}", uploads.display()))?;
        println!("  {} Created {}/", "✓".green(), config.uploads_dir);
    }

    let data_file = config.resolve(cwd, &args.data_file);
    let store = ContentStore::open(&data_file, AccessRules::default())?;
    let seeded = seed_defaults(&store.client(Principal::Service)).await?;
    if seeded.is_empty() {
        println!("  {} {} already has content", "✓".green(), args.data_file);
    } else {
        for path in &seeded {
            println!("  {} Seeded {}", "✓".green(), path);
        }
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {}", config_path.display()))?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    if config.accounts.is_empty() {
        println!("  1. Add an account: pharmasite hash-password <password>");
    } else {
        println!("  1. Set SESSION_SECRET for stable sessions across restarts");
    }
    println!("  2. Run: pharmasite serve");

    Ok(())
}

fn build_config(args: &InitArgs) -> Result<Config> {
    let mut config = Config {
        data_file: Some(args.data_file.clone()),
        ..Config::default()
    };

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        let password_hash = hash_password(password)
            .map_err(|e| anyhow::anyhow!("could not hash password: {}", e))?;
        config.accounts.push(AccountConfig {
            email: email.clone(),
            password_hash,
            role: Role::Editor,
        });
    }

    Ok(config)
}
