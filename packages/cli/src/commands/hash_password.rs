use anyhow::Result;
use clap::Args;
use pharmasite_server::auth;

#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Plain-text password to hash
    pub password: String,
}

pub fn hash_password(args: HashPasswordArgs) -> Result<()> {
    let hash = auth::hash_password(&args.password)
        .map_err(|e| anyhow::anyhow!("could not hash password: {}", e))?;
    println!("{}", hash);
    Ok(())
}
