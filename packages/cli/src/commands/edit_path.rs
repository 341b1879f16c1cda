use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pharmasite_editor::resolve_editor_path;

#[derive(Debug, Args)]
pub struct EditPathArgs {
    /// Public site path, e.g. /products/amoxicillin
    pub paths: Vec<String>,
}

pub fn edit_path(args: EditPathArgs) -> Result<()> {
    if args.paths.is_empty() {
        anyhow::bail!("no paths given");
    }

    for path in &args.paths {
        match resolve_editor_path(path) {
            Some(editor) => println!("{} → {}", path.bright_white(), editor.green()),
            None => println!("{} → {}", path.bright_white(), "not editable".dimmed()),
        }
    }
    Ok(())
}
