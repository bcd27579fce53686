use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;

const DEFAULT_CONFIG: &str = "\
# Savant project configuration. Values here override user-global config;
# SAVANT_* environment variables override both.

[general]
# default_limit = 20
# journal = true

[retrieval]
# alpha = 0.7
# gamma = 0.3
";

/// Create the `.savant/` directory and a starter config file.
pub fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let savant_dir = root.join(".savant");

    if savant_dir.is_dir() {
        if !flags.quiet {
            println!("already a savant project: {}", savant_dir.display());
        }
        return Ok(());
    }

    std::fs::create_dir_all(&savant_dir)
        .with_context(|| format!("failed to create {}", savant_dir.display()))?;

    let config_path = savant_dir.join("config.toml");
    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    if !flags.quiet {
        println!("initialized savant project at {}", root.display());
    }
    Ok(())
}
