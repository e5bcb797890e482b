//! Inspect or create the configuration file.

use std::path::Path;

use trustcall_common::config::AppConfig;

pub fn show(path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load_from(path);
    let status = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config file: {}{status}", path.display());
    println!(
        "Sample interval: {:.0}ms",
        config.analyzer.sample_interval_ms()
    );
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default()
        .save_to(path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
    println!("Wrote default config to: {}", path.display());
    Ok(())
}
