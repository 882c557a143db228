//! `ragweed config` — print the default configuration.

use ragweed_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    println!(
        "# Default configuration — save to {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    println!();
    println!("{}", AppConfig::default_toml());
    Ok(())
}
