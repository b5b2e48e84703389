use anyhow::Result;

/// `ashq config-hash <paths...>`: load the layered YAML config and print
/// its canonical JSON and content hash, for verifying two environments
/// agree on what a backtest run actually configured.
pub fn run(paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = ashq_config::load_layered_yaml(&path_refs)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}
