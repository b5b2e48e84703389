use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::backtest_config::BacktestConfig;

/// Load + merge YAML files in order (defaults first, overrides last),
/// then canonicalize to JSON and hash, mirroring the config-loading
/// convention used elsewhere in this workspace. Missing paths are
/// skipped rather than erroring, so a caller can pass an optional
/// override file that may not exist.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());

    for p in paths {
        if !Path::new(p).exists() {
            continue;
        }
        let s = fs::read_to_string(p).with_context(|| format!("read config: {p}"))?;
        let yaml_val: serde_yaml::Value =
            serde_yaml::from_str(&s).with_context(|| format!("parse yaml: {p}"))?;
        let json_val = serde_json::to_value(yaml_val).context("yaml->json conversion failed")?;
        deep_merge(&mut merged, json_val);
    }

    let canonical = canonicalize_json(&merged);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = hex::encode(hasher.finalize());

    let config: BacktestConfig =
        serde_json::from_str(&canonical).context("canonical json does not match BacktestConfig")?;

    Ok(LoadedConfig {
        config,
        canonical_json: canonical,
        config_hash: hash,
    })
}

/// Layer environment variables (`ASHQ_<FIELD>`, upper-snake-case) over
/// an already-loaded config. Only scalar fields are supported; a
/// variable that fails to parse against its field's type is ignored
/// rather than erroring, since env overrides are best-effort dev
/// conveniences, not a primary config path.
pub fn apply_env_overrides(config: &mut BacktestConfig) -> Result<()> {
    let mut value = serde_json::to_value(&*config).context("serialize config for env overrides")?;
    let Value::Object(map) = &mut value else {
        unreachable!("BacktestConfig always serializes to an object");
    };

    for (key, slot) in map.iter_mut() {
        let env_key = format!("ASHQ_{}", key.to_ascii_uppercase());
        if let Ok(raw) = std::env::var(&env_key) {
            if let Ok(parsed) = serde_json::from_str::<Value>(&raw) {
                *slot = parsed;
            } else {
                *slot = Value::String(raw);
            }
        }
    }

    *config = serde_json::from_value(value).context("env-overridden config no longer matches BacktestConfig")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BacktestConfig,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Objects merge recursively; arrays and scalars are overwritten.
fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}

/// Sorts all object keys recursively and emits compact JSON, so the
/// same logical config always hashes to the same bytes regardless of
/// the source YAML's key order.
fn canonicalize_json(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("json serialization must not fail")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}
