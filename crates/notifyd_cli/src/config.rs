use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const BIND_VAR: &str = "NOTIFYD_BIND";
const SEED_VAR: &str = "NOTIFYD_SEED";
const NO_CROSS_NAMESPACE_VAR: &str = "NOTIFYD_NO_CROSS_NAMESPACE_REFS";
const DEFAULT_BIND: &str = "0.0.0.0:9090";

pub struct Config {
    /// Listen address for both the ingress and webhook planes.
    pub bind: String,
    /// JSON seed describing the declarative objects to serve.
    pub seed_path: PathBuf,
    pub no_cross_namespace_refs: bool,
}

pub fn load_config() -> Result<Config> {
    let bind = env::var(BIND_VAR).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let seed_path = env::var(SEED_VAR)
        .map(PathBuf::from)
        .with_context(|| format!("{SEED_VAR} not set; point it at a store seed JSON file"))?;
    let no_cross_namespace_refs = env::var(NO_CROSS_NAMESPACE_VAR)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    Ok(Config {
        bind,
        seed_path,
        no_cross_namespace_refs,
    })
}
