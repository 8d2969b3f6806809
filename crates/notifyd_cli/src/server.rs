use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use notify_gateway::{reconcile_receivers, run_gateway_server, GatewaySettings};

use crate::config::Config;
use crate::seed;

pub(crate) async fn serve(cfg: &Config) -> Result<()> {
    let bind: SocketAddr = cfg
        .bind
        .parse()
        .with_context(|| format!("failed to parse bind address `{}`", cfg.bind))?;

    let store = Arc::new(seed::load_store(&cfg.seed_path)?);
    reconcile_receivers(store.as_ref()).await?;

    let settings = GatewaySettings {
        bind,
        no_cross_namespace_refs: cfg.no_cross_namespace_refs,
    };
    run_gateway_server(store, settings).await
}
