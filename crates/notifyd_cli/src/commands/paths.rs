use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use notify_model::NamespacedName;
use notify_store::ObjectStore;

use crate::app::AppContext;
use crate::commands::CliCommand;
use crate::seed;

#[derive(Args, Debug, Clone, Default)]
#[command(about = "Print the derived webhook path for every receiver in the seed")]
pub struct PathsCommand;

#[async_trait]
impl CliCommand for PathsCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let cfg = ctx.config()?;
        let store = seed::load_store(&cfg.seed_path)?;

        for receiver in store.list_receivers().await? {
            let name = receiver.metadata.namespaced_name();
            let secret_name = NamespacedName::new(
                receiver.metadata.namespace.clone(),
                receiver.spec.secret_ref.name.clone(),
            );
            match store.get_secret(&secret_name).await {
                Ok(secret) => match secret.get_str("token") {
                    Some(token) => {
                        println!("{name}\t{}", receiver.webhook_path(&token));
                    }
                    None => println!("{name}\t(secret has no token key)"),
                },
                Err(err) => println!("{name}\t({err})"),
            }
        }
        Ok(())
    }
}
