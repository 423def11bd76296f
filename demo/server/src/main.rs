/* demo/server/src/main.rs */

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use gadget_server_axum::IntoAxumRouter;
use gadget_server_axum::gadget_server::{GadgetServer, find_gadget_config, load_gadget_config};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .init();
}

/// Config path from the first argument, else the nearest `gadget.toml` upward from cwd.
fn config_path() -> Result<PathBuf> {
  match std::env::args_os().nth(1) {
    Some(path) => Ok(PathBuf::from(path)),
    None => {
      let cwd = std::env::current_dir().context("failed to read current directory")?;
      find_gadget_config(&cwd)
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();

  let path = config_path()?;
  let config = load_gadget_config(&path)?;
  let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
  tracing::info!(config = %path.display(), features = config.features.len(), "loaded config");

  let mut server = GadgetServer::new(Arc::new(config.http_fetcher()?))
    .registry(config.feature_registry())
    .blacklist(Arc::new(config.pattern_blacklist()?))
    .default_locale(config.default_locale());
  if let Some(signing) = config.signing_factory(&base_dir)? {
    tracing::info!(key_name = signing.key_name(), "signed preloads enabled");
    server = server.signing(signing);
  }

  server.serve(&config.server.bind).await.map_err(|e| anyhow!("server error: {e}"))
}
