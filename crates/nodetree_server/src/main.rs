//! nodetree HTTP server entry point.
//!
//! Configuration comes from environment variables; see [`nodetree_server::config`].

use nodetree_core::init_logging;
use nodetree_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    start_server(config).await
}
