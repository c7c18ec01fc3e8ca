//! Serve command

use crate::app::ServeArgs;
use anyhow::Result;
use lexrag_core::Config;

pub async fn run(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    lexrag_server::start_server(config).await
}
