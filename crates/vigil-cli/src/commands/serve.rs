//! `vigil serve`

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use vigil_config::Config;
use vigil_gateway::GatewayServer;
use vigil_workspace::WorkspaceRoot;

use crate::config_bridge::{build_runtime, to_gateway_config};
use crate::theme::Theme;

pub(crate) async fn run_server(cfg: &Config, root: WorkspaceRoot, bind: Option<&str>) -> Result<()> {
    let gateway_config = to_gateway_config(cfg, bind)?;
    let runtime = build_runtime(cfg, root);

    if runtime.providers().is_empty() {
        eprintln!(
            "{}",
            Theme::warning("No model providers configured; /api/chat will return 503.")
        );
    }
    println!(
        "{}",
        Theme::success(&format!("Serving on http://{}", gateway_config.bind))
    );

    GatewayServer::new(Arc::new(runtime), gateway_config)
        .serve(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        },
    }
}
