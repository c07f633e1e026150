//! Bridge from `vigil_config::Config` to domain types.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vigil_approval::ApprovalRegistry;
use vigil_config::Config;
use vigil_gateway::GatewayConfig;
use vigil_llm::ProviderConfig;
use vigil_runtime::{AgentRuntime, RuntimeConfig};
use vigil_telemetry::{LogConfig, LogFormat};
use vigil_tools::ShellRunner;
use vigil_workspace::WorkspaceRoot;

/// Logging settings. `--verbose` forces debug.
pub(crate) fn to_log_config(cfg: &Config, verbose: bool) -> LogConfig {
    let level = if verbose { "debug" } else { cfg.logging.level.as_str() };
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);
    let log = LogConfig::new(level).with_format(format);
    match &cfg.logging.directory {
        Some(dir) => log.with_file_logging(dir),
        None => log,
    }
}

pub(crate) fn to_runtime_config(cfg: &Config) -> RuntimeConfig {
    RuntimeConfig::default()
        .with_max_steps(cfg.limits.max_steps)
        .with_char_budget(cfg.limits.char_budget)
        .with_read_char_limit(cfg.limits.read_char_limit)
}

/// Drop disabled families and apply generation settings.
pub(crate) fn select_providers(cfg: &Config, discovered: Vec<ProviderConfig>) -> Vec<ProviderConfig> {
    discovered
        .into_iter()
        .filter(|p| !cfg.providers.is_disabled(p.family.as_str()))
        .map(|p| {
            p.max_tokens(cfg.providers.max_tokens)
                .temperature(cfg.providers.temperature)
        })
        .collect()
}

pub(crate) fn to_gateway_config(cfg: &Config, bind_override: Option<&str>) -> Result<GatewayConfig> {
    let bind = bind_override.unwrap_or(&cfg.server.bind);
    Ok(GatewayConfig {
        bind: bind
            .parse()
            .with_context(|| format!("invalid bind address '{bind}'"))?,
        cors_origins: cfg.server.cors_origins.clone(),
        sweep_interval: cfg.approval.sweep_interval(),
    })
}

/// `--workspace`, then `workspace.root`, then the current directory.
pub(crate) fn resolve_workspace(cfg: &Config, flag: Option<&Path>) -> Result<WorkspaceRoot> {
    let path = match flag.or(cfg.workspace.root.as_deref()) {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    WorkspaceRoot::new(&path).with_context(|| format!("invalid workspace root {}", path.display()))
}

pub(crate) fn build_runtime(cfg: &Config, root: WorkspaceRoot) -> AgentRuntime {
    let approvals = ApprovalRegistry::new()
        .with_request_ttl(cfg.approval.request_ttl())
        .with_token_ttl(cfg.approval.token_ttl());
    let runner = ShellRunner::new()
        .with_timeout(cfg.limits.command_timeout())
        .with_max_output_bytes(cfg.limits.max_output_bytes);
    let providers = select_providers(cfg, vigil_llm::discover_from_env());

    AgentRuntime::new(providers, root, Arc::new(approvals), to_runtime_config(cfg))
        .with_runner(Arc::new(runner))
}
