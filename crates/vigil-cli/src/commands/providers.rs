//! `vigil providers`

use vigil_config::Config;

use crate::config_bridge::select_providers;
use crate::theme::Theme;

pub(crate) fn list_providers(cfg: &Config) {
    let providers = select_providers(cfg, vigil_llm::discover_from_env());

    println!("{}", Theme::header("Model providers (in fallback order)"));
    if providers.is_empty() {
        println!(
            "{}",
            Theme::warning("No providers configured. Set ANTHROPIC_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY.")
        );
        return;
    }
    for (i, p) in providers.iter().enumerate() {
        println!("  {}. {}", i.saturating_add(1), p.label());
    }
    if !cfg.providers.disabled.is_empty() {
        println!(
            "{}",
            Theme::dimmed(&format!("disabled: {}", cfg.providers.disabled.join(", ")))
        );
    }
}
