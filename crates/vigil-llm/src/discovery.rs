//! Provider discovery from credentials.
//!
//! Candidates are ordered: each native vendor's preferred model, then the
//! native vendors' cheaper models, then OpenAI-compatible vendors. Only
//! vendors whose credential is present and non-empty are included.

use crate::provider::{ProviderConfig, ProviderFamily};

/// Environment variables consulted for each family, in lookup order.
pub const CREDENTIAL_VARS: &[(ProviderFamily, &[&str])] = &[
    (ProviderFamily::Anthropic, &["ANTHROPIC_API_KEY"]),
    (ProviderFamily::Gemini, &["GEMINI_API_KEY", "GOOGLE_API_KEY"]),
    (ProviderFamily::OpenAi, &["OPENAI_API_KEY"]),
    (ProviderFamily::DeepSeek, &["DEEPSEEK_API_KEY"]),
    (ProviderFamily::Groq, &["GROQ_API_KEY"]),
    (ProviderFamily::OpenRouter, &["OPENROUTER_API_KEY"]),
    (ProviderFamily::Mistral, &["MISTRAL_API_KEY"]),
    (ProviderFamily::Xai, &["XAI_API_KEY"]),
];

/// Fallback order: `(family, model)`.
const PRIORITY: &[(ProviderFamily, &str)] = &[
    (ProviderFamily::Anthropic, "claude-sonnet-4-20250514"),
    (ProviderFamily::Gemini, "gemini-2.5-pro"),
    (ProviderFamily::Anthropic, "claude-3-5-haiku-latest"),
    (ProviderFamily::Gemini, "gemini-2.5-flash"),
    (ProviderFamily::OpenAi, "gpt-4o"),
    (ProviderFamily::OpenAi, "gpt-4o-mini"),
    (ProviderFamily::DeepSeek, "deepseek-chat"),
    (ProviderFamily::Groq, "llama-3.3-70b-versatile"),
    (ProviderFamily::OpenRouter, "openai/gpt-4o-mini"),
    (ProviderFamily::Mistral, "mistral-large-latest"),
    (ProviderFamily::Xai, "grok-2-latest"),
];

/// The credential for `family`, if any of its variables is set.
#[must_use]
pub fn credential_for(family: ProviderFamily, lookup: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    CREDENTIAL_VARS
        .iter()
        .find(|(f, _)| *f == family)
        .into_iter()
        .flat_map(|(_, vars)| vars.iter())
        .filter_map(|var| lookup(var))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Ordered provider candidates for the credentials `lookup` can see.
#[must_use]
pub fn discover_providers(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<ProviderConfig> {
    PRIORITY
        .iter()
        .filter_map(|(family, model)| {
            credential_for(*family, lookup).map(|key| ProviderConfig::new(*family, key, *model))
        })
        .collect()
}

/// Ordered provider candidates from the process environment.
#[must_use]
pub fn discover_from_env() -> Vec<ProviderConfig> {
    discover_providers(&|var| std::env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_no_credentials() {
        assert!(discover_providers(&env(&[])).is_empty());
    }

    #[test]
    fn test_native_first_then_compatible() {
        let lookup = env(&[
            ("GROQ_API_KEY", "g"),
            ("OPENAI_API_KEY", "o"),
            ("ANTHROPIC_API_KEY", "a"),
            ("GOOGLE_API_KEY", "gm"),
        ]);
        let labels: Vec<_> = discover_providers(&lookup).iter().map(ProviderConfig::label).collect();
        assert_eq!(
            labels,
            vec![
                "anthropic:claude-sonnet-4-20250514",
                "gemini:gemini-2.5-pro",
                "anthropic:claude-3-5-haiku-latest",
                "gemini:gemini-2.5-flash",
                "openai:gpt-4o",
                "openai:gpt-4o-mini",
                "groq:llama-3.3-70b-versatile",
            ]
        );
    }

    #[test]
    fn test_blank_credentials_ignored() {
        let lookup = env(&[("ANTHROPIC_API_KEY", "  "), ("GEMINI_API_KEY", ""), ("GOOGLE_API_KEY", "k")]);
        let configs = discover_providers(&lookup);
        assert_eq!(configs.len(), 2);
        assert!(configs.iter().all(|c| c.family == ProviderFamily::Gemini));
        assert_eq!(configs[0].api_key, "k");
    }
}
