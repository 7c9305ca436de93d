pub mod analysis;
pub mod conversation;
pub mod dataset;
pub mod domain;
pub mod llm;

pub mod config {
    use anyhow::Context;

    const DEFAULT_SUMMARY_REPAIR_ATTEMPTS: u32 = 1;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub anthropic_api_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub llm_provider: Option<String>,
        pub sentry_dsn: Option<String>,
        pub dataset_path: Option<String>,
        pub summary_repair_attempts: u32,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let var = |key: &str| non_empty(lookup(key));
            Ok(Self {
                anthropic_api_key: var("ANTHROPIC_API_KEY"),
                openai_api_key: var("OPENAI_API_KEY"),
                llm_provider: var("LLM_PROVIDER"),
                sentry_dsn: var("SENTRY_DSN"),
                dataset_path: var("BIZCHAT_DATASET"),
                summary_repair_attempts: match var("SUMMARY_REPAIR_ATTEMPTS") {
                    Some(s) => s
                        .parse::<u32>()
                        .with_context(|| format!("SUMMARY_REPAIR_ATTEMPTS must be a non-negative integer (got {s:?})"))?,
                    None => DEFAULT_SUMMARY_REPAIR_ATTEMPTS,
                },
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let vars: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| vars.get(key).cloned())
        }

        #[test]
        fn blank_values_count_as_unset() {
            let s = settings(&[("ANTHROPIC_API_KEY", "   "), ("LLM_PROVIDER", " openai ")]).unwrap();
            assert_eq!(s.anthropic_api_key, None);
            assert_eq!(s.llm_provider.as_deref(), Some("openai"));
            assert_eq!(s.summary_repair_attempts, DEFAULT_SUMMARY_REPAIR_ATTEMPTS);
            assert!(s.require_anthropic_api_key().is_err());
        }

        #[test]
        fn repair_attempts_must_be_an_integer() {
            assert_eq!(
                settings(&[("SUMMARY_REPAIR_ATTEMPTS", "3")]).unwrap().summary_repair_attempts,
                3
            );
            let err = settings(&[("SUMMARY_REPAIR_ATTEMPTS", "two")]).unwrap_err();
            assert!(err.to_string().contains("SUMMARY_REPAIR_ATTEMPTS"));
            assert!(settings(&[("SUMMARY_REPAIR_ATTEMPTS", "-1")]).is_err());
        }
    }
}
