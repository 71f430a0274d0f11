use std::env;

/// Process-wide settings resolved from the environment.
///
/// Built once at startup and shared read-only (usually behind an `Arc`).
/// Resolution never fails: a variable that is unset everywhere in its
/// fallback chain resolves to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    pub database_url: String,
    pub is_production: bool,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
    pub forge_api_url: String,
    pub forge_api_key: String,
}

const PRODUCTION: &str = "production";

/// Returns the value of the first key that `lookup` knows about, or `""`.
///
/// A key set to the empty string is still "defined" and ends the chain.
pub fn first_defined<F>(lookup: F, keys: &[&str]) -> String
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().copied().find_map(lookup).unwrap_or_default()
}

impl Env {
    /// Resolve every field from an arbitrary variable source.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database_url: first_defined(&lookup, &["DATABASE_URL"]),
            is_production: lookup("NODE_ENV").as_deref() == Some(PRODUCTION),
            supabase_url: first_defined(&lookup, &["SUPABASE_URL", "VITE_SUPABASE_URL"]),
            supabase_anon_key: first_defined(
                &lookup,
                &["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"],
            ),
            supabase_service_key: first_defined(
                &lookup,
                &["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_SERVICE_KEY"],
            ),
            forge_api_url: first_defined(&lookup, &["BUILT_IN_FORGE_API_URL"]),
            forge_api_key: first_defined(&lookup, &["BUILT_IN_FORGE_API_KEY"]),
        }
    }

    /// Snapshot of the current process environment. Non-unicode values count as unset.
    pub fn from_env() -> Self {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Names of the string settings that resolved to nothing.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("database_url", &self.database_url),
            ("supabase_url", &self.supabase_url),
            ("supabase_anon_key", &self.supabase_anon_key),
            ("supabase_service_key", &self.supabase_service_key),
            ("forge_api_url", &self.forge_api_url),
            ("forge_api_key", &self.forge_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn forge_enabled(&self) -> bool {
        !self.forge_api_url.is_empty() && !self.forge_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> Env {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Env::resolve(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_resolves_to_defaults() {
        let env = env_of(&[]);
        assert_eq!(env, Env::default());
        assert!(!env.is_production);
        assert_eq!(env.missing().len(), 6);
    }

    #[test]
    fn secondary_variable_used_when_primary_unset() {
        let env = env_of(&[("VITE_SUPABASE_URL", "https://x")]);
        assert_eq!(env.supabase_url, "https://x");
    }

    #[test]
    fn primary_variable_wins_over_secondary() {
        let env = env_of(&[
            ("SUPABASE_ANON_KEY", "primary"),
            ("VITE_SUPABASE_ANON_KEY", "secondary"),
            ("SUPABASE_SERVICE_ROLE_KEY", "role"),
            ("SUPABASE_SERVICE_KEY", "legacy"),
        ]);
        assert_eq!(env.supabase_anon_key, "primary");
        assert_eq!(env.supabase_service_key, "role");
    }

    #[test]
    fn empty_primary_stops_the_chain() {
        let env = env_of(&[("SUPABASE_URL", ""), ("VITE_SUPABASE_URL", "https://x")]);
        assert_eq!(env.supabase_url, "");
    }

    #[test]
    fn every_fallback_chain_combination() {
        let chains: [(&str, &str, fn(&Env) -> &str); 3] = [
            ("SUPABASE_URL", "VITE_SUPABASE_URL", |e| e.supabase_url.as_str()),
            ("SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY", |e| {
                e.supabase_anon_key.as_str()
            }),
            ("SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_SERVICE_KEY", |e| {
                e.supabase_service_key.as_str()
            }),
        ];

        for (primary, secondary, field) in chains {
            for (set_primary, set_secondary) in
                [(false, false), (true, false), (false, true), (true, true)]
            {
                let mut pairs = Vec::new();
                if set_primary {
                    pairs.push((primary, "a"));
                }
                if set_secondary {
                    pairs.push((secondary, "b"));
                }
                let expected = match (set_primary, set_secondary) {
                    (true, _) => "a",
                    (false, true) => "b",
                    (false, false) => "",
                };
                assert_eq!(field(&env_of(&pairs)), expected, "{primary}/{secondary}");
            }
        }
    }

    #[test]
    fn single_source_fields() {
        let env = env_of(&[
            ("DATABASE_URL", "postgres://localhost/hub"),
            ("BUILT_IN_FORGE_API_URL", "https://forge"),
            ("BUILT_IN_FORGE_API_KEY", "k"),
        ]);
        assert_eq!(env.database_url, "postgres://localhost/hub");
        assert_eq!(env.forge_api_url, "https://forge");
        assert_eq!(env.forge_api_key, "k");
        assert!(env.forge_enabled());
    }

    #[test]
    fn production_requires_exact_marker() {
        assert!(env_of(&[("NODE_ENV", "production")]).is_production);
        for value in ["prod", "", "PRODUCTION", "production ", "development"] {
            assert!(!env_of(&[("NODE_ENV", value)]).is_production, "{value:?}");
        }
        assert!(!env_of(&[]).is_production);
    }

    #[test]
    fn supabase_configured_needs_url_and_key() {
        assert!(!env_of(&[("SUPABASE_URL", "https://x")]).supabase_configured());
        assert!(
            env_of(&[("SUPABASE_URL", "https://x"), ("SUPABASE_ANON_KEY", "anon")])
                .supabase_configured()
        );
    }

    #[test]
    fn first_defined_respects_order() {
        let lookup = |key: &str| match key {
            "B" => Some("second".to_string()),
            "C" => Some("third".to_string()),
            _ => None,
        };
        assert_eq!(first_defined(lookup, &["A", "B", "C"]), "second");
        assert_eq!(first_defined(lookup, &["A"]), "");
    }
}
