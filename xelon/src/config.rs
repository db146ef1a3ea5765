//! Provider configuration with environment fallbacks

use std::time::Duration;
use tfretry::retry::{DEFAULT_DELAY, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use tfretry::StateChangeConf;

pub const DEFAULT_BASE_URL: &str = "https://hq.xelon.ch/api/service/";

pub const ENV_BASE_URL: &str = "XELON_BASE_URL";
pub const ENV_TOKEN: &str = "XELON_TOKEN";
pub const ENV_CLIENT_ID: &str = "XELON_CLIENT_ID";
pub const ENV_INSECURE: &str = "XELON_INSECURE";
pub const ENV_WAIT_TIMEOUT: &str = "XELON_WAIT_TIMEOUT";
pub const ENV_WAIT_POLL_INTERVAL: &str = "XELON_WAIT_POLL_INTERVAL";

pub fn user_agent() -> String {
    format!(
        "terraform-provider-xelon/{} (+https://registry.terraform.io/providers/Xelon-AG/xelon)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Provider block as written by the practitioner; unset fields fall back to env
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub client_id: Option<String>,
    pub insecure: Option<bool>,
    pub wait: Option<WaitSettings>,
}

/// Timing shared by every state wait the provider runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub delay: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            delay: DEFAULT_DELAY,
        }
    }
}

impl WaitSettings {
    /// Defaults, overridden by XELON_WAIT_TIMEOUT / XELON_WAIT_POLL_INTERVAL (seconds)
    pub fn from_env() -> Result<Self, String> {
        let mut settings = Self::default();
        if let Some(secs) = env_secs(ENV_WAIT_TIMEOUT)? {
            settings.timeout = secs;
        }
        if let Some(secs) = env_secs(ENV_WAIT_POLL_INTERVAL)? {
            settings.poll_interval = secs;
        }
        Ok(settings)
    }

    /// Timings the waiter accepts: a non-zero poll interval below the timeout
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("wait poll interval must be greater than zero".to_string());
        }
        if self.timeout <= self.poll_interval {
            return Err(format!(
                "wait timeout ({:?}) must be greater than poll interval ({:?})",
                self.timeout, self.poll_interval
            ));
        }
        Ok(())
    }

    /// A waiter configuration carrying these timings
    pub fn conf<S, E>(
        &self,
        pending: impl IntoIterator<Item = S>,
        target: impl IntoIterator<Item = S>,
    ) -> StateChangeConf<S, E>
    where
        S: PartialEq + std::fmt::Display,
    {
        StateChangeConf::new(pending, target)
            .timeout(self.timeout)
            .poll_interval(self.poll_interval)
            .delay(self.delay)
    }
}

fn env_bool(name: &str) -> Result<Option<bool>, String> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(format!("{} must be a boolean, got '{}'", name, other)),
        },
        _ => Ok(None),
    }
}

fn env_secs(name: &str) -> Result<Option<Duration>, String> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| format!("{} must be a number of seconds: {}", name, e)),
        _ => Ok(None),
    }
}

/// Fully resolved configuration used to build the API client
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub token: String,
    pub client_id: Option<String>,
    pub insecure: bool,
    pub wait: WaitSettings,
}

impl ProviderConfig {
    /// Merge with environment variables, explicit values winning.
    ///
    /// Returns every problem found so they can all be reported at once.
    pub fn resolve(self) -> Result<ResolvedConfig, Vec<String>> {
        let mut problems = Vec::new();

        let base_url = self
            .base_url
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(ENV_BASE_URL).ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = self
            .token
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(ENV_TOKEN).ok().filter(|s| !s.is_empty()));
        if token.is_none() {
            problems.push(format!(
                "token must be set (in provider config or {} env var)",
                ENV_TOKEN
            ));
        }

        let client_id = self
            .client_id
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(ENV_CLIENT_ID).ok().filter(|s| !s.is_empty()));

        let insecure = match self.insecure {
            Some(insecure) => insecure,
            None => match env_bool(ENV_INSECURE) {
                Ok(insecure) => insecure.unwrap_or(false),
                Err(e) => {
                    problems.push(e);
                    false
                }
            },
        };

        let wait = match self.wait.map_or_else(WaitSettings::from_env, Ok) {
            Ok(wait) => match wait.validate() {
                Ok(()) => Some(wait),
                Err(e) => {
                    problems.push(e);
                    None
                }
            },
            Err(e) => {
                problems.push(e);
                None
            }
        };

        match (token, wait) {
            (Some(token), Some(wait)) if problems.is_empty() => Ok(ResolvedConfig {
                base_url,
                token,
                client_id,
                insecure,
                wait,
            }),
            _ => Err(problems),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            ENV_BASE_URL,
            ENV_TOKEN,
            ENV_CLIENT_ID,
            ENV_INSECURE,
            ENV_WAIT_TIMEOUT,
            ENV_WAIT_POLL_INTERVAL,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn wait_defaults() {
        let wait = WaitSettings::default();
        assert_eq!(wait.timeout, Duration::from_secs(600));
        assert_eq!(wait.poll_interval, Duration::from_secs(5));
        assert_eq!(wait.delay, Duration::from_secs(3));
    }

    #[test]
    fn user_agent_names_provider() {
        let ua = user_agent();
        assert!(ua.starts_with("terraform-provider-xelon/"));
        assert!(ua.ends_with("(+https://registry.terraform.io/providers/Xelon-AG/xelon)"));
    }

    #[test]
    #[serial]
    fn resolves_from_env() {
        clear_env();
        std::env::set_var(ENV_TOKEN, "env-token");
        std::env::set_var(ENV_CLIENT_ID, "org-1");
        std::env::set_var(ENV_INSECURE, "true");
        std::env::set_var(ENV_WAIT_TIMEOUT, "1200");

        let resolved = ProviderConfig::default().resolve().unwrap();
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.token, "env-token");
        assert_eq!(resolved.client_id.as_deref(), Some("org-1"));
        assert!(resolved.insecure);
        assert_eq!(resolved.wait.timeout, Duration::from_secs(1200));
        assert_eq!(resolved.wait.poll_interval, Duration::from_secs(5));

        clear_env();
    }

    #[test]
    #[serial]
    fn explicit_values_win_over_env() {
        clear_env();
        std::env::set_var(ENV_TOKEN, "env-token");
        std::env::set_var(ENV_BASE_URL, "https://env.example.com/api/");

        let resolved = ProviderConfig {
            base_url: Some("https://explicit.example.com/api/".into()),
            token: Some("explicit-token".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(resolved.base_url, "https://explicit.example.com/api/");
        assert_eq!(resolved.token, "explicit-token");
        assert!(resolved.client_id.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn missing_token_is_reported() {
        clear_env();

        let problems = ProviderConfig::default().resolve().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("token must be set"));
    }

    #[test]
    #[serial]
    fn bad_wait_timeout_is_reported_with_missing_token() {
        clear_env();
        std::env::set_var(ENV_WAIT_TIMEOUT, "ten minutes");

        let problems = ProviderConfig::default().resolve().unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[1].contains(ENV_WAIT_TIMEOUT));

        clear_env();
    }

    #[test]
    #[serial]
    fn timeout_not_above_poll_interval_is_reported() {
        clear_env();
        std::env::set_var(ENV_WAIT_TIMEOUT, "3");

        let problems = ProviderConfig {
            token: Some("secret".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("must be greater than poll interval"), "{}", problems[0]);

        let problems = ProviderConfig {
            token: Some("secret".into()),
            wait: Some(WaitSettings {
                timeout: Duration::from_secs(3),
                poll_interval: Duration::from_secs(5),
                delay: Duration::ZERO,
            }),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert_eq!(problems.len(), 1);

        clear_env();
    }

    #[test]
    #[serial]
    fn zero_poll_interval_is_reported() {
        clear_env();
        std::env::set_var(ENV_WAIT_POLL_INTERVAL, "0");

        let problems = ProviderConfig {
            token: Some("secret".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("poll interval must be greater than zero"));

        clear_env();
    }

    #[test]
    #[serial]
    fn insecure_accepts_common_spellings() {
        clear_env();
        std::env::set_var(ENV_TOKEN, "secret");

        for (raw, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("no", false)] {
            std::env::set_var(ENV_INSECURE, raw);
            let resolved = ProviderConfig::default().resolve().unwrap();
            assert_eq!(resolved.insecure, expected, "{}", raw);
        }

        std::env::set_var(ENV_INSECURE, "maybe");
        let problems = ProviderConfig::default().resolve().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains(ENV_INSECURE));

        clear_env();
    }
}
