//! Runtime configuration from environment variables.
//!
//! Every value has a development default; invalid values log a warning and
//! fall back to the default instead of aborting start-up.

use std::{env, fmt::Display, str::FromStr, time::Duration};

use crate::contact::captcha::CaptchaProvider;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cms_url: String,
    pub cms_api_token: Option<String>,
    pub cms_timeout: Duration,
    pub site_url: String,
    pub redis_url: Option<String>,
    pub rate_limit_max: u64,
    pub rate_limit_window: Duration,
    pub captcha: Option<CaptchaSettings>,
}

#[derive(Debug, Clone)]
pub struct CaptchaSettings {
    pub provider: CaptchaProvider,
    pub site_key: String,
    pub secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = var("CAPTCHA_PROVIDER")
            .map(|name| {
                CaptchaProvider::parse(&name).unwrap_or_else(|| {
                    tracing::warn!("Unknown CAPTCHA_PROVIDER {}, using hcaptcha", name);
                    CaptchaProvider::HCaptcha
                })
            })
            .unwrap_or(CaptchaProvider::HCaptcha);

        let captcha = match (var("CAPTCHA_SITE_KEY"), var("CAPTCHA_SECRET")) {
            (Some(site_key), Some(secret)) => Some(CaptchaSettings { provider, site_key, secret }),
            _ => None,
        };

        Self {
            port: parse_or(&var, "PORT", 3000),
            cms_url: var("CMS_URL").unwrap_or_else(|| "http://localhost:1337".to_string()),
            cms_api_token: var("CMS_API_TOKEN"),
            cms_timeout: Duration::from_millis(parse_or(&var, "CMS_TIMEOUT_MS", 5000)),
            site_url: var("SITE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            redis_url: var("REDIS_URL"),
            rate_limit_max: parse_or(&var, "RATE_LIMIT_MAX", 5),
            rate_limit_window: Duration::from_secs(parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 3600)),
            captcha,
        }
    }

    /// Log the effective configuration. Secrets are reported as set/unset only.
    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  PORT: {}", self.port);
        tracing::info!("  CMS_URL: {}", self.cms_url);
        tracing::info!("  CMS_API_TOKEN: {}", if self.cms_api_token.is_some() { "set" } else { "unset" });
        tracing::info!("  CMS_TIMEOUT_MS: {}", self.cms_timeout.as_millis());
        tracing::info!("  SITE_URL: {}", self.site_url);
        tracing::info!("  REDIS_URL: {}", if self.redis_url.is_some() { "set" } else { "unset (in-memory rate limit)" });
        tracing::info!("  RATE_LIMIT: {} per {}s", self.rate_limit_max, self.rate_limit_window.as_secs());
        match &self.captcha {
            Some(captcha) => tracing::info!("  CAPTCHA: {:?}", captcha.provider),
            None => tracing::info!("  CAPTCHA: disabled"),
        }
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {} value {:?} ({}), using default: {}", key, raw, e, default);
            default
        }),
        None => default,
    }
}
