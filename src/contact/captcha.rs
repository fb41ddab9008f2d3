//! CAPTCHA verification (hCaptcha or Cloudflare Turnstile).
//!
//! Both providers share the same siteverify contract: form POST of
//! `secret`, `response`, `remoteip`, answered with `{ "success": bool }`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::sections::CaptchaWidget;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("CAPTCHA provider unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CAPTCHA provider responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    HCaptcha,
    Turnstile,
}

impl CaptchaProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hcaptcha" => Some(CaptchaProvider::HCaptcha),
            "turnstile" => Some(CaptchaProvider::Turnstile),
            _ => None,
        }
    }

    pub fn verify_url(&self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "https://api.hcaptcha.com/siteverify",
            CaptchaProvider::Turnstile => "https://challenges.cloudflare.com/turnstile/v0/siteverify",
        }
    }

    pub fn script_url(&self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "https://js.hcaptcha.com/1/api.js",
            CaptchaProvider::Turnstile => "https://challenges.cloudflare.com/turnstile/v0/api.js",
        }
    }

    pub fn widget_class(&self) -> &'static str {
        match self {
            CaptchaProvider::HCaptcha => "h-captcha",
            CaptchaProvider::Turnstile => "cf-turnstile",
        }
    }

    pub fn widget(&self, site_key: &str) -> CaptchaWidget {
        CaptchaWidget {
            script_url: self.script_url().to_string(),
            widget_class: self.widget_class().to_string(),
            site_key: site_key.to_string(),
        }
    }
}

/// Verifies a CAPTCHA token. Tests substitute a fake.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

pub struct CaptchaVerifier {
    http: reqwest::Client,
    provider: CaptchaProvider,
    secret: String,
}

impl CaptchaVerifier {
    pub fn new(provider: CaptchaProvider, secret: &str) -> Result<Self, CaptchaError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self {
            http,
            provider,
            secret: secret.to_string(),
        })
    }
}

#[async_trait]
impl TokenVerifier for CaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self.http.post(self.provider.verify_url()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptchaError::Status(status.as_u16()));
        }

        let result: SiteVerifyResponse = response.json().await?;
        if !result.success {
            tracing::info!("CAPTCHA rejected: {:?}", result.error_codes);
        }
        Ok(result.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!(CaptchaProvider::parse("hCaptcha"), Some(CaptchaProvider::HCaptcha));
        assert_eq!(CaptchaProvider::parse(" turnstile "), Some(CaptchaProvider::Turnstile));
        assert_eq!(CaptchaProvider::parse("recaptcha"), None);
    }

    #[test]
    fn test_widget_for_provider() {
        let widget = CaptchaProvider::Turnstile.widget("0x4AAA");
        assert_eq!(widget.widget_class, "cf-turnstile");
        assert_eq!(widget.site_key, "0x4AAA");
        assert!(widget.script_url.starts_with("https://challenges.cloudflare.com/"));
    }

    #[test]
    fn test_siteverify_decoding() {
        let ok: SiteVerifyResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(ok.success);

        let rejected: SiteVerifyResponse =
            serde_json::from_str(r#"{"success": false, "error-codes": ["invalid-input-response"]}"#).unwrap();
        assert!(!rejected.success);
        assert_eq!(rejected.error_codes, vec!["invalid-input-response"]);
    }
}
