//! Contact Submission Pipeline
//!
//! rate limit -> honeypot -> schema validation -> CAPTCHA -> forward to CMS
//!
//! The CMS stores the message and sends the notification e-mail from its
//! lifecycle hook. Submissions are only ever logged with PII redacted.

pub mod captcha;
pub mod rate_limit;
pub mod validation;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::content::{ContentError, ContentSource};
use crate::sections::contact_form::HONEYPOT_FIELD;
use crate::telemetry::redact;
use captcha::{CaptchaError, TokenVerifier};
use rate_limit::{FixedWindowLimiter, RateDecision};
use validation::{field_text, is_checked, ContactFormSchema, FieldViolation};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("Validation failed for {} field(s)", .0.len())]
    Invalid(Vec<FieldViolation>),

    #[error("CAPTCHA verification failed")]
    CaptchaFailed,

    #[error(transparent)]
    CaptchaUnavailable(#[from] CaptchaError),

    #[error("Submission could not be forwarded: {0}")]
    Upstream(#[from] ContentError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Forwarded to the CMS
    Accepted,
    /// Honeypot filled: reported as success, silently dropped
    Discarded,
}

/// Raw submission, from either a JSON body or a form post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRequest {
    pub fields: Map<String, Value>,
}

/// Keys a CAPTCHA token may arrive under.
const CAPTCHA_TOKEN_KEYS: &[&str] = &["captchaToken", "captcha_token", "h-captcha-response", "cf-turnstile-response"];

impl ContactRequest {
    pub fn from_json(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn from_form(form: HashMap<String, String>) -> Self {
        let fields = form.into_iter().map(|(key, value)| (key, Value::String(value))).collect();
        Self { fields }
    }

    pub fn captcha_token(&self) -> Option<&str> {
        CAPTCHA_TOKEN_KEYS
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|token| !token.is_empty())
    }

    pub fn honeypot_filled(&self) -> bool {
        !field_text(self.fields.get(HONEYPOT_FIELD)).is_empty()
    }
}

/// What the CMS `contact-messages` collection receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub consent: bool,
    pub source_page: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Build from already-validated fields.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let optional = |key: &str| Some(field_text(fields.get(key))).filter(|s| !s.is_empty());
        Self {
            name: field_text(fields.get("name")),
            email: field_text(fields.get("email")),
            phone: optional("phone"),
            subject: optional("subject"),
            message: field_text(fields.get("message")),
            consent: is_checked(fields.get("consent")),
            source_page: optional("sourcePage"),
            submitted_at: Utc::now(),
        }
    }
}

pub struct ContactPipeline {
    content: Arc<dyn ContentSource>,
    limiter: FixedWindowLimiter,
    captcha: Option<Arc<dyn TokenVerifier>>,
}

impl ContactPipeline {
    pub fn new(
        content: Arc<dyn ContentSource>,
        limiter: FixedWindowLimiter,
        captcha: Option<Arc<dyn TokenVerifier>>,
    ) -> Self {
        Self { content, limiter, captcha }
    }

    /// Current form schema: defaults plus CMS overrides. Falls back to
    /// defaults when site config is unavailable.
    pub async fn schema(&self) -> ContactFormSchema {
        match self.content.get_site_config().await {
            Ok(Some(site)) => match site.contact_form {
                Some(settings) => ContactFormSchema::with_overrides(&settings.fields),
                None => ContactFormSchema::default(),
            },
            Ok(None) => ContactFormSchema::default(),
            Err(e) => {
                tracing::warn!("Site config unavailable, using default contact schema: {}", e);
                ContactFormSchema::default()
            }
        }
    }

    pub async fn submit(&self, client_ip: &str, request: ContactRequest) -> Result<SubmitOutcome, ContactError> {
        if let RateDecision::Limited { retry_after } = self.limiter.check(client_ip).await {
            return Err(ContactError::RateLimited { retry_after });
        }

        if request.honeypot_filled() {
            tracing::info!("Discarding contact submission with filled honeypot from {}", client_ip);
            return Ok(SubmitOutcome::Discarded);
        }

        let schema = self.schema().await;
        schema.validate(&request.fields).map_err(ContactError::Invalid)?;

        if let Some(verifier) = &self.captcha {
            let token = request.captcha_token().ok_or(ContactError::CaptchaFailed)?;
            let remote_ip = Some(client_ip).filter(|ip| *ip != "unknown");
            if !verifier.verify(token, remote_ip).await? {
                return Err(ContactError::CaptchaFailed);
            }
        }

        let submission = ContactSubmission::from_fields(&request.fields);
        let logged = serde_json::to_value(&submission).map(|v| redact(&v)).unwrap_or_default();

        if let Err(e) = self.content.submit_contact(&submission).await {
            tracing::error!(submission = %logged, "Failed to forward contact submission: {}", e);
            return Err(ContactError::Upstream(e));
        }

        tracing::info!(submission = %logged, "Contact submission forwarded");
        Ok(SubmitOutcome::Accepted)
    }
}
