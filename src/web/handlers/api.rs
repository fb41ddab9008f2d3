// JSON API handlers and the generated theme stylesheet

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::content::SiteConfig;
use crate::error::AppError;
use crate::theme::theme_css as render_theme_css;
use crate::web::AppState;

/// Core Web Vitals (and friends) reported by the `web-vitals` browser library.
pub const WEB_VITALS: &[&str] = &["CLS", "FCP", "FID", "INP", "LCP", "TTFB"];

const RATINGS: &[&str] = &["good", "needs-improvement", "poor"];

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let cms = match state.content.get_site_config().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check: CMS unreachable: {}", e);
            "degraded"
        }
    };

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": (chrono::Utc::now() - state.started_at).num_seconds(),
        "cms": cms
    }))
}

#[derive(Debug, Deserialize)]
pub struct WebVital {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

pub async fn ingest_metric(Json(metric): Json<WebVital>) -> Result<StatusCode, AppError> {
    if !WEB_VITALS.contains(&metric.name.as_str()) {
        return Err(AppError::BadRequest(format!("unknown metric: {}", metric.name)));
    }
    if !metric.value.is_finite() || metric.value < 0.0 {
        return Err(AppError::BadRequest("metric value must be a finite, non-negative number".to_string()));
    }
    if let Some(rating) = metric.rating.as_deref() {
        if !RATINGS.contains(&rating) {
            return Err(AppError::BadRequest(format!("unknown rating: {}", rating)));
        }
    }

    tracing::info!(
        metric = %metric.name,
        value = metric.value,
        rating = metric.rating.as_deref().unwrap_or("-"),
        path = metric.path.as_deref().unwrap_or("-"),
        id = metric.id.as_deref().unwrap_or("-"),
        "Web vital reported"
    );
    Ok(StatusCode::ACCEPTED)
}

pub async fn site_config(State(state): State<AppState>) -> Result<Json<SiteConfig>, AppError> {
    match state.content.get_site_config().await {
        Ok(Some(site)) => Ok(Json(site)),
        Ok(None) => Err(AppError::Unavailable("site_config_unavailable".to_string())),
        Err(e) => {
            tracing::error!("Failed to fetch site config: {}", e);
            Err(AppError::Unavailable("site_config_unavailable".to_string()))
        }
    }
}

/// Public CAPTCHA settings for client-side widgets. Never includes the secret.
pub async fn captcha_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(match &state.captcha {
        Some(captcha) => serde_json::json!({
            "enabled": true,
            "provider": captcha.provider,
            "site_key": captcha.site_key
        }),
        None => serde_json::json!({
            "enabled": false,
            "provider": null,
            "site_key": null
        }),
    })
}

pub async fn theme_css(State(state): State<AppState>) -> impl IntoResponse {
    let site = state.assembler.site().await;
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        render_theme_css(site.theme.as_ref()),
    )
}
