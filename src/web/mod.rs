//! HTTP surface: application state, router and middleware.

pub mod handlers;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::assembler::PageAssembler;
use crate::config::Config;
use crate::contact::captcha::{CaptchaProvider, CaptchaVerifier, TokenVerifier};
use crate::contact::rate_limit::{CounterStore, FixedWindowLimiter, MemoryCounterStore, RedisCounterStore};
use crate::contact::ContactPipeline;
use crate::content::{CmsClient, ContentSource};
use crate::sections::contact_form::CONTACT_ACTION;
use crate::sections::{RenderContext, SectionRegistry};
use handlers::{api, contact, pages};

/// Key prefix for contact rate-limit counters.
const RATE_LIMIT_PREFIX: &str = "ratelimit:contact";

/// Browser-visible half of the CAPTCHA settings.
#[derive(Debug, Clone)]
pub struct CaptchaPublic {
    pub provider: CaptchaProvider,
    pub site_key: String,
}

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<PageAssembler>,
    pub content: Arc<dyn ContentSource>,
    pub contact: Arc<ContactPipeline>,
    pub captcha: Option<CaptchaPublic>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Production wiring: Strapi client, Redis (or in-process) counters and
    /// the configured CAPTCHA provider.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        tracing::info!("Initializing CMS client...");
        let content: Arc<dyn ContentSource> = Arc::new(CmsClient::new(
            &config.cms_url,
            config.cms_api_token.clone(),
            config.cms_timeout,
        )?);

        tracing::info!("Initializing rate limit store...");
        let store: Arc<dyn CounterStore> = match &config.redis_url {
            Some(url) => match RedisCounterStore::connect(url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::warn!("Redis unavailable ({}), falling back to in-memory rate limiting", e);
                    Arc::new(MemoryCounterStore::new(config.rate_limit_window))
                }
            },
            None => Arc::new(MemoryCounterStore::new(config.rate_limit_window)),
        };

        let verifier: Option<Arc<dyn TokenVerifier>> = match &config.captcha {
            Some(settings) => {
                tracing::info!("Initializing {:?} verifier...", settings.provider);
                Some(Arc::new(CaptchaVerifier::new(settings.provider, &settings.secret)?))
            }
            None => None,
        };

        Ok(Self::from_parts(config, content, store, verifier))
    }

    /// Assemble state from ready-made collaborators.
    pub fn from_parts(
        config: &Config,
        content: Arc<dyn ContentSource>,
        store: Arc<dyn CounterStore>,
        verifier: Option<Arc<dyn TokenVerifier>>,
    ) -> Self {
        let captcha = config.captcha.as_ref().map(|settings| CaptchaPublic {
            provider: settings.provider,
            site_key: settings.site_key.clone(),
        });

        let base_context = RenderContext {
            media_base: config.cms_url.trim_end_matches('/').to_string(),
            contact_action: CONTACT_ACTION.to_string(),
            captcha: captcha.as_ref().map(|c| c.provider.widget(&c.site_key)),
            ..Default::default()
        };

        let registry = Arc::new(SectionRegistry::with_defaults());
        tracing::info!("Registered {} section renderers: {}", registry.len(), registry.tags().join(", "));

        let assembler = Arc::new(PageAssembler::new(content.clone(), registry, base_context, &config.site_url));

        let limiter = FixedWindowLimiter::new(store, RATE_LIMIT_PREFIX, config.rate_limit_max, config.rate_limit_window);
        tracing::info!(
            "Contact rate limit: {} submissions per {}s",
            limiter.max_requests(),
            config.rate_limit_window.as_secs()
        );
        let contact = Arc::new(ContactPipeline::new(content.clone(), limiter, verifier));

        Self {
            assembler,
            content,
            contact,
            captcha,
            started_at: chrono::Utc::now(),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(api::health_check))
        .route("/metrics", post(api::ingest_metric))
        .route("/site-config", get(api::site_config))
        .route("/captcha-config", get(api::captcha_config))
        .route("/contact", post(contact::submit_json))
        .layer(cors_layer(state.assembler.site_url()));

    Router::new()
        .route("/", get(pages::home_page))
        .route("/faq", get(pages::faq_page))
        .route("/faq/:category", get(pages::faq_category_page))
        .route("/contact/submit", post(contact::submit_form))
        .route("/static/theme.css", get(api::theme_css))
        .route("/:slug", get(pages::content_page))
        .nest("/api", api)
        .fallback(pages::not_found_page)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

/// Only the site's own origin may call the JSON API from a browser.
fn cors_layer(site_url: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    match HeaderValue::from_str(site_url) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            tracing::warn!("SITE_URL {:?} is not a valid origin ({}), CORS disabled", site_url, e);
            base
        }
    }
}
