// Router integration tests
//
// Drives the full router with an in-process CMS fake.
// Run with: cargo test --test site_routes

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use second_opinion_site::contact::captcha::{CaptchaError, TokenVerifier};
use second_opinion_site::contact::rate_limit::MemoryCounterStore;
use second_opinion_site::contact::ContactSubmission;
use second_opinion_site::content::{ContentError, ContentSource, FaqCategory, FaqItem, Page, SiteConfig};
use second_opinion_site::{create_router, AppState, Config};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for oneshot

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeCms {
    pages: HashMap<String, Page>,
    site: Option<SiteConfig>,
    categories: Vec<FaqCategory>,
    items: Vec<FaqItem>,
    /// Every call fails as if the CMS were unreachable
    down: bool,
    /// Only the FAQ list endpoints fail
    faq_lists_down: bool,
    reject_submissions: bool,
    submissions: Mutex<Vec<ContactSubmission>>,
}

impl FakeCms {
    fn with_page(mut self, page: Value) -> Self {
        let page: Page = serde_json::from_value(page).unwrap();
        self.pages.insert(page.slug.clone(), page);
        self
    }

    fn submitted(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), ContentError> {
        if self.down {
            Err(ContentError::Status(503))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentSource for FakeCms {
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ContentError> {
        self.check()?;
        Ok(self.pages.get(slug).cloned())
    }

    async fn get_faq_categories(&self) -> Result<Vec<FaqCategory>, ContentError> {
        self.check()?;
        if self.faq_lists_down {
            return Err(ContentError::Status(500));
        }
        Ok(self.categories.clone())
    }

    async fn get_faq_items(&self, category: Option<&str>) -> Result<Vec<FaqItem>, ContentError> {
        self.check()?;
        if self.faq_lists_down {
            return Err(ContentError::Status(500));
        }
        Ok(self
            .items
            .iter()
            .filter(|item| category.is_none() || item.category_slug() == category)
            .cloned()
            .collect())
    }

    async fn get_site_config(&self) -> Result<Option<SiteConfig>, ContentError> {
        self.check()?;
        Ok(self.site.clone())
    }

    async fn submit_contact(&self, submission: &ContactSubmission) -> Result<(), ContentError> {
        self.check()?;
        if self.reject_submissions {
            return Err(ContentError::Status(500));
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

struct FixedVerifier(Result<bool, u16>);

#[async_trait]
impl TokenVerifier for FixedVerifier {
    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        self.0.map_err(CaptchaError::Status)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_config(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| map.get(key).cloned())
}

fn create_test_app(cms: Arc<FakeCms>, pairs: &[(&str, &str)], verifier: Option<Arc<dyn TokenVerifier>>) -> Router {
    let config = test_config(pairs);
    let store = Arc::new(MemoryCounterStore::new(config.rate_limit_window));
    let state = AppState::from_parts(&config, cms, store, verifier);
    create_router(state)
}

fn site() -> SiteConfig {
    serde_json::from_value(json!({
        "siteName": "Second Opinion",
        "defaultDescription": "Independent specialist reviews of your diagnosis.",
        "navigation": [{ "label": "How it works", "url": "/how-it-works" }]
    }))
    .unwrap()
}

fn home_page() -> Value {
    json!({
        "id": 1,
        "slug": "home",
        "title": "Home",
        "sections": [
            { "__component": "sections.hero", "id": 1, "title": "Get a second opinion" },
            { "__component": "sections.unknown-widget", "id": 2 },
            { "__component": "sections.rich-text", "id": 0, "body": "dropped" },
            { "__component": "sections.rich-text", "id": 3, "body": "Reviewed by **specialists**." }
        ]
    })
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
}

async fn json_response(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("Failed to parse JSON")
}

fn valid_contact() -> Value {
    json!({
        "name": "Ada Patient",
        "email": "ada@example.org",
        "subject": "second-opinion",
        "message": "I would like a review of my MRI results.",
        "consent": true
    })
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_home_renders_sections_in_order() {
    let cms = Arc::new(FakeCms { site: Some(site()), ..Default::default() }.with_page(home_page()));
    let response = get(create_test_app(cms, &[], None), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    let hero = html.find("Get a second opinion").expect("hero rendered");
    let placeholder = html.find("section-placeholder").expect("placeholder rendered");
    let rich_text = html.find("<strong>specialists</strong>").expect("rich text rendered");
    assert!(hero < placeholder && placeholder < rich_text);
    assert!(!html.contains("dropped"));
    assert!(html.contains("<title>Home | Second Opinion</title>"));
    assert!(html.contains("How it works"));
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let cms = Arc::new(FakeCms { site: Some(site()), ..Default::default() });
    let response = get(create_test_app(cms, &[], None), "/no-such-page").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page not found"));
    assert!(html.contains("noindex, nofollow"));
}

#[tokio::test]
async fn test_unreachable_cms_is_not_found() {
    let cms = Arc::new(FakeCms { down: true, ..Default::default() }.with_page(home_page()));
    let response = get(create_test_app(cms, &[], None), "/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

#[tokio::test]
async fn test_home_slug_redirects_to_root() {
    let cms = Arc::new(FakeCms::default().with_page(home_page()));
    let response = get(create_test_app(cms, &[], None), "/home").await;

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_non_slug_paths_are_not_found() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms, &[], None);

    assert_eq!(get(app.clone(), "/favicon.ico").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(app, "/deeply/nested/path").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_faq_page_groups_items() {
    let cms = FakeCms {
        site: Some(site()),
        categories: vec![serde_json::from_value(json!({ "id": 1, "name": "The process", "slug": "process" })).unwrap()],
        items: vec![
            serde_json::from_value(json!({
                "id": 1,
                "question": "How long does a review take?",
                "answer": "Usually *five* working days.",
                "category": { "slug": "process" }
            }))
            .unwrap(),
            serde_json::from_value(json!({ "id": 2, "question": "Is my data safe?", "answer": "Yes." })).unwrap(),
        ],
        ..Default::default()
    }
    .with_page(json!({ "id": 9, "slug": "faq", "title": "Frequently asked questions", "sections": [] }));

    let response = get(create_test_app(Arc::new(cms), &[], None), "/faq").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let process = html.find("The process").unwrap();
    let general = html.find("General").unwrap();
    assert!(process < general);
    assert!(html.contains("<em>five</em>"));
    assert!(html.contains("Is my data safe?"));
}

fn faq_cms() -> FakeCms {
    FakeCms {
        site: Some(site()),
        categories: vec![
            serde_json::from_value(json!({ "id": 1, "name": "The process", "slug": "process" })).unwrap(),
            serde_json::from_value(json!({ "id": 2, "name": "Costs", "slug": "costs" })).unwrap(),
        ],
        items: vec![
            serde_json::from_value(json!({
                "id": 1,
                "question": "How long does a review take?",
                "answer": "Five working days.",
                "category": { "slug": "process" }
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": 2,
                "question": "Is it covered by insurance?",
                "answer": "Sometimes.",
                "category": { "data": { "id": 2, "attributes": { "slug": "costs" } } }
            }))
            .unwrap(),
        ],
        ..Default::default()
    }
    .with_page(json!({
        "id": 9,
        "slug": "faq",
        "title": "Frequently asked questions",
        "sections": [{ "__component": "sections.rich-text", "id": 1, "body": "Answers from our **care team**." }]
    }))
}

#[tokio::test]
async fn test_faq_lists_failing_still_renders_page() {
    let cms = FakeCms { faq_lists_down: true, ..faq_cms() };
    let response = get(create_test_app(Arc::new(cms), &[], None), "/faq").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<strong>care team</strong>"));
    assert!(!html.contains("faq-group"));
}

#[tokio::test]
async fn test_faq_category_page() {
    let app = create_test_app(Arc::new(faq_cms()), &[], None);

    let response = get(app.clone(), "/faq/costs").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Is it covered by insurance?"));
    assert!(!html.contains("How long does a review take?"));
    assert!(html.contains("<title>Costs | Frequently asked questions | Second Opinion</title>"));
    assert!(html.contains("/faq/costs"));

    assert_eq!(get(app.clone(), "/faq/no-such-category").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(app, "/faq/Not.A.Slug").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_with_null_fields_renders() {
    let cms = FakeCms { site: Some(site()), ..Default::default() }.with_page(json!({
        "id": 5,
        "slug": "about",
        "title": null,
        "description": null,
        "seo": { "metaTitle": "About us", "noindex": null, "nofollow": null },
        "sections": null
    }));
    let response = get(create_test_app(Arc::new(cms), &[], None), "/about").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("About us"));
    assert!(!html.contains("noindex"));
}

#[tokio::test]
async fn test_theme_css() {
    let mut site = site();
    site.theme = serde_json::from_value(json!({ "primaryColor": "#123456" })).unwrap();
    let cms = Arc::new(FakeCms { site: Some(site), ..Default::default() });

    let response = get(create_test_app(cms, &[], None), "/static/theme.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/css"));
    assert!(body_text(response).await.contains("--color-primary: #123456;"));
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_health_reports_cms_state() {
    let healthy = create_test_app(Arc::new(FakeCms::default()), &[], None);
    let body = json_response(get(healthy, "/api/health").await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cms"], "ok");
    assert!(body["timestamp"].is_string());
    assert!(body["version"].is_string());

    let degraded = create_test_app(Arc::new(FakeCms { down: true, ..Default::default() }), &[], None);
    let response = get(degraded, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_response(response).await["cms"], "degraded");
}

#[tokio::test]
async fn test_site_config_unavailable() {
    let app = create_test_app(Arc::new(FakeCms { down: true, ..Default::default() }), &[], None);
    let response = get(app, "/api/site-config").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let app = create_test_app(Arc::new(FakeCms { site: Some(site()), ..Default::default() }), &[], None);
    let body = json_response(get(app, "/api/site-config").await).await;
    assert_eq!(body["siteName"], "Second Opinion");
}

#[tokio::test]
async fn test_captcha_config_never_exposes_secret() {
    let disabled = create_test_app(Arc::new(FakeCms::default()), &[], None);
    let body = json_response(get(disabled, "/api/captcha-config").await).await;
    assert_eq!(body["enabled"], false);

    let enabled = create_test_app(
        Arc::new(FakeCms::default()),
        &[
            ("CAPTCHA_PROVIDER", "turnstile"),
            ("CAPTCHA_SITE_KEY", "public-key"),
            ("CAPTCHA_SECRET", "very-secret"),
        ],
        None,
    );
    let response = get(enabled, "/api/captcha-config").await;
    let text = body_text(response).await;
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["enabled"], true);
    assert_eq!(body["provider"], "turnstile");
    assert_eq!(body["site_key"], "public-key");
    assert!(!text.contains("very-secret"));
}

#[tokio::test]
async fn test_metrics_ingest() {
    let app = create_test_app(Arc::new(FakeCms::default()), &[], None);

    let accepted = post_json(app.clone(), "/api/metrics", json!({ "name": "LCP", "value": 1830.5, "id": "v3-1", "rating": "good" })).await;
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);

    let unknown = post_json(app.clone(), "/api/metrics", json!({ "name": "XYZ", "value": 1.0 })).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let negative = post_json(app, "/api/metrics", json!({ "name": "CLS", "value": -0.1 })).await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Contact
// ============================================================================

#[tokio::test]
async fn test_contact_accepted_and_forwarded() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[], None);

    let response = post_json(app, "/api/contact", valid_contact()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_response(response).await, json!({ "ok": true }));
    assert_eq!(cms.submitted(), 1);
}

#[tokio::test]
async fn test_contact_validation_lists_every_field() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[], None);

    let response = post_json(app, "/api/contact", json!({ "name": "A", "email": "not-an-email" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_response(response).await;
    assert_eq!(body["error"], "validation_failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for expected in ["name", "email", "message", "consent"] {
        assert!(fields.contains(&expected), "missing violation for {}", expected);
    }
    assert_eq!(cms.submitted(), 0);
}

#[tokio::test]
async fn test_contact_honeypot_is_silently_dropped() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[], None);

    let mut body = valid_contact();
    body["website"] = json!("http://spam.example");
    let response = post_json(app, "/api/contact", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(cms.submitted(), 0);
}

#[tokio::test]
async fn test_contact_rate_limited() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[("RATE_LIMIT_MAX", "2")], None);

    for _ in 0..2 {
        let response = post_json(app.clone(), "/api/contact", valid_contact()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = post_json(app, "/api/contact", valid_contact()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = json_response(response).await;
    assert_eq!(body["error"], "rate_limited");
    assert!(body["retry_after"].as_u64().unwrap() >= 1);
    assert_eq!(cms.submitted(), 2);
}

#[tokio::test]
async fn test_contact_captcha() {
    let pairs = [("CAPTCHA_SITE_KEY", "site"), ("CAPTCHA_SECRET", "secret")];

    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &pairs, Some(Arc::new(FixedVerifier(Ok(true)))));
    let missing = post_json(app.clone(), "/api/contact", valid_contact()).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_response(missing).await["error"], "captcha_failed");

    let mut with_token = valid_contact();
    with_token["captchaToken"] = json!("token");
    assert_eq!(post_json(app, "/api/contact", with_token.clone()).await.status(), StatusCode::CREATED);

    let rejecting = create_test_app(cms.clone(), &pairs, Some(Arc::new(FixedVerifier(Ok(false)))));
    assert_eq!(post_json(rejecting, "/api/contact", with_token.clone()).await.status(), StatusCode::BAD_REQUEST);

    let outage = create_test_app(cms.clone(), &pairs, Some(Arc::new(FixedVerifier(Err(500)))));
    assert_eq!(post_json(outage, "/api/contact", with_token).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(cms.submitted(), 1);
}

#[tokio::test]
async fn test_contact_upstream_failure() {
    let cms = Arc::new(FakeCms { reject_submissions: true, ..Default::default() });
    let response = post_json(create_test_app(cms, &[], None), "/api/contact", valid_contact()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_response(response).await["error"], "submission_failed");
}

#[tokio::test]
async fn test_contact_form_htmx_fragment() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[], None);

    let form = "name=Ada+Patient&email=ada%40example.org&message=Please+review+my+scan+results.&consent=on";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact/submit")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("HX-Request", "true")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("form-status--success"));
    assert!(!html.contains("<html"));
    assert_eq!(cms.submitted(), 1);
}

#[tokio::test]
async fn test_contact_form_full_page_errors() {
    let cms = Arc::new(FakeCms::default());
    let app = create_test_app(cms.clone(), &[], None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact/submit")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Ada"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("<html"));
    assert!(html.contains("Message not sent"));
    assert!(html.contains("form-status--error"));
    assert_eq!(cms.submitted(), 0);
}
