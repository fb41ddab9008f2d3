// Contact submission handlers: JSON API and the htmx-enhanced HTML form

use askama::Template;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use axum_htmx::HxRequest;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::contact::validation::FieldViolation;
use crate::contact::{ContactError, ContactRequest};
use crate::content::PageMetadata;
use crate::error::AppError;
use crate::web::handlers::pages::{HeadView, LayoutView};
use crate::web::AppState;

const DEFAULT_SUCCESS_MESSAGE: &str =
    "Thank you for reaching out. A member of our care team will reply within two business days.";

/// Form result swapped into the form's status region.
#[derive(Template)]
#[template(path = "partials/form_status.html")]
pub struct FormStatusTemplate {
    pub success: bool,
    pub message: String,
    pub errors: Vec<FieldViolation>,
}

/// Full-page form result for browsers without JavaScript.
#[derive(Template)]
#[template(path = "pages/message.html")]
pub struct MessageTemplate {
    pub layout: LayoutView,
    pub head: HeadView,
    pub heading: String,
    pub status: FormStatusTemplate,
}

/// POST /api/contact
pub async fn submit_json(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    state.contact.submit(&ip, ContactRequest::from_json(body)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
}

/// POST /contact/submit
///
/// htmx requests get a status fragment with 200, since htmx only swaps
/// successful responses. Plain form posts get a full page with the real status.
pub async fn submit_form(
    State(state): State<AppState>,
    HxRequest(is_htmx): HxRequest,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let result = state.contact.submit(&ip, ContactRequest::from_form(form)).await;
    let site = state.assembler.site().await;

    let (status_code, status) = match result {
        Ok(_) => {
            let message = site
                .contact_form
                .as_ref()
                .and_then(|settings| settings.success_message.clone())
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
            (StatusCode::CREATED, FormStatusTemplate { success: true, message, errors: Vec::new() })
        }
        Err(error) => failure(error),
    };

    if is_htmx {
        return Ok(Html(status.render()?).into_response());
    }

    let mut metadata = PageMetadata::not_found(&site, state.assembler.site_url());
    metadata.title = format!("Contact | {}", site.site_name);
    let page = MessageTemplate {
        layout: LayoutView::from_site(&site),
        head: HeadView::from(&metadata),
        heading: if status.success { "Message sent" } else { "Message not sent" }.to_string(),
        status,
    };
    Ok((status_code, Html(page.render()?)).into_response())
}

fn failure(error: ContactError) -> (StatusCode, FormStatusTemplate) {
    let (status_code, message, errors) = match error {
        ContactError::RateLimited { retry_after } => (
            StatusCode::TOO_MANY_REQUESTS,
            format!(
                "You have sent several messages already. Please try again in {} minute(s).",
                retry_after.as_secs().div_ceil(60).max(1)
            ),
            Vec::new(),
        ),
        ContactError::Invalid(violations) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Please correct the fields below and send again.".to_string(),
            violations,
        ),
        ContactError::CaptchaFailed => (
            StatusCode::BAD_REQUEST,
            "We could not verify that you are human. Please complete the challenge and try again.".to_string(),
            Vec::new(),
        ),
        ContactError::CaptchaUnavailable(e) => {
            tracing::error!("CAPTCHA verification unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Verification is temporarily unavailable. Please try again shortly.".to_string(),
                Vec::new(),
            )
        }
        ContactError::Upstream(e) => {
            tracing::error!("Contact submission upstream failure: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Your message could not be sent. Please try again later or reach us by phone or e-mail.".to_string(),
                Vec::new(),
            )
        }
    };
    (status_code, FormStatusTemplate { success: false, message, errors })
}

/// Client address for rate limiting: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
