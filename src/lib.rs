//! Second Opinion Site
//!
//! Server-rendered marketing and information site for a second-medical-opinion
//! service. Pages live in a headless CMS as ordered lists of typed sections;
//! this crate fetches them, renders each section with its registered renderer,
//! and serves the result with SEO metadata.
//!
//! - `content/`: CMS client, domain types and metadata projection
//! - `sections/`: section registry and per-type renderers
//! - `assembler`: per-route fetch, render and not-found handling
//! - `contact/`: contact form validation, rate limiting and CAPTCHA
//! - `web/`: Axum router, handlers and Askama templates

pub mod assembler;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod sections;
pub mod telemetry;
pub mod theme;
pub mod web;

// Re-export commonly used types
pub use assembler::{AssembledPage, PageAssembler, PageOutcome};
pub use config::Config;
pub use error::AppError;
pub use sections::{RenderContext, RenderedSection, SectionRegistry, SectionRenderer};
pub use web::{create_router, AppState};
