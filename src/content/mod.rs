//! CMS content: typed records, the HTTP client, and the metadata projection.

pub mod client;
pub mod metadata;
pub mod types;

pub use client::{CmsClient, ContentError, ContentSource};
pub use metadata::{canonical_for, page_metadata, PageMetadata, HOME_SLUG};
pub use types::{FaqCategory, FaqItem, NavLink, Page, SectionRecord, Seo, SiteConfig, Theme};
