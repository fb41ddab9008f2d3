//! Section Registry
//!
//! Immutable map from a CMS type tag (`__component`) to its renderer, built
//! once at start-up from [`DEFAULT_RENDERERS`]. Lookup is exact and
//! case-sensitive; there are no aliases and no runtime registration.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::sections::{
    contact_form, cta, faq_list, feature_grid, hero, image_text, process_steps, rich_text, stats,
    testimonials, RenderContext,
};

/// A section renderer: the record's fields in, inner HTML out.
pub type RenderFn = fn(&Map<String, Value>, &RenderContext) -> String;

/// Every section type the CMS currently emits.
pub static DEFAULT_RENDERERS: &[(&str, RenderFn)] = &[
    ("sections.hero", hero::render),
    ("sections.rich-text", rich_text::render),
    ("sections.cta", cta::render),
    ("sections.feature-grid", feature_grid::render),
    ("sections.process-steps", process_steps::render),
    ("sections.faq-list", faq_list::render),
    ("sections.testimonials", testimonials::render),
    ("sections.stats", stats::render),
    ("sections.image-text", image_text::render),
    ("sections.contact-form", contact_form::render),
];

pub struct SectionRegistry {
    entries: FxHashMap<&'static str, RenderFn>,
}

impl SectionRegistry {
    /// Build from a static (tag, renderer) table. Later duplicates win.
    pub fn new(table: &[(&'static str, RenderFn)]) -> Self {
        let mut entries = FxHashMap::default();
        for (tag, render) in table {
            if entries.insert(*tag, *render).is_some() {
                tracing::warn!("Duplicate section renderer for {}", tag);
            }
        }
        Self { entries }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RENDERERS)
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, tag: &str) -> Option<RenderFn> {
        self.entries.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.entries.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
