//! CMS Content Types
//!
//! Typed views over the JSON the CMS returns. The CMS owns every record here;
//! the site only ever holds a read-only snapshot per request.
//!
//! Both REST shapes the CMS has shipped are accepted:
//! - v4: `{ "id": 1, "attributes": { ... } }`, relations wrapped in `{ "data": ... }`
//! - v5: flattened `{ "id": 1, ... }`

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Key holding the type tag of a dynamic-zone entry.
pub const COMPONENT_KEY: &str = "__component";

/// Site name used when the CMS has none.
pub const DEFAULT_SITE_NAME: &str = "Second Opinion";

/// The CMS sends `null` for unset scalars, relations and empty dynamic zones.
/// `#[serde(default)]` only covers absent keys, so nullable fields use this too.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn site_name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()))
}

// ============================================================================
// Section Records
// ============================================================================

/// One entry of a page's dynamic zone.
///
/// Only constructed through [`SectionRecord::from_value`], so every instance
/// satisfies the validity invariant: positive integer id, non-empty string tag.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRecord {
    pub id: u64,
    pub component: String,
    /// Variant-specific fields (everything except `id` and `__component`)
    pub fields: Map<String, Value>,
}

/// Why a raw dynamic-zone entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSection {
    NotAnObject,
    MissingComponent,
    NonPositiveId,
}

impl std::fmt::Display for InvalidSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            InvalidSection::NotAnObject => "entry is not an object",
            InvalidSection::MissingComponent => "missing or empty __component",
            InvalidSection::NonPositiveId => "id is missing or not a positive integer",
        };
        f.write_str(reason)
    }
}

impl SectionRecord {
    /// Validate a raw dynamic-zone entry.
    pub fn from_value(value: &Value) -> Result<Self, InvalidSection> {
        let object = value.as_object().ok_or(InvalidSection::NotAnObject)?;

        let component = object
            .get(COMPONENT_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(InvalidSection::MissingComponent)?;

        // as_u64 rejects negatives and floats
        let id = object
            .get("id")
            .and_then(|v| v.as_u64())
            .filter(|id| *id > 0)
            .ok_or(InvalidSection::NonPositiveId)?;

        let fields = object
            .iter()
            .filter(|(key, _)| key.as_str() != COMPONENT_KEY && key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            component: component.to_string(),
            fields,
        })
    }
}

// ============================================================================
// Pages
// ============================================================================

/// SEO component attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<String>,
    /// Media relation (either REST shape)
    pub meta_image: Option<Value>,
    #[serde(alias = "canonicalURL")]
    pub canonical_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub noindex: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub nofollow: bool,
}

/// A content page: ordered dynamic zone plus page-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub description: Option<String>,
    pub seo: Option<Seo>,
    /// Raw dynamic zone. Validated by the section renderer, not here, so one
    /// malformed entry cannot fail the whole page decode.
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<Value>,
}

// ============================================================================
// FAQs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqCategory {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    /// Markdown
    #[serde(deserialize_with = "null_as_default")]
    pub answer: String,
    pub order: Option<i64>,
    /// Relation to a category (either REST shape)
    pub category: Option<Value>,
}

impl FaqItem {
    /// Slug of the related category, if any.
    pub fn category_slug(&self) -> Option<&str> {
        let category = self.category.as_ref()?;
        let entry = match category.get("data") {
            Some(data) => data,
            None => category,
        };
        entry
            .get("attributes")
            .unwrap_or(entry)
            .get("slug")
            .and_then(|v| v.as_str())
    }
}

// ============================================================================
// Site Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavLink {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// Brand colors and typography, exposed to the page as CSS custom properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub font_family: Option<String>,
    pub radius: Option<String>,
}

/// Per-field overrides for the contact form, editable in the CMS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFieldOverride {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFormSettings {
    #[serde(deserialize_with = "null_as_default")]
    pub fields: Vec<ContactFieldOverride>,
    pub success_message: Option<String>,
}

/// Global site configuration (CMS single type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    #[serde(deserialize_with = "site_name_or_default")]
    pub site_name: String,
    pub tagline: Option<String>,
    pub default_description: Option<String>,
    pub default_share_image: Option<Value>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub footer_text: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub navigation: Vec<NavLink>,
    pub theme: Option<Theme>,
    pub contact_form: Option<ContactFormSettings>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            tagline: None,
            default_description: None,
            default_share_image: None,
            contact_email: None,
            contact_phone: None,
            footer_text: None,
            navigation: Vec::new(),
            theme: None,
            contact_form: None,
        }
    }
}

// ============================================================================
// REST shape normalization
// ============================================================================

/// Flatten a v4 `{id, attributes}` entry into the v5 shape. v5 entries pass through.
pub fn flatten_entry(value: Value) -> Value {
    match value {
        Value::Object(mut object) => match object.remove("attributes") {
            Some(Value::Object(mut attributes)) => {
                if let Some(id) = object.remove("id") {
                    attributes.insert("id".to_string(), id);
                }
                Value::Object(attributes)
            }
            Some(other) => {
                object.insert("attributes".to_string(), other);
                Value::Object(object)
            }
            None => Value::Object(object),
        },
        other => other,
    }
}
