//! Theme stylesheet: CMS brand settings as CSS custom properties.
//!
//! Values are copied into CSS only when they match a conservative pattern;
//! anything else falls back to the default palette.

use crate::content::types::Theme;

const DEFAULT_PRIMARY: &str = "#0b5cab";
const DEFAULT_SECONDARY: &str = "#14324f";
const DEFAULT_ACCENT: &str = "#1f9d8b";
const DEFAULT_FONT: &str = "system-ui, -apple-system, \"Segoe UI\", sans-serif";
const DEFAULT_RADIUS: &str = "8px";

/// Render `:root { --color-primary: ...; ... }` for the given theme.
pub fn theme_css(theme: Option<&Theme>) -> String {
    let theme = theme.cloned().unwrap_or_default();

    let primary = pick(theme.primary_color.as_deref(), is_hex_color, DEFAULT_PRIMARY);
    let secondary = pick(theme.secondary_color.as_deref(), is_hex_color, DEFAULT_SECONDARY);
    let accent = pick(theme.accent_color.as_deref(), is_hex_color, DEFAULT_ACCENT);
    let font = pick(theme.font_family.as_deref(), is_font_family, DEFAULT_FONT);
    let radius = pick(theme.radius.as_deref(), is_length, DEFAULT_RADIUS);

    format!(
        ":root {{\n  --color-primary: {};\n  --color-secondary: {};\n  --color-accent: {};\n  --font-family: {};\n  --radius: {};\n}}\n",
        primary, secondary, accent, font, radius
    )
}

fn pick<'a>(value: Option<&'a str>, valid: fn(&str) -> bool, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if valid(v) => v,
        Some(v) => {
            tracing::warn!("Ignoring unsafe theme value {:?}", v);
            default
        }
        None => default,
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`.
fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn is_font_family(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 200
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '-' | '"' | '\''))
}

/// A number followed by `px`, `rem` or `em`.
fn is_length(value: &str) -> bool {
    ["px", "rem", "em"].iter().any(|unit| {
        value
            .strip_suffix(unit)
            .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit() || c == '.'))
            .unwrap_or(false)
    })
}
