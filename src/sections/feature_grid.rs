//! Feature grid: a heading and a list of titled feature cards.

use serde_json::{Map, Value};

use crate::sections::html::{escape, items, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }
    if let Some(intro) = text(fields, "intro") {
        html.push_str(&format!("<p class=\"lead\">{}</p>\n", escape(intro)));
    }

    html.push_str("<ul class=\"feature-grid\" role=\"list\">\n");
    for feature in items(fields, "features") {
        html.push_str("<li class=\"feature-card\">");
        if let Some(icon) = text(feature, "icon") {
            // Decorative; the title carries the meaning
            html.push_str(&format!("<span class=\"feature-card__icon\" aria-hidden=\"true\">{}</span>", escape(icon)));
        }
        if let Some(title) = text(feature, "title") {
            html.push_str(&format!("<h3>{}</h3>", escape(title)));
        }
        if let Some(description) = text(feature, "description") {
            html.push_str(&format!("<p>{}</p>", escape(description)));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}
