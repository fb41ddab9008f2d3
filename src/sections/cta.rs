//! Call to action banner.

use serde_json::{Map, Value};

use crate::sections::html::{button, escape, text, variant};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let tone = variant(fields, "variant", &["primary", "secondary", "muted"], "primary");

    let mut html = format!("<div class=\"cta cta--{}\">\n", tone);
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2 class=\"cta__title\">{}</h2>\n", escape(title)));
    }
    if let Some(body) = text(fields, "text") {
        html.push_str(&format!("<p class=\"cta__text\">{}</p>\n", escape(body)));
    }
    if let Some(link) = button(fields, "buttonLabel", "buttonUrl", "button button--primary") {
        html.push_str(&link);
        html.push('\n');
    }
    html.push_str("</div>");
    html
}
