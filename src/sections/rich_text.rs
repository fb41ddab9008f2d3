//! Rich text: an optional heading over a Markdown body.

use serde_json::{Map, Value};

use crate::sections::html::{escape, markdown, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }
    if let Some(body) = text(fields, "body").or_else(|| text(fields, "content")) {
        html.push_str(&format!("<div class=\"prose\">{}</div>", markdown(body)));
    }
    html
}
