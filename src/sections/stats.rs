//! Key figures ("2,000+ specialists").

use serde_json::{Map, Value};

use crate::sections::html::{escape, items, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }

    html.push_str("<dl class=\"stats\">\n");
    for stat in items(fields, "items") {
        // Numbers arrive as either strings ("98%") or JSON numbers
        let value = match stat.get("value") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        let label = text(stat, "label").unwrap_or_default();
        html.push_str(&format!(
            "<div class=\"stats__item\"><dt>{}</dt><dd>{}</dd></div>\n",
            escape(label),
            escape(&value)
        ));
    }
    html.push_str("</dl>");
    html
}
