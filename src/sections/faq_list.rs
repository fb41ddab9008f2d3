//! Inline FAQ list: disclosure widgets, answers in Markdown.

use serde_json::{Map, Value};

use crate::sections::html::{escape, items, markdown, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }

    html.push_str("<div class=\"faq-list\">\n");
    for item in items(fields, "items") {
        let (question, answer) = match (text(item, "question"), text(item, "answer")) {
            (Some(q), Some(a)) => (q, a),
            _ => continue,
        };
        html.push_str(&format_item(question, answer));
    }
    html.push_str("</div>");
    html
}

/// Shared with the FAQ page.
pub fn format_item(question: &str, answer_markdown: &str) -> String {
    format!(
        "<details class=\"faq\">\n<summary>{}</summary>\n<div class=\"faq__answer prose\">{}</div>\n</details>\n",
        escape(question),
        markdown(answer_markdown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incomplete_items_skipped() {
        let fields = json!({
            "items": [
                { "question": "Is it covered by insurance?", "answer": "Often, **yes**." },
                { "question": "No answer" },
                { "answer": "No question" }
            ]
        });
        let html = render(fields.as_object().unwrap(), &RenderContext::default());
        assert_eq!(html.matches("<details").count(), 1);
        assert!(html.contains("<strong>yes</strong>"));
    }
}
