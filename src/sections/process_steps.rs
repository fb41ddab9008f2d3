//! Process steps: an ordered "how it works" list.

use serde_json::{Map, Value};

use crate::sections::html::{escape, items, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }

    html.push_str("<ol class=\"steps\">\n");
    for step in items(fields, "steps") {
        html.push_str("<li class=\"steps__item\">");
        if let Some(title) = text(step, "title") {
            html.push_str(&format!("<h3>{}</h3>", escape(title)));
        }
        if let Some(description) = text(step, "description") {
            html.push_str(&format!("<p>{}</p>", escape(description)));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ol>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_keep_cms_order() {
        let fields = json!({
            "steps": [
                { "title": "Upload records" },
                { "title": "Specialist review" },
                { "title": "Written opinion" }
            ]
        });
        let html = render(fields.as_object().unwrap(), &RenderContext::default());
        let upload = html.find("Upload records").unwrap();
        let review = html.find("Specialist review").unwrap();
        let opinion = html.find("Written opinion").unwrap();
        assert!(upload < review && review < opinion);
    }
}
