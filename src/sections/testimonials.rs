use serde_json::{Map, Value};

use crate::sections::html::{escape, items, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, _ctx: &RenderContext) -> String {
    let mut html = String::new();
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }

    html.push_str("<div class=\"testimonials\">\n");
    for testimonial in items(fields, "testimonials") {
        let quote = match text(testimonial, "quote") {
            Some(quote) => quote,
            None => continue,
        };
        html.push_str("<figure class=\"testimonial\">");
        html.push_str(&format!("<blockquote><p>{}</p></blockquote>", escape(quote)));

        let author = text(testimonial, "author");
        let role = text(testimonial, "role");
        if author.is_some() || role.is_some() {
            html.push_str("<figcaption>");
            if let Some(author) = author {
                html.push_str(&format!("<span class=\"testimonial__author\">{}</span>", escape(author)));
            }
            if let Some(role) = role {
                html.push_str(&format!("<span class=\"testimonial__role\">{}</span>", escape(role)));
            }
            html.push_str("</figcaption>");
        }
        html.push_str("</figure>\n");
    }
    html.push_str("</div>");
    html
}
