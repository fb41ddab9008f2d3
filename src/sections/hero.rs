//! Hero: page-leading headline, supporting copy, optional image and call to action.

use serde_json::{Map, Value};

use crate::sections::html::{button, escape, image_tag, text};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, ctx: &RenderContext) -> String {
    let mut html = String::with_capacity(512);
    html.push_str("<div class=\"hero\">\n<div class=\"hero__content\">\n");

    if let Some(eyebrow) = text(fields, "eyebrow") {
        html.push_str(&format!("<p class=\"hero__eyebrow\">{}</p>\n", escape(eyebrow)));
    }
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h1 class=\"hero__title\">{}</h1>\n", escape(title)));
    }
    if let Some(subtitle) = text(fields, "subtitle") {
        html.push_str(&format!("<p class=\"hero__subtitle\">{}</p>\n", escape(subtitle)));
    }

    let actions: Vec<String> = [
        button(fields, "ctaLabel", "ctaUrl", "button button--primary"),
        button(fields, "secondaryCtaLabel", "secondaryCtaUrl", "button button--secondary"),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !actions.is_empty() {
        html.push_str(&format!("<div class=\"hero__actions\">{}</div>\n", actions.join("")));
    }
    html.push_str("</div>\n");

    if let Some(image) = image_tag(fields, "image", &ctx.media_base, "hero__image") {
        html.push_str(&image);
        html.push('\n');
    }

    html.push_str("</div>");
    html
}
