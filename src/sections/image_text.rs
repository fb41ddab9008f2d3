//! Image beside Markdown copy; the CMS picks which side the image sits on.

use serde_json::{Map, Value};

use crate::sections::html::{button, escape, image_tag, markdown, text, variant};
use crate::sections::RenderContext;

pub fn render(fields: &Map<String, Value>, ctx: &RenderContext) -> String {
    let side = variant(fields, "imagePosition", &["left", "right"], "right");

    let mut html = format!("<div class=\"image-text image-text--image-{}\">\n", side);
    html.push_str("<div class=\"image-text__copy\">\n");
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2>{}</h2>\n", escape(title)));
    }
    if let Some(body) = text(fields, "body") {
        html.push_str(&format!("<div class=\"prose\">{}</div>\n", markdown(body)));
    }
    if let Some(link) = button(fields, "linkLabel", "linkUrl", "button button--link") {
        html.push_str(&link);
        html.push('\n');
    }
    html.push_str("</div>\n");

    if let Some(image) = image_tag(fields, "image", &ctx.media_base, "image-text__image") {
        html.push_str(&image);
        html.push('\n');
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_position() {
        let left = json!({ "imagePosition": "left", "title": "Our team" });
        let bogus = json!({ "imagePosition": "top" });
        let ctx = RenderContext::default();

        assert!(render(left.as_object().unwrap(), &ctx).contains("image-text--image-left"));
        assert!(render(bogus.as_object().unwrap(), &ctx).contains("image-text--image-right"));
    }
}
