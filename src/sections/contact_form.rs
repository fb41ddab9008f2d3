//! Contact form section.
//!
//! Field markup and constraint attributes come from the same schema the
//! server validates against. The form posts normally and is progressively
//! enhanced with htmx; the response fragment lands in the status region.

use serde_json::{Map, Value};

use crate::contact::validation::{FieldKind, FieldSchema};
use crate::sections::html::{escape, markdown, text};
use crate::sections::RenderContext;

/// Name of the hidden field that only bots fill in.
pub const HONEYPOT_FIELD: &str = "website";

/// Default form post route.
pub const CONTACT_ACTION: &str = "/contact/submit";

pub fn render(fields: &Map<String, Value>, ctx: &RenderContext) -> String {
    let action = if ctx.contact_action.is_empty() { CONTACT_ACTION } else { ctx.contact_action.as_str() };

    let mut html = String::with_capacity(2048);
    if let Some(title) = text(fields, "title") {
        html.push_str(&format!("<h2 id=\"contact-title\">{}</h2>\n", escape(title)));
    }
    if let Some(intro) = text(fields, "intro") {
        html.push_str(&format!("<p class=\"lead\">{}</p>\n", escape(intro)));
    }

    html.push_str(&format!(
        "<form class=\"contact-form\" method=\"post\" action=\"{0}\" hx-post=\"{0}\" \
         hx-target=\"find .form-status\" aria-labelledby=\"contact-title\">\n",
        escape(action)
    ));

    for field in &ctx.contact_form.fields {
        html.push_str(&render_field(field));
    }

    // Honeypot: hidden from people and assistive tech
    html.push_str(&format!(
        "<div class=\"visually-hidden\" style=\"position:absolute;left:-10000px\" aria-hidden=\"true\">\
         <label for=\"contact-{0}\">Website</label>\
         <input id=\"contact-{0}\" name=\"{0}\" type=\"text\" tabindex=\"-1\" autocomplete=\"off\"></div>\n",
        HONEYPOT_FIELD
    ));

    if let Some(captcha) = &ctx.captcha {
        html.push_str(&format!(
            "<div class=\"{}\" data-sitekey=\"{}\"></div>\n<script src=\"{}\" async defer></script>\n",
            escape(&captcha.widget_class),
            escape(&captcha.site_key),
            escape(&captcha.script_url)
        ));
    }

    if let Some(note) = text(fields, "privacyNote") {
        html.push_str(&format!("<div class=\"contact-form__note\">{}</div>\n", markdown(note)));
    }

    let submit = text(fields, "submitLabel").unwrap_or("Send message");
    html.push_str(&format!(
        "<button class=\"button button--primary\" type=\"submit\">{}</button>\n",
        escape(submit)
    ));
    html.push_str("<div class=\"form-status\" role=\"status\" aria-live=\"polite\"></div>\n");
    html.push_str("</form>");
    html
}

fn render_field(field: &FieldSchema) -> String {
    let id = format!("contact-{}", field.name);
    let name = escape(&field.name);
    let label = escape(&field.label);
    let attrs = field.input_attributes();

    let control = match &field.kind {
        FieldKind::Text => input(&id, &name, "text", autocomplete(&field.name), &attrs),
        FieldKind::Email => input(&id, &name, "email", "email", &attrs),
        FieldKind::Phone => input(&id, &name, "tel", "tel", &attrs),
        FieldKind::Textarea => format!("<textarea id=\"{}\" name=\"{}\" rows=\"6\" {}></textarea>", id, name, attrs),
        FieldKind::Select(options) => {
            let mut select = format!("<select id=\"{}\" name=\"{}\" {}>", id, name, attrs);
            select.push_str("<option value=\"\">Please choose</option>");
            for option in options {
                let value = escape(option);
                select.push_str(&format!("<option value=\"{}\">{}</option>", value, escape(&humanize(option))));
            }
            select.push_str("</select>");
            select
        }
        FieldKind::Checkbox => {
            return format!(
                "<div class=\"field field--checkbox\"><input id=\"{0}\" name=\"{1}\" type=\"checkbox\" value=\"on\" {2}>\
                 <label for=\"{0}\">{3}</label></div>\n",
                id, name, attrs, label
            );
        }
    };

    let marker = if field.required { " <span aria-hidden=\"true\">*</span>" } else { "" };
    format!(
        "<div class=\"field\"><label for=\"{}\">{}{}</label>{}</div>\n",
        id, label, marker, control
    )
}

fn input(id: &str, name: &str, kind: &str, autocomplete: &str, attrs: &str) -> String {
    format!(
        "<input id=\"{}\" name=\"{}\" type=\"{}\" autocomplete=\"{}\" {}>",
        id, name, kind, autocomplete, attrs
    )
}

fn autocomplete(name: &str) -> &'static str {
    match name {
        "name" => "name",
        _ => "off",
    }
}

/// `second-opinion` -> `Second opinion`
fn humanize(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
