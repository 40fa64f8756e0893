//! HTML fragment rendering for entities.
//!
//! Each rendered entity is one `<div>` carrying the class
//! `data-element-{id}`, which is how the page finds it again when the entity
//! is deleted. Every entity-supplied string is escaped before it is embedded.

use serde_json::Value;

use crate::models::{Entity, EntityId, Params};

/// Class that tags every element belonging to one entity.
///
/// Whitespace and `%` in the id are percent-encoded so the class stays a
/// single token and distinct ids keep distinct classes.
pub fn fragment_class(id: &EntityId) -> String {
    let mut token = String::with_capacity(id.as_str().len());
    for c in id.as_str().chars() {
        if c.is_whitespace() || c == '%' {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                token.push_str(&format!("%{:02X}", byte));
            }
        } else {
            token.push(c);
        }
    }
    format!("data-element-{}", escape_html(&token))
}

/// Escape text for use in element content and single- or double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the parameter region content.
///
/// Example output for a dictionary payload:
/// ```text
/// <dl class='param'><dt>color</dt><dd>red</dd><dt>size</dt><dd>3</dd></dl>
/// ```
pub fn render_parameters(params: Option<&Params>) -> String {
    match params {
        None => String::new(),
        Some(Params::Text(text)) => escape_html(text),
        Some(Params::Map(map)) => {
            let mut output = String::from("<dl class='param'>");
            for (key, value) in map {
                output.push_str("<dt>");
                output.push_str(&escape_html(key));
                output.push_str("</dt><dd>");
                output.push_str(&escape_html(&value_text(value)));
                output.push_str("</dd>");
            }
            output.push_str("</dl>");
            output
        }
        Some(Params::Other(value)) => escape_html(&value_text(value)),
    }
}

/// Render an entity as an HTML fragment.
///
/// With `expanded` the parameters follow the placeholder inline; otherwise the
/// placeholder is left empty.
pub fn render_entity(entity: &Entity, expanded: bool) -> String {
    let id = escape_html(entity.id.as_str());
    let kind = escape_html(&entity.kind);
    let params = if expanded {
        render_parameters(entity.param.as_ref())
    } else {
        String::new()
    };

    format!(
        "<div class='entity {class}'>\
         <span>{id}</span> \
         <span>{kind}</span> \
         <span class='p'></span>\
         {params}\
         <a class='DELETE' data-element-id='{id}'>delete</a>\
         </div>",
        class = fragment_class(&entity.id),
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
