use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde_json::Value;

/// Parse a feed body that is either raw JSON or a browser-rendered page
/// wrapping the JSON in a `<pre>` element.
///
/// A page with no `<pre>` element yields an empty object, the same as a
/// rendered page for an endpoint that returned nothing.
pub fn parse_json_body(body: &str) -> Result<Value> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Failed to parse JSON body");
    }

    match extract_pre_text(body)? {
        Some(text) => serde_json::from_str(&text).context("Failed to parse JSON inside <pre>"),
        None => Ok(Value::Object(Default::default())),
    }
}

fn extract_pre_text(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let pre_selector = Selector::parse("pre")
        .ok()
        .context("Invalid pre selector")?;

    Ok(document
        .select(&pre_selector)
        .next()
        .map(|pre| pre.text().collect::<String>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_json() {
        let value = parse_json_body(r#"  {"incidents": []}"#).unwrap();
        assert!(value["incidents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_wrapped_in_pre() {
        let html = r#"<html><head></head><body><pre>{"event": {"id": 12436870}}</pre></body></html>"#;
        let value = parse_json_body(html).unwrap();
        assert_eq!(value["event"]["id"], 12436870);
    }

    #[test]
    fn test_page_without_pre_is_empty_object() {
        let value = parse_json_body("<html><body><p>blocked</p></body></html>").unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_json_body("{not json").is_err());
        assert!(parse_json_body("<pre>{oops</pre>").is_err());
    }
}
