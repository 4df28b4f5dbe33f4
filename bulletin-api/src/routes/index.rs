//! HTML landing page showing the cache TTL and every dataset.

use axum::{extract::State, response::Html, routing::get, Router};
use bulletin_storage::{Dataset, DatasetKey};
use std::fmt::Write as _;

use super::content::load_dataset;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const PAGE_TITLE: &str = "Static Content Platform";

/// GET / - Render all datasets as pretty-printed JSON.
///
/// Any dataset failure fails the whole page with the same error mapping as
/// the JSON endpoints.
pub async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let mut sections = Vec::with_capacity(DatasetKey::ALL.len());
    for key in DatasetKey::ALL {
        let read = load_dataset(&state, key).await?;
        sections.push((key, pretty_json(read.value())?));
    }

    Ok(Html(render_page(state.cache.ttl().as_secs(), &sections)))
}

fn pretty_json(dataset: &Dataset) -> ApiResult<String> {
    serde_json::to_string_pretty(dataset)
        .map_err(|e| ApiError::internal_error(format!("Failed to render dataset: {}", e)))
}

fn render_page(ttl_secs: u64, sections: &[(DatasetKey, String)]) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str("<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
    html.push_str(PAGE_TITLE);
    html.push_str("</title></head>\n<body style=\"font-family: Arial; margin: 24px;\">\n");
    let _ = writeln!(html, "  <h1>{}</h1>", PAGE_TITLE);
    let _ = writeln!(html, "  <p>TTL Cache: {}s (env CACHE_TTL)</p>", ttl_secs);
    for (key, body) in sections {
        let _ = writeln!(html, "  <h2>{}</h2><pre>{}</pre>", key.title(), escape_html(body));
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("it's"), "it&#x27;s");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_render_page_sections_in_order() {
        let sections = vec![
            (DatasetKey::Events, "{}".to_string()),
            (DatasetKey::News, "{}".to_string()),
            (DatasetKey::Faq, "<b>".to_string()),
        ];
        let html = render_page(60, &sections);

        assert!(html.contains("TTL Cache: 60s"));
        let events = html.find("<h2>Events</h2>");
        let news = html.find("<h2>News</h2>");
        let faq = html.find("<h2>FAQ</h2>");
        assert!(events < news && news < faq);
        assert!(html.contains("<pre>&lt;b&gt;</pre>"));
    }

    proptest! {
        /// Property: escaped text never contains raw markup characters.
        #[test]
        fn prop_escaped_text_has_no_markup(text in ".{0,64}") {
            let out = escape_html(&text);
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains('>'));
            prop_assert!(!out.contains('"'));
        }
    }
}
