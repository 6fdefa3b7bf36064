//! Named cell formatters for grid columns.
//!
//! A grid column refers to its formatter by name. Rather than mutating a shared
//! settings object, the rendering side builds a [`FormatterRegistry`] and hands it
//! to each component that renders cells.
//!
//! Every built-in formatter HTML-escapes its output. Tooltip formatters emit the
//! tooltip text as a `data-tooltip` attribute; the page attaches hover handlers to
//! `[data-tooltip]` elements itself, so no user text ends up inside script.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Turns a cell value into display markup. `None` renders an empty cell.
pub type FormatterFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Escape text for use in HTML content and double-quoted attributes.
///
/// Besides `& < > "` this also escapes `'` and `/`.
#[must_use]
pub fn encode_tags(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}

/// Plain-text rendering of a JSON value: strings as-is, null as empty.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The `text` member of a dropdown value, if present and not null.
fn dropdown_text(value: &Value) -> Option<String> {
    match value.get("text") {
        None | Some(Value::Null) => None,
        Some(text) => Some(display_text(text)),
    }
}

fn tooltip_span(text: &str) -> String {
    let text = encode_tags(text);
    format!(r#"<span class="w2-tooltip" data-tooltip="{text}">{text}</span>"#)
}

fn icon(value: &Value, max_px: u32) -> Option<String> {
    let src = display_text(value);
    if src.is_empty() {
        return None;
    }
    Some(format!(
        r#"<img src="{}" style="max-width: {max_px}px; max-height: {max_px}px; margin: auto;"/>"#,
        encode_tags(&src)
    ))
}

/// Formatters keyed by the name grid columns use to refer to them.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, FormatterFn>,
}

impl FormatterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in formatters:
    ///
    /// | name               | renders                                          |
    /// |--------------------|--------------------------------------------------|
    /// | `text`             | the value as escaped text                        |
    /// | `dropdown`         | the escaped `text` of an `{id, text}` value      |
    /// | `tooltip-text`     | escaped text with a hover tooltip                |
    /// | `tooltip-dropdown` | dropdown text with a tooltip, nothing if absent  |
    /// | `icon-small`       | a 24px image, nothing for an empty source        |
    /// | `icon-normal`      | a 72px image, nothing for an empty source        |
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with("text", |value| Some(encode_tags(&display_text(value))))
            .with("dropdown", |value| {
                Some(encode_tags(&dropdown_text(value).unwrap_or_default()))
            })
            .with("tooltip-text", |value| Some(tooltip_span(&display_text(value))))
            .with("tooltip-dropdown", |value| {
                dropdown_text(value).map(|text| tooltip_span(&text))
            })
            .with("icon-small", |value| icon(value, 24))
            .with("icon-normal", |value| icon(value, 72))
    }

    /// Register `formatter` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.formatters.insert(name.into(), Arc::new(formatter));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.register(name, formatter);
        self
    }

    /// Look up a formatter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormatterFn> {
        self.formatters.get(name)
    }

    /// Whether a formatter is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Format `value` with the formatter called `name`.
    ///
    /// Unknown names fall back to `text`-style escaping so raw values are
    /// never emitted unescaped.
    #[must_use]
    pub fn format(&self, name: &str, value: &Value) -> Option<String> {
        match self.get(name) {
            Some(formatter) => formatter(value),
            None => {
                tracing::debug!(formatter = name, "unknown formatter, rendering as text");
                Some(encode_tags(&display_text(value)))
            }
        }
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_tags() {
        assert_eq!(
            encode_tags(r#"<b onclick="x('y')">&</b>"#),
            "&lt;b onclick=&quot;x(&#x27;y&#x27;)&quot;&gt;&amp;&lt;&#x2f;b&gt;"
        );
        assert_eq!(encode_tags("plain"), "plain");
    }

    #[test]
    fn test_text_formatter() {
        let registry = FormatterRegistry::with_defaults();
        assert_eq!(registry.format("text", &json!("<i>hi</i>")).as_deref(), Some("&lt;i&gt;hi&lt;&#x2f;i&gt;"));
        assert_eq!(registry.format("text", &json!(null)).as_deref(), Some(""));
        assert_eq!(registry.format("text", &json!(42)).as_deref(), Some("42"));
        assert_eq!(registry.format("text", &json!(true)).as_deref(), Some("true"));
    }

    #[test]
    fn test_dropdown_formatters() {
        let registry = FormatterRegistry::with_defaults();
        let value = json!({"id": 1, "text": "in <progress>"});

        assert_eq!(
            registry.format("dropdown", &value).as_deref(),
            Some("in &lt;progress&gt;")
        );
        assert_eq!(registry.format("dropdown", &json!(null)).as_deref(), Some(""));
        assert_eq!(
            registry.format("tooltip-dropdown", &value).as_deref(),
            Some(
                r#"<span class="w2-tooltip" data-tooltip="in &lt;progress&gt;">in &lt;progress&gt;</span>"#
            )
        );
        assert_eq!(registry.format("tooltip-dropdown", &json!({"id": 1})), None);
        assert_eq!(registry.format("tooltip-dropdown", &json!({"id": 1, "text": null})), None);
    }

    #[test]
    fn test_tooltip_text_escapes_attribute() {
        let registry = FormatterRegistry::with_defaults();
        let html = registry
            .format("tooltip-text", &json!(r#"" onmouseover="alert(1)"#))
            .expect("always renders");
        assert!(!html.contains(r#"" onmouseover"#));
        assert!(html.starts_with(r#"<span class="w2-tooltip" data-tooltip="&quot; onmouseover"#));
    }

    #[test]
    fn test_icon_formatters() {
        let registry = FormatterRegistry::with_defaults();
        assert_eq!(registry.format("icon-small", &json!("")), None);
        assert_eq!(
            registry.format("icon-small", &json!("/img/a.png")).as_deref(),
            Some(r#"<img src="&#x2f;img&#x2f;a.png" style="max-width: 24px; max-height: 24px; margin: auto;"/>"#)
        );
        assert_eq!(
            registry.format("icon-normal", &json!("/b.png?x=1&y=2")).as_deref(),
            Some(r#"<img src="&#x2f;b.png?x=1&amp;y=2" style="max-width: 72px; max-height: 72px; margin: auto;"/>"#)
        );
    }

    #[test]
    fn test_custom_and_unknown_formatters() {
        let mut registry = FormatterRegistry::new();
        assert!(!registry.contains("text"));

        registry.register("upper", |value| value.as_str().map(str::to_uppercase));
        assert_eq!(registry.format("upper", &json!("abc")).as_deref(), Some("ABC"));
        assert_eq!(registry.format("missing", &json!("<x>")).as_deref(), Some("&lt;x&gt;"));
        assert_eq!(format!("{registry:?}"), r#"FormatterRegistry { formatters: ["upper"] }"#);
    }
}
