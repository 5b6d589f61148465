//! HTML rendering.
//!
//! Pages are plain `format!` templates. A partial refresh receives only the
//! page content; every other request gets the full document, whose header is
//! itself loaded as a fragment from `/components/header/`.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::htmx::HtmxSignals;

/// Escape text for safe inclusion in HTML bodies and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Element every page swap replaces; both renderings carry it.
pub const SWAP_TARGET: &str = "main";

/// A rendered page: escaped title plus already-escaped body markup.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub body: String,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    fn content(&self) -> String {
        format!(
            "<{tag}>\n{body}\n</{tag}>",
            tag = SWAP_TARGET,
            body = self.body
        )
    }

    /// Content fragment for a partial refresh.
    ///
    /// Keeps the `<main>` element, since the boosted layout selects and
    /// replaces it whole.
    pub fn fragment(&self) -> String {
        format!(
            "<title>{title}</title>\n{content}",
            title = html_escape(&self.title),
            content = self.content()
        )
    }

    /// Complete HTML document.
    pub fn document(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body hx-boost="true" hx-target="{tag}" hx-select="{tag}" hx-swap="outerHTML">
    <header hx-get="/components/header/" hx-trigger="load" hx-target="this" hx-select="unset" hx-swap="innerHTML"></header>
{content}
</body>
</html>"#,
            title = html_escape(&self.title),
            tag = SWAP_TARGET,
            content = self.content()
        )
    }

    /// Choose fragment or document from the request signals.
    pub fn render(&self, signals: &HtmxSignals) -> Response {
        self.render_with_status(signals, StatusCode::OK)
    }

    pub fn render_with_status(&self, signals: &HtmxSignals, status: StatusCode) -> Response {
        let html = if signals.wants_fragment() {
            self.fragment()
        } else {
            self.document()
        };
        html_response(status, html)
    }
}

/// `text/html` response with the given status.
pub fn html_response(status: StatusCode, html: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

/// Generic form page shared by the account screens.
///
/// `fields` are `(name, label, input type)`; the first field is autofocused.
pub fn form_page(
    title: &str,
    action: &str,
    fields: &[(&str, &str, &str)],
    submit: &str,
    errors: &[String],
) -> Page {
    let error_list = if errors.is_empty() {
        String::new()
    } else {
        format!(
            "<ul class=\"errorlist\">{}</ul>\n",
            errors
                .iter()
                .map(|e| format!("<li>{}</li>", html_escape(e)))
                .collect::<String>()
        )
    };

    let inputs = fields
        .iter()
        .enumerate()
        .map(|(i, (name, label, kind))| {
            format!(
                "<p><label for=\"id_{name}\">{label}</label> <input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" required{autofocus}></p>\n",
                name = html_escape(name),
                label = html_escape(label),
                kind = html_escape(kind),
                autofocus = if i == 0 { " autofocus" } else { "" },
            )
        })
        .collect::<String>();

    Page::new(
        title,
        format!(
            "<h1>{title}</h1>\n{errors}<form method=\"post\" action=\"{action}\">\n{inputs}<button type=\"submit\">{submit}</button>\n</form>",
            title = html_escape(title),
            errors = error_list,
            action = html_escape(action),
            inputs = inputs,
            submit = html_escape(submit),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_document_loads_header_fragment() {
        let html = Page::new("categorías", "<p>x</p>").document();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"hx-get="/components/header/" hx-trigger="load""#));
        assert!(html.contains("<title>categorías</title>"));
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn test_fragment_has_no_layout() {
        let html = Page::new("t", "<p>x</p>").fragment();
        assert!(!html.contains("<html"));
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn test_fragment_carries_the_element_the_layout_selects() {
        let page = Page::new("t", "<p>x</p>");
        let document = page.document();
        let fragment = page.fragment();

        assert!(document.contains(r#"hx-select="main""#));
        assert!(document.contains(r#"hx-target="main""#));
        assert!(fragment.contains("<main>\n<p>x</p>\n</main>"));
        assert!(document.contains("<main>\n<p>x</p>\n</main>"));
        assert!(fragment.starts_with("<title>t</title>"));
    }

    #[test]
    fn test_render_picks_fragment_for_partial_refresh() {
        let page = Page::new("t", "<p>x</p>");
        let partial = HtmxSignals {
            request: Some("true".to_string()),
            ..Default::default()
        };
        let restore = HtmxSignals {
            request: Some("true".to_string()),
            history_restore_request: Some("true".to_string()),
            ..Default::default()
        };
        assert!(partial.wants_fragment());
        assert!(!restore.wants_fragment());
        assert_eq!(page.render(&partial).status(), StatusCode::OK);
    }

    #[test]
    fn test_form_page_autofocuses_first_field() {
        let page = form_page(
            "Log in",
            "/user/login/",
            &[
                ("username", "Username", "text"),
                ("password", "Password", "password"),
            ],
            "Log in",
            &["Please enter a correct username and password.".to_string()],
        );
        assert!(page
            .body
            .contains(r#"name="username" id="id_username" required autofocus"#));
        assert!(page
            .body
            .contains(r#"name="password" id="id_password" required>"#));
        assert!(page.body.contains("errorlist"));
    }
}
