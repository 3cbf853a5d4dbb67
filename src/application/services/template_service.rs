//! Template rendering with development-mode diagnostics.

use std::sync::Arc;

use tracing::error;

use crate::domain::errors::TemplateError;
use crate::domain::ports::TemplatePort;

/// Renders theme templates, hiding failures outside debug mode.
#[derive(Clone)]
pub struct TemplateService {
    renderer: Arc<dyn TemplatePort>,
    debug: bool,
}

impl TemplateService {
    /// Creates a template service. With `debug` set, render failures produce
    /// a diagnostic page instead of nothing.
    #[must_use]
    pub const fn new(renderer: Arc<dyn TemplatePort>, debug: bool) -> Self {
        Self { renderer, debug }
    }

    /// Renders template `name` with `context`.
    ///
    /// Errors are always logged. Returns `None` on failure unless in debug mode.
    pub fn serve_template(&self, name: &str, context: &serde_json::Value) -> Option<String> {
        match self.renderer.render(name, context) {
            Ok(html) => Some(html),
            Err(e) => {
                error!(template = name, error = %e, "Failed to render template");
                self.debug.then(|| error_page(name, &e))
            }
        }
    }
}

/// Builds a self-contained HTML page describing a template failure.
#[must_use]
pub fn error_page(name: &str, err: &TemplateError) -> String {
    let name = handlebars::html_escape(name);
    let detail = handlebars::html_escape(&err.to_string());
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Template error</title></head>\n<body>\n\
         <h2>Error rendering {name}</h2>\n<pre>{detail}</pre>\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingRenderer;

    impl TemplatePort for FailingRenderer {
        fn render(&self, name: &str, _: &serde_json::Value) -> Result<String, TemplateError> {
            Err(TemplateError::Render {
                name: name.to_string(),
                message: "unknown helper <lookup>".to_string(),
            })
        }
    }

    struct EchoRenderer;

    impl TemplatePort for EchoRenderer {
        fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError> {
            Ok(format!("{name}:{context}"))
        }
    }

    #[test]
    fn test_success_passes_through() {
        let service = TemplateService::new(Arc::new(EchoRenderer), false);
        assert_eq!(
            service.serve_template("index.html", &json!({"a": 1})),
            Some(r#"index.html:{"a":1}"#.to_string())
        );
    }

    #[test]
    fn test_failure_is_hidden_outside_debug() {
        let service = TemplateService::new(Arc::new(FailingRenderer), false);
        assert!(service.serve_template("index.html", &json!({})).is_none());
    }

    #[test]
    fn test_failure_renders_escaped_page_in_debug() {
        let service = TemplateService::new(Arc::new(FailingRenderer), true);
        let page = service.serve_template("index.html", &json!({})).unwrap();

        assert!(page.contains("Error rendering index.html"));
        assert!(page.contains("unknown helper &lt;lookup&gt;"));
        assert!(!page.contains("<lookup>"));
    }
}
