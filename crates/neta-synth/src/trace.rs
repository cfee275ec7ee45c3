//! Trace tagging for generation calls.

use tracing::Span;

use neta_types::TracingConfig;

/// Tags applied when the caller does not supply any.
pub const DEFAULT_TAGS: [&str; 2] = ["tech-blog-suggester", "neta-agent"];

pub const APP_NAME: &str = "Tech Blog Suggester";
pub const APP_VERSION: &str = "1.0.0";

/// Identifiers attached to every generation call of one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub session_id: String,
    pub trace_id: Option<String>,
    pub user_id: Option<String>,
    pub tags: Vec<String>,
}

impl TraceContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            user_id: None,
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// `None` when tagging is disabled.
    pub fn for_config(
        config: &TracingConfig,
        session_id: &str,
        trace_id: Option<&str>,
    ) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        let mut ctx = Self::new(session_id);
        ctx.trace_id = trace_id.map(str::to_string);
        Some(ctx)
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Replace the tags; an empty list keeps the defaults.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if !tags.is_empty() {
            self.tags = tags;
        }
        self
    }

    /// Attributes in exporter form. Absent ids are omitted.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = Vec::with_capacity(6);
        if let Some(trace_id) = &self.trace_id {
            attrs.push(("trace.id", trace_id.clone()));
        }
        attrs.push(("session.id", self.session_id.clone()));
        if let Some(user_id) = &self.user_id {
            attrs.push(("user.id", user_id.clone()));
        }
        attrs.push(("langfuse.tags", self.tags.join(",")));
        attrs.push(("app.name", APP_NAME.to_string()));
        attrs.push(("app.version", APP_VERSION.to_string()));
        attrs
    }

    /// Record the attributes on a span that declares the same field names.
    pub fn record(&self, span: &Span) {
        for (key, value) in self.attributes() {
            span.record(key, value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neta_types::TracingSettings;

    fn enabled() -> TracingConfig {
        TracingConfig::from_settings(&TracingSettings {
            langfuse_public_key: Some("pk".to_string()),
            langfuse_secret_key: Some("sk".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_for_config_disabled() {
        assert!(TraceContext::for_config(&TracingConfig::disabled(), "s", None).is_none());
    }

    #[test]
    fn test_default_attributes() {
        let ctx = TraceContext::for_config(&enabled(), "session-1", Some("trace-1")).unwrap();
        let attrs = ctx.attributes();

        assert_eq!(attrs[0], ("trace.id", "trace-1".to_string()));
        assert_eq!(attrs[1], ("session.id", "session-1".to_string()));
        assert!(attrs.contains(&("langfuse.tags", "tech-blog-suggester,neta-agent".to_string())));
        assert!(attrs.contains(&("app.name", "Tech Blog Suggester".to_string())));
        assert!(attrs.contains(&("app.version", "1.0.0".to_string())));
        assert!(!attrs.iter().any(|(k, _)| *k == "user.id"));
    }

    #[test]
    fn test_custom_tags_and_user() {
        let ctx = TraceContext::new("s")
            .with_user_id("u-1")
            .with_tags(["cli"]);
        let attrs = ctx.attributes();
        assert!(attrs.contains(&("user.id", "u-1".to_string())));
        assert!(attrs.contains(&("langfuse.tags", "cli".to_string())));

        let ctx = TraceContext::new("s").with_tags(Vec::<String>::new());
        assert_eq!(ctx.tags, vec!["tech-blog-suggester", "neta-agent"]);
    }
}
