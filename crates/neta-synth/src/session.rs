//! Per-user session state.

use std::sync::Arc;

use tracing::info;
use ulid::Ulid;

use neta_trends::ArticleSource;
use neta_types::{TopicCatalog, TracingConfig};

use crate::generator::GenerationError;
use crate::proposer::{IdeaEvent, IdeaProposer};
use crate::synthesizer::{generate_tech_categories, CategorySynthesizer, DEFAULT_CATEGORY_COUNT};
use crate::trace::TraceContext;

/// One user's catalog, selection and latest proposal.
///
/// The session id is fixed for the session's lifetime; a fresh trace id is
/// minted on every selection so each proposal groups its calls together.
pub struct BlogSession {
    session_id: String,
    trace_id: String,
    catalog: TopicCatalog,
    selected: Option<String>,
    response: Option<String>,
    desired_count: usize,
    tracing: TracingConfig,
    articles: Arc<dyn ArticleSource>,
    synthesizer: CategorySynthesizer,
    proposer: IdeaProposer,
}

impl BlogSession {
    /// Create a session with an empty catalog; call [`shuffle`](Self::shuffle) to fill it.
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        synthesizer: CategorySynthesizer,
        proposer: IdeaProposer,
        tracing: TracingConfig,
    ) -> Self {
        Self {
            session_id: Ulid::new().to_string(),
            trace_id: Ulid::new().to_string(),
            catalog: TopicCatalog::new(),
            selected: None,
            response: None,
            desired_count: DEFAULT_CATEGORY_COUNT,
            tracing,
            articles,
            synthesizer,
            proposer,
        }
    }

    pub fn with_desired_count(mut self, count: usize) -> Self {
        self.desired_count = count.max(1);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    fn trace(&self) -> Option<TraceContext> {
        TraceContext::for_config(&self.tracing, &self.session_id, Some(&self.trace_id))
    }

    /// Regenerate the catalog from current trends, clearing any selection.
    pub async fn shuffle(&mut self) -> &TopicCatalog {
        self.selected = None;
        self.response = None;

        self.synthesizer.set_trace(self.trace());
        self.catalog = generate_tech_categories(
            self.articles.as_ref(),
            &self.synthesizer,
            self.desired_count,
        )
        .await;

        info!(session = %self.session_id, topics = self.catalog.len(), "Catalog regenerated");
        &self.catalog
    }

    /// Select an existing topic. Returns false when the name is unknown.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.catalog.contains(name) {
            return false;
        }
        self.selected = Some(name.to_string());
        self.response = None;
        self.trace_id = Ulid::new().to_string();
        true
    }

    /// Add a user-entered topic (if new) and select it.
    pub fn select_custom(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.catalog = std::mem::take(&mut self.catalog).with_custom_topic(name);
        self.select(name)
    }

    pub fn reset_selection(&mut self) {
        self.selected = None;
        self.response = None;
    }

    /// Propose ideas for the selected topic and keep the result.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    pub async fn propose<F>(&mut self, on_event: F) -> Result<Option<&str>, GenerationError>
    where
        F: FnMut(IdeaEvent) + Send,
    {
        let Some(topic) = self
            .selected
            .as_deref()
            .and_then(|name| self.catalog.get(name))
            .cloned()
        else {
            return Ok(None);
        };

        let trace = self.trace();
        let response = self
            .proposer
            .propose(&topic.name, &topic.keywords, trace, on_event)
            .await?;
        self.response = Some(response);
        Ok(self.response.as_deref())
    }
}
