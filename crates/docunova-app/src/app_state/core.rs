//! DocunovaApp struct definition and constructor.

use std::sync::Arc;

use docunova_chat::{
    ApiClient, Backend, CitationStyle, QueryCache, SelectionStore, SessionController,
    SessionSettings, StoredTokenProvider,
};
use docunova_common::{DocunovaError, EventBus};
use docunova_config::schema::DocunovaConfig;
use docunova_platform::{KeyValueStore, Preferences};

/// Everything the terminal client drives: one session over one backend.
pub struct DocunovaApp {
    pub(super) config: DocunovaConfig,
    pub(super) backend: Arc<dyn Backend>,
    pub(super) cache: Arc<QueryCache>,
    pub(super) selection: SelectionStore,
    pub(super) session: SessionController,
    pub(super) preferences: Preferences,
    pub(super) tokens: Arc<StoredTokenProvider>,
    pub(super) citation_style: CitationStyle,
}

impl DocunovaApp {
    pub fn new(
        config: DocunovaConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, DocunovaError> {
        let tokens = Arc::new(StoredTokenProvider::new(store.clone()));
        let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(&config.api, tokens.clone())?);

        let events = Arc::new(EventBus::new(config.session.event_capacity as usize));
        let selection = SelectionStore::new(store.clone(), None).with_events(events.clone());
        let cache = Arc::new(
            QueryCache::new(backend.clone())
                .with_events(events.clone())
                .with_selection(selection.clone()),
        );
        let session = SessionController::new(
            backend.clone(),
            cache.clone(),
            selection.clone(),
            events,
            SessionSettings::from(&config.session),
        );

        let citation_style = config
            .display
            .citation_style
            .parse::<CitationStyle>()
            .unwrap_or_else(|e| {
                tracing::warn!("{e}, using default citations");
                CitationStyle::default()
            });

        Ok(Self {
            config,
            backend,
            cache,
            selection,
            session,
            preferences: Preferences::new(store),
            tokens,
            citation_style,
        })
    }

    /// Replace the cached bearer token.
    pub fn seed_token(&self, token: &str) -> Result<(), DocunovaError> {
        self.tokens.seed(token)?;
        Ok(())
    }

    pub(super) fn assistant_name(&self) -> &str {
        &self.config.display.assistant_name
    }

    pub(super) fn prompt(&self) -> String {
        if self.preferences.sidebar_collapsed() {
            return "> ".to_string();
        }
        let docs = match self.selection.len() {
            0 => "no docs".to_string(),
            1 => "1 doc".to_string(),
            n => format!("{n} docs"),
        };
        match self.session.active_conversation_id() {
            Some(id) => format!("[{id} | {docs}] > "),
            None => format!("[new | {docs}] > "),
        }
    }
}

impl std::fmt::Debug for DocunovaApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocunovaApp")
            .field("base_url", &self.config.api.base_url)
            .field("session", &self.session)
            .field("citation_style", &self.citation_style)
            .finish()
    }
}
