//! Emoji transfer workflow.
//!
//! Holds the session state (domains, token, catalog, selection, search term)
//! and drives the fetch and import requests. Every public action has exactly
//! one recovery boundary: failures are logged and turned into an outcome,
//! never propagated to the caller.

use crate::domain::{
    AddEmojiRequest, AppError, Emoji, EmojiCatalog, ImportLogEntry, ImportOutcome, Result,
    TransferConfig,
};
use crate::infrastructure::{EmojiApi, TokenStore};

/// Receives the single acknowledgment produced by an import action.
pub trait Notifier {
    fn notify(&self, outcome: &ImportOutcome);
}

/// Owned transfer session.
pub struct TransferService<A: EmojiApi> {
    api: A,
    tokens: Option<TokenStore>,
    config: TransferConfig,
    catalog: EmojiCatalog,
    selection: Vec<Emoji>,
    search_term: String,
    request_log: Vec<ImportLogEntry>,
}

impl<A: EmojiApi> TransferService<A> {
    /// Create a session with no token store attached.
    #[must_use]
    pub fn new(api: A, config: TransferConfig) -> Self {
        Self {
            api,
            tokens: None,
            config,
            catalog: EmojiCatalog::default(),
            selection: Vec::new(),
            search_term: String::new(),
            request_log: Vec::new(),
        }
    }

    /// Attach a token store used when no explicit API token is set.
    #[must_use]
    pub fn with_token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn set_source_domain(&mut self, domain: impl Into<String>) {
        self.config.source_domain = domain.into();
    }

    pub fn set_destination_domain(&mut self, domain: impl Into<String>) {
        self.config.destination_domain = domain.into();
    }

    pub fn set_api_token(&mut self, token: impl Into<String>) {
        self.config.api_token = token.into();
    }

    /// Replace the catalog, deduplicating the given list.
    pub fn set_emojis(&mut self, emojis: Vec<Emoji>) {
        self.catalog = EmojiCatalog::from_emojis(emojis);
    }

    /// Replace the selection. Order is kept and is the import order.
    pub fn set_selected_emojis(&mut self, selection: Vec<Emoji>) {
        self.selection = selection;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    #[must_use]
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &EmojiCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> &[Emoji] {
        &self.selection
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Every POST attempted in this session, oldest first.
    #[must_use]
    pub fn request_log(&self) -> &[ImportLogEntry] {
        &self.request_log
    }

    /// Catalog entries matching the current search term.
    #[must_use]
    pub fn matching_emojis(&self) -> Vec<&Emoji> {
        self.catalog.matching(&self.search_term).collect()
    }

    /// Select catalog entries by name, in the order given.
    ///
    /// # Errors
    /// Returns `InvalidData` naming the first name missing from the catalog.
    pub fn select_by_names(&mut self, names: &[String]) -> Result<()> {
        let selection = names
            .iter()
            .map(|name| {
                self.catalog
                    .find(name)
                    .cloned()
                    .ok_or_else(|| AppError::InvalidData {
                        message: format!("Emoji not found in source catalog: {name}"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.set_selected_emojis(selection);
        Ok(())
    }

    /// Select every catalog entry matching the current search term.
    pub fn select_matching(&mut self) {
        let selection = self.matching_emojis().into_iter().cloned().collect();
        self.set_selected_emojis(selection);
    }

    /// Fetch the source catalog, logging and swallowing any failure.
    ///
    /// On failure the previous catalog stays in place; callers must not
    /// assume it changed.
    pub async fn fetch_emojis(&mut self) {
        if let Err(e) = self.try_fetch_emojis().await {
            tracing::error!(error = %e, "Error fetching emojis");
        }
    }

    /// Fetch the source catalog, returning the deduplicated size.
    ///
    /// # Errors
    /// Returns the transport, status or decode error; the catalog is untouched.
    pub async fn try_fetch_emojis(&mut self) -> Result<usize> {
        let base_url = self.config.source_base_url();
        tracing::info!(url = %format!("{base_url}/api/emojis"), "Fetching emojis");

        let emojis = self.api.list_emojis(&base_url).await?;
        let fetched = emojis.len();
        self.set_emojis(emojis);

        tracing::info!(
            fetched,
            unique = self.catalog.len(),
            "Emojis fetched successfully"
        );

        Ok(self.catalog.len())
    }

    /// Import every selected emoji, one request at a time.
    ///
    /// Stops at the first failure. The notifier is called exactly once.
    pub async fn import_all_emojis(&mut self, notifier: &impl Notifier) -> ImportOutcome {
        let selection = self.selection.clone();

        let outcome = match self.post_sequentially(&selection).await {
            Ok(count) => ImportOutcome::AllImported { count },
            Err(e) => {
                tracing::error!(error = %e, "Error importing all emojis");
                ImportOutcome::AllFailed
            }
        };

        notifier.notify(&outcome);
        outcome
    }

    /// Import only the first selected emoji.
    ///
    /// An empty selection counts as a failure. The notifier is called exactly once.
    pub async fn import_selected_emoji(&mut self, notifier: &impl Notifier) -> ImportOutcome {
        let outcome = match self.selection.first().cloned() {
            Some(emoji) => {
                let result = self.post_sequentially(std::slice::from_ref(&emoji)).await;
                match result {
                    Ok(_) => ImportOutcome::SelectedImported { name: emoji.name },
                    Err(e) => {
                        tracing::error!(error = %e, "Error importing selected emoji");
                        ImportOutcome::SelectedFailed
                    }
                }
            }
            None => {
                tracing::error!("Error importing selected emoji: selection is empty");
                ImportOutcome::SelectedFailed
            }
        };

        notifier.notify(&outcome);
        outcome
    }

    /// Explicit session token, else the destination's stored emoji token.
    fn resolve_token(&self) -> Result<String> {
        if !self.config.api_token.is_empty() {
            return Ok(self.config.api_token.clone());
        }

        let stored = match &self.tokens {
            Some(store) => store.get_token(&self.config.destination_domain)?,
            None => return Ok(String::new()),
        };

        if stored.emoji_api_token.is_empty() {
            tracing::warn!(
                domain = %self.config.destination_domain,
                "No API token configured for destination"
            );
        }

        Ok(stored.emoji_api_token)
    }

    /// POST each emoji in order, awaiting each before the next.
    async fn post_sequentially(&mut self, emojis: &[Emoji]) -> Result<usize> {
        let token = self.resolve_token()?;
        // Destination is used as typed, without scheme normalization.
        let base_url = self.config.destination_domain.clone();

        for emoji in emojis {
            let request = AddEmojiRequest::new(&token, emoji);

            match self.api.add_emoji(&base_url, &request).await {
                Ok(status) => {
                    tracing::debug!(name = %emoji.name, status, "Emoji imported");
                    self.request_log
                        .push(ImportLogEntry::new(&emoji.name, Some(status)));
                }
                Err(e) => {
                    self.request_log
                        .push(ImportLogEntry::new(&emoji.name, e.status_code()));
                    return Err(e);
                }
            }
        }

        Ok(emojis.len())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::domain::HttpSettings;
    use crate::infrastructure::HttpEmojiApi;

    /// In-memory API that records every call.
    #[derive(Default)]
    struct FakeApi {
        emojis: Vec<Emoji>,
        fail_list: bool,
        /// 1-based index of the POST that should get a 400.
        fail_post_at: Option<usize>,
        /// 1-based index of the POST that should get no response.
        drop_post_at: Option<usize>,
        gets: Mutex<Vec<String>>,
        posts: Mutex<Vec<(String, AddEmojiRequest)>>,
    }

    #[async_trait]
    impl EmojiApi for FakeApi {
        async fn list_emojis(&self, base_url: &str) -> Result<Vec<Emoji>> {
            self.gets.lock().unwrap().push(base_url.to_string());
            if self.fail_list {
                return Err(AppError::HttpStatus {
                    code: 500,
                    url: base_url.to_string(),
                    body: String::new(),
                });
            }
            Ok(self.emojis.clone())
        }

        async fn add_emoji(&self, base_url: &str, request: &AddEmojiRequest) -> Result<u16> {
            let mut posts = self.posts.lock().unwrap();
            posts.push((base_url.to_string(), request.clone()));
            if self.fail_post_at == Some(posts.len()) {
                return Err(AppError::HttpStatus {
                    code: 400,
                    url: base_url.to_string(),
                    body: "INVALID_PARAM".into(),
                });
            }
            if self.drop_post_at == Some(posts.len()) {
                return Err(AppError::Transport {
                    message: "connection reset".into(),
                    source: None,
                });
            }
            Ok(200)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, outcome: &ImportOutcome) {
            self.messages.borrow_mut().push(outcome.to_string());
        }
    }

    fn emoji(name: &str) -> Emoji {
        Emoji {
            name: name.into(),
            url: format!("https://src.example/files/{name}.png"),
            category: Some("test".into()),
            aliases: Vec::new(),
        }
    }

    fn config() -> TransferConfig {
        TransferConfig {
            source_domain: "misskey.example".into(),
            destination_domain: "https://dest.example".into(),
            api_token: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_normalizes_source_and_dedups() {
        let api = FakeApi {
            emojis: vec![emoji("a"), emoji("b"), emoji("a"), emoji("c"), emoji("b")],
            ..Default::default()
        };
        let mut service = TransferService::new(api, config());

        service.fetch_emojis().await;

        assert_eq!(
            service.api.gets.lock().unwrap().as_slice(),
            &["https://misskey.example".to_string()]
        );
        let names: Vec<_> = service
            .catalog()
            .as_slice()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_keeps_http_source_scheme() {
        let mut service = TransferService::new(FakeApi::default(), config());
        service.set_source_domain("http://misskey.example");

        service.fetch_emojis().await;

        assert_eq!(
            service.api.gets.lock().unwrap().as_slice(),
            &["http://misskey.example".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_catalog_unchanged() {
        let api = FakeApi {
            fail_list: true,
            ..Default::default()
        };
        let mut service = TransferService::new(api, config());
        service.set_emojis(vec![emoji("old")]);

        service.fetch_emojis().await;

        assert_eq!(service.catalog().len(), 1);
        assert_eq!(service.catalog().as_slice()[0].name, "old");
    }

    #[tokio::test]
    async fn test_import_all_stops_at_first_failure() {
        let api = FakeApi {
            fail_post_at: Some(2),
            ..Default::default()
        };
        let mut service = TransferService::new(api, config());
        service.set_selected_emojis(vec![emoji("one"), emoji("two"), emoji("three")]);
        let notifier = RecordingNotifier::default();

        let outcome = service.import_all_emojis(&notifier).await;

        assert_eq!(outcome, ImportOutcome::AllFailed);
        assert_eq!(service.api.posts.lock().unwrap().len(), 2);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["Failed to import some or all emojis.".to_string()]
        );

        let statuses: Vec<_> = service.request_log().iter().map(|e| e.status).collect();
        assert_eq!(statuses, [Some(200), Some(400)]);
    }

    #[tokio::test]
    async fn test_import_all_transport_failure_reports_generic_failure() {
        let api = FakeApi {
            drop_post_at: Some(2),
            ..Default::default()
        };
        let mut service = TransferService::new(api, config());
        service.set_selected_emojis(vec![emoji("one"), emoji("two"), emoji("three")]);
        let notifier = RecordingNotifier::default();

        let outcome = service.import_all_emojis(&notifier).await;

        assert_eq!(outcome, ImportOutcome::AllFailed);
        assert_eq!(service.api.posts.lock().unwrap().len(), 2);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["Failed to import some or all emojis.".to_string()]
        );

        let statuses: Vec<_> = service.request_log().iter().map(|e| e.status).collect();
        assert_eq!(statuses, [Some(200), None]);
    }

    #[tokio::test]
    async fn test_import_selected_transport_failure() {
        let api = FakeApi {
            drop_post_at: Some(1),
            ..Default::default()
        };
        let mut service = TransferService::new(api, config());
        service.set_selected_emojis(vec![emoji("only"), emoji("ignored")]);
        let notifier = RecordingNotifier::default();

        let outcome = service.import_selected_emoji(&notifier).await;

        assert_eq!(outcome, ImportOutcome::SelectedFailed);
        assert_eq!(service.api.posts.lock().unwrap().len(), 1);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["Failed to import the selected emoji.".to_string()]
        );
        assert_eq!(service.request_log()[0].status, None);
    }

    #[tokio::test]
    async fn test_fetch_without_emojis_key_keeps_catalog() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/emojis");
                then.status(200).json_body(json!({"error": "rate limited"}));
            })
            .await;

        let api = HttpEmojiApi::new(&HttpSettings::default()).unwrap();
        let mut service = TransferService::new(api, config());
        service.set_source_domain(server.base_url());
        service.set_emojis(vec![emoji("old")]);

        assert!(matches!(
            service.try_fetch_emojis().await,
            Err(AppError::JsonParse { .. })
        ));
        service.fetch_emojis().await;

        assert_eq!(service.catalog().len(), 1);
        assert_eq!(service.catalog().as_slice()[0].name, "old");
    }

    #[tokio::test]
    async fn test_import_all_posts_in_selection_order() {
        let mut service = TransferService::new(FakeApi::default(), config());
        service.set_selected_emojis(vec![emoji("z"), emoji("a"), emoji("m")]);
        let notifier = RecordingNotifier::default();

        let outcome = service.import_all_emojis(&notifier).await;

        assert_eq!(outcome, ImportOutcome::AllImported { count: 3 });
        let posts = service.api.posts.lock().unwrap();
        let names: Vec<_> = posts.iter().map(|(_, r)| r.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
        // Destination is not scheme-normalized.
        assert!(posts.iter().all(|(url, r)| url == "https://dest.example" && r.i == "secret"));
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["All emojis imported successfully!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_import_all_with_empty_selection_succeeds() {
        let mut service = TransferService::new(FakeApi::default(), config());
        let notifier = RecordingNotifier::default();

        let outcome = service.import_all_emojis(&notifier).await;

        assert_eq!(outcome, ImportOutcome::AllImported { count: 0 });
        assert!(service.api.posts.lock().unwrap().is_empty());
        assert_eq!(notifier.messages.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_import_selected_posts_only_first() {
        let mut service = TransferService::new(FakeApi::default(), config());
        service.set_selected_emojis(vec![emoji("first"), emoji("second")]);
        let notifier = RecordingNotifier::default();

        let outcome = service.import_selected_emoji(&notifier).await;

        assert_eq!(
            outcome,
            ImportOutcome::SelectedImported {
                name: "first".into()
            }
        );
        assert_eq!(service.api.posts.lock().unwrap().len(), 1);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["Emoji \"first\" imported successfully!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_import_selected_with_empty_selection_fails() {
        let mut service = TransferService::new(FakeApi::default(), config());
        let notifier = RecordingNotifier::default();

        let outcome = service.import_selected_emoji(&notifier).await;

        assert_eq!(outcome, ImportOutcome::SelectedFailed);
        assert!(service.api.posts.lock().unwrap().is_empty());
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            &["Failed to import the selected emoji.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_token_resolved_from_store_when_unset() {
        let store = TokenStore::open_in_memory().unwrap();
        store
            .set_token("https://dest.example", "stored-token", "drive")
            .unwrap();

        let mut service =
            TransferService::new(FakeApi::default(), config()).with_token_store(store);
        service.set_api_token("");
        service.set_selected_emojis(vec![emoji("a")]);

        service
            .import_all_emojis(&RecordingNotifier::default())
            .await;

        let posts = service.api.posts.lock().unwrap();
        assert_eq!(posts[0].1.i, "stored-token");
    }

    #[tokio::test]
    async fn test_explicit_token_wins_over_store() {
        let store = TokenStore::open_in_memory().unwrap();
        store
            .set_token("https://dest.example", "stored-token", "")
            .unwrap();

        let mut service =
            TransferService::new(FakeApi::default(), config()).with_token_store(store);
        service.set_selected_emojis(vec![emoji("a")]);

        service
            .import_selected_emoji(&RecordingNotifier::default())
            .await;

        assert_eq!(service.api.posts.lock().unwrap()[0].1.i, "secret");
    }

    #[test]
    fn test_select_by_names_and_search() {
        let mut service = TransferService::new(FakeApi::default(), config());
        service.set_emojis(vec![emoji("blob"), emoji("cat"), emoji("blobcat")]);

        service
            .select_by_names(&["cat".into(), "blob".into()])
            .unwrap();
        let names: Vec<_> = service.selection().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["cat", "blob"]);

        assert!(service.select_by_names(&["missing".into()]).is_err());

        service.set_search_term("blob");
        service.select_matching();
        let names: Vec<_> = service.selection().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["blob", "blobcat"]);
    }
}
