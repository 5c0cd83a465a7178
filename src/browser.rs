//! Load engine: runs navigation effects against the cache and the API.
//!
//! Every user action goes through two steps so the UI can draw a placeholder
//! in between:
//!
//! 1. [`Browser::begin`] reduces the action and marks the panes that will
//!    miss the cache as loading.
//! 2. [`Browser::finish`] executes the effects, fetching on a miss and writing
//!    results back into the cache.
//!
//! A candidate navigation state is committed only once its listing page is
//! available. A failed page load leaves the previous page, selection and
//! items in place and reports the error in the list pane; repeating the
//! action re-issues the same request.

use crate::api::{ApiError, Article, ContentSource, ContentSummary};
use crate::cache::{CacheStore, PageKey};
use crate::navigation::{Action, Effect, NavigationState};
use crate::snapshot::DiskSnapshot;
use std::sync::Arc;

/// What the list pane should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    /// The last page load failed; the previous items are still available.
    Failed(String),
}

/// What the reader pane should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderStatus {
    /// No row is selected (empty page or nothing loaded yet).
    Empty,
    Loading,
    Ready(Arc<Article>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// A reduced action whose effects have not run yet.
#[derive(Debug)]
#[must_use = "pass to Browser::finish to run the effects"]
pub struct Pending {
    candidate: NavigationState,
    effects: Vec<Effect>,
    prior_reader: ReaderStatus,
    placeholder: bool,
}

impl Pending {
    /// True if some pane switched to "Loading..." and is worth a redraw
    /// before the fetch starts.
    pub fn shows_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

pub struct Browser<S> {
    source: S,
    cache: CacheStore,
    snapshot: Option<DiskSnapshot>,
    nav: NavigationState,
    page_size: u32,
    items: Arc<Vec<ContentSummary>>,
    list: ListStatus,
    reader: ReaderStatus,
    notice: Option<String>,
    /// Page of the last failed load, until a page loads again.
    failed_page: Option<PageKey>,
}

impl<S: ContentSource> Browser<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            cache: CacheStore::new(),
            snapshot: None,
            nav: NavigationState::new(),
            page_size: page_size.max(1),
            items: Arc::new(Vec::new()),
            list: ListStatus::Loading,
            reader: ReaderStatus::Empty,
            notice: None,
            failed_page: None,
        }
    }

    /// Persist the article cache to `snapshot` on quit and clear it on refresh.
    pub fn with_snapshot(mut self, snapshot: DiskSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Seed the article cache from disk. Returns the number of articles loaded.
    pub fn restore_snapshot(&mut self) -> usize {
        let Some(snapshot) = &self.snapshot else {
            return 0;
        };
        let articles = snapshot.load();
        let count = articles.len();
        self.cache.extend_articles(articles);
        count
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Load the first page and its first article.
    pub async fn start(&mut self) -> Outcome {
        let pending = self.begin_initial();
        self.finish(pending).await
    }

    pub async fn dispatch(&mut self, action: Action) -> Outcome {
        let pending = self.begin(action);
        self.finish(pending).await
    }

    pub fn begin_initial(&mut self) -> Pending {
        let effects = self.nav.initial_load();
        self.prepare(self.nav.clone(), effects)
    }

    pub fn begin(&mut self, action: Action) -> Pending {
        // A reload after a failure asks for the page that failed
        let transition = match (action, self.failed_page) {
            (Action::Reload, Some(key)) => self.nav.retry_page(key),
            _ => self.nav.reduce(action),
        };
        tracing::trace!(?action, effects = ?transition.effects, "Reduced action");
        if transition.effects.is_empty() {
            // Pane focus changes need no loading
            self.nav = transition.state.clone();
        }
        self.prepare(transition.state, transition.effects)
    }

    fn prepare(&mut self, candidate: NavigationState, effects: Vec<Effect>) -> Pending {
        let prior_reader = self.reader.clone();
        let mut placeholder = false;
        let mut cleared = false;

        for effect in &effects {
            match *effect {
                Effect::ClearCaches => cleared = true,
                Effect::LoadPage(key) => {
                    if cleared || self.cache.get_page(&key).is_none() {
                        self.list = ListStatus::Loading;
                        self.reader = ReaderStatus::Loading;
                        placeholder = true;
                    }
                }
                Effect::LoadArticle(index) => {
                    let cached = self
                        .items
                        .get(index)
                        .map(|s| self.cache.get_article(&s.id).is_some())
                        .unwrap_or(true);
                    if !cached {
                        self.reader = ReaderStatus::Loading;
                        placeholder = true;
                    }
                }
                Effect::Persist | Effect::Exit => {}
            }
        }

        Pending {
            candidate,
            effects,
            prior_reader,
            placeholder,
        }
    }

    pub async fn finish(&mut self, pending: Pending) -> Outcome {
        let Pending {
            mut candidate,
            effects,
            prior_reader,
            ..
        } = pending;

        for effect in effects {
            match effect {
                Effect::ClearCaches => self.clear_caches(),
                Effect::LoadPage(key) => match self.load_page(key).await {
                    Ok(items) => {
                        candidate = candidate.with_item_count(items.len());
                        self.items = items;
                        self.list = ListStatus::Ready;
                        self.failed_page = None;
                        self.nav = candidate.clone();
                        self.load_selected_article().await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            page = key.page,
                            strategy = %key.strategy,
                            error = %e,
                            "Page load failed, keeping previous state"
                        );
                        self.list = ListStatus::Failed(e.to_string());
                        self.failed_page = Some(key);
                        self.reader = prior_reader;
                        return Outcome::Continue;
                    }
                },
                Effect::LoadArticle(_) => {
                    self.nav = candidate.clone();
                    self.load_selected_article().await;
                }
                Effect::Persist => self.persist(),
                Effect::Exit => return Outcome::Exit,
            }
        }

        self.nav = candidate;
        Outcome::Continue
    }

    // ========================================================================
    // Effects
    // ========================================================================

    async fn load_page(&mut self, key: PageKey) -> Result<Arc<Vec<ContentSummary>>, ApiError> {
        if let Some(items) = self.cache.get_page(&key) {
            tracing::debug!(page = key.page, strategy = %key.strategy, "Page cache hit");
            return Ok(items);
        }

        tracing::debug!(page = key.page, strategy = %key.strategy, "Page cache miss, fetching");
        let items = self
            .source
            .list_content(key.page, key.strategy, self.page_size)
            .await?;
        Ok(self.cache.put_page(key, items))
    }

    async fn load_selected_article(&mut self) {
        let items = Arc::clone(&self.items);
        let Some(summary) = items.get(self.nav.selected()) else {
            self.reader = ReaderStatus::Empty;
            return;
        };

        if let Some(article) = self.cache.get_article(&summary.id) {
            tracing::debug!(id = %summary.id, "Article cache hit");
            self.reader = ReaderStatus::Ready(article);
            return;
        }

        tracing::debug!(
            id = %summary.id,
            owner = %summary.owner_username,
            slug = %summary.slug,
            "Article cache miss, fetching"
        );
        self.reader = match self
            .source
            .get_article(&summary.owner_username, &summary.slug)
            .await
        {
            Ok(article) => ReaderStatus::Ready(self.cache.put_article(summary.id.clone(), article)),
            Err(e) => {
                tracing::warn!(id = %summary.id, error = %e, "Article load failed");
                ReaderStatus::Failed(e.to_string())
            }
        };
    }

    fn clear_caches(&mut self) {
        self.cache.clear_all();
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.clear() {
                tracing::warn!(path = %snapshot.path().display(), error = %e, "Failed to delete snapshot");
                self.notice = Some(format!("Could not delete cache file: {e}"));
            }
        }
    }

    /// Save the article cache if a snapshot is configured. Failures are
    /// logged and reported through [`Browser::take_notice`].
    pub fn persist(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if let Err(e) = snapshot.save(self.cache.articles()) {
            tracing::warn!(path = %snapshot.path().display(), error = %e, "Failed to save snapshot");
            self.notice = Some(format!("Could not save cache file: {e}"));
        }
    }

    // ========================================================================
    // Render-ready data
    // ========================================================================

    pub fn state(&self) -> &NavigationState {
        &self.nav
    }

    pub fn items(&self) -> &[ContentSummary] {
        &self.items
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.title.as_str())
    }

    pub fn selected_summary(&self) -> Option<&ContentSummary> {
        self.items.get(self.nav.selected())
    }

    pub fn list_status(&self) -> &ListStatus {
        &self.list
    }

    pub fn reader_status(&self) -> &ReaderStatus {
        &self.reader
    }

    /// Body of the article in the reader pane, if one is loaded.
    pub fn body(&self) -> Option<&str> {
        match &self.reader {
            ReaderStatus::Ready(article) => Some(&article.body),
            _ => None,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn snapshot(&self) -> Option<&DiskSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One-shot message for the status bar (persistence problems).
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Strategy;

    /// Source that serves a fixed page and never fails.
    struct StaticSource;

    impl ContentSource for StaticSource {
        async fn list_content(
            &self,
            page: u32,
            _strategy: Strategy,
            _page_size: u32,
        ) -> Result<Vec<ContentSummary>, ApiError> {
            Ok((0..3)
                .map(|i| ContentSummary {
                    id: format!("{page}-{i}"),
                    slug: format!("slug-{i}"),
                    title: format!("Item {i}"),
                    owner_username: "erin".to_string(),
                    tabcoins: 0,
                    published_at: None,
                    children_deep_count: 0,
                })
                .collect())
        }

        async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError> {
            Ok(Article {
                id: String::new(),
                slug: slug.to_string(),
                title: String::new(),
                body: format!("{owner}/{slug}"),
                owner_username: owner.to_string(),
                tabcoins: 0,
                published_at: None,
                source_url: None,
            })
        }
    }

    #[test]
    fn test_begin_initial_shows_placeholder() {
        let mut browser = Browser::new(StaticSource, 40);
        let pending = browser.begin_initial();
        assert!(pending.shows_placeholder());
        assert_eq!(browser.list_status(), &ListStatus::Loading);
        assert_eq!(browser.reader_status(), &ReaderStatus::Loading);
    }

    #[tokio::test]
    async fn test_cached_navigation_has_no_placeholder() {
        let mut browser = Browser::new(StaticSource, 40);
        browser.start().await;
        browser.dispatch(Action::MoveSelection(1)).await;

        // Row 0 and page 1 are both cached now
        let pending = browser.begin(Action::MoveSelection(-1));
        assert!(!pending.shows_placeholder());
        browser.finish(pending).await;
        assert_eq!(browser.body(), Some("erin/slug-0"));
    }

    #[tokio::test]
    async fn test_pane_switch_commits_without_effects() {
        let mut browser = Browser::new(StaticSource, 40);
        browser.start().await;
        let pending = browser.begin(Action::SwitchPane);
        assert!(pending.effects().is_empty());
        assert_eq!(browser.state().pane(), crate::navigation::Pane::Reader);
        assert_eq!(browser.finish(pending).await, Outcome::Continue);
    }

    #[tokio::test]
    async fn test_quit_exits() {
        let mut browser = Browser::new(StaticSource, 40);
        browser.start().await;
        assert_eq!(browser.dispatch(Action::Quit).await, Outcome::Exit);
    }

    #[tokio::test]
    async fn test_titles_follow_items() {
        let mut browser = Browser::new(StaticSource, 40);
        browser.start().await;
        let titles: Vec<&str> = browser.titles().collect();
        assert_eq!(titles, vec!["Item 0", "Item 1", "Item 2"]);
        assert_eq!(browser.selected_summary().map(|s| s.id.as_str()), Some("1-0"));
    }
}
