use crate::api::ContentSource;
use crate::browser::Browser;
use crate::keybindings::{Context, KeybindingRegistry};
use crate::navigation::Pane;
use crate::util::{article_url, validate_url_for_open};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::borrow::Cow;
use tokio::time::Instant;

/// Maximum scroll offset for the reader pane (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// How long a status bar message stays up.
const STATUS_TTL_SECS: u64 = 3;

/// Terminal-side state around a [`Browser`].
///
/// Everything here is presentation: scroll offsets, the info screen, the
/// transient status line and the pane rectangles from the last frame (used
/// for mouse hit-testing). Navigation itself lives in the browser.
pub struct App<S> {
    pub browser: Browser<S>,
    pub keybindings: KeybindingRegistry,
    /// Public site root for "open in browser".
    pub site_url: String,

    pub reader_scroll: usize,
    /// Rows visible inside the reader border, set on every render.
    pub reader_visible_lines: usize,
    /// Wrapped line count of the reader content, set on every render.
    pub reader_line_count: usize,
    pub show_info: bool,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    pub list_state: ListState,
    /// Rows of the list widget itself (inside the border), for click mapping.
    pub list_rows_area: Rect,
    pub reader_area: Rect,

    /// Id of the selected summary at the last sync, to reset scroll when it
    /// changes.
    shown_article: Option<String>,
}

impl<S: ContentSource> App<S> {
    pub fn new(browser: Browser<S>, keybindings: KeybindingRegistry, site_url: String) -> Self {
        Self {
            browser,
            keybindings,
            site_url,
            reader_scroll: 0,
            reader_visible_lines: 0,
            reader_line_count: 0,
            show_info: false,
            status_message: None,
            needs_redraw: true,
            list_state: ListState::default(),
            list_rows_area: Rect::default(),
            reader_area: Rect::default(),
            shown_article: None,
        }
    }

    /// Keybinding context for the focused pane.
    pub fn context(&self) -> Context {
        match self.browser.state().pane() {
            Pane::List => Context::List,
            Pane::Reader => Context::Reader,
        }
    }

    /// Bring presentation state in line with the browser after a load.
    ///
    /// A different article resets the reader scroll and closes the info
    /// screen; persistence notices are moved to the status bar.
    pub fn sync_with_browser(&mut self) {
        let key = self.browser.selected_summary().map(|s| s.id.as_str());
        if key != self.shown_article.as_deref() {
            self.shown_article = key.map(str::to_owned);
            self.reader_scroll = 0;
            self.show_info = false;
        }

        self.list_state.select(if self.browser.items().is_empty() {
            None
        } else {
            Some(self.browser.state().selected())
        });

        if let Some(notice) = self.browser.take_notice() {
            self.set_status(notice);
        }
        self.needs_redraw = true;
    }

    // ========================================================================
    // Reader scrolling
    // ========================================================================

    fn max_scroll(&self) -> usize {
        self.reader_line_count
            .saturating_sub(self.reader_visible_lines)
            .min(MAX_SCROLL)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.reader_scroll = self.reader_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.reader_scroll = self.reader_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.reader_visible_lines.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.reader_visible_lines.max(1));
    }

    /// Keep the offset valid after the content or the pane size changed.
    pub fn clamp_reader_scroll(&mut self) {
        self.reader_scroll = self.reader_scroll.min(self.max_scroll());
    }

    // ========================================================================
    // Browser links
    // ========================================================================

    /// Public URL of the selected item.
    pub fn selected_article_url(&self) -> Result<url::Url, Cow<'static, str>> {
        let summary = self
            .browser
            .selected_summary()
            .ok_or(Cow::Borrowed("No article selected"))?;
        article_url(&self.site_url, &summary.owner_username, &summary.slug)
            .map_err(|e| Cow::Owned(e.to_string()))
    }

    /// Open the selected item in the system browser.
    pub fn open_selected_in_browser(&mut self) {
        let url = match self.selected_article_url() {
            Ok(url) => url,
            Err(msg) => {
                self.set_status(msg);
                return;
            }
        };

        // Re-check the final string right before it reaches the opener
        if let Err(e) = validate_url_for_open(url.as_str()) {
            self.set_status(e.to_string());
        } else if let Err(e) = open::that(url.as_str()) {
            tracing::warn!(url = %url, error = %e, "Failed to open browser");
            self.set_status(format!("Failed to open browser: {}", e));
        } else {
            self.set_status(format!("Opening {}", url));
        }
    }

    // ========================================================================
    // Status bar
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, Article, ContentSummary, Strategy};
    use crate::navigation::Action;
    use std::time::Duration;
    use tokio::time;

    /// Serves `len` items per page with long bodies.
    pub(crate) struct FixedSource {
        pub len: usize,
    }

    impl ContentSource for FixedSource {
        async fn list_content(
            &self,
            page: u32,
            _strategy: Strategy,
            _page_size: u32,
        ) -> Result<Vec<ContentSummary>, ApiError> {
            Ok((0..self.len)
                .map(|i| ContentSummary {
                    id: format!("p{page}-{i}"),
                    slug: format!("post-{i}"),
                    title: format!("Post {i}"),
                    owner_username: "grace".to_string(),
                    tabcoins: 3,
                    published_at: None,
                    children_deep_count: 1,
                })
                .collect())
        }

        async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError> {
            Ok(Article {
                id: format!("{owner}-{slug}"),
                slug: slug.to_string(),
                title: slug.to_string(),
                body: "line\n".repeat(100),
                owner_username: owner.to_string(),
                tabcoins: 3,
                published_at: None,
                source_url: None,
            })
        }
    }

    pub(crate) async fn test_app(len: usize) -> App<FixedSource> {
        let mut browser = Browser::new(FixedSource { len }, 40);
        browser.start().await;
        let mut app = App::new(
            browser,
            KeybindingRegistry::new(),
            "https://www.tabnews.com.br".to_string(),
        );
        app.sync_with_browser();
        app
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app(1).await;
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_scroll_is_clamped_to_content() {
        let mut app = test_app(2).await;
        app.reader_line_count = 50;
        app.reader_visible_lines = 20;

        app.scroll_down(100);
        assert_eq!(app.reader_scroll, 30);
        app.page_up();
        assert_eq!(app.reader_scroll, 10);
        app.scroll_up(100);
        assert_eq!(app.reader_scroll, 0);

        app.reader_scroll = 30;
        app.reader_line_count = 25;
        app.clamp_reader_scroll();
        assert_eq!(app.reader_scroll, 5);
    }

    #[tokio::test]
    async fn test_new_article_resets_scroll_and_info() {
        let mut app = test_app(3).await;
        app.reader_line_count = 100;
        app.reader_visible_lines = 10;
        app.scroll_down(40);
        app.show_info = true;

        app.browser.dispatch(Action::MoveSelection(1)).await;
        app.sync_with_browser();

        assert_eq!(app.reader_scroll, 0);
        assert!(!app.show_info);
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn test_pane_switch_keeps_scroll() {
        let mut app = test_app(3).await;
        app.reader_line_count = 100;
        app.reader_visible_lines = 10;
        app.scroll_down(7);

        app.browser.dispatch(Action::SwitchPane).await;
        app.sync_with_browser();

        assert_eq!(app.reader_scroll, 7);
        assert_eq!(app.context(), Context::Reader);
    }

    #[tokio::test]
    async fn test_selected_article_url() {
        let app = test_app(2).await;
        assert_eq!(
            app.selected_article_url().unwrap().as_str(),
            "https://www.tabnews.com.br/grace/post-0"
        );
    }

    #[tokio::test]
    async fn test_empty_page_has_no_url_or_selection() {
        let app = test_app(0).await;
        assert!(app.selected_article_url().is_err());
        assert_eq!(app.list_state.selected(), None);
    }
}
