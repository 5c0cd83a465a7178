//! Shared fixtures for integration tests: an in-memory `ContentSource` that
//! records every call and can be told to fail.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tn::api::{ApiError, Article, ContentSource, ContentSummary, Strategy};

/// Fake API serving generated listings. Pages hold `page_len` items unless
/// overridden with [`FakeSource::set_page_len`].
pub struct FakeSource {
    page_len: usize,
    page_overrides: RefCell<HashMap<u32, usize>>,
    listing_failure: Cell<Option<u16>>,
    article_failure: Cell<Option<u16>>,
    list_calls: RefCell<Vec<(u32, Strategy, u32)>>,
    article_calls: RefCell<Vec<(String, String)>>,
}

impl FakeSource {
    pub fn new(page_len: usize) -> Self {
        Self {
            page_len,
            page_overrides: RefCell::new(HashMap::new()),
            listing_failure: Cell::new(None),
            article_failure: Cell::new(None),
            list_calls: RefCell::new(Vec::new()),
            article_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn set_page_len(&self, page: u32, len: usize) {
        self.page_overrides.borrow_mut().insert(page, len);
    }

    /// Make listing calls answer with this HTTP status (`None` to recover).
    pub fn fail_listings(&self, status: Option<u16>) {
        self.listing_failure.set(status);
    }

    pub fn fail_articles(&self, status: Option<u16>) {
        self.article_failure.set(status);
    }

    pub fn list_calls(&self) -> Vec<(u32, Strategy, u32)> {
        self.list_calls.borrow().clone()
    }

    pub fn article_calls(&self) -> Vec<(String, String)> {
        self.article_calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.list_calls.borrow_mut().clear();
        self.article_calls.borrow_mut().clear();
    }
}

pub fn summary_id(strategy: Strategy, page: u32, index: usize) -> String {
    format!("{}-{page}-{index}", strategy.as_query())
}

impl ContentSource for &FakeSource {
    async fn list_content(
        &self,
        page: u32,
        strategy: Strategy,
        page_size: u32,
    ) -> Result<Vec<ContentSummary>, ApiError> {
        self.list_calls.borrow_mut().push((page, strategy, page_size));
        if let Some(status) = self.listing_failure.get() {
            return Err(ApiError::HttpStatus(status));
        }

        let len = self
            .page_overrides
            .borrow()
            .get(&page)
            .copied()
            .unwrap_or(self.page_len);
        Ok((0..len)
            .map(|i| ContentSummary {
                id: summary_id(strategy, page, i),
                slug: format!("post-{page}-{i}"),
                title: format!("{} post {i} on page {page}", strategy.label()),
                owner_username: format!("user{i}"),
                tabcoins: i as i64,
                published_at: None,
                children_deep_count: 0,
            })
            .collect())
    }

    async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError> {
        self.article_calls
            .borrow_mut()
            .push((owner.to_string(), slug.to_string()));
        if let Some(status) = self.article_failure.get() {
            return Err(ApiError::HttpStatus(status));
        }

        Ok(Article {
            id: format!("{owner}/{slug}"),
            slug: slug.to_string(),
            title: format!("Article {slug}"),
            body: format!("Body of {slug} by {owner}"),
            owner_username: owner.to_string(),
            tabcoins: 1,
            published_at: None,
            source_url: None,
        })
    }
}
