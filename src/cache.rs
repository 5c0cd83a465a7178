//! In-memory cache for listing pages and articles.
//!
//! Pages are keyed by `(strategy, page)` so that the two rankings never share
//! entries. Articles are keyed by content id and are shared by every listing
//! that surfaces them. There is no eviction: entries live until
//! [`CacheStore::clear_all`] or process exit.

use crate::api::{Article, ContentSummary, Strategy};
use std::collections::HashMap;
use std::sync::Arc;

/// Composite key for one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub strategy: Strategy,
    /// 1-indexed; `new` clamps 0 up to 1.
    pub page: u32,
}

impl PageKey {
    pub fn new(strategy: Strategy, page: u32) -> Self {
        Self {
            strategy,
            page: page.max(1),
        }
    }
}

/// Listing pages and articles fetched during this session.
///
/// Values are stored behind `Arc` so handing a page to the view is a
/// refcount bump rather than a clone of the whole list.
#[derive(Debug, Default)]
pub struct CacheStore {
    pages: HashMap<PageKey, Arc<Vec<ContentSummary>>>,
    articles: HashMap<String, Arc<Article>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_page(&self, key: &PageKey) -> Option<Arc<Vec<ContentSummary>>> {
        self.pages.get(key).map(Arc::clone)
    }

    /// Store a page, replacing any previous entry for `key`.
    ///
    /// Returns the stored handle.
    pub fn put_page(&mut self, key: PageKey, items: Vec<ContentSummary>) -> Arc<Vec<ContentSummary>> {
        let items = Arc::new(items);
        self.pages.insert(key, Arc::clone(&items));
        items
    }

    pub fn get_article(&self, id: &str) -> Option<Arc<Article>> {
        self.articles.get(id).map(Arc::clone)
    }

    /// Store an article, replacing any previous entry for `id`.
    pub fn put_article(&mut self, id: String, article: Article) -> Arc<Article> {
        let article = Arc::new(article);
        self.articles.insert(id, Arc::clone(&article));
        article
    }

    /// Seed the article map, e.g. from a disk snapshot.
    pub fn extend_articles<I>(&mut self, articles: I)
    where
        I: IntoIterator<Item = (String, Article)>,
    {
        self.articles
            .extend(articles.into_iter().map(|(id, a)| (id, Arc::new(a))));
    }

    /// Borrowed view of every cached article, keyed by id.
    pub fn articles(&self) -> impl Iterator<Item = (&str, &Article)> {
        self.articles.iter().map(|(id, a)| (id.as_str(), a.as_ref()))
    }

    /// Drop every page and article.
    pub fn clear_all(&mut self) {
        tracing::debug!(
            pages = self.pages.len(),
            articles = self.articles.len(),
            "Clearing cache"
        );
        self.pages.clear();
        self.articles.clear();
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> ContentSummary {
        ContentSummary {
            id: id.to_string(),
            slug: format!("slug-{id}"),
            title: format!("Title {id}"),
            owner_username: "carol".to_string(),
            tabcoins: 0,
            published_at: None,
            children_deep_count: 0,
        }
    }

    fn article(id: &str, body: &str) -> Article {
        Article {
            id: id.to_string(),
            slug: format!("slug-{id}"),
            title: format!("Title {id}"),
            body: body.to_string(),
            owner_username: "carol".to_string(),
            tabcoins: 0,
            published_at: None,
            source_url: None,
        }
    }

    #[test]
    fn test_page_key_clamps_zero() {
        assert_eq!(PageKey::new(Strategy::Recent, 0).page, 1);
    }

    #[test]
    fn test_page_miss_then_hit() {
        let mut cache = CacheStore::new();
        let key = PageKey::new(Strategy::Relevant, 1);
        assert!(cache.get_page(&key).is_none());

        cache.put_page(key, vec![summary("a"), summary("b")]);
        let page = cache.get_page(&key).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "a");
    }

    #[test]
    fn test_strategies_do_not_share_pages() {
        let mut cache = CacheStore::new();
        cache.put_page(PageKey::new(Strategy::Relevant, 1), vec![summary("r")]);

        assert!(cache.get_page(&PageKey::new(Strategy::Recent, 1)).is_none());

        cache.put_page(PageKey::new(Strategy::Recent, 1), vec![summary("n")]);
        assert_eq!(cache.get_page(&PageKey::new(Strategy::Relevant, 1)).unwrap()[0].id, "r");
        assert_eq!(cache.get_page(&PageKey::new(Strategy::Recent, 1)).unwrap()[0].id, "n");
        assert_eq!(cache.page_count(), 2);
    }

    #[test]
    fn test_put_page_overwrites() {
        let mut cache = CacheStore::new();
        let key = PageKey::new(Strategy::Relevant, 2);
        cache.put_page(key, vec![summary("old")]);
        cache.put_page(key, vec![summary("new"), summary("newer")]);
        assert_eq!(cache.get_page(&key).unwrap().len(), 2);
        assert_eq!(cache.page_count(), 1);
    }

    #[test]
    fn test_put_article_overwrites() {
        let mut cache = CacheStore::new();
        cache.put_article("a".to_string(), article("a", "first"));
        cache.put_article("a".to_string(), article("a", "second"));
        assert_eq!(cache.get_article("a").unwrap().body, "second");
        assert_eq!(cache.article_count(), 1);
    }

    #[test]
    fn test_clear_all_drops_both_maps() {
        let mut cache = CacheStore::new();
        cache.put_page(PageKey::new(Strategy::Relevant, 1), vec![summary("a")]);
        cache.put_article("a".to_string(), article("a", "body"));

        cache.clear_all();

        assert_eq!(cache.page_count(), 0);
        assert_eq!(cache.article_count(), 0);
        assert!(cache.get_article("a").is_none());
    }

    #[test]
    fn test_extend_articles_and_iterate() {
        let mut cache = CacheStore::new();
        cache.extend_articles(vec![
            ("a".to_string(), article("a", "x")),
            ("b".to_string(), article("b", "y")),
        ]);

        let mut ids: Vec<&str> = cache.articles().map(|(id, _)| id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
