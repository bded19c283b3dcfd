/// Feed derivation engine
///
/// This module turns the photo collection into what the window shows:
/// - `filter.rs` - category selection
/// - `sort.rs` - per-tab ordering
/// - `geo.rs` - haversine distance for the location tabs
/// - `reveal.rs` - page-by-page reveal of the grid
/// - `view.rs` - grid/map selection
///
/// Derivation is a pure function of (collection, query). `FeedCache`
/// memoizes it, keyed on everything the result depends on.

pub mod filter;
pub mod geo;
pub mod reveal;
pub mod sort;
pub mod view;

pub use filter::CategoryFilter;
pub use reveal::RevealController;
pub use sort::Tab;
pub use view::{ViewMode, ViewSelector};

use tracing::debug;

use crate::state::collection::Collection;
use crate::state::data::{Coordinates, Photo};

/// Everything the derived feed depends on besides the collection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedQuery {
    pub category: CategoryFilter,
    pub tab: Tab,
    /// Bumped every time the Random tab is picked, even if it is already
    /// active, so each pick produces a new shuffle
    pub shuffle_epoch: u64,
    pub user_location: Option<Coordinates>,
}

impl FeedQuery {
    /// Activate a tab. Picking Random always starts a new shuffle epoch.
    pub fn select_tab(&mut self, tab: Tab) {
        if tab == Tab::Random {
            self.shuffle_epoch += 1;
        }
        self.tab = tab;
    }
}

/// Filter then sort the collection for `query`
pub fn derive_feed(photos: &[Photo], query: &FeedQuery) -> Vec<Photo> {
    let filtered = filter::filter_photos(photos, query.category);
    sort::sort_photos(filtered, query.tab, query.user_location)
        .into_iter()
        .cloned()
        .collect()
}

/// The prefix of the feed the grid currently shows
pub fn visible_slice<'a>(feed: &'a [Photo], reveal: &RevealController) -> &'a [Photo] {
    &feed[..reveal.visible_count().min(feed.len())]
}

/// Position of a photo within the feed, for previous/next navigation in
/// the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub index: usize,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Neighbors {
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Find the photos before and after `id` in the feed
pub fn neighbors(feed: &[Photo], id: &str) -> Option<Neighbors> {
    let index = feed.iter().position(|p| p.id == id)?;
    Some(Neighbors {
        index,
        previous: index.checked_sub(1).map(|i| feed[i].id.clone()),
        next: feed.get(index + 1).map(|p| p.id.clone()),
    })
}

#[derive(Debug, Clone, PartialEq)]
struct DerivationKey {
    revision: u64,
    category: CategoryFilter,
    tab: Tab,
    shuffle_epoch: u64,
    /// Only part of the key for the tabs that read it
    user_location: Option<Coordinates>,
}

impl DerivationKey {
    fn new(collection: &Collection, query: &FeedQuery) -> Self {
        Self {
            revision: collection.revision(),
            category: query.category,
            tab: query.tab,
            shuffle_epoch: query.shuffle_epoch,
            user_location: if query.tab.needs_location() { query.user_location } else { None },
        }
    }
}

/// Memoized feed derivation
///
/// Recomputes only when the collection revision or a relevant query field
/// changes. A Random feed therefore stays put across unrelated updates and
/// reshuffles exactly when the shuffle epoch moves.
#[derive(Debug, Default)]
pub struct FeedCache {
    key: Option<DerivationKey>,
    feed: Vec<Photo>,
}

impl FeedCache {
    /// Bring the cache up to date. Returns whether the feed was recomputed.
    pub fn refresh(&mut self, collection: &Collection, query: &FeedQuery) -> bool {
        let key = DerivationKey::new(collection, query);
        if self.key.as_ref() == Some(&key) {
            return false;
        }

        self.feed = derive_feed(collection.photos(), query);
        debug!(
            category = %query.category,
            tab = %query.tab,
            epoch = query.shuffle_epoch,
            len = self.feed.len(),
            "derived feed"
        );
        self.key = Some(key);
        true
    }

    pub fn feed(&self) -> &[Photo] {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::collection::tests::photo;
    use crate::state::data::Category;

    fn ids(photos: &[Photo]) -> Vec<String> {
        photos.iter().map(|p| p.id.clone()).collect()
    }

    fn collection() -> Collection {
        let mut photos: Vec<Photo> = (0..12).map(|i| photo(&format!("p{}", i), (i % 6) as u8)).collect();
        photos[3].category = Category::Street;
        photos[7].category = Category::Street;
        Collection::new(photos).unwrap()
    }

    #[test]
    fn test_derive_filters_then_sorts() {
        let collection = collection();
        let query = FeedQuery {
            category: CategoryFilter::Only(Category::Landscape),
            tab: Tab::Curated,
            ..FeedQuery::default()
        };

        // Ratings cycle 0..5; p3 (3) and p7 (1) are Street
        let feed = derive_feed(collection.photos(), &query);
        assert_eq!(ids(&feed), ["p5", "p11", "p4", "p10"]);
    }

    #[test]
    fn test_select_random_bumps_epoch_every_time() {
        let mut query = FeedQuery::default();
        query.select_tab(Tab::Random);
        query.select_tab(Tab::Random);
        assert_eq!(query.shuffle_epoch, 2);

        query.select_tab(Tab::Newest);
        assert_eq!(query.shuffle_epoch, 2);
        assert_eq!(query.tab, Tab::Newest);
    }

    #[test]
    fn test_cache_recomputes_on_epoch_only_for_changes() {
        let collection = collection();
        let mut cache = FeedCache::default();
        let mut query = FeedQuery::default();

        query.select_tab(Tab::Random);
        assert!(cache.refresh(&collection, &query));
        let first = ids(cache.feed());

        // Same key: the shuffle is kept
        assert!(!cache.refresh(&collection, &query));
        assert_eq!(ids(cache.feed()), first);

        query.select_tab(Tab::Random);
        assert!(cache.refresh(&collection, &query));
    }

    #[test]
    fn test_cache_ignores_location_for_other_tabs() {
        let collection = collection();
        let mut cache = FeedCache::default();
        let mut query = FeedQuery::default();

        assert!(cache.refresh(&collection, &query));
        query.user_location = Some(Coordinates::new(1.0, 2.0));
        assert!(!cache.refresh(&collection, &query));

        query.select_tab(Tab::Nearby);
        assert!(cache.refresh(&collection, &query));
        query.user_location = Some(Coordinates::new(3.0, 4.0));
        assert!(cache.refresh(&collection, &query));
    }

    #[test]
    fn test_cache_tracks_collection_revision() {
        let mut collection = collection();
        let mut cache = FeedCache::default();
        let query = FeedQuery::default();

        cache.refresh(&collection, &query);
        collection.upsert(photo("new", 5));
        assert!(cache.refresh(&collection, &query));
        assert_eq!(cache.feed()[0].id, "new");
    }

    #[test]
    fn test_visible_slice_is_prefix() {
        let collection = collection();
        let feed = derive_feed(collection.photos(), &FeedQuery::default());

        let mut reveal = RevealController::new(5);
        reveal.on_query_changed(feed.len(), ViewMode::Grid);
        assert_eq!(ids(visible_slice(&feed, &reveal)), ids(&feed[..5]));

        let registration = reveal.observe_sentinel().unwrap();
        reveal.on_sentinel_visible(registration);
        reveal.on_sentinel_visible(registration);
        assert_eq!(visible_slice(&feed, &reveal).len(), 12);
    }

    #[test]
    fn test_empty_feed() {
        let collection = collection();
        let query = FeedQuery {
            category: CategoryFilter::Only(Category::Macro),
            ..FeedQuery::default()
        };
        let feed = derive_feed(collection.photos(), &query);
        assert!(feed.is_empty());

        let mut reveal = RevealController::default();
        reveal.on_query_changed(feed.len(), ViewMode::Grid);
        assert!(visible_slice(&feed, &reveal).is_empty());
        assert!(reveal.is_complete());
    }

    #[test]
    fn test_neighbors() {
        let collection = collection();
        let feed = derive_feed(collection.photos(), &FeedQuery::default());

        let first = neighbors(&feed, "p0").unwrap();
        assert!(!first.has_previous());
        assert_eq!(first.next.as_deref(), Some("p1"));

        let last = neighbors(&feed, "p11").unwrap();
        assert_eq!(last.previous.as_deref(), Some("p10"));
        assert!(!last.has_next());

        assert!(neighbors(&feed, "missing").is_none());
    }
}
