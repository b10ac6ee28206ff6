use crate::utils::slug::paths_equivalent;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Published,
    Draft,
}

/// A content item as the platform's store hands it out. The metadata bag
/// itself stays behind [`MetadataStore`]; this crate only ever touches the
/// custom-path key (and optionally the alias key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub kind: String,
    pub status: ContentStatus,
}

impl ContentItem {
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id: ContentId(id),
            kind: kind.into(),
            status: ContentStatus::Published,
        }
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }
}

/// Either a bare id or an already-loaded item, resolved once at the boundary.
#[derive(Debug, Clone)]
pub enum ContentRef {
    Id(ContentId),
    Loaded(ContentItem),
}

impl ContentRef {
    pub fn load(self, store: &impl ContentLookup) -> Option<ContentItem> {
        match self {
            ContentRef::Id(id) => store.get(id),
            ContentRef::Loaded(item) => Some(item),
        }
    }
}

impl From<ContentId> for ContentRef {
    fn from(id: ContentId) -> Self {
        ContentRef::Id(id)
    }
}

impl From<u64> for ContentRef {
    fn from(id: u64) -> Self {
        ContentRef::Id(ContentId(id))
    }
}

impl From<ContentItem> for ContentRef {
    fn from(item: ContentItem) -> Self {
        ContentRef::Loaded(item)
    }
}

/// Metadata-driven lookup filter.
///
/// `meta_value` comparisons are leading/trailing-slash-insensitive: a stored
/// "2011/x" matches a wanted "/2011/x/". Implementations must honor this rule,
/// it is what keeps write-time uniqueness and read-time resolution agreeing on
/// one equality.
#[derive(Debug, Clone, Default)]
pub struct MetaQuery<'a> {
    pub kinds: &'a [String],
    pub meta_key: &'a str,
    pub meta_value: Option<&'a str>,
    pub exclude: Option<ContentId>,
    pub limit: Option<usize>,
}

pub trait ContentLookup {
    fn get(&self, id: ContentId) -> Option<ContentItem>;

    /// Items matching the query, in the store's stable enumeration order.
    /// Callers must not rely on any cross-item ordering beyond stability.
    fn find(&self, query: &MetaQuery) -> Vec<ContentItem>;
}

pub trait MetadataStore {
    fn get_meta(&self, id: ContentId, key: &str) -> Option<String>;
    fn set_meta(&mut self, id: ContentId, key: &str, value: &str);
    fn delete_meta(&mut self, id: ContentId, key: &str);
}

pub trait ContentStore: ContentLookup + MetadataStore {}

impl<T: ContentLookup + MetadataStore> ContentStore for T {}

/// In-memory content store. The test collaborator, and a working store for
/// embedders without a platform backend. Enumeration order is id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<ContentId, ContentItem>,
    meta: HashMap<(ContentId, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: ContentItem) {
        self.items.insert(item.id, item);
    }

    pub fn with_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }
}

impl ContentLookup for MemoryStore {
    fn get(&self, id: ContentId) -> Option<ContentItem> {
        self.items.get(&id).cloned()
    }

    fn find(&self, query: &MetaQuery) -> Vec<ContentItem> {
        let matches = self.items.values().filter(|item| {
            if !query.kinds.is_empty() && !query.kinds.iter().any(|kind| *kind == item.kind) {
                return false;
            }
            if query.exclude == Some(item.id) {
                return false;
            }
            match self.meta.get(&(item.id, query.meta_key.to_owned())) {
                Some(stored) => query
                    .meta_value
                    .is_none_or(|wanted| paths_equivalent(stored, wanted)),
                None => false,
            }
        });

        match query.limit {
            Some(limit) => matches.take(limit).cloned().collect(),
            None => matches.cloned().collect(),
        }
    }
}

impl MetadataStore for MemoryStore {
    fn get_meta(&self, id: ContentId, key: &str) -> Option<String> {
        self.meta.get(&(id, key.to_owned())).cloned()
    }

    fn set_meta(&mut self, id: ContentId, key: &str, value: &str) {
        self.meta.insert((id, key.to_owned()), value.to_owned());
    }

    fn delete_meta(&mut self, id: ContentId, key: &str) {
        self.meta.remove(&(id, key.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> MemoryStore {
        let mut store = MemoryStore::with_items([
            ContentItem::new(1, "page"),
            ContentItem::new(2, "page"),
            ContentItem::new(3, "post"),
        ]);
        store.set_meta(ContentId(1), "custom_permalink", "contact");
        store.set_meta(ContentId(3), "custom_permalink", "2011/news");
        store
    }

    #[test]
    fn find_filters_by_kind_and_key() {
        let store = sample_store();
        let kinds = vec!["page".to_owned()];
        let query = MetaQuery {
            kinds: &kinds,
            meta_key: "custom_permalink",
            ..Default::default()
        };

        let found = store.find(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ContentId(1));
    }

    #[test]
    fn find_value_match_is_slash_insensitive() {
        let store = sample_store();
        let kinds = vec!["post".to_owned()];
        let query = MetaQuery {
            kinds: &kinds,
            meta_key: "custom_permalink",
            meta_value: Some("/2011/news/"),
            ..Default::default()
        };

        assert_eq!(store.find(&query).len(), 1);
    }

    #[test]
    fn find_respects_exclusion() {
        let store = sample_store();
        let kinds = vec!["page".to_owned()];
        let query = MetaQuery {
            kinds: &kinds,
            meta_key: "custom_permalink",
            meta_value: Some("contact"),
            exclude: Some(ContentId(1)),
            ..Default::default()
        };

        assert!(store.find(&query).is_empty());
    }

    #[test]
    fn content_ref_loads_once() {
        let store = sample_store();
        let loaded = ContentRef::from(1u64).load(&store).unwrap();
        assert_eq!(loaded.kind, "page");
        assert!(ContentRef::from(99u64).load(&store).is_none());
    }
}
