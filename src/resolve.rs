use crate::{
    PermalinkError,
    config::PermalinkConfig,
    content::{ContentId, ContentItem, ContentLookup, MetaQuery},
};

/// Options for reverse resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOpts {
    /// Item to ignore while matching (the item being edited, typically).
    pub exclude: Option<ContentId>,
    /// Match against the alias metadata key instead of the primary one.
    pub alias: bool,
}

/// Find the content item whose stored custom path matches `input`.
///
/// The input is percent-decoded and the configured front prefix stripped
/// before matching. When the exact form misses, at most two more variants are
/// tried: leading slash stripped, then trailing slash appended. If decoding
/// changed the input, the same chain runs once more on the undecoded form
/// (stored paths are never decoded, so a literal `%41` stays `%41`). `Ok(None)`
/// means no item claims the path; two items claiming it is a store
/// inconsistency and surfaces as [`PermalinkError::DuplicatePath`].
pub fn resolve_path(
    config: &PermalinkConfig,
    store: &impl ContentLookup,
    input: &str,
    opts: &ResolveOpts,
) -> Result<Option<ContentItem>, PermalinkError> {
    let meta_key = if opts.alias {
        config.alias_meta_key.as_str()
    } else {
        config.meta_key.as_str()
    };
    resolve_with_key(config, store, input, meta_key, opts.exclude)
}

fn resolve_with_key(
    config: &PermalinkConfig,
    store: &impl ContentLookup,
    input: &str,
    meta_key: &str,
    exclude: Option<ContentId>,
) -> Result<Option<ContentItem>, PermalinkError> {
    let decoded = match urlencoding::decode(input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => input.to_owned(),
    };
    let path = strip_front(&decoded, config.front_prefix());

    let mut candidates = variants(&path);
    // a stored path may itself contain a literal percent-escape; when
    // decoding changed the input, retry the undecoded form
    let raw = strip_front(input, config.front_prefix());
    if raw != path {
        candidates.extend(variants(&raw));
    }

    for candidate in candidates {
        let query = MetaQuery {
            kinds: &config.types,
            meta_key,
            meta_value: Some(&candidate),
            exclude,
            limit: Some(2),
        };

        let mut hits = store.find(&query);
        match hits.len() {
            0 => continue,
            1 => return Ok(Some(hits.remove(0))),
            // the uniqueness invariant broke somewhere upstream
            _ => return Err(PermalinkError::DuplicatePath { path: candidate }),
        }
    }

    Ok(None)
}

fn strip_front(path: &str, front: &str) -> String {
    if front.is_empty() {
        return path.to_owned();
    }
    if let Some(rest) = path.strip_prefix(front) {
        return rest.to_owned();
    }
    if let Some(rest) = path.trim_start_matches('/').strip_prefix(front) {
        return rest.to_owned();
    }
    path.to_owned()
}

// Bounded fallback chain: the path as given, then with the leading slash
// stripped, then with a trailing slash appended. Never more than 3 lookups.
fn variants(path: &str) -> Vec<String> {
    let mut out = vec![path.to_owned()];

    let stripped = path.trim_start_matches('/');
    if stripped != path {
        out.push(stripped.to_owned());
    }

    if !stripped.ends_with('/') {
        out.push(format!("{stripped}/"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentItem, MemoryStore, MetadataStore};

    fn setup() -> (PermalinkConfig, MemoryStore) {
        let config = PermalinkConfig::default();
        let mut store = MemoryStore::with_items([
            ContentItem::new(1, "page"),
            ContentItem::new(2, "page"),
        ]);
        store.set_meta(ContentId(1), "custom_permalink", "2011/about");
        store.set_meta(ContentId(2), "custom_permalink", "contact2");
        (config, store)
    }

    #[test]
    fn round_trip_over_slash_variants() {
        let (config, store) = setup();
        for input in ["2011/about", "2011/about/", "/2011/about"] {
            let item = resolve_path(&config, &store, input, &ResolveOpts::default())
                .unwrap()
                .unwrap_or_else(|| panic!("no match for {input:?}"));
            assert_eq!(item.id, ContentId(1));
        }
    }

    #[test]
    fn no_match_falls_back_through_slash_chain() {
        let (config, store) = setup();
        let item = resolve_path(&config, &store, "/contact2/", &ResolveOpts::default())
            .unwrap()
            .unwrap();
        assert_eq!(item.id, ContentId(2));
    }

    #[test]
    fn exclusion_is_respected() {
        let (config, store) = setup();
        let opts = ResolveOpts { exclude: Some(ContentId(2)), ..Default::default() };
        assert!(resolve_path(&config, &store, "contact2", &opts).unwrap().is_none());
    }

    #[test]
    fn unknown_path_is_not_found() {
        let (config, store) = setup();
        assert!(
            resolve_path(&config, &store, "missing", &ResolveOpts::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn front_prefix_is_stripped() {
        let (mut config, store) = setup();
        config.front = Some("index.php/".into());

        let item = resolve_path(
            &config,
            &store,
            "/index.php/2011/about",
            &ResolveOpts::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(item.id, ContentId(1));
    }

    #[test]
    fn percent_encoded_input_is_decoded() {
        let (config, mut store) = setup();
        store.insert(ContentItem::new(3, "page"));
        store.set_meta(ContentId(3), "custom_permalink", "about us");

        let item = resolve_path(&config, &store, "about%20us", &ResolveOpts::default())
            .unwrap()
            .unwrap();
        assert_eq!(item.id, ContentId(3));
    }

    #[test]
    fn literal_percent_path_resolves_back() {
        let (config, mut store) = setup();
        store.insert(ContentItem::new(4, "page"));
        store.set_meta(ContentId(4), "custom_permalink", "a%41b");

        // both the literal form and its wire encoding find the item
        for input in ["a%41b", "a%2541b"] {
            let item = resolve_path(&config, &store, input, &ResolveOpts::default())
                .unwrap()
                .unwrap_or_else(|| panic!("no match for {input:?}"));
            assert_eq!(item.id, ContentId(4));
        }
    }

    #[test]
    fn alias_key_is_selectable() {
        let (config, mut store) = setup();
        store.set_meta(ContentId(2), "custom_permalink_alias", "old-contact");

        let opts = ResolveOpts { alias: true, ..Default::default() };
        let item = resolve_path(&config, &store, "old-contact", &opts).unwrap().unwrap();
        assert_eq!(item.id, ContentId(2));

        // the alias key never matches primary lookups
        assert!(
            resolve_path(&config, &store, "old-contact", &ResolveOpts::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn duplicate_owners_are_a_hard_failure() {
        let (config, mut store) = setup();
        // simulate a store that let two items claim the same path
        store.set_meta(ContentId(2), "custom_permalink", "/2011/about/");

        let result = resolve_path(&config, &store, "2011/about", &ResolveOpts::default());
        assert!(matches!(result, Err(PermalinkError::DuplicatePath { .. })));
    }
}
