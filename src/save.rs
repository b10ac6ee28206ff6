use crate::{
    PermalinkError,
    config::PermalinkConfig,
    content::{ContentId, ContentLookup, ContentStore, MetaQuery, MetadataStore},
    log,
    utils::slug::normalize_path,
};

/// Result of a save trigger. `path: None` means the submitted value was empty
/// and the metadata key was deleted. `rules_invalidated` tells the platform
/// to throw away its compiled rule table and start a fresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: Option<String>,
    pub rules_invalidated: bool,
}

/// Save trigger: normalize the submitted path, make it unique, persist it.
pub fn save_path(
    config: &PermalinkConfig,
    store: &mut impl ContentStore,
    id: ContentId,
    submitted: &str,
) -> Result<SaveOutcome, PermalinkError> {
    save_meta_path(config, store, id, submitted, &config.meta_key)
}

/// Same flow for the alias key.
pub fn save_alias(
    config: &PermalinkConfig,
    store: &mut impl ContentStore,
    id: ContentId,
    submitted: &str,
) -> Result<SaveOutcome, PermalinkError> {
    save_meta_path(config, store, id, submitted, &config.alias_meta_key)
}

fn save_meta_path(
    config: &PermalinkConfig,
    store: &mut impl ContentStore,
    id: ContentId,
    submitted: &str,
    meta_key: &str,
) -> Result<SaveOutcome, PermalinkError> {
    let Some(candidate) = normalize_path(submitted) else {
        // empty submission means "no custom path", not an error
        store.delete_meta(id, meta_key);
        log!("save"; "cleared custom path for item {id}");
        return Ok(SaveOutcome { path: None, rules_invalidated: true });
    };

    let path = unique_for_key(config, store, id, &candidate, meta_key)?;
    store.set_meta(id, meta_key, &path);
    log!("save"; "stored custom path `{path}` for item {id}");

    Ok(SaveOutcome { path: Some(path), rules_invalidated: true })
}

/// Make `candidate` unique among all other items' stored paths by appending
/// an integer suffix starting at 2 ("about" becomes "about2", "about3", …).
///
/// Termination relies on the store being consistent: each item holds one
/// path, so the suffix space cannot be exhausted. A store handing out two
/// owners for the same path fails the whole operation instead.
pub fn ensure_unique(
    config: &PermalinkConfig,
    store: &impl ContentLookup,
    id: ContentId,
    candidate: &str,
) -> Result<String, PermalinkError> {
    unique_for_key(config, store, id, candidate, &config.meta_key)
}

fn unique_for_key(
    config: &PermalinkConfig,
    store: &impl ContentLookup,
    id: ContentId,
    candidate: &str,
    meta_key: &str,
) -> Result<String, PermalinkError> {
    if !claimed_by_other(config, store, id, candidate, meta_key)? {
        return Ok(candidate.to_owned());
    }

    let mut suffix = 2u64;
    loop {
        let attempt = format!("{candidate}{suffix}");
        if !claimed_by_other(config, store, id, &attempt, meta_key)? {
            return Ok(attempt);
        }
        suffix += 1;
    }
}

// Stored values are compared as stored (slash-insensitively, per the
// `MetaQuery` contract), never percent-decoded: decoding and front-prefix
// stripping apply to inbound request input only.
fn claimed_by_other(
    config: &PermalinkConfig,
    store: &impl ContentLookup,
    id: ContentId,
    path: &str,
    meta_key: &str,
) -> Result<bool, PermalinkError> {
    let query = MetaQuery {
        kinds: &config.types,
        meta_key,
        meta_value: Some(path),
        exclude: Some(id),
        limit: Some(2),
    };

    let hits = store.find(&query);
    if hits.len() > 1 {
        // two other items already share this path, the invariant is gone
        return Err(PermalinkError::DuplicatePath { path: path.to_owned() });
    }
    Ok(!hits.is_empty())
}
