use crate::{
    PermalinkError,
    config::PermalinkConfig,
    content::{ContentId, ContentLookup, ContentRef, ContentStatus, ContentStore, MetadataStore},
    save::ensure_unique,
    utils::slug::{normalize_path, paths_equivalent, smart_trailingslash, trailingslashit},
};

/// What the admin editing UI shows: a full display link plus the path the
/// item would actually end up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermalinkSample {
    pub display: String,
    pub path: String,
    /// False while the item is unpublished and the link is still temporary.
    pub permanent: bool,
}

/// The effective link for one item: the stored custom path under the home
/// url (and front prefix) when one is set, the platform default otherwise.
/// Non-eligible kinds always keep the default.
pub fn item_link(
    config: &PermalinkConfig,
    store: &impl ContentStore,
    item: impl Into<ContentRef>,
    default_link: &str,
) -> String {
    let Some(item) = item.into().load(store) else {
        return default_link.to_owned();
    };
    if !config.is_eligible(&item.kind) {
        return default_link.to_owned();
    }

    match store.get_meta(item.id, &config.meta_key) {
        Some(custom) if !custom.is_empty() => {
            let home = trailingslashit(&config.home_url);
            let front = config.front_prefix();
            let path = custom.trim_start_matches('/');
            smart_trailingslash(&format!("{home}{front}{path}"))
        }
        _ => default_link.to_owned(),
    }
}

/// Substitute the name tokens in a default permalink structure and drop the
/// home-url prefix, e.g. "https://x.com/2011/%pagename%/" -> "2011/about/".
pub fn build_permalink(structure: &str, name: &str, home_url: &str) -> String {
    structure
        .replace(&trailingslashit(home_url), "")
        .replace("%pagename%", name)
        .replace("%postname%", name)
        .trim_start_matches('/')
        .to_owned()
}

/// Admin preview: the path an item would get for a proposed custom path
/// (uniqued unless it just restates the default), falling back to the stored
/// custom path, then to the default structure with the slugified title.
pub fn sample_permalink(
    config: &PermalinkConfig,
    store: &impl ContentStore,
    id: ContentId,
    default_structure: &str,
    new_title: Option<&str>,
    proposed: Option<&str>,
) -> Result<PermalinkSample, PermalinkError> {
    let home = trailingslashit(&config.home_url);
    let default_path = build_permalink(
        default_structure,
        &slug::slugify(new_title.unwrap_or_default()),
        &config.home_url,
    );

    let path = if let Some(candidate) = proposed.and_then(normalize_path) {
        if paths_equivalent(&candidate, &default_path) {
            default_path
        } else {
            ensure_unique(config, store, id, &candidate)?
        }
    } else if let Some(stored) = store
        .get_meta(id, &config.meta_key)
        .filter(|stored| !stored.is_empty())
    {
        stored.trim_start_matches('/').to_owned()
    } else {
        default_path
    };

    let permanent = store
        .get(id)
        .is_some_and(|item| item.status == ContentStatus::Published);

    Ok(PermalinkSample {
        display: format!("{home}{path}"),
        path,
        permanent,
    })
}
