//! Custom permalink mapping for publishing platforms.
//!
//! Content items get addressed by a user-chosen URL path instead of the
//! platform's slug-derived one. Forward direction: compile the custom paths
//! into a prioritized rewrite rule table and merge it over the platform's
//! own rules. Reverse direction: resolve an inbound path back to the owning
//! item, with a bounded slash-normalization fallback and write-time
//! uniqueness so two items never claim the same effective path.
//!
//! The platform collaborators (content store, metadata bag) sit behind the
//! traits in [`content`]; [`content::MemoryStore`] is a ready-made in-memory
//! implementation.

pub mod config;
pub mod content;
pub mod preview;
pub mod resolve;
pub mod rules;
pub mod save;
pub mod utils;

use thiserror::Error;

// The one hard failure: the store broke the uniqueness invariant, resolving
// further would silently pick one of two owners. Config loading reports
// through [`config::ConfigError`] on its own.
#[derive(Debug, Error)]
pub enum PermalinkError {
    #[error("custom path `{path}` is claimed by more than one content item")]
    DuplicatePath { path: String },
}

pub use config::PermalinkConfig;
pub use content::{
    ContentId, ContentItem, ContentLookup, ContentRef, ContentStatus, ContentStore, MemoryStore,
    MetaQuery, MetadataStore,
};
pub use preview::{PermalinkSample, build_permalink, item_link, sample_permalink};
pub use resolve::{ResolveOpts, resolve_path};
pub use rules::{RewriteCycle, RewriteRule, RuleTable, build_rules, merge_rules, raw_rules};
pub use save::{SaveOutcome, ensure_unique, save_alias, save_path};
