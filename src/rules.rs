use crate::{
    config::PermalinkConfig,
    content::{ContentItem, ContentLookup, ContentStore, MetaQuery, MetadataStore},
    log,
    utils::slug::trailingslashit,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One rewrite rule: an end-anchored path pattern mapping to a platform
/// dispatch target such as `index.php?page_id=5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub target: String,
}

/// Ordered rule mapping; insertion order is match priority. Patterns are
/// unique, later inserts on an existing pattern are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<RewriteRule>,
    #[serde(skip)]
    compiled: OnceLock<Vec<Option<Regex>>>,
}

impl PartialEq for RuleTable {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for RuleTable {}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.rules.iter().any(|rule| rule.pattern == pattern)
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.pattern == pattern)
            .map(|rule| rule.target.as_str())
    }

    pub fn push(&mut self, pattern: impl Into<String>, target: impl Into<String>) {
        let pattern = pattern.into();
        if !self.contains(&pattern) {
            self.rules.push(RewriteRule { pattern, target: target.into() });
            self.compiled = OnceLock::new();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    /// First rule whose pattern matches `path`, the way the platform's router
    /// would try them: anchored at the start, in table order. Patterns are
    /// compiled once per table; one that fails to compile is logged and never
    /// matches.
    pub fn match_path(&self, path: &str) -> Option<&RewriteRule> {
        let path = path.trim_start_matches('/');
        self.compiled_patterns()
            .iter()
            .zip(&self.rules)
            .find(|(re, _)| re.as_ref().is_some_and(|re| re.is_match(path)))
            .map(|(_, rule)| rule)
    }

    fn compiled_patterns(&self) -> &[Option<Regex>] {
        self.compiled.get_or_init(|| {
            self.rules
                .iter()
                .map(|rule| match Regex::new(&format!("^{}", rule.pattern)) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        log!("error"; "rewrite pattern `{}` failed to compile: {err}", rule.pattern);
                        None
                    }
                })
                .collect()
        })
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a RewriteRule;
    type IntoIter = std::slice::Iter<'a, RewriteRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<(String, String)> for RuleTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = RuleTable::new();
        for (pattern, target) in iter {
            table.push(pattern, target);
        }
        table
    }
}

/// Cache handle for one rule-computation cycle. The platform compiles rules
/// in two passes (raw, then merge); the table built in the first pass is kept
/// here so the second pass does not recompute it. Create one per cycle and
/// drop it at the end, never reuse it across requests.
#[derive(Debug, Default)]
pub struct RewriteCycle {
    cached: Option<RuleTable>,
}

impl RewriteCycle {
    pub fn new() -> Self {
        Self::default()
    }
}

fn dispatch_target(config: &PermalinkConfig, item: &ContentItem) -> String {
    let param = if item.kind == "page" { "page_id" } else { "p" };
    format!("{}?{}={}", config.dispatch, param, item.id)
}

/// Build the rule table from every eligible item (any status) holding a
/// non-empty custom path. One rule per item, in store enumeration order.
pub fn build_rules(config: &PermalinkConfig, store: &impl ContentStore) -> RuleTable {
    let query = MetaQuery {
        kinds: &config.types,
        meta_key: &config.meta_key,
        ..Default::default()
    };

    let mut table = RuleTable::new();
    for item in store.find(&query) {
        let Some(custom) = store.get_meta(item.id, &config.meta_key) else { continue };
        if custom.is_empty() {
            continue;
        }
        // trailing `?$` makes the final slash optional and anchors at path end
        let pattern = format!("{}?$", trailingslashit(&custom));
        table.push(pattern, dispatch_target(config, &item));
    }

    log!("rules"; "compiled {} custom permalink rules", table.len());
    table
}

/// First-pass hook: build the table and stash it on the cycle handle.
pub fn raw_rules(
    config: &PermalinkConfig,
    store: &impl ContentStore,
    cycle: &mut RewriteCycle,
) -> RuleTable {
    let table = build_rules(config, store);
    cycle.cached = Some(table.clone());
    table
}

/// Second-pass hook: merge the generated table over the platform's rules.
/// Generated entries keep their order and win every pattern collision; the
/// surviving platform entries follow in their original order.
pub fn merge_rules(
    config: &PermalinkConfig,
    store: &impl ContentStore,
    cycle: &mut RewriteCycle,
    platform: RuleTable,
) -> RuleTable {
    // an empty cache could mean "first pass never ran", rebuild once
    if cycle.cached.as_ref().is_none_or(RuleTable::is_empty) {
        cycle.cached = Some(build_rules(config, store));
    }

    let Some(generated) = cycle.cached.as_ref() else { return platform };
    if generated.is_empty() {
        return platform;
    }

    let mut merged = generated.clone();
    for rule in &platform {
        if !generated.contains(&rule.pattern) {
            merged.push(rule.pattern.clone(), rule.target.clone());
        }
    }
    merged
}
