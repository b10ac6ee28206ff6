const COLLAPSIBLE: &[char] = &['-', '/', '.'];

/// Canonicalize a user-submitted custom path.
///
/// Returns `None` when the input is empty or reduces to nothing, which callers
/// treat as "no custom path set". The result never starts with `/`.
pub fn normalize_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let folded = deunicode::deunicode(raw);
    let mut out = String::with_capacity(folded.len());

    for ch in folded.chars() {
        if ch == '#' {
            continue;
        }
        let mapped = if ch.is_whitespace() { '-' } else { ch };
        if COLLAPSIBLE.contains(&mapped) && out.ends_with(mapped) {
            continue;
        }
        out.push(mapped);
    }

    let out = out.trim_start_matches('/');
    if out.is_empty() { None } else { Some(out.to_owned()) }
}

// Leading/trailing-slash-insensitive equality: "2011/x", "/2011/x/" and
// "2011/x/" all name the same path. Every equivalence decision in the crate
// goes through here.
pub fn paths_equivalent(a: &str, b: &str) -> bool {
    a.trim().trim_matches('/') == b.trim().trim_matches('/')
}

pub fn trailingslashit(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}

pub fn untrailingslashit(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Append a trailing slash, unless the last segment carries a file extension
/// (e.g. "page/about.html") in which case any trailing slash is removed.
pub fn smart_trailingslash(path: &str) -> String {
    let last_segment = untrailingslashit(path).rsplit('/').next().unwrap_or("");
    let has_extension = last_segment
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty());

    if has_extension {
        untrailingslashit(path).to_owned()
    } else {
        trailingslashit(path)
    }
}
