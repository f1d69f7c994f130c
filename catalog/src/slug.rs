//! Deterministic title -> key normalization and collision resolution.

use unicode_normalization::UnicodeNormalization;

use crate::error::CatalogError;

/// Slug returned when a title normalizes to nothing.
pub const UNKNOWN_SLUG: &str = "unknown";

/// Upper bound on slug length.
pub const MAX_SLUG_LEN: usize = 200;

/// Probe limit for collision suffixes.
const MAX_VARIANTS: usize = 100;

/// Normalize a free-text title to a filesystem/key-safe slug.
///
/// NFKC compose, lowercase, whitespace and hyphens to underscore, strip
/// everything outside `[a-z0-9_]`, collapse underscore runs, trim, fall
/// back to "unknown" when nothing survives, truncate to `MAX_SLUG_LEN`.
/// Pure and idempotent: `normalize(normalize(t)) == normalize(t)`.
pub fn normalize(title: &str) -> String {
    let composed: String = title.nfkc().collect();
    let lowered = composed.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut last_underscore = true; // swallow leading separators
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            last_underscore = false;
        } else if !last_underscore {
            // Whitespace, hyphens and every other character become a
            // single underscore; runs collapse.
            out.push('_');
            last_underscore = true;
        }
    }

    let mut slug = out.trim_matches('_').to_string();
    if slug.is_empty() {
        return UNKNOWN_SLUG.to_string();
    }
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('_').to_string();
    }
    slug
}

/// Resolve a slug collision against the live key set.
///
/// An unused base is returned unchanged; otherwise `_alt`, `_alt2`,
/// `_alt3`, ... are probed in order. The probe count is bounded so a
/// pathological key set cannot loop forever.
pub fn resolve_collision<F>(base: &str, exists: F) -> Result<String, CatalogError>
where
    F: Fn(&str) -> bool,
{
    if !exists(base) {
        return Ok(base.to_string());
    }

    for n in 1..=MAX_VARIANTS {
        let candidate = if n == 1 {
            format!("{base}_alt")
        } else {
            format!("{base}_alt{n}")
        };
        if !exists(&candidate) {
            tracing::info!(base, candidate, "slug collision, using variant");
            return Ok(candidate);
        }
    }

    Err(CatalogError::SlugOverflow { base: base.to_string() })
}
