//! Deterministic merge of theme collections from two sources.

use animikyoku_animethemes::ThemeCollection;

/// Merge supplemental collections into the primary set.
///
/// When the primary set is empty the supplemental set is returned
/// verbatim. Otherwise every supplemental OST is flattened into the first
/// primary collection; opening and ending lists from the supplemental
/// source are dropped because the primary source is authoritative for
/// them. Input order is preserved throughout.
pub fn merge_themes(
    mut primary: Vec<ThemeCollection>,
    supplemental: Vec<ThemeCollection>,
) -> Vec<ThemeCollection> {
    if primary.is_empty() {
        return supplemental;
    }
    if let Some(first) = primary.first_mut() {
        for season in supplemental {
            first.osts.extend(season.osts);
        }
    }
    primary
}
