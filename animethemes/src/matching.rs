//! Token-based title matching used to discard unrelated fuzzy-search
//! results.

/// Lowercase, strip punctuation, split into non-empty tokens.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Two titles match when one token set is a subset of the other, e.g.
/// "Steins;Gate" and "Steins Gate 0". Unrelated shows that fuzzy search
/// drags in share some tokens but are a subset in neither direction.
pub fn is_title_match(query: &str, candidate: &str) -> bool {
    let q = normalize_tokens(query);
    let c = normalize_tokens(candidate);
    if q.is_empty() || c.is_empty() {
        return false;
    }

    let query_in_candidate = q.iter().all(|t| c.contains(t));
    let candidate_in_query = c.iter().all(|t| q.contains(t));
    query_in_candidate || candidate_in_query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tokens() {
        assert_eq!(normalize_tokens("Steins;Gate"), vec!["steins", "gate"]);
        assert_eq!(normalize_tokens("Re:Zero!"), vec!["re", "zero"]);
        assert!(normalize_tokens("!!!").is_empty());
    }

    #[test]
    fn test_title_match_subset() {
        assert!(is_title_match("Steins;Gate", "Steins Gate 0"));
        assert!(is_title_match("Steins Gate 0", "Steins;Gate"));
        assert!(is_title_match("Attack on Titan", "Attack on Titan"));
    }

    #[test]
    fn test_title_match_rejects_unrelated() {
        assert!(!is_title_match("Steins;Gate", "Attack on Titan"));
        assert!(!is_title_match("Sword Art Online", "Sword of the Stranger"));
    }

    #[test]
    fn test_title_match_empty() {
        assert!(!is_title_match("", "Steins;Gate"));
        assert!(!is_title_match("Steins;Gate", "!!!"));
    }
}
