//! Alias filtering for actor matching.
//!
//! A bare single-word alias such as `"max"` would match far too much text,
//! so it is dropped. Anything containing characters outside the bare-name
//! class is treated as a deliberately written pattern and kept.

/// True when `s` is one bare token: only ASCII letters, digits and `'`.
pub fn is_plain_single_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '\'')
}

/// True when `name` consists of more than one whitespace-separated word.
pub fn is_multi_word(name: &str) -> bool {
    name.split_whitespace().nth(1).is_some()
}

/// Drop aliases that are bare single tokens; keep everything else.
pub fn filter_aliases(aliases: &[String]) -> Vec<&str> {
    aliases
        .iter()
        .map(String::as_str)
        .filter(|alias| !is_plain_single_token(alias))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_single_token() {
        assert!(is_plain_single_token("max"));
        assert!(is_plain_single_token("MAX"));
        assert!(is_plain_single_token("o'neil"));
        assert!(is_plain_single_token("max2"));
        assert!(!is_plain_single_token("max power"));
        assert!(!is_plain_single_token("max\\d+"));
        assert!(!is_plain_single_token("max-power"));
        assert!(!is_plain_single_token(""));
    }

    #[test]
    fn test_multi_word() {
        assert!(is_multi_word("Max Power"));
        assert!(is_multi_word("  Max   Power "));
        assert!(!is_multi_word("Max"));
        assert!(!is_multi_word("Max "));
        assert!(!is_multi_word(""));
    }

    #[test]
    fn test_filter_aliases() {
        let aliases = vec![
            "max".to_string(),
            "max\\d+".to_string(),
            "Maximilian P".to_string(),
            "mp".to_string(),
            "m\\.?p\\.?".to_string(),
        ];
        assert_eq!(
            filter_aliases(&aliases),
            vec!["max\\d+", "Maximilian P", "m\\.?p\\.?"]
        );
    }

    #[test]
    fn test_filter_aliases_empty() {
        assert!(filter_aliases(&[]).is_empty());
    }
}
