//! Utility functions and helpers.

#[cfg(feature = "http")]
pub mod http;

/// Split a `key=value` argument at the first `=`.
///
/// Both sides are trimmed; an empty key or a missing `=` yields `None`.
pub fn split_pair(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("category=SSC"), Some(("category", "SSC")));
        assert_eq!(split_pair(" price_min = 100 "), Some(("price_min", "100")));
        assert_eq!(split_pair("search=a=b"), Some(("search", "a=b")));
        assert_eq!(split_pair("search="), Some(("search", "")));
    }

    #[test]
    fn test_split_pair_rejects_malformed() {
        assert_eq!(split_pair("category"), None);
        assert_eq!(split_pair("=SSC"), None);
    }
}
