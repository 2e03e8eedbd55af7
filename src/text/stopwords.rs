// Stopword sets for the frequency extractor.
//
// The usual source is a researcher-supplied comma-separated list (e.g.
// "문제,금일,관계"). A built-in English list from the `stop-words` crate is
// available for mixed-language corpora.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use super::normalize::normalize_token;

/// Parse a comma-separated stopword list. Entries are NFKC-normalized so they
/// match corpus tokens; blank entries are ignored.
pub fn parse_stopwords(list: &str) -> HashSet<String> {
    list.split(',').filter_map(normalize_token).collect()
}

/// The built-in English stopword list.
pub fn english_stopwords() -> HashSet<String> {
    get(LANGUAGE::English).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let stop = parse_stopwords("문제, 금일,,관계 ");
        assert_eq!(stop.len(), 3);
        assert!(stop.contains("금일"));
        assert!(stop.contains("관계"));
    }

    #[test]
    fn test_english_has_common_words() {
        let stop = english_stopwords();
        assert!(stop.contains("the"));
        assert!(stop.contains("and"));
    }
}
