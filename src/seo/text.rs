use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_\-]+").unwrap());
static REPEATED_HYPHEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").unwrap());

pub const MIN_KEYWORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "even",
    "ever", "every", "few", "for", "from", "further", "get", "gets", "got", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "like", "made", "make", "many",
    "me", "might", "more", "most", "much", "must", "my", "myself", "never", "new", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "said", "same", "says", "she", "should", "since", "so",
    "some", "still", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "upon", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
    "yours", "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

/// `"Hello, World!  Foo"` becomes `"hello-world-foo"`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let hyphenated = WHITESPACE_PATTERN.replace_all(lower.trim(), "-");
    let stripped = NON_SLUG_PATTERN.replace_all(&hyphenated, "");
    REPEATED_HYPHEN_PATTERN
        .replace_all(&stripped, "-")
        .into_owned()
}

/// Most frequent non-stop-words of at least four letters, most frequent
/// first. Equal counts keep first-occurrence order.
pub fn extract_keywords(text: &str, count: usize) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut ranked: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for word in WORD_PATTERN.find_iter(&lower).map(|m| m.as_str()) {
        if word.len() < MIN_KEYWORD_LEN || is_stop_word(word) {
            continue;
        }
        match positions.get(word) {
            Some(&index) => ranked[index].1 += 1,
            None => {
                positions.insert(word, ranked.len());
                ranked.push((word, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(count)
        .map(|(word, _)| word.to_string())
        .collect()
}
