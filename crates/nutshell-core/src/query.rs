//! Query builder: key bounds for secondary-index scans.
//!
//! A [`QueryBounds`] pairs a [`KeyRange`] with a page-size limit. Three shapes
//! are needed by the front-end:
//!
//! - [`QueryBounds::all`] for list pages,
//! - [`build_prefix_query`] for search-as-you-type ("starts with"),
//! - [`mapkey_single`] for joining rows on an exact key (logs of a customer).
//!
//! Keys compare as Rust strings do: byte-wise on UTF-8, which is code point
//! order. The prefix upper bound is the smallest string that sorts after every
//! continuation of the prefix, so the half-open range `[prefix, upper)` holds
//! exactly the keys starting with `prefix`.

/// Page size used when no other limit is configured.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Which sort keys a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRange {
    /// Every row in the index.
    All,
    /// Rows whose key equals this value exactly.
    Single(String),
    /// Rows with `start <= key < end`; `end: None` means no upper bound.
    Range { start: String, end: Option<String> },
}

impl KeyRange {
    pub fn contains(&self, key: &str) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Single(k) => k == key,
            KeyRange::Range { start, end } => {
                key >= start.as_str() && end.as_deref().map_or(true, |end| key < end)
            }
        }
    }
}

/// Key range plus result shaping for one index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBounds {
    pub range: KeyRange,
    /// Maximum number of rows returned. Extra rows are dropped, not paged.
    pub limit: usize,
    /// Ask the store to attach full documents to each row.
    pub include_docs: bool,
}

impl QueryBounds {
    pub fn new(range: KeyRange) -> Self {
        Self {
            range,
            limit: DEFAULT_PAGE_SIZE,
            include_docs: false,
        }
    }

    /// Unrestricted scan, first page only.
    pub fn all() -> Self {
        Self::new(KeyRange::All)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn include_docs(mut self, include: bool) -> Self {
        self.include_docs = include;
        self
    }
}

/// Bounds selecting every key that starts with `prefix`.
pub fn build_prefix_query(prefix: &str) -> QueryBounds {
    QueryBounds::new(KeyRange::Range {
        start: prefix.to_string(),
        end: prefix_upper_bound(prefix),
    })
}

/// Bounds selecting keys equal to `key`.
pub fn mapkey_single(key: &str) -> QueryBounds {
    QueryBounds::new(KeyRange::Single(key.to_string()))
}

/// Smallest string greater than every string that starts with `prefix`.
///
/// Advances the last character that can still be incremented and drops
/// everything after it. Returns `None` when no such string exists: the empty
/// prefix, or a prefix made only of `char::MAX`.
pub fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    match c {
        char::MAX => None,
        // Skip the surrogate gap.
        '\u{D7FF}' => Some('\u{E000}'),
        _ => char::from_u32(c as u32 + 1),
    }
}
