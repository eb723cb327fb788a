//! Person-name matching against a column registry.
//!
//! Ledger headers spell names loosely ("josée latulippe", "LATULIPPE
//! Josee") while registries hold one canonical spelling. A [`NameMatcher`]
//! tries its [`MatchStrategy`] values in priority order and stops at the
//! first one that yields exactly one candidate.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

/// Shortest folded name `Substring` accepts
const MIN_SUBSTRING_LEN: usize = 3;

/// One way of comparing a name with a candidate, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Byte-equal
    Exact,
    /// Equal after [`fold`]
    AccentInsensitive,
    /// Same folded words in any order (`"WOODS John"` for `"John Woods"`)
    AnyWordOrder,
    /// Same folded last word, shared by no other candidate
    LastName,
    /// One folded name contains the other, single candidate only
    Substring,
}

impl MatchStrategy {
    /// Candidate this strategy picks for `name`, if it picks exactly one
    pub fn find<'a>(&self, name: &str, candidates: &[&'a str]) -> Option<&'a str> {
        match self {
            MatchStrategy::Exact => candidates.iter().copied().find(|&c| c == name),
            MatchStrategy::AccentInsensitive => {
                let folded = fold(name);
                if folded.is_empty() {
                    return None;
                }
                unique(candidates.iter().copied().filter(|c| fold(c) == folded))
            },
            MatchStrategy::AnyWordOrder => {
                let folded = fold(name);
                let words = sorted_words(&folded);
                if words.is_empty() {
                    return None;
                }
                unique(candidates.iter().copied().filter(|c| sorted_words(&fold(c)) == words))
            },
            MatchStrategy::LastName => {
                let folded = fold(name);
                let last = folded.rsplit(' ').next().filter(|w| !w.is_empty())?;
                unique(
                    candidates
                        .iter()
                        .copied()
                        .filter(|c| fold(c).rsplit(' ').next() == Some(last)),
                )
            },
            MatchStrategy::Substring => {
                let folded = fold(name);
                if folded.chars().count() < MIN_SUBSTRING_LEN {
                    return None;
                }
                unique(candidates.iter().copied().filter(|c| {
                    let candidate = fold(c);
                    candidate.chars().count() >= MIN_SUBSTRING_LEN
                        && (candidate.contains(&folded) || folded.contains(&candidate))
                }))
            },
        }
    }
}

fn sorted_words(folded: &str) -> Vec<&str> {
    let mut words: Vec<&str> = folded.split(' ').filter(|w| !w.is_empty()).collect();
    words.sort_unstable();
    words
}

fn unique<'a>(mut matches: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let first = matches.next()?;
    match matches.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Comparison form of a name: accents stripped, lowercase, punctuation
/// dropped, whitespace collapsed to single spaces.
///
/// ```
/// use rj_engine::rj::matcher::fold;
///
/// assert_eq!(fold("  Josée   LATULIPPE "), "josee latulippe");
/// assert_eq!(fold("Jean-Seb. Pitre"), "jeanseb pitre");
/// ```
pub fn fold(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.nfd().filter(|&c| !is_combining_mark(c)) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if c.is_alphanumeric() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Result of a successful match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatch<'a> {
    pub candidate: &'a str,
    pub strategy: MatchStrategy,
}

/// Ordered chain of strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatcher {
    strategies: Vec<MatchStrategy>,
}

impl Default for NameMatcher {
    /// Every strategy except `LastName`
    fn default() -> Self {
        NameMatcher::new([
            MatchStrategy::Exact,
            MatchStrategy::AccentInsensitive,
            MatchStrategy::AnyWordOrder,
            MatchStrategy::Substring,
        ])
    }
}

impl NameMatcher {
    /// Matcher over `strategies`; they always run in priority order, whatever
    /// order they are given in.
    pub fn new(strategies: impl IntoIterator<Item = MatchStrategy>) -> Self {
        let mut strategies: Vec<MatchStrategy> = strategies.into_iter().collect();
        strategies.sort_unstable();
        strategies.dedup();
        NameMatcher { strategies }
    }

    /// Add a strategy to the chain
    pub fn with(mut self, strategy: MatchStrategy) -> Self {
        if !self.strategies.contains(&strategy) {
            self.strategies.push(strategy);
            self.strategies.sort_unstable();
        }
        self
    }

    pub fn strategies(&self) -> &[MatchStrategy] {
        &self.strategies
    }

    /// First candidate picked by the first strategy that picks one.
    pub fn find<'a, I>(&self, name: &str, candidates: I) -> Option<NameMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<&'a str> = candidates.into_iter().collect();
        self.strategies.iter().find_map(|&strategy| {
            strategy
                .find(name, &candidates)
                .map(|candidate| NameMatch { candidate, strategy })
        })
    }
}
