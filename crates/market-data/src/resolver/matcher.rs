//! Name matching for the fallback scan.
//!
//! Candidates are compared on normalised text: lower case, caret and exchange
//! suffix stripped, runs of non-alphanumerics collapsed to one space.

use std::cmp::Ordering;

use crate::models::UniverseEntry;

use super::naming::{split_instrument_key, strip_exchange_suffix};

/// Shortest text that counts as contained in another.
const MIN_CONTAINMENT_LEN: usize = 3;

/// A universe entry whose name plausibly matches the requested symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanCandidate {
    pub entry: UniverseEntry,
    /// Some match text equals a hint after normalisation.
    pub exact: bool,
    /// Best `2 * lcs / (|a| + |b|)` over match texts and hints.
    pub similarity: f64,
    /// Longest common substring with the best-matching name hint.
    pub lcs: usize,
}

/// How well one match text fits one hint.
#[derive(Clone, Copy, Debug, PartialEq)]
struct MatchScore {
    exact: bool,
    similarity: f64,
    lcs: usize,
}

impl MatchScore {
    fn cmp_strength(&self, other: &Self) -> Ordering {
        self.exact
            .cmp(&other.exact)
            .then_with(|| self.similarity.total_cmp(&other.similarity))
            .then_with(|| self.lcs.cmp(&other.lcs))
    }
}

/// Normalise text for comparison.
pub fn normalize_text(text: &str) -> String {
    let stripped = strip_exchange_suffix(text);
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Length in chars of the longest common substring of `a` and `b`.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Similarity in `[0, 1]`: `2 * lcs / (|a| + |b|)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 0.0;
    }
    (2 * longest_common_substring(a, b)) as f64 / total as f64
}

fn contains_meaningfully(haystack: &str, needle: &str) -> bool {
    needle.chars().count() >= MIN_CONTAINMENT_LEN && haystack.contains(needle)
}

/// Score one normalised candidate text against one normalised hint.
///
/// Returns a score when the pair is a plausible match: either text contains
/// the other, or their similarity reaches `threshold`.
fn score(candidate: &str, hint: &str, threshold: f64) -> Option<MatchScore> {
    if candidate.is_empty() || hint.is_empty() {
        return None;
    }
    let lcs = longest_common_substring(candidate, hint);
    let total = candidate.chars().count() + hint.chars().count();
    let similarity = (2 * lcs) as f64 / total as f64;
    let plausible = contains_meaningfully(candidate, hint)
        || contains_meaningfully(hint, candidate)
        || similarity >= threshold;
    plausible.then_some(MatchScore {
        exact: candidate == hint,
        similarity,
        lcs,
    })
}

/// Texts a universe entry is matched on: its key code, then its names.
fn match_texts(entry: &UniverseEntry) -> impl Iterator<Item = String> + '_ {
    let code = split_instrument_key(&entry.instrument_key)
        .map(|(_, code)| code)
        .unwrap_or(entry.instrument_key.as_ref());
    std::iter::once(code)
        .chain(entry.names.iter().map(String::as_str))
        .map(normalize_text)
}

/// Keep the entries that plausibly match any hint, best first.
///
/// An entry whose code or listed name equals a hint outranks one that merely
/// contains it. Then similarity descending, LCS length descending and
/// instrument key ascending, so the same universe and hints always give the
/// same order.
pub fn rank_candidates(
    universe: Vec<UniverseEntry>,
    hints: &[String],
    threshold: f64,
) -> Vec<ScanCandidate> {
    let hints: Vec<String> = hints
        .iter()
        .map(|h| normalize_text(h))
        .filter(|h| !h.is_empty())
        .collect();

    let mut ranked: Vec<ScanCandidate> = universe
        .into_iter()
        .filter_map(|entry| {
            let best = match_texts(&entry)
                .flat_map(|text| {
                    hints
                        .iter()
                        .filter_map(|hint| score(&text, hint, threshold))
                        .collect::<Vec<_>>()
                })
                .max_by(MatchScore::cmp_strength)?;
            Some(ScanCandidate {
                entry,
                exact: best.exact,
                similarity: best.similarity,
                lcs: best.lcs,
            })
        })
        .collect();

    ranked.sort_by(compare_candidates);
    ranked
}

fn compare_candidates(a: &ScanCandidate, b: &ScanCandidate) -> Ordering {
    b.exact
        .cmp(&a.exact)
        .then_with(|| b.similarity.total_cmp(&a.similarity))
        .then_with(|| b.lcs.cmp(&a.lcs))
        .then_with(|| a.entry.instrument_key.cmp(&b.entry.instrument_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ranked: &[ScanCandidate]) -> Vec<&str> {
        ranked
            .iter()
            .map(|c| c.entry.instrument_key.as_ref())
            .collect()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("^NSEI"), "nsei");
        assert_eq!(normalize_text("ITC.NS"), "itc");
        assert_eq!(normalize_text("  Nifty   50 "), "nifty 50");
        assert_eq!(normalize_text("Bajaj-Auto Ltd."), "bajaj auto ltd");
    }

    #[test]
    fn test_longest_common_substring() {
        assert_eq!(longest_common_substring("nifty 50", "nifty 500"), 8);
        assert_eq!(longest_common_substring("nifty bank", "nifty 50"), 6);
        assert_eq!(longest_common_substring("abc", ""), 0);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("itc", "itc"), 1.0);
        assert_eq!(similarity("", ""), 0.0);
        assert!(similarity("nifty bank", "nifty 50") < 0.8);
    }

    #[test]
    fn test_rank_prefers_longer_overlap_then_key() {
        let universe = vec![
            UniverseEntry::new("NSE_INDEX|Nifty Bank"),
            UniverseEntry::new("NSE_INDEX|Nifty 500"),
            UniverseEntry::new("NSE_INDEX|Nifty 50"),
            UniverseEntry::new("NSE_EQ|INE154A01025"),
        ];
        let hints = vec!["NSEI".to_string(), "Nifty 50".to_string()];

        let ranked = rank_candidates(universe, &hints, 0.8);
        assert_eq!(keys(&ranked), vec!["NSE_INDEX|Nifty 50", "NSE_INDEX|Nifty 500"]);
        assert_eq!(ranked[0].lcs, 8);
    }

    #[test]
    fn test_rank_exact_name_beats_containing_name() {
        let universe = vec![
            UniverseEntry::new("NSE_EQ|INE349Y01013").with_name("IDEAFORGE"),
            UniverseEntry::new("NSE_EQ|INE669E01016").with_name("IDEA"),
        ];
        let ranked = rank_candidates(universe, &["IDEA".to_string()], 0.8);
        assert_eq!(keys(&ranked), vec!["NSE_EQ|INE669E01016", "NSE_EQ|INE349Y01013"]);
        assert!(ranked[0].exact);
        assert!(!ranked[1].exact);
        assert_eq!(ranked[0].lcs, ranked[1].lcs);
    }

    #[test]
    fn test_rank_closer_name_beats_lower_key() {
        let universe = vec![
            UniverseEntry::new("NSE_EQ|A").with_name("TATA MOTORS LTD DVR"),
            UniverseEntry::new("NSE_EQ|B").with_name("TATA MOTORS LTD"),
        ];
        let ranked = rank_candidates(universe, &["Tata Motors".to_string()], 0.8);
        assert_eq!(keys(&ranked), vec!["NSE_EQ|B", "NSE_EQ|A"]);
    }

    #[test]
    fn test_rank_matches_listed_names() {
        let universe = vec![
            UniverseEntry::new("NSE_EQ|INE154A01025").with_name("ITC").with_name("ITC LTD"),
            UniverseEntry::new("NSE_EQ|INE002A01018").with_name("RELIANCE"),
        ];
        let ranked = rank_candidates(universe, &["ITC".to_string()], 0.8);
        assert_eq!(keys(&ranked), vec!["NSE_EQ|INE154A01025"]);
    }

    #[test]
    fn test_short_text_is_not_contained() {
        let universe = vec![UniverseEntry::new("NSE_INDEX|50")];
        let ranked = rank_candidates(universe, &["Nifty 50".to_string()], 0.8);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_threshold_is_tunable() {
        let universe = vec![UniverseEntry::new("NSE_INDEX|Nifty Bank")];
        let hints = vec!["Nifty 50".to_string()];
        assert!(rank_candidates(universe.clone(), &hints, 0.8).is_empty());
        assert_eq!(rank_candidates(universe, &hints, 0.6).len(), 1);
    }
}
