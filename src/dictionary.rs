//! Word-pair dictionaries: ground-truth translations used as test data.
//!
//! File format: one `source target` pair per line, whitespace separated.
//! A source word may appear on several lines (one-to-many ground truth).

use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Source words in first-appearance order, each with its de-duplicated targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPairs {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl TestPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one ground-truth pair. Repeated pairs are ignored.
    pub fn insert(&mut self, source: &str, target: &str) {
        let idx = match self.index.get(source) {
            Some(&idx) => idx,
            None => {
                self.entries.push((source.to_string(), Vec::new()));
                self.index.insert(source.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let targets = &mut self.entries[idx].1;
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }

    /// Number of distinct source words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (source, target) pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.iter().map(|(_, t)| t.len()).sum()
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.index.contains_key(source)
    }

    pub fn targets(&self, source: &str) -> Option<&[String]> {
        self.index
            .get(source)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Source words in first-appearance order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn source_words(&self) -> HashSet<String> {
        self.entries.iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_slice()))
    }
}

/// Read a word-pair dictionary.
///
/// * `reverse` - swap the two columns
/// * `needed` - stop after this many distinct source words (`None` = no cap);
///   further pairs of already collected sources are still read
/// * `exclude` - drop pairs whose source word is in this set
pub fn read_test_pairs(
    path: &Path,
    reverse: bool,
    needed: Option<usize>,
    exclude: &HashSet<String>,
) -> Result<TestPairs> {
    let file = File::open(path)?;
    let pairs = read_test_pairs_from(BufReader::new(file), reverse, needed, exclude)?;
    log::info!(
        "Read {} pairs for {} source words from {}",
        pairs.pair_count(),
        pairs.len(),
        path.display()
    );
    Ok(pairs)
}

pub fn read_test_pairs_from<R: BufRead>(
    reader: R,
    reverse: bool,
    needed: Option<usize>,
    exclude: &HashSet<String>,
) -> Result<TestPairs> {
    let mut pairs = TestPairs::new();
    let mut excluded = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let (first, second) = match (tokens.next(), tokens.next()) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => continue,
            (Some(_), None) => {
                log::warn!("Skipping dictionary line {}: expected two words", idx + 1);
                continue;
            }
        };
        let (source, target) = if reverse {
            (second, first)
        } else {
            (first, second)
        };
        if exclude.contains(source) {
            excluded += 1;
            continue;
        }
        if let Some(needed) = needed {
            if pairs.len() >= needed && !pairs.contains_source(source) {
                continue;
            }
        }
        pairs.insert(source, target);
    }
    if excluded > 0 {
        log::debug!("Excluded {} pairs with training source words", excluded);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DICT: &str = "dog cane\ncat gatto\ndog cagna\n\nhouse casa\ncat gatto\nlonely\n";

    fn set(ws: &[&str]) -> HashSet<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn groups_targets_by_source_in_file_order() {
        let pairs = read_test_pairs_from(Cursor::new(DICT), false, None, &set(&[])).unwrap();
        assert_eq!(pairs.sources().collect::<Vec<_>>(), vec!["dog", "cat", "house"]);
        assert_eq!(pairs.targets("dog").unwrap(), &["cane", "cagna"]);
        assert_eq!(pairs.targets("cat").unwrap(), &["gatto"]);
        assert_eq!(pairs.pair_count(), 4);
    }

    #[test]
    fn reverse_swaps_columns() {
        let pairs = read_test_pairs_from(Cursor::new(DICT), true, None, &set(&[])).unwrap();
        assert_eq!(
            pairs.sources().collect::<Vec<_>>(),
            vec!["cane", "gatto", "cagna", "casa"]
        );
        assert_eq!(pairs.targets("gatto").unwrap(), &["cat"]);
    }

    #[test]
    fn needed_caps_distinct_sources() {
        let pairs = read_test_pairs_from(Cursor::new(DICT), false, Some(1), &set(&[])).unwrap();
        assert_eq!(pairs.len(), 1);
        // later pairs of the collected source still count
        assert_eq!(pairs.targets("dog").unwrap(), &["cane", "cagna"]);
    }

    #[test]
    fn excluded_sources_are_dropped() {
        let pairs =
            read_test_pairs_from(Cursor::new(DICT), false, None, &set(&["dog"])).unwrap();
        assert!(!pairs.contains_source("dog"));
        assert_eq!(pairs.len(), 2);
    }
}
