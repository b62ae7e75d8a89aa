//! Streaming, vocabulary-filtered reader for whitespace-delimited embedding files.
//!
//! Expected layout:
//!
//! ```text
//! <anything> <dimension>
//! word_0 v0_1 v0_2 ... v0_d
//! word_1 v1_1 v1_2 ... v1_d
//! ```
//!
//! Only the line being parsed is held as text; admitted values accumulate
//! directly into the row-major buffer that becomes the matrix.

use crate::error::{Result, TmevalError};
use crate::space::VectorSpace;
use ndarray::Array2;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Data lines read from an unfiltered file before loading stops.
pub const UNFILTERED_LINE_CAP: usize = 300_000;

/// Builds a [`VectorSpace`] from an embedding text file, optionally restricted
/// to a lexicon and/or a row count.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpaceLoader<'a> {
    lexicon: Option<&'a HashSet<String>>,
    max_rows: Option<usize>,
}

/// Rows admitted by one streaming pass: the words and their values, kept together.
struct AdmittedRows {
    dim: usize,
    id2word: Vec<String>,
    values: Vec<f64>,
}

impl<'a> SpaceLoader<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only admit lines whose word is in `lexicon`. Disables the unfiltered line cap.
    pub fn lexicon(mut self, lexicon: &'a HashSet<String>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Keep at most `max_rows` admitted rows (applied after filtering).
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn build(&self, path: &Path) -> Result<VectorSpace> {
        log::info!(
            "Looking up {} words in {}",
            self.lexicon
                .map(|l| l.len().to_string())
                .unwrap_or_else(|| "all".to_string()),
            path.display()
        );
        let file = File::open(path)?;
        let space = self.build_from_reader(BufReader::new(file))?;
        log::info!(
            "Embedding of shape {} {} read.",
            space.len(),
            space.dim()
        );
        Ok(space)
    }

    /// Same as [`SpaceLoader::build`], over any buffered reader.
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<VectorSpace> {
        let AdmittedRows {
            dim,
            mut id2word,
            mut values,
        } = self.read_admitted(reader)?;

        if let Some(max_rows) = self.max_rows {
            if id2word.len() > max_rows {
                id2word.truncate(max_rows);
                values.truncate(max_rows * dim);
            }
        }

        let matrix = Array2::from_shape_vec((id2word.len(), dim), values)
            .map_err(|e| TmevalError::InvalidInput(e.to_string()))?;
        VectorSpace::new(matrix, id2word)
    }

    fn read_admitted<R: BufRead>(&self, mut reader: R) -> Result<AdmittedRows> {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let dim = parse_header(&header)?;
        // Column 0 is the word; numeric columns are [1, ncols).
        let ncols = dim + 1;

        let mut id2word = Vec::new();
        let mut values = Vec::new();
        let mut data_lines = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            if self.lexicon.is_none() && data_lines >= UNFILTERED_LINE_CAP {
                log::debug!("Stopping after {} data lines", UNFILTERED_LINE_CAP);
                break;
            }
            let line = line?;
            data_lines += 1;

            let mut tokens = line.split_whitespace();
            let word = match tokens.next() {
                Some(w) => w,
                None => continue,
            };
            if let Some(lexicon) = self.lexicon {
                if !lexicon.contains(word) {
                    continue;
                }
            }

            // header is line 1
            let line_no = idx + 2;
            let before = values.len();
            for token in tokens {
                let value: f64 = token.parse().map_err(|_| TmevalError::Parse {
                    line: line_no,
                    message: format!("cannot parse {:?} as a float", token),
                })?;
                values.push(value);
            }
            let found = values.len() - before + 1;
            if found != ncols {
                return Err(TmevalError::Parse {
                    line: line_no,
                    message: format!(
                        "expected {} values for {:?}, found {}",
                        ncols - 1,
                        word,
                        found - 1
                    ),
                });
            }
            id2word.push(word.to_string());
        }

        Ok(AdmittedRows {
            dim,
            id2word,
            values,
        })
    }
}

fn parse_header(header: &str) -> Result<usize> {
    header
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<usize>().ok())
        .ok_or_else(|| TmevalError::MalformedHeader(header.trim_end().to_string()))
}

/// All words of an embedding file (first column, header skipped), sorted.
pub fn read_vocabulary(path: &Path) -> Result<BTreeSet<String>> {
    let file = File::open(path)?;
    let mut words = BTreeSet::new();
    for line in BufReader::new(file).lines().skip(1) {
        let line = line?;
        if let Some(word) = line.split_whitespace().next() {
            words.insert(word.to_string());
        }
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const PETS: &str = "header 3\ncat 1 0 0\ndog 0 1 0\nfish 0 0 2\n";

    fn lexicon(ws: &[&str]) -> HashSet<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn loads_all_rows_without_lexicon() {
        let mut space = SpaceLoader::new()
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.id2word(), &["cat", "dog", "fish"]);
        assert_eq!(space.row(0).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(space.row(1).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(space.row(2).to_vec(), vec![0.0, 0.0, 2.0]);
        space.normalize();
        assert_eq!(space.vector("fish").unwrap().to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn lexicon_restricts_rows() {
        let lex = lexicon(&["dog"]);
        let space = SpaceLoader::new()
            .lexicon(&lex)
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.id2word(), &["dog"]);
        assert_eq!(space.matrix().shape(), &[1, 3]);
        assert_eq!(space.row(0).to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn admitted_words_keep_file_order_not_lexicon_order() {
        let lex = lexicon(&["fish", "cat", "unicorn"]);
        let space = SpaceLoader::new()
            .lexicon(&lex)
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.id2word(), &["cat", "fish"]);
        assert!(space.id2word().iter().all(|w| lex.contains(w)));
        // words and rows stay paired
        assert_eq!(space.vector("fish").unwrap().to_vec(), vec![0.0, 0.0, 2.0]);
        assert_eq!(space.vector("cat").unwrap().to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn max_rows_truncates_after_filtering() {
        let lex = lexicon(&["dog", "fish"]);
        let space = SpaceLoader::new()
            .lexicon(&lex)
            .max_rows(1)
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.id2word(), &["dog"]);
        assert_eq!(space.matrix().nrows(), 1);

        let space = SpaceLoader::new()
            .max_rows(2)
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.id2word(), &["cat", "dog"]);
        assert_eq!(space.row(1).to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn max_rows_larger_than_file_keeps_everything() {
        let space = SpaceLoader::new()
            .max_rows(1000)
            .build_from_reader(Cursor::new(PETS))
            .unwrap();
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn header_dimension_selects_numeric_columns() {
        let space = SpaceLoader::new()
            .build_from_reader(Cursor::new("2 2\na 1.5 -2e-1\nb 0 3\n"))
            .unwrap();
        assert_eq!(space.dim(), 2);
        assert!((space.row(0)[1] + 0.2).abs() < 1e-12);
    }

    #[test]
    fn malformed_header_is_rejected() {
        for header in ["onlyone\n", "header three\n", "header -3\n", "\n"] {
            let input = format!("{}cat 1 0 0\n", header);
            let err = SpaceLoader::new()
                .build_from_reader(Cursor::new(input))
                .unwrap_err();
            assert!(matches!(err, TmevalError::MalformedHeader(_)), "{:?}", header);
        }
    }

    #[test]
    fn bad_float_is_a_parse_error() {
        let err = SpaceLoader::new()
            .build_from_reader(Cursor::new("h 2\na 1 0\nb 1 x\n"))
            .unwrap_err();
        assert!(matches!(err, TmevalError::Parse { line: 3, .. }));
    }

    #[test]
    fn wrong_column_count_is_a_parse_error() {
        for body in ["a 1 0 0\n", "a 1\n"] {
            let input = format!("h 2\n{}", body);
            let err = SpaceLoader::new()
                .build_from_reader(Cursor::new(input))
                .unwrap_err();
            assert!(matches!(err, TmevalError::Parse { line: 2, .. }));
        }
    }

    #[test]
    fn lines_outside_lexicon_are_not_parsed() {
        let lex = lexicon(&["a"]);
        let space = SpaceLoader::new()
            .lexicon(&lex)
            .build_from_reader(Cursor::new("h 2\na 1 0\nb garbage\n"))
            .unwrap();
        assert_eq!(space.id2word(), &["a"]);
    }

    #[test]
    fn duplicate_admitted_word_fails() {
        let err = SpaceLoader::new()
            .build_from_reader(Cursor::new("h 1\na 1\nb 2\na 3\n"))
            .unwrap_err();
        assert!(matches!(err, TmevalError::DuplicateWord(ref w) if w == "a"));
    }

    #[test]
    fn unfiltered_load_stops_at_line_cap() {
        let total = UNFILTERED_LINE_CAP + 5;
        let mut input = String::with_capacity(total * 12);
        input.push_str("h 1\n");
        for i in 0..total {
            writeln!(input, "w{} {}", i, i).unwrap();
        }

        let space = SpaceLoader::new()
            .build_from_reader(Cursor::new(input.as_str()))
            .unwrap();
        assert_eq!(space.len(), UNFILTERED_LINE_CAP);
        assert_eq!(
            space.id2word().last().map(String::as_str),
            Some(format!("w{}", UNFILTERED_LINE_CAP - 1).as_str())
        );

        let tail = format!("w{}", total - 1);
        let lex = lexicon(&["w0", tail.as_str()]);
        let space = SpaceLoader::new()
            .lexicon(&lex)
            .build_from_reader(Cursor::new(input.as_str()))
            .unwrap();
        assert_eq!(space.id2word(), &["w0".to_string(), tail]);
    }

    #[test]
    fn build_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PETS.as_bytes()).unwrap();
        let space = SpaceLoader::new().build(file.path()).unwrap();
        assert_eq!(space.len(), 3);

        let vocab = read_vocabulary(file.path()).unwrap();
        assert_eq!(
            vocab.into_iter().collect::<Vec<_>>(),
            vec!["cat".to_string(), "dog".to_string(), "fish".to_string()]
        );
    }
}
