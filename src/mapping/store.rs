//! On-disk store for a trained translation matrix and the words it was trained on.
//!
//! A base path `B` maps to two files:
//! - `B.mx.json`: `{"rows": r, "cols": c, "data": [...]}` (row-major)
//! - `B.train_wds`: one training word per line
//!
//! The training words are excluded from the test set when the mapping is evaluated.

use crate::error::{Result, TmevalError};
use crate::mapping::TranslationMatrix;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A translation matrix together with its training vocabulary.
#[derive(Debug, Clone)]
pub struct TrainedMapping {
    pub matrix: TranslationMatrix,
    pub train_words: HashSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MatrixFile {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Persisted mapping location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingStore {
    base: PathBuf,
}

impl MappingStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve a user-supplied mapping path. A directory gets the default file name
    /// derived from the dictionary, source and target file names.
    pub fn resolve(mx_path: &Path, seed_fn: &Path, source_fn: &Path, target_fn: &Path) -> Self {
        if mx_path.is_dir() {
            Self::new(mx_path.join(default_output_name(seed_fn, source_fn, target_fn)))
        } else {
            Self::new(mx_path)
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn matrix_path(&self) -> PathBuf {
        with_suffix(&self.base, ".mx.json")
    }

    pub fn train_words_path(&self) -> PathBuf {
        with_suffix(&self.base, ".train_wds")
    }

    pub fn load(&self) -> Result<TrainedMapping> {
        log::info!("Loading from {}", self.base.display());
        let matrix = read_matrix_file(&self.matrix_path())?;
        let train_words = read_word_list(&self.train_words_path())?;
        Ok(TrainedMapping {
            matrix,
            train_words,
        })
    }

    pub fn save(&self, mapping: &TrainedMapping) -> Result<()> {
        write_matrix_file(&self.matrix_path(), &mapping.matrix)?;

        let mut words: Vec<&String> = mapping.train_words.iter().collect();
        words.sort();
        let mut out = BufWriter::new(File::create(self.train_words_path())?);
        for word in words {
            writeln!(out, "{}", word)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// `<dict_stem>__<source_stem>__<target_stem>`
pub fn default_output_name(seed_fn: &Path, source_fn: &Path, target_fn: &Path) -> String {
    let stem = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    format!("{}__{}__{}", stem(seed_fn), stem(source_fn), stem(target_fn))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", base.as_os_str().to_string_lossy(), suffix))
}

/// Read a translation matrix from its JSON file.
pub fn read_matrix_file(path: &Path) -> Result<TranslationMatrix> {
    let file = File::open(path)?;
    let parsed: MatrixFile = serde_json::from_reader(BufReader::new(file))?;
    let matrix = Array2::from_shape_vec((parsed.rows, parsed.cols), parsed.data).map_err(|e| {
        TmevalError::Parse {
            line: 1,
            message: format!("{}: {}", path.display(), e),
        }
    })?;
    Ok(TranslationMatrix::new(matrix))
}

pub fn write_matrix_file(path: &Path, matrix: &TranslationMatrix) -> Result<()> {
    let m = matrix.matrix();
    let file = MatrixFile {
        rows: m.nrows(),
        cols: m.ncols(),
        data: m.iter().copied().collect(),
    };
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, &file)?;
    out.flush()?;
    Ok(())
}

/// One word per line; blank lines are ignored.
pub fn read_word_list(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path)?;
    let mut words = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_string());
        }
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_from_base_path() {
        let dir = TempDir::new().unwrap();
        let store = MappingStore::new(dir.path().join("en_it"));
        let mapping = TrainedMapping {
            matrix: TranslationMatrix::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]),
            train_words: ["house", "dog"].iter().map(|w| w.to_string()).collect(),
        };
        store.save(&mapping).unwrap();
        assert!(dir.path().join("en_it.mx.json").exists());
        assert!(dir.path().join("en_it.train_wds").exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.matrix, mapping.matrix);
        assert_eq!(loaded.train_words, mapping.train_words);
    }

    #[test]
    fn directory_resolves_to_default_name() {
        let dir = TempDir::new().unwrap();
        let store = MappingStore::resolve(
            dir.path(),
            Path::new("/data/en-it.train.txt"),
            Path::new("/data/en.vec"),
            Path::new("it.vec"),
        );
        assert_eq!(store.base(), dir.path().join("en-it.train__en__it"));

        let file_base = dir.path().join("custom");
        let store = MappingStore::resolve(
            &file_base,
            Path::new("a"),
            Path::new("b"),
            Path::new("c"),
        );
        assert_eq!(store.base(), file_base.as_path());
    }

    #[test]
    fn shape_mismatch_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.mx.json");
        std::fs::write(&path, r#"{"rows": 2, "cols": 2, "data": [1.0, 2.0, 3.0]}"#).unwrap();
        let err = read_matrix_file(&path).unwrap_err();
        assert!(matches!(err, TmevalError::Parse { .. }));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let dir = TempDir::new().unwrap();
        let err = MappingStore::new(dir.path().join("nothing")).load().unwrap_err();
        assert!(matches!(err, TmevalError::Io(_)));
    }
}
