use crate::error::{Result as TmResult, TmevalError};
use crate::eval::metrics::DEFAULT_PRECISION_AT;
use crate::mapping::TrainedMapping;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Distinct test source words kept (dictionary cap in coverage mode, in-vocabulary cap always).
pub const NEEDED_PAIRS: usize = 1000;

/// Rows loaded into the source space.
pub const SOURCE_MAX_ROWS: usize = 1000;

/// Seed of the additional-element sampler.
pub const SAMPLING_SEED: u64 = 100;

/// Where the translation matrix under evaluation comes from.
#[derive(Debug, Clone)]
pub enum MappingSource {
    /// Matrix and training words supplied by the caller.
    Direct(TrainedMapping),
    /// Base path of a persisted mapping (see [`crate::mapping::MappingStore`]).
    Persisted(PathBuf),
}

impl MappingSource {
    /// Exactly one of `direct` and `persisted` must be given.
    pub fn from_parts(
        direct: Option<TrainedMapping>,
        persisted: Option<PathBuf>,
    ) -> TmResult<Self> {
        match (direct, persisted) {
            (Some(mapping), None) => Ok(MappingSource::Direct(mapping)),
            (None, Some(path)) => Ok(MappingSource::Persisted(path)),
            (Some(_), Some(path)) => Err(TmevalError::AmbiguousMapping(format!(
                "both a direct mapping and a mapping path ({}) were given",
                path.display()
            ))),
            (None, None) => Err(TmevalError::AmbiguousMapping(
                "translation matrix or training words unspecified".to_string(),
            )),
        }
    }
}

/// Options of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Swap source and target columns of the dictionary.
    pub reverse: bool,
    /// Additional source elements sampled for globally corrected retrieval.
    pub additional: Option<usize>,
    /// Count out-of-vocabulary test words in the precision denominator.
    pub coverage: bool,
    /// Prefix for `<prefix>.vecs.txt` / `<prefix>.wds.txt` dumps of the mapped vectors.
    pub mapped_vecs: Option<PathBuf>,
    pub mapping: MappingSource,
    /// Cut-offs reported as `Prec@k`.
    pub precision_at: Vec<usize>,
}

impl EvalConfig {
    pub fn new(mapping: MappingSource) -> Self {
        Self {
            reverse: false,
            additional: None,
            coverage: true,
            mapped_vecs: None,
            mapping,
            precision_at: DEFAULT_PRECISION_AT.to_vec(),
        }
    }
}

/// Optional defaults file (`tmeval.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub eval: EvalDefaults,
}

/// `[eval]` table; command-line flags override these.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalDefaults {
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub additional: Option<usize>,
    #[serde(default = "default_coverage")]
    pub coverage: bool,
    #[serde(default)]
    pub mx_path: Option<PathBuf>,
    #[serde(default = "default_precision_at")]
    pub precision_at: Vec<usize>,
}

impl Default for EvalDefaults {
    fn default() -> Self {
        Self {
            reverse: false,
            additional: None,
            coverage: default_coverage(),
            mx_path: None,
            precision_at: default_precision_at(),
        }
    }
}

fn default_coverage() -> bool {
    true
}

fn default_precision_at() -> Vec<usize> {
    DEFAULT_PRECISION_AT.to_vec()
}

impl FileConfig {
    /// Load the defaults file.
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the file in this order:
    /// 1. Path specified in TMEVAL_CONFIG environment variable (must exist)
    /// 2. ./tmeval.toml in current directory (built-in defaults if absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var("TMEVAL_CONFIG") {
            Ok(path) => Self::from_path(Path::new(&path))?,
            Err(_) => {
                let path = PathBuf::from("tmeval.toml");
                if path.exists() {
                    Self::from_path(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.eval.precision_at.is_empty() {
            return Err(TmevalError::Config(
                "eval.precision_at must list at least one cut-off".to_string(),
            )
            .into());
        }
        if self.eval.precision_at.contains(&0) {
            return Err(TmevalError::Config(
                "eval.precision_at cut-offs must be greater than 0".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
