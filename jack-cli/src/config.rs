//! Compiler configuration file.
use crate::error::AppError;
use serde::Deserialize;
use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
};

/// Configuration file looked up in the working directory
/// when none is given on the command line.
pub const DEFAULT_CONF: &str = "jack.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConf {
    /// Write `<Stem>T.xml` with the token sequence.
    pub emit_tokens: bool,
    /// Write `<Stem>.xml` with the syntax tree.
    pub emit_tree: bool,
    /// Directory for output files. Next to each source file when absent.
    pub out_dir: Option<PathBuf>,
    /// Number of units compiled at the same time.
    pub jobs: NonZeroUsize,
}

impl Default for CompilerConf {
    fn default() -> Self {
        Self {
            emit_tokens: false,
            emit_tree: false,
            out_dir: None,
            jobs: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// File form of the configuration, where every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfDef {
    emit_tokens: Option<bool>,
    emit_tree: Option<bool>,
    out_dir: Option<PathBuf>,
    jobs: Option<usize>,
}

/// Mapping to fill in defaults for missing fields.
impl From<ConfDef> for CompilerConf {
    fn from(def: ConfDef) -> Self {
        let defaults = CompilerConf::default();
        Self {
            emit_tokens: def.emit_tokens.unwrap_or(defaults.emit_tokens),
            emit_tree: def.emit_tree.unwrap_or(defaults.emit_tree),
            out_dir: def.out_dir.or(defaults.out_dir),
            jobs: def.jobs.and_then(NonZeroUsize::new).unwrap_or(defaults.jobs),
        }
    }
}

impl CompilerConf {
    /// Load configuration from the given file, or from [`DEFAULT_CONF`]
    /// if it exists.
    ///
    /// A missing default file gives the default configuration. An explicit
    /// file that is missing, or any file that doesn't parse, is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = match path {
            Some(path) => path,
            None => {
                let path = Path::new(DEFAULT_CONF);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, AppError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let def: ConfDef = serde_yaml::from_str(text)?;
        Ok(def.into())
    }
}
