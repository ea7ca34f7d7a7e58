//! Load the three line-aligned inputs of an evaluation run.
//!
//! An evaluation reads one MT output file, one meta-info file describing the
//! injected pattern of each example, and one file of language-model scores
//! (`-inf` for original sentences). Line `n` of each file describes the same
//! example; nothing in the files lets a reader detect a shifted stream, so
//! alignment is taken as given.
//!
//! Callers choose between memory-mapped files or owned buffers at runtime
//! via [`LoadMode`]. Lines borrow from the loaded buffers.
//!
//! # Example
//! ```no_run
//! use morph_corpus::{EvalInputs, ExampleRecord, InputPaths, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let paths = InputPaths::new("out.de", "meta.tsv", "scores.txt");
//! let inputs = EvalInputs::load_with_mode(&paths, LoadMode::Owned)?;
//! for triple in inputs.triples() {
//!     let triple = triple?;
//!     let record = ExampleRecord::parse(triple.meta)?;
//!     println!("{}: {}", triple.line, record.pattern_pair);
//! }
//! # Ok(()) }
//! ```

mod record;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;
use thiserror::Error;
use tracing::{info, warn};

pub use record::{ExampleRecord, RecordError, Score};

/// Strategy for loading input files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each file (fast, zero-copy).
    #[default]
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Which of the three inputs a line came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Translations,
    MetaInfo,
    Scores,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::Translations => "translations",
            InputKind::MetaInfo => "meta-info",
            InputKind::Scores => "scores",
        })
    }
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("{kind}:{line} is not valid UTF-8")]
    Utf8 {
        kind: InputKind,
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

#[derive(Clone, Debug)]
pub struct InputPaths {
    pub translations: PathBuf,
    pub meta_info: PathBuf,
    pub scores: PathBuf,
}

impl InputPaths {
    pub fn new(
        translations: impl Into<PathBuf>,
        meta_info: impl Into<PathBuf>,
        scores: impl Into<PathBuf>,
    ) -> Self {
        Self {
            translations: translations.into(),
            meta_info: meta_info.into(),
            scores: scores.into(),
        }
    }
}

/// One example: the same line of all three inputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Triple<'a> {
    /// 1-based line number.
    pub line: usize,
    pub meta: &'a str,
    pub translation: &'a str,
    pub score: &'a str,
}

/// The loaded inputs of one evaluation run.
pub struct EvalInputs {
    translations: Buffer,
    meta_info: Buffer,
    scores: Buffer,
}

impl EvalInputs {
    /// Load all inputs, memory-mapping the files.
    pub fn load(paths: &InputPaths) -> Result<Self> {
        Self::load_with_mode(paths, LoadMode::Mmap)
    }

    /// Load all inputs choosing between mmap and owned buffers at runtime.
    ///
    /// Differing line counts are logged; iteration stops at the shortest
    /// input.
    pub fn load_with_mode(paths: &InputPaths, mode: LoadMode) -> Result<Self> {
        let inputs = Self {
            translations: load_file(&paths.translations, mode)?,
            meta_info: load_file(&paths.meta_info, mode)?,
            scores: load_file(&paths.scores, mode)?,
        };

        let counts = inputs.line_counts();
        let [translations, meta_info, scores] = counts;
        if translations != meta_info || meta_info != scores {
            warn!(
                translations,
                meta_info, scores, "inputs differ in length; extra lines are ignored"
            );
        }
        info!(examples = shortest(counts), ?mode, "loaded evaluation inputs");
        Ok(inputs)
    }

    /// Line counts of translations, meta-info and scores.
    pub fn line_counts(&self) -> [usize; 3] {
        [
            Lines::new(self.translations.as_slice()).count(),
            Lines::new(self.meta_info.as_slice()).count(),
            Lines::new(self.scores.as_slice()).count(),
        ]
    }

    /// Number of complete triples.
    pub fn len(&self) -> usize {
        shortest(self.line_counts())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over aligned lines, `\r\n` endings tolerated.
    pub fn triples(&self) -> Triples<'_> {
        Triples {
            translations: Lines::new(self.translations.as_slice()),
            meta_info: Lines::new(self.meta_info.as_slice()),
            scores: Lines::new(self.scores.as_slice()),
            line: 0,
        }
    }
}

pub struct Triples<'a> {
    translations: Lines<'a>,
    meta_info: Lines<'a>,
    scores: Lines<'a>,
    line: usize,
}

impl<'a> Iterator for Triples<'a> {
    type Item = Result<Triple<'a>, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        let meta = self.meta_info.next()?;
        let translation = self.translations.next()?;
        let score = self.scores.next()?;
        self.line += 1;
        Some(decode_triple(self.line, meta, translation, score))
    }
}

fn decode_triple<'a>(
    line: usize,
    meta: &'a [u8],
    translation: &'a [u8],
    score: &'a [u8],
) -> Result<Triple<'a>, CorpusError> {
    let decode = |kind: InputKind, bytes: &'a [u8]| {
        std::str::from_utf8(bytes).map_err(|source| CorpusError::Utf8 { kind, line, source })
    };
    Ok(Triple {
        line,
        meta: decode(InputKind::MetaInfo, meta)?,
        translation: decode(InputKind::Translations, translation)?,
        score: decode(InputKind::Scores, score)?,
    })
}

fn shortest(counts: [usize; 3]) -> usize {
    counts.into_iter().min().unwrap_or(0)
}

/// Lines of a buffer; a final newline does not start another line.
struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Lines<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let line = match self.rest.iter().position(|b| *b == b'\n') {
            Some(idx) => {
                let line = &self.rest[..idx];
                self.rest = &self.rest[idx + 1..];
                line
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(strip_cr(line))
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // Empty files cannot be mapped on every platform.
            if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}
