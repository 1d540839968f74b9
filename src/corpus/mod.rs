//! Document corpus loading
//!
//! A corpus is a directory of plain-text files. Every file whose extension
//! matches is loaded whole as one [`Document`]; traversal is recursive unless
//! configured otherwise, and always visits entries in file-name order so two
//! scans of an unchanged directory yield the same sequence.

use crate::config::CorpusConfig;
use crate::index::IndexBuildError;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A loaded text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: PathBuf,
    content: String,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// File the document was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Raw text content
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// BLAKE3 digest over every matching file's relative path and content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorpusFingerprint(blake3::Hash);

impl CorpusFingerprint {
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for CorpusFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Documents read in one scan, plus the fingerprint of exactly those bytes
#[derive(Debug, Clone)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub fingerprint: CorpusFingerprint,
}

/// Scans a corpus directory for documents
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    extension: String,
    recursive: bool,
}

impl CorpusLoader {
    pub fn new(extension: impl Into<String>, recursive: bool) -> Self {
        Self {
            extension: extension.into(),
            recursive,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(config.extension.clone(), config.recursive)
    }

    /// Load every matching document under `root`
    pub fn load(&self, root: &Path) -> Result<Corpus, IndexBuildError> {
        let mut hasher = blake3::Hasher::new();
        let mut documents = Vec::new();

        for path in self.matching_files(root)? {
            let bytes = std::fs::read(&path).map_err(|e| IndexBuildError::CorpusUnreadable {
                path: path.clone(),
                source: e,
            })?;
            Self::hash_entry(&mut hasher, root, &path, &bytes);

            let content = String::from_utf8(bytes)
                .map_err(|e| IndexBuildError::Decode {
                    path: path.clone(),
                    message: e.utf8_error().to_string(),
                })?;
            documents.push(Document::new(path, content));
        }

        Ok(Corpus {
            documents,
            fingerprint: CorpusFingerprint(hasher.finalize()),
        })
    }

    /// Fingerprint the corpus without decoding documents
    pub fn fingerprint(&self, root: &Path) -> Result<CorpusFingerprint, IndexBuildError> {
        let mut hasher = blake3::Hasher::new();

        for path in self.matching_files(root)? {
            let bytes = std::fs::read(&path).map_err(|e| IndexBuildError::CorpusUnreadable {
                path: path.clone(),
                source: e,
            })?;
            Self::hash_entry(&mut hasher, root, &path, &bytes);
        }

        Ok(CorpusFingerprint(hasher.finalize()))
    }

    fn hash_entry(hasher: &mut blake3::Hasher, root: &Path, path: &Path, bytes: &[u8]) {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = relative.to_string_lossy();
        // Length prefixes keep (path, content) boundaries unambiguous
        hasher.update(&(name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }

    fn matching_files(&self, root: &Path) -> Result<Vec<PathBuf>, IndexBuildError> {
        let metadata = std::fs::metadata(root).map_err(|e| IndexBuildError::CorpusUnreadable {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(IndexBuildError::CorpusUnreadable {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "corpus path is not a directory",
                ),
            });
        }

        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                let source = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected")
                });
                IndexBuildError::CorpusUnreadable { path, source }
            })?;

            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.extension)
            .unwrap_or(false)
    }
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new("txt", true)
    }
}
