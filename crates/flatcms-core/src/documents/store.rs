use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::kind::DocumentKind;
use crate::error::{Error, Result};
use crate::fsio::{write_atomic, STAGING_SUFFIX};

/// Flat directory of documents; the filename is the identifier.
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn classify(filename: &str) -> DocumentKind {
        DocumentKind::classify(filename)
    }

    /// True if `filename` names a single entry directly inside the root.
    /// Rejects separators, `..`, NUL and hidden names.
    fn is_safe_name(filename: &str) -> bool {
        !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\', '\0'])
    }

    /// Resolve a filename for an existing-document operation. Unsafe names
    /// behave as if the document did not exist.
    fn existing_path(&self, filename: &str) -> Result<PathBuf> {
        if !Self::is_safe_name(filename) {
            warn!(filename = %filename, "Rejected unsafe document name");
            return Err(Error::NotFound(filename.to_string()));
        }
        let path = self.root.join(filename);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound(filename.to_string()))
        }
    }

    /// Filenames in the store, sorted alphabetically.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            if name.starts_with('.') || name.ends_with(STAGING_SUFFIX) {
                continue;
            }
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        debug!(count = names.len(), "Listed documents");
        Ok(names)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.existing_path(filename).is_ok()
    }

    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.existing_path(filename)?;
        match std::fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(filename.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Create or overwrite `filename` with `content`.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<()> {
        if !Self::is_safe_name(filename) {
            return Err(Error::Validation(format!("{} is not a valid name.", filename)));
        }
        write_atomic(&self.root.join(filename), content)?;
        info!(filename = %filename, bytes = content.len(), "Wrote document");
        Ok(())
    }

    /// Validate `filename` and create it as an empty document.
    /// Nothing is written when validation fails.
    pub fn create(&self, filename: &str) -> Result<()> {
        if filename.is_empty() {
            return Err(Error::Validation("A name is required.".to_string()));
        }
        if Self::classify(filename) == DocumentKind::Rejected {
            return Err(Error::Validation("File must be .txt or .md.".to_string()));
        }
        if !Self::is_safe_name(filename) {
            return Err(Error::Validation(format!("{} is not a valid name.", filename)));
        }
        if self.root.join(filename).exists() {
            return Err(Error::Validation(format!("{} already exists.", filename)));
        }
        self.write(filename, b"")
    }

    /// Replace the content of an existing document.
    pub fn update(&self, filename: &str, content: &[u8]) -> Result<()> {
        self.existing_path(filename)?;
        self.write(filename, content)
    }

    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.existing_path(filename)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(filename = %filename, "Deleted document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(filename.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
