//! # Config Data Providers
//!
//! A provider wraps where a config document's text comes from. The validator
//! never reads from a provider itself: it hands the provider to a
//! [`ConfigBuilder`](crate::ConfigBuilder) and uses
//! [`ConfigDataProvider::config_data_info`] only for diagnostics.

use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Source of raw config text.
pub trait ConfigDataProvider: Send + Sync {
    /// Descriptive label for the wrapped data, used in logs and errors.
    fn config_data_info(&self) -> String;

    /// Open a reader over the config text.
    ///
    /// The reader is owned by the caller and released when dropped, so a
    /// failed parse never leaks the handle.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// Config text held in memory.
#[derive(Debug, Clone)]
pub struct StringConfigDataProvider {
    label: String,
    text: String,
}

impl StringConfigDataProvider {
    /// Wrap `text`, labelled `label` in diagnostics.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ConfigDataProvider for StringConfigDataProvider {
    fn config_data_info(&self) -> String {
        format!("string: {}", self.label)
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.text.as_bytes())))
    }
}

/// Config text read from a file each time it is opened.
#[derive(Debug, Clone)]
pub struct FileConfigDataProvider {
    path: PathBuf,
}

impl FileConfigDataProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigDataProvider for FileConfigDataProvider {
    fn config_data_info(&self) -> String {
        format!("file: {}", self.path.display())
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        let file = std::fs::File::open(&self.path)?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}
