use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ScanError;

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

/// One entry of the class search path, kept as written so it can be echoed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Directory,
    Archive,
    File,
    Missing,
}

impl Root {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Converts the location to a filesystem path.
    ///
    /// Plain paths, `~/...` and hierarchical `file:` URLs convert; any other URL
    /// scheme does not.
    pub fn path(&self) -> Result<PathBuf, ScanError> {
        let location = self.location.as_str();
        if location.is_empty() {
            return Ok(PathBuf::from("."));
        }

        // A single letter before `:` is a Windows drive, not a scheme.
        if let Ok(url) = Url::parse(location)
            && url.scheme().len() > 1
        {
            return self.file_url_path(location, &url);
        }

        if let Some(rest) = location.strip_prefix('~')
            && (rest.is_empty() || rest.starts_with(['/', std::path::MAIN_SEPARATOR]))
            && let Some(home) = dirs::home_dir()
        {
            return Ok(home.join(rest.trim_start_matches(['/', std::path::MAIN_SEPARATOR])));
        }

        Ok(PathBuf::from(location))
    }

    fn file_url_path(&self, location: &str, url: &Url) -> Result<PathBuf, ScanError> {
        if url.scheme() != "file" || url.query().is_some() || url.fragment().is_some() {
            return Err(self.unresolvable());
        }
        // `file:relative/dir` is opaque, not a path.
        let hierarchical = location
            .split_once(':')
            .is_some_and(|(_, rest)| rest.starts_with('/'));
        if !hierarchical {
            return Err(self.unresolvable());
        }
        url.to_file_path().map_err(|()| self.unresolvable())
    }

    fn unresolvable(&self) -> ScanError {
        ScanError::UnresolvableLocation {
            location: self.location.clone(),
        }
    }
}

pub fn root_kind(path: &Path) -> RootKind {
    if path.is_dir() {
        RootKind::Directory
    } else if path.is_file() {
        if is_archive(path) {
            RootKind::Archive
        } else {
            RootKind::File
        }
    } else {
        RootKind::Missing
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ARCHIVE_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

/// Splits a platform search path (`:` on Unix, `;` on Windows) into Roots, in order.
pub fn resolve_roots(search_path: &OsStr) -> Vec<Root> {
    std::env::split_paths(search_path)
        .map(|p| Root::new(p.to_string_lossy()))
        .collect()
}
