use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::scan::CLASS_SUFFIX;

/// A memory-mapped jar/zip opened for reading class members.
pub struct Archive {
    zip: ZipArchive<Cursor<Mmap>>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open archive: {}", path.display()))?;
        // SAFETY: The file is opened read-only and the map is owned by the archive,
        // which never hands out references that outlive it.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to mmap archive: {}", path.display()))?;
        let zip = ZipArchive::new(Cursor::new(mmap))
            .with_context(|| format!("Failed to read zip structure: {}", path.display()))?;
        Ok(Self { zip })
    }

    /// Names of all `.class` members, in central directory order.
    pub fn class_entries(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        for i in 0..self.zip.len() {
            let Ok(entry) = self.zip.by_index(i) else {
                continue;
            };
            if entry.is_file() && entry.name().ends_with(CLASS_SUFFIX) {
                names.push(entry.name().to_string());
            }
        }
        names
    }

    /// Reads one member; `None` when it is missing or unreadable.
    pub fn read(&mut self, entry_name: &str) -> Option<Vec<u8>> {
        let mut entry = self.zip.by_name(entry_name).ok()?;
        if entry.is_dir() {
            return None;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).ok()?;
        Some(bytes)
    }
}
