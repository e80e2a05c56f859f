use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const CLASS_SUFFIX: &str = ".class";

/// Lazily yields every regular file under `root`.
///
/// A root that is itself a file yields exactly that file; a missing path or a
/// special file yields nothing. Symbolic links are followed, and the walker
/// reports link loops as errors, which are skipped.
pub fn enumerate_files(root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
}

/// Derives the dotted type name for a class file found under `root`.
///
/// `<root>/com/example/Foo.class` becomes `com.example.Foo`. A root that is
/// the class file itself derives the name from the file name.
pub fn candidate_name(root: &Path, file: &Path) -> Option<String> {
    let relative = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => Path::new(file.file_name()?),
    };
    let relative = relative.to_string_lossy();
    let stem = relative.strip_suffix(CLASS_SUFFIX)?;
    Some(stem.replace(['/', std::path::MAIN_SEPARATOR], "."))
}

/// Same derivation for a member path inside an archive (always `/`-separated).
pub fn entry_candidate_name(entry_name: &str) -> Option<String> {
    let stem = entry_name.strip_suffix(CLASS_SUFFIX)?;
    Some(stem.replace('/', "."))
}

pub fn class_name_to_class_path(class_name: &str) -> String {
    format!("{}{CLASS_SUFFIX}", class_name.replace('.', "/"))
}
