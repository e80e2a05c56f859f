use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Class search path is not available (set CLASSPATH or pass --classpath)")]
    UnsupportedLoader,
    #[error("Cannot convert root location to a filesystem path: {location}")]
    UnresolvableLocation { location: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("Not a class file (magic 0x{0:08x})")]
    BadMagic(u32),
    #[error("Class file truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },
    #[error("Constant pool index {index} is not a valid {expected} entry")]
    BadConstant { index: u16, expected: &'static str },
    #[error("Malformed descriptor: {0}")]
    BadDescriptor(String),
    #[error("Unknown annotation element tag '{0}'")]
    UnknownElementTag(char),
}
