//! # annotated-scan
//!
//! Finds the classes on a Java class search path that carry a marker annotation,
//! reading class files directly instead of loading them into a JVM.
//!
//! ## Architecture
//!
//! - **roots**: search-path entries and their conversion to filesystem paths
//! - **scan**: lazy file enumeration and candidate name derivation
//! - **archive**: memory-mapped jar/zip roots
//! - **classfile**: class file header, method, and attribute parsing
//! - **annotation**: runtime-visible annotations and their source-like rendering
//! - **descriptor**: field and method descriptors as Java type names
//! - **registry**: first-definition type lookup across roots, inherited annotations,
//!   element defaults and methods
//! - **structure**: display strings for types, methods, and annotation lists
//! - **report**: the filter/report pipeline over all roots
//! - **config**: search path and marker resolution from CLI and environment

pub mod annotation;
pub mod archive;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod report;
pub mod roots;
pub mod scan;
pub mod structure;

#[cfg(test)]
#[path = "../tests/support/classgen.rs"]
pub(crate) mod classgen;
