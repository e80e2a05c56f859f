use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::Write;
use std::path::Path;

use crate::annotation::Annotation;
use crate::archive::Archive;
use crate::classfile::ClassFile;
use crate::registry::{ClassRegistry, resolve_bytes};
use crate::roots::{Root, RootKind, root_kind};
use crate::scan::{candidate_name, entry_candidate_name, enumerate_files};
use crate::structure::{annotation_list, method_display, type_display};

/// Type-level marker plus, in methods mode, the method-level marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub type_marker: String,
    pub method_marker: Option<String>,
}

/// Prints every root followed by its annotated types.
///
/// A root whose location cannot be converted is reported to `err` and skipped.
pub fn scan_roots<W: Write, E: Write>(
    roots: &[Root],
    markers: &Markers,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    let registry = ClassRegistry::new(roots);
    let scanner = Scanner::new(&registry, markers);

    for root in roots {
        writeln!(out, "{}", root.location()).context("Failed to write report")?;
        match root.path() {
            Ok(path) => {
                let reported = scanner.scan_root(&path, out)?;
                debug!("{}: {} annotated types", root.location(), reported);
            }
            Err(e) => {
                writeln!(err, "{:?}", anyhow::Error::new(e))
                    .context("Failed to write diagnostics")?;
            }
        }
    }
    Ok(())
}

pub struct Scanner<'a> {
    registry: &'a ClassRegistry,
    markers: &'a Markers,
    marker_inherited: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(registry: &'a ClassRegistry, markers: &'a Markers) -> Self {
        let marker_inherited = registry.is_inherited_annotation(&markers.type_marker);
        Self {
            registry,
            markers,
            marker_inherited,
        }
    }

    /// Reports qualifying types under one root; returns how many were reported.
    pub fn scan_root<W: Write>(&self, root: &Path, out: &mut W) -> Result<usize> {
        let mut reported = 0usize;
        for class in self.resolved_types(root) {
            if let Some(annotations) = self.qualifying_annotations(&class) {
                self.report(&class, &annotations, out)
                    .context("Failed to write report")?;
                reported += 1;
            }
        }
        Ok(reported)
    }

    /// Candidates that resolve to a type. Anything that does not resolve is
    /// dropped without a trace.
    fn resolved_types(&self, root: &Path) -> Box<dyn Iterator<Item = ClassFile> + '_> {
        if root_kind(root) == RootKind::Archive {
            let entries = match Archive::open(root) {
                Ok(mut archive) => archive.class_entries(),
                Err(e) => {
                    warn!("Skipping archive root: {e:#}");
                    return Box::new(std::iter::empty());
                }
            };
            return Box::new(entries.into_iter().filter_map(move |entry| {
                let name = entry_candidate_name(&entry)?;
                self.resolve(&name, || None)
            }));
        }

        let root = root.to_path_buf();
        Box::new(enumerate_files(&root).filter_map(move |file| self.resolve_file(&root, &file)))
    }

    fn resolve_file(&self, root: &Path, file: &Path) -> Option<ClassFile> {
        let name = candidate_name(root, file)?;
        self.resolve(&name, || std::fs::read(file).ok())
    }

    /// Resolves `name` the way the search path defines it. Only a name no
    /// registered root defines falls back to the candidate's own bytes, which
    /// covers single class-file roots.
    fn resolve(
        &self,
        name: &str,
        own_bytes: impl FnOnce() -> Option<Vec<u8>>,
    ) -> Option<ClassFile> {
        let bytes = self.registry.definition(name).or_else(own_bytes)?;
        resolve_bytes(&bytes, name)
    }

    /// The annotations to print when `class` qualifies for the report.
    fn qualifying_annotations(&self, class: &ClassFile) -> Option<Vec<Annotation>> {
        if class.is_annotation() || class.is_enum() || class.is_interface() {
            return None;
        }
        let marker = self.markers.type_marker.as_str();
        if !class.has_annotation(marker) && !self.marker_inherited {
            return None;
        }
        let annotations = self.registry.effective_annotations(class);
        annotations
            .iter()
            .any(|a| a.type_name == marker)
            .then_some(annotations)
    }

    fn report<W: Write>(
        &self,
        class: &ClassFile,
        annotations: &[Annotation],
        out: &mut W,
    ) -> std::io::Result<()> {
        writeln!(out, "{}: {}", type_display(class), self.annotation_list(annotations))?;

        let Some(method_marker) = self.markers.method_marker.as_deref() else {
            return Ok(());
        };
        for method in self.registry.public_methods(class) {
            if method.method.has_annotation(method_marker) {
                writeln!(
                    out,
                    "{}: {}",
                    method_display(&method),
                    self.annotation_list(&method.method.annotations)
                )?;
            }
        }
        Ok(())
    }

    fn annotation_list(&self, annotations: &[Annotation]) -> String {
        let complete: Vec<Annotation> = annotations
            .iter()
            .map(|a| self.registry.with_defaults(a))
            .collect();
        annotation_list(&complete)
    }
}
