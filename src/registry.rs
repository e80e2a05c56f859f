use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use log::debug;

use crate::annotation::{Annotation, ElementValue, INHERITED};
use crate::archive::Archive;
use crate::classfile::{ClassFile, MethodInfo};
use crate::roots::{Root, RootKind, root_kind};
use crate::scan::class_name_to_class_path;

/// Parses `bytes` and accepts the result only if it declares `expected_name`.
///
/// Module descriptors are not types and never resolve.
pub fn resolve_bytes(bytes: &[u8], expected_name: &str) -> Option<ClassFile> {
    let class = ClassFile::parse(bytes).ok()?;
    if class.is_module() || class.name != expected_name {
        return None;
    }
    Some(class)
}

/// A public method as seen on a type, with the type that declares it.
#[derive(Debug, Clone)]
pub struct PublicMethod {
    pub declaring_class: String,
    pub declared_in_interface: bool,
    pub method: MethodInfo,
}

/// What the registry knows about an annotation type. Types that cannot be
/// loaded have no defaults and are not inherited.
#[derive(Debug, Clone, Default)]
pub struct AnnotationType {
    pub inherited: bool,
    /// Element defaults in declaration order.
    pub defaults: Vec<(String, ElementValue)>,
}

enum Entry {
    Directory(PathBuf),
    Archive(RefCell<Archive>),
}

/// Type lookup across every root of the search path, in search-path order.
///
/// Archive roots are opened once, when the registry is built.
pub struct ClassRegistry {
    entries: Vec<Entry>,
    annotation_types: RefCell<HashMap<String, Rc<AnnotationType>>>,
}

impl ClassRegistry {
    pub fn new(roots: &[Root]) -> Self {
        let entries = roots
            .iter()
            .filter_map(|root| root.path().ok())
            .filter_map(|path| match root_kind(&path) {
                RootKind::Directory => Some(Entry::Directory(path)),
                RootKind::Archive => match Archive::open(&path) {
                    Ok(archive) => Some(Entry::Archive(RefCell::new(archive))),
                    Err(e) => {
                        debug!("Archive left out of the registry: {e:#}");
                        None
                    }
                },
                RootKind::File | RootKind::Missing => None,
            })
            .collect::<Vec<_>>();
        debug!("Class registry covers {} roots", entries.len());
        Self {
            entries,
            annotation_types: RefCell::new(HashMap::new()),
        }
    }

    /// Bytes of the first artifact on the search path named after `name`.
    pub fn definition(&self, name: &str) -> Option<Vec<u8>> {
        let class_path = class_name_to_class_path(name);
        self.entries.iter().find_map(|entry| match entry {
            Entry::Directory(path) => std::fs::read(path.join(&class_path)).ok(),
            Entry::Archive(archive) => archive.borrow_mut().read(&class_path),
        })
    }

    /// The type `name` as the search path defines it: the first artifact named
    /// after it wins, even when that artifact does not resolve.
    pub fn load(&self, name: &str) -> Option<ClassFile> {
        resolve_bytes(&self.definition(name)?, name)
    }

    pub fn annotation_type(&self, type_name: &str) -> Rc<AnnotationType> {
        if let Some(known) = self.annotation_types.borrow().get(type_name) {
            return Rc::clone(known);
        }
        let info = Rc::new(
            self.load(type_name)
                .filter(ClassFile::is_annotation)
                .map(|class| AnnotationType {
                    inherited: class.has_annotation(INHERITED),
                    defaults: class
                        .methods
                        .iter()
                        .filter_map(|m| Some((m.name.clone(), m.default_value.clone()?)))
                        .collect(),
                })
                .unwrap_or_default(),
        );
        self.annotation_types
            .borrow_mut()
            .insert(type_name.to_string(), Rc::clone(&info));
        info
    }

    /// Whether the annotation type `type_name` is meta-annotated `@Inherited`.
    pub fn is_inherited_annotation(&self, type_name: &str) -> bool {
        self.annotation_type(type_name).inherited
    }

    /// Loadable superclasses of `class`, nearest first.
    pub fn superclasses(&self, class: &ClassFile) -> Vec<ClassFile> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([class.name.clone()]);
        let mut next = class.super_class.clone();
        while let Some(name) = next {
            if !visited.insert(name.clone()) {
                break;
            }
            let Some(parent) = self.load(&name) else {
                break;
            };
            next = parent.super_class.clone();
            chain.push(parent);
        }
        chain
    }

    /// Declared annotations plus `@Inherited` ones from superclasses.
    ///
    /// Inherited annotations come first; a declared annotation of the same type
    /// replaces the inherited one in place.
    pub fn effective_annotations(&self, class: &ClassFile) -> Vec<Annotation> {
        let supers = self.superclasses(class);
        if supers.is_empty() {
            return class.annotations.clone();
        }

        let mut result: Vec<Annotation> = Vec::new();
        for parent in supers.iter().rev() {
            for a in &parent.annotations {
                if self.is_inherited_annotation(&a.type_name) {
                    put_annotation(&mut result, a.clone());
                }
            }
        }
        for a in &class.annotations {
            put_annotation(&mut result, a.clone());
        }
        result
    }

    /// `annotation` with every element its type defaults and the class file
    /// omits, nested annotations included.
    ///
    /// Defaulted elements keep the annotation type's declaration order; an
    /// explicit value takes the place of its default, and elements without a
    /// default follow.
    pub fn with_defaults(&self, annotation: &Annotation) -> Annotation {
        self.fill_defaults(annotation, &mut Vec::new())
    }

    fn fill_defaults(&self, annotation: &Annotation, open: &mut Vec<String>) -> Annotation {
        // A default may nest its own annotation type; fill each type once per path.
        if open.contains(&annotation.type_name) {
            return annotation.clone();
        }
        open.push(annotation.type_name.clone());

        let mut elements = self.annotation_type(&annotation.type_name).defaults.clone();
        for (name, value) in &annotation.elements {
            match elements.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.clone(),
                None => elements.push((name.clone(), value.clone())),
            }
        }
        for (_, value) in &mut elements {
            *value = self.fill_value(value, open);
        }

        open.pop();
        Annotation {
            type_name: annotation.type_name.clone(),
            elements,
        }
    }

    fn fill_value(&self, value: &ElementValue, open: &mut Vec<String>) -> ElementValue {
        match value {
            ElementValue::Annotation(a) => ElementValue::Annotation(self.fill_defaults(a, open)),
            ElementValue::Array(values) => {
                ElementValue::Array(values.iter().map(|v| self.fill_value(v, open)).collect())
            }
            other => other.clone(),
        }
    }

    /// Public methods declared by `class` or inherited from its superclasses
    /// and superinterfaces. Constructors and static initializers are excluded,
    /// static interface methods are not inherited, and the first method seen
    /// for a name and descriptor wins.
    pub fn public_methods(&self, class: &ClassFile) -> Vec<PublicMethod> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut methods = Vec::new();

        let mut hierarchy = vec![class.clone()];
        hierarchy.extend(self.superclasses(class));

        for c in &hierarchy {
            collect_public(c, false, &mut seen, &mut methods);
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = hierarchy
            .iter()
            .flat_map(|c| c.interfaces.iter().cloned())
            .collect();
        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(iface) = self.load(&name) else {
                continue;
            };
            collect_public(&iface, true, &mut seen, &mut methods);
            queue.extend(iface.interfaces.iter().cloned());
        }

        methods
    }
}

fn put_annotation(list: &mut Vec<Annotation>, annotation: Annotation) {
    match list.iter_mut().find(|a| a.type_name == annotation.type_name) {
        Some(existing) => *existing = annotation,
        None => list.push(annotation),
    }
}

fn collect_public(
    class: &ClassFile,
    skip_static: bool,
    seen: &mut HashSet<(String, String)>,
    out: &mut Vec<PublicMethod>,
) {
    for m in &class.methods {
        if !m.is_public() || m.is_initializer() || (skip_static && m.is_static()) {
            continue;
        }
        if seen.insert((m.name.clone(), m.descriptor.clone())) {
            out.push(PublicMethod {
                declaring_class: class.name.clone(),
                declared_in_interface: class.is_interface(),
                method: m.clone(),
            });
        }
    }
}
