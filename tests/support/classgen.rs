//! Assembles minimal class files for tests, so fixtures do not need a JDK.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

#[derive(Debug, Clone)]
pub enum ValueSpec {
    Int(i32),
    Long(i64),
    Bool(bool),
    Str(String),
    Enum(String, String),
    Class(String),
    Annotation(AnnotationSpec),
    Array(Vec<ValueSpec>),
}

#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    type_name: String,
    elements: Vec<(String, ValueSpec)>,
}

impl AnnotationSpec {
    /// `type_name` is an internal name such as `com/example/Marker`.
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, name: &str, value: ValueSpec) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    access: u16,
    name: String,
    descriptor: String,
    exceptions: Vec<String>,
    annotations: Vec<AnnotationSpec>,
    default_value: Option<ValueSpec>,
}

impl MethodSpec {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            access: ACC_PUBLIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            exceptions: Vec::new(),
            annotations: Vec::new(),
            default_value: None,
        }
    }

    /// Annotation type element: `public abstract` with an optional default.
    pub fn element(name: &str, descriptor: &str) -> Self {
        Self::new(name, &format!("(){descriptor}")).access(ACC_PUBLIC | ACC_ABSTRACT)
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn default_value(mut self, value: ValueSpec) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn throws(mut self, class: &str) -> Self {
        self.exceptions.push(class.to_string());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassSpec {
    access: u16,
    name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    methods: Vec<MethodSpec>,
    annotations: Vec<AnnotationSpec>,
}

impl ClassSpec {
    pub fn new(name: &str) -> Self {
        Self {
            access: ACC_PUBLIC | ACC_SUPER,
            name: name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Annotation type: `public @interface`.
    pub fn annotation_type(name: &str) -> Self {
        Self::new(name)
            .access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION)
            .interface("java/lang/annotation/Annotation")
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_string());
        self
    }

    pub fn no_super_class(mut self) -> Self {
        self.super_class = None;
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        put_u16(&mut body, pool.class(&self.name));
        let super_index = self.super_class.as_deref().map_or(0, |s| pool.class(s));
        put_u16(&mut body, super_index);

        put_u16(&mut body, self.interfaces.len() as u16);
        for iface in &self.interfaces {
            put_u16(&mut body, pool.class(iface));
        }

        put_u16(&mut body, 0);

        put_u16(&mut body, self.methods.len() as u16);
        for m in &self.methods {
            put_u16(&mut body, m.access);
            put_u16(&mut body, pool.utf8(&m.name));
            put_u16(&mut body, pool.utf8(&m.descriptor));

            let mut attrs = Vec::new();
            if !m.exceptions.is_empty() {
                let mut data = Vec::new();
                put_u16(&mut data, m.exceptions.len() as u16);
                for e in &m.exceptions {
                    put_u16(&mut data, pool.class(e));
                }
                attrs.push((pool.utf8("Exceptions"), data));
            }
            if !m.annotations.is_empty() {
                let data = annotations_attribute(&mut pool, &m.annotations);
                attrs.push((pool.utf8("RuntimeVisibleAnnotations"), data));
            }
            if let Some(value) = &m.default_value {
                let mut data = Vec::new();
                put_value(&mut data, &mut pool, value);
                attrs.push((pool.utf8("AnnotationDefault"), data));
            }
            put_attributes(&mut body, attrs);
        }

        let mut attrs = Vec::new();
        if !self.annotations.is_empty() {
            let data = annotations_attribute(&mut pool, &self.annotations);
            attrs.push((pool.utf8("RuntimeVisibleAnnotations"), data));
        }
        // Unrelated attribute the parser must step over.
        let source = pool.utf8("Fixture.java");
        let mut data = Vec::new();
        put_u16(&mut data, source);
        attrs.push((pool.utf8("SourceFile"), data));
        put_attributes(&mut body, attrs);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u16(&mut out, 0);
        put_u16(&mut out, 52);
        put_u16(&mut out, pool.next_index);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }

    /// Writes the class under `root` at the path its name implies.
    pub fn write_to(&self, root: &Path) -> std::io::Result<PathBuf> {
        let path = root.join(format!("{}.class", self.name));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.build())?;
        Ok(path)
    }

    pub fn entry_name(&self) -> String {
        format!("{}.class", self.name)
    }
}

struct PoolBuilder {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl PoolBuilder {
    fn push(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.bytes.extend_from_slice(entry);
        self.next_index += slots;
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(i) = self.utf8.get(s) {
            return *i;
        }
        let mut entry = vec![1];
        put_u16(&mut entry, s.len() as u16);
        entry.extend_from_slice(s.as_bytes());
        let index = self.push(&entry, 1);
        self.utf8.insert(s.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(i) = self.classes.get(name) {
            return *i;
        }
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        put_u16(&mut entry, name_index);
        let index = self.push(&entry, 1);
        self.classes.insert(name.to_string(), index);
        index
    }

    fn int(&mut self, v: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&v.to_be_bytes());
        self.push(&entry, 1)
    }

    fn long(&mut self, v: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&v.to_be_bytes());
        self.push(&entry, 2)
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_attributes(out: &mut Vec<u8>, attrs: Vec<(u16, Vec<u8>)>) {
    put_u16(out, attrs.len() as u16);
    for (name, data) in attrs {
        put_u16(out, name);
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&data);
    }
}

fn annotations_attribute(pool: &mut PoolBuilder, annotations: &[AnnotationSpec]) -> Vec<u8> {
    let mut data = Vec::new();
    put_u16(&mut data, annotations.len() as u16);
    for a in annotations {
        put_annotation(&mut data, pool, a);
    }
    data
}

fn put_annotation(out: &mut Vec<u8>, pool: &mut PoolBuilder, a: &AnnotationSpec) {
    put_u16(out, pool.utf8(&format!("L{};", a.type_name)));
    put_u16(out, a.elements.len() as u16);
    for (name, value) in &a.elements {
        put_u16(out, pool.utf8(name));
        put_value(out, pool, value);
    }
}

fn put_value(out: &mut Vec<u8>, pool: &mut PoolBuilder, value: &ValueSpec) {
    match value {
        ValueSpec::Int(v) => {
            out.push(b'I');
            put_u16(out, pool.int(*v));
        }
        ValueSpec::Long(v) => {
            out.push(b'J');
            put_u16(out, pool.long(*v));
        }
        ValueSpec::Bool(v) => {
            out.push(b'Z');
            put_u16(out, pool.int(i32::from(*v)));
        }
        ValueSpec::Str(s) => {
            out.push(b's');
            put_u16(out, pool.utf8(s));
        }
        ValueSpec::Enum(type_name, constant) => {
            out.push(b'e');
            put_u16(out, pool.utf8(&format!("L{type_name};")));
            put_u16(out, pool.utf8(constant));
        }
        ValueSpec::Class(descriptor) => {
            out.push(b'c');
            put_u16(out, pool.utf8(descriptor));
        }
        ValueSpec::Annotation(a) => {
            out.push(b'@');
            put_annotation(out, pool, a);
        }
        ValueSpec::Array(values) => {
            out.push(b'[');
            put_u16(out, values.len() as u16);
            for v in values {
                put_value(out, pool, v);
            }
        }
    }
}
