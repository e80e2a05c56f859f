use crate::annotation::{Annotation, ElementValue, parse_annotations, parse_element_value};
use crate::descriptor::binary_name;
use crate::error::ClassFileError;

pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const EXCEPTIONS: &str = "Exceptions";
const ANNOTATION_DEFAULT: &str = "AnnotationDefault";

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub access_flags: u16,
    /// Dotted binary name, e.g. `com.example.Outer$Inner`.
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub exceptions: Vec<String>,
    pub annotations: Vec<Annotation>,
    /// Default of an annotation type element.
    pub default_value: Option<ElementValue>,
}

impl ClassFile {
    pub fn parse(data: &[u8]) -> Result<Self, ClassFileError> {
        let mut r = Reader::new(data);

        let magic = r.u32()?;
        if magic != CLASS_MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let _minor = r.u16()?;
        let _major = r.u16()?;

        let pool = ConstantPool::parse(&mut r)?;

        let access_flags = r.u16()?;
        let name = binary_name(pool.class_name(r.u16()?)?);
        let super_index = r.u16()?;
        let super_class = if super_index == 0 {
            None
        } else {
            Some(binary_name(pool.class_name(super_index)?))
        };

        let interface_count = r.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(binary_name(pool.class_name(r.u16()?)?));
        }

        let field_count = r.u16()?;
        for _ in 0..field_count {
            r.skip(6)?;
            skip_attributes(&mut r)?;
        }

        let method_count = r.u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(parse_method(&mut r, &pool)?);
        }

        let mut annotations = Vec::new();
        let attribute_count = r.u16()?;
        for _ in 0..attribute_count {
            let attr_name = pool.utf8(r.u16()?)?;
            let len = r.u32()? as usize;
            let body = r.bytes(len)?;
            if attr_name == RUNTIME_VISIBLE_ANNOTATIONS {
                annotations = parse_annotations(&mut Reader::new(body), &pool)?;
            }
        }

        Ok(Self {
            access_flags,
            name,
            super_class,
            interfaces,
            methods,
            annotations,
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.access_flags & ACC_ANNOTATION != 0
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags & ACC_ENUM != 0
    }

    pub fn is_module(&self) -> bool {
        self.access_flags & ACC_MODULE != 0
    }

    pub fn has_annotation(&self, type_name: &str) -> bool {
        self.annotations.iter().any(|a| a.type_name == type_name)
    }
}

impl MethodInfo {
    pub fn is_public(&self) -> bool {
        self.access_flags & ACC_PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }

    /// Constructors and static initializers are not methods for reporting purposes.
    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }

    pub fn has_annotation(&self, type_name: &str) -> bool {
        self.annotations.iter().any(|a| a.type_name == type_name)
    }
}

fn parse_method(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<MethodInfo, ClassFileError> {
    let access_flags = r.u16()?;
    let name = pool.utf8(r.u16()?)?.to_string();
    let descriptor = pool.utf8(r.u16()?)?.to_string();

    let mut exceptions = Vec::new();
    let mut annotations = Vec::new();
    let mut default_value = None;
    let attribute_count = r.u16()?;
    for _ in 0..attribute_count {
        let attr_name = pool.utf8(r.u16()?)?;
        let len = r.u32()? as usize;
        let body = r.bytes(len)?;
        match attr_name {
            RUNTIME_VISIBLE_ANNOTATIONS => {
                annotations = parse_annotations(&mut Reader::new(body), pool)?;
            }
            EXCEPTIONS => {
                let mut body = Reader::new(body);
                let count = body.u16()?;
                for _ in 0..count {
                    exceptions.push(binary_name(pool.class_name(body.u16()?)?));
                }
            }
            ANNOTATION_DEFAULT => {
                default_value = Some(parse_element_value(&mut Reader::new(body), pool)?);
            }
            _ => {}
        }
    }

    Ok(MethodInfo {
        access_flags,
        name,
        descriptor,
        exceptions,
        annotations,
        default_value,
    })
}

fn skip_attributes(r: &mut Reader<'_>) -> Result<(), ClassFileError> {
    let count = r.u16()?;
    for _ in 0..count {
        r.skip(2)?;
        let len = r.u32()? as usize;
        r.skip(len)?;
    }
    Ok(())
}

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassFileError::Truncated { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        self.bytes(len).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, ClassFileError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, ClassFileError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, ClassFileError> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok((hi << 32) | lo)
    }
}

#[derive(Debug, Clone)]
enum Constant {
    /// Index 0 and the second slot of long/double entries.
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    Other,
}

#[derive(Debug)]
pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(r: &mut Reader<'_>) -> Result<Self, ClassFileError> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        while entries.len() < count as usize {
            let index = entries.len() as u16;
            let tag = r.u8()?;
            let (entry, wide) = match tag {
                1 => {
                    let len = r.u16()? as usize;
                    (Constant::Utf8(decode_modified_utf8(r.bytes(len)?)), false)
                }
                3 => (Constant::Integer(r.u32()? as i32), false),
                4 => (Constant::Float(f32::from_bits(r.u32()?)), false),
                5 => (Constant::Long(r.u64()? as i64), true),
                6 => (Constant::Double(f64::from_bits(r.u64()?)), true),
                7 => (Constant::Class(r.u16()?), false),
                8 | 16 | 19 | 20 => {
                    r.skip(2)?;
                    (Constant::Other, false)
                }
                15 => {
                    r.skip(3)?;
                    (Constant::Other, false)
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    r.skip(4)?;
                    (Constant::Other, false)
                }
                _ => return Err(ClassFileError::UnknownConstantTag { tag, index }),
            };
            entries.push(entry);
            if wide {
                entries.push(Constant::Unusable);
            }
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize)
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index) {
            Some(Constant::Utf8(s)) => Ok(s),
            _ => Err(ClassFileError::BadConstant { index, expected: "Utf8" }),
        }
    }

    pub(crate) fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => Err(ClassFileError::BadConstant { index, expected: "Class" }),
        }
    }

    pub(crate) fn integer(&self, index: u16) -> Result<i32, ClassFileError> {
        match self.get(index) {
            Some(Constant::Integer(v)) => Ok(*v),
            _ => Err(ClassFileError::BadConstant { index, expected: "Integer" }),
        }
    }

    pub(crate) fn long(&self, index: u16) -> Result<i64, ClassFileError> {
        match self.get(index) {
            Some(Constant::Long(v)) => Ok(*v),
            _ => Err(ClassFileError::BadConstant { index, expected: "Long" }),
        }
    }

    pub(crate) fn float(&self, index: u16) -> Result<f32, ClassFileError> {
        match self.get(index) {
            Some(Constant::Float(v)) => Ok(*v),
            _ => Err(ClassFileError::BadConstant { index, expected: "Float" }),
        }
    }

    pub(crate) fn double(&self, index: u16) -> Result<f64, ClassFileError> {
        match self.get(index) {
            Some(Constant::Double(v)) => Ok(*v),
            _ => Err(ClassFileError::BadConstant { index, expected: "Double" }),
        }
    }
}

/// Class files store strings as "modified UTF-8": NUL is two bytes and
/// supplementary characters are encoded as surrogate pairs.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            units.push((((b & 0x1F) as u16) << 6) | (bytes[i + 1] & 0x3F) as u16);
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            units.push(
                (((b & 0x0F) as u16) << 12)
                    | (((bytes[i + 1] & 0x3F) as u16) << 6)
                    | (bytes[i + 2] & 0x3F) as u16,
            );
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}
