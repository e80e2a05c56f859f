use std::fmt;

use crate::classfile::{ConstantPool, Reader};
use crate::descriptor::{class_literal, field_type_name};
use crate::error::ClassFileError;

pub const INHERITED: &str = "java.lang.annotation.Inherited";

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Dotted binary name of the annotation type.
    pub type_name: String,
    pub elements: Vec<(String, ElementValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Byte(i8),
    Char(char),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(String),
    Enum { type_name: String, constant: String },
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

pub(crate) fn parse_annotations(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Annotation>, ClassFileError> {
    let count = r.u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(r, pool)?);
    }
    Ok(annotations)
}

fn parse_annotation(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Annotation, ClassFileError> {
    let type_name = field_type_name(pool.utf8(r.u16()?)?)?;
    let pair_count = r.u16()?;
    let mut elements = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name = pool.utf8(r.u16()?)?.to_string();
        elements.push((name, parse_element_value(r, pool)?));
    }
    Ok(Annotation {
        type_name,
        elements,
    })
}

pub(crate) fn parse_element_value(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, ClassFileError> {
    let tag = r.u8()? as char;
    let value = match tag {
        'B' => ElementValue::Byte(pool.integer(r.u16()?)? as i8),
        'C' => {
            let code = pool.integer(r.u16()?)? as u32;
            ElementValue::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        }
        'D' => ElementValue::Double(pool.double(r.u16()?)?),
        'F' => ElementValue::Float(pool.float(r.u16()?)?),
        'I' => ElementValue::Int(pool.integer(r.u16()?)?),
        'J' => ElementValue::Long(pool.long(r.u16()?)?),
        'S' => ElementValue::Short(pool.integer(r.u16()?)? as i16),
        'Z' => ElementValue::Boolean(pool.integer(r.u16()?)? != 0),
        's' => ElementValue::String(pool.utf8(r.u16()?)?.to_string()),
        'e' => {
            let type_name = field_type_name(pool.utf8(r.u16()?)?)?;
            let constant = pool.utf8(r.u16()?)?.to_string();
            ElementValue::Enum {
                type_name,
                constant,
            }
        }
        'c' => ElementValue::Class(class_literal(pool.utf8(r.u16()?)?)?),
        '@' => ElementValue::Annotation(parse_annotation(r, pool)?),
        '[' => {
            let count = r.u16()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(r, pool)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(ClassFileError::UnknownElementTag(other)),
    };
    Ok(value)
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.type_name)?;
        for (i, (name, value)) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Byte(v) => write!(f, "(byte)0x{:02x}", *v as u8),
            ElementValue::Char(c) => {
                f.write_str("'")?;
                match c {
                    '\'' => f.write_str("\\'")?,
                    _ => write_escaped(f, *c)?,
                }
                f.write_str("'")
            }
            ElementValue::Double(v) => f.write_str(&java_double(*v)),
            ElementValue::Float(v) => f.write_str(&java_float(*v)),
            ElementValue::Int(v) => write!(f, "{v}"),
            ElementValue::Long(v) => write!(f, "{v}L"),
            ElementValue::Short(v) => write!(f, "(short){v}"),
            ElementValue::Boolean(v) => write!(f, "{v}"),
            ElementValue::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        _ => write_escaped(f, c)?,
                    }
                }
                f.write_str("\"")
            }
            ElementValue::Enum { constant, .. } => f.write_str(constant),
            ElementValue::Class(literal) => f.write_str(literal),
            ElementValue::Annotation(a) => write!(f, "{a}"),
            ElementValue::Array(values) => {
                f.write_str("{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\u{8}' => f.write_str("\\b"),
        '\t' => f.write_str("\\t"),
        '\n' => f.write_str("\\n"),
        '\u{c}' => f.write_str("\\f"),
        '\r' => f.write_str("\\r"),
        '\\' => f.write_str("\\\\"),
        c if c.is_control() => write!(f, "\\u{:04x}", c as u32),
        c => write!(f, "{c}"),
    }
}

fn java_double(v: f64) -> String {
    if v.is_nan() {
        return "0.0/0.0".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "1.0/0.0" } else { "-1.0/0.0" }.to_string();
    }
    java_exponent(format!("{v:?}"))
}

fn java_float(v: f32) -> String {
    if v.is_nan() {
        return "0.0f/0.0f".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "1.0f/0.0f" } else { "-1.0f/0.0f" }.to_string();
    }
    format!("{}f", java_exponent(format!("{v:?}")))
}

/// Rust's `1e20` becomes Java's `1.0E20`.
fn java_exponent(repr: String) -> String {
    match repr.split_once('e') {
        Some((mantissa, exp)) if mantissa.contains('.') => format!("{mantissa}E{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}.0E{exp}"),
        None => repr,
    }
}
