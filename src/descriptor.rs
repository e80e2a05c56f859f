use crate::error::ClassFileError;

/// Converts an internal name (`com/example/Foo$Bar`) to its dotted binary name.
pub fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Renders a field descriptor as a Java type name, e.g. `[Ljava/lang/String;` as
/// `java.lang.String[]`.
pub fn field_type_name(descriptor: &str) -> Result<String, ClassFileError> {
    let (name, rest) = parse_field_type(descriptor)?;
    if !rest.is_empty() {
        return Err(ClassFileError::BadDescriptor(descriptor.to_string()));
    }
    Ok(name)
}

/// Splits a method descriptor into parameter and return type names.
pub fn method_type_names(descriptor: &str) -> Result<(Vec<String>, String), ClassFileError> {
    let bad = || ClassFileError::BadDescriptor(descriptor.to_string());

    let mut rest = descriptor.strip_prefix('(').ok_or_else(bad)?;
    let mut params = Vec::new();
    while !rest.starts_with(')') {
        let (name, tail) = parse_field_type(rest).map_err(|_| bad())?;
        params.push(name);
        rest = tail;
    }

    let ret = &rest[1..];
    let ret = if ret == "V" {
        "void".to_string()
    } else {
        field_type_name(ret).map_err(|_| bad())?
    };
    Ok((params, ret))
}

/// Renders a class literal descriptor (`Ljava/lang/String;`, `I`, `V`) for
/// annotation display.
pub fn class_literal(descriptor: &str) -> Result<String, ClassFileError> {
    if descriptor == "V" {
        return Ok("void.class".to_string());
    }
    Ok(format!("{}.class", field_type_name(descriptor)?))
}

fn parse_field_type(input: &str) -> Result<(String, &str), ClassFileError> {
    let bad = || ClassFileError::BadDescriptor(input.to_string());

    let mut dims = 0usize;
    let mut rest = input;
    while let Some(tail) = rest.strip_prefix('[') {
        dims += 1;
        rest = tail;
    }

    let mut chars = rest.chars();
    let base = match chars.next().ok_or_else(bad)? {
        'B' => "byte".to_string(),
        'C' => "char".to_string(),
        'D' => "double".to_string(),
        'F' => "float".to_string(),
        'I' => "int".to_string(),
        'J' => "long".to_string(),
        'S' => "short".to_string(),
        'Z' => "boolean".to_string(),
        'L' => {
            let end = rest.find(';').ok_or_else(bad)?;
            let name = &rest[1..end];
            if name.is_empty() {
                return Err(bad());
            }
            let tail = &rest[end + 1..];
            return Ok((format!("{}{}", binary_name(name), "[]".repeat(dims)), tail));
        }
        _ => return Err(bad()),
    };

    Ok((format!("{base}{}", "[]".repeat(dims)), chars.as_str()))
}
