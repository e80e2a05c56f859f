use crate::annotation::Annotation;
use crate::classfile::{
    ACC_ABSTRACT, ACC_FINAL, ACC_NATIVE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
    ACC_STRICT, ACC_SYNCHRONIZED, ClassFile,
};
use crate::descriptor::method_type_names;
use crate::registry::PublicMethod;

/// Method modifiers in the order Java source renders them.
const METHOD_MODIFIERS: [(u16, &str); 9] = [
    (ACC_PUBLIC, "public"),
    (ACC_PROTECTED, "protected"),
    (ACC_PRIVATE, "private"),
    (ACC_ABSTRACT, "abstract"),
    (ACC_STATIC, "static"),
    (ACC_FINAL, "final"),
    (ACC_SYNCHRONIZED, "synchronized"),
    (ACC_NATIVE, "native"),
    (ACC_STRICT, "strictfp"),
];

pub fn type_display(class: &ClassFile) -> String {
    class.name.clone()
}

/// `public void com.example.Widget.build(java.lang.String,int) throws java.io.IOException`
pub fn method_display(method: &PublicMethod) -> String {
    let info = &method.method;
    let mut out = String::new();

    for (flag, keyword) in METHOD_MODIFIERS {
        if info.access_flags & flag != 0 {
            out.push_str(keyword);
            out.push(' ');
        }
    }
    if method.declared_in_interface && !info.is_abstract() && !info.is_static() {
        out.push_str("default ");
    }

    match method_type_names(&info.descriptor) {
        Ok((params, ret)) => {
            out.push_str(&format!(
                "{ret} {}.{}({})",
                method.declaring_class,
                info.name,
                params.join(",")
            ));
        }
        // Unparseable descriptors keep their raw form.
        Err(_) => {
            out.push_str(&format!(
                "{}.{}{}",
                method.declaring_class, info.name, info.descriptor
            ));
        }
    }

    if !info.exceptions.is_empty() {
        out.push_str(" throws ");
        out.push_str(&info.exceptions.join(","));
    }
    out
}

/// `[@a.B(), @c.D(x=1)]`
pub fn annotation_list(annotations: &[Annotation]) -> String {
    let rendered: Vec<String> = annotations.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
