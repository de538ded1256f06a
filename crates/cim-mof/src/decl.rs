//! MOF declarations of qualifiers, properties, methods, parameters,
//! classes, instances and qualifier declarations.

use cim_obj::compat::{self, Deprecated};
use cim_obj::{
    CimClass, CimInstance, CimMethod, CimParameter, CimProperty, CimQualifier,
    CimQualifierDeclaration, CimType, CimValue, Config, Qualifiers, SCOPE_NAMES,
};
use tracing::debug;

use crate::string::indent_str;
use crate::value::value_tomof;
use crate::MOF_INDENT;

/// Type keyword of a declaration; references become `<class> REF`.
fn moftype(cim_type: CimType, reference_class: Option<&str>) -> String {
    match (cim_type, reference_class) {
        (CimType::Reference, Some(class)) => format!("{class} REF"),
        (CimType::Reference, None) => "REF".to_string(),
        (ty, _) => ty.name().to_string(),
    }
}

fn array_suffix(is_array: bool, array_size: Option<u32>) -> String {
    match (is_array, array_size) {
        (false, _) => String::new(),
        (true, None) => "[]".to_string(),
        (true, Some(n)) => format!("[{n}]"),
    }
}

/// `Name ( value )` or `Name { ... }` for array values.
///
/// Continuation lines are indented by `indent`. Returns the text and the
/// column after it.
pub fn qualifier_tomof(
    qualifier: &CimQualifier,
    indent: usize,
    maxline: usize,
    line_pos: usize,
    end_space: usize,
) -> (String, usize) {
    let mut out = qualifier.name().to_string();
    let mut pos = line_pos + out.chars().count();
    match qualifier.value() {
        Some(array @ CimValue::Array(_)) => {
            out.push(' ');
            let (text, new_pos) = value_tomof(Some(array), indent, maxline, pos + 1, end_space, false);
            out.push_str(&text);
            pos = new_pos;
        }
        scalar => {
            out.push_str(" (");
            pos += 2;
            let (text, new_pos) = value_tomof(scalar, indent, maxline, pos + 1, end_space + 2, false);
            if !text.starts_with('\n') {
                out.push(' ');
            }
            out.push_str(&text);
            out.push_str(" )");
            pos = new_pos + 2;
        }
    }
    (out, pos)
}

/// Bracketed qualifier list starting at column `indent`, one qualifier per
/// line, followed by a newline. Empty for no qualifiers.
pub fn qualifiers_tomof(qualifiers: &Qualifiers, indent: usize, maxline: usize) -> String {
    if qualifiers.is_empty() {
        return String::new();
    }
    let mut out = format!("{}[", indent_str(indent));
    let mut pos = indent + 1;
    for (i, qualifier) in qualifiers.values().enumerate() {
        if i > 0 {
            out.push_str(",\n");
            out.push_str(&indent_str(indent + 1));
            pos = indent + 1;
        }
        let (text, new_pos) = qualifier_tomof(qualifier, indent + 1 + MOF_INDENT, maxline, pos, 1);
        out.push_str(&text);
        pos = new_pos;
    }
    out.push_str("]\n");
    out
}

/// Property declaration of a class (`is_instance == false`) or property
/// value of an instance, starting at column `indent` and ending with `;`
/// and a newline.
pub fn property_tomof(prop: &CimProperty, is_instance: bool, indent: usize, maxline: usize) -> String {
    let mut out = String::new();
    if !is_instance {
        out.push_str(&qualifiers_tomof(prop.qualifiers(), indent + MOF_INDENT, maxline));
    }
    out.push_str(&indent_str(indent));
    if !is_instance {
        out.push_str(&moftype(prop.cim_type(), prop.reference_class()));
        out.push(' ');
    }
    out.push_str(prop.name());
    if !is_instance {
        out.push_str(&array_suffix(prop.is_array(), prop.array_size()));
    }
    if prop.value().is_some() || is_instance {
        out.push_str(" = ");
        let line_pos = out.rsplit('\n').next().map_or(0, |l| l.chars().count());
        let (text, _) = value_tomof(prop.value(), indent + MOF_INDENT, maxline, line_pos, 1, false);
        out.push_str(&text);
    }
    out.push_str(";\n");
    out
}

/// Parameter declaration without trailing separator.
pub fn parameter_tomof(param: &CimParameter, indent: usize, maxline: usize) -> String {
    let mut out = qualifiers_tomof(param.qualifiers(), indent + MOF_INDENT, maxline);
    out.push_str(&indent_str(indent));
    out.push_str(&moftype(param.cim_type(), param.reference_class()));
    out.push(' ');
    out.push_str(param.name());
    out.push_str(&array_suffix(param.is_array(), param.array_size()));
    out
}

pub fn method_tomof(method: &CimMethod, indent: usize, maxline: usize) -> String {
    let mut out = qualifiers_tomof(method.qualifiers(), indent + MOF_INDENT, maxline);
    out.push_str(&indent_str(indent));
    out.push_str(&moftype(method.return_type(), None));
    out.push(' ');
    out.push_str(method.name());
    if method.parameters().is_empty() {
        out.push_str("();\n");
        return out;
    }
    let params: Vec<String> = method
        .parameters()
        .values()
        .map(|p| parameter_tomof(p, indent + MOF_INDENT, maxline))
        .collect();
    out.push_str("(\n");
    out.push_str(&params.join(",\n"));
    out.push_str(");\n");
    out
}

/// Class declaration: qualifiers, properties, then methods.
pub fn class_tomof(class: &CimClass, maxline: usize) -> String {
    let mut out = qualifiers_tomof(class.qualifiers(), 0, maxline);
    out.push_str("class ");
    out.push_str(class.classname());
    if let Some(superclass) = class.superclass() {
        out.push_str(" : ");
        out.push_str(superclass);
    }
    out.push_str(" {\n");
    for prop in class.properties().values() {
        out.push('\n');
        out.push_str(&property_tomof(prop, false, MOF_INDENT, maxline));
    }
    for method in class.methods().values() {
        out.push('\n');
        out.push_str(&method_tomof(method, MOF_INDENT, maxline));
    }
    out.push_str("\n};\n");
    debug!(classname = %class.classname(), bytes = out.len(), "class MOF generated");
    out
}

pub(crate) fn instance_tomof_at(inst: &CimInstance, maxline: usize) -> String {
    let mut out = format!("instance of {} {{\n", inst.classname());
    for prop in inst.properties().values() {
        out.push_str(&property_tomof(prop, true, MOF_INDENT, maxline));
    }
    out.push_str("};\n");
    out
}

/// Instance specification `instance of <class> { ... };`.
///
/// `indent` is deprecated and ignored; passing it emits a deprecation event.
#[track_caller]
pub fn instance_tomof(inst: &CimInstance, indent: Option<usize>, maxline: usize, config: &Config) -> String {
    if indent.is_some() {
        compat::deprecated(Deprecated::MofIndent, config);
    }
    instance_tomof_at(inst, maxline)
}

/// `Qualifier <name> : <type>[...] = <default>,` followed by the `Scope`
/// and, when any is known, the `Flavor` list.
pub fn qualifier_declaration_tomof(decl: &CimQualifierDeclaration, maxline: usize) -> String {
    let mut out = format!("Qualifier {} : {}", decl.name(), decl.cim_type().name());
    out.push_str(&array_suffix(decl.is_array(), decl.array_size()));
    if let Some(value) = decl.value() {
        out.push_str(" = ");
        let line_pos = out.chars().count();
        let (text, _) = value_tomof(Some(value), MOF_INDENT, maxline, line_pos, 1, false);
        out.push_str(&text);
    }

    let scopes: Vec<String> = if decl.scopes().get("ANY").copied().unwrap_or(false) {
        vec!["any".to_string()]
    } else {
        SCOPE_NAMES
            .iter()
            .filter(|s| decl.scopes().get(s).copied().unwrap_or(false))
            .map(|s| s.to_lowercase())
            .collect()
    };
    out.push_str(",\n");
    out.push_str(&indent_str(MOF_INDENT));
    out.push_str(&format!("Scope({})", scopes.join(", ")));

    let mut flavors = Vec::new();
    match decl.overridable() {
        Some(true) => flavors.push("EnableOverride"),
        Some(false) => flavors.push("DisableOverride"),
        None => {}
    }
    match decl.tosubclass() {
        Some(true) => flavors.push("ToSubclass"),
        Some(false) => flavors.push("Restricted"),
        None => {}
    }
    if decl.translatable() == Some(true) {
        flavors.push("Translatable");
    }
    if !flavors.is_empty() {
        out.push_str(",\n");
        out.push_str(&indent_str(MOF_INDENT));
        out.push_str(&format!("Flavor({})", flavors.join(", ")));
    }
    out.push_str(";\n");
    out
}
