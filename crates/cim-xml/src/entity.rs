//! Elements for properties, qualifiers, methods, parameters, instances,
//! classes and qualifier declarations.

use cim_obj::{
    CimClass, CimInstance, CimMethod, CimParameter, CimProperty, CimQualifier,
    CimQualifierDeclaration, CimType, Qualifiers, SCOPE_NAMES,
};

use crate::element::Element;
use crate::path::instance_path_element;
use crate::value::value_element;

fn qualifier_elements(qualifiers: &Qualifiers) -> impl Iterator<Item = Element> + '_ {
    qualifiers.values().map(|q| qualifier_element(q))
}

/// `QUALIFIER` element. Flavor attributes appear only when known.
pub fn qualifier_element(qualifier: &CimQualifier) -> Element {
    Element::new("QUALIFIER")
        .attr("NAME", qualifier.name())
        .attr("TYPE", qualifier.cim_type().name())
        .bool_attr("PROPAGATED", qualifier.propagated())
        .bool_attr("OVERRIDABLE", qualifier.overridable())
        .bool_attr("TOSUBCLASS", qualifier.tosubclass())
        .bool_attr("TOINSTANCE", qualifier.toinstance())
        .bool_attr("TRANSLATABLE", qualifier.translatable())
        .opt_child(
            qualifier
                .value()
                .map(|v| value_element(v, qualifier.cim_type())),
        )
}

/// `PROPERTY`, `PROPERTY.ARRAY` or `PROPERTY.REFERENCE` element.
pub fn property_element(prop: &CimProperty) -> Element {
    let value = prop.value().map(|v| value_element(v, prop.cim_type()));
    let el = if prop.cim_type() == CimType::Reference {
        Element::new("PROPERTY.REFERENCE")
            .attr("NAME", prop.name())
            .opt_attr("REFERENCECLASS", prop.reference_class())
    } else if prop.is_array() {
        Element::new("PROPERTY.ARRAY")
            .attr("NAME", prop.name())
            .attr("TYPE", prop.cim_type().name())
            .opt_attr("ARRAYSIZE", prop.array_size().map(|n| n.to_string()))
    } else {
        Element::new("PROPERTY")
            .attr("NAME", prop.name())
            .attr("TYPE", prop.cim_type().name())
    };
    el.opt_attr("CLASSORIGIN", prop.class_origin())
        .bool_attr("PROPAGATED", prop.propagated())
        .opt_attr("EmbeddedObject", prop.embedded_object().map(|e| e.name()))
        .children_from(qualifier_elements(prop.qualifiers()))
        .opt_child(value)
}

/// `PARAMETER`, `PARAMETER.REFERENCE`, `PARAMETER.ARRAY` or
/// `PARAMETER.REFARRAY` element of a method declaration. The parameter
/// value is not part of a declaration.
pub fn parameter_element(param: &CimParameter) -> Element {
    let array_size = param.array_size().map(|n| n.to_string());
    let el = match (param.cim_type() == CimType::Reference, param.is_array()) {
        (true, true) => Element::new("PARAMETER.REFARRAY")
            .attr("NAME", param.name())
            .opt_attr("REFERENCECLASS", param.reference_class())
            .opt_attr("ARRAYSIZE", array_size),
        (true, false) => Element::new("PARAMETER.REFERENCE")
            .attr("NAME", param.name())
            .opt_attr("REFERENCECLASS", param.reference_class()),
        (false, true) => Element::new("PARAMETER.ARRAY")
            .attr("NAME", param.name())
            .attr("TYPE", param.cim_type().name())
            .opt_attr("ARRAYSIZE", array_size),
        (false, false) => Element::new("PARAMETER")
            .attr("NAME", param.name())
            .attr("TYPE", param.cim_type().name()),
    };
    el.children_from(qualifier_elements(param.qualifiers()))
}

/// `PARAMVALUE` element carrying a parameter as a method invocation
/// argument.
pub fn param_value_element(param: &CimParameter) -> Element {
    Element::new("PARAMVALUE")
        .attr("NAME", param.name())
        .attr("PARAMTYPE", param.cim_type().name())
        .opt_attr("EmbeddedObject", param.embedded_object().map(|e| e.name()))
        .opt_child(param.value().map(|v| value_element(v, param.cim_type())))
}

pub fn method_element(method: &CimMethod) -> Element {
    Element::new("METHOD")
        .attr("NAME", method.name())
        .attr("TYPE", method.return_type().name())
        .opt_attr("CLASSORIGIN", method.class_origin())
        .bool_attr("PROPAGATED", method.propagated())
        .children_from(qualifier_elements(method.qualifiers()))
        .children_from(method.parameters().values().map(|p| parameter_element(p)))
}

/// `INSTANCE` element, ignoring the instance path.
pub fn instance_element(inst: &CimInstance) -> Element {
    Element::new("INSTANCE")
        .attr("CLASSNAME", inst.classname())
        .children_from(qualifier_elements(inst.qualifiers()))
        .children_from(inst.properties().values().map(|p| property_element(p)))
}

/// Instance together with its path.
///
/// Without a path this is a plain `INSTANCE`. Otherwise the wrapper follows
/// the path shape: `VALUE.NAMEDINSTANCE` for a bare instance name,
/// `VALUE.OBJECTWITHLOCALPATH` with a namespace and
/// `VALUE.INSTANCEWITHPATH` with namespace and host.
pub fn instance_with_path_element(inst: &CimInstance) -> Element {
    let Some(path) = inst.path() else {
        return instance_element(inst);
    };
    let wrapper = match (path.namespace(), path.host()) {
        (None, _) => "VALUE.NAMEDINSTANCE",
        (Some(_), None) => "VALUE.OBJECTWITHLOCALPATH",
        (Some(_), Some(_)) => "VALUE.INSTANCEWITHPATH",
    };
    Element::new(wrapper)
        .child(instance_path_element(path, false, false))
        .child(instance_element(inst))
}

pub fn class_element(class: &CimClass) -> Element {
    Element::new("CLASS")
        .attr("NAME", class.classname())
        .opt_attr("SUPERCLASS", class.superclass())
        .children_from(qualifier_elements(class.qualifiers()))
        .children_from(class.properties().values().map(|p| property_element(p)))
        .children_from(class.methods().values().map(|m| method_element(m)))
}

/// `SCOPE` element of a qualifier declaration, `None` without scopes.
/// `ANY` enables every scope.
fn scope_element(decl: &CimQualifierDeclaration) -> Option<Element> {
    if decl.scopes().is_empty() {
        return None;
    }
    let any = decl.scopes().get("ANY").copied().unwrap_or(false);
    let mut el = Element::new("SCOPE");
    for scope in SCOPE_NAMES.into_iter().filter(|s| *s != "ANY") {
        let enabled = if any {
            Some(true)
        } else {
            decl.scopes().get(scope).copied()
        };
        el = el.bool_attr(scope, enabled);
    }
    Some(el)
}

pub fn qualifier_declaration_element(decl: &CimQualifierDeclaration) -> Element {
    Element::new("QUALIFIER.DECLARATION")
        .attr("NAME", decl.name())
        .attr("TYPE", decl.cim_type().name())
        .bool_attr("ISARRAY", Some(decl.is_array()))
        .opt_attr("ARRAYSIZE", decl.array_size().map(|n| n.to_string()))
        .bool_attr("OVERRIDABLE", decl.overridable())
        .bool_attr("TOSUBCLASS", decl.tosubclass())
        .bool_attr("TOINSTANCE", decl.toinstance())
        .bool_attr("TRANSLATABLE", decl.translatable())
        .opt_child(scope_element(decl))
        .opt_child(decl.value().map(|v| value_element(v, decl.cim_type())))
}
