//! Class and instance path elements.
//!
//! The element shape follows which components are present: a bare
//! `CLASSNAME`/`INSTANCENAME` without namespace, `LOCALCLASSPATH` /
//! `LOCALINSTANCEPATH` with a namespace, `CLASSPATH`/`INSTANCEPATH` with
//! namespace and host. A host without namespace is not representable and is
//! dropped.

use cim_obj::{CimClassName, CimInstanceName, CimValue};
use tracing::debug;

use crate::element::Element;
use crate::value::atomic_text;

fn local_namespace_element(namespace: &str) -> Element {
    Element::new("LOCALNAMESPACEPATH").children_from(
        namespace
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| Element::new("NAMESPACE").attr("NAME", segment)),
    )
}

fn namespace_path_element(host: &str, namespace: &str) -> Element {
    Element::new("NAMESPACEPATH")
        .child(Element::new("HOST").text(host))
        .child(local_namespace_element(namespace))
}

/// Wrap `name` according to which of namespace and host are kept.
fn wrap_path(
    name: Element,
    namespace: Option<&str>,
    host: Option<&str>,
    local: &'static str,
    full: &'static str,
) -> Element {
    match (namespace, host) {
        (None, _) => name,
        (Some(ns), None) => Element::new(local)
            .child(local_namespace_element(ns))
            .child(name),
        (Some(ns), Some(host)) => Element::new(full)
            .child(namespace_path_element(host, ns))
            .child(name),
    }
}

/// Path element of a class.
pub fn class_path_element(path: &CimClassName, ignore_host: bool, ignore_namespace: bool) -> Element {
    let namespace = path.namespace().filter(|_| !ignore_namespace);
    let host = path.host().filter(|_| !ignore_host);
    wrap_path(
        Element::new("CLASSNAME").attr("NAME", path.classname()),
        namespace,
        host,
        "LOCALCLASSPATH",
        "CLASSPATH",
    )
}

/// `KEYBINDING` element. NULL values produce an empty string `KEYVALUE`.
pub fn keybinding_element(name: &str, value: Option<&CimValue>) -> Element {
    let child = match value {
        Some(CimValue::Reference(path)) => {
            Element::new("VALUE.REFERENCE").child(instance_path_element(path, false, false))
        }
        Some(value) => {
            let value_type = match value {
                CimValue::Boolean(_) => "boolean",
                CimValue::Int(_) | CimValue::Real(_) => "numeric",
                _ => "string",
            };
            Element::new("KEYVALUE")
                .attr("VALUETYPE", value_type)
                .text(atomic_text(value).unwrap_or_else(|| value.to_string()))
        }
        None => Element::new("KEYVALUE").attr("VALUETYPE", "string"),
    };
    Element::new("KEYBINDING").attr("NAME", name).child(child)
}

/// Path element of an instance, keybindings in stored order.
pub fn instance_path_element(
    path: &CimInstanceName,
    ignore_host: bool,
    ignore_namespace: bool,
) -> Element {
    let namespace = path.namespace().filter(|_| !ignore_namespace);
    let host = path.host().filter(|_| !ignore_host);
    let name = Element::new("INSTANCENAME")
        .attr("CLASSNAME", path.classname())
        .children_from(
            path.keybindings()
                .iter()
                .map(|(name, value)| keybinding_element(name, value.as_ref())),
        );
    debug!(
        classname = %path.classname(),
        namespace = namespace.is_some(),
        host = host.is_some(),
        "instance path element"
    );
    wrap_path(name, namespace, host, "LOCALINSTANCEPATH", "INSTANCEPATH")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(el: &Element) -> Vec<&'static str> {
        el.elements().map(Element::name).collect()
    }

    #[test]
    fn class_path_shapes() {
        let bare = class_path_element(&CimClassName::new("CIM_Foo"), false, false);
        assert_eq!(bare.name(), "CLASSNAME");
        assert_eq!(bare.attribute("NAME"), Some("CIM_Foo"));

        let local = CimClassName::new("CIM_Foo").with_namespace("root/cimv2");
        let el = class_path_element(&local, false, false);
        assert_eq!(el.name(), "LOCALCLASSPATH");
        assert_eq!(names(&el), vec!["LOCALNAMESPACEPATH", "CLASSNAME"]);
        let ns = el.find("LOCALNAMESPACEPATH").unwrap();
        let segments: Vec<_> = ns.elements().filter_map(|e| e.attribute("NAME")).collect();
        assert_eq!(segments, vec!["root", "cimv2"]);

        let full = local.clone().with_host("server");
        let el = class_path_element(&full, false, false);
        assert_eq!(el.name(), "CLASSPATH");
        assert_eq!(names(&el), vec!["NAMESPACEPATH", "CLASSNAME"]);
        let nspath = el.find("NAMESPACEPATH").unwrap();
        assert_eq!(nspath.find("HOST").unwrap().text_content(), "server");

        assert_eq!(class_path_element(&full, true, false).name(), "LOCALCLASSPATH");
        assert_eq!(class_path_element(&full, false, true).name(), "CLASSNAME");
    }

    #[test]
    fn keybinding_value_types() {
        let path = CimInstanceName::builder("CIM_Foo")
            .keybinding("S", "abc")
            .keybinding("B", true)
            .keybinding("N", 42u16)
            .keybinding("R", CimInstanceName::builder("CIM_Bar").keybinding("Id", 1u8).build().unwrap())
            .build()
            .unwrap();
        let el = instance_path_element(&path, false, false);
        assert_eq!(el.name(), "INSTANCENAME");
        assert_eq!(el.attribute("CLASSNAME"), Some("CIM_Foo"));
        let kbs: Vec<_> = el.elements().collect();
        assert_eq!(kbs.len(), 4);
        let kv = |i: usize| kbs[i].find("KEYVALUE").unwrap();
        assert_eq!(kv(0).attribute("VALUETYPE"), Some("string"));
        assert_eq!(kv(0).text_content(), "abc");
        assert_eq!(kv(1).attribute("VALUETYPE"), Some("boolean"));
        assert_eq!(kv(1).text_content(), "TRUE");
        assert_eq!(kv(2).attribute("VALUETYPE"), Some("numeric"));
        assert_eq!(kv(2).text_content(), "42");
        let reference = kbs[3].find("VALUE.REFERENCE").unwrap();
        assert_eq!(names(reference), vec!["INSTANCENAME"]);
    }

    #[test]
    fn serialized_instance_path() {
        let path = CimInstanceName::builder("CIM_Foo")
            .keybinding("Id", "x")
            .namespace("root")
            .build()
            .unwrap();
        assert_eq!(
            instance_path_element(&path, false, false).to_xml_string(None).unwrap(),
            concat!(
                r#"<LOCALINSTANCEPATH><LOCALNAMESPACEPATH><NAMESPACE NAME="root"/></LOCALNAMESPACEPATH>"#,
                r#"<INSTANCENAME CLASSNAME="CIM_Foo"><KEYBINDING NAME="Id">"#,
                r#"<KEYVALUE VALUETYPE="string">x</KEYVALUE></KEYBINDING></INSTANCENAME>"#,
                r#"</LOCALINSTANCEPATH>"#
            )
        );
    }
}
