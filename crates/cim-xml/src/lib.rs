//! CIM-XML (DSP0201) generation for the CIM object model.
//!
//! Every entity maps to one element shape picked from the fields it has
//! populated; child order is the stored order. [`ToCimXml`] gives the
//! default element of each type, the free functions in [`entity`] and
//! [`path`] expose the alternative shapes (`PARAMVALUE`, instances with
//! paths, paths without host or namespace).

use cim_obj::{
    CimClass, CimClassName, CimInstance, CimInstanceName, CimMethod, CimParameter, CimProperty,
    CimQualifier, CimQualifierDeclaration,
};
use thiserror::Error;

pub mod element;
pub mod entity;
pub mod path;
pub mod value;

pub use element::{Element, Node};

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
}

/// Conversion of a CIM object into its CIM-XML element.
pub trait ToCimXml {
    fn to_cimxml(&self) -> Element;
}

impl ToCimXml for CimClassName {
    /// `CLASSNAME`, `LOCALCLASSPATH` or `CLASSPATH`.
    fn to_cimxml(&self) -> Element {
        path::class_path_element(self, false, false)
    }
}

impl ToCimXml for CimInstanceName {
    /// `INSTANCENAME`, `LOCALINSTANCEPATH` or `INSTANCEPATH`.
    fn to_cimxml(&self) -> Element {
        path::instance_path_element(self, false, false)
    }
}

impl ToCimXml for CimInstance {
    /// `INSTANCE`, or the instance wrapped with its path when it has one.
    fn to_cimxml(&self) -> Element {
        entity::instance_with_path_element(self)
    }
}

impl ToCimXml for CimClass {
    fn to_cimxml(&self) -> Element {
        entity::class_element(self)
    }
}

impl ToCimXml for CimProperty {
    fn to_cimxml(&self) -> Element {
        entity::property_element(self)
    }
}

impl ToCimXml for CimMethod {
    fn to_cimxml(&self) -> Element {
        entity::method_element(self)
    }
}

impl ToCimXml for CimParameter {
    /// Declaration form; see [`entity::param_value_element`] for arguments.
    fn to_cimxml(&self) -> Element {
        entity::parameter_element(self)
    }
}

impl ToCimXml for CimQualifier {
    fn to_cimxml(&self) -> Element {
        entity::qualifier_element(self)
    }
}

impl ToCimXml for CimQualifierDeclaration {
    fn to_cimxml(&self) -> Element {
        entity::qualifier_declaration_element(self)
    }
}

/// CIM-XML text of `item`, optionally pretty-printed with `indent` spaces
/// per level.
pub fn to_cimxml_string<T: ToCimXml + ?Sized>(item: &T, indent: Option<usize>) -> Result<String, XmlError> {
    item.to_cimxml().to_xml_string(indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_string() {
        let cn = CimClassName::new("CIM_Foo");
        assert_eq!(
            to_cimxml_string(&cn, None).unwrap(),
            r#"<CLASSNAME NAME="CIM_Foo"/>"#
        );
    }

    #[test]
    fn instance_string_escapes_values() {
        let inst = CimInstance::builder("CIM_Foo")
            .property("Text", "a < b")
            .build()
            .unwrap();
        assert_eq!(
            to_cimxml_string(&inst, None).unwrap(),
            r#"<INSTANCE CLASSNAME="CIM_Foo"><PROPERTY NAME="Text" TYPE="string"><VALUE>a &lt; b</VALUE></PROPERTY></INSTANCE>"#
        );
    }

    #[test]
    fn pretty_printing() {
        let path = CimInstanceName::builder("CIM_Foo")
            .keybinding("Id", 1u8)
            .namespace("root")
            .host("server")
            .build()
            .unwrap();
        let text = to_cimxml_string(&path, Some(2)).unwrap();
        assert!(text.starts_with("<INSTANCEPATH>\n  <NAMESPACEPATH>"));
    }
}
