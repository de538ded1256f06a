//! MOF (DSP0004) text generation for the CIM object model.
//!
//! Output is wrapped at a maximum line width ([`MAX_MOF_LINE`] by default).
//! String literals are split into several adjacent literals where needed,
//! array values are laid out element by element.

pub mod decl;
pub mod string;
pub mod value;

use cim_obj::{CimClass, CimInstance, CimQualifier, CimQualifierDeclaration, Config};

pub use decl::{
    class_tomof, instance_tomof, method_tomof, parameter_tomof, property_tomof,
    qualifier_declaration_tomof, qualifier_tomof, qualifiers_tomof,
};
pub use string::{mofstr, mofval};
pub use value::value_tomof;

/// Indentation step of nested MOF elements.
pub const MOF_INDENT: usize = 3;
/// Default maximum MOF line length.
pub const MAX_MOF_LINE: usize = 80;

/// MOF declaration of a CIM object.
pub trait ToMof {
    fn to_mof_width(&self, maxline: usize) -> String;

    fn to_mof(&self) -> String {
        self.to_mof_width(MAX_MOF_LINE)
    }
}

impl ToMof for CimClass {
    fn to_mof_width(&self, maxline: usize) -> String {
        class_tomof(self, maxline)
    }
}

impl ToMof for CimInstance {
    fn to_mof_width(&self, maxline: usize) -> String {
        instance_tomof(self, None, maxline, &Config::default())
    }
}

impl ToMof for CimQualifierDeclaration {
    fn to_mof_width(&self, maxline: usize) -> String {
        qualifier_declaration_tomof(self, maxline)
    }
}

impl ToMof for CimQualifier {
    /// The qualifier as it appears in a qualifier list, without brackets.
    fn to_mof_width(&self, maxline: usize) -> String {
        qualifier_tomof(self, MOF_INDENT, maxline, 0, 0).0
    }
}
