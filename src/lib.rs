#![cfg_attr(docsrs, feature(doc_cfg))]
//! WBEM client object model facade that re-exports the workspace crates and
//! provides convenience wrappers.
//!
//! ```rust
//! use wbem_rs::obj::{CimInstanceName, UriFormat};
//! use wbem_rs::xml::to_cimxml_string;
//!
//! let path = CimInstanceName::from_wbem_uri("//server/root/cimv2:CIM_Foo.Id=\"a\"")?;
//! assert_eq!(path.to_wbem_uri(UriFormat::CimObject), "root/cimv2:CIM_Foo.Id=\"a\"");
//! let xml = to_cimxml_string(&path, None)?;
//! assert!(xml.starts_with("<INSTANCEPATH>"));
//! # Ok::<(), wbem_rs::WbemError>(())
//! ```
//!
//! ```rust
//! use wbem_rs::mof::ToMof;
//! use wbem_rs::obj::{CimClass, CimProperty, CimQualifier, CimType};
//!
//! let class = CimClass::builder("CIM_Foo")
//!     .property(
//!         CimProperty::builder("Id")
//!             .cim_type(CimType::String)
//!             .qualifier(CimQualifier::new("Key", true)?)
//!             .build()?,
//!     )
//!     .build()?;
//! assert!(class.to_mof().starts_with("class CIM_Foo {"));
//! # Ok::<(), wbem_rs::WbemError>(())
//! ```

pub use cim_mof as mof;
pub use cim_obj as obj;
pub use cim_xml as xml;
pub use valuemapping;

use cim_obj::{CimClassName, CimError, CimInstanceName};
use cim_xml::{ToCimXml, XmlError};
use thiserror::Error;
use tracing::debug;
use valuemapping::ValueMappingError;

/// Error type spanning the member crates.
#[derive(Debug, Error)]
pub enum WbemError {
    #[error(transparent)]
    Cim(#[from] CimError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    ValueMapping(#[from] ValueMappingError),
}

/// Commonly used types of the object model and codec traits.
pub mod prelude {
    pub use cim_mof::ToMof;
    pub use cim_obj::{
        CimClass, CimClassName, CimDateTime, CimInstance, CimInstanceName, CimMethod, CimParameter,
        CimProperty, CimQualifier, CimQualifierDeclaration, CimType, CimValue, Config, UriFormat,
    };
    pub use cim_xml::ToCimXml;
    pub use valuemapping::{ClassProvider, ValueMapping};
}

/// Parse a WBEM URI and render the path it names as CIM-XML.
///
/// URIs with keybindings are read as instance paths, all others as class
/// paths.
pub fn uri_to_cimxml(uri: &str, indent: Option<usize>) -> Result<String, WbemError> {
    let element = match CimInstanceName::from_wbem_uri(uri) {
        Ok(path) if !path.keybindings().is_empty() => path.to_cimxml(),
        _ => CimClassName::from_wbem_uri(uri)?.to_cimxml(),
    };
    debug!(uri, element = element.name(), "rendered WBEM URI as CIM-XML");
    Ok(element.to_xml_string(indent)?)
}
