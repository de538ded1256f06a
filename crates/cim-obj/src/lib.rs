//! CIM object model for WBEM clients.
//!
//! Typed CIM values ([`CimValue`], [`CimDateTime`], sized integers and
//! reals), the case-insensitive ordered map used for every named collection
//! ([`NocaseDict`]), and the CIM entities: instance and class paths,
//! instances, classes, properties, methods, parameters, qualifiers and
//! qualifier declarations. Paths convert to and from WBEM URIs.
//!
//! Behaviour that older clients relied on is controlled by [`Config`];
//! deprecated usage is reported as `tracing` warnings with target
//! `cim_obj::deprecation`.

pub mod compat;
pub mod config;
pub mod error;
pub mod nocase;

mod class;
mod classname;
mod datetime;
mod instance;
mod instancename;
mod method;
mod parameter;
mod property;
mod qualdecl;
mod qualifier;
mod types;
mod uri;
mod value;

pub use class::{CimClass, CimClassBuilder};
pub use classname::CimClassName;
pub use compat::Deprecated;
pub use config::Config;
pub use datetime::CimDateTime;
pub use error::{CimError, Result};
pub use instance::{CimInstance, CimInstanceBuilder, FromClassOptions, PropertyValues};
pub use instancename::{keybinding_value, CimInstanceName, CimInstanceNameBuilder, KeyBindings};
pub use method::{CimMethod, CimMethodBuilder, Methods};
pub use nocase::{Named, NocaseDict};
pub use parameter::{CimParameter, CimParameterBuilder, Parameters};
pub use property::{CimProperty, CimPropertyBuilder, Properties, Qualifiers};
pub use qualdecl::{CimQualifierDeclaration, CimQualifierDeclarationBuilder, Scopes, SCOPE_NAMES};
pub use qualifier::{CimQualifier, CimQualifierBuilder};
pub use types::{repr_real, CimInt, CimReal, CimType, EmbeddedObject, IntKind, RealKind};
pub use uri::UriFormat;
pub use value::{cimtype, cimvalue, cimvalue_with, CimValue};
