//! Translation of deprecated call shapes into current ones.
//!
//! Every deprecated-but-functional path funnels through [`deprecated`], which
//! emits a `tracing` event with target `cim_obj::deprecation`. Subscribers can
//! filter on that target to turn deprecations into errors or silence them.

use std::panic::Location;

use tracing::warn;

use crate::config::Config;
use crate::error::{CimError, Result};

/// Deprecated API items that still work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deprecated {
    /// Ordering comparisons between [`NocaseDict`](crate::NocaseDict) values.
    NocaseDictOrdering,
    /// The `property_list` filter of [`CimInstance`](crate::CimInstance).
    PropertyList,
    /// The `methodname` alias for the name of a [`CimMethod`](crate::CimMethod).
    MethodName,
    /// A non-default `indent` for instance MOF generation.
    MofIndent,
}

impl Deprecated {
    /// Stable identifier carried in the `item` field of the event.
    pub const fn item(self) -> &'static str {
        match self {
            Deprecated::NocaseDictOrdering => "NocaseDict.ordering",
            Deprecated::PropertyList => "CIMInstance.property_list",
            Deprecated::MethodName => "CIMMethod.methodname",
            Deprecated::MofIndent => "CIMInstance.tomof.indent",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Deprecated::NocaseDictOrdering => {
                "ordering comparisons of NocaseDict objects are deprecated"
            }
            Deprecated::PropertyList => "the property_list attribute of CIMInstance is deprecated",
            Deprecated::MethodName => "the methodname argument of CIMMethod is deprecated; use name",
            Deprecated::MofIndent => "the indent argument of CIMInstance MOF generation is deprecated",
        }
    }
}

/// Emit a deprecation event for `item`.
#[track_caller]
pub fn deprecated(item: Deprecated, config: &Config) {
    if config.debug_origin {
        let origin = Location::caller();
        warn!(
            target: "cim_obj::deprecation",
            item = item.item(),
            origin = %origin,
            "{}",
            item.message()
        );
    } else {
        warn!(target: "cim_obj::deprecation", item = item.item(), "{}", item.message());
    }
}

/// Resolve a method name given as `name` or through the deprecated
/// `methodname` alias.
#[track_caller]
pub fn method_name(
    name: Option<String>,
    methodname: Option<String>,
    config: &Config,
) -> Result<String> {
    match (name, methodname) {
        (Some(name), None) => Ok(name),
        (None, Some(alias)) => {
            deprecated(Deprecated::MethodName, config);
            Ok(alias)
        }
        (Some(name), Some(alias)) => Err(CimError::value(format!(
            "method name specified twice: name={name:?}, methodname={alias:?}"
        ))),
        (None, None) => Err(CimError::value("method name must not be None")),
    }
}
