use std::hash::{Hash, Hasher};

use crate::config::Config;
use crate::error::{CimError, Result};
use crate::nocase::{hash_name, name_eq, Named};
use crate::types::CimType;
use crate::value::{cimtype, cimvalue_with, CimValue};

/// A qualifier value attached to a class, property, method or parameter.
///
/// Flavor flags are `None` when not known.
#[derive(Debug, Clone)]
pub struct CimQualifier {
    name: String,
    value: Option<CimValue>,
    cim_type: CimType,
    propagated: Option<bool>,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
}

impl CimQualifier {
    /// Qualifier with an inferred type.
    pub fn new(name: impl Into<String>, value: impl Into<CimValue>) -> Result<Self> {
        CimQualifier::builder(name).value(value).build()
    }

    pub fn builder(name: impl Into<String>) -> CimQualifierBuilder {
        CimQualifierBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&CimValue> {
        self.value.as_ref()
    }

    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
    }

    pub fn overridable(&self) -> Option<bool> {
        self.overridable
    }

    pub fn tosubclass(&self) -> Option<bool> {
        self.tosubclass
    }

    pub fn toinstance(&self) -> Option<bool> {
        self.toinstance
    }

    pub fn translatable(&self) -> Option<bool> {
        self.translatable
    }

    /// Values of an array-valued qualifier as strings, NULL elements skipped.
    ///
    /// Returns `None` when the value is NULL, scalar or not string-typed.
    pub fn string_array(&self) -> Option<Vec<&str>> {
        let items = self.value.as_ref()?.as_array()?;
        items
            .iter()
            .flatten()
            .map(CimValue::as_str)
            .collect::<Option<Vec<_>>>()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the value, converting it to the qualifier type.
    pub fn set_value(&mut self, value: Option<CimValue>) -> Result<()> {
        self.value = qualifier_value(&self.name, value, self.cim_type, &Config::default())?;
        Ok(())
    }

    pub fn set_propagated(&mut self, propagated: Option<bool>) {
        self.propagated = propagated;
    }

    pub fn set_overridable(&mut self, overridable: Option<bool>) {
        self.overridable = overridable;
    }

    pub fn set_tosubclass(&mut self, tosubclass: Option<bool>) {
        self.tosubclass = tosubclass;
    }

    pub fn set_toinstance(&mut self, toinstance: Option<bool>) {
        self.toinstance = toinstance;
    }

    pub fn set_translatable(&mut self, translatable: Option<bool>) {
        self.translatable = translatable;
    }
}

pub(crate) fn qualifier_value(
    name: &str,
    value: Option<CimValue>,
    cim_type: CimType,
    config: &Config,
) -> Result<Option<CimValue>> {
    let value = cimvalue_with(value, cim_type, config)?;
    let embedded = match &value {
        Some(CimValue::Array(items)) => items
            .iter()
            .flatten()
            .any(|v| matches!(v, CimValue::Instance(_) | CimValue::Class(_))),
        Some(v) => matches!(v, CimValue::Instance(_) | CimValue::Class(_)),
        None => false,
    };
    if embedded {
        return Err(CimError::type_mismatch(format!(
            "qualifier {name:?} cannot hold embedded objects"
        )));
    }
    Ok(value)
}

impl Named for CimQualifier {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CimQualifier {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.name, &other.name)
            && self.cim_type == other.cim_type
            && self.value == other.value
            && self.propagated == other.propagated
            && self.overridable == other.overridable
            && self.tosubclass == other.tosubclass
            && self.toinstance == other.toinstance
            && self.translatable == other.translatable
    }
}

impl Eq for CimQualifier {}

impl Hash for CimQualifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.name, state);
        self.cim_type.hash(state);
        self.value.hash(state);
        self.propagated.hash(state);
        self.overridable.hash(state);
        self.tosubclass.hash(state);
        self.toinstance.hash(state);
        self.translatable.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct CimQualifierBuilder {
    name: String,
    value: Option<CimValue>,
    cim_type: Option<CimType>,
    propagated: Option<bool>,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
    config: Config,
}

impl CimQualifierBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CimQualifierBuilder {
            name: name.into(),
            value: None,
            cim_type: None,
            propagated: None,
            overridable: None,
            tosubclass: None,
            toinstance: None,
            translatable: None,
            config: Config::default(),
        }
    }

    pub fn value(mut self, value: impl Into<CimValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn value_opt(mut self, value: Option<CimValue>) -> Self {
        self.value = value;
        self
    }

    pub fn cim_type(mut self, cim_type: CimType) -> Self {
        self.cim_type = Some(cim_type);
        self
    }

    pub fn propagated(mut self, propagated: bool) -> Self {
        self.propagated = Some(propagated);
        self
    }

    pub fn overridable(mut self, overridable: bool) -> Self {
        self.overridable = Some(overridable);
        self
    }

    pub fn tosubclass(mut self, tosubclass: bool) -> Self {
        self.tosubclass = Some(tosubclass);
        self
    }

    pub fn toinstance(mut self, toinstance: bool) -> Self {
        self.toinstance = Some(toinstance);
        self
    }

    pub fn translatable(mut self, translatable: bool) -> Self {
        self.translatable = Some(translatable);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CimQualifier> {
        let cim_type = match (self.cim_type, &self.value) {
            (Some(ty), _) => ty,
            (None, Some(v)) => cimtype(v)?,
            (None, None) => {
                return Err(CimError::value(format!(
                    "qualifier {:?} has neither a type nor a value to infer one from",
                    self.name
                )));
            }
        };
        let value = qualifier_value(&self.name, self.value, cim_type, &self.config)?;
        Ok(CimQualifier {
            name: self.name,
            value,
            cim_type,
            propagated: self.propagated,
            overridable: self.overridable,
            tosubclass: self.tosubclass,
            toinstance: self.toinstance,
            translatable: self.translatable,
        })
    }
}
