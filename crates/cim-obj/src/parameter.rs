use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::nocase::{hash_name, hash_opt_name, name_eq, opt_name_eq, Named, NocaseDict};
use crate::property::{check_array_size, check_reference_class, resolve_shape, Qualifiers};
use crate::qualifier::CimQualifier;
use crate::types::{CimType, EmbeddedObject};
use crate::value::CimValue;

/// Parameters of a method, keyed by parameter name.
pub type Parameters = NocaseDict<Arc<CimParameter>>;

/// A method parameter declaration, or an argument value of a method
/// invocation.
///
/// Unlike properties, parameters may be reference arrays. `value` is only
/// meaningful for invocation arguments.
#[derive(Debug, Clone)]
pub struct CimParameter {
    name: String,
    cim_type: CimType,
    reference_class: Option<String>,
    is_array: bool,
    array_size: Option<u32>,
    qualifiers: Qualifiers,
    value: Option<CimValue>,
    embedded_object: Option<EmbeddedObject>,
}

impl CimParameter {
    pub fn new(name: impl Into<String>, cim_type: CimType) -> Self {
        CimParameter {
            name: name.into(),
            cim_type,
            reference_class: None,
            is_array: false,
            array_size: None,
            qualifiers: Qualifiers::new(),
            value: None,
            embedded_object: None,
        }
    }

    pub fn builder(name: impl Into<String>, cim_type: CimType) -> CimParameterBuilder {
        CimParameterBuilder::new(name, cim_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    pub fn qualifiers_mut(&mut self) -> &mut Qualifiers {
        &mut self.qualifiers
    }

    pub fn qualifier(&self, name: &str) -> Option<&CimQualifier> {
        self.qualifiers.get(name).map(Arc::as_ref)
    }

    pub fn value(&self) -> Option<&CimValue> {
        self.value.as_ref()
    }

    pub fn embedded_object(&self) -> Option<EmbeddedObject> {
        self.embedded_object
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the argument value, converting it to the parameter type.
    pub fn set_value(&mut self, value: Option<CimValue>) -> Result<()> {
        let shape = resolve_shape(
            "parameter",
            &self.name,
            value,
            Some(self.cim_type),
            Some(self.is_array),
            self.embedded_object,
            &Config::default(),
        )?;
        self.value = shape.value;
        self.embedded_object = shape.embedded_object;
        Ok(())
    }

    pub fn add_qualifier(&mut self, qualifier: CimQualifier) {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
    }
}

impl Named for CimParameter {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CimParameter {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.name, &other.name)
            && self.cim_type == other.cim_type
            && opt_name_eq(self.reference_class(), other.reference_class())
            && self.is_array == other.is_array
            && self.array_size == other.array_size
            && self.qualifiers == other.qualifiers
            && self.value == other.value
            && self.embedded_object == other.embedded_object
    }
}

impl Eq for CimParameter {}

impl Hash for CimParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.name, state);
        self.cim_type.hash(state);
        hash_opt_name(self.reference_class(), state);
        self.is_array.hash(state);
        self.array_size.hash(state);
        self.qualifiers.hash(state);
        self.value.hash(state);
        self.embedded_object.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct CimParameterBuilder {
    name: String,
    cim_type: CimType,
    reference_class: Option<String>,
    is_array: Option<bool>,
    array_size: Option<u32>,
    qualifiers: Qualifiers,
    value: Option<CimValue>,
    embedded_object: Option<EmbeddedObject>,
    config: Config,
}

impl CimParameterBuilder {
    pub fn new(name: impl Into<String>, cim_type: CimType) -> Self {
        CimParameterBuilder {
            name: name.into(),
            cim_type,
            reference_class: None,
            is_array: None,
            array_size: None,
            qualifiers: Qualifiers::new(),
            value: None,
            embedded_object: None,
            config: Config::default(),
        }
    }

    pub fn reference_class(mut self, reference_class: impl Into<String>) -> Self {
        self.reference_class = Some(reference_class.into());
        self
    }

    pub fn is_array(mut self, is_array: bool) -> Self {
        self.is_array = Some(is_array);
        self
    }

    pub fn array_size(mut self, array_size: u32) -> Self {
        self.array_size = Some(array_size);
        self
    }

    pub fn qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
        self
    }

    pub fn value(mut self, value: impl Into<CimValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn embedded_object(mut self, kind: EmbeddedObject) -> Self {
        self.embedded_object = Some(kind);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CimParameter> {
        let shape = resolve_shape(
            "parameter",
            &self.name,
            self.value,
            Some(self.cim_type),
            self.is_array,
            self.embedded_object,
            &self.config,
        )?;
        check_reference_class(
            "parameter",
            &self.name,
            shape.cim_type,
            self.reference_class.as_deref(),
        )?;
        check_array_size("parameter", &self.name, shape.is_array, self.array_size)?;
        Ok(CimParameter {
            name: self.name,
            cim_type: shape.cim_type,
            reference_class: self.reference_class,
            is_array: shape.is_array,
            array_size: self.array_size,
            qualifiers: self.qualifiers,
            value: shape.value,
            embedded_object: shape.embedded_object,
        })
    }
}
