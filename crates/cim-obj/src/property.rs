use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{CimError, Result};
use crate::nocase::{hash_name, hash_opt_name, name_eq, opt_name_eq, Named, NocaseDict};
use crate::qualifier::CimQualifier;
use crate::types::{CimType, EmbeddedObject};
use crate::value::{cimtype, cimvalue_with, CimValue};

/// Qualifiers of an element, keyed by qualifier name.
pub type Qualifiers = NocaseDict<Arc<CimQualifier>>;
/// Properties of an instance or class, keyed by property name.
pub type Properties = NocaseDict<Arc<CimProperty>>;

/// Resolved type, shape and value of a typed element.
pub(crate) struct Shape {
    pub cim_type: CimType,
    pub is_array: bool,
    pub embedded_object: Option<EmbeddedObject>,
    pub value: Option<CimValue>,
}

/// Scalar value or first non-NULL array element.
fn first_element(value: Option<&CimValue>) -> Option<&CimValue> {
    match value? {
        CimValue::Array(items) => items.iter().flatten().next(),
        scalar => Some(scalar),
    }
}

/// Infer and cross-check type, array-ness and embedded-object kind of a
/// property or parameter, and convert its value to the resolved type.
pub(crate) fn resolve_shape(
    element: &str,
    name: &str,
    value: Option<CimValue>,
    cim_type: Option<CimType>,
    is_array: Option<bool>,
    embedded_object: Option<EmbeddedObject>,
    config: &Config,
) -> Result<Shape> {
    let value_is_array = value.as_ref().map(CimValue::is_array);
    let is_array = match (is_array, value_is_array) {
        (Some(declared), Some(actual)) if declared != actual => {
            return Err(CimError::value(format!(
                "{element} {name:?}: is_array={declared} does not match the shape of its value"
            )));
        }
        (Some(declared), _) => declared,
        (None, Some(actual)) => actual,
        (None, None) => false,
    };

    let first = first_element(value.as_ref());
    let embedded_object = embedded_object.or(match first {
        Some(CimValue::Instance(_)) => Some(EmbeddedObject::Instance),
        Some(CimValue::Class(_)) => Some(EmbeddedObject::Object),
        _ => None,
    });

    let cim_type = match (cim_type, embedded_object) {
        (Some(ty), Some(kind)) if ty != CimType::String => {
            return Err(CimError::value(format!(
                "{element} {name:?}: embedded_object={kind} requires type string, not {ty}"
            )));
        }
        (Some(ty), _) => ty,
        (None, Some(_)) => CimType::String,
        (None, None) => match first {
            Some(v) => cimtype(v)?,
            None => {
                return Err(CimError::value(format!(
                    "{element} {name:?} has neither a type nor a value to infer one from"
                )));
            }
        },
    };

    let value = cimvalue_with(value, cim_type, config)?;

    if let Some(kind) = embedded_object {
        let elements: Vec<&CimValue> = match &value {
            Some(CimValue::Array(items)) => items.iter().flatten().collect(),
            Some(scalar) => vec![scalar],
            None => Vec::new(),
        };
        for element_value in elements {
            let ok = match (kind, element_value) {
                (_, CimValue::Instance(_)) => true,
                (EmbeddedObject::Object, CimValue::Class(_)) => true,
                _ => false,
            };
            if !ok {
                return Err(CimError::value(format!(
                    "{element} {name:?}: embedded_object={kind} cannot hold a {} value",
                    element_value.kind_name()
                )));
            }
        }
    }

    Ok(Shape {
        cim_type,
        is_array,
        embedded_object,
        value,
    })
}

/// A CIM property: a named, typed value of an instance, or a property
/// declaration of a class.
///
/// Type, array-ness and embedded-object kind are inferred from the value
/// when not given and cross-checked when they are.
#[derive(Debug, Clone)]
pub struct CimProperty {
    name: String,
    value: Option<CimValue>,
    cim_type: CimType,
    is_array: bool,
    array_size: Option<u32>,
    reference_class: Option<String>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: Qualifiers,
    embedded_object: Option<EmbeddedObject>,
}

impl CimProperty {
    /// Property holding `value`, with everything else inferred.
    pub fn new(name: impl Into<String>, value: impl Into<CimValue>) -> Result<Self> {
        CimProperty::builder(name).value(value).build()
    }

    pub fn builder(name: impl Into<String>) -> CimPropertyBuilder {
        CimPropertyBuilder::new(name)
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

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    pub fn reference_class(&self) -> Option<&str> {
        self.reference_class.as_deref()
    }

    pub fn class_origin(&self) -> Option<&str> {
        self.class_origin.as_deref()
    }

    pub fn propagated(&self) -> Option<bool> {
        self.propagated
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

    pub fn embedded_object(&self) -> Option<EmbeddedObject> {
        self.embedded_object
    }

    /// Whether the property carries a `Key` qualifier with value true.
    pub fn is_key(&self) -> bool {
        self.qualifier("key")
            .and_then(|q| q.value())
            .and_then(CimValue::as_bool)
            .unwrap_or(false)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the value, converting it to the property type.
    pub fn set_value(&mut self, value: Option<CimValue>) -> Result<()> {
        self.set_value_with(value, &Config::default())
    }

    pub fn set_value_with(&mut self, value: Option<CimValue>, config: &Config) -> Result<()> {
        let shape = resolve_shape(
            "property",
            &self.name,
            value,
            Some(self.cim_type),
            Some(self.is_array),
            self.embedded_object,
            config,
        )?;
        self.value = shape.value;
        self.embedded_object = shape.embedded_object;
        Ok(())
    }

    pub fn set_reference_class(&mut self, reference_class: Option<String>) -> Result<()> {
        check_reference_class("property", &self.name, self.cim_type, reference_class.as_deref())?;
        self.reference_class = reference_class;
        Ok(())
    }

    pub fn set_array_size(&mut self, array_size: Option<u32>) -> Result<()> {
        check_array_size("property", &self.name, self.is_array, array_size)?;
        self.array_size = array_size;
        Ok(())
    }

    pub fn set_class_origin(&mut self, class_origin: Option<String>) {
        self.class_origin = class_origin;
    }

    pub fn set_propagated(&mut self, propagated: Option<bool>) {
        self.propagated = propagated;
    }

    pub fn add_qualifier(&mut self, qualifier: CimQualifier) {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
    }

    /// Copy with the value replaced, keeping the type. Array-ness follows a
    /// non-NULL value.
    pub(crate) fn with_value(&self, value: Option<CimValue>, config: &Config) -> Result<Self> {
        let Some(value) = value else {
            let mut prop = self.clone();
            prop.value = None;
            return Ok(prop);
        };
        let mut builder = CimProperty::builder(self.name.clone())
            .value(value)
            .cim_type(self.cim_type)
            .qualifiers(self.qualifiers.clone())
            .config(*config);
        if let Some(reference_class) = &self.reference_class {
            builder = builder.reference_class(reference_class.clone());
        }
        if let Some(class_origin) = &self.class_origin {
            builder = builder.class_origin(class_origin.clone());
        }
        if let Some(propagated) = self.propagated {
            builder = builder.propagated(propagated);
        }
        if let Some(kind) = self.embedded_object {
            builder = builder.embedded_object(kind);
        }
        let mut prop = builder.build()?;
        if prop.is_array {
            prop.array_size = self.array_size;
        }
        Ok(prop)
    }
}

pub(crate) fn check_reference_class(
    element: &str,
    name: &str,
    cim_type: CimType,
    reference_class: Option<&str>,
) -> Result<()> {
    if reference_class.is_some() && cim_type != CimType::Reference {
        return Err(CimError::value(format!(
            "{element} {name:?}: reference_class is only valid for reference types, not {cim_type}"
        )));
    }
    Ok(())
}

pub(crate) fn check_array_size(
    element: &str,
    name: &str,
    is_array: bool,
    array_size: Option<u32>,
) -> Result<()> {
    if array_size.is_some() && !is_array {
        return Err(CimError::value(format!(
            "{element} {name:?}: array_size is only valid for arrays"
        )));
    }
    Ok(())
}

impl Named for CimProperty {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CimProperty {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.name, &other.name)
            && self.value == other.value
            && self.cim_type == other.cim_type
            && opt_name_eq(self.reference_class(), other.reference_class())
            && self.embedded_object == other.embedded_object
            && self.is_array == other.is_array
            && self.array_size == other.array_size
            && self.propagated == other.propagated
            && opt_name_eq(self.class_origin(), other.class_origin())
            && self.qualifiers == other.qualifiers
    }
}

impl Eq for CimProperty {}

impl Hash for CimProperty {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.name, state);
        self.value.hash(state);
        self.cim_type.hash(state);
        hash_opt_name(self.reference_class(), state);
        self.embedded_object.hash(state);
        self.is_array.hash(state);
        self.array_size.hash(state);
        self.propagated.hash(state);
        hash_opt_name(self.class_origin(), state);
        self.qualifiers.hash(state);
    }
}

/// Builder for [`CimProperty`]; `build` infers and validates.
#[derive(Debug, Clone)]
pub struct CimPropertyBuilder {
    name: String,
    value: Option<CimValue>,
    cim_type: Option<CimType>,
    is_array: Option<bool>,
    array_size: Option<u32>,
    reference_class: Option<String>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: Qualifiers,
    embedded_object: Option<EmbeddedObject>,
    config: Config,
}

impl CimPropertyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CimPropertyBuilder {
            name: name.into(),
            value: None,
            cim_type: None,
            is_array: None,
            array_size: None,
            reference_class: None,
            class_origin: None,
            propagated: None,
            qualifiers: Qualifiers::new(),
            embedded_object: None,
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

    pub fn is_array(mut self, is_array: bool) -> Self {
        self.is_array = Some(is_array);
        self
    }

    pub fn array_size(mut self, array_size: u32) -> Self {
        self.array_size = Some(array_size);
        self
    }

    pub fn reference_class(mut self, reference_class: impl Into<String>) -> Self {
        self.reference_class = Some(reference_class.into());
        self
    }

    pub fn class_origin(mut self, class_origin: impl Into<String>) -> Self {
        self.class_origin = Some(class_origin.into());
        self
    }

    pub fn propagated(mut self, propagated: bool) -> Self {
        self.propagated = Some(propagated);
        self
    }

    pub fn qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
        self
    }

    pub fn qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
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

    pub fn build(self) -> Result<CimProperty> {
        let shape = resolve_shape(
            "property",
            &self.name,
            self.value,
            self.cim_type,
            self.is_array,
            self.embedded_object,
            &self.config,
        )?;
        if shape.cim_type == CimType::Reference && shape.is_array {
            return Err(CimError::value(format!(
                "property {:?}: reference properties cannot be arrays",
                self.name
            )));
        }
        check_reference_class(
            "property",
            &self.name,
            shape.cim_type,
            self.reference_class.as_deref(),
        )?;
        check_array_size("property", &self.name, shape.is_array, self.array_size)?;
        Ok(CimProperty {
            name: self.name,
            value: shape.value,
            cim_type: shape.cim_type,
            is_array: shape.is_array,
            array_size: self.array_size,
            reference_class: self.reference_class,
            class_origin: self.class_origin,
            propagated: self.propagated,
            qualifiers: self.qualifiers,
            embedded_object: shape.embedded_object,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::instance::CimInstance;
    use crate::instancename::CimInstanceName;
    use crate::types::CimInt;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn infers_type_and_shape() {
        let p = CimProperty::new("Count", 7u16).unwrap();
        assert_eq!(p.cim_type(), CimType::Uint16);
        assert!(!p.is_array());

        let arr = CimProperty::new("Names", vec!["a", "b"]).unwrap();
        assert_eq!(arr.cim_type(), CimType::String);
        assert!(arr.is_array());

        let leading_null = CimProperty::builder("Ids")
            .value(CimValue::Array(vec![None, Some(5u8.into())]))
            .build()
            .unwrap();
        assert_eq!(leading_null.cim_type(), CimType::Uint8);
    }

    #[test]
    fn null_without_type_fails() {
        assert!(matches!(
            CimProperty::builder("P").build(),
            Err(CimError::Value(_))
        ));
        let typed = CimProperty::builder("P")
            .cim_type(CimType::Sint32)
            .build()
            .unwrap();
        assert_eq!(typed.value(), None);
        assert!(!typed.is_array());
    }

    #[test]
    fn untyped_integer_needs_declared_type() {
        let untyped = CimValue::Int(CimInt::untyped(5));
        assert!(matches!(
            CimProperty::builder("P").value(untyped.clone()).build(),
            Err(CimError::Type(_))
        ));
        let p = CimProperty::builder("P")
            .value(untyped)
            .cim_type(CimType::Uint64)
            .build()
            .unwrap();
        assert_eq!(p.value().and_then(CimValue::as_int), Some(5));
    }

    #[test]
    fn shape_conflicts_fail() {
        assert!(matches!(
            CimProperty::builder("P").value(vec![1u8]).is_array(false).build(),
            Err(CimError::Value(_))
        ));
        assert!(matches!(
            CimProperty::builder("P").value(1u8).is_array(true).build(),
            Err(CimError::Value(_))
        ));
        assert!(matches!(
            CimProperty::builder("P").value(1u8).array_size(4).build(),
            Err(CimError::Value(_))
        ));
        assert!(matches!(
            CimProperty::builder("P")
                .value(1u8)
                .reference_class("CIM_Foo")
                .build(),
            Err(CimError::Value(_))
        ));
        let path = CimInstanceName::new("CIM_Foo");
        assert!(matches!(
            CimProperty::builder("P")
                .value(vec![path])
                .build(),
            Err(CimError::Value(_))
        ));
    }

    #[test]
    fn embedded_objects() {
        let p = CimProperty::new("Embedded", CimInstance::new("CIM_Foo")).unwrap();
        assert_eq!(p.cim_type(), CimType::String);
        assert_eq!(p.embedded_object(), Some(EmbeddedObject::Instance));

        assert!(matches!(
            CimProperty::builder("E")
                .value(CimInstance::new("CIM_Foo"))
                .cim_type(CimType::Uint8)
                .build(),
            Err(CimError::Value(_))
        ));
        assert!(matches!(
            CimProperty::builder("E")
                .value("text")
                .embedded_object(EmbeddedObject::Instance)
                .build(),
            Err(CimError::Value(_))
        ));
    }

    #[test]
    fn set_value_revalidates() {
        let mut p = CimProperty::new("Count", 7u8).unwrap();
        assert!(matches!(
            p.set_value(Some(300u16.into())),
            Err(CimError::Range { .. })
        ));
        assert!(p.set_value(Some(vec![1u8].into())).is_err());
        p.set_value(Some("9".into())).unwrap();
        assert_eq!(p.value(), Some(&CimValue::from(9u8)));
    }

    #[test]
    fn equality_hash_consistency() {
        let a = CimProperty::new("Name", "x").unwrap();
        let mut b = CimProperty::new("NAME", "x").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        b.set_class_origin(Some("CIM_Foo".into()));
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn key_qualifier_detection() {
        let p = CimProperty::builder("Id")
            .value(1u32)
            .qualifier(CimQualifier::new("KEY", true).unwrap())
            .build()
            .unwrap();
        assert!(p.is_key());
        assert!(!CimProperty::new("Id", 1u32).unwrap().is_key());
    }
}
