use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::classname::CimClassName;
use crate::error::{CimError, Result};
use crate::method::{CimMethod, Methods};
use crate::nocase::{hash_name, hash_opt_name, name_eq, opt_name_eq, Named, NocaseDict};
use crate::property::{CimProperty, Properties, Qualifiers};
use crate::qualifier::CimQualifier;

/// A CIM class declaration.
///
/// Cloning copies the property, method and qualifier maps and the path; the
/// objects inside the maps are shared until one side modifies them.
#[derive(Debug, Clone)]
pub struct CimClass {
    classname: String,
    superclass: Option<String>,
    properties: Properties,
    methods: Methods,
    qualifiers: Qualifiers,
    path: Option<CimClassName>,
}

fn check_keys<V: Named>(what: &str, class: &str, map: &NocaseDict<V>) -> Result<()> {
    for (key, item) in map.iter() {
        if !name_eq(key, item.name()) {
            return Err(CimError::value(format!(
                "class {class:?}: {what} key {key:?} does not match {what} name {:?}",
                item.name()
            )));
        }
    }
    Ok(())
}

impl CimClass {
    pub fn new(classname: impl Into<String>) -> Self {
        CimClass {
            classname: classname.into(),
            superclass: None,
            properties: Properties::new(),
            methods: Methods::new(),
            qualifiers: Qualifiers::new(),
            path: None,
        }
    }

    pub fn builder(classname: impl Into<String>) -> CimClassBuilder {
        CimClassBuilder::new(classname)
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&CimProperty> {
        self.properties.get(name).map(Arc::as_ref)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut CimProperty> {
        self.properties.get_mut(name).map(Arc::make_mut)
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&CimMethod> {
        self.methods.get(name).map(Arc::as_ref)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut CimMethod> {
        self.methods.get_mut(name).map(Arc::make_mut)
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

    pub fn path(&self) -> Option<&CimClassName> {
        self.path.as_ref()
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    pub fn set_superclass(&mut self, superclass: Option<String>) {
        self.superclass = superclass;
    }

    pub fn set_path(&mut self, path: Option<CimClassName>) {
        self.path = path;
    }

    pub fn add_property(&mut self, prop: CimProperty) {
        self.properties
            .insert(prop.name().to_string(), Arc::new(prop));
    }

    pub fn add_method(&mut self, method: CimMethod) {
        self.methods
            .insert(method.name().to_string(), Arc::new(method));
    }

    pub fn add_qualifier(&mut self, qualifier: CimQualifier) {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Arc<CimProperty>> {
        self.properties.remove(name)
    }

    pub fn remove_method(&mut self, name: &str) -> Option<Arc<CimMethod>> {
        self.methods.remove(name)
    }

    /// Replace all properties. Keys must equal the property names.
    pub fn set_properties(&mut self, properties: Properties) -> Result<()> {
        check_keys("property", &self.classname, &properties)?;
        self.properties = properties;
        Ok(())
    }

    /// Replace all methods. Keys must equal the method names.
    pub fn set_methods(&mut self, methods: Methods) -> Result<()> {
        check_keys("method", &self.classname, &methods)?;
        self.methods = methods;
        Ok(())
    }

    /// Names of the properties qualified `Key(true)`, in declaration order.
    pub fn key_properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties
            .values()
            .filter(|p| p.is_key())
            .map(|p| p.name())
    }
}

impl PartialEq for CimClass {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.classname, &other.classname)
            && opt_name_eq(self.superclass(), other.superclass())
            && self.properties == other.properties
            && self.methods == other.methods
            && self.qualifiers == other.qualifiers
            && self.path == other.path
    }
}

impl Eq for CimClass {}

impl Hash for CimClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.classname, state);
        hash_opt_name(self.superclass(), state);
        self.properties.hash(state);
        self.methods.hash(state);
        self.qualifiers.hash(state);
        self.path.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct CimClassBuilder {
    classname: String,
    superclass: Option<String>,
    properties: Properties,
    methods: Methods,
    qualifiers: Qualifiers,
    path: Option<CimClassName>,
}

impl CimClassBuilder {
    pub fn new(classname: impl Into<String>) -> Self {
        CimClassBuilder {
            classname: classname.into(),
            superclass: None,
            properties: Properties::new(),
            methods: Methods::new(),
            qualifiers: Qualifiers::new(),
            path: None,
        }
    }

    pub fn superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn property(mut self, prop: CimProperty) -> Self {
        self.properties
            .insert(prop.name().to_string(), Arc::new(prop));
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn method(mut self, method: CimMethod) -> Self {
        self.methods
            .insert(method.name().to_string(), Arc::new(method));
        self
    }

    pub fn qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
        self
    }

    pub fn path(mut self, path: CimClassName) -> Self {
        self.path = Some(path);
        self
    }

    pub fn build(self) -> Result<CimClass> {
        check_keys("property", &self.classname, &self.properties)?;
        check_keys("method", &self.classname, &self.methods)?;
        check_keys("qualifier", &self.classname, &self.qualifiers)?;
        Ok(CimClass {
            classname: self.classname,
            superclass: self.superclass,
            properties: self.properties,
            methods: self.methods,
            qualifiers: self.qualifiers,
            path: self.path,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::types::CimType;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn sample() -> CimClass {
        CimClass::builder("CIM_Foo")
            .superclass("CIM_ManagedElement")
            .qualifier(CimQualifier::new("Description", "A foo").unwrap())
            .property(
                CimProperty::builder("InstanceID")
                    .cim_type(CimType::String)
                    .qualifier(CimQualifier::new("Key", true).unwrap())
                    .build()
                    .unwrap(),
            )
            .method(
                CimMethod::builder("Reset")
                    .return_type(CimType::Uint32)
                    .build()
                    .unwrap(),
            )
            .path(CimClassName::new("CIM_Foo").with_namespace("root/cimv2"))
            .build()
            .unwrap()
    }

    #[test]
    fn lookups_ignore_case() {
        let class = sample();
        assert!(class.property("instanceid").is_some());
        assert!(class.method("RESET").is_some());
        assert_eq!(class.key_properties().collect::<Vec<_>>(), vec!["InstanceID"]);
    }

    #[test]
    fn clone_shares_leaves_but_not_maps() {
        let a = sample();
        let mut b = a.clone();
        assert!(Arc::ptr_eq(
            a.properties().get("InstanceID").unwrap(),
            b.properties().get("InstanceID").unwrap()
        ));
        b.add_property(CimProperty::new("Extra", 1u8).unwrap());
        assert_eq!(a.properties().len(), 1);
        b.property_mut("InstanceID")
            .unwrap()
            .set_class_origin(Some("CIM_Foo".into()));
        assert_eq!(a.property("InstanceID").unwrap().class_origin(), None);
    }

    #[test]
    fn equality_and_hash() {
        let a = sample();
        let mut b = sample();
        b.set_classname("cim_foo");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        b.set_superclass(None);
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn mismatched_keys_fail() {
        let mut props = Properties::new();
        props.insert("Other", Arc::new(CimProperty::new("P", 1u8).unwrap()));
        assert!(matches!(
            CimClass::builder("C").properties(props).build(),
            Err(CimError::Value(_))
        ));
    }
}
