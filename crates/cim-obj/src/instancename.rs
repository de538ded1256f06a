use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::class::CimClass;
use crate::classname::strip_namespace;
use crate::config::Config;
use crate::error::{CimError, Result};
use crate::instance::CimInstance;
use crate::nocase::{cmp_opt_name, hash_name, hash_opt_name, name_eq, opt_name_eq, NocaseDict};
use crate::property::CimProperty;
use crate::uri::{self, UriFormat};
use crate::value::CimValue;

/// Keybindings of an instance path: key property name to value.
pub type KeyBindings = NocaseDict<Option<CimValue>>;

/// Validate a keybinding value.
///
/// Keybinding values are restricted to string, char16, boolean, integer,
/// real, datetime and instance path values. NULL is rejected unless
/// `config.ignore_null_key_value` is set.
pub fn keybinding_value(
    name: &str,
    value: Option<CimValue>,
    config: &Config,
) -> Result<Option<CimValue>> {
    match value {
        None if config.ignore_null_key_value => Ok(None),
        None => Err(CimError::value(format!(
            "keybinding {name:?} has a NULL value"
        ))),
        Some(
            v @ (CimValue::String(_)
            | CimValue::Char16(_)
            | CimValue::Boolean(_)
            | CimValue::Int(_)
            | CimValue::Real(_)
            | CimValue::DateTime(_)
            | CimValue::Reference(_)),
        ) => Ok(Some(v)),
        Some(other) => Err(CimError::type_mismatch(format!(
            "keybinding {name:?} cannot hold a {} value",
            other.kind_name()
        ))),
    }
}

/// Path of a CIM instance: class name, keybindings, optional namespace and
/// host.
///
/// Equality, hashing and ordering follow host, namespace, class name and
/// keybindings, comparing names without regard to case. Instance paths are
/// mutable; do not change one while it is held in a hashed collection.
#[derive(Debug, Clone)]
pub struct CimInstanceName {
    classname: String,
    keybindings: KeyBindings,
    namespace: Option<String>,
    host: Option<String>,
}

impl CimInstanceName {
    /// Instance path without keybindings, namespace or host.
    pub fn new(classname: impl Into<String>) -> Self {
        CimInstanceName {
            classname: classname.into(),
            keybindings: KeyBindings::new(),
            namespace: None,
            host: None,
        }
    }

    pub fn builder(classname: impl Into<String>) -> CimInstanceNameBuilder {
        CimInstanceNameBuilder::new(classname)
    }

    /// Set the namespace. Leading and trailing slashes are removed.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(strip_namespace(namespace));
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace.map(strip_namespace);
    }

    pub fn set_host(&mut self, host: Option<String>) {
        self.host = host;
    }

    /// Value of a keybinding. NULL values read as `None`, like absent ones.
    pub fn keybinding(&self, name: &str) -> Option<&CimValue> {
        self.keybindings.get(name).and_then(Option::as_ref)
    }

    pub fn has_keybinding(&self, name: &str) -> bool {
        self.keybindings.contains_key(name)
    }

    /// Add or replace a keybinding.
    pub fn set_keybinding(&mut self, name: impl Into<String>, value: impl Into<CimValue>) -> Result<()> {
        self.set_keybinding_with(name, Some(value.into()), &Config::default())
    }

    /// Add or replace a keybinding that may be NULL.
    pub fn set_keybinding_with(
        &mut self,
        name: impl Into<String>,
        value: Option<CimValue>,
        config: &Config,
    ) -> Result<()> {
        let name = name.into();
        let value = keybinding_value(&name, value, config)?;
        self.keybindings.insert(name, value);
        Ok(())
    }

    /// Add or replace a keybinding with the name and value of `prop`.
    pub fn set_keybinding_from_property(&mut self, prop: &CimProperty) -> Result<()> {
        self.set_keybinding_with(prop.name(), prop.value().cloned(), &Config::default())
    }

    pub fn remove_keybinding(&mut self, name: &str) -> Option<Option<CimValue>> {
        self.keybindings.remove(name)
    }

    /// Replace all keybindings. Nothing changes if any value is rejected.
    pub fn set_keybindings(&mut self, keybindings: KeyBindings, config: &Config) -> Result<()> {
        let mut validated = KeyBindings::with_capacity(keybindings.len());
        for (name, value) in keybindings {
            let value = keybinding_value(&name, value, config)?;
            validated.insert(name, value);
        }
        self.keybindings = validated;
        Ok(())
    }

    /// Build the path of `instance` from the key properties declared by
    /// `class`.
    ///
    /// Properties qualified `Key(true)` in the class are looked up in the
    /// instance. A key property missing from the instance is an error in
    /// `strict` mode and skipped otherwise.
    pub fn from_instance(
        class: &CimClass,
        instance: &CimInstance,
        namespace: Option<&str>,
        host: Option<&str>,
        strict: bool,
    ) -> Result<Self> {
        let mut path = CimInstanceName::new(class.classname());
        path.set_namespace(namespace.map(str::to_string));
        path.set_host(host.map(str::to_string));
        for prop in class.properties().values() {
            if !prop.is_key() {
                continue;
            }
            match instance.property(prop.name()) {
                Some(inst_prop) => {
                    path.set_keybinding_with(
                        prop.name(),
                        inst_prop.value().cloned(),
                        &Config::default(),
                    )?;
                }
                None if strict => {
                    return Err(CimError::value(format!(
                        "key property {:?} of class {:?} is missing from the instance",
                        prop.name(),
                        class.classname()
                    )));
                }
                None => {
                    debug!(property = %prop.name(), "key property missing from instance, skipped");
                }
            }
        }
        Ok(path)
    }

    /// Parse a WBEM URI naming an instance.
    pub fn from_wbem_uri(uri: &str) -> Result<Self> {
        Self::from_wbem_uri_with(uri, &Config::default())
    }

    /// Parse a WBEM URI naming an instance; `NULL` keybinding values are
    /// accepted when `config` tolerates them.
    pub fn from_wbem_uri_with(uri: &str, config: &Config) -> Result<Self> {
        uri::parse_instance_path(uri, config)
    }

    /// Render as a WBEM URI in the given format.
    pub fn to_wbem_uri(&self, format: UriFormat) -> String {
        uri::format_instance_path(self, format)
    }
}

impl PartialEq for CimInstanceName {
    fn eq(&self, other: &Self) -> bool {
        opt_name_eq(self.host(), other.host())
            && opt_name_eq(self.namespace(), other.namespace())
            && name_eq(&self.classname, &other.classname)
            && self.keybindings == other.keybindings
    }
}

impl Eq for CimInstanceName {}

impl Hash for CimInstanceName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_opt_name(self.host(), state);
        hash_opt_name(self.namespace(), state);
        hash_name(&self.classname, state);
        self.keybindings.hash(state);
    }
}

impl PartialOrd for CimInstanceName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let ord = cmp_opt_name(self.host(), other.host())
            .then_with(|| cmp_opt_name(self.namespace(), other.namespace()))
            .then_with(|| cmp_opt_name(Some(&self.classname), Some(&other.classname)));
        match ord {
            Ordering::Equal => self.keybindings.partial_cmp_items(&other.keybindings),
            unequal => Some(unequal),
        }
    }
}

impl fmt::Display for CimInstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wbem_uri(UriFormat::Historical))
    }
}

/// Builder for [`CimInstanceName`] that validates keybindings on `build`.
#[derive(Debug, Clone)]
pub struct CimInstanceNameBuilder {
    classname: String,
    keybindings: Vec<(String, Option<CimValue>)>,
    namespace: Option<String>,
    host: Option<String>,
    config: Config,
}

impl CimInstanceNameBuilder {
    pub fn new(classname: impl Into<String>) -> Self {
        CimInstanceNameBuilder {
            classname: classname.into(),
            keybindings: Vec::new(),
            namespace: None,
            host: None,
            config: Config::default(),
        }
    }

    pub fn keybinding(mut self, name: impl Into<String>, value: impl Into<CimValue>) -> Self {
        self.keybindings.push((name.into(), Some(value.into())));
        self
    }

    /// Add a keybinding that may be NULL.
    pub fn keybinding_opt(mut self, name: impl Into<String>, value: Option<CimValue>) -> Self {
        self.keybindings.push((name.into(), value));
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CimInstanceName> {
        let mut path = CimInstanceName::new(self.classname);
        path.set_namespace(self.namespace);
        path.set_host(self.host);
        for (name, value) in self.keybindings {
            path.set_keybinding_with(name, value, &self.config)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::qualifier::CimQualifier;
    use crate::types::CimType;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn sample() -> CimInstanceName {
        CimInstanceName::builder("CIM_Foo")
            .keybinding("Name", "foo")
            .keybinding("Id", 42u32)
            .namespace("root/cimv2")
            .host("server")
            .build()
            .unwrap()
    }

    #[test]
    fn keybinding_lookup_ignores_case() {
        let path = sample();
        assert_eq!(path.keybinding("NAME"), Some(&CimValue::from("foo")));
        assert!(path.has_keybinding("id"));
        assert_eq!(path.keybinding("missing"), None);
    }

    #[test]
    fn null_keybinding_needs_tolerance() {
        let err = CimInstanceName::builder("CIM_Foo")
            .keybinding_opt("k", None)
            .build();
        assert!(matches!(err, Err(CimError::Value(_))));
        let ok = CimInstanceName::builder("CIM_Foo")
            .keybinding_opt("k", None)
            .config(Config::default().with_null_key_values(true))
            .build()
            .unwrap();
        assert!(ok.has_keybinding("K"));
    }

    #[test]
    fn rejects_embedded_keybinding_values() {
        let mut path = CimInstanceName::new("CIM_Foo");
        assert!(matches!(
            path.set_keybinding("k", CimInstance::new("CIM_Bar")),
            Err(CimError::Type(_))
        ));
        assert!(matches!(
            path.set_keybinding("k", vec![1u8]),
            Err(CimError::Type(_))
        ));
        assert!(path.keybindings().is_empty());
    }

    #[test]
    fn equal_paths_hash_alike() {
        let a = sample();
        let b = CimInstanceName::builder("cim_foo")
            .keybinding("id", 42u32)
            .keybinding("NAME", "foo")
            .namespace("ROOT/cimv2")
            .host("SERVER")
            .build()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut c = a.clone();
        c.set_keybinding("Name", "bar").unwrap();
        assert_ne!(a, c);
        assert_ne!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn clone_is_independent() {
        let a = sample();
        let mut b = a.clone();
        b.set_namespace(Some("interop".into()));
        assert_eq!(a.namespace(), Some("root/cimv2"));
    }

    #[test]
    fn ordering_falls_back_to_keybindings() {
        let a = CimInstanceName::builder("C").keybinding("k", 1u8).build().unwrap();
        let b = CimInstanceName::builder("C").keybinding("k", 2u8).build().unwrap();
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
    }

    #[test]
    fn from_instance_uses_key_properties() {
        let key = CimQualifier::new("Key", true).unwrap();
        let class = CimClass::builder("CIM_Foo")
            .property(
                CimProperty::builder("Name")
                    .cim_type(CimType::String)
                    .qualifier(key.clone())
                    .build()
                    .unwrap(),
            )
            .property(
                CimProperty::builder("Other")
                    .cim_type(CimType::Uint8)
                    .build()
                    .unwrap(),
            )
            .property(
                CimProperty::builder("Id")
                    .cim_type(CimType::Uint32)
                    .qualifier(key)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let instance = CimInstance::builder("CIM_Foo")
            .property("Name", "foo")
            .property("Other", 1u8)
            .build()
            .unwrap();

        let path = CimInstanceName::from_instance(&class, &instance, Some("root"), None, false)
            .unwrap();
        assert_eq!(path.keybindings().len(), 1);
        assert_eq!(path.keybinding("Name"), Some(&CimValue::from("foo")));
        assert_eq!(path.namespace(), Some("root"));

        assert!(matches!(
            CimInstanceName::from_instance(&class, &instance, None, None, true),
            Err(CimError::Value(_))
        ));
    }
}
