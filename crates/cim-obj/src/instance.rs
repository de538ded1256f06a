use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::class::CimClass;
use crate::compat::{self, Deprecated};
use crate::config::Config;
use crate::error::{CimError, Result};
use crate::instancename::CimInstanceName;
use crate::nocase::{hash_name, name_eq, NocaseDict};
use crate::property::{CimProperty, Properties, Qualifiers};
use crate::qualifier::CimQualifier;
use crate::value::CimValue;

/// Property values by name, as accepted by [`CimInstance::from_class`].
pub type PropertyValues = NocaseDict<Option<CimValue>>;

/// A CIM instance: class name, properties, and an optional instance path.
///
/// The path is kept in sync with the properties: setting a property whose
/// name is a keybinding of the path updates that keybinding. Instances are
/// compared and hashed by class name, path, properties and qualifiers; do
/// not mutate an instance while it is held in a hashed collection.
///
/// Cloning copies the property and qualifier maps and the path; the
/// property and qualifier objects themselves are shared until one side
/// modifies them.
#[derive(Debug, Clone)]
pub struct CimInstance {
    classname: String,
    properties: Properties,
    qualifiers: Qualifiers,
    path: Option<CimInstanceName>,
    property_list: Option<Vec<String>>,
}

/// Options of [`CimInstance::from_class`].
#[derive(Debug, Clone)]
pub struct FromClassOptions {
    /// Namespace of the generated path.
    pub namespace: Option<String>,
    /// Add class properties that have no entry in the property values,
    /// with the class default value.
    pub include_missing_properties: bool,
    /// Generate the instance path from the key properties.
    pub include_path: bool,
    /// Fail on property values that name no class property.
    pub strict: bool,
    /// Copy `class_origin` from the class properties.
    pub include_class_origin: bool,
}

impl Default for FromClassOptions {
    fn default() -> Self {
        FromClassOptions {
            namespace: None,
            include_missing_properties: true,
            include_path: true,
            strict: false,
            include_class_origin: false,
        }
    }
}

impl CimInstance {
    /// Instance without properties or path.
    pub fn new(classname: impl Into<String>) -> Self {
        CimInstance {
            classname: classname.into(),
            properties: Properties::new(),
            qualifiers: Qualifiers::new(),
            path: None,
            property_list: None,
        }
    }

    pub fn builder(classname: impl Into<String>) -> CimInstanceBuilder {
        CimInstanceBuilder::new(classname)
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&CimProperty> {
        self.properties.get(name).map(Arc::as_ref)
    }

    /// Mutable access to a property. Changes made here bypass the path
    /// keybinding sync of [`set_item`](Self::set_item).
    pub fn property_mut(&mut self, name: &str) -> Option<&mut CimProperty> {
        self.properties.get_mut(name).map(Arc::make_mut)
    }

    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    pub fn qualifiers_mut(&mut self) -> &mut Qualifiers {
        &mut self.qualifiers
    }

    pub fn add_qualifier(&mut self, qualifier: CimQualifier) {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
    }

    pub fn path(&self) -> Option<&CimInstanceName> {
        self.path.as_ref()
    }

    pub fn path_mut(&mut self) -> Option<&mut CimInstanceName> {
        self.path.as_mut()
    }

    pub fn set_path(&mut self, path: Option<CimInstanceName>) {
        self.path = path;
    }

    /// Lower-cased property filter, if one was set.
    pub fn property_list(&self) -> Option<&[String]> {
        self.property_list.as_deref()
    }

    /// Set the deprecated property filter. Names are stored lower-cased.
    #[track_caller]
    pub fn set_property_list(&mut self, property_list: Option<Vec<String>>, config: &Config) {
        if property_list.is_some() {
            compat::deprecated(Deprecated::PropertyList, config);
        }
        self.property_list =
            property_list.map(|names| names.iter().map(|n| n.to_lowercase()).collect());
    }

    /// Value of a property. NULL values read as `None`, like absent ones.
    pub fn get(&self, name: &str) -> Option<&CimValue> {
        self.property(name).and_then(CimProperty::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&CimValue>> + '_ {
        self.properties.values().map(|p| p.value())
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, Option<&CimValue>)> + '_ {
        self.properties.iter().map(|(k, p)| (k, p.value()))
    }

    /// Set a property value by name.
    ///
    /// An existing property keeps its type. A new property infers its type
    /// from the value. A matching path keybinding is updated as well.
    ///
    /// When a property filter is set and the instance has a path, names
    /// outside the filter that are not keybindings are ignored.
    pub fn set_item(&mut self, name: impl Into<String>, value: Option<CimValue>) -> Result<()> {
        self.set_item_with(name, value, &Config::default())
    }

    pub fn set_item_with(
        &mut self,
        name: impl Into<String>,
        value: Option<CimValue>,
        config: &Config,
    ) -> Result<()> {
        let name = name.into();
        if self.filtered_out(&name) {
            debug!(property = %name, "property outside property_list ignored");
            return Ok(());
        }
        let prop = match self.properties.get(&name) {
            Some(existing) => existing.with_value(value, config)?,
            None => CimProperty::builder(name.clone())
                .value_opt(value)
                .config(*config)
                .build()?,
        };
        self.store(name, prop, config)
    }

    /// Add or replace a property object, with the same filter and path
    /// sync rules as [`set_item`](Self::set_item).
    pub fn set_property(&mut self, prop: CimProperty) -> Result<()> {
        let name = prop.name().to_string();
        if self.filtered_out(&name) {
            debug!(property = %name, "property outside property_list ignored");
            return Ok(());
        }
        self.store(name, prop, &Config::default())
    }

    /// Replace all properties.
    pub fn set_properties<I>(&mut self, props: I) -> Result<()>
    where
        I: IntoIterator<Item = CimProperty>,
    {
        let previous = std::mem::take(&mut self.properties);
        for prop in props {
            if let Err(err) = self.set_property(prop) {
                self.properties = previous;
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<CimProperty>> {
        self.properties.remove(name)
    }

    /// Set several property values, as with [`set_item`](Self::set_item).
    pub fn update<I, K>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Option<CimValue>)>,
        K: Into<String>,
    {
        for (name, value) in items {
            self.set_item(name, value)?;
        }
        Ok(())
    }

    /// Set values of properties that already exist; other names are
    /// skipped.
    pub fn update_existing<I, K>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Option<CimValue>)>,
        K: AsRef<str>,
    {
        let config = Config::default();
        for (name, value) in items {
            let Some((key, existing)) = self.properties.get_key_value(name.as_ref()) else {
                continue;
            };
            let prop = existing.with_value(value, &config)?;
            let key = key.to_string();
            self.store(key, prop, &config)?;
        }
        Ok(())
    }

    fn filtered_out(&self, name: &str) -> bool {
        match (&self.property_list, &self.path) {
            (Some(list), Some(path)) => {
                let folded = name.to_lowercase();
                !list.iter().any(|n| *n == folded) && !path.has_keybinding(name)
            }
            _ => false,
        }
    }

    fn store(&mut self, key: String, prop: CimProperty, config: &Config) -> Result<()> {
        if let Some(path) = self.path.as_mut() {
            if path.has_keybinding(&key) {
                path.set_keybinding_with(key.clone(), prop.value().cloned(), config)?;
            }
        }
        self.properties.insert(key, Arc::new(prop));
        Ok(())
    }

    /// Build an instance of `class`.
    ///
    /// Each class property becomes an instance property of the declared
    /// type, taking its value from `property_values` or, when
    /// `include_missing_properties` is set, the class default. With
    /// `include_path` the path is derived from the key properties.
    pub fn from_class(
        class: &CimClass,
        property_values: &PropertyValues,
        options: &FromClassOptions,
    ) -> Result<Self> {
        if options.strict {
            if let Some(unknown) = property_values
                .keys()
                .find(|name| !class.properties().contains_key(name))
            {
                return Err(CimError::value(format!(
                    "property {unknown:?} is not a property of class {:?}",
                    class.classname()
                )));
            }
        }
        let config = Config::default();
        let mut inst = CimInstance::new(class.classname());
        for class_prop in class.properties().values() {
            let value = match property_values.get(class_prop.name()) {
                Some(value) => value.clone(),
                None if options.include_missing_properties => class_prop.value().cloned(),
                None => continue,
            };
            let is_null = value.is_none();
            let mut builder = CimProperty::builder(class_prop.name())
                .value_opt(value)
                .cim_type(class_prop.cim_type())
                .config(config);
            if is_null {
                builder = builder.is_array(class_prop.is_array());
            }
            if let Some(reference_class) = class_prop.reference_class() {
                builder = builder.reference_class(reference_class);
            }
            if let Some(kind) = class_prop.embedded_object() {
                builder = builder.embedded_object(kind);
            }
            if options.include_class_origin {
                if let Some(origin) = class_prop.class_origin() {
                    builder = builder.class_origin(origin);
                }
            }
            let prop = builder.build()?;
            inst.properties
                .insert(class_prop.name().to_string(), Arc::new(prop));
        }
        if options.include_path {
            let path = CimInstanceName::from_instance(
                class,
                &inst,
                options.namespace.as_deref(),
                None,
                options.strict,
            )?;
            inst.path = Some(path);
        }
        Ok(inst)
    }
}

impl PartialEq for CimInstance {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.classname, &other.classname)
            && self.path == other.path
            && self.properties == other.properties
            && self.qualifiers == other.qualifiers
    }
}

impl Eq for CimInstance {}

impl Hash for CimInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.classname, state);
        self.path.hash(state);
        self.properties.hash(state);
        self.qualifiers.hash(state);
    }
}

#[derive(Debug, Clone)]
enum PendingProperty {
    Value(String, Option<CimValue>),
    Object(CimProperty),
}

/// Builder for [`CimInstance`].
///
/// Qualifiers, path and property filter are applied first; properties are
/// then set in order with the rules of [`CimInstance::set_item`].
#[derive(Debug, Clone)]
pub struct CimInstanceBuilder {
    classname: String,
    properties: Vec<PendingProperty>,
    qualifiers: Qualifiers,
    path: Option<CimInstanceName>,
    property_list: Option<Vec<String>>,
    config: Config,
}

impl CimInstanceBuilder {
    pub fn new(classname: impl Into<String>) -> Self {
        CimInstanceBuilder {
            classname: classname.into(),
            properties: Vec::new(),
            qualifiers: Qualifiers::new(),
            path: None,
            property_list: None,
            config: Config::default(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<CimValue>) -> Self {
        self.properties
            .push(PendingProperty::Value(name.into(), Some(value.into())));
        self
    }

    pub fn property_opt(mut self, name: impl Into<String>, value: Option<CimValue>) -> Self {
        self.properties
            .push(PendingProperty::Value(name.into(), value));
        self
    }

    pub fn cim_property(mut self, prop: CimProperty) -> Self {
        self.properties.push(PendingProperty::Object(prop));
        self
    }

    pub fn qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers
            .insert(qualifier.name().to_string(), Arc::new(qualifier));
        self
    }

    pub fn path(mut self, path: CimInstanceName) -> Self {
        self.path = Some(path);
        self
    }

    /// Deprecated property filter.
    pub fn property_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_list = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[track_caller]
    pub fn build(self) -> Result<CimInstance> {
        let mut inst = CimInstance::new(self.classname);
        inst.qualifiers = self.qualifiers;
        inst.path = self.path;
        inst.set_property_list(self.property_list, &self.config);
        for pending in self.properties {
            match pending {
                PendingProperty::Value(name, value) => {
                    inst.set_item_with(name, value, &self.config)?
                }
                PendingProperty::Object(prop) => {
                    let name = prop.name().to_string();
                    if !inst.filtered_out(&name) {
                        inst.store(name, prop, &self.config)?;
                    }
                }
            }
        }
        Ok(inst)
    }
}
