use std::hash::{Hash, Hasher};

use crate::config::Config;
use crate::error::{CimError, Result};
use crate::nocase::{hash_name, name_eq, Named, NocaseDict};
use crate::property::check_array_size;
use crate::qualifier::qualifier_value;
use crate::types::CimType;
use crate::value::CimValue;

/// Element kinds a qualifier declaration may apply to, keyed by scope name
/// (`CLASS`, `ASSOCIATION`, `INDICATION`, `PROPERTY`, `REFERENCE`, `METHOD`,
/// `PARAMETER`, `ANY`).
pub type Scopes = NocaseDict<bool>;

/// Scope names in DSP0004 declaration order.
pub const SCOPE_NAMES: [&str; 8] = [
    "CLASS",
    "ASSOCIATION",
    "INDICATION",
    "PROPERTY",
    "REFERENCE",
    "METHOD",
    "PARAMETER",
    "ANY",
];

/// Declaration of a qualifier type: its CIM type, default value, scopes and
/// flavors.
#[derive(Debug, Clone)]
pub struct CimQualifierDeclaration {
    name: String,
    cim_type: CimType,
    value: Option<CimValue>,
    is_array: bool,
    array_size: Option<u32>,
    scopes: Scopes,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
}

impl CimQualifierDeclaration {
    pub fn builder(name: impl Into<String>, cim_type: CimType) -> CimQualifierDeclarationBuilder {
        CimQualifierDeclarationBuilder::new(name, cim_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn value(&self) -> Option<&CimValue> {
        self.value.as_ref()
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn array_size(&self) -> Option<u32> {
        self.array_size
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
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

    /// Whether `scope` is enabled, directly or through `ANY`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.get(scope).copied().unwrap_or(false)
            || self.scopes.get("ANY").copied().unwrap_or(false)
    }

    pub fn set_scope(&mut self, scope: impl Into<String>, enabled: bool) {
        self.scopes.insert(scope, enabled);
    }

    /// Replace the default value, keeping type and array-ness.
    pub fn set_value(&mut self, value: Option<CimValue>) -> Result<()> {
        check_declared_shape(&self.name, self.is_array, value.as_ref())?;
        self.value = qualifier_value(&self.name, value, self.cim_type, &Config::default())?;
        Ok(())
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

fn check_declared_shape(name: &str, is_array: bool, value: Option<&CimValue>) -> Result<()> {
    match value {
        Some(v) if v.is_array() != is_array => Err(CimError::value(format!(
            "qualifier declaration {name:?}: is_array={is_array} does not match the shape of its value"
        ))),
        _ => Ok(()),
    }
}

impl Named for CimQualifierDeclaration {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CimQualifierDeclaration {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.name, &other.name)
            && self.cim_type == other.cim_type
            && self.value == other.value
            && self.is_array == other.is_array
            && self.array_size == other.array_size
            && self.scopes == other.scopes
            && self.overridable == other.overridable
            && self.tosubclass == other.tosubclass
            && self.toinstance == other.toinstance
            && self.translatable == other.translatable
    }
}

impl Eq for CimQualifierDeclaration {}

impl Hash for CimQualifierDeclaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.name, state);
        self.cim_type.hash(state);
        self.value.hash(state);
        self.is_array.hash(state);
        self.array_size.hash(state);
        self.scopes.hash(state);
        self.overridable.hash(state);
        self.tosubclass.hash(state);
        self.toinstance.hash(state);
        self.translatable.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct CimQualifierDeclarationBuilder {
    name: String,
    cim_type: CimType,
    value: Option<CimValue>,
    is_array: Option<bool>,
    array_size: Option<u32>,
    scopes: Scopes,
    overridable: Option<bool>,
    tosubclass: Option<bool>,
    toinstance: Option<bool>,
    translatable: Option<bool>,
    config: Config,
}

impl CimQualifierDeclarationBuilder {
    pub fn new(name: impl Into<String>, cim_type: CimType) -> Self {
        CimQualifierDeclarationBuilder {
            name: name.into(),
            cim_type,
            value: None,
            is_array: None,
            array_size: None,
            scopes: Scopes::new(),
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

    pub fn is_array(mut self, is_array: bool) -> Self {
        self.is_array = Some(is_array);
        self
    }

    pub fn array_size(mut self, array_size: u32) -> Self {
        self.array_size = Some(array_size);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>, enabled: bool) -> Self {
        self.scopes.insert(scope, enabled);
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

    pub fn build(self) -> Result<CimQualifierDeclaration> {
        let is_array = match (self.is_array, &self.value) {
            (Some(declared), value) => {
                check_declared_shape(&self.name, declared, value.as_ref())?;
                declared
            }
            (None, Some(value)) => value.is_array(),
            (None, None) => false,
        };
        check_array_size("qualifier declaration", &self.name, is_array, self.array_size)?;
        let value = qualifier_value(&self.name, self.value, self.cim_type, &self.config)?;
        Ok(CimQualifierDeclaration {
            name: self.name,
            cim_type: self.cim_type,
            value,
            is_array,
            array_size: self.array_size,
            scopes: self.scopes,
            overridable: self.overridable,
            tosubclass: self.tosubclass,
            toinstance: self.toinstance,
            translatable: self.translatable,
        })
    }
}
