use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::compat;
use crate::config::Config;
use crate::error::{CimError, Result};
use crate::nocase::{hash_name, hash_opt_name, name_eq, opt_name_eq, Named, NocaseDict};
use crate::parameter::{CimParameter, Parameters};
use crate::property::Qualifiers;
use crate::qualifier::CimQualifier;
use crate::types::CimType;

/// Methods of a class, keyed by method name.
pub type Methods = NocaseDict<Arc<CimMethod>>;

/// A method declaration of a CIM class.
#[derive(Debug, Clone)]
pub struct CimMethod {
    name: String,
    return_type: CimType,
    parameters: Parameters,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: Qualifiers,
}

fn check_return_type(name: &str, return_type: Option<CimType>) -> Result<CimType> {
    match return_type {
        None => Err(CimError::value(format!(
            "method {name:?} has no return type"
        ))),
        Some(CimType::Reference) => Err(CimError::value(format!(
            "method {name:?} cannot have return type reference"
        ))),
        Some(ty) => Ok(ty),
    }
}

fn check_parameter_keys(method: &str, parameters: &Parameters) -> Result<()> {
    for (key, param) in parameters.iter() {
        if !name_eq(key, param.name()) {
            return Err(CimError::value(format!(
                "method {method:?}: parameter key {key:?} does not match parameter name {:?}",
                param.name()
            )));
        }
    }
    Ok(())
}

impl CimMethod {
    /// Builder with the method name set.
    pub fn builder(name: impl Into<String>) -> CimMethodBuilder {
        CimMethodBuilder::new().name(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> CimType {
        self.return_type
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&CimParameter> {
        self.parameters.get(name).map(Arc::as_ref)
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

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_return_type(&mut self, return_type: CimType) -> Result<()> {
        self.return_type = check_return_type(&self.name, Some(return_type))?;
        Ok(())
    }

    /// Replace all parameters. Keys must equal the parameter names.
    pub fn set_parameters(&mut self, parameters: Parameters) -> Result<()> {
        check_parameter_keys(&self.name, &parameters)?;
        self.parameters = parameters;
        Ok(())
    }

    pub fn add_parameter(&mut self, parameter: CimParameter) {
        self.parameters
            .insert(parameter.name().to_string(), Arc::new(parameter));
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
}

impl Named for CimMethod {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CimMethod {
    fn eq(&self, other: &Self) -> bool {
        name_eq(&self.name, &other.name)
            && self.qualifiers == other.qualifiers
            && self.propagated == other.propagated
            && opt_name_eq(self.class_origin(), other.class_origin())
            && self.return_type == other.return_type
            && self.parameters == other.parameters
    }
}

impl Eq for CimMethod {}

impl Hash for CimMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_name(&self.name, state);
        self.qualifiers.hash(state);
        self.propagated.hash(state);
        hash_opt_name(self.class_origin(), state);
        self.return_type.hash(state);
        self.parameters.hash(state);
    }
}

/// Builder for [`CimMethod`].
///
/// The method name may be given through the deprecated `methodname` alias;
/// giving both is an error.
#[derive(Debug, Clone, Default)]
pub struct CimMethodBuilder {
    name: Option<String>,
    methodname: Option<String>,
    return_type: Option<CimType>,
    parameters: Vec<CimParameter>,
    parameter_map: Option<Parameters>,
    class_origin: Option<String>,
    propagated: Option<bool>,
    qualifiers: Qualifiers,
    config: Config,
}

impl CimMethodBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Deprecated alias of [`name`](Self::name).
    pub fn methodname(mut self, methodname: impl Into<String>) -> Self {
        self.methodname = Some(methodname.into());
        self
    }

    pub fn return_type(mut self, return_type: CimType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn parameter(mut self, parameter: CimParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the parameters from a map whose keys must equal the parameter
    /// names. Parameters added with [`parameter`](Self::parameter) follow.
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameter_map = Some(parameters);
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

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[track_caller]
    pub fn build(self) -> Result<CimMethod> {
        let name = compat::method_name(self.name, self.methodname, &self.config)?;
        let return_type = check_return_type(&name, self.return_type)?;
        let mut parameters = self.parameter_map.unwrap_or_default();
        check_parameter_keys(&name, &parameters)?;
        for param in self.parameters {
            parameters.insert(param.name().to_string(), Arc::new(param));
        }
        Ok(CimMethod {
            name,
            return_type,
            parameters,
            class_origin: self.class_origin,
            propagated: self.propagated,
            qualifiers: self.qualifiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_parameters() {
        let method = CimMethod::builder("RequestStateChange")
            .return_type(CimType::Uint32)
            .parameter(CimParameter::new("RequestedState", CimType::Uint16))
            .parameter(
                CimParameter::builder("Job", CimType::Reference)
                    .reference_class("CIM_ConcreteJob")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(method.parameters().len(), 2);
        assert_eq!(
            method.parameter("requestedstate").map(CimParameter::cim_type),
            Some(CimType::Uint16)
        );
    }

    #[test]
    fn methodname_alias() {
        let method = CimMethodBuilder::new()
            .methodname("Stop")
            .return_type(CimType::Uint32)
            .build()
            .unwrap();
        assert_eq!(method.name(), "Stop");
        assert!(matches!(
            CimMethodBuilder::new()
                .name("Stop")
                .methodname("Start")
                .return_type(CimType::Uint32)
                .build(),
            Err(CimError::Value(_))
        ));
    }

    #[test]
    fn return_type_rules() {
        assert!(matches!(
            CimMethod::builder("M").build(),
            Err(CimError::Value(_))
        ));
        assert!(matches!(
            CimMethod::builder("M").return_type(CimType::Reference).build(),
            Err(CimError::Value(_))
        ));
    }

    #[test]
    fn parameter_keys_must_match_names() {
        let mut params = Parameters::new();
        params.insert("Other", Arc::new(CimParameter::new("P", CimType::Uint8)));
        assert!(matches!(
            CimMethod::builder("M")
                .return_type(CimType::Uint8)
                .parameters(params)
                .build(),
            Err(CimError::Value(_))
        ));
    }
}
