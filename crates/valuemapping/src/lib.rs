//! Translation between the integer values of CIM properties, method return
//! values and parameters and the human readable strings of their `Values`
//! qualifier, as directed by the `ValueMap` qualifier (DSP0004).
//!
//! Mappings are built once per element, either from an element at hand or
//! through a [`ClassProvider`] that retrieves the declaring class.

use cim_obj::{CimClass, CimError};
use thiserror::Error;

pub mod literal;
pub mod mapping;

pub use literal::parse_integer;
pub use mapping::{MappedElement, ValueMapEntry, ValueMapping};

/// Error type for mappings built through a [`ClassProvider`].
#[derive(Debug, Error)]
pub enum ValueMappingError {
    /// The class or the mapping itself is not usable.
    #[error(transparent)]
    Cim(#[from] CimError),
    /// The class provider failed to deliver the class.
    #[error("class provider: {0}")]
    Provider(String),
}

pub type Result<T, E = ValueMappingError> = std::result::Result<T, E>;

/// Source of class declarations, typically a WBEM connection.
pub trait ClassProvider {
    /// Retrieve `classname` from `namespace` (the default namespace when
    /// `None`).
    fn get_class(
        &self,
        classname: &str,
        namespace: Option<&str>,
        local_only: bool,
        include_qualifiers: bool,
    ) -> Result<CimClass>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cim_obj::{CimMethod, CimParameter, CimProperty, CimQualifier, CimType};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockProvider {
        classes: HashMap<String, CimClass>,
        requests: RefCell<Vec<(String, Option<String>, bool, bool)>>,
    }

    impl ClassProvider for MockProvider {
        fn get_class(
            &self,
            classname: &str,
            namespace: Option<&str>,
            local_only: bool,
            include_qualifiers: bool,
        ) -> Result<CimClass> {
            self.requests.borrow_mut().push((
                classname.to_string(),
                namespace.map(str::to_string),
                local_only,
                include_qualifiers,
            ));
            self.classes
                .get(&classname.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| ValueMappingError::Provider(format!("class {classname} not found")))
        }
    }

    fn states() -> (CimQualifier, CimQualifier) {
        (
            CimQualifier::new("ValueMap", vec!["2", "3", "..", "32768..65535"]).unwrap(),
            CimQualifier::new("Values", vec!["Enabled", "Disabled", "DMTF Reserved", "Vendor Reserved"]).unwrap(),
        )
    }

    fn provider() -> MockProvider {
        let (valuemap, values) = states();
        let property = CimProperty::builder("EnabledState")
            .cim_type(CimType::Uint16)
            .qualifier(valuemap.clone())
            .qualifier(values.clone())
            .build()
            .unwrap();
        let parameter = CimParameter::builder("RequestedState", CimType::Uint16)
            .qualifier(valuemap.clone())
            .qualifier(values.clone())
            .build()
            .unwrap();
        let method = CimMethod::builder("RequestStateChange")
            .return_type(CimType::Uint32)
            .qualifier(CimQualifier::new("ValueMap", vec!["0", "1", "4096", "4097..32767"]).unwrap())
            .qualifier(
                CimQualifier::new("Values", vec!["Completed", "Not Supported", "Job Started", "Reserved"])
                    .unwrap(),
            )
            .parameter(parameter)
            .build()
            .unwrap();
        let class = CimClass::builder("CIM_EnabledLogicalElement")
            .property(property)
            .method(method)
            .build()
            .unwrap();
        let mut provider = MockProvider::default();
        provider
            .classes
            .insert("cim_enabledlogicalelement".to_string(), class);
        provider
    }

    #[test]
    fn property_through_provider() {
        let provider = provider();
        let vm = ValueMapping::for_property(
            &provider,
            Some("root/cimv2"),
            "CIM_EnabledLogicalElement",
            "enabledstate",
        )
        .unwrap();
        assert_eq!(vm.to_values_int(2).unwrap(), "Enabled");
        assert_eq!(vm.to_values_int(40000).unwrap(), "Vendor Reserved");
        assert_eq!(vm.to_values_int(7).unwrap(), "DMTF Reserved");
        assert_eq!(vm.propname(), Some("EnabledState"));
        assert_eq!(vm.namespace(), Some("root/cimv2"));
        assert_eq!(
            provider.requests.borrow()[0],
            (
                "CIM_EnabledLogicalElement".to_string(),
                Some("root/cimv2".to_string()),
                false,
                true
            )
        );
    }

    #[test]
    fn method_and_parameter_through_provider() {
        let provider = provider();
        let vm = ValueMapping::for_method(&provider, None, "CIM_EnabledLogicalElement", "RequestStateChange")
            .unwrap();
        assert_eq!(vm.to_values_int(4096).unwrap(), "Job Started");
        assert_eq!(vm.to_binary("Reserved").unwrap(), ValueMapEntry::Range(4097, 32767));
        assert_eq!(vm.methodname(), Some("RequestStateChange"));
        assert_eq!(vm.parametername(), None);

        let vm = ValueMapping::for_parameter(
            &provider,
            None,
            "CIM_EnabledLogicalElement",
            "RequestStateChange",
            "RequestedState",
        )
        .unwrap();
        assert_eq!(vm.to_values_int(3).unwrap(), "Disabled");
        assert_eq!(vm.methodname(), Some("RequestStateChange"));
        assert_eq!(vm.parametername(), Some("RequestedState"));
        assert_eq!(vm.classname(), Some("CIM_EnabledLogicalElement"));
    }

    #[test]
    fn provider_and_lookup_failures() {
        let provider = provider();
        assert!(matches!(
            ValueMapping::for_property(&provider, None, "CIM_Missing", "X"),
            Err(ValueMappingError::Provider(_))
        ));
        assert!(matches!(
            ValueMapping::for_property(&provider, None, "CIM_EnabledLogicalElement", "Missing"),
            Err(ValueMappingError::Cim(CimError::Lookup(_)))
        ));
        assert!(matches!(
            ValueMapping::for_parameter(
                &provider,
                None,
                "CIM_EnabledLogicalElement",
                "RequestStateChange",
                "Missing"
            ),
            Err(ValueMappingError::Cim(CimError::Lookup(_)))
        ));
    }
}
