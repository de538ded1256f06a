use std::collections::HashMap;
use std::fmt;

use cim_obj::{CimError, CimMethod, CimParameter, CimProperty, CimType, CimValue, IntKind, Qualifiers};
use tracing::debug;

use crate::literal::parse_integer;
use crate::{ClassProvider, Result};

/// The integer value or values an entry of `ValueMap` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueMapEntry {
    /// A single integer value.
    Single(i128),
    /// An inclusive range with both bounds resolved.
    Range(i128, i128),
    /// `..`: every value not claimed by another entry.
    Unclaimed,
}

impl ValueMapEntry {
    pub fn contains(&self, value: i128) -> bool {
        match *self {
            ValueMapEntry::Single(v) => v == value,
            ValueMapEntry::Range(lo, hi) => lo <= value && value <= hi,
            ValueMapEntry::Unclaimed => false,
        }
    }
}

impl fmt::Display for ValueMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueMapEntry::Single(v) => write!(f, "{v}"),
            ValueMapEntry::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            ValueMapEntry::Unclaimed => f.write_str(".."),
        }
    }
}

/// The element a mapping was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedElement {
    Property(String),
    Method(String),
    Parameter { method: String, parameter: String },
}

/// An entry as written, bounds not yet resolved.
#[derive(Debug, Clone, Copy)]
enum RawEntry {
    Single(i128),
    Range(Option<i128>, Option<i128>),
    Unclaimed,
}

fn parse_entry(text: &str) -> Result<RawEntry, CimError> {
    let text = text.trim();
    match text.split_once("..") {
        None => parse_integer(text).map(RawEntry::Single),
        Some(("", "")) => Ok(RawEntry::Unclaimed),
        Some((lo, hi)) => {
            let bound = |s: &str| -> Result<Option<i128>, CimError> {
                if s.is_empty() {
                    Ok(None)
                } else {
                    parse_integer(s).map(Some)
                }
            };
            Ok(RawEntry::Range(bound(lo)?, bound(hi)?))
        }
    }
}

fn check_in_range(kind: IntKind, value: i128) -> Result<i128, CimError> {
    if kind.contains(value) {
        Ok(value)
    } else {
        Err(CimError::Range {
            kind,
            value,
            min: kind.min(),
            max: kind.max(),
        })
    }
}

/// Resolve elided range bounds from the neighbouring entries in one pass.
///
/// An elided lower bound is the type minimum for the first entry, else one
/// past the explicit upper end of the previous entry. Upper bounds mirror
/// this with the next entry and the type maximum.
fn resolve(raw: &[RawEntry], texts: &[String], kind: IntKind) -> Result<Vec<ValueMapEntry>, CimError> {
    let unresolved = |i: usize, side: &str| {
        CimError::Value(format!(
            "ValueMap entry {:?}: {side} bound cannot be derived from its neighbour",
            texts[i]
        ))
    };
    let mut entries = Vec::with_capacity(raw.len());
    for (i, entry) in raw.iter().enumerate() {
        let resolved = match *entry {
            RawEntry::Single(v) => ValueMapEntry::Single(check_in_range(kind, v)?),
            RawEntry::Unclaimed => ValueMapEntry::Unclaimed,
            RawEntry::Range(lo, hi) => {
                let lo = match lo {
                    Some(v) => v,
                    None if i == 0 => kind.min(),
                    None => match raw[i - 1] {
                        RawEntry::Single(v) | RawEntry::Range(_, Some(v)) => v + 1,
                        _ => return Err(unresolved(i, "lower")),
                    },
                };
                let hi = match hi {
                    Some(v) => v,
                    None if i + 1 == raw.len() => kind.max(),
                    None => match raw[i + 1] {
                        RawEntry::Single(v) | RawEntry::Range(Some(v), _) => v - 1,
                        _ => return Err(unresolved(i, "upper")),
                    },
                };
                let (lo, hi) = (check_in_range(kind, lo)?, check_in_range(kind, hi)?);
                if lo > hi {
                    return Err(CimError::Value(format!(
                        "ValueMap entry {:?} resolves to the empty range {lo}..{hi}",
                        texts[i]
                    )));
                }
                ValueMapEntry::Range(lo, hi)
            }
        };
        entries.push(resolved);
    }
    Ok(entries)
}

/// Translation between the integer values of a CIM element and the strings
/// of its `Values` qualifier, driven by its `ValueMap` qualifier.
///
/// Without a `ValueMap` qualifier the `Values` strings map to consecutive
/// integers starting at 0.
#[derive(Debug, Clone)]
pub struct ValueMapping {
    namespace: Option<String>,
    classname: Option<String>,
    element: MappedElement,
    cim_type: CimType,
    entries: Vec<(ValueMapEntry, String)>,
    singles: HashMap<i128, usize>,
    ranges: Vec<usize>,
    unclaimed: Option<usize>,
}

impl ValueMapping {
    fn build(
        element: MappedElement,
        cim_type: CimType,
        qualifiers: &Qualifiers,
        namespace: Option<&str>,
        classname: Option<&str>,
    ) -> Result<Self, CimError> {
        let Some(kind) = cim_type.int_kind() else {
            return Err(CimError::Type(format!(
                "{element:?} has type {cim_type}; value mappings need an integer type"
            )));
        };
        let values = qualifiers
            .get("Values")
            .ok_or_else(|| CimError::Value(format!("{element:?} has no Values qualifier")))?;
        let values: Vec<String> = values
            .string_array()
            .ok_or_else(|| CimError::Value(format!("Values qualifier of {element:?} is not a string array")))?
            .into_iter()
            .map(str::to_string)
            .collect();

        let resolved = match qualifiers.get("ValueMap") {
            None => (0..values.len())
                .map(|i| i128::try_from(i).map(ValueMapEntry::Single))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| CimError::Value(err.to_string()))?,
            Some(valuemap) => {
                let texts: Vec<String> = valuemap
                    .string_array()
                    .ok_or_else(|| {
                        CimError::Value(format!("ValueMap qualifier of {element:?} is not a string array"))
                    })?
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if texts.len() != values.len() {
                    return Err(CimError::Value(format!(
                        "{element:?}: ValueMap has {} entries, Values has {}",
                        texts.len(),
                        values.len()
                    )));
                }
                let raw = texts
                    .iter()
                    .map(|t| parse_entry(t))
                    .collect::<Result<Vec<_>, _>>()?;
                resolve(&raw, &texts, kind)?
            }
        };

        let mut singles = HashMap::new();
        let mut ranges = Vec::new();
        let mut unclaimed = None;
        for (i, entry) in resolved.iter().enumerate() {
            match entry {
                ValueMapEntry::Single(v) => {
                    singles.entry(*v).or_insert(i);
                }
                ValueMapEntry::Range(..) => ranges.push(i),
                ValueMapEntry::Unclaimed => {
                    unclaimed.get_or_insert(i);
                }
            }
        }
        debug!(
            element = ?element,
            cim_type = %cim_type,
            entries = resolved.len(),
            ranges = ranges.len(),
            "built value mapping"
        );
        Ok(ValueMapping {
            namespace: namespace.map(str::to_string),
            classname: classname.map(str::to_string),
            element,
            cim_type,
            entries: resolved.into_iter().zip(values).collect(),
            singles,
            ranges,
            unclaimed,
        })
    }

    /// Mapping for a property that has been retrieved already.
    pub fn from_property(
        property: &CimProperty,
        namespace: Option<&str>,
        classname: Option<&str>,
    ) -> Result<Self, CimError> {
        Self::build(
            MappedElement::Property(property.name().to_string()),
            property.cim_type(),
            property.qualifiers(),
            namespace,
            classname,
        )
    }

    /// Mapping for the return value of a method.
    pub fn from_method(method: &CimMethod, namespace: Option<&str>, classname: Option<&str>) -> Result<Self, CimError> {
        Self::build(
            MappedElement::Method(method.name().to_string()),
            method.return_type(),
            method.qualifiers(),
            namespace,
            classname,
        )
    }

    /// Mapping for a parameter of the method `methodname`.
    pub fn from_parameter(
        parameter: &CimParameter,
        methodname: &str,
        namespace: Option<&str>,
        classname: Option<&str>,
    ) -> Result<Self, CimError> {
        Self::build(
            MappedElement::Parameter {
                method: methodname.to_string(),
                parameter: parameter.name().to_string(),
            },
            parameter.cim_type(),
            parameter.qualifiers(),
            namespace,
            classname,
        )
    }

    /// Retrieve `classname` with qualifiers and inherited elements, then
    /// build the mapping of its property `propname`.
    pub fn for_property<P: ClassProvider + ?Sized>(
        provider: &P,
        namespace: Option<&str>,
        classname: &str,
        propname: &str,
    ) -> Result<Self> {
        let class = provider.get_class(classname, namespace, false, true)?;
        let property = class.property(propname).ok_or_else(|| {
            CimError::Lookup(format!("class {classname:?} has no property {propname:?}"))
        })?;
        Ok(Self::from_property(property, namespace, Some(class.classname()))?)
    }

    pub fn for_method<P: ClassProvider + ?Sized>(
        provider: &P,
        namespace: Option<&str>,
        classname: &str,
        methodname: &str,
    ) -> Result<Self> {
        let class = provider.get_class(classname, namespace, false, true)?;
        let method = class.method(methodname).ok_or_else(|| {
            CimError::Lookup(format!("class {classname:?} has no method {methodname:?}"))
        })?;
        Ok(Self::from_method(method, namespace, Some(class.classname()))?)
    }

    pub fn for_parameter<P: ClassProvider + ?Sized>(
        provider: &P,
        namespace: Option<&str>,
        classname: &str,
        methodname: &str,
        parametername: &str,
    ) -> Result<Self> {
        let class = provider.get_class(classname, namespace, false, true)?;
        let method = class.method(methodname).ok_or_else(|| {
            CimError::Lookup(format!("class {classname:?} has no method {methodname:?}"))
        })?;
        let parameter = method.parameter(parametername).ok_or_else(|| {
            CimError::Lookup(format!(
                "method {classname}.{methodname} has no parameter {parametername:?}"
            ))
        })?;
        Ok(Self::from_parameter(parameter, method.name(), namespace, Some(class.classname()))?)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn classname(&self) -> Option<&str> {
        self.classname.as_deref()
    }

    pub fn element(&self) -> &MappedElement {
        &self.element
    }

    /// Integer type of the mapped element.
    pub fn cim_type(&self) -> CimType {
        self.cim_type
    }

    pub fn propname(&self) -> Option<&str> {
        match &self.element {
            MappedElement::Property(name) => Some(name),
            _ => None,
        }
    }

    pub fn methodname(&self) -> Option<&str> {
        match &self.element {
            MappedElement::Method(name) => Some(name),
            MappedElement::Parameter { method, .. } => Some(method),
            MappedElement::Property(_) => None,
        }
    }

    pub fn parametername(&self) -> Option<&str> {
        match &self.element {
            MappedElement::Parameter { parameter, .. } => Some(parameter),
            _ => None,
        }
    }

    /// The `Values` string of an integer element value.
    pub fn to_values(&self, value: &CimValue) -> Result<&str, CimError> {
        let CimValue::Int(int) = value else {
            return Err(CimError::Type(format!(
                "value mappings translate integers, got a {} value",
                value.kind_name()
            )));
        };
        self.to_values_int(int.value())
    }

    /// [`to_values`](Self::to_values) for a plain integer.
    pub fn to_values_int(&self, value: i128) -> Result<&str, CimError> {
        let index = self
            .singles
            .get(&value)
            .copied()
            .or_else(|| {
                self.ranges
                    .iter()
                    .copied()
                    .find(|&i| self.entries[i].0.contains(value))
            })
            .or(self.unclaimed)
            .ok_or_else(|| {
                CimError::Lookup(format!(
                    "element value {value} is outside the set defined by ValueMap of {:?}",
                    self.element
                ))
            })?;
        Ok(&self.entries[index].1)
    }

    /// The value, range or unclaimed marker a `Values` string stands for.
    pub fn to_binary(&self, values_str: &str) -> Result<ValueMapEntry, CimError> {
        self.entries
            .iter()
            .find(|(_, s)| s == values_str)
            .map(|(entry, _)| *entry)
            .ok_or_else(|| {
                CimError::Lookup(format!(
                    "{values_str:?} is not a Values string of {:?}",
                    self.element
                ))
            })
    }

    /// Entries with their `Values` string in declaration order.
    pub fn items(&self) -> impl Iterator<Item = (ValueMapEntry, &str)> + '_ {
        self.entries.iter().map(|(entry, s)| (*entry, s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cim_obj::{CimQualifier, CimReal};

    fn property(cim_type: CimType, valuemap: Option<Vec<&str>>, values: Vec<&str>) -> CimProperty {
        let mut builder = CimProperty::builder("State")
            .cim_type(cim_type)
            .qualifier(CimQualifier::new("Values", values).unwrap());
        if let Some(valuemap) = valuemap {
            builder = builder.qualifier(CimQualifier::new("ValueMap", valuemap).unwrap());
        }
        builder.build().unwrap()
    }

    fn boundary_mapping() -> ValueMapping {
        let prop = property(
            CimType::Uint16,
            Some(vec!["0", "2..4", "..6", "7..", "9", ".."]),
            vec!["zero", "two-four", "five-six", "seven-eight", "nine", "unclaimed"],
        );
        ValueMapping::from_property(&prop, Some("root/cimv2"), Some("CIM_Foo")).unwrap()
    }

    #[test]
    fn resolves_elided_bounds_from_neighbours() {
        let vm = boundary_mapping();
        let items: Vec<_> = vm.items().map(|(entry, _)| entry).collect();
        assert_eq!(
            items,
            vec![
                ValueMapEntry::Single(0),
                ValueMapEntry::Range(2, 4),
                ValueMapEntry::Range(5, 6),
                ValueMapEntry::Range(7, 8),
                ValueMapEntry::Single(9),
                ValueMapEntry::Unclaimed,
            ]
        );
    }

    #[test]
    fn lookup_at_boundaries() {
        let vm = boundary_mapping();
        let expected = [
            (0, "zero"),
            (1, "unclaimed"),
            (2, "two-four"),
            (3, "two-four"),
            (4, "two-four"),
            (5, "five-six"),
            (6, "five-six"),
            (7, "seven-eight"),
            (8, "seven-eight"),
            (9, "nine"),
            (10, "unclaimed"),
            (11, "unclaimed"),
            (255, "unclaimed"),
            (65535, "unclaimed"),
        ];
        for (value, values_str) in expected {
            assert_eq!(vm.to_values_int(value).unwrap(), values_str, "value {value}");
        }
        assert_eq!(vm.to_values(&CimValue::from(5u16)).unwrap(), "five-six");
        assert_eq!(vm.cim_type(), CimType::Uint16);
    }

    #[test]
    fn edge_bounds_use_type_limits() {
        let prop = property(CimType::Sint8, Some(vec!["..-1", "0", "1.."]), vec!["neg", "zero", "pos"]);
        let vm = ValueMapping::from_property(&prop, None, None).unwrap();
        assert_eq!(vm.to_binary("neg").unwrap(), ValueMapEntry::Range(-128, -1));
        assert_eq!(vm.to_binary("pos").unwrap(), ValueMapEntry::Range(1, 127));
        assert_eq!(vm.to_values_int(-128).unwrap(), "neg");
    }

    #[test]
    fn outside_without_unclaimed_fails() {
        let prop = property(CimType::Uint16, Some(vec!["1", "0x10..0x1f"]), vec!["one", "sixteens"]);
        let vm = ValueMapping::from_property(&prop, None, None).unwrap();
        assert_eq!(vm.to_values_int(0x12).unwrap(), "sixteens");
        assert!(matches!(vm.to_values_int(2), Err(CimError::Lookup(_))));
    }

    #[test]
    fn default_mapping_without_valuemap() {
        let prop = property(CimType::Uint16, None, vec!["a", "b", "c"]);
        let vm = ValueMapping::from_property(&prop, None, None).unwrap();
        assert_eq!(vm.to_values_int(2).unwrap(), "c");
        assert_eq!(vm.to_binary("a").unwrap(), ValueMapEntry::Single(0));
        assert!(vm.to_values_int(3).is_err());
    }

    #[test]
    fn reverse_lookup() {
        let vm = boundary_mapping();
        assert_eq!(vm.to_binary("nine").unwrap(), ValueMapEntry::Single(9));
        assert_eq!(vm.to_binary("unclaimed").unwrap(), ValueMapEntry::Unclaimed);
        assert!(matches!(vm.to_binary("Nine"), Err(CimError::Lookup(_))));
    }

    #[test]
    fn rejected_elements() {
        let prop = CimProperty::new("Name", "x").unwrap();
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Type(_))
        ));

        let prop = CimProperty::builder("State").cim_type(CimType::Uint8).build().unwrap();
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Value(_))
        ));

        let prop = property(CimType::Uint8, Some(vec!["0", "1"]), vec!["a"]);
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Value(_))
        ));

        let prop = property(CimType::Uint8, Some(vec!["0", "x"]), vec!["a", "b"]);
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Parse(_))
        ));

        let prop = property(CimType::Uint8, Some(vec!["300"]), vec!["a"]);
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Range { value: 300, .. })
        ));

        let prop = property(CimType::Uint8, Some(vec!["2..", "..5"]), vec!["a", "b"]);
        assert!(matches!(
            ValueMapping::from_property(&prop, None, None),
            Err(CimError::Value(_))
        ));
    }

    #[test]
    fn non_integer_lookup_fails() {
        let vm = boundary_mapping();
        assert!(matches!(
            vm.to_values(&CimValue::Real(CimReal::untyped(1.0))),
            Err(CimError::Type(_))
        ));
    }

    #[test]
    fn identity_accessors() {
        let vm = boundary_mapping();
        assert_eq!(vm.namespace(), Some("root/cimv2"));
        assert_eq!(vm.classname(), Some("CIM_Foo"));
        assert_eq!(vm.propname(), Some("State"));
        assert_eq!(vm.methodname(), None);
        assert_eq!(vm.cim_type(), CimType::Uint8);
        assert_eq!(ValueMapEntry::Range(2, 4).to_string(), "2..4");
    }
}
