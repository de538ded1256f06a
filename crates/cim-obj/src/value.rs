//! The CIM value domain and conversions into it.

use std::cmp::Ordering;
use std::fmt;

use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::class::CimClass;
use crate::classname::CimClassName;
use crate::config::Config;
use crate::datetime::CimDateTime;
use crate::error::{CimError, Result};
use crate::instance::CimInstance;
use crate::instancename::CimInstanceName;
use crate::types::{repr_real, CimInt, CimReal, CimType, RealKind};

/// A non-NULL CIM value. NULL is represented as `None` wherever a value may
/// be absent.
///
/// Array elements may themselves be NULL. Arrays are expected to be
/// homogeneous; constructors that know the element type enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CimValue {
    Boolean(bool),
    String(String),
    Char16(char),
    Int(CimInt),
    Real(CimReal),
    DateTime(CimDateTime),
    /// Instance path held by a reference-typed element.
    Reference(Box<CimInstanceName>),
    /// Class path held by a reference-typed element.
    ClassReference(Box<CimClassName>),
    /// Embedded instance, carried by a string-typed element.
    Instance(Box<CimInstance>),
    /// Embedded class, carried by a string-typed element.
    Class(Box<CimClass>),
    Array(Vec<Option<CimValue>>),
}

impl CimValue {
    pub fn is_array(&self) -> bool {
        matches!(self, CimValue::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CimValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CimValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            CimValue::Int(i) => Some(i.value()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<CimValue>]> {
        match self {
            CimValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance_name(&self) -> Option<&CimInstanceName> {
        match self {
            CimValue::Reference(path) => Some(path),
            _ => None,
        }
    }

    /// Short description of the runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CimValue::Boolean(_) => "boolean",
            CimValue::String(_) => "string",
            CimValue::Char16(_) => "char16",
            CimValue::Int(i) => i.kind().map_or("untyped integer", |k| k.cim_type().name()),
            CimValue::Real(r) => r.kind().map_or("untyped real", |k| k.cim_type().name()),
            CimValue::DateTime(_) => "datetime",
            CimValue::Reference(_) => "instance path",
            CimValue::ClassReference(_) => "class path",
            CimValue::Instance(_) => "embedded instance",
            CimValue::Class(_) => "embedded class",
            CimValue::Array(_) => "array",
        }
    }
}

impl PartialOrd for CimValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self, other) {
            (CimValue::Boolean(a), CimValue::Boolean(b)) => a.partial_cmp(b),
            (CimValue::String(a), CimValue::String(b)) => a.partial_cmp(b),
            (CimValue::Char16(a), CimValue::Char16(b)) => a.partial_cmp(b),
            (CimValue::Int(a), CimValue::Int(b)) => a.partial_cmp(b),
            (CimValue::Real(a), CimValue::Real(b)) => a.partial_cmp(b),
            (CimValue::DateTime(a), CimValue::DateTime(b)) => a.partial_cmp(b),
            (CimValue::Reference(a), CimValue::Reference(b)) => a.partial_cmp(b),
            (CimValue::ClassReference(a), CimValue::ClassReference(b)) => a.partial_cmp(b),
            (CimValue::Array(a), CimValue::Array(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for CimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CimValue::Boolean(b) => write!(f, "{b}"),
            CimValue::String(s) => f.write_str(s),
            CimValue::Char16(c) => write!(f, "{c}"),
            CimValue::Int(i) => write!(f, "{i}"),
            CimValue::Real(r) => f.write_str(&repr_real(r.value())),
            CimValue::DateTime(dt) => write!(f, "{dt}"),
            CimValue::Reference(path) => write!(f, "{path}"),
            CimValue::ClassReference(path) => write!(f, "{path}"),
            CimValue::Instance(inst) => write!(f, "instance of {}", inst.classname()),
            CimValue::Class(class) => write!(f, "class {}", class.classname()),
            CimValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Some(v) => write!(f, "{v}")?,
                        None => f.write_str("NULL")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for CimValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from!(
    bool => |v| CimValue::Boolean(v),
    String => |v| CimValue::String(v),
    &str => |v| CimValue::String(v.to_string()),
    char => |v| CimValue::Char16(v),
    u8 => |v| CimValue::Int(v.into()),
    i8 => |v| CimValue::Int(v.into()),
    u16 => |v| CimValue::Int(v.into()),
    i16 => |v| CimValue::Int(v.into()),
    u32 => |v| CimValue::Int(v.into()),
    i32 => |v| CimValue::Int(v.into()),
    u64 => |v| CimValue::Int(v.into()),
    i64 => |v| CimValue::Int(v.into()),
    f32 => |v| CimValue::Real(v.into()),
    f64 => |v| CimValue::Real(v.into()),
    CimInt => |v| CimValue::Int(v),
    CimReal => |v| CimValue::Real(v),
    CimDateTime => |v| CimValue::DateTime(v),
    CimInstanceName => |v| CimValue::Reference(Box::new(v)),
    CimClassName => |v| CimValue::ClassReference(Box::new(v)),
    CimInstance => |v| CimValue::Instance(Box::new(v)),
    CimClass => |v| CimValue::Class(Box::new(v)),
);

impl<T: Into<CimValue>> From<Vec<T>> for CimValue {
    fn from(items: Vec<T>) -> Self {
        CimValue::Array(items.into_iter().map(|v| Some(v.into())).collect())
    }
}

impl TryFrom<OffsetDateTime> for CimValue {
    type Error = CimError;

    fn try_from(dt: OffsetDateTime) -> Result<Self> {
        CimDateTime::from_datetime(dt).map(CimValue::DateTime)
    }
}

impl TryFrom<Duration> for CimValue {
    type Error = CimError;

    fn try_from(delta: Duration) -> Result<Self> {
        CimDateTime::from_timedelta(delta).map(CimValue::DateTime)
    }
}

/// CIM type of a value.
///
/// Arrays report the type of their first element. Untyped numbers, empty
/// arrays and arrays starting with NULL have no inferable type.
pub fn cimtype(value: &CimValue) -> Result<CimType> {
    match value {
        CimValue::Boolean(_) => Ok(CimType::Boolean),
        CimValue::String(_) | CimValue::Instance(_) | CimValue::Class(_) => Ok(CimType::String),
        CimValue::Char16(_) => Ok(CimType::Char16),
        CimValue::DateTime(_) => Ok(CimType::DateTime),
        CimValue::Reference(_) | CimValue::ClassReference(_) => Ok(CimType::Reference),
        CimValue::Int(i) => i.cim_type().ok_or_else(|| {
            CimError::type_mismatch(format!(
                "cannot infer the CIM type of untyped integer {i}"
            ))
        }),
        CimValue::Real(r) => r.cim_type().ok_or_else(|| {
            CimError::type_mismatch(format!("cannot infer the CIM type of untyped real {r}"))
        }),
        CimValue::Array(items) => match items.first() {
            None => Err(CimError::value(
                "cannot infer the CIM type of an empty array",
            )),
            Some(None) => Err(CimError::type_mismatch(
                "cannot infer the CIM type of an array whose first element is NULL",
            )),
            Some(Some(first)) => cimtype(first),
        },
    }
}

/// Convert `value` to the canonical representation of `ty` using the
/// default configuration.
pub fn cimvalue(value: Option<CimValue>, ty: CimType) -> Result<Option<CimValue>> {
    cimvalue_with(value, ty, &Config::default())
}

/// Convert `value` to the canonical representation of `ty`.
///
/// Accepted inputs per type:
///
/// * `boolean`: booleans, and the strings `"true"`/`"false"` in any case
/// * `string`: strings, embedded instances and classes
/// * `char16`: characters, and one-character strings
/// * `datetime`: datetimes, and strings in CIM datetime format
/// * `reference`: instance or class paths, and strings holding a WBEM URI
/// * integer types: integers (range-checked against the target width) and
///   decimal strings
/// * real types: reals, integers and decimal strings
///
/// Arrays are converted element by element; NULL stays NULL.
pub fn cimvalue_with(
    value: Option<CimValue>,
    ty: CimType,
    config: &Config,
) -> Result<Option<CimValue>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        CimValue::Array(items) => {
            let converted = items
                .into_iter()
                .map(|item| match item {
                    Some(CimValue::Array(_)) => Err(CimError::type_mismatch(
                        "nested arrays are not supported as CIM values",
                    )),
                    other => cimvalue_with(other, ty, config),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(CimValue::Array(converted)))
        }
        scalar => convert_scalar(scalar, ty, config).map(Some),
    }
}

fn mismatch(value: &CimValue, ty: CimType) -> CimError {
    CimError::type_mismatch(format!(
        "{} value {value:?} cannot be converted to CIM type {ty}",
        value.kind_name()
    ))
}

fn convert_scalar(value: CimValue, ty: CimType, config: &Config) -> Result<CimValue> {
    if let Some(kind) = ty.int_kind() {
        let int = match &value {
            CimValue::Int(i) => i.value(),
            CimValue::String(s) => s.trim().parse::<i128>().map_err(|_| {
                CimError::value(format!("string {s:?} is not a decimal integer"))
            })?,
            _ => return Err(mismatch(&value, ty)),
        };
        return CimInt::new(kind, int, config).map(CimValue::Int);
    }
    if let Some(kind) = ty.real_kind() {
        let real = match &value {
            CimValue::Real(r) => r.value(),
            CimValue::Int(i) => i.value() as f64,
            CimValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| CimError::value(format!("string {s:?} is not a real number")))?,
            _ => return Err(mismatch(&value, ty)),
        };
        let real = match kind {
            RealKind::Real32 => real as f32 as f64,
            RealKind::Real64 => real,
        };
        return Ok(CimValue::Real(CimReal::new(kind, real)));
    }
    match ty {
        CimType::Boolean => match value {
            CimValue::Boolean(_) => Ok(value),
            CimValue::String(ref s) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(CimValue::Boolean(true)),
                "false" => Ok(CimValue::Boolean(false)),
                _ => Err(CimError::value(format!(
                    "string {s:?} is not a CIM boolean"
                ))),
            },
            _ => Err(mismatch(&value, ty)),
        },
        CimType::String => match value {
            CimValue::String(_) | CimValue::Instance(_) | CimValue::Class(_) => Ok(value),
            _ => Err(mismatch(&value, ty)),
        },
        CimType::Char16 => match value {
            CimValue::Char16(_) => Ok(value),
            CimValue::String(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(CimValue::Char16(c)),
                    _ => Err(CimError::value(format!(
                        "string {s:?} does not hold exactly one character"
                    ))),
                }
            }
            _ => Err(mismatch(&value, ty)),
        },
        CimType::DateTime => match value {
            CimValue::DateTime(_) => Ok(value),
            CimValue::String(ref s) => CimDateTime::parse(s).map(CimValue::DateTime),
            _ => Err(mismatch(&value, ty)),
        },
        CimType::Reference => match value {
            CimValue::Reference(_) | CimValue::ClassReference(_) => Ok(value),
            CimValue::String(ref s) => {
                debug!(uri = %s, "converting string to reference");
                CimInstanceName::from_wbem_uri(s).map(CimValue::from)
            }
            _ => Err(mismatch(&value, ty)),
        },
        _ => Err(mismatch(&value, ty)),
    }
}
