//! CIM data type names and the numeric value types.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::config::Config;
use crate::error::{CimError, Result};

/// CIM data types as named by DSP0004.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CimType {
    Boolean,
    String,
    Char16,
    DateTime,
    Reference,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
    Real32,
    Real64,
}

impl CimType {
    /// Every CIM data type, in DSP0004 listing order.
    pub const ALL: [CimType; 15] = [
        CimType::Boolean,
        CimType::String,
        CimType::Char16,
        CimType::DateTime,
        CimType::Reference,
        CimType::Uint8,
        CimType::Sint8,
        CimType::Uint16,
        CimType::Sint16,
        CimType::Uint32,
        CimType::Sint32,
        CimType::Uint64,
        CimType::Sint64,
        CimType::Real32,
        CimType::Real64,
    ];

    /// Type name as used in CIM-XML `TYPE` attributes and MOF.
    pub const fn name(self) -> &'static str {
        match self {
            CimType::Boolean => "boolean",
            CimType::String => "string",
            CimType::Char16 => "char16",
            CimType::DateTime => "datetime",
            CimType::Reference => "reference",
            CimType::Uint8 => "uint8",
            CimType::Sint8 => "sint8",
            CimType::Uint16 => "uint16",
            CimType::Sint16 => "sint16",
            CimType::Uint32 => "uint32",
            CimType::Sint32 => "sint32",
            CimType::Uint64 => "uint64",
            CimType::Sint64 => "sint64",
            CimType::Real32 => "real32",
            CimType::Real64 => "real64",
        }
    }

    /// Resolve a CIM type name.
    pub fn from_name(name: &str) -> Result<Self> {
        CimType::ALL
            .iter()
            .copied()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| CimError::value(format!("unknown CIM type name: {name:?}")))
    }

    /// Sized integer kind for integer types.
    pub const fn int_kind(self) -> Option<IntKind> {
        match self {
            CimType::Uint8 => Some(IntKind::Uint8),
            CimType::Sint8 => Some(IntKind::Sint8),
            CimType::Uint16 => Some(IntKind::Uint16),
            CimType::Sint16 => Some(IntKind::Sint16),
            CimType::Uint32 => Some(IntKind::Uint32),
            CimType::Sint32 => Some(IntKind::Sint32),
            CimType::Uint64 => Some(IntKind::Uint64),
            CimType::Sint64 => Some(IntKind::Sint64),
            _ => None,
        }
    }

    /// Float width for real types.
    pub const fn real_kind(self) -> Option<RealKind> {
        match self {
            CimType::Real32 => Some(RealKind::Real32),
            CimType::Real64 => Some(RealKind::Real64),
            _ => None,
        }
    }

    pub const fn is_integer(self) -> bool {
        self.int_kind().is_some()
    }

    pub const fn is_real(self) -> bool {
        self.real_kind().is_some()
    }
}

impl fmt::Display for CimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CimType {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        CimType::from_name(s)
    }
}

/// Width and signedness of a sized CIM integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
}

impl IntKind {
    /// Smallest representable value.
    pub const fn min(self) -> i128 {
        match self {
            IntKind::Uint8 | IntKind::Uint16 | IntKind::Uint32 | IntKind::Uint64 => 0,
            IntKind::Sint8 => i8::MIN as i128,
            IntKind::Sint16 => i16::MIN as i128,
            IntKind::Sint32 => i32::MIN as i128,
            IntKind::Sint64 => i64::MIN as i128,
        }
    }

    /// Largest representable value.
    pub const fn max(self) -> i128 {
        match self {
            IntKind::Uint8 => u8::MAX as i128,
            IntKind::Sint8 => i8::MAX as i128,
            IntKind::Uint16 => u16::MAX as i128,
            IntKind::Sint16 => i16::MAX as i128,
            IntKind::Uint32 => u32::MAX as i128,
            IntKind::Sint32 => i32::MAX as i128,
            IntKind::Uint64 => u64::MAX as i128,
            IntKind::Sint64 => i64::MAX as i128,
        }
    }

    pub const fn cim_type(self) -> CimType {
        match self {
            IntKind::Uint8 => CimType::Uint8,
            IntKind::Sint8 => CimType::Sint8,
            IntKind::Uint16 => CimType::Uint16,
            IntKind::Sint16 => CimType::Sint16,
            IntKind::Uint32 => CimType::Uint32,
            IntKind::Sint32 => CimType::Sint32,
            IntKind::Uint64 => CimType::Uint64,
            IntKind::Sint64 => CimType::Sint64,
        }
    }

    /// Whether `value` lies within `[min, max]`.
    pub const fn contains(self, value: i128) -> bool {
        value >= self.min() && value <= self.max()
    }
}

impl fmt::Display for IntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cim_type().name())
    }
}

/// Width of a CIM real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealKind {
    Real32,
    Real64,
}

impl RealKind {
    pub const fn cim_type(self) -> CimType {
        match self {
            RealKind::Real32 => CimType::Real32,
            RealKind::Real64 => CimType::Real64,
        }
    }
}

/// Integer value, either sized or untyped.
///
/// Untyped integers come from sources that carry no CIM type, such as the
/// keybindings of a parsed WBEM URI. Equality, hashing and ordering look at
/// the numeric value only, so `Uint8(5) == Sint32(5)`.
#[derive(Debug, Clone, Copy)]
pub struct CimInt {
    value: i128,
    kind: Option<IntKind>,
}

impl CimInt {
    /// Create a sized integer, enforcing its range unless disabled in `config`.
    pub fn new(kind: IntKind, value: i128, config: &Config) -> Result<Self> {
        if config.enforce_integer_range && !kind.contains(value) {
            return Err(CimError::Range {
                kind,
                value,
                min: kind.min(),
                max: kind.max(),
            });
        }
        Ok(CimInt {
            value,
            kind: Some(kind),
        })
    }

    /// Create a sized integer with range enforcement.
    pub fn checked(kind: IntKind, value: i128) -> Result<Self> {
        CimInt::new(kind, value, &Config::default())
    }

    /// Create an integer without a CIM type.
    pub const fn untyped(value: i128) -> Self {
        CimInt { value, kind: None }
    }

    pub const fn value(&self) -> i128 {
        self.value
    }

    pub const fn kind(&self) -> Option<IntKind> {
        self.kind
    }

    pub fn cim_type(&self) -> Option<CimType> {
        self.kind.map(IntKind::cim_type)
    }
}

impl PartialEq for CimInt {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for CimInt {}

impl Hash for CimInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for CimInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CimInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for CimInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

macro_rules! sized_int_from {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$ty> for CimInt {
                fn from(value: $ty) -> Self {
                    CimInt {
                        value: value as i128,
                        kind: Some(IntKind::$kind),
                    }
                }
            }
        )*
    };
}

sized_int_from!(
    u8 => Uint8,
    i8 => Sint8,
    u16 => Uint16,
    i16 => Sint16,
    u32 => Uint32,
    i32 => Sint32,
    u64 => Uint64,
    i64 => Sint64,
);

/// Floating point value, either sized or untyped.
///
/// Values are held as `f64` for both widths. Comparison treats `0.0` and
/// `-0.0` as equal and every NaN as equal to every other NaN so that equal
/// values hash alike.
#[derive(Debug, Clone, Copy)]
pub struct CimReal {
    value: f64,
    kind: Option<RealKind>,
}

impl CimReal {
    pub const fn new(kind: RealKind, value: f64) -> Self {
        CimReal {
            value,
            kind: Some(kind),
        }
    }

    pub const fn untyped(value: f64) -> Self {
        CimReal { value, kind: None }
    }

    pub const fn value(&self) -> f64 {
        self.value
    }

    pub const fn kind(&self) -> Option<RealKind> {
        self.kind
    }

    pub fn cim_type(&self) -> Option<CimType> {
        self.kind.map(RealKind::cim_type)
    }

    fn key(&self) -> u64 {
        if self.value == 0.0 {
            0
        } else if self.value.is_nan() {
            f64::NAN.to_bits()
        } else {
            self.value.to_bits()
        }
    }
}

impl PartialEq for CimReal {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CimReal {}

impl Hash for CimReal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for CimReal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for CimReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr_real(self.value))
    }
}

impl From<f32> for CimReal {
    fn from(value: f32) -> Self {
        CimReal::new(RealKind::Real32, value as f64)
    }
}

impl From<f64> for CimReal {
    fn from(value: f64) -> Self {
        CimReal::new(RealKind::Real64, value)
    }
}

/// Shortest round-trip text of a float, in the notation used by WBEM URIs
/// and MOF: fixed notation for decimal exponents in `[-4, 16)`, otherwise
/// `<mantissa>e<sign><2+ digit exponent>`. Integral values keep a `.0`.
pub fn repr_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let sci = format!("{value:e}");
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let fixed = format!("{value}");
        if fixed.contains('.') {
            fixed
        } else {
            format!("{fixed}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Kind of object held by an embedded-object property or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddedObject {
    /// Only embedded instances.
    Instance,
    /// Embedded instances or classes.
    Object,
}

impl EmbeddedObject {
    pub const fn name(self) -> &'static str {
        match self {
            EmbeddedObject::Instance => "instance",
            EmbeddedObject::Object => "object",
        }
    }
}

impl fmt::Display for EmbeddedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmbeddedObject {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "instance" => Ok(EmbeddedObject::Instance),
            "object" => Ok(EmbeddedObject::Object),
            _ => Err(CimError::value(format!(
                "invalid embedded_object value: {s:?}"
            ))),
        }
    }
}
