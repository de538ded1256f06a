//! Text rendering of atomic values and the `VALUE` family of elements.

use cim_obj::{CimReal, CimType, CimValue, RealKind};

use crate::element::Element;
use crate::entity::{class_element, instance_element};
use crate::path::{class_path_element, instance_path_element};

/// `printf`-style `%.<precision>G` rendering of a finite float.
fn format_g(value: f64, precision: usize) -> String {
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}E{sign}{:02}",
            trim_fraction(mantissa),
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// CIM-XML text of a real number.
///
/// Real32 values use 11 significant digits, Real64 and untyped values 17.
/// The result always has a decimal point; special values are `INF`, `-INF`
/// and `NaN`.
pub fn real_text(real: &CimReal) -> String {
    let value = real.value();
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let precision = match real.kind() {
        Some(RealKind::Real32) => 11,
        Some(RealKind::Real64) | None => 17,
    };
    let text = format_g(value, precision);
    if text.contains('.') {
        return text;
    }
    match text.split_once('E') {
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => format!("{text}.0"),
    }
}

/// CIM-XML text of an atomic value; `None` for references, embedded
/// objects and arrays.
pub fn atomic_text(value: &CimValue) -> Option<String> {
    match value {
        CimValue::Boolean(true) => Some("TRUE".to_string()),
        CimValue::Boolean(false) => Some("FALSE".to_string()),
        CimValue::String(s) => Some(s.clone()),
        CimValue::Char16(c) => Some(c.to_string()),
        CimValue::Int(i) => Some(i.to_string()),
        CimValue::Real(r) => Some(real_text(r)),
        CimValue::DateTime(dt) => Some(dt.to_string()),
        CimValue::Reference(_)
        | CimValue::ClassReference(_)
        | CimValue::Instance(_)
        | CimValue::Class(_)
        | CimValue::Array(_) => None,
    }
}

fn reference_element(value: &CimValue) -> Option<Element> {
    match value {
        CimValue::Reference(path) => Some(
            Element::new("VALUE.REFERENCE").child(instance_path_element(path, false, false)),
        ),
        CimValue::ClassReference(path) => Some(
            Element::new("VALUE.REFERENCE").child(class_path_element(path, false, false)),
        ),
        _ => None,
    }
}

fn scalar_element(value: &CimValue) -> Element {
    if let Some(reference) = reference_element(value) {
        return reference;
    }
    match value {
        CimValue::Instance(inst) => Element::new("VALUE").embedded(instance_element(inst)),
        CimValue::Class(class) => Element::new("VALUE").embedded(class_element(class)),
        other => Element::new("VALUE").text(atomic_text(other).unwrap_or_default()),
    }
}

/// Element for a non-NULL value of the given CIM type: `VALUE`,
/// `VALUE.REFERENCE`, `VALUE.ARRAY` or `VALUE.REFARRAY`.
pub fn value_element(value: &CimValue, cim_type: CimType) -> Element {
    match value {
        CimValue::Array(items) => {
            let wrapper = if cim_type == CimType::Reference {
                "VALUE.REFARRAY"
            } else {
                "VALUE.ARRAY"
            };
            Element::new(wrapper).children_from(items.iter().map(|item| match item {
                Some(v) => scalar_element(v),
                None => Element::new("VALUE.NULL"),
            }))
        }
        scalar => scalar_element(scalar),
    }
}
