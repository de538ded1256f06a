//! WBEM URI parsing and rendering for instance and class paths.
//!
//! The accepted grammar is the untyped DSP0207 form
//! `[scheme:][//authority]/[namespace]:classname[.key=value,...]` with a few
//! tolerances kept for compatibility with URIs produced by older clients:
//!
//! * the leading `/` may be omitted when nothing precedes it,
//! * the `namespace:` part may be omitted entirely when the class name is
//!   the first thing in the URI,
//! * unknown schemes are accepted with a warning,
//! * unquoted datetime keybinding values are accepted with a warning.
//!
//! Keybinding values carry no type information. Double-quoted values are
//! tried as an instance path (if it has keybindings), then as a datetime,
//! then taken as a string. Integers and reals come back untyped; `inf`,
//! `-inf` and `nan` are reals. An unquoted `NULL` is a NULL value and is
//! only accepted when the configuration tolerates NULL keybindings.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::classname::CimClassName;
use crate::config::Config;
use crate::datetime::CimDateTime;
use crate::error::{CimError, Result};
use crate::instancename::{CimInstanceName, KeyBindings};
use crate::types::{repr_real, CimInt, CimReal};
use crate::value::CimValue;

const KNOWN_SCHEMES: [&str; 4] = ["http", "https", "cimxml-wbem", "cimxml-wbems"];

/// Output format of a WBEM URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UriFormat {
    /// DSP0207 form, `[//host]/[namespace]:classname[.keybindings]`.
    #[default]
    Standard,
    /// Standard form with host, namespace, class name and keybinding names
    /// lower-cased and keybindings sorted by name. Suitable as a map key.
    Canonical,
    /// Standard form without host and leading slash, as used in the
    /// `CIMObject` HTTP header.
    CimObject,
    /// Legacy form that leaves out the separators of absent components.
    Historical,
}

impl UriFormat {
    pub const fn name(self) -> &'static str {
        match self {
            UriFormat::Standard => "standard",
            UriFormat::Canonical => "canonical",
            UriFormat::CimObject => "cimobject",
            UriFormat::Historical => "historical",
        }
    }
}

impl fmt::Display for UriFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UriFormat {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(UriFormat::Standard),
            "canonical" => Ok(UriFormat::Canonical),
            "cimobject" => Ok(UriFormat::CimObject),
            "historical" => Ok(UriFormat::Historical),
            _ => Err(CimError::value(format!("invalid WBEM URI format: {s:?}"))),
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_host_char(c: char) -> bool {
    is_word(c) || matches!(c, '.' | ':' | '@' | '[' | ']' | '-')
}

/// End index of the run of characters matching `pred` starting at `from`.
fn scan(s: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    s[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| from + i)
}

/// Components of a URI before keybinding interpretation.
struct RawPath<'a> {
    host: Option<&'a str>,
    namespace: Option<&'a str>,
    classname: &'a str,
    keybindings: Option<&'a str>,
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Match everything after an optional scheme, starting at byte `start`.
fn split_path(uri: &str, start: usize) -> Option<RawPath<'_>> {
    let mut pos = start;
    let mut host = None;
    if uri[pos..].starts_with("//") {
        let host_end = scan(uri, pos + 2, is_host_char);
        host = non_empty(&uri[pos + 2..host_end]);
        pos = host_end;
    }

    if uri[pos..].starts_with('/') {
        pos += 1;
    } else if pos != 0 {
        return None;
    }
    if uri[pos..].starts_with('/') {
        return None;
    }

    let ns_end = scan(uri, pos, |c| is_word(c) || c == '/');
    let (namespace, class_start) = if uri[ns_end..].starts_with(':') {
        (non_empty(&uri[pos..ns_end]), ns_end + 1)
    } else if pos == 0 {
        (None, 0)
    } else {
        return None;
    };

    let class_end = scan(uri, class_start, is_word);
    let classname = &uri[class_start..class_end];
    let rest = &uri[class_end..];
    let keybindings = if rest.is_empty() {
        None
    } else if let Some(kbs) = rest.strip_prefix('.') {
        Some(kbs)
    } else {
        return None;
    };

    Some(RawPath {
        host,
        namespace,
        classname,
        keybindings,
    })
}

fn split_uri(uri: &str) -> Result<RawPath<'_>> {
    let scheme_end = scan(uri, 0, |c| is_word(c) || c == '-');
    if scheme_end > 0 && uri[scheme_end..].starts_with(':') {
        if let Some(raw) = split_path(uri, scheme_end + 1) {
            let scheme = &uri[..scheme_end];
            if !KNOWN_SCHEMES
                .iter()
                .any(|known| known.eq_ignore_ascii_case(scheme))
            {
                warn!(
                    target: "cim_obj::uri",
                    uri = %uri,
                    scheme = %scheme,
                    "unsupported scheme in WBEM URI, ignored"
                );
            }
            return Ok(raw);
        }
    }
    split_path(uri, 0).ok_or_else(|| CimError::parse(format!("invalid WBEM URI: {uri:?}")))
}

fn require_classname<'a>(raw: &RawPath<'a>, uri: &str) -> Result<&'a str> {
    if raw.classname.is_empty() {
        return Err(CimError::parse(format!(
            "class name missing in WBEM URI: {uri:?}"
        )));
    }
    Ok(raw.classname)
}

pub(crate) fn parse_class_path(uri: &str) -> Result<CimClassName> {
    let raw = split_uri(uri)?;
    let classname = require_classname(&raw, uri)?;
    if raw.keybindings.is_some() {
        return Err(CimError::parse(format!(
            "class path WBEM URI must not have keybindings: {uri:?}"
        )));
    }
    let mut path = CimClassName::new(classname);
    path.set_namespace(raw.namespace.map(str::to_string));
    path.set_host(raw.host.map(str::to_string));
    Ok(path)
}

pub(crate) fn parse_instance_path(uri: &str, config: &Config) -> Result<CimInstanceName> {
    let raw = split_uri(uri)?;
    let classname = require_classname(&raw, uri)?;
    let mut path = CimInstanceName::new(classname);
    path.set_namespace(raw.namespace.map(str::to_string));
    path.set_host(raw.host.map(str::to_string));
    if let Some(kbs) = raw.keybindings {
        path.set_keybindings(parse_keybindings(kbs, uri, config)?, config)?;
    }
    Ok(path)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        self.pos = scan(self.text, start, pred);
        &self.text[start..self.pos]
    }

    /// Read up to the closing `quote`; the opening one is already consumed.
    /// A backslash takes the next character literally.
    fn quoted(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.bump()? {
                '\\' => out.push(self.bump()?),
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }
}

fn parse_keybindings(text: &str, uri: &str, config: &Config) -> Result<KeyBindings> {
    let invalid = |what: &str| CimError::parse(format!("{what} in WBEM URI {uri:?}"));
    let mut keybindings = KeyBindings::new();
    let mut cursor = Cursor { text, pos: 0 };
    loop {
        let name = cursor.take_while(is_word);
        if name.is_empty() {
            return Err(invalid("missing keybinding name"));
        }
        if cursor.bump() != Some('=') {
            return Err(invalid("missing '=' after keybinding name"));
        }
        let value = match cursor.peek() {
            Some('"') => {
                cursor.bump();
                let text = cursor
                    .quoted('"')
                    .ok_or_else(|| invalid("unterminated double-quoted keybinding value"))?;
                Some(double_quoted_value(text, config))
            }
            Some('\'') => {
                cursor.bump();
                let text = cursor
                    .quoted('\'')
                    .ok_or_else(|| invalid("unterminated single-quoted keybinding value"))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(CimValue::Char16(c)),
                    _ => return Err(invalid("single-quoted keybinding value is not one character")),
                }
            }
            _ => {
                let text = cursor.take_while(|c| c != ',');
                if text == "NULL" {
                    if !config.ignore_null_key_value {
                        return Err(invalid(&format!("NULL value of keybinding {name:?}")));
                    }
                    None
                } else {
                    Some(unquoted_value(text, uri)?)
                }
            }
        };
        if keybindings.contains_key(name) {
            return Err(invalid(&format!("duplicate keybinding {name:?}")));
        }
        keybindings.insert(name, value);
        match cursor.bump() {
            None => return Ok(keybindings),
            Some(',') => {}
            Some(_) => return Err(invalid("unexpected character after keybinding value")),
        }
    }
}

fn double_quoted_value(text: String, config: &Config) -> CimValue {
    if let Ok(path) = parse_instance_path(&text, config) {
        if !path.keybindings().is_empty() {
            debug!(value = %text, "keybinding value interpreted as instance path");
            return CimValue::Reference(Box::new(path));
        }
    }
    if let Ok(dt) = CimDateTime::parse(&text) {
        return CimValue::DateTime(dt);
    }
    CimValue::String(text)
}

fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_real_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |t: &str| t.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = all_digits(int_part)
        && frac_part.map_or(true, all_digits)
        && (!int_part.is_empty() || frac_part.map_or(false, |f| !f.is_empty()));
    let exponent_ok = exponent.map_or(true, is_int_literal);
    mantissa_ok && exponent_ok
}

fn unquoted_value(text: &str, uri: &str) -> Result<CimValue> {
    if text.eq_ignore_ascii_case("true") {
        return Ok(CimValue::Boolean(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(CimValue::Boolean(false));
    }
    if is_int_literal(text) {
        if let Ok(v) = text.parse::<i128>() {
            return Ok(CimValue::Int(CimInt::untyped(v)));
        }
    }
    if is_real_literal(text) {
        if let Ok(v) = text.parse::<f64>() {
            return Ok(CimValue::Real(CimReal::untyped(v)));
        }
    }
    let special = match text {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    };
    if let Some(v) = special {
        return Ok(CimValue::Real(CimReal::untyped(v)));
    }
    if let Ok(dt) = CimDateTime::parse(text) {
        warn!(
            target: "cim_obj::uri",
            uri = %uri,
            value = %text,
            "unquoted datetime keybinding value in WBEM URI"
        );
        return Ok(CimValue::DateTime(dt));
    }
    Err(CimError::parse(format!(
        "invalid unquoted keybinding value {text:?} in WBEM URI {uri:?}"
    )))
}

fn fold(s: &str, format: UriFormat) -> String {
    match format {
        UriFormat::Canonical => s.to_lowercase(),
        _ => s.to_string(),
    }
}

fn write_prefix(out: &mut String, host: Option<&str>, namespace: Option<&str>, format: UriFormat) {
    match format {
        UriFormat::Standard | UriFormat::Canonical => {
            if let Some(host) = host {
                out.push_str("//");
                out.push_str(&fold(host, format));
            }
            out.push('/');
            if let Some(ns) = namespace {
                out.push_str(&fold(ns, format));
            }
            out.push(':');
        }
        UriFormat::CimObject => {
            if let Some(ns) = namespace {
                out.push_str(ns);
            }
            out.push(':');
        }
        UriFormat::Historical => {
            if let Some(host) = host {
                out.push_str("//");
                out.push_str(host);
                out.push('/');
            }
            if let Some(ns) = namespace {
                out.push_str(ns);
                out.push(':');
            }
        }
    }
}

fn push_escaped(out: &mut String, text: &str, quote: char) {
    out.push(quote);
    for c in text.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
}

fn write_keybinding_value(out: &mut String, value: Option<&CimValue>, format: UriFormat) {
    let Some(value) = value else {
        out.push_str("NULL");
        return;
    };
    match value {
        CimValue::String(s) => push_escaped(out, s, '"'),
        CimValue::Char16(c) => push_escaped(out, c.encode_utf8(&mut [0; 4]), '\''),
        CimValue::Boolean(true) => out.push_str("TRUE"),
        CimValue::Boolean(false) => out.push_str("FALSE"),
        CimValue::Int(i) => out.push_str(&i.to_string()),
        CimValue::Real(r) => out.push_str(&repr_real(r.value())),
        CimValue::DateTime(dt) => push_escaped(out, &dt.to_string(), '"'),
        CimValue::Reference(path) => push_escaped(out, &format_instance_path(path, format), '"'),
        CimValue::ClassReference(path) => push_escaped(out, &format_class_path(path, format), '"'),
        other => push_escaped(out, &other.to_string(), '"'),
    }
}

pub(crate) fn format_class_path(path: &CimClassName, format: UriFormat) -> String {
    let mut out = String::new();
    write_prefix(&mut out, path.host(), path.namespace(), format);
    out.push_str(&fold(path.classname(), format));
    out
}

pub(crate) fn format_instance_path(path: &CimInstanceName, format: UriFormat) -> String {
    let mut out = String::new();
    write_prefix(&mut out, path.host(), path.namespace(), format);
    out.push_str(&fold(path.classname(), format));

    let items: Vec<(String, Option<&CimValue>)> = match format {
        UriFormat::Canonical => path
            .keybindings()
            .sorted_by_folded_key()
            .into_iter()
            .map(|(folded, _, v)| (folded, v.as_ref()))
            .collect(),
        _ => path
            .keybindings()
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_ref()))
            .collect(),
    };
    for (i, (name, value)) in items.into_iter().enumerate() {
        out.push(if i == 0 { '.' } else { ',' });
        out.push_str(&name);
        out.push('=');
        write_keybinding_value(&mut out, value, format);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::cimtype;

    fn inst(uri: &str) -> CimInstanceName {
        CimInstanceName::from_wbem_uri(uri).unwrap()
    }

    #[test]
    fn parses_full_instance_uri() {
        let path = inst(r#"https://10.11.12.13:5989/root/cimv2:CIM_Foo.k1="v1",k2=42"#);
        assert_eq!(path.host(), Some("10.11.12.13:5989"));
        assert_eq!(path.namespace(), Some("root/cimv2"));
        assert_eq!(path.classname(), "CIM_Foo");
        assert_eq!(path.keybinding("k1"), Some(&CimValue::from("v1")));
        assert_eq!(path.keybinding("K2").and_then(CimValue::as_int), Some(42));
    }

    #[test]
    fn parsing_tolerances() {
        let no_slash = inst("root/cimv2:CIM_Foo.k=1");
        assert_eq!(no_slash.namespace(), Some("root/cimv2"));

        let class_first = inst("CIM_Foo.k=1");
        assert_eq!(class_first.namespace(), None);
        assert_eq!(class_first.classname(), "CIM_Foo");

        let empty_ns = inst("/:CIM_Foo");
        assert_eq!(empty_ns.namespace(), None);
        assert!(empty_ns.keybindings().is_empty());

        let odd_scheme = inst("foo://server/root:CIM_Foo.k=1");
        assert_eq!(odd_scheme.host(), Some("server"));

        let scheme_lookalike = inst("http:CIM_Foo");
        assert_eq!(scheme_lookalike.namespace(), Some("http"));
        assert_eq!(scheme_lookalike.classname(), "CIM_Foo");
    }

    #[test]
    fn rejects_malformed_uris() {
        for bad in [
            "",
            "/CIM_Foo",
            "//server/:",
            "/root:CIM_Foo.",
            "/root:CIM_Foo.k",
            "/root:CIM_Foo.k=1,",
            "/root:CIM_Foo.k=1,k=2",
            r#"/root:CIM_Foo.k="open"#,
            "/root:CIM_Foo.k='ab'",
            "/root:CIM_Foo.k=abc",
            "//server//root:CIM_Foo",
        ] {
            assert!(
                matches!(CimInstanceName::from_wbem_uri(bad), Err(CimError::Parse(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn keybinding_value_interpretation() {
        let path = inst(concat!(
            r#"/:C.s="a \"q\" \\ b",c='x',b=TRUE,i=-3,r=1.5e3,"#,
            r#"d="20140924193040.654321+120",u=20140924193040.654321+120,"#,
            r#"ref="/root:CIM_Bar.id=\"x\"",plain="CIM_Bar""#
        ));
        assert_eq!(path.keybinding("s"), Some(&CimValue::from(r#"a "q" \ b"#)));
        assert_eq!(path.keybinding("c"), Some(&CimValue::Char16('x')));
        assert_eq!(path.keybinding("b"), Some(&CimValue::Boolean(true)));
        assert_eq!(path.keybinding("i").and_then(CimValue::as_int), Some(-3));
        assert_eq!(
            path.keybinding("r"),
            Some(&CimValue::Real(CimReal::untyped(1500.0)))
        );
        assert!(matches!(path.keybinding("d"), Some(CimValue::DateTime(_))));
        assert!(matches!(path.keybinding("u"), Some(CimValue::DateTime(_))));
        let nested = path.keybinding("ref").and_then(CimValue::as_instance_name).unwrap();
        assert_eq!(nested.classname(), "CIM_Bar");
        assert_eq!(nested.keybinding("id"), Some(&CimValue::from("x")));
        assert_eq!(path.keybinding("plain"), Some(&CimValue::from("CIM_Bar")));
    }

    #[test]
    fn untyped_numbers_have_no_cim_type() {
        let path = inst("/:C.i=3");
        let value = path.keybinding("i").unwrap();
        assert!(matches!(cimtype(value), Err(CimError::Type(_))));
        assert_eq!(value, &CimValue::from(3u8));
    }

    #[test]
    fn class_paths() {
        let cn = CimClassName::from_wbem_uri("//server:5988/root/cimv2:CIM_Foo").unwrap();
        assert_eq!(cn.host(), Some("server:5988"));
        assert_eq!(cn.namespace(), Some("root/cimv2"));
        assert!(matches!(
            CimClassName::from_wbem_uri("/root:CIM_Foo.k=1"),
            Err(CimError::Parse(_))
        ));
    }

    fn sample() -> CimInstanceName {
        CimInstanceName::builder("CIM_Foo")
            .keybinding("Name", "a\"b")
            .keybinding("Id", 7u32)
            .keybinding("Flag", false)
            .keybinding("Ch", '\'')
            .namespace("root/cimv2")
            .host("Server")
            .build()
            .unwrap()
    }

    #[test]
    fn renders_all_formats() {
        let path = sample();
        assert_eq!(
            path.to_wbem_uri(UriFormat::Standard),
            r#"//Server/root/cimv2:CIM_Foo.Name="a\"b",Id=7,Flag=FALSE,Ch='\''"#
        );
        assert_eq!(
            path.to_wbem_uri(UriFormat::Canonical),
            r#"//server/root/cimv2:cim_foo.ch='\'',flag=FALSE,id=7,name="a\"b""#
        );
        assert_eq!(
            path.to_wbem_uri(UriFormat::CimObject),
            r#"root/cimv2:CIM_Foo.Name="a\"b",Id=7,Flag=FALSE,Ch='\''"#
        );
        assert_eq!(
            path.to_wbem_uri(UriFormat::Historical),
            r#"//Server/root/cimv2:CIM_Foo.Name="a\"b",Id=7,Flag=FALSE,Ch='\''"#
        );

        let bare = CimInstanceName::new("CIM_Foo");
        assert_eq!(bare.to_wbem_uri(UriFormat::Standard), "/:CIM_Foo");
        assert_eq!(bare.to_wbem_uri(UriFormat::CimObject), ":CIM_Foo");
        assert_eq!(bare.to_wbem_uri(UriFormat::Historical), "CIM_Foo");
    }

    #[test]
    fn standard_round_trip_for_all_component_combinations() {
        for host in [None, Some("server:5988")] {
            for namespace in [None, Some("root/cimv2")] {
                let mut path = sample();
                path.set_host(host.map(str::to_string));
                path.set_namespace(namespace.map(str::to_string));
                let reparsed = inst(&path.to_wbem_uri(UriFormat::Standard));
                assert_eq!(reparsed, path);

                let mut cn = CimClassName::new("CIM_Foo");
                cn.set_host(host.map(str::to_string));
                cn.set_namespace(namespace.map(str::to_string));
                let uri = cn.to_wbem_uri(UriFormat::Standard);
                assert_eq!(CimClassName::from_wbem_uri(&uri).unwrap(), cn);
            }
        }
    }

    #[test]
    fn nested_reference_round_trip() {
        let inner = CimInstanceName::builder("CIM_Bar")
            .keybinding("Id", "x,y")
            .namespace("root")
            .build()
            .unwrap();
        let outer = CimInstanceName::builder("CIM_Assoc")
            .keybinding("Ref", inner)
            .keybinding("Real", 2.5f64)
            .build()
            .unwrap();
        let uri = outer.to_wbem_uri(UriFormat::Standard);
        assert_eq!(inst(&uri), outer);
    }

    #[test]
    fn canonical_ignores_order_and_case() {
        let a = CimInstanceName::builder("CIM_Foo")
            .keybinding("A", "x")
            .keybinding("b", 1u8)
            .namespace("Root")
            .build()
            .unwrap();
        let b = CimInstanceName::builder("cim_FOO")
            .keybinding("B", 1u8)
            .keybinding("a", "x")
            .namespace("rOOT")
            .build()
            .unwrap();
        assert_eq!(
            a.to_wbem_uri(UriFormat::Canonical),
            b.to_wbem_uri(UriFormat::Canonical)
        );
    }

    #[test]
    fn format_names() {
        for format in [
            UriFormat::Standard,
            UriFormat::Canonical,
            UriFormat::CimObject,
            UriFormat::Historical,
        ] {
            assert_eq!(format.name().parse::<UriFormat>().unwrap(), format);
        }
        assert!("bogus".parse::<UriFormat>().is_err());
    }
}
