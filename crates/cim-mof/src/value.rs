//! MOF text of CIM values.

use cim_obj::{repr_real, CimValue, UriFormat};

use crate::decl::{class_tomof, instance_tomof_at};
use crate::string::{mofstr, mofval};

/// MOF text of a value, arrays as `{ ... }`, NULL as `NULL`.
///
/// Returns the text and the column after it.
pub fn value_tomof(
    value: Option<&CimValue>,
    indent: usize,
    maxline: usize,
    line_pos: usize,
    end_space: usize,
    avoid_splits: bool,
) -> (String, usize) {
    let quoted = |text: &str| mofstr(text, indent, maxline, line_pos, end_space, avoid_splits, '"');
    let Some(value) = value else {
        return mofval("NULL", indent, maxline, line_pos, end_space);
    };
    match value {
        CimValue::String(s) => quoted(s),
        CimValue::Char16(c) => mofstr(
            c.encode_utf8(&mut [0; 4]),
            indent,
            maxline,
            line_pos,
            end_space,
            avoid_splits,
            '\'',
        ),
        CimValue::DateTime(dt) => quoted(&dt.to_string()),
        CimValue::Reference(path) => quoted(&path.to_wbem_uri(UriFormat::Standard)),
        CimValue::ClassReference(path) => quoted(&path.to_wbem_uri(UriFormat::Standard)),
        CimValue::Instance(inst) => quoted(&instance_tomof_at(inst, maxline)),
        CimValue::Class(class) => quoted(&class_tomof(class, maxline)),
        CimValue::Boolean(b) => mofval(if *b { "true" } else { "false" }, indent, maxline, line_pos, end_space),
        CimValue::Int(i) => mofval(&i.to_string(), indent, maxline, line_pos, end_space),
        CimValue::Real(r) => mofval(&repr_real(r.value()), indent, maxline, line_pos, end_space),
        CimValue::Array(items) => array_tomof(items, indent, maxline, line_pos, end_space),
    }
}

/// `{ a, b, ... }`. Each element is placed on the current line when it fits
/// and moved to a continuation line otherwise; string elements are split
/// only when they do not fit on a line of their own.
fn array_tomof(
    items: &[Option<CimValue>],
    indent: usize,
    maxline: usize,
    line_pos: usize,
    end_space: usize,
) -> (String, usize) {
    if items.is_empty() {
        return mofval("{ }", indent, maxline, line_pos, end_space);
    }
    let mut out = String::from("{");
    let mut pos = line_pos + 1;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
            pos += 1;
        }
        let reserve = if i + 1 == items.len() { end_space + 2 } else { 1 };
        let (text, new_pos) = value_tomof(item.as_ref(), indent, maxline, pos + 1, reserve, true);
        if !text.starts_with('\n') {
            out.push(' ');
        }
        out.push_str(&text);
        pos = new_pos;
    }
    out.push_str(" }");
    (out, pos + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cim_obj::{CimDateTime, CimInstanceName, CimReal};

    fn render(value: &CimValue) -> String {
        value_tomof(Some(value), 3, 80, 0, 0, false).0
    }

    #[test]
    fn scalars() {
        assert_eq!(value_tomof(None, 3, 80, 0, 0, false), ("NULL".to_string(), 4));
        assert_eq!(render(&CimValue::Boolean(true)), "true");
        assert_eq!(render(&CimValue::from(-7i32)), "-7");
        assert_eq!(render(&CimValue::Real(CimReal::untyped(1.5))), "1.5");
        assert_eq!(render(&CimValue::from("x")), "\"x\"");
        assert_eq!(render(&CimValue::Char16('c')), "'c'");
        let dt = CimDateTime::parse("00000001020304.000000:000").unwrap();
        assert_eq!(render(&CimValue::DateTime(dt)), "\"00000001020304.000000:000\"");
        let path = CimInstanceName::builder("CIM_Foo")
            .keybinding("Id", "a")
            .namespace("root")
            .build()
            .unwrap();
        assert_eq!(
            render(&CimValue::from(path)),
            r#""/root:CIM_Foo.Id=\"a\"""#
        );
    }

    #[test]
    fn arrays() {
        let value = CimValue::Array(vec![Some(CimValue::from(1u8)), None, Some(CimValue::from(3u8))]);
        assert_eq!(render(&value), "{ 1, NULL, 3 }");
        assert_eq!(render(&CimValue::Array(Vec::new())), "{ }");
    }

    #[test]
    fn long_arrays_wrap_between_elements() {
        let items: Vec<Option<CimValue>> = (0..12)
            .map(|i| Some(CimValue::from(format!("value-{i}"))))
            .collect();
        let (text, _) = value_tomof(Some(&CimValue::Array(items)), 6, 40, 10, 1, false);
        let lines: Vec<_> = text.lines().collect();
        assert!(lines.len() > 1);
        for line in &lines[1..] {
            assert!(line.starts_with("      \""), "{line:?}");
        }
        for (i, line) in lines.iter().enumerate() {
            let offset = if i == 0 { 10 } else { 0 };
            assert!(line.len() + offset <= 40, "{line:?}");
        }
    }
}
