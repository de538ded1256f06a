use anyhow::Result;
use cim_obj::UriFormat;
use serde::Serialize;

use crate::common::{self, ParsedPath};

#[derive(Debug, Serialize, PartialEq)]
struct KeyBindingJson {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct PathJson {
    kind: &'static str,
    host: Option<String>,
    namespace: Option<String>,
    classname: String,
    keybindings: Vec<KeyBindingJson>,
    uri: String,
}

fn describe(path: &ParsedPath, format: UriFormat) -> PathJson {
    match path {
        ParsedPath::Class(cn) => PathJson {
            kind: "class",
            host: cn.host().map(str::to_string),
            namespace: cn.namespace().map(str::to_string),
            classname: cn.classname().to_string(),
            keybindings: Vec::new(),
            uri: cn.to_wbem_uri(format),
        },
        ParsedPath::Instance(iname) => PathJson {
            kind: "instance",
            host: iname.host().map(str::to_string),
            namespace: iname.namespace().map(str::to_string),
            classname: iname.classname().to_string(),
            keybindings: iname
                .keybindings()
                .iter()
                .map(|(name, value)| KeyBindingJson {
                    name: name.to_string(),
                    value: value.as_ref().map(ToString::to_string),
                })
                .collect(),
            uri: iname.to_wbem_uri(format),
        },
    }
}

/// Re-render `uri` in `format`.
pub fn render(uri: &str, format: UriFormat, class: bool) -> Result<String> {
    let path = common::parse_path(uri, class)?;
    Ok(describe(&path, format).uri)
}

pub fn run(uri: &str, format: UriFormat, class: bool, json: bool) -> Result<()> {
    let path = common::parse_path(uri, class)?;
    let described = describe(&path, format);
    if json {
        common::print_json(&described)?;
    } else {
        println!("{}", described.uri);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_format() {
        let uri = "https://Server:5989/root/cimv2:CIM_Foo.Name=\"a\",Id=1";
        assert_eq!(
            render(uri, UriFormat::Standard, false).unwrap(),
            "//Server:5989/root/cimv2:CIM_Foo.Name=\"a\",Id=1"
        );
        assert_eq!(
            render(uri, UriFormat::Canonical, false).unwrap(),
            "//server:5989/root/cimv2:cim_foo.id=1,name=\"a\""
        );
        assert_eq!(
            render(uri, UriFormat::CimObject, false).unwrap(),
            "root/cimv2:CIM_Foo.Name=\"a\",Id=1"
        );
    }

    #[test]
    fn describes_instance_paths() {
        let path = common::parse_path("/root:CIM_Foo.Id=1", false).unwrap();
        let described = describe(&path, UriFormat::Standard);
        assert_eq!(described.kind, "instance");
        assert_eq!(described.namespace.as_deref(), Some("root"));
        assert_eq!(described.keybindings.len(), 1);
        assert_eq!(described.keybindings[0].name, "Id");
    }

    #[test]
    fn class_paths() {
        assert_eq!(
            render("//host/root:CIM_Foo", UriFormat::Historical, true).unwrap(),
            "//host/root:CIM_Foo"
        );
        assert!(render("not a uri ::", UriFormat::Standard, false).is_err());
    }
}
