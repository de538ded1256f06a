use anyhow::{Context, Result};
use cim_obj::Config;
use cim_xml::{path, ToCimXml};

use crate::common::{self, ParsedPath};

/// Options of the `xml` subcommand.
#[derive(Debug, Clone, Default)]
pub struct XmlArgs {
    pub uri: String,
    pub class: bool,
    pub indent: Option<usize>,
    pub ignore_host: bool,
    pub ignore_namespace: bool,
    pub null_keys: Vec<String>,
}

/// CIM-XML text of the path named by `args.uri`.
pub fn render(args: &XmlArgs, config: &Config) -> Result<String> {
    let element = match common::parse_path(&args.uri, args.class)? {
        ParsedPath::Class(cn) => path::class_path_element(&cn, args.ignore_host, args.ignore_namespace),
        ParsedPath::Instance(mut iname) => {
            for name in &args.null_keys {
                iname
                    .set_keybinding_with(name.as_str(), None, config)
                    .with_context(|| format!("add NULL keybinding {name}"))?;
            }
            if args.ignore_host || args.ignore_namespace {
                path::instance_path_element(&iname, args.ignore_host, args.ignore_namespace)
            } else {
                iname.to_cimxml()
            }
        }
    };
    element
        .to_xml_string(args.indent)
        .context("serialise CIM-XML")
}

pub fn run(args: &XmlArgs, config: &Config) -> Result<()> {
    println!("{}", render(args, config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(uri: &str) -> XmlArgs {
        XmlArgs {
            uri: uri.to_string(),
            ..XmlArgs::default()
        }
    }

    #[test]
    fn class_path_shapes() {
        let mut a = args("CIM_Foo");
        a.class = true;
        assert_eq!(
            render(&a, &Config::default()).unwrap(),
            r#"<CLASSNAME NAME="CIM_Foo"/>"#
        );
        a.uri = "/root:CIM_Foo".to_string();
        assert!(render(&a, &Config::default())
            .unwrap()
            .starts_with("<LOCALCLASSPATH>"));
        a.ignore_namespace = true;
        assert!(render(&a, &Config::default())
            .unwrap()
            .starts_with("<CLASSNAME"));
    }

    #[test]
    fn instance_path_with_null_key() {
        let mut a = args("/root:CIM_Foo.Id=1");
        a.null_keys = vec!["Other".to_string()];
        assert!(render(&a, &Config::default()).is_err());

        let config = Config::default().with_null_key_values(true);
        let text = render(&a, &config).unwrap();
        assert!(text.starts_with("<LOCALINSTANCEPATH>"));
        assert!(text.contains(r#"<KEYBINDING NAME="Other"><KEYVALUE VALUETYPE="string"/></KEYBINDING>"#));
    }

    #[test]
    fn pretty_printed() {
        let mut a = args("//host/root:CIM_Foo.Id=1");
        a.indent = Some(2);
        let text = render(&a, &Config::default()).unwrap();
        assert!(text.starts_with("<INSTANCEPATH>\n  <NAMESPACEPATH>"));
    }
}
