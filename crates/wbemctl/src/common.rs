use anyhow::{Context, Result};
use cim_obj::{CimClassName, CimInstanceName, Config};
use serde::Serialize;
use tracing::debug;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

/// Construction switches selected on the command line.
pub fn config(no_range_check: bool, allow_null_keys: bool) -> Config {
    Config::default()
        .with_integer_range(!no_range_check)
        .with_null_key_values(allow_null_keys)
}

/// A WBEM URI parsed as a class path or an instance path.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPath {
    Class(CimClassName),
    Instance(CimInstanceName),
}

pub fn parse_path(uri: &str, class: bool) -> Result<ParsedPath> {
    debug!(uri, class, "parsing WBEM URI");
    if class {
        CimClassName::from_wbem_uri(uri)
            .map(ParsedPath::Class)
            .with_context(|| format!("parse class path {uri:?}"))
    } else {
        CimInstanceName::from_wbem_uri(uri)
            .map(ParsedPath::Instance)
            .with_context(|| format!("parse instance path {uri:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_flags() {
        assert_eq!(config(false, false), Config::default());
        let cfg = config(true, true);
        assert!(!cfg.enforce_integer_range);
        assert!(cfg.ignore_null_key_value);
    }

    #[test]
    fn parses_both_kinds() {
        assert!(matches!(
            parse_path("/root:CIM_Foo", true).unwrap(),
            ParsedPath::Class(_)
        ));
        assert!(matches!(
            parse_path("/root:CIM_Foo.Id=1", false).unwrap(),
            ParsedPath::Instance(_)
        ));
        assert!(parse_path("/root:CIM_Foo.Id=1", true).is_err());
    }
}
