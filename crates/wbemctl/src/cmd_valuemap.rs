use anyhow::{anyhow, Context, Result};
use cim_obj::{CimInt, CimProperty, CimQualifier, CimType, Config};
use serde::Serialize;
use tracing::debug;
use valuemapping::{parse_integer, ValueMapping};

use crate::common;

/// What the `valuemap` subcommand resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Integer literal to translate into its `Values` string.
    Value(String),
    /// `Values` string to translate back.
    Reverse(String),
    /// Every entry in declaration order.
    List,
}

#[derive(Debug, Serialize)]
struct EntryJson<'a> {
    valuemap: String,
    values: &'a str,
}

/// Build the mapping of an anonymous property of `cim_type`.
pub fn mapping(cim_type: CimType, valuemap: &[String], values: &[String]) -> Result<ValueMapping> {
    let mut builder = CimProperty::builder("Value")
        .cim_type(cim_type)
        .qualifier(CimQualifier::new("Values", values.to_vec()).context("Values qualifier")?);
    if !valuemap.is_empty() {
        builder = builder.qualifier(CimQualifier::new("ValueMap", valuemap.to_vec()).context("ValueMap qualifier")?);
    }
    let property = builder.build().context("build mapped property")?;
    ValueMapping::from_property(&property, None, None).context("build value mapping")
}

/// Lines of output for `query`.
pub fn resolve(vm: &ValueMapping, query: &Query, config: &Config) -> Result<Vec<(String, String)>> {
    match query {
        Query::Value(literal) => {
            let kind = vm
                .cim_type()
                .int_kind()
                .ok_or_else(|| anyhow!("{} is not an integer type", vm.cim_type()))?;
            let raw = parse_integer(literal)?;
            let value = CimInt::new(kind, raw, config)?;
            debug!(value = %value, "translating element value");
            let values = vm.to_values_int(value.value())?;
            Ok(vec![(value.to_string(), values.to_string())])
        }
        Query::Reverse(values) => {
            let entry = vm.to_binary(values)?;
            Ok(vec![(entry.to_string(), values.clone())])
        }
        Query::List => Ok(vm
            .items()
            .map(|(entry, values)| (entry.to_string(), values.to_string()))
            .collect()),
    }
}

pub fn run(
    cim_type: CimType,
    valuemap: &[String],
    values: &[String],
    query: &Query,
    config: &Config,
    json: bool,
) -> Result<()> {
    let vm = mapping(cim_type, valuemap, values)?;
    let lines = resolve(&vm, query, config)?;
    if json {
        let payload: Vec<_> = lines
            .iter()
            .map(|(valuemap, values)| EntryJson {
                valuemap: valuemap.clone(),
                values,
            })
            .collect();
        common::print_json(&payload)?;
    } else {
        for (valuemap, values) in &lines {
            println!("{valuemap}\t{values}");
        }
    }
    Ok(())
}
