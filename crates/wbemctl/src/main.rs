use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use cim_mof::{MAX_MOF_LINE, MOF_INDENT};
use cim_obj::{CimType, UriFormat};
use tracing_subscriber::EnvFilter;

use wbemctl::cmd_mofstr::{self, Layout};
use wbemctl::cmd_uri;
use wbemctl::cmd_valuemap::{self, Query};
use wbemctl::cmd_xml::{self, XmlArgs};
use wbemctl::common;

#[derive(Parser, Debug)]
#[command(name = "wbemctl", version, about = "CIM object model codecs")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Accept sized integers outside the range of their type
    #[arg(long)]
    no_range_check: bool,
    /// Accept NULL keybinding values
    #[arg(long)]
    allow_null_keys: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a WBEM URI and render it again
    Uri {
        uri: String,
        /// standard, canonical, cimobject or historical
        #[arg(long, default_value = "standard")]
        format: UriFormat,
        /// Parse as a class path
        #[arg(long)]
        class: bool,
    },
    /// Render the path named by a WBEM URI as CIM-XML
    Xml {
        uri: String,
        #[arg(long)]
        class: bool,
        /// Pretty-print with this many spaces per level
        #[arg(long)]
        indent: Option<usize>,
        #[arg(long)]
        ignore_host: bool,
        #[arg(long)]
        ignore_namespace: bool,
        /// Add a keybinding with a NULL value (repeatable)
        #[arg(long = "null-key")]
        null_keys: Vec<String>,
    },
    /// Resolve a value through ValueMap/Values lists
    Valuemap {
        /// Comma separated ValueMap entries; consecutive integers when omitted
        #[arg(long, value_delimiter = ',')]
        valuemap: Vec<String>,
        /// Comma separated Values strings
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<String>,
        /// Integer CIM type of the mapped element
        #[arg(long = "type", default_value = "uint16")]
        cim_type: CimType,
        /// Integer literal to translate
        value: Option<String>,
        /// Translate a Values string back to its value or range
        #[arg(long, conflicts_with = "value")]
        reverse: Option<String>,
    },
    /// Render a string as a wrapped MOF literal
    Mofstr {
        text: String,
        #[arg(long, default_value_t = MOF_INDENT)]
        indent: usize,
        #[arg(long, default_value_t = MAX_MOF_LINE)]
        maxline: usize,
        /// Column at which the literal starts
        #[arg(long, default_value_t = 0)]
        line_pos: usize,
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        no_range_check,
        allow_null_keys,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = common::config(no_range_check, allow_null_keys);

    match cmd {
        Cmd::Uri { uri, format, class } => cmd_uri::run(&uri, format, class, json)?,
        Cmd::Xml {
            uri,
            class,
            indent,
            ignore_host,
            ignore_namespace,
            null_keys,
        } => {
            if class && !null_keys.is_empty() {
                bail!("--null-key applies to instance paths only");
            }
            let args = XmlArgs {
                uri,
                class,
                indent,
                ignore_host,
                ignore_namespace,
                null_keys,
            };
            cmd_xml::run(&args, &config)?
        }
        Cmd::Valuemap {
            valuemap,
            values,
            cim_type,
            value,
            reverse,
        } => {
            let query = match (value, reverse) {
                (Some(value), _) => Query::Value(value),
                (None, Some(values)) => Query::Reverse(values),
                (None, None) => Query::List,
            };
            cmd_valuemap::run(cim_type, &valuemap, &values, &query, &config, json)?
        }
        Cmd::Mofstr {
            text,
            indent,
            maxline,
            line_pos,
        } => cmd_mofstr::run(
            &text,
            Layout {
                indent,
                maxline,
                line_pos,
            },
        )?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uri_defaults() {
        let cli = Cli::parse_from(["wbemctl", "uri", "/root:CIM_Foo.Id=1"]);
        match cli.cmd {
            Cmd::Uri { format, class, .. } => {
                assert_eq!(format, UriFormat::Standard);
                assert!(!class);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "wbemctl",
            "-vv",
            "--json",
            "--no-range-check",
            "uri",
            "--format",
            "canonical",
            "CIM_Foo",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(cli.no_range_check);
        assert!(!cli.allow_null_keys);
        match cli.cmd {
            Cmd::Uri { format, .. } => assert_eq!(format, UriFormat::Canonical),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_valuemap_lists() {
        let cli = Cli::parse_from([
            "wbemctl",
            "valuemap",
            "--valuemap",
            "0,2..4,..",
            "--values",
            "a,b,c",
            "--type",
            "uint8",
            "3",
        ]);
        match cli.cmd {
            Cmd::Valuemap {
                valuemap,
                values,
                cim_type,
                value,
                reverse,
            } => {
                assert_eq!(valuemap, vec!["0", "2..4", ".."]);
                assert_eq!(values, vec!["a", "b", "c"]);
                assert_eq!(cim_type, CimType::Uint8);
                assert_eq!(value.as_deref(), Some("3"));
                assert_eq!(reverse, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_xml_null_keys() {
        let cli = Cli::parse_from([
            "wbemctl",
            "--allow-null-keys",
            "xml",
            "--indent",
            "2",
            "--null-key",
            "A",
            "--null-key",
            "B",
            "/root:CIM_Foo.Id=1",
        ]);
        assert!(cli.allow_null_keys);
        match cli.cmd {
            Cmd::Xml {
                indent, null_keys, ..
            } => {
                assert_eq!(indent, Some(2));
                assert_eq!(null_keys, vec!["A", "B"]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_mofstr_defaults() {
        let cli = Cli::parse_from(["wbemctl", "mofstr", "hello"]);
        match cli.cmd {
            Cmd::Mofstr {
                indent, maxline, ..
            } => {
                assert_eq!(indent, MOF_INDENT);
                assert_eq!(maxline, MAX_MOF_LINE);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
