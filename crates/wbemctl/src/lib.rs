pub mod cmd_mofstr;
pub mod cmd_uri;
pub mod cmd_valuemap;
pub mod cmd_xml;
pub mod common;
