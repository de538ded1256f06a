use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::nocase::{cmp_opt_name, hash_name, hash_opt_name, name_eq, opt_name_eq};
use crate::uri::{self, UriFormat};

/// Path of a CIM class: class name plus optional namespace and host.
#[derive(Debug, Clone)]
pub struct CimClassName {
    classname: String,
    namespace: Option<String>,
    host: Option<String>,
}

pub(crate) fn strip_namespace(namespace: impl Into<String>) -> String {
    let namespace = namespace.into();
    namespace.trim_matches('/').to_string()
}

impl CimClassName {
    /// Class path without namespace or host.
    pub fn new(classname: impl Into<String>) -> Self {
        CimClassName {
            classname: classname.into(),
            namespace: None,
            host: None,
        }
    }

    /// Set the namespace. Leading and trailing slashes are removed.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(strip_namespace(namespace));
        self
    }

    /// Set the host, as `host[:port]`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) {
        self.classname = classname.into();
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace.map(strip_namespace);
    }

    pub fn set_host(&mut self, host: Option<String>) {
        self.host = host;
    }

    /// Parse a WBEM URI naming a class. Keybindings are rejected.
    pub fn from_wbem_uri(uri: &str) -> Result<Self> {
        uri::parse_class_path(uri)
    }

    /// Render as a WBEM URI in the given format.
    pub fn to_wbem_uri(&self, format: UriFormat) -> String {
        uri::format_class_path(self, format)
    }
}

impl PartialEq for CimClassName {
    fn eq(&self, other: &Self) -> bool {
        opt_name_eq(self.host(), other.host())
            && opt_name_eq(self.namespace(), other.namespace())
            && name_eq(&self.classname, &other.classname)
    }
}

impl Eq for CimClassName {}

impl Hash for CimClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_opt_name(self.host(), state);
        hash_opt_name(self.namespace(), state);
        hash_name(&self.classname, state);
    }
}

impl PartialOrd for CimClassName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CimClassName {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_opt_name(self.host(), other.host())
            .then_with(|| cmp_opt_name(self.namespace(), other.namespace()))
            .then_with(|| cmp_opt_name(Some(&self.classname), Some(&other.classname)))
    }
}

impl fmt::Display for CimClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wbem_uri(UriFormat::Historical))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn namespace_slashes_are_stripped() {
        let cn = CimClassName::new("CIM_Foo").with_namespace("/root/cimv2/");
        assert_eq!(cn.namespace(), Some("root/cimv2"));
    }

    #[test]
    fn equality_ignores_case() {
        let a = CimClassName::new("CIM_Foo")
            .with_namespace("root/cimv2")
            .with_host("Server:5988");
        let b = CimClassName::new("cim_foo")
            .with_namespace("ROOT/CIMV2")
            .with_host("server:5988");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, CimClassName::new("CIM_Foo").with_namespace("root/cimv2"));
    }

    #[test]
    fn ordering_by_host_then_namespace_then_class() {
        let a = CimClassName::new("Z").with_namespace("a");
        let b = CimClassName::new("A").with_namespace("b");
        assert!(a < b);
        let hosted = CimClassName::new("A").with_host("h");
        assert!(b < hosted);
    }

    #[test]
    fn display_is_historical() {
        let cn = CimClassName::new("CIM_Foo")
            .with_namespace("root/cimv2")
            .with_host("server");
        assert_eq!(cn.to_string(), "//server/root/cimv2:CIM_Foo");
        assert_eq!(CimClassName::new("CIM_Foo").to_string(), "CIM_Foo");
    }

    #[test]
    fn mutation_changes_hash() {
        let mut cn = CimClassName::new("CIM_Foo");
        let before = hash_of(&cn);
        cn.set_namespace(Some("interop".into()));
        assert_ne!(hash_of(&cn), before);
    }
}
