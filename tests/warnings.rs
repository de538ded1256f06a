use std::io;
use std::sync::{Arc, Mutex};

use wbem_rs::mof::instance_tomof;
use wbem_rs::obj::{CimInstance, CimInstanceName, Config};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn unknown_scheme_is_tolerated_with_a_warning() {
    let mut parsed = None;
    let log = capture(|| {
        parsed = Some(CimInstanceName::from_wbem_uri("xyz://h/root:CIM_Foo.Id=1").unwrap());
    });
    let parsed = parsed.unwrap();
    assert_eq!(parsed.host(), Some("h"));
    assert!(log.contains("cim_obj::uri"), "{log}");
    assert!(log.contains("unsupported scheme"), "{log}");
}

#[test]
fn known_scheme_is_silent() {
    let log = capture(|| {
        CimInstanceName::from_wbem_uri("https://h/root:CIM_Foo.Id=1").unwrap();
    });
    assert!(log.is_empty(), "{log}");
}

#[test]
fn deprecated_mof_indent_is_reported() {
    let inst = CimInstance::builder("CIM_Foo").property("Id", 1u8).build().unwrap();
    let log = capture(|| {
        instance_tomof(&inst, Some(4), 80, &Config::default());
    });
    assert!(log.contains("cim_obj::deprecation"), "{log}");
    assert!(log.contains("CIMInstance.tomof.indent"), "{log}");

    let log = capture(|| {
        instance_tomof(&inst, Some(4), 80, &Config::default().with_debug_origin(true));
    });
    assert!(log.contains("warnings.rs"), "{log}");
}
