use std::io::{Read, Write};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::BindError;
use crate::name::{Attribute, QName};
use crate::namespace::NamespaceTable;
use crate::registry::{Registry, TypeDescriptor};
use crate::value::Bindable;

/// The shared binding context: a type registry plus a namespace table, with
/// convenience entry points for whole-buffer work.
///
/// One binder is meant to be configured once and shared; every method takes
/// `&self` and the binder is `Send + Sync`, so encoders and decoders on
/// different threads can borrow the same context.
///
/// # Examples
///
/// ```
/// use xmlbind::{XmlBinder, bind_xml};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Letter {
///     body: String,
/// }
/// bind_xml!(Letter { body => "Body" });
///
/// let binder = XmlBinder::new();
/// let xml = binder.marshal(&Letter { body: "hi".into() }).unwrap();
/// assert_eq!(
///     String::from_utf8(xml).unwrap(),
///     "<Letter><Body>hi</Body></Letter>"
/// );
///
/// let mut copy = Letter::default();
/// binder
///     .unmarshal(b"<Letter><Body>hi</Body></Letter>", &mut copy)
///     .unwrap();
/// assert_eq!(copy, Letter { body: "hi".into() });
/// ```
#[derive(Debug, Default)]
pub struct XmlBinder {
    registry: Registry,
    namespaces: NamespaceTable,
}

impl XmlBinder {
    /// An empty context: no registered types, only the reserved `xmlns`
    /// namespace binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value`'s type under its bare type name.
    ///
    /// Registration is what makes a type resolvable by element name when a
    /// polymorphic slot is decoded; plain struct encode and decode work
    /// without it through lazily derived descriptors.
    ///
    /// # Panics
    ///
    /// Panics when the type or its name is already registered.
    pub fn register_type(&self, value: &dyn Bindable) {
        self.registry.register(value, &self.namespaces);
    }

    /// Registers `value`'s type under an explicit qualified element name,
    /// with fixed attributes stamped onto every encoded instance.
    ///
    /// # Panics
    ///
    /// Panics when the type or the name is already registered.
    pub fn register_type_as(&self, value: &dyn Bindable, name: QName, fixed_attrs: Vec<Attribute>) {
        self.registry
            .register_as(value, name, fixed_attrs, &self.namespaces);
    }

    /// Binds a namespace URI and a prefix to each other. Last write wins
    /// when either side is rebound; an empty prefix leaves the URI's names
    /// unqualified on output.
    pub fn register_namespace(&self, uri: &str, prefix: &str) {
        self.namespaces.register(uri, prefix);
    }

    /// Encodes `value` into a fresh buffer.
    pub fn marshal(&self, value: &dyn Bindable) -> Result<Vec<u8>, BindError> {
        let mut out = Vec::new();
        let mut encoder = self.encoder(&mut out);
        encoder.encode(value)?;
        drop(encoder);
        Ok(out)
    }

    /// Decodes the first element of `bytes` into `target` (every remaining
    /// element, for a sequence target).
    pub fn unmarshal(&self, bytes: &[u8], target: &mut dyn Bindable) -> Result<(), BindError> {
        self.decoder(bytes).decode(target)
    }

    /// A streaming encoder writing to `sink` through this context.
    pub fn encoder<W: Write>(&self, sink: W) -> Encoder<'_, W> {
        Encoder::new(self, sink)
    }

    /// A streaming decoder reading from `source` through this context.
    pub fn decoder<R: Read>(&self, source: R) -> Decoder<'_, R> {
        Decoder::new(self, source)
    }

    pub(crate) fn descriptor_of(&self, value: &dyn Bindable) -> std::sync::Arc<TypeDescriptor> {
        self.registry.descriptor_of(value, &self.namespaces)
    }

    pub(crate) fn type_by_name(&self, name: &QName) -> Option<Box<dyn Bindable>> {
        self.registry.type_by_name(name)
    }

    pub(crate) fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use crate::{AnyElement, XmlBinder, bind_xml};

    #[derive(Debug, Default, PartialEq)]
    struct Reading {
        sensor: String,
        value: f64,
    }
    bind_xml!(Reading {
        sensor => "sensor,attr",
        value => "Value",
    });

    #[test]
    fn round_trip_through_one_binder() {
        let binder = XmlBinder::new();
        let reading = Reading {
            sensor: "t1".into(),
            value: 21.5,
        };
        let xml = binder.marshal(&reading).unwrap();
        let mut copy = Reading::default();
        binder.unmarshal(&xml, &mut copy).unwrap();
        assert_eq!(copy, reading);
    }

    #[test]
    fn binder_is_shared_across_threads() {
        let binder = Arc::new(XmlBinder::new());
        binder.register_type(&Reading::default());

        let mut handles = Vec::new();
        for n in 0..8 {
            let binder = Arc::clone(&binder);
            handles.push(thread::spawn(move || {
                // Concurrent lazy derivation and registered lookups must
                // agree on one descriptor per type.
                let reading = Reading {
                    sensor: format!("s{n}"),
                    value: f64::from(n),
                };
                let xml = binder.marshal(&reading).unwrap();

                let mut slot = AnyElement::empty();
                binder.unmarshal(&xml, &mut slot).unwrap();
                assert_eq!(slot.downcast_ref::<Reading>(), Some(&reading));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
