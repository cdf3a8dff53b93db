#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # xmlbind

 A general-purpose XML data-binding engine: declare how a record maps onto
 elements and attributes once, then encode and decode whole value graphs
 through a shared [`XmlBinder`] context. Namespaces resolve through a
 registered URI/prefix table, and polymorphic slots pick their concrete type
 from the element name at runtime.

 ## Core Concepts

 - **Binder:** the shared context. An [`XmlBinder`] owns the type registry
   and the namespace table; encoders and decoders borrow it.
 - **Binding declaration:** the [`bind_xml!`] macro maps a record's fields
   onto XML with the tag micro-syntax
   `"[prefix:]localName[,attr][,omitempty]"`.
 - **Descriptor:** the parsed binding plan for a type, derived lazily on
   first use or pinned by explicit registration under a chosen name.
 - **Polymorphic slot:** an [`AnyElement`] field accepts any registered
   type; the element name on the wire selects (decode) or reflects (encode)
   the concrete type.
 - **Streaming:** [`Encoder`] and [`Decoder`] work over any
   `std::io::Write` / `std::io::Read`, one element tree per call, so a
   single stream can carry many documents.

 ## Getting Started

```rust
use xmlbind::{XmlBinder, bind_xml};

#[derive(Debug, Default, PartialEq)]
struct Track {
    id: u32,
    title: String,
    genre: String,
}

bind_xml!(Track {
    id => "id,attr",
    title => "Title",
    genre => "Genre,omitempty",
});

fn main() -> Result<(), xmlbind::BindError> {
    let binder = XmlBinder::new();

    let track = Track {
        id: 4,
        title: "So What".into(),
        genre: String::new(),
    };
    let xml = binder.marshal(&track)?;
    assert_eq!(
        String::from_utf8(xml).unwrap(),
        r#"<Track id="4"><Title>So What</Title></Track>"#
    );

    let mut copy = Track::default();
    binder.unmarshal(br#"<Track id="4"><Title>So What</Title></Track>"#, &mut copy)?;
    assert_eq!(copy.id, 4);
    assert_eq!(copy.title, "So What");

    Ok(())
}
```

 ## Polymorphic elements

```rust
use xmlbind::{AnyElement, XmlBinder, bind_xml};

#[derive(Debug, Default, PartialEq)]
struct Cash { amount: i64 }
bind_xml!(Cash { amount => "Amount" });

#[derive(Debug, Default, PartialEq)]
struct Card { number: String }
bind_xml!(Card { number => "Number" });

#[derive(Debug, Default)]
struct Payment { method: AnyElement }
bind_xml!(Payment { method => "Method" });

let binder = XmlBinder::new();
binder.register_type(&Cash::default());
binder.register_type(&Card::default());

let mut payment = Payment::default();
binder
    .unmarshal(b"<Payment><Card><Number>4485</Number></Card></Payment>", &mut payment)
    .unwrap();
assert_eq!(
    payment.method.downcast_ref::<Card>(),
    Some(&Card { number: "4485".into() })
);
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 */

/// The shared binding context and whole-buffer entry points
pub mod binder;

/// Streaming decoder
pub mod decoder;

/// Streaming encoder
pub mod encoder;

/// Error type for binding operations
pub mod error;

/// Qualified names, attributes and captured start tags
pub mod name;

/// Namespace URI / prefix table
pub mod namespace;

/// Type descriptors and the descriptor cache
pub mod registry;

/// The value model: bindable views, scalars and the binding macro
pub mod value;

#[doc(inline)]
pub use binder::XmlBinder;
#[doc(inline)]
pub use decoder::Decoder;
#[doc(inline)]
pub use encoder::Encoder;
#[doc(inline)]
pub use error::BindError;
#[doc(inline)]
pub use name::{Attribute, QName, StartTag};
#[doc(inline)]
pub use namespace::NamespaceTable;
#[doc(inline)]
pub use registry::{FieldDescriptor, Registry, TypeDescriptor};
#[doc(inline)]
pub use value::{
    AnyElement, BindDefault, Bindable, Bytes, FieldSpec, ListValue, NullableValue, ScalarMut,
    ScalarRef, StructValue, ValueMut, ValueRef,
};
