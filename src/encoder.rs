//! Streaming XML encoder.
//!
//! Walks a [`Bindable`] value graph through its shared views and emits
//! events into a quick-xml [`Writer`]. Text and attribute values are escaped
//! by the event constructors; the element tree mirrors the field declaration
//! order of each record.

use std::collections::HashSet;
use std::io::{BufWriter, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::binder::XmlBinder;
use crate::error::BindError;
use crate::name::QName;
use crate::registry::TypeDescriptor;
use crate::value::{Bindable, StructValue, ValueRef, is_empty_value, scalar_text};

/// Streaming encoder bound to an [`XmlBinder`] context.
///
/// Created by [`XmlBinder::encoder`]. Each [`encode`](Self::encode) call
/// emits one complete element tree (or several, for a sequence) and flushes
/// the sink, so consecutive calls produce sibling documents on one stream.
pub struct Encoder<'a, W: Write> {
    binder: &'a XmlBinder,
    writer: Writer<BufWriter<W>>,
}

impl<'a, W: Write> Encoder<'a, W> {
    pub(crate) fn new(binder: &'a XmlBinder, sink: W) -> Self {
        Self {
            binder,
            writer: Writer::new(BufWriter::new(sink)),
        }
    }

    /// Encodes `value` as XML. The sink is flushed even when emission fails
    /// partway; the emission error wins over a flush error.
    pub fn encode(&mut self, value: &dyn Bindable) -> Result<(), BindError> {
        let result = self.encode_value(value, None);
        let flushed = self
            .writer
            .get_mut()
            .flush()
            .map_err(|e| BindError::Stream(e.to_string()));
        result.and(flushed)
    }

    /// Unwraps containers down to the element that actually gets a tag.
    /// `name` overrides the element name; `None` falls back to the type's
    /// registered (or derived) name.
    fn encode_value(&mut self, value: &dyn Bindable, name: Option<&QName>) -> Result<(), BindError> {
        match value.view() {
            ValueRef::Nullable(inner) | ValueRef::Poly(inner) => match inner {
                Some(inner) => self.encode_value(inner, name),
                None => Ok(()),
            },
            ValueRef::List(list) => {
                // One sibling element per item, no wrapper.
                for index in 0..list.len() {
                    if let Some(item) = list.item(index) {
                        self.encode_value(item, name)?;
                    }
                }
                Ok(())
            }
            _ => self.encode_element(value, name),
        }
    }

    fn encode_element(&mut self, value: &dyn Bindable, name: Option<&QName>) -> Result<(), BindError> {
        let desc = self.binder.descriptor_of(value);
        let tag = self.qualify(name.unwrap_or(&desc.name));

        // Attribute values are rendered before any event is written so a
        // bad attribute aborts the element cleanly.
        let mut seen: HashSet<&QName> = HashSet::new();
        let mut attrs: Vec<(String, String)> = Vec::new();
        if let ValueRef::Struct(record) = value.view() {
            for (index, fi) in desc.fields.iter().enumerate() {
                if !fi.is_attr {
                    continue;
                }
                let Some(field) = record.field(index) else {
                    continue;
                };
                if fi.omit_empty && is_empty_value(field) {
                    continue;
                }
                if !seen.insert(&fi.name) {
                    continue;
                }
                attrs.push((self.qualify(&fi.name), scalar_text(field)?));
            }
        }
        // Fixed attributes from registration, unless a field already claimed
        // the name.
        for fixed in &desc.fixed_attrs {
            if !seen.insert(&fixed.name) {
                continue;
            }
            attrs.push((self.qualify(&fixed.name), fixed.value.clone()));
        }

        let mut start = BytesStart::new(tag.as_str());
        for (key, val) in &attrs {
            start.push_attribute((key.as_str(), val.as_str()));
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(|e| BindError::Stream(e.to_string()))?;

        match value.view() {
            ValueRef::Struct(record) => self.encode_fields(record, &desc)?,
            _ => {
                let text = scalar_text(value)?;
                if !text.is_empty() {
                    self.writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(|e| BindError::Stream(e.to_string()))?;
                }
            }
        }

        self.writer
            .write_event(Event::End(BytesEnd::new(tag.as_str())))
            .map_err(|e| BindError::Stream(e.to_string()))
    }

    fn encode_fields(
        &mut self,
        record: &dyn StructValue,
        desc: &TypeDescriptor,
    ) -> Result<(), BindError> {
        for (index, fi) in desc.fields.iter().enumerate() {
            if fi.is_attr {
                continue;
            }
            let Some(field) = record.field(index) else {
                continue;
            };
            if fi.omit_empty && is_empty_value(field) {
                continue;
            }
            // A polymorphic field takes the held value's own name.
            let name = if fi.is_poly { None } else { Some(&fi.name) };
            self.encode_value(field, name)?;
        }
        Ok(())
    }

    /// Renders a name for the wire: a namespace URI with a known non-empty
    /// prefix writes `prefix:local`, anything else writes the bare local
    /// name.
    fn qualify(&self, name: &QName) -> String {
        if name.space.is_empty() {
            return name.local.clone();
        }
        match self.binder.namespaces().prefix_for(&name.space) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, name.local),
            _ => name.local.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{AnyElement, Attribute, BindError, Bytes, QName, XmlBinder, bind_xml};
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Default)]
    struct Address {
        city: String,
    }
    bind_xml!(Address { city => "City" });

    #[derive(Debug, Default)]
    struct Person {
        id: u32,
        name: String,
        nickname: String,
        age: Option<i32>,
        address: Option<Address>,
        emails: Vec<String>,
    }
    bind_xml!(Person {
        id => "id,attr",
        name => "Name",
        nickname => "Nickname,omitempty",
        age => "Age",
        address => "Address",
        emails => "Email",
    });

    fn marshal_str(binder: &XmlBinder, value: &dyn crate::Bindable) -> String {
        String::from_utf8(binder.marshal(value).unwrap()).unwrap()
    }

    #[test]
    fn encodes_attributes_fields_and_repeats_in_declaration_order() {
        let binder = XmlBinder::new();
        let person = Person {
            id: 7,
            name: "Ada".into(),
            nickname: String::new(),
            age: Some(36),
            address: Some(Address { city: "Turin".into() }),
            emails: vec!["a@x.io".into(), "b@x.io".into()],
        };
        assert_eq!(
            marshal_str(&binder, &person),
            concat!(
                r#"<Person id="7">"#,
                "<Name>Ada</Name>",
                "<Age>36</Age>",
                "<Address><City>Turin</City></Address>",
                "<Email>a@x.io</Email><Email>b@x.io</Email>",
                "</Person>"
            )
        );
    }

    #[test]
    fn unset_options_and_empty_lists_emit_nothing() {
        let binder = XmlBinder::new();
        let person = Person {
            id: 1,
            name: "Ada".into(),
            ..Person::default()
        };
        assert_eq!(
            marshal_str(&binder, &person),
            r#"<Person id="1"><Name>Ada</Name></Person>"#
        );
    }

    #[test]
    fn omitempty_applies_to_elements_and_attributes() {
        let binder = XmlBinder::new();

        #[derive(Debug, Default)]
        struct Flags {
            label: String,
            count: u32,
        }
        bind_xml!(Flags {
            label => "label,attr,omitempty",
            count => "Count,omitempty",
        });

        assert_eq!(marshal_str(&binder, &Flags::default()), "<Flags></Flags>");
        assert_eq!(
            marshal_str(&binder, &Flags { label: "x".into(), count: 2 }),
            r#"<Flags label="x"><Count>2</Count></Flags>"#
        );
    }

    #[test]
    fn text_and_attribute_values_are_escaped() {
        let binder = XmlBinder::new();

        #[derive(Debug, Default)]
        struct Quote {
            source: String,
            text: String,
        }
        bind_xml!(Quote {
            source => "source,attr",
            text => "Text",
        });

        let quote = Quote {
            source: r#"a"b<c"#.into(),
            text: "1 < 2 & 3".into(),
        };
        let xml = marshal_str(&binder, &quote);
        assert!(xml.contains("1 &lt; 2 &amp; 3"));
        assert!(xml.contains("&quot;"));
        assert!(!xml.contains(r#""b<"#));
    }

    #[test]
    fn fixed_attributes_yield_to_field_attributes_with_the_same_name() {
        let binder = XmlBinder::new();

        #[derive(Debug, Default)]
        struct Doc {
            version: String,
        }
        bind_xml!(Doc { version => "version,attr" });

        binder.register_type_as(
            &Doc::default(),
            QName::local("Doc"),
            vec![
                Attribute::new(QName::local("version"), "fixed"),
                Attribute::new(QName::local("kind"), "report"),
            ],
        );
        let doc = Doc { version: "9".into() };
        assert_eq!(
            marshal_str(&binder, &doc),
            r#"<Doc version="9" kind="report"></Doc>"#
        );
    }

    #[test]
    fn registered_names_and_prefixes_qualify_the_output() {
        let binder = XmlBinder::new();
        binder.register_namespace("urn:books", "bk");

        #[derive(Debug, Default)]
        struct Book {
            title: String,
        }
        bind_xml!(Book { title => "bk:Title" });

        binder.register_type_as(&Book::default(), QName::new("urn:books", "Book"), Vec::new());
        let book = Book { title: "Dune".into() };
        assert_eq!(
            marshal_str(&binder, &book),
            "<bk:Book><bk:Title>Dune</bk:Title></bk:Book>"
        );
    }

    #[test]
    fn unregistered_prefixes_leave_names_unqualified() {
        let binder = XmlBinder::new();

        #[derive(Debug, Default)]
        struct Memo {
            body: String,
        }
        bind_xml!(Memo { body => "m:Body" });

        let memo = Memo { body: "hi".into() };
        assert_eq!(marshal_str(&binder, &memo), "<Memo><Body>hi</Body></Memo>");
    }

    #[derive(Debug, Default, PartialEq)]
    struct Cash {
        amount: i64,
    }
    bind_xml!(Cash { amount => "Amount" });

    #[derive(Debug, Default, PartialEq)]
    struct Card {
        number: String,
    }
    bind_xml!(Card { number => "Number" });

    #[test]
    fn polymorphic_fields_take_the_runtime_type_name() {
        let binder = XmlBinder::new();
        binder.register_type(&Cash::default());
        binder.register_type(&Card::default());

        #[derive(Debug, Default)]
        struct Payment {
            method: AnyElement,
        }
        bind_xml!(Payment { method => "Method" });

        let payment = Payment {
            method: AnyElement::new(Cash { amount: 12 }),
        };
        assert_eq!(
            marshal_str(&binder, &payment),
            "<Payment><Cash><Amount>12</Amount></Cash></Payment>"
        );
    }

    #[test]
    fn polymorphic_sequences_name_each_item_independently() {
        let binder = XmlBinder::new();
        binder.register_type(&Cash::default());
        binder.register_type(&Card::default());

        #[derive(Debug, Default)]
        struct Ledger {
            entries: Vec<AnyElement>,
        }
        bind_xml!(Ledger { entries => "Entry" });

        let ledger = Ledger {
            entries: vec![
                AnyElement::new(Cash { amount: 5 }),
                AnyElement::new(Card { number: "4485".into() }),
            ],
        };
        assert_eq!(
            marshal_str(&binder, &ledger),
            concat!(
                "<Ledger>",
                "<Cash><Amount>5</Amount></Cash>",
                "<Card><Number>4485</Number></Card>",
                "</Ledger>"
            )
        );
    }

    #[test]
    fn scalar_leaves_render_their_canonical_text() {
        let binder = XmlBinder::new();
        assert_eq!(marshal_str(&binder, &true), "<bool>true</bool>");
        assert_eq!(marshal_str(&binder, &-3i32), "<i32>-3</i32>");
        assert_eq!(marshal_str(&binder, &4.5f32), "<f32>4.5</f32>");
        assert_eq!(
            marshal_str(&binder, &Bytes::new(&b"a&b"[..])),
            "<Bytes>a&amp;b</Bytes>"
        );

        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
        assert_eq!(
            marshal_str(&binder, &ts),
            "<DateTime>2024-05-17T08:30:00Z</DateTime>"
        );
    }

    #[test]
    fn attribute_bound_to_a_record_fails_with_unsupported_type() {
        let binder = XmlBinder::new();

        #[derive(Debug, Default)]
        struct Bad {
            inner: Address,
        }
        bind_xml!(Bad { inner => "inner,attr" });

        let err = binder.marshal(&Bad::default()).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType(_)));
        assert!(err.to_string().contains("Address"));
    }
}
