use std::fs::File;

use chrono::{DateTime, TimeZone, Utc};
use xmlbind::{AnyElement, Attribute, QName, XmlBinder, bind_xml};

#[derive(Debug, Default, PartialEq)]
struct Product {
    id: String,
    available: bool,
    name: String,
    price: f64,
    description: Option<String>,
    tags: Vec<String>,
}

bind_xml!(Product {
    id => "id,attr",
    available => "available,attr",
    name => "Name",
    price => "Price",
    description => "Description,omitempty",
    tags => "Tag",
});

#[derive(Debug, Default)]
struct Catalog {
    updated: DateTime<Utc>,
    products: Vec<Product>,
}

bind_xml!(Catalog {
    updated => "updated,attr",
    products => "Product",
});

fn sample_catalog() -> Catalog {
    Catalog {
        updated: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        products: vec![
            Product {
                id: "P001".into(),
                available: true,
                name: "Wireless Headphones".into(),
                price: 79.99,
                description: Some("Noise-cancelling, 20hr battery".into()),
                tags: vec!["audio".into(), "wireless".into()],
            },
            Product {
                id: "P002".into(),
                available: false,
                name: "USB-C Cable".into(),
                price: 12.99,
                description: None,
                tags: Vec::new(),
            },
        ],
    }
}

#[test]
fn catalog_round_trips_through_a_file() {
    let binder = XmlBinder::new();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.xml");

    let catalog = sample_catalog();
    {
        let file = File::create(&path).expect("Failed to create XML file");
        let mut encoder = binder.encoder(file);
        encoder.encode(&catalog).expect("Failed to encode catalog");
    }

    let written = std::fs::read_to_string(&path).expect("Failed to read XML file");
    assert!(written.starts_with(r#"<Catalog updated="2025-03-01T12:00:00Z">"#));
    assert!(written.contains(r#"<Product id="P001" available="true">"#));
    // The empty description and tag list leave no trace.
    assert!(!written.contains("Description></Description"));

    let file = File::open(&path).expect("Unable to open XML file");
    let mut decoded = Catalog::default();
    binder
        .decoder(file)
        .decode(&mut decoded)
        .expect("Failed to decode catalog");

    assert_eq!(decoded.updated, catalog.updated);
    assert_eq!(decoded.products, catalog.products);
}

#[test]
fn find_extracts_one_record_from_a_larger_document() {
    let binder = XmlBinder::new();
    let xml = r#"
    <Inventory>
      <Meta><Source>warehouse-7</Source></Meta>
      <Product id="P003" available="true">
        <Name>Smart Watch</Name>
        <Price>149.99</Price>
      </Product>
    </Inventory>
    "#;

    let mut decoder = binder.decoder(xml.as_bytes());
    let tag = decoder
        .find(&[QName::local("Product")])
        .expect("Product element not found");

    let mut product = Product::default();
    decoder
        .decode_element(&mut product, Some(tag))
        .expect("Failed to decode product");

    assert_eq!(product.id, "P003");
    assert_eq!(product.name, "Smart Watch");
    assert_eq!(product.price, 149.99);
}

#[test]
fn top_level_sequence_drains_the_whole_stream() {
    let binder = XmlBinder::new();
    let xml = concat!(
        r#"<Product id="A" available="true"><Name>One</Name><Price>1</Price></Product>"#,
        r#"<Product id="B" available="false"><Name>Two</Name><Price>2</Price></Product>"#,
    );

    let mut products: Vec<Product> = Vec::new();
    binder
        .unmarshal(xml.as_bytes(), &mut products)
        .expect("Failed to decode product stream");

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "One");
    assert!(!products[1].available);
}

#[derive(Debug, Default, PartialEq)]
struct Restock {
    product_id: String,
    quantity: u32,
}
bind_xml!(Restock {
    product_id => "product,attr",
    quantity => "Quantity",
});

#[derive(Debug, Default, PartialEq)]
struct PriceChange {
    product_id: String,
    new_price: f64,
}
bind_xml!(PriceChange {
    product_id => "product,attr",
    new_price => "NewPrice",
});

#[derive(Debug, Default)]
struct EventLog {
    events: Vec<AnyElement>,
}
bind_xml!(EventLog { events => "Event" });

#[test]
fn mixed_event_log_round_trips_by_runtime_type() {
    let binder = XmlBinder::new();
    binder.register_type(&Restock::default());
    binder.register_type(&PriceChange::default());

    let log = EventLog {
        events: vec![
            AnyElement::new(Restock {
                product_id: "P001".into(),
                quantity: 40,
            }),
            AnyElement::new(PriceChange {
                product_id: "P002".into(),
                new_price: 9.99,
            }),
        ],
    };

    let xml = binder.marshal(&log).expect("Failed to encode event log");
    let text = String::from_utf8(xml.clone()).unwrap();
    assert!(text.contains(r#"<Restock product="P001"><Quantity>40</Quantity></Restock>"#));
    assert!(text.contains(r#"<PriceChange product="P002"><NewPrice>9.99</NewPrice></PriceChange>"#));

    let mut decoded = EventLog::default();
    binder
        .unmarshal(&xml, &mut decoded)
        .expect("Failed to decode event log");
    assert_eq!(decoded.events.len(), 2);
    assert_eq!(
        decoded.events[0].downcast_ref::<Restock>(),
        Some(&Restock {
            product_id: "P001".into(),
            quantity: 40,
        })
    );
    assert_eq!(
        decoded.events[1].downcast_ref::<PriceChange>(),
        Some(&PriceChange {
            product_id: "P002".into(),
            new_price: 9.99,
        })
    );
}

#[derive(Debug, Default, PartialEq)]
struct Shipment {
    carrier: String,
    weight_kg: f64,
}
bind_xml!(Shipment {
    carrier => "sh:Carrier",
    weight_kg => "sh:Weight",
});

#[test]
fn namespaced_binding_round_trips_with_registered_prefix() {
    let binder = XmlBinder::new();
    binder.register_namespace("urn:example:shipping", "sh");
    binder.register_type_as(
        &Shipment::default(),
        QName::new("urn:example:shipping", "Shipment"),
        vec![Attribute::new(QName::local("schema"), "1.1")],
    );

    let shipment = Shipment {
        carrier: "NordPost".into(),
        weight_kg: 2.4,
    };
    let xml = binder.marshal(&shipment).expect("Failed to encode shipment");
    assert_eq!(
        String::from_utf8(xml.clone()).unwrap(),
        concat!(
            r#"<sh:Shipment schema="1.1">"#,
            "<sh:Carrier>NordPost</sh:Carrier>",
            "<sh:Weight>2.4</sh:Weight>",
            "</sh:Shipment>"
        )
    );

    let mut decoded = Shipment::default();
    binder
        .unmarshal(&xml, &mut decoded)
        .expect("Failed to decode shipment");
    assert_eq!(decoded, shipment);
}
