//! Models end to end: declaration, coercion, hooks, reprs.
use std::{cell::Cell, rc::Rc};

use ltk::{BinaryOp, Kind, prelude::*};

const DELIVERY_OPTIONS: [&str; 3] = ["1-day", "2-day", "pickup"];

ltk::model! {
    /// The product form of the reactive demo.
    struct Product {
        count: i64 = 10,
        name: String = "Screwdriver",
        price: f64 = 50.0,
        warranty: bool = false,
        service: bool = true,
        delivery: i64 = 1,
        summary: String = "",
    }
}

fn summarize(model: &Model, name: &str, _: &Value) -> anyhow::Result<()> {
    if name == "summary" {
        return Ok(());
    }
    let count = model.get::<i64>("count")?;
    let price = model.get::<f64>("price")?;
    let delivery = model.get::<i64>("delivery")?;
    let summary = format!(
        "{count} * {} = ${}{}{} - Delivery: {}",
        model.value("name")?,
        (count as f64 * price).round(),
        if model.get::<bool>("warranty")? { " including warranty" } else { "" },
        if model.get::<bool>("service")? { " with service" } else { "" },
        DELIVERY_OPTIONS
            .get(delivery as usize)
            .ok_or_else(|| anyhow::anyhow!("no delivery option {delivery}"))?,
    );
    model.set("summary", summary)?;
    Ok(())
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn defaults_and_repr() {
    init_logging();
    let product = Product::new();
    assert_eq!(product.count(), 10);
    assert_eq!(product.name(), "Screwdriver");
    assert_eq!(product.price().kind(), Kind::Float);
    assert_eq!(
        product.to_string(),
        "Product(count=10, name='Screwdriver', price=50.0, warranty=False, \
         service=True, delivery=1, summary='')"
    );
}

#[test]
fn writes_are_coerced_toward_the_default_kind() {
    init_logging();
    let product = Product::new();
    assert_eq!(product.set_count("42"), Value::Int(42));
    assert_eq!(product.set_price("19.99"), 19.99);
    assert_eq!(product.set_warranty("yes"), true);
    assert_eq!(product.set_name(7), "7");

    // the literal is kept when coercion fails
    assert_eq!(product.set_price("abc"), "abc");
    assert_eq!(product.price().get_value().kind(), Kind::Str);
}

#[test]
fn equal_writes_notify_nobody() {
    init_logging();
    let product = Product::new();
    let notified = Rc::new(Cell::new(0));
    product.count().subscribe({
        let notified = notified.clone();
        move |_| notified.set(notified.get() + 1)
    });
    product.set_count(11);
    product.set_count(11);
    product.set_count("11");
    product.set_count(11.0);
    assert_eq!(notified.get(), 1);
}

#[test]
fn derived_summary_follows_every_field() {
    init_logging();
    let product = Product::builder()
        .on_changed(summarize)
        .set("name", "Wrench")
        .set("delivery", 0)
        .build_as::<Product>()
        .unwrap();
    assert_eq!(
        product.summary(),
        "10 * Wrench = $500 with service - Delivery: 1-day"
    );

    product.count().apply(BinaryOp::Add, 10).unwrap();
    assert_eq!(
        product.summary(),
        "20 * Wrench = $1000 with service - Delivery: 1-day"
    );

    product.set_warranty(true);
    product.set_service(false);
    assert_eq!(
        product.summary(),
        "20 * Wrench = $1000 including warranty - Delivery: 1-day"
    );
}

#[test]
fn hook_errors_are_contained() {
    init_logging();
    let product = Product::builder()
        .on_changed(summarize)
        .set("delivery", 7)
        .build_as::<Product>()
        .unwrap();
    // the summary hook fails on the bad delivery option but the write stands
    assert_eq!(product.delivery(), 7);
    assert_eq!(product.summary(), "");
}

#[test]
fn unknown_fields_fail_fast() {
    init_logging();
    let result = Product::builder().set("weight", 1.5).build();
    match result {
        Err(ModelError::UnknownField { model, field }) => {
            assert_eq!(model, "Product");
            assert_eq!(field, "weight");
        }
        other => panic!("expected an unknown field error, got {other:?}"),
    }
    assert!(Product::new().set("weight", 1).is_err());
}

#[test]
fn scalar_fields_reject_item_access() {
    init_logging();
    let product = Product::new();
    let err = product.count().set_item(0, 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot assign items on Product.count: a int is not a container"
    );
}

#[test]
fn encode_decode_round_trip() {
    init_logging();
    let product = Product::new();
    product.set_name("Drill");
    product.set_count(6);
    product.set_price(500);
    product.set_service(false);

    let copy = Product::new();
    copy.decode(&product.encode().unwrap()).unwrap();
    assert_eq!(copy.to_string(), product.to_string());
    assert_eq!(copy.price().get_value(), Value::Float(500.0));
}

ltk::model! {
    struct Reading {
        level: f64 = 0.0,
        samples: Vec<i64> = Vec::<i64>::new(),
        labels: Value = Value::Map(Default::default()),
        note: Value = Value::Null,
    }
}

#[test]
fn every_kind_of_field_survives_encoding() {
    init_logging();
    let reading = Reading::new();
    reading.set_samples(vec![1, 2, 3]);
    reading
        .labels()
        .set_item("unit", "mV")
        .unwrap();

    for level in ["inf", "-inf", "nan", "2.5"] {
        reading.set_level(level);
        let encoded = reading.encode().unwrap();
        let copy = Reading::new();
        copy.decode(&encoded).unwrap();
        assert_eq!(copy.level().kind(), Kind::Float, "{encoded}");
        assert_eq!(copy.to_string(), reading.to_string());
    }

    let copy = Reading::new();
    copy.decode(&reading.encode().unwrap()).unwrap();
    assert_eq!(copy.samples().get_value(), Value::from(vec![1, 2, 3]));
    assert_eq!(copy.labels().item("unit").unwrap(), "mV");
    assert_eq!(copy.note().get_value().kind(), Kind::Null);
    assert_eq!(copy.level(), 2.5);
}

#[test]
fn schemas_can_be_built_at_runtime() {
    init_logging();
    let schema = Schema::builder("Todo")
        .field("note", "")
        .field("completed", false)
        .field("suggestion", "")
        .build()
        .unwrap();
    let todo = Model::new(schema);
    assert_eq!(todo.value("note").unwrap(), "");
    assert_eq!(todo.value("completed").unwrap(), false);
    todo.set("note", "Buy groceries").unwrap();
    todo.set("completed", true).unwrap();
    assert_eq!(todo.value("note").unwrap(), "Buy groceries");
    assert!(todo.get::<bool>("completed").unwrap());
}
