//! The reactive product form, driven through its widgets.
use ltk::BinaryOp;
use ltk_widgets::prelude::*;

const DELIVERY_OPTIONS: [&str; 3] = ["1-day", "2-day", "pickup"];

ltk::model! {
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
    let summary = format!(
        "{count} * {} = ${}",
        model.value("name")?,
        (count as f64 * price).round()
    );
    model.set("summary", summary)?;
    Ok(())
}

struct Form {
    view: VBox,
    name: Input,
    price: Input,
    count: Slider,
    count_label: Label,
    warranty: Checkbox,
    delivery: Select,
    service: Switch,
    summary: Text,
}

fn form(product: &Product) -> Form {
    let name = Input::new(product.name()).width(300);
    let price = Input::new(product.price()).attr("type", "number");
    let count = Slider::new(product.count(), 0.0, 100.0);
    let count_label = Label::new(product.count());
    let warranty = Checkbox::new(product.warranty());
    let delivery = Select::new(DELIVERY_OPTIONS, product.delivery());
    let service = Switch::new("With white gloves:", product.service());
    let summary = Text::new(product.summary());
    let view = VBox::new()
        .add(HBox::new().add(Text::new("Name:")).add(name.clone()))
        .add(HBox::new().add(Text::new("Price:")).add(price.clone()))
        .add(
            HBox::new()
                .add(Text::new("Count:"))
                .add(count.clone())
                .add(count_label.clone()),
        )
        .add(HBox::new().add(Text::new("Warranty:")).add(warranty.clone()))
        .add(HBox::new().add(Text::new("Delivery:")).add(delivery.clone()))
        .add(HBox::new().add(Text::new("Service:")).add(service.clone()))
        .add(HBox::new().add(Text::new("Summary:")).add(summary.clone()));
    Form {
        view,
        name,
        price,
        count,
        count_label,
        warranty,
        delivery,
        service,
        summary,
    }
}

fn product() -> Product {
    let _ = env_logger::builder().is_test(true).try_init();
    Product::builder()
        .on_changed(summarize)
        .set("name", "Wrench")
        .set("delivery", 0)
        .build_as::<Product>()
        .unwrap()
}

#[test]
fn widgets_show_the_model() {
    let product = product();
    let form = form(&product);
    assert_eq!(form.name.text(), "Wrench");
    assert_eq!(form.price.text(), "50.0");
    assert_eq!(form.count.get_value(), 10.0);
    assert_eq!(form.count_label.text(), "10");
    assert_eq!(form.warranty.get_value(), false);
    assert_eq!(form.delivery.selected_text().as_deref(), Some("1-day"));
    assert_eq!(form.service.get_value(), true);
    assert_eq!(form.summary.text(), "10 * Wrench = $500");
    assert!(form.view.html_string().contains(r#"<input class="ltk-input" value="Wrench" style="width: 300px;" />"#));
}

#[test]
fn user_edits_reach_the_model_and_every_other_widget() {
    let product = product();
    let form = form(&product);

    form.count.slide_to(20.0);
    assert_eq!(product.count(), 20);
    assert_eq!(product.count().get_value(), Value::Int(20));
    assert_eq!(form.count_label.text(), "20");
    assert_eq!(form.summary.text(), "20 * Wrench = $1000");

    form.price.type_text("12.5");
    assert_eq!(product.price(), 12.5);
    assert_eq!(form.summary.text(), "20 * Wrench = $250");

    form.warranty.toggle();
    assert_eq!(product.warranty(), true);

    form.service.toggle();
    assert_eq!(product.service(), false);

    form.delivery.choose(2);
    assert_eq!(product.delivery(), 2);

    form.count.slide_to(500.0);
    assert_eq!(product.count(), 100);
}

#[test]
fn model_writes_reach_every_widget() {
    let product = product();
    let form = form(&product);

    // "Set Product 2 to Hammer"
    product.set_name("Hammer");
    product.set_count(10);
    product.set_price(100.0);
    product.set_warranty(true);
    product.set_delivery(2);
    product.set_service(false);

    assert_eq!(form.name.text(), "Hammer");
    assert_eq!(form.price.text(), "100.0");
    assert!(form.warranty.element().has_attribute("checked"));
    assert_eq!(form.delivery.selected_text().as_deref(), Some("pickup"));
    assert_eq!(form.service.get_value(), false);
    assert_eq!(form.summary.text(), "10 * Hammer = $1000");

    // "Increment Product 1 count"
    let increment = Button::new("Increment count", {
        let product = product.clone();
        move |_| {
            product.count().apply(BinaryOp::Add, 10).unwrap();
        }
    });
    increment.click();
    assert_eq!(form.count.get_value(), 20.0);
    assert_eq!(form.count_label.text(), "20");
}

#[test]
fn two_forms_on_one_model_stay_in_sync() {
    let product = product();
    let left = form(&product);
    let right = form(&product);
    left.name.type_text("Drill");
    assert_eq!(right.name.text(), "Drill");
    right.warranty.toggle();
    assert!(left.warranty.get_value().is_truthy());
}

#[test]
fn plain_values_are_shown_once() {
    let label = Label::new("Product 1");
    assert_eq!(label.html_string(), r#"<label class="ltk-label">Product 1</label>"#);
    let select = Select::new(DELIVERY_OPTIONS, 1);
    select.choose(0);
    assert_eq!(select.get_value(), 0);
    assert_eq!(select.selected_text().as_deref(), Some("1-day"));
}
