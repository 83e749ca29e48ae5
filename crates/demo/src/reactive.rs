//! Two product forms bound to two products.
//!
//! Every edit updates the product's summary through a change hook, and every
//! widget bound to a field follows it.
use ltk::BinaryOp;
use ltk_widgets::prelude::*;

const DELIVERY_OPTIONS: [&str; 3] = ["1-day", "2-day", "pickup"];

ltk::model! {
    pub struct Product {
        count: i64 = 10,
        name: String = "Screwdriver",
        price: f64 = 50.0,
        warranty: bool = false,
        service: bool = true,
        delivery: i64 = 1,
        summary: String = "",
    }
}

/// Keeps `summary` in line with the other fields.
fn summarize(model: &Model, name: &str, _: &Value) -> anyhow::Result<()> {
    if name == "summary" {
        return Ok(());
    }
    let count = model.get::<i64>("count")?;
    let price = model.get::<f64>("price")?;
    let delivery = model.get::<i64>("delivery")?;
    let delivery = usize::try_from(delivery)
        .ok()
        .and_then(|index| DELIVERY_OPTIONS.get(index))
        .ok_or_else(|| anyhow::anyhow!("no delivery option {delivery}"))?;
    let mut summary = format!(
        "{count} * {} = ${}",
        model.value("name")?,
        thousands((count as f64 * price).round() as i64)
    );
    if model.get::<bool>("warranty")? {
        summary.push_str(" including warranty");
    }
    if model.get::<bool>("service")? {
        summary.push_str(" with service");
    }
    summary.push_str(&format!(" - Delivery: {delivery}"));
    model.set("summary", summary)?;
    Ok(())
}

fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn row(label: &str, widgets: impl IntoIterator<Item = Element>) -> HBox {
    let row = HBox::new().add(Text::new(label).css("font-size", 16).width(120));
    widgets.into_iter().fold(row, |row, widget| row.add(widget))
}

fn create_form(name: &str, product: &Product) -> VBox {
    VBox::new()
        .add(Label::new(name))
        .add(row(
            "Name:",
            [Input::new(product.name()).width(300).element().clone()],
        ))
        .add(row(
            "Price:",
            [Input::new(product.price())
                .width(300)
                .attr("type", "number")
                .element()
                .clone()],
        ))
        .add(row(
            "Count:",
            [
                Slider::new(product.count(), 0.0, 100.0)
                    .width(250)
                    .element()
                    .clone(),
                Label::new(product.count())
                    .css("margin", "5px 15px")
                    .element()
                    .clone(),
            ],
        ))
        .add(row(
            "Warranty:",
            [Checkbox::new(product.warranty()).element().clone()],
        ))
        .add(row(
            "Delivery:",
            [Select::new(DELIVERY_OPTIONS, product.delivery())
                .height(24)
                .element()
                .clone()],
        ))
        .add(row(
            "Service:",
            [Switch::new("With white gloves:", product.service())
                .element()
                .clone()],
        ))
        .add(row("Summary:", [Text::new(product.summary()).element().clone()]))
}

pub fn run() -> anyhow::Result<()> {
    let product1 = Product::builder()
        .on_changed(summarize)
        .set("name", "Wrench")
        .set("delivery", 0)
        .build_as::<Product>()?;
    let product2 = Product::builder()
        .on_changed(summarize)
        .set("name", "Drill")
        .set("count", 6)
        .set("price", 500)
        .set("service", false)
        .build_as::<Product>()?;

    let order_hammers = Button::new("Set Product 2 to Hammer", {
        let product = product2.clone();
        move |_| {
            product.set_name("Hammer");
            product.set_count(10);
            product.set_price(100.0);
            product.set_warranty(true);
            product.set_delivery(2);
            product.set_service(false);
        }
    });
    let increment_count = Button::new("Increment Product 1 count", {
        let product = product1.clone();
        move |_| {
            if let Err(err) = product.count().apply(BinaryOp::Add, 10) {
                log::error!("could not increment: {err}");
            }
        }
    });

    let view = VBox::new()
        .attr("id", "reactive")
        .add(
            create_form("Product 1", &product1)
                .css("border", "2px solid green")
                .css("padding", 12),
        )
        .add(
            create_form("Product 2", &product2)
                .css("border", "2px solid green")
                .css("padding", 12),
        )
        .add(order_hammers.clone())
        .add(increment_count.clone());

    crate::show("initial", &view.html_string());
    println!("{product1}\n{product2}\n");

    order_hammers.click();
    crate::show("after ordering hammers", &view.html_string());

    increment_count.click();
    increment_count.click();
    crate::show("after incrementing twice", &view.html_string());
    println!("{product1}\n{product2}");
    Ok(())
}
