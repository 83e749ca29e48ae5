//! Widgets bound to model fields.
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use ltk::{ChangeHandler, prelude::*};

ltk::model! {
    struct Product {
        name: String = "",
        price: f64 = 0.0,
    }
}

/// An editable text box.
#[derive(Clone, Default)]
struct TextBox {
    text: Rc<RefCell<String>>,
    renders: Rc<Cell<usize>>,
    handlers: Rc<RefCell<Vec<ChangeHandler<TextBox>>>>,
}

impl TextBox {
    fn type_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
        let handlers = self.handlers.borrow().clone();
        for handler in handlers {
            handler(self);
        }
    }
}

impl Widget for TextBox {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        self.renders.set(self.renders.get() + 1);
        *self.text.borrow_mut() = text.to_owned();
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        self.handlers.borrow_mut().push(handler);
    }
}

/// A read-only label.
#[derive(Clone, Default)]
struct Caption {
    text: Rc<RefCell<String>>,
}

impl Widget for Caption {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
    }

    fn on_change(&self, _: ChangeHandler<Self>) {}
}

#[test]
fn widgets_sharing_a_field_stay_in_sync() {
    let product = Product::new();
    let input = TextBox::default();
    let caption = Caption::default();
    input.set_value(product.name());
    caption.set_value(product.name());

    input.type_text("Wrench");
    assert_eq!(product.name(), "Wrench");
    assert_eq!(caption.text(), "Wrench");

    // clear button
    product.set_name("");
    assert_eq!(input.text(), "");
    assert_eq!(caption.text(), "");
}

#[test]
fn edits_are_coerced_before_reaching_other_widgets() {
    let product = Product::new();
    let input = TextBox::default();
    let caption = Caption::default();
    input.set_value(product.price());
    caption.set_value(product.price());
    assert_eq!(input.text(), "0.0");

    input.type_text(" 9.99 ");
    assert_eq!(product.price(), 9.99);
    assert_eq!(caption.text(), "9.99");
    assert_eq!(input.text(), "9.99");

    // garbage is stored as typed
    input.type_text("cheap");
    assert_eq!(product.price(), "cheap");
    assert_eq!(caption.text(), "cheap");
}

#[test]
fn unbound_widgets_are_left_alone() {
    let product = Product::new();
    let input = TextBox::default();
    let binding = input.set_value(product.name()).unwrap();
    input.type_text("Drill");
    binding.unbind();

    product.set_name("Hammer");
    assert_eq!(input.text(), "Drill");
    input.type_text("Saw");
    assert_eq!(product.name(), "Hammer");
    assert_eq!(product.name().listener_count(), 0);
}

#[test]
fn dropped_models_do_not_keep_widgets_busy() {
    let input = TextBox::default();
    {
        let product = Product::new();
        input.set_value(product.name());
    }
    // the model is gone; edits go nowhere instead of failing
    input.type_text("orphan");
    assert_eq!(input.text(), "orphan");
}

#[test]
fn each_accepted_write_renders_once() {
    let product = Product::new();
    let input = TextBox::default();
    input.set_value(product.name());
    let renders = input.renders.get();

    product.set_name("a");
    product.set_name("a");
    product.set_name("b");
    assert_eq!(input.renders.get(), renders + 2);
}

/// A widget that reports every write as a change, the way a DOM input does
/// when its value is set and a `change` event is triggered by hand.
#[derive(Clone, Default)]
struct Echo {
    text: Rc<RefCell<String>>,
    changes: Rc<Cell<usize>>,
    handlers: Rc<RefCell<Vec<ChangeHandler<Echo>>>>,
}

impl Widget for Echo {
    fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
        let handlers = self.handlers.borrow().clone();
        for handler in handlers {
            self.changes.set(self.changes.get() + 1);
            handler(self);
        }
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        self.handlers.borrow_mut().push(handler);
    }
}

#[test]
fn widgets_echoing_writes_as_changes_settle() {
    let product = Product::new();
    let echo = Echo::default();
    let notified = Rc::new(Cell::new(0));
    product.name().subscribe({
        let notified = notified.clone();
        move |_| notified.set(notified.get() + 1)
    });
    echo.bind(&product.name());

    product.set_name("Wrench");
    assert_eq!(echo.text(), "Wrench");
    assert_eq!(echo.changes.get(), 1);
    assert_eq!(notified.get(), 1);

    // the echoed text is coerced back to the same float
    let price = Echo::default();
    price.bind(&product.price());
    product.set_price(3);
    assert_eq!(price.text(), "3.0");
    assert_eq!(price.changes.get(), 1);
    assert_eq!(product.price(), 3.0);
}
