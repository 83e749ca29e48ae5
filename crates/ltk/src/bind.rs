//! Two-way binding between widgets and attributes.
//!
//! A [`Widget`] is anything that shows a value and reports user edits.
//! [`WidgetExt::set_value`] either writes a plain value once or, given an
//! [`Attribute`], binds the two:
//!
//! - the widget shows the attribute's current value right away,
//! - every accepted write to the attribute is written to the widget,
//! - every user edit of the widget is written to the attribute.
//!
//! Equal writes are dropped by the attribute, so the round trip widget →
//! attribute → widget stops after one step.
use std::{cell::Cell, rc::Rc};

use crate::{
    attribute::{Attribute, ListenerId, WeakAttribute},
    value::Value,
};

/// Called by a widget after the user changed it.
pub type ChangeHandler<W> = Rc<dyn Fn(&W)>;

/// A view of a single value.
pub trait Widget: Clone + 'static {
    /// The text the widget currently shows.
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// The widget's value. Defaults to its text.
    fn read_value(&self) -> Value {
        Value::Str(self.text())
    }

    /// Show `value`. Defaults to its plain rendering.
    fn write_value(&self, value: &Value) {
        self.set_text(&value.to_string());
    }

    /// Register `handler` for user edits. Widgets that cannot be edited
    /// ignore it.
    fn on_change(&self, handler: ChangeHandler<Self>);
}

/// What [`WidgetExt::set_value`] accepts.
#[derive(Clone, Debug)]
pub enum Source {
    Value(Value),
    Attribute(Attribute),
}

impl From<Attribute> for Source {
    fn from(attribute: Attribute) -> Self {
        Source::Attribute(attribute)
    }
}

impl From<&Attribute> for Source {
    fn from(attribute: &Attribute) -> Self {
        Source::Attribute(attribute.clone())
    }
}

macro_rules! source_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Source {
            fn from(value: $ty) -> Self {
                Source::Value(value.into())
            }
        }
    )*};
}

source_from!(Value, bool, i32, i64, f64, String, &str);

/// Reading, writing and binding, for every [`Widget`].
pub trait WidgetExt: Widget {
    fn get_value(&self) -> Value {
        self.read_value()
    }

    /// Show a plain value, or bind to an attribute.
    fn set_value(&self, source: impl Into<Source>) -> Option<Binding> {
        match source.into() {
            Source::Value(value) => {
                self.write_value(&value);
                None
            }
            Source::Attribute(attribute) => Some(self.bind(&attribute)),
        }
    }

    /// Bind this widget to `attribute` in both directions.
    fn bind(&self, attribute: &Attribute) -> Binding {
        self.write_value(&attribute.get_value());

        let active = Rc::new(Cell::new(true));
        self.on_change(Rc::new({
            let attribute = attribute.downgrade();
            let active = active.clone();
            move |widget: &Self| {
                if !active.get() {
                    return;
                }
                if let Some(attribute) = attribute.upgrade() {
                    attribute.set_value(widget.read_value());
                }
            }
        }));

        let widget = self.clone();
        // The widget may report its own write as an edit, which writes back
        // into the attribute; the value must not be borrowed meanwhile.
        let listener = attribute.subscribe(move |attribute| {
            widget.write_value(&attribute.get_value())
        });
        log::trace!(
            "bound {}.{} to a widget",
            attribute.model_name(),
            attribute.name()
        );

        Binding {
            attribute: attribute.downgrade(),
            listener,
            active,
        }
    }
}

impl<W: Widget> WidgetExt for W {}

/// A live binding made by [`WidgetExt::bind`].
///
/// Dropping a binding keeps it alive; call [`Binding::unbind`] to end it.
#[derive(Debug)]
pub struct Binding {
    attribute: WeakAttribute,
    listener: ListenerId,
    active: Rc<Cell<bool>>,
}

impl Binding {
    /// Stop syncing in both directions.
    pub fn unbind(&self) {
        self.active.set(false);
        if let Some(attribute) = self.attribute.upgrade() {
            attribute.unsubscribe(self.listener);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}
