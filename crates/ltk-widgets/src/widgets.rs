//! The widget set.
//!
//! Every widget is a thin handle over an [`Element`]. Value widgets take a
//! [`Source`]: a plain value to show, or an [`Attribute`](ltk::Attribute) to
//! bind to in both directions. Each editable widget also has a method that
//! simulates the user (`type_text`, `toggle`, `slide_to`, `choose`): it
//! updates the element and fires its `change` event.
use ltk::{ChangeHandler, Source, Value, Widget, WidgetExt};

use crate::element::{Element, Node};

/// Anything backed by an [`Element`].
pub trait View: Clone {
    fn element(&self) -> &Element;

    /// Set a style property.
    fn css(self, key: &str, value: impl ToString) -> Self {
        self.element().set_style(key, value);
        self
    }

    /// Set an attribute.
    fn attr(self, key: &str, value: impl ToString) -> Self {
        self.element().set_attribute(key, value);
        self
    }

    /// Set the width in pixels.
    fn width(self, px: u32) -> Self {
        self.css("width", format!("{px}px"))
    }

    fn height(self, px: u32) -> Self {
        self.css("height", format!("{px}px"))
    }

    fn html_string(&self) -> String {
        self.element().html_string()
    }
}

impl View for Element {
    fn element(&self) -> &Element {
        self
    }
}

/// Wraps an element without any setup, for handlers that only get the
/// element.
trait FromElement {
    fn from_element(element: Element) -> Self;
}

fn forward_change<W: Widget + FromElement>(element: &Element, handler: ChangeHandler<W>) {
    element.on("change", move |element| handler(&W::from_element(element.clone())));
}

macro_rules! view {
    ($($ty:ident),*) => {$(
        impl View for $ty {
            fn element(&self) -> &Element {
                &self.element
            }
        }

        impl FromElement for $ty {
            fn from_element(element: Element) -> Self {
                $ty { element }
            }
        }
    )*};
}

view!(Text, Label, Input, Checkbox, Switch, Slider, Select, VBox, HBox, Button);

/// Read-only text in a `div`.
#[derive(Clone, Debug)]
pub struct Text {
    element: Element,
}

impl Text {
    pub fn new(source: impl Into<Source>) -> Self {
        let text = Text {
            element: Element::new("div"),
        };
        text.element.set_attribute("class", "ltk-text");
        text.set_value(source);
        text
    }
}

impl Widget for Text {
    fn text(&self) -> String {
        self.element.text()
    }

    fn set_text(&self, text: &str) {
        self.element.set_text(text);
    }

    fn on_change(&self, _: ChangeHandler<Self>) {}
}

/// Read-only text in a `label`.
#[derive(Clone, Debug)]
pub struct Label {
    element: Element,
}

impl Label {
    pub fn new(source: impl Into<Source>) -> Self {
        let label = Label {
            element: Element::new("label"),
        };
        label.element.set_attribute("class", "ltk-label");
        label.set_value(source);
        label
    }
}

impl Widget for Label {
    fn text(&self) -> String {
        self.element.text()
    }

    fn set_text(&self, text: &str) {
        self.element.set_text(text);
    }

    fn on_change(&self, _: ChangeHandler<Self>) {}
}

/// A single line text input.
#[derive(Clone, Debug)]
pub struct Input {
    element: Element,
}

impl Input {
    pub fn new(source: impl Into<Source>) -> Self {
        let input = Input {
            element: Element::new("input"),
        };
        input.element.set_attribute("class", "ltk-input");
        input.set_value(source);
        input
    }

    /// Replace the content as if the user typed `text` and left the field.
    pub fn type_text(&self, text: &str) {
        self.element.set_attribute("value", text);
        self.element.trigger("change");
    }
}

impl Widget for Input {
    fn text(&self) -> String {
        self.element.attribute("value").unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.element.set_attribute("value", text);
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        forward_change(&self.element, handler);
    }
}

fn read_checked(input: &Element) -> Value {
    Value::Bool(input.has_attribute("checked"))
}

fn parse_flag(text: &str) -> Value {
    Value::Bool(matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "checked"
    ))
}

fn write_checked(input: &Element, value: &Value) {
    if value.is_truthy() {
        input.set_flag("checked");
    } else {
        input.remove_attribute("checked");
    }
}

/// A checkbox holding a bool.
#[derive(Clone, Debug)]
pub struct Checkbox {
    element: Element,
}

impl Checkbox {
    pub fn new(source: impl Into<Source>) -> Self {
        let checkbox = Checkbox {
            element: Element::new("input"),
        };
        checkbox.element.set_attribute("type", "checkbox");
        checkbox.element.set_attribute("class", "ltk-checkbox");
        checkbox.set_value(source);
        checkbox
    }

    /// Click the box.
    pub fn toggle(&self) {
        write_checked(&self.element, &Value::Bool(!self.read_value().is_truthy()));
        self.element.trigger("change");
    }
}

impl Widget for Checkbox {
    fn text(&self) -> String {
        self.read_value().to_string()
    }

    fn set_text(&self, text: &str) {
        write_checked(&self.element, &parse_flag(text));
    }

    fn read_value(&self) -> Value {
        read_checked(&self.element)
    }

    fn write_value(&self, value: &Value) {
        write_checked(&self.element, value);
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        forward_change(&self.element, handler);
    }
}

/// A labelled on/off switch holding a bool.
#[derive(Clone, Debug)]
pub struct Switch {
    element: Element,
}

impl Switch {
    pub fn new(label: &str, source: impl Into<Source>) -> Self {
        let element = Element::new("label");
        element.set_attribute("class", "ltk-switch");
        element.append(Node::text(label));
        let input = Element::new("input");
        input.set_attribute("type", "checkbox");
        element.append(input);
        let switch = Switch { element };
        switch.set_value(source);
        switch
    }

    fn input(&self) -> Option<Element> {
        self.element.find_child("input")
    }

    /// Flip the switch.
    pub fn toggle(&self) {
        if let Some(input) = self.input() {
            write_checked(&input, &Value::Bool(!self.read_value().is_truthy()));
            self.element.trigger("change");
        }
    }
}

impl Widget for Switch {
    fn text(&self) -> String {
        self.read_value().to_string()
    }

    fn set_text(&self, text: &str) {
        self.write_value(&parse_flag(text));
    }

    fn read_value(&self) -> Value {
        self.input()
            .map(|input| read_checked(&input))
            .unwrap_or(Value::Bool(false))
    }

    fn write_value(&self, value: &Value) {
        if let Some(input) = self.input() {
            write_checked(&input, value);
        }
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        forward_change(&self.element, handler);
    }
}

/// A range input holding a number.
#[derive(Clone, Debug)]
pub struct Slider {
    element: Element,
}

impl Slider {
    pub fn new(source: impl Into<Source>, min: f64, max: f64) -> Self {
        let slider = Slider {
            element: Element::new("input"),
        };
        slider.element.set_attribute("type", "range");
        slider.element.set_attribute("class", "ltk-slider");
        slider.element.set_attribute("min", min);
        slider.element.set_attribute("max", max);
        slider.set_value(source);
        slider
    }

    /// Drag the handle to `value`, clamped to the slider's range.
    pub fn slide_to(&self, value: f64) {
        let bound = |key: &str, fallback: f64| {
            self.element
                .attribute(key)
                .and_then(|bound| bound.parse::<f64>().ok())
                .filter(|bound| !bound.is_nan())
                .unwrap_or(fallback)
        };
        let (a, b) = (bound("min", f64::MIN), bound("max", f64::MAX));
        let value = value.clamp(a.min(b), a.max(b));
        self.element.set_attribute("value", Value::Float(value));
        self.element.trigger("change");
    }
}

impl Widget for Slider {
    fn text(&self) -> String {
        self.element.attribute("value").unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.element.set_attribute("value", text);
    }

    fn read_value(&self) -> Value {
        self.text()
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Str(self.text()))
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        forward_change(&self.element, handler);
    }
}

/// A drop-down whose value is the index of the selected option.
#[derive(Clone, Debug)]
pub struct Select {
    element: Element,
}

impl Select {
    pub fn new<S: AsRef<str>>(
        options: impl IntoIterator<Item = S>,
        source: impl Into<Source>,
    ) -> Self {
        let element = Element::new("select");
        element.set_attribute("class", "ltk-select");
        for option in options {
            let node = Element::new("option");
            node.set_text(option.as_ref());
            element.append(node);
        }
        let select = Select { element };
        select.set_value(source);
        select
    }

    fn options(&self) -> Vec<Element> {
        self.element
            .children()
            .into_iter()
            .filter_map(|child| match child {
                Node::Element(option) if option.name() == "option" => Some(option),
                _ => None,
            })
            .collect()
    }

    fn select(&self, index: Option<usize>) {
        for (i, option) in self.options().iter().enumerate() {
            if Some(i) == index {
                option.set_flag("selected");
            } else {
                option.remove_attribute("selected");
            }
        }
    }

    /// The text of the selected option.
    pub fn selected_text(&self) -> Option<String> {
        self.options()
            .into_iter()
            .find(|option| option.has_attribute("selected"))
            .map(|option| option.text())
    }

    /// Pick the option at `index`. Out of range indices select nothing.
    pub fn choose(&self, index: usize) {
        self.select(Some(index));
        self.element.trigger("change");
    }
}

impl Widget for Select {
    fn text(&self) -> String {
        self.read_value().to_string()
    }

    fn set_text(&self, text: &str) {
        self.write_value(&Value::from(text));
    }

    fn read_value(&self) -> Value {
        self.options()
            .iter()
            .position(|option| option.has_attribute("selected"))
            .map(Value::from)
            .unwrap_or(Value::Int(-1))
    }

    fn write_value(&self, value: &Value) {
        let index = value
            .coerce(ltk::Kind::Int)
            .ok()
            .and_then(|index| index.to::<i64>())
            .and_then(|index| usize::try_from(index).ok());
        self.select(index);
    }

    fn on_change(&self, handler: ChangeHandler<Self>) {
        forward_change(&self.element, handler);
    }
}

/// A clickable button.
#[derive(Clone, Debug)]
pub struct Button {
    element: Element,
}

impl Button {
    pub fn new(label: impl Into<Source>, on_click: impl Fn(&Button) + 'static) -> Self {
        let button = Button {
            element: Element::new("button"),
        };
        button.element.set_attribute("class", "ltk-button");
        button.set_value(label);
        button
            .element
            .on("click", move |element| on_click(&Button::from_element(element.clone())));
        button
    }

    pub fn click(&self) {
        self.element.trigger("click");
    }
}

impl Widget for Button {
    fn text(&self) -> String {
        self.element.text()
    }

    fn set_text(&self, text: &str) {
        self.element.set_text(text);
    }

    fn on_change(&self, _: ChangeHandler<Self>) {}
}

macro_rules! container {
    ($($ty:ident $class:literal),*) => {$(
        impl $ty {
            pub fn new() -> Self {
                let element = Element::new("div");
                element.set_attribute("class", $class);
                $ty { element }
            }

            /// Append a child view.
            pub fn add(self, child: impl View) -> Self {
                self.element.append(child.element().clone());
                self
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    )*};
}

/// Lays its children out top to bottom.
#[derive(Clone, Debug)]
pub struct VBox {
    element: Element,
}

/// Lays its children out left to right.
#[derive(Clone, Debug)]
pub struct HBox {
    element: Element,
}

container!(VBox "ltk-vbox", HBox "ltk-hbox");

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slider_bounds_may_be_reversed_or_missing() {
        let slider = Slider::new(50.0, 100.0, 0.0);
        slider.slide_to(500.0);
        assert_eq!(slider.get_value(), 100.0);
        slider.slide_to(5.0);
        assert_eq!(slider.get_value(), 5.0);

        let slider = Slider::new(50.0, f64::NAN, 10.0);
        slider.slide_to(-3.0);
        assert_eq!(slider.get_value(), -3.0);
        slider.slide_to(30.0);
        assert_eq!(slider.get_value(), 10.0);
    }
}
