//! Headless DOM elements.
//!
//! An [`Element`] keeps attributes, styles, children and event handlers in
//! memory and renders to an HTML string. Clones are handles to the same
//! element.
use std::{fmt, rc::Rc};

use crate::sync::Shared;

type Handler = Rc<dyn Fn(&Element)>;

/// A child of an [`Element`].
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(Shared<String>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Shared::new(text.into()))
    }

    fn html_string(&self) -> String {
        match self {
            Node::Element(element) => element.html_string(),
            Node::Text(text) => escape(&text.get()),
        }
    }

    fn text_content(&self) -> String {
        match self {
            Node::Element(element) => element.text(),
            Node::Text(text) => text.cloned(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A headless DOM element.
#[derive(Clone)]
pub struct Element {
    name: Rc<str>,
    attributes: Shared<Vec<(String, Option<String>)>>,
    styles: Shared<Vec<(String, String)>>,
    children: Shared<Vec<Node>>,
    handlers: Shared<Vec<(String, Handler)>>,
}

/// Elements are equal when they are the same element.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.children.ptr_eq(&other.children)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html_string())
    }
}

impl Element {
    pub fn new(name: impl AsRef<str>) -> Self {
        Element {
            name: name.as_ref().into(),
            attributes: Default::default(),
            styles: Default::default(),
            children: Default::default(),
            handlers: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing its previous value.
    pub fn set_attribute(&self, key: impl AsRef<str>, value: impl ToString) {
        let mut attributes = self.attributes.get_mut();
        let (key, value) = (key.as_ref(), value.to_string());
        match attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, previous)) => *previous = Some(value),
            None => attributes.push((key.to_owned(), Some(value))),
        }
    }

    /// Set an attribute that has no value, like `checked`.
    pub fn set_flag(&self, key: impl AsRef<str>) {
        let mut attributes = self.attributes.get_mut();
        let key = key.as_ref();
        match attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, previous)) => *previous = None,
            None => attributes.push((key.to_owned(), None)),
        }
    }

    pub fn has_attribute(&self, key: impl AsRef<str>) -> bool {
        self.attributes.get().iter().any(|(k, _)| k == key.as_ref())
    }

    /// The attribute's value. Flags have no value.
    pub fn attribute(&self, key: impl AsRef<str>) -> Option<String> {
        self.attributes
            .get()
            .iter()
            .find(|(k, _)| k == key.as_ref())
            .and_then(|(_, v)| v.clone())
    }

    pub fn remove_attribute(&self, key: impl AsRef<str>) {
        self.attributes.get_mut().retain(|(k, _)| k != key.as_ref());
    }

    /// Add a style property.
    pub fn set_style(&self, key: impl AsRef<str>, value: impl ToString) {
        let mut styles = self.styles.get_mut();
        let (key, value) = (key.as_ref(), value.to_string());
        match styles.iter_mut().find(|(k, _)| k == key) {
            Some((_, previous)) => *previous = value,
            None => styles.push((key.to_owned(), value)),
        }
    }

    pub fn style(&self, key: impl AsRef<str>) -> Option<String> {
        self.styles
            .get()
            .iter()
            .find(|(k, _)| k == key.as_ref())
            .map(|(_, v)| v.clone())
    }

    pub fn remove_style(&self, key: impl AsRef<str>) {
        self.styles.get_mut().retain(|(k, _)| k != key.as_ref());
    }

    pub fn append(&self, child: impl Into<Node>) {
        self.children.get_mut().push(child.into());
    }

    pub fn children(&self) -> Vec<Node> {
        self.children.cloned()
    }

    /// The first child element named `name`.
    pub fn find_child(&self, name: &str) -> Option<Element> {
        self.children.get().iter().find_map(|child| match child {
            Node::Element(element) if element.name() == name => Some(element.clone()),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.children.get_mut().clear();
    }

    /// The text of every descendant, concatenated.
    pub fn text(&self) -> String {
        self.children.get().iter().map(Node::text_content).collect()
    }

    /// Replace every child with a single text node.
    pub fn set_text(&self, text: impl Into<String>) {
        self.children.set(vec![Node::text(text)]);
    }

    /// Register `handler` for the event `event`.
    pub fn on(&self, event: impl Into<String>, handler: impl Fn(&Element) + 'static) {
        self.handlers.get_mut().push((event.into(), Rc::new(handler)));
    }

    /// Call every handler registered for `event`. Returns how many ran.
    pub fn trigger(&self, event: &str) -> usize {
        let handlers = self
            .handlers
            .get()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| handler.clone())
            .collect::<Vec<_>>();
        log::trace!("{} <{}> handlers for `{event}`", handlers.len(), self.name);
        for handler in &handlers {
            handler(self);
        }
        handlers.len()
    }

    pub fn html_string(&self) -> String {
        // Only void elements may be written as `<tag />`; anything else
        // written that way is parsed as an unclosed open tag.
        fn tag_is_voidable(tag: &str) -> bool {
            matches!(
                tag,
                "area"
                    | "base"
                    | "br"
                    | "col"
                    | "hr"
                    | "img"
                    | "input"
                    | "link"
                    | "meta"
                    | "param"
                    | "source"
            )
        }

        let mut attributes = self.attributes.cloned();
        let styles = self.styles.get();
        if !styles.is_empty() {
            let styles = styles
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            match attributes.iter_mut().find(|(k, _)| k == "style") {
                Some((_, Some(previous))) => *previous = format!("{previous} {styles}"),
                Some((_, previous)) => *previous = Some(styles),
                None => attributes.push(("style".to_owned(), Some(styles))),
            }
        }
        let open = std::iter::once(self.name.to_string())
            .chain(attributes.iter().map(|(key, value)| match value {
                Some(value) => format!(r#"{key}="{}""#, escape(value)),
                None => key.clone(),
            }))
            .collect::<Vec<_>>()
            .join(" ");

        let children = self.children.get();
        if children.is_empty() && tag_is_voidable(&self.name) {
            format!("<{open} />")
        } else {
            let inner = children.iter().map(Node::html_string).collect::<String>();
            format!("<{open}>{inner}</{}>", self.name)
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn element_sanity() {
        let div = Element::new("div");
        div.set_attribute("id", "main");
        div.set_attribute("id", "reactive");
        div.set_style("padding", 12);
        div.set_style("border", "2px solid green");
        div.append(Node::text("Hello"));
        let input = Element::new("input");
        input.set_attribute("value", "a \"quoted\" <b>");
        input.set_flag("disabled");
        div.append(input.clone());

        assert_eq!(
            div.html_string(),
            r#"<div id="reactive" style="padding: 12; border: 2px solid green;">Hello<input value="a &quot;quoted&quot; &lt;b&gt;" disabled /></div>"#
        );
        assert_eq!(div.find_child("input"), Some(input));
        assert_eq!(div.text(), "Hello");
    }

    #[test]
    fn empty_non_void_elements_close() {
        assert_eq!(Element::new("div").html_string(), "<div></div>");
        assert_eq!(Element::new("br").html_string(), "<br />");
    }

    #[test]
    fn handlers_receive_the_element() {
        let button = Element::new("button");
        let clicks = Rc::new(Cell::new(0));
        button.on("click", {
            let clicks = clicks.clone();
            move |element| {
                assert_eq!(element.name(), "button");
                clicks.set(clicks.get() + 1);
            }
        });
        assert_eq!(button.trigger("click"), 1);
        assert_eq!(button.trigger("change"), 0);
        assert_eq!(clicks.get(), 1);
    }
}
