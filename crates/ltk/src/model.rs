//! Models: named groups of attributes sharing a [`Schema`].
//!
//! A [`Model`] owns one [`Attribute`] per declared field, in schema order,
//! plus any number of private slots that are neither observable nor
//! serialized. Every accepted write to a field runs the model's change hooks
//! with the field name and the new value before the field's listeners are
//! notified.
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    attribute::Attribute,
    error::ModelError,
    schema::Schema,
    value::{FromValue, Value},
};

/// How deep change hooks may nest before further hooks are skipped.
///
/// A hook that writes to its own model triggers the hooks again; this bounds
/// hooks that keep writing different values to each other.
pub const MAX_HOOK_DEPTH: usize = 16;

/// A change hook, called with the model, the field name and the new value.
///
/// Errors are logged and do not stop the remaining hooks or the write.
pub type Hook = Rc<dyn Fn(&Model, &str, &Value) -> anyhow::Result<()>>;

pub(crate) struct ModelInner {
    schema: Rc<Schema>,
    attributes: Vec<Attribute>,
    private: RefCell<BTreeMap<String, Value>>,
    hooks: RefCell<Vec<Hook>>,
    depth: Cell<usize>,
}

/// A live instance of a [`Schema`].
///
/// Cloning a model clones the handle; clones share their fields.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// Instantiate `schema` with every field at its default.
    pub fn new(schema: Rc<Schema>) -> Self {
        let inner = Rc::new_cyclic(|owner: &Weak<ModelInner>| ModelInner {
            attributes: schema
                .fields()
                .iter()
                .map(|field| {
                    Attribute::owned(
                        owner.clone(),
                        schema.name(),
                        field.name().to_owned(),
                        field.default().clone(),
                    )
                })
                .collect(),
            schema,
            private: RefCell::new(BTreeMap::new()),
            hooks: RefCell::new(vec![]),
            depth: Cell::new(0),
        });
        log::trace!("new {}", inner.schema.name());
        Model { inner }
    }

    pub(crate) fn from_inner(inner: Rc<ModelInner>) -> Self {
        Model { inner }
    }

    pub fn builder(schema: Rc<Schema>) -> ModelBuilder {
        ModelBuilder::new(schema)
    }

    pub fn schema(&self) -> &Rc<Schema> {
        &self.inner.schema
    }

    /// The model type's name.
    pub fn name(&self) -> &str {
        self.inner.schema.name()
    }

    /// Whether both handles point at the same model.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The cell of the field `name`.
    pub fn attribute(&self, name: &str) -> Result<Attribute, ModelError> {
        self.inner
            .schema
            .index_of(name)
            .map(|index| self.inner.attributes[index].clone())
            .ok_or_else(|| self.inner.schema.unknown_field(name))
    }

    /// Every field cell, in schema order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.inner.attributes
    }

    /// The current value of the field `name`.
    pub fn value(&self, name: &str) -> Result<Value, ModelError> {
        self.attribute(name).map(|attribute| attribute.get_value())
    }

    /// The current value of the field `name` as a plain Rust type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ModelError> {
        self.attribute(name)?.get()
    }

    /// Write the field `name`. See [`Attribute::set_value`].
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Value, ModelError> {
        Ok(self.attribute(name)?.set_value(value))
    }

    /// Store a private slot. Private slots never notify and are never
    /// serialized.
    pub fn set_private(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner
            .private
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    pub fn private(&self, name: &str) -> Option<Value> {
        self.inner.private.borrow().get(name).cloned()
    }

    /// Register a change hook.
    pub fn on_changed(
        &self,
        hook: impl Fn(&Model, &str, &Value) -> anyhow::Result<()> + 'static,
    ) {
        self.inner.hooks.borrow_mut().push(Rc::new(hook));
    }

    pub(crate) fn add_hook(&self, hook: Hook) {
        self.inner.hooks.borrow_mut().push(hook);
    }

    /// Run the change hooks for a write of `value` to the field `name`.
    ///
    /// Called by the field's attribute after every accepted write.
    pub fn changed(&self, name: &str, value: &Value) {
        let hooks = self.inner.hooks.borrow().clone();
        if hooks.is_empty() {
            return;
        }
        let depth = self.inner.depth.get();
        if depth >= MAX_HOOK_DEPTH {
            log::error!(
                "{}: change hooks nested {depth} deep while setting `{name}`, skipping them",
                self.name()
            );
            return;
        }
        self.inner.depth.set(depth + 1);
        for hook in hooks {
            if let Err(err) = hook(self, name, value) {
                log::error!(
                    "{}: change hook for `{name}` = {} failed: {err:#}",
                    self.name(),
                    value.repr()
                );
            }
        }
        self.inner.depth.set(depth);
    }

    /// Encode every field, in schema order, as a JSON object.
    pub fn encode(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|source| ModelError::Encode {
            model: self.name().to_owned(),
            source,
        })
    }

    /// Apply an encoded JSON object to this model.
    ///
    /// Keys are applied in schema order through the normal write path, so
    /// coercion, hooks and listeners all run. Keys the schema does not
    /// declare are logged and skipped.
    pub fn decode(&self, encoded: &str) -> Result<(), ModelError> {
        let decoded: Value = serde_json::from_str(encoded).map_err(|source| ModelError::Decode {
            model: self.name().to_owned(),
            source,
        })?;
        let mut fields = match decoded {
            Value::Map(fields) => fields,
            other => {
                return Err(ModelError::NotAMap {
                    model: self.name().to_owned(),
                    kind: other.kind(),
                });
            }
        };
        for attribute in self.attributes() {
            if let Some(value) = fields.remove(attribute.name()) {
                attribute.set_value(value);
            }
        }
        for key in fields.keys() {
            log::warn!("{}: skipping undeclared field `{key}`", self.name());
        }
        Ok(())
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.attributes.len()))?;
        for attribute in self.attributes() {
            attribute.with_value(|value| map.serialize_entry(attribute.name(), value))?;
        }
        map.end()
    }
}

/// `Product(name='Wrench', price=9.99)`
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .attributes()
            .iter()
            .map(|attribute| format!("{}={}", attribute.name(), attribute.with_value(Value::repr)))
            .collect::<Vec<_>>();
        write!(f, "{}({})", self.name(), fields.join(", "))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.name());
        for attribute in self.attributes() {
            debug.field(attribute.name(), &attribute.get_value());
        }
        debug.finish()
    }
}

/// A model type declared in Rust, usually with [`model!`](crate::model!).
pub trait Declared: Sized {
    fn schema() -> Rc<Schema>;

    /// Wrap a model without checking its schema. Use
    /// [`ModelBuilder::build_as`] for a checked conversion.
    fn from_model(model: Model) -> Self;

    fn model(&self) -> &Model;
}

/// Builds a [`Model`] with field overrides and hooks.
///
/// Hooks are registered before overrides are applied, so they observe the
/// overrides the same way they observe later writes.
#[derive(Clone)]
pub struct ModelBuilder {
    schema: Rc<Schema>,
    overrides: Vec<(String, Value)>,
    hooks: Vec<Hook>,
}

impl ModelBuilder {
    pub fn new(schema: Rc<Schema>) -> Self {
        ModelBuilder {
            schema,
            overrides: vec![],
            hooks: vec![],
        }
    }

    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    /// Override a field's default.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((name.into(), value.into()));
        self
    }

    /// Register a change hook.
    pub fn on_changed(
        mut self,
        hook: impl Fn(&Model, &str, &Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.hooks.push(Rc::new(hook));
        self
    }

    pub fn build(self) -> Result<Model, ModelError> {
        self.validate()?;
        let model = self.instantiate();
        self.apply_overrides(&model);
        Ok(model)
    }

    /// Build and wrap in the declared type `T`, checking that this builder
    /// was made for `T`'s schema.
    pub fn build_as<T: Declared>(self) -> Result<T, ModelError> {
        let expected = T::schema();
        if !Rc::ptr_eq(&expected, &self.schema) && !expected.same_shape(&self.schema) {
            return Err(ModelError::SchemaMismatch {
                expected: expected.name().to_owned(),
                found: self.schema.name().to_owned(),
            });
        }
        self.build().map(T::from_model)
    }

    /// Fail on overrides of fields the schema does not declare.
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        match self
            .overrides
            .iter()
            .find(|(name, _)| !self.schema.contains(name))
        {
            Some((name, _)) => Err(self.schema.unknown_field(name)),
            None => Ok(()),
        }
    }

    /// A model at its defaults with this builder's hooks registered.
    pub(crate) fn instantiate(&self) -> Model {
        let model = Model::new(self.schema.clone());
        for hook in &self.hooks {
            model.add_hook(hook.clone());
        }
        model
    }

    pub(crate) fn apply_overrides(&self, model: &Model) {
        for (name, value) in &self.overrides {
            if let Ok(attribute) = model.attribute(name) {
                attribute.set_value(value);
            }
        }
    }
}
