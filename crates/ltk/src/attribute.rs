//! Observable cells.
//!
//! An [`Attribute`] holds one field's current [`Value`]. Every accepted write
//! is coerced toward the kind of the field's default, compared against the
//! current value (equal writes are dropped), reported to the owning model's
//! change hooks and finally pushed to every subscribed listener.
//!
//! Attributes are cheap to clone; clones share the same cell.
use std::{
    cell::{Cell, RefCell},
    cmp::Ordering,
    fmt,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    error::{ModelError, OperationError},
    model::{Model, ModelInner},
    schedule,
    value::{BinaryOp, FromValue, Kind, UnaryOp, Value},
};

/// Identifies a listener registered with [`Attribute::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Attribute)>;

pub(crate) struct AttributeInner {
    owner: Weak<ModelInner>,
    model: String,
    name: String,
    kind: Kind,
    value: RefCell<Value>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

/// An observable cell holding one field of a model.
#[derive(Clone)]
pub struct Attribute {
    inner: Rc<AttributeInner>,
}

/// A non-owning handle to an [`Attribute`].
#[derive(Clone)]
pub struct WeakAttribute {
    inner: Weak<AttributeInner>,
}

impl WeakAttribute {
    pub fn upgrade(&self) -> Option<Attribute> {
        self.inner.upgrade().map(|inner| Attribute { inner })
    }
}

impl fmt::Debug for WeakAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakAttribute").field(&self.upgrade()).finish()
    }
}

impl Attribute {
    /// A cell that belongs to no model. Writes still coerce toward the kind of
    /// `initial` but there are no change hooks to run.
    pub fn detached(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        Self::owned(Weak::new(), "Attribute", name.into(), initial.into())
    }

    pub(crate) fn owned(owner: Weak<ModelInner>, model: &str, name: String, initial: Value) -> Self {
        Attribute {
            inner: Rc::new(AttributeInner {
                owner,
                model: model.to_owned(),
                name,
                kind: initial.kind(),
                value: RefCell::new(initial),
                listeners: RefCell::new(vec![]),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The name of the owning model type.
    pub fn model_name(&self) -> &str {
        &self.inner.model
    }

    /// The kind incoming values are coerced toward.
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// The owning model, if it is still alive.
    pub fn model(&self) -> Option<Model> {
        self.inner.owner.upgrade().map(Model::from_inner)
    }

    pub fn downgrade(&self) -> WeakAttribute {
        WeakAttribute {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Attribute) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn get_value(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Run `f` with a reference to the current value, without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Extract the current value as a plain Rust type.
    pub fn get<T: FromValue>(&self) -> Result<T, ModelError> {
        self.with_value(|value| {
            value.to::<T>().ok_or_else(|| ModelError::WrongType {
                model: self.inner.model.clone(),
                field: self.inner.name.clone(),
                kind: value.kind(),
                expected: std::any::type_name::<T>(),
            })
        })
    }

    /// Write a new value and return the value the cell now holds.
    ///
    /// The value is coerced toward [`Attribute::kind`]; if that fails the
    /// literal is stored instead. Writing a value equal to the current one
    /// does nothing. Otherwise the owning model's hooks run first and then
    /// every listener is notified once.
    pub fn set_value(&self, value: impl Into<Value>) -> Value {
        let value = value.into();
        let value = match value.coerce(self.inner.kind) {
            Ok(coerced) => coerced,
            Err(err) => {
                log::debug!(
                    "{}.{}: {err}, storing {} as-is",
                    self.inner.model,
                    self.inner.name,
                    value.repr()
                );
                value
            }
        };
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return current.clone();
            }
            *current = value.clone();
        }
        log::trace!("{}.{} = {}", self.inner.model, self.inner.name, value.repr());
        if let Some(model) = self.model() {
            model.changed(&self.inner.name, &value);
        }
        self.notify();
        value
    }

    /// Call every listener with this attribute.
    ///
    /// Listeners registered or removed while notifying take effect on the
    /// next notification.
    pub fn notify(&self) {
        let listeners = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(self);
        }
    }

    /// Register a listener called after every accepted write.
    pub fn subscribe(&self, listener: impl Fn(&Attribute) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// A stream of every value accepted from now on.
    ///
    /// The listener feeding the stream removes itself once the receiver is
    /// dropped.
    pub fn stream(&self) -> async_channel::Receiver<Value> {
        let (tx, rx) = async_channel::unbounded();
        let id = Rc::new(Cell::new(None));
        let listener = self.subscribe({
            let id = id.clone();
            move |attribute: &Attribute| {
                if tx.try_send(attribute.get_value()).is_err() {
                    if let Some(id) = id.get() {
                        attribute.unsubscribe(id);
                    }
                }
            }
        });
        id.set(Some(listener));
        rx
    }

    /// Read an item of a list, a map or a string.
    ///
    /// Negative list indices count from the end. Map keys that are not
    /// strings are looked up by their rendering.
    pub fn item(&self, key: impl Into<Value>) -> Result<Value, ModelError> {
        let key = key.into();
        let value = self.inner.value.borrow();
        match &*value {
            Value::List(items) => {
                let index = self.index(&key, items.len())?;
                Ok(items[index].clone())
            }
            Value::Str(s) => {
                let chars = s.chars().collect::<Vec<_>>();
                let index = self.index(&key, chars.len())?;
                Ok(Value::from(chars[index]))
            }
            Value::Map(map) => {
                let key = map_key(&key);
                map.get(&key)
                    .cloned()
                    .ok_or_else(|| self.missing_key(format!("'{key}'")))
            }
            other => Err(self.unsupported(other.kind(), "item access")),
        }
    }

    /// Replace an item of a list or a map, then write the updated container
    /// back through [`Attribute::set_value`].
    pub fn set_item(
        &self,
        key: impl Into<Value>,
        item: impl Into<Value>,
    ) -> Result<Value, ModelError> {
        let key = key.into();
        let mut updated = self.get_value();
        match &mut updated {
            Value::List(items) => {
                let index = self.index(&key, items.len())?;
                items[index] = item.into();
            }
            Value::Map(map) => {
                map.insert(map_key(&key), item.into());
            }
            other => {
                return Err(ModelError::NotAContainer {
                    model: self.inner.model.clone(),
                    field: self.inner.name.clone(),
                    kind: other.kind(),
                });
            }
        }
        Ok(self.set_value(updated))
    }

    /// Number of items in a list, map or string.
    pub fn len(&self) -> Result<usize, ModelError> {
        self.with_value(|value| match value {
            Value::List(items) => Ok(items.len()),
            Value::Map(map) => Ok(map.len()),
            Value::Str(s) => Ok(s.chars().count()),
            other => Err(self.unsupported(other.kind(), "len")),
        })
    }

    /// Membership: list items, map keys or substrings.
    pub fn contains(&self, needle: impl Into<Value>) -> Result<bool, ModelError> {
        let needle = needle.into();
        self.with_value(|value| match (value, &needle) {
            (Value::List(items), needle) => Ok(items.contains(needle)),
            (Value::Map(map), needle) => Ok(map.contains_key(&map_key(needle))),
            (Value::Str(s), Value::Str(needle)) => Ok(s.contains(needle.as_str())),
            (Value::Str(_), needle) => Err(self.unsupported(needle.kind(), "in")),
            (other, _) => Err(self.unsupported(other.kind(), "in")),
        })
    }

    /// Edit a copy of the current value and write it back.
    ///
    /// This goes through [`Attribute::set_value`], so hooks and listeners
    /// fire once if (and only if) the edit changed anything.
    pub fn mutate(&self, f: impl FnOnce(&mut Value)) -> Value {
        let mut value = self.get_value();
        f(&mut value);
        self.set_value(value)
    }

    /// Edit the stored value in place.
    ///
    /// In-place edits skip coercion and the model's hooks. Listeners are
    /// notified later through the scheduler; several edits in a row collapse
    /// into a single notification.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let result = f(&mut *self.inner.value.borrow_mut());
        self.notify_later();
        result
    }

    /// Schedule a notification for the next scheduler round.
    pub fn notify_later(&self) {
        let key = format!(
            "{}.{}@{:p}",
            self.inner.model,
            self.inner.name,
            Rc::as_ptr(&self.inner)
        );
        let attribute = self.downgrade();
        schedule::schedule(key, Duration::ZERO, move || {
            if let Some(attribute) = attribute.upgrade() {
                attribute.notify();
            }
        });
    }

    /// Combine the current value with `rhs` and store the result.
    pub fn apply(&self, op: BinaryOp, rhs: impl Into<Value>) -> Result<Value, ModelError> {
        let rhs = rhs.into();
        let result = self
            .with_value(|value| value.binary(op, &rhs))
            .map_err(|source| self.operation_error(source))?;
        Ok(self.set_value(result))
    }

    pub fn unary(&self, op: UnaryOp) -> Result<Value, ModelError> {
        self.with_value(|value| value.unary(op))
            .map_err(|source| self.operation_error(source))
    }

    pub fn is_truthy(&self) -> bool {
        self.with_value(Value::is_truthy)
    }

    fn index(&self, key: &Value, len: usize) -> Result<usize, ModelError> {
        let index = match key {
            Value::Int(index) => *index,
            Value::Bool(b) => i64::from(*b),
            other => return Err(self.missing_key(other.repr())),
        };
        let resolved = if index < 0 { index + len as i64 } else { index };
        if resolved < 0 || resolved >= len as i64 {
            return Err(ModelError::Index {
                model: self.inner.model.clone(),
                field: self.inner.name.clone(),
                index,
                len,
            });
        }
        Ok(resolved as usize)
    }

    fn missing_key(&self, key: String) -> ModelError {
        ModelError::MissingKey {
            model: self.inner.model.clone(),
            field: self.inner.name.clone(),
            key,
        }
    }

    fn unsupported(&self, kind: Kind, operation: &'static str) -> ModelError {
        ModelError::Unsupported {
            model: self.inner.model.clone(),
            field: self.inner.name.clone(),
            kind,
            operation,
        }
    }

    fn operation_error(&self, source: OperationError) -> ModelError {
        ModelError::Operation {
            model: self.inner.model.clone(),
            field: self.inner.name.clone(),
            source,
        }
    }
}

fn map_key(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_value(|value| fmt::Display::fmt(value, f))
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Attribute");
        debug
            .field("model", &self.inner.model)
            .field("name", &self.inner.name);
        match self.inner.value.try_borrow() {
            Ok(value) => debug.field("value", &*value),
            // mid `with_mut`
            Err(_) => debug.field("value", &"<borrowed>"),
        };
        debug.finish()
    }
}

/// Attributes compare by the values they hold.
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.inner.value.borrow() == *other.inner.value.borrow()
    }
}

impl PartialEq<Value> for Attribute {
    fn eq(&self, other: &Value) -> bool {
        *self.inner.value.borrow() == *other
    }
}

impl PartialOrd<Value> for Attribute {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        self.inner.value.borrow().partial_cmp(other)
    }
}

macro_rules! scalar_cmp {
    ($($ty:ty),*) => {$(
        impl PartialEq<$ty> for Attribute {
            fn eq(&self, other: &$ty) -> bool {
                *self.inner.value.borrow() == *other
            }
        }

        impl PartialOrd<$ty> for Attribute {
            fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                self.inner.value.borrow().partial_cmp(other)
            }
        }
    )*};
}

scalar_cmp!(bool, i32, i64, f64, String, &str);

macro_rules! binary_ops {
    ($($trait:ident $method:ident $op:ident),*) => {$(
        impl<R: Into<Value>> std::ops::$trait<R> for &Attribute {
            type Output = Result<Value, ModelError>;

            fn $method(self, rhs: R) -> Self::Output {
                let rhs = rhs.into();
                self.with_value(|value| value.binary(BinaryOp::$op, &rhs))
                    .map_err(|source| self.operation_error(source))
            }
        }
    )*};
}

binary_ops!(
    Add add Add,
    Sub sub Sub,
    Mul mul Mul,
    Div div Div,
    Rem rem Rem,
    BitAnd bitand BitAnd,
    BitOr bitor BitOr,
    BitXor bitxor BitXor,
    Shl shl Shl,
    Shr shr Shr
);

impl std::ops::Neg for &Attribute {
    type Output = Result<Value, ModelError>;

    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}

impl std::ops::Not for &Attribute {
    type Output = bool;

    fn not(self) -> bool {
        !self.is_truthy()
    }
}
