//! # ltk
//!
//! Reactive models for user interfaces.
//!
//! A [`Model`] is a named group of observable [`Attribute`]s declared by a
//! [`Schema`]. Widgets bind to attributes in both directions, so editing a
//! widget updates the model and updating the model updates every widget
//! bound to it. Models can persist themselves to a key-value [`Storage`]
//! (in memory, a JSON file, or the browser's `localStorage` with the `web`
//! feature).
//!
//! ```
//! use ltk::prelude::*;
//!
//! ltk::model! {
//!     pub struct Product {
//!         name: String = "Screwdriver",
//!         price: f64 = 50.0,
//!     }
//! }
//!
//! let product = Product::new();
//! let rx = product.price().stream();
//! product.set_price("19.99");
//! assert_eq!(product.price(), 19.99);
//! assert_eq!(rx.try_recv().unwrap(), 19.99);
//! ```
//!
//! ## Logging
//! Everything logs through the [`log`] facade. Cell writes and scheduling are
//! logged at `trace`, failing change hooks at `error`.
pub mod attribute;
pub mod bind;
pub mod error;
mod macros;
pub mod model;
pub mod persist;
pub mod schedule;
pub mod schema;
pub mod storage;
pub mod value;
#[cfg(feature = "web")]
pub mod web;

#[doc(hidden)]
pub use paste;

pub use attribute::{Attribute, ListenerId, WeakAttribute};
pub use bind::{Binding, ChangeHandler, Source, Widget, WidgetExt};
pub use error::{CoercionError, ModelError, OperationError, StorageError};
pub use model::{Declared, Hook, MAX_HOOK_DEPTH, Model, ModelBuilder};
pub use persist::{PersistentModel, generate_key};
pub use schema::{Field, Schema, SchemaBuilder};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, Storage};
pub use value::{BinaryOp, FromValue, Kind, UnaryOp, Value};

pub mod prelude {
    //! Re-exports for convenience
    pub use super::{
        Attribute, Binding, Declared, MemoryStorage, Model, ModelBuilder, ModelError,
        PersistentModel, Schema, Storage, Value, Widget, WidgetExt,
    };
}
