//! Models that save themselves.
//!
//! A persistent model is stored under `{ModelName}-{key}` in a [`Storage`].
//! Opening one loads the stored record (if any) over the defaults; after
//! that every accepted write re-encodes the whole model and stores it.
use std::{cell::Cell, ops::Deref, rc::Rc};

use anyhow::Context;

use crate::{
    error::ModelError,
    model::{Model, ModelBuilder},
    storage::Storage,
    value::Value,
};

thread_local! {
    static LAST_KEY: Cell<u128> = const { Cell::new(0) };
}

/// A fresh key: the current time in milliseconds, bumped so that keys
/// generated on one thread are strictly increasing.
pub fn generate_key() -> String {
    let now = web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    LAST_KEY
        .with(|last| {
            let key = now.max(last.get() + 1);
            last.set(key);
            key
        })
        .to_string()
}

/// The storage key of the model type `model` with the instance key `key`.
pub fn storage_key(model: &str, key: &str) -> String {
    format!("{model}-{key}")
}

/// A [`Model`] bound to a record in a [`Storage`].
#[derive(Clone)]
pub struct PersistentModel {
    model: Model,
    key: String,
    store: Rc<dyn Storage>,
}

impl PersistentModel {
    /// The instance key, without the model name prefix.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage_key(&self) -> String {
        storage_key(self.model.name(), &self.key)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Store the model now, whether or not anything changed.
    pub fn save(&self) -> Result<(), ModelError> {
        let encoded = self.model.encode()?;
        self.store.set_item(&self.storage_key(), &encoded)?;
        Ok(())
    }

    /// Delete the stored record. The model itself keeps working and will be
    /// stored again on its next change.
    pub fn remove(&self) -> Result<(), ModelError> {
        self.store.remove_item(&self.storage_key())?;
        log::debug!("removed {}", self.storage_key());
        Ok(())
    }
}

impl Deref for PersistentModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.model
    }
}

impl std::fmt::Debug for PersistentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentModel")
            .field("key", &self.key)
            .field("model", &self.model)
            .finish()
    }
}

fn persist(model: &Model, store: &dyn Storage, storage_key: &str) -> anyhow::Result<()> {
    let encoded = model.encode()?;
    store
        .set_item(storage_key, &encoded)
        .with_context(|| format!("could not store {storage_key}"))?;
    log::trace!("stored {storage_key}");
    Ok(())
}

impl ModelBuilder {
    /// Build a model stored in `store` under `key`, or under a fresh key from
    /// [`generate_key`].
    ///
    /// The model starts at its defaults, gets this builder's hooks, loads the
    /// stored record (an unreadable record is logged and ignored), starts
    /// persisting every change and finally applies this builder's overrides.
    pub fn persistent(
        self,
        store: Rc<dyn Storage>,
        key: Option<&str>,
    ) -> Result<PersistentModel, ModelError> {
        self.validate()?;
        let key = key.map_or_else(generate_key, str::to_owned);
        let storage_key = storage_key(self.schema().name(), &key);
        let model = self.instantiate();
        match store.get_item(&storage_key)? {
            Some(encoded) => {
                if let Err(err) = model.decode(&encoded) {
                    log::warn!("{storage_key}: ignoring unreadable record: {err}");
                }
            }
            None => log::trace!("{storage_key}: nothing stored yet"),
        }
        model.on_changed({
            let store = store.clone();
            move |model: &Model, _: &str, _: &Value| persist(model, store.as_ref(), &storage_key)
        });
        self.apply_overrides(&model);
        Ok(PersistentModel { model, key, store })
    }

    /// Open every record of this builder's model type found in `store`,
    /// ordered by key.
    pub fn load_all(&self, store: Rc<dyn Storage>) -> Result<Vec<PersistentModel>, ModelError> {
        let prefix = storage_key(self.schema().name(), "");
        let mut keys = store
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_owned))
            .collect::<Vec<_>>();
        keys.sort_by(|a, b| natural_order(a, b));
        keys.iter()
            .map(|key| self.clone().persistent(store.clone(), Some(key.as_str())))
            .collect()
    }
}

/// Numeric keys (the generated ones) sort by value, everything else after
/// them lexically.
fn natural_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
