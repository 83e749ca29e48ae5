//! Model schemas.
//!
//! A [`Schema`] is the declared shape of a model type: its name and an
//! ordered list of fields, each with a default [`Value`]. The default's
//! [`Kind`] is the coercion target for every write to that field.
//!
//! Schemas are built once per model type and shared behind an [`Rc`].
use std::rc::Rc;

use crate::{
    error::ModelError,
    value::{Kind, Value},
};

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    default: Value,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    /// The kind every write to this field is coerced toward.
    pub fn kind(&self) -> Kind {
        self.default.kind()
    }
}

/// The declared fields of a model type, in declaration order.
#[derive(Debug, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Start declaring a schema for the model type `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            inherited: vec![],
            fields: vec![],
        }
    }

    /// The model type's name, used in reprs, errors and storage keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Same name and the same fields of the same kinds, in the same order.
    /// Defaults are not compared.
    pub fn same_shape(&self, other: &Schema) -> bool {
        self.name == other.name
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.kind() == b.kind())
    }

    pub(crate) fn unknown_field(&self, name: &str) -> ModelError {
        ModelError::UnknownField {
            model: self.name.clone(),
            field: name.to_owned(),
        }
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    inherited: Vec<Field>,
    fields: Vec<(String, Value)>,
}

impl SchemaBuilder {
    /// Declare a field with its default value.
    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.fields.push((name.into(), default.into()));
        self
    }

    /// Copy every field of `parent` ahead of the fields declared here.
    ///
    /// Declaring a field the parent already has replaces its default but keeps
    /// the parent's position.
    pub fn inherit(mut self, parent: &Schema) -> Self {
        for field in parent.fields() {
            match self.inherited.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => existing.default = field.default.clone(),
                None => self.inherited.push(field.clone()),
            }
        }
        self
    }

    pub fn build(self) -> Result<Rc<Schema>, ModelError> {
        let SchemaBuilder {
            name,
            inherited,
            fields,
        } = self;
        let inherited_len = inherited.len();
        let mut declared = inherited;
        for (field_name, default) in fields {
            if field_name.is_empty() || field_name.starts_with('_') {
                return Err(ModelError::InvalidFieldName {
                    model: name,
                    field: field_name,
                });
            }
            match declared.iter().position(|field| field.name == field_name) {
                Some(index) if index < inherited_len => declared[index].default = default,
                Some(_) => {
                    return Err(ModelError::DuplicateField {
                        model: name,
                        field: field_name,
                    });
                }
                None => declared.push(Field {
                    name: field_name,
                    default,
                }),
            }
        }
        Ok(Rc::new(Schema {
            name,
            fields: declared,
        }))
    }
}
