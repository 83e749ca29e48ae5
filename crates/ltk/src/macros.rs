//! Declaring model types in Rust.

/// Declare a model type.
///
/// ```
/// ltk::model! {
///     /// A product for sale.
///     pub struct Product {
///         name: String = "Screwdriver",
///         price: f64 = 50.0,
///         count: i64 = 10,
///     }
/// }
///
/// let product = Product::builder().set("name", "Wrench").build_as::<Product>().unwrap();
/// product.set_price(9.99);
/// assert_eq!(product.to_string(), "Product(name='Wrench', price=9.99, count=10)");
/// assert_eq!(product.count(), 10);
/// ```
///
/// Each field's type is what its default is converted to before it becomes a
/// [`Value`](crate::Value); the resulting kind is what later writes are
/// coerced toward. The generated type derefs to [`Model`](crate::Model) and
/// has, per field, an accessor returning the field's
/// [`Attribute`](crate::Attribute) and a `set_<field>` shortcut.
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty = $default:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            model: $crate::Model,
        }

        impl $name {
            /// The schema shared by every instance of this model.
            pub fn schema() -> ::std::rc::Rc<$crate::Schema> {
                ::std::thread_local! {
                    static SCHEMA: ::std::rc::Rc<$crate::Schema> = $crate::Schema::builder(stringify!($name))
                        $(.field(stringify!($field), {
                            let default: $ty = ::std::convert::Into::into($default);
                            $crate::Value::from(default)
                        }))*
                        .build()
                        .expect(concat!("every field of ", stringify!($name), " is declared once"));
                }
                SCHEMA.with(::std::rc::Rc::clone)
            }

            /// A new instance with every field at its default.
            pub fn new() -> Self {
                $name {
                    model: $crate::Model::new(Self::schema()),
                }
            }

            pub fn builder() -> $crate::ModelBuilder {
                $crate::ModelBuilder::new(Self::schema())
            }

            $crate::paste::paste! {
                $(
                    $(#[$field_meta])*
                    pub fn $field(&self) -> $crate::Attribute {
                        self.model
                            .attribute(stringify!($field))
                            .expect("the field is part of the schema")
                    }

                    pub fn [<set_ $field>](&self, value: impl ::std::convert::Into<$crate::Value>) -> $crate::Value {
                        self.$field().set_value(value)
                    }
                )*
            }
        }

        impl $crate::Declared for $name {
            fn schema() -> ::std::rc::Rc<$crate::Schema> {
                $name::schema()
            }

            fn from_model(model: $crate::Model) -> Self {
                $name { model }
            }

            fn model(&self) -> &$crate::Model {
                &self.model
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Model;

            fn deref(&self) -> &$crate::Model {
                &self.model
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.model, f)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.model, f)
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::{Declared, ModelError, Value};

    crate::model! {
        struct Item {
            name: String = "",
            count: i64 = 1,
            tags: Vec<String> = Vec::<String>::new(),
        }
    }

    #[test]
    fn model_macro_sanity() {
        let item = Item::new();
        assert_eq!(item.name(), "");
        assert_eq!(item.set_count("3"), 3);
        assert_eq!(item.count().get::<i64>().unwrap(), 3);
        assert_eq!(item.tags().len().unwrap(), 0);
        assert_eq!(item.to_string(), "Item(name='', count=3, tags=[])");
        assert!(std::rc::Rc::ptr_eq(&Item::schema(), &<Item as Declared>::schema()));
    }

    crate::model! {
        struct Gauge {
            level: f64 = f64::NAN,
        }
    }

    #[test]
    fn nan_defaults_still_match_their_schema() {
        let gauge = Gauge::builder().build_as::<Gauge>().unwrap();
        assert!(gauge.level().get::<f64>().unwrap().is_nan());

        let rebuilt = crate::Schema::builder("Gauge")
            .field("level", f64::NAN)
            .build()
            .unwrap();
        assert!(crate::Model::builder(rebuilt).build_as::<Gauge>().is_ok());
    }

    #[test]
    fn build_as_checks_the_schema() {
        let other = crate::Schema::builder("Other").build().unwrap();
        let result = crate::Model::builder(other).build_as::<Item>();
        assert!(matches!(result, Err(ModelError::SchemaMismatch { .. })));

        let item = Item::builder().set("count", 5).build_as::<Item>().unwrap();
        assert_eq!(item.value("count").unwrap(), Value::Int(5));
    }
}
