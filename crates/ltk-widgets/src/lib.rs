//! # ltk-widgets
//!
//! Headless widgets for [`ltk`] models.
//!
//! Widgets keep their state in [`Element`]s that live in memory and render
//! to HTML with [`View::html_string`]. They implement [`ltk::Widget`], so
//! they bind to model attributes exactly like browser widgets would:
//!
//! ```
//! use ltk_widgets::prelude::*;
//!
//! ltk::model! {
//!     struct Product {
//!         name: String = "",
//!     }
//! }
//!
//! let product = Product::new();
//! let input = Input::new(product.name());
//! let text = Text::new(product.name());
//!
//! input.type_text("Wrench");
//! assert_eq!(text.html_string(), r#"<div class="ltk-text">Wrench</div>"#);
//! ```
pub mod element;
pub mod sync;
pub mod widgets;

pub use element::{Element, Node};
pub use widgets::*;

pub mod prelude {
    //! Re-export of the widgets along with the ltk prelude.
    pub use super::{
        Button, Checkbox, Element, HBox, Input, Label, Select, Slider, Switch, Text, VBox, View,
    };
    pub use ltk::prelude::*;
}
