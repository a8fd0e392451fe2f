//! Template storage and placeholder substitution
//!
//! Widget templates are plain markup with `{{name}}` placeholders:
//!
//! ```text
//! <div style="border-left: 4px solid {{color_primary}}">
//!     <h3>{{title}}</h3>
//!     <p>{{message}}</p>
//! </div>
//! ```
//!
//! Field values are escaped on the way in; the four `{{color_*}}` slots take
//! the definition's palette verbatim; whatever is left unmatched is removed.

mod store;
mod substitute;

pub use store::{FsTemplateStore, MemoryTemplateStore, StoreError, TemplateStore, TEMPLATE_EXTENSION};
pub use substitute::{
    apply_palette, escape_html, fill, placeholder, strip_unmatched, substitute_fields,
    FALLBACK_TEMPLATE,
};
