mod coerce;
mod engine;
mod error;
mod project;
mod render;
mod resolver;

pub use coerce::{coerce, is_empty_value, prune};
pub use engine::FormEngine;
pub use error::{EngineError, ProjectionError, ValidationError};
pub use project::{Projection, project};
pub use render::{FieldRenderer, NO_DEFAULT_KEYS, effective_value, render_field, render_form};
pub use resolver::{
    REFERENCE_TYPE_KEY, is_relation_key, is_visible, option_set, relation_options, stale_keys,
    visible_fields,
};
