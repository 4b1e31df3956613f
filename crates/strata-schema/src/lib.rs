mod descriptor;
mod entity;
mod error;
mod fallback;
mod normalize;

pub use descriptor::{FieldDescriptor, FieldKind, ScalarKind, VisibleWhen};
pub use entity::{
    ENTITIES, EntitySchema, default_fixed_fields, is_collection_entity, json_column_for,
};
pub use error::SchemaError;
pub use fallback::fallback_fields;
pub use normalize::{normalize_fields, sort_for_display};
