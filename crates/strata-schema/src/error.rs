use std::fmt;

#[derive(Debug)]
pub enum SchemaError {
    /// `array` field declared without a usable option list.
    MissingOptions(String),
    /// `object` field declared without a non-empty `object_structure`.
    MissingStructure(String),
    UnknownType { key: String, declared: String },
    BadListValues { key: String, reason: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingOptions(key) => {
                write!(f, "field `{key}`: array type requires a non-empty enum")
            }
            SchemaError::MissingStructure(key) => {
                write!(
                    f,
                    "field `{key}`: object type requires a non-empty object_structure"
                )
            }
            SchemaError::UnknownType { key, declared } => {
                write!(f, "field `{key}`: unknown type `{declared}`")
            }
            SchemaError::BadListValues { key, reason } => {
                write!(f, "field `{key}`: malformed list_values: {reason}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
