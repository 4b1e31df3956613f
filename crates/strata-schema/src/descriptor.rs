use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// One declared attribute of an entity, either a stored column ("fixed")
/// or a key inside the entity's JSON column ("dynamic").
///
/// The metadata service speaks a looser duck-typed format (`type` string plus
/// an optional `list_values` payload); parsing converts it into a tagged
/// variant and rejects descriptors whose payload does not match their tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireField", into = "WireField")]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: Option<String>,
    pub default_value: Option<Value>,
    pub order_index: Option<u32>,
    pub visible_when: Option<VisibleWhen>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Single-choice selector; the wire calls this `array`.
    Enum { options: Vec<String> },
    /// Nested structure rendered and stored as a sub-object.
    Object { structure: Vec<FieldDescriptor> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Integer,
    Number,
    Boolean,
    Date,
}

/// `conditional_on` on the wire: show the field only while the sibling
/// `trigger_key` holds exactly `expected_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWhen {
    pub trigger_key: String,
    pub expected_value: Value,
}

impl FieldDescriptor {
    pub fn new(key: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            required: false,
            description: None,
            default_value: None,
            order_index: None,
            visible_when: None,
        }
    }

    pub fn scalar(key: &str, kind: ScalarKind) -> Self {
        Self::new(key, FieldKind::Scalar(kind))
    }

    pub fn enumeration(key: &str, options: &[&str]) -> Self {
        Self::new(
            key,
            FieldKind::Enum {
                options: options.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    pub fn object(key: &str, structure: Vec<FieldDescriptor>) -> Self {
        Self::new(key, FieldKind::Object { structure })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn default_to(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn order(mut self, index: u32) -> Self {
        self.order_index = Some(index);
        self
    }

    pub fn visible_when(mut self, trigger_key: &str, expected_value: Value) -> Self {
        self.visible_when = Some(VisibleWhen {
            trigger_key: trigger_key.to_string(),
            expected_value,
        });
        self
    }

    /// Display rank: descriptors without an explicit order sort last.
    pub fn display_rank(&self) -> u32 {
        self.order_index.unwrap_or(999)
    }
}

// ── Wire format ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireField {
    key: String,
    #[serde(rename = "type")]
    declared: String,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditional_on: Option<WireCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireCondition {
    field: String,
    value: Value,
}

enum ListPayload {
    Options(Vec<String>),
    Structure(Vec<WireField>),
}

/// `list_values` arrives in three shapes: `{enum: [..]}`,
/// `{object_structure: [..]}`, or (legacy) a bare array of strings.
/// Any of them may additionally be JSON-encoded as a string.
fn parse_list_values(key: &str, raw: Value) -> Result<ListPayload, SchemaError> {
    let raw = match raw {
        Value::String(s) => {
            serde_json::from_str::<Value>(&s).map_err(|e| SchemaError::BadListValues {
                key: key.to_string(),
                reason: e.to_string(),
            })?
        }
        other => other,
    };

    match raw {
        Value::Object(map) => {
            if let Some(options) = map.get("enum") {
                let options: Vec<String> =
                    serde_json::from_value(options.clone()).map_err(|e| {
                        SchemaError::BadListValues {
                            key: key.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                return Ok(ListPayload::Options(options));
            }
            if let Some(structure) = map.get("object_structure") {
                let fields: Vec<WireField> =
                    serde_json::from_value(structure.clone()).map_err(|e| {
                        SchemaError::BadListValues {
                            key: key.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                return Ok(ListPayload::Structure(fields));
            }
            Err(SchemaError::BadListValues {
                key: key.to_string(),
                reason: "expected `enum` or `object_structure`".to_string(),
            })
        }
        Value::Array(items) => {
            let options: Vec<String> = serde_json::from_value(Value::Array(items)).map_err(
                |e| SchemaError::BadListValues {
                    key: key.to_string(),
                    reason: e.to_string(),
                },
            )?;
            Ok(ListPayload::Options(options))
        }
        other => Err(SchemaError::BadListValues {
            key: key.to_string(),
            reason: format!("unexpected shape: {other}"),
        }),
    }
}

impl TryFrom<WireField> for FieldDescriptor {
    type Error = SchemaError;

    fn try_from(wire: WireField) -> Result<Self, Self::Error> {
        let payload = wire
            .list_values
            .map(|raw| parse_list_values(&wire.key, raw))
            .transpose()?;

        let kind = match wire.declared.as_str() {
            "string" => FieldKind::Scalar(ScalarKind::Str),
            "integer" => FieldKind::Scalar(ScalarKind::Integer),
            "number" => FieldKind::Scalar(ScalarKind::Number),
            "boolean" => FieldKind::Scalar(ScalarKind::Boolean),
            "date" => FieldKind::Scalar(ScalarKind::Date),
            // Upload transport lives outside this engine; the stored value
            // is a plain string reference.
            "file" => FieldKind::Scalar(ScalarKind::Str),
            "array" => match payload {
                Some(ListPayload::Options(options)) if !options.is_empty() => {
                    FieldKind::Enum { options }
                }
                _ => return Err(SchemaError::MissingOptions(wire.key)),
            },
            "object" => match payload {
                Some(ListPayload::Structure(fields)) if !fields.is_empty() => {
                    let structure = fields
                        .into_iter()
                        .map(FieldDescriptor::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    FieldKind::Object { structure }
                }
                _ => return Err(SchemaError::MissingStructure(wire.key)),
            },
            other => {
                return Err(SchemaError::UnknownType {
                    key: wire.key,
                    declared: other.to_string(),
                });
            }
        };

        Ok(FieldDescriptor {
            key: wire.key,
            kind,
            required: wire.required,
            description: wire.description,
            default_value: wire.default_value,
            order_index: wire.order_index,
            visible_when: wire.conditional_on.map(|c| VisibleWhen {
                trigger_key: c.field,
                expected_value: c.value,
            }),
        })
    }
}

impl From<FieldDescriptor> for WireField {
    fn from(field: FieldDescriptor) -> Self {
        let (declared, list_values) = match field.kind {
            FieldKind::Scalar(ScalarKind::Str) => ("string", None),
            FieldKind::Scalar(ScalarKind::Integer) => ("integer", None),
            FieldKind::Scalar(ScalarKind::Number) => ("number", None),
            FieldKind::Scalar(ScalarKind::Boolean) => ("boolean", None),
            FieldKind::Scalar(ScalarKind::Date) => ("date", None),
            FieldKind::Enum { options } => (
                "array",
                Some(serde_json::json!({ "enum": options })),
            ),
            FieldKind::Object { structure } => {
                let wire: Vec<WireField> = structure.into_iter().map(WireField::from).collect();
                (
                    "object",
                    Some(serde_json::json!({
                        "object_structure": serde_json::to_value(wire).unwrap_or(Value::Null)
                    })),
                )
            }
        };

        WireField {
            key: field.key,
            declared: declared.to_string(),
            required: field.required,
            list_values,
            description: field.description,
            default_value: field.default_value,
            order_index: field.order_index,
            conditional_on: field.visible_when.map(|v| WireCondition {
                field: v.trigger_key,
                value: v.expected_value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_scalar_field() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "nombres",
            "type": "string",
            "required": true,
            "description": "Nombres del solicitante",
            "order_index": 1
        }))
        .unwrap();

        assert_eq!(field.key, "nombres");
        assert_eq!(field.kind, FieldKind::Scalar(ScalarKind::Str));
        assert!(field.required);
        assert_eq!(field.display_rank(), 1);
    }

    #[test]
    fn parses_enum_field() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "genero",
            "type": "array",
            "list_values": { "enum": ["M", "F"] }
        }))
        .unwrap();

        assert_eq!(
            field.kind,
            FieldKind::Enum {
                options: vec!["M".into(), "F".into()]
            }
        );
    }

    #[test]
    fn parses_legacy_bare_array_options() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "estado_civil",
            "type": "array",
            "list_values": ["Soltero", "Casado"]
        }))
        .unwrap();

        match field.kind {
            FieldKind::Enum { options } => assert_eq!(options, vec!["Soltero", "Casado"]),
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn parses_string_encoded_list_values() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "tipo_identificacion",
            "type": "array",
            "list_values": "{\"enum\": [\"CC\", \"TE\", \"TI\"]}"
        }))
        .unwrap();

        match field.kind {
            FieldKind::Enum { options } => assert_eq!(options, vec!["CC", "TE", "TI"]),
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_object_field() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "arrendador",
            "type": "object",
            "list_values": {
                "object_structure": [
                    { "key": "nombre", "type": "string", "required": true },
                    { "key": "telefono", "type": "string" }
                ]
            }
        }))
        .unwrap();

        match field.kind {
            FieldKind::Object { structure } => {
                assert_eq!(structure.len(), 2);
                assert_eq!(structure[0].key, "nombre");
                assert!(structure[0].required);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn parses_conditional_on() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "key": "empresa",
            "type": "string",
            "conditional_on": { "field": "tipo_actividad", "value": "empleado" }
        }))
        .unwrap();

        let visible = field.visible_when.unwrap();
        assert_eq!(visible.trigger_key, "tipo_actividad");
        assert_eq!(visible.expected_value, json!("empleado"));
    }

    #[test]
    fn rejects_array_without_options() {
        let result: Result<FieldDescriptor, _> = serde_json::from_value(json!({
            "key": "tipo",
            "type": "array"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_enum() {
        let result: Result<FieldDescriptor, _> = serde_json::from_value(json!({
            "key": "tipo",
            "type": "array",
            "list_values": { "enum": [] }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_object_without_structure() {
        let result: Result<FieldDescriptor, _> = serde_json::from_value(json!({
            "key": "detalle",
            "type": "object"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        let result: Result<FieldDescriptor, _> = serde_json::from_value(json!({
            "key": "x",
            "type": "uuid"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_wire_format() {
        let field = FieldDescriptor::object(
            "arrendador",
            vec![
                FieldDescriptor::scalar("nombre", ScalarKind::Str).required(),
                FieldDescriptor::scalar("valor_mensual_arriendo", ScalarKind::Number),
            ],
        )
        .describe("Información del arrendador")
        .order(6);

        let wire = serde_json::to_value(&field).unwrap();
        assert_eq!(wire["type"], "object");
        assert!(wire["list_values"]["object_structure"].is_array());

        let back: FieldDescriptor = serde_json::from_value(wire).unwrap();
        assert_eq!(back, field);
    }
}
