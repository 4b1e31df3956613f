//! Projection of one flat form state into per-entity persistence payloads.
//!
//! Each entity gets its fixed fields at the top level and its dynamic fields
//! gathered under the entity's JSON column. References are one-to-many and
//! project into a list of payloads instead.

use std::collections::HashMap;

use serde_json::{Map, Value};

use strata_schema::{EntitySchema, FieldDescriptor, FieldKind, is_collection_entity, json_column_for};

use crate::coerce::is_empty_value;
use crate::error::ProjectionError;

/// Payload shape per entity: single record or a list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    One(Map<String, Value>),
    Many(Vec<Map<String, Value>>),
}

/// Fields some deployments serve inside the dynamic schema but which the
/// persistence layer stores as real columns. They are relocated to the top
/// level of the payload no matter how the served schema categorized them.
const FIXED_OVERRIDES: &[(&str, &str)] = &[
    ("solicitud", "banco_nombre"),
    ("solicitud", "ciudad_solicitud"),
    ("solicitud", "estado"),
    ("solicitud", "nombre_asesor"),
    ("solicitud", "correo_asesor"),
    ("solicitud", "nombre_banco_usuario"),
    ("solicitud", "correo_banco_usuario"),
    ("solicitud", "tipo_credito"),
];

/// Relocated fields that downstream consumers still read out of the JSON
/// column, so they are copied rather than moved.
const MIRRORED: &[(&str, &str)] = &[("solicitud", "tipo_credito")];

/// A reference item counts as filled only when at least one of these carries
/// a value. Keys with usual defaults (the reference type) are excluded so an
/// untouched row is not mistaken for a real reference.
const REFERENCE_KEY_FIELDS: &[&str] = &[
    "nombre_referencia",
    "nombre_referencia1",
    "celular_referencia",
    "direccion_referencia",
    "direccion_referencia1",
    "relacion_referencia",
    "relacion_referencia1",
];

/// Form key holding a collection entity's items.
fn collection_source_key(entity: &str) -> &'static str {
    match entity {
        "referencia" => "referencias",
        _ => "items",
    }
}

/// Build every entity's payload from the flat form state. Fails on the first
/// required fixed field that has neither a submitted value nor a default.
pub fn project(
    form: &Map<String, Value>,
    schemas: &HashMap<String, EntitySchema>,
) -> Result<HashMap<String, Projection>, ProjectionError> {
    let mut out = HashMap::with_capacity(schemas.len());
    for (entity, schema) in schemas {
        let projection = if is_collection_entity(entity) {
            Projection::Many(project_collection(entity, schema, form)?)
        } else {
            Projection::One(project_single(entity, schema, form)?)
        };
        out.insert(entity.clone(), projection);
    }
    Ok(out)
}

fn project_collection(
    entity: &str,
    schema: &EntitySchema,
    form: &Map<String, Value>,
) -> Result<Vec<Map<String, Value>>, ProjectionError> {
    let Some(Value::Array(items)) = form.get(collection_source_key(entity)) else {
        return Ok(Vec::new());
    };

    let mut payloads = Vec::new();
    for item in items {
        let Some(values) = item.as_object() else { continue };
        if !has_key_field(values) {
            continue;
        }
        payloads.push(project_single(entity, schema, values)?);
    }
    Ok(payloads)
}

fn has_key_field(values: &Map<String, Value>) -> bool {
    REFERENCE_KEY_FIELDS
        .iter()
        .any(|key| values.get(*key).is_some_and(|v| !is_empty_value(v)))
}

fn project_single(
    entity: &str,
    schema: &EntitySchema,
    values: &Map<String, Value>,
) -> Result<Map<String, Value>, ProjectionError> {
    let mut payload = Map::new();

    // 1. Fixed bucket: submitted value, else default, else error if required.
    for field in &schema.fixed {
        match values.get(&field.key).filter(|v| !is_empty_value(v)) {
            Some(value) => {
                payload.insert(field.key.clone(), value.clone());
            }
            None => match field.default_value.clone().filter(|v| !is_empty_value(v)) {
                Some(default) => {
                    payload.insert(field.key.clone(), default);
                }
                None if field.required => {
                    return Err(ProjectionError {
                        entity: entity.to_string(),
                        field: field.key.clone(),
                    });
                }
                None => {}
            },
        }
    }

    // 2. Dynamic bucket: shape each non-empty value.
    let mut dynamic = Map::new();
    for field in &schema.dynamic {
        let Some(value) = values.get(&field.key) else { continue };
        if let Some(shaped) = shape_dynamic_value(field, value) {
            dynamic.insert(field.key.clone(), shaped);
        }
    }

    // 3. Relocations override whatever bucket the schema put the key in.
    for (rule_entity, key) in FIXED_OVERRIDES {
        if *rule_entity != entity {
            continue;
        }
        let mirrored = MIRRORED.contains(&(entity, key));
        if dynamic.contains_key(*key) {
            let value = if mirrored {
                dynamic[*key].clone()
            } else {
                dynamic.remove(*key).unwrap_or(Value::Null)
            };
            payload.insert(key.to_string(), value);
        } else if !payload.contains_key(*key) {
            if let Some(value) = values.get(*key).filter(|v| !is_empty_value(v)) {
                payload.insert(key.to_string(), value.clone());
            }
        }
    }

    // 4. Attach the dynamic sub-object only when it has content.
    if !dynamic.is_empty() {
        payload.insert(
            json_column_for(entity).to_string(),
            Value::Object(dynamic),
        );
    }

    Ok(payload)
}

/// Empty values never make it into the payload. Sub-objects drop their empty
/// keys and vanish if nothing remains; arrays keep only items that are
/// non-empty (for object items, at least one non-empty key).
fn shape_dynamic_value(field: &FieldDescriptor, value: &Value) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    match (&field.kind, value) {
        (FieldKind::Object { .. }, Value::Object(entries)) => {
            let cleaned: Map<String, Value> = entries
                .iter()
                .filter(|(_, v)| !is_empty_value(v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        (_, Value::Array(items)) => {
            let kept: Vec<Value> = items
                .iter()
                .filter(|item| match item {
                    Value::Object(entries) => entries.values().any(|v| !is_empty_value(v)),
                    other => !is_empty_value(other),
                })
                .cloned()
                .collect();
            if kept.is_empty() { None } else { Some(Value::Array(kept)) }
        }
        _ => Some(value.clone()),
    }
}
