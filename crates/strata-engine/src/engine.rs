use std::collections::HashMap;

use serde_json::{Map, Value};

use strata_client::Transport;
use strata_docs::{DocumentClient, WriteReceipt};
use strata_registry::SchemaRegistry;
use strata_schema::{ENTITIES, EntitySchema, json_column_for};

use crate::coerce::{coerce, prune};
use crate::error::EngineError;
use crate::project::{Projection, project};

/// Facade tying the registry, the cleaning pipeline, and the document client
/// into the flows callers actually run.
pub struct FormEngine<T: Transport> {
    registry: SchemaRegistry<T>,
    docs: DocumentClient<T>,
}

impl<T: Transport> FormEngine<T> {
    pub fn new(registry: SchemaRegistry<T>, docs: DocumentClient<T>) -> Self {
        Self { registry, docs }
    }

    pub fn registry(&self) -> &SchemaRegistry<T> {
        &self.registry
    }

    pub fn docs(&self) -> &DocumentClient<T> {
        &self.docs
    }

    /// Submit one entity's dynamic values: prune against the column's schema,
    /// coerce to declared types, then write with verb negotiation. A value
    /// that cannot be coerced aborts before anything reaches the network.
    pub fn submit_column(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        values: &Map<String, Value>,
    ) -> Result<WriteReceipt, EngineError> {
        let fields = self.registry.dynamic_fields_or_fallback(entity, column)?;
        let cleaned = prune(values, &fields);
        let coerced = coerce(cleaned, &fields)?;
        tracing::debug!(entity, column, keys = coerced.len(), "submitting column");
        Ok(self.docs.write_many(entity, id, column, &coerced, true)?)
    }

    /// Create one entity from a projected payload: the base record first from
    /// the fixed fields, then the dynamic sub-object patched into the JSON
    /// column of the record just created. The dynamic bucket is coerced
    /// against the column's schema before anything is created, so a bad value
    /// leaves no half-created record behind.
    pub fn create_full(&self, entity: &str, payload: &Map<String, Value>) -> Result<Value, EngineError> {
        let column = json_column_for(entity);
        let mut fixed = payload.clone();
        let dynamic = match fixed.remove(column) {
            Some(Value::Object(dynamic)) if !dynamic.is_empty() => {
                let fields = self.registry.dynamic_fields_or_fallback(entity, column)?;
                Some(coerce(dynamic, &fields)?)
            }
            _ => None,
        };

        let created = self.docs.create_record(entity, &fixed)?;

        if let Some(dynamic) = dynamic {
            let id = record_id(&created).ok_or_else(|| {
                EngineError::Response(format!("created {entity} record carries no id"))
            })?;
            self.docs.write_many(entity, &id, column, &dynamic, true)?;
        }
        Ok(created)
    }

    /// Create every entity of one application from the flat form state. The
    /// whole form is projected up front, so a projection failure leaves
    /// nothing half-created; the applicant goes first and its id is threaded
    /// into every other record.
    pub fn create_all(
        &self,
        form: &Map<String, Value>,
        schemas: &HashMap<String, EntitySchema>,
    ) -> Result<Value, EngineError> {
        let mut projections = project(form, schemas)?;

        let applicant = match projections.remove("solicitante") {
            Some(Projection::One(payload)) => payload,
            _ => {
                return Err(EngineError::Response(
                    "no applicant payload to create".to_string(),
                ));
            }
        };
        let created = self.create_full("solicitante", &applicant)?;
        let applicant_id = record_id(&created).ok_or_else(|| {
            EngineError::Response("created solicitante record carries no id".to_string())
        })?;
        tracing::info!(%applicant_id, "applicant created, creating satellites");

        for entity in ENTITIES.iter().filter(|e| **e != "solicitante") {
            match projections.remove(*entity) {
                Some(Projection::One(payload)) => {
                    if payload.is_empty() {
                        continue;
                    }
                    self.create_full(entity, &with_applicant(payload, &applicant_id))?;
                }
                Some(Projection::Many(items)) => {
                    for item in items {
                        self.create_full(entity, &with_applicant(item, &applicant_id))?;
                    }
                }
                None => {}
            }
        }
        Ok(created)
    }
}

fn with_applicant(mut payload: Map<String, Value>, applicant_id: &str) -> Map<String, Value> {
    let id_value = applicant_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(applicant_id.to_string()));
    payload.insert("solicitante_id".to_string(), id_value);
    payload
}

/// Pull the record id out of a creation response, numeric or string.
fn record_id(created: &Value) -> Option<String> {
    match created.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_id_handles_numeric_and_string_ids() {
        assert_eq!(record_id(&json!({ "id": 7 })), Some("7".to_string()));
        assert_eq!(record_id(&json!({ "id": "7a" })), Some("7a".to_string()));
        assert_eq!(record_id(&json!({})), None);
    }

}
