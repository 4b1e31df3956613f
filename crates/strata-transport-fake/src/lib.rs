//! In-memory stand-in for the metadata and document services.
//!
//! Serves schemas, stores JSON-column documents, creates base records, and
//! can be configured to reject write verbs (405) or fail whole entities so
//! verb negotiation and per-entity failure capture are testable offline.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use http::{Method, Request, Response, StatusCode};
use serde_json::{Map, Value, json};

use strata_client::{ClientError, Envelope, Transport};
use strata_schema::{EntitySchema, FieldDescriptor};

type DocKey = (String, String, String);

#[derive(Default)]
struct State {
    dynamic_schemas: HashMap<(String, String), Vec<FieldDescriptor>>,
    entity_schemas: HashMap<String, EntitySchema>,
    documents: HashMap<DocKey, Map<String, Value>>,
    records: HashMap<String, Vec<Map<String, Value>>>,
    failing_entities: HashSet<String>,
    allowed_write_verbs: Vec<Method>,
    request_log: Vec<(Method, String)>,
    next_id: u64,
}

pub struct FakeBackend {
    state: Mutex<State>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                allowed_write_verbs: vec![Method::PATCH, Method::PUT, Method::POST],
                next_id: 1,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    // ── Test configuration ──────────────────────────────────────

    pub fn set_dynamic_schema(&self, entity: &str, column: &str, fields: Vec<FieldDescriptor>) {
        self.state()
            .dynamic_schemas
            .insert((entity.to_string(), column.to_string()), fields);
    }

    pub fn set_entity_schema(&self, entity: &str, schema: EntitySchema) {
        self.state()
            .entity_schemas
            .insert(entity.to_string(), schema);
    }

    /// Make every fetch for this entity answer `ok: false`.
    pub fn fail_entity(&self, entity: &str) {
        self.state().failing_entities.insert(entity.to_string());
    }

    /// Restrict which verbs the JSON-column write route accepts; the rest
    /// answer 405.
    pub fn allow_write_verbs(&self, verbs: &[Method]) {
        self.state().allowed_write_verbs = verbs.to_vec();
    }

    pub fn seed_document(&self, entity: &str, id: &str, column: &str, doc: Map<String, Value>) {
        self.state()
            .documents
            .insert((entity.to_string(), id.to_string(), column.to_string()), doc);
    }

    // ── Test inspection ─────────────────────────────────────────

    pub fn document(&self, entity: &str, id: &str, column: &str) -> Option<Map<String, Value>> {
        self.state()
            .documents
            .get(&(entity.to_string(), id.to_string(), column.to_string()))
            .cloned()
    }

    pub fn records(&self, entity: &str) -> Vec<Map<String, Value>> {
        self.state().records.get(entity).cloned().unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state().request_log.clone()
    }

    // ── Routing ─────────────────────────────────────────────────

    fn handle(&self, req: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        let path = req.uri().path().trim_end_matches('/').to_string();
        let query = parse_query(req.uri().query().unwrap_or(""));
        let method = req.method().clone();

        if !query.contains_key("tenant_id") || req.headers().get("x-tenant-id").is_none() {
            return envelope_response(
                StatusCode::BAD_REQUEST,
                &Envelope::failure("missing tenant id"),
            );
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match (method, segments.as_slice()) {
            (Method::GET, ["schema", entity]) => self.get_entity_schema(entity),
            (Method::GET, ["json", "schema", entity, column]) => {
                self.get_dynamic_schema(entity, column)
            }
            (Method::GET, ["json", entity, id, column]) => {
                self.read_document(entity, id, column, query.get("path"))
            }
            (Method::DELETE, ["json", entity, id, column]) => {
                self.delete_key(entity, id, column, query.get("path"))
            }
            (verb, ["json", entity, id, column])
                if verb == Method::PATCH || verb == Method::PUT || verb == Method::POST =>
            {
                self.write_document(&verb, entity, id, column, req.body())
            }
            (Method::POST, [entity]) => self.create_record(entity, req.body()),
            _ => envelope_response(StatusCode::NOT_FOUND, &Envelope::failure("not found")),
        }
    }

    fn get_entity_schema(&self, entity: &str) -> Response<Vec<u8>> {
        let state = self.state();
        if state.failing_entities.contains(entity) {
            return envelope_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Envelope::failure(&format!("schema service unavailable for {entity}")),
            );
        }
        match state.entity_schemas.get(entity) {
            Some(schema) => match serde_json::to_value(schema) {
                Ok(data) => envelope_response(StatusCode::OK, &Envelope::success(data)),
                Err(e) => envelope_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &Envelope::failure(&e.to_string()),
                ),
            },
            None => envelope_response(
                StatusCode::NOT_FOUND,
                &Envelope::failure(&format!("no schema for {entity}")),
            ),
        }
    }

    fn get_dynamic_schema(&self, entity: &str, column: &str) -> Response<Vec<u8>> {
        let state = self.state();
        if state.failing_entities.contains(entity) {
            return envelope_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Envelope::failure(&format!("schema service unavailable for {entity}")),
            );
        }
        match state
            .dynamic_schemas
            .get(&(entity.to_string(), column.to_string()))
        {
            Some(fields) => match serde_json::to_value(fields) {
                Ok(data) => envelope_response(StatusCode::OK, &Envelope::success(data)),
                Err(e) => envelope_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &Envelope::failure(&e.to_string()),
                ),
            },
            None => envelope_response(
                StatusCode::NOT_FOUND,
                &Envelope::failure(&format!("no schema for {entity}/{column}")),
            ),
        }
    }

    fn read_document(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        path: Option<&String>,
    ) -> Response<Vec<u8>> {
        let state = self.state();
        let doc = state
            .documents
            .get(&(entity.to_string(), id.to_string(), column.to_string()))
            .cloned()
            .unwrap_or_default();
        let data = match path {
            Some(key) => doc.get(key.as_str()).cloned().unwrap_or(Value::Null),
            None => Value::Object(doc),
        };
        envelope_response(StatusCode::OK, &Envelope::success(data))
    }

    fn write_document(
        &self,
        verb: &Method,
        entity: &str,
        id: &str,
        column: &str,
        body: &[u8],
    ) -> Response<Vec<u8>> {
        let mut state = self.state();
        if !state.allowed_write_verbs.contains(verb) {
            return envelope_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &Envelope::failure(&format!("{verb} not allowed")),
            );
        }

        let parsed: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                return envelope_response(
                    StatusCode::BAD_REQUEST,
                    &Envelope::failure(&e.to_string()),
                );
            }
        };

        let key = (entity.to_string(), id.to_string(), column.to_string());
        let doc = state.documents.entry(key).or_default();

        // {path, value} writes one key; {value: {...}} merge-patches.
        if let Some(path) = parsed.get("path").and_then(Value::as_str) {
            let value = parsed.get("value").cloned().unwrap_or(Value::Null);
            doc.insert(path.to_string(), value);
        } else if let Some(Value::Object(values)) = parsed.get("value") {
            for (k, v) in values {
                doc.insert(k.clone(), v.clone());
            }
        } else {
            return envelope_response(
                StatusCode::BAD_REQUEST,
                &Envelope::failure("expected {path, value} or {value}"),
            );
        }

        let data = Value::Object(doc.clone());
        envelope_response(StatusCode::OK, &Envelope::success(data))
    }

    fn delete_key(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        path: Option<&String>,
    ) -> Response<Vec<u8>> {
        let Some(path) = path else {
            return envelope_response(
                StatusCode::BAD_REQUEST,
                &Envelope::failure("missing path parameter"),
            );
        };
        let mut state = self.state();
        let key = (entity.to_string(), id.to_string(), column.to_string());
        if let Some(doc) = state.documents.get_mut(&key) {
            doc.remove(path.as_str());
            let data = Value::Object(doc.clone());
            return envelope_response(StatusCode::OK, &Envelope::success(data));
        }
        envelope_response(StatusCode::OK, &Envelope::success(Value::Null))
    }

    fn create_record(&self, entity: &str, body: &[u8]) -> Response<Vec<u8>> {
        let mut state = self.state();
        let mut record: Map<String, Value> = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                return envelope_response(
                    StatusCode::BAD_REQUEST,
                    &Envelope::failure(&e.to_string()),
                );
            }
        };
        let id = state.next_id;
        state.next_id += 1;
        record.insert("id".to_string(), json!(id));
        state
            .records
            .entry(entity.to_string())
            .or_default()
            .push(record.clone());
        envelope_response(StatusCode::CREATED, &Envelope::success(Value::Object(record)))
    }
}

impl Transport for FakeBackend {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, ClientError> {
        let logged = format!(
            "{}{}",
            req.uri().path(),
            req.uri()
                .query()
                .map(|q| format!("?{q}"))
                .unwrap_or_default()
        );
        self.state().request_log.push((req.method().clone(), logged));
        Ok(self.handle(&req))
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            Some((name.to_string(), decode_component(value)))
        })
        .collect()
}

fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn envelope_response(status: StatusCode, envelope: &Envelope) -> Response<Vec<u8>> {
    let body = serde_json::to_vec(envelope).unwrap_or_default();
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(body)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_client::ApiContext;

    fn ctx() -> ApiContext {
        ApiContext::new("http://fake", "1")
    }

    #[test]
    fn create_then_read_round_trip() {
        let backend = FakeBackend::new();

        let req = ctx()
            .request(
                Method::POST,
                "/solicitante/",
                &[],
                Some(&json!({"nombres": "Ana"})),
            )
            .unwrap();
        let res = backend.send(req).unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let env = Envelope::parse(res.body()).unwrap();
        assert_eq!(env.data["id"], json!(1));

        let write = ctx()
            .request(
                Method::PATCH,
                "/json/solicitante/1/info_extra",
                &[],
                Some(&json!({"value": {"barrio": "Chapinero"}})),
            )
            .unwrap();
        backend.send(write).unwrap();

        let doc = backend.document("solicitante", "1", "info_extra").unwrap();
        assert_eq!(doc["barrio"], json!("Chapinero"));
    }

    #[test]
    fn disallowed_verb_is_405() {
        let backend = FakeBackend::new();
        backend.allow_write_verbs(&[Method::PUT]);

        let req = ctx()
            .request(
                Method::PATCH,
                "/json/solicitante/1/info_extra",
                &[],
                Some(&json!({"value": {"a": 1}})),
            )
            .unwrap();
        let res = backend.send(req).unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn missing_tenant_is_rejected() {
        let backend = FakeBackend::new();
        let req = Request::builder()
            .method(Method::GET)
            .uri("http://fake/schema/solicitante")
            .body(Vec::new())
            .unwrap();
        let res = backend.send(req).unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
