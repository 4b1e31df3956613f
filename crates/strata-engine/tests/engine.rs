use std::collections::HashMap;

use http::Method;
use serde_json::{Map, Value, json};

use strata_client::ApiContext;
use strata_docs::DocumentClient;
use strata_engine::{EngineError, FormEngine};
use strata_registry::{RegistryConfig, SchemaRegistry};
use strata_schema::{EntitySchema, FieldDescriptor, ScalarKind};
use strata_transport_fake::FakeBackend;

fn engine(backend: &FakeBackend) -> FormEngine<&FakeBackend> {
    let registry = SchemaRegistry::new(backend, &RegistryConfig::new("http://fake", "1"));
    let docs = DocumentClient::new(backend, ApiContext::new("http://fake", "1"));
    FormEngine::new(registry, docs)
}

fn form(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn address_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::scalar("barrio", ScalarKind::Str),
        FieldDescriptor::scalar("estrato", ScalarKind::Integer),
    ]
}

// ── Column submission ───────────────────────────────────────────

#[test]
fn submit_cleans_coerces_and_writes() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema("ubicacion", "detalle_direccion", address_fields());

    engine(&backend)
        .submit_column(
            "ubicacion",
            "5",
            "detalle_direccion",
            &form(&[
                ("barrio", json!("Chapinero")),
                ("estrato", json!("3")),
                ("ciudad", json!("")),
                ("campo_libre", json!("x")),
            ]),
        )
        .unwrap();

    let doc = backend.document("ubicacion", "5", "detalle_direccion").unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc["barrio"], json!("Chapinero"));
    assert_eq!(doc["estrato"], json!(3));
}

#[test]
fn uncoercible_value_never_reaches_the_network() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema("ubicacion", "detalle_direccion", address_fields());
    let engine = engine(&backend);

    let err = engine
        .submit_column(
            "ubicacion",
            "5",
            "detalle_direccion",
            &form(&[("estrato", json!("alto"))]),
        )
        .unwrap_err();

    match err {
        EngineError::Validation(e) => assert_eq!(e.field, "estrato"),
        other => panic!("expected validation error, got {other}"),
    }
    // Only the schema fetch went out; no write was attempted.
    assert!(backend
        .requests()
        .iter()
        .all(|(method, _)| *method == Method::GET));
    assert!(backend.document("ubicacion", "5", "detalle_direccion").is_none());
}

#[test]
fn submit_survives_schema_outage_via_fallback() {
    let backend = FakeBackend::new();
    backend.fail_entity("ubicacion");

    // The bundled fallback declares barrio, so the write still goes through.
    engine(&backend)
        .submit_column(
            "ubicacion",
            "5",
            "detalle_direccion",
            &form(&[("barrio", json!("Norte"))]),
        )
        .unwrap();

    let doc = backend.document("ubicacion", "5", "detalle_direccion").unwrap();
    assert_eq!(doc["barrio"], json!("Norte"));
}

#[test]
fn submit_negotiates_verbs() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema("ubicacion", "detalle_direccion", address_fields());
    backend.allow_write_verbs(&[Method::POST]);

    let receipt = engine(&backend)
        .submit_column(
            "ubicacion",
            "5",
            "detalle_direccion",
            &form(&[("barrio", json!("Norte"))]),
        )
        .unwrap();

    assert_eq!(receipt.verb, Method::POST);
    assert_eq!(receipt.attempts.len(), 3);
}

// ── Full-record creation ────────────────────────────────────────

#[test]
fn create_full_splits_record_and_column() {
    let backend = FakeBackend::new();
    let payload = form(&[
        ("nombres", json!("Ana")),
        ("info_extra", json!({ "barrio": "Chapinero" })),
    ]);

    let created = engine(&backend).create_full("solicitante", &payload).unwrap();

    let id = created["id"].to_string();
    let records = backend.records("solicitante");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["nombres"], json!("Ana"));
    // The base record body never carries the JSON column.
    assert!(!records[0].contains_key("info_extra"));

    let doc = backend.document("solicitante", &id, "info_extra").unwrap();
    assert_eq!(doc["barrio"], json!("Chapinero"));
}

#[test]
fn create_full_coerces_the_dynamic_bucket() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema(
        "solicitante",
        "info_extra",
        vec![FieldDescriptor::scalar("personas_a_cargo", ScalarKind::Integer)],
    );
    let payload = form(&[
        ("nombres", json!("Ana")),
        ("info_extra", json!({ "personas_a_cargo": "3" })),
    ]);

    engine(&backend).create_full("solicitante", &payload).unwrap();

    let doc = backend.document("solicitante", "1", "info_extra").unwrap();
    assert_eq!(doc["personas_a_cargo"], json!(3));
}

#[test]
fn create_full_rejects_uncoercible_dynamic_values_before_creating() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema(
        "solicitante",
        "info_extra",
        vec![FieldDescriptor::scalar("personas_a_cargo", ScalarKind::Integer)],
    );
    let payload = form(&[
        ("nombres", json!("Ana")),
        ("info_extra", json!({ "personas_a_cargo": "muchas" })),
    ]);

    let err = engine(&backend)
        .create_full("solicitante", &payload)
        .unwrap_err();

    match err {
        EngineError::Validation(e) => assert_eq!(e.field, "personas_a_cargo"),
        other => panic!("expected validation error, got {other}"),
    }
    // The base record was never created either.
    assert!(backend.records("solicitante").is_empty());
}

#[test]
fn create_full_without_dynamic_part_writes_no_document() {
    let backend = FakeBackend::new();
    engine(&backend)
        .create_full("solicitante", &form(&[("nombres", json!("Ana"))]))
        .unwrap();

    assert_eq!(backend.records("solicitante").len(), 1);
    assert!(backend.document("solicitante", "1", "info_extra").is_none());
}

// ── Whole-application creation ──────────────────────────────────

fn application_schemas() -> HashMap<String, EntitySchema> {
    HashMap::from([
        (
            "solicitante".to_string(),
            EntitySchema::new(
                vec![FieldDescriptor::scalar("nombres", ScalarKind::Str).required()],
                vec![FieldDescriptor::scalar("barrio", ScalarKind::Str)],
            ),
        ),
        (
            "ubicacion".to_string(),
            EntitySchema::new(
                vec![FieldDescriptor::scalar("ciudad_residencia", ScalarKind::Str)],
                vec![],
            ),
        ),
        (
            "referencia".to_string(),
            EntitySchema::new(
                vec![
                    FieldDescriptor::scalar("tipo_referencia", ScalarKind::Str)
                        .default_to(json!("personal")),
                ],
                vec![FieldDescriptor::scalar("nombre_referencia", ScalarKind::Str)],
            ),
        ),
    ])
}

#[test]
fn create_all_threads_the_applicant_id() {
    let backend = FakeBackend::new();
    let state = form(&[
        ("nombres", json!("Ana")),
        ("barrio", json!("Chapinero")),
        ("ciudad_residencia", json!("Bogotá")),
        (
            "referencias",
            json!([
                { "nombre_referencia": "Marta" },
                { "nombre_referencia": "Luis" },
                {}
            ]),
        ),
    ]);

    let created = engine(&backend)
        .create_all(&state, &application_schemas())
        .unwrap();
    assert_eq!(created["id"], json!(1));

    let locations = backend.records("ubicacion");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["solicitante_id"], json!(1));

    // The empty third row was filtered out before creation.
    let references = backend.records("referencia");
    assert_eq!(references.len(), 2);
    assert!(references.iter().all(|r| r["solicitante_id"] == json!(1)));
}

#[test]
fn create_all_stores_dynamic_values_with_declared_types() {
    let backend = FakeBackend::new();
    backend.set_dynamic_schema(
        "solicitante",
        "info_extra",
        vec![FieldDescriptor::scalar("personas_a_cargo", ScalarKind::Integer)],
    );
    let schemas = HashMap::from([(
        "solicitante".to_string(),
        EntitySchema::new(
            vec![FieldDescriptor::scalar("nombres", ScalarKind::Str).required()],
            vec![FieldDescriptor::scalar("personas_a_cargo", ScalarKind::Integer)],
        ),
    )]);
    let state = form(&[
        ("nombres", json!("Ana")),
        ("personas_a_cargo", json!("3")),
    ]);

    engine(&backend).create_all(&state, &schemas).unwrap();

    // The stored value carries the declared type, not the raw input string.
    let doc = backend.document("solicitante", "1", "info_extra").unwrap();
    assert_eq!(doc["personas_a_cargo"], json!(3));
}

#[test]
fn create_all_applicant_goes_first() {
    let backend = FakeBackend::new();
    let state = form(&[
        ("nombres", json!("Ana")),
        ("ciudad_residencia", json!("Bogotá")),
    ]);

    engine(&backend)
        .create_all(&state, &application_schemas())
        .unwrap();

    let creations: Vec<String> = backend
        .requests()
        .into_iter()
        .filter(|(method, path)| *method == Method::POST && !path.starts_with("/json/"))
        .map(|(_, path)| path)
        .collect();
    assert!(creations[0].starts_with("/solicitante/"));
    assert!(creations[1].starts_with("/ubicacion/"));
}

#[test]
fn projection_failure_creates_nothing() {
    let backend = FakeBackend::new();
    // nombres is required, has no default, and is absent.
    let err = engine(&backend)
        .create_all(&form(&[("ciudad_residencia", json!("Bogotá"))]), &application_schemas())
        .unwrap_err();

    match err {
        EngineError::Projection(e) => {
            assert_eq!(e.entity, "solicitante");
            assert_eq!(e.field, "nombres");
        }
        other => panic!("expected projection error, got {other}"),
    }
    assert!(backend.records("solicitante").is_empty());
    assert!(backend.records("ubicacion").is_empty());
    assert!(backend.requests().is_empty());
}
