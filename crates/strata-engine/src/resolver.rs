//! Conditional visibility and derived option sets.
//!
//! Visibility is strict equality against the current form state. Option sets
//! normally come straight off the descriptor, except for relation fields
//! inside a reference, whose options depend on the selected reference type.

use serde_json::{Map, Value};

use strata_schema::{FieldDescriptor, FieldKind};

/// A field with no condition is always visible; a conditioned field shows
/// only while the trigger key holds exactly the expected value. A missing
/// trigger never matches.
pub fn is_visible(field: &FieldDescriptor, form: &Map<String, Value>) -> bool {
    match &field.visible_when {
        Some(cond) => form.get(&cond.trigger_key) == Some(&cond.expected_value),
        None => true,
    }
}

pub fn visible_fields<'a>(
    fields: &'a [FieldDescriptor],
    form: &Map<String, Value>,
) -> Vec<&'a FieldDescriptor> {
    fields.iter().filter(|f| is_visible(f, form)).collect()
}

/// Keys whose values became unreachable after `trigger_key` changed to
/// `new_value`: every field conditioned on that trigger whose expected value
/// no longer matches. The caller clears them from its form state.
pub fn stale_keys(
    fields: &[FieldDescriptor],
    trigger_key: &str,
    new_value: &Value,
) -> Vec<String> {
    fields
        .iter()
        .filter(|f| {
            f.visible_when
                .as_ref()
                .is_some_and(|c| c.trigger_key == trigger_key && c.expected_value != *new_value)
        })
        .map(|f| f.key.clone())
        .collect()
}

// ── Derived relation options ────────────────────────────────────

/// Trigger key for relation option derivation.
pub const REFERENCE_TYPE_KEY: &str = "tipo_referencia";

const FAMILIAL_RELATIONS: &[&str] = &[
    "Padre",
    "Madre",
    "Hermano/a",
    "Hijo/a",
    "Abuelo/a",
    "Tío/a",
    "Primo/a",
    "Cónyuge",
];

const RELATION_OPTIONS: &[(&str, &[&str])] = &[
    ("familiar", FAMILIAL_RELATIONS),
    (
        "personal",
        &["Amigo/a", "Conocido/a", "Vecino/a", "Compañero/a de estudio"],
    ),
    (
        "laboral",
        &["Jefe directo", "Compañero/a de trabajo", "Subalterno/a", "Socio/a"],
    ),
    ("comercial", &["Cliente", "Proveedor", "Socio comercial"]),
];

/// Shown when the reference type is missing or not in the table; never empty
/// so the relation selector always has something to offer.
const DEFAULT_RELATION_OPTIONS: &[&str] = &["Amigo/a", "Conocido/a", "Familiar", "Otro"];

/// Relation fields are recognized by key, not by type: served schemas declare
/// them inconsistently as plain strings.
pub fn is_relation_key(key: &str) -> bool {
    key.contains("relacion") || key == "parentesco"
}

pub fn relation_options(reference_type: Option<&Value>) -> Vec<String> {
    let trigger = reference_type.and_then(Value::as_str).unwrap_or("");
    RELATION_OPTIONS
        .iter()
        .find(|(key, _)| *key == trigger)
        .map(|(_, options)| *options)
        .unwrap_or(DEFAULT_RELATION_OPTIONS)
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Options to offer for `field` given the current form state, or `None` for
/// free-form inputs.
pub fn option_set(field: &FieldDescriptor, form: &Map<String, Value>) -> Option<Vec<String>> {
    if is_relation_key(&field.key) {
        return Some(relation_options(form.get(REFERENCE_TYPE_KEY)));
    }
    match &field.kind {
        FieldKind::Enum { options } => Some(options.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strata_schema::ScalarKind;

    use super::*;

    fn form(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn conditioned() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("tipo_actividad", ScalarKind::Str),
            FieldDescriptor::scalar("empresa", ScalarKind::Str)
                .visible_when("tipo_actividad", json!("empleado")),
            FieldDescriptor::scalar("nit", ScalarKind::Str)
                .visible_when("tipo_actividad", json!("independiente")),
        ]
    }

    // ── Visibility ──────────────────────────────────────────────

    #[test]
    fn visibility_is_strict_equality() {
        let fields = conditioned();
        let state = form(&[("tipo_actividad", json!("empleado"))]);

        let visible = visible_fields(&fields, &state);
        let keys: Vec<&str> = visible.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["tipo_actividad", "empresa"]);
    }

    #[test]
    fn missing_trigger_hides_conditioned_fields() {
        let fields = conditioned();
        let visible = visible_fields(&fields, &form(&[]));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, "tipo_actividad");
    }

    #[test]
    fn trigger_change_staleness() {
        let fields = conditioned();
        let stale = stale_keys(&fields, "tipo_actividad", &json!("empleado"));
        // Only the branch that no longer matches goes stale.
        assert_eq!(stale, vec!["nit".to_string()]);
    }

    // ── Relation options ────────────────────────────────────────

    #[test]
    fn familiar_reference_gets_the_familial_list() {
        let options = relation_options(Some(&json!("familiar")));
        assert_eq!(
            options,
            vec![
                "Padre",
                "Madre",
                "Hermano/a",
                "Hijo/a",
                "Abuelo/a",
                "Tío/a",
                "Primo/a",
                "Cónyuge"
            ]
        );
    }

    #[test]
    fn unknown_reference_type_still_offers_options() {
        assert!(!relation_options(Some(&json!("otro"))).is_empty());
        assert!(!relation_options(None).is_empty());
    }

    #[test]
    fn relation_keys_are_detected_by_name() {
        assert!(is_relation_key("relacion_referencia"));
        assert!(is_relation_key("relacion1"));
        assert!(is_relation_key("parentesco"));
        assert!(!is_relation_key("nombre_referencia"));
    }

    #[test]
    fn relation_field_overrides_declared_options() {
        let field = FieldDescriptor::enumeration("relacion_referencia", &["Otro"]);
        let state = form(&[("tipo_referencia", json!("familiar"))]);

        let options = option_set(&field, &state).unwrap();
        assert!(options.contains(&"Padre".to_string()));
        assert!(!options.contains(&"Otro".to_string()));
    }

    #[test]
    fn plain_enum_uses_declared_options() {
        let field = FieldDescriptor::enumeration("genero", &["M", "F"]);
        let options = option_set(&field, &form(&[])).unwrap();
        assert_eq!(options, vec!["M", "F"]);
    }

    #[test]
    fn scalars_have_no_option_set() {
        let field = FieldDescriptor::scalar("barrio", ScalarKind::Str);
        assert!(option_set(&field, &form(&[])).is_none());
    }
}
