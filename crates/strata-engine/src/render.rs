//! Rendering contract: a pure walk over descriptors that hands each field to
//! a caller-supplied renderer. No UI types here; the renderer decides what an
//! input, a selector, or a group looks like.

use std::collections::HashMap;

use serde_json::{Map, Value};

use strata_schema::{FieldDescriptor, FieldKind, sort_for_display};

use crate::coerce::is_empty_value;
use crate::resolver;

/// Identity keys that must never be prefilled from a schema default; a wrong
/// prefilled document number is worse than an empty input.
pub const NO_DEFAULT_KEYS: &[&str] = &["numero_documento", "fecha_nacimiento", "correo", "telefono"];

/// What an input should display: the submitted value when there is one, else
/// the descriptor's default, else nothing. Empty submissions do not count.
pub fn effective_value(field: &FieldDescriptor, form: &Map<String, Value>) -> Value {
    if let Some(value) = form.get(&field.key) {
        if !is_empty_value(value) {
            return value.clone();
        }
    }
    if NO_DEFAULT_KEYS.contains(&field.key.as_str()) {
        return Value::Null;
    }
    field.default_value.clone().unwrap_or(Value::Null)
}

/// Implemented by whatever turns fields into UI. `render_group` receives its
/// children already rendered, so nesting composes bottom-up.
pub trait FieldRenderer {
    type Output;

    fn render_input(
        &mut self,
        field: &FieldDescriptor,
        value: &Value,
        error: Option<&str>,
    ) -> Self::Output;

    fn render_choice(
        &mut self,
        field: &FieldDescriptor,
        value: &Value,
        options: &[String],
        error: Option<&str>,
    ) -> Self::Output;

    fn render_group(&mut self, field: &FieldDescriptor, children: Vec<Self::Output>)
    -> Self::Output;
}

/// Render one field. Object fields recurse with the sub-object as the child
/// form state; enum fields and relation fields become choices.
pub fn render_field<R: FieldRenderer>(
    renderer: &mut R,
    field: &FieldDescriptor,
    form: &Map<String, Value>,
    errors: &HashMap<String, String>,
) -> R::Output {
    let error = errors.get(&field.key).map(String::as_str);
    match &field.kind {
        FieldKind::Object { structure } => {
            let child_form = effective_value(field, form)
                .as_object()
                .cloned()
                .unwrap_or_default();
            let children = structure
                .iter()
                .map(|child| render_field(renderer, child, &child_form, errors))
                .collect();
            renderer.render_group(field, children)
        }
        FieldKind::Enum { .. } => {
            let options = resolver::option_set(field, form).unwrap_or_default();
            renderer.render_choice(field, &effective_value(field, form), &options, error)
        }
        FieldKind::Scalar(_) => {
            if resolver::is_relation_key(&field.key) {
                let options = resolver::relation_options(form.get(resolver::REFERENCE_TYPE_KEY));
                return renderer.render_choice(
                    field,
                    &effective_value(field, form),
                    &options,
                    error,
                );
            }
            renderer.render_input(field, &effective_value(field, form), error)
        }
    }
}

/// Render a whole descriptor list: display order first, then the visibility
/// filter, then one output per visible field.
pub fn render_form<R: FieldRenderer>(
    renderer: &mut R,
    fields: &[FieldDescriptor],
    form: &Map<String, Value>,
    errors: &HashMap<String, String>,
) -> Vec<R::Output> {
    let mut ordered = fields.to_vec();
    sort_for_display(&mut ordered);
    resolver::visible_fields(&ordered, form)
        .into_iter()
        .map(|field| render_field(renderer, field, form, errors))
        .collect()
}
