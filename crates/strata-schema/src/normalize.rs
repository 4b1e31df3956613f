use crate::descriptor::{FieldDescriptor, FieldKind, ScalarKind};

/// Keys that older schema versions served as `string` but that the stored
/// columns treat as dates. Forced to date regardless of the declared type.
const DATE_KEYS: &[&str] = &[
    "fecha_nacimiento",
    "fecha_expedicion",
    "fecha_ingreso_empresa",
    "fecha_vinculacion",
];

/// Apply corrective rules and display ordering to a freshly fetched
/// descriptor list. Runs once per fetch, before the list is cached.
pub fn normalize_fields(mut fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    for field in &mut fields {
        if DATE_KEYS.contains(&field.key.as_str())
            && matches!(field.kind, FieldKind::Scalar(ScalarKind::Str))
        {
            field.kind = FieldKind::Scalar(ScalarKind::Date);
        }
    }
    sort_for_display(&mut fields);
    fields
}

/// Sort by `order_index`, absent values last. Stable, so equal ranks keep
/// their served order.
pub fn sort_for_display(fields: &mut [FieldDescriptor]) {
    fields.sort_by_key(|f| f.display_rank());
}
