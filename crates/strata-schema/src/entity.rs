use serde::{Deserialize, Serialize};

use crate::descriptor::{FieldDescriptor, ScalarKind};

/// Per-entity schema split: `fixed` fields map to stored columns, `dynamic`
/// fields live inside the entity's single JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    #[serde(alias = "campos_fijos", default)]
    pub fixed: Vec<FieldDescriptor>,
    #[serde(alias = "campos_dinamicos", default)]
    pub dynamic: Vec<FieldDescriptor>,
}

impl EntitySchema {
    pub fn new(fixed: Vec<FieldDescriptor>, dynamic: Vec<FieldDescriptor>) -> Self {
        Self { fixed, dynamic }
    }

    pub fn find_fixed(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fixed.iter().find(|f| f.key == key)
    }

    pub fn find_dynamic(&self, key: &str) -> Option<&FieldDescriptor> {
        self.dynamic.iter().find(|f| f.key == key)
    }
}

/// The entities this engine manages, in creation order: the applicant record
/// is created first so its id can be threaded into the others.
pub const ENTITIES: &[&str] = &[
    "solicitante",
    "ubicacion",
    "actividad_economica",
    "informacion_financiera",
    "referencia",
    "solicitud",
];

/// Name of the JSON column holding an entity's dynamic attributes.
pub fn json_column_for(entity: &str) -> &'static str {
    match entity {
        "solicitante" => "info_extra",
        "ubicacion" => "detalle_direccion",
        "actividad_economica" => "detalle_actividad",
        "informacion_financiera" => "detalle_financiera",
        "referencia" => "detalle_referencia",
        "solicitud" => "detalle_credito",
        _ => "datos_adicionales",
    }
}

/// Entities stored one-to-many per application.
pub fn is_collection_entity(entity: &str) -> bool {
    entity == "referencia"
}

/// Minimal fixed-field lists used when the metadata service is unreachable
/// and no bundled fallback covers the entity.
pub fn default_fixed_fields(entity: &str) -> Vec<FieldDescriptor> {
    let keys: &[(&str, ScalarKind)] = match entity {
        "solicitante" => &[
            ("nombres", ScalarKind::Str),
            ("primer_apellido", ScalarKind::Str),
            ("segundo_apellido", ScalarKind::Str),
            ("tipo_identificacion", ScalarKind::Str),
            ("numero_documento", ScalarKind::Str),
            ("fecha_nacimiento", ScalarKind::Date),
            ("genero", ScalarKind::Str),
            ("correo", ScalarKind::Str),
        ],
        "ubicacion" => &[
            ("ciudad_residencia", ScalarKind::Str),
            ("departamento_residencia", ScalarKind::Str),
            ("direccion_residencia", ScalarKind::Str),
        ],
        "actividad_economica" => &[
            ("tipo_actividad", ScalarKind::Str),
            ("sector_economico", ScalarKind::Str),
        ],
        "informacion_financiera" => &[
            ("total_ingresos_mensuales", ScalarKind::Number),
            ("total_egresos_mensuales", ScalarKind::Number),
            ("total_activos", ScalarKind::Number),
            ("total_pasivos", ScalarKind::Number),
        ],
        "referencia" => &[("tipo_referencia", ScalarKind::Str)],
        "solicitud" => &[
            ("monto_solicitado", ScalarKind::Number),
            ("estado", ScalarKind::Str),
        ],
        _ => &[],
    };

    keys.iter()
        .enumerate()
        .map(|(i, (key, kind))| FieldDescriptor::scalar(key, *kind).order(i as u32 + 1))
        .collect()
}
