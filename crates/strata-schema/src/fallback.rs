use serde_json::json;

use crate::descriptor::{FieldDescriptor, ScalarKind};
use crate::entity::json_column_for;

/// Bundled descriptor lists for the known (entity, column) pairs, used only
/// when the live metadata fetch fails. A successful fetch always wins.
pub fn fallback_fields(entity: &str, column: &str) -> Option<Vec<FieldDescriptor>> {
    if json_column_for(entity) != column {
        return None;
    }
    match entity {
        "solicitante" => Some(solicitante_fields()),
        "ubicacion" => Some(ubicacion_fields()),
        "actividad_economica" => Some(actividad_fields()),
        "informacion_financiera" => Some(financiera_fields()),
        "referencia" => Some(referencia_fields()),
        "solicitud" => Some(solicitud_fields()),
        _ => None,
    }
}

fn solicitante_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::scalar("nombres", ScalarKind::Str)
            .required()
            .describe("Nombres del solicitante")
            .order(1),
        FieldDescriptor::scalar("primer_apellido", ScalarKind::Str)
            .required()
            .describe("Primer apellido")
            .order(2),
        FieldDescriptor::scalar("segundo_apellido", ScalarKind::Str)
            .describe("Segundo apellido")
            .order(3),
        FieldDescriptor::enumeration("tipo_identificacion", &["CC", "TE", "TI"])
            .required()
            .describe("Tipo de identificación")
            .default_to(json!("CC"))
            .order(4),
        FieldDescriptor::scalar("numero_documento", ScalarKind::Str)
            .required()
            .describe("Número de documento")
            .order(5),
        FieldDescriptor::scalar("fecha_nacimiento", ScalarKind::Date)
            .required()
            .describe("Fecha de nacimiento")
            .order(6),
        FieldDescriptor::enumeration("genero", &["M", "F"])
            .required()
            .describe("Género")
            .order(7),
        FieldDescriptor::scalar("correo", ScalarKind::Str)
            .required()
            .describe("Correo electrónico")
            .order(8),
        FieldDescriptor::scalar("telefono", ScalarKind::Str)
            .required()
            .describe("Teléfono de contacto")
            .order(9),
        FieldDescriptor::enumeration(
            "estado_civil",
            &["Soltero", "Casado", "Divorciado", "Viudo", "Unión Libre"],
        )
        .required()
        .describe("Estado Civil")
        .default_to(json!("Soltero"))
        .order(10),
        FieldDescriptor::scalar("personas_a_cargo", ScalarKind::Integer)
            .describe("Número de personas a cargo")
            .default_to(json!(0))
            .order(11),
    ]
}

fn ubicacion_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::scalar("ciudad_residencia", ScalarKind::Str)
            .required()
            .describe("Ciudad de residencia")
            .order(1),
        FieldDescriptor::scalar("departamento_residencia", ScalarKind::Str)
            .required()
            .describe("Departamento de residencia")
            .order(2),
        FieldDescriptor::scalar("direccion_residencia", ScalarKind::Str)
            .required()
            .describe("Dirección de residencia")
            .order(3),
        FieldDescriptor::scalar("barrio", ScalarKind::Str)
            .describe("Barrio")
            .order(4),
        FieldDescriptor::scalar("estrato", ScalarKind::Integer)
            .describe("Estrato socioeconómico")
            .order(5),
        FieldDescriptor::object(
            "arrendador",
            vec![
                FieldDescriptor::scalar("nombre", ScalarKind::Str)
                    .required()
                    .describe("Nombre del arrendador"),
                FieldDescriptor::scalar("telefono", ScalarKind::Str)
                    .required()
                    .describe("Teléfono de contacto"),
                FieldDescriptor::scalar("ciudad", ScalarKind::Str).describe("Ciudad"),
                FieldDescriptor::scalar("departamento", ScalarKind::Str)
                    .describe("Departamento"),
                FieldDescriptor::scalar("valor_mensual_arriendo", ScalarKind::Number)
                    .describe("Valor mensual del arriendo"),
            ],
        )
        .describe("Información del arrendador")
        .order(6),
    ]
}

fn actividad_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::enumeration(
            "tipo_actividad",
            &["empleado", "independiente", "pensionado", "desempleado"],
        )
        .required()
        .describe("Tipo de actividad económica")
        .order(1),
        FieldDescriptor::enumeration(
            "sector_economico",
            &[
                "servicios",
                "comercio",
                "industria",
                "agricultura",
                "construccion",
                "otros",
            ],
        )
        .required()
        .describe("Sector económico")
        .order(2),
        FieldDescriptor::scalar("empresa", ScalarKind::Str)
            .describe("Nombre de la empresa")
            .visible_when("tipo_actividad", json!("empleado"))
            .order(3),
        FieldDescriptor::scalar("cargo", ScalarKind::Str)
            .describe("Cargo actual")
            .visible_when("tipo_actividad", json!("empleado"))
            .order(4),
        FieldDescriptor::scalar("antiguedad_meses", ScalarKind::Integer)
            .describe("Antigüedad en meses")
            .order(5),
        FieldDescriptor::scalar("ingresos_mensuales", ScalarKind::Number)
            .describe("Ingresos mensuales")
            .order(6),
    ]
}

fn financiera_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::scalar("total_ingresos_mensuales", ScalarKind::Number)
            .required()
            .describe("Total de ingresos mensuales")
            .order(1),
        FieldDescriptor::scalar("total_egresos_mensuales", ScalarKind::Number)
            .required()
            .describe("Total de egresos mensuales")
            .order(2),
        FieldDescriptor::scalar("total_activos", ScalarKind::Number)
            .describe("Total de activos")
            .order(3),
        FieldDescriptor::scalar("total_pasivos", ScalarKind::Number)
            .describe("Total de pasivos")
            .order(4),
        FieldDescriptor::scalar("otros_ingresos", ScalarKind::Number)
            .describe("Otros ingresos mensuales")
            .order(5),
        FieldDescriptor::scalar("gastos_vivienda", ScalarKind::Number)
            .describe("Gastos de vivienda")
            .order(6),
        FieldDescriptor::scalar("gastos_alimentacion", ScalarKind::Number)
            .describe("Gastos de alimentación")
            .order(7),
        FieldDescriptor::scalar("gastos_transporte", ScalarKind::Number)
            .describe("Gastos de transporte")
            .order(8),
    ]
}

fn referencia_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::enumeration(
            "tipo_referencia",
            &["personal", "familiar", "laboral", "comercial"],
        )
        .required()
        .describe("Tipo de referencia")
        .default_to(json!("personal"))
        .order(1),
        FieldDescriptor::scalar("nombre_referencia", ScalarKind::Str)
            .required()
            .describe("Nombre de la referencia")
            .order(2),
        FieldDescriptor::scalar("telefono_referencia", ScalarKind::Str)
            .required()
            .describe("Teléfono de la referencia")
            .order(3),
        FieldDescriptor::scalar("parentesco", ScalarKind::Str)
            .describe("Parentesco o relación")
            .order(4),
    ]
}

fn solicitud_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::scalar("monto_solicitado", ScalarKind::Number)
            .required()
            .describe("Monto solicitado")
            .order(1),
        FieldDescriptor::scalar("plazo_meses", ScalarKind::Integer)
            .required()
            .describe("Plazo en meses")
            .order(2),
        FieldDescriptor::enumeration(
            "destino_credito",
            &[
                "Vivienda",
                "Vehiculo",
                "Negocio",
                "Educación",
                "Consumo",
                "Otros",
            ],
        )
        .required()
        .describe("Destino del crédito")
        .order(3),
        FieldDescriptor::scalar("cuota_inicial", ScalarKind::Number)
            .describe("Cuota inicial")
            .order(4),
        FieldDescriptor::scalar("valor_inmueble", ScalarKind::Number)
            .describe("Valor del inmueble")
            .visible_when("destino_credito", json!("Vivienda"))
            .order(5),
    ]
}
