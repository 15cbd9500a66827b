//! The master field set and its partition into six step projections.
//!
//! Every field of the master schema belongs to exactly one projection; the
//! partition is enforced by the tests at the bottom of this file, not at
//! runtime.

use serde_json::{Map, Value};

use super::validate::FieldError;

/// Primitive constraint attached to a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Trimmed text with a character-count range.
    Text { min: usize, max: usize },
    /// Trimmed free text bounded only above (observation boxes).
    FreeText { max: usize },
    /// Digits-only identifier with a length range (record number, phone).
    Digits { min_len: usize, max_len: usize },
    /// One of a fixed set of lowercase options (select inputs).
    OneOf(&'static [&'static str]),
    /// Calendar-correct `DD/MM/YYYY`, accepted as digits-only while typing.
    Date,
    /// Like [`Constraint::Date`] but additionally bounded to 1900..=today.
    BirthDate,
    /// CPF with checksum verification.
    Cpf,
    /// CNPJ with checksum verification.
    Cnpj,
    /// CRM, numeric-only (see `validators::is_valid_crm`).
    Crm,
    /// Inclusive numeric range; comma decimal separators are accepted.
    Number { min: f64, max: f64 },
    /// Yes/no toggle, normalized to a JSON boolean.
    Flag,
}

/// One named field of the master schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub constraint: Constraint,
}

const fn req(name: &'static str, constraint: Constraint) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
        constraint,
    }
}

const fn opt(name: &'static str, constraint: Constraint) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
        constraint,
    }
}

/// Step-scoped cross-field rule, evaluated over the normalized slice.
pub type Refinement = fn(&Map<String, Value>) -> Vec<FieldError>;

/// A named, ordered projection of the master schema: the slice of fields
/// one wizard screen validates and submits.
pub struct StepProjection {
    pub index: u8,
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    pub refine: Option<Refinement>,
}

fn flag_is_set(record: &Map<String, Value>, name: &str) -> bool {
    matches!(record.get(name), Some(Value::Bool(true)))
}

fn has_text(record: &Map<String, Value>, name: &str) -> bool {
    matches!(record.get(name), Some(Value::String(s)) if !s.trim().is_empty())
}

fn require_when_flagged(
    record: &Map<String, Value>,
    flag: &str,
    companion: &str,
    message: &str,
) -> Vec<FieldError> {
    if flag_is_set(record, flag) && !has_text(record, companion) {
        vec![FieldError::new(companion, message)]
    } else {
        Vec::new()
    }
}

fn refine_sedacao(record: &Map<String, Value>) -> Vec<FieldError> {
    require_when_flagged(
        record,
        "em_sedacao",
        "drogas_sedacao",
        "Informe as drogas em uso na sedação",
    )
}

fn refine_antibioticos(record: &Map<String, Value>) -> Vec<FieldError> {
    require_when_flagged(
        record,
        "em_antibioticoterapia",
        "antibioticos_em_uso",
        "Informe os antibióticos em uso",
    )
}

fn refine_paliativo(record: &Map<String, Value>) -> Vec<FieldError> {
    require_when_flagged(
        record,
        "cuidado_paliativo",
        "justificativa_paliativo",
        "Informe a justificativa para cuidado paliativo",
    )
}

const IDENTIFICACAO: &[FieldSpec] = &[
    req("nome_completo", Constraint::Text { min: 3, max: 120 }),
    req("data_nascimento", Constraint::BirthDate),
    req("cpf", Constraint::Cpf),
    req("sexo", Constraint::OneOf(&["masculino", "feminino", "outro"])),
    req("prontuario", Constraint::Digits { min_len: 1, max_len: 10 }),
    req("leito", Constraint::Text { min: 1, max: 10 }),
    req("data_internacao", Constraint::Date),
    opt("convenio", Constraint::Text { min: 2, max: 80 }),
    opt("cnpj_instituicao", Constraint::Cnpj),
    opt("telefone_contato", Constraint::Digits { min_len: 10, max_len: 11 }),
];

const NUTRICAO: &[FieldSpec] = &[
    req(
        "via_alimentacao",
        Constraint::OneOf(&["oral", "enteral", "parenteral", "mista"]),
    ),
    opt("dieta_prescrita", Constraint::FreeText { max: 200 }),
    req(
        "aceitacao_dieta",
        Constraint::OneOf(&["boa", "parcial", "recusa"]),
    ),
    req("peso_kg", Constraint::Number { min: 0.5, max: 400.0 }),
    req("altura_cm", Constraint::Number { min: 30.0, max: 250.0 }),
    req("perda_peso_recente", Constraint::Flag),
    req("suplementacao", Constraint::Flag),
    opt("obs_nutricao", Constraint::FreeText { max: 500 }),
];

const SEDACAO: &[FieldSpec] = &[
    req("em_sedacao", Constraint::Flag),
    opt("drogas_sedacao", Constraint::FreeText { max: 200 }),
    opt(
        "escala_rass",
        Constraint::OneOf(&[
            "-5", "-4", "-3", "-2", "-1", "0", "+1", "+2", "+3", "+4",
        ]),
    ),
    opt(
        "escala_ramsay",
        Constraint::OneOf(&["1", "2", "3", "4", "5", "6"]),
    ),
    req("dor_escala_ev", Constraint::Number { min: 0.0, max: 10.0 }),
    req("analgesia_continua", Constraint::Flag),
    opt("drogas_analgesia", Constraint::FreeText { max: 200 }),
    req("delirium_presente", Constraint::Flag),
    opt("obs_sedacao", Constraint::FreeText { max: 500 }),
];

const METABOLICO: &[FieldSpec] = &[
    req("glicemia_mg_dl", Constraint::Number { min: 10.0, max: 1000.0 }),
    req("em_insulinoterapia", Constraint::Flag),
    opt("esquema_insulina", Constraint::FreeText { max: 200 }),
    opt("creatinina_mg_dl", Constraint::Number { min: 0.1, max: 20.0 }),
    opt("ureia_mg_dl", Constraint::Number { min: 1.0, max: 400.0 }),
    opt("sodio_meq_l", Constraint::Number { min: 100.0, max: 200.0 }),
    opt("potassio_meq_l", Constraint::Number { min: 1.0, max: 9.0 }),
    req("dialise", Constraint::Flag),
];

const ANTIBIOTICOS: &[FieldSpec] = &[
    req("em_antibioticoterapia", Constraint::Flag),
    opt("antibioticos_em_uso", Constraint::FreeText { max: 300 }),
    opt("data_inicio_atb", Constraint::Date),
    req("cultura_coletada", Constraint::Flag),
    opt(
        "foco_infeccioso",
        Constraint::OneOf(&[
            "pulmonar",
            "urinario",
            "abdominal",
            "corrente_sanguinea",
            "pele_partes_moles",
            "outro",
            "indefinido",
        ]),
    ),
    req("em_precaucao_contato", Constraint::Flag),
    req("febre_ultimas_24h", Constraint::Flag),
    opt("obs_antibioticos", Constraint::FreeText { max: 500 }),
];

const PALIATIVO: &[FieldSpec] = &[
    req("cuidado_paliativo", Constraint::Flag),
    opt("justificativa_paliativo", Constraint::FreeText { max: 500 }),
    opt("escala_pps", Constraint::Number { min: 0.0, max: 100.0 }),
    req("diretivas_antecipadas", Constraint::Flag),
    req("familia_comunicada", Constraint::Flag),
    req("medico_responsavel", Constraint::Text { min: 3, max: 120 }),
    req("crm_medico", Constraint::Crm),
    req("data_avaliacao", Constraint::Date),
];

/// The six ordered step projections; together they cover the master schema
/// exactly once.
pub const STEPS: [StepProjection; 6] = [
    StepProjection {
        index: 1,
        name: "identificacao",
        fields: IDENTIFICACAO,
        refine: None,
    },
    StepProjection {
        index: 2,
        name: "nutricao",
        fields: NUTRICAO,
        refine: None,
    },
    StepProjection {
        index: 3,
        name: "sedacao",
        fields: SEDACAO,
        refine: Some(refine_sedacao),
    },
    StepProjection {
        index: 4,
        name: "metabolico",
        fields: METABOLICO,
        refine: None,
    },
    StepProjection {
        index: 5,
        name: "antibioticos",
        fields: ANTIBIOTICOS,
        refine: Some(refine_antibioticos),
    },
    StepProjection {
        index: 6,
        name: "paliativo",
        fields: PALIATIVO,
        refine: Some(refine_paliativo),
    },
];

/// Look up a projection by its 1-based step index.
pub fn step(index: u8) -> Option<&'static StepProjection> {
    STEPS.iter().find(|s| s.index == index)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn projections_partition_the_master_schema() {
        let mut seen = HashSet::new();
        let mut total = 0usize;
        for step in &STEPS {
            assert!(!step.fields.is_empty(), "step {} has no fields", step.name);
            for field in step.fields {
                assert!(
                    seen.insert(field.name),
                    "field {} appears in more than one projection",
                    field.name
                );
                total += 1;
            }
        }
        assert_eq!(total, seen.len());
        assert_eq!(total, 51);
    }

    #[test]
    fn step_indexes_are_ordered_one_to_six() {
        let indexes: Vec<u8> = STEPS.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5, 6]);
        assert!(step(3).is_some());
        assert!(step(0).is_none());
        assert!(step(7).is_none());
    }

    #[test]
    fn conditional_companions_are_optional_at_field_level() {
        // The refinements own these requirements; the field specs must not
        // also mark them required or an unset flag would block submission.
        for name in ["drogas_sedacao", "antibioticos_em_uso", "justificativa_paliativo"] {
            let spec = STEPS
                .iter()
                .flat_map(|s| s.fields)
                .find(|f| f.name == name)
                .unwrap();
            assert!(!spec.required, "{name} must stay optional at field level");
        }
    }
}
