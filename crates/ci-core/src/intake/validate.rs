//! Step validation: raw screen input in, normalized slice or ordered field
//! errors out.

use serde_json::{Map, Number, Value};

use super::fields::{Constraint, FieldSpec, StepProjection};
use super::validators;

/// One inline field message, in the order the screen renders its fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate one step's raw input against its projection.
///
/// Fields outside the projection are ignored entirely: a stray (even
/// invalid) value belonging to another step never blocks this one.
/// On success the returned map holds only this step's fields, trimmed and
/// reformatted; on failure the errors come in field order, refinement
/// messages last. Invalid input never reaches the accumulated record.
pub fn validate_step(
    step: &StepProjection,
    raw: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<FieldError>> {
    let mut normalized = Map::new();
    let mut errors = Vec::new();

    for spec in step.fields {
        match raw.get(spec.name) {
            None => {
                if spec.required {
                    errors.push(FieldError::new(spec.name, "Campo obrigatório"));
                }
            }
            Some(value) => match normalize_field(spec, value) {
                Ok(Some(value)) => {
                    normalized.insert(spec.name.to_string(), value);
                }
                Ok(None) => {
                    // Blank input: same as absent.
                    if spec.required {
                        errors.push(FieldError::new(spec.name, "Campo obrigatório"));
                    }
                }
                Err(message) => errors.push(FieldError::new(spec.name, message)),
            },
        }
    }

    if let Some(refine) = step.refine {
        errors.extend(refine(&normalized));
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce one raw value. `Ok(None)` means "blank, treat as absent".
fn normalize_field(spec: &FieldSpec, value: &Value) -> Result<Option<Value>, String> {
    // Flags come in as real booleans from toggle components, or as the
    // legacy "sim"/"nao" strings from radio groups.
    if let Constraint::Flag = spec.constraint {
        return match value {
            Value::Bool(b) => Ok(Some(Value::Bool(*b))),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "sim" | "true" => Ok(Some(Value::Bool(true))),
                "nao" | "não" | "false" => Ok(Some(Value::Bool(false))),
                _ => Err("Selecione sim ou não".to_string()),
            },
            Value::Null => Ok(None),
            _ => Err("Selecione sim ou não".to_string()),
        };
    }

    if value.is_null() {
        return Ok(None);
    }
    let Some(text) = as_text(value) else {
        return Err("Valor inválido".to_string());
    };
    if text.is_empty() {
        return Ok(None);
    }

    match spec.constraint {
        Constraint::Flag => unreachable!("handled above"),
        Constraint::Text { min, max } => {
            let count = text.chars().count();
            if count < min {
                Err(format!("Mínimo de {min} caracteres"))
            } else if count > max {
                Err(format!("Máximo de {max} caracteres"))
            } else {
                Ok(Some(Value::String(text)))
            }
        }
        Constraint::FreeText { max } => {
            if text.chars().count() > max {
                Err(format!("Máximo de {max} caracteres"))
            } else {
                Ok(Some(Value::String(text)))
            }
        }
        Constraint::Digits { min_len, max_len } => {
            let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() != text.len() || !(min_len..=max_len).contains(&digits.len()) {
                Err("Informe apenas números".to_string())
            } else {
                Ok(Some(Value::String(digits)))
            }
        }
        Constraint::OneOf(options) => {
            let lowered = text.to_lowercase();
            if options.contains(&lowered.as_str()) {
                Ok(Some(Value::String(lowered)))
            } else {
                Err("Opção inválida".to_string())
            }
        }
        Constraint::Date => {
            if validators::is_valid_date(&text) {
                Ok(Some(Value::String(validators::format_date_digits(&text))))
            } else {
                Err("Data inválida".to_string())
            }
        }
        Constraint::BirthDate => {
            if validators::is_valid_data_nascimento(&text) {
                Ok(Some(Value::String(validators::format_date_digits(&text))))
            } else {
                Err("Data de nascimento inválida".to_string())
            }
        }
        Constraint::Cpf => {
            if validators::is_valid_cpf(&text) {
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                Ok(Some(Value::String(digits)))
            } else {
                Err("CPF inválido".to_string())
            }
        }
        Constraint::Cnpj => {
            if validators::is_valid_cnpj(&text) {
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                Ok(Some(Value::String(digits)))
            } else {
                Err("CNPJ inválido".to_string())
            }
        }
        Constraint::Crm => {
            if validators::is_valid_crm(&text) {
                Ok(Some(Value::String(text)))
            } else {
                Err("CRM inválido".to_string())
            }
        }
        Constraint::Number { min, max } => {
            let parsed: Result<f64, _> = text.replace(',', ".").parse();
            match parsed {
                Ok(n) if (min..=max).contains(&n) => {
                    let number = Number::from_f64(n).ok_or("Valor inválido")?;
                    Ok(Some(Value::Number(number)))
                }
                Ok(_) => Err(format!("Valor fora da faixa {min} a {max}")),
                Err(_) => Err("Informe um número válido".to_string()),
            }
        }
    }
}
