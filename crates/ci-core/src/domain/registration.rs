use serde::{Deserialize, Serialize};

use crate::intake::validators::{
    is_valid_cpf, is_valid_crm, is_valid_email, is_valid_password, is_valid_uf,
};
use crate::intake::FieldError;

/// Account-creation payload submitted from the registration screen.
///
/// Validated locally before any network call; the backend performs its own
/// checks and may still reject the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub cpf: String,
    pub crm: String,
    pub uf: String,
    pub password: String,
    #[serde(skip_serializing, default)]
    pub password_confirmation: String,
}

impl Registration {
    /// Validate the whole payload, returning every field error in screen
    /// order. The confirmation check is the only cross-field rule.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.full_name.trim().chars().count() < 3 {
            errors.push(FieldError::new("full_name", "Informe o nome completo"));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "E-mail inválido"));
        }
        if !is_valid_cpf(&self.cpf) {
            errors.push(FieldError::new("cpf", "CPF inválido"));
        }
        if !is_valid_crm(&self.crm) {
            errors.push(FieldError::new("crm", "CRM inválido"));
        }
        if !is_valid_uf(&self.uf) {
            errors.push(FieldError::new("uf", "UF inválida"));
        }
        if !is_valid_password(&self.password) {
            errors.push(FieldError::new(
                "password",
                "A senha deve ter de 8 a 100 caracteres, com maiúscula, minúscula e número",
            ));
        }
        if self.password != self.password_confirmation {
            errors.push(FieldError::new(
                "password_confirmation",
                "As senhas não coincidem",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> Registration {
        Registration {
            full_name: "Maria da Silva".into(),
            email: "maria@hospital.org".into(),
            cpf: "52998224725".into(),
            crm: "123456".into(),
            uf: "SP".into(),
            password: "Segura123".into(),
            password_confirmation: "Segura123".into(),
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_reported() {
        let mut reg = valid_registration();
        reg.password_confirmation = "Segura124".into();
        let errors = reg.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password_confirmation");
    }

    #[test]
    fn errors_are_reported_in_screen_order() {
        let reg = Registration {
            full_name: "X".into(),
            email: "bad".into(),
            cpf: "11111111111".into(),
            crm: "1".into(),
            uf: "ZZ".into(),
            password: "short".into(),
            password_confirmation: "short".into(),
        };
        let errors = reg.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["full_name", "email", "cpf", "crm", "uf", "password"]
        );
    }
}
