use crate::domain::fields::FIELDS;
use crate::domain::operation::Operation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationFailure),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// User-correctable submission failure. Never a system error; surfaced
/// inline by the intake view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationFailure {
    MissingFields { fields: Vec<&'static str>, message: String },
    NonPositiveFinancials { message: String },
}

impl ValidationFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::MissingFields { message, .. } | Self::NonPositiveFinancials { message } => {
                message
            }
        }
    }

    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Self::MissingFields { fields, .. } => fields,
            Self::NonPositiveFinancials { .. } => &[],
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Check a draft against the canonical required set and the positive
/// financial-value rule. Pure; never mutates the draft.
pub fn validate(draft: &Operation) -> ValidationResult {
    let missing: Vec<&'static str> = FIELDS
        .iter()
        .filter(|spec| spec.required && draft.field_is_empty(spec))
        .map(|spec| spec.name)
        .collect();

    if !missing.is_empty() {
        let listed =
            missing.iter().map(|name| name.to_uppercase()).collect::<Vec<_>>().join(", ");
        return ValidationResult::Invalid(ValidationFailure::MissingFields {
            fields: missing,
            message: format!("Faltan campos obligatorios: {listed}"),
        });
    }

    let non_positive = FIELDS
        .iter()
        .any(|spec| spec.positive && draft.money(spec.name).unwrap_or(0) <= 0);
    if non_positive {
        return ValidationResult::Invalid(ValidationFailure::NonPositiveFinancials {
            message: "La inversión y la solicitud deben ser mayores a cero.".to_string(),
        });
    }

    ValidationResult::Valid
}
