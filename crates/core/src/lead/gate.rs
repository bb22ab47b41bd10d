use serde::{Deserialize, Serialize};

use crate::types::RenovationType;

use super::form::{Field, FormErrors, FormSnapshot};
use super::validate::{FieldError, validate_field, validate_type};

/// Validated contact request, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub district: String,
    pub renovation_type: RenovationType,
    pub details: String,
}

/// Check every field and build a [`LeadSubmission`] from trimmed values.
///
/// All validators run, so the returned errors cover every bad field at
/// once. A filled honeypot fails the gate regardless of the other fields.
pub fn evaluate(snapshot: &FormSnapshot) -> Result<LeadSubmission, FormErrors> {
    let mut errors = FormErrors::new();
    let renovation_type = validate_type(&snapshot.renovation_type);
    for field in Field::ALL {
        let check = match field {
            Field::RenovationType => renovation_type.map(|_| ()),
            _ => validate_field(field, snapshot.get(field)),
        };
        if let Err(kind) = check {
            errors.insert(FieldError::new(field, kind));
        }
    }

    let renovation_type = match renovation_type {
        Ok(renovation_type) if errors.is_empty() => renovation_type,
        _ => return Err(errors),
    };

    Ok(LeadSubmission {
        name: snapshot.name.trim().to_string(),
        phone: snapshot.phone.trim().to_string(),
        district: snapshot.district.trim().to_string(),
        renovation_type,
        details: snapshot.details.trim().to_string(),
    })
}
