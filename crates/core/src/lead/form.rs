use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::validate::FieldError;

/// Inputs of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Phone,
    District,
    RenovationType,
    Details,
    Honeypot,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Phone,
        Field::District,
        Field::RenovationType,
        Field::Details,
        Field::Honeypot,
    ];

    /// Name used in form posts and error maps
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::District => "district",
            Field::RenovationType => "type",
            Field::Details => "details",
            Field::Honeypot => "honeypot",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown form field '{}'", s))
    }
}

/// Field name -> failed check, rebuilt on every validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, FieldError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, error: FieldError) {
        self.0.insert(error.field, error);
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldError> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn message(&self, field: Field) -> Option<&'static str> {
        self.get(field).map(FieldError::message)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.values()
    }
}

/// Immutable copy of the raw field values at submit time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub name: String,
    pub phone: String,
    pub district: String,
    pub renovation_type: String,
    pub details: String,
    pub honeypot: String,
}

impl FormSnapshot {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::District => &self.district,
            Field::RenovationType => &self.renovation_type,
            Field::Details => &self.details,
            Field::Honeypot => &self.honeypot,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Phone => &mut self.phone,
            Field::District => &mut self.district,
            Field::RenovationType => &mut self.renovation_type,
            Field::Details => &mut self.details,
            Field::Honeypot => &mut self.honeypot,
        }
    }
}

/// Current values of the contact form plus its visible errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: FormSnapshot,
    errors: FormErrors,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a value. The field's error is dropped right away, even if
    /// the new value is still invalid; the next submit re-checks it.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.values.slot(field) = value.into();
        self.errors.remove(field);
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Replace the whole error map with the result of a validation pass
    pub fn set_errors(&mut self, errors: FormErrors) {
        self.errors = errors;
    }

    pub fn reset(&mut self) {
        self.values = FormSnapshot::default();
        self.errors.clear();
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.values.clone()
    }
}
