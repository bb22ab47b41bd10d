//! Per-field checks for the contact form.
//!
//! Each validator is a pure function returning the first failing
//! [`ErrorKind`] for its field, or `Ok`. [`validate_type`] also hands back the
//! parsed [`RenovationType`].

use crate::types::RenovationType;

use super::form::Field;

pub const NAME_MAX_CHARS: usize = 100;
pub const PHONE_MAX_CHARS: usize = 20;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 11;
pub const DETAILS_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Required,
    TooLong,
    InvalidFormat,
    SpamDetected,
}

/// A failed check on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: ErrorKind) -> Self {
        Self { field, kind }
    }

    /// Message shown under the input
    pub fn message(&self) -> &'static str {
        use ErrorKind::*;
        match (self.field, self.kind) {
            (Field::Name, TooLong) => "Ad soyad en fazla 100 karakter olabilir",
            (Field::Name, _) => "Ad soyad gereklidir",
            (Field::Phone, InvalidFormat) => {
                "Geçerli bir Türkiye telefon numarası giriniz (10-11 haneli)"
            }
            (Field::Phone, TooLong) => "Telefon numarası en fazla 20 karakter olabilir",
            (Field::Phone, _) => "Telefon numarası gereklidir",
            (Field::District, _) => "İlçe/mahalle bilgisi gereklidir",
            (Field::RenovationType, _) => "Tadilat türü seçimi gereklidir",
            (Field::Details, TooLong) => "Proje detayı en fazla 800 karakter olabilir",
            (Field::Details, _) => "Proje detayı gereklidir",
            (Field::Honeypot, _) => "Spam tespit edildi",
        }
    }
}

pub type Check = Result<(), ErrorKind>;

pub fn validate_name(v: &str) -> Check {
    let trimmed = v.trim();
    if trimmed.is_empty() {
        return Err(ErrorKind::Required);
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(ErrorKind::TooLong);
    }
    Ok(())
}

/// Turkish phone numbers: 10 digits, or 11 with the leading trunk `0`.
/// Spaces, dashes and parentheses are formatting and ignored.
pub fn validate_phone(v: &str) -> Check {
    if v.trim().is_empty() {
        return Err(ErrorKind::Required);
    }
    let digits = phone_digit_count(v);
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Err(ErrorKind::InvalidFormat);
    }
    if v.chars().count() > PHONE_MAX_CHARS {
        return Err(ErrorKind::TooLong);
    }
    Ok(())
}

fn phone_digit_count(v: &str) -> usize {
    v.chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
        .filter(|c| c.is_ascii_digit())
        .count()
}

pub fn validate_district(v: &str) -> Check {
    if v.trim().is_empty() {
        return Err(ErrorKind::Required);
    }
    Ok(())
}

/// Parses the select key; an unknown key counts as no choice
pub fn validate_type(v: &str) -> Result<RenovationType, ErrorKind> {
    RenovationType::from_key(v).ok_or(ErrorKind::Required)
}

pub fn validate_details(v: &str) -> Check {
    let trimmed = v.trim();
    if trimmed.is_empty() {
        return Err(ErrorKind::Required);
    }
    if trimmed.chars().count() > DETAILS_MAX_CHARS {
        return Err(ErrorKind::TooLong);
    }
    Ok(())
}

/// The hidden `website` input. People never see it, so any value is a bot.
pub fn validate_honeypot(v: &str) -> Check {
    if v.is_empty() {
        Ok(())
    } else {
        Err(ErrorKind::SpamDetected)
    }
}

/// Run the validator belonging to `field`
pub fn validate_field(field: Field, v: &str) -> Check {
    match field {
        Field::Name => validate_name(v),
        Field::Phone => validate_phone(v),
        Field::District => validate_district(v),
        Field::RenovationType => validate_type(v).map(|_| ()),
        Field::Details => validate_details(v),
        Field::Honeypot => validate_honeypot(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Ali Veli"), Ok(()));
        assert_eq!(validate_name(""), Err(ErrorKind::Required));
        assert_eq!(validate_name("   \t"), Err(ErrorKind::Required));
        assert_eq!(validate_name(&"a".repeat(100)), Ok(()));
        assert_eq!(validate_name(&"a".repeat(101)), Err(ErrorKind::TooLong));
        // Length is measured after trimming
        assert_eq!(validate_name(&format!("  {}  ", "a".repeat(100))), Ok(()));
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        // 100 two-byte characters
        assert_eq!(validate_name(&"ş".repeat(100)), Ok(()));
        assert_eq!(validate_name(&"ş".repeat(101)), Err(ErrorKind::TooLong));
    }

    #[test]
    fn test_validate_phone_accepts_common_formats() {
        assert_eq!(validate_phone("0532 123 45 67"), Ok(()));
        assert_eq!(validate_phone("05321234567"), Ok(()));
        assert_eq!(validate_phone("532-123-45-67"), Ok(()));
        assert_eq!(validate_phone("(0532) 123 45 67"), Ok(()));
    }

    #[test]
    fn test_validate_phone_digit_count() {
        assert_eq!(validate_phone("123"), Err(ErrorKind::InvalidFormat));
        assert_eq!(validate_phone("123456789"), Err(ErrorKind::InvalidFormat));
        assert_eq!(validate_phone("1234567890"), Ok(()));
        assert_eq!(validate_phone("12345678901"), Ok(()));
        assert_eq!(validate_phone("123456789012"), Err(ErrorKind::InvalidFormat));
        // +90 prefix pushes a full number to 12 digits
        assert_eq!(validate_phone("+90 532 123 45 67"), Err(ErrorKind::InvalidFormat));
    }

    #[test]
    fn test_validate_phone_ignores_non_digits_in_count() {
        assert_eq!(validate_phone("tel: 0532 123 45 67"), Ok(()));
        assert_eq!(validate_phone("abcdefghijk"), Err(ErrorKind::InvalidFormat));
    }

    #[test]
    fn test_validate_phone_raw_length() {
        // 11 digits but 21 raw characters
        let padded = "0 5 3 2 1 2 3 4 5 6 7";
        assert_eq!(padded.chars().count(), 21);
        assert_eq!(validate_phone(padded), Err(ErrorKind::TooLong));
        assert_eq!(validate_phone("0532 - 123 - 45 - 67"), Ok(()));
    }

    #[test]
    fn test_validate_phone_required() {
        assert_eq!(validate_phone(""), Err(ErrorKind::Required));
        assert_eq!(validate_phone("   "), Err(ErrorKind::Required));
    }

    #[test]
    fn test_validate_district() {
        assert_eq!(validate_district("Bornova"), Ok(()));
        assert_eq!(validate_district(" "), Err(ErrorKind::Required));
    }

    #[test]
    fn test_validate_type() {
        for key in ["mutfak", "banyo", "komple", "diger"] {
            assert!(validate_type(key).is_ok(), "{key}");
        }
        assert_eq!(validate_type("mutfak"), Ok(RenovationType::Kitchen));
        assert_eq!(validate_type(""), Err(ErrorKind::Required));
        assert_eq!(validate_type("Mutfak"), Err(ErrorKind::Required));
        assert_eq!(validate_type("havuz"), Err(ErrorKind::Required));
    }

    #[test]
    fn test_validate_details() {
        assert_eq!(validate_details("Mutfak yenilemek istiyorum"), Ok(()));
        assert_eq!(validate_details("\n"), Err(ErrorKind::Required));
        assert_eq!(validate_details(&"x".repeat(800)), Ok(()));
        assert_eq!(validate_details(&"x".repeat(801)), Err(ErrorKind::TooLong));
    }

    #[test]
    fn test_validate_honeypot() {
        assert_eq!(validate_honeypot(""), Ok(()));
        assert_eq!(validate_honeypot(" "), Err(ErrorKind::SpamDetected));
        assert_eq!(
            validate_honeypot("http://spam.example"),
            Err(ErrorKind::SpamDetected)
        );
    }

    #[test]
    fn test_field_error_messages() {
        let err = FieldError::new(Field::Phone, ErrorKind::InvalidFormat);
        assert!(err.message().contains("10-11 haneli"));
        let err = FieldError::new(Field::Name, ErrorKind::Required);
        assert_eq!(err.message(), "Ad soyad gereklidir");
        let err = FieldError::new(Field::Details, ErrorKind::TooLong);
        assert!(err.message().contains("800"));
    }
}
