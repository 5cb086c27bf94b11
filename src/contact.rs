//! Contact requests: wire type, validation, and the field-by-field form the
//! `contact-form` command opens inside the terminal.

use serde::{Deserialize, Serialize};

/// Service options offered by the form, as `(value, label)`.
pub const SERVICES: &[(&str, &str)] = &[
    ("ai-security", "AI Security & Implementation"),
    ("pentest", "Penetration Testing"),
    ("data-recovery", "Data Recovery"),
    ("cloud", "Cloud Migration & Security"),
    ("forensics", "Digital Forensics"),
    ("reverse-eng", "Reverse Engineering"),
    ("consulting", "General Consulting"),
    ("other", "Other"),
];

pub const URGENCIES: &[(&str, &str)] = &[
    ("standard", "Standard (5-7 days)"),
    ("urgent", "Urgent (2-3 days)"),
    ("emergency", "Emergency (24 hours)"),
];

pub const CONTACT_METHODS: &[(&str, &str)] = &[
    ("email", "Email"),
    ("signal", "Signal"),
    ("phone", "Phone"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Unknown {field} option: {value}")]
    UnknownOption { field: &'static str, value: String },
}

/// Body of `POST /contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub service: String,
    pub urgency: String,
    pub message: String,
    pub contact_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ContactRequest {
    /// Check required fields, email shape and option values.
    pub fn validate(&self) -> Result<(), ContactError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("service", &self.service),
            ("urgency", &self.urgency),
            ("message", &self.message),
            ("contact_method", &self.contact_method),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ContactError::MissingField(field));
            }
        }
        if !is_valid_email(&self.email) {
            return Err(ContactError::InvalidEmail);
        }
        check_option("service", &self.service, SERVICES)?;
        check_option("urgency", &self.urgency, URGENCIES)?;
        check_option("contact_method", &self.contact_method, CONTACT_METHODS)?;
        Ok(())
    }
}

fn check_option(
    field: &'static str,
    value: &str,
    options: &[(&str, &str)],
) -> Result<(), ContactError> {
    if options.iter().any(|(v, _)| *v == value) {
        Ok(())
    } else {
        Err(ContactError::UnknownOption {
            field,
            value: value.to_string(),
        })
    }
}

/// Loose structural email check: one `@`, a local part, and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Phone,
    Service,
    Urgency,
    Message,
    ContactMethod,
}

impl Field {
    const ORDER: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Service,
        Field::Urgency,
        Field::Message,
        Field::ContactMethod,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Name => "Name *",
            Field::Email => "Email *",
            Field::Phone => "Phone (optional)",
            Field::Service => "Service Interest *",
            Field::Urgency => "Urgency [standard]",
            Field::Message => "Message *",
            Field::ContactMethod => "Preferred Contact Method [email]",
        }
    }

    fn options(self) -> Option<&'static [(&'static str, &'static str)]> {
        match self {
            Field::Service => Some(SERVICES),
            Field::Urgency => Some(URGENCIES),
            Field::ContactMethod => Some(CONTACT_METHODS),
            _ => None,
        }
    }
}

/// Outcome of feeding one value to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStep {
    /// Value accepted; the next field is waiting.
    Next,
    /// Value rejected; the same field is asked again.
    Retry(ContactError),
    /// Every field is filled.
    Complete(ContactRequest),
}

/// Collects a [`ContactRequest`] one field at a time.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    step: usize,
    values: Vec<String>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn field(&self) -> Field {
        Field::ORDER[self.step.min(Field::ORDER.len() - 1)]
    }

    /// Label of the field currently being asked for.
    pub fn prompt(&self) -> &'static str {
        self.field().label()
    }

    /// Selectable options for the current field, if it is a choice.
    pub fn options(&self) -> Option<&'static [(&'static str, &'static str)]> {
        self.field().options()
    }

    pub fn submit(&mut self, raw: &str) -> FormStep {
        let field = self.field();
        let value = match normalize(field, raw.trim()) {
            Ok(value) => value,
            Err(e) => return FormStep::Retry(e),
        };
        self.values.push(value);
        self.step += 1;

        if self.step < Field::ORDER.len() {
            return FormStep::Next;
        }

        let mut values = std::mem::take(&mut self.values).into_iter();
        let mut next = || values.next().unwrap_or_default();
        let name = next();
        let email = next();
        let phone = Some(next()).filter(|p| !p.is_empty());
        FormStep::Complete(ContactRequest {
            name,
            email,
            phone,
            service: next(),
            urgency: next(),
            message: next(),
            contact_method: next(),
            timestamp: None,
        })
    }
}

fn normalize(field: Field, value: &str) -> Result<String, ContactError> {
    match field {
        Field::Name => required("name", value),
        Field::Message => required("message", value),
        Field::Email => {
            let email = required("email", value)?;
            if is_valid_email(&email) {
                Ok(email)
            } else {
                Err(ContactError::InvalidEmail)
            }
        }
        Field::Phone => Ok(value.to_string()),
        Field::Service => {
            if value.is_empty() {
                return Err(ContactError::MissingField("service"));
            }
            choose("service", value, SERVICES)
        }
        Field::Urgency if value.is_empty() => Ok("standard".to_string()),
        Field::Urgency => choose("urgency", value, URGENCIES),
        Field::ContactMethod if value.is_empty() => Ok("email".to_string()),
        Field::ContactMethod => choose("contact_method", value, CONTACT_METHODS),
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ContactError> {
    if value.is_empty() {
        Err(ContactError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Accept an option by value or by its 1-based position.
fn choose(
    field: &'static str,
    value: &str,
    options: &[(&str, &str)],
) -> Result<String, ContactError> {
    let lowered = value.to_lowercase();
    if let Ok(n) = lowered.parse::<usize>() {
        if let Some((v, _)) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Ok(v.to_string());
        }
    }
    options
        .iter()
        .find(|(v, _)| *v == lowered)
        .map(|(v, _)| v.to_string())
        .ok_or(ContactError::UnknownOption {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            service: "pentest".to_string(),
            urgency: "urgent".to_string(),
            message: "Please audit our API".to_string(),
            contact_method: "email".to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada@example..com"));
        assert!(!is_valid_email("ada @example.com"));
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut missing = sample();
        missing.message = "  ".to_string();
        assert_eq!(missing.validate(), Err(ContactError::MissingField("message")));

        let mut bad_service = sample();
        bad_service.service = "gardening".to_string();
        assert!(matches!(
            bad_service.validate(),
            Err(ContactError::UnknownOption { field: "service", .. })
        ));
    }

    #[test]
    fn test_wire_format_omits_empty_optionals() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("phone").is_none());
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["contact_method"], "email");
    }

    #[test]
    fn test_form_walkthrough() {
        let mut form = ContactForm::new();
        assert_eq!(form.prompt(), "Name *");
        assert_eq!(form.submit("Ada"), FormStep::Next);
        assert_eq!(form.submit("not-an-email"), FormStep::Retry(ContactError::InvalidEmail));
        assert_eq!(form.prompt(), "Email *");
        assert_eq!(form.submit("ada@example.com"), FormStep::Next);
        assert_eq!(form.submit(""), FormStep::Next);
        assert!(form.options().is_some());
        assert_eq!(form.submit("2"), FormStep::Next);
        assert_eq!(form.submit(""), FormStep::Next);
        assert_eq!(
            form.submit(""),
            FormStep::Retry(ContactError::MissingField("message"))
        );
        assert_eq!(form.submit("Need a pentest"), FormStep::Next);

        match form.submit("Signal") {
            FormStep::Complete(req) => {
                assert_eq!(req.name, "Ada");
                assert_eq!(req.phone, None);
                assert_eq!(req.service, "pentest");
                assert_eq!(req.urgency, "standard");
                assert_eq!(req.contact_method, "signal");
                assert!(req.validate().is_ok());
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn test_choose_rejects_out_of_range() {
        assert!(choose("service", "0", SERVICES).is_err());
        assert!(choose("service", "9", SERVICES).is_err());
        assert_eq!(choose("service", "8", SERVICES).unwrap(), "other");
    }
}
