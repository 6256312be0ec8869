use crate::error::FieldError;
use crate::services::ServiceError;

/// Collects field errors so a request reports every bad field at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed length must fall within `min..=max` characters.
    /// `label` is the human name used in messages, e.g. "Title".
    pub fn length(&mut self, field: &str, label: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let required = format!("{} is required", label);
        let range = format!("{} must be between {} and {} characters", label, min, max);
        self.length_with(field, value, min, max, &required, &range)
    }

    /// Same as `length` with explicit messages for the empty and out-of-range cases.
    pub fn length_with(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        required: &str,
        range: &str,
    ) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.push(field, required);
        } else if len < min || len > max {
            self.push(field, range);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, "Email is required");
        } else if !is_valid_email(value) {
            self.push(field, "Please provide a valid email");
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let errors = std::mem::take(&mut self.errors);
        let message = if errors.len() == 1 {
            errors[0].message.clone()
        } else {
            "Validation failed".to_string()
        };
        Err(ServiceError::Validation { message, errors })
    }
}

/// Structural check: one `@`, non-empty local part, dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) || email.len() > 255 {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Emails are stored and looked up lower-cased and trimmed
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_required_then_range() {
        let mut v = Validator::new();
        v.length("title", "Title", "   ", 5, 200)
            .length("location", "Location", "ab", 3, 200);
        let err = v.finish().unwrap_err();
        match err {
            ServiceError::Validation { message, errors } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors[0], FieldError::new("title", "Title is required"));
                assert_eq!(errors[1].message, "Location must be between 3 and 200 characters");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_error_becomes_message() {
        let mut v = Validator::new();
        v.length("text", "Comment", &"x".repeat(1001), 1, 1000);
        match v.finish().unwrap_err() {
            ServiceError::Validation { message, .. } => {
                assert_eq!(message, "Comment must be between 1 and 1000 characters")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut v = Validator::new();
        v.length("title", "Title", "ÄÖÜäö", 5, 5);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("john@localhost"));
        assert!(!is_valid_email("john.example.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("john doe@example.com"));
        assert_eq!(normalize_email("  John@Example.COM "), "john@example.com");
    }
}
