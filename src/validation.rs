use crate::error::{AppError, AppResult, FieldError};

/// Collects field-level problems for one request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
        self
    }

    /// Like [`Validator::required`], but only when the value is present.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.required(field, value);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.add(field, format!("must be at least {min} characters"));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 0 {
            self.add(field, "must not be negative");
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 {
            self.add(field, "must be greater than 0");
        }
        self
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64) -> &mut Self {
        if value < min || value > max {
            self.add(field, format!("must be between {min} and {max}"));
        }
        self
    }

    /// Vietnamese phone numbers: 9 to 11 digits, optional leading `+`.
    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let valid = (9..=11).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
        if !trimmed.is_empty() && !valid {
            self.add(field, "is not a valid phone number");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let valid = value
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !valid {
                self.add(field, "is not a valid email address");
            }
        }
        self
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(result: AppResult<()>) -> Vec<String> {
        match result {
            Err(AppError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Ok(()) => Vec::new(),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn collects_every_failing_field() {
        let result = Validator::new()
            .required("name", " ")
            .phone("phone", "12ab")
            .email("email", Some("nobody"))
            .positive("quantity", 0)
            .finish();
        assert_eq!(fields(result), vec!["name", "phone", "email", "quantity"]);
    }

    #[test]
    fn accepts_valid_values() {
        let result = Validator::new()
            .required("name", "Trí")
            .phone("phone", "0909123456")
            .phone("hotline", "+84909123456")
            .email("email", Some("shop@hoangtrimoto.vn"))
            .email("email", None)
            .range("rating", 5, 1, 5)
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn length_checks_count_characters_not_bytes() {
        assert!(Validator::new().max_len("name", "Đạt", 3).finish().is_ok());
        assert_eq!(fields(Validator::new().min_len("password", "abc", 6).finish()), vec!["password"]);
    }
}
