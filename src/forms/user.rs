use serde_derive::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(min_length = 3)]
    #[validate(max_length = 50)]
    pub username: String,
    #[validate(pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$")]
    pub email: String,
    #[validate(min_length = 8)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(form("alice", "alice@example.com", "s3cret-pass").validate().is_ok());
    }

    #[test]
    fn test_registration_rules() {
        assert!(form("al", "alice@example.com", "s3cret-pass").validate().is_err());
        assert!(form(&"a".repeat(51), "alice@example.com", "s3cret-pass").validate().is_err());
        assert!(form("alice", "not-an-email", "s3cret-pass").validate().is_err());
        assert!(form("alice", "alice@example.com", "short").validate().is_err());
    }
}
