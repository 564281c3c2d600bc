use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = UserError::Storage("Connection refused".to_string());
        assert_eq!(error.to_string(), "Storage error: Connection refused");

        let error = UserError::InvalidData("Email cannot be empty".to_string());
        assert_eq!(error.to_string(), "Invalid data: Email cannot be empty");
    }

    /// Errors should propagate through the ? operator with their variant
    /// intact.
    #[test]
    fn test_error_propagation() {
        fn validate_email(email: &str) -> Result<(), UserError> {
            if email.is_empty() {
                return Err(UserError::InvalidData("Email cannot be empty".to_string()));
            }
            Ok(())
        }

        fn process(email: &str) -> Result<String, UserError> {
            validate_email(email)?;
            Ok(format!("Processed {email}"))
        }

        assert!(process("someone@example.com").is_ok());
        assert!(matches!(process(""), Err(UserError::InvalidData(_))));
    }
}
