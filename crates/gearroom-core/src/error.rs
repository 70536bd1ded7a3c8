use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required booking field is empty.
    #[error("Invalid {field}: {value}")]
    InvalidForm { field: &'static str, value: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_form_message() {
        let err = Error::InvalidForm {
            field: "start time",
            value: String::new(),
        };
        assert_eq!(err.to_string(), "Invalid start time: ");
    }

    #[test]
    fn test_invalid_data_message() {
        let err = Error::InvalidData(String::from("expected an array"));
        assert_eq!(err.to_string(), "invalid data: expected an array");
    }
}
