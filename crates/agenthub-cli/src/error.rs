use thiserror::Error;

pub const ENV_PREFIX: &str = "AGENTHUB";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {env_var}: {message}")]
    InvalidValue { env_var: String, message: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Maps a settings key like `api.base_url` to the variable that sets it.
pub fn to_env_var(field: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field.replace('.', "__").to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("api.base_url"), "AGENTHUB_API__BASE_URL");
        assert_eq!(
            to_env_var("credentials.path"),
            "AGENTHUB_CREDENTIALS__PATH"
        );
    }
}
