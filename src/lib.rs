pub mod client;
pub mod config;
pub mod ldap;
pub mod server;

pub use crate::client::{ConnectParams, Ldap, Resource};
pub use crate::config::{OnlineSettings, Options};
pub use crate::ldap::ResultCode;
pub use crate::server::StubServer;

#[derive(thiserror::Error, Debug)]
pub enum LdapError {
    /// Raised by the wrapper itself before or around a native call.
    #[error("{message}")]
    Usage { code: u32, message: String },

    /// Translated from a native result or transport failure.
    #[error("{message}")]
    Ldap { code: u32, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LdapError {
    pub fn usage(message: impl Into<String>) -> Self {
        LdapError::Usage {
            code: 0,
            message: message.into(),
        }
    }

    pub fn usage_with_code(code: ResultCode, message: impl Into<String>) -> Self {
        LdapError::Usage {
            code: code as u32,
            message: message.into(),
        }
    }

    /// LDAP result code carried by the error, 0 when there is none.
    pub fn code(&self) -> u32 {
        match self {
            LdapError::Usage { code, .. } | LdapError::Ldap { code, .. } => *code,
            LdapError::Config(_) | LdapError::Io(_) => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            LdapError::Usage { message, .. } | LdapError::Ldap { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<::config::ConfigError> for LdapError {
    fn from(e: ::config::ConfigError) -> Self {
        LdapError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LdapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_has_zero_code() {
        let err = LdapError::usage("A host parameter is required");
        assert_eq!(err.code(), 0);
        assert_eq!(err.message(), "A host parameter is required");
        assert_eq!(err.to_string(), "A host parameter is required");
    }

    #[test]
    fn test_ldap_error_code_and_message() {
        let err = LdapError::Ldap {
            code: 0x31,
            message: "0x31 (Invalid credentials): cn=x".to_string(),
        };
        assert_eq!(err.code(), 0x31);
        assert!(err.message().contains("Invalid credentials"));
    }

    #[test]
    fn test_config_error_message() {
        let err = LdapError::Config("missing file".to_string());
        assert_eq!(err.code(), 0);
        assert_eq!(err.message(), "Configuration error: missing file");
    }

    #[test]
    fn test_usage_with_code() {
        let err = LdapError::usage_with_code(ResultCode::NotSupported, "nope");
        assert_eq!(err.code(), 0x5c);
    }
}
