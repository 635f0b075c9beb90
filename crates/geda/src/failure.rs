use std::process::ExitCode;

use serde_json::Value;

use geda_core::client::ClientError;
use geda_core::import::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Validation,
    Auth,
    Network,
}

impl FailureClass {
    pub fn exit_code(self) -> ExitCode {
        match self {
            FailureClass::Validation => ExitCode::from(1),
            FailureClass::Auth => ExitCode::from(2),
            FailureClass::Network => ExitCode::from(3),
        }
    }
}

/// A reported command failure: what to print and which exit class it maps to.
#[derive(Debug)]
pub struct Failure {
    pub message: String,
    pub code: String,
    pub details: Option<Value>,
    pub class: FailureClass,
}

impl Failure {
    pub fn validation(message: impl Into<String>, code: &str) -> Self {
        Self::new(message, code, FailureClass::Validation)
    }

    pub fn auth(message: impl Into<String>, code: &str) -> Self {
        Self::new(message, code, FailureClass::Auth)
    }

    pub fn network(message: impl Into<String>, code: &str) -> Self {
        Self::new(message, code, FailureClass::Network)
    }

    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn new(message: impl Into<String>, code: &str, class: FailureClass) -> Self {
        Failure {
            message: message.into(),
            code: code.to_string(),
            details: None,
            class,
        }
    }
}

impl From<ClientError> for Failure {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Api(api_error) => {
                let class = if api_error.status == 401 || api_error.status == 403 {
                    FailureClass::Auth
                } else if api_error.status >= 500 {
                    FailureClass::Network
                } else {
                    FailureClass::Validation
                };
                Failure {
                    message: api_error.message(),
                    code: api_error.error_code().unwrap_or("api_error").to_string(),
                    details: api_error.body.map(Value::Object),
                    class,
                }
            }
            other => Failure {
                message: other.to_string(),
                code: "request_failed".to_string(),
                details: None,
                class: FailureClass::Network,
            },
        }
    }
}

impl From<ImportError> for Failure {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Client(client_error) => Failure::from(client_error),
            mismatch => Failure::validation("failed to build post payload", "invalid_import_payload")
                .with_details(mismatch.to_string()),
        }
    }
}
