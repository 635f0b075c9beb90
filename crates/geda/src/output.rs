use serde_json::Value;

use geda_core::client::JsonMap;

use crate::failure::Failure;

/// Prints a response body on stdout: compact JSON for machines, indented
/// under `--human`.
pub fn print_response(response: &JsonMap, human: bool) {
    let value = Value::Object(response.clone());
    let rendered = if human {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    println!("{}", rendered.unwrap_or_default());
}

/// Prints a failure on stderr. Machine mode emits a one-line JSON object with
/// `error`, `error_code` and optional `details` fields.
pub fn print_failure(failure: &Failure, human: bool) {
    if human {
        eprintln!("{} ({})", failure.message, failure.code);
        return;
    }
    let mut payload = JsonMap::new();
    payload.insert("error".to_string(), Value::from(failure.message.clone()));
    payload.insert("error_code".to_string(), Value::from(failure.code.clone()));
    if let Some(details) = &failure.details {
        payload.insert("details".to_string(), details.clone());
    }
    let rendered = serde_json::to_string(&Value::Object(payload));
    eprintln!("{}", rendered.unwrap_or_default());
}
