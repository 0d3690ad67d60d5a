use std::io;

use recur_scan_core::contracts::envelope::failure_from_error;
use recur_scan_core::{ScanError, SuccessEnvelope};
use serde::Serialize;

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    serialize_json_pretty(success)
}

pub fn render_error_json(error: &ScanError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use recur_scan_core::ScanError;
    use serde_json::Value;

    use super::render_error_json;

    #[test]
    fn error_json_has_ok_false_and_code() {
        let rendered = render_error_json(&ScanError::invalid_input("empty"));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let value = serde_json::from_str::<Value>(&text).unwrap_or_default();
            assert_eq!(value["ok"], false);
            assert_eq!(value["error"]["code"], "invalid_input");
        }
    }
}
