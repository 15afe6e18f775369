use serde_json::Value;
use sha2::{Digest, Sha256};
use std::{fs, io::Read, path::Path};

use super::error::PayloadError;
use crate::report::model::{PayloadHash, PayloadInfo};

/// Label used in errors for payloads read from stdin.
pub const STDIN_LABEL: &str = "<stdin>";

/// A parsed payload together with the fingerprint of its exact bytes.
#[derive(Debug, Clone)]
pub struct PayloadContext {
    /// Source path; `None` for stdin.
    pub path: Option<String>,

    /// Parsed JSON document.
    pub value: Value,

    pub size_bytes: u64,

    /// Hash algorithm used for fingerprinting.
    pub hash_alg: String,

    /// Hex-encoded hash of the payload bytes.
    pub hash_hex: String,
}

impl PayloadContext {
    /// Split into the parsed document and its report-facing metadata.
    pub fn into_parts(self) -> (Value, PayloadInfo) {
        let info = PayloadInfo {
            path: self.path,
            size_bytes: self.size_bytes,
            hash: PayloadHash {
                algorithm: self.hash_alg,
                value: self.hash_hex,
            },
        };
        (self.value, info)
    }
}

/// Read and parse a payload file.
///
/// The fingerprint depends only on the file bytes, never on filesystem
/// metadata.
pub fn read_payload(path: &Path) -> Result<PayloadContext, PayloadError> {
    let label = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| PayloadError::Io {
        path: label.clone(),
        source,
    })?;
    from_bytes(Some(label), bytes)
}

/// Read and parse a payload from any reader, typically stdin.
pub fn read_payload_from_reader<R: Read>(mut reader: R) -> Result<PayloadContext, PayloadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| PayloadError::Io {
            path: STDIN_LABEL.to_string(),
            source,
        })?;
    from_bytes(None, bytes)
}

fn from_bytes(path: Option<String>, bytes: Vec<u8>) -> Result<PayloadContext, PayloadError> {
    let value = serde_json::from_slice(&bytes).map_err(|source| PayloadError::Json {
        path: path.clone().unwrap_or_else(|| STDIN_LABEL.to_string()),
        source,
    })?;

    let digest = Sha256::digest(&bytes);

    Ok(PayloadContext {
        path,
        value,
        size_bytes: bytes.len() as u64,
        hash_alg: "sha256".to_string(),
        hash_hex: hex::encode(digest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_payload(data: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_json_and_computes_stable_hash() {
        let data = br#"{"summary":"ok"}"#;
        let file = temp_payload(data);

        let ctx = read_payload(file.path()).expect("payload read succeeds");

        assert_eq!(ctx.value, json!({"summary": "ok"}));
        assert_eq!(ctx.size_bytes, data.len() as u64);
        assert_eq!(ctx.hash_alg, "sha256");
        assert_eq!(ctx.path, Some(file.path().display().to_string()));

        // printf '{"summary":"ok"}' | sha256sum
        assert_eq!(
            ctx.hash_hex,
            "91eb060ae89c761643ca0931e6ba538318e2505253b4f63a9ffee7670a1010fc"
        );
    }

    #[test]
    fn reader_input_has_no_path() {
        let ctx = read_payload_from_reader(&br#"[1, 2]"#[..]).unwrap();
        assert_eq!(ctx.path, None);
        assert_eq!(ctx.value, json!([1, 2]));
    }

    #[test]
    fn whitespace_changes_the_fingerprint() {
        let a = read_payload(temp_payload(br#"{"a":1}"#).path()).unwrap();
        let b = read_payload(temp_payload(br#"{"a": 1}"#).path()).unwrap();

        assert_eq!(a.value, b.value);
        assert_ne!(a.hash_hex, b.hash_hex);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_payload(Path::new("non_existent.json")).unwrap_err();
        assert!(matches!(err, PayloadError::Io { .. }));
        assert_eq!(err.path(), "non_existent.json");
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let err = read_payload_from_reader(&b"{not json"[..]).unwrap_err();
        assert!(matches!(err, PayloadError::Json { .. }));
        assert_eq!(err.path(), STDIN_LABEL);
    }

    #[test]
    fn splits_into_value_and_report_payload_info() {
        let ctx = PayloadContext {
            path: Some("audit.json".into()),
            value: json!({}),
            size_bytes: 2,
            hash_alg: "sha256".into(),
            hash_hex: "abcd".into(),
        };

        let (value, info) = ctx.into_parts();
        assert_eq!(value, json!({}));
        assert_eq!(info.path, Some("audit.json".into()));
        assert_eq!(info.size_bytes, 2);
        assert_eq!(info.hash.value, "abcd");
    }
}
