use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const SIGNATURE_ALGORITHM: &str = "sha256";

// Never part of the string to sign
const UNSIGNED_PARAMS: &[&str] = &[
    "api_key",
    "cloud_name",
    "file",
    "resource_type",
    "signature",
    "signature_algorithm",
];

/// Upload API parameters, kept sorted by key for signing
#[derive(Debug, Clone, Default)]
pub(crate) struct SignedParams {
    params: BTreeMap<String, String>,
}

impl SignedParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub(crate) fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// `k=v` pairs joined by `&`, sorted by key, empty values and unsigned keys dropped
    pub(crate) fn string_to_sign(&self) -> String {
        self.params
            .iter()
            .filter(|(k, v)| !v.is_empty() && !UNSIGNED_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub(crate) fn signature(&self, api_secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.string_to_sign().as_bytes());
        hasher.update(api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Final form fields: the params plus credentials and signature
    pub(crate) fn into_form(self, api_key: &str, api_secret: &str) -> Vec<(String, String)> {
        let signature = self.signature(api_secret);
        let mut form: Vec<(String, String)> = self.params.into_iter().collect();
        form.push(("api_key".to_string(), api_key.to_string()));
        form.push(("signature".to_string(), signature));
        form.push((
            "signature_algorithm".to_string(),
            SIGNATURE_ALGORITHM.to_string(),
        ));
        form
    }
}

pub(crate) fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Escape `=` and `|` inside a context value
pub(crate) fn escape_context_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '=' | '|') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
