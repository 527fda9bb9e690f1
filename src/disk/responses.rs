use serde::Deserialize;

/// Response from `GET /v1/disk/resources/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadLink {
    pub href: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub templated: bool,
}

fn default_method() -> String {
    "PUT".to_string()
}

/// Error body shared by all Disk endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ErrorBody {
    /// Best human-readable summary: `error: message`, falling back to the
    /// description or the raw body.
    pub fn summary(&self, raw: &str) -> String {
        let text = self.message.as_deref().or(self.description.as_deref());
        match (self.error.as_deref(), text) {
            (Some(code), Some(text)) => format!("{code}: {text}"),
            (Some(code), None) => code.to_string(),
            (None, Some(text)) => text.to_string(),
            (None, None) if raw.trim().is_empty() => "no details".to_string(),
            (None, None) => raw.trim().to_string(),
        }
    }
}
