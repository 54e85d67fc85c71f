use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid reference: {entity}={key}")]
    InvalidReference { entity: &'static str, key: String },
    #[error("invalid language: {0}")]
    InvalidLanguage(String),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: &'static str, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("malformed snapshot: {0}")]
    MalformedFormat(String),
    #[error("unsupported snapshot schema version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },
}

impl CatalogError {
    pub fn unknown_grade(grade_id: &str) -> Self {
        Self::InvalidReference {
            entity: "grade",
            key: grade_id.to_string(),
        }
    }

    pub fn unknown_subject(subject_id: &str) -> Self {
        Self::InvalidReference {
            entity: "subject",
            key: subject_id.to_string(),
        }
    }
}
