use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    /// The selected representation has no segments left.
    #[error("representation queue exhausted")]
    Exhausted,

    #[error("malformed schema definition: {0}")]
    SchemaDefinition(String),

    #[error("manifest failed schema validation: {0}")]
    SchemaValidation(String),

    #[error("malformed manifest: {0}")]
    MalformedXml(String),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> has invalid `{attribute}` value: {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("HTTP error {status} while fetching {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DashError {
    /// Errors that leave no manifest to play. The caller decides whether to terminate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DashError::SchemaDefinition(_)
                | DashError::SchemaValidation(_)
                | DashError::MalformedXml(_)
                | DashError::Xml(_)
        )
    }
}

pub type DashResult<T> = Result<T, DashError>;
