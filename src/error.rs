use thiserror::Error;

#[derive(Error, Debug)]
pub enum OntographError {
    #[error("No ontology loaded")]
    NoGraphLoaded,
    #[error("Entity '{0}' not found")]
    NotFound(String),
    #[error("An entity with IRI '{0}' already exists")]
    DuplicateIri(String),
    #[error("Making '{parent}' a parent of '{class}' would create a cycle")]
    CyclicHierarchy { class: String, parent: String },
    #[error("Parent class '{0}' not found")]
    ParentNotFound(String),
    #[error("Domain '{0}' not found")]
    DomainNotFound(String),
    #[error("Range '{0}' not found")]
    RangeNotFound(String),
    #[error("Datatype '{0}' is not supported")]
    UnsupportedDatatype(String),
    #[error("Class '{0}' not found")]
    ClassNotFound(String),
    #[error("Target individual '{0}' not found")]
    TargetNotFound(String),
    #[error("No relation '{property}' from '{subject}' to '{target}'")]
    RelationNotFound {
        subject: String,
        property: String,
        target: String,
    },
    #[error("Parameter 'replace_with' is required for the replace action")]
    MissingReplacement,
    #[error("Invalid action '{0}', use add, remove or replace")]
    InvalidAction(String),
    #[error("'{0}' is not an object property")]
    NotAnObjectProperty(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl OntographError {
    /// True for failures caused by an identifier that did not resolve.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::ParentNotFound(_)
                | Self::DomainNotFound(_)
                | Self::RangeNotFound(_)
                | Self::ClassNotFound(_)
                | Self::TargetNotFound(_)
                | Self::RelationNotFound { .. }
        )
    }
    /// True for failures of the durable store or the service rather than of the request.
    /// Encode failures during a commit or export arrive here as `Persistence`.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Lock(_) | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, OntographError>;

// Helper conversions
impl From<std::io::Error> for OntographError {
    fn from(e: std::io::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<quick_xml::Error> for OntographError {
    fn from(e: quick_xml::Error) -> Self { Self::Codec(e.to_string()) }
}
impl From<config::ConfigError> for OntographError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
