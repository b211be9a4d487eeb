use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RosterError {
    #[error("Malformed Payload: {0}")]
    MalformedPayload(String),
    #[error("Participant Not Found: {0}")]
    NotFound(String),
    #[error("Persistence Error: {0}")]
    Persistence(String),
    #[error("Transport Error: {0}")]
    Transport(String),
}
