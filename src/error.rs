use thiserror::Error;

/// Errors raised by the poll registry itself. Collaborator failures
/// (database writes, Discord API calls) keep their own error types and
/// are logged where they happen.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no rating poll registered for message {0}")]
    NotFound(String),

    #[error("a rating poll is already registered for message {0}")]
    AlreadyExists(String),
}
