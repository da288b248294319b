use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message too large: {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("malformed message: {0}")]
    Malformed(String),
}
