use parley_client::error::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

pub type ViewResult<T> = Result<T, ViewError>;
