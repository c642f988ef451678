use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Error, Debug)]
pub enum StreamError {
    /// read was called without a buffer
    #[error("no buffer given")]
    InvalidArgument,
    /// offset/len do not describe a window inside the buffer
    #[error("window {offset}+{len} outside of buffer of length {capacity}")]
    OutOfBounds {
        offset: isize,
        len: isize,
        capacity: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StreamError> for std::io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(e) => e,
            e => std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        }
    }
}
