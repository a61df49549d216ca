use core::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    /// Raw data is not a whole number of 3-byte RGB pixels.
    InvalidImageLength {
        size: usize,
    },
    OutputBufferTooSmall {
        size: usize,
        required: usize,
    },
    #[cfg(feature = "std")]
    IoError(std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidImageLength { size } => {
                write!(f, "invalid image length: {} (not a multiple of 3 RGB channels)", size)
            }
            Self::OutputBufferTooSmall { size, required } => {
                write!(f, "output buffer size too small: {} (minimum required: {})", size, required)
            }
            #[cfg(feature = "std")]
            Self::IoError(ref err) => {
                write!(f, "i/o error: {}", err)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}
