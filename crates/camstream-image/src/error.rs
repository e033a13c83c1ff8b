use crate::PixelFormat;
use std::fmt;

#[derive(Debug)]
pub enum ImageError {
    UnsupportedFormat(PixelFormat),
    InvalidFrame(String),
    Encode(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat(format) => write!(f, "unsupported format: {format}"),
            ImageError::InvalidFrame(msg) => write!(f, "invalid frame: {msg}"),
            ImageError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Encode(err.to_string())
    }
}
