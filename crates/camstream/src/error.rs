use camstream_camera::CameraError;
use camstream_com::ComError;
use std::fmt;

#[derive(Debug)]
pub enum StreamError {
    Com(ComError),
    Camera(CameraError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Com(err) => write!(f, "transport error: {err}"),
            StreamError::Camera(err) => write!(f, "camera error: {err}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Com(err) => Some(err),
            StreamError::Camera(err) => Some(err),
        }
    }
}

impl From<ComError> for StreamError {
    fn from(err: ComError) -> Self {
        StreamError::Com(err)
    }
}

impl From<CameraError> for StreamError {
    fn from(err: CameraError) -> Self {
        StreamError::Camera(err)
    }
}
