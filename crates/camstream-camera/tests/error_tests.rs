use camstream_camera::CameraError;
use std::io;

#[test]
fn test_from_io_error() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "device not found");
    let cam_err: CameraError = io_err.into();

    match cam_err {
        CameraError::Device(msg) => assert!(msg.contains("device not found")),
        _ => panic!("Expected CameraError::Device variant"),
    }
}

#[test]
fn test_error_display() {
    let device_err = CameraError::Device("V4L2 error".to_string());
    assert!(device_err.to_string().contains("V4L2 error"));

    let stream_err = CameraError::Stream("streaming failed".to_string());
    assert!(stream_err.to_string().contains("streaming failed"));

    let exhausted = CameraError::Exhausted(4);
    assert_eq!(exhausted.to_string(), "all 4 frame buffers are still held");
}
