use camstream_image::{ImageError, InterleavedFrame, PixelFormat, Plane, RawFrame, convert};

/// Build a tightly packed planar 4:2:0 frame with constant planes.
fn planar_frame(width: usize, height: usize, y: u8, u: u8, v: u8) -> RawFrame {
    let (cw, ch) = (width / 2, height / 2);
    RawFrame::new(
        width,
        height,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![y; width * height], width, 1),
            Plane::new(vec![u; cw * ch], cw, 1),
            Plane::new(vec![v; cw * ch], cw, 1),
        ],
    )
}

#[test]
fn test_output_length_and_luma_verbatim() {
    let (width, height) = (8, 4);
    let luma: Vec<u8> = (0..(width * height) as u8).collect();
    let frame = RawFrame::new(
        width,
        height,
        PixelFormat::Yuv420,
        vec![
            Plane::new(luma.clone(), width, 1),
            Plane::new(vec![10; 8], 4, 1),
            Plane::new(vec![20; 8], 4, 1),
        ],
    );

    let out = convert(&frame).expect("valid frame");

    assert_eq!(out.data.len(), width * height * 3 / 2);
    assert_eq!(Some(out.data.len()), InterleavedFrame::expected_len(width, height));
    assert_eq!(out.luma(), &luma[..]);
    assert_eq!((out.width, out.height), (width, height));
}

#[test]
fn test_chroma_order_is_second_plane_first() {
    // first chroma plane = A, second chroma plane = B
    let frame = planar_frame(6, 4, 0x50, 0xAA, 0xBB);
    let out = convert(&frame).expect("valid frame");

    let chroma = out.chroma();
    assert_eq!(chroma.len(), 6 * 4 / 2);
    for pair in chroma.chunks_exact(2) {
        assert_eq!(pair, &[0xBB, 0xAA]);
    }
}

#[test]
fn test_chroma_positions_follow_strides() {
    // distinct values per chroma sample so any misaddressing shows up
    let (width, height) = (4, 4);
    let u: Vec<u8> = vec![1, 2, 3, 4];
    let v: Vec<u8> = vec![11, 12, 13, 14];
    let frame = RawFrame::new(
        width,
        height,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 16], 4, 1),
            Plane::new(u, 2, 1),
            Plane::new(v, 2, 1),
        ],
    );

    let out = convert(&frame).expect("valid frame");
    assert_eq!(out.chroma(), &[11, 1, 12, 2, 13, 3, 14, 4]);
}

#[test]
fn test_padded_semi_planar_never_samples_padding() {
    // 8x4 frame with rows padded to 12 bytes, chroma interleaved U/V with
    // pixel stride 2 as delivered by NV12 sensors
    const PAD: u8 = 0xEE;
    let (width, height, stride) = (8, 4, 12);

    let mut y_plane = vec![PAD; stride * height];
    for row in 0..height {
        for col in 0..width {
            y_plane[row * stride + col] = (row * width + col) as u8;
        }
    }

    let mut uv = vec![PAD; stride * (height / 2)];
    for row in 0..height / 2 {
        for col in 0..width / 2 {
            uv[row * stride + col * 2] = 0x40 + col as u8; // U
            uv[row * stride + col * 2 + 1] = 0x80 + col as u8; // V
        }
    }

    let frame = RawFrame::new(
        width,
        height,
        PixelFormat::Yuv420,
        vec![
            Plane::new(y_plane, stride, 1),
            Plane::new(uv.clone(), stride, 2),
            Plane::new(uv[1..].to_vec(), stride, 2),
        ],
    );

    let out = convert(&frame).expect("valid frame");

    assert_eq!(out.data.len(), width * height * 3 / 2);
    assert!(!out.data.contains(&PAD), "padding leaked into output");
    let expected_luma: Vec<u8> = (0..(width * height) as u8).collect();
    assert_eq!(out.luma(), &expected_luma[..]);
    assert_eq!(&out.chroma()[..8], &[0x80, 0x40, 0x81, 0x41, 0x82, 0x42, 0x83, 0x43]);
}

#[test]
fn test_semi_planar_last_chroma_sample_fits_shortened_plane() {
    // the V plane view starts one byte into the UV buffer, so it is one
    // byte shorter; the last V sample must still be addressable
    let (width, height) = (4, 2);
    let uv = vec![1, 2, 3, 4];
    let frame = RawFrame::new(
        width,
        height,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 8], 4, 1),
            Plane::new(uv.clone(), 4, 2),
            Plane::new(uv[1..].to_vec(), 4, 2),
        ],
    );

    let out = convert(&frame).expect("valid frame");
    assert_eq!(out.chroma(), &[2, 1, 4, 3]);
}

#[test]
fn test_unsupported_format_rejected() {
    let frame = RawFrame::new(
        4,
        2,
        PixelFormat::Yuyv,
        vec![Plane::new(vec![0; 16], 8, 2)],
    );

    match convert(&frame) {
        Err(ImageError::UnsupportedFormat(PixelFormat::Yuyv)) => {}
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_odd_geometry_rejected() {
    let frame = planar_frame(4, 4, 0, 0, 0);
    let odd = RawFrame::new(5, 4, PixelFormat::Yuv420, frame.planes().to_vec());
    assert!(matches!(convert(&odd), Err(ImageError::InvalidFrame(_))));
}

#[test]
fn test_short_plane_rejected() {
    let frame = RawFrame::new(
        4,
        4,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 16], 4, 1),
            Plane::new(vec![0; 3], 2, 1),
            Plane::new(vec![0; 4], 2, 1),
        ],
    );
    assert!(matches!(convert(&frame), Err(ImageError::InvalidFrame(_))));
}

#[test]
fn test_missing_plane_and_zero_stride_rejected() {
    let two_planes = RawFrame::new(
        2,
        2,
        PixelFormat::Yuv420,
        vec![Plane::new(vec![0; 4], 2, 1), Plane::new(vec![0; 1], 1, 1)],
    );
    assert!(matches!(convert(&two_planes), Err(ImageError::InvalidFrame(_))));

    let zero_stride = RawFrame::new(
        2,
        2,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 4], 2, 1),
            Plane::new(vec![0; 1], 1, 0),
            Plane::new(vec![0; 1], 1, 1),
        ],
    );
    assert!(matches!(convert(&zero_stride), Err(ImageError::InvalidFrame(_))));
}

#[test]
fn test_overlapping_rows_rejected() {
    // luma rows one byte apart would reuse the same samples for every row
    let frame = RawFrame::new(
        8,
        8,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 16], 1, 1),
            Plane::new(vec![0; 16], 4, 1),
            Plane::new(vec![0; 16], 4, 1),
        ],
    );
    match convert(&frame) {
        Err(ImageError::InvalidFrame(msg)) => assert!(msg.contains("row stride")),
        other => panic!("expected InvalidFrame, got {other:?}"),
    }

    // same for interleaved chroma whose stride cannot hold a row of pairs
    let frame = RawFrame::new(
        8,
        4,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 32], 8, 1),
            Plane::new(vec![0; 16], 4, 2),
            Plane::new(vec![0; 16], 4, 2),
        ],
    );
    assert!(matches!(convert(&frame), Err(ImageError::InvalidFrame(_))));
}

#[test]
fn test_huge_geometry_with_small_buffers_rejected() {
    let n = 1usize << 20;
    let frame = RawFrame::new(
        n,
        n,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 2 * n], 1, 1),
            Plane::new(vec![0; n], 1, 1),
            Plane::new(vec![0; n], 1, 1),
        ],
    );
    assert!(matches!(convert(&frame), Err(ImageError::InvalidFrame(_))));

    // geometry whose output length does not even fit in usize
    let frame = RawFrame::new(
        usize::MAX - 1,
        usize::MAX - 1,
        PixelFormat::Yuv420,
        vec![
            Plane::new(vec![0; 16], 1, 1),
            Plane::new(vec![0; 16], 1, 1),
            Plane::new(vec![0; 16], 1, 1),
        ],
    );
    assert!(matches!(convert(&frame), Err(ImageError::InvalidFrame(_))));
}

#[test]
fn test_missing_plane_message_names_plane_count() {
    let frame = RawFrame::new(
        2,
        2,
        PixelFormat::Yuv420,
        vec![Plane::new(vec![0; 4], 2, 1)],
    );
    match convert(&frame) {
        Err(ImageError::InvalidFrame(msg)) => assert!(msg.contains("expected 3 planes, got 1")),
        other => panic!("expected InvalidFrame, got {other:?}"),
    }
    assert_eq!(PixelFormat::Yuv420.plane_count(), 3);
    assert_eq!(PixelFormat::Yuyv.plane_count(), 1);
}

#[test]
fn test_expected_len_overflow_is_none() {
    assert_eq!(InterleavedFrame::expected_len(4, 2), Some(12));
    assert_eq!(InterleavedFrame::expected_len(usize::MAX, 2), None);
}

#[test]
fn test_release_hook_runs_once_on_drop() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let frame = planar_frame(2, 2, 0, 0, 0).with_release(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    convert(&frame).expect("valid frame");
    assert_eq!(released.load(Ordering::SeqCst), 0);

    frame.release();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pixel_format_from_fourcc() {
    let fourcc = |code: &[u8; 4]| u32::from_le_bytes(*code);
    assert_eq!(PixelFormat::from_fourcc(fourcc(b"NV12")), PixelFormat::Yuv420);
    assert_eq!(PixelFormat::from_fourcc(fourcc(b"NV21")), PixelFormat::Yuv420);
    assert_eq!(PixelFormat::from_fourcc(fourcc(b"YUYV")), PixelFormat::Yuyv);
    assert_eq!(PixelFormat::from_fourcc(fourcc(b"MJPG")), PixelFormat::Jpeg);
    assert_eq!(
        PixelFormat::from_fourcc(fourcc(b"BA81")),
        PixelFormat::Other(fourcc(b"BA81"))
    );
    assert_eq!(
        PixelFormat::Other(fourcc(b"BA81")).to_string(),
        "fourcc BA81"
    );
}
