use crate::*;

// plane order of a Yuv420 frame
const LUMA: usize = 0;
const CHROMA_U: usize = 1;
const CHROMA_V: usize = 2;

/// Converts a 4:2:0 frame into NV21: the luma plane, then one V byte and one
/// U byte per chroma sample.
///
/// Every plane is sampled through its own row and pixel stride, so hardware
/// row padding never leaks into the output. The result is always
/// `width * height * 3 / 2` bytes.
///
/// # Errors
///
/// Returns `ImageError::UnsupportedFormat` for any format other than
/// `PixelFormat::Yuv420`, and `ImageError::InvalidFrame` if the geometry is
/// odd or empty, a plane is missing, a stride is zero, rows overlap, or a
/// plane buffer is too short for its strides.
pub fn convert(frame: &RawFrame) -> Result<InterleavedFrame, ImageError> {
    if !frame.format().is_supported() {
        return Err(ImageError::UnsupportedFormat(frame.format()));
    }

    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(ImageError::InvalidFrame(format!(
            "{width}x{height} is not a non-empty even geometry"
        )));
    }

    let out_len = InterleavedFrame::expected_len(width, height).ok_or_else(|| {
        ImageError::InvalidFrame(format!("{width}x{height} is too large to address"))
    })?;

    let luma = checked_plane(frame, LUMA, height, width)?;
    let chroma_u = checked_plane(frame, CHROMA_U, height / 2, width / 2)?;
    let chroma_v = checked_plane(frame, CHROMA_V, height / 2, width / 2)?;

    // every plane now holds at least its own samples, so `out_len` is bounded
    // by the input buffers
    let mut out = Vec::with_capacity(out_len);
    copy_luma(luma, width, height, &mut out);
    interleave_vu(chroma_v, chroma_u, width / 2, height / 2, &mut out);

    debug_assert_eq!(out.len(), out_len);
    Ok(InterleavedFrame {
        width,
        height,
        data: out,
    })
}

fn checked_plane(
    frame: &RawFrame,
    index: usize,
    rows: usize,
    cols: usize,
) -> Result<&Plane, ImageError> {
    let plane = frame.plane(index).ok_or_else(|| {
        ImageError::InvalidFrame(format!(
            "expected {} planes, got {}",
            frame.format().plane_count(),
            frame.planes().len()
        ))
    })?;
    if plane.row_stride == 0 || plane.pixel_stride == 0 {
        return Err(ImageError::InvalidFrame(format!(
            "plane {index} has a zero stride"
        )));
    }
    // rows must not overlap: a row of `cols` samples spans this many bytes
    let row_span = (cols - 1)
        .checked_mul(plane.pixel_stride)
        .and_then(|span| span.checked_add(1))
        .ok_or_else(|| ImageError::InvalidFrame(format!("plane {index} strides overflow")))?;
    if rows > 1 && plane.row_stride < row_span {
        return Err(ImageError::InvalidFrame(format!(
            "plane {index} row stride {} is shorter than a {row_span} byte row",
            plane.row_stride
        )));
    }
    let required = plane.required_len(rows, cols).ok_or_else(|| {
        ImageError::InvalidFrame(format!("plane {index} strides overflow"))
    })?;
    if plane.data.len() < required {
        return Err(ImageError::InvalidFrame(format!(
            "plane {index} holds {} bytes, {cols}x{rows} samples need {required}",
            plane.data.len()
        )));
    }
    Ok(plane)
}

fn copy_luma(plane: &Plane, width: usize, height: usize, out: &mut Vec<u8>) {
    if plane.pixel_stride == 1 && plane.row_stride == width {
        out.extend_from_slice(&plane.data[..width * height]);
        return;
    }
    for row in 0..height {
        let start = row * plane.row_stride;
        if plane.pixel_stride == 1 {
            out.extend_from_slice(&plane.data[start..start + width]);
        } else {
            out.extend((0..width).map(|col| plane.data[start + col * plane.pixel_stride]));
        }
    }
}

fn interleave_vu(v: &Plane, u: &Plane, uv_width: usize, uv_height: usize, out: &mut Vec<u8>) {
    for row in 0..uv_height {
        let v_row = row * v.row_stride;
        let u_row = row * u.row_stride;
        for col in 0..uv_width {
            out.push(v.data[v_row + col * v.pixel_stride]);
            out.push(u.data[u_row + col * u.pixel_stride]);
        }
    }
}
