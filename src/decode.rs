use std::sync::Arc;

use base64::Engine as _;

use crate::error::{CoverforgeError, CoverforgeResult};

/// Decoded background image, premultiplied and ready for compositing.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Split a `data:<mime>;base64,<payload>` URI into its MIME type and raw
/// payload bytes. Anything malformed is an export error: a background that is
/// present but undecodable must be surfaced, not silently skipped.
pub fn parse_data_uri(uri: &str) -> CoverforgeResult<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CoverforgeError::export("background is not a data: URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| CoverforgeError::export("background data URI is not base64-encoded"))?;
    if !mime.starts_with("image/") {
        return Err(CoverforgeError::export(format!(
            "background data URI has non-image MIME type '{mime}'"
        )));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CoverforgeError::export(format!("decode base64 image payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Wrap encoded image bytes as a self-describing data URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

pub fn decode_image(bytes: &[u8]) -> CoverforgeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CoverforgeError::export(format!("decode background image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Decode a complete background data URI into a prepared image.
pub fn decode_data_uri(uri: &str) -> CoverforgeResult<PreparedImage> {
    let (_mime, bytes) = parse_data_uri(uri)?;
    decode_image(&bytes)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes_1x1(rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_image_png_dimensions_and_premul() {
        let buf = png_bytes_1x1([100, 50, 200, 128]);

        let prepared = decode_image(&buf).unwrap();
        assert_eq!(prepared.width, 1);
        assert_eq!(prepared.height, 1);
        assert_eq!(
            prepared.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn data_uri_round_trip() {
        let buf = png_bytes_1x1([10, 20, 30, 255]);
        let uri = encode_data_uri("image/png", &buf);
        assert!(uri.starts_with("data:image/png;base64,"));

        let prepared = decode_data_uri(&uri).unwrap();
        assert_eq!((prepared.width, prepared.height), (1, 1));
    }

    #[test]
    fn malformed_data_uri_is_an_export_error() {
        for bad in [
            "http://example.com/a.png",
            "data:image/png,rawbytes",
            "data:text/plain;base64,aGk=",
            "data:image/png;base64,%%%",
        ] {
            let err = decode_data_uri(bad).unwrap_err();
            assert!(
                matches!(err, CoverforgeError::Export(_)),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn corrupt_payload_is_an_export_error() {
        let uri = encode_data_uri("image/jpeg", b"not an image at all");
        assert!(matches!(
            decode_data_uri(&uri).unwrap_err(),
            CoverforgeError::Export(_)
        ));
    }
}
