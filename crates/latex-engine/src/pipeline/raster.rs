//! Raster constraints: the DPI fallback ladder and the PNG header probe
//! used to check the produced image against the maximum dimension.

/// Descending DPI values tried for raster output until the image fits the
/// maximum dimension. Each rung fully re-runs the rasterizer; the first
/// satisfying rung wins, so quality is never given up early. The final
/// rung is low enough that the constraint is satisfiable even for
/// degenerate documents.
pub const DENSITY_LADDER: [u32; 6] = [600, 300, 150, 100, 50, 2];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Read width and height from a PNG's IHDR chunk.
///
/// The IHDR chunk is mandatory and always first, so the two fields sit at
/// fixed offsets; decoding the whole image just to read them would be
/// wasted work on rasters that may be tens of megapixels. Returns `None`
/// for anything that is not a plausible PNG.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE {
        return None;
    }
    if &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Minimal PNG prefix: signature + IHDR length/type/fields. Enough
    /// for the header probe; not a decodable image.
    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
        bytes
    }

    #[test]
    fn ladder_is_strictly_descending() {
        for pair in DENSITY_LADDER.windows(2) {
            assert!(pair[0] > pair[1], "ladder must descend: {:?}", pair);
        }
    }

    #[test]
    fn ladder_starts_high_and_ends_degenerate() {
        assert_eq!(DENSITY_LADDER.first(), Some(&600));
        assert_eq!(DENSITY_LADDER.last(), Some(&2));
    }

    #[test]
    fn reads_dimensions_from_header() {
        assert_eq!(png_dimensions(&png_header(800, 600)), Some((800, 600)));
    }

    #[test]
    fn rejects_non_png_bytes() {
        assert_eq!(png_dimensions(b"%PDF-1.4"), None);
        assert_eq!(png_dimensions(&[]), None);
        assert_eq!(png_dimensions(&PNG_SIGNATURE), None);
    }

    #[test]
    fn rejects_wrong_first_chunk() {
        let mut bytes = png_header(10, 10);
        bytes[12..16].copy_from_slice(b"IDAT");
        assert_eq!(png_dimensions(&bytes), None);
    }

    proptest! {
        /// Any width/height written into the header is read back exactly.
        #[test]
        fn header_probe_roundtrip(width in 1u32..=100_000, height in 1u32..=100_000) {
            let bytes = png_header(width, height);
            prop_assert_eq!(png_dimensions(&bytes), Some((width, height)));
        }

        /// Trailing garbage after the header never changes the result.
        #[test]
        fn trailing_bytes_ignored(
            width in 1u32..=10_000,
            height in 1u32..=10_000,
            trailing in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut bytes = png_header(width, height);
            bytes.extend_from_slice(&trailing);
            prop_assert_eq!(png_dimensions(&bytes), Some((width, height)));
        }
    }
}
