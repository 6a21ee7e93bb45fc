//! Minimal JPEG marker walking for swapping the Exif APP1 segment.

use thiserror::Error;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const TEM: u8 = 0x01;

/// Identifier that opens an Exif APP1 payload.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest payload a segment can carry; the length field counts itself.
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SegmentError {
    #[error("not a JPEG stream")]
    NotJpeg,

    #[error("malformed segment at offset {0}")]
    Malformed(usize),

    #[error("segment payload of {0} bytes is too large")]
    TooLarge(usize),
}

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == MARKER_PREFIX && bytes[1] == SOI
}

/// A marker segment located in the header part of the stream.
#[derive(Debug, Clone, Copy)]
struct Segment {
    marker: u8,
    start: usize,
    payload_start: usize,
    end: usize,
}

impl Segment {
    fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.payload_start..self.end]
    }

    fn is_exif(&self, bytes: &[u8]) -> bool {
        self.marker == APP1 && self.payload(bytes).starts_with(EXIF_HEADER)
    }
}

/// Walks header segments up to (not including) the start of scan.
///
/// Returns the segments and the offset where the untouched tail begins.
fn header_segments(bytes: &[u8]) -> Result<(Vec<Segment>, usize), SegmentError> {
    if !is_jpeg(bytes) {
        return Err(SegmentError::NotJpeg);
    }

    let mut segments = Vec::new();
    let mut pos = 2;

    loop {
        if pos >= bytes.len() {
            return Ok((segments, bytes.len()));
        }
        if bytes[pos] != MARKER_PREFIX {
            return Err(SegmentError::Malformed(pos));
        }

        // Fill bytes may pad any marker.
        let mut marker_pos = pos + 1;
        while marker_pos < bytes.len() && bytes[marker_pos] == MARKER_PREFIX {
            marker_pos += 1;
        }
        let Some(&marker) = bytes.get(marker_pos) else {
            return Err(SegmentError::Malformed(pos));
        };

        if marker == SOS || marker == EOI {
            return Ok((segments, pos));
        }

        if marker == TEM || (0xD0..=0xD7).contains(&marker) {
            segments.push(Segment {
                marker,
                start: pos,
                payload_start: marker_pos + 1,
                end: marker_pos + 1,
            });
            pos = marker_pos + 1;
            continue;
        }

        let len_hi = bytes.get(marker_pos + 1).ok_or(SegmentError::Malformed(pos))?;
        let len_lo = bytes.get(marker_pos + 2).ok_or(SegmentError::Malformed(pos))?;
        let length = u16::from_be_bytes([*len_hi, *len_lo]) as usize;
        if length < 2 {
            return Err(SegmentError::Malformed(pos));
        }

        let end = marker_pos + 1 + length;
        if end > bytes.len() {
            return Err(SegmentError::Malformed(pos));
        }

        segments.push(Segment {
            marker,
            start: pos,
            payload_start: marker_pos + 3,
            end,
        });
        pos = end;
    }
}

/// Returns the TIFF data of the first Exif APP1 segment, if any.
#[cfg(test)]
fn exif_payload(bytes: &[u8]) -> Result<Option<&[u8]>, SegmentError> {
    let (segments, _) = header_segments(bytes)?;
    Ok(segments
        .iter()
        .find(|segment| segment.is_exif(bytes))
        .map(|segment| &segment.payload(bytes)[EXIF_HEADER.len()..]))
}

/// Rebuilds `bytes` with every Exif APP1 segment replaced by one carrying `tiff`.
///
/// The new segment follows SOI and any leading APP0 (JFIF) segments. All
/// other segments and the entropy-coded data are copied unchanged.
pub fn replace_exif_segment(bytes: &[u8], tiff: &[u8]) -> Result<Vec<u8>, SegmentError> {
    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(SegmentError::TooLarge(payload_len));
    }

    let (segments, tail) = header_segments(bytes)?;

    let mut out = Vec::with_capacity(bytes.len() + payload_len + 4);
    out.extend_from_slice(&[MARKER_PREFIX, SOI]);

    let leading_app0 = segments
        .iter()
        .take_while(|segment| segment.marker == APP0)
        .count();

    for segment in &segments[..leading_app0] {
        out.extend_from_slice(&bytes[segment.start..segment.end]);
    }

    out.extend_from_slice(&[MARKER_PREFIX, APP1]);
    out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);

    for segment in &segments[leading_app0..] {
        if !segment.is_exif(bytes) {
            out.extend_from_slice(&bytes[segment.start..segment.end]);
        }
    }

    out.extend_from_slice(&bytes[tail..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn exif_segment(tiff: &[u8]) -> Vec<u8> {
        let mut payload = EXIF_HEADER.to_vec();
        payload.extend_from_slice(tiff);
        segment(APP1, &payload)
    }

    const SCAN: &[u8] = &[0xFF, 0xDA, 0x00, 0x02, 0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD9];

    fn sample_jpeg(with_exif: Option<&[u8]>) -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        out.extend(segment(APP0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
        if let Some(tiff) = with_exif {
            out.extend(exif_segment(tiff));
        }
        out.extend(segment(APP1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>"));
        out.extend(segment(0xDB, &[0u8; 65]));
        out.extend_from_slice(SCAN);
        out
    }

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF]));
        assert!(!is_jpeg(b"\x89PNG\r\n"));
        assert!(!is_jpeg(&[0xFF]));
    }

    #[test]
    fn test_insert_when_absent() {
        let original = sample_jpeg(None);
        let updated = replace_exif_segment(&original, b"MM\0*NEW").unwrap();

        assert_eq!(exif_payload(&updated).unwrap(), Some(&b"MM\0*NEW"[..]));
        assert!(updated.ends_with(SCAN));
    }

    #[test]
    fn test_replace_existing() {
        let original = sample_jpeg(Some(b"II*\0OLD"));
        assert_eq!(exif_payload(&original).unwrap(), Some(&b"II*\0OLD"[..]));

        let updated = replace_exif_segment(&original, b"II*\0NEW").unwrap();
        assert_eq!(exif_payload(&updated).unwrap(), Some(&b"II*\0NEW"[..]));

        let old_count = updated.windows(7).filter(|w| *w == b"II*\0OLD").count();
        assert_eq!(old_count, 0);
        assert_eq!(updated.len(), original.len());
    }

    #[test]
    fn test_new_segment_follows_app0() {
        let original = sample_jpeg(None);
        let updated = replace_exif_segment(&original, b"MM\0*").unwrap();

        let app0_len = 2 + 16;
        let app1_at = 2 + app0_len;
        assert_eq!(&updated[app1_at..app1_at + 2], &[0xFF, APP1]);
        assert_eq!(&updated[app1_at + 4..app1_at + 10], EXIF_HEADER);
    }

    #[test]
    fn test_other_segments_preserved() {
        let original = sample_jpeg(Some(b"II*\0OLD"));
        let updated = replace_exif_segment(&original, b"II*\0NEW").unwrap();

        let xmp = segment(APP1, b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>");
        assert!(updated.windows(xmp.len()).any(|w| w == xmp.as_slice()));
        let dqt = segment(0xDB, &[0u8; 65]);
        assert!(updated.windows(dqt.len()).any(|w| w == dqt.as_slice()));
    }

    #[test]
    fn test_too_large() {
        let original = sample_jpeg(None);
        let tiff = vec![0u8; MAX_SEGMENT_PAYLOAD];
        assert_eq!(
            replace_exif_segment(&original, &tiff),
            Err(SegmentError::TooLarge(MAX_SEGMENT_PAYLOAD + EXIF_HEADER.len()))
        );
    }

    #[test]
    fn test_not_jpeg() {
        assert_eq!(replace_exif_segment(b"GIF89a", b""), Err(SegmentError::NotJpeg));
    }

    #[test]
    fn test_truncated_segment() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x01, 0x00];
        bytes.extend_from_slice(b"Exif");
        assert!(matches!(
            replace_exif_segment(&bytes, b"II*\0"),
            Err(SegmentError::Malformed(2))
        ));
    }

    #[test]
    fn test_garbage_between_segments() {
        let bytes = vec![0xFF, 0xD8, 0x00, 0x00];
        assert!(matches!(exif_payload(&bytes), Err(SegmentError::Malformed(2))));
    }
}
