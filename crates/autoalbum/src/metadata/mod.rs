//! Embedding corrected document text in the image's EXIF `UserComment`.

pub mod jpeg;

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Tag, Value};
use log::debug;

use crate::error::MetadataError;
use jpeg::SegmentError;

/// Charset prefixes the EXIF standard allows in front of `UserComment`.
const CHARSET_PREFIXES: [&[u8; 8]; 4] = [
    b"ASCII\0\0\0",
    b"UNICODE\0",
    b"JIS\0\0\0\0\0",
    b"\0\0\0\0\0\0\0\0",
];

/// Pointer and offset tags the writer synthesizes itself.
const SYNTHESIZED_TAGS: [Tag; 9] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::TileOffsets,
    Tag::TileByteCounts,
];

/// Stores `text` as the JSON-encoded `UserComment` of the JPEG at `path`.
///
/// Existing EXIF fields and the embedded thumbnail are carried over. The
/// file is replaced atomically, so on any error it is left as it was.
pub fn write_user_comment(path: &Path, text: &str) -> Result<(), MetadataError> {
    let bytes = fs::read(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if !jpeg::is_jpeg(&bytes) {
        return Err(MetadataError::UnsupportedFormat(path.to_path_buf()));
    }

    let existing = read_exif(path, &bytes)?;
    let comment = serde_json::to_vec(text).map_err(|e| MetadataError::Encode(e.to_string()))?;
    let tiff = build_tiff(existing.as_ref(), comment)?;

    let updated = jpeg::replace_exif_segment(&bytes, &tiff).map_err(|e| match e {
        SegmentError::TooLarge(size) => MetadataError::TooLarge { size },
        other => MetadataError::Parse {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;

    replace_file(path, &updated)?;
    debug!(
        "Wrote {} byte UserComment to {}",
        tiff.len(),
        crate::sanitize::redact_path(path)
    );
    Ok(())
}

/// Reads back the text stored by [`write_user_comment`].
///
/// Returns `None` when the image has no EXIF block or no `UserComment`.
pub fn read_user_comment(path: &Path) -> Result<Option<String>, MetadataError> {
    let bytes = fs::read(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(exif) = read_exif(path, &bytes)? else {
        return Ok(None);
    };

    let Some(field) = exif.get_field(Tag::UserComment, In::PRIMARY) else {
        return Ok(None);
    };

    match &field.value {
        Value::Undefined(raw, _) => Ok(Some(decode_user_comment(raw))),
        other => Err(MetadataError::Parse {
            path: path.to_path_buf(),
            reason: format!("unexpected UserComment value {:?}", other),
        }),
    }
}

fn read_exif(path: &Path, bytes: &[u8]) -> Result<Option<Exif>, MetadataError> {
    match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(MetadataError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn carried_over(field: &Field) -> bool {
    if field.ifd_num != In::PRIMARY && field.ifd_num != In::THUMBNAIL {
        return false;
    }
    if field.tag == Tag::UserComment || SYNTHESIZED_TAGS.contains(&field.tag) {
        return false;
    }
    !matches!(field.value, Value::Unknown(..))
}

fn thumbnail(exif: &Exif) -> Option<&[u8]> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let length = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    exif.buf().get(offset..offset.checked_add(length)?)
}

/// Serializes the TIFF structure for the new APP1 segment.
fn build_tiff(existing: Option<&Exif>, comment: Vec<u8>) -> Result<Vec<u8>, MetadataError> {
    let comment_field = Field {
        tag: Tag::UserComment,
        ifd_num: In::PRIMARY,
        value: Value::Undefined(comment, 0),
    };

    let mut writer = Writer::new();
    let mut little_endian = false;

    if let Some(exif) = existing {
        little_endian = exif.little_endian();
        for field in exif.fields().filter(|f| carried_over(f)) {
            writer.push_field(field);
        }
        if let Some(jpeg) = thumbnail(exif) {
            writer.set_jpeg(jpeg, In::THUMBNAIL);
        }
    }
    writer.push_field(&comment_field);

    let mut out = Cursor::new(Vec::new());
    writer
        .write(&mut out, little_endian)
        .map_err(|e| MetadataError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

fn decode_user_comment(raw: &[u8]) -> String {
    let body = CHARSET_PREFIXES
        .iter()
        .find(|prefix| raw.starts_with(&prefix[..]))
        .map(|prefix| &raw[prefix.len()..])
        .unwrap_or(raw);

    serde_json::from_slice::<String>(body)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim_end_matches('\0').to_string())
}

/// Writes `contents` next to `path` and renames it into place.
fn replace_file(path: &Path, contents: &[u8]) -> Result<(), MetadataError> {
    let write_err = |source| MetadataError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
