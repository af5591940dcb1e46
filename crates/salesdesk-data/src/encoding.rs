//! Byte-order-mark and heuristic encoding detection

use crate::error::DataFormatError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Decode raw dataset bytes to text.
///
/// A byte-order mark wins. Without one, valid UTF-8 is taken as UTF-8 and
/// anything else as Windows-1252, the encoding sales exports from
/// spreadsheet tools usually carry. Input containing NUL bytes and no BOM
/// is rejected: it is either binary or BOM-less UTF-16, and neither can be
/// decoded reliably.
pub fn decode(bytes: &[u8]) -> Result<(String, &'static Encoding), DataFormatError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(DataFormatError::Encoding(format!(
                "input declares {} but contains undecodable sequences",
                encoding.name()
            )));
        }
        return Ok((text.into_owned(), encoding));
    }

    if bytes.contains(&0) {
        return Err(DataFormatError::Encoding(
            "NUL bytes without a byte-order mark".to_string(),
        ));
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), UTF_8));
    }

    let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DataFormatError::Encoding(
            "input is neither UTF-8 nor Windows-1252".to_string(),
        ));
    }
    Ok((text.into_owned(), WINDOWS_1252))
}
