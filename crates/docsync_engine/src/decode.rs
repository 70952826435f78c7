use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{FailureKind, FetchError, FetchOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body is not valid {encoding}")]
    Malformed { encoding: String },
}

/// Decode a response body to UTF-8: BOM, then Content-Type charset, then detection.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    // Top-level domain hints are not available here; let chardetng look at the bytes alone.
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Decode a fetched body, reporting failure the way the rest of the fetch path does.
pub fn decode_fetched(output: &FetchOutput) -> Result<DecodedText, FetchError> {
    decode_body(&output.bytes, output.metadata.content_type.as_deref()).map_err(|err| {
        FetchError::new(
            FailureKind::Decode,
            format!("{}: {err}", output.metadata.final_url),
        )
    })
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: enc.name().to_string(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::charset_param;

    #[test]
    fn charset_is_read_case_insensitively() {
        assert_eq!(
            charset_param("text/html; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(charset_param("text/plain;charset=utf-8").as_deref(), Some("utf-8"));
        assert_eq!(charset_param("text/plain"), None);
    }
}
