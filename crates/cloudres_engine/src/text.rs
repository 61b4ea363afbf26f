use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextDecodeError {
    #[error("response body is not valid {encoding} text")]
    Malformed { encoding: String },
}

/// Decode a response body into a `String` using: BOM -> Content-Type charset -> strict UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, TextDecodeError> {
    // 1) BOM aware decode using encoding_rs helper
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // 2) Content-Type header charset
    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    // 3) The service writes UTF-8; anything else is not text we understand.
    decode_with(bytes, UTF_8)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, TextDecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(TextDecodeError::Malformed {
            encoding: enc.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_passes_through() {
        assert_eq!(decode_body("A\tB\n".as_bytes(), None).unwrap(), "A\tB\n");
    }

    #[test]
    fn charset_from_content_type_is_honoured() {
        let latin1 = [b'c', b'a', b'f', 0xE9];
        assert_eq!(
            decode_body(&latin1, Some("text/plain; Charset=\"ISO-8859-1\"")).unwrap(),
            "café"
        );
    }

    #[test]
    fn bom_wins_and_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"A\n");
        assert_eq!(decode_body(&bytes, Some("text/plain; charset=latin1")).unwrap(), "A\n");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert_eq!(
            decode_body(&[b'A', 0x80, b'\t', 0xC3], None),
            Err(TextDecodeError::Malformed {
                encoding: "UTF-8".to_string()
            })
        );
    }
}
