//! URI classification and data URI decoding.

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use glint_core::{GltfError, Result};

/// Standard alphabet; accepts payloads with or without `=` padding.
const DATA_URI_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where a URI points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<'a> {
    /// Inline `data:` URI.
    Data(DataUri<'a>),
    /// Relative or absolute file path, percent-decoded.
    Path(Cow<'a, str>),
    /// A URI with a scheme glint does not fetch (`http:`, `https:`, ...).
    Remote(&'a str),
}

/// The parts of a `data:` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Media type, possibly empty.
    pub mime_type: &'a str,
    /// Whether the payload is base64 encoded.
    pub base64: bool,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a `data:` URI. Returns `None` when `uri` is not one.
    pub fn parse(uri: &'a str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default();
        let base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));
        Some(Self {
            mime_type,
            base64,
            payload,
        })
    }

    /// Decode the payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if !self.base64 {
            return Err(GltfError::InvalidBase64 {
                message: format!("data uri of type '{}' is not base64 encoded", self.mime_type),
            });
        }
        DATA_URI_ENGINE
            .decode(self.payload.trim())
            .map_err(|e| GltfError::InvalidBase64 {
                message: e.to_string(),
            })
    }
}

/// Classify a buffer or image URI.
pub fn classify(uri: &str) -> Result<Location<'_>> {
    if uri.starts_with("data:") {
        return DataUri::parse(uri)
            .map(Location::Data)
            .ok_or_else(|| GltfError::InvalidBase64 {
                message: "data uri has no ',' separator".to_string(),
            });
    }
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(Location::Path(percent_decode(path)));
    }
    if has_scheme(uri) {
        return Ok(Location::Remote(uri));
    }
    Ok(Location::Path(percent_decode(uri)))
}

/// RFC 3986 scheme followed by ':'. Single letters are taken as drive letters.
fn has_scheme(uri: &str) -> bool {
    let Some((scheme, _)) = uri.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Decode `%XX` escapes. Malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_decode() {
        let uri = "data:application/octet-stream;base64,AAECAw==";
        let Location::Data(data) = classify(uri).unwrap() else {
            panic!("expected data uri");
        };
        assert_eq!(data.mime_type, "application/octet-stream");
        assert_eq!(data.decode().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unpadded_payload() {
        let data = DataUri::parse("data:application/gltf-buffer;base64,AAECAw").unwrap();
        assert_eq!(data.decode().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_invalid_payload() {
        let data = DataUri::parse("data:application/octet-stream;base64,@@@@").unwrap();
        assert!(matches!(data.decode(), Err(GltfError::InvalidBase64 { .. })));
    }

    #[test]
    fn test_non_base64_data_uri() {
        let data = DataUri::parse("data:text/plain,hello").unwrap();
        assert!(!data.base64);
        assert!(matches!(data.decode(), Err(GltfError::InvalidBase64 { .. })));
    }

    #[test]
    fn test_data_uri_without_comma() {
        assert!(matches!(
            classify("data:application/octet-stream;base64"),
            Err(GltfError::InvalidBase64 { .. })
        ));
    }

    #[test]
    fn test_paths_and_schemes() {
        assert_eq!(
            classify("textures/my%20image.png").unwrap(),
            Location::Path(Cow::Owned("textures/my image.png".into()))
        );
        assert_eq!(classify("a.bin").unwrap(), Location::Path(Cow::Borrowed("a.bin")));
        assert_eq!(
            classify("https://example.com/a.bin").unwrap(),
            Location::Remote("https://example.com/a.bin")
        );
        assert_eq!(
            classify("C:/models/a.bin").unwrap(),
            Location::Path(Cow::Borrowed("C:/models/a.bin"))
        );
        assert_eq!(
            classify("file:///tmp/a.bin").unwrap(),
            Location::Path(Cow::Borrowed("/tmp/a.bin"))
        );
    }

    #[test]
    fn test_percent_decode_malformed() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%41"), "%zzA");
    }
}
