use encoding_rs::{Encoding, UTF_8, WINDOWS_1252, WINDOWS_1254};

/// Text decoded from an uploaded file and the encoding that won.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// Candidates tried when there is no BOM, in tie-break order.
/// windows-1254 is the superset encoding_rs uses for ISO-8859-9.
const CANDIDATES: [&Encoding; 3] = [UTF_8, WINDOWS_1254, WINDOWS_1252];

const TURKISH: &[char] = &['ç', 'Ç', 'ğ', 'Ğ', 'ı', 'İ', 'ö', 'Ö', 'ş', 'Ş', 'ü', 'Ü'];

fn score(text: &str) -> i64 {
    let mut turkish = 0i64;
    let mut replaced = 0i64;
    for c in text.chars() {
        if c == char::REPLACEMENT_CHARACTER {
            replaced += 1;
        } else if TURKISH.contains(&c) {
            turkish += 1;
        }
    }
    turkish - 10 * replaced
}

/// Decode bytes of unknown encoding.
///
/// A UTF-8 or UTF-16 BOM decides outright. Otherwise each candidate is scored
/// by Turkish letters minus ten per replacement character; the best score
/// wins and ties go to the earlier candidate.
pub fn decode_text(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Decoded {
            text: text.into_owned(),
            encoding: encoding.name(),
        };
    }

    let mut best: Option<(i64, Decoded)> = None;
    for encoding in CANDIDATES {
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        let s = score(&text);
        if best.as_ref().map_or(true, |(b, _)| s > *b) {
            best = Some((
                s,
                Decoded {
                    text: text.into_owned(),
                    encoding: encoding.name(),
                },
            ));
        }
    }

    let (s, decoded) = best.unwrap_or_else(|| {
        (
            0,
            Decoded {
                text: String::new(),
                encoding: UTF_8.name(),
            },
        )
    });
    tracing::debug!(encoding = decoded.encoding, score = s, "decoded import");
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_prefers_utf8() {
        let d = decode_text(b"a,b\n1,2");
        assert_eq!(d.encoding, "UTF-8");
        assert_eq!(d.text, "a,b\n1,2");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let d = decode_text(b"\xEF\xBB\xBFad;soyad");
        assert_eq!(d.encoding, "UTF-8");
        assert_eq!(d.text, "ad;soyad");
    }

    #[test]
    fn utf16le_bom() {
        let bytes = [0xFF, 0xFE, b'o', 0, b'k', 0];
        let d = decode_text(&bytes);
        assert_eq!(d.encoding, "UTF-16LE");
        assert_eq!(d.text, "ok");
    }

    #[test]
    fn utf8_turkish_text() {
        let d = decode_text("Şube;Müdür\nİzmir;Ayşe".as_bytes());
        assert_eq!(d.encoding, "UTF-8");
        assert_eq!(d.text, "Şube;Müdür\nİzmir;Ayşe");
    }

    #[test]
    fn windows_1254_turkish_text() {
        // "İsık;Şeker" in windows-1254.
        let bytes = [0xDD, 0x73, 0xFD, 0x6B, b';', 0xDE, 0x65, 0x6B, 0x65, 0x72];
        let d = decode_text(&bytes);
        assert_eq!(d.encoding, "windows-1254");
        assert_eq!(d.text, "İsık;Şeker");
    }

    #[test]
    fn western_latin_falls_to_1254_on_tie() {
        // "Müller" is identical in 1254 and 1252.
        let bytes = [b'M', 0xFC, b'l', b'l', b'e', b'r'];
        let d = decode_text(&bytes);
        assert_eq!(d.encoding, "windows-1254");
        assert_eq!(d.text, "Müller");
    }
}
