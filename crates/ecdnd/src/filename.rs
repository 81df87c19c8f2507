//! Download filename decoding, escaping, and resolution inside the base dir

use ecdn_core::{EcdnError, EcdnResult};
use std::path::{Component, Path, PathBuf};

/// Query-style unescape: `+` becomes a space and `%XX` a byte. A `%` not
/// followed by two hex digits, or a result that is not UTF-8, is rejected.
pub fn query_unescape(input: &str) -> EcdnResult<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => {
                        return Err(EcdnError::BadInput(format!(
                            "invalid escape at byte {i} in file name"
                        )))
                    }
                }
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out)
        .map_err(|_| EcdnError::BadInput("file name is not valid UTF-8".into()))
}

/// Query-style escape for the `Content-Disposition` filename.
pub fn query_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Join a decoded name onto `base`, refusing anything that could leave it:
/// absolute paths, `..`, `.`, or an empty name.
pub fn resolve_in_base(base: &Path, name: &str) -> EcdnResult<PathBuf> {
    let relative = Path::new(name);
    let mut components = relative.components().peekable();
    if components.peek().is_none() {
        return Err(EcdnError::BadInput("empty file name".into()));
    }
    if !components.all(|c| matches!(c, Component::Normal(_))) || name.contains('\\') {
        return Err(EcdnError::BadInput(
            "file name must not contain path traversal".into(),
        ));
    }
    Ok(base.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_plain() {
        assert_eq!(query_unescape("movie.mp4").unwrap(), "movie.mp4");
    }

    #[test]
    fn unescape_plus_and_percent() {
        assert_eq!(query_unescape("my+file%20v2.pdf").unwrap(), "my file v2.pdf");
        assert_eq!(query_unescape("%ED%95%9C.txt").unwrap(), "한.txt");
    }

    #[test]
    fn unescape_rejects_bad_escapes() {
        assert!(matches!(query_unescape("bad%zz"), Err(EcdnError::BadInput(_))));
        assert!(matches!(query_unescape("trailing%4"), Err(EcdnError::BadInput(_))));
        assert!(matches!(query_unescape("%FF"), Err(EcdnError::BadInput(_))));
    }

    #[test]
    fn escape_matches_query_rules() {
        assert_eq!(query_escape("a b&c.pdf"), "a+b%26c.pdf");
        assert_eq!(query_escape("한.txt"), "%ED%95%9C.txt");
        assert_eq!(query_unescape(&query_escape("x y/z?.mp4")).unwrap(), "x y/z?.mp4");
    }

    #[test]
    fn resolve_plain_name() {
        let base = Path::new("/srv/ecdn");
        assert_eq!(
            resolve_in_base(base, "a.txt").unwrap(),
            PathBuf::from("/srv/ecdn/a.txt")
        );
    }

    #[test]
    fn resolve_rejects_traversal() {
        let base = Path::new("/srv/ecdn");
        for name in ["../etc/passwd", "a/../../b", "/etc/passwd", ".", "", "..\\win.ini"] {
            assert!(
                matches!(resolve_in_base(base, name), Err(EcdnError::BadInput(_))),
                "{name:?} must be rejected"
            );
        }
    }
}
