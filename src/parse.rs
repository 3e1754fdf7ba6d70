//! Format parser (C5): turn each of the three format sources (query-string
//! line, JSON formatInfo, DASH Representation element) into a [`Format`].

use crate::error::RytError;
use crate::extract::FormatInfo;
use crate::format::Format;
use crate::itag;
use url::form_urlencoded;

/// Parse a single progressive/legacy-adaptive query-string line
/// (`itag=22&url=...&sig=...`). Ill-formed lines (missing/unknown itag)
/// return `None` rather than an error -- the caller logs and drops them.
pub fn from_query_string(input: &str) -> Option<Format> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect();

    let itag_number: u32 = pairs
        .iter()
        .find(|(k, _)| k == "itag")
        .and_then(|(_, v)| v.parse().ok())?;
    let resolved = itag::lookup(itag_number)?;

    let mut format = Format::new(resolved.clone());
    for (k, v) in pairs {
        match k.as_str() {
            "url" => format.raw_url = Some(v),
            "s" => format.s = Some(v),
            "sig" => format.sig = Some(v),
            "stream" => format.stream = Some(v),
            "conn" => format.conn = Some(v),
            "sp" => format.sp = Some(v),
            _ => {}
        }
    }
    Some(format)
}

/// Parse a comma-separated query-string list (`args.url_encoded_fmt_stream_map`
/// / `args.adaptive_fmts`), dropping ill-formed entries with a debug log.
pub fn from_query_string_list(input: &str) -> Vec<Format> {
    input
        .split(',')
        .filter_map(|line| {
            from_query_string(line).or_else(|| {
                tracing::debug!(line, "dropping ill-formed format line");
                None
            })
        })
        .collect()
}

/// Build a [`Format`] from a JSON `formatInfo` entry: if `cipher` or
/// `signatureCipher` is present, its body is parsed the same way as a
/// query-string line, then the itag is forced from the enclosing entry.
/// Otherwise the entry's own `url` is used directly.
pub fn from_format_info(info: &FormatInfo) -> Result<Format, RytError> {
    let resolved = itag::lookup(info.itag)
        .ok_or_else(|| RytError::Extraction(format!("no itag found with number: {}", info.itag)))?;

    let cipher_body = info.signature_cipher.as_deref().or(info.cipher.as_deref());
    let mut format = if let Some(body) = cipher_body {
        from_query_string(body)
            .ok_or_else(|| RytError::Extraction(format!("unable to parse cipher '{body}'")))?
    } else {
        Format::new(resolved.clone())
    };
    format.itag = resolved.clone();
    if cipher_body.is_none() {
        format.raw_url = info.url.clone();
    }
    Ok(format)
}

/// DASH `Representation` element fields relevant to format construction.
#[derive(Debug, Clone)]
pub struct DashRepresentation {
    pub id: u32,
    pub height: u32,
    pub base_url: String,
}

/// Build a [`Format`] from a DASH `Representation`: `id` is the itag,
/// `BaseURL` the raw URL, and a non-zero `height` overrides the resolution
/// to `"{height}p"`.
pub fn from_dash_representation(rep: &DashRepresentation) -> Option<Format> {
    let resolved = itag::lookup(rep.id)?;
    let mut format = Format::new(resolved.clone());
    format.raw_url = Some(rep.base_url.clone());
    if rep.height != 0 {
        format.itag.resolution = format!("{}p", rep.height);
    }
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_string_fixture() {
        let line = "itag=22&url=https%3A%2F%2Fexample.com%2Fv&sig=abc";
        let f = from_query_string(line).unwrap();
        assert_eq!(f.itag.number, 22);
        assert_eq!(f.itag.extension, "mp4");
        assert_eq!(f.itag.resolution, "720p");
        assert_eq!(f.itag.video_encoding, "H.264");
        assert_eq!(f.itag.audio_encoding, "aac");
        assert_eq!(f.itag.audio_bitrate, 192);
        assert_eq!(f.raw_url.as_deref(), Some("https://example.com/v"));
        assert_eq!(f.sig.as_deref(), Some("abc"));
    }

    #[test]
    fn test_from_query_string_missing_itag() {
        assert!(from_query_string("url=https://example.com").is_none());
    }

    #[test]
    fn test_from_query_string_unknown_itag() {
        assert!(from_query_string("itag=999999&url=https://example.com").is_none());
    }

    #[test]
    fn test_from_query_string_list_two_entries() {
        let input = "itag=22&url=a,itag=18&url=b";
        let list = from_query_string_list(input);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].itag.number, 22);
        assert_eq!(list[1].itag.number, 18);
    }

    #[test]
    fn test_from_query_string_list_drops_ill_formed() {
        let input = "itag=22&url=a,garbage,itag=18&url=b";
        let list = from_query_string_list(input);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_from_format_info_with_cipher() {
        let info = FormatInfo {
            itag: 22,
            mime_type: None,
            bitrate: None,
            width: None,
            height: None,
            fps: None,
            audio_sample_rate: None,
            audio_channels: None,
            url: None,
            cipher: None,
            signature_cipher: Some("s=XYZ&url=https%3A%2F%2Fexample.com%2Fv".to_string()),
        };
        let f = from_format_info(&info).unwrap();
        assert_eq!(f.itag.number, 22);
        assert_eq!(f.s.as_deref(), Some("XYZ"));
        assert_eq!(f.raw_url.as_deref(), Some("https://example.com/v"));
    }

    #[test]
    fn test_from_format_info_without_cipher() {
        let info = FormatInfo {
            itag: 18,
            mime_type: None,
            bitrate: None,
            width: None,
            height: None,
            fps: None,
            audio_sample_rate: None,
            audio_channels: None,
            url: Some("https://example.com/plain".to_string()),
            cipher: None,
            signature_cipher: None,
        };
        let f = from_format_info(&info).unwrap();
        assert_eq!(f.raw_url.as_deref(), Some("https://example.com/plain"));
    }

    #[test]
    fn test_from_dash_representation_overrides_resolution() {
        let rep = DashRepresentation {
            id: 137,
            height: 1080,
            base_url: "https://dash.example/137".to_string(),
        };
        let f = from_dash_representation(&rep).unwrap();
        assert_eq!(f.itag.resolution, "1080p");
        assert_eq!(f.raw_url.as_deref(), Some("https://dash.example/137"));
    }

    #[test]
    fn test_from_dash_representation_unknown_itag() {
        let rep = DashRepresentation {
            id: 999999,
            height: 0,
            base_url: "x".to_string(),
        };
        assert!(from_dash_representation(&rep).is_none());
    }
}
