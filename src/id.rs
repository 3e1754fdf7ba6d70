//! Identifier resolution: accept either a raw 11-character video id or one
//! of the three watch-page URL shapes YouTube serves, and resolve either
//! down to the bare id used to build the watch page URL.

use crate::error::RytError;
use url::Url;

/// Resolve `identifier` to a bare video id.
///
/// Accepts, in order: a raw id (no `://`), a `youtu.be/<id>` short link, a
/// `youtube.com/watch?v=<id>` URL, or a `youtube.com/shorts/<id>` URL.
pub fn resolve_video_id(identifier: &str) -> Result<String, RytError> {
    if !identifier.contains("://") {
        return if identifier.is_empty() {
            Err(RytError::InvalidIdentifier)
        } else {
            Ok(identifier.to_string())
        };
    }

    let parsed = Url::parse(identifier).map_err(|_| RytError::InvalidIdentifier)?;
    match parsed.host_str().map(|h| h.to_ascii_lowercase()).as_deref() {
        Some("youtu.be") => {
            let path = parsed.path().trim_start_matches('/');
            if path.is_empty() {
                Err(RytError::InvalidIdentifier)
            } else {
                Ok(path.to_string())
            }
        }
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com") => {
            if parsed.path().starts_with("/watch") {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
                    .ok_or(RytError::InvalidIdentifier)
            } else if let Some(id) = parsed.path().strip_prefix("/shorts/") {
                if id.is_empty() {
                    Err(RytError::InvalidIdentifier)
                } else {
                    Ok(id.to_string())
                }
            } else if let Some(id) = parsed.path().strip_prefix("/embed/") {
                if id.is_empty() {
                    Err(RytError::InvalidIdentifier)
                } else {
                    Ok(id.to_string())
                }
            } else {
                Err(RytError::InvalidIdentifier)
            }
        }
        _ => Err(RytError::InvalidIdentifier),
    }
}

/// Build the canonical watch page URL for a resolved video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
