//! URL builder (C7): turn a (possibly still-enciphered) [`Format`] into the
//! final playable media URL.

use crate::cipher::Cipher;
use crate::error::RytError;
use crate::format::Format;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Build the final media URL for `format`.
///
/// * if `raw_url` is set and the format needs no deciphering, it's used
///   as-is (after adding `ratebypass=yes`);
/// * if `s` is set, its deciphered value is written back into the query
///   string under `sp` (if present) or else `signature`;
/// * if neither `raw_url` nor (`stream`+`conn`) is present, building fails.
pub async fn build_url(
    format: &Format,
    player_script_url: Option<&str>,
    youtube_base: &str,
    cipher: &Cipher,
    cancel: &CancellationToken,
) -> Result<String, RytError> {
    let base = match (&format.raw_url, &format.stream, &format.conn) {
        (Some(url), _, _) => url.clone(),
        (None, Some(stream), Some(conn)) => {
            if conn.ends_with('/') {
                format!("{conn}{stream}")
            } else {
                format!("{conn}/{stream}")
            }
        }
        _ => return Err(RytError::UrlBuild),
    };

    let mut url = Url::parse(&base).map_err(|_| RytError::UrlBuild)?;

    if format.needs_deciphering() {
        let s = format.s.as_deref().unwrap_or_default();
        let script = player_script_url.ok_or(RytError::UrlBuild)?;
        let deciphered = cipher.decipher(s, script, youtube_base, cancel).await?;
        let param = format.sp.as_deref().unwrap_or("signature");
        set_query_param(&mut url, param, &deciphered);
    } else if let Some(sig) = &format.sig {
        set_query_param(&mut url, "signature", sig);
    }

    set_query_param(&mut url, "ratebypass", "yes");
    Ok(url.to_string())
}

fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let existing: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in existing {
        pairs.append_pair(&k, &v);
    }
    pairs.append_pair(key, value);
}
