//! VideoInfo orchestrator (C8): wire the client, extractors, parser, cipher
//! and URL builder into the end-to-end `identifier -> playable URL` pipeline.

use crate::cipher::Cipher;
use crate::client::HttpClient;
use crate::dash;
use crate::error::RytError;
use crate::extract::{self, PlayerConfigArgs, PlayerResponse};
use crate::format::{self, Format, FormatList};
use crate::id;
use crate::parse;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

const YOUTUBE_BASE: &str = "https://www.youtube.com";

/// Everything extracted about one video: scalar metadata plus its full,
/// still-possibly-enciphered list of formats.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub song: String,
    pub artist: String,
    pub album: String,
    pub writers: String,
    pub keywords: Vec<String>,
    pub date_published: Option<chrono::NaiveDate>,
    pub duration: Duration,
    pub formats: FormatList,
    pub player_script_url: Option<String>,
}

impl VideoInfo {
    /// Thumbnail URL for this video at the given quality.
    pub fn get_thumbnail_url(&self, quality: crate::thumbnail::ThumbnailQuality) -> String {
        crate::thumbnail::thumbnail_url(&self.id, quality)
    }
}

/// The entry point: fetches watch-page data, resolves signatures lazily,
/// and builds final download URLs.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    cipher: Cipher,
}

impl Client {
    pub fn new() -> Self {
        let http = HttpClient::new();
        let cipher = Cipher::new(http.clone());
        Self { http, cipher }
    }

    /// Resolve `identifier` (a raw id or any supported watch URL shape)
    /// into a fully-populated [`VideoInfo`].
    pub async fn get_video_info(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoInfo, RytError> {
        let video_id = id::resolve_video_id(identifier)?;

        let watch_html = self
            .http
            .get_and_read_text(&id::watch_url(&video_id), cancel)
            .await?;

        let args = self
            .resolve_player_config_args(&watch_html, &video_id, cancel)
            .await?;
        if args.status == "fail" {
            return Err(RytError::Playability(format!(
                "{}:{}",
                args.errorcode, args.reason
            )));
        }

        let player_response = self.resolve_player_response(&args, &watch_html)?;
        if player_response.playability_status.status != "OK" {
            return Err(RytError::Playability(
                player_response.playability_status.reason.clone(),
            ));
        }
        let player_script_url = extract_player_script_url(&watch_html);

        let initial_data = extract::extract_initial_data_json(&watch_html)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok());
        let metadata = initial_data
            .as_ref()
            .map(extract::extract_metadata_rows)
            .unwrap_or_else(|| extract::MetadataRows(Vec::new()));
        let description = initial_data
            .as_ref()
            .map(extract::extract_description)
            .unwrap_or_default();

        let formats = self
            .build_formats(&player_response, &args, player_script_url.as_deref(), cancel)
            .await?;

        let details = &player_response.video_details;
        Ok(VideoInfo {
            id: video_id,
            title: details.title.clone(),
            description,
            uploader: details.author.clone(),
            song: metadata.get("Song"),
            artist: metadata.get("Artist"),
            album: metadata.get("Album"),
            writers: metadata.get("Writers"),
            keywords: details.keywords.clone(),
            date_published: chrono::NaiveDate::parse_from_str(
                &player_response
                    .microformat
                    .player_microformat_renderer
                    .publish_date,
                "%Y-%m-%d",
            )
            .ok(),
            duration: Duration::from_secs(details.length_seconds.parse().unwrap_or(0)),
            formats,
            player_script_url,
        })
    }

    /// §4.8 step 4: get `playerConfig.args`, trying the primary watch-page
    /// blob first, then the embed page + legacy `get_video_info` endpoint.
    async fn resolve_player_config_args(
        &self,
        watch_html: &str,
        video_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PlayerConfigArgs, RytError> {
        if let Some(config_json) = extract::extract_player_config_json(watch_html) {
            let config: extract::PlayerConfig = serde_json::from_str(config_json)?;
            return Ok(config.args);
        }

        tracing::debug!(video_id, "playerConfig.args missing from watch page, falling back to embed page");
        let embed_url = format!("{YOUTUBE_BASE}/embed/{video_id}");
        let embed_html = self.http.get_and_read_text(&embed_url, cancel).await?;
        let sts = extract::extract_embed_player_config_json(&embed_html)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .and_then(|v| v.get("sts").and_then(|s| s.as_i64()).map(|n| n.to_string()));

        tracing::debug!(video_id, "falling back to legacy get_video_info endpoint");
        let mut legacy_url = format!(
            "{YOUTUBE_BASE}/get_video_info?video_id={video_id}&eurl={}",
            urlencode(&format!("https://youtube.googleapis.com/v/{video_id}"))
        );
        if let Some(sts) = &sts {
            legacy_url.push_str(&format!("&sts={sts}"));
        }
        let body = self.http.get_and_read_text(&legacy_url, cancel).await?;
        Ok(parse_legacy_args(&body))
    }

    /// §4.8 step 6: the `player_response`, from `args.player_response` if
    /// present, else from the watch page's `ytInitialPlayerResponse` blob.
    fn resolve_player_response(
        &self,
        args: &PlayerConfigArgs,
        watch_html: &str,
    ) -> Result<PlayerResponse, RytError> {
        if let Some(raw) = &args.player_response {
            return extract::parse_player_response(raw);
        }
        if let Some(raw) = extract::extract_initial_player_response_json(watch_html) {
            return extract::parse_player_response(raw);
        }
        Err(RytError::Extraction(
            "no player response found in watch page or playerConfig.args".to_string(),
        ))
    }

    /// Build the full [`FormatList`] from every available source (§4.8 step 8-9):
    /// legacy query-string maps, the structured `formats`/`adaptiveFormats`
    /// arrays, and, when present, the DASH manifest.
    async fn build_formats(
        &self,
        player_response: &PlayerResponse,
        args: &PlayerConfigArgs,
        player_script_url: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<FormatList, RytError> {
        let mut formats: FormatList = parse::from_query_string_list(&args.url_encoded_fmt_stream_map);
        formats.extend(parse::from_query_string_list(&args.adaptive_fmts));
        formats.extend(
            player_response
                .streaming_data
                .formats
                .iter()
                .chain(player_response.streaming_data.adaptive_formats.iter())
                .filter_map(|info| parse::from_format_info(info).ok()),
        );

        let dash_url = player_response
            .streaming_data
            .dash_manifest_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| Some(args.dashmpd.clone()).filter(|u| !u.is_empty()));

        if let Some(dash_url) = dash_url {
            let rewritten = self.rewrite_dash_signature(&dash_url, player_script_url, cancel).await?;
            if let Ok(xml) = self.http.get_and_read_text(&rewritten, cancel).await {
                if let Ok(reps) = dash::parse_representations(&xml) {
                    let dash_formats: FormatList = reps
                        .iter()
                        .filter_map(parse::from_dash_representation)
                        .collect();
                    format::merge_dash(&mut formats, dash_formats);
                }
            }
        }

        Ok(formats)
    }

    /// §4.8 step 9: rewrite `/s/<token>` segments in a DASH manifest URL to
    /// `/signature/<decipher(token)>`.
    async fn rewrite_dash_signature(
        &self,
        dash_url: &str,
        player_script_url: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<String, RytError> {
        let Some(script) = player_script_url else {
            return Ok(dash_url.to_string());
        };
        if let Some(idx) = dash_url.find("/s/") {
            let token_start = idx + 3;
            let token_end = dash_url[token_start..]
                .find('/')
                .map(|i| token_start + i)
                .unwrap_or(dash_url.len());
            let token = &dash_url[token_start..token_end];
            let deciphered = self
                .cipher
                .decipher(token, script, YOUTUBE_BASE, cancel)
                .await?;
            return Ok(format!(
                "{}/signature/{}{}",
                &dash_url[..idx],
                deciphered,
                &dash_url[token_end..]
            ));
        }
        Ok(dash_url.to_string())
    }

    /// Build the final playable URL for one of a [`VideoInfo`]'s formats.
    pub async fn get_download_url(
        &self,
        info: &VideoInfo,
        format: &Format,
        cancel: &CancellationToken,
    ) -> Result<String, RytError> {
        crate::url_builder::build_url(
            format,
            info.player_script_url.as_deref(),
            YOUTUBE_BASE,
            &self.cipher,
            cancel,
        )
        .await
    }

    /// Convenience: resolve `format`'s URL and stream its bytes into `sink`.
    /// File placement, naming and progress reporting are the caller's job.
    pub async fn download<W: AsyncWrite + Unpin>(
        &self,
        info: &VideoInfo,
        format: &Format,
        sink: &mut W,
        cancel: &CancellationToken,
    ) -> Result<(), RytError> {
        let url = self.get_download_url(info, format, cancel).await?;
        let response = self.http.get_stream(&url, cancel).await?;
        let mut stream = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RytError::Cancelled),
                next = stream.next() => next,
            };
            match chunk {
                Some(bytes) => {
                    let bytes = bytes?;
                    sink.write_all(&bytes)
                        .await
                        .map_err(|e| RytError::Extraction(format!("write to sink failed: {e}")))?;
                }
                None => break,
            }
        }
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_player_script_url(html: &str) -> Option<String> {
    extract::extract_player_config_json(html)
        .and_then(|raw| serde_json::from_str::<extract::PlayerConfig>(raw).ok())
        .map(|config| config.assets.js)
        .filter(|js| !js.is_empty())
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Parse the legacy `get_video_info` endpoint's URL-encoded form body into
/// the same `playerConfig.args` shape the watch page's blob yields.
fn parse_legacy_args(body: &str) -> PlayerConfigArgs {
    let mut args = PlayerConfigArgs::default();
    for (k, v) in url::form_urlencoded::parse(body.as_bytes()) {
        match k.as_ref() {
            "status" => args.status = v.into_owned(),
            "errorcode" => args.errorcode = v.into_owned(),
            "reason" => args.reason = v.into_owned(),
            "player_response" => args.player_response = Some(v.into_owned()),
            "url_encoded_fmt_stream_map" => args.url_encoded_fmt_stream_map = v.into_owned(),
            "adaptive_fmts" => args.adaptive_fmts = v.into_owned(),
            "dashmpd" => args.dashmpd = v.into_owned(),
            "sts" => args.sts = Some(v.into_owned()),
            _ => {}
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itag;

    fn sample_format() -> Format {
        let mut f = Format::new(itag::lookup(22).unwrap().clone());
        f.raw_url = Some("https://example.com/v".to_string());
        f
    }

    fn sample_info() -> VideoInfo {
        VideoInfo {
            id: "abc".into(),
            title: "t".into(),
            description: "".into(),
            uploader: "".into(),
            song: "".into(),
            artist: "".into(),
            album: "".into(),
            writers: "".into(),
            keywords: vec![],
            date_published: None,
            duration: Duration::from_secs(0),
            formats: vec![],
            player_script_url: None,
        }
    }

    #[test]
    fn test_get_thumbnail_url() {
        let info = sample_info();
        let url = info.get_thumbnail_url(crate::thumbnail::ThumbnailQuality::High);
        assert_eq!(url, "http://img.youtube.com/vi/abc/hqdefault.jpg");
    }

    #[tokio::test]
    async fn test_get_download_url_plain_format() {
        let client = Client::new();
        let cancel = CancellationToken::new();
        let url = client
            .get_download_url(&sample_info(), &sample_format(), &cancel)
            .await
            .unwrap();
        assert!(url.contains("ratebypass=yes"));
    }

    #[test]
    fn test_resolve_player_response_from_args_player_response() {
        let client = Client::new();
        let mut args = PlayerConfigArgs::default();
        args.player_response = Some(
            r#"{
                "playabilityStatus": {"status": "OK", "reason": ""},
                "videoDetails": {"title": "t", "author": "a", "lengthSeconds": "10", "keywords": [], "shortDescription": ""},
                "streamingData": {"formats": [], "adaptiveFormats": []},
                "microformat": {"playerMicroformatRenderer": {"publishDate": "2020-01-01"}}
            }"#
            .to_string(),
        );
        let pr = client.resolve_player_response(&args, "").unwrap();
        assert_eq!(pr.playability_status.status, "OK");
    }

    #[test]
    fn test_resolve_player_response_falls_back_to_initial_player_response() {
        let client = Client::new();
        let args = PlayerConfigArgs::default();
        let html = r#"<script>window["ytInitialPlayerResponse"] = {
            "playabilityStatus": {"status": "OK", "reason": ""},
            "videoDetails": {"title": "t", "author": "a", "lengthSeconds": "10", "keywords": [], "shortDescription": ""},
            "streamingData": {"formats": [], "adaptiveFormats": []},
            "microformat": {"playerMicroformatRenderer": {"publishDate": "2020-01-01"}}
        };</script>"#;
        let pr = client.resolve_player_response(&args, html).unwrap();
        assert_eq!(pr.playability_status.status, "OK");
    }

    #[test]
    fn test_resolve_player_response_missing_errors() {
        let client = Client::new();
        let args = PlayerConfigArgs::default();
        assert!(client.resolve_player_response(&args, "no blobs here").is_err());
    }

    #[test]
    fn test_parse_legacy_args() {
        let body = "status=ok&url_encoded_fmt_stream_map=itag%3D22&dashmpd=https%3A%2F%2Fd";
        let args = parse_legacy_args(body);
        assert_eq!(args.status, "ok");
        assert_eq!(args.url_encoded_fmt_stream_map, "itag=22");
        assert_eq!(args.dashmpd, "https://d");
    }

    #[tokio::test]
    async fn test_download_streams_bytes_into_sink() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v")
            .with_status(200)
            .with_body(b"movie-bytes".to_vec())
            .create_async()
            .await;

        let client = Client::new();
        let mut format = sample_format();
        format.raw_url = Some(format!("{}/v", server.url()));
        let info = sample_info();
        let cancel = CancellationToken::new();
        let mut sink: Vec<u8> = Vec::new();
        client
            .download(&info, &format, &mut sink, &cancel)
            .await
            .unwrap();
        assert_eq!(sink, b"movie-bytes");
    }

    #[test]
    fn test_extract_player_script_url_present() {
        let html = r#"ytplayer.config = {"assets": {"js": "/s/player.js"}, "args": {}};ytplayer.load();"#;
        assert_eq!(extract_player_script_url(html), Some("/s/player.js".to_string()));
    }
}
