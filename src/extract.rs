//! Page/JSON extractors (C4): locate embedded blobs inside watch-page HTML
//! via anchored regexes, and the strongly-typed schemas those blobs decode
//! into.

use crate::error::RytError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

fn player_config_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ytplayer\.config\s*=\s*(.*?);ytplayer\.load").unwrap())
}

fn initial_data_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\["ytInitialData"\]\s*=\s*(.+?);</script>"#).unwrap())
}

fn initial_player_response_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\["ytInitialPlayerResponse"\]\s*=\s*(.+?);</script>"#).unwrap()
    })
}

fn embed_player_config_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"yt\.setConfig\(\{'PLAYER_CONFIG':\s*(.+?)\}\);"#).unwrap())
}

/// Extract the embedded-player page's `yt.setConfig({'PLAYER_CONFIG': ...});`
/// JSON text, if present -- used by the orchestrator's embed/legacy fallback.
pub fn extract_embed_player_config_json(html: &str) -> Option<&str> {
    embed_player_config_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract the raw `ytplayer.config = (...)` JSON text, if present.
pub fn extract_player_config_json(html: &str) -> Option<&str> {
    player_config_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract the raw `["ytInitialData"] = (...)` JSON text, if present.
pub fn extract_initial_data_json(html: &str) -> Option<&str> {
    initial_data_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract the raw `["ytInitialPlayerResponse"] = (...)` JSON text, if present.
pub fn extract_initial_player_response_json(html: &str) -> Option<&str> {
    initial_player_response_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `playerConfig` schema: only the fields the orchestrator reads.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayerConfig {
    #[serde(default)]
    pub assets: Assets,
    #[serde(default)]
    pub args: PlayerConfigArgs,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Assets {
    #[serde(default)]
    pub js: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayerConfigArgs {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub errorcode: String,
    #[serde(default)]
    pub reason: String,
    pub player_response: Option<String>,
    #[serde(default)]
    pub url_encoded_fmt_stream_map: String,
    #[serde(default)]
    pub adaptive_fmts: String,
    #[serde(default)]
    pub dashmpd: String,
    pub sts: Option<String>,
}

/// `playerResponse` schema (the `ytInitialPlayerResponse` / `args.player_response` blob).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayerResponse {
    #[serde(default)]
    pub playability_status: PlayabilityStatus,
    #[serde(default)]
    pub streaming_data: StreamingData,
    #[serde(default)]
    pub video_details: VideoDetails,
    #[serde(default)]
    pub microformat: Microformat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<FormatInfo>,
    #[serde(default)]
    pub adaptive_formats: Vec<FormatInfo>,
    pub dash_manifest_url: Option<String>,
    pub hls_manifest_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub itag: u32,
    pub mime_type: Option<String>,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub audio_sample_rate: Option<String>,
    pub audio_channels: Option<u32>,
    pub url: Option<String>,
    pub cipher: Option<String>,
    pub signature_cipher: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub length_seconds: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub short_description: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Microformat {
    #[serde(default)]
    pub player_microformat_renderer: PlayerMicroformatRenderer,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMicroformatRenderer {
    #[serde(default)]
    pub publish_date: String,
}

pub fn parse_player_response(json: &str) -> Result<PlayerResponse, RytError> {
    serde_json::from_str(json).map_err(RytError::from)
}

/// A content node in a metadata row: either a plain `simpleText` or a list
/// of `runs`, each carrying `text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Simple { #[serde(rename = "simpleText")] simple_text: String },
    Runs { runs: Vec<Run> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub text: String,
}

impl Content {
    /// `simpleText` if present, else the concatenation of every `runs[i].text`.
    pub fn to_display_string(&self) -> String {
        match self {
            Content::Simple { simple_text } => simple_text.clone(),
            Content::Runs { runs } => runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataRow {
    pub title: Content,
    pub contents: Vec<Content>,
}

/// A sequence of metadata rows, each exposing a title and its contents.
pub struct MetadataRows(pub Vec<MetadataRow>);

impl MetadataRows {
    /// First content's string for the row whose title matches `name`
    /// (e.g. `"Artist"`, `"Song"`, `"Album"`, `"Writers"`), `""` if absent.
    pub fn get(&self, name: &str) -> String {
        self.0
            .iter()
            .find(|row| row.title.to_display_string() == name)
            .and_then(|row| row.contents.first())
            .map(|c| c.to_display_string())
            .unwrap_or_default()
    }
}

/// Walk a parsed `ytInitialData` value recursively collecting every
/// `metadataRowRenderer` object, wherever it's nested under the video's
/// secondary-info engagement panel. Gives `song`/`artist`/`album`/`writers`
/// a home without hard-coding the panel's full path, which YouTube moves
/// around between experiments.
pub fn extract_metadata_rows(value: &serde_json::Value) -> MetadataRows {
    let mut rows = Vec::new();
    collect_metadata_rows(value, &mut rows);
    MetadataRows(rows)
}

/// Extract the video description from the `ytInitialData` blob's
/// `videoSecondaryInfoRenderer.description` field (see SPEC_FULL.md §4.4),
/// wherever that renderer is nested. Structural walk for the same reason as
/// [`extract_metadata_rows`]: the panel's path moves between experiments.
pub fn extract_description(value: &serde_json::Value) -> String {
    find_video_secondary_info_renderer(value)
        .and_then(|renderer| renderer.get("description"))
        .and_then(|d| serde_json::from_value::<Content>(d.clone()).ok())
        .map(|c| c.to_display_string())
        .unwrap_or_default()
}

fn find_video_secondary_info_renderer(value: &serde_json::Value) -> Option<&serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(renderer) = map.get("videoSecondaryInfoRenderer") {
                return Some(renderer);
            }
            map.values().find_map(find_video_secondary_info_renderer)
        }
        serde_json::Value::Array(items) => items.iter().find_map(find_video_secondary_info_renderer),
        _ => None,
    }
}

fn collect_metadata_rows(value: &serde_json::Value, out: &mut Vec<MetadataRow>) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(renderer) = map.get("metadataRowRenderer") {
                if let Ok(row) = serde_json::from_value::<MetadataRow>(renderer.clone()) {
                    out.push(row);
                }
            }
            for v in map.values() {
                collect_metadata_rows(v, out);
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_metadata_rows(v, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_player_config_json() {
        let html = r#"garbage ytplayer.config = {"a":1};ytplayer.load(); more"#;
        assert_eq!(extract_player_config_json(html), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_extract_initial_data_and_player_response() {
        let html = r#"
            <script>window["ytInitialData"] = {"x":1};</script>
            <script>window["ytInitialPlayerResponse"] = {"y":2};</script>
        "#;
        assert_eq!(extract_initial_data_json(html), Some(r#"{"x":1}"#));
        assert_eq!(
            extract_initial_player_response_json(html),
            Some(r#"{"y":2}"#)
        );
    }

    #[test]
    fn test_extract_embed_player_config_json() {
        let html = r#"before yt.setConfig({'PLAYER_CONFIG': {"sts":12345}}); after"#;
        assert_eq!(
            extract_embed_player_config_json(html),
            Some(r#"{"sts":12345}"#)
        );
    }

    #[test]
    fn test_missing_blobs_return_none() {
        assert_eq!(extract_player_config_json("nothing here"), None);
        assert_eq!(extract_initial_data_json("nothing here"), None);
    }

    #[test]
    fn test_parse_player_response_playability() {
        let json = r#"{
            "playabilityStatus": {"status": "OK", "reason": ""},
            "videoDetails": {"title": "t", "author": "a", "lengthSeconds": "367", "keywords": ["x"]},
            "streamingData": {"formats": [], "adaptiveFormats": []},
            "microformat": {"playerMicroformatRenderer": {"publishDate": "2015-10-22"}}
        }"#;
        let pr = parse_player_response(json).unwrap();
        assert_eq!(pr.playability_status.status, "OK");
        assert_eq!(pr.video_details.length_seconds, "367");
        assert_eq!(pr.microformat.player_microformat_renderer.publish_date, "2015-10-22");
    }

    #[test]
    fn test_content_to_display_string() {
        let simple = Content::Simple { simple_text: "hi".into() };
        assert_eq!(simple.to_display_string(), "hi");

        let runs = Content::Runs {
            runs: vec![Run { text: "a".into() }, Run { text: "b".into() }],
        };
        assert_eq!(runs.to_display_string(), "ab");
    }

    #[test]
    fn test_extract_metadata_rows_nested() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "contents": {
                    "twoColumnWatchNextResults": {
                        "results": {
                            "videoSecondaryInfoRenderer": {
                                "metadataRowContainer": {
                                    "rows": [
                                        {"metadataRowRenderer": {
                                            "title": {"simpleText": "Artist"},
                                            "contents": [{"simpleText": "Rick Astley"}]
                                        }}
                                    ]
                                }
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        let rows = extract_metadata_rows(&value);
        assert_eq!(rows.get("Artist"), "Rick Astley");
        assert_eq!(rows.get("Song"), "");
    }

    #[test]
    fn test_extract_description_nested() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "contents": {
                    "twoColumnWatchNextResults": {
                        "results": {
                            "videoSecondaryInfoRenderer": {
                                "description": {"simpleText": "A video about cats."}
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(extract_description(&value), "A video about cats.");
    }

    #[test]
    fn test_extract_description_missing_is_empty() {
        let value: serde_json::Value = serde_json::from_str(r#"{"foo": "bar"}"#).unwrap();
        assert_eq!(extract_description(&value), "");
    }

    #[test]
    fn test_metadata_rows_get() {
        let row = MetadataRow {
            title: Content::Simple { simple_text: "Artist".into() },
            contents: vec![Content::Simple {
                simple_text: "Justin Timberlake".into(),
            }],
        };
        let rows = MetadataRows(vec![row]);
        assert_eq!(rows.get("Artist"), "Justin Timberlake");
        assert_eq!(rows.get("Song"), "");
    }
}
