//! Static itag table (C1): numeric format id -> codec/container/resolution/bitrate metadata.

use std::sync::OnceLock;

/// Metadata describing one YouTube media representation (container + codecs +
/// resolution + bitrate), keyed by its numeric `itag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itag {
    pub number: u32,
    pub extension: &'static str,
    /// `"Np"` or `""` if not applicable (audio-only). Owned rather than
    /// `&'static str` because the DASH parser (C5) overrides it per-instance
    /// from a manifest's `height` attribute.
    pub resolution: String,
    pub video_encoding: &'static str,
    pub audio_encoding: &'static str,
    /// kbps, 0 if not applicable.
    pub audio_bitrate: u32,
    /// 0 unless the itag is a high-framerate variant.
    pub fps: u32,
}

fn itag(
    number: u32,
    extension: &'static str,
    resolution: &'static str,
    video_encoding: &'static str,
    audio_encoding: &'static str,
    audio_bitrate: u32,
    fps: u32,
) -> Itag {
    Itag {
        number,
        extension,
        resolution: resolution.to_string(),
        video_encoding,
        audio_encoding,
        audio_bitrate,
        fps,
    }
}

/// The static itag table, built once and indexed by number.
///
/// Sparse over [5..402]; covers progressive, DASH video-only, DASH
/// audio-only, live-streaming (.ts) and AV1 families.
fn table() -> &'static [Itag] {
    static TABLE: OnceLock<Vec<Itag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            itag(5, "flv", "240p", "Sorenson H.283", "mp3", 64, 0),
            itag(6, "flv", "270p", "Sorenson H.263", "mp3", 64, 0),
            itag(13, "3gp", "", "MPEG-4 Visual", "aac", 0, 0),
            itag(17, "3gp", "144p", "MPEG-4 Visual", "aac", 24, 0),
            itag(18, "mp4", "360p", "H.264", "aac", 96, 0),
            itag(22, "mp4", "720p", "H.264", "aac", 192, 0),
            itag(34, "flv", "480p", "H.264", "aac", 128, 0),
            itag(35, "flv", "360p", "H.264", "aac", 128, 0),
            itag(36, "3gp", "240p", "MPEG-4 Visual", "aac", 36, 0),
            itag(37, "mp4", "1080p", "H.264", "aac", 192, 0),
            itag(38, "mp4", "3072p", "H.264", "aac", 192, 0),
            itag(43, "webm", "360p", "VP8", "vorbis", 128, 0),
            itag(44, "webm", "480p", "VP8", "vorbis", 128, 0),
            itag(45, "webm", "720p", "VP8", "vorbis", 192, 0),
            itag(46, "webm", "1080p", "VP8", "vorbis", 192, 0),
            itag(82, "mp4", "360p", "H.264", "", 96, 0),
            itag(83, "mp4", "240p", "H.264", "aac", 96, 0),
            itag(84, "mp4", "720p", "H.264", "aac", 192, 0),
            itag(85, "mp4", "1080p", "H.264", "aac", 192, 0),
            itag(100, "webm", "360p", "VP8", "vorbis", 128, 0),
            itag(101, "webm", "360p", "VP8", "vorbis", 192, 0),
            itag(102, "webm", "720p", "VP8", "vorbis", 192, 0),
            // DASH, video only
            itag(133, "mp4", "240p", "H.264", "", 0, 0),
            itag(134, "mp4", "360p", "H.264", "", 0, 0),
            itag(135, "mp4", "480p", "H.264", "", 0, 0),
            itag(136, "mp4", "720p", "H.264", "", 0, 0),
            itag(137, "mp4", "1080p", "H.264", "", 0, 0),
            itag(138, "mp4", "2160p", "H.264", "", 0, 0),
            itag(160, "mp4", "144p", "H.264", "", 0, 0),
            itag(242, "webm", "240p", "VP9", "", 0, 0),
            itag(243, "webm", "360p", "VP9", "", 0, 0),
            itag(244, "webm", "480p", "VP9", "", 0, 0),
            itag(247, "webm", "720p", "VP9", "", 0, 0),
            // Historical row: audio_bitrate = 9 is preserved as-is, see DESIGN.md.
            itag(248, "webm", "1080p", "VP9", "", 9, 0),
            itag(264, "mp4", "1440p", "H.264", "", 0, 0),
            itag(266, "mp4", "2160p", "H.264", "", 0, 0),
            itag(271, "webm", "1440p", "VP9", "", 0, 0),
            itag(272, "webm", "2160p", "VP9", "", 0, 0),
            itag(278, "webm", "144p", "VP9", "", 0, 0),
            itag(298, "mp4", "720p", "H.264", "", 0, 60),
            itag(299, "mp4", "1080p", "H.264", "", 0, 60),
            itag(302, "webm", "720p", "VP9", "", 0, 60),
            itag(303, "webm", "1080p", "VP9", "", 0, 60),
            itag(308, "webm", "1440p", "VP9", "", 0, 60),
            itag(313, "webm", "2160p", "VP9", "", 0, 0),
            itag(315, "webm", "2160p", "VP9", "", 0, 60),
            // DASH, audio only
            itag(139, "mp4", "", "", "aac", 48, 0),
            itag(140, "mp4", "", "", "aac", 128, 0),
            itag(141, "mp4", "", "", "aac", 256, 0),
            itag(171, "webm", "", "", "vorbis", 128, 0),
            itag(172, "webm", "", "", "vorbis", 192, 0),
            itag(249, "webm", "", "", "opus", 50, 0),
            itag(250, "webm", "", "", "opus", 70, 0),
            itag(251, "webm", "", "", "opus", 160, 0),
            // Live streaming
            itag(92, "ts", "240p", "H.264", "aac", 48, 0),
            itag(93, "ts", "480p", "H.264", "aac", 128, 0),
            itag(94, "ts", "720p", "H.264", "aac", 128, 0),
            itag(95, "ts", "1080p", "H.264", "aac", 256, 0),
            itag(96, "ts", "720p", "H.264", "aac", 256, 0),
            itag(120, "flv", "720p", "H.264", "aac", 128, 0),
            itag(127, "ts", "", "", "aac", 96, 0),
            itag(128, "ts", "", "", "aac", 96, 0),
            itag(132, "ts", "240p", "H.264", "aac", 48, 0),
            itag(151, "ts", "720p", "H.264", "aac", 24, 0),
            // AV1
            itag(394, "mp4", "144p", "AV1", "", 0, 0),
            itag(395, "mp4", "240p", "AV1", "", 0, 0),
            itag(396, "mp4", "360p", "AV1", "", 0, 0),
            itag(397, "mp4", "480p", "AV1", "", 0, 0),
            itag(398, "mp4", "720p", "AV1", "", 0, 0),
            itag(399, "mp4", "1080p", "AV1", "", 0, 0),
            itag(400, "mp4", "1440p", "AV1", "", 0, 0),
            itag(401, "mp4", "2160p", "AV1", "", 0, 0),
            itag(402, "mp4", "2880p", "AV1", "", 0, 0),
        ]
    })
}

/// Look up an itag's metadata by number. `None` if unknown.
pub fn lookup(number: u32) -> Option<&'static Itag> {
    table().iter().find(|i| i.number == number)
}
