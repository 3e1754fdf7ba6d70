//! Thumbnail URL helper (C9): compose a thumbnail image URL for a video id.

/// One of the five fixed thumbnail qualities YouTube serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailQuality {
    Default,
    Medium,
    High,
    StandardDefinition,
    MaxResolution,
}

impl ThumbnailQuality {
    fn as_path_segment(self) -> &'static str {
        match self {
            ThumbnailQuality::Default => "default",
            ThumbnailQuality::Medium => "mqdefault",
            ThumbnailQuality::High => "hqdefault",
            ThumbnailQuality::StandardDefinition => "sddefault",
            ThumbnailQuality::MaxResolution => "maxresdefault",
        }
    }
}

/// Build `http://img.youtube.com/vi/{id}/{quality}.jpg`.
pub fn thumbnail_url(video_id: &str, quality: ThumbnailQuality) -> String {
    format!(
        "http://img.youtube.com/vi/{video_id}/{}.jpg",
        quality.as_path_segment()
    )
}
