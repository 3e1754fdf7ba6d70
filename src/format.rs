//! Format & FormatList algebra (C2): a pure, side-effect-free filter/sort/
//! subtract algebra over a list of media formats.

use crate::itag::{self, Itag};

/// One media representation belonging to a video.
///
/// Exactly one of `raw_url`, (`stream` + optional `conn`) is expected to be
/// present once a format has been parsed; callers that find neither should
/// treat the format as ill-formed (see [`crate::error::RytError::UrlBuild`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub itag: Itag,
    pub raw_url: Option<String>,
    /// Encrypted signature, present on protected formats.
    pub s: Option<String>,
    /// Cleartext signature, present on older unprotected formats.
    pub sig: Option<String>,
    /// Legacy RTMP stream name.
    pub stream: Option<String>,
    /// Legacy RTMP connection string, paired with `stream`.
    pub conn: Option<String>,
    /// Overrides the query-parameter name the deciphered signature is written to.
    pub sp: Option<String>,
}

impl Format {
    pub fn new(itag: Itag) -> Self {
        Format {
            itag,
            raw_url: None,
            s: None,
            sig: None,
            stream: None,
            conn: None,
            sp: None,
        }
    }

    /// Whether this format still needs its signature deciphered.
    pub fn needs_deciphering(&self) -> bool {
        self.s.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Keys usable with the FormatList algebra. Each maps to one field, traced
/// back through the itag table (or the format's own number for `Itag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKey {
    Ext,
    Res,
    VidEnc,
    AudEnc,
    Itag,
    AudBr,
    Fps,
}

/// A language-neutral sum type mirroring the two kinds of itag-table field:
/// strings (ext/res/videnc/audenc) and integers (itag/audbr/fps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatValue {
    StringVal(String),
    IntVal(i64),
}

impl FormatValue {
    /// Canonical display form used for filter equality: `"123"` for ints,
    /// `""` for missing/empty values.
    pub fn display(&self) -> String {
        match self {
            FormatValue::StringVal(s) => s.clone(),
            FormatValue::IntVal(n) => n.to_string(),
        }
    }
}

impl Format {
    /// Project one field out via a [`FormatKey`].
    pub fn value_for(&self, key: FormatKey) -> FormatValue {
        match key {
            FormatKey::Ext => FormatValue::StringVal(self.itag.extension.to_string()),
            FormatKey::Res => FormatValue::StringVal(self.itag.resolution.to_string()),
            FormatKey::VidEnc => FormatValue::StringVal(self.itag.video_encoding.to_string()),
            FormatKey::AudEnc => FormatValue::StringVal(self.itag.audio_encoding.to_string()),
            FormatKey::Itag => FormatValue::IntVal(self.itag.number as i64),
            FormatKey::AudBr => FormatValue::IntVal(self.itag.audio_bitrate as i64),
            FormatKey::Fps => FormatValue::IntVal(self.itag.fps as i64),
        }
    }

    /// Width in pixels parsed from the leading digits of `"Np"`; 0 if missing.
    fn resolution_width(&self) -> i64 {
        let res = &self.itag.resolution;
        if res.len() < 2 {
            return 0;
        }
        res[..res.len() - 2].parse().unwrap_or(0)
    }

    /// Three-way comparison used by `sort`/`extremes`. Only `res`, `audbr`
    /// and `fps` are ordered; every other key compares equal (stable sort
    /// then preserves input order).
    fn compare_key(&self, other: &Format, key: FormatKey) -> std::cmp::Ordering {
        match key {
            FormatKey::Res => self.resolution_width().cmp(&other.resolution_width()),
            FormatKey::AudBr => self.itag.audio_bitrate.cmp(&other.itag.audio_bitrate),
            FormatKey::Fps => self.itag.fps.cmp(&other.itag.fps),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

/// An ordered sequence of [`Format`]. Every operation here is pure: it
/// returns a new list and never mutates its inputs.
pub type FormatList = Vec<Format>;

/// `filter(list, key, values)`: for each `v` in `values`, in order, every
/// format whose `value_for(key)` display-string-equals `v`. Duplicates are
/// possible if several `values` match the same format; empty `values` yields
/// an empty list.
pub fn filter(list: &[Format], key: FormatKey, values: &[String]) -> FormatList {
    let mut out = Vec::new();
    for v in values {
        for f in list {
            if &f.value_for(key).display() == v {
                out.push(f.clone());
            }
        }
    }
    out
}

/// `subtract(a, b)`: formats in `a` whose itag number does not appear in `b`.
pub fn subtract(a: &[Format], b: &[Format]) -> FormatList {
    a.iter()
        .filter(|f| !b.iter().any(|g| g.itag.number == f.itag.number))
        .cloned()
        .collect()
}

/// `sort(list, key, reverse)`: stable sort by `compare(key)`; `reverse=true`
/// puts the larger values first.
pub fn sort(list: &[Format], key: FormatKey, reverse: bool) -> FormatList {
    let mut out = list.to_vec();
    out.sort_by(|a, b| {
        let ord = a.compare_key(b, key);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
    out
}

/// `extremes(list, key, best)`: copy -> sort(key, best) -> take every format
/// tied with the head under `compare(key)`. Fewer than two elements are
/// returned unchanged.
pub fn extremes(list: &[Format], key: FormatKey, best: bool) -> FormatList {
    let mut dst = sort(list, key, best);
    if dst.len() > 1 {
        let mut i = 0;
        while i < dst.len() - 1 && dst[0].compare_key(&dst[i + 1], key) == std::cmp::Ordering::Equal
        {
            i += 1;
        }
        dst.truncate(i + 1);
    }
    dst
}

/// Sugar for `extremes(list, key, true)`.
pub fn best(list: &[Format], key: FormatKey) -> FormatList {
    extremes(list, key, true)
}

/// Sugar for `extremes(list, key, false)`.
pub fn worst(list: &[Format], key: FormatKey) -> FormatList {
    extremes(list, key, false)
}

/// Shallow copy.
pub fn copy(list: &[Format]) -> FormatList {
    list.to_vec()
}

/// Merge DASH-derived formats over an already-built list: formats whose
/// itag matches an existing entry replace it in place (last wins);
/// non-matching formats are appended, preserving order.
pub fn merge_dash(list: &mut FormatList, dash: FormatList) {
    for d in dash {
        if let Some(existing) = list.iter_mut().find(|f| f.itag.number == d.itag.number) {
            *existing = d;
        } else {
            list.push(d);
        }
    }
}

/// Drop every format whose itag number isn't in the static table, logging
/// at debug per-drop (see spec invariant: every Format's itag is present in
/// the itag table).
pub fn drop_unknown_itags(raw: Vec<(u32, Format)>) -> FormatList {
    raw.into_iter()
        .filter_map(|(number, format)| {
            if itag::lookup(number).is_some() {
                Some(format)
            } else {
                tracing::debug!(itag = number, "dropping format with unknown itag");
                None
            }
        })
        .collect()
}
