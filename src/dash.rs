//! DASH MPD manifest parsing: pull `Representation` elements (id/height/
//! BaseURL) out of a DASH manifest, feeding [`crate::parse::from_dash_representation`].

use crate::error::RytError;
use crate::parse::DashRepresentation;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct Mpd {
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Clone, Deserialize)]
struct Period {
    #[serde(rename = "AdaptationSet", default)]
    adaptation_sets: Vec<AdaptationSet>,
}

#[derive(Debug, Clone, Deserialize)]
struct AdaptationSet {
    #[serde(rename = "Representation", default)]
    representations: Vec<RawRepresentation>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRepresentation {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "@height", default)]
    height: u32,
    #[serde(rename = "BaseURL", default)]
    base_url: String,
}

/// Flatten every `Representation` across every `Period`/`AdaptationSet` in
/// an MPD document into [`DashRepresentation`]s.
pub fn parse_representations(xml: &str) -> Result<Vec<DashRepresentation>, RytError> {
    let mpd: Mpd = quick_xml::de::from_str(xml)?;
    Ok(mpd
        .periods
        .into_iter()
        .flat_map(|p| p.adaptation_sets)
        .flat_map(|a| a.representations)
        .map(|r| DashRepresentation {
            id: r.id,
            height: r.height,
            base_url: r.base_url,
        })
        .collect())
}
