//! Classification of the embedding strategy used by a videostream page.
//!
//! A page embeds its video in exactly one of four ways: a plain `<source>`
//! pointing at an MP4 file, a `<source>` pointing at an HLS playlist, a
//! Vimeo player container, or a script snippet assigning a DASH manifest to
//! the player. Detection is a fixed-order probe; the first detector that
//! matches wins.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::extractor::page::{PageDocument, PageElement};

const DIRECT_SOURCE_SELECTOR: &str = r#"source[type="video/mp4"]"#;
const HLS_SOURCE_SELECTOR: &str = r#"source[type="application/x-mpegURL"]"#;
const VIMEO_CONTAINER_SELECTOR: &str = r#"div[data-vimeo-id]"#;

/// Marker a script block must contain before it is searched for a manifest.
const DASH_PLAYER_MARKER: &str = "player.src";

static DASH_MANIFEST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://.+?/manifest\.mpd").unwrap());

/// Optional presentation hints copied off the Vimeo container, page
/// attribute name to match attribute name.
const VIMEO_HINT_ATTRS: &[(&str, &str)] = &[
    ("videoid", "video_id"),
    ("data-vimeo-width", "width"),
    ("data-vimeo-height", "height"),
    ("data-vimeo-responsive", "responsive"),
    ("data-vimeo-controls", "controls"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Plain progressive file, downloadable as-is.
    Direct,
    /// HLS playlist, resolved through the HLS collaborator.
    Hls,
    /// Vimeo embed, handed off to the Vimeo extractor.
    Vimeo,
    /// DASH manifest, resolved through the DASH collaborator.
    Dash,
}

impl StreamKind {
    pub fn as_str(&self) -> &str {
        match self {
            StreamKind::Direct => "direct",
            StreamKind::Hls => "hls",
            StreamKind::Vimeo => "vimeo",
            StreamKind::Dash => "dash",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful probe: what kind of embed the page uses and where
/// its media lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMatch {
    pub kind: StreamKind,
    /// Locator taken from the page: a source attribute, a script match, or
    /// the synthesized Vimeo watch url.
    pub url: String,
    /// Strategy-specific extras. For [`StreamKind::Vimeo`] this always
    /// carries `vimeo_id`.
    pub attributes: FxHashMap<String, String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("no supported stream found in page")]
    NoStreamFound,
    #[error("matched {kind} stream but attribute '{attribute}' is missing or invalid")]
    MalformedStream {
        kind: StreamKind,
        attribute: &'static str,
    },
}

type Detector = fn(&dyn PageDocument) -> Result<Option<StreamMatch>, MatchError>;

/// Probe order is significant: pages are expected to carry exactly one
/// embedding, but templates occasionally leave unused `<source>` tags
/// behind, and then the earlier detector wins the tie.
const DETECTORS: &[(StreamKind, Detector)] = &[
    (StreamKind::Direct, match_direct),
    (StreamKind::Hls, match_hls),
    (StreamKind::Vimeo, match_vimeo),
    (StreamKind::Dash, match_dash),
];

/// Runs every detector in order and returns the first match.
///
/// A [`MatchError::MalformedStream`] from a detector propagates immediately
/// instead of falling through, so a broken embed stays diagnosable. Pages
/// with no supported embedding fail with [`MatchError::NoStreamFound`].
pub fn match_stream(page: &dyn PageDocument) -> Result<StreamMatch, MatchError> {
    for (_, detector) in DETECTORS {
        if let Some(matched) = detector(page)? {
            return Ok(matched);
        }
    }
    Err(MatchError::NoStreamFound)
}

fn match_source(
    page: &dyn PageDocument,
    selector: &str,
    kind: StreamKind,
) -> Result<Option<StreamMatch>, MatchError> {
    let Some(source) = page.select_first(selector) else {
        return Ok(None);
    };

    let src = source
        .attr("src")
        .filter(|src| !src.is_empty())
        .ok_or(MatchError::MalformedStream {
            kind,
            attribute: "src",
        })?;

    Ok(Some(StreamMatch {
        kind,
        url: src.to_string(),
        attributes: FxHashMap::default(),
    }))
}

fn match_direct(page: &dyn PageDocument) -> Result<Option<StreamMatch>, MatchError> {
    match_source(page, DIRECT_SOURCE_SELECTOR, StreamKind::Direct)
}

fn match_hls(page: &dyn PageDocument) -> Result<Option<StreamMatch>, MatchError> {
    match_source(page, HLS_SOURCE_SELECTOR, StreamKind::Hls)
}

fn match_vimeo(page: &dyn PageDocument) -> Result<Option<StreamMatch>, MatchError> {
    let Some(container) = page.select_first(VIMEO_CONTAINER_SELECTOR) else {
        return Ok(None);
    };

    let vimeo_id = container
        .attr("data-vimeo-id")
        .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(MatchError::MalformedStream {
            kind: StreamKind::Vimeo,
            attribute: "data-vimeo-id",
        })?;

    Ok(Some(StreamMatch {
        kind: StreamKind::Vimeo,
        url: format!("https://vimeo.com/{vimeo_id}"),
        attributes: vimeo_attributes(&container, vimeo_id),
    }))
}

fn vimeo_attributes(container: &PageElement, vimeo_id: &str) -> FxHashMap<String, String> {
    let mut attributes = FxHashMap::default();
    attributes.insert("vimeo_id".to_string(), vimeo_id.to_string());
    for (page_attr, name) in VIMEO_HINT_ATTRS {
        if let Some(value) = container.attr(page_attr) {
            attributes.insert(name.to_string(), value.to_string());
        }
    }
    attributes
}

fn match_dash(page: &dyn PageDocument) -> Result<Option<StreamMatch>, MatchError> {
    for script in page.scripts() {
        if !script.contains(DASH_PLAYER_MARKER) {
            continue;
        }
        if let Some(manifest_url) = DASH_MANIFEST_REGEX.find(&script) {
            return Ok(Some(StreamMatch {
                kind: StreamKind::Dash,
                url: manifest_url.as_str().to_string(),
                attributes: FxHashMap::default(),
            }));
        }
    }
    Ok(None)
}
