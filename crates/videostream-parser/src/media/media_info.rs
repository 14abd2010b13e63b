use super::formats::FormatInfo;
use serde::{Deserialize, Serialize};

/// Resolved media item, ready to be handed to a download pipeline.
///
/// # Fields
///
/// * `id` - Numeric activity id taken from the page url
/// * `title` - Human readable title derived from the page markup
/// * `formats` - Available renditions, one entry per downloadable format
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub formats: Vec<FormatInfo>,
}

/// Hand-off to another extractor when the page only embeds a third-party
/// player. The caller is expected to dispatch `url` to the extractor named
/// by `extractor`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RedirectInfo {
    pub url: String,
    /// Name of the external extractor that should handle `url`, e.g. "Vimeo".
    pub extractor: String,
    pub id: String,
}

/// Final outcome of one extraction call.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ExtractionResult {
    /// Media resolved locally, formats included.
    Media(MediaInfo),
    /// Page embeds a third-party player; resolution is delegated.
    Redirect(RedirectInfo),
}
