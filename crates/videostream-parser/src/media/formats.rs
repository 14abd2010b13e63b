use serde::{Deserialize, Serialize};

/// One directly downloadable rendition of a media item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    /// Url of the rendition, absolute or relative to the page it came from.
    pub url: String,
    /// Identifier of the rendition, e.g. "direct", "hls-2560", "dash-audio".
    pub format_id: String,
    /// Container extension of the rendition, e.g. "mp4".
    pub ext: String,
}

/// Guesses the container extension from the path suffix of `url`.
///
/// Query string and fragment are ignored. Suffixes longer than five
/// characters or containing non-alphanumeric bytes are rejected and
/// `default_ext` is returned instead.
pub fn determine_ext(url: &str, default_ext: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext))
            if !ext.is_empty()
                && ext.len() <= 5
                && ext.bytes().all(|b| b.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => default_ext.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::determine_ext;

    #[test]
    fn test_determine_ext_from_path() {
        assert_eq!(determine_ext("https://host/path/video.mp4", "mp4"), "mp4");
        assert_eq!(determine_ext("https://host/path/video.WEBM", "mp4"), "webm");
        assert_eq!(determine_ext("https://host/media/clip.m4v?token=abc", "mp4"), "m4v");
    }

    #[test]
    fn test_determine_ext_falls_back_to_default() {
        // no suffix at all: the last '.' belongs to the hostname
        assert_eq!(determine_ext("https://stream.example.edu/42/video", "mp4"), "mp4");
        assert_eq!(determine_ext("https://host/download", "mp4"), "mp4");
        // suffix too long or not alphanumeric
        assert_eq!(determine_ext("https://host/file.backup-old", "mp4"), "mp4");
    }
}
