use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unsupported extractor")]
    UnsupportedExtractor,
    #[error("failed finding stream: {0}")]
    StreamMatchFailed(String),
    #[error("invalid stream type: '{0}' (no format handler)")]
    UnsupportedStreamType(String),
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    #[error("dash manifest error: {0}")]
    DashManifestError(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl ExtractorError {
    /// Whether the error describes a page or transport condition the caller
    /// may report and skip. `UnsupportedStreamType` and `ValidationError`
    /// signal contract violations and should abort instead.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::UnsupportedStreamType(_) | Self::ValidationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ExtractorError;

    #[test]
    fn test_expected_classification() {
        assert!(ExtractorError::StreamMatchFailed("no stream".into()).is_expected());
        assert!(ExtractorError::HlsPlaylistError("bad playlist".into()).is_expected());
        assert!(ExtractorError::DashManifestError("bad manifest".into()).is_expected());
        assert!(!ExtractorError::UnsupportedStreamType("vimeo".into()).is_expected());
    }
}
