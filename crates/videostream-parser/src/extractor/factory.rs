use std::sync::LazyLock;

use super::error::ExtractorError;
use super::platform_extractor::PlatformExtractor;
use crate::extractor::platforms::videostream::{self, VideoStream};
use regex::Regex;
use reqwest::Client;

// A type alias for a thread-safe constructor function.
type ExtractorConstructor =
    fn(String, Client, Option<String>, Option<serde_json::Value>) -> Box<dyn PlatformExtractor>;

struct PlatformEntry {
    regex: &'static LazyLock<Regex>,
    constructor: ExtractorConstructor,
}

fn new_videostream(
    url: String,
    client: Client,
    cookies: Option<String>,
    extras: Option<serde_json::Value>,
) -> Box<dyn PlatformExtractor> {
    Box::new(VideoStream::new(url, client, cookies, extras))
}

// Static platform registry, matched in order.
static PLATFORMS: &[PlatformEntry] = &[PlatformEntry {
    regex: &videostream::URL_REGEX,
    constructor: new_videostream,
}];

/// A factory for creating platform-specific extractors.
pub struct ExtractorFactory {
    client: Client,
}

impl ExtractorFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create_extractor(
        &self,
        url: &str,
        cookies: Option<String>,
        extras: Option<serde_json::Value>,
    ) -> Result<Box<dyn PlatformExtractor>, ExtractorError> {
        for platform in PLATFORMS {
            if platform.regex.is_match(url) {
                return Ok((platform.constructor)(
                    url.to_string(),
                    self.client.clone(),
                    cookies,
                    extras,
                ));
            }
        }
        Err(ExtractorError::UnsupportedExtractor)
    }
}

#[cfg(test)]
mod tests {
    use crate::extractor::{default_factory, error::ExtractorError};

    #[test]
    fn test_factory_routes_videostream_urls() {
        let factory = default_factory();
        let extractor = factory
            .create_extractor(
                "https://lms.example.edu/course/mod/videostream/view.php?id=42",
                None,
                None,
            )
            .unwrap();
        assert_eq!(extractor.get_extractor().platform_name, "VideoStream");
    }

    #[test]
    fn test_factory_rejects_foreign_urls() {
        let factory = default_factory();
        let result = factory.create_extractor("https://example.com/watch?v=42", None, None);
        assert!(matches!(result, Err(ExtractorError::UnsupportedExtractor)));
    }
}
