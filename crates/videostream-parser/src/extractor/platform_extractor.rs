use crate::extractor::default::DEFAULT_UA;
use crate::media::ExtractionResult;

use super::error::ExtractorError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use rustc_hash::FxHashMap;
use std::str::FromStr;
use tracing::debug;

/// Base extractor shared by all platform implementations.
///
/// Holds the HTTP client plus the platform-specific headers, query
/// parameters and cookies that every request from this extractor carries.
/// Each extractor instance owns its own cookie store, so sessions never
/// leak between concurrent extractions.
#[derive(Debug, Clone)]
pub struct Extractor {
    // url to extract from, e.g., "https://lms.example.edu/mod/videostream/view.php?id=42"
    pub url: String,
    // name of the platform, e.g., "VideoStream"
    pub platform_name: String,
    pub client: Client,
    platform_headers: HeaderMap,
    pub platform_params: FxHashMap<String, String>,
    pub cookies: FxHashMap<String, String>,
}

impl Extractor {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        platform_name: S1,
        platform_url: S2,
        client: Client,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(reqwest::header::USER_AGENT, DEFAULT_UA.parse().unwrap());
        default_headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.9".parse().unwrap(),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            "gzip, deflate".parse().unwrap(),
        );

        Self {
            platform_name: platform_name.into(),
            url: platform_url.into(),
            client,
            platform_headers: default_headers,
            platform_params: FxHashMap::default(),
            cookies: FxHashMap::default(),
        }
    }

    pub fn add_header<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.platform_headers.insert(
            HeaderName::from_str(&key.into()).unwrap(),
            HeaderValue::from_str(&value.into()).unwrap(),
        );
    }

    pub fn add_param<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.platform_params.insert(key.into(), value.into());
    }

    pub fn add_cookie<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Set cookies from a cookie string (format: "name1=value1; name2=value2").
    /// Useful for importing a browser session, e.g. a Moodle login.
    pub fn set_cookies_from_string(&mut self, cookie_string: &str) {
        for cookie in cookie_string.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    fn build_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let cookie_string = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Some(cookie_string)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Create an HTTP request carrying the platform headers, stored cookies
    /// and platform query parameters.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let cookies = self
            .build_cookie_header()
            .and_then(|header| {
                HeaderValue::from_str(&header)
                    .inspect(|value| debug!("adding cookies to request: {:?}", value))
                    .ok()
            })
            .unwrap_or_else(|| HeaderValue::from_static(""));

        self.client
            .request(method, url)
            .headers(self.platform_headers.clone())
            .header(reqwest::header::COOKIE, cookies)
            .query(&self.platform_params)
    }

    pub fn get_platform_headers(&self) -> &HeaderMap {
        &self.platform_headers
    }
}

#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    fn get_extractor(&self) -> &Extractor;

    fn get_platform_headers(&self) -> &HeaderMap {
        self.get_extractor().get_platform_headers()
    }

    async fn extract(&self) -> Result<ExtractionResult, ExtractorError>;
}
