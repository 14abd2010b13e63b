use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, Playlist};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::error::ExtractorError;
use crate::media::FormatInfo;

#[async_trait]
pub trait HlsExtractor {
    /// Fetch an HLS playlist and turn it into downloadable formats.
    ///
    /// A master playlist yields one format per variant, named
    /// `<format_id_prefix>-<bandwidth in kbps>`; a plain media playlist
    /// yields a single format under `format_id_prefix`. `video_id` is only
    /// used to key the request in logs.
    async fn extract_hls_formats(
        &self,
        client: &Client,
        headers: Option<reqwest::header::HeaderMap>,
        m3u8_url: &str,
        video_id: &str,
        format_id_prefix: &str,
    ) -> Result<Vec<FormatInfo>, ExtractorError> {
        let base_url =
            Url::parse(m3u8_url).map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

        debug!("fetching hls manifest for {}: {}", video_id, m3u8_url);

        let response = client
            .get(m3u8_url)
            .headers(headers.unwrap_or_default())
            .send()
            .await?
            .bytes()
            .await?;
        let playlist = m3u8_rs::parse_playlist_res(&response)
            .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

        let formats = match playlist {
            Playlist::MasterPlaylist(pl) => {
                process_master_playlist(pl, &base_url, format_id_prefix)
            }
            Playlist::MediaPlaylist(_) => vec![FormatInfo {
                url: m3u8_url.to_string(),
                format_id: format_id_prefix.to_string(),
                ext: "mp4".to_string(),
            }],
        };

        Ok(formats)
    }
}

pub(crate) fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    format_id_prefix: &str,
) -> Vec<FormatInfo> {
    playlist
        .variants
        .into_iter()
        .filter_map(|variant| {
            let stream_url = base_url.join(&variant.uri).ok()?;
            let bitrate = variant.bandwidth / 1000;

            Some(FormatInfo {
                url: stream_url.to_string(),
                format_id: format!("{format_id_prefix}-{bitrate}"),
                ext: "mp4".to_string(),
            })
        })
        .collect()
}
