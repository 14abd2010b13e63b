use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::error::ExtractorError;
use crate::media::FormatInfo;

#[async_trait]
pub trait DashExtractor {
    /// Fetch a DASH MPD manifest and turn it into downloadable formats,
    /// one per `Representation`, named `<format_id_prefix>-<representation id>`.
    async fn extract_dash_formats(
        &self,
        client: &Client,
        mpd_url: &str,
        format_id_prefix: &str,
    ) -> Result<Vec<FormatInfo>, ExtractorError> {
        let base_url =
            Url::parse(mpd_url).map_err(|e| ExtractorError::DashManifestError(e.to_string()))?;

        debug!("fetching dash manifest: {}", mpd_url);

        let body = client.get(mpd_url).send().await?.text().await?;
        parse_mpd_formats(&body, &base_url, format_id_prefix)
    }
}

#[derive(Default)]
struct Representation {
    id: Option<String>,
    bandwidth: Option<u64>,
    mime_type: Option<String>,
    base_url: Option<String>,
}

/// Streaming parse of an MPD document. Only the pieces needed to enumerate
/// renditions are read: `Representation` attributes, the `mimeType`
/// inherited from the enclosing `AdaptationSet`, and `BaseURL` elements at
/// document, adaptation-set and representation level.
pub(crate) fn parse_mpd_formats(
    xml: &str,
    manifest_url: &Url,
    format_id_prefix: &str,
) -> Result<Vec<FormatInfo>, ExtractorError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut formats: Vec<FormatInfo> = Vec::new();
    let mut buf = Vec::new();

    let mut doc_base: Option<String> = None;
    let mut adaptation_base: Option<String> = None;
    let mut adaptation_mime: Option<String> = None;
    let mut in_adaptation = false;
    let mut in_base_url = false;
    let mut representation: Option<Representation> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"AdaptationSet" => {
                    in_adaptation = true;
                    adaptation_mime = attr_value(&e, "mimeType");
                    adaptation_base = None;
                }
                b"Representation" => {
                    representation = Some(read_representation(&e));
                }
                b"BaseURL" => in_base_url = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"Representation" => {
                    let rep = read_representation(&e);
                    push_format(
                        &mut formats,
                        rep,
                        adaptation_mime.as_deref(),
                        &[&doc_base, &adaptation_base],
                        manifest_url,
                        format_id_prefix,
                    );
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_base_url {
                    let text = t
                        .unescape()
                        .map_err(|e| ExtractorError::DashManifestError(e.to_string()))?
                        .into_owned();
                    if let Some(rep) = representation.as_mut() {
                        rep.base_url.get_or_insert(text);
                    } else if in_adaptation {
                        adaptation_base.get_or_insert(text);
                    } else {
                        doc_base.get_or_insert(text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"AdaptationSet" => {
                    in_adaptation = false;
                    adaptation_mime = None;
                    adaptation_base = None;
                }
                b"Representation" => {
                    if let Some(rep) = representation.take() {
                        push_format(
                            &mut formats,
                            rep,
                            adaptation_mime.as_deref(),
                            &[&doc_base, &adaptation_base],
                            manifest_url,
                            format_id_prefix,
                        );
                    }
                }
                b"BaseURL" => in_base_url = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractorError::DashManifestError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(formats)
}

fn read_representation(e: &BytesStart) -> Representation {
    Representation {
        id: attr_value(e, "id"),
        bandwidth: attr_value(e, "bandwidth").and_then(|v| v.parse().ok()),
        mime_type: attr_value(e, "mimeType"),
        base_url: None,
    }
}

fn push_format(
    formats: &mut Vec<FormatInfo>,
    rep: Representation,
    adaptation_mime: Option<&str>,
    outer_bases: &[&Option<String>],
    manifest_url: &Url,
    format_id_prefix: &str,
) {
    let mut url = manifest_url.clone();
    for base in outer_bases
        .iter()
        .filter_map(|base| base.as_deref())
        .chain(rep.base_url.as_deref())
    {
        if let Ok(joined) = url.join(base) {
            url = joined;
        }
    }

    let format_id = match (&rep.id, rep.bandwidth) {
        (Some(id), _) => format!("{format_id_prefix}-{id}"),
        (None, Some(bandwidth)) => format!("{format_id_prefix}-{}", bandwidth / 1000),
        (None, None) => format!("{format_id_prefix}-{}", formats.len()),
    };

    let mime = rep.mime_type.as_deref().or(adaptation_mime);
    formats.push(FormatInfo {
        url: url.to_string(),
        format_id,
        ext: ext_from_mime(mime).to_string(),
    });
}

fn attr_value(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .filter_map(|attr| attr.ok())
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn ext_from_mime(mime: Option<&str>) -> &'static str {
    match mime {
        Some(m) if m.contains("webm") => "webm",
        Some("audio/mp4") => "m4a",
        _ => "mp4",
    }
}
