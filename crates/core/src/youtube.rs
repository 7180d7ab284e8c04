use serde::{Deserialize, Serialize};
use url::Url;

pub const VIDEO_ID_LEN: usize = 11;

const YOUTUBE_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];
const SHORT_HOST: &str = "youtu.be";

/// A YouTube link that passed validation, plus its extracted video id.
/// Construction goes through [`parse`]; the fields never change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    id: String,
}

impl VideoReference {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("not a valid url: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("not a youtube url: {0}")]
    NotYoutube(String),
    #[error("unrecognized youtube url shape: {0}")]
    UnrecognizedShape(String),
    #[error("video id must be {VIDEO_ID_LEN} characters of [A-Za-z0-9_-], got {0:?}")]
    BadVideoId(String),
}

/// Validates a raw input string as a YouTube video link and extracts the
/// 11-character video id. Recognized shapes: `watch?v=`, `youtu.be/<id>`,
/// `/shorts/<id>` and `/embed/<id>`. A missing scheme is tolerated by
/// retrying with `https://` prepended.
pub fn parse(input: &str) -> Result<VideoReference, UrlError> {
    let trimmed = input.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}"))?,
        Err(e) => return Err(UrlError::Invalid(e)),
    };

    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::NotYoutube(trimmed.to_owned()))?;

    let candidate = if host.eq_ignore_ascii_case(SHORT_HOST) {
        first_path_segment(&parsed)
    } else if YOUTUBE_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
        extract_from_long_form(&parsed)
    } else {
        return Err(UrlError::NotYoutube(trimmed.to_owned()));
    };

    let id = candidate.ok_or_else(|| UrlError::UnrecognizedShape(trimmed.to_owned()))?;
    if !is_valid_video_id(&id) {
        return Err(UrlError::BadVideoId(id));
    }

    Ok(VideoReference {
        url: parsed.to_string(),
        id,
    })
}

fn extract_from_long_form(parsed: &Url) -> Option<String> {
    match parsed.path() {
        "/watch" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        _ => {
            let mut segments = parsed.path_segments()?;
            match segments.next()? {
                "shorts" | "embed" => segments.next().map(str::to_owned),
                _ => None,
            }
        }
    }
}

fn first_path_segment(parsed: &Url) -> Option<String> {
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next().map(str::to_owned))
        .filter(|s| !s.is_empty())
}

fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
