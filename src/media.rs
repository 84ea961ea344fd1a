use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt as _, Snafu};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaService {
    #[serde(rename = "youtube")]
    YouTube,
    Spotify,
    AppleMusic,
    Unknown,
}

/// Guess which service a source url belongs to.
pub fn detect_service(source_url: &str) -> MediaService {
    let Ok(url) = url::Url::parse(source_url) else {
        return MediaService::Unknown;
    };

    match url.host_str() {
        Some("youtu.be" | "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com") => {
            MediaService::YouTube
        }
        Some("open.spotify.com" | "spotify.com") => MediaService::Spotify,
        Some("music.apple.com") => MediaService::AppleMusic,
        _ => MediaService::Unknown,
    }
}

pub fn parse_video_id(text: &str) -> Result<String, ParseVideoError> {
    // if text is not a url, return the text
    let Ok(url) = url::Url::parse(text) else {
        return Ok(text.to_string());
    };

    match url.host_str() {
        // youtu.be carries the id as the first path segment
        Some("youtu.be") => {
            let id = url
                .path_segments()
                .context(ExpectYouTubeUrlSnafu { text })?
                .next()
                .filter(|segment| !segment.is_empty())
                .context(MissingIdFragmentSnafu { text })?;
            Ok(id.to_string())
        }

        Some("youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com") => {
            // /embed/<id> carries the id as the second path segment
            let mut segments = url.path_segments().context(ExpectYouTubeUrlSnafu { text })?;
            if segments.next() == Some("embed") {
                let id = segments
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .context(MissingIdFragmentSnafu { text })?;
                return Ok(id.to_string());
            }

            let id = url
                .query_pairs()
                .find_map(|(key, value)| (key == "v").then_some(value))
                .filter(|value| !value.is_empty())
                .context(MissingIdFragmentSnafu { text })?;
            Ok(id.to_string())
        }

        _ => ExpectYouTubeUrlSnafu { text }.fail(),
    }
}

/// Track id of an `open.spotify.com/track/<id>` link.
pub fn parse_spotify_id(text: &str) -> Result<String, ParseVideoError> {
    let url = url::Url::parse(text)
        .ok()
        .filter(|url| {
            url.host_str()
                .is_some_and(|host| host == "spotify.com" || host.ends_with(".spotify.com"))
        })
        .context(ExpectSpotifyTrackSnafu { text })?;

    let id = url
        .path_segments()
        .context(ExpectSpotifyTrackSnafu { text })?
        .skip_while(|segment| *segment != "track")
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .context(MissingIdFragmentSnafu { text })?;

    Ok(id.to_string())
}

#[derive(Debug, Snafu, PartialEq)]
pub enum ParseVideoError {
    /// text is a valid url, but it's missing the id fragment
    #[snafu(display("`{text}` has no video id"))]
    MissingIdFragment { text: String },

    /// text is a url, but it doesn't point to youtube
    #[snafu(display("`{text}` is not a youtube url"))]
    ExpectYouTubeUrl { text: String },

    /// text is not a spotify url
    #[snafu(display("`{text}` is not a spotify track url"))]
    ExpectSpotifyTrack { text: String },
}

static ISO_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid regex"));

static COMPOUND_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("valid regex"));

/// Seconds in an ISO 8601 duration such as `PT1H2M3S`. Anything unparsable is `0`.
pub fn parse_iso_duration(duration: &str) -> u32 {
    let Some(captures) = ISO_DURATION.captures(duration) else {
        return 0;
    };

    hms_seconds(&captures)
}

/// Digit runs too long for a `u32` saturate instead of failing.
fn saturating_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(digits.parse().unwrap_or(u32::MAX))
}

fn hms_seconds(captures: &regex::Captures<'_>) -> u32 {
    let part = |i: usize| {
        captures
            .get(i)
            .and_then(|m| saturating_digits(m.as_str()))
            .unwrap_or(0)
    };

    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

/// Parse a `t`/`start` url parameter into a seek target in whole seconds.
///
/// Accepts YouTube's `1h2m3s` form, otherwise reads the leading digits the way
/// `parseInt` would (`"45s"` is `45`). Negative or digit-less input is `None`,
/// offsets past `u32::MAX` seconds clamp to it.
pub fn parse_start_param(param: &str) -> Option<u32> {
    let param = param.trim();

    if param.contains(&['h', 'm'][..]) {
        if let Some(captures) = COMPOUND_OFFSET.captures(param) {
            return Some(hms_seconds(&captures));
        }
    }

    let digits = param.strip_prefix('+').unwrap_or(param);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    saturating_digits(&digits[..end])
}

/// `m:ss`, or `h:mm:ss` once the offset passes an hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_youtube_url() {
        let result = parse_video_id("https://www.youtube.com/watch?v=12345");
        assert_eq!(result.as_deref(), Ok("12345"));
    }

    #[test]
    fn parse_youtube_url_with_other_queries() {
        let result = parse_video_id(
            "https://www.youtube.com/watch?list=some-playlist&v=12345&feature=emb_logo",
        );
        assert_eq!(result.as_deref(), Ok("12345"));
    }

    #[test]
    fn parse_youtube_short_url_with_timestamp() {
        let result = parse_video_id("https://youtu.be/12345?t=1");
        assert_eq!(result.as_deref(), Ok("12345"));
    }

    #[test]
    fn parse_music_and_mobile_hosts() {
        for url in [
            "https://music.youtube.com/watch?v=abc",
            "https://m.youtube.com/watch?v=abc",
        ] {
            assert_eq!(parse_video_id(url).as_deref(), Ok("abc"), "{url}");
        }
    }

    #[test]
    fn parse_embed_url() {
        let result = parse_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?start=30");
        assert_eq!(result.as_deref(), Ok("dQw4w9WgXcQ"));
        assert!(matches!(
            parse_video_id("https://www.youtube.com/embed/"),
            Err(ParseVideoError::MissingIdFragment { .. })
        ));
    }

    #[test]
    fn parse_spotify_track_url() {
        let result = parse_spotify_id("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=x");
        assert_eq!(result.as_deref(), Ok("4uLU6hMCjMI75M1A2tKUQC"));

        let localized = parse_spotify_id("https://open.spotify.com/intl-ja/track/abc");
        assert_eq!(localized.as_deref(), Ok("abc"));
    }

    #[test]
    fn spotify_links_without_a_track() {
        assert!(matches!(
            parse_spotify_id("https://open.spotify.com/album/abc"),
            Err(ParseVideoError::MissingIdFragment { .. })
        ));
        assert!(matches!(
            parse_spotify_id("https://www.youtube.com/track/abc"),
            Err(ParseVideoError::ExpectSpotifyTrack { .. })
        ));
        assert!(matches!(
            parse_spotify_id("abc"),
            Err(ParseVideoError::ExpectSpotifyTrack { .. })
        ));
    }

    #[test]
    fn parse_non_url_id() {
        assert_eq!(parse_video_id("12345").as_deref(), Ok("12345"));
    }

    #[test]
    fn throw_error_on_missing_id() {
        let text = "https://www.youtube.com/watch";
        assert_eq!(
            parse_video_id(text),
            Err(ParseVideoError::MissingIdFragment {
                text: text.to_string()
            })
        );
        assert!(matches!(
            parse_video_id("https://youtu.be/"),
            Err(ParseVideoError::MissingIdFragment { .. })
        ));
    }

    #[test]
    fn throw_error_on_non_youtube_url() {
        assert_eq!(
            parse_video_id("https://www.google.com"),
            Err(ParseVideoError::ExpectYouTubeUrl {
                text: "https://www.google.com".to_string()
            })
        );
    }

    #[test]
    fn detect_services() {
        assert_eq!(detect_service("https://youtu.be/abc"), MediaService::YouTube);
        assert_eq!(
            detect_service("https://open.spotify.com/track/123"),
            MediaService::Spotify
        );
        assert_eq!(
            detect_service("https://music.apple.com/us/album/x"),
            MediaService::AppleMusic
        );
        assert_eq!(detect_service("not a url"), MediaService::Unknown);
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso_duration("PT3M33S"), 213);
        assert_eq!(parse_iso_duration("PT1H"), 3600);
        assert_eq!(parse_iso_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso_duration("P1D"), 0);
        assert_eq!(parse_iso_duration(""), 0);
    }

    #[test]
    fn start_params() {
        assert_eq!(parse_start_param("45"), Some(45));
        assert_eq!(parse_start_param(" 45s"), Some(45));
        assert_eq!(parse_start_param("1m30s"), Some(90));
        assert_eq!(parse_start_param("1h2m3s"), Some(3723));
        assert_eq!(parse_start_param("2m"), Some(120));
        assert_eq!(parse_start_param("abc"), None);
        assert_eq!(parse_start_param("-5"), None);
        assert_eq!(parse_start_param(""), None);
    }

    #[test]
    fn oversized_start_params_saturate() {
        assert_eq!(parse_start_param("99999999999"), Some(u32::MAX));
        assert_eq!(parse_start_param("99999999999s"), Some(u32::MAX));
        assert_eq!(parse_start_param("99999999999h"), Some(u32::MAX));
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.9), "1:05");
        assert_eq!(format_timestamp(3723.0), "1:02:03");
    }
}
