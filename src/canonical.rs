//! Deterministic identity for "the same song" across services and uploads.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[(\[].*?[)\]]").expect("valid regex"));

static UPLOAD_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(official video|official audio|lyrics|video|audio)\s*$").expect("valid regex")
});

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").expect("valid regex"));

/// Lowercase, drop bracketed extras and upload suffixes, keep only `[a-z0-9]`.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let text = BRACKETED.replace_all(&lower, "");
    let text = UPLOAD_SUFFIX.replace_all(&text, "");
    NON_ALPHANUMERIC.replace_all(&text, "").into_owned()
}

/// `can_` followed by the first 16 hex digits of the sha256 of the normalized pair.
pub fn canonical_id(artist: &str, title: &str) -> String {
    let or_unknown = |text: &str| if text.is_empty() { "unknown".to_string() } else { text.to_string() };

    let key = format!(
        "{}_{}",
        normalize(&or_unknown(artist)),
        normalize(&or_unknown(title))
    );
    let digest = Sha256::digest(key.as_bytes());

    format!("can_{}", &hex::encode(digest)[..16])
}

pub fn same_track(a: (&str, &str), b: (&str, &str)) -> bool {
    canonical_id(a.0, a.1) == canonical_id(b.0, b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize("Hey Jude (Remastered 2015)"), "heyjude");
        assert_eq!(normalize("The Beatles"), "thebeatles");
        assert_eq!(normalize("Bohemian Rhapsody [Official Video]"), "bohemianrhapsody");
        assert_eq!(normalize("Yellow Official Video"), "yellow");
        assert_eq!(normalize("Clocks lyrics"), "clocks");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn canonical_id_shape() {
        let id = canonical_id("The Beatles", "Hey Jude");
        assert!(id.starts_with("can_"));
        assert_eq!(id.len(), 4 + 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn uploads_of_the_same_song_match() {
        assert!(same_track(
            ("The Beatles", "Hey Jude"),
            ("the beatles", "Hey Jude (Official Video)")
        ));
        assert!(!same_track(("The Beatles", "Hey Jude"), ("The Beatles", "Yesterday")));
    }

    #[test]
    fn missing_fields_become_unknown() {
        assert_eq!(canonical_id("", ""), canonical_id("Unknown", "unknown"));
    }
}
