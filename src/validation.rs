//! Form input and the checks that gate an insert.

use serde::Deserialize;
use thiserror::Error;

use crate::submission_store::NewSubmission;

/// Link kinds accepted after `spotify.com/`.
const SPOTIFY_KINDS: &[&str] = &["track", "album", "playlist"];

/// Raw form input as typed by the visitor.
///
/// Missing fields deserialize as empty strings so they fail validation with
/// the field-specific message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionForm {
    pub name: String,
    #[serde(alias = "songName")]
    pub song_name: String,
    #[serde(alias = "spotifyLink")]
    pub spotify_link: String,
}

/// Why a form was refused. The display text is what the visitor sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter a song name")]
    MissingSongName,

    #[error("Please enter a Spotify link")]
    MissingSpotifyLink,

    #[error("Please enter a valid Spotify link")]
    InvalidSpotifyLink,
}

/// A form that passed validation, with every field trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub song_name: String,
    pub spotify_link: String,
}

impl SubmissionForm {
    /// Checks the fields in form order; the first failure wins.
    pub fn validate(&self) -> Result<ValidSubmission, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let song_name = self.song_name.trim();
        if song_name.is_empty() {
            return Err(ValidationError::MissingSongName);
        }

        let spotify_link = self.spotify_link.trim();
        if spotify_link.is_empty() {
            return Err(ValidationError::MissingSpotifyLink);
        }

        // Pattern runs on the link as typed; only the stored value is trimmed.
        if !is_valid_spotify_link(&self.spotify_link) {
            return Err(ValidationError::InvalidSpotifyLink);
        }

        Ok(ValidSubmission {
            name: name.to_string(),
            song_name: song_name.to_string(),
            spotify_link: spotify_link.to_string(),
        })
    }
}

impl ValidSubmission {
    /// Attaches the visitor's session id, giving the row to insert.
    pub fn into_new_submission(self, session_id: Option<String>) -> NewSubmission {
        NewSubmission {
            name: self.name,
            song_name: self.song_name,
            spotify_link: self.spotify_link,
            session_id,
        }
    }
}

/// Matches `https://(open.)?spotify.com/(track|album|playlist)/` followed by
/// at least one character that is not a line break.
pub fn is_valid_spotify_link(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("https://") else {
        return false;
    };
    let rest = rest.strip_prefix("open.").unwrap_or(rest);
    let Some(rest) = rest.strip_prefix("spotify.com/") else {
        return false;
    };

    SPOTIFY_KINDS.iter().any(|kind| {
        rest.strip_prefix(kind)
            .and_then(|tail| tail.strip_prefix('/'))
            .and_then(|id| id.chars().next())
            .is_some_and(|first| !matches!(first, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, song_name: &str, spotify_link: &str) -> SubmissionForm {
        SubmissionForm {
            name: name.to_string(),
            song_name: song_name.to_string(),
            spotify_link: spotify_link.to_string(),
        }
    }

    #[test]
    fn test_valid_spotify_links() {
        assert!(is_valid_spotify_link("https://open.spotify.com/track/abc123"));
        assert!(is_valid_spotify_link("https://spotify.com/album/xyz"));
        assert!(is_valid_spotify_link(
            "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=1"
        ));
    }

    #[test]
    fn test_invalid_spotify_links() {
        assert!(!is_valid_spotify_link("https://soundcloud.com/x"));
        assert!(!is_valid_spotify_link("http://open.spotify.com/track/abc"));
        assert!(!is_valid_spotify_link("https://open.spotify.com/artist/abc"));
        assert!(!is_valid_spotify_link("https://open.spotify.com/track/"));
        assert!(!is_valid_spotify_link("https://open.spotify.com/track"));
        assert!(!is_valid_spotify_link("https://www.spotify.com/track/abc"));
        assert!(!is_valid_spotify_link("https://open.spotify.com/track/\nabc"));
        assert!(!is_valid_spotify_link("open.spotify.com/track/abc"));
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(form("", "", "").validate(), Err(ValidationError::MissingName));
        assert_eq!(
            form("Alex", "  ", "").validate(),
            Err(ValidationError::MissingSongName)
        );
        assert_eq!(
            form("Alex", "Nightcall", "\t").validate(),
            Err(ValidationError::MissingSpotifyLink)
        );
        assert_eq!(
            form("Alex", "Nightcall", "https://soundcloud.com/x").validate(),
            Err(ValidationError::InvalidSpotifyLink)
        );
    }

    #[test]
    fn test_whitespace_only_name_is_rejected() {
        let err = form("   ", "Nightcall", "https://open.spotify.com/track/abc123")
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name");
    }

    #[test]
    fn test_leading_whitespace_link_is_rejected() {
        assert_eq!(
            form("Alex", "Nightcall", "  https://open.spotify.com/track/abc123").validate(),
            Err(ValidationError::InvalidSpotifyLink)
        );
    }

    #[test]
    fn test_trailing_whitespace_link_is_trimmed() {
        let valid = form(
            "  Alex ",
            " Nightcall",
            "https://open.spotify.com/track/abc123  \n",
        )
        .validate()
        .unwrap();

        assert_eq!(valid.name, "Alex");
        assert_eq!(valid.song_name, "Nightcall");
        assert_eq!(valid.spotify_link, "https://open.spotify.com/track/abc123");
    }

    #[test]
    fn test_form_accepts_camel_case_fields() {
        let parsed: SubmissionForm = serde_json::from_str(
            r#"{"name":"Alex","songName":"Nightcall","spotifyLink":"https://open.spotify.com/track/abc123"}"#,
        )
        .unwrap();
        assert_eq!(parsed.song_name, "Nightcall");

        let partial: SubmissionForm = serde_json::from_str(r#"{"name":"Alex"}"#).unwrap();
        assert_eq!(partial.validate(), Err(ValidationError::MissingSongName));
    }
}
