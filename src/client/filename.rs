//! Filename derivation for exported images
//!
//! Archive entry names are derived deterministically from each item's
//! creation timestamp, its sanitized title, and the response content-type.
//! No path separators or control characters survive sanitization.

use chrono::{DateTime, TimeZone, Utc};

/// Folder inside the archive holding the image entries
const IMAGE_FOLDER: &str = "images";

/// Maximum length of the sanitized title portion
const MAX_TITLE_LEN: usize = 60;

/// Fallback extension when the content-type carries no usable subtype
const DEFAULT_EXTENSION: &str = "jpg";

/// Reduce a display title to a filename-safe fragment
///
/// Runs of characters outside `[A-Za-z0-9._-]` collapse to a single `_`,
/// leading/trailing underscores are trimmed, and the result is capped at 60
/// characters. `"A/B: C"` becomes `"A_B_C"`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(MAX_TITLE_LEN));

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
        if out.len() >= MAX_TITLE_LEN {
            break;
        }
    }

    out.trim_matches('_').to_string()
}

/// Zero-padded 14-digit UTC datetime prefix for an epoch-seconds timestamp
///
/// Timestamps chrono cannot represent fall back to the epoch.
#[must_use]
pub fn datetime_prefix(created_at: i64) -> String {
    let datetime = Utc
        .timestamp_opt(created_at, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    datetime.format("%Y%m%d%H%M%S").to_string()
}

/// File extension derived from a response content-type
///
/// Explicit mapping for the common image types, then the content-type's
/// subtype, then `"jpg"`.
#[must_use]
pub fn extension_for(content_type: Option<&str>) -> String {
    let Some(content_type) = content_type else {
        return DEFAULT_EXTENSION.to_string();
    };

    // Drop any parameters ("image/png; charset=binary")
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        _ => match essence.split('/').nth(1).filter(|s| !s.is_empty()) {
            Some(subtype) => subtype.to_string(),
            None => DEFAULT_EXTENSION.to_string(),
        },
    }
}

/// Archive entry name for one exported image
///
/// `images/<14-digit datetime>_<sanitized title>.<ext>`, with the title part
/// omitted entirely when sanitization leaves nothing.
#[must_use]
pub fn image_filename(created_at: i64, title: &str, content_type: Option<&str>) -> String {
    let prefix = datetime_prefix(created_at);
    let ext = extension_for(content_type);
    let name = sanitize_title(title);

    if name.is_empty() {
        format!("{IMAGE_FOLDER}/{prefix}.{ext}")
    } else {
        format!("{IMAGE_FOLDER}/{prefix}_{name}.{ext}")
    }
}

/// Download filename for the finished archive
///
/// Embeds the current timestamp and the workspace scope, e.g.
/// `chat-images-personal-20240601-120000.zip`.
#[must_use]
pub fn archive_filename(team_scope: bool, now: DateTime<Utc>) -> String {
    let scope = if team_scope { "team" } else { "personal" };
    format!(
        "chat-images-{scope}-{}.zip",
        now.format("%Y%m%d-%H%M%S")
    )
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_runs_of_bad_characters() {
        assert_eq!(sanitize_title("A/B: C"), "A_B_C");
        assert_eq!(sanitize_title("hello world"), "hello_world");
        assert_eq!(sanitize_title("a//b::c"), "a_b_c");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_title("photo-01.final_v2"), "photo-01.final_v2");
    }

    #[test]
    fn sanitize_strips_path_separators_and_controls() {
        let sanitized = sanitize_title("../etc/passwd\n\0");
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.contains('\\'));
        assert!(sanitized.chars().all(|c| !c.is_control()));
    }

    #[test]
    fn sanitize_trims_edge_underscores() {
        assert_eq!(sanitize_title("  padded  "), "padded");
        assert_eq!(sanitize_title("???"), "");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(500);
        assert!(sanitize_title(&long).len() <= 60);
    }

    #[test]
    fn sanitize_is_deterministic() {
        let title = "Sunset over the B/W: harbor";
        assert_eq!(sanitize_title(title), sanitize_title(title));
    }

    #[test]
    fn datetime_prefix_is_fourteen_digits() {
        let prefix = datetime_prefix(1700000000);
        assert_eq!(prefix, "20231114221320");
        assert_eq!(prefix.len(), 14);
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn datetime_prefix_handles_epoch() {
        assert_eq!(datetime_prefix(0), "19700101000000");
    }

    #[test]
    fn extension_mapping_for_known_types() {
        assert_eq!(extension_for(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(Some("image/jpg")), "jpg");
        assert_eq!(extension_for(Some("image/png")), "png");
        assert_eq!(extension_for(Some("image/gif")), "gif");
        assert_eq!(extension_for(Some("image/webp")), "webp");
    }

    #[test]
    fn extension_falls_back_to_subtype() {
        assert_eq!(extension_for(Some("image/avif")), "avif");
        assert_eq!(extension_for(Some("image/png; charset=binary")), "png");
    }

    #[test]
    fn extension_defaults_to_jpg() {
        assert_eq!(extension_for(None), "jpg");
        assert_eq!(extension_for(Some("")), "jpg");
        assert_eq!(extension_for(Some("garbage")), "jpg");
    }

    #[test]
    fn image_filename_matches_expected_pattern() {
        let name = image_filename(1700000000, "A/B: C", Some("image/png"));
        assert_eq!(name, "images/20231114221320_A_B_C.png");
    }

    #[test]
    fn image_filename_without_title_omits_separator() {
        let name = image_filename(1700000000, "", Some("image/jpeg"));
        assert_eq!(name, "images/20231114221320.jpg");

        // A title that sanitizes to nothing behaves the same
        let name = image_filename(1700000000, "???", Some("image/jpeg"));
        assert_eq!(name, "images/20231114221320.jpg");
    }

    #[test]
    fn archive_filename_embeds_scope_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(
            archive_filename(false, now),
            "chat-images-personal-20240601-120000.zip"
        );
        assert_eq!(
            archive_filename(true, now),
            "chat-images-team-20240601-120000.zip"
        );
    }
}
