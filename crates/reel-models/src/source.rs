//! Video source classification.
//!
//! Maps an arbitrary, user-supplied URL to a [`VideoSourceDescriptor`] that
//! tells the playback layer whether the source can be handed straight to a
//! native decoder or has to go through an embedded provider page.
//!
//! Classification is an ordered table of [`SourceRule`]s evaluated first match
//! wins. Order matters: provider domains would otherwise also match the weaker
//! generic heuristics further down the table.
//!
//! # Guarantees
//! - Pure: no I/O, no side effects, same input gives the same output
//! - Total: every input yields a descriptor, blank input yields `Unknown`

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Embed page template prefix for YouTube videos.
pub const YOUTUBE_EMBED_PREFIX: &str = "https://www.youtube.com/embed/";

/// Embed page template prefix for Vimeo videos.
pub const VIMEO_EMBED_PREFIX: &str = "https://player.vimeo.com/video/";

/// Direct content download endpoint for Google Drive files.
pub const DRIVE_DOWNLOAD_PREFIX: &str = "https://www.googleapis.com/drive/v3/files/";

/// YouTube video IDs are always exactly this long.
pub const YOUTUBE_ID_LEN: usize = 11;

const YOUTUBE_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];
const VIMEO_DOMAIN: &str = "vimeo.com";
const TUBI_DOMAIN: &str = "tubitv.com";
const ARCHIVE_DOMAIN: &str = "archive.org";
const DRIVE_DOMAIN: &str = "drive.google.com";

static YOUTUBE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(?i:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("valid youtube id pattern")
});

static VIMEO_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:vimeo\.com/)(\d+)").expect("valid vimeo id pattern"));

static DRIVE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([^/]+)/").expect("valid drive id pattern"));

// ============================================================================
// Output Types
// ============================================================================

/// Classification of a video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Muxed container file a native decoder can open directly
    DirectFile,
    /// HLS manifest
    HttpLiveStream,
    /// YouTube watch/short/embed link
    Youtube,
    /// Vimeo link
    Vimeo,
    /// Tubi streaming page
    Tubi,
    /// Google Drive share link (reserved: resolvable links report `DirectFile`)
    Drive,
    /// Any other page, rendered through an embedded web view
    GenericWeb,
    /// Blank input
    Unknown,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::DirectFile => "direct-file",
            SourceKind::HttpLiveStream => "http-live-stream",
            SourceKind::Youtube => "youtube",
            SourceKind::Vimeo => "vimeo",
            SourceKind::Tubi => "tubi",
            SourceKind::Drive => "drive",
            SourceKind::GenericWeb => "generic-web",
            SourceKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a source URL.
///
/// Exactly one of `playable_url` (non-empty) or `embed_url` is populated for
/// every kind except `Unknown`, which populates neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSourceDescriptor {
    pub kind: SourceKind,

    /// URL a native decoder can play; empty unless directly playable
    pub playable_url: String,

    /// Provider embed page or web page to load in a web view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,

    /// Provider-specific video identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl VideoSourceDescriptor {
    /// Descriptor for blank input.
    pub fn unknown() -> Self {
        Self {
            kind: SourceKind::Unknown,
            playable_url: String::new(),
            embed_url: None,
            provider_id: None,
        }
    }

    /// Descriptor for a source a native decoder can open.
    pub fn playable(kind: SourceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            playable_url: url.into(),
            embed_url: None,
            provider_id: None,
        }
    }

    /// Descriptor for a source that needs an embedded page.
    pub fn embedded(kind: SourceKind, embed_url: impl Into<String>, provider_id: Option<String>) -> Self {
        Self {
            kind,
            playable_url: String::new(),
            embed_url: Some(embed_url.into()),
            provider_id,
        }
    }

    /// Whether the source can be handed to a native video decoder.
    pub fn is_natively_playable(&self) -> bool {
        !self.playable_url.is_empty()
    }

    /// Whether the source must be rendered through a web view.
    pub fn needs_embed(&self) -> bool {
        self.embed_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// Pre-parsed view of the input shared by every rule.
struct SourceInput<'a> {
    /// Trimmed original input, used verbatim in outputs
    raw: &'a str,
    /// Lowercased copy for case-insensitive tests
    lower: String,
    /// Parsed URL when the input is absolute
    parsed: Option<Url>,
}

impl<'a> SourceInput<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_ascii_lowercase(),
            parsed: Url::parse(raw).ok(),
        }
    }

    /// Host equals `domain` or is a subdomain of it. Scheme-less input
    /// (e.g. `youtu.be/ID`) falls back to a substring test.
    fn host_is(&self, domain: &str) -> bool {
        match self.parsed.as_ref().and_then(|u| u.host_str()) {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                host == domain
                    || host
                        .strip_suffix(domain)
                        .is_some_and(|rest| rest.ends_with('.'))
            }
            None => self.lower.contains(domain),
        }
    }

    fn path_lower(&self) -> String {
        match self.parsed.as_ref() {
            Some(url) => url.path().to_ascii_lowercase(),
            None => self
                .lower
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// One entry of the classification table.
///
/// `resolve` returning `None` means the rule matched but could not produce a
/// descriptor, and evaluation continues with the next rule.
pub struct SourceRule {
    name: &'static str,
    matches: fn(&SourceInput<'_>) -> bool,
    resolve: fn(&SourceInput<'_>) -> Option<VideoSourceDescriptor>,
}

impl SourceRule {
    /// Rule name, for logging and tests.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate this rule alone against a (trimmed) input.
    pub fn apply(&self, input: &str) -> Option<VideoSourceDescriptor> {
        let input = SourceInput::new(input.trim());
        self.evaluate(&input)
    }

    fn evaluate(&self, input: &SourceInput<'_>) -> Option<VideoSourceDescriptor> {
        if (self.matches)(input) {
            (self.resolve)(input)
        } else {
            None
        }
    }
}

static SOURCE_RULES: [SourceRule; 7] = [
    SourceRule {
        name: "direct-file",
        matches: |i| i.lower.ends_with(".mp4") || i.lower.contains(".mp4?"),
        resolve: |i| Some(VideoSourceDescriptor::playable(SourceKind::DirectFile, i.raw)),
    },
    SourceRule {
        name: "http-live-stream",
        matches: |i| i.lower.contains(".m3u8"),
        resolve: |i| Some(VideoSourceDescriptor::playable(SourceKind::HttpLiveStream, i.raw)),
    },
    SourceRule {
        name: "youtube",
        matches: |i| YOUTUBE_DOMAINS.iter().any(|d| i.host_is(d)),
        resolve: resolve_youtube,
    },
    SourceRule {
        name: "vimeo",
        matches: |i| i.host_is(VIMEO_DOMAIN),
        resolve: resolve_vimeo,
    },
    SourceRule {
        name: "tubi",
        matches: |i| i.host_is(TUBI_DOMAIN),
        resolve: |i| Some(VideoSourceDescriptor::embedded(SourceKind::Tubi, i.raw, None)),
    },
    SourceRule {
        name: "archive",
        matches: |i| i.host_is(ARCHIVE_DOMAIN),
        resolve: resolve_archive,
    },
    SourceRule {
        name: "drive",
        matches: |i| i.host_is(DRIVE_DOMAIN),
        resolve: resolve_drive,
    },
];

/// The classification table in priority order.
pub fn source_rules() -> &'static [SourceRule] {
    &SOURCE_RULES
}

fn resolve_youtube(input: &SourceInput<'_>) -> Option<VideoSourceDescriptor> {
    let descriptor = match extract_youtube_id(input.raw) {
        Some(id) => VideoSourceDescriptor::embedded(
            SourceKind::Youtube,
            format!("{YOUTUBE_EMBED_PREFIX}{id}"),
            Some(id),
        ),
        None => VideoSourceDescriptor::embedded(SourceKind::Youtube, input.raw, None),
    };
    Some(descriptor)
}

fn resolve_vimeo(input: &SourceInput<'_>) -> Option<VideoSourceDescriptor> {
    // An empty id still yields the templated embed URL.
    let id = extract_vimeo_id(input.raw);
    let embed_url = format!("{VIMEO_EMBED_PREFIX}{id}");
    let provider_id = (!id.is_empty()).then_some(id);
    Some(VideoSourceDescriptor::embedded(SourceKind::Vimeo, embed_url, provider_id))
}

fn resolve_archive(input: &SourceInput<'_>) -> Option<VideoSourceDescriptor> {
    if input.path_lower().ends_with(".mp4") {
        Some(VideoSourceDescriptor::playable(SourceKind::DirectFile, input.raw))
    } else {
        Some(VideoSourceDescriptor::embedded(SourceKind::GenericWeb, input.raw, None))
    }
}

fn resolve_drive(input: &SourceInput<'_>) -> Option<VideoSourceDescriptor> {
    let id = extract_drive_file_id(input.raw)?;
    let mut descriptor = VideoSourceDescriptor::playable(
        SourceKind::DirectFile,
        format!("{DRIVE_DOWNLOAD_PREFIX}{id}?alt=media"),
    );
    descriptor.provider_id = Some(id);
    Some(descriptor)
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a source URL.
///
/// # Example
/// ```
/// use reel_models::source::{classify, SourceKind};
///
/// let descriptor = classify("https://youtu.be/dQw4w9WgXcQ");
/// assert_eq!(descriptor.kind, SourceKind::Youtube);
/// assert_eq!(descriptor.provider_id.as_deref(), Some("dQw4w9WgXcQ"));
/// ```
pub fn classify(url: &str) -> VideoSourceDescriptor {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return VideoSourceDescriptor::unknown();
    }

    let input = SourceInput::new(trimmed);

    SOURCE_RULES
        .iter()
        .find_map(|rule| rule.evaluate(&input))
        .unwrap_or_else(|| VideoSourceDescriptor::embedded(SourceKind::GenericWeb, trimmed, None))
}

// ============================================================================
// ID Extraction
// ============================================================================

/// Extract the 11-character YouTube video ID.
///
/// Recognizes short links, `/v/`, `/u/<x>/`, `/embed/`, `watch?v=` and
/// `watch?...&v=` shapes, matched case-insensitively like the host test. The
/// ID itself keeps its case. Any capture that is not exactly 11 characters is
/// rejected.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    let captures = YOUTUBE_ID_PATTERN.captures(url)?;
    let id = captures.get(1)?.as_str();
    (id.chars().count() == YOUTUBE_ID_LEN).then(|| id.to_string())
}

/// Extract the numeric Vimeo video ID, or an empty string when absent.
pub fn extract_vimeo_id(url: &str) -> String {
    VIMEO_ID_PATTERN
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extract a Google Drive file ID from a `/d/<id>/` path segment.
pub fn extract_drive_file_id(url: &str) -> Option<String> {
    DRIVE_ID_PATTERN
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(d: &VideoSourceDescriptor) {
        match d.kind {
            SourceKind::Unknown => {
                assert!(d.playable_url.is_empty());
                assert!(d.embed_url.is_none());
            }
            _ => assert!(d.is_natively_playable() ^ d.needs_embed(), "{d:?}"),
        }
    }

    #[test]
    fn test_blank_input_is_unknown() {
        for input in ["", "   ", "\t\n"] {
            let d = classify(input);
            assert_eq!(d.kind, SourceKind::Unknown);
            assert_eq!(d.playable_url, "");
            assert!(d.embed_url.is_none());
        }
    }

    #[test]
    fn test_direct_file() {
        for url in [
            "https://cdn.example.com/clip.mp4",
            "https://cdn.example.com/clip.mp4?token=abc",
            "https://www.youtube.com/some/file.mp4",
            "https://cdn.example.com/CLIP.MP4",
        ] {
            let d = classify(url);
            assert_eq!(d.kind, SourceKind::DirectFile, "{url}");
            assert_eq!(d.playable_url, url);
            assert_invariant(&d);
        }
    }

    #[test]
    fn test_direct_file_uses_trimmed_input() {
        let d = classify("  https://cdn.example.com/clip.mp4  ");
        assert_eq!(d.playable_url, "https://cdn.example.com/clip.mp4");
    }

    #[test]
    fn test_hls_stream() {
        let url = "https://stream.example.com/live/index.m3u8?session=1";
        let d = classify(url);
        assert_eq!(d.kind, SourceKind::HttpLiveStream);
        assert_eq!(d.playable_url, url);
        assert!(d.embed_url.is_none());
    }

    #[test]
    fn test_youtube_short_link() {
        let d = classify("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(d.kind, SourceKind::Youtube);
        assert_eq!(d.provider_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            d.embed_url.as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(d.playable_url, "");
    }

    #[test]
    fn test_youtube_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ#t=10",
            "youtu.be/dQw4w9WgXcQ",
        ] {
            let d = classify(url);
            assert_eq!(d.kind, SourceKind::Youtube, "{url}");
            assert_eq!(d.provider_id.as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn test_uppercase_links_keep_provider_id() {
        let d = classify("HTTPS://YOUTU.BE/dQw4w9WgXcQ");
        assert_eq!(d.kind, SourceKind::Youtube);
        assert_eq!(d.provider_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            d.embed_url.as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );

        let d = classify("https://WWW.YouTube.com/Watch?V=dQw4w9WgXcQ");
        assert_eq!(d.provider_id.as_deref(), Some("dQw4w9WgXcQ"));

        let d = classify("HTTPS://VIMEO.COM/76979871");
        assert_eq!(d.kind, SourceKind::Vimeo);
        assert_eq!(d.provider_id.as_deref(), Some("76979871"));
    }

    #[test]
    fn test_youtube_without_id_embeds_input() {
        let url = "https://www.youtube.com/channel/UC123";
        let d = classify(url);
        assert_eq!(d.kind, SourceKind::Youtube);
        assert_eq!(d.embed_url.as_deref(), Some(url));
        assert!(d.provider_id.is_none());
        assert_eq!(d.playable_url, "");
    }

    #[test]
    fn test_youtube_id_length_enforced() {
        assert_eq!(extract_youtube_id("https://youtu.be/abc123"), None);
        assert_eq!(extract_youtube_id("https://youtu.be/abc123def4567"), None);
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/u/x/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_vimeo() {
        let d = classify("https://vimeo.com/76979871");
        assert_eq!(d.kind, SourceKind::Vimeo);
        assert_eq!(d.provider_id.as_deref(), Some("76979871"));
        assert_eq!(
            d.embed_url.as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
    }

    #[test]
    fn test_vimeo_without_id_keeps_template() {
        let d = classify("https://vimeo.com/channels/staffpicks");
        assert_eq!(d.kind, SourceKind::Vimeo);
        assert_eq!(d.embed_url.as_deref(), Some(VIMEO_EMBED_PREFIX));
        assert!(d.provider_id.is_none());
    }

    #[test]
    fn test_tubi_embeds_input() {
        let url = "https://tubitv.com/movies/12345/some-title";
        let d = classify(url);
        assert_eq!(d.kind, SourceKind::Tubi);
        assert_eq!(d.embed_url.as_deref(), Some(url));
        assert!(d.provider_id.is_none());
    }

    #[test]
    fn test_archive() {
        let direct = "https://archive.org/download/item/film.mp4#t=30";
        let d = classify(direct);
        assert_eq!(d.kind, SourceKind::DirectFile);
        assert_eq!(d.playable_url, direct);

        let page = "https://archive.org/details/item";
        let d = classify(page);
        assert_eq!(d.kind, SourceKind::GenericWeb);
        assert_eq!(d.embed_url.as_deref(), Some(page));
    }

    #[test]
    fn test_drive_resolves_to_download() {
        let d = classify("https://drive.google.com/file/d/ABC123/view");
        assert_eq!(d.kind, SourceKind::DirectFile);
        assert_eq!(
            d.playable_url,
            "https://www.googleapis.com/drive/v3/files/ABC123?alt=media"
        );
        assert_invariant(&d);
    }

    #[test]
    fn test_drive_without_id_falls_back() {
        let url = "https://drive.google.com/drive/folders";
        let d = classify(url);
        assert_eq!(d.kind, SourceKind::GenericWeb);
        assert_eq!(d.embed_url.as_deref(), Some(url));
    }

    #[test]
    fn test_generic_fallback() {
        let url = "https://example.com/random";
        let d = classify(url);
        assert_eq!(d.kind, SourceKind::GenericWeb);
        assert_eq!(d.embed_url.as_deref(), Some(url));
        assert_eq!(d.playable_url, "");
    }

    #[test]
    fn test_provider_name_in_query_does_not_match() {
        let d = classify("https://example.com/share?ref=youtube.com");
        assert_eq!(d.kind, SourceKind::GenericWeb);

        let d = classify("https://www.youtube.com.evil.test/watch?v=dQw4w9WgXcQ");
        assert_eq!(d.kind, SourceKind::GenericWeb);
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = source_rules().iter().map(SourceRule::name).collect();
        assert_eq!(
            names,
            ["direct-file", "http-live-stream", "youtube", "vimeo", "tubi", "archive", "drive"]
        );
    }

    #[test]
    fn test_rules_apply_independently() {
        let rules = source_rules();
        assert!(rules[0].apply("https://vimeo.com/1").is_none());
        assert!(rules[3].apply("https://vimeo.com/1").is_some());
        // drive rule matches the host but yields nothing without an id
        assert!(rules[6].apply("https://drive.google.com/").is_none());
    }

    #[test]
    fn test_classify_is_deterministic() {
        for url in ["https://youtu.be/dQw4w9WgXcQ", "https://example.com", "", "x.m3u8"] {
            assert_eq!(classify(url), classify(url));
        }
    }

    #[test]
    fn test_descriptor_serialization() {
        let json = serde_json::to_value(classify("https://vimeo.com/76979871")).unwrap();
        assert_eq!(json["kind"], "vimeo");
        assert_eq!(json["playableUrl"], "");
        assert_eq!(json["providerId"], "76979871");

        let json = serde_json::to_value(classify("")).unwrap();
        assert_eq!(json["kind"], "unknown");
        assert!(json.get("embedUrl").is_none());
    }
}
