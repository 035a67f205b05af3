//! `.szaarc` script container
//!
//! A pretty-printed JSON object carrying the format sentinel, metadata and
//! the typed lines of the script. Decoding is lenient about metadata and
//! strict about the sentinel and the content.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use regex::Regex;
use script_core::{classify, ElementType, ScriptLine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of the `format` field of every container
pub const FORMAT_SENTINEL: &str = "szaarc";
pub const FORMAT_VERSION: &str = "1.0.0";
pub const APPLICATION: &str = "ScreenPlayzaarc";
pub const DEFAULT_TITLE: &str = "Untitled Script";
/// File extension, without the dot
pub const FILE_EXTENSION: &str = "szaarc";

/// Container error
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: expected .szaarc, found {0:?}")]
    InvalidFormat(Option<String>),

    #[error("Container has no content")]
    MissingContent,

    #[error("Markup pattern error: {0}")]
    Markup(#[from] regex::Error),
}

pub type ContainerResult<T> = Result<T, ContainerError>;

/// One stored line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLine {
    pub text: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

impl From<&ScriptLine> for ContainerLine {
    fn from(line: &ScriptLine) -> Self {
        Self {
            text: line.text.clone(),
            element_type: line.element_type,
        }
    }
}

/// Decoded script file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptContainer {
    pub format: String,
    pub version: String,
    pub application: String,
    pub title: String,
    pub content: Vec<ContainerLine>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub word_count: usize,
    pub page_count: usize,
}

impl ScriptContainer {
    pub fn new(title: impl Into<String>, lines: &[ScriptLine], created: DateTime<Utc>) -> Self {
        Self {
            format: FORMAT_SENTINEL.to_string(),
            version: FORMAT_VERSION.to_string(),
            application: APPLICATION.to_string(),
            title: title.into(),
            content: lines.iter().map(ContainerLine::from).collect(),
            created,
            last_modified: created,
            word_count: 0,
            page_count: 1,
        }
    }

    pub fn with_counts(mut self, word_count: usize, page_count: usize) -> Self {
        self.word_count = word_count;
        self.page_count = page_count;
        self
    }

    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.last_modified = now;
        self
    }

    /// Lines ready for the editor
    pub fn lines(&self) -> Vec<ScriptLine> {
        self.content
            .iter()
            .map(|line| ScriptLine::new(line.text.clone(), line.element_type))
            .collect()
    }

    pub fn encode(&self) -> ContainerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a container. `now` fills in missing timestamps.
    pub fn decode(json: &str, now: DateTime<Utc>) -> ContainerResult<Self> {
        let raw: RawContainer = serde_json::from_str(json)?;

        if raw.format.as_deref() != Some(FORMAT_SENTINEL) {
            return Err(ContainerError::InvalidFormat(raw.format));
        }
        let content = match raw.content {
            Some(RawContent::Lines(lines)) => lines,
            Some(RawContent::Markup(html)) if !html.trim().is_empty() => markup_lines(&html)?,
            _ => return Err(ContainerError::MissingContent),
        };

        Ok(Self {
            format: FORMAT_SENTINEL.to_string(),
            version: raw.version.unwrap_or_else(|| FORMAT_VERSION.to_string()),
            application: raw.application.unwrap_or_else(|| APPLICATION.to_string()),
            title: raw
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: content.into_iter().map(RawLine::into_line).collect(),
            created: parse_timestamp(raw.created.as_deref(), now),
            last_modified: parse_timestamp(raw.last_modified.as_deref(), now),
            word_count: raw.word_count.map(Count::value).unwrap_or(0),
            page_count: raw.page_count.map(Count::value).unwrap_or(1),
        })
    }
}

/// Shape accepted on input. Everything but `format` and `content` may be
/// absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContainer {
    format: Option<String>,
    version: Option<String>,
    application: Option<String>,
    title: Option<String>,
    content: Option<RawContent>,
    created: Option<String>,
    last_modified: Option<String>,
    word_count: Option<Count>,
    page_count: Option<Count>,
}

/// Typed lines, or the editor markup that older files stored instead
#[derive(Deserialize)]
#[serde(untagged)]
enum RawContent {
    Lines(Vec<RawLine>),
    Markup(String),
}

#[derive(Deserialize)]
struct RawLine {
    #[serde(default)]
    text: String,
    #[serde(rename = "type")]
    element_type: Option<String>,
}

impl RawLine {
    /// Unknown or missing types are re-derived from the text
    fn into_line(self) -> ContainerLine {
        let element_type = self
            .element_type
            .as_deref()
            .and_then(ElementType::parse)
            .unwrap_or_else(|| classify(&self.text));
        ContainerLine {
            text: self.text,
            element_type,
        }
    }
}

/// Counts were historically written as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(usize),
    Text(String),
}

impl Count {
    fn value(self) -> usize {
        match self {
            Count::Number(n) => n,
            Count::Text(text) => text.trim().parse().unwrap_or(0),
        }
    }
}

/// Recover lines from `<div class="script-line TYPE" data-type="TYPE">` markup.
///
/// The type comes from `data-type`, then from the class list. Markup without
/// line divs is read as plain text, one line per text line.
fn markup_lines(html: &str) -> ContainerResult<Vec<RawLine>> {
    let line_re = Regex::new(r"(?is)<div\b([^>]*)>(.*?)</div>")?;
    let data_type_re = Regex::new(r#"(?i)\bdata-type\s*=\s*"([^"]*)""#)?;
    let class_re = Regex::new(r#"(?i)\bclass\s*=\s*"([^"]*)""#)?;
    let tag_re = Regex::new(r"(?s)<[^>]*>")?;

    let mut lines = Vec::new();
    for caps in line_re.captures_iter(html) {
        let attrs = &caps[1];
        let element_type = data_type_re
            .captures(attrs)
            .map(|c| c[1].trim().to_string())
            .or_else(|| {
                class_re.captures(attrs).and_then(|c| {
                    c[1].split_whitespace()
                        .find(|class| *class != "script-line")
                        .map(str::to_string)
                })
            });
        lines.push(RawLine {
            text: markup_text(&tag_re, &caps[2]).trim().to_string(),
            element_type,
        });
    }

    if lines.is_empty() {
        lines = markup_text(&tag_re, html)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| RawLine {
                text: line.to_string(),
                element_type: None,
            })
            .collect();
    }

    debug!("recovered {} lines from legacy markup", lines.len());
    Ok(lines)
}

fn markup_text(tag_re: &Regex, html: &str) -> String {
    tag_re
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn parse_timestamp(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(value) = value else {
        return now;
    };
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => {
            warn!("ignoring malformed timestamp {:?}: {}", value, err);
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn sample_lines() -> Vec<ScriptLine> {
        vec![
            ScriptLine::new("FADE IN:", ElementType::FadeIn),
            ScriptLine::new("INT. LAB - NIGHT", ElementType::SceneHeading),
            ScriptLine::new("ADA", ElementType::Character),
            ScriptLine::new("It works.", ElementType::Dialogue),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let container = ScriptContainer::new("Lab", &sample_lines(), fixed_time()).with_counts(7, 1);
        let json = container.encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["format"], "szaarc");
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["application"], "ScreenPlayzaarc");
        assert_eq!(value["content"][0]["type"], "fade-in");
        assert_eq!(value["content"][1]["type"], "scene-heading");
        assert_eq!(value["content"][3]["text"], "It works.");
        assert_eq!(value["wordCount"], 7);
        assert_eq!(value["lastModified"], "2024-03-01T09:30:00Z");
        // Pretty printed
        assert!(json.contains("\n  \"format\""));
    }

    #[test]
    fn test_decode_what_was_encoded() {
        let container = ScriptContainer::new("Lab", &sample_lines(), fixed_time()).with_counts(7, 1);
        let json = container.encode().unwrap();
        let decoded = ScriptContainer::decode(&json, Utc::now()).unwrap();
        assert_eq!(decoded, container);
        assert_eq!(decoded.lines(), sample_lines());
    }

    #[test]
    fn test_decode_rejects_bad_json() {
        let err = ScriptContainer::decode("{ not json", fixed_time()).unwrap_err();
        assert!(matches!(err, ContainerError::Json(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_format() {
        let err = ScriptContainer::decode(r#"{"format": "fdx", "content": []}"#, fixed_time())
            .unwrap_err();
        assert!(matches!(err, ContainerError::InvalidFormat(Some(ref f)) if f == "fdx"));

        let err = ScriptContainer::decode(r#"{"content": []}"#, fixed_time()).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidFormat(None)));
    }

    #[test]
    fn test_decode_requires_content() {
        let err = ScriptContainer::decode(r#"{"format": "szaarc"}"#, fixed_time()).unwrap_err();
        assert!(matches!(err, ContainerError::MissingContent));
    }

    #[test]
    fn test_decode_fills_defaults() {
        let json = r#"{
            "format": "szaarc",
            "title": "",
            "content": [{ "text": "JOHN" }, { "text": "Hi.", "type": "dialogue" }],
            "created": "yesterday",
            "wordCount": "12",
            "pageCount": "2"
        }"#;
        let decoded = ScriptContainer::decode(json, fixed_time()).unwrap();
        assert_eq!(decoded.title, DEFAULT_TITLE);
        assert_eq!(decoded.version, FORMAT_VERSION);
        assert_eq!(decoded.created, fixed_time());
        assert_eq!(decoded.last_modified, fixed_time());
        assert_eq!(decoded.word_count, 12);
        assert_eq!(decoded.page_count, 2);
        assert_eq!(decoded.content[0].element_type, ElementType::Character);
        assert_eq!(decoded.content[1].element_type, ElementType::Dialogue);
    }

    #[test]
    fn test_decode_markup_content() {
        let json = r#"{
            "format": "szaarc",
            "version": "1.0.0",
            "application": "ScreenPlayzaarc",
            "title": "Harbor",
            "content": "\n        <div class=\"script-line fade-in\" data-type=\"fade-in\">FADE IN:</div>\n        <div class=\"script-line scene-heading\" data-type=\"scene-heading\">EXT. PIER - DUSK</div>\n        <div class=\"script-line action\">Gulls &amp; rain.&nbsp;</div><div class=\"script-line\">CUT TO:</div><div class=\"script-line character\" data-type=\"character\"><br></div>",
            "created": "2024-03-01T09:30:00.000Z",
            "lastModified": "2024-03-01T10:00:00.000Z",
            "wordCount": "9",
            "pageCount": "1"
        }"#;
        let decoded = ScriptContainer::decode(json, Utc::now()).unwrap();

        let lines: Vec<(&str, ElementType)> = decoded
            .content
            .iter()
            .map(|line| (line.text.as_str(), line.element_type))
            .collect();
        assert_eq!(
            lines,
            [
                ("FADE IN:", ElementType::FadeIn),
                ("EXT. PIER - DUSK", ElementType::SceneHeading),
                ("Gulls & rain.", ElementType::Action),
                ("CUT TO:", ElementType::Transition),
                ("", ElementType::Character),
            ]
        );
        assert_eq!(decoded.title, "Harbor");
        assert_eq!(decoded.created, fixed_time());
        assert_eq!(decoded.word_count, 9);
    }

    #[test]
    fn test_decode_markup_without_lines_reads_text() {
        let json = r#"{"format": "szaarc", "content": "INT. BARN - NIGHT<br>\nA lantern swings."}"#;
        let decoded = ScriptContainer::decode(json, fixed_time()).unwrap();
        assert_eq!(decoded.content.len(), 2);
        assert_eq!(decoded.content[0].element_type, ElementType::SceneHeading);
        assert_eq!(decoded.content[1].text, "A lantern swings.");
    }

    #[test]
    fn test_decode_empty_markup_is_missing_content() {
        let err = ScriptContainer::decode(r#"{"format": "szaarc", "content": ""}"#, fixed_time())
            .unwrap_err();
        assert!(matches!(err, ContainerError::MissingContent));
    }

    #[test]
    fn test_decode_unknown_type_is_reclassified() {
        let json = r#"{"format": "szaarc", "content": [{ "text": "CUT TO:", "type": "montage" }]}"#;
        let decoded = ScriptContainer::decode(json, fixed_time()).unwrap();
        assert_eq!(decoded.content[0].element_type, ElementType::Transition);
    }
}
