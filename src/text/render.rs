use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::reference::VerseRef;
use crate::text::VerseSource;

lazy_static! {
    static ref STRONGS_REGEX: Regex = Regex::new(r"\s*<([GH]\d+)>").unwrap();
    static ref MORPH_REGEX: Regex = Regex::new(r"\s*\{([\w-]+)\}").unwrap();
    static ref ADDED_REGEX: Regex = Regex::new(r"(?s)\s?<i>\s?(.*?)\s?</i>").unwrap();
    static ref ITALIC_MARKER_REGEX: Regex = Regex::new(r"(<i>\s?|\s?</i>)").unwrap();
    static ref PARAGRAPH_REGEX: Regex = Regex::new(r"(?s)\s?<p>\s?(.*?)\s?</p>").unwrap();
    static ref PARAGRAPH_MARKER_REGEX: Regex = Regex::new(r"(<p>\s?|\s?</p>)").unwrap();
    static ref NOTES_REGEX: Regex = Regex::new(r"(?s)\s?<n>\s?(.*?)\s?</n>").unwrap();
}

/// Which kinds of inline markup to keep in rendered verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseTextOptions {
    /// Keep Strong's numbers (`<H430>`).
    pub strongs: bool,
    /// Keep morphology tags (`{N-NSM}`).
    pub morph: bool,
    /// Keep words added by the translators (`<i>..</i>` content).
    pub added: bool,
    /// Keep the `<i>`/`</i>` markers around added words.
    pub italic_markers: bool,
    /// Keep paragraph marks (the `<p>`/`</p>` markers are always removed).
    pub paragraph: bool,
    /// Keep translator notes, rendered as ` (Notes: ..)`.
    pub notes: bool,
}

impl Default for VerseTextOptions {
    fn default() -> Self {
        VerseTextOptions {
            strongs: false,
            morph: false,
            added: true,
            italic_markers: false,
            paragraph: true,
            notes: false,
        }
    }
}

impl VerseTextOptions {
    pub fn with_strongs(mut self, strongs: bool) -> Self {
        self.strongs = strongs;
        self
    }

    pub fn with_morph(mut self, morph: bool) -> Self {
        self.morph = morph;
        self
    }

    pub fn with_added(mut self, added: bool) -> Self {
        self.added = added;
        self
    }

    pub fn with_italic_markers(mut self, italic_markers: bool) -> Self {
        self.italic_markers = italic_markers;
        self
    }

    pub fn with_paragraph(mut self, paragraph: bool) -> Self {
        self.paragraph = paragraph;
        self
    }

    pub fn with_notes(mut self, notes: bool) -> Self {
        self.notes = notes;
        self
    }
}

/// Cleans raw verse text according to a set of [`VerseTextOptions`].
#[derive(Debug, Clone, Default)]
pub struct VerseRenderer {
    options: VerseTextOptions,
}

impl VerseRenderer {
    pub fn new(options: VerseTextOptions) -> Self {
        VerseRenderer { options }
    }

    pub fn options(&self) -> &VerseTextOptions {
        &self.options
    }

    /// Render raw annotated text.
    pub fn render(&self, raw: &str) -> String {
        let mut text = raw.to_string();

        if !self.options.strongs {
            strip(&mut text, &STRONGS_REGEX);
        }
        if !self.options.morph {
            strip(&mut text, &MORPH_REGEX);
        }
        if !self.options.added {
            strip(&mut text, &ADDED_REGEX);
        }
        if !self.options.italic_markers {
            strip(&mut text, &ITALIC_MARKER_REGEX);
        }
        if self.options.paragraph {
            strip(&mut text, &PARAGRAPH_MARKER_REGEX);
        } else {
            strip(&mut text, &PARAGRAPH_REGEX);
        }

        let notes = if self.options.notes { " (Notes: ${1})" } else { "" };
        NOTES_REGEX.replace_all(&text, notes).trim().to_string()
    }

    /// Rendered text of `verse` from `source`.
    pub fn text(&self, source: &dyn VerseSource, verse: VerseRef) -> Option<String> {
        source.raw_text(verse).map(|raw| self.render(&raw))
    }
}

fn strip(text: &mut String, regex: &Regex) {
    if regex.is_match(text) {
        *text = regex.replace_all(text, "").into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "<p>\u{b6}</p> And God <H430> said {V-QAL}, Let there be <i>a</i> light: \
                       <n>Or, lights</n> and there was light.";

    #[test]
    fn test_default_render() {
        let renderer = VerseRenderer::default();
        assert_eq!(
            renderer.render(RAW),
            "\u{b6} And God said, Let there be a light: and there was light."
        );
    }

    #[test]
    fn test_keep_tags() {
        let renderer = VerseRenderer::new(
            VerseTextOptions::default()
                .with_strongs(true)
                .with_morph(true)
                .with_paragraph(false),
        );
        assert_eq!(
            renderer.render(RAW),
            "And God <H430> said {V-QAL}, Let there be a light: and there was light."
        );
    }

    #[test]
    fn test_added_words() {
        let removed = VerseRenderer::new(VerseTextOptions::default().with_added(false));
        assert_eq!(
            removed.render("Let there be <i>a</i> light"),
            "Let there be light"
        );

        let marked = VerseRenderer::new(VerseTextOptions::default().with_italic_markers(true));
        assert_eq!(
            marked.render("Let there be <i>a</i> light"),
            "Let there be <i>a</i> light"
        );
    }

    #[test]
    fn test_notes() {
        let renderer = VerseRenderer::new(VerseTextOptions::default().with_notes(true));
        assert_eq!(
            renderer.render("a light: <n>Or, lights</n> and"),
            "a light: (Notes: Or, lights) and"
        );
    }

    #[test]
    fn test_options_serde() {
        let options: VerseTextOptions = serde_json::from_str(r#"{"strongs": true}"#).unwrap();
        assert!(options.strongs);
        assert!(options.added);
        assert!(!options.notes);
    }
}
