//! Single verse references.

use std::convert::Infallible;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::reference::canon::{self, BOOKS, Book};

/// Minimum similarity for a fuzzy book-name match.
const BOOK_MATCH_CUTOFF: f64 = 0.6;

lazy_static! {
    static ref REFERENCE_REGEX: Regex = Regex::new(
        r"(?ix)
        \b(?P<book>(?:I{1,3}|[1-3])?[^\d,\-./:;]+)\.?
        \s*
        (?P<chapter>\d{0,3})
        (?:\s*:\s*(?P<verse>\d{1,3}))?
        "
    )
    .unwrap();

    static ref LEADING_NUMERAL: Regex = Regex::new(r"^([1-3])\s*").unwrap();

    /// Canonical reference strings, for the exact-match fast path.
    static ref CANONICAL: AHashMap<String, u32> = (0..canon::corpus_size())
        .map(|ordinal| (VerseRef(ordinal).to_string(), ordinal))
        .collect();
}

/// A reference to one verse of the corpus.
///
/// Internally this is the verse's ordinal in canon order, so comparing two
/// references compares their positions in the corpus. Every value is
/// guaranteed to address an existing verse.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerseRef(u32);

impl VerseRef {
    /// `Genesis 1:1`.
    pub fn first() -> Self {
        VerseRef(0)
    }

    /// `Revelation of John 22:21`.
    pub fn last() -> Self {
        VerseRef(canon::corpus_size() - 1)
    }

    /// Reference for an ordinal, clamped to the corpus.
    pub fn from_ordinal(ordinal: u32) -> Self {
        VerseRef(ordinal.min(canon::corpus_size() - 1))
    }

    /// Reference for a book index and possibly out-of-range chapter and
    /// verse numbers. The chapter and verse are clamped into their valid
    /// ranges.
    pub fn from_parts(book: usize, chapter: i64, verse: i64) -> Self {
        let book_index = book.min(BOOKS.len() - 1);
        let book = &BOOKS[book_index];
        let chapter = chapter.clamp(1, book.chapter_count() as i64) as u16;
        let max_verse = book.verse_count(chapter).unwrap_or(1);
        let verse = verse.clamp(1, max_verse as i64) as u16;
        VerseRef(canon::ordinal_of(book_index, chapter, verse))
    }

    /// Parse a reference such as `"Gen 1:1"`, `"1 John 3"` or `"psalms"`.
    ///
    /// This never fails: unknown books resolve to the closest known book
    /// name (or Genesis), a missing chapter or verse defaults to 1 and
    /// out-of-range numbers are clamped.
    pub fn parse(reference: &str) -> Self {
        if let Some(&ordinal) = CANONICAL.get(reference.trim()) {
            return VerseRef(ordinal);
        }

        let Some(caps) = REFERENCE_REGEX.captures(reference) else {
            return VerseRef::first();
        };

        let book = resolve_book(caps.name("book").map_or("", |m| m.as_str()));
        let chapter = parse_number(caps.name("chapter").map(|m| m.as_str()));
        let verse = parse_number(caps.name("verse").map(|m| m.as_str()));

        VerseRef::from_parts(book, chapter.unwrap_or(1), verse.unwrap_or(1))
    }

    /// Ordinal of this verse in canon order.
    pub fn ordinal(self) -> u32 {
        self.0
    }

    /// Index of the book in canon order.
    pub fn book_index(self) -> usize {
        canon::locate(self.0).0
    }

    pub fn book(self) -> &'static Book {
        &BOOKS[self.book_index()]
    }

    pub fn book_name(self) -> &'static str {
        self.book().name()
    }

    pub fn chapter(self) -> u16 {
        canon::locate(self.0).1
    }

    pub fn verse(self) -> u16 {
        canon::locate(self.0).2
    }

    /// The last verse of this verse's chapter.
    pub fn max_verse_in_chapter(self) -> VerseRef {
        let (book, chapter, _) = canon::locate(self.0);
        let last = BOOKS[book].verse_count(chapter).unwrap_or(1);
        VerseRef(canon::ordinal_of(book, chapter, last))
    }

    /// The first verse of the last chapter of this verse's book.
    pub fn max_chapter_in_book(self) -> VerseRef {
        let book = self.book_index();
        VerseRef(canon::ordinal_of(book, BOOKS[book].chapter_count(), 1))
    }

    /// The first verse of this verse's chapter.
    pub fn chapter_start(self) -> VerseRef {
        let (book, chapter, _) = canon::locate(self.0);
        VerseRef(canon::ordinal_of(book, chapter, 1))
    }

    /// Move `n` verses forward (or backward when negative), stopping at the
    /// ends of the corpus.
    pub fn offset(self, n: i64) -> VerseRef {
        let max = canon::corpus_size() as i64 - 1;
        VerseRef((self.0 as i64).saturating_add(n).clamp(0, max) as u32)
    }

    /// Signed number of verses from `self` to `other`.
    pub fn distance(self, other: VerseRef) -> i64 {
        other.0 as i64 - self.0 as i64
    }
}

impl Add<i64> for VerseRef {
    type Output = VerseRef;

    fn add(self, rhs: i64) -> VerseRef {
        self.offset(rhs)
    }
}

impl Sub<i64> for VerseRef {
    type Output = VerseRef;

    fn sub(self, rhs: i64) -> VerseRef {
        self.offset(rhs.saturating_neg())
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (book, chapter, verse) = canon::locate(self.0);
        write!(f, "{} {}:{}", BOOKS[book].name(), chapter, verse)
    }
}

impl fmt::Debug for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerseRef({self})")
    }
}

impl FromStr for VerseRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VerseRef::parse(s))
    }
}

impl From<&str> for VerseRef {
    fn from(s: &str) -> Self {
        VerseRef::parse(s)
    }
}

impl Serialize for VerseRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VerseRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let reference = String::deserialize(deserializer)?;
        Ok(VerseRef::parse(&reference))
    }
}

fn parse_number(text: Option<&str>) -> Option<i64> {
    text.filter(|t| !t.is_empty()).and_then(|t| t.parse().ok())
}

/// Resolve a (possibly abbreviated or misspelled) book name to its index.
///
/// A leading Arabic numeral is read as the Roman one used in book names
/// (`2 Kings` is `II Kings`). Books are then checked in canon order for an
/// exact or prefix match of the full name or abbreviation, and then for a
/// name that starts with an abbreviation (`Genesis` for `Gen`). Failing
/// that, the closest name by normalized edit distance is used if it is
/// similar enough; otherwise Genesis.
pub fn resolve_book(name: &str) -> usize {
    let lowered = name.trim().to_lowercase();
    let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
    let name = roman_numeral_prefix(&lowered);

    for (index, book) in BOOKS.iter().enumerate() {
        let full = book.name().to_lowercase();
        let abbreviation = book.abbreviation().to_lowercase();
        if name == full || compact == abbreviation {
            return index;
        }
        if full.starts_with(&name) || abbreviation.starts_with(&compact) {
            return index;
        }
    }

    if !compact.is_empty() {
        for (index, book) in BOOKS.iter().enumerate() {
            if compact.starts_with(&book.abbreviation().to_lowercase()) {
                return index;
            }
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, book) in BOOKS.iter().enumerate() {
        for candidate in [book.name(), book.abbreviation()] {
            let score = strsim::normalized_levenshtein(&name, &candidate.to_lowercase());
            if score >= BOOK_MATCH_CUTOFF && best.is_none_or(|(_, s)| score > s) {
                best = Some((index, score));
            }
        }
    }

    best.map_or(0, |(index, _)| index)
}

fn roman_numeral_prefix(name: &str) -> String {
    LEADING_NUMERAL
        .replace(name, |caps: &regex::Captures<'_>| match &caps[1] {
            "1" => "i ",
            "2" => "ii ",
            _ => "iii ",
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let verse = VerseRef::parse("Genesis 1:1");
        assert_eq!(verse, VerseRef::first());
        assert_eq!(verse.to_string(), "Genesis 1:1");

        let verse = VerseRef::parse("Revelation of John 22:21");
        assert_eq!(verse, VerseRef::last());
    }

    #[test]
    fn test_parse_abbreviations() {
        assert_eq!(VerseRef::parse("gen 1:1").to_string(), "Genesis 1:1");
        assert_eq!(VerseRef::parse("Ps 23:1").to_string(), "Psalms 23:1");
        assert_eq!(VerseRef::parse("1John 4:8").to_string(), "I John 4:8");
        assert_eq!(VerseRef::parse("1 John 4:8").to_string(), "I John 4:8");
        assert_eq!(VerseRef::parse("john 3:16").to_string(), "John 3:16");
        assert_eq!(VerseRef::parse("Rev").to_string(), "Revelation of John 1:1");
    }

    #[test]
    fn test_parse_arabic_numeral_books() {
        assert_eq!(VerseRef::parse("2 Kings 5:1").to_string(), "II Kings 5:1");
        assert_eq!(VerseRef::parse("2 Samuel 7:12").to_string(), "II Samuel 7:12");
        assert_eq!(VerseRef::parse("2 Corinthians 5:17").to_string(), "II Corinthians 5:17");
        assert_eq!(VerseRef::parse("2 Timothy 3:16").to_string(), "II Timothy 3:16");
        assert_eq!(VerseRef::parse("2 Chronicles 7:14").to_string(), "II Chronicles 7:14");
        assert_eq!(VerseRef::parse("1 Kings 1:1").to_string(), "I Kings 1:1");
        assert_eq!(VerseRef::parse("3 John 1:4").to_string(), "III John 1:4");
        assert_eq!(VerseRef::parse("2Cor 5:17").to_string(), "II Corinthians 5:17");
        assert_eq!(VerseRef::parse("2 Cor 5:17").to_string(), "II Corinthians 5:17");
    }

    #[test]
    fn test_resolve_book_names() {
        assert_eq!(BOOKS[resolve_book("Philemon")].name(), "Philemon");
        assert_eq!(BOOKS[resolve_book("philippians")].name(), "Philippians");
        assert_eq!(BOOKS[resolve_book("II Kings")].name(), "II Kings");
        assert_eq!(BOOKS[resolve_book("2kings")].name(), "II Kings");
    }

    #[test]
    fn test_parse_defaults_and_clamping() {
        assert_eq!(VerseRef::parse("Exodus").to_string(), "Exodus 1:1");
        assert_eq!(VerseRef::parse("Exodus 3").to_string(), "Exodus 3:1");
        assert_eq!(VerseRef::parse("Genesis 1:99").to_string(), "Genesis 1:31");
        assert_eq!(VerseRef::parse("Genesis 99:1").to_string(), "Genesis 50:1");
        assert_eq!(VerseRef::parse("Genesis 0:0").to_string(), "Genesis 1:1");
    }

    #[test]
    fn test_parse_unknown_book() {
        // Close misspelling resolves to the nearest name.
        assert_eq!(VerseRef::parse("Genesys 2:3").to_string(), "Genesis 2:3");
        assert_eq!(VerseRef::parse("Deuteronomey 6:4").to_string(), "Deuteronomy 6:4");
        // Nothing similar falls back to the first book.
        assert_eq!(VerseRef::parse("zzzzzzzz 2:2").to_string(), "Genesis 2:2");
        assert_eq!(VerseRef::parse("").to_string(), "Genesis 1:1");
    }

    #[test]
    fn test_parts() {
        let verse = VerseRef::parse("John 3:16");
        assert_eq!(verse.book_name(), "John");
        assert_eq!(verse.chapter(), 3);
        assert_eq!(verse.verse(), 16);
        assert_eq!(verse.max_verse_in_chapter().to_string(), "John 3:36");
        assert_eq!(verse.max_chapter_in_book().to_string(), "John 21:1");
        assert_eq!(verse.chapter_start().to_string(), "John 3:1");
    }

    #[test]
    fn test_arithmetic_is_clamped() {
        let verse = VerseRef::parse("Genesis 1:31");
        assert_eq!((verse + 1).to_string(), "Genesis 2:1");
        assert_eq!((verse - 30).to_string(), "Genesis 1:1");
        assert_eq!(verse - 1000, VerseRef::first());
        assert_eq!(VerseRef::last() + 5, VerseRef::last());
        assert_eq!(VerseRef::last() + i64::MAX, VerseRef::last());
        assert_eq!(VerseRef::first() + i64::MIN, VerseRef::first());
        assert_eq!(VerseRef::last() - i64::MIN, VerseRef::last());
        assert_eq!(verse - i64::MAX, VerseRef::first());
        assert_eq!(VerseRef::first().distance(verse), 30);
    }

    #[test]
    fn test_ordering() {
        let a = VerseRef::parse("Genesis 50:26");
        let b = VerseRef::parse("Exodus 1:1");
        assert!(a < b);
        assert_eq!(a + 1, b);
    }

    #[test]
    fn test_serde_as_string() {
        let verse = VerseRef::parse("Ruth 1:16");
        let json = serde_json::to_string(&verse).unwrap();
        assert_eq!(json, "\"Ruth 1:16\"");
        let back: VerseRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verse);
    }
}
