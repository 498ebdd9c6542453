//! Contiguous verse ranges and the range-expression grammar.

use std::fmt;
use std::iter::FusedIterator;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::reference::canon::{BOOKS, corpus_size};
use crate::reference::verse::{VerseRef, resolve_book};
use crate::reference::VerseSet;

lazy_static! {
    static ref RANGE_REGEX: Regex = Regex::new(
        r"(?ix)
        \b(?P<book>(?:I{1,3}|[1-3])?[^\d,\-./:;]+)\.?
        \s*
        (?P<chapter>\d{0,3})
        (?:\s*:\s*(?P<verse>\d{1,3}))?
        (?:
            \s*-\s*
            (?P<end_book>(?:I{1,3}|[1-3])?[^\d,\-./:;]+)?\.?
            \s*
            (?:(?P<end_chapter>\d{1,3})\s*:\s*)?
            (?P<end_verse>\d{1,3})?
        )?
        "
    )
    .unwrap();
    static ref SEPARATOR_REGEX: Regex = Regex::new(r"[,;]").unwrap();
}

/// An inclusive range of verses, always ordered `lower <= upper`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseRange {
    lower: VerseRef,
    upper: VerseRef,
}

impl VerseRange {
    /// Create a range covering both ends. Reversed ends are swapped.
    pub fn new(a: VerseRef, b: VerseRef) -> Self {
        if a <= b {
            VerseRange { lower: a, upper: b }
        } else {
            VerseRange { lower: b, upper: a }
        }
    }

    /// The whole chapter containing `verse`.
    pub fn chapter_of(verse: VerseRef) -> Self {
        VerseRange::new(verse.chapter_start(), verse.max_verse_in_chapter())
    }

    pub fn lower(&self) -> VerseRef {
        self.lower
    }

    pub fn upper(&self) -> VerseRef {
        self.upper
    }

    /// Number of verses in the range.
    pub fn len(&self) -> usize {
        self.lower.distance(self.upper) as usize + 1
    }

    /// A range always holds at least one verse.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, verse: VerseRef) -> bool {
        self.lower <= verse && verse <= self.upper
    }

    /// Position of `verse` within the range.
    pub fn index_of(&self, verse: VerseRef) -> Option<usize> {
        self.contains(verse)
            .then(|| self.lower.distance(verse) as usize)
    }

    /// Verse at `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> Option<VerseRef> {
        let len = self.len() as isize;
        let index = if index < 0 { len + index } else { index };
        (0..len)
            .contains(&index)
            .then(|| self.lower + index as i64)
    }

    /// Sub-range `[start, stop)` with the usual negative-index and
    /// open-end conventions. Returns `None` when the slice is empty.
    pub fn slice(&self, start: Option<isize>, stop: Option<isize>) -> Option<VerseRange> {
        let len = self.len() as isize;
        let normalize = |bound: isize| {
            if bound < 0 {
                (len + bound).max(0)
            } else {
                bound.min(len)
            }
        };
        let start = start.map_or(0, normalize);
        let stop = stop.map_or(len, normalize);
        if start >= stop {
            return None;
        }
        Some(VerseRange::new(
            self.lower + start as i64,
            self.lower + (stop - 1) as i64,
        ))
    }

    pub fn iter(&self) -> VerseRangeIter {
        VerseRangeIter {
            next: self.lower.ordinal(),
            end: self.upper.ordinal() + 1,
        }
    }

    /// Every verse in the range as a set.
    pub fn expand(&self) -> VerseSet {
        self.iter().collect()
    }
}

impl fmt::Display for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

impl fmt::Debug for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerseRange({self})")
    }
}

impl IntoIterator for VerseRange {
    type Item = VerseRef;
    type IntoIter = VerseRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &VerseRange {
    type Item = VerseRef;
    type IntoIter = VerseRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the verses of a [`VerseRange`] in canon order.
#[derive(Debug, Clone)]
pub struct VerseRangeIter {
    next: u32,
    end: u32,
}

impl Iterator for VerseRangeIter {
    type Item = VerseRef;

    fn next(&mut self) -> Option<VerseRef> {
        if self.next >= self.end {
            return None;
        }
        let verse = VerseRef::from_ordinal(self.next);
        self.next += 1;
        Some(verse)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for VerseRangeIter {
    fn next_back(&mut self) -> Option<VerseRef> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(VerseRef::from_ordinal(self.end))
    }
}

impl ExactSizeIterator for VerseRangeIter {}

impl FusedIterator for VerseRangeIter {}

/// One element of a parsed range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeItem {
    Verse(VerseRef),
    Range(VerseRange),
}

impl RangeItem {
    /// The last verse covered by this item.
    pub fn last(&self) -> VerseRef {
        match self {
            RangeItem::Verse(verse) => *verse,
            RangeItem::Range(range) => range.upper(),
        }
    }

    fn extend_set(&self, set: &mut VerseSet) {
        match self {
            RangeItem::Verse(verse) => {
                set.insert(*verse);
            }
            RangeItem::Range(range) => set.extend(range.iter()),
        }
    }
}

/// Parse a range expression such as `"Gen 1:1-5, 9; Exo 3; Matt-John"`.
///
/// Fragments are separated by `,` or `;`. A fragment without a book name
/// continues from the book (and, without a colon, the chapter) of the
/// previous fragment.
pub fn parse_range(text: &str) -> Vec<RangeItem> {
    let mut items = Vec::new();
    let mut context = VerseRef::first();

    for fragment in SEPARATOR_REGEX.split(text) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }

        let mut parsed = parse_fragment(fragment);
        if parsed.is_empty() {
            let qualified = if fragment.contains(':') {
                format!("{} {}", context.book_name(), fragment)
            } else {
                format!("{} {}:{}", context.book_name(), context.chapter(), fragment)
            };
            parsed = parse_fragment(&qualified);
        }

        if let Some(item) = parsed.last() {
            context = item.last();
        }
        items.extend(parsed);
    }

    items
}

/// Parse a range expression and expand it to the set of verses it covers.
pub fn parse_verse_range(text: &str) -> VerseSet {
    let mut set = VerseSet::default();
    for item in parse_range(text) {
        item.extend_set(&mut set);
    }
    set
}

/// Expand every verse in `verses` by `count` verses on each side and, when
/// `whole_chapter` is set, to its entire chapter.
pub fn add_context(verses: &VerseSet, count: usize, whole_chapter: bool) -> VerseSet {
    let capacity = verses
        .len()
        .saturating_mul(count.saturating_mul(2).saturating_add(1))
        .min(corpus_size() as usize);
    let mut expanded = VerseSet::with_capacity(capacity);
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    for &verse in verses {
        if whole_chapter {
            expanded.extend(VerseRange::chapter_of(verse).iter());
        }
        expanded.extend(VerseRange::new(verse - count, verse + count).iter());
    }
    expanded
}

/// The verses of `verses` in canon order.
pub fn sorted(verses: &VerseSet) -> Vec<VerseRef> {
    let mut list: Vec<VerseRef> = verses.iter().copied().collect();
    list.sort_unstable();
    list
}

fn parse_fragment(fragment: &str) -> Vec<RangeItem> {
    RANGE_REGEX
        .captures_iter(fragment)
        .map(|caps| item_from_captures(&caps))
        .collect()
}

fn capture<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn number(caps: &Captures<'_>, name: &str) -> Option<i64> {
    capture(caps, name).and_then(|s| s.parse().ok())
}

fn last_verse(book: usize, chapter: i64) -> i64 {
    let book = &BOOKS[book];
    let chapter = chapter.clamp(1, book.chapter_count() as i64) as u16;
    book.verse_count(chapter).unwrap_or(1) as i64
}

fn item_from_captures(caps: &Captures<'_>) -> RangeItem {
    let start_book = resolve_book(capture(caps, "book").unwrap_or(""));
    let start_chapter = number(caps, "chapter");
    let start_verse = number(caps, "verse");
    let mut end_book = capture(caps, "end_book").map(resolve_book);
    let mut end_chapter = number(caps, "end_chapter");
    let mut end_verse = number(caps, "end_verse");

    let first = VerseRef::from_parts(
        start_book,
        start_chapter.unwrap_or(1),
        start_verse.unwrap_or(1),
    );

    if start_verse.is_none() && end_chapter.is_none() {
        if let Some(chapter) = end_verse {
            // `Gen 1-4` or `Gen-Exo 4`: whole chapters.
            let book = end_book.unwrap_or(start_book);
            end_book = Some(book);
            end_chapter = Some(chapter);
            end_verse = Some(last_verse(book, chapter));
        } else if end_book.is_none_or(|book| book == start_book) {
            // `Gen 3` is one chapter, a bare `Gen` the whole book.
            end_book = Some(start_book);
            let chapter = start_chapter.unwrap_or(BOOKS[start_book].chapter_count() as i64);
            end_chapter = Some(chapter);
            end_verse = Some(last_verse(start_book, chapter));
        }
    }

    if start_verse.is_some() && end_chapter.is_none() {
        if end_verse.is_some() && end_book.is_none() {
            // `Gen 3:4-10` stays in the starting chapter.
            end_book = Some(start_book);
            end_chapter = Some(start_chapter.unwrap_or(1));
        } else if let Some(chapter) = end_verse {
            // `Gen 3:4-Exo 5` runs to the end of the named chapter.
            end_chapter = Some(chapter);
            end_verse = Some(last_verse(end_book.unwrap_or(start_book), chapter));
        }
    }

    // A bare end book (`Gen-Exo`, `Gen 3:4-Exo`) runs to the end of it.
    if let (Some(book), None) = (end_book, end_chapter) {
        let chapter = BOOKS[book].chapter_count() as i64;
        end_chapter = Some(chapter);
        end_verse = Some(last_verse(book, chapter));
    }

    let last = VerseRef::from_parts(
        end_book.unwrap_or(start_book),
        end_chapter.unwrap_or(1),
        end_verse.unwrap_or(1),
    );

    if last > first {
        RangeItem::Range(VerseRange::new(first, last))
    } else {
        RangeItem::Verse(first)
    }
}
