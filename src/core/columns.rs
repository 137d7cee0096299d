//! Spreadsheet column letters and header lookup.
//!
//! Letters are base-26 with no zero digit (`A` = 1, `Z` = 26, `AA` = 27).
//! Because table column 0 is the sheet-order slot, the value of a letter is
//! directly its index in a [`Row`](crate::core::Row).

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::core::Row;
use crate::core::filter::is_diacritic;
use crate::error::{GridError, Result};

/// Converts a column letter to its table index.
///
/// Case-insensitive. Characters outside `A`-`Z` are skipped, so input with no
/// letters at all yields 0 (the sheet-order column) instead of an error.
///
/// # Example
///
/// ```rust
/// use tsvgrid::core::letter_to_index;
///
/// assert_eq!(letter_to_index("A"), 1);
/// assert_eq!(letter_to_index("z"), 26);
/// assert_eq!(letter_to_index("AC"), 29);
/// assert_eq!(letter_to_index("?"), 0);
/// ```
pub fn letter_to_index(letter: &str) -> usize {
    letter
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_uppercase)
        .fold(0usize, |acc, c| {
            acc.saturating_mul(26)
                .saturating_add(usize::from(c as u8 - b'A' + 1))
        })
}

/// Widest addressable column, `ZZZ`.
pub const MAX_COLUMN_INDEX: usize = 18_278;

/// A validated column address.
///
/// Holds the letter as configured (upper-cased) and its resolved table index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    letter: String,
    index: usize,
}

impl Column {
    /// Parses a letter, rejecting input that addresses no data column or a
    /// column past [`MAX_COLUMN_INDEX`].
    pub fn parse(letter: &str) -> Result<Self> {
        let index = letter_to_index(letter);
        if index == 0 || index > MAX_COLUMN_INDEX {
            return Err(GridError::invalid_column(letter));
        }
        Ok(Self {
            letter: letter
                .chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase())
                .collect(),
            index,
        })
    }

    /// Builds a column from a table index (`1` is `A`).
    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            letter: index_to_letter(index),
            index,
        }
    }

    pub fn letter(&self) -> &str {
        &self.letter
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letter)
    }
}

// Labels only: used to name columns expanded from a configured range.
fn index_to_letter(mut index: usize) -> String {
    let mut out = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        out.push(char::from(b'A' + rem as u8));
        index = (index - 1) / 26;
    }
    out.iter().rev().collect()
}

/// Normalizes a header label for lookup: lowercase, accents stripped, runs of
/// non-word characters collapsed to one space, trimmed.
pub fn header_key(label: &str) -> String {
    let folded: String = label
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .collect();

    folded
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A logical field and its priority-ordered header candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Logical name, e.g. `"phone"`
    pub name: String,
    /// Header patterns tried in order
    pub candidates: Vec<String>,
    /// Values are phone numbers; the detail view offers a WhatsApp link
    #[serde(default)]
    pub phone: bool,
}

impl FieldSpec {
    pub fn new<I, S>(name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            phone: false,
        }
    }

    /// Marks the field as holding phone numbers.
    #[must_use]
    pub fn phone(mut self) -> Self {
        self.phone = true;
        self
    }
}

/// Logical field names resolved to column indices for one loaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldResolver {
    resolved: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedField {
    name: String,
    index: Option<usize>,
    phone: bool,
}

impl FieldResolver {
    /// Resolves every field against the header row.
    ///
    /// For each field the candidates are tried in order; a candidate matches
    /// the first header whose key equals its key, otherwise the first header
    /// whose key contains it. The sheet-order column is never matched.
    pub fn resolve(fields: &[FieldSpec], headers: &[String]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();

        let resolved = fields
            .iter()
            .map(|field| {
                let index = field.candidates.iter().find_map(|candidate| {
                    let wanted = header_key(candidate);
                    if wanted.is_empty() {
                        return None;
                    }
                    let data_keys = || keys.iter().enumerate().skip(1);
                    data_keys()
                        .find(|(_, key)| **key == wanted)
                        .or_else(|| data_keys().find(|(_, key)| key.contains(&wanted)))
                        .map(|(i, _)| i)
                });
                ResolvedField {
                    name: field.name.clone(),
                    index,
                    phone: field.phone,
                }
            })
            .collect();

        Self { resolved }
    }

    /// Column index for a logical field, if any candidate matched.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.resolved
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.index)
    }

    /// Returns `true` if the named field was configured as a phone field.
    pub fn is_phone(&self, name: &str) -> bool {
        self.resolved.iter().any(|field| field.name == name && field.phone)
    }

    /// Trimmed value of a logical field in a row, if the field resolved.
    pub fn value<'r>(&self, name: &str, row: &'r Row) -> Option<&'r str> {
        self.index_of(name).map(|i| row.cell(i).trim())
    }

    /// Resolved fields in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<usize>)> {
        self.resolved
            .iter()
            .map(|field| (field.name.as_str(), field.index))
    }
}

/// Digits of a phone cell, or `None` when fewer than 7 remain.
///
/// ```rust
/// use tsvgrid::core::phone_digits;
///
/// assert_eq!(phone_digits("(300) 111-2233").as_deref(), Some("3001112233"));
/// assert_eq!(phone_digits("ext 12"), None);
/// ```
pub fn phone_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() >= 7).then_some(digits)
}

/// `wa.me` chat link for a phone number. Ten-digit numbers are local and get
/// the `57` country code.
pub fn whatsapp_link(phone: &str) -> String {
    let mut digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        digits.insert_str(0, "57");
    }
    format!("https://wa.me/{digits}")
}
