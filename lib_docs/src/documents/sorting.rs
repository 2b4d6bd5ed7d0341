//! # Sort Engine
//!
//! Orders a document collection for display. Sorting always works on a copy;
//! the caller's slice is never reordered. All comparators feed a stable sort,
//! so documents that compare equal keep their original relative order.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use feruca::Collator;

use super::model::Document;

/// The criterion used to order documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOption {
    /// Title, A to Z.
    TitleAsc,
    /// Title, Z to A.
    TitleDesc,
    /// Creation date, oldest first.
    DateAsc,
    /// Creation date, newest first.
    #[default]
    DateDesc,
    /// Last update, oldest first.
    UpdatedAsc,
    /// Last update, newest first.
    UpdatedDesc,
    /// Any option text we do not recognise; leaves the order untouched.
    Unsorted,
}

impl SortOption {
    /// The recognised options, in menu order.
    pub const ALL: [SortOption; 6] = [
        SortOption::TitleAsc,
        SortOption::TitleDesc,
        SortOption::DateAsc,
        SortOption::DateDesc,
        SortOption::UpdatedAsc,
        SortOption::UpdatedDesc,
    ];

    /// The wire/menu identifier, e.g. `"title-asc"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::TitleAsc => "title-asc",
            SortOption::TitleDesc => "title-desc",
            SortOption::DateAsc => "date-asc",
            SortOption::DateDesc => "date-desc",
            SortOption::UpdatedAsc => "updated-asc",
            SortOption::UpdatedDesc => "updated-desc",
            SortOption::Unsorted => "unsorted",
        }
    }
}

impl FromStr for SortOption {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "title-asc" => SortOption::TitleAsc,
            "title-desc" => SortOption::TitleDesc,
            "date-asc" => SortOption::DateAsc,
            "date-desc" => SortOption::DateDesc,
            "updated-asc" => SortOption::UpdatedAsc,
            "updated-desc" => SortOption::UpdatedDesc,
            _ => SortOption::Unsorted,
        })
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns a sorted copy of `documents`.
///
/// Empty input yields an empty vector; an unrecognised option yields the
/// documents in their original order.
pub fn sort_documents(documents: &[Document], sort_option: SortOption) -> Vec<Document> {
    let mut sorted = documents.to_vec();
    if sorted.is_empty() {
        return sorted;
    }

    match sort_option {
        SortOption::TitleAsc => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(a.title.as_str(), b.title.as_str()))
        }
        SortOption::TitleDesc => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(b.title.as_str(), a.title.as_str()))
        }
        SortOption::DateAsc => {
            sorted.sort_by(|a, b| compare_timestamps(&a.created_at, &b.created_at))
        }
        SortOption::DateDesc => {
            sorted.sort_by(|a, b| compare_timestamps(&b.created_at, &a.created_at))
        }
        SortOption::UpdatedAsc => {
            sorted.sort_by(|a, b| compare_timestamps(&a.updated_at, &b.updated_at))
        }
        SortOption::UpdatedDesc => {
            sorted.sort_by(|a, b| compare_timestamps(&b.updated_at, &a.updated_at))
        }
        SortOption::Unsorted => {}
    }

    sorted
}

/// Same as [`sort_documents`] for a collection that may not exist yet.
pub fn sort_optional(documents: Option<&[Document]>, sort_option: SortOption) -> Vec<Document> {
    documents
        .map(|docs| sort_documents(docs, sort_option))
        .unwrap_or_default()
}

/// Locale-aware string comparison using the Unicode Collation Algorithm
/// with the CLDR root table: accents and case only break ties between
/// otherwise equal letters, so "Éclair" sorts between "e" and "f".
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

/// Milliseconds since the epoch, or `None` when the text is not ISO-8601.
///
/// Accepts RFC 3339, a date-time without offset and a bare date; the last
/// two are taken as UTC.
fn timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc().timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

// Unparseable timestamps order before every valid one.
fn compare_timestamps(a: &str, b: &str) -> Ordering {
    timestamp_millis(a).cmp(&timestamp_millis(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, created: &str, updated: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            version: "1.0".to_string(),
            attachments: vec![format!("attachment{}.pdf", id)],
            created_at: created.to_string(),
            updated_at: updated.to_string(),
            contributors: Some(Vec::new()),
        }
    }

    fn fixtures() -> Vec<Document> {
        vec![
            doc("1", "Zebra Document", "2023-01-01T00:00:00Z", "2023-01-03T00:00:00Z"),
            doc("2", "Apple Document", "2023-01-02T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("3", "Banana Document", "2023-01-03T00:00:00Z", "2023-01-02T00:00:00Z"),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        for option in SortOption::ALL {
            assert!(sort_documents(&[], option).is_empty());
        }
        assert!(sort_optional(None, SortOption::TitleAsc).is_empty());
    }

    #[test]
    fn test_title_sorting() {
        let docs = fixtures();
        let asc = sort_documents(&docs, SortOption::TitleAsc);
        assert_eq!(ids(&asc), vec!["2", "3", "1"]);
        let desc = sort_documents(&docs, SortOption::TitleDesc);
        assert_eq!(ids(&desc), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_created_and_updated_sorting() {
        let docs = fixtures();
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateAsc)), vec!["1", "2", "3"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateDesc)), vec!["3", "2", "1"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::UpdatedAsc)), vec!["2", "3", "1"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::UpdatedDesc)), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_input_is_not_reordered() {
        let docs = fixtures();
        let before = docs.clone();
        let _ = sort_documents(&docs, SortOption::TitleAsc);
        assert_eq!(docs, before);
    }

    #[test]
    fn test_unrecognised_option_keeps_order() {
        let docs = fixtures();
        let option: SortOption = "by-colour".parse().unwrap();
        assert_eq!(option, SortOption::Unsorted);
        assert_eq!(sort_documents(&docs, option), docs);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let docs = vec![
            doc("a", "Same", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("b", "Same", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("c", "Same", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
        ];
        for option in SortOption::ALL {
            assert_eq!(ids(&sort_documents(&docs, option)), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_timezone_offsets_compare_by_instant() {
        let docs = vec![
            doc("late", "x", "2023-01-01T10:00:00+02:00", "2023-01-01T10:00:00Z"),
            doc("early", "y", "2023-01-01T09:00:00Z", "2023-01-01T10:00:00Z"),
        ];
        // 10:00+02:00 is 08:00Z, so "late" is actually first.
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateAsc)), vec!["late", "early"]);
    }

    #[test]
    fn test_unparseable_dates_sort_first_ascending() {
        let docs = vec![
            doc("ok", "x", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("bad", "y", "not a date", "2023-01-01T00:00:00Z"),
        ];
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateAsc)), vec!["bad", "ok"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateDesc)), vec!["ok", "bad"]);
    }

    #[test]
    fn test_locale_compare_ignores_case_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Zebra", "apple"), Ordering::Greater);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("doc", "doc"), Ordering::Equal);
    }

    #[test]
    fn test_accented_titles_sort_with_their_base_letter() {
        let docs = vec![
            doc("z", "Zebra", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("e", "Éclair", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
            doc("f", "fig", "2023-01-01T00:00:00Z", "2023-01-01T00:00:00Z"),
        ];
        assert_eq!(ids(&sort_documents(&docs, SortOption::TitleAsc)), vec!["e", "f", "z"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::TitleDesc)), vec!["z", "f", "e"]);

        assert_eq!(locale_compare("e", "Éclair"), Ordering::Less);
        assert_eq!(locale_compare("Éclair", "f"), Ordering::Less);
        assert_eq!(locale_compare("resume", "résumé"), Ordering::Less);
    }

    #[test]
    fn test_dates_without_offset_are_ordered_as_utc() {
        let docs = vec![
            doc("jan2", "x", "2023-01-02", "2023-01-02"),
            doc("jan1", "y", "2023-01-01", "2023-01-01"),
            doc("jan3", "z", "2023-01-03T00:00:00", "2023-01-03T00:00:00"),
        ];
        assert_eq!(ids(&sort_documents(&docs, SortOption::DateAsc)), vec!["jan1", "jan2", "jan3"]);
        assert_eq!(ids(&sort_documents(&docs, SortOption::UpdatedDesc)), vec!["jan3", "jan2", "jan1"]);

        assert_eq!(timestamp_millis("2023-01-01"), timestamp_millis("2023-01-01T00:00:00Z"));
        assert_eq!(timestamp_millis("2023-01-01T12:30"), timestamp_millis("2023-01-01T12:30:00Z"));
        assert_eq!(timestamp_millis("01/02/2023"), None);
    }

    #[test]
    fn test_option_round_trips_through_text() {
        for option in SortOption::ALL {
            assert_eq!(option.as_str().parse::<SortOption>().unwrap(), option);
        }
    }
}
