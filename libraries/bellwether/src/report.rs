//! Read-only snapshot queries: the contract the engine owes the presentation
//! layer and its export views. All functions take a snapshot clone, never the
//! canonical collections; nothing here mutates anything.

use chrono::{DateTime, Days, Local, NaiveTime, Utc};

use crate::model::TardinessRecord;

/// A half-open instant window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Local midnight to next local midnight around `now`.
    pub fn today(now: DateTime<Utc>) -> Self {
        let start = local_midnight(now);
        DateRange {
            start,
            end: start + Days::new(1),
        }
    }

    /// The seven local days ending with today.
    pub fn past_week(now: DateTime<Utc>) -> Self {
        let today = Self::today(now);
        DateRange {
            start: today.start - Days::new(6),
            end: today.end,
        }
    }

    /// The thirty-one local days ending with today.
    pub fn past_month(now: DateTime<Utc>) -> Self {
        let today = Self::today(now);
        DateRange {
            start: today.start - Days::new(30),
            end: today.end,
        }
    }
}

fn local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_day = now.with_timezone(&Local).date_naive();
    match local_day.and_time(NaiveTime::MIN).and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.with_timezone(&Utc)
        }
        // a missing local midnight (DST gap) falls back to the UTC day start
        chrono::LocalResult::None => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter selection as the presentation layer hands it over. Empty/None fields
/// don't constrain.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    pub search: Option<String>,
    pub grade: Option<u8>,
    pub strand: Option<String>,
    pub section: Option<String>,
    pub range: Option<DateRange>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Apply a filter selection to a snapshot. Name search is case-insensitive
/// substring; categorical filters are exact.
pub fn filter_entries(
    snapshot: &im::Vector<TardinessRecord>,
    filter: &EntryFilter,
) -> im::Vector<TardinessRecord> {
    let needle = filter
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty());

    let mut filtered: im::Vector<TardinessRecord> = snapshot
        .iter()
        .filter(|e| {
            needle
                .as_deref()
                .is_none_or(|n| e.full_name.to_lowercase().contains(n))
        })
        .filter(|e| filter.grade.is_none_or(|g| e.grade == g))
        .filter(|e| filter.strand.as_deref().is_none_or(|s| e.strand == s))
        .filter(|e| filter.section.as_deref().is_none_or(|s| e.section == s))
        .filter(|e| filter.range.is_none_or(|r| r.contains(e.timestamp)))
        .cloned()
        .collect();

    match filter.sort {
        SortOrder::NewestFirst => filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::OldestFirst => filtered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
    }
    filtered
}

/// The header counts the summary bar shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub today: usize,
    pub week: usize,
    pub month: usize,
    pub total: usize,
}

pub fn summarize(snapshot: &im::Vector<TardinessRecord>, now: DateTime<Utc>) -> Summary {
    let today = DateRange::today(now);
    let week = DateRange::past_week(now);
    let month = DateRange::past_month(now);
    let count = |range: &DateRange| snapshot.iter().filter(|e| range.contains(e.timestamp)).count();
    Summary {
        today: count(&today),
        week: count(&week),
        month: count(&month),
        total: snapshot.len(),
    }
}

/// Per-group tallies for the export views, sorted by (grade, strand, section).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub grade: u8,
    pub strand: String,
    pub section: String,
    pub count: usize,
}

pub fn group_counts(snapshot: &im::Vector<TardinessRecord>) -> Vec<GroupCount> {
    let mut counts: std::collections::BTreeMap<(u8, String, String), usize> =
        std::collections::BTreeMap::new();
    for e in snapshot {
        *counts
            .entry((e.grade, e.strand.clone(), e.section.clone()))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((grade, strand, section), count)| GroupCount {
            grade,
            strand,
            section,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, grade: u8, section: &str, timestamp: DateTime<Utc>) -> TardinessRecord {
        TardinessRecord {
            id: name.to_lowercase(),
            full_name: name.to_string(),
            grade,
            strand: "STEM".to_string(),
            section: section.to_string(),
            timestamp,
        }
    }

    fn snapshot() -> im::Vector<TardinessRecord> {
        let now = Utc::now();
        im::Vector::from(vec![
            record("Ana", 11, "A", now),
            record("Bert", 11, "B", now - chrono::Duration::days(2)),
            record("Carla", 12, "A", now - chrono::Duration::days(10)),
            record("Dario", 12, "A", now - chrono::Duration::days(45)),
        ])
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = EntryFilter {
            search: Some("AR".to_string()),
            ..Default::default()
        };
        let names: Vec<_> = filter_entries(&snapshot(), &filter)
            .iter()
            .map(|e| e.full_name.clone())
            .collect();
        assert_eq!(names, vec!["Carla", "Dario"]);
    }

    #[test]
    fn test_categorical_filters_are_exact() {
        let filter = EntryFilter {
            grade: Some(12),
            section: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_entries(&snapshot(), &filter).len(), 2);

        let filter = EntryFilter {
            grade: Some(11),
            section: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_entries(&snapshot(), &filter).len(), 1);
    }

    #[test]
    fn test_range_filter_and_sort_order() {
        let filter = EntryFilter {
            range: Some(DateRange::past_week(Utc::now())),
            sort: SortOrder::OldestFirst,
            ..Default::default()
        };
        let names: Vec<_> = filter_entries(&snapshot(), &filter)
            .iter()
            .map(|e| e.full_name.clone())
            .collect();
        assert_eq!(names, vec!["Bert", "Ana"]);
    }

    #[test]
    fn test_summary_counts_nest() {
        let summary = summarize(&snapshot(), Utc::now());
        assert_eq!(summary.today, 1);
        assert_eq!(summary.week, 2);
        assert_eq!(summary.month, 3);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_group_counts_sorted_by_triple() {
        let counts = group_counts(&snapshot());
        assert_eq!(counts.len(), 3);
        assert_eq!((counts[0].grade, counts[0].count), (11, 1)); // 11-STEM-A
        assert_eq!((counts[1].grade, counts[1].count), (11, 1)); // 11-STEM-B
        assert_eq!((counts[2].grade, counts[2].count), (12, 2)); // 12-STEM-A
    }

    #[test]
    fn test_today_window_is_local_midnight_bounded() {
        let now = Utc::now();
        let today = DateRange::today(now);
        assert!(today.contains(now));
        assert!(!today.contains(today.end));
        assert_eq!(today.end - today.start, chrono::Duration::days(1));
    }
}
