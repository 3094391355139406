//! Headline figures and country ranking

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::VaccinationDate;
use crate::snapshot::Snapshot;

/// Figures shown in the dashboard header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_cases: u64,
    pub total_deaths: u64,
    pub total_vaccinated: u64,
    /// Date the vaccination total was read from, if any
    pub vaccinated_as_of: Option<NaiveDate>,
    pub top_countries: Vec<String>,
}

/// Sum of confirmed cases across all daily report rows
pub fn total_cases(snapshot: &Snapshot) -> u64 {
    snapshot
        .daily_report()
        .iter()
        .map(|r| r.confirmed)
        .fold(0, u64::saturating_add)
}

/// Sum of deaths across all daily report rows
pub fn total_deaths(snapshot: &Snapshot) -> u64 {
    snapshot
        .daily_report()
        .iter()
        .map(|r| r.deaths)
        .fold(0, u64::saturating_add)
}

/// Doses administered on exactly `as_of`, summed over countries. Missing
/// values count as zero; no matching rows gives zero.
pub fn total_vaccinated(snapshot: &Snapshot, as_of: NaiveDate) -> u64 {
    snapshot
        .time_series()
        .iter()
        .filter(|r| r.reported_on == as_of)
        .filter_map(|r| r.doses_administered)
        .fold(0, u64::saturating_add)
}

/// Most recent date present in the time series
pub fn latest_reported_on(snapshot: &Snapshot) -> Option<NaiveDate> {
    snapshot.time_series().iter().map(|r| r.reported_on).max()
}

/// The `n` countries with the most confirmed cases, highest first.
///
/// Countries with equal totals keep the order in which they first appear in
/// the daily report.
pub fn top_countries_by_confirmed(snapshot: &Snapshot, n: usize) -> Vec<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, u64)> = Vec::new();

    for row in snapshot.daily_report() {
        match index.get(row.country.as_str()).copied() {
            Some(i) => totals[i].1 = totals[i].1.saturating_add(row.confirmed),
            None => {
                index.insert(row.country.as_str(), totals.len());
                totals.push((row.country.as_str(), row.confirmed));
            }
        }
    }

    // sort_by is stable, which preserves first-seen order on ties
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
        .into_iter()
        .take(n)
        .map(|(country, _)| country.to_string())
        .collect()
}

pub fn summarize(snapshot: &Snapshot, vaccination_date: VaccinationDate, top_n: usize) -> Summary {
    let vaccinated_as_of = match vaccination_date {
        VaccinationDate::Fixed(date) => Some(date),
        VaccinationDate::Latest => latest_reported_on(snapshot),
    };

    Summary {
        total_cases: total_cases(snapshot),
        total_deaths: total_deaths(snapshot),
        total_vaccinated: vaccinated_as_of
            .map(|date| total_vaccinated(snapshot, date))
            .unwrap_or(0),
        vaccinated_as_of,
        top_countries: top_countries_by_confirmed(snapshot, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::fixtures::{report, series};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_totals_ignore_row_order() {
        let rows = vec![report("A", 100, 5), report("B", 50, 2), report("C", 75, 1)];
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = Snapshot::new(rows, vec![]);
        let backward = Snapshot::new(reversed, vec![]);

        assert_eq!(total_cases(&forward), 225);
        assert_eq!(total_cases(&backward), 225);
        assert_eq!(total_deaths(&forward), 8);
        assert_eq!(total_deaths(&backward), 8);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let snapshot = Snapshot::new(
            vec![report("A", u64::MAX, u64::MAX), report("A", 10, 10), report("B", 1, 0)],
            vec![
                series("A", "2023-03-09", 1, 0, Some(u64::MAX)),
                series("B", "2023-03-09", 1, 0, Some(5)),
            ],
        );

        assert_eq!(total_cases(&snapshot), u64::MAX);
        assert_eq!(total_deaths(&snapshot), u64::MAX);
        assert_eq!(total_vaccinated(&snapshot, date("2023-03-09")), u64::MAX);
        assert_eq!(top_countries_by_confirmed(&snapshot, 2), vec!["A", "B"]);
    }

    #[test]
    fn test_top_countries_ranked_by_summed_confirmed() {
        let snapshot = Snapshot::new(
            vec![report("A", 100, 0), report("B", 50, 0), report("C", 75, 0)],
            vec![],
        );
        assert_eq!(top_countries_by_confirmed(&snapshot, 3), vec!["A", "C", "B"]);
        assert_eq!(top_countries_by_confirmed(&snapshot, 1), vec!["A"]);
        assert_eq!(top_countries_by_confirmed(&snapshot, 10).len(), 3);
    }

    #[test]
    fn test_top_countries_groups_rows_and_keeps_tie_order() {
        let snapshot = Snapshot::new(
            vec![
                report("B", 30, 0),
                report("A", 10, 0),
                report("B", 30, 0),
                report("C", 60, 0),
                report("A", 50, 0),
            ],
            vec![],
        );
        // B, C and A all total 60
        assert_eq!(top_countries_by_confirmed(&snapshot, 3), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_total_vaccinated_on_date() {
        let snapshot = Snapshot::new(
            vec![],
            vec![
                series("X", "2023-03-08", 1, 0, Some(10)),
                series("X", "2023-03-09", 1, 0, Some(20)),
                series("Y", "2023-03-09", 1, 0, Some(5)),
                series("Z", "2023-03-09", 1, 0, None),
            ],
        );
        assert_eq!(total_vaccinated(&snapshot, date("2023-03-09")), 25);
        assert_eq!(total_vaccinated(&snapshot, date("2020-01-01")), 0);
    }

    #[test]
    fn test_summary_with_latest_date() {
        let snapshot = Snapshot::new(
            vec![report("X", 10, 1)],
            vec![
                series("X", "2023-03-10", 1, 0, Some(7)),
                series("X", "2023-03-09", 1, 0, Some(3)),
            ],
        );

        let summary = summarize(&snapshot, VaccinationDate::Latest, 30);
        assert_eq!(summary.vaccinated_as_of, Some(date("2023-03-10")));
        assert_eq!(summary.total_vaccinated, 7);
        assert_eq!(summary.total_cases, 10);
        assert_eq!(summary.top_countries, vec!["X"]);

        let fixed = summarize(&snapshot, VaccinationDate::Fixed(date("2023-03-09")), 30);
        assert_eq!(fixed.total_vaccinated, 3);
    }

    #[test]
    fn test_summary_of_empty_snapshot() {
        let summary = summarize(&Snapshot::default(), VaccinationDate::Latest, 30);
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.total_vaccinated, 0);
        assert_eq!(summary.vaccinated_as_of, None);
        assert!(summary.top_countries.is_empty());
    }
}
