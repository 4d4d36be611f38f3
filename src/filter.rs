use crate::enrich::SalesTable;
use crate::schema::Transaction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The active dashboard selection: an inclusive date range plus branch and
/// city multi-selects. `date_range: None` means the caller supplied an
/// incomplete range, which filters nothing on the date axis. An empty branch
/// or city set matches no rows at all; the "everything selected" default
/// comes from [`FilterSelection::select_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSelection {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub branches: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl FilterSelection {
    /// The initial selection: every distinct branch and city present in the
    /// table, with no date restriction.
    pub fn select_all(table: &SalesTable) -> Self {
        Self {
            date_range: None,
            branches: table.distinct_branches(),
            cities: table.distinct_cities(),
        }
    }

    fn matches(&self, t: &Transaction) -> bool {
        if let Some((start, end)) = self.date_range {
            // Rows without a parseable date cannot satisfy a date predicate.
            match t.date {
                Some(d) if d >= start && d <= end => {}
                _ => return false,
            }
        }
        self.branches.contains(&t.branch) && self.cities.contains(&t.city)
    }
}

/// A filtered, read-only view over the enriched table. Rows keep their
/// original order; the view borrows the table and never copies row data.
#[derive(Debug, Clone)]
pub struct View<'a> {
    rows: Vec<&'a Transaction>,
}

impl<'a> View<'a> {
    pub fn rows(&self) -> &[&'a Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SalesTable {
    /// Applies the three filter predicates conjunctively and returns a fresh
    /// view. Selections may name branches or cities absent from the data;
    /// those simply match nothing.
    pub fn filter(&self, selection: &FilterSelection) -> View<'_> {
        View {
            rows: self
                .rows()
                .iter()
                .filter(|t| selection.matches(t))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::tests::raw_record;

    fn table() -> SalesTable {
        let mut rows = Vec::new();
        for (branch, city, date) in [
            ("A", "Yangon", "1/5/2019"),
            ("B", "Mandalay", "1/10/2019"),
            ("C", "Naypyitaw", "2/1/2019"),
            ("A", "Yangon", "2/15/2019"),
        ] {
            let mut raw = raw_record();
            raw.branch = branch.to_string();
            raw.city = city.to_string();
            raw.date = date.to_string();
            rows.push(raw);
        }
        SalesTable::from_raw(&rows)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_selection_keeps_every_row() {
        let table = table();
        let selection = FilterSelection::select_all(&table);
        assert_eq!(table.filter(&selection).len(), table.len());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let table = table();
        let mut selection = FilterSelection::select_all(&table);
        selection.date_range = Some((day(2019, 1, 1), day(2019, 1, 31)));
        selection.branches = ["A".to_string()].into_iter().collect();

        let view = table.filter(&selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].branch, "A");
        assert_eq!(view.rows()[0].date, Some(day(2019, 1, 5)));
    }

    #[test]
    fn inclusive_date_bounds() {
        let table = table();
        let mut selection = FilterSelection::select_all(&table);
        selection.date_range = Some((day(2019, 1, 5), day(2019, 2, 1)));
        assert_eq!(table.filter(&selection).len(), 3);
    }

    #[test]
    fn empty_branch_set_matches_nothing() {
        let table = table();
        let mut selection = FilterSelection::select_all(&table);
        selection.branches.clear();
        assert!(table.filter(&selection).is_empty());
    }

    #[test]
    fn unknown_values_are_tolerated() {
        let table = table();
        let mut selection = FilterSelection::select_all(&table);
        selection.branches.insert("Z".to_string());
        selection.cities.insert("Atlantis".to_string());
        assert_eq!(table.filter(&selection).len(), table.len());
    }

    #[test]
    fn row_order_is_preserved() {
        let table = table();
        let selection = FilterSelection::select_all(&table);
        let view = table.filter(&selection);
        let branches: Vec<_> = view.rows().iter().map(|t| t.branch.as_str()).collect();
        assert_eq!(branches, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn rows_without_a_date_fail_active_date_filters() {
        let mut raw = raw_record();
        raw.date = "not a date".to_string();
        let table = SalesTable::from_raw(&[raw]);

        let mut selection = FilterSelection::select_all(&table);
        assert_eq!(table.filter(&selection).len(), 1);

        selection.date_range = Some((day(2019, 1, 1), day(2019, 12, 31)));
        assert!(table.filter(&selection).is_empty());
    }
}
