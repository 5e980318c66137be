//! The merged wage/CPI view, evaluated in memory.
//!
//! This is the same relation as the `wage_cpi_merged_v` SQL view: an inner
//! join on month with derived calendar columns and the wage/CPI ratio. CPI is
//! assumed positive; no division guard is applied.

use std::collections::HashMap;

use crate::domain::{CleanObservation, MergedRecord, Month};

/// Inner-join two clean series on month. Output is ordered by month.
pub fn merge_series(wage: &[CleanObservation], cpi: &[CleanObservation]) -> Vec<MergedRecord> {
    let cpi_by_month: HashMap<Month, f64> = cpi.iter().map(|o| (o.month, o.value)).collect();

    let mut merged: Vec<MergedRecord> = wage
        .iter()
        .filter_map(|w| {
            let cpi = *cpi_by_month.get(&w.month)?;
            Some(merged_record(w.month, w.value, cpi))
        })
        .collect();
    merged.sort_by_key(|r| r.month);
    merged
}

pub fn merged_record(month: Month, wage_index: f64, cpi: f64) -> MergedRecord {
    MergedRecord {
        month,
        year: month.year(),
        month_num: month.month_num(),
        season: month.season(),
        wage_index,
        cpi,
        wage_to_cpi_ratio: wage_index / cpi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Season;

    fn obs(month: &str, value: f64) -> CleanObservation {
        CleanObservation {
            month: month.parse().unwrap(),
            value,
        }
    }

    #[test]
    fn keeps_only_months_present_in_both_series() {
        let wage = vec![obs("2010-01", 100.0), obs("2010-02", 101.0)];
        let cpi = vec![obs("2010-02", 50.0), obs("2010-03", 51.0)];

        let merged = merge_series(&wage, &cpi);
        assert_eq!(merged.len(), 1);

        let row = &merged[0];
        assert_eq!(row.month.to_string(), "2010-02");
        assert_eq!(row.year, 2010);
        assert_eq!(row.month_num, 2);
        assert_eq!(row.season, Season::Winter);
        assert_eq!(row.wage_to_cpi_ratio, 101.0 / 50.0);
    }

    #[test]
    fn derives_summer_ratio_for_june() {
        let merged = merge_series(&[obs("2020-06", 410.3)], &[obs("2020-06", 210.1)]);
        assert_eq!(
            merged,
            vec![MergedRecord {
                month: "2020-06".parse().unwrap(),
                year: 2020,
                month_num: 6,
                season: Season::Summer,
                wage_index: 410.3,
                cpi: 210.1,
                wage_to_cpi_ratio: 410.3 / 210.1,
            }]
        );
    }

    #[test]
    fn output_is_ordered_by_month() {
        let wage = vec![obs("2011-03", 3.0), obs("2010-12", 1.0)];
        let cpi = vec![obs("2010-12", 1.0), obs("2011-03", 1.0)];
        let months: Vec<String> = merge_series(&wage, &cpi).iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2010-12", "2011-03"]);
    }

    #[test]
    fn empty_side_yields_empty_view() {
        assert!(merge_series(&[obs("2010-01", 1.0)], &[]).is_empty());
    }
}
