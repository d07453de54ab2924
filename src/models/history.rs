//! Historical payroll record shape.
//!
//! A [`HistoricalDelta`] holds breakdown figures keyed by year and month,
//! ready to be merged into an employee's stored history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::breakdown::{BreakdownTotals, LwfAmounts};
use super::period::YearMonthMap;

/// Named amounts for one month, keyed by line or contribution name.
pub type AmountMap = BTreeMap<String, Decimal>;

/// Year/month keyed breakdown figures.
///
/// Field names follow the stored history format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoricalDelta {
    /// Basic pay and every earning line.
    #[serde(default)]
    pub earnings: YearMonthMap<AmountMap>,
    /// Flat deduction lines.
    #[serde(default)]
    pub deductions: YearMonthMap<AmountMap>,
    /// Employee PF and ESI.
    #[serde(default, rename = "employeeDeduction")]
    pub employee_deduction: YearMonthMap<AmountMap>,
    /// Employer PF and ESI.
    #[serde(default, rename = "employersContribution")]
    pub employers_contribution: YearMonthMap<AmountMap>,
    /// Aggregate totals.
    #[serde(default)]
    pub statutory: YearMonthMap<BreakdownTotals>,
    /// Labour welfare fund.
    #[serde(default)]
    pub lwf: YearMonthMap<LwfAmounts>,
    /// Professional tax.
    #[serde(default)]
    pub pt: YearMonthMap<Decimal>,
    /// PF admin charge.
    #[serde(default, rename = "employerAdmin")]
    pub employer_admin: YearMonthMap<Decimal>,
    /// Voluntary PF.
    #[serde(default, rename = "voluntaryPF")]
    pub voluntary_pf: YearMonthMap<Decimal>,
}

impl HistoricalDelta {
    /// Merges this delta into an existing history.
    ///
    /// Months present in the delta replace the same months in `target`;
    /// every other year and month of `target` is kept.
    pub fn merge_into(self, target: &mut HistoricalDelta) {
        merge_section(self.earnings, &mut target.earnings);
        merge_section(self.deductions, &mut target.deductions);
        merge_section(self.employee_deduction, &mut target.employee_deduction);
        merge_section(self.employers_contribution, &mut target.employers_contribution);
        merge_section(self.statutory, &mut target.statutory);
        merge_section(self.lwf, &mut target.lwf);
        merge_section(self.pt, &mut target.pt);
        merge_section(self.employer_admin, &mut target.employer_admin);
        merge_section(self.voluntary_pf, &mut target.voluntary_pf);
    }
}

fn merge_section<T>(source: YearMonthMap<T>, target: &mut YearMonthMap<T>) {
    for (year, months) in source {
        target.entry(year).or_default().extend(months);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn single(year: i32, month: u32, value: Decimal) -> YearMonthMap<Decimal> {
        let mut map = YearMonthMap::new();
        map.entry(year).or_default().insert(month, value);
        map
    }

    #[test]
    fn test_merge_keeps_other_months() {
        let mut existing = HistoricalDelta {
            pt: single(2025, 3, dec("200")),
            ..Default::default()
        };
        let delta = HistoricalDelta {
            pt: single(2025, 4, dec("175")),
            ..Default::default()
        };

        delta.merge_into(&mut existing);

        assert_eq!(existing.pt[&2025][&3], dec("200"));
        assert_eq!(existing.pt[&2025][&4], dec("175"));
    }

    #[test]
    fn test_merge_replaces_same_month() {
        let mut existing = HistoricalDelta {
            employer_admin: single(2025, 4, dec("150")),
            ..Default::default()
        };
        let delta = HistoricalDelta {
            employer_admin: single(2025, 4, dec("90")),
            ..Default::default()
        };

        delta.merge_into(&mut existing);

        assert_eq!(existing.employer_admin[&2025][&4], dec("90"));
    }

    #[test]
    fn test_merge_adds_new_year() {
        let mut existing = HistoricalDelta {
            voluntary_pf: single(2024, 12, dec("1000")),
            ..Default::default()
        };
        HistoricalDelta {
            voluntary_pf: single(2025, 1, dec("1200")),
            ..Default::default()
        }
        .merge_into(&mut existing);

        assert_eq!(existing.voluntary_pf.len(), 2);
        assert_eq!(existing.voluntary_pf[&2025][&1], dec("1200"));
    }

    #[test]
    fn test_serialized_field_names_follow_history_format() {
        let delta = HistoricalDelta {
            employer_admin: single(2025, 4, dec("150")),
            ..Default::default()
        };
        let json = serde_json::to_value(&delta).unwrap();

        assert_eq!(json["employerAdmin"]["2025"]["4"], "150");
        assert!(json.get("employeeDeduction").is_some());
        assert!(json.get("employersContribution").is_some());
        assert!(json.get("voluntaryPF").is_some());
    }
}
