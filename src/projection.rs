//! Projection of a breakdown into the historical record shape.

use rust_decimal::Decimal;

use crate::config::{EMPLOYEE_ESI, EMPLOYEE_PF, EMPLOYER_ESI, EMPLOYER_PF};
use crate::models::{AmountMap, BreakdownResult, HistoricalDelta, PayMonth};

/// Key under which basic pay is stored in the earnings section.
pub const BASIC_KEY: &str = "Basic";

/// Projects a breakdown into a delta for one month.
///
/// Pure: the delta holds only `period`, and merging it into stored history
/// is left to the caller (see [`HistoricalDelta::merge_into`]).
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::solve;
/// use ctc_breakdown::config::SalaryTemplate;
/// use ctc_breakdown::models::{EmployeeEnrollment, PayMonth};
/// use ctc_breakdown::projection::project;
/// use rust_decimal::Decimal;
///
/// let template = SalaryTemplate::new("basic_only", "Basic Only");
/// let result = solve(&template, Decimal::from(30000), &EmployeeEnrollment::default()).unwrap();
///
/// let delta = project(&result, PayMonth::new(2025, 4).unwrap());
/// assert_eq!(delta.earnings[&2025][&4]["Basic"], result.basic);
/// assert_eq!(delta.statutory[&2025][&4], result.totals);
/// ```
pub fn project(result: &BreakdownResult, period: PayMonth) -> HistoricalDelta {
    let mut delta = HistoricalDelta::default();

    let mut earnings = AmountMap::new();
    earnings.insert(BASIC_KEY.to_string(), result.basic);
    for line in &result.earnings {
        earnings.insert(line.name.clone(), line.amount);
    }
    period.insert(&mut delta.earnings, earnings);

    let deductions: AmountMap = result
        .deductions
        .iter()
        .map(|line| (line.name.clone(), line.amount))
        .collect();
    period.insert(&mut delta.deductions, deductions);

    period.insert(
        &mut delta.employee_deduction,
        pair(
            EMPLOYEE_PF,
            result.employee_contributions.pf,
            EMPLOYEE_ESI,
            result.employee_contributions.esi,
        ),
    );
    period.insert(
        &mut delta.employers_contribution,
        pair(
            EMPLOYER_PF,
            result.employer_contributions.pf,
            EMPLOYER_ESI,
            result.employer_contributions.esi,
        ),
    );

    period.insert(&mut delta.statutory, result.totals);
    period.insert(&mut delta.lwf, result.labour_welfare_fund.clone());
    period.insert(&mut delta.pt, result.professional_tax);
    period.insert(&mut delta.employer_admin, result.admin_charge);
    period.insert(&mut delta.voluntary_pf, result.voluntary_pf);

    delta
}

fn pair(pf_key: &str, pf: Decimal, esi_key: &str, esi: Decimal) -> AmountMap {
    AmountMap::from([(pf_key.to_string(), pf), (esi_key.to_string(), esi)])
}
