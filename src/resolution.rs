//! Salary template resolution.
//!
//! Picks the template and monthly CTC that apply to an employee in a given
//! month from the employee's tracking history.
//!
//! Template selection: an assignment in the requested month wins, otherwise
//! the latest assignment before it. CTC selection, first match wins:
//!
//! 1. A payroll-import override for exactly the requested month
//! 2. The latest salary-tracking revision on or before the month
//! 3. The template's base CTC

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::{SalaryTemplate, TemplateCatalog};
use crate::error::NotComputable;
use crate::models::{EmployeeSalaryRecord, PayMonth, YearMonthMap};

/// Where a resolved monthly CTC came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CtcSource {
    /// A payroll-import override for the requested month.
    PayrollImport,
    /// A salary-tracking revision effective from the given month.
    SalaryTracking(PayMonth),
    /// The template's base CTC.
    TemplateBase,
    /// No tier produced a CTC.
    Unavailable,
}

/// The template and CTC that apply to an employee for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSalary<'a> {
    /// The selected template's id.
    pub template_id: &'a str,
    /// The selected template.
    pub template: &'a SalaryTemplate,
    /// The month the template assignment took effect.
    pub template_effective: PayMonth,
    /// The monthly CTC, if any tier produced one.
    pub monthly_ctc: Option<Decimal>,
    /// The tier the CTC came from.
    pub ctc_source: CtcSource,
}

/// Resolves the template and monthly CTC for an employee and month.
///
/// # Arguments
///
/// * `record` - The employee's salary record
/// * `catalog` - Where templates are looked up by id
/// * `period` - The month being computed
///
/// # Returns
///
/// The resolved salary, or `NotComputable` when no template assignment
/// exists on or before `period` or the assigned id is missing from the
/// catalog. A missing CTC is not an error here; it is reported as
/// `monthly_ctc: None` and left for the solver to reject.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::config::SalaryTemplate;
/// use ctc_breakdown::models::{EmployeeEnrollment, EmployeeSalaryRecord, PayMonth};
/// use ctc_breakdown::resolution::{resolve, CtcSource};
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let mut catalog = HashMap::new();
/// catalog.insert("standard".to_string(), SalaryTemplate::new("standard", "Standard"));
///
/// let mut record = EmployeeSalaryRecord::new("emp_001", EmployeeEnrollment::default());
/// record
///     .assign_template(PayMonth::new(2025, 1).unwrap(), "standard")
///     .record_ctc(PayMonth::new(2025, 1).unwrap(), Decimal::from(40000));
///
/// let resolved = resolve(&record, &catalog, PayMonth::new(2025, 6).unwrap()).unwrap();
/// assert_eq!(resolved.template_id, "standard");
/// assert_eq!(resolved.monthly_ctc, Some(Decimal::from(40000)));
/// assert_eq!(resolved.ctc_source, CtcSource::SalaryTracking(PayMonth::new(2025, 1).unwrap()));
/// ```
pub fn resolve<'a, C>(
    record: &'a EmployeeSalaryRecord,
    catalog: &'a C,
    period: PayMonth,
) -> Result<ResolvedSalary<'a>, NotComputable>
where
    C: TemplateCatalog + ?Sized,
{
    let (template_effective, template_id) = latest_on_or_before(&record.template_tracking, period)
        .ok_or(NotComputable::NoTemplateForPeriod { period })?;

    let template =
        catalog
            .template(template_id)
            .ok_or_else(|| NotComputable::UnknownTemplate {
                template_id: template_id.clone(),
            })?;

    let (monthly_ctc, ctc_source) = resolve_ctc(record, template, period);

    debug!(
        employee_id = %record.employee_id,
        period = %period,
        template_id = %template_id,
        template_effective = %template_effective,
        ctc_source = ?ctc_source,
        "Resolved salary"
    );

    Ok(ResolvedSalary {
        template_id,
        template,
        template_effective,
        monthly_ctc,
        ctc_source,
    })
}

fn resolve_ctc(
    record: &EmployeeSalaryRecord,
    template: &SalaryTemplate,
    period: PayMonth,
) -> (Option<Decimal>, CtcSource) {
    if let Some(ctc) = period.lookup(&record.payroll_import) {
        return (Some(*ctc), CtcSource::PayrollImport);
    }
    if let Some((effective, ctc)) = latest_on_or_before(&record.salary_tracking, period) {
        return (Some(*ctc), CtcSource::SalaryTracking(effective));
    }
    match template.base_ctc {
        Some(ctc) => (Some(ctc), CtcSource::TemplateBase),
        None => (None, CtcSource::Unavailable),
    }
}

/// Returns the entry for `period` or, failing that, the chronologically
/// latest entry before it. Entries keyed by an invalid month are skipped.
fn latest_on_or_before<T>(map: &YearMonthMap<T>, period: PayMonth) -> Option<(PayMonth, &T)> {
    map.range(..=period.year()).rev().find_map(|(&year, months)| {
        months
            .iter()
            .rev()
            .filter_map(|(&month, value)| PayMonth::new(year, month).ok().map(|m| (m, value)))
            .find(|(month, _)| *month <= period)
    })
}
