//! Employee enrollment and salary history.
//!
//! This module defines the per-employee inputs the engine consumes: the
//! statutory enrollment flags and the historical tracking maps that the
//! resolver searches for a month's template and CTC.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::{PayMonth, YearMonthMap};

/// Statutory scheme enrollment for an employee.
///
/// When a flag is false every amount of that scheme is zero, whatever the
/// template says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeEnrollment {
    /// The employee holds a provident fund account.
    #[serde(default)]
    pub has_pf_account: bool,
    /// The employee holds a state insurance account.
    #[serde(default)]
    pub has_esi_account: bool,
}

impl EmployeeEnrollment {
    /// Creates an enrollment from the two flags.
    pub fn new(has_pf_account: bool, has_esi_account: bool) -> Self {
        Self {
            has_pf_account,
            has_esi_account,
        }
    }
}

/// An employee's salary record as held by the record store.
///
/// # Example
///
/// ```
/// use ctc_breakdown::models::{EmployeeEnrollment, EmployeeSalaryRecord, PayMonth};
/// use rust_decimal::Decimal;
///
/// let mut record = EmployeeSalaryRecord::new("emp_001", EmployeeEnrollment::new(true, false));
/// record.assign_template(PayMonth::new(2025, 4).unwrap(), "standard");
/// record.record_ctc(PayMonth::new(2025, 4).unwrap(), Decimal::from(50000));
///
/// assert_eq!(record.template_tracking[&2025][&4], "standard");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSalaryRecord {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Statutory enrollment flags.
    #[serde(default)]
    pub enrollment: EmployeeEnrollment,
    /// Template assignments, `year → month → template id`.
    #[serde(default)]
    pub template_tracking: YearMonthMap<String>,
    /// CTC revisions, `year → month → monthly CTC`.
    #[serde(default)]
    pub salary_tracking: YearMonthMap<Decimal>,
    /// CTC overrides from external payroll imports, exact month only.
    #[serde(default)]
    pub payroll_import: YearMonthMap<Decimal>,
}

impl EmployeeSalaryRecord {
    /// Creates a record with empty history.
    pub fn new(employee_id: impl Into<String>, enrollment: EmployeeEnrollment) -> Self {
        Self {
            employee_id: employee_id.into(),
            enrollment,
            template_tracking: YearMonthMap::new(),
            salary_tracking: YearMonthMap::new(),
            payroll_import: YearMonthMap::new(),
        }
    }

    /// Assigns a template from the given month onward.
    pub fn assign_template(&mut self, from: PayMonth, template_id: impl Into<String>) -> &mut Self {
        from.insert(&mut self.template_tracking, template_id.into());
        self
    }

    /// Records a CTC revision effective from the given month.
    pub fn record_ctc(&mut self, from: PayMonth, monthly_ctc: Decimal) -> &mut Self {
        from.insert(&mut self.salary_tracking, monthly_ctc);
        self
    }

    /// Records a payroll-import CTC override for exactly one month.
    pub fn import_ctc(&mut self, month: PayMonth, monthly_ctc: Decimal) -> &mut Self {
        month.insert(&mut self.payroll_import, monthly_ctc);
        self
    }
}
