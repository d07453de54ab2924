//! Per-employee and batch orchestration.
//!
//! Chains the resolver, the solver and the projector. An employee that
//! cannot be computed for the month is skipped with its reason recorded;
//! a batch always runs to the end.

use serde::Serialize;
use tracing::{info, warn};

use crate::calculation::try_compute_breakdown;
use crate::config::TemplateCatalog;
use crate::error::NotComputable;
use crate::models::{BreakdownResult, EmployeeSalaryRecord, HistoricalDelta, PayMonth};
use crate::projection::project;
use crate::resolution::resolve;

/// The outcome of computing one employee for one month.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeOutcome {
    /// A breakdown was produced.
    Computed {
        /// The employee's id.
        employee_id: String,
        /// The solved breakdown.
        breakdown: Box<BreakdownResult>,
        /// The breakdown projected for the month, ready to merge.
        delta: HistoricalDelta,
    },
    /// The employee was skipped for the month.
    Skipped {
        /// The employee's id.
        employee_id: String,
        /// Why no breakdown was produced.
        reason: NotComputable,
    },
}

impl EmployeeOutcome {
    /// The employee the outcome belongs to.
    pub fn employee_id(&self) -> &str {
        match self {
            Self::Computed { employee_id, .. } | Self::Skipped { employee_id, .. } => employee_id,
        }
    }

    /// Returns the breakdown if one was produced.
    pub fn breakdown(&self) -> Option<&BreakdownResult> {
        match self {
            Self::Computed { breakdown, .. } => Some(breakdown.as_ref()),
            Self::Skipped { .. } => None,
        }
    }
}

/// A skipped employee and the reason, as reported by a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEmployee {
    /// The employee's id.
    pub employee_id: String,
    /// The skip reason, rendered as text.
    pub reason: String,
}

/// The result of a batch run for one month.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Every outcome, in input order.
    pub outcomes: Vec<EmployeeOutcome>,
}

impl BatchReport {
    /// Number of employees with a breakdown.
    pub fn computed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, EmployeeOutcome::Computed { .. }))
            .count()
    }

    /// Employees that were skipped, with their reasons.
    pub fn skipped(&self) -> Vec<SkippedEmployee> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                EmployeeOutcome::Skipped {
                    employee_id,
                    reason,
                } => Some(SkippedEmployee {
                    employee_id: employee_id.clone(),
                    reason: reason.to_string(),
                }),
                EmployeeOutcome::Computed { .. } => None,
            })
            .collect()
    }

    /// Merges every computed delta into one, in input order.
    pub fn combined_delta(&self) -> HistoricalDelta {
        let mut combined = HistoricalDelta::default();
        for outcome in &self.outcomes {
            if let EmployeeOutcome::Computed { delta, .. } = outcome {
                delta.clone().merge_into(&mut combined);
            }
        }
        combined
    }
}

/// Resolves, solves and projects one employee for one month.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::config::SalaryTemplate;
/// use ctc_breakdown::models::{EmployeeEnrollment, EmployeeSalaryRecord, PayMonth};
/// use ctc_breakdown::pipeline::compute_monthly_breakdown;
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let mut catalog = HashMap::new();
/// catalog.insert("standard".to_string(), SalaryTemplate::new("standard", "Standard"));
///
/// let april = PayMonth::new(2025, 4).unwrap();
/// let mut record = EmployeeSalaryRecord::new("emp_001", EmployeeEnrollment::default());
/// record.assign_template(april, "standard").record_ctc(april, Decimal::from(30000));
///
/// let outcome = compute_monthly_breakdown(&record, &catalog, april);
/// assert!(outcome.breakdown().is_some());
/// ```
pub fn compute_monthly_breakdown<C>(
    record: &EmployeeSalaryRecord,
    catalog: &C,
    period: PayMonth,
) -> EmployeeOutcome
where
    C: TemplateCatalog + ?Sized,
{
    let computed = resolve(record, catalog, period).and_then(|resolved| {
        try_compute_breakdown(
            &record.enrollment,
            Some(resolved.template),
            resolved.monthly_ctc,
        )
    });

    match computed {
        Ok(breakdown) => {
            let delta = project(&breakdown, period);
            EmployeeOutcome::Computed {
                employee_id: record.employee_id.clone(),
                breakdown: Box::new(breakdown),
                delta,
            }
        }
        Err(reason) => {
            warn!(
                employee_id = %record.employee_id,
                period = %period,
                reason = %reason,
                "Skipping employee"
            );
            EmployeeOutcome::Skipped {
                employee_id: record.employee_id.clone(),
                reason,
            }
        }
    }
}

/// Computes every employee for one month, continuing past skipped ones.
pub fn compute_batch<C>(
    records: &[EmployeeSalaryRecord],
    catalog: &C,
    period: PayMonth,
) -> BatchReport
where
    C: TemplateCatalog + ?Sized,
{
    let outcomes: Vec<EmployeeOutcome> = records
        .iter()
        .map(|record| compute_monthly_breakdown(record, catalog, period))
        .collect();

    let report = BatchReport { outcomes };
    info!(
        period = %period,
        employees = records.len(),
        computed = report.computed_count(),
        skipped = records.len() - report.computed_count(),
        "Batch complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SalaryTemplate, TemplateKind};
    use crate::models::EmployeeEnrollment;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn april() -> PayMonth {
        PayMonth::new(2025, 4).unwrap()
    }

    fn catalog() -> HashMap<String, SalaryTemplate> {
        let mut consultant = SalaryTemplate::new("consultant", "Consultant");
        consultant.kind = TemplateKind::Custom;
        consultant.base_ctc = Some(dec("80000"));

        let mut catalog = HashMap::new();
        catalog.insert(
            "standard".to_string(),
            SalaryTemplate::new("standard", "Standard"),
        );
        catalog.insert("consultant".to_string(), consultant);
        catalog
    }

    fn employee(id: &str, template_id: &str, ctc: Option<&str>) -> EmployeeSalaryRecord {
        let mut record = EmployeeSalaryRecord::new(id, EmployeeEnrollment::new(true, false));
        record.assign_template(april(), template_id);
        if let Some(ctc) = ctc {
            record.record_ctc(april(), dec(ctc));
        }
        record
    }

    #[test]
    fn test_computed_outcome_carries_breakdown_and_delta() {
        let outcome =
            compute_monthly_breakdown(&employee("emp_001", "standard", Some("30000")), &catalog(), april());

        match outcome {
            EmployeeOutcome::Computed {
                employee_id,
                breakdown,
                delta,
            } => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(breakdown.monthly_ctc, dec("30000"));
                assert_eq!(delta.statutory[&2025][&4], breakdown.totals);
            }
            other => panic!("Expected computed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_template_is_skipped() {
        let outcome =
            compute_monthly_breakdown(&employee("emp_002", "consultant", None), &catalog(), april());

        assert_eq!(
            outcome,
            EmployeeOutcome::Skipped {
                employee_id: "emp_002".to_string(),
                reason: NotComputable::CustomTemplate {
                    template_id: "consultant".to_string()
                },
            }
        );
    }

    #[test]
    fn test_missing_ctc_is_skipped() {
        let outcome =
            compute_monthly_breakdown(&employee("emp_003", "standard", None), &catalog(), april());

        assert!(matches!(
            outcome,
            EmployeeOutcome::Skipped {
                reason: NotComputable::MissingCtc,
                ..
            }
        ));
    }

    #[test]
    fn test_batch_continues_past_skips() {
        let records = vec![
            employee("emp_001", "standard", Some("30000")),
            employee("emp_002", "consultant", None),
            employee("emp_003", "retired", Some("50000")),
            employee("emp_004", "standard", Some("45000")),
        ];

        let report = compute_batch(&records, &catalog(), april());

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.computed_count(), 2);
        let skipped = report.skipped();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].employee_id, "emp_002");
        assert_eq!(skipped[1].employee_id, "emp_003");
        assert_eq!(skipped[1].reason, "template 'retired' is not in the catalog");

        let ids: Vec<&str> = report.outcomes.iter().map(EmployeeOutcome::employee_id).collect();
        assert_eq!(ids, vec!["emp_001", "emp_002", "emp_003", "emp_004"]);
    }

    #[test]
    fn test_empty_batch() {
        let report = compute_batch(&[], &catalog(), april());
        assert_eq!(report.computed_count(), 0);
        assert!(report.skipped().is_empty());
        assert_eq!(report.combined_delta(), HistoricalDelta::default());
    }
}
