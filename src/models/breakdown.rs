//! Breakdown result models.
//!
//! This module contains the [`BreakdownResult`] type and its associated
//! structures: per-line amounts, statutory figures, totals, the solver's
//! convergence report and the audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named monetary amount (an earning or deduction line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAmount {
    /// The line name.
    pub name: String,
    /// The computed amount.
    pub amount: Decimal,
}

impl ComponentAmount {
    /// Creates a component amount.
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// The PF and ESI amounts of one side (employer or employee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatutoryAmounts {
    /// Provident fund.
    pub pf: Decimal,
    /// State insurance.
    pub esi: Decimal,
}

impl StatutoryAmounts {
    /// Sum of both schemes.
    pub fn total(&self) -> Decimal {
        self.pf + self.esi
    }
}

/// Labour welfare fund amounts, read straight from the state rule.
///
/// These are reported alongside the breakdown and are not part of the totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LwfAmounts {
    /// The state the rule belongs to, if the template has one.
    pub state: Option<String>,
    /// Employer contribution.
    pub employer: Decimal,
    /// Employee contribution.
    pub employee: Decimal,
}

/// Aggregate totals of a breakdown.
///
/// `net_salary` is always
/// `total_earnings + total_employer - (total_employee + total_deductions + total_employer)`.
/// The employer total cancels, so net pay never includes the employer's own
/// contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownTotals {
    /// Basic pay plus every earning line.
    pub total_earnings: Decimal,
    /// Employer PF, employer ESI and the admin charge.
    pub total_employer: Decimal,
    /// Employee PF, employee ESI, professional tax and voluntary PF.
    pub total_employee: Decimal,
    /// Flat deduction lines.
    pub total_deductions: Decimal,
    /// Take-home pay.
    pub net_salary: Decimal,
}

impl BreakdownTotals {
    /// Builds totals from the four sums, deriving net salary.
    pub fn new(
        total_earnings: Decimal,
        total_employer: Decimal,
        total_employee: Decimal,
        total_deductions: Decimal,
    ) -> Self {
        let net_salary =
            total_earnings + total_employer - (total_employee + total_deductions + total_employer);
        Self {
            total_earnings,
            total_employer,
            total_employee,
            total_deductions,
            net_salary,
        }
    }

    /// Cost to company reconstructed from the breakdown.
    pub fn cost_to_company(&self) -> Decimal {
        self.total_earnings + self.total_employer
    }
}

/// How the solver's iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// True if the reconstructed CTC came within one unit of the target.
    pub converged: bool,
    /// Number of passes evaluated.
    pub passes: u32,
    /// Reconstructed CTC minus target CTC after the final pass.
    pub final_gap: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings never stop a calculation; they flag results worth a second look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The audit trace of a breakdown.
///
/// Holds no timestamps or generated ids, so identical inputs give identical
/// traces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step, numbering it after the existing ones.
    pub fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: impl Into<String>,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning: reasoning.into(),
        });
    }

    /// Returns true if a warning with this code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The complete payroll breakdown for one employee and month.
///
/// Created fresh per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownResult {
    /// The template the breakdown was solved against.
    pub template_id: String,
    /// The target monthly CTC.
    pub monthly_ctc: Decimal,
    /// Basic pay.
    pub basic: Decimal,
    /// Every earning line in template order, including HRA and DA.
    pub earnings: Vec<ComponentAmount>,
    /// Flat deduction lines.
    pub deductions: Vec<ComponentAmount>,
    /// Employer PF and ESI.
    pub employer_contributions: StatutoryAmounts,
    /// Employee PF and ESI.
    pub employee_contributions: StatutoryAmounts,
    /// PF admin charge paid by the employer.
    pub admin_charge: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// Voluntary PF.
    pub voluntary_pf: Decimal,
    /// Labour welfare fund.
    pub labour_welfare_fund: LwfAmounts,
    /// Aggregate totals.
    pub totals: BreakdownTotals,
    /// How the solver's iteration ended.
    pub convergence: ConvergenceReport,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl BreakdownResult {
    /// Returns the amount of a named earning line.
    pub fn earning(&self, name: &str) -> Option<Decimal> {
        self.earnings
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.amount)
    }
}
