//! The breakdown solver.
//!
//! Given a template, a target monthly CTC and the employee's enrollment, the
//! solver reverse-engineers basic pay, HRA and DA so that gross salary plus
//! the employer contributions counted inside CTC reconstructs the target.
//!
//! Each pass evaluates the employer contributions for the current amounts
//! and compares the reconstructed CTC with the target. An excess is taken
//! out of HRA, then DA, then basic. A shortfall is put back into basic, then
//! DA, then HRA, each up to its target share; whatever is still short after
//! that goes to basic. Basic is the PF/ESI basis, so it is the last to shrink
//! and the first to grow. Iteration stops within one unit of the target or
//! after [`MAX_SOLVER_PASSES`] passes, whichever comes first.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{
    EMPLOYEE_ESI, EMPLOYEE_PF, EMPLOYER_ESI, EMPLOYER_PF, SalaryTemplate, StatutoryContribution,
};
use crate::error::NotComputable;
use crate::models::{
    AuditTrace, AuditWarning, BreakdownResult, BreakdownTotals, ComponentAmount,
    ConvergenceReport, EmployeeEnrollment, LwfAmounts, StatutoryAmounts,
};

use super::allocation::{Allocation, Slack, WorkingState, allocate, unknown_basis_names};
use super::professional_tax::{find_slab, professional_tax as pt_amount};
use super::rounding::round_amount;
use super::statutory;

/// Upper bound on solver passes.
pub const MAX_SOLVER_PASSES: u32 = 10;

/// The solver stops once the reconstructed CTC is closer than this to the
/// target.
pub const CONVERGENCE_TOLERANCE: Decimal = Decimal::ONE;

/// Warning raised when the pass bound is reached.
pub const WARNING_NOT_CONVERGED: &str = "SOLVER_NOT_CONVERGED";
/// Warning raised when fixed earnings exceed the CTC.
pub const WARNING_ADJUSTABLE_CLAMPED: &str = "ADJUSTABLE_CTC_CLAMPED";
/// Warning raised when a calculation basis names an unknown line.
pub const WARNING_UNKNOWN_BASIS: &str = "UNKNOWN_BASIS_COMPONENT";

const EXCESS_ORDER: [Slack; 3] = [Slack::Hra, Slack::DearnessAllowance, Slack::Basic];
const SHORTFALL_ORDER: [Slack; 3] = [Slack::Basic, Slack::DearnessAllowance, Slack::Hra];

/// Employer-side figures for one pass.
#[derive(Debug, Clone, Copy)]
struct EmployerSnapshot {
    employer_pf: Decimal,
    employer_esi: Decimal,
    admin_charge: Decimal,
    current_ctc: Decimal,
}

/// Computes a breakdown, treating absent inputs as not computable.
///
/// Returns `None` when the template or CTC is missing, when the template is
/// the custom kind, or when the CTC is negative.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::compute_breakdown;
/// use ctc_breakdown::config::{ContributionRate, SalaryTemplate, StatutoryContribution};
/// use ctc_breakdown::models::EmployeeEnrollment;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let mut template = SalaryTemplate::new("basic_only", "Basic Only");
/// template.employer_contributions.insert(
///     "EmployerPF".to_string(),
///     StatutoryContribution {
///         selected_option: ContributionRate::Percentage(Decimal::from(12)),
///         included_in_ctc: true,
///         calculation_basis: vec![],
///     },
/// );
///
/// let enrollment = EmployeeEnrollment::new(true, false);
/// let result = compute_breakdown(&enrollment, Some(&template), Some(Decimal::from(50000))).unwrap();
///
/// assert_eq!(result.basic, Decimal::from_str("44642.9").unwrap());
/// assert_eq!(result.employer_contributions.pf, Decimal::from_str("5357.1").unwrap());
/// assert!(result.convergence.converged);
///
/// assert!(compute_breakdown(&enrollment, Some(&template), None).is_none());
/// ```
pub fn compute_breakdown(
    enrollment: &EmployeeEnrollment,
    template: Option<&SalaryTemplate>,
    monthly_ctc: Option<Decimal>,
) -> Option<BreakdownResult> {
    try_compute_breakdown(enrollment, template, monthly_ctc).ok()
}

/// Computes a breakdown, reporting why it could not be computed.
pub fn try_compute_breakdown(
    enrollment: &EmployeeEnrollment,
    template: Option<&SalaryTemplate>,
    monthly_ctc: Option<Decimal>,
) -> Result<BreakdownResult, NotComputable> {
    let template = template.ok_or(NotComputable::MissingTemplate)?;
    if template.is_custom() {
        return Err(NotComputable::CustomTemplate {
            template_id: template.id.clone(),
        });
    }
    let monthly_ctc = monthly_ctc.ok_or(NotComputable::MissingCtc)?;
    solve(template, monthly_ctc, enrollment)
}

/// Solves a template against a target monthly CTC.
///
/// # Returns
///
/// The breakdown, or `NotComputable` if the template is the custom kind or
/// the CTC is negative. Failing to converge is not an error: the last state
/// is returned with `convergence.converged == false` and a warning.
pub fn solve(
    template: &SalaryTemplate,
    monthly_ctc: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Result<BreakdownResult, NotComputable> {
    if template.is_custom() {
        return Err(NotComputable::CustomTemplate {
            template_id: template.id.clone(),
        });
    }
    if monthly_ctc < Decimal::ZERO {
        return Err(NotComputable::NegativeCtc {
            ctc: monthly_ctc.to_string(),
        });
    }

    let mut trace = AuditTrace::default();

    let Allocation {
        adjustable_ctc,
        fixed_total,
        clamped,
        mut state,
    } = allocate(template, monthly_ctc);

    trace.record(
        "fixed_allocation",
        "Fixed Allocation",
        json!({
            "monthly_ctc": monthly_ctc.normalize().to_string(),
            "basic_pay_percent": template.basic_pay_percent.normalize().to_string(),
        }),
        json!({
            "adjustable_ctc": adjustable_ctc.normalize().to_string(),
            "fixed_total": fixed_total.normalize().to_string(),
            "basic_target": state.basic().normalize().to_string(),
            "hra_target": opt_amount(state.target(Slack::Hra)),
            "da_target": opt_amount(state.target(Slack::DearnessAllowance)),
        }),
        format!(
            "{} CTC less fixed earnings leaves {} adjustable; basic starts at {}%",
            monthly_ctc.normalize(),
            adjustable_ctc.normalize(),
            template.basic_pay_percent.normalize()
        ),
    );

    if clamped {
        trace.warnings.push(AuditWarning::new(
            WARNING_ADJUSTABLE_CLAMPED,
            format!(
                "Fixed earnings exceed the monthly CTC of {}; adjustable CTC set to zero",
                monthly_ctc.normalize()
            ),
            "high",
        ));
    }
    flag_unknown_basis_names(template, &mut trace);

    let impact = statutory::marginal_cost(monthly_ctc, template.admin_charges.enabled);
    let mut passes = 0;

    let (snapshot, converged) = loop {
        passes += 1;
        let snapshot = evaluate(template, &state, monthly_ctc, enrollment);
        let gap = snapshot.current_ctc - monthly_ctc;
        let converged = gap.abs() < CONVERGENCE_TOLERANCE;

        let action = if converged {
            "converged"
        } else if passes == MAX_SOLVER_PASSES {
            "pass_limit"
        } else if gap > Decimal::ZERO {
            "reduce_excess"
        } else {
            "fill_shortfall"
        };

        debug!(
            template_id = %template.id,
            pass = passes,
            current_ctc = %snapshot.current_ctc,
            gap = %gap,
            action,
            "Solver pass"
        );

        trace.record(
            "solver_pass",
            "Convergence Pass",
            json!({
                "pass": passes,
                "basic": state.basic().normalize().to_string(),
                "hra": opt_amount(state.amount(Slack::Hra)),
                "da": opt_amount(state.amount(Slack::DearnessAllowance)),
                "gross": state.gross().normalize().to_string(),
            }),
            json!({
                "employer_pf": snapshot.employer_pf.normalize().to_string(),
                "employer_esi": snapshot.employer_esi.normalize().to_string(),
                "admin_charge": snapshot.admin_charge.normalize().to_string(),
                "current_ctc": snapshot.current_ctc.normalize().to_string(),
                "gap": gap.normalize().to_string(),
                "action": action,
            }),
            format!(
                "Pass {}: reconstructed CTC {} against target {} ({})",
                passes,
                snapshot.current_ctc.normalize(),
                monthly_ctc.normalize(),
                action
            ),
        );

        if converged || passes == MAX_SOLVER_PASSES {
            break (snapshot, converged);
        }

        if gap > Decimal::ZERO {
            reduce_excess(&mut state, gap, impact);
        } else {
            fill_shortfall(&mut state, -gap, impact);
        }
    };

    let final_gap = snapshot.current_ctc - monthly_ctc;
    if !converged {
        warn!(
            template_id = %template.id,
            monthly_ctc = %monthly_ctc,
            gap = %final_gap,
            "Solver reached pass limit without converging"
        );
        trace.warnings.push(AuditWarning::new(
            WARNING_NOT_CONVERGED,
            format!(
                "Reconstructed CTC is {} away from target after {} passes",
                final_gap.normalize(),
                passes
            ),
            "medium",
        ));
    }

    // Statutory figures below are computed once, on the settled amounts.
    let pt_slab = find_slab(template.professional_tax.as_ref(), monthly_ctc);
    let professional_tax = pt_amount(template.professional_tax.as_ref(), monthly_ctc);
    trace.record(
        "professional_tax",
        "Professional Tax",
        json!({
            "monthly_ctc": monthly_ctc.normalize().to_string(),
            "state": template.professional_tax.as_ref().map(|pt| pt.state.clone()),
        }),
        json!({
            "slab": pt_slab.map(|slab| slab.range.to_string()),
            "amount": professional_tax.normalize().to_string(),
        }),
        match pt_slab {
            Some(slab) => format!("CTC falls in slab {}", slab.range),
            None => "No professional tax slab applies".to_string(),
        },
    );

    let employee_pf_config = template.employee_deduction(EMPLOYEE_PF);
    let employee_esi_config = template.employee_deduction(EMPLOYEE_ESI);
    let employee_pf_basis = basis_for(&state, employee_pf_config);
    let employee_esi_basis = basis_for(&state, employee_esi_config);
    let employee_contributions = StatutoryAmounts {
        pf: statutory::employee_pf(employee_pf_config, employee_pf_basis, enrollment),
        esi: statutory::employee_esi(
            employee_esi_config,
            employee_esi_basis,
            monthly_ctc,
            enrollment,
        ),
    };
    trace.record(
        "employee_contributions",
        "Employee Contributions",
        json!({
            "pf_basis": employee_pf_basis.normalize().to_string(),
            "esi_basis": employee_esi_basis.normalize().to_string(),
            "has_pf_account": enrollment.has_pf_account,
            "has_esi_account": enrollment.has_esi_account,
        }),
        json!({
            "employee_pf": employee_contributions.pf.normalize().to_string(),
            "employee_esi": employee_contributions.esi.normalize().to_string(),
        }),
        format!(
            "Employee PF {} and ESI {}",
            employee_contributions.pf.normalize(),
            employee_contributions.esi.normalize()
        ),
    );

    let vpf_basis = template
        .voluntary_pf
        .as_ref()
        .map(|vpf| state.basis(&vpf.calculation_basis))
        .unwrap_or_else(|| state.basic());
    let voluntary_pf =
        statutory::voluntary_pf(template.voluntary_pf.as_ref(), vpf_basis, enrollment);
    trace.record(
        "voluntary_pf",
        "Voluntary PF",
        json!({
            "configured": template.voluntary_pf.is_some(),
            "basis": vpf_basis.normalize().to_string(),
        }),
        json!({ "amount": voluntary_pf.normalize().to_string() }),
        if template.voluntary_pf.is_some() {
            format!("Voluntary PF of {}", voluntary_pf.normalize())
        } else {
            "No voluntary PF configured".to_string()
        },
    );

    let labour_welfare_fund = template
        .labour_welfare_fund
        .as_ref()
        .map(|lwf| LwfAmounts {
            state: Some(lwf.state.clone()),
            employer: round_amount(lwf.employer_contribution),
            employee: round_amount(lwf.employee_contribution),
        })
        .unwrap_or_default();
    trace.record(
        "labour_welfare_fund",
        "Labour Welfare Fund",
        json!({ "state": labour_welfare_fund.state }),
        json!({
            "employer": labour_welfare_fund.employer.normalize().to_string(),
            "employee": labour_welfare_fund.employee.normalize().to_string(),
        }),
        "Flat amounts read from the state rule",
    );

    let (basic, earnings) = state.into_parts();
    let deductions: Vec<ComponentAmount> = template
        .deductions
        .iter()
        .map(|line| ComponentAmount::new(line.name.clone(), round_amount(line.amount)))
        .collect();

    let employer_contributions = StatutoryAmounts {
        pf: snapshot.employer_pf,
        esi: snapshot.employer_esi,
    };
    let admin_charge = snapshot.admin_charge;

    let totals = BreakdownTotals::new(
        basic + earnings.iter().map(|line| line.amount).sum::<Decimal>(),
        employer_contributions.total() + admin_charge,
        employee_contributions.total() + professional_tax + voluntary_pf,
        deductions.iter().map(|line| line.amount).sum(),
    );
    trace.record(
        "aggregation",
        "Aggregation",
        json!({
            "earning_lines": earnings.len(),
            "deduction_lines": deductions.len(),
        }),
        json!({
            "total_earnings": totals.total_earnings.normalize().to_string(),
            "total_employer": totals.total_employer.normalize().to_string(),
            "total_employee": totals.total_employee.normalize().to_string(),
            "total_deductions": totals.total_deductions.normalize().to_string(),
            "net_salary": totals.net_salary.normalize().to_string(),
        }),
        format!(
            "{} + {} - ({} + {} + {}) = {}",
            totals.total_earnings.normalize(),
            totals.total_employer.normalize(),
            totals.total_employee.normalize(),
            totals.total_deductions.normalize(),
            totals.total_employer.normalize(),
            totals.net_salary.normalize()
        ),
    );

    Ok(BreakdownResult {
        template_id: template.id.clone(),
        monthly_ctc,
        basic,
        earnings,
        deductions,
        employer_contributions,
        employee_contributions,
        admin_charge,
        professional_tax,
        voluntary_pf,
        labour_welfare_fund,
        totals,
        convergence: ConvergenceReport {
            converged,
            passes,
            final_gap,
        },
        audit_trace: trace,
    })
}

/// Computes the employer-side contributions for the current amounts.
fn evaluate(
    template: &SalaryTemplate,
    state: &WorkingState,
    monthly_ctc: Decimal,
    enrollment: &EmployeeEnrollment,
) -> EmployerSnapshot {
    let pf_config = template.employer_contribution(EMPLOYER_PF);
    let esi_config = template.employer_contribution(EMPLOYER_ESI);
    let pf_basis = basis_for(state, pf_config);
    let esi_basis = basis_for(state, esi_config);

    let employer_pf = statutory::employer_pf(pf_config, pf_basis, enrollment);
    let employer_esi = statutory::employer_esi(esi_config, esi_basis, monthly_ctc, enrollment);
    let admin_charge =
        statutory::admin_charge(&template.admin_charges, pf_config, pf_basis, enrollment);

    EmployerSnapshot {
        employer_pf,
        employer_esi,
        admin_charge,
        current_ctc: state.gross() + employer_pf + admin_charge + employer_esi,
    }
}

fn basis_for(state: &WorkingState, config: Option<&StatutoryContribution>) -> Decimal {
    config
        .map(|c| state.basis(&c.calculation_basis))
        .unwrap_or_else(|| state.basic())
}

/// Takes an excess out of HRA, then DA, then basic. No line goes below zero.
fn reduce_excess(state: &mut WorkingState, excess: Decimal, impact: Decimal) {
    let mut remaining = excess;
    for slack in EXCESS_ORDER {
        if remaining <= Decimal::ZERO {
            break;
        }
        let Some(current) = state.amount(slack) else {
            continue;
        };
        let reduction = current.min(remaining / impact);
        state.set(slack, round_amount(current - reduction));
        remaining -= reduction * impact;
    }
}

/// Puts a shortfall back into basic, then DA, then HRA, each up to its
/// target. Anything left over goes to basic.
fn fill_shortfall(state: &mut WorkingState, shortage: Decimal, impact: Decimal) {
    let mut remaining = shortage;
    for slack in SHORTFALL_ORDER {
        if remaining <= Decimal::ZERO {
            break;
        }
        let (Some(current), Some(target)) = (state.amount(slack), state.target(slack)) else {
            continue;
        };
        let headroom = target - current;
        if headroom <= Decimal::ZERO {
            continue;
        }
        let increase = headroom.min(remaining / impact);
        state.set(slack, round_amount(current + increase));
        remaining -= increase * impact;
    }

    if remaining > Decimal::ZERO {
        let basic = state.basic();
        state.set(Slack::Basic, round_amount(basic + remaining / impact));
    }
}

fn opt_amount(amount: Option<Decimal>) -> serde_json::Value {
    match amount {
        Some(value) => json!(value.normalize().to_string()),
        None => serde_json::Value::Null,
    }
}

fn flag_unknown_basis_names(template: &SalaryTemplate, trace: &mut AuditTrace) {
    let employer = template
        .employer_contributions
        .iter()
        .chain(template.employee_deductions.iter())
        .map(|(key, config)| (key.as_str(), config.calculation_basis.as_slice()));
    let voluntary = template
        .voluntary_pf
        .iter()
        .map(|vpf| ("VoluntaryPF", vpf.calculation_basis.as_slice()));

    for (owner, names) in employer.chain(voluntary) {
        for name in unknown_basis_names(template, names) {
            trace.warnings.push(AuditWarning::new(
                WARNING_UNKNOWN_BASIS,
                format!(
                    "{} basis names '{}', which is not an earning line of template '{}'",
                    owner, name, template.id
                ),
                "low",
            ));
        }
    }
}
