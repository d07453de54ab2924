//! Calculation logic for the CTC breakdown engine.
//!
//! This module contains the rounding helpers, the statutory contribution
//! rules, professional tax slab lookup, fixed allocation and the iterative
//! solver that ties them together.

mod allocation;
mod professional_tax;
mod rounding;
mod solver;
mod statutory;

pub use allocation::{Allocation, BASIC_LINE, Slack, WorkingState, allocate, unknown_basis_names};
pub use professional_tax::{find_slab, professional_tax};
pub use rounding::{percent_of, round_amount};
pub use solver::{
    CONVERGENCE_TOLERANCE, MAX_SOLVER_PASSES, WARNING_ADJUSTABLE_CLAMPED, WARNING_NOT_CONVERGED,
    WARNING_UNKNOWN_BASIS, compute_breakdown, solve, try_compute_breakdown,
};
pub use statutory::{
    ADMIN_CAP, ADMIN_RATE, DEFAULT_BASIC_PAY_PERCENT, EMPLOYEE_ESI_CAP, EMPLOYEE_ESI_RATE,
    EMPLOYEE_PF_RATE, EMPLOYER_ESI_CAP, EMPLOYER_ESI_RATE, EMPLOYER_PF_RATE, ESI_THRESHOLD,
    PF_FLAT_CAP, PF_FLAT_SENTINEL, admin_charge, employee_esi, employee_pf, employer_esi,
    employer_pf, esi_applicable, marginal_cost, pf_amount, voluntary_pf,
};
