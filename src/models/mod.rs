//! Core data models for the CTC breakdown engine.
//!
//! This module contains the employee inputs, the calendar month type, the
//! breakdown result and the historical record shape.

mod breakdown;
mod employee;
mod history;
mod period;

pub use breakdown::{
    AuditStep, AuditTrace, AuditWarning, BreakdownResult, BreakdownTotals, ComponentAmount,
    ConvergenceReport, LwfAmounts, StatutoryAmounts,
};
pub use employee::{EmployeeEnrollment, EmployeeSalaryRecord};
pub use history::{AmountMap, HistoricalDelta};
pub use period::{PayMonth, YearMonthMap};
