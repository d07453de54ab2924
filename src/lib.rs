//! Monthly CTC breakdown engine
//!
//! This crate turns an employee's target monthly cost-to-company (CTC) into
//! a full payroll breakdown: basic pay, allowances, employer and employee
//! provident fund (PF) and state insurance (ESI) contributions, the PF admin
//! charge, professional tax, voluntary PF, labour welfare fund and net pay.
//!
//! The flow for one employee and month is:
//!
//! 1. [`resolution::resolve`] picks the salary template and CTC in force
//! 2. [`calculation::solve`] iterates basic, HRA and DA until gross pay plus
//!    employer contributions reconstructs the CTC
//! 3. [`projection::project`] reshapes the result into year/month keyed
//!    history ready to merge into stored records
//!
//! [`pipeline`] chains the three for one employee or a whole batch.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod resolution;
