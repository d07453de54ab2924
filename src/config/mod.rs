//! Salary template configuration.
//!
//! This module provides the salary-structure template types and the loader
//! that reads a catalog of templates from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use ctc_breakdown::config::{TemplateCatalog, TemplateLoader};
//!
//! let catalog = TemplateLoader::load("./config/templates").unwrap();
//! println!("Loaded {} templates", catalog.len());
//! ```

mod catalog;
mod loader;
mod types;

pub use catalog::TemplateCatalog;
pub use loader::TemplateLoader;
pub use types::{
    AdminCharges, ContributionRate, DEARNESS_ALLOWANCE_LINE, DeductionLine, EMPLOYEE_ESI,
    EMPLOYEE_PF, EMPLOYER_ESI, EMPLOYER_PF, EarningLine, EarningMode, HRA_LINE,
    LabourWelfareFund, ProfessionalTax, PtSlab, SalaryTemplate, SlabRange,
    StatutoryContribution, TemplateKind, VoluntaryPf, VoluntaryPfMode,
};
