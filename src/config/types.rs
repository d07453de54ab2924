//! Salary-structure template types.
//!
//! Templates are deserialized from YAML catalog files. Two loosely-typed
//! fields of the stored format are converted into tagged variants here, at
//! the ingestion boundary: the `selected_option` number (where `1800` means
//! "apply the statutory flat cap") becomes a [`ContributionRate`], and the
//! professional tax `range` strings become [`SlabRange`]s.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::calculation::{ADMIN_CAP, DEFAULT_BASIC_PAY_PERCENT, PF_FLAT_SENTINEL};
use crate::error::{EngineError, EngineResult};

/// Name of the house rent allowance earning line.
pub const HRA_LINE: &str = "HRA";
/// Name of the dearness allowance earning line.
pub const DEARNESS_ALLOWANCE_LINE: &str = "DearnessAllowance";

/// Key of the employer provident fund contribution.
pub const EMPLOYER_PF: &str = "EmployerPF";
/// Key of the employer state insurance contribution.
pub const EMPLOYER_ESI: &str = "EmployerESI";
/// Key of the employee provident fund deduction.
pub const EMPLOYEE_PF: &str = "EmployeePF";
/// Key of the employee state insurance deduction.
pub const EMPLOYEE_ESI: &str = "EmployeeESI";

/// Whether a template is solved automatically or managed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// A normal structure the solver computes.
    #[default]
    Structured,
    /// The reserved unstructured kind. Pay is entered manually and the
    /// solver refuses to compute it.
    Custom,
}

/// How an earning line's amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningMode {
    /// A flat monthly amount.
    Fixed,
    /// A share of the adjustable CTC.
    Percentage,
}

/// A single earning line of a salary template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningLine {
    /// The line name (e.g. "HRA", "ConveyanceAllowance").
    pub name: String,
    /// How the amount is derived.
    pub mode: EarningMode,
    /// The flat amount, for fixed-mode lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_amount: Option<Decimal>,
    /// The percentage of adjustable CTC, for percentage-mode lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Decimal>,
}

impl EarningLine {
    /// Creates a fixed-mode line.
    pub fn fixed(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            mode: EarningMode::Fixed,
            fixed_amount: Some(amount),
            percent: None,
        }
    }

    /// Creates a percentage-mode line.
    pub fn percentage(name: impl Into<String>, percent: Decimal) -> Self {
        Self {
            name: name.into(),
            mode: EarningMode::Percentage,
            fixed_amount: None,
            percent: Some(percent),
        }
    }

    /// Returns true for the percentage-mode HRA and dearness allowance lines
    /// that the solver shrinks and regrows.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctc_breakdown::config::EarningLine;
    /// use rust_decimal::Decimal;
    ///
    /// assert!(EarningLine::percentage("HRA", Decimal::from(20)).is_adjustable());
    /// assert!(!EarningLine::fixed("HRA", Decimal::from(5000)).is_adjustable());
    /// assert!(!EarningLine::percentage("SpecialAllowance", Decimal::from(10)).is_adjustable());
    /// ```
    pub fn is_adjustable(&self) -> bool {
        self.mode == EarningMode::Percentage
            && (self.name == HRA_LINE || self.name == DEARNESS_ALLOWANCE_LINE)
    }
}

/// A flat deduction line. Deductions are never adjusted by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The line name.
    pub name: String,
    /// The monthly amount deducted.
    pub amount: Decimal,
}

/// The rate rule selected for a provident fund style contribution.
///
/// Stored templates carry a bare number. `1800` selects the statutory flat
/// cap, anything else is a percentage.
///
/// # Example
///
/// ```
/// use ctc_breakdown::config::ContributionRate;
/// use rust_decimal::Decimal;
///
/// assert_eq!(
///     ContributionRate::from_selected_option(Decimal::from(1800)),
///     ContributionRate::FlatCap
/// );
/// assert_eq!(
///     ContributionRate::from_selected_option(Decimal::from(12)),
///     ContributionRate::Percentage(Decimal::from(12))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub enum ContributionRate {
    /// 12% of the basis, capped at the statutory flat amount.
    FlatCap,
    /// A plain percentage of the basis.
    Percentage(Decimal),
}

impl ContributionRate {
    /// Converts a stored `selected_option` value.
    pub fn from_selected_option(option: Decimal) -> Self {
        if option == PF_FLAT_SENTINEL {
            ContributionRate::FlatCap
        } else {
            ContributionRate::Percentage(option)
        }
    }
}

impl TryFrom<Decimal> for ContributionRate {
    type Error = String;

    fn try_from(option: Decimal) -> Result<Self, Self::Error> {
        if option.is_sign_negative() {
            return Err(format!("selected_option cannot be negative: {}", option));
        }
        Ok(Self::from_selected_option(option))
    }
}

impl From<ContributionRate> for Decimal {
    fn from(rate: ContributionRate) -> Self {
        match rate {
            ContributionRate::FlatCap => PF_FLAT_SENTINEL,
            ContributionRate::Percentage(percent) => percent,
        }
    }
}

/// Configuration of one statutory contribution or deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryContribution {
    /// The rate rule.
    pub selected_option: ContributionRate,
    /// Whether the amount is paid out of the CTC.
    #[serde(default)]
    pub included_in_ctc: bool,
    /// Earning lines added to basic pay to form the contribution basis.
    #[serde(default)]
    pub calculation_basis: Vec<String>,
}

/// PF administration charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCharges {
    /// Whether the employer pays admin charges.
    #[serde(default)]
    pub enabled: bool,
    /// Monthly ceiling on the charge.
    #[serde(default = "default_admin_cap")]
    pub cap_amount: Decimal,
}

impl Default for AdminCharges {
    fn default() -> Self {
        Self {
            enabled: false,
            cap_amount: ADMIN_CAP,
        }
    }
}

fn default_admin_cap() -> Decimal {
    ADMIN_CAP
}

fn default_basic_pay_percent() -> Decimal {
    DEFAULT_BASIC_PAY_PERCENT
}

/// Labour welfare fund rule for a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourWelfareFund {
    /// The jurisdiction the rule belongs to.
    pub state: String,
    /// The employer's flat contribution.
    #[serde(default)]
    pub employer_contribution: Decimal,
    /// The employee's flat contribution.
    #[serde(default)]
    pub employee_contribution: Decimal,
}

/// A professional tax salary bracket.
///
/// Parsed from either `"min-max"` (inclusive on both ends) or
/// `"N and above"`.
///
/// # Example
///
/// ```
/// use ctc_breakdown::config::SlabRange;
/// use rust_decimal::Decimal;
///
/// let slab: SlabRange = "7501-10000".parse().unwrap();
/// assert!(slab.contains(Decimal::from(10000)));
/// assert!(!slab.contains(Decimal::from(10001)));
///
/// let top: SlabRange = "10001 and above".parse().unwrap();
/// assert!(top.contains(Decimal::from(250000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SlabRange {
    /// A closed bracket.
    Between {
        /// Lower bound, inclusive.
        min: Decimal,
        /// Upper bound, inclusive.
        max: Decimal,
    },
    /// An open-ended bracket.
    AndAbove {
        /// Lower bound, inclusive.
        min: Decimal,
    },
}

impl SlabRange {
    /// Returns true if the amount falls in this bracket.
    pub fn contains(&self, amount: Decimal) -> bool {
        match *self {
            SlabRange::Between { min, max } => amount >= min && amount <= max,
            SlabRange::AndAbove { min } => amount >= min,
        }
    }
}

impl FromStr for SlabRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse = |part: &str| {
            Decimal::from_str(part.trim())
                .map_err(|e| format!("invalid slab bound '{}' in '{}': {}", part.trim(), s, e))
        };

        if let Some(min) = trimmed.strip_suffix("and above") {
            return Ok(SlabRange::AndAbove { min: parse(min)? });
        }

        let (min, max) = trimmed
            .split_once('-')
            .ok_or_else(|| format!("slab range '{}' is neither 'min-max' nor 'N and above'", s))?;
        let (min, max) = (parse(min)?, parse(max)?);
        if min > max {
            return Err(format!("slab range '{}' has min above max", s));
        }
        Ok(SlabRange::Between { min, max })
    }
}

impl TryFrom<String> for SlabRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SlabRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlabRange::Between { min, max } => write!(f, "{}-{}", min, max),
            SlabRange::AndAbove { min } => write!(f, "{} and above", min),
        }
    }
}

impl From<SlabRange> for String {
    fn from(range: SlabRange) -> Self {
        range.to_string()
    }
}

/// One professional tax slab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtSlab {
    /// The salary bracket.
    pub range: SlabRange,
    /// The monthly tax for the bracket.
    pub amount: Decimal,
}

/// Professional tax rules for a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalTax {
    /// The jurisdiction the slabs belong to.
    pub state: String,
    /// Salary-bracket slabs, checked in order.
    #[serde(default)]
    pub slabs: Vec<PtSlab>,
}

/// How voluntary PF is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoluntaryPfMode {
    /// Rate-based, using `selected_option`.
    Percentage,
    /// A flat `amount`.
    Fixed,
}

/// Voluntary PF configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoluntaryPf {
    /// The computation mode.
    pub mode: VoluntaryPfMode,
    /// Rate rule for percentage mode. Absent means no contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<ContributionRate>,
    /// Earning lines added to basic pay to form the basis.
    #[serde(default)]
    pub calculation_basis: Vec<String>,
    /// Flat amount for fixed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

/// A reusable salary structure.
///
/// # Example
///
/// ```
/// use ctc_breakdown::config::SalaryTemplate;
/// use rust_decimal::Decimal;
///
/// let yaml = r#"
/// id: lean
/// name: Lean Structure
/// employer_contributions:
///   EmployerPF:
///     selected_option: 1800
///     included_in_ctc: true
/// "#;
/// let template: SalaryTemplate = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(template.basic_pay_percent, Decimal::from(40));
/// assert!(template.employer_contribution("EmployerPF").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryTemplate {
    /// Catalog id, referenced from employee template tracking.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Structured or custom.
    #[serde(default)]
    pub kind: TemplateKind,
    /// Static monthly CTC used when the employee has no CTC history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ctc: Option<Decimal>,
    /// Share of adjustable CTC allocated to basic pay.
    #[serde(default = "default_basic_pay_percent")]
    pub basic_pay_percent: Decimal,
    /// Earning lines in template order.
    #[serde(default)]
    pub earnings: Vec<EarningLine>,
    /// Flat deduction lines.
    #[serde(default)]
    pub deductions: Vec<DeductionLine>,
    /// Employer contributions keyed by name ("EmployerPF", "EmployerESI").
    #[serde(default)]
    pub employer_contributions: BTreeMap<String, StatutoryContribution>,
    /// Employee deductions keyed by name ("EmployeePF", "EmployeeESI").
    #[serde(default)]
    pub employee_deductions: BTreeMap<String, StatutoryContribution>,
    /// PF administration charges.
    #[serde(default)]
    pub admin_charges: AdminCharges,
    /// Labour welfare fund rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_welfare_fund: Option<LabourWelfareFund>,
    /// Professional tax rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_tax: Option<ProfessionalTax>,
    /// Voluntary PF configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voluntary_pf: Option<VoluntaryPf>,
}

impl SalaryTemplate {
    /// Creates a structured template with default settings and no lines.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: TemplateKind::Structured,
            base_ctc: None,
            basic_pay_percent: DEFAULT_BASIC_PAY_PERCENT,
            earnings: Vec::new(),
            deductions: Vec::new(),
            employer_contributions: BTreeMap::new(),
            employee_deductions: BTreeMap::new(),
            admin_charges: AdminCharges::default(),
            labour_welfare_fund: None,
            professional_tax: None,
            voluntary_pf: None,
        }
    }

    /// Returns true for the reserved custom kind.
    pub fn is_custom(&self) -> bool {
        self.kind == TemplateKind::Custom
    }

    /// Looks up an earning line by name.
    pub fn earning_line(&self, name: &str) -> Option<&EarningLine> {
        self.earnings.iter().find(|line| line.name == name)
    }

    /// Looks up an employer contribution by key.
    pub fn employer_contribution(&self, key: &str) -> Option<&StatutoryContribution> {
        self.employer_contributions.get(key)
    }

    /// Looks up an employee deduction by key.
    pub fn employee_deduction(&self, key: &str) -> Option<&StatutoryContribution> {
        self.employee_deductions.get(key)
    }

    /// Checks the template for content the solver cannot honour.
    ///
    /// # Returns
    ///
    /// Returns an `InvalidTemplate` error if:
    /// - a percentage lies outside 0-100, including contribution rates
    /// - an amount is negative
    /// - a line is missing the field its mode requires
    /// - two earning lines share a name
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidTemplate {
            template_id: self.id.clone(),
            message,
        };
        let hundred = Decimal::ONE_HUNDRED;

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_string()));
        }
        if self.basic_pay_percent.is_sign_negative() || self.basic_pay_percent > hundred {
            return Err(invalid(format!(
                "basic_pay_percent must be between 0 and 100, got {}",
                self.basic_pay_percent
            )));
        }
        if self.base_ctc.is_some_and(|ctc| ctc.is_sign_negative()) {
            return Err(invalid("base_ctc cannot be negative".to_string()));
        }

        let mut seen = HashSet::new();
        for line in &self.earnings {
            if !seen.insert(line.name.as_str()) {
                return Err(invalid(format!("duplicate earning line '{}'", line.name)));
            }
            match line.mode {
                EarningMode::Fixed => match line.fixed_amount {
                    Some(amount) if !amount.is_sign_negative() => {}
                    Some(amount) => {
                        return Err(invalid(format!(
                            "earning line '{}' has negative amount {}",
                            line.name, amount
                        )));
                    }
                    None => {
                        return Err(invalid(format!(
                            "fixed earning line '{}' has no fixed_amount",
                            line.name
                        )));
                    }
                },
                EarningMode::Percentage => match line.percent {
                    Some(percent) if !percent.is_sign_negative() && percent <= hundred => {}
                    Some(percent) => {
                        return Err(invalid(format!(
                            "earning line '{}' percent must be between 0 and 100, got {}",
                            line.name, percent
                        )));
                    }
                    None => {
                        return Err(invalid(format!(
                            "percentage earning line '{}' has no percent",
                            line.name
                        )));
                    }
                },
            }
        }

        for line in &self.deductions {
            if line.amount.is_sign_negative() {
                return Err(invalid(format!(
                    "deduction line '{}' has negative amount {}",
                    line.name, line.amount
                )));
            }
        }

        let contributions = self
            .employer_contributions
            .iter()
            .chain(&self.employee_deductions)
            .map(|(key, config)| (key.as_str(), Some(config.selected_option)));
        let voluntary = self
            .voluntary_pf
            .as_ref()
            .map(|vpf| ("voluntary_pf", vpf.selected_option));
        for (key, rate) in contributions.chain(voluntary) {
            if let Some(ContributionRate::Percentage(percent)) = rate {
                if percent > hundred {
                    return Err(invalid(format!(
                        "{} selected_option must be between 0 and 100, got {}",
                        key, percent
                    )));
                }
            }
        }

        if self.admin_charges.cap_amount.is_sign_negative() {
            return Err(invalid("admin_charges.cap_amount cannot be negative".to_string()));
        }

        if let Some(lwf) = &self.labour_welfare_fund {
            if lwf.employer_contribution.is_sign_negative()
                || lwf.employee_contribution.is_sign_negative()
            {
                return Err(invalid(format!(
                    "labour welfare fund for '{}' has a negative contribution",
                    lwf.state
                )));
            }
        }

        if let Some(pt) = &self.professional_tax {
            if let Some(slab) = pt.slabs.iter().find(|s| s.amount.is_sign_negative()) {
                return Err(invalid(format!(
                    "professional tax slab '{}' has negative amount",
                    slab.range
                )));
            }
        }

        if let Some(vpf) = &self.voluntary_pf {
            if vpf.amount.is_some_and(|a| a.is_sign_negative()) {
                return Err(invalid("voluntary_pf.amount cannot be negative".to_string()));
            }
        }

        Ok(())
    }
}
