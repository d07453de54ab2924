//! Fixed allocation and the solver's working state.
//!
//! Fixed earning lines are summed and taken off the CTC to give the
//! adjustable CTC. Every percentage line other than HRA and DA is resolved
//! once against it and then held fixed. Basic, HRA and DA start at their
//! target share of the adjustable CTC and are the only amounts the solver
//! moves afterwards.

use rust_decimal::Decimal;

use crate::config::{DEARNESS_ALLOWANCE_LINE, EarningMode, HRA_LINE, SalaryTemplate};
use crate::models::ComponentAmount;

use super::rounding::{percent_of, round_amount};

/// Name accepted in a calculation basis for basic pay itself.
pub const BASIC_LINE: &str = "Basic";

/// One of the three amounts the solver adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slack {
    /// Basic pay.
    Basic,
    /// House rent allowance.
    Hra,
    /// Dearness allowance.
    DearnessAllowance,
}

#[derive(Debug, Clone, Copy)]
struct SlackLine {
    index: usize,
    target: Decimal,
}

/// Mutable working copy of a template's earnings.
///
/// Cloned from the template once per solve; the template itself is never
/// touched.
#[derive(Debug, Clone)]
pub struct WorkingState {
    basic: Decimal,
    basic_target: Decimal,
    lines: Vec<ComponentAmount>,
    hra: Option<SlackLine>,
    da: Option<SlackLine>,
}

impl WorkingState {
    /// Current basic pay.
    pub fn basic(&self) -> Decimal {
        self.basic
    }

    /// Current earning lines in template order.
    pub fn lines(&self) -> &[ComponentAmount] {
        &self.lines
    }

    /// Consumes the state, returning basic pay and the earning lines.
    pub fn into_parts(self) -> (Decimal, Vec<ComponentAmount>) {
        (self.basic, self.lines)
    }

    /// Current amount of a slack component, if the template has it.
    pub fn amount(&self, slack: Slack) -> Option<Decimal> {
        match slack {
            Slack::Basic => Some(self.basic),
            Slack::Hra => self.hra.map(|line| self.lines[line.index].amount),
            Slack::DearnessAllowance => self.da.map(|line| self.lines[line.index].amount),
        }
    }

    /// Ceiling of a slack component, if the template has it.
    pub fn target(&self, slack: Slack) -> Option<Decimal> {
        match slack {
            Slack::Basic => Some(self.basic_target),
            Slack::Hra => self.hra.map(|line| line.target),
            Slack::DearnessAllowance => self.da.map(|line| line.target),
        }
    }

    /// Sets a slack component. Absent components are ignored.
    pub fn set(&mut self, slack: Slack, amount: Decimal) {
        match slack {
            Slack::Basic => self.basic = amount,
            Slack::Hra => {
                if let Some(line) = self.hra {
                    self.lines[line.index].amount = amount;
                }
            }
            Slack::DearnessAllowance => {
                if let Some(line) = self.da {
                    self.lines[line.index].amount = amount;
                }
            }
        }
    }

    /// Basic pay plus every earning line.
    pub fn gross(&self) -> Decimal {
        self.basic + self.lines.iter().map(|line| line.amount).sum::<Decimal>()
    }

    /// Basic pay plus the lines named in a calculation basis.
    pub fn basis(&self, names: &[String]) -> Decimal {
        self.basic
            + self
                .lines
                .iter()
                .filter(|line| names.iter().any(|name| *name == line.name))
                .map(|line| line.amount)
                .sum::<Decimal>()
    }
}

/// The outcome of fixed allocation.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// CTC left after fixed lines, never below zero.
    pub adjustable_ctc: Decimal,
    /// Sum of fixed lines and resolved percentage lines.
    pub fixed_total: Decimal,
    /// True when fixed lines exceeded the CTC and the adjustable CTC was
    /// clamped to zero.
    pub clamped: bool,
    /// Initial working state with basic, HRA and DA at their targets.
    pub state: WorkingState,
}

/// Performs fixed allocation for a template and target CTC.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::{allocate, Slack};
/// use ctc_breakdown::config::{EarningLine, SalaryTemplate};
/// use rust_decimal::Decimal;
///
/// let mut template = SalaryTemplate::new("t", "T");
/// template.earnings.push(EarningLine::fixed("Conveyance", Decimal::from(2000)));
/// template.earnings.push(EarningLine::percentage("HRA", Decimal::from(20)));
///
/// let allocation = allocate(&template, Decimal::from(52000));
/// assert_eq!(allocation.adjustable_ctc, Decimal::from(50000));
/// assert_eq!(allocation.state.amount(Slack::Basic), Some(Decimal::from(20000)));
/// assert_eq!(allocation.state.amount(Slack::Hra), Some(Decimal::from(10000)));
/// ```
pub fn allocate(template: &SalaryTemplate, monthly_ctc: Decimal) -> Allocation {
    let fixed_sum: Decimal = template
        .earnings
        .iter()
        .filter(|line| line.mode == EarningMode::Fixed)
        .map(|line| round_amount(line.fixed_amount.unwrap_or(Decimal::ZERO)))
        .sum();

    let remainder = monthly_ctc - fixed_sum;
    let clamped = remainder < Decimal::ZERO;
    let adjustable_ctc = remainder.max(Decimal::ZERO);

    let mut lines = Vec::with_capacity(template.earnings.len());
    let mut hra = None;
    let mut da = None;
    let mut fixed_total = Decimal::ZERO;

    for (index, line) in template.earnings.iter().enumerate() {
        let amount = match line.mode {
            EarningMode::Fixed => round_amount(line.fixed_amount.unwrap_or(Decimal::ZERO)),
            EarningMode::Percentage => round_amount(percent_of(
                line.percent.unwrap_or(Decimal::ZERO),
                adjustable_ctc,
            )),
        };

        if line.is_adjustable() {
            let slack = Some(SlackLine {
                index,
                target: amount,
            });
            if line.name == HRA_LINE {
                hra = slack;
            } else if line.name == DEARNESS_ALLOWANCE_LINE {
                da = slack;
            }
        } else {
            fixed_total += amount;
        }

        lines.push(ComponentAmount::new(line.name.clone(), amount));
    }

    let basic_target = round_amount(percent_of(template.basic_pay_percent, adjustable_ctc));

    Allocation {
        adjustable_ctc,
        fixed_total,
        clamped,
        state: WorkingState {
            basic: basic_target,
            basic_target,
            lines,
            hra,
            da,
        },
    }
}

/// Returns basis names that match neither basic pay nor any earning line.
pub fn unknown_basis_names<'a>(template: &SalaryTemplate, names: &'a [String]) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|name| *name != BASIC_LINE && template.earning_line(name).is_none())
        .collect()
}
