//! Statutory rates, thresholds and contribution rules.
//!
//! All PF, ESI and admin-charge constants live here. Each contribution
//! function is gated on the employee's enrollment and the template's
//! configuration, and returns an amount already rounded to one decimal.

use rust_decimal::Decimal;

use crate::config::{AdminCharges, ContributionRate, StatutoryContribution, VoluntaryPf, VoluntaryPfMode};
use crate::models::EmployeeEnrollment;

use super::rounding::{percent_of, round_amount};

/// Employer provident fund rate (12%).
pub const EMPLOYER_PF_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
/// Employee provident fund rate (12%).
pub const EMPLOYEE_PF_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
/// Employer state insurance rate (3.25%).
pub const EMPLOYER_ESI_RATE: Decimal = Decimal::from_parts(325, 0, 0, false, 4);
/// Employee state insurance rate (0.75%).
pub const EMPLOYEE_ESI_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 4);
/// Monthly CTC above which no ESI is payable.
pub const ESI_THRESHOLD: Decimal = Decimal::from_parts(21000, 0, 0, false, 0);
/// Employer ESI ceiling (3.25% of the threshold).
pub const EMPLOYER_ESI_CAP: Decimal = Decimal::from_parts(6825, 0, 0, false, 1);
/// Employee ESI ceiling (0.75% of the threshold).
pub const EMPLOYEE_ESI_CAP: Decimal = Decimal::from_parts(1575, 0, 0, false, 1);
/// PF admin charge rate (1%).
pub const ADMIN_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// Default PF admin charge ceiling.
pub const ADMIN_CAP: Decimal = Decimal::from_parts(150, 0, 0, false, 0);
/// Statutory PF ceiling applied under the flat-cap rule.
pub const PF_FLAT_CAP: Decimal = Decimal::from_parts(1800, 0, 0, false, 0);
/// Stored `selected_option` value that selects the flat-cap rule.
pub const PF_FLAT_SENTINEL: Decimal = Decimal::from_parts(1800, 0, 0, false, 0);
/// Basic pay share used when a template does not set one.
pub const DEFAULT_BASIC_PAY_PERCENT: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Returns true when ESI is payable at this monthly CTC.
///
/// The threshold is inclusive: a CTC of exactly 21000 still attracts ESI.
pub fn esi_applicable(monthly_ctc: Decimal) -> bool {
    monthly_ctc <= ESI_THRESHOLD
}

/// Total CTC cost of one rupee of basic, HRA or DA once statutory add-ons are
/// included. The solver divides every excess or shortfall by this.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::marginal_cost;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(marginal_cost(Decimal::from(50000), false), Decimal::from_str("1.12").unwrap());
/// assert_eq!(marginal_cost(Decimal::from(18000), true), Decimal::from_str("1.1625").unwrap());
/// ```
pub fn marginal_cost(monthly_ctc: Decimal, admin_enabled: bool) -> Decimal {
    let mut impact = Decimal::ONE + EMPLOYER_PF_RATE;
    if esi_applicable(monthly_ctc) {
        impact += EMPLOYER_ESI_RATE;
    }
    if admin_enabled {
        impact += ADMIN_RATE;
    }
    impact
}

/// Applies a PF-style rate rule to a basis.
///
/// `FlatCap` is 12% of the basis limited to the statutory ceiling;
/// `Percentage(p)` is an uncapped p% of the basis.
pub fn pf_amount(rate: ContributionRate, basis: Decimal) -> Decimal {
    let amount = match rate {
        ContributionRate::FlatCap => (basis * EMPLOYER_PF_RATE).min(PF_FLAT_CAP),
        ContributionRate::Percentage(percent) => percent_of(percent, basis),
    };
    round_amount(amount)
}

/// Employer PF, paid only when included in CTC and the employee has a PF
/// account.
pub fn employer_pf(
    config: Option<&StatutoryContribution>,
    basis: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    match config {
        Some(pf) if pf.included_in_ctc && enrollment.has_pf_account => {
            pf_amount(pf.selected_option, basis)
        }
        _ => Decimal::ZERO,
    }
}

/// Employer ESI, paid only when included in CTC, the employee has an ESI
/// account and the CTC is within the ESI threshold.
pub fn employer_esi(
    config: Option<&StatutoryContribution>,
    basis: Decimal,
    monthly_ctc: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    match config {
        Some(esi)
            if esi.included_in_ctc && enrollment.has_esi_account && esi_applicable(monthly_ctc) =>
        {
            round_amount((basis * EMPLOYER_ESI_RATE).min(EMPLOYER_ESI_CAP))
        }
        _ => Decimal::ZERO,
    }
}

/// PF admin charge on the employer PF basis.
pub fn admin_charge(
    admin: &AdminCharges,
    pf_config: Option<&StatutoryContribution>,
    basis: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    let pf_in_ctc = pf_config.is_some_and(|pf| pf.included_in_ctc);
    if admin.enabled && pf_in_ctc && enrollment.has_pf_account {
        round_amount((basis * ADMIN_RATE).min(admin.cap_amount))
    } else {
        Decimal::ZERO
    }
}

/// Employee PF. Any percentage option is charged at the statutory 12%; the
/// flat-cap option additionally limits it to the ceiling.
pub fn employee_pf(
    config: Option<&StatutoryContribution>,
    basis: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    match config {
        Some(pf) if enrollment.has_pf_account => {
            let amount = basis * EMPLOYEE_PF_RATE;
            match pf.selected_option {
                ContributionRate::FlatCap => round_amount(amount.min(PF_FLAT_CAP)),
                ContributionRate::Percentage(_) => round_amount(amount),
            }
        }
        _ => Decimal::ZERO,
    }
}

/// Employee ESI, with the same threshold as the employer side.
pub fn employee_esi(
    config: Option<&StatutoryContribution>,
    basis: Decimal,
    monthly_ctc: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    match config {
        Some(_) if enrollment.has_esi_account && esi_applicable(monthly_ctc) => {
            round_amount((basis * EMPLOYEE_ESI_RATE).min(EMPLOYEE_ESI_CAP))
        }
        _ => Decimal::ZERO,
    }
}

/// Voluntary PF on top of the statutory employee share.
///
/// Requires a PF account. Percentage mode without a selected option
/// contributes nothing.
pub fn voluntary_pf(
    config: Option<&VoluntaryPf>,
    basis: Decimal,
    enrollment: &EmployeeEnrollment,
) -> Decimal {
    let Some(vpf) = config else {
        return Decimal::ZERO;
    };
    if !enrollment.has_pf_account {
        return Decimal::ZERO;
    }
    match vpf.mode {
        VoluntaryPfMode::Percentage => vpf
            .selected_option
            .map(|rate| pf_amount(rate, basis))
            .unwrap_or(Decimal::ZERO),
        VoluntaryPfMode::Fixed => round_amount(vpf.amount.unwrap_or(Decimal::ZERO)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn contribution(rate: ContributionRate, included_in_ctc: bool) -> StatutoryContribution {
        StatutoryContribution {
            selected_option: rate,
            included_in_ctc,
            calculation_basis: vec![],
        }
    }

    fn enrolled() -> EmployeeEnrollment {
        EmployeeEnrollment::new(true, true)
    }

    #[test]
    fn test_constants_match_statutory_values() {
        assert_eq!(EMPLOYER_PF_RATE, dec("0.12"));
        assert_eq!(EMPLOYEE_PF_RATE, dec("0.12"));
        assert_eq!(EMPLOYER_ESI_RATE, dec("0.0325"));
        assert_eq!(EMPLOYEE_ESI_RATE, dec("0.0075"));
        assert_eq!(ESI_THRESHOLD, dec("21000"));
        assert_eq!(EMPLOYER_ESI_CAP, dec("682.5"));
        assert_eq!(EMPLOYEE_ESI_CAP, dec("157.5"));
        assert_eq!(ADMIN_RATE, dec("0.01"));
        assert_eq!(ADMIN_CAP, dec("150"));
        assert_eq!(PF_FLAT_CAP, dec("1800"));
        assert_eq!(PF_FLAT_SENTINEL, dec("1800"));
        assert_eq!(DEFAULT_BASIC_PAY_PERCENT, dec("40"));
    }

    #[test]
    fn test_esi_threshold_is_inclusive() {
        assert!(esi_applicable(dec("21000")));
        assert!(!esi_applicable(dec("21000.1")));
        assert!(!esi_applicable(dec("21001")));
    }

    #[test]
    fn test_marginal_cost_combinations() {
        assert_eq!(marginal_cost(dec("50000"), false), dec("1.12"));
        assert_eq!(marginal_cost(dec("50000"), true), dec("1.13"));
        assert_eq!(marginal_cost(dec("21000"), false), dec("1.1525"));
        assert_eq!(marginal_cost(dec("15000"), true), dec("1.1625"));
    }

    #[test]
    fn test_pf_flat_cap_limits_large_basis() {
        assert_eq!(pf_amount(ContributionRate::FlatCap, dec("200000")), dec("1800"));
        assert_eq!(pf_amount(ContributionRate::FlatCap, dec("10000")), dec("1200"));
    }

    #[test]
    fn test_pf_percentage_is_uncapped() {
        assert_eq!(
            pf_amount(ContributionRate::Percentage(dec("12")), dec("200000")),
            dec("24000")
        );
        assert_eq!(
            pf_amount(ContributionRate::Percentage(dec("12")), dec("44642.9")),
            dec("5357.1")
        );
    }

    #[test]
    fn test_employer_pf_requires_account_and_inclusion() {
        let pf = contribution(ContributionRate::Percentage(dec("12")), true);
        assert_eq!(employer_pf(Some(&pf), dec("10000"), &enrolled()), dec("1200"));
        assert_eq!(
            employer_pf(Some(&pf), dec("10000"), &EmployeeEnrollment::new(false, true)),
            Decimal::ZERO
        );

        let excluded = contribution(ContributionRate::Percentage(dec("12")), false);
        assert_eq!(employer_pf(Some(&excluded), dec("10000"), &enrolled()), Decimal::ZERO);
        assert_eq!(employer_pf(None, dec("10000"), &enrolled()), Decimal::ZERO);
    }

    #[test]
    fn test_employer_esi_capped_and_threshold_gated() {
        let esi = contribution(ContributionRate::Percentage(dec("3.25")), true);
        assert_eq!(
            employer_esi(Some(&esi), dec("12000"), dec("18000"), &enrolled()),
            dec("390")
        );
        assert_eq!(
            employer_esi(Some(&esi), dec("30000"), dec("21000"), &enrolled()),
            dec("682.5")
        );
        assert_eq!(
            employer_esi(Some(&esi), dec("12000"), dec("21001"), &enrolled()),
            Decimal::ZERO
        );
        assert_eq!(
            employer_esi(
                Some(&esi),
                dec("12000"),
                dec("18000"),
                &EmployeeEnrollment::new(true, false)
            ),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_admin_charge_capped() {
        let pf = contribution(ContributionRate::Percentage(dec("12")), true);
        let admin = AdminCharges {
            enabled: true,
            cap_amount: ADMIN_CAP,
        };
        assert_eq!(admin_charge(&admin, Some(&pf), dec("9000"), &enrolled()), dec("90"));
        assert_eq!(admin_charge(&admin, Some(&pf), dec("90000"), &enrolled()), dec("150"));
    }

    #[test]
    fn test_admin_charge_disabled_or_unenrolled() {
        let pf = contribution(ContributionRate::Percentage(dec("12")), true);
        assert_eq!(
            admin_charge(&AdminCharges::default(), Some(&pf), dec("9000"), &enrolled()),
            Decimal::ZERO
        );
        let admin = AdminCharges {
            enabled: true,
            cap_amount: ADMIN_CAP,
        };
        assert_eq!(
            admin_charge(&admin, Some(&pf), dec("9000"), &EmployeeEnrollment::new(false, true)),
            Decimal::ZERO
        );
        let excluded = contribution(ContributionRate::Percentage(dec("12")), false);
        assert_eq!(
            admin_charge(&admin, Some(&excluded), dec("9000"), &enrolled()),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_employee_pf_ignores_configured_percentage() {
        let pf = contribution(ContributionRate::Percentage(dec("10")), false);
        assert_eq!(employee_pf(Some(&pf), dec("20000"), &enrolled()), dec("2400"));
    }

    #[test]
    fn test_employee_pf_flat_cap() {
        let pf = contribution(ContributionRate::FlatCap, false);
        assert_eq!(employee_pf(Some(&pf), dec("200000"), &enrolled()), dec("1800"));
        assert_eq!(
            employee_pf(Some(&pf), dec("200000"), &EmployeeEnrollment::new(false, false)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_employee_esi() {
        let esi = contribution(ContributionRate::Percentage(dec("0.75")), false);
        assert_eq!(
            employee_esi(Some(&esi), dec("12000"), dec("18000"), &enrolled()),
            dec("90")
        );
        assert_eq!(
            employee_esi(Some(&esi), dec("30000"), dec("20000"), &enrolled()),
            dec("157.5")
        );
        assert_eq!(
            employee_esi(Some(&esi), dec("12000"), dec("25000"), &enrolled()),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_voluntary_pf_modes() {
        let percentage = VoluntaryPf {
            mode: VoluntaryPfMode::Percentage,
            selected_option: Some(ContributionRate::Percentage(dec("10"))),
            calculation_basis: vec![],
            amount: None,
        };
        assert_eq!(voluntary_pf(Some(&percentage), dec("30000"), &enrolled()), dec("3000"));

        let flat = VoluntaryPf {
            selected_option: Some(ContributionRate::FlatCap),
            ..percentage.clone()
        };
        assert_eq!(voluntary_pf(Some(&flat), dec("30000"), &enrolled()), dec("1800"));

        let unselected = VoluntaryPf {
            selected_option: None,
            ..percentage.clone()
        };
        assert_eq!(voluntary_pf(Some(&unselected), dec("30000"), &enrolled()), Decimal::ZERO);

        let fixed = VoluntaryPf {
            mode: VoluntaryPfMode::Fixed,
            selected_option: None,
            calculation_basis: vec![],
            amount: Some(dec("1000")),
        };
        assert_eq!(voluntary_pf(Some(&fixed), dec("30000"), &enrolled()), dec("1000"));
        assert_eq!(voluntary_pf(None, dec("30000"), &enrolled()), Decimal::ZERO);
    }

    #[test]
    fn test_voluntary_pf_requires_pf_account() {
        let fixed = VoluntaryPf {
            mode: VoluntaryPfMode::Fixed,
            selected_option: None,
            calculation_basis: vec![],
            amount: Some(dec("1000")),
        };
        assert_eq!(
            voluntary_pf(Some(&fixed), dec("30000"), &EmployeeEnrollment::new(false, true)),
            Decimal::ZERO
        );
    }
}
