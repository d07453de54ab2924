//! Professional tax slab lookup.

use rust_decimal::Decimal;

use crate::config::{ProfessionalTax, PtSlab};

use super::rounding::round_amount;

/// Finds the first slab whose bracket contains the monthly CTC.
pub fn find_slab(rules: Option<&ProfessionalTax>, monthly_ctc: Decimal) -> Option<&PtSlab> {
    rules?
        .slabs
        .iter()
        .find(|slab| slab.range.contains(monthly_ctc))
}

/// Returns the professional tax payable on the monthly CTC.
///
/// Zero when the template has no professional tax rules or no slab matches.
///
/// # Examples
///
/// ```
/// use ctc_breakdown::calculation::professional_tax;
/// use ctc_breakdown::config::ProfessionalTax;
/// use rust_decimal::Decimal;
///
/// let rules: ProfessionalTax = serde_yaml::from_str(r#"
/// state: Maharashtra
/// slabs:
///   - { range: "0-7500", amount: 0 }
///   - { range: "7501-10000", amount: 175 }
///   - { range: "10001 and above", amount: 200 }
/// "#).unwrap();
///
/// assert_eq!(professional_tax(Some(&rules), Decimal::from(9000)), Decimal::from(175));
/// assert_eq!(professional_tax(Some(&rules), Decimal::from(85000)), Decimal::from(200));
/// assert_eq!(professional_tax(None, Decimal::from(85000)), Decimal::ZERO);
/// ```
pub fn professional_tax(rules: Option<&ProfessionalTax>, monthly_ctc: Decimal) -> Decimal {
    find_slab(rules, monthly_ctc)
        .map(|slab| round_amount(slab.amount))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlabRange;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn slab(range: &str, amount: &str) -> PtSlab {
        PtSlab {
            range: SlabRange::from_str(range).unwrap(),
            amount: dec(amount),
        }
    }

    fn maharashtra() -> ProfessionalTax {
        ProfessionalTax {
            state: "Maharashtra".to_string(),
            slabs: vec![
                slab("0-7500", "0"),
                slab("7501-10000", "175"),
                slab("10001 and above", "200"),
            ],
        }
    }

    #[test]
    fn test_lowest_slab_is_zero() {
        assert_eq!(professional_tax(Some(&maharashtra()), dec("7000")), dec("0"));
    }

    #[test]
    fn test_bracket_bounds_are_inclusive() {
        let rules = maharashtra();
        assert_eq!(professional_tax(Some(&rules), dec("7501")), dec("175"));
        assert_eq!(professional_tax(Some(&rules), dec("10000")), dec("175"));
        assert_eq!(professional_tax(Some(&rules), dec("10001")), dec("200"));
    }

    #[test]
    fn test_open_ended_bracket_matches_large_ctc() {
        assert_eq!(
            professional_tax(Some(&maharashtra()), dec("10000000")),
            dec("200")
        );
    }

    #[test]
    fn test_gap_between_brackets_yields_zero() {
        // 7500.5 sits between "0-7500" and "7501-10000".
        assert_eq!(professional_tax(Some(&maharashtra()), dec("7500.5")), Decimal::ZERO);
    }

    #[test]
    fn test_no_rules_or_empty_table_yields_zero() {
        assert_eq!(professional_tax(None, dec("50000")), Decimal::ZERO);
        let empty = ProfessionalTax {
            state: "Kerala".to_string(),
            slabs: vec![],
        };
        assert_eq!(professional_tax(Some(&empty), dec("50000")), Decimal::ZERO);
    }

    #[test]
    fn test_find_slab_returns_matching_bracket() {
        let rules = maharashtra();
        let found = find_slab(Some(&rules), dec("8000")).unwrap();
        assert_eq!(found.range.to_string(), "7501-10000");
    }
}
