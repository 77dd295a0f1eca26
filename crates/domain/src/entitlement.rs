//! Headquarters plot entitlement

/// Number of base plots a company headquarters is entitled to
///
/// With `scale_with_employees` the base allowance is multiplied by the
/// number of employees (never less than one); otherwise it is the plain base.
pub fn headquarters_entitlement(
    employee_count: usize,
    base_plots: u32,
    scale_with_employees: bool,
) -> u32 {
    if !scale_with_employees {
        return base_plots;
    }
    let factor = u32::try_from(employee_count.max(1)).unwrap_or(u32::MAX);
    base_plots.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_employee_gets_base() {
        assert_eq!(headquarters_entitlement(1, 10, true), 10);
    }

    #[test]
    fn three_employees_triple_base() {
        assert_eq!(headquarters_entitlement(3, 10, true), 30);
    }

    #[test]
    fn leaderless_empty_company_still_gets_base() {
        assert_eq!(headquarters_entitlement(0, 10, true), 10);
    }

    #[test]
    fn disabled_policy_ignores_headcount() {
        assert_eq!(headquarters_entitlement(7, 10, false), 10);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(headquarters_entitlement(usize::MAX, 10_000, true), u32::MAX);
    }
}
