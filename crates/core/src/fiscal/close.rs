//! Year-end close: validation, closing entries, and opening balances.
//!
//! The close workflow is a small state machine over a fiscal year's closing
//! status: `not_started -> in_progress -> completed`. Validation failures
//! are collected as displayable strings, never thrown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fiscal::error::FiscalError;
use crate::fiscal::types::{AuditStatus, PeriodSnapshot};

/// Account code used for the retained-earnings rollup.
pub const RETAINED_EARNINGS_CODE: &str = "3900";
/// Account name used for the retained-earnings rollup.
pub const RETAINED_EARNINGS_NAME: &str = "Retained Earnings";

/// Progress of a fiscal year's close workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingStatus {
    /// Close has not begun.
    NotStarted,
    /// Close is underway.
    InProgress,
    /// Close finished; the year is closed.
    Completed,
}

impl ClosingStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Validates a closing-status transition. The workflow only moves forward;
/// an in-progress close may be abandoned back to `not_started`.
///
/// # Errors
///
/// Returns `FiscalError::InvalidClosingTransition` for anything else.
pub fn validate_closing_transition(
    from: ClosingStatus,
    to: ClosingStatus,
) -> Result<(), FiscalError> {
    let valid = match (from, to) {
        _ if from == to => true,
        (ClosingStatus::NotStarted, ClosingStatus::InProgress)
        | (ClosingStatus::InProgress, ClosingStatus::Completed | ClosingStatus::NotStarted) => true,
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FiscalError::InvalidClosingTransition { from, to })
    }
}

/// The outcome of a year-end close validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseValidation {
    /// Whether the year may be closed.
    pub valid: bool,
    /// Human-readable blockers, empty when `valid` is true.
    pub errors: Vec<String>,
}

/// Checks whether a fiscal year may transition to closed.
///
/// Collects an error for every unlocked period and, when the organization
/// requires audit before close, for every period whose audit status is not
/// `completed`. The year may close only when the error list is empty.
#[must_use]
pub fn validate_year_end_close(
    periods: &[PeriodSnapshot],
    require_audit_before_close: bool,
) -> CloseValidation {
    let mut errors = Vec::new();

    for period in periods {
        if !period.locked {
            errors.push(format!("Period {} is not locked", period.name));
        }
        if require_audit_before_close && period.audit_status != AuditStatus::Completed {
            errors.push(format!(
                "Period {} audit is not completed (status: {})",
                period.name,
                period.audit_status.as_str()
            ));
        }
    }

    CloseValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Classification of an account for close purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Income statement: revenue.
    Revenue,
    /// Income statement: expense.
    Expense,
    /// Balance sheet: asset.
    Asset,
    /// Balance sheet: liability.
    Liability,
    /// Balance sheet: equity.
    Equity,
}

/// An account balance supplied to the close, as of year end.
///
/// Balances are caller-supplied rather than derived from a ledger here;
/// the generators below are pure functions over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account code.
    pub account_code: String,
    /// Account display name.
    pub account_name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// Closing balance in the account's natural sign (revenue and
    /// liabilities positive as credits, expenses and assets positive as
    /// debits).
    pub balance: Decimal,
}

/// Kind of a generated closing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingEntryKind {
    /// Zeroes a revenue account.
    RevenueClose,
    /// Zeroes an expense account.
    ExpenseClose,
    /// Rolls net income into retained earnings.
    RetainedEarnings,
}

impl ClosingEntryKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RevenueClose => "revenue_close",
            Self::ExpenseClose => "expense_close",
            Self::RetainedEarnings => "retained_earnings",
        }
    }
}

/// A closing entry produced by the year-end close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingEntryLine {
    /// Account code.
    pub account_code: String,
    /// Account display name.
    pub account_name: String,
    /// Entry kind.
    pub kind: ClosingEntryKind,
    /// Entry amount.
    pub amount: Decimal,
}

/// An opening trial-balance row for the following year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalanceLine {
    /// Account code.
    pub account_code: String,
    /// Account display name.
    pub account_name: String,
    /// Opening debit.
    pub debit: Decimal,
    /// Opening credit.
    pub credit: Decimal,
}

/// Generates the closing entries for a year: one entry zeroing each nonzero
/// revenue and expense balance, plus a retained-earnings entry for the net
/// income. Returns an empty list when there is nothing to close.
#[must_use]
pub fn generate_closing_entries(balances: &[AccountBalance]) -> Vec<ClosingEntryLine> {
    let mut entries = Vec::new();
    let mut total_revenue = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;

    for balance in balances {
        match balance.kind {
            AccountKind::Revenue if !balance.balance.is_zero() => {
                total_revenue += balance.balance;
                entries.push(ClosingEntryLine {
                    account_code: balance.account_code.clone(),
                    account_name: balance.account_name.clone(),
                    kind: ClosingEntryKind::RevenueClose,
                    amount: balance.balance,
                });
            }
            AccountKind::Expense if !balance.balance.is_zero() => {
                total_expense += balance.balance;
                entries.push(ClosingEntryLine {
                    account_code: balance.account_code.clone(),
                    account_name: balance.account_name.clone(),
                    kind: ClosingEntryKind::ExpenseClose,
                    amount: balance.balance,
                });
            }
            _ => {}
        }
    }

    if !entries.is_empty() {
        entries.push(ClosingEntryLine {
            account_code: RETAINED_EARNINGS_CODE.to_string(),
            account_name: RETAINED_EARNINGS_NAME.to_string(),
            kind: ClosingEntryKind::RetainedEarnings,
            amount: total_revenue - total_expense,
        });
    }

    entries
}

/// Generates the following year's opening trial balance: balance-sheet
/// accounts carry forward, and net income from the closing year folds into
/// retained earnings. Income-statement accounts open at zero and are
/// omitted.
#[must_use]
pub fn generate_opening_balances(balances: &[AccountBalance]) -> Vec<OpeningBalanceLine> {
    let mut lines: Vec<OpeningBalanceLine> = Vec::new();
    let mut net_income = Decimal::ZERO;

    for balance in balances {
        match balance.kind {
            AccountKind::Revenue => net_income += balance.balance,
            AccountKind::Expense => net_income -= balance.balance,
            AccountKind::Asset | AccountKind::Liability | AccountKind::Equity => {
                if balance.balance.is_zero() {
                    continue;
                }
                let (debit, credit) = carry_forward(balance.kind, balance.balance);
                lines.push(OpeningBalanceLine {
                    account_code: balance.account_code.clone(),
                    account_name: balance.account_name.clone(),
                    debit,
                    credit,
                });
            }
        }
    }

    if !net_income.is_zero() {
        // Fold net income into an existing retained-earnings row if present.
        if let Some(line) = lines
            .iter_mut()
            .find(|l| l.account_code == RETAINED_EARNINGS_CODE)
        {
            let carried = line.credit - line.debit + net_income;
            (line.debit, line.credit) = credit_normal(carried);
        } else {
            let (debit, credit) = credit_normal(net_income);
            lines.push(OpeningBalanceLine {
                account_code: RETAINED_EARNINGS_CODE.to_string(),
                account_name: RETAINED_EARNINGS_NAME.to_string(),
                debit,
                credit,
            });
        }
    }

    lines
}

/// Splits a natural-sign balance into debit/credit columns for carry-over.
fn carry_forward(kind: AccountKind, balance: Decimal) -> (Decimal, Decimal) {
    match kind {
        // Assets are debit-normal.
        AccountKind::Asset => {
            if balance >= Decimal::ZERO {
                (balance, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -balance)
            }
        }
        // Liabilities and equity are credit-normal.
        _ => credit_normal(balance),
    }
}

fn credit_normal(balance: Decimal) -> (Decimal, Decimal) {
    if balance >= Decimal::ZERO {
        (Decimal::ZERO, balance)
    } else {
        (-balance, Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use oasys_shared::types::{FiscalPeriodId, FiscalYearId};
    use rust_decimal_macros::dec;

    fn period(name: &str, locked: bool, audit_status: AuditStatus) -> PeriodSnapshot {
        PeriodSnapshot {
            id: FiscalPeriodId::new(),
            fiscal_year_id: FiscalYearId::new(),
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            locked,
            locked_by: locked.then(|| "controller@x.com".to_string()),
            soft_closed: false,
            audit_status,
        }
    }

    #[test]
    fn test_close_valid_when_all_locked() {
        let periods = vec![
            period("January 2024", true, AuditStatus::NotStarted),
            period("February 2024", true, AuditStatus::NotStarted),
        ];

        let validation = validate_year_end_close(&periods, false);
        assert!(validation.valid);
        assert!(validation.errors.is_empty());
    }

    #[test]
    fn test_close_invalid_with_unlocked_period() {
        let periods = vec![
            period("January 2024", true, AuditStatus::Completed),
            period("February 2024", false, AuditStatus::Completed),
        ];

        let validation = validate_year_end_close(&periods, false);
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].contains("February 2024"));
        assert!(validation.errors[0].contains("not locked"));
    }

    #[test]
    fn test_close_requires_completed_audits_when_configured() {
        let periods = vec![
            period("January 2024", true, AuditStatus::Completed),
            period("February 2024", true, AuditStatus::UnderReview),
        ];

        // Audit not required: valid.
        assert!(validate_year_end_close(&periods, false).valid);

        // Audit required: the under-review period blocks the close.
        let validation = validate_year_end_close(&periods, true);
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].contains("audit is not completed"));
        assert!(validation.errors[0].contains("under_review"));
    }

    #[test]
    fn test_close_collects_all_blockers() {
        let periods = vec![
            period("January 2024", false, AuditStatus::NotStarted),
            period("February 2024", false, AuditStatus::Failed),
        ];

        let validation = validate_year_end_close(&periods, true);
        assert!(!validation.valid);
        // Two lock errors plus two audit errors.
        assert_eq!(validation.errors.len(), 4);
    }

    #[test]
    fn test_closing_status_transitions() {
        use ClosingStatus::{Completed, InProgress, NotStarted};

        assert!(validate_closing_transition(NotStarted, InProgress).is_ok());
        assert!(validate_closing_transition(InProgress, Completed).is_ok());
        assert!(validate_closing_transition(InProgress, NotStarted).is_ok());
        assert!(validate_closing_transition(NotStarted, NotStarted).is_ok());

        assert!(validate_closing_transition(NotStarted, Completed).is_err());
        assert!(validate_closing_transition(Completed, InProgress).is_err());
        assert!(validate_closing_transition(Completed, NotStarted).is_err());
    }

    fn balance(code: &str, name: &str, kind: AccountKind, amount: Decimal) -> AccountBalance {
        AccountBalance {
            account_code: code.to_string(),
            account_name: name.to_string(),
            kind,
            balance: amount,
        }
    }

    #[test]
    fn test_generate_closing_entries_zeroes_income_statement() {
        let balances = vec![
            balance("4000", "Sales", AccountKind::Revenue, dec!(120000)),
            balance("5000", "Salaries", AccountKind::Expense, dec!(80000)),
            balance("1000", "Cash", AccountKind::Asset, dec!(50000)),
        ];

        let entries = generate_closing_entries(&balances);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, ClosingEntryKind::RevenueClose);
        assert_eq!(entries[0].amount, dec!(120000));
        assert_eq!(entries[1].kind, ClosingEntryKind::ExpenseClose);
        assert_eq!(entries[1].amount, dec!(80000));

        let retained = &entries[2];
        assert_eq!(retained.kind, ClosingEntryKind::RetainedEarnings);
        assert_eq!(retained.account_code, RETAINED_EARNINGS_CODE);
        assert_eq!(retained.amount, dec!(40000)); // net income
    }

    #[test]
    fn test_generate_closing_entries_skips_zero_balances() {
        let balances = vec![
            balance("4000", "Sales", AccountKind::Revenue, Decimal::ZERO),
            balance("5000", "Salaries", AccountKind::Expense, Decimal::ZERO),
        ];
        assert!(generate_closing_entries(&balances).is_empty());
    }

    #[test]
    fn test_generate_opening_balances_carries_balance_sheet() {
        let balances = vec![
            balance("1000", "Cash", AccountKind::Asset, dec!(50000)),
            balance("2000", "Loans", AccountKind::Liability, dec!(10000)),
            balance("3000", "Share Capital", AccountKind::Equity, dec!(20000)),
            balance("4000", "Sales", AccountKind::Revenue, dec!(120000)),
            balance("5000", "Salaries", AccountKind::Expense, dec!(100000)),
        ];

        let lines = generate_opening_balances(&balances);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].debit, dec!(50000)); // cash, debit-normal
        assert_eq!(lines[1].credit, dec!(10000));
        assert_eq!(lines[2].credit, dec!(20000));

        let retained = &lines[3];
        assert_eq!(retained.account_code, RETAINED_EARNINGS_CODE);
        assert_eq!(retained.credit, dec!(20000)); // 120k - 100k

        // The opening trial balance must balance.
        let debits: Decimal = lines.iter().map(|l| l.debit).sum();
        let credits: Decimal = lines.iter().map(|l| l.credit).sum();
        assert_eq!(debits, credits);
    }

    #[test]
    fn test_net_loss_folds_into_existing_retained_earnings() {
        let balances = vec![
            balance(
                RETAINED_EARNINGS_CODE,
                RETAINED_EARNINGS_NAME,
                AccountKind::Equity,
                dec!(5000),
            ),
            balance("4000", "Sales", AccountKind::Revenue, dec!(1000)),
            balance("5000", "Salaries", AccountKind::Expense, dec!(9000)),
        ];

        let lines = generate_opening_balances(&balances);
        assert_eq!(lines.len(), 1);
        // 5000 carried - 8000 loss = -3000, presented as a debit balance.
        assert_eq!(lines[0].debit, dec!(3000));
        assert_eq!(lines[0].credit, Decimal::ZERO);
    }
}

/// Property-based tests over the close generators.
#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000).prop_map(Decimal::from)
    }

    fn balances_strategy() -> impl Strategy<Value = Vec<AccountBalance>> {
        proptest::collection::vec(
            (
                0usize..=4,
                amount_strategy(),
                proptest::sample::select(vec![
                    AccountKind::Revenue,
                    AccountKind::Expense,
                    AccountKind::Asset,
                    AccountKind::Liability,
                    AccountKind::Equity,
                ]),
            )
                .prop_map(|(n, amount, kind)| AccountBalance {
                    account_code: format!("{}00{n}", 4 + n),
                    account_name: format!("Account {n}"),
                    kind,
                    balance: amount,
                }),
            0..16,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The retained-earnings closing entry always equals total revenue
        /// minus total expense.
        #[test]
        fn prop_retained_earnings_equals_net_income(balances in balances_strategy()) {
            let entries = generate_closing_entries(&balances);

            let revenue: Decimal = balances
                .iter()
                .filter(|b| b.kind == AccountKind::Revenue)
                .map(|b| b.balance)
                .sum();
            let expense: Decimal = balances
                .iter()
                .filter(|b| b.kind == AccountKind::Expense)
                .map(|b| b.balance)
                .sum();

            match entries.last() {
                Some(last) => {
                    prop_assert_eq!(last.kind, ClosingEntryKind::RetainedEarnings);
                    prop_assert_eq!(last.amount, revenue - expense);
                }
                None => {
                    // Nothing to close: all income-statement balances were zero.
                    prop_assert!(revenue.is_zero() && expense.is_zero());
                }
            }
        }

        /// Opening balances never include income-statement accounts other
        /// than the retained-earnings rollup.
        #[test]
        fn prop_opening_balances_are_balance_sheet_only(balances in balances_strategy()) {
            let lines = generate_opening_balances(&balances);

            for line in &lines {
                if line.account_code == RETAINED_EARNINGS_CODE {
                    continue;
                }
                let is_balance_sheet_account = balances.iter().any(|b| {
                    b.account_code == line.account_code
                        && matches!(
                            b.kind,
                            AccountKind::Asset | AccountKind::Liability | AccountKind::Equity
                        )
                });
                prop_assert!(is_balance_sheet_account);
            }
        }

        /// Every opening line has exactly one nonzero side.
        #[test]
        fn prop_opening_lines_are_single_sided(balances in balances_strategy()) {
            for line in generate_opening_balances(&balances) {
                prop_assert!(line.debit.is_zero() || line.credit.is_zero());
                prop_assert!(!(line.debit.is_zero() && line.credit.is_zero()));
            }
        }
    }
}
