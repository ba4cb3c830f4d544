//! Posting gatekeeper: decides whether a transaction date may be posted.
//!
//! The gatekeeper fails closed: no active period means no posting. Denials
//! carry a human-readable reason the caller can surface directly; they are
//! expected outcomes, not errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fiscal::types::{PeriodSnapshot, PriorPeriodPolicy};

/// The outcome of a posting check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDecision {
    /// Whether the transaction may be posted.
    pub allowed: bool,
    /// Denial reason, present only when `allowed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PostingDecision {
    /// An allowing decision.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denying decision with a displayable reason.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a transaction dated `date` may be posted against the
/// organization's active period.
///
/// Denies when:
/// - no active period is set (fails closed),
/// - the active period is locked (naming the locking actor when known),
/// - the date falls outside the period's `[start_date, end_date]`
///   (inclusive on both ends).
#[must_use]
pub fn can_post_transaction(
    date: NaiveDate,
    active_period: Option<&PeriodSnapshot>,
) -> PostingDecision {
    let Some(period) = active_period else {
        return PostingDecision::deny("No active fiscal period is set");
    };

    if period.locked {
        let reason = match &period.locked_by {
            Some(actor) => format!("Fiscal period {} is locked by {actor}", period.name),
            None => format!("Fiscal period {} is locked", period.name),
        };
        return PostingDecision::deny(reason);
    }

    if !period.contains_date(date) {
        return PostingDecision::deny(format!(
            "Transaction date {date} must fall within the active fiscal period ({} to {})",
            period.start_date, period.end_date
        ));
    }

    PostingDecision::allow()
}

/// Posting check honoring the organization's prior-period policy.
///
/// Starts from [`can_post_transaction`]. When the date misses the active
/// period and the policy is `AllowSoftClosed`, a soft-closed, unlocked
/// period containing the date accepts the posting as a limited adjustment.
#[must_use]
pub fn can_post_transaction_with_policy(
    date: NaiveDate,
    active_period: Option<&PeriodSnapshot>,
    all_periods: &[PeriodSnapshot],
    policy: PriorPeriodPolicy,
) -> PostingDecision {
    let decision = can_post_transaction(date, active_period);
    if decision.allowed || policy == PriorPeriodPolicy::Deny {
        return decision;
    }

    // Only the out-of-range denial is eligible for the prior-period carve-out;
    // a missing or locked active period still fails closed.
    let out_of_range = active_period.is_some_and(|p| !p.locked && !p.contains_date(date));
    if !out_of_range {
        return decision;
    }

    let adjustable = all_periods
        .iter()
        .any(|p| p.contains_date(date) && p.soft_closed && !p.locked);

    if adjustable {
        PostingDecision::allow()
    } else {
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::types::AuditStatus;
    use oasys_shared::types::{FiscalPeriodId, FiscalYearId};
    use proptest::prelude::*;

    fn fy2024_period() -> PeriodSnapshot {
        PeriodSnapshot {
            id: FiscalPeriodId::new(),
            fiscal_year_id: FiscalYearId::new(),
            name: "FY2024".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            locked: false,
            locked_by: None,
            soft_closed: false,
            audit_status: AuditStatus::NotStarted,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_period_allows_in_range_date() {
        let period = fy2024_period();
        let decision = can_post_transaction(date(2024, 6, 15), Some(&period));
        assert_eq!(decision, PostingDecision::allow());
    }

    #[test]
    fn test_locked_period_denies_citing_actor() {
        let period = PeriodSnapshot {
            locked: true,
            locked_by: Some("admin@x.com".to_string()),
            ..fy2024_period()
        };

        let decision = can_post_transaction(date(2024, 6, 15), Some(&period));
        assert!(!decision.allowed);
        let reason = decision.reason.unwrap();
        assert!(reason.contains("locked"));
        assert!(reason.contains("by admin@x.com"));
    }

    #[test]
    fn test_locked_period_without_actor() {
        let period = PeriodSnapshot {
            locked: true,
            ..fy2024_period()
        };

        let decision = can_post_transaction(date(2024, 6, 15), Some(&period));
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("locked"));
    }

    #[test]
    fn test_out_of_range_date_denied() {
        let period = fy2024_period();
        let decision = can_post_transaction(date(2025, 1, 1), Some(&period));
        assert!(!decision.allowed);
        assert!(
            decision
                .reason
                .unwrap()
                .contains("within the active fiscal period")
        );
    }

    #[test]
    fn test_no_active_period_fails_closed() {
        let decision = can_post_transaction(date(2024, 6, 15), None);
        assert!(!decision.allowed);
        assert!(decision.reason.is_some());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let period = fy2024_period();
        assert!(can_post_transaction(date(2024, 1, 1), Some(&period)).allowed);
        assert!(can_post_transaction(date(2024, 12, 31), Some(&period)).allowed);
        assert!(!can_post_transaction(date(2023, 12, 31), Some(&period)).allowed);
    }

    #[test]
    fn test_policy_allows_soft_closed_prior_period() {
        let active = PeriodSnapshot {
            name: "July 2024".to_string(),
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 31),
            ..fy2024_period()
        };
        let prior = PeriodSnapshot {
            name: "June 2024".to_string(),
            start_date: date(2024, 6, 1),
            end_date: date(2024, 6, 30),
            soft_closed: true,
            ..fy2024_period()
        };
        let periods = vec![prior, active.clone()];

        let denied = can_post_transaction_with_policy(
            date(2024, 6, 15),
            Some(&active),
            &periods,
            PriorPeriodPolicy::Deny,
        );
        assert!(!denied.allowed);

        let allowed = can_post_transaction_with_policy(
            date(2024, 6, 15),
            Some(&active),
            &periods,
            PriorPeriodPolicy::AllowSoftClosed,
        );
        assert!(allowed.allowed);
    }

    #[test]
    fn test_policy_does_not_bypass_locked_prior_period() {
        let active = PeriodSnapshot {
            name: "July 2024".to_string(),
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 31),
            ..fy2024_period()
        };
        let prior = PeriodSnapshot {
            name: "June 2024".to_string(),
            start_date: date(2024, 6, 1),
            end_date: date(2024, 6, 30),
            soft_closed: true,
            locked: true,
            locked_by: Some("controller@x.com".to_string()),
            ..fy2024_period()
        };
        let periods = vec![prior, active.clone()];

        let decision = can_post_transaction_with_policy(
            date(2024, 6, 15),
            Some(&active),
            &periods,
            PriorPeriodPolicy::AllowSoftClosed,
        );
        assert!(!decision.allowed);
    }

    #[test]
    fn test_policy_never_bypasses_locked_active_period() {
        let active = PeriodSnapshot {
            locked: true,
            ..fy2024_period()
        };
        let periods = vec![active.clone()];

        let decision = can_post_transaction_with_policy(
            date(2024, 6, 15),
            Some(&active),
            &periods,
            PriorPeriodPolicy::AllowSoftClosed,
        );
        assert!(!decision.allowed);
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2020i32..=2030, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any date inside an unlocked period is postable.
        #[test]
        fn prop_in_range_unlocked_always_allowed(offset in 0i64..=365) {
            let period = fy2024_period();
            let d = period.start_date + chrono::Duration::days(offset);
            let decision = can_post_transaction(d, Some(&period));
            prop_assert!(decision.allowed);
            prop_assert!(decision.reason.is_none());
        }

        /// A locked period denies every date, in range or not.
        #[test]
        fn prop_locked_denies_all_dates(d in date_strategy()) {
            let period = PeriodSnapshot {
                locked: true,
                locked_by: Some("auditor@x.com".to_string()),
                ..fy2024_period()
            };
            let decision = can_post_transaction(d, Some(&period));
            prop_assert!(!decision.allowed);
            prop_assert!(decision.reason.unwrap().contains("locked"));
        }

        /// Dates outside the period are denied regardless of lock state.
        #[test]
        fn prop_out_of_range_denied(d in date_strategy(), locked in any::<bool>()) {
            let period = PeriodSnapshot { locked, ..fy2024_period() };
            prop_assume!(!period.contains_date(d));
            let decision = can_post_transaction(d, Some(&period));
            prop_assert!(!decision.allowed);
        }

        /// The policy-aware check never allows something the base check
        /// allows less strictly: with Deny policy, results are identical.
        #[test]
        fn prop_deny_policy_matches_base_check(d in date_strategy()) {
            let active = fy2024_period();
            let periods = vec![active.clone()];
            let base = can_post_transaction(d, Some(&active));
            let with_policy = can_post_transaction_with_policy(
                d,
                Some(&active),
                &periods,
                PriorPeriodPolicy::Deny,
            );
            prop_assert_eq!(base, with_policy);
        }
    }
}
