//! Proportional allocation of a shared amount among household members.
//!
//! Weights come from each member's configured monthly income in the
//! denomination of the amount being split. When nobody configured an income
//! for that denomination the members' `income_percentage` is used instead.
//! When both are zero every share is zero.
//!
//! Exact shares are computed as [`Decimal`]s and then rounded to minor units
//! with the largest remainder method, so the shares always add up to the
//! requested amount.

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{Currency, EngineError, IncomeDenomination, Money, ResultEngine};

/// The inputs the calculator needs about one member of a shared account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberWeights {
    pub user_id: String,
    pub monthly_income_usd: Money,
    pub monthly_income_usdt: Money,
    pub monthly_income_cup: Money,
    /// Fallback contribution weight, 0–100.
    pub income_percentage: Decimal,
}

impl MemberWeights {
    #[must_use]
    pub fn income_for(&self, denomination: IncomeDenomination) -> Money {
        match denomination {
            IncomeDenomination::Usd => self.monthly_income_usd,
            IncomeDenomination::Usdt => self.monthly_income_usdt,
            IncomeDenomination::Cup => self.monthly_income_cup,
        }
    }
}

/// Which weights produced an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationBasis {
    Income,
    Percentage,
    Degenerate,
}

/// One member's part of a shared amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub user_id: String,
    pub amount: Money,
    /// The member's weight as a percentage of the total weight.
    pub percentage: Decimal,
}

impl Share {
    /// `"75.0%"`-style label used in ledger descriptions.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        let rounded = self
            .percentage
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.1}%")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub basis: AllocationBasis,
    pub shares: Vec<Share>,
}

impl Allocation {
    #[must_use]
    pub fn total(&self) -> Money {
        self.shares
            .iter()
            .fold(Money::ZERO, |acc, share| acc + share.amount)
    }
}

/// Splits `amount` (in `currency`) among `members`.
///
/// Shares are returned in the order of `members`. Negative weights are
/// treated as zero. Weights or amounts too large for exact decimal
/// arithmetic are rejected with [`EngineError::Validation`].
pub fn allocate(
    members: &[MemberWeights],
    currency: Currency,
    amount: Money,
) -> ResultEngine<Allocation> {
    let denomination = currency.denomination();
    let incomes: Vec<Decimal> = members
        .iter()
        .map(|m| m.income_for(denomination).to_decimal().max(Decimal::ZERO))
        .collect();
    let total_incomes = checked_sum(&incomes)?;

    let (basis, weights) = if total_incomes > Decimal::ZERO {
        (AllocationBasis::Income, incomes)
    } else {
        let percentages: Vec<Decimal> = members
            .iter()
            .map(|m| m.income_percentage.max(Decimal::ZERO))
            .collect();
        if checked_sum(&percentages)? > Decimal::ZERO {
            (AllocationBasis::Percentage, percentages)
        } else {
            (AllocationBasis::Degenerate, vec![Decimal::ZERO; members.len()])
        }
    };

    let total_weight = checked_sum(&weights)?;
    let amounts = if basis == AllocationBasis::Degenerate {
        vec![0; members.len()]
    } else {
        largest_remainder(amount.minor(), &weights, total_weight)?
    };

    let hundred = Decimal::from(100);
    let mut shares = Vec::with_capacity(members.len());
    for (member, (weight, minor)) in members.iter().zip(weights.iter().zip(amounts)) {
        let percentage = if total_weight > Decimal::ZERO {
            // weight / total first: the ratio is at most one, so scaling by
            // a hundred cannot overflow.
            (*weight / total_weight) * hundred
        } else {
            Decimal::ZERO
        };
        shares.push(Share {
            user_id: member.user_id.clone(),
            amount: Money::new(minor),
            percentage,
        });
    }

    Ok(Allocation { basis, shares })
}

fn too_large() -> EngineError {
    EngineError::Validation("amount too large".to_string())
}

fn checked_sum(values: &[Decimal]) -> ResultEngine<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(too_large)
}

/// Distributes `total_minor` proportionally to `weights`, rounding toward zero
/// and handing the leftover units to the largest fractional parts (ties go to
/// the earlier member).
fn largest_remainder(
    total_minor: i64,
    weights: &[Decimal],
    total_weight: Decimal,
) -> ResultEngine<Vec<i64>> {
    let total = Decimal::from(total_minor);
    let exact = weights
        .iter()
        .map(|w| {
            total
                .checked_mul(*w)
                .and_then(|product| product.checked_div(total_weight))
                .ok_or_else(too_large)
        })
        .collect::<ResultEngine<Vec<Decimal>>>()?;
    let mut rounded = exact
        .iter()
        .map(|e| {
            e.round_dp_with_strategy(0, RoundingStrategy::ToZero)
                .to_i64()
                .ok_or_else(too_large)
        })
        .collect::<ResultEngine<Vec<i64>>>()?;

    let assigned = rounded
        .iter()
        .try_fold(0i64, |acc, r| acc.checked_add(*r))
        .ok_or_else(too_large)?;
    let leftover = total_minor - assigned;
    if leftover == 0 {
        return Ok(rounded);
    }

    let step = leftover.signum();
    let mut order: Vec<(usize, Decimal)> = exact
        .iter()
        .zip(rounded.iter())
        .enumerate()
        .map(|(i, (e, r))| (i, (*e - Decimal::from(*r)).abs()))
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));

    for (idx, _) in order.iter().cycle().take(leftover.unsigned_abs() as usize) {
        rounded[*idx] += step;
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn member(user_id: &str, usd: i64, percentage: Decimal) -> MemberWeights {
        MemberWeights {
            user_id: user_id.to_string(),
            monthly_income_usd: Money::new(usd),
            monthly_income_usdt: Money::ZERO,
            monthly_income_cup: Money::ZERO,
            income_percentage: percentage,
        }
    }

    #[test]
    fn income_weighted_split() {
        let members = [member("ana", 600_00, dec!(0)), member("luis", 200_00, dec!(0))];
        let allocation = allocate(&members, Currency::UsdZelle, Money::new(80_00)).unwrap();

        assert_eq!(allocation.basis, AllocationBasis::Income);
        assert_eq!(allocation.shares[0].amount, Money::new(60_00));
        assert_eq!(allocation.shares[1].amount, Money::new(20_00));
        assert_eq!(allocation.shares[0].percentage_label(), "75.0%");
        assert_eq!(allocation.shares[1].percentage_label(), "25.0%");
    }

    #[test]
    fn falls_back_to_percentages_for_other_denominations() {
        let members = [member("ana", 600_00, dec!(60)), member("luis", 200_00, dec!(40))];
        let allocation = allocate(&members, Currency::Usdt, Money::new(100_00)).unwrap();

        assert_eq!(allocation.basis, AllocationBasis::Percentage);
        assert_eq!(allocation.shares[0].amount, Money::new(60_00));
        assert_eq!(allocation.shares[1].amount, Money::new(40_00));
    }

    #[test]
    fn percentages_need_not_sum_to_hundred() {
        let members = [member("ana", 0, dec!(30)), member("luis", 0, dec!(10))];
        let allocation = allocate(&members, Currency::UsdEfectivo, Money::new(40_00)).unwrap();

        assert_eq!(allocation.shares[0].amount, Money::new(30_00));
        assert_eq!(allocation.shares[1].amount, Money::new(10_00));
        assert_eq!(allocation.shares[0].percentage_label(), "75.0%");
    }

    #[test]
    fn degenerate_weights_give_zero_shares() {
        let members = [member("ana", 0, dec!(0)), member("luis", 0, dec!(0))];
        let allocation = allocate(&members, Currency::UsdZelle, Money::new(50_00)).unwrap();

        assert_eq!(allocation.basis, AllocationBasis::Degenerate);
        assert!(allocation.shares.iter().all(|s| s.amount.is_zero()));
    }

    #[test]
    fn thirds_keep_every_cent() {
        let members = [
            member("a", 100_00, dec!(0)),
            member("b", 100_00, dec!(0)),
            member("c", 100_00, dec!(0)),
        ];
        let allocation = allocate(&members, Currency::UsdZelle, Money::new(100_00)).unwrap();
        let amounts: Vec<i64> = allocation.shares.iter().map(|s| s.amount.minor()).collect();

        assert_eq!(amounts, vec![33_34, 33_33, 33_33]);
        assert_eq!(allocation.total(), Money::new(100_00));
        assert_eq!(allocation.shares[0].percentage_label(), "33.3%");
    }

    #[test]
    fn negative_amounts_are_split_too() {
        let members = [member("a", 1_00, dec!(0)), member("b", 2_00, dec!(0))];
        let allocation = allocate(&members, Currency::UsdZelle, Money::new(-100)).unwrap();

        assert_eq!(allocation.total(), Money::new(-100));
    }

    #[test]
    fn huge_incomes_are_rejected_instead_of_overflowing() {
        let members = [
            member("ana", i64::MAX, dec!(0)),
            member("luis", i64::MAX, dec!(0)),
        ];
        let err = allocate(&members, Currency::UsdZelle, Money::new(1_000_000_000_000))
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(msg) if msg == "amount too large"));
    }

    #[test]
    fn huge_incomes_with_small_amounts_still_split() {
        let members = [
            member("ana", i64::MAX / 2, dec!(0)),
            member("luis", i64::MAX / 2, dec!(0)),
        ];
        let allocation = allocate(&members, Currency::UsdZelle, Money::new(10_00)).unwrap();

        assert_eq!(allocation.total(), Money::new(10_00));
        assert_eq!(allocation.shares[0].percentage_label(), "50.0%");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn income_shares_sum_to_amount(
            amount in 1i64..100_000_000,
            incomes in proptest::collection::vec(0i64..10_000_000, 1..6),
        ) {
            prop_assume!(incomes.iter().any(|i| *i > 0));
            let members: Vec<MemberWeights> = incomes
                .iter()
                .enumerate()
                .map(|(i, income)| member(&i.to_string(), *income, dec!(0)))
                .collect();
            let allocation = allocate(&members, Currency::UsdZelle, Money::new(amount)).unwrap();
            prop_assert_eq!(allocation.basis, AllocationBasis::Income);
            prop_assert_eq!(allocation.total(), Money::new(amount));
        }

        #[test]
        fn percentage_shares_sum_to_amount(
            amount in 1i64..100_000_000,
            percentages in proptest::collection::vec(0i64..10_000, 1..6),
        ) {
            prop_assume!(percentages.iter().any(|p| *p > 0));
            let members: Vec<MemberWeights> = percentages
                .iter()
                .enumerate()
                .map(|(i, p)| member(&i.to_string(), 0, Decimal::new(*p, 2)))
                .collect();
            let allocation = allocate(&members, Currency::Usdt, Money::new(amount)).unwrap();
            prop_assert_eq!(allocation.basis, AllocationBasis::Percentage);
            prop_assert_eq!(allocation.total(), Money::new(amount));
        }
    }
}
