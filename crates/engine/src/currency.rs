use serde::{Deserialize, Serialize};

use crate::{EngineError, accounts};

/// Currency bucket tracked on every account.
///
/// Each bucket is an independent ledger line: value never moves between
/// buckets implicitly, a conversion with an explicit exchange rate is always
/// required.
///
/// ## Minor units
///
/// Every bucket stores signed `i64` **minor units** with two fraction digits
/// (see [`Money`](crate::Money)), e.g. `10.50 USDT` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    UsdZelle,
    UsdEfectivo,
    Usdt,
    CupEfectivo,
    CupTransferencia,
}

/// Denomination used to pick a member's configured monthly income.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncomeDenomination {
    Usd,
    Usdt,
    Cup,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::UsdZelle,
        Currency::UsdEfectivo,
        Currency::Usdt,
        Currency::CupEfectivo,
        Currency::CupTransferencia,
    ];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::UsdZelle => "USD_ZELLE",
            Currency::UsdEfectivo => "USD_EFECTIVO",
            Currency::Usdt => "USDT",
            Currency::CupEfectivo => "CUP_EFECTIVO",
            Currency::CupTransferencia => "CUP_TRANSFERENCIA",
        }
    }

    /// The balance column of [`accounts`] this bucket addresses.
    #[must_use]
    pub(crate) const fn balance_column(self) -> accounts::Column {
        match self {
            Currency::UsdZelle => accounts::Column::BalanceUsdZelle,
            Currency::UsdEfectivo => accounts::Column::BalanceUsdEfectivo,
            Currency::Usdt => accounts::Column::BalanceUsdt,
            Currency::CupEfectivo => accounts::Column::BalanceCupEfectivo,
            Currency::CupTransferencia => accounts::Column::BalanceCupTransferencia,
        }
    }

    #[must_use]
    pub const fn denomination(self) -> IncomeDenomination {
        match self {
            Currency::UsdZelle | Currency::UsdEfectivo => IncomeDenomination::Usd,
            Currency::Usdt => IncomeDenomination::Usdt,
            Currency::CupEfectivo | Currency::CupTransferencia => IncomeDenomination::Cup,
        }
    }

    #[must_use]
    pub const fn is_usd(self) -> bool {
        matches!(self, Currency::UsdZelle | Currency::UsdEfectivo)
    }

    #[must_use]
    pub const fn is_cup(self) -> bool {
        matches!(self, Currency::CupEfectivo | Currency::CupTransferencia)
    }

    /// CUP bucket a USD bucket lands in when converted without an explicit
    /// target: cash stays cash, Zelle becomes a bank transfer.
    #[must_use]
    pub const fn default_cup_target(self) -> Option<Currency> {
        match self {
            Currency::UsdEfectivo => Some(Currency::CupEfectivo),
            Currency::UsdZelle => Some(Currency::CupTransferencia),
            _ => None,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD_ZELLE" => Ok(Currency::UsdZelle),
            "USD_EFECTIVO" => Ok(Currency::UsdEfectivo),
            "USDT" => Ok(Currency::Usdt),
            "CUP_EFECTIVO" => Ok(Currency::CupEfectivo),
            "CUP_TRANSFERENCIA" => Ok(Currency::CupTransferencia),
            other => Err(EngineError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl core::str::FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::try_from(currency.code()).unwrap(), currency);
        }
        assert_eq!(
            Currency::try_from(" usdt ").unwrap(),
            Currency::Usdt,
            "codes are case-insensitive"
        );
    }

    #[test]
    fn legacy_codes_are_rejected() {
        assert!(Currency::try_from("USD").is_err());
        assert!(Currency::try_from("CUP").is_err());
        assert!(Currency::try_from("").is_err());
    }

    #[test]
    fn every_bucket_has_its_own_column() {
        let mut columns: Vec<String> = Currency::ALL
            .iter()
            .map(|c| format!("{:?}", c.balance_column()))
            .collect();
        columns.sort();
        columns.dedup();
        assert_eq!(columns.len(), Currency::ALL.len());
    }

    #[test]
    fn denominations() {
        assert_eq!(Currency::UsdZelle.denomination(), IncomeDenomination::Usd);
        assert_eq!(Currency::UsdEfectivo.denomination(), IncomeDenomination::Usd);
        assert_eq!(Currency::Usdt.denomination(), IncomeDenomination::Usdt);
        assert_eq!(Currency::CupEfectivo.denomination(), IncomeDenomination::Cup);
        assert_eq!(
            Currency::CupTransferencia.denomination(),
            IncomeDenomination::Cup
        );
    }

    #[test]
    fn cup_targets() {
        assert_eq!(
            Currency::UsdEfectivo.default_cup_target(),
            Some(Currency::CupEfectivo)
        );
        assert_eq!(
            Currency::UsdZelle.default_cup_target(),
            Some(Currency::CupTransferencia)
        );
        assert_eq!(Currency::Usdt.default_cup_target(), None);
    }
}
