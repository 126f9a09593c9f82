use crate::error::{Result, SwitchError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A currency-tagged decimal amount as carried in protocol message bodies.
///
/// The amount travels as a decimal string on the wire; `rust_decimal` keeps
/// it exact instead of going through a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Currency codes compare case-insensitively.
    pub fn is_in(&self, currency: &str) -> bool {
        self.currency.eq_ignore_ascii_case(currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Exchange rates keyed by `(from, to)` currency pair.
///
/// Only the configured direction is stored; the inverse is derived by
/// division. Keys are upper-cased on insert and lookup.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(String, String), Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(SwitchError::Config(format!(
                "exchange rate {from}->{to} must be positive, got {rate}"
            )));
        }
        self.rates
            .insert((from.to_ascii_uppercase(), to.to_ascii_uppercase()), rate);
        Ok(())
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Result<Self> {
        self.insert(from, to, rate)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts `money` into `target`, rounding to `scale` decimal places.
    ///
    /// Same-currency conversion returns the amount untouched.
    pub fn convert(&self, money: &Money, target: &str, scale: u32) -> Result<Money> {
        if money.is_in(target) {
            return Ok(money.clone());
        }

        let from = money.currency.to_ascii_uppercase();
        let to = target.to_ascii_uppercase();
        let unsupported = || SwitchError::UnsupportedConversion {
            from: from.clone(),
            to: to.clone(),
        };

        let converted = if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            money.amount.checked_mul(*rate).ok_or_else(unsupported)?
        } else if let Some(rate) = self.rates.get(&(to.clone(), from.clone())) {
            money.amount.checked_div(*rate).ok_or_else(unsupported)?
        } else {
            return Err(unsupported());
        };

        Ok(Money {
            amount: converted
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven)
                .normalize(),
            currency: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd_xof() -> RateTable {
        RateTable::new()
            .with_rate("USD", "XOF", dec!(579.59))
            .unwrap()
    }

    #[test]
    fn test_identity_conversion_is_exact() {
        let rates = usd_xof();
        let money = Money::new(dec!(10.123456), "USD");
        assert_eq!(rates.convert(&money, "usd", 2).unwrap(), money);
    }

    #[test]
    fn test_forward_conversion() {
        let rates = usd_xof();
        let converted = rates
            .convert(&Money::new(dec!(10), "USD"), "XOF", 0)
            .unwrap();
        assert_eq!(converted, Money::new(dec!(5796), "XOF"));
    }

    #[test]
    fn test_inverse_conversion() {
        let rates = usd_xof();
        let converted = rates
            .convert(&Money::new(dec!(579.59), "xof"), "USD", 2)
            .unwrap();
        assert_eq!(converted, Money::new(dec!(1), "USD"));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let rates = usd_xof();
        let money = Money::new(dec!(1234.5), "XOF");
        let first = rates.convert(&money, "USD", 4).unwrap();
        let second = rates.convert(&money, "USD", 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsupported_pair() {
        let rates = usd_xof();
        let result = rates.convert(&Money::new(dec!(1), "EUR"), "USD", 2);
        assert!(matches!(
            result,
            Err(SwitchError::UnsupportedConversion { ref from, ref to })
                if from == "EUR" && to == "USD"
        ));
    }

    #[test]
    fn test_rate_must_be_positive() {
        let mut rates = RateTable::new();
        assert!(matches!(
            rates.insert("USD", "XOF", dec!(0)),
            Err(SwitchError::Config(_))
        ));
        assert!(rates.is_empty());
    }

    #[test]
    fn test_money_amount_is_a_string_on_the_wire() {
        let money = Money::new(dec!(100.50), "USD");
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(json, serde_json::json!({"amount": "100.50", "currency": "USD"}));

        let parsed: Money = serde_json::from_str(r#"{"amount":"7.25","currency":"XOF"}"#).unwrap();
        assert_eq!(parsed.amount, dec!(7.25));
    }
}
