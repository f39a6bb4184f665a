//! Submitted orders.
//!
//! An [`OrderRequest`] is what arrives over the wire: loosely typed, not yet
//! checked. [`OrderRequest::validate`] turns it into an [`Order`], which is
//! immutable from then on and carries a freshly assigned [`OrderId`].

use crate::expression::{self, DEFAULT_DECAY_FORMULA};
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Storage temperature an order needs. Each has its own shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Hot,
    Cold,
    Frozen,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "hot",
            Temperature::Cold => "cold",
            Temperature::Frozen => "frozen",
        }
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Temperature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Temperature::Hot),
            "cold" => Ok(Temperature::Cold),
            "frozen" => Ok(Temperature::Frozen),
            other => Err(ValidationError::UnknownTemperature(other.to_string())),
        }
    }
}

/// Longest decay formula, in bytes, that validation accepts.
pub const MAX_FORMULA_LEN: usize = 512;

fn default_decay_formula() -> String {
    DEFAULT_DECAY_FORMULA.to_string()
}

/// An order as submitted, before validation.
///
/// Field names follow the JSON feed:
///
/// ```json
/// {"name": "Banana Split", "temp": "frozen", "shelfLife": 20, "decayRate": 0.63}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub name: String,
    pub temp: String,
    pub shelf_life: i64,
    pub decay_rate: f64,
    #[serde(rename = "orderDecayFormula", default = "default_decay_formula")]
    pub decay_formula: String,
}

impl OrderRequest {
    pub fn new(name: impl Into<String>, temp: impl Into<String>, shelf_life: i64, decay_rate: f64) -> Self {
        Self {
            name: name.into(),
            temp: temp.into(),
            shelf_life,
            decay_rate,
            decay_formula: default_decay_formula(),
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.decay_formula = formula.into();
        self
    }

    /// Checks every field and assigns the order its id.
    ///
    /// The formula is test-evaluated with the order's own shelf life and decay
    /// rate at age zero; anything that fails to parse is refused here rather
    /// than discovered on a shelf.
    pub fn validate(self) -> Result<Order, ValidationError> {
        let temperature = self.temp.parse::<Temperature>()?;
        if self.shelf_life < 0 {
            return Err(ValidationError::NegativeShelfLife(self.shelf_life));
        }
        let shelf_life = u32::try_from(self.shelf_life)
            .map_err(|_| ValidationError::ShelfLifeTooLarge(self.shelf_life))?;
        if !(self.decay_rate >= 0.0) || !self.decay_rate.is_finite() {
            return Err(ValidationError::InvalidDecayRate(self.decay_rate));
        }
        if self.decay_formula.len() > MAX_FORMULA_LEN {
            return Err(ValidationError::FormulaTooLong {
                len: self.decay_formula.len(),
                limit: MAX_FORMULA_LEN,
            });
        }
        expression::evaluate(&self.decay_formula, f64::from(shelf_life), self.decay_rate, 0)
            .map_err(|source| ValidationError::InvalidFormula {
                formula: self.decay_formula.clone(),
                source,
            })?;

        Ok(Order {
            id: OrderId::new(),
            name: self.name,
            temperature,
            shelf_life,
            decay_rate: self.decay_rate,
            decay_formula: self.decay_formula,
        })
    }
}

/// A validated order. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    name: String,
    temperature: Temperature,
    shelf_life: u32,
    decay_rate: f64,
    decay_formula: String,
}

impl Order {
    /// Validates an order that uses the default decay formula.
    pub fn new(
        name: impl Into<String>,
        temp: impl Into<String>,
        shelf_life: i64,
        decay_rate: f64,
    ) -> Result<Self, ValidationError> {
        OrderRequest::new(name, temp, shelf_life, decay_rate).validate()
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Seconds of full value.
    pub fn shelf_life(&self) -> u32 {
        self.shelf_life
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn decay_formula(&self) -> &str {
        &self.decay_formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::EvalError;

    #[test]
    fn test_bad_temperature() {
        let result = Order::new("Banana Split", "Mordor", 100, 0.45);
        assert_eq!(
            result,
            Err(ValidationError::UnknownTemperature("Mordor".to_string()))
        );
    }

    #[test]
    fn test_bad_shelf_life() {
        let result = Order::new("Banana Split", "hot", -10, 0.45);
        assert_eq!(result, Err(ValidationError::NegativeShelfLife(-10)));

        let result = Order::new("Banana Split", "hot", 5_000_000_000, 0.45);
        assert_eq!(result, Err(ValidationError::ShelfLifeTooLarge(5_000_000_000)));
    }

    #[test]
    fn test_bad_decay_rate() {
        assert_eq!(
            Order::new("Banana Split", "hot", 10, -0.45),
            Err(ValidationError::InvalidDecayRate(-0.45))
        );
        assert!(Order::new("Banana Split", "hot", 10, f64::NAN).is_err());
    }

    #[test]
    fn test_bad_formula() {
        let result = OrderRequest::new("Banana Split", "hot", 10, 0.45)
            .with_formula("shelfLife - (1 + decayRate)*orderTotalAge")
            .validate();
        assert!(matches!(result, Err(ValidationError::InvalidFormula { .. })));
    }

    #[test]
    fn test_deeply_nested_formula_is_refused() {
        let nested = format!("{}shelfLife{}", "(".repeat(100), ")".repeat(100));
        let result = OrderRequest::new("Deep", "hot", 10, 0.1)
            .with_formula(nested)
            .validate();
        assert!(matches!(
            result,
            Err(ValidationError::InvalidFormula {
                source: EvalError::TooDeep { .. },
                ..
            })
        ));

        let huge = format!("{}shelfLife{}", "(".repeat(10_000), ")".repeat(10_000));
        let result = OrderRequest::new("Deep", "hot", 10, 0.1)
            .with_formula(huge)
            .validate();
        assert!(matches!(
            result,
            Err(ValidationError::FormulaTooLong { limit: MAX_FORMULA_LEN, .. })
        ));
    }

    #[test]
    fn test_valid_orders() {
        let order = Order::new("Banana Split", "hot", 10, 0.45).unwrap();
        assert_eq!(order.temperature(), Temperature::Hot);
        assert_eq!(order.decay_formula(), DEFAULT_DECAY_FORMULA);

        let custom = OrderRequest::new("Banana Split", "hot", 10, 0.45)
            .with_formula("shelfLife - decayRate * 2 * orderAge")
            .validate()
            .unwrap();
        assert_eq!(custom.decay_formula(), "shelfLife - decayRate * 2 * orderAge");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Order::new("Tacos", "hot", 10, 0.5).unwrap();
        let b = Order::new("Tacos", "hot", 10, 0.5).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_deserialize_from_feed() {
        let json = r#"{"name": "Banana Split", "temp": "frozen", "shelfLife": 20, "decayRate": 0.63}"#;
        let request: OrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, OrderRequest::new("Banana Split", "frozen", 20, 0.63));

        let json = r#"{"name": "Pho", "temp": "hot", "shelfLife": 9, "decayRate": 0.1,
                       "orderDecayFormula": "shelfLife - orderAge"}"#;
        let request: OrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.decay_formula, "shelfLife - orderAge");
    }
}
