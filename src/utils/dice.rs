//! # Dice Expressions
//!
//! Parsing and rolling of formulas such as `"2d8+4"` or `"1d6-1"`.
//!
//! An expression is a signed sum of dice terms (`NdM`, `dM`) and flat
//! modifiers. Every die is rolled independently through the caller's
//! [`GameRng`] and the total is floored at zero.

use crate::GameRng;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing a dice expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceParseError {
    /// The expression contained no terms
    #[error("empty dice expression")]
    Empty,

    /// A term could not be understood
    #[error("invalid dice term '{0}'")]
    InvalidTerm(String),

    /// A die had zero sides
    #[error("dice need at least one side in '{0}'")]
    ZeroSides(String),
}

/// A single signed term of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceTerm {
    /// `count` dice of `sides` faces; a negative count subtracts the roll
    Roll { count: i32, sides: u32 },
    /// A flat modifier
    Flat(i32),
}

/// A parsed dice expression.
///
/// # Examples
///
/// ```
/// use cairn::{DiceExpr, GameRng};
///
/// let expr: DiceExpr = "2d8+4".parse().unwrap();
/// assert_eq!(expr.bounds(), (6, 20));
///
/// let mut rng = GameRng::new(1);
/// let total = expr.roll(&mut rng);
/// assert!((6..=20).contains(&total));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    terms: Vec<DiceTerm>,
}

impl DiceExpr {
    /// Gets the terms of this expression.
    pub fn terms(&self) -> &[DiceTerm] {
        &self.terms
    }

    /// Rolls every term and returns the total, floored at zero.
    pub fn roll(&self, rng: &mut GameRng) -> i32 {
        let total: i32 = self
            .terms
            .iter()
            .map(|term| match *term {
                DiceTerm::Roll { count, sides } => {
                    let rolled = rng.dice(count.unsigned_abs(), sides) as i32;
                    if count < 0 {
                        -rolled
                    } else {
                        rolled
                    }
                }
                DiceTerm::Flat(value) => value,
            })
            .sum();
        total.max(0)
    }

    /// Lowest and highest totals this expression can produce.
    pub fn bounds(&self) -> (i32, i32) {
        let (low, high) = self.terms.iter().fold((0, 0), |(low, high), term| match *term {
            DiceTerm::Roll { count, sides } if count >= 0 => {
                (low + count, high + count * sides as i32)
            }
            DiceTerm::Roll { count, sides } => (low + count * sides as i32, high + count),
            DiceTerm::Flat(value) => (low + value, high + value),
        });
        (low.max(0), high.max(0))
    }

    fn parse_term(raw: &str, negative: bool) -> Result<DiceTerm, DiceParseError> {
        let sign = if negative { -1 } else { 1 };
        let invalid = || DiceParseError::InvalidTerm(raw.to_string());

        match raw.split_once(['d', 'D']) {
            Some((count, sides)) => {
                let count: i32 = if count.is_empty() {
                    1
                } else {
                    count.parse().map_err(|_| invalid())?
                };
                let sides: u32 = sides.parse().map_err(|_| invalid())?;
                if sides == 0 {
                    return Err(DiceParseError::ZeroSides(raw.to_string()));
                }
                Ok(DiceTerm::Roll {
                    count: count * sign,
                    sides,
                })
            }
            None => {
                let value: i32 = raw.parse().map_err(|_| invalid())?;
                Ok(DiceTerm::Flat(value * sign))
            }
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let mut terms = Vec::new();
        let mut current = String::new();
        let mut negative = false;

        for ch in compact.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        terms.push(Self::parse_term(&current, negative)?);
                        current.clear();
                    } else if !terms.is_empty() || negative {
                        // Two operators in a row, e.g. "1d6+-2" or "1d6++2"
                        return Err(DiceParseError::InvalidTerm(compact.clone()));
                    }
                    negative = ch == '-';
                }
                _ => current.push(ch),
            }
        }

        if current.is_empty() {
            return Err(DiceParseError::InvalidTerm(compact));
        }
        terms.push(Self::parse_term(&current, negative)?);

        Ok(Self { terms })
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let (negative, body) = match *term {
                DiceTerm::Roll { count, sides } => {
                    (count < 0, format!("{}d{}", count.unsigned_abs(), sides))
                }
                DiceTerm::Flat(value) => (value < 0, value.unsigned_abs().to_string()),
            };
            match (i, negative) {
                (0, true) => write!(f, "-{}", body)?,
                (0, false) => write!(f, "{}", body)?,
                (_, true) => write!(f, "-{}", body)?,
                (_, false) => write!(f, "+{}", body)?,
            }
        }
        Ok(())
    }
}

/// Parses and rolls a table formula in one step.
///
/// Formulas in the static skill, enemy and item tables are fixed strings; a
/// malformed one is logged and rolls 0 rather than aborting the turn.
pub fn roll_formula(formula: &str, rng: &mut GameRng) -> i32 {
    match formula.parse::<DiceExpr>() {
        Ok(expr) => expr.roll(rng),
        Err(e) => {
            warn!("Ignoring malformed dice formula '{}': {}", formula, e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_terms() {
        let expr: DiceExpr = "2d8+4".parse().unwrap();
        assert_eq!(
            expr.terms(),
            &[DiceTerm::Roll { count: 2, sides: 8 }, DiceTerm::Flat(4)]
        );

        let expr: DiceExpr = "d6".parse().unwrap();
        assert_eq!(expr.terms(), &[DiceTerm::Roll { count: 1, sides: 6 }]);

        let expr: DiceExpr = " 1d10 - 2 ".parse().unwrap();
        assert_eq!(
            expr.terms(),
            &[DiceTerm::Roll { count: 1, sides: 10 }, DiceTerm::Flat(-2)]
        );
    }

    #[test]
    fn test_parse_negative_dice_term() {
        let expr: DiceExpr = "3-1d4".parse().unwrap();
        assert_eq!(
            expr.terms(),
            &[DiceTerm::Flat(3), DiceTerm::Roll { count: -1, sides: 4 }]
        );
        assert_eq!(expr.bounds(), (0, 2));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<DiceExpr>(), Err(DiceParseError::Empty));
        assert!(matches!(
            "2d".parse::<DiceExpr>(),
            Err(DiceParseError::InvalidTerm(_))
        ));
        assert!(matches!(
            "xd6".parse::<DiceExpr>(),
            Err(DiceParseError::InvalidTerm(_))
        ));
        assert!(matches!(
            "1d0".parse::<DiceExpr>(),
            Err(DiceParseError::ZeroSides(_))
        ));
        assert!("1d6+".parse::<DiceExpr>().is_err());
        assert!("1d6++2".parse::<DiceExpr>().is_err());
    }

    #[test]
    fn test_roll_stays_within_bounds() {
        let mut rng = GameRng::new(11);
        let expr: DiceExpr = "3d6+2".parse().unwrap();
        let (low, high) = expr.bounds();
        assert_eq!((low, high), (5, 20));
        for _ in 0..1000 {
            let total = expr.roll(&mut rng);
            assert!(total >= low && total <= high);
        }
    }

    #[test]
    fn test_roll_floors_at_zero() {
        let mut rng = GameRng::new(4);
        let expr: DiceExpr = "1d4-10".parse().unwrap();
        for _ in 0..100 {
            assert_eq!(expr.roll(&mut rng), 0);
        }
    }

    #[test]
    fn test_display() {
        let expr: DiceExpr = "2d8+4".parse().unwrap();
        assert_eq!(expr.to_string(), "2d8+4");
        let expr: DiceExpr = "-1d4+3".parse().unwrap();
        assert_eq!(expr.to_string(), "-1d4+3");
    }

    #[test]
    fn test_roll_formula_tolerates_bad_input() {
        let mut rng = GameRng::new(1);
        assert_eq!(roll_formula("not dice", &mut rng), 0);
        let total = roll_formula("1d1+1", &mut rng);
        assert_eq!(total, 2);
    }
}
