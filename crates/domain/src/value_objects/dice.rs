//! Dice rolling value objects and parsing
//!
//! Supports dice formulas like "1d20+5", "2d6-1", "1d100", etc.
//! Randomness is injected by the caller so the domain stays deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY or XdY+Z
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
    /// Modifier outside `-MAX_MODIFIER..=MAX_MODIFIER`
    #[error("Modifier must be between -{max} and +{max}", max = MAX_MODIFIER)]
    ModifierOverflow,
}

/// Largest accepted modifier magnitude.
pub const MAX_MODIFIER: i32 = 10_000;

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u8,
    /// Size of each die (Y in XdY)
    pub die_size: u8,
    /// Modifier to add/subtract after rolling (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    /// Create a new dice formula
    pub fn new(dice_count: u8, die_size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        check_modifier(modifier)?;
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Parse a dice formula string like "1d20+5", "2d6-1", "1d100"
    ///
    /// Supported formats:
    /// - "XdY" - Roll X dice of size Y
    /// - "XdY+Z" - Roll X dice of size Y, add Z
    /// - "XdY-Z" - Roll X dice of size Y, subtract Z
    /// - "dY" - Roll 1 die of size Y (shorthand)
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        // Parse dice count (before 'd')
        let dice_count_str = &input[..d_pos];
        let dice_count: u8 = if dice_count_str.is_empty() {
            1 // "d20" means "1d20"
        } else {
            dice_count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", dice_count_str))
            })?
        };

        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }

        let after_d = &input[d_pos + 1..];

        let (die_size_str, modifier) = if let Some(plus_pos) = after_d.find('+') {
            let die_str = &after_d[..plus_pos];
            let mod_str = &after_d[plus_pos + 1..];
            (die_str, parse_modifier(mod_str, '+')?)
        } else if let Some(minus_pos) = after_d.rfind('-') {
            if minus_pos == 0 {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Invalid die size: '{}'",
                    after_d
                )));
            }
            let die_str = &after_d[..minus_pos];
            let mod_str = &after_d[minus_pos + 1..];
            (die_str, -parse_modifier(mod_str, '-')?)
        } else {
            (after_d, 0)
        };

        let die_size: u8 = die_size_str.parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", die_size_str))
        })?;

        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }

        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Roll the dice using the supplied roller.
    ///
    /// `roller(die_size)` must return a value in `1..=die_size`.
    pub fn roll_with(&self, mut roller: impl FnMut(u8) -> i32) -> DiceRollResult {
        let individual_rolls: Vec<i32> = (0..self.dice_count)
            .map(|_| roller(self.die_size))
            .collect();

        let dice_total = individual_rolls
            .iter()
            .fold(0i32, |sum, roll| sum.saturating_add(*roll));
        let total = dice_total.saturating_add(self.modifier);

        DiceRollResult {
            formula: self.clone(),
            individual_rolls,
            dice_total,
            modifier_applied: self.modifier,
            total,
        }
    }

    /// Format as a display string (e.g., "1d20+5")
    pub fn display(&self) -> String {
        if self.modifier == 0 {
            format!("{}d{}", self.dice_count, self.die_size)
        } else if self.modifier > 0 {
            format!("{}d{}+{}", self.dice_count, self.die_size, self.modifier)
        } else {
            format!("{}d{}{}", self.dice_count, self.die_size, self.modifier)
        }
    }
}

/// Digits only; the sign is taken from the operator.
fn parse_modifier(digits: &str, sign: char) -> Result<i32, DiceParseError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DiceParseError::InvalidFormat(format!(
            "Invalid modifier: '{}{}'",
            sign, digits
        )));
    }
    let value: i32 = digits
        .parse()
        .map_err(|_| DiceParseError::ModifierOverflow)?;
    check_modifier(value)?;
    Ok(value)
}

fn check_modifier(modifier: i32) -> Result<(), DiceParseError> {
    if modifier.checked_abs().is_some_and(|m| m <= MAX_MODIFIER) {
        Ok(())
    } else {
        Err(DiceParseError::ModifierOverflow)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    /// The formula that was rolled
    pub formula: DiceFormula,
    /// Individual die results
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// Modifier that was applied
    pub modifier_applied: i32,
    /// Final total (dice_total + modifier)
    pub total: i32,
}

impl DiceRollResult {
    /// A d20 roll where any die came up 20.
    pub fn is_critical(&self) -> bool {
        self.formula.die_size == 20 && self.individual_rolls.contains(&20)
    }

    /// Format as a breakdown string (e.g., "2d6[3, 5] + 1 = 9")
    pub fn breakdown(&self) -> String {
        let rolls_str: Vec<String> = self
            .individual_rolls
            .iter()
            .map(|r| r.to_string())
            .collect();
        let dice = format!(
            "{}d{}[{}]",
            self.formula.dice_count,
            self.formula.die_size,
            rolls_str.join(", ")
        );
        if self.modifier_applied == 0 {
            format!("{} = {}", dice, self.total)
        } else if self.modifier_applied > 0 {
            format!("{} + {} = {}", dice, self.modifier_applied, self.total)
        } else {
            format!("{} - {} = {}", dice, -self.modifier_applied, self.total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_formula() {
        let formula = DiceFormula::parse("1d20").expect("valid");
        assert_eq!(formula.dice_count, 1);
        assert_eq!(formula.die_size, 20);
        assert_eq!(formula.modifier, 0);
    }

    #[test]
    fn parse_with_modifiers() {
        assert_eq!(DiceFormula::parse("2d6+3").expect("valid").modifier, 3);
        assert_eq!(DiceFormula::parse("1d8-1").expect("valid").modifier, -1);
        assert_eq!(DiceFormula::parse(" 4D6 + 2 ").expect("valid").modifier, 2);
    }

    #[test]
    fn parse_shorthand() {
        let formula = DiceFormula::parse("d100").expect("valid");
        assert_eq!(formula.dice_count, 1);
        assert_eq!(formula.die_size, 100);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(DiceFormula::parse(""), Err(DiceParseError::Empty));
        assert_eq!(DiceFormula::parse("0d6"), Err(DiceParseError::InvalidDiceCount));
        assert_eq!(DiceFormula::parse("1d1"), Err(DiceParseError::InvalidDieSize));
        assert!(matches!(
            DiceFormula::parse("20"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            DiceFormula::parse("1d-4"),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn roll_with_injected_roller() {
        let formula = DiceFormula::parse("3d6+2").expect("valid");
        let mut next = [2, 4, 6].into_iter();
        let result = formula.roll_with(|_| next.next().unwrap_or(1));
        assert_eq!(result.individual_rolls, vec![2, 4, 6]);
        assert_eq!(result.dice_total, 12);
        assert_eq!(result.total, 14);
        assert_eq!(result.breakdown(), "3d6[2, 4, 6] + 2 = 14");
        assert!(!result.is_critical());
    }

    #[test]
    fn natural_twenty_is_critical() {
        let formula = DiceFormula::parse("1d20+5").expect("valid");
        let result = formula.roll_with(|size| size as i32);
        assert_eq!(result.total, 25);
        assert!(result.is_critical());

        let result = formula.roll_with(|_| 19);
        assert!(!result.is_critical());
    }

    #[test]
    fn display_round_trips_negative_modifier() {
        let formula = DiceFormula::parse("2d8-1").expect("valid");
        assert_eq!(formula.to_string(), "2d8-1");
    }

    #[test]
    fn huge_modifiers_are_rejected() {
        assert_eq!(
            DiceFormula::parse("1d20+2147483647"),
            Err(DiceParseError::ModifierOverflow)
        );
        assert_eq!(
            DiceFormula::parse("1d20-2147483647"),
            Err(DiceParseError::ModifierOverflow)
        );
        assert_eq!(
            DiceFormula::parse("1d20+99999999999"),
            Err(DiceParseError::ModifierOverflow)
        );
        assert_eq!(
            DiceFormula::new(1, 20, i32::MIN),
            Err(DiceParseError::ModifierOverflow)
        );
    }

    #[test]
    fn largest_modifier_rolls_without_overflow() {
        let formula = DiceFormula::parse("255d255+10000").expect("valid");
        let result = formula.roll_with(|size| i32::from(size));
        assert_eq!(result.total, 255 * 255 + MAX_MODIFIER);

        let formula = DiceFormula::parse("1d20-10000").expect("valid");
        assert_eq!(formula.roll_with(|_| 1).total, 1 - MAX_MODIFIER);
    }
}
