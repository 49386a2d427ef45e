//! Ability scores and ability score increases (D&D 5e's six stats).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::game_systems::dnd5e;

/// Lowest legal ability score.
pub const MIN_ABILITY_SCORE: i32 = 1;
/// Highest legal ability score.
pub const MAX_ABILITY_SCORE: i32 = 30;
/// Ability score improvements cannot push a score past this value.
pub const ASI_SCORE_CAP: i32 = 20;

/// One of the six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Short uppercase label ("STR").
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "str" | "strength" => Ok(Self::Str),
            "dex" | "dexterity" => Ok(Self::Dex),
            "con" | "constitution" => Ok(Self::Con),
            "int" | "intelligence" => Ok(Self::Int),
            "wis" | "wisdom" => Ok(Self::Wis),
            "cha" | "charisma" => Ok(Self::Cha),
            other => Err(DomainError::parse(format!("Unknown ability: {}", other))),
        }
    }
}

/// The six ability scores of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
}

impl AbilityScores {
    /// Build from scores in STR, DEX, CON, INT, WIS, CHA order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when any score is outside 1..=30.
    pub fn new(scores: [i32; 6]) -> Result<Self, DomainError> {
        for (ability, score) in Ability::ALL.iter().zip(scores) {
            if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&score) {
                return Err(DomainError::validation(format!(
                    "{} must be between {} and {}, got {}",
                    ability, MIN_ABILITY_SCORE, MAX_ABILITY_SCORE, score
                )));
            }
        }
        let [strength, dexterity, constitution, intelligence, wisdom, charisma] = scores;
        Ok(Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        })
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    fn slot(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        }
    }

    /// floor((score - 10) / 2)
    pub fn modifier(&self, ability: Ability) -> i32 {
        dnd5e::ability_modifier(self.get(ability))
    }

    /// Raise a score, never past the ASI cap (scores already above it stay put).
    ///
    /// Returns the amount actually gained.
    pub fn increase(&mut self, ability: Ability, amount: i32) -> i32 {
        let slot = self.slot(ability);
        let before = *slot;
        let ceiling = ASI_SCORE_CAP.max(before);
        *slot = (before + amount).min(ceiling);
        *slot - before
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// An ability score improvement choice: +2 to one ability or +1 to two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityScoreIncrease {
    Single(Ability),
    Pair(Ability, Ability),
}

impl AbilityScoreIncrease {
    /// Parse user input such as `"STR"`, `"dex, con"` or `"wis cha"`.
    ///
    /// Returns `None` for empty input, unknown abilities, a repeated ability,
    /// or more than two abilities.
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        match parts.as_slice() {
            [one] => one.parse().ok().map(Self::Single),
            [first, second] => {
                let first: Ability = first.parse().ok()?;
                let second: Ability = second.parse().ok()?;
                (first != second).then_some(Self::Pair(first, second))
            }
            _ => None,
        }
    }

    /// Apply to a score block.
    pub fn apply_to(&self, scores: &mut AbilityScores) {
        match *self {
            Self::Single(ability) => {
                scores.increase(ability, 2);
            }
            Self::Pair(first, second) => {
                scores.increase(first, 1);
                scores.increase(second, 1);
            }
        }
    }
}

impl fmt::Display for AbilityScoreIncrease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ability) => write!(f, "{} +2", ability),
            Self::Pair(first, second) => write!(f, "{} +1, {} +1", first, second),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> AbilityScores {
        AbilityScores::new([15, 14, 13, 12, 10, 8]).expect("valid scores")
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(AbilityScores::new([0, 10, 10, 10, 10, 10]).is_err());
        assert!(AbilityScores::new([10, 10, 10, 10, 10, 31]).is_err());
    }

    #[test]
    fn modifiers_use_floor_division() {
        let s = scores();
        assert_eq!(s.modifier(Ability::Str), 2);
        assert_eq!(s.modifier(Ability::Con), 1);
        assert_eq!(s.modifier(Ability::Wis), 0);
        assert_eq!(s.modifier(Ability::Cha), -1);
    }

    #[test]
    fn increase_caps_at_twenty() {
        let mut s = AbilityScores::new([19, 10, 10, 10, 10, 22]).expect("valid");
        assert_eq!(s.increase(Ability::Str, 2), 1);
        assert_eq!(s.get(Ability::Str), 20);
        assert_eq!(s.increase(Ability::Cha, 2), 0);
        assert_eq!(s.get(Ability::Cha), 22);
    }

    #[test]
    fn parse_single_and_pair() {
        assert_eq!(
            AbilityScoreIncrease::parse("str"),
            Some(AbilityScoreIncrease::Single(Ability::Str))
        );
        assert_eq!(
            AbilityScoreIncrease::parse(" Dexterity, con "),
            Some(AbilityScoreIncrease::Pair(Ability::Dex, Ability::Con))
        );
        assert_eq!(
            AbilityScoreIncrease::parse("wis cha"),
            Some(AbilityScoreIncrease::Pair(Ability::Wis, Ability::Cha))
        );
    }

    #[test]
    fn parse_invalid_input_is_none() {
        assert_eq!(AbilityScoreIncrease::parse(""), None);
        assert_eq!(AbilityScoreIncrease::parse("   "), None);
        assert_eq!(AbilityScoreIncrease::parse("luck"), None);
        assert_eq!(AbilityScoreIncrease::parse("str,str"), None);
        assert_eq!(AbilityScoreIncrease::parse("str,dex,con"), None);
        assert_eq!(AbilityScoreIncrease::parse("str,luck"), None);
    }

    #[test]
    fn apply_pair() {
        let mut s = scores();
        AbilityScoreIncrease::Pair(Ability::Int, Ability::Wis).apply_to(&mut s);
        assert_eq!(s.get(Ability::Int), 13);
        assert_eq!(s.get(Ability::Wis), 11);
    }
}
