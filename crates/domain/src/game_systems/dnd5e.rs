//! D&D 5th Edition rules used by the character sheet and the leveling engine.

/// Highest attainable character level.
pub const MAX_LEVEL: u8 = 20;

/// Hit die used when a class does not report one.
pub const DEFAULT_HIT_DIE: u8 = 8;

/// XP thresholds for each level in D&D 5e.
/// Index is level - 1 (so level 1 = index 0).
pub const XP_THRESHOLDS: [i64; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

/// Get XP required for a given level.
pub fn xp_for_level(level: u8) -> i64 {
    if level == 0 || level > MAX_LEVEL {
        return 0;
    }
    XP_THRESHOLDS[(level - 1) as usize]
}

/// Get XP required for the next level.
pub fn xp_for_next_level(current_level: u8) -> i64 {
    if current_level >= MAX_LEVEL {
        return XP_THRESHOLDS[19]; // Max level
    }
    XP_THRESHOLDS[current_level as usize]
}

/// Calculate level from current XP.
///
/// Scans from the top so the last satisfied threshold wins; anything below
/// the first threshold is level 1.
pub fn level_from_xp(xp: i64) -> u8 {
    for (i, &threshold) in XP_THRESHOLDS.iter().enumerate().rev() {
        if xp >= threshold {
            return (i + 1) as u8;
        }
    }
    1
}

/// floor((score - 10) / 2)
pub fn ability_modifier(score: i32) -> i32 {
    // Rust's / rounds toward zero; D&D floors.
    (score - 10).div_euclid(2)
}

pub fn proficiency_bonus(level: u8) -> i32 {
    ((level.max(1) as i32 - 1) / 4) + 2
}

/// Standard hit die per class, used when reference data is unavailable.
pub fn hit_die_for_class(class_name: &str) -> u8 {
    match class_name.trim().to_lowercase().as_str() {
        "barbarian" => 12,
        "fighter" | "paladin" | "ranger" => 10,
        "bard" | "cleric" | "druid" | "monk" | "rogue" | "warlock" => 8,
        "sorcerer" | "wizard" => 6,
        _ => DEFAULT_HIT_DIE,
    }
}

/// Hit points gained on reaching a new level: the full hit die plus the CON
/// modifier. A zero hit die means the default d8.
pub fn hp_gain(hit_die: u8, constitution: i32) -> i32 {
    let die = if hit_die == 0 { DEFAULT_HIT_DIE } else { hit_die };
    die as i32 + ability_modifier(constitution)
}

/// Level 1 hit points, never below 1.
pub fn starting_hp(hit_die: u8, constitution: i32) -> i32 {
    hp_gain(hit_die, constitution).max(1)
}

/// Levels to replay when moving from `old_level` to `new_level`, ascending.
pub fn level_up_plan(old_level: u8, new_level: u8) -> Vec<u8> {
    let new_level = new_level.min(MAX_LEVEL);
    if new_level <= old_level {
        return Vec::new();
    }
    (old_level + 1..=new_level).collect()
}

/// Whether a class feature grants an ability score improvement.
pub fn is_ability_score_feature(feature_name: &str) -> bool {
    feature_name.to_lowercase().contains("ability score")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_xp_is_level_one() {
        assert_eq!(level_from_xp(-1), 1);
        assert_eq!(level_from_xp(i64::MIN), 1);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(299), 1);
        assert_eq!(level_from_xp(300), 2);
        assert_eq!(level_from_xp(899), 2);
        assert_eq!(level_from_xp(900), 3);
        assert_eq!(level_from_xp(355_000), 20);
        assert_eq!(level_from_xp(10_000_000), 20);
    }

    #[test]
    fn meeting_a_threshold_reaches_at_least_that_level() {
        for (i, &threshold) in XP_THRESHOLDS.iter().enumerate() {
            assert!(level_from_xp(threshold) as usize >= i + 1);
            assert!(level_from_xp(threshold + 1) as usize >= i + 1);
        }
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut previous = level_from_xp(-500);
        for xp in (-500..400_000).step_by(97) {
            let level = level_from_xp(xp);
            assert!(level >= previous, "level dropped at xp {}", xp);
            previous = level;
        }
    }

    #[test]
    fn xp_lookup_helpers() {
        assert_eq!(xp_for_level(1), 0);
        assert_eq!(xp_for_level(5), 6500);
        assert_eq!(xp_for_level(0), 0);
        assert_eq!(xp_for_next_level(1), 300);
        assert_eq!(xp_for_next_level(20), 355_000);
    }

    #[test]
    fn ability_modifier_calculation() {
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(20), 5);
    }

    #[test]
    fn proficiency_bonus_progression() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(9), 4);
        assert_eq!(proficiency_bonus(17), 6);
        assert_eq!(proficiency_bonus(20), 6);
    }

    #[test]
    fn hp_gain_defaults_to_d8() {
        assert_eq!(hp_gain(0, 14), 10);
        assert_eq!(hp_gain(10, 14), 12);
        assert_eq!(hp_gain(6, 8), 5);
        assert_eq!(starting_hp(6, 1), 1);
    }

    #[test]
    fn hit_die_lookup() {
        assert_eq!(hit_die_for_class("Barbarian"), 12);
        assert_eq!(hit_die_for_class("wizard"), 6);
        assert_eq!(hit_die_for_class("artificer"), DEFAULT_HIT_DIE);
    }

    #[test]
    fn plan_lists_every_intermediate_level() {
        assert_eq!(level_up_plan(1, 4), vec![2, 3, 4]);
        assert!(level_up_plan(4, 4).is_empty());
        assert!(level_up_plan(5, 3).is_empty());
        assert_eq!(level_up_plan(19, 25), vec![20]);
    }

    #[test]
    fn ability_score_feature_pattern() {
        assert!(is_ability_score_feature("Ability Score Improvement"));
        assert!(is_ability_score_feature("Fighter: ability score improvement 2"));
        assert!(!is_ability_score_feature("Extra Attack"));
    }
}
