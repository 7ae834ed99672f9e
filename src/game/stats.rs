//! # Stats Module
//!
//! Ability scores and the numbers derived from them.
//!
//! A [`StatBlock`] stores only base data: ability scores, level, experience,
//! current hit points and mana, and the summed bonus of equipped gear. Maximum
//! HP, maximum MP and armor class are computed on every read, so they can
//! never drift from the scores, level and gear they depend on.

use crate::GameRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// All abilities in canonical order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    fn index(self) -> usize {
        match self {
            Ability::Strength => 0,
            Ability::Dexterity => 1,
            Ability::Constitution => 2,
            Ability::Intelligence => 3,
            Ability::Wisdom => 4,
            Ability::Charisma => 5,
        }
    }

    /// Three-letter abbreviation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Rolls one ability score: four d6, drop the lowest, sum the rest.
///
/// Always within `3..=18`.
pub fn roll_stat(rng: &mut GameRng) -> u8 {
    let mut rolls = [0u32; 4];
    for roll in rolls.iter_mut() {
        *roll = rng.die(6);
    }
    rolls.sort_unstable();
    rolls[1..].iter().sum::<u32>() as u8
}

/// Ability modifier: `floor((score - 10) / 2)`.
///
/// Floor division, so odd scores below 10 round down.
///
/// # Examples
///
/// ```
/// use cairn::modifier;
///
/// assert_eq!(modifier(10), 0);
/// assert_eq!(modifier(8), -1);
/// assert_eq!(modifier(9), -1);
/// assert_eq!(modifier(20), 5);
/// ```
pub fn modifier(score: u8) -> i8 {
    (score as i16 - 10).div_euclid(2) as i8
}

/// A full set of six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores([u8; 6]);

impl AbilityScores {
    /// Creates scores in STR, DEX, CON, INT, WIS, CHA order.
    pub fn new(
        strength: u8,
        dexterity: u8,
        constitution: u8,
        intelligence: u8,
        wisdom: u8,
        charisma: u8,
    ) -> Self {
        Self([
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        ])
    }

    /// Every score set to the same value.
    pub fn uniform(score: u8) -> Self {
        Self([score; 6])
    }

    /// Rolls all six scores with [`roll_stat`].
    pub fn roll(rng: &mut GameRng) -> Self {
        let mut scores = [0u8; 6];
        for score in scores.iter_mut() {
            *score = roll_stat(rng);
        }
        Self(scores)
    }

    /// Gets one score.
    pub fn get(&self, ability: Ability) -> u8 {
        self.0[ability.index()]
    }

    /// Sets one score.
    pub fn set(&mut self, ability: Ability, score: u8) {
        self.0[ability.index()] = score;
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

/// Returned when a skill costs more mana than the caster has.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("not enough MP: {needed} needed, {available} available")]
pub struct InsufficientResource {
    /// Mana the action costs
    pub needed: i32,
    /// Mana the caster had
    pub available: i32,
}

/// Summed bonuses of everything an entity has equipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearBonus {
    /// Per-ability bonus in STR, DEX, CON, INT, WIS, CHA order
    pub abilities: [i8; 6],
    /// Armor class bonus
    pub armor: i32,
    /// Maximum hit point bonus
    pub max_hp: i32,
}

impl GearBonus {
    /// Bonus to a single ability.
    pub fn ability(&self, ability: Ability) -> i8 {
        self.abilities[ability.index()]
    }

    /// Raises one ability bonus.
    pub fn with_ability(mut self, ability: Ability, bonus: i8) -> Self {
        self.abilities[ability.index()] += bonus;
        self
    }

    /// Adds another bonus on top of this one.
    pub fn combine(mut self, other: GearBonus) -> Self {
        for (a, b) in self.abilities.iter_mut().zip(other.abilities) {
            *a += b;
        }
        self.armor += other.armor;
        self.max_hp += other.max_hp;
        self
    }
}

/// How the hit points and armor class of a stat block are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatProfile {
    /// Class-based: HP from the hit die and CON, AC from DEX and armor
    Class { hp_die: i32, armor_bonus: i32 },
    /// Monster-based: fixed HP and AC that grow with level
    Monster { base_hp: i32, base_ac: i32 },
}

/// Ability scores, level, resources and gear of one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Base ability scores, without gear
    pub abilities: AbilityScores,
    /// Derivation rules
    pub profile: StatProfile,
    /// Current level, starting at 1
    pub level: u32,
    /// Experience toward the next level
    pub xp: u32,
    /// Experience needed for the next level
    pub xp_to_level: u32,
    hp: i32,
    mp: i32,
    gear: GearBonus,
}

impl StatBlock {
    /// Starting experience threshold.
    pub const BASE_XP_TO_LEVEL: u32 = 100;

    /// Creates a level-1 stat block for a character class, at full HP and MP.
    pub fn for_class(abilities: AbilityScores, hp_die: i32, armor_bonus: i32) -> Self {
        Self::with_profile(
            abilities,
            StatProfile::Class {
                hp_die,
                armor_bonus,
            },
            1,
        )
    }

    /// Creates a monster stat block at full HP.
    pub fn for_monster(abilities: AbilityScores, base_hp: i32, base_ac: i32, level: u32) -> Self {
        Self::with_profile(abilities, StatProfile::Monster { base_hp, base_ac }, level)
    }

    fn with_profile(abilities: AbilityScores, profile: StatProfile, level: u32) -> Self {
        let mut stats = Self {
            abilities,
            profile,
            level: level.max(1),
            xp: 0,
            xp_to_level: Self::BASE_XP_TO_LEVEL,
            hp: 0,
            mp: 0,
            gear: GearBonus::default(),
        };
        stats.hp = stats.max_hp();
        stats.mp = stats.max_mp();
        stats
    }

    /// Effective score including gear, clamped to `1..=30`.
    pub fn score(&self, ability: Ability) -> u8 {
        let total = self.abilities.get(ability) as i16 + self.gear.ability(ability) as i16;
        total.clamp(1, 30) as u8
    }

    /// Modifier of the effective score.
    pub fn modifier(&self, ability: Ability) -> i8 {
        modifier(self.score(ability))
    }

    fn modifier_i32(&self, ability: Ability) -> i32 {
        self.modifier(ability) as i32
    }

    /// Maximum hit points, never below 1.
    pub fn max_hp(&self) -> i32 {
        let levels_gained = self.level as i32 - 1;
        let base = match self.profile {
            StatProfile::Class { hp_die, .. } => {
                let con = self.modifier_i32(Ability::Constitution);
                hp_die + con + levels_gained * (hp_die / 2 + con)
            }
            StatProfile::Monster { base_hp, .. } => base_hp + levels_gained * (base_hp / 3),
        };
        (base + self.gear.max_hp).max(1)
    }

    /// Maximum mana, never below 0. Monsters have none.
    pub fn max_mp(&self) -> i32 {
        match self.profile {
            StatProfile::Class { .. } => (10
                + 2 * self.modifier_i32(Ability::Intelligence)
                + self.modifier_i32(Ability::Wisdom))
            .max(0),
            StatProfile::Monster { .. } => 0,
        }
    }

    /// Armor class before any combat buffs.
    pub fn armor_class(&self) -> i32 {
        let base = match self.profile {
            StatProfile::Class { armor_bonus, .. } => {
                10 + self.modifier_i32(Ability::Dexterity) + armor_bonus
            }
            StatProfile::Monster { base_ac, .. } => base_ac + self.level as i32 - 1,
        };
        base + self.gear.armor
    }

    /// Current hit points.
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Current mana.
    pub fn mp(&self) -> i32 {
        self.mp
    }

    /// Currently applied gear bonus.
    pub fn gear(&self) -> GearBonus {
        self.gear
    }

    /// Whether hit points are above zero.
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Removes hit points, flooring at zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let taken = amount.max(0).min(self.hp);
        self.hp -= taken;
        taken
    }

    /// Restores hit points up to the maximum. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.max(0).min(self.max_hp() - self.hp).max(0);
        self.hp += healed;
        healed
    }

    /// Restores mana up to the maximum. Returns the amount restored.
    pub fn restore_mp(&mut self, amount: i32) -> i32 {
        let restored = amount.max(0).min(self.max_mp() - self.mp).max(0);
        self.mp += restored;
        restored
    }

    /// Spends mana, or refuses without spending anything.
    pub fn spend_mp(&mut self, cost: i32) -> Result<(), InsufficientResource> {
        if self.mp < cost {
            return Err(InsufficientResource {
                needed: cost,
                available: self.mp,
            });
        }
        self.mp -= cost;
        Ok(())
    }

    /// Refills HP and MP to their maxima.
    pub fn restore_full(&mut self) {
        self.hp = self.max_hp();
        self.mp = self.max_mp();
    }

    /// Replaces the gear bonus.
    ///
    /// Extra maximum HP from the new gear is also granted as current HP;
    /// current values are clamped if the maxima shrink.
    pub fn set_gear(&mut self, gear: GearBonus) {
        let old_max = self.max_hp();
        self.gear = gear;
        let new_max = self.max_hp();
        if new_max > old_max {
            self.hp += new_max - old_max;
        }
        self.hp = self.hp.min(new_max);
        self.mp = self.mp.min(self.max_mp());
    }

    /// Adds experience and applies every level-up it pays for.
    ///
    /// Each level-up subtracts the threshold, raises the threshold by half
    /// (rounded down) and fully restores HP and MP. Returns the number of
    /// levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.xp_to_level {
            self.xp -= self.xp_to_level;
            self.level += 1;
            self.xp_to_level = (self.xp_to_level * 3 / 2).max(1);
            gained += 1;
        }
        if gained > 0 {
            self.restore_full();
        }
        gained
    }

    /// Sets current HP directly, clamped to `0..=max_hp`.
    pub(crate) fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior_stats() -> StatBlock {
        StatBlock::for_class(AbilityScores::new(16, 12, 14, 10, 10, 10), 10, 4)
    }

    #[test]
    fn test_modifier_floor_division() {
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(8), -1);
        assert_eq!(modifier(9), -1);
        assert_eq!(modifier(3), -4);
        assert_eq!(modifier(1), -5);
        assert_eq!(modifier(18), 4);
        assert_eq!(modifier(20), 5);
    }

    #[test]
    fn test_roll_stat_range() {
        let mut rng = GameRng::new(42);
        for _ in 0..5000 {
            let score = roll_stat(&mut rng);
            assert!((3..=18).contains(&score));
        }
    }

    #[test]
    fn test_ability_scores_access() {
        let mut scores = AbilityScores::new(16, 12, 14, 8, 10, 11);
        assert_eq!(scores.get(Ability::Strength), 16);
        assert_eq!(scores.get(Ability::Charisma), 11);
        scores.set(Ability::Intelligence, 15);
        assert_eq!(scores.get(Ability::Intelligence), 15);
        assert_eq!(Ability::Wisdom.to_string(), "WIS");
    }

    #[test]
    fn test_class_derived_stats() {
        let stats = warrior_stats();
        // 10 + CON(+2)
        assert_eq!(stats.max_hp(), 12);
        // 10 + 2*INT(0) + WIS(0)
        assert_eq!(stats.max_mp(), 10);
        // 10 + DEX(+1) + 4
        assert_eq!(stats.armor_class(), 15);
        assert_eq!(stats.hp(), 12);
        assert_eq!(stats.mp(), 10);
    }

    #[test]
    fn test_monster_derived_stats_scale_with_level() {
        let goblin = StatBlock::for_monster(AbilityScores::default(), 8, 11, 1);
        assert_eq!(goblin.max_hp(), 8);
        assert_eq!(goblin.armor_class(), 11);
        assert_eq!(goblin.max_mp(), 0);

        let veteran = StatBlock::for_monster(AbilityScores::default(), 30, 13, 3);
        // 30 + 2 * 10
        assert_eq!(veteran.max_hp(), 50);
        assert_eq!(veteran.armor_class(), 15);
    }

    #[test]
    fn test_gain_xp_multiple_levels() {
        let mut stats = warrior_stats();
        stats.take_damage(5);
        stats.spend_mp(4).unwrap();

        // 100 for level 2, 150 for level 3, 25 left over
        let gained = stats.gain_xp(275);
        assert_eq!(gained, 2);
        assert_eq!(stats.level, 3);
        assert_eq!(stats.xp, 25);
        assert_eq!(stats.xp_to_level, 225);
        // 12 + 2 * (5 + 2)
        assert_eq!(stats.max_hp(), 26);
        assert_eq!(stats.hp(), stats.max_hp());
        assert_eq!(stats.mp(), stats.max_mp());
    }

    #[test]
    fn test_gain_xp_below_threshold() {
        let mut stats = warrior_stats();
        assert_eq!(stats.gain_xp(99), 0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.xp, 99);
        assert_eq!(stats.gain_xp(1), 1);
        assert_eq!(stats.xp, 0);
    }

    #[test]
    fn test_spend_mp_fails_closed() {
        let mut stats = warrior_stats();
        assert!(stats.spend_mp(7).is_ok());
        assert_eq!(stats.mp(), 3);

        let err = stats.spend_mp(5).unwrap_err();
        assert_eq!(
            err,
            InsufficientResource {
                needed: 5,
                available: 3
            }
        );
        assert_eq!(stats.mp(), 3);
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut stats = warrior_stats();
        assert_eq!(stats.take_damage(50), 12);
        assert_eq!(stats.hp(), 0);
        assert!(!stats.is_alive());
        assert_eq!(stats.take_damage(-3), 0);

        assert_eq!(stats.heal(5), 5);
        assert_eq!(stats.heal(100), 7);
        assert_eq!(stats.hp(), 12);
    }

    #[test]
    fn test_gear_flows_into_derived_stats() {
        let mut stats = warrior_stats();
        stats.take_damage(2);

        let amulet_and_ring = GearBonus {
            max_hp: 20,
            armor: 4,
            ..GearBonus::default()
        }
        .with_ability(Ability::Strength, 2)
        .with_ability(Ability::Intelligence, 2);
        stats.set_gear(amulet_and_ring);

        assert_eq!(stats.max_hp(), 32);
        assert_eq!(stats.hp(), 30);
        assert_eq!(stats.armor_class(), 19);
        assert_eq!(stats.score(Ability::Strength), 18);
        // INT 12 now gives +1, so 10 + 2
        assert_eq!(stats.max_mp(), 12);

        stats.set_gear(GearBonus::default());
        assert_eq!(stats.max_hp(), 12);
        assert_eq!(stats.hp(), 12);
        assert_eq!(stats.score(Ability::Strength), 16);
    }
}
