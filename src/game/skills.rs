//! # Skills
//!
//! The static skill table. Skills are read-only data shared by every entity
//! that knows them; an entity only stores which [`SkillKind`]s it has.

use crate::utils::roll_formula;
use crate::{Ability, GameRng, StatBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every skill in the game, three per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    PowerStrike,
    ShieldBash,
    Rally,
    Fireball,
    IceShard,
    ArcaneShield,
    Backstab,
    SmokeBomb,
    Steal,
    Heal,
    Smite,
    Bless,
    ArrowRain,
    Trap,
    NaturesBlessing,
}

/// Who a skill can be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    SelfOnly,
    SingleAlly,
    SingleEnemy,
    AllAllies,
    AllEnemies,
}

impl TargetKind {
    /// Whether the skill affects the opposing side.
    pub fn is_hostile(self) -> bool {
        matches!(self, TargetKind::SingleEnemy | TargetKind::AllEnemies)
    }

    /// Whether a single explicit target must be chosen.
    pub fn needs_target(self) -> bool {
        matches!(self, TargetKind::SingleAlly | TargetKind::SingleEnemy)
    }
}

/// What a skill does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Deal the rolled amount as damage
    Damage,
    /// Deal damage and stun the target for some turns
    DamageAndStun { turns: u32 },
    /// Heal the rolled amount divided by `divisor`
    Heal { divisor: i32 },
    /// Raise armor class for the rest of the encounter
    ArmorBuff(i32),
    /// Raise attack rolls for the rest of the encounter
    AttackBuff(i32),
    /// Steal the rolled amount times the caster's level in gold
    Gold,
}

impl SkillEffect {
    /// Whether the effect takes hit points off its targets.
    pub fn deals_damage(self) -> bool {
        matches!(self, SkillEffect::Damage | SkillEffect::DamageAndStun { .. })
    }
}

/// Static description of a skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub kind: SkillKind,
    pub name: &'static str,
    /// Mana cost
    pub cost: i32,
    /// Dice rolled for the amount, if any
    pub formula: Option<&'static str>,
    /// Ability whose modifier is added to the roll
    pub scaling: Option<Ability>,
    /// Multiple of the caster's level added to the roll
    pub level_factor: i32,
    pub target: TargetKind,
    pub effect: SkillEffect,
    /// Verb phrase used in the combat log, after the caster's name
    pub announce: &'static str,
}

const POWER_STRIKE: Skill = Skill {
    kind: SkillKind::PowerStrike,
    name: "Power Strike",
    cost: 3,
    formula: Some("2d8"),
    scaling: Some(Ability::Strength),
    level_factor: 1,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "unleashes a POWER STRIKE",
};

const SHIELD_BASH: Skill = Skill {
    kind: SkillKind::ShieldBash,
    name: "Shield Bash",
    cost: 5,
    formula: Some("1d6"),
    scaling: Some(Ability::Strength),
    level_factor: 0,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::DamageAndStun { turns: 1 },
    announce: "bashes with their shield",
};

const RALLY: Skill = Skill {
    kind: SkillKind::Rally,
    name: "Rally",
    cost: 7,
    formula: Some("1d6"),
    scaling: None,
    level_factor: 1,
    target: TargetKind::AllAllies,
    effect: SkillEffect::Heal { divisor: 2 },
    announce: "rallies the party",
};

const FIREBALL: Skill = Skill {
    kind: SkillKind::Fireball,
    name: "Fireball",
    cost: 3,
    formula: Some("3d6"),
    scaling: Some(Ability::Intelligence),
    level_factor: 1,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "hurls a FIREBALL",
};

const ICE_SHARD: Skill = Skill {
    kind: SkillKind::IceShard,
    name: "Ice Shard",
    cost: 5,
    formula: Some("2d6"),
    scaling: Some(Ability::Intelligence),
    level_factor: 0,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "launches ICE SHARDS",
};

const ARCANE_SHIELD: Skill = Skill {
    kind: SkillKind::ArcaneShield,
    name: "Arcane Shield",
    cost: 7,
    formula: None,
    scaling: None,
    level_factor: 0,
    target: TargetKind::AllAllies,
    effect: SkillEffect::ArmorBuff(2),
    announce: "raises an ARCANE SHIELD",
};

const BACKSTAB: Skill = Skill {
    kind: SkillKind::Backstab,
    name: "Backstab",
    cost: 3,
    formula: Some("3d6"),
    scaling: Some(Ability::Dexterity),
    level_factor: 2,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "strikes from the shadows",
};

const SMOKE_BOMB: Skill = Skill {
    kind: SkillKind::SmokeBomb,
    name: "Smoke Bomb",
    cost: 5,
    formula: None,
    scaling: None,
    level_factor: 0,
    target: TargetKind::SelfOnly,
    effect: SkillEffect::ArmorBuff(4),
    announce: "vanishes in a cloud of smoke",
};

const STEAL: Skill = Skill {
    kind: SkillKind::Steal,
    name: "Steal",
    cost: 7,
    formula: Some("1d21+4"),
    scaling: None,
    level_factor: 0,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Gold,
    announce: "picks a pocket",
};

const HEAL: Skill = Skill {
    kind: SkillKind::Heal,
    name: "Heal",
    cost: 3,
    formula: Some("2d8"),
    scaling: Some(Ability::Wisdom),
    level_factor: 1,
    target: TargetKind::SingleAlly,
    effect: SkillEffect::Heal { divisor: 1 },
    announce: "channels divine light",
};

const SMITE: Skill = Skill {
    kind: SkillKind::Smite,
    name: "Smite",
    cost: 5,
    formula: Some("2d8"),
    scaling: Some(Ability::Wisdom),
    level_factor: 1,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "calls down DIVINE SMITE",
};

const BLESS: Skill = Skill {
    kind: SkillKind::Bless,
    name: "Bless",
    cost: 7,
    formula: None,
    scaling: None,
    level_factor: 0,
    target: TargetKind::AllAllies,
    effect: SkillEffect::AttackBuff(1),
    announce: "blesses the party",
};

const ARROW_RAIN: Skill = Skill {
    kind: SkillKind::ArrowRain,
    name: "Arrow Rain",
    cost: 3,
    formula: Some("2d6"),
    scaling: Some(Ability::Dexterity),
    level_factor: 1,
    target: TargetKind::AllEnemies,
    effect: SkillEffect::Damage,
    announce: "rains arrows from above",
};

const TRAP: Skill = Skill {
    kind: SkillKind::Trap,
    name: "Trap",
    cost: 5,
    formula: Some("1d8"),
    scaling: Some(Ability::Dexterity),
    level_factor: 0,
    target: TargetKind::SingleEnemy,
    effect: SkillEffect::Damage,
    announce: "sets a cunning trap",
};

const NATURES_BLESSING: Skill = Skill {
    kind: SkillKind::NaturesBlessing,
    name: "Nature's Blessing",
    cost: 7,
    formula: Some("1d8"),
    scaling: Some(Ability::Wisdom),
    level_factor: 0,
    target: TargetKind::AllAllies,
    effect: SkillEffect::Heal { divisor: 1 },
    announce: "calls upon nature",
};

impl SkillKind {
    /// All skills.
    pub const ALL: [SkillKind; 15] = [
        SkillKind::PowerStrike,
        SkillKind::ShieldBash,
        SkillKind::Rally,
        SkillKind::Fireball,
        SkillKind::IceShard,
        SkillKind::ArcaneShield,
        SkillKind::Backstab,
        SkillKind::SmokeBomb,
        SkillKind::Steal,
        SkillKind::Heal,
        SkillKind::Smite,
        SkillKind::Bless,
        SkillKind::ArrowRain,
        SkillKind::Trap,
        SkillKind::NaturesBlessing,
    ];

    /// Looks up the static descriptor.
    pub fn skill(self) -> &'static Skill {
        match self {
            SkillKind::PowerStrike => &POWER_STRIKE,
            SkillKind::ShieldBash => &SHIELD_BASH,
            SkillKind::Rally => &RALLY,
            SkillKind::Fireball => &FIREBALL,
            SkillKind::IceShard => &ICE_SHARD,
            SkillKind::ArcaneShield => &ARCANE_SHIELD,
            SkillKind::Backstab => &BACKSTAB,
            SkillKind::SmokeBomb => &SMOKE_BOMB,
            SkillKind::Steal => &STEAL,
            SkillKind::Heal => &HEAL,
            SkillKind::Smite => &SMITE,
            SkillKind::Bless => &BLESS,
            SkillKind::ArrowRain => &ARROW_RAIN,
            SkillKind::Trap => &TRAP,
            SkillKind::NaturesBlessing => &NATURES_BLESSING,
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.skill().name)
    }
}

impl Skill {
    /// A hostile skill that actually hurts. Steal targets an enemy but
    /// leaves it unharmed, so it does not count.
    pub fn is_offensive(&self) -> bool {
        self.target.is_hostile() && self.effect.deals_damage()
    }

    /// Rolls the skill's amount for a caster: damage, healing or gold.
    ///
    /// Never negative. Skills without a formula return 0.
    pub fn roll_amount(&self, caster: &StatBlock, rng: &mut GameRng) -> i32 {
        let Some(formula) = self.formula else {
            return 0;
        };
        let level = caster.level as i32;
        let mut amount = roll_formula(formula, rng);
        if let Some(ability) = self.scaling {
            amount += caster.modifier(ability) as i32;
        }
        amount += self.level_factor * level;

        match self.effect {
            SkillEffect::Heal { divisor } if divisor > 1 => amount = amount.max(0) / divisor,
            SkillEffect::Gold => amount *= level,
            _ => {}
        }
        amount.max(0)
    }
}

/// Result of a successful cast, before it is applied to any target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOutcome {
    pub skill: SkillKind,
    /// Log line, e.g. "Elara hurls a FIREBALL!"
    pub message: String,
    /// Rolled damage, healing or gold
    pub amount: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AbilityScores;

    #[test]
    fn test_table_is_consistent() {
        for kind in SkillKind::ALL {
            let skill = kind.skill();
            assert_eq!(skill.kind, kind);
            assert!([3, 5, 7].contains(&skill.cost));
            if let Some(formula) = skill.formula {
                assert!(formula.parse::<crate::DiceExpr>().is_ok(), "{}", formula);
            }
            let needs_roll = matches!(
                skill.effect,
                SkillEffect::Damage
                    | SkillEffect::DamageAndStun { .. }
                    | SkillEffect::Heal { .. }
                    | SkillEffect::Gold
            );
            assert_eq!(needs_roll, skill.formula.is_some(), "{}", skill.name);
        }
    }

    #[test]
    fn test_offensive_skills_deal_damage() {
        assert!(SkillKind::Backstab.skill().is_offensive());
        assert!(SkillKind::IceShard.skill().is_offensive());
        assert!(!SkillKind::Steal.skill().is_offensive());
        assert!(!SkillKind::SmokeBomb.skill().is_offensive());
        for kind in SkillKind::ALL {
            let skill = kind.skill();
            if skill.is_offensive() {
                assert!(skill.target.is_hostile(), "{}", skill.name);
            }
        }
    }

    #[test]
    fn test_damage_roll_adds_modifier_and_level() {
        // STR 16 gives +3
        let caster = StatBlock::for_class(AbilityScores::new(16, 10, 10, 10, 10, 10), 10, 4);
        let mut rng = GameRng::new(3);
        for _ in 0..200 {
            let amount = POWER_STRIKE.roll_amount(&caster, &mut rng);
            assert!((2 + 3 + 1..=16 + 3 + 1).contains(&amount));
        }
    }

    #[test]
    fn test_halved_heal() {
        let caster = StatBlock::for_class(AbilityScores::default(), 10, 4);
        let mut rng = GameRng::new(4);
        for _ in 0..200 {
            // (1d6 + 1) / 2
            let amount = RALLY.roll_amount(&caster, &mut rng);
            assert!((1..=3).contains(&amount));
        }
    }

    #[test]
    fn test_gold_scales_with_level() {
        let mut caster = StatBlock::for_class(AbilityScores::default(), 8, 2);
        caster.gain_xp(100);
        let mut rng = GameRng::new(5);
        for _ in 0..200 {
            let gold = STEAL.roll_amount(&caster, &mut rng);
            assert!((10..=50).contains(&gold));
            assert_eq!(gold % 2, 0);
        }
    }

    #[test]
    fn test_buff_skills_roll_nothing() {
        let caster = StatBlock::for_class(AbilityScores::default(), 6, 0);
        let mut rng = GameRng::new(6);
        assert_eq!(ARCANE_SHIELD.roll_amount(&caster, &mut rng), 0);
        assert_eq!(BLESS.roll_amount(&caster, &mut rng), 0);
    }

    #[test]
    fn test_negative_modifier_floors_at_zero() {
        // WIS 3 gives -4
        let caster = StatBlock::for_class(AbilityScores::new(10, 10, 10, 10, 3, 10), 8, 3);
        let mut rng = GameRng::new(7);
        for _ in 0..200 {
            assert!(NATURES_BLESSING.roll_amount(&caster, &mut rng) >= 0);
        }
    }
}
