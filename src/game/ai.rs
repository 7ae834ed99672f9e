//! # AI Decision Policies
//!
//! Pure decision functions for enemies and companions. They read the
//! encounter and the arena and return a choice; [`CombatState`] applies it
//! through the same primitives the player's actions use.

use crate::{
    roll_attack, AttackRoll, CombatState, EntityArena, EntityId, GameRng, SkillEffect, TargetKind,
};

/// Chance that a companion spends MP on an offensive skill.
pub const COMPANION_SKILL_CHANCE: f64 = 0.35;

/// What an enemy did with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyAction {
    pub target: Option<EntityId>,
    pub message: String,
    /// Damage to apply; 0 means a miss
    pub damage: i32,
    pub roll: Option<AttackRoll>,
    /// The turn was lost to a stun
    pub stunned: bool,
}

/// Hostile policy: attack the living party member with the lowest HP.
///
/// Ties go to the first member in party order. A stunned enemy does nothing
/// and no dice are rolled.
pub fn enemy_ai_action(
    combat: &CombatState,
    arena: &EntityArena,
    actor: EntityId,
    rng: &mut GameRng,
) -> EnemyAction {
    if combat.is_stunned(actor) {
        return EnemyAction {
            target: None,
            message: "is stunned!".to_string(),
            damage: 0,
            roll: None,
            stunned: true,
        };
    }

    let weakest = combat
        .living_party(arena)
        .into_iter()
        .filter_map(|id| arena.get(id).map(|e| (id, e)))
        .min_by_key(|(_, e)| e.hp());
    let (Some((target, target_entity)), Some(attacker)) = (weakest, arena.get(actor)) else {
        return EnemyAction {
            target: None,
            message: "has no targets".to_string(),
            damage: 0,
            roll: None,
            stunned: false,
        };
    };

    let armor = combat.effective_armor(arena, target);
    let roll = roll_attack(attacker, combat.attack_buff(actor), armor, rng);
    let damage = roll.damage();
    let message = match roll.result {
        crate::AttackResult::Critical { damage } => {
            format!("CRITICAL HIT on {}! {} damage!", target_entity.name(), damage)
        }
        crate::AttackResult::Hit { damage } => {
            format!("hits {} for {} damage!", target_entity.name(), damage)
        }
        _ => format!("misses {}!", target_entity.name()),
    };
    EnemyAction {
        target: Some(target),
        message,
        damage,
        roll: Some(roll),
        stunned: false,
    }
}

/// A companion's choice for its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionDecision {
    /// Cast the healing skill in slot `index` on `target`
    Heal { index: usize, target: EntityId },
    /// Cast an offensive skill in slot `index` at `target`
    Skill { index: usize, target: EntityId },
    Attack { target: EntityId },
    /// Nothing to do; the turn still passes
    Idle,
}

/// Friendly policy, evaluated in priority order every turn:
///
/// 1. A healer with MP for its single-target heal mends the most hurt ally
///    below half HP.
/// 2. With [`COMPANION_SKILL_CHANCE`], an affordable offensive skill is cast
///    at a random living enemy.
/// 3. Otherwise a basic attack on a random living enemy.
pub fn companion_decision(
    combat: &CombatState,
    arena: &EntityArena,
    actor: EntityId,
    rng: &mut GameRng,
) -> CompanionDecision {
    let Some(companion) = arena.get(actor) else {
        return CompanionDecision::Idle;
    };
    let mp = companion.mp();

    if companion.role().class().is_some_and(|c| c.is_healer()) {
        let heal = companion.skills().iter().position(|kind| {
            let skill = kind.skill();
            matches!(skill.effect, SkillEffect::Heal { .. })
                && skill.target == TargetKind::SingleAlly
                && skill.cost <= mp
        });
        if let Some(index) = heal {
            let most_hurt = combat
                .living_party(arena)
                .into_iter()
                .filter_map(|id| arena.get(id).map(|e| (id, e.hp(), e.max_hp())))
                .filter(|&(_, hp, max)| hp * 2 < max)
                .reduce(|best, next| {
                    // Compare hp/max ratios without floats
                    if next.1 * best.2 < best.1 * next.2 {
                        next
                    } else {
                        best
                    }
                });
            if let Some((target, _, _)) = most_hurt {
                return CompanionDecision::Heal { index, target };
            }
        }
    }

    let enemies = combat.living_enemies(arena);
    if enemies.is_empty() {
        return CompanionDecision::Idle;
    }

    let offensive: Vec<usize> = companion
        .skills()
        .iter()
        .enumerate()
        .filter(|(_, kind)| {
            let skill = kind.skill();
            skill.is_offensive() && skill.cost <= mp
        })
        .map(|(index, _)| index)
        .collect();
    if !offensive.is_empty() && rng.chance(COMPANION_SKILL_CHANCE) {
        if let (Some(&index), Some(&target)) = (rng.choose(&offensive), rng.choose(&enemies)) {
            return CompanionDecision::Skill { index, target };
        }
    }

    match rng.choose(&enemies) {
        Some(&target) => CompanionDecision::Attack { target },
        None => CompanionDecision::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AbilityScores, ClassKind, EnemyKind, Entity, Personality};

    struct Fixture {
        arena: EntityArena,
        hero: EntityId,
        cleric: EntityId,
        goblin: EntityId,
        combat: CombatState,
    }

    fn fixture(seed: u64) -> Fixture {
        let mut arena = EntityArena::new();
        let hero = arena.push(Entity::hero_with(
            ClassKind::Warrior,
            "Hero",
            AbilityScores::new(16, 12, 14, 10, 10, 10),
        ));
        let cleric = arena.push(Entity::companion_with(
            ClassKind::Cleric,
            Personality::Wise,
            "Grace",
            AbilityScores::new(10, 10, 12, 10, 16, 10),
        ));
        let goblin = arena.push(Entity::enemy_with(
            EnemyKind::Goblin,
            1,
            AbilityScores::default(),
        ));
        let mut rng = GameRng::new(seed);
        let combat = CombatState::new(&arena, vec![hero, cleric], vec![goblin], &mut rng);
        Fixture {
            arena,
            hero,
            cleric,
            goblin,
            combat,
        }
    }

    #[test]
    fn test_enemy_targets_lowest_hp() {
        let mut f = fixture(1);
        // Cleric has 9 HP, hero 12; wound the hero below the cleric
        f.arena.get_mut(f.hero).unwrap().take_damage(5);
        let mut rng = GameRng::new(2);
        for _ in 0..50 {
            let action = enemy_ai_action(&f.combat, &f.arena, f.goblin, &mut rng);
            assert_eq!(action.target, Some(f.hero));
            assert!(!action.stunned);
            assert_eq!(action.damage, action.roll.unwrap().damage());
        }
    }

    #[test]
    fn test_enemy_without_targets_does_nothing() {
        let mut f = fixture(1);
        f.arena.get_mut(f.hero).unwrap().take_damage(100);
        f.arena.get_mut(f.cleric).unwrap().take_damage(100);
        let mut rng = GameRng::new(2);
        let action = enemy_ai_action(&f.combat, &f.arena, f.goblin, &mut rng);
        assert_eq!(action.target, None);
        assert_eq!(action.damage, 0);
        assert!(action.roll.is_none());
    }

    #[test]
    fn test_healer_heals_most_hurt_ally() {
        let mut f = fixture(3);
        // Hero at 5/12, cleric at 2/9; the cleric is proportionally worse
        f.arena.get_mut(f.hero).unwrap().take_damage(7);
        f.arena.get_mut(f.cleric).unwrap().take_damage(7);
        let mut rng = GameRng::new(4);
        let decision = companion_decision(&f.combat, &f.arena, f.cleric, &mut rng);
        assert_eq!(
            decision,
            CompanionDecision::Heal {
                index: 0,
                target: f.cleric
            }
        );
    }

    #[test]
    fn test_healthy_party_is_not_healed() {
        let f = fixture(5);
        let mut rng = GameRng::new(6);
        for _ in 0..100 {
            match companion_decision(&f.combat, &f.arena, f.cleric, &mut rng) {
                CompanionDecision::Attack { target } => assert_eq!(target, f.goblin),
                CompanionDecision::Skill { index, target } => {
                    assert_eq!(target, f.goblin);
                    // Smite is the cleric's only offensive skill
                    assert_eq!(index, 1);
                }
                other => panic!("unexpected decision {:?}", other),
            }
        }
    }

    #[test]
    fn test_rogue_companion_never_steals() {
        let mut f = fixture(11);
        let rogue = f.arena.push(Entity::companion_with(
            ClassKind::Rogue,
            Personality::Witty,
            "Vex",
            AbilityScores::new(10, 16, 12, 10, 10, 10),
        ));
        assert_eq!(f.arena.get(rogue).unwrap().mp(), 10);
        let mut rng = GameRng::new(12);
        let mut backstabs = 0;
        for _ in 0..200 {
            match companion_decision(&f.combat, &f.arena, rogue, &mut rng) {
                CompanionDecision::Attack { target } => assert_eq!(target, f.goblin),
                CompanionDecision::Skill { index, target } => {
                    assert_eq!(target, f.goblin);
                    // Backstab is the rogue's only damaging skill
                    assert_eq!(index, 0);
                    backstabs += 1;
                }
                other => panic!("unexpected decision {:?}", other),
            }
        }
        assert!(backstabs > 0);
    }

    #[test]
    fn test_offensive_skill_rate() {
        let f = fixture(7);
        let mut rng = GameRng::new(8);
        let casts = (0..2000)
            .filter(|_| {
                matches!(
                    companion_decision(&f.combat, &f.arena, f.cleric, &mut rng),
                    CompanionDecision::Skill { .. }
                )
            })
            .count();
        assert!((550..=850).contains(&casts), "cast {} times", casts);
    }

    #[test]
    fn test_companion_idles_without_enemies() {
        let mut f = fixture(9);
        f.arena.get_mut(f.goblin).unwrap().take_damage(100);
        let mut rng = GameRng::new(10);
        assert_eq!(
            companion_decision(&f.combat, &f.arena, f.cleric, &mut rng),
            CompanionDecision::Idle
        );
    }
}
