//! # Combat Engine
//!
//! Turn-based encounter resolution.
//!
//! A [`CombatState`] holds only ids into the session's [`EntityArena`]; every
//! operation borrows the arena for the duration of one call. Attacks go
//! through [`roll_attack`] and [`CombatState::apply_attack`] whoever issues
//! them, and skills go through a single resolver, so the player and the AI
//! share all damage math.

use crate::game::ai::{self, CompanionDecision};
use crate::generation::{generate_loot, Consumable, ItemKind};
use crate::utils::roll_formula;
use crate::{
    ChatSituation, Entity, EntityArena, EntityId, GameRng, InsufficientResource, Role, SkillEffect,
    SkillKind, TargetKind,
};
use log::debug;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Armor bonus granted by defending.
pub const DEFEND_ARMOR_BONUS: i32 = 2;

/// Whose move it is, or how the encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PlayerTurn,
    CompanionTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl Phase {
    /// Whether the encounter has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

/// An action chosen by the player on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Basic attack against an enemy
    Attack { target: EntityId },
    /// Cast the skill in slot `index`
    Skill {
        index: usize,
        target: Option<EntityId>,
    },
    /// Raise armor until the hero's next turn
    Defend,
    /// Use the consumable in inventory slot `index`
    UseItem {
        index: usize,
        target: Option<EntityId>,
    },
}

/// Reasons an action is refused. A refused action changes nothing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalAction {
    #[error("it is not the player's turn")]
    WrongPhase,

    #[error("no encounter is in progress")]
    NotInCombat,

    #[error("only possible while exploring")]
    NotExploring,

    #[error("no skill in slot {index}")]
    UnknownSkill { index: usize },

    #[error("not enough MP: {needed} needed, {available} available")]
    InsufficientResource { needed: i32, available: i32 },

    #[error("target is already dead")]
    DeadTarget,

    #[error("target is not valid for this action")]
    InvalidTarget,

    #[error("this action needs a target")]
    MissingTarget,

    #[error("no item in inventory slot {index}")]
    NoSuchItem { index: usize },

    #[error("that item cannot be used in combat")]
    NotUsableInCombat,

    #[error("that item only works in combat")]
    CombatOnly,

    #[error("that item cannot be equipped")]
    NotEquippable,

    #[error("the way is blocked")]
    Blocked,
}

impl From<InsufficientResource> for IllegalAction {
    fn from(err: InsufficientResource) -> Self {
        IllegalAction::InsufficientResource {
            needed: err.needed,
            available: err.available,
        }
    }
}

/// Outcome of one to-hit roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackResult {
    /// Natural 20: always hits, damage doubled
    Critical { damage: i32 },
    Hit { damage: i32 },
    /// Natural 1: always misses
    Fumble,
    Miss,
}

/// A to-hit roll with its numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    /// The d20 face
    pub natural: u32,
    /// d20 plus all bonuses
    pub total: i32,
    /// Armor class rolled against
    pub armor_class: i32,
    pub result: AttackResult,
}

impl AttackRoll {
    /// Damage dealt, 0 on a miss.
    pub fn damage(&self) -> i32 {
        match self.result {
            AttackResult::Critical { damage } | AttackResult::Hit { damage } => damage,
            AttackResult::Fumble | AttackResult::Miss => 0,
        }
    }

    /// Whether the attack dealt damage.
    pub fn is_hit(&self) -> bool {
        self.damage() > 0
    }
}

/// Rolls `d20 + attack bonus + extra_bonus` against `target_ac`.
///
/// The natural face is checked before the total: 20 always crits, 1 always
/// misses.
pub fn roll_attack(
    attacker: &Entity,
    extra_bonus: i32,
    target_ac: i32,
    rng: &mut GameRng,
) -> AttackRoll {
    let natural = rng.d20();
    let total = natural as i32 + attacker.attack_bonus() + extra_bonus;
    let result = if natural == 20 {
        AttackResult::Critical {
            damage: attacker.damage_roll(rng) * 2,
        }
    } else if natural == 1 {
        AttackResult::Fumble
    } else if total >= target_ac {
        AttackResult::Hit {
            damage: attacker.damage_roll(rng),
        }
    } else {
        AttackResult::Miss
    };
    AttackRoll {
        natural,
        total,
        armor_class: target_ac,
        result,
    }
}

/// One resolved step of an encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    Initiative {
        entity: EntityId,
        roll: i32,
    },
    RoundStarted {
        round: u32,
    },
    Attack {
        attacker: EntityId,
        target: EntityId,
        roll: AttackRoll,
    },
    Skill {
        caster: EntityId,
        skill: SkillKind,
        targets: Vec<EntityId>,
        amount: i32,
    },
    Defended {
        entity: EntityId,
    },
    ItemUsed {
        user: EntityId,
        item: ItemKind,
        target: EntityId,
        amount: i32,
    },
    Stunned {
        entity: EntityId,
    },
    /// An actor had nothing to do
    Idle {
        entity: EntityId,
    },
    Defeated {
        entity: EntityId,
    },
    Chatter {
        speaker: EntityId,
        line: &'static str,
    },
    Victory,
    Defeat,
}

impl CombatEvent {
    /// Human-readable log line.
    pub fn describe(&self, arena: &EntityArena) -> String {
        let name = |id: &EntityId| {
            arena
                .get(*id)
                .map_or_else(|| id.to_string(), |e| e.name().to_string())
        };
        match self {
            CombatEvent::Initiative { entity, roll } => {
                format!("{} rolls {} for initiative", name(entity), roll)
            }
            CombatEvent::RoundStarted { round } => format!("=== Round {} ===", round),
            CombatEvent::Attack {
                attacker,
                target,
                roll,
            } => match roll.result {
                AttackResult::Critical { damage } => format!(
                    "CRITICAL HIT! {} strikes {} for {}!",
                    name(attacker),
                    name(target),
                    damage
                ),
                AttackResult::Hit { damage } => format!(
                    "{} hits {} for {} (d20 {} = {} vs AC {})",
                    name(attacker),
                    name(target),
                    damage,
                    roll.natural,
                    roll.total,
                    roll.armor_class
                ),
                AttackResult::Fumble => format!("{} fumbles!", name(attacker)),
                AttackResult::Miss => format!(
                    "{} misses {} (d20 {} = {} vs AC {})",
                    name(attacker),
                    name(target),
                    roll.natural,
                    roll.total,
                    roll.armor_class
                ),
            },
            CombatEvent::Skill {
                caster,
                skill,
                targets,
                amount,
            } => {
                let skill = skill.skill();
                let mut line = format!("{} {}!", name(caster), skill.announce);
                let who = match skill.target {
                    TargetKind::AllAllies => "The party".to_string(),
                    TargetKind::AllEnemies => "Every foe".to_string(),
                    _ => targets.first().map_or_else(String::new, name),
                };
                let effect = match skill.effect {
                    SkillEffect::Damage => format!(" {} takes {} damage.", who, amount),
                    SkillEffect::DamageAndStun { .. } => {
                        format!(" {} takes {} damage and is stunned.", who, amount)
                    }
                    SkillEffect::Heal { .. } => format!(" {} heals {} HP.", who, amount),
                    SkillEffect::ArmorBuff(bonus) => format!(" {} gains +{} AC.", who, bonus),
                    SkillEffect::AttackBuff(bonus) => format!(" {} gains +{} to hit.", who, bonus),
                    SkillEffect::Gold => format!(" Stole {} gold.", amount),
                };
                line.push_str(&effect);
                line
            }
            CombatEvent::Defended { entity } => format!("{} takes a defensive stance", name(entity)),
            CombatEvent::ItemUsed {
                user,
                item,
                target,
                amount,
            } => match item.consumable() {
                Some(Consumable::Heal { .. }) => format!(
                    "{} uses {}: {} heals {} HP",
                    name(user),
                    item,
                    name(target),
                    amount
                ),
                Some(Consumable::RestoreMana { .. }) => format!(
                    "{} uses {}: {} restores {} MP",
                    name(user),
                    item,
                    name(target),
                    amount
                ),
                _ => format!(
                    "{} uses {}: {} takes {} damage",
                    name(user),
                    item,
                    name(target),
                    amount
                ),
            },
            CombatEvent::Stunned { entity } => format!("{} is stunned!", name(entity)),
            CombatEvent::Idle { entity } => format!("{} has nothing to do", name(entity)),
            CombatEvent::Defeated { entity } => format!("{} has been defeated!", name(entity)),
            CombatEvent::Chatter { speaker, line } => format!("{}: \"{}\"", name(speaker), line),
            CombatEvent::Victory => "Victory!".to_string(),
            CombatEvent::Defeat => "The party has fallen...".to_string(),
        }
    }
}

/// Per-combatant modifiers that last for the encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buffs {
    /// Armor from shields and smoke
    pub armor: i32,
    /// To-hit bonus from blessings
    pub attack: i32,
    /// Defending until the next own turn
    pub guarding: bool,
    /// Turns left to skip
    pub stunned: u32,
}

/// Spoils of a won encounter, computed from its terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatRewards {
    /// Sum of every defeated enemy's XP reward
    pub xp_total: u32,
    /// Share for each surviving party member
    pub xp_each: u32,
    /// Dropped gold plus anything stolen
    pub gold: u32,
    pub items: Vec<ItemKind>,
}

/// State of one encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatState {
    party: Vec<EntityId>,
    enemies: Vec<EntityId>,
    turn_order: Vec<EntityId>,
    current_turn: usize,
    round: u32,
    phase: Phase,
    log: Vec<CombatEvent>,
    buffs: BTreeMap<EntityId, Buffs>,
    stolen_gold: u32,
}

impl CombatState {
    /// Rolls initiative and moves to the first living actor.
    ///
    /// Initiative is `d20 + DEX modifier`, sorted descending; ties go to the
    /// higher DEX modifier, then to encounter order (party first).
    ///
    /// # Panics
    ///
    /// Panics if either side has no living member. Starting a fight with an
    /// empty side is a caller bug.
    pub fn new(
        arena: &EntityArena,
        party: Vec<EntityId>,
        enemies: Vec<EntityId>,
        rng: &mut GameRng,
    ) -> Self {
        assert!(
            party.iter().any(|&id| arena.is_alive(id)),
            "combat needs a living party member"
        );
        assert!(
            enemies.iter().any(|&id| arena.is_alive(id)),
            "combat needs a living enemy"
        );

        let mut rolls: Vec<(EntityId, i32, i32)> = party
            .iter()
            .chain(enemies.iter())
            .filter_map(|&id| arena.get(id).filter(|e| e.is_alive()).map(|e| (id, e)))
            .map(|(id, entity)| {
                let dex = entity.stats().modifier(crate::Ability::Dexterity) as i32;
                (id, rng.d20() as i32 + dex, dex)
            })
            .collect();
        rolls.sort_by_key(|&(_, initiative, dex)| (Reverse(initiative), Reverse(dex)));

        let mut combat = Self {
            party,
            enemies,
            turn_order: rolls.iter().map(|&(id, _, _)| id).collect(),
            current_turn: 0,
            round: 1,
            phase: Phase::PlayerTurn,
            log: rolls
                .iter()
                .map(|&(entity, roll, _)| CombatEvent::Initiative { entity, roll })
                .collect(),
            buffs: BTreeMap::new(),
            stolen_gold: 0,
        };
        combat.advance_to_next_alive(arena);
        combat
    }

    /// Party members in the encounter, living or not.
    pub fn party(&self) -> &[EntityId] {
        &self.party
    }

    /// Enemies in the encounter, living or not.
    pub fn enemies(&self) -> &[EntityId] {
        &self.enemies
    }

    /// Participants sorted by initiative.
    pub fn turn_order(&self) -> &[EntityId] {
        &self.turn_order
    }

    /// Index into [`CombatState::turn_order`] of the acting entity.
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    /// Current round, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Whose turn it is, or how the encounter ended.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every event since the encounter began, oldest first.
    pub fn log(&self) -> &[CombatEvent] {
        &self.log
    }

    /// Gold stolen so far this encounter.
    pub fn stolen_gold(&self) -> u32 {
        self.stolen_gold
    }

    /// The entity whose turn it is, unless the encounter is over.
    pub fn current_actor(&self) -> Option<EntityId> {
        if self.phase.is_terminal() {
            return None;
        }
        self.turn_order.get(self.current_turn).copied()
    }

    /// Whether victory or defeat has been reached.
    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Party members still standing.
    pub fn living_party(&self, arena: &EntityArena) -> Vec<EntityId> {
        living(&self.party, arena)
    }

    /// Enemies still standing.
    pub fn living_enemies(&self, arena: &EntityArena) -> Vec<EntityId> {
        living(&self.enemies, arena)
    }

    /// Encounter buffs on `id`, defaulting to none.
    pub fn buffs(&self, id: EntityId) -> Buffs {
        self.buffs.get(&id).copied().unwrap_or_default()
    }

    /// Armor class including encounter buffs and a defensive stance.
    pub fn effective_armor(&self, arena: &EntityArena, id: EntityId) -> i32 {
        let buffs = self.buffs(id);
        let base = arena.get(id).map_or(0, Entity::armor_class);
        base + buffs.armor + if buffs.guarding { DEFEND_ARMOR_BONUS } else { 0 }
    }

    /// Attack bonus granted by encounter buffs.
    pub fn attack_buff(&self, id: EntityId) -> i32 {
        self.buffs(id).attack
    }

    /// Whether `id` loses its next turn.
    pub fn is_stunned(&self, id: EntityId) -> bool {
        self.buffs(id).stunned > 0
    }

    pub(crate) fn push_event(&mut self, event: CombatEvent) {
        self.log.push(event);
    }

    fn is_party(&self, id: EntityId) -> bool {
        self.party.contains(&id)
    }

    fn is_enemy(&self, id: EntityId) -> bool {
        self.enemies.contains(&id)
    }

    /// Scans forward for the next living actor and sets the phase from its
    /// role. Bounded to two passes over the turn order.
    fn advance_to_next_alive(&mut self, arena: &EntityArena) {
        let len = self.turn_order.len();
        for _ in 0..len * 2 {
            if self.current_turn >= len {
                self.current_turn = 0;
                self.round += 1;
                self.log.push(CombatEvent::RoundStarted { round: self.round });
            }
            let id = self.turn_order[self.current_turn];
            if let Some(entity) = arena.get(id).filter(|e| e.is_alive()) {
                self.phase = match entity.role() {
                    Role::Hero { .. } => Phase::PlayerTurn,
                    Role::Companion { .. } => Phase::CompanionTurn,
                    Role::Enemy { .. } => Phase::EnemyTurn,
                };
                if let Some(buffs) = self.buffs.get_mut(&id) {
                    buffs.guarding = false;
                }
                return;
            }
            self.current_turn += 1;
        }
    }

    /// Ends the current turn.
    ///
    /// Victory and defeat are checked before looking for the next actor.
    pub fn next_turn(&mut self, arena: &EntityArena) {
        if self.phase.is_terminal() {
            return;
        }
        self.current_turn += 1;
        if self.living_enemies(arena).is_empty() {
            self.phase = Phase::Victory;
            self.log.push(CombatEvent::Victory);
            return;
        }
        if self.living_party(arena).is_empty() {
            self.phase = Phase::Defeat;
            self.log.push(CombatEvent::Defeat);
            return;
        }
        self.advance_to_next_alive(arena);
    }

    /// Applies a rolled attack to its target and logs it.
    pub(crate) fn apply_attack(
        &mut self,
        arena: &mut EntityArena,
        attacker: EntityId,
        target: EntityId,
        roll: AttackRoll,
    ) {
        debug!(
            "{} attacks {}: d20 {} total {} vs AC {}",
            attacker, target, roll.natural, roll.total, roll.armor_class
        );
        self.log.push(CombatEvent::Attack {
            attacker,
            target,
            roll,
        });
        self.damage(arena, target, roll.damage());
    }

    /// Rolls and applies a basic attack.
    pub fn do_attack(
        &mut self,
        arena: &mut EntityArena,
        attacker: EntityId,
        target: EntityId,
        rng: &mut GameRng,
    ) -> Option<AttackRoll> {
        let armor = self.effective_armor(arena, target);
        let bonus = self.attack_buff(attacker);
        let roll = roll_attack(arena.get(attacker)?, bonus, armor, rng);
        self.apply_attack(arena, attacker, target, roll);
        Some(roll)
    }

    fn damage(&mut self, arena: &mut EntityArena, target: EntityId, amount: i32) -> i32 {
        let Some(entity) = arena.get_mut(target) else {
            return 0;
        };
        let was_alive = entity.is_alive();
        let taken = entity.take_damage(amount);
        if was_alive && !entity.is_alive() {
            self.log.push(CombatEvent::Defeated { entity: target });
        }
        taken
    }

    fn require_living_enemy(
        &self,
        arena: &EntityArena,
        target: Option<EntityId>,
    ) -> Result<EntityId, IllegalAction> {
        let target = target.ok_or(IllegalAction::MissingTarget)?;
        if !self.is_enemy(target) {
            return Err(IllegalAction::InvalidTarget);
        }
        if !arena.is_alive(target) {
            return Err(IllegalAction::DeadTarget);
        }
        Ok(target)
    }

    fn require_living_ally(
        &self,
        arena: &EntityArena,
        target: EntityId,
    ) -> Result<EntityId, IllegalAction> {
        if !self.is_party(target) {
            return Err(IllegalAction::InvalidTarget);
        }
        if !arena.is_alive(target) {
            return Err(IllegalAction::DeadTarget);
        }
        Ok(target)
    }

    /// Validates and casts the skill in `caster`'s slot `index`.
    ///
    /// Every check runs before anything is spent, so an `Err` leaves both the
    /// arena and the encounter untouched.
    pub fn resolve_skill(
        &mut self,
        arena: &mut EntityArena,
        caster: EntityId,
        index: usize,
        target: Option<EntityId>,
        rng: &mut GameRng,
    ) -> Result<(), IllegalAction> {
        let entity = arena.get(caster).ok_or(IllegalAction::InvalidTarget)?;
        let kind = entity
            .skill(index)
            .ok_or(IllegalAction::UnknownSkill { index })?;
        let skill = kind.skill();
        if entity.mp() < skill.cost {
            return Err(IllegalAction::InsufficientResource {
                needed: skill.cost,
                available: entity.mp(),
            });
        }

        let targets = match skill.target {
            TargetKind::SelfOnly => vec![caster],
            TargetKind::SingleAlly => {
                vec![self.require_living_ally(arena, target.unwrap_or(caster))?]
            }
            TargetKind::SingleEnemy => vec![self.require_living_enemy(arena, target)?],
            TargetKind::AllAllies => self.living_party(arena),
            TargetKind::AllEnemies => self.living_enemies(arena),
        };

        let outcome = arena
            .get_mut(caster)
            .ok_or(IllegalAction::InvalidTarget)?
            .use_skill(skill, rng)?;
        debug!("{} (amount {})", outcome.message, outcome.amount);
        self.log.push(CombatEvent::Skill {
            caster,
            skill: kind,
            targets: targets.clone(),
            amount: outcome.amount,
        });

        for &id in &targets {
            match skill.effect {
                SkillEffect::Damage => {
                    self.damage(arena, id, outcome.amount);
                }
                SkillEffect::DamageAndStun { turns } => {
                    self.damage(arena, id, outcome.amount);
                    if arena.is_alive(id) {
                        self.buffs.entry(id).or_default().stunned += turns;
                    }
                }
                SkillEffect::Heal { .. } => {
                    if let Some(ally) = arena.get_mut(id) {
                        ally.heal(outcome.amount);
                    }
                }
                SkillEffect::ArmorBuff(bonus) => self.buffs.entry(id).or_default().armor += bonus,
                SkillEffect::AttackBuff(bonus) => {
                    self.buffs.entry(id).or_default().attack += bonus
                }
                SkillEffect::Gold => self.stolen_gold += outcome.amount.max(0) as u32,
            }
        }
        Ok(())
    }

    /// Uses a consumable from `user`'s inventory.
    fn use_item(
        &mut self,
        arena: &mut EntityArena,
        user: EntityId,
        index: usize,
        target: Option<EntityId>,
        rng: &mut GameRng,
    ) -> Result<(), IllegalAction> {
        let item = arena
            .get(user)
            .and_then(|e| e.inventory().get(index).copied())
            .ok_or(IllegalAction::NoSuchItem { index })?;
        let consumable = item.consumable().ok_or(IllegalAction::NotUsableInCombat)?;
        let target = match consumable {
            Consumable::Heal { .. } | Consumable::RestoreMana { .. } => {
                self.require_living_ally(arena, target.unwrap_or(user))?
            }
            Consumable::Fireball { .. } => self.require_living_enemy(arena, target)?,
        };

        if let Some(entity) = arena.get_mut(user) {
            entity.take_item(index);
        }
        let amount = match consumable {
            Consumable::Heal { formula } => {
                let rolled = roll_formula(formula, rng);
                arena.get_mut(target).map_or(0, |e| e.heal(rolled))
            }
            Consumable::RestoreMana { formula } => {
                let rolled = roll_formula(formula, rng);
                arena.get_mut(target).map_or(0, |e| e.restore_mp(rolled))
            }
            Consumable::Fireball { formula } => roll_formula(formula, rng),
        };
        self.log.push(CombatEvent::ItemUsed {
            user,
            item,
            target,
            amount,
        });
        if let Consumable::Fireball { .. } = consumable {
            self.damage(arena, target, amount);
        }
        Ok(())
    }

    /// Applies the player's action and ends their turn.
    ///
    /// Rejected actions return an error and leave the turn with the player.
    pub fn submit_player_action(
        &mut self,
        arena: &mut EntityArena,
        action: PlayerAction,
        rng: &mut GameRng,
    ) -> Result<(), IllegalAction> {
        if self.phase != Phase::PlayerTurn {
            return Err(IllegalAction::WrongPhase);
        }
        let actor = self.current_actor().ok_or(IllegalAction::WrongPhase)?;

        match action {
            PlayerAction::Attack { target } => {
                let target = self.require_living_enemy(arena, Some(target))?;
                self.do_attack(arena, actor, target, rng);
            }
            PlayerAction::Skill { index, target } => {
                self.resolve_skill(arena, actor, index, target, rng)?;
            }
            PlayerAction::Defend => {
                self.buffs.entry(actor).or_default().guarding = true;
                self.log.push(CombatEvent::Defended { entity: actor });
            }
            PlayerAction::UseItem { index, target } => {
                self.use_item(arena, actor, index, target, rng)?;
            }
        }
        self.next_turn(arena);
        Ok(())
    }

    /// Plays the current companion or enemy turn.
    pub fn run_ai_turn(
        &mut self,
        arena: &mut EntityArena,
        rng: &mut GameRng,
    ) -> Result<(), IllegalAction> {
        let actor = self.current_actor().ok_or(IllegalAction::WrongPhase)?;
        match self.phase {
            Phase::EnemyTurn => self.run_enemy_turn(arena, actor, rng),
            Phase::CompanionTurn => self.run_companion_turn(arena, actor, rng),
            _ => return Err(IllegalAction::WrongPhase),
        }
        self.next_turn(arena);
        Ok(())
    }

    fn run_enemy_turn(&mut self, arena: &mut EntityArena, actor: EntityId, rng: &mut GameRng) {
        let action = ai::enemy_ai_action(self, arena, actor, rng);
        if action.stunned {
            if let Some(buffs) = self.buffs.get_mut(&actor) {
                buffs.stunned = buffs.stunned.saturating_sub(1);
            }
            self.log.push(CombatEvent::Stunned { entity: actor });
            return;
        }
        let (Some(target), Some(roll)) = (action.target, action.roll) else {
            self.log.push(CombatEvent::Idle { entity: actor });
            return;
        };
        debug!("{} {}", actor, action.message);
        self.apply_attack(arena, actor, target, roll);

        if !arena.is_alive(target) {
            for companion in self.living_party(arena) {
                if rng.chance(0.5) {
                    self.chatter(arena, companion, ChatSituation::LowHp, rng);
                }
            }
        }
    }

    fn run_companion_turn(&mut self, arena: &mut EntityArena, actor: EntityId, rng: &mut GameRng) {
        match ai::companion_decision(self, arena, actor, rng) {
            CompanionDecision::Heal { index, target } => {
                match self.resolve_skill(arena, actor, index, Some(target), rng) {
                    Ok(()) => self.chatter(arena, actor, ChatSituation::Heal, rng),
                    Err(err) => {
                        debug!("{} could not heal: {}", actor, err);
                        self.log.push(CombatEvent::Idle { entity: actor });
                    }
                }
            }
            CompanionDecision::Skill { index, target } => {
                if let Err(err) = self.resolve_skill(arena, actor, index, Some(target), rng) {
                    debug!("{} could not cast: {}", actor, err);
                    self.log.push(CombatEvent::Idle { entity: actor });
                }
            }
            CompanionDecision::Attack { target } => {
                self.do_attack(arena, actor, target, rng);
                if rng.chance(0.25) {
                    self.chatter(arena, actor, ChatSituation::CombatStart, rng);
                }
            }
            CompanionDecision::Idle => self.log.push(CombatEvent::Idle { entity: actor }),
        }
    }

    /// Logs a line from a companion. Non-companions stay quiet.
    pub(crate) fn chatter(
        &mut self,
        arena: &EntityArena,
        speaker: EntityId,
        situation: ChatSituation,
        rng: &mut GameRng,
    ) {
        if let Some(personality) = arena.get(speaker).and_then(|e| e.role().personality()) {
            self.log.push(CombatEvent::Chatter {
                speaker,
                line: personality.line(situation, rng),
            });
        }
    }

    /// Computes the spoils of a won encounter, or `None` if it was not won.
    ///
    /// Loot rolls use `loot_level`, normally the hero's level.
    pub fn rewards(
        &self,
        arena: &EntityArena,
        loot_level: u32,
        rng: &mut GameRng,
    ) -> Option<CombatRewards> {
        if self.phase != Phase::Victory {
            return None;
        }
        let mut rewards = CombatRewards {
            gold: self.stolen_gold,
            ..CombatRewards::default()
        };
        for entity in self.enemies.iter().filter_map(|&id| arena.get(id)) {
            rewards.xp_total += entity.xp_reward();
            if let Some(kind) = entity.role().enemy_kind() {
                let (low, high) = kind.gold_range();
                rewards.gold += rng.range(low, high).max(0) as u32;
                rewards
                    .items
                    .extend(generate_loot(loot_level, kind.is_boss(), rng).items);
            }
        }
        let survivors = self.living_party(arena).len().max(1) as u32;
        rewards.xp_each = rewards.xp_total / survivors;
        Some(rewards)
    }
}

fn living(ids: &[EntityId], arena: &EntityArena) -> Vec<EntityId> {
    ids.iter().copied().filter(|&id| arena.is_alive(id)).collect()
}
