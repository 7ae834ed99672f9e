//! # Autopilot Module
//!
//! Plays the hero automatically: walks toward unexplored ground and then the
//! stairs, and picks a combat action whenever the hero is up. Headless runs
//! and the integration tests drive whole sessions through it.

use crate::{
    path_to, CairnResult, CombatState, Direction, EntityArena, EntityId, GameEvent, GameState,
    ItemKind, Mode, PlayerAction, Position, SkillEffect, TargetKind, Tile,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Next thing the autopilot wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotAction {
    /// Step while exploring
    Move(Direction),
    /// Act on the hero's combat turn
    Combat(PlayerAction),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Actions the autopilot took
    pub steps: u64,
    /// Floor the party stood on when the run stopped
    pub floor: u32,
    /// Session mode when the run stopped
    pub mode: Mode,
    pub gold: u32,
    pub hero_level: u32,
}

/// Automatic hero driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Autopilot {
    /// Explore each floor before heading for the stairs
    pub explore: bool,
    /// Drink a potion or self-heal below this fraction of max HP
    pub heal_below: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            explore: true,
            heal_below: 0.4,
        }
    }
}

impl Autopilot {
    /// Creates an autopilot that explores before descending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an autopilot that heads straight for the stairs.
    pub fn diving() -> Self {
        Self {
            explore: false,
            ..Self::default()
        }
    }

    /// Decides the next action, or `None` when there is nothing to do.
    pub fn next_action(&self, game: &GameState) -> Option<AutopilotAction> {
        match game.mode() {
            Mode::Exploring => self.next_move(game).map(AutopilotAction::Move),
            Mode::Combat => self.combat_action(game).map(AutopilotAction::Combat),
            Mode::GameOver => None,
        }
    }

    /// Takes one action.
    pub fn step(&self, game: &mut GameState) -> CairnResult<Option<Vec<GameEvent>>> {
        let events = match self.next_action(game) {
            Some(AutopilotAction::Move(direction)) => game.try_move(direction)?,
            Some(AutopilotAction::Combat(action)) => game.submit_player_action(action)?,
            None => return Ok(None),
        };
        Ok(Some(events))
    }

    /// Plays until the party dies, passes `max_floor`, gets stuck, or
    /// `max_steps` actions have been taken.
    pub fn run(
        &self,
        game: &mut GameState,
        max_steps: u64,
        max_floor: u32,
    ) -> CairnResult<RunSummary> {
        let mut steps = 0;
        while steps < max_steps && game.floor <= max_floor {
            if self.step(game)?.is_none() {
                debug!("autopilot has nothing to do on floor {}", game.floor);
                break;
            }
            steps += 1;
        }

        let summary = RunSummary {
            steps,
            floor: game.floor,
            mode: game.mode(),
            gold: game.gold,
            hero_level: game.hero().map_or(1, |hero| hero.level()),
        };
        info!(
            "autopilot stopped after {} steps on floor {} ({:?})",
            summary.steps, summary.floor, summary.mode
        );
        Ok(summary)
    }

    fn next_move(&self, game: &GameState) -> Option<Direction> {
        let dungeon = game.dungeon();
        let start = game.hero()?.position();
        let safe = |pos: Position| {
            dungeon.is_passable(pos)
                && !matches!(
                    dungeon.tile(pos),
                    Some(Tile::Trap { revealed: true }) | Some(Tile::Lava)
                )
        };
        let unexplored = |pos: Position| pos != start && !dungeon.is_explored(pos.x, pos.y);
        let chest = |pos: Position| dungeon.tile(pos) == Some(Tile::Chest);
        let stairs = |pos: Position| pos == dungeon.stairs;

        let path = if self.explore {
            path_to(start, safe, |pos| chest(pos) || unexplored(pos))
        } else {
            None
        }
        .or_else(|| path_to(start, safe, stairs))
        .or_else(|| path_to(start, |pos| dungeon.is_passable(pos), stairs))?;

        let next = *path.get(1)?;
        Direction::from_delta(next - start)
    }

    /// Chooses the hero's combat action.
    ///
    /// A wounded hero drinks a health potion or casts a heal. Otherwise the
    /// costliest affordable offensive skill goes at the weakest enemy, and a
    /// basic attack when nothing is affordable.
    pub fn combat_action(&self, game: &GameState) -> Option<PlayerAction> {
        self.choose_combat_action(game.combat()?, game.entities(), game.hero_id())
    }

    /// Same choice as [`Autopilot::combat_action`], made directly against an
    /// encounter and its arena.
    pub fn choose_combat_action(
        &self,
        combat: &CombatState,
        arena: &EntityArena,
        hero_id: EntityId,
    ) -> Option<PlayerAction> {
        if combat.current_actor() != Some(hero_id) {
            return None;
        }
        let hero = arena.get(hero_id)?;

        if (hero.hp() as f64) < hero.max_hp() as f64 * self.heal_below {
            if let Some(index) = hero
                .inventory()
                .iter()
                .position(|&item| item == ItemKind::HealthPotion)
            {
                return Some(PlayerAction::UseItem {
                    index,
                    target: None,
                });
            }
            let heal = hero.skills().iter().position(|kind| {
                let skill = kind.skill();
                matches!(skill.effect, SkillEffect::Heal { .. }) && skill.cost <= hero.mp()
            });
            if let Some(index) = heal {
                let target = match hero.skills()[index].skill().target {
                    TargetKind::SingleAlly => Some(hero_id),
                    _ => None,
                };
                return Some(PlayerAction::Skill { index, target });
            }
        }

        let weakest = combat
            .living_enemies(arena)
            .into_iter()
            .filter_map(|id| arena.get(id).map(|e| (id, e.hp())))
            .min_by_key(|&(_, hp)| hp)
            .map(|(id, _)| id)?;

        let strongest = hero
            .skills()
            .iter()
            .enumerate()
            .filter(|(_, kind)| {
                let skill = kind.skill();
                skill.is_offensive() && skill.cost <= hero.mp()
            })
            .max_by_key(|(index, kind)| (kind.skill().cost, std::cmp::Reverse(*index)));
        match strongest {
            Some((index, kind)) => {
                let target = kind.skill().target.needs_target().then_some(weakest);
                Some(PlayerAction::Skill { index, target })
            }
            None => Some(PlayerAction::Attack { target: weakest }),
        }
    }
}
