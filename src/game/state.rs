//! # Game State Module
//!
//! The session that owns a single run: dungeon, entity arena, random stream,
//! party resources and the active encounter.
//!
//! Every mutation of the world goes through [`GameState`], which hands
//! borrowed pieces of itself to the generator, the combat engine and the AI.
//! No other component keeps a reference between calls.

use crate::config::{COMPANION_COUNT, MAX_MESSAGES, STARTING_GOLD};
use crate::generation::{generate_loot, populate, Consumable, ItemKind, Loot};
use crate::utils::roll_formula;
use crate::{
    CairnError, CairnResult, ChatSituation, ClassKind, CombatEvent, CombatRewards, CombatState,
    Direction, Dungeon, DungeonGenerator, Entity, EntityArena, EntityId, GameRng,
    GenerationConfig, IllegalAction, Phase, PlayerAction, Position, Tile,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Steps between chances of exploration chatter.
const EXPLORE_CHAT_INTERVAL: u32 = 12;

/// Upper bound on AI turns resolved in one [`GameState::advance_combat`] call.
const MAX_AI_TURNS: usize = 10_000;

/// What the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Exploring,
    Combat,
    GameOver,
}

/// Something that happened during a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Moved {
        from: Position,
        to: Position,
    },
    TrapsSpotted {
        count: usize,
    },
    ChestOpened {
        position: Position,
        loot: Loot,
    },
    TrapTriggered {
        position: Position,
        damage: i32,
    },
    LavaBurn {
        damage: i32,
    },
    Descended {
        floor: u32,
    },
    EncounterStarted {
        enemies: Vec<EntityId>,
    },
    /// A step of the active encounter
    Combat(CombatEvent),
    CombatWon {
        defeated: usize,
        rewards: CombatRewards,
    },
    LevelUp {
        entity: EntityId,
        level: u32,
    },
    ItemUsed {
        item: ItemKind,
        target: EntityId,
        amount: i32,
    },
    Equipped {
        item: ItemKind,
        replaced: Option<ItemKind>,
    },
    Chatter {
        speaker: EntityId,
        line: &'static str,
    },
    GameOver,
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of enemies defeated
    pub enemies_defeated: u32,
    /// Number of encounters won
    pub encounters_won: u32,
    /// Number of items collected
    pub items_collected: u32,
    /// Chests opened
    pub chests_opened: u32,
    /// Traps stepped on
    pub traps_triggered: u32,
    /// Damage taken outside combat
    pub hazard_damage: u64,
    /// Gold picked up from chests and encounters
    pub gold_earned: u64,
    /// Deepest floor reached
    pub max_depth_reached: u32,
    /// Total steps taken
    pub steps_taken: u64,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Moved { .. } => {
                self.steps_taken += 1;
            }
            GameEvent::ChestOpened { loot, .. } => {
                self.chests_opened += 1;
                self.items_collected += loot.items.len() as u32;
                self.gold_earned += loot.gold as u64;
            }
            GameEvent::TrapTriggered { damage, .. } => {
                self.traps_triggered += 1;
                self.hazard_damage += (*damage).max(0) as u64;
            }
            GameEvent::LavaBurn { damage } => {
                self.hazard_damage += (*damage).max(0) as u64;
            }
            GameEvent::Descended { floor } => {
                self.max_depth_reached = self.max_depth_reached.max(*floor);
            }
            GameEvent::CombatWon { defeated, rewards } => {
                self.encounters_won += 1;
                self.enemies_defeated += *defeated as u32;
                self.items_collected += rewards.items.len() as u32;
                self.gold_earned += rewards.gold as u64;
            }
            _ => {}
        }
    }
}

/// A single run of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Generation settings used for every floor
    pub config: GenerationConfig,
    /// Current floor number, starting at 1
    pub floor: u32,
    /// Party gold
    pub gold: u32,
    /// Steps taken while exploring
    pub turn_number: u64,
    /// Game statistics for player progress
    pub statistics: GameStatistics,
    dungeon: Dungeon,
    entities: EntityArena,
    party: Vec<EntityId>,
    enemies: Vec<EntityId>,
    rng: GameRng,
    mode: Mode,
    messages: VecDeque<String>,
    explore_chat_timer: u32,
    #[serde(skip)]
    combat: Option<CombatState>,
    #[serde(skip)]
    combat_log_cursor: usize,
}

impl GameState {
    /// Starts a new run with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{ClassKind, GameState, Mode};
    ///
    /// let game = GameState::new_game(ClassKind::Warrior, 42);
    /// assert_eq!(game.floor, 1);
    /// assert_eq!(game.mode(), Mode::Exploring);
    /// assert_eq!(game.party().len(), 3);
    /// ```
    pub fn new_game(class: ClassKind, seed: u64) -> Self {
        Self::build(class, seed, GenerationConfig::default())
    }

    /// Starts a new run with a custom, validated configuration.
    pub fn with_config(class: ClassKind, seed: u64, config: GenerationConfig) -> CairnResult<Self> {
        config.validate()?;
        Ok(Self::build(class, seed, config))
    }

    fn build(class: ClassKind, seed: u64, config: GenerationConfig) -> Self {
        let mut rng = GameRng::new(seed);
        let mut entities = EntityArena::new();
        let mut party = vec![entities.push(Entity::new_hero(class, "Hero", &mut rng))];

        let mut others: Vec<ClassKind> = ClassKind::ALL
            .into_iter()
            .filter(|&other| other != class)
            .collect();
        rng.shuffle(&mut others);
        for companion_class in others.into_iter().take(COMPANION_COUNT) {
            party.push(entities.push(Entity::new_companion(companion_class, &mut rng)));
        }

        let width = config.width;
        let height = config.height;
        let mut state = Self {
            config,
            floor: 1,
            gold: STARTING_GOLD,
            turn_number: 0,
            statistics: GameStatistics::new(),
            dungeon: Dungeon::new(width, height, 1),
            entities,
            party,
            enemies: Vec::new(),
            rng,
            mode: Mode::Exploring,
            messages: VecDeque::new(),
            explore_chat_timer: 0,
            combat: None,
            combat_log_cursor: 0,
        };
        state.generate_floor();

        state.log_message(format!("Hero the {} enters the dungeon!", class));
        let names: Vec<String> = state
            .companions()
            .filter_map(|id| state.entities.get(id).map(|e| e.name().to_string()))
            .collect();
        state.log_message(format!("Joined by companions: {}", names.join(", ")));
        for id in state.companions().collect::<Vec<_>>() {
            state.say(id, ChatSituation::Explore);
        }
        info!("new {} run with seed {}", class, seed);
        state
    }

    /// The current floor.
    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    /// Every entity in the run.
    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    /// Party members, hero first.
    pub fn party(&self) -> &[EntityId] {
        &self.party
    }

    /// Enemies still standing on this floor, plus any in the active fight.
    pub fn enemies(&self) -> &[EntityId] {
        &self.enemies
    }

    /// What the run is currently doing.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The active encounter, if any.
    pub fn combat(&self) -> Option<&CombatState> {
        self.combat.as_ref()
    }

    /// Most recent messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// The seed the run started from.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Handle of the player's hero.
    pub fn hero_id(&self) -> EntityId {
        self.party[0]
    }

    /// The player's hero.
    pub fn hero(&self) -> Option<&Entity> {
        self.entities.get(self.hero_id())
    }

    fn hero_mut(&mut self) -> Option<&mut Entity> {
        let id = self.hero_id();
        self.entities.get_mut(id)
    }

    fn hero_position(&self) -> Position {
        self.hero().map_or(self.dungeon.spawn, Entity::position)
    }

    fn hero_level(&self) -> u32 {
        self.hero().map_or(1, Entity::level)
    }

    fn companions(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.party[1..]
            .iter()
            .copied()
            .filter(|&id| self.entities.is_alive(id))
    }

    fn living_party(&self) -> Vec<EntityId> {
        self.party
            .iter()
            .copied()
            .filter(|&id| self.entities.is_alive(id))
            .collect()
    }

    /// Appends to the message log, dropping the oldest past the cap.
    pub fn log_message(&mut self, message: impl Into<String>) {
        self.messages.push_back(message.into());
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    fn say(&mut self, speaker: EntityId, situation: ChatSituation) -> Option<GameEvent> {
        let entity = self.entities.get(speaker)?;
        let personality = entity.role().personality()?;
        let name = entity.name().to_string();
        let line = personality.line(situation, &mut self.rng);
        self.log_message(format!("{}: \"{}\"", name, line));
        Some(GameEvent::Chatter { speaker, line })
    }

    /// Builds the current floor and places everyone on it.
    ///
    /// Falls back to a hand-authored room when no room could be placed.
    /// Fallen companions get back up at full strength.
    pub fn generate_floor(&mut self) {
        let generator = DungeonGenerator::new(self.config.clone());
        let mut dungeon = generator.generate(
            self.config.width,
            self.config.height,
            self.floor,
            &mut self.rng,
        );
        if dungeon.rooms.is_empty() {
            warn!(
                "floor {} has no rooms, using the fallback layout",
                self.floor
            );
            dungeon = Dungeon::fallback(self.config.width, self.config.height, self.floor);
        }

        self.entities.truncate(self.party.len());
        self.enemies.clear();
        for spawn in populate(&dungeon, &mut self.rng) {
            let mut enemy = Entity::new_enemy(spawn.kind, spawn.level, &mut self.rng);
            enemy.set_position(spawn.position);
            self.enemies.push(self.entities.push(enemy));
        }

        let start = dungeon.spawn;
        for (index, &id) in self.party.iter().enumerate() {
            let position = if index == 0 {
                start
            } else {
                let i = index as i32;
                let offset = Position::new(start.x + i % 3 - 1, start.y + i / 3);
                if dungeon.is_passable(offset) {
                    offset
                } else {
                    start
                }
            };
            if let Some(member) = self.entities.get_mut(id) {
                if index > 0 && !member.is_alive() {
                    member.revive();
                }
                member.set_position(position);
            }
        }

        dungeon.reveal_around(start, self.config.sight_radius);
        info!(
            "floor {}: {} rooms, {} enemies",
            self.floor,
            dungeon.rooms.len(),
            self.enemies.len()
        );
        self.dungeon = dungeon;
        self.combat = None;
        self.combat_log_cursor = 0;
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(self.floor);
        self.log_message(format!("Floor {}: the dungeon deepens...", self.floor));
    }

    /// Moves the hero one step and resolves whatever is there.
    ///
    /// Walls and void refuse the move without changing anything.
    pub fn try_move(&mut self, direction: Direction) -> Result<Vec<GameEvent>, IllegalAction> {
        if self.mode != Mode::Exploring {
            return Err(IllegalAction::NotExploring);
        }
        let from = self.hero_position();
        let to = from + direction.to_delta();
        if !self.dungeon.is_passable(to) {
            return Err(IllegalAction::Blocked);
        }

        let mut events = vec![GameEvent::Moved { from, to }];
        if let Some(hero) = self.hero_mut() {
            hero.set_position(to);
        }
        self.turn_number += 1;
        self.follow_hero(to);

        self.dungeon.reveal_around(to, self.config.sight_radius);
        let spotted = self.dungeon.reveal_traps_near(to, 1);
        if spotted > 0 {
            self.log_message(format!("You spot {} trap(s) nearby.", spotted));
            events.push(GameEvent::TrapsSpotted { count: spotted });
        }

        self.interact(to, &mut events);
        let descended = events
            .iter()
            .any(|event| matches!(event, GameEvent::Descended { .. }));
        if self.mode == Mode::Exploring && !descended {
            let adjacent = self.enemies.iter().copied().find(|&id| {
                self.entities
                    .get(id)
                    .is_some_and(|e| e.is_alive() && e.position().chebyshev_distance(to) <= 1)
            });
            match adjacent {
                Some(enemy) => events.extend(self.start_combat(vec![enemy])),
                None => events.extend(self.explore_chatter()),
            }
        }

        self.record(&events);
        Ok(events)
    }

    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            self.statistics.update_from_event(event);
        }
    }

    /// Companions more than two steps behind take one step toward the hero.
    fn follow_hero(&mut self, hero: Position) {
        for id in self.companions().collect::<Vec<_>>() {
            let Some(companion) = self.entities.get(id) else {
                continue;
            };
            let at = companion.position();
            if at.manhattan_distance(hero) <= 2 {
                continue;
            }
            let step = Position::new(at.x + (hero.x - at.x).signum(), at.y + (hero.y - at.y).signum());
            if self.dungeon.is_passable(step) {
                if let Some(companion) = self.entities.get_mut(id) {
                    companion.set_position(step);
                }
            }
        }
    }

    fn interact(&mut self, at: Position, events: &mut Vec<GameEvent>) {
        match self.dungeon.tile(at) {
            Some(Tile::Chest) => {
                self.dungeon.set_tile(at, Tile::OpenedChest);
                let loot = generate_loot(self.hero_level(), false, &mut self.rng);
                self.gold += loot.gold;
                self.log_message(format!("Opened a chest: {} gold!", loot.gold));
                for &item in &loot.items {
                    self.log_message(format!("  found {}", item));
                    if let Some(hero) = self.hero_mut() {
                        hero.add_item(item);
                    }
                }
                events.push(GameEvent::ChestOpened { position: at, loot });
            }
            Some(Tile::Stairs) => {
                self.floor += 1;
                info!("descending to floor {}", self.floor);
                self.generate_floor();
                events.push(GameEvent::Descended { floor: self.floor });
            }
            Some(Tile::Trap { .. }) => {
                let damage = roll_formula("1d6", &mut self.rng) + self.floor as i32;
                self.dungeon.set_tile(at, Tile::SprungTrap);
                self.hurt_hero(damage);
                self.log_message(format!("A trap! Hero takes {} damage!", damage));
                events.push(GameEvent::TrapTriggered {
                    position: at,
                    damage,
                });
                self.check_hero_death(events);
            }
            Some(Tile::Lava) => {
                let damage = roll_formula("1d4", &mut self.rng) + self.floor as i32;
                self.hurt_hero(damage);
                self.log_message(format!("The lava burns for {} damage!", damage));
                events.push(GameEvent::LavaBurn { damage });
                self.check_hero_death(events);
            }
            _ => {}
        }
    }

    fn hurt_hero(&mut self, damage: i32) {
        if let Some(hero) = self.hero_mut() {
            hero.take_damage(damage);
        }
    }

    fn check_hero_death(&mut self, events: &mut Vec<GameEvent>) {
        if !self.entities.is_alive(self.hero_id()) {
            info!("hero died on floor {}", self.floor);
            self.mode = Mode::GameOver;
            self.log_message("The hero has fallen. Game over.");
            events.push(GameEvent::GameOver);
        }
    }

    fn explore_chatter(&mut self) -> Option<GameEvent> {
        self.explore_chat_timer += 1;
        if self.explore_chat_timer < EXPLORE_CHAT_INTERVAL {
            return None;
        }
        self.explore_chat_timer = 0;
        let companions: Vec<EntityId> = self.companions().collect();
        if companions.is_empty() || !self.rng.chance(0.3) {
            return None;
        }
        let speaker = *self.rng.choose(&companions)?;
        self.say(speaker, ChatSituation::Explore)
    }

    /// Opens an encounter with the triggering enemies and every living
    /// enemy within three tiles of one of them.
    fn start_combat(&mut self, triggered: Vec<EntityId>) -> Vec<GameEvent> {
        let anchors: Vec<Position> = triggered
            .iter()
            .filter_map(|&id| self.entities.get(id).map(Entity::position))
            .collect();
        let mut group = triggered;
        for &id in &self.enemies {
            if group.contains(&id) {
                continue;
            }
            let nearby = self.entities.get(id).is_some_and(|e| {
                e.is_alive()
                    && anchors
                        .iter()
                        .any(|&anchor| e.position().chebyshev_distance(anchor) <= 3)
            });
            if nearby {
                group.push(id);
            }
        }

        let party = self.living_party();
        let mut combat = CombatState::new(&self.entities, party, group.clone(), &mut self.rng);
        for id in self.companions().collect::<Vec<_>>() {
            combat.chatter(&self.entities, id, ChatSituation::CombatStart, &mut self.rng);
        }
        info!(
            "encounter on floor {} with {} enemies",
            self.floor,
            group.len()
        );
        self.log_message(format!("Combat begins against {} foe(s)!", group.len()));

        self.combat = Some(combat);
        self.combat_log_cursor = 0;
        self.mode = Mode::Combat;

        let mut events = vec![GameEvent::EncounterStarted { enemies: group }];
        events.extend(self.sync_combat_log());
        events.extend(self.resolve_ai_turns());
        events
    }

    /// Copies combat events not yet seen into the message log.
    fn sync_combat_log(&mut self) -> Vec<GameEvent> {
        let Some(combat) = self.combat.as_ref() else {
            return Vec::new();
        };
        let fresh: Vec<CombatEvent> = combat.log()[self.combat_log_cursor..].to_vec();
        self.combat_log_cursor = combat.log().len();
        let lines: Vec<String> = fresh.iter().map(|e| e.describe(&self.entities)).collect();
        for line in lines {
            self.log_message(line);
        }
        fresh.into_iter().map(GameEvent::Combat).collect()
    }

    /// Plays companion and enemy turns until the hero must act or the
    /// encounter ends.
    pub fn advance_combat(&mut self) -> Result<Vec<GameEvent>, IllegalAction> {
        if self.mode != Mode::Combat || self.combat.is_none() {
            return Err(IllegalAction::NotInCombat);
        }
        let events = self.resolve_ai_turns();
        self.record(&events);
        Ok(events)
    }

    fn resolve_ai_turns(&mut self) -> Vec<GameEvent> {
        let Some(combat) = self.combat.as_mut() else {
            return Vec::new();
        };
        let mut turns = 0;
        while matches!(combat.phase(), Phase::CompanionTurn | Phase::EnemyTurn) {
            if turns == MAX_AI_TURNS {
                warn!("encounter still running after {} AI turns", turns);
                break;
            }
            if let Err(err) = combat.run_ai_turn(&mut self.entities, &mut self.rng) {
                warn!("AI turn failed: {}", err);
                break;
            }
            turns += 1;
        }
        let finished = combat.is_over();

        let mut events = self.sync_combat_log();
        if finished {
            events.extend(self.finish_combat());
        }
        events
    }

    /// Submits the hero's action, then plays out AI turns.
    pub fn submit_player_action(
        &mut self,
        action: PlayerAction,
    ) -> Result<Vec<GameEvent>, IllegalAction> {
        if self.mode != Mode::Combat {
            return Err(IllegalAction::NotInCombat);
        }
        let combat = self.combat.as_mut().ok_or(IllegalAction::NotInCombat)?;
        combat.submit_player_action(&mut self.entities, action, &mut self.rng)?;
        debug!("hero action {:?} accepted", action);

        let mut events = self.sync_combat_log();
        events.extend(self.resolve_ai_turns());
        self.record(&events);
        Ok(events)
    }

    /// Applies the outcome of a finished encounter.
    fn finish_combat(&mut self) -> Vec<GameEvent> {
        let Some(combat) = self.combat.take() else {
            return Vec::new();
        };
        self.combat_log_cursor = 0;
        let mut events = Vec::new();

        if combat.phase() == Phase::Defeat {
            info!("party defeated on floor {}", self.floor);
            self.mode = Mode::GameOver;
            self.log_message("The party has been defeated. Game over.");
            events.push(GameEvent::GameOver);
            return events;
        }

        let level = self.hero_level();
        let Some(rewards) = combat.rewards(&self.entities, level, &mut self.rng) else {
            self.mode = Mode::Exploring;
            return events;
        };

        // A fallen hero is carried out by the survivors
        let hero = self.hero_id();
        if !self.entities.is_alive(hero) {
            if let Some(entity) = self.entities.get_mut(hero) {
                entity.revive_at(1);
            }
            self.log_message("Your companions pull you back to your feet.");
        }

        self.gold += rewards.gold;
        for &item in &rewards.items {
            if let Some(entity) = self.entities.get_mut(hero) {
                entity.add_item(item);
            }
        }
        self.log_message(format!(
            "Victory! +{} XP each, +{} gold",
            rewards.xp_each, rewards.gold
        ));

        for id in self.living_party() {
            let Some(member) = self.entities.get_mut(id) else {
                continue;
            };
            let gained = member.gain_xp(rewards.xp_each);
            let max_hp = member.max_hp();
            member.heal(max_hp / 10);
            member.restore_mp(3);
            if gained > 0 {
                let level = member.level();
                let name = member.name().to_string();
                info!("{} reached level {}", name, level);
                self.log_message(format!("{} reached level {}!", name, level));
                events.push(GameEvent::LevelUp { entity: id, level });
                events.extend(self.say(id, ChatSituation::LevelUp));
            }
        }
        for id in self.companions().collect::<Vec<_>>() {
            if self.rng.chance(0.5) {
                events.extend(self.say(id, ChatSituation::Victory));
            }
        }

        let defeated = combat.enemies().len();
        self.enemies.retain(|&id| self.entities.is_alive(id));
        self.mode = Mode::Exploring;
        events.push(GameEvent::CombatWon { defeated, rewards });
        events
    }

    /// Uses an inventory item outside combat. Gear is equipped instead.
    pub fn use_item(
        &mut self,
        index: usize,
        target: Option<EntityId>,
    ) -> Result<Vec<GameEvent>, IllegalAction> {
        if self.mode != Mode::Exploring {
            return Err(IllegalAction::NotExploring);
        }
        let item = self
            .hero()
            .and_then(|h| h.inventory().get(index).copied())
            .ok_or(IllegalAction::NoSuchItem { index })?;
        let Some(consumable) = item.consumable() else {
            return self.equip(index).map(|event| vec![event]);
        };
        let target = target.unwrap_or(self.hero_id());
        if !self.party.contains(&target) {
            return Err(IllegalAction::InvalidTarget);
        }
        if !self.entities.is_alive(target) {
            return Err(IllegalAction::DeadTarget);
        }

        let amount = match consumable {
            Consumable::Fireball { .. } => return Err(IllegalAction::CombatOnly),
            Consumable::Heal { formula } => {
                let rolled = roll_formula(formula, &mut self.rng);
                self.entities.get_mut(target).map_or(0, |e| e.heal(rolled))
            }
            Consumable::RestoreMana { formula } => {
                let rolled = roll_formula(formula, &mut self.rng);
                self.entities
                    .get_mut(target)
                    .map_or(0, |e| e.restore_mp(rolled))
            }
        };
        if let Some(hero) = self.hero_mut() {
            hero.take_item(index);
        }
        self.log_message(format!("Used {} ({}).", item, amount));
        Ok(vec![GameEvent::ItemUsed {
            item,
            target,
            amount,
        }])
    }

    /// Equips gear from the hero's inventory; the replaced piece goes back in.
    pub fn equip(&mut self, index: usize) -> Result<GameEvent, IllegalAction> {
        if self.mode != Mode::Exploring {
            return Err(IllegalAction::NotExploring);
        }
        let hero = self.hero_mut().ok_or(IllegalAction::InvalidTarget)?;
        let item = hero
            .inventory()
            .get(index)
            .copied()
            .ok_or(IllegalAction::NoSuchItem { index })?;
        if item.slot().is_none() {
            return Err(IllegalAction::NotEquippable);
        }
        hero.take_item(index);
        let replaced = hero.equip(item)?;
        if let Some(old) = replaced {
            hero.add_item(old);
        }
        self.log_message(format!("Equipped {}.", item));
        Ok(GameEvent::Equipped { item, replaced })
    }

    fn ensure_saveable(&self) -> CairnResult<()> {
        if self.combat.is_some() {
            return Err(CairnError::InvalidState(
                "cannot save during an encounter".to_string(),
            ));
        }
        Ok(())
    }

    /// Saves the game state to JSON.
    pub fn save_to_json(&self) -> CairnResult<String> {
        self.ensure_saveable()?;
        serde_json::to_string_pretty(self).map_err(CairnError::from)
    }

    /// Loads game state from JSON.
    pub fn load_from_json(json: &str) -> CairnResult<Self> {
        let state: Self = serde_json::from_str(json)?;
        if state.mode == Mode::Combat {
            return Err(CairnError::InvalidState(
                "saved state is mid-encounter".to_string(),
            ));
        }
        Ok(state)
    }

    /// Saves the game state to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> CairnResult<()> {
        let json = self.save_to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads game state from a file.
    pub fn load_from_file(path: impl AsRef<Path>) -> CairnResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> GenerationConfig {
        GenerationConfig::for_testing()
    }

    #[test]
    fn test_new_game_party() {
        let game = GameState::new_game(ClassKind::Mage, 12345);
        assert_eq!(game.floor, 1);
        assert_eq!(game.gold, STARTING_GOLD);
        assert_eq!(game.turn_number, 0);
        assert_eq!(game.party().len(), 1 + COMPANION_COUNT);
        assert_eq!(
            game.hero().unwrap().role().class(),
            Some(ClassKind::Mage)
        );
        for &id in &game.party()[1..] {
            let companion = game.entities().get(id).unwrap();
            assert_ne!(companion.role().class(), Some(ClassKind::Mage));
            assert!(companion.role().personality().is_some());
        }
        assert_eq!(game.hero().unwrap().position(), game.dungeon().spawn);
        assert!(game.dungeon().is_explored(game.dungeon().spawn.x, game.dungeon().spawn.y));
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = GameState::new_game(ClassKind::Rogue, 99);
        let b = GameState::new_game(ClassKind::Rogue, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GenerationConfig {
            min_room_width: 10,
            max_room_width: 4,
            ..GenerationConfig::new()
        };
        assert!(GameState::with_config(ClassKind::Warrior, 1, config).is_err());
    }

    #[test]
    fn test_enemies_sit_after_party_in_arena() {
        let game = GameState::new_game(ClassKind::Warrior, 7);
        let party = game.party().len();
        assert_eq!(game.entities().len(), party + game.enemies().len());
        for (i, &id) in game.enemies().iter().enumerate() {
            assert_eq!(id, EntityId(party + i));
            assert!(game.entities().get(id).unwrap().role().is_hostile());
        }
    }

    #[test]
    fn test_blocked_move_changes_nothing() {
        let mut game = GameState::with_config(ClassKind::Warrior, 5, quiet_config()).unwrap();
        // Walk west until a wall stops us
        let mut result = Ok(Vec::new());
        for _ in 0..50 {
            result = game.try_move(Direction::West);
            if result.is_err() || game.mode() != Mode::Exploring {
                break;
            }
        }
        if game.mode() != Mode::Exploring {
            return;
        }
        let before = game.clone();
        assert_eq!(result, Err(IllegalAction::Blocked));
        assert_eq!(game.try_move(Direction::West), Err(IllegalAction::Blocked));
        assert_eq!(game, before);
    }

    #[test]
    fn test_combat_only_actions_need_combat() {
        let mut game = GameState::new_game(ClassKind::Warrior, 3);
        assert_eq!(
            game.submit_player_action(PlayerAction::Defend),
            Err(IllegalAction::NotInCombat)
        );
        assert_eq!(game.advance_combat(), Err(IllegalAction::NotInCombat));
    }

    #[test]
    fn test_use_item_outside_combat() {
        let mut game = GameState::new_game(ClassKind::Warrior, 4);
        let hero = game.hero_id();
        game.entities.get_mut(hero).unwrap().add_item(ItemKind::ScrollOfFireball);
        game.entities.get_mut(hero).unwrap().add_item(ItemKind::HealthPotion);
        game.entities.get_mut(hero).unwrap().add_item(ItemKind::ChainMail);
        game.entities.get_mut(hero).unwrap().take_damage(5);

        assert_eq!(game.use_item(0, None), Err(IllegalAction::CombatOnly));
        assert_eq!(game.use_item(9, None), Err(IllegalAction::NoSuchItem { index: 9 }));

        let events = game.use_item(1, None).unwrap();
        assert!(matches!(
            events[0],
            GameEvent::ItemUsed {
                item: ItemKind::HealthPotion,
                amount,
                ..
            } if amount > 0
        ));

        let ac = game.hero().unwrap().armor_class();
        let events = game.use_item(1, None).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::Equipped {
                item: ItemKind::ChainMail,
                replaced: None
            }]
        );
        assert_eq!(game.hero().unwrap().armor_class(), ac + 4);
        assert_eq!(
            game.hero().unwrap().inventory(),
            &[ItemKind::ScrollOfFireball]
        );
        assert_eq!(game.equip(0), Err(IllegalAction::NotEquippable));
    }

    #[test]
    fn test_message_log_is_capped() {
        let mut game = GameState::new_game(ClassKind::Cleric, 8);
        for i in 0..250 {
            game.log_message(format!("line {}", i));
        }
        assert_eq!(game.messages().count(), MAX_MESSAGES);
        assert_eq!(game.messages().last(), Some("line 249"));
    }

    #[test]
    fn test_game_state_serialization() {
        let game = GameState::new_game(ClassKind::Ranger, 12345);
        let json = game.save_to_json().unwrap();

        // Should be valid JSON
        let _: serde_json::Value = serde_json::from_str(&json).unwrap();

        let loaded = GameState::load_from_json(&json).unwrap();
        assert_eq!(loaded, game);
    }

    #[test]
    fn test_statistics_update() {
        let mut stats = GameStatistics::new();
        stats.update_from_event(&GameEvent::Moved {
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        });
        stats.update_from_event(&GameEvent::TrapTriggered {
            position: Position::new(1, 0),
            damage: 6,
        });
        stats.update_from_event(&GameEvent::Descended { floor: 3 });
        assert_eq!(stats.steps_taken, 1);
        assert_eq!(stats.traps_triggered, 1);
        assert_eq!(stats.hazard_damage, 6);
        assert_eq!(stats.max_depth_reached, 3);
    }
}
