//! # Entity System
//!
//! Combatants, their roles and the arena that owns them.
//!
//! Every hero, companion and enemy is an [`Entity`] stored by value in one
//! [`EntityArena`]. Other systems refer to entities by [`EntityId`] only, so
//! combat can name "the attacker" and "the target" without holding borrows.

use crate::generation::{EquipSlot, ItemKind};
use crate::utils::roll_formula;
use crate::{
    Ability, AbilityScores, GameRng, GearBonus, IllegalAction, InsufficientResource, Position,
    Skill, SkillKind, SkillOutcome, StatBlock,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playable character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Warrior,
    Mage,
    Rogue,
    Cleric,
    Ranger,
}

impl ClassKind {
    /// All classes.
    pub const ALL: [ClassKind; 5] = [
        ClassKind::Warrior,
        ClassKind::Mage,
        ClassKind::Rogue,
        ClassKind::Cleric,
        ClassKind::Ranger,
    ];

    /// Display name of the class.
    pub fn name(self) -> &'static str {
        match self {
            ClassKind::Warrior => "Warrior",
            ClassKind::Mage => "Mage",
            ClassKind::Rogue => "Rogue",
            ClassKind::Cleric => "Cleric",
            ClassKind::Ranger => "Ranger",
        }
    }

    /// Hit die used for maximum HP.
    pub fn hp_die(self) -> i32 {
        match self {
            ClassKind::Warrior => 10,
            ClassKind::Mage => 6,
            ClassKind::Rogue | ClassKind::Cleric | ClassKind::Ranger => 8,
        }
    }

    /// Ability that drives attack and damage rolls.
    pub fn primary(self) -> Ability {
        match self {
            ClassKind::Warrior => Ability::Strength,
            ClassKind::Mage => Ability::Intelligence,
            ClassKind::Rogue | ClassKind::Ranger => Ability::Dexterity,
            ClassKind::Cleric => Ability::Wisdom,
        }
    }

    /// Armor class granted by the class's starting armor.
    pub fn armor_bonus(self) -> i32 {
        match self {
            ClassKind::Warrior => 4,
            ClassKind::Mage => 0,
            ClassKind::Rogue => 2,
            ClassKind::Cleric => 3,
            ClassKind::Ranger => 1,
        }
    }

    /// Unarmed basic attack dice.
    pub fn attack_dice(self) -> &'static str {
        match self {
            ClassKind::Warrior | ClassKind::Ranger => "1d8",
            ClassKind::Mage => "1d4",
            ClassKind::Rogue | ClassKind::Cleric => "1d6",
        }
    }

    /// The three class skills, cheapest first.
    pub fn skills(self) -> [SkillKind; 3] {
        match self {
            ClassKind::Warrior => [
                SkillKind::PowerStrike,
                SkillKind::ShieldBash,
                SkillKind::Rally,
            ],
            ClassKind::Mage => [
                SkillKind::Fireball,
                SkillKind::IceShard,
                SkillKind::ArcaneShield,
            ],
            ClassKind::Rogue => [SkillKind::Backstab, SkillKind::SmokeBomb, SkillKind::Steal],
            ClassKind::Cleric => [SkillKind::Heal, SkillKind::Smite, SkillKind::Bless],
            ClassKind::Ranger => [
                SkillKind::ArrowRain,
                SkillKind::Trap,
                SkillKind::NaturesBlessing,
            ],
        }
    }

    /// Names a recruited companion of this class may carry.
    pub fn companion_names(self) -> &'static [&'static str] {
        match self {
            ClassKind::Warrior => &["Ironheart", "Thorin", "Valeria", "Bjorn", "Gretchen"],
            ClassKind::Mage => &["Elara", "Zephyr", "Morgana", "Aldric", "Lyria"],
            ClassKind::Rogue => &["Shadow", "Vex", "Nyx", "Kael", "Whisper"],
            ClassKind::Cleric => &["Solara", "Brother Cedric", "Lumina", "Theron", "Grace"],
            ClassKind::Ranger => &["Hawkeye", "Fern", "Ashwood", "Talon", "Willow"],
        }
    }

    /// Healers prioritize patching up hurt allies when AI-controlled.
    pub fn is_healer(self) -> bool {
        matches!(self, ClassKind::Cleric)
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ClassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassKind::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown class '{}'", s))
    }
}

/// Hostile creature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Slime,
    Goblin,
    Skeleton,
    Orc,
    Dragon,
    Lich,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Slime,
        EnemyKind::Goblin,
        EnemyKind::Skeleton,
        EnemyKind::Orc,
        EnemyKind::Dragon,
        EnemyKind::Lich,
    ];

    /// Display name of the monster.
    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Slime => "Slime",
            EnemyKind::Goblin => "Goblin",
            EnemyKind::Skeleton => "Skeleton",
            EnemyKind::Orc => "Orc",
            EnemyKind::Dragon => "Dragon",
            EnemyKind::Lich => "Lich",
        }
    }

    /// Hit points at level 1.
    pub fn base_hp(self) -> i32 {
        match self {
            EnemyKind::Slime | EnemyKind::Goblin => 8,
            EnemyKind::Skeleton => 18,
            EnemyKind::Orc => 30,
            EnemyKind::Dragon => 80,
            EnemyKind::Lich => 120,
        }
    }

    /// Armor class at level 1.
    pub fn base_ac(self) -> i32 {
        match self {
            EnemyKind::Slime => 8,
            EnemyKind::Goblin => 11,
            EnemyKind::Skeleton => 12,
            EnemyKind::Orc => 13,
            EnemyKind::Dragon => 16,
            EnemyKind::Lich => 17,
        }
    }

    /// Dice expression rolled for the monster's weapon damage.
    pub fn attack_dice(self) -> &'static str {
        match self {
            EnemyKind::Slime => "1d4",
            EnemyKind::Goblin => "1d6",
            EnemyKind::Skeleton => "1d8",
            EnemyKind::Orc => "1d10",
            EnemyKind::Dragon => "2d8",
            EnemyKind::Lich => "2d10",
        }
    }

    /// Experience granted at level 1.
    pub fn xp(self) -> u32 {
        match self {
            EnemyKind::Slime => 15,
            EnemyKind::Goblin => 25,
            EnemyKind::Skeleton => 40,
            EnemyKind::Orc => 60,
            EnemyKind::Dragon => 200,
            EnemyKind::Lich => 500,
        }
    }

    /// Inclusive gold drop range.
    pub fn gold_range(self) -> (i32, i32) {
        match self {
            EnemyKind::Slime => (2, 8),
            EnemyKind::Goblin => (5, 15),
            EnemyKind::Skeleton => (3, 12),
            EnemyKind::Orc => (10, 30),
            EnemyKind::Dragon => (50, 150),
            EnemyKind::Lich => (100, 300),
        }
    }

    /// Bosses roll boosted loot.
    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::Dragon | EnemyKind::Lich)
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Moments a companion may comment on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatSituation {
    CombatStart,
    LowHp,
    Victory,
    Idle,
    Heal,
    LevelUp,
    Explore,
}

/// Flavor of a companion's chatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Brave,
    Cautious,
    Witty,
    Wise,
    Fierce,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Brave,
        Personality::Cautious,
        Personality::Witty,
        Personality::Wise,
        Personality::Fierce,
    ];

    /// Every line this personality can say in a situation.
    pub fn lines(self, situation: ChatSituation) -> &'static [&'static str] {
        use ChatSituation::*;
        match (self, situation) {
            (Personality::Brave, CombatStart) => &["For glory!", "Hold the line!", "Steel yourselves!"],
            (Personality::Brave, LowHp) => &["It's only a scratch!", "I'm not done yet!"],
            (Personality::Brave, Victory) => &["Who's next?", "The party stands tall!"],
            (Personality::Brave, Idle) => &["Ready when you are.", "My blade is restless."],
            (Personality::Brave, Heal) => &["Back on my feet!", "Thanks, friend!"],
            (Personality::Brave, LevelUp) => &["I feel stronger already!", "Bring on the next one!"],
            (Personality::Brave, Explore) => &["I'll take point.", "Stay close, everyone."],

            (Personality::Cautious, CombatStart) => &["Careful now...", "Watch the flanks!"],
            (Personality::Cautious, LowHp) => &["I need healing!", "Falling back!"],
            (Personality::Cautious, Victory) => &["That was too close.", "Is everyone all right?"],
            (Personality::Cautious, Idle) => &["I don't like this quiet.", "Check your gear."],
            (Personality::Cautious, Heal) => &["Just in time.", "Much appreciated."],
            (Personality::Cautious, LevelUp) => &["Slow and steady.", "Every lesson counts."],
            (Personality::Cautious, Explore) => &["Mind the floor, could be traps.", "Tread lightly here."],

            (Personality::Witty, CombatStart) => &["Oh good, visitors.", "Shall we dance?"],
            (Personality::Witty, LowHp) => &["Merely a flesh wound!", "I meant to do that."],
            (Personality::Witty, Victory) => &["Loot first, questions later!", "Another day, another dungeon."],
            (Personality::Witty, Idle) => &["Lovely damp ambiance.", "Anyone pack snacks?"],
            (Personality::Witty, Heal) => &["Better than a nap!", "Ooh, tingly."],
            (Personality::Witty, LevelUp) => &["Ding!", "I'm basically a legend now."],
            (Personality::Witty, Explore) => &["I'm sure this map is upside down.", "Dibs on the next chest."],

            (Personality::Wise, CombatStart) => &["Observe, then strike.", "Patience wins battles."],
            (Personality::Wise, LowHp) => &["My strength wanes...", "I must recover."],
            (Personality::Wise, Victory) => &["The light endures.", "A lesson well learned."],
            (Personality::Wise, Idle) => &["These stones are very old.", "Knowledge protects."],
            (Personality::Wise, Heal) => &["Gratitude, friend.", "Balance restored."],
            (Personality::Wise, LevelUp) => &["Wisdom grows with trial.", "Clarity approaches."],
            (Personality::Wise, Explore) => &["These runes tell a story.", "The dungeon breathes."],

            (Personality::Fierce, CombatStart) => &["RAAAGH!", "CRUSH THEM!"],
            (Personality::Fierce, LowHp) => &["PAIN ONLY FEEDS ME!", "NOT YET!"],
            (Personality::Fierce, Victory) => &["SMASHED!", "THEY WERE NOTHING!"],
            (Personality::Fierce, Idle) => &["WHEN DO WE FIGHT?", "*grinds teeth*"],
            (Personality::Fierce, Heal) => &["BACK TO FULL FURY!", "NOW I'M ANGRY AND HEALED!"],
            (Personality::Fierce, LevelUp) => &["MORE POWER!", "FEEL MY WRATH GROW!"],
            (Personality::Fierce, Explore) => &["I SMELL ENEMIES!", "BRING ME A FIGHT!"],
        }
    }

    /// Picks one line at random.
    pub fn line(self, situation: ChatSituation, rng: &mut GameRng) -> &'static str {
        rng.choose(self.lines(situation)).copied().unwrap_or("...")
    }
}

/// Who controls an entity and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The player-controlled character
    Hero { class: ClassKind },
    /// An AI-controlled party member
    Companion {
        class: ClassKind,
        personality: Personality,
    },
    /// A hostile creature
    Enemy { kind: EnemyKind },
}

impl Role {
    /// Class of a hero or companion.
    pub fn class(self) -> Option<ClassKind> {
        match self {
            Role::Hero { class } | Role::Companion { class, .. } => Some(class),
            Role::Enemy { .. } => None,
        }
    }

    /// Monster kind of an enemy.
    pub fn enemy_kind(self) -> Option<EnemyKind> {
        match self {
            Role::Enemy { kind } => Some(kind),
            _ => None,
        }
    }

    /// Personality of a companion.
    pub fn personality(self) -> Option<Personality> {
        match self {
            Role::Companion { personality, .. } => Some(personality),
            _ => None,
        }
    }

    /// Whether the entity fights against the party.
    pub fn is_hostile(self) -> bool {
        matches!(self, Role::Enemy { .. })
    }

    /// Enemies attack with strength.
    pub fn primary(self) -> Ability {
        self.class().map_or(Ability::Strength, ClassKind::primary)
    }
}

/// Items worn in each equipment slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<ItemKind>,
    pub armor: Option<ItemKind>,
    pub accessory: Option<ItemKind>,
}

impl Equipment {
    /// Item worn in `slot`, if any.
    pub fn get(&self, slot: EquipSlot) -> Option<ItemKind> {
        match slot {
            EquipSlot::Weapon => self.weapon,
            EquipSlot::Armor => self.armor,
            EquipSlot::Accessory => self.accessory,
        }
    }

    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<ItemKind> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Accessory => &mut self.accessory,
        }
    }

    /// Summed bonus of every equipped item.
    pub fn gear_bonus(&self) -> GearBonus {
        [self.weapon, self.armor, self.accessory]
            .into_iter()
            .flatten()
            .fold(GearBonus::default(), |total, item| {
                total.combine(item.gear_bonus())
            })
    }
}

/// Index of an entity in the [`EntityArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    role: Role,
    stats: StatBlock,
    position: Position,
    alive: bool,
    equipment: Equipment,
    skills: Vec<SkillKind>,
    inventory: Vec<ItemKind>,
}

/// Rolls 4d6-drop-lowest scores, then raises the primary ability to at
/// least `14 + (0..=4)`.
fn roll_boosted(primary: Ability, rng: &mut GameRng) -> AbilityScores {
    let mut scores = AbilityScores::roll(rng);
    let floor = 14 + rng.range(0, 4) as u8;
    scores.set(primary, scores.get(primary).max(floor));
    scores
}

impl Entity {
    fn with_class(name: String, role: Role, class: ClassKind, abilities: AbilityScores) -> Self {
        Self {
            name,
            role,
            stats: StatBlock::for_class(abilities, class.hp_die(), class.armor_bonus()),
            position: Position::origin(),
            alive: true,
            equipment: Equipment::default(),
            skills: class.skills().to_vec(),
            inventory: Vec::new(),
        }
    }

    /// Creates the player character with rolled scores.
    pub fn new_hero(class: ClassKind, name: impl Into<String>, rng: &mut GameRng) -> Self {
        let abilities = roll_boosted(class.primary(), rng);
        Self::hero_with(class, name, abilities)
    }

    /// Creates the player character with fixed scores.
    pub fn hero_with(class: ClassKind, name: impl Into<String>, abilities: AbilityScores) -> Self {
        Self::with_class(name.into(), Role::Hero { class }, class, abilities)
    }

    /// Recruits a companion with a random name, personality and scores.
    pub fn new_companion(class: ClassKind, rng: &mut GameRng) -> Self {
        let name = rng
            .choose(class.companion_names())
            .copied()
            .unwrap_or("Companion");
        let personality = rng
            .choose(&Personality::ALL)
            .copied()
            .unwrap_or(Personality::Brave);
        let abilities = roll_boosted(class.primary(), rng);
        Self::companion_with(class, personality, name, abilities)
    }

    /// Creates a companion with fixed scores.
    pub fn companion_with(
        class: ClassKind,
        personality: Personality,
        name: impl Into<String>,
        abilities: AbilityScores,
    ) -> Self {
        Self::with_class(
            name.into(),
            Role::Companion { class, personality },
            class,
            abilities,
        )
    }

    /// Spawns an enemy with rolled scores.
    pub fn new_enemy(kind: EnemyKind, level: u32, rng: &mut GameRng) -> Self {
        let abilities = roll_boosted(Ability::Strength, rng);
        Self::enemy_with(kind, level, abilities)
    }

    /// Spawns an enemy with fixed scores.
    pub fn enemy_with(kind: EnemyKind, level: u32, abilities: AbilityScores) -> Self {
        Self {
            name: kind.name().to_string(),
            role: Role::Enemy { kind },
            stats: StatBlock::for_monster(abilities, kind.base_hp(), kind.base_ac(), level),
            position: Position::origin(),
            alive: true,
            equipment: Equipment::default(),
            skills: Vec::new(),
            inventory: Vec::new(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hero, companion or enemy.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Ability scores and derived numbers.
    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Tile the entity stands on.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// False once HP has reached zero.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Equipped gear.
    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    /// Known skills, by slot.
    pub fn skills(&self) -> &[SkillKind] {
        &self.skills
    }

    /// The skill in a slot, if any.
    pub fn skill(&self, index: usize) -> Option<SkillKind> {
        self.skills.get(index).copied()
    }

    /// Carried items, in pickup order.
    pub fn inventory(&self) -> &[ItemKind] {
        &self.inventory
    }

    /// Current hit points.
    pub fn hp(&self) -> i32 {
        self.stats.hp()
    }

    /// Maximum hit points including gear.
    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp()
    }

    /// Current mana.
    pub fn mp(&self) -> i32 {
        self.stats.mp()
    }

    /// Character level, starting at 1.
    pub fn level(&self) -> u32 {
        self.stats.level
    }

    /// `modifier(primary) + (level - 1) / 2`.
    pub fn attack_bonus(&self) -> i32 {
        self.stats.modifier(self.role.primary()) as i32 + (self.stats.level as i32 - 1) / 2
    }

    /// Basic attack dice; a wielded weapon replaces the natural dice.
    pub fn attack_dice(&self) -> &'static str {
        if let Some(dice) = self.equipment.weapon.and_then(ItemKind::attack_dice) {
            return dice;
        }
        match self.role {
            Role::Hero { class } | Role::Companion { class, .. } => class.attack_dice(),
            Role::Enemy { kind } => kind.attack_dice(),
        }
    }

    /// Rolls basic attack damage, never below 1.
    pub fn damage_roll(&self, rng: &mut GameRng) -> i32 {
        let base = roll_formula(self.attack_dice(), rng);
        (base + self.stats.modifier(self.role.primary()) as i32).max(1)
    }

    /// Armor class before encounter buffs.
    pub fn armor_class(&self) -> i32 {
        self.stats.armor_class()
    }

    /// Experience granted for defeating this entity.
    pub fn xp_reward(&self) -> u32 {
        match self.role {
            Role::Enemy { kind } => kind.xp() + (self.stats.level - 1) * 10,
            _ => 0,
        }
    }

    /// Applies damage and marks the entity dead at zero HP.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        if !self.alive {
            return 0;
        }
        let taken = self.stats.take_damage(amount);
        if !self.stats.is_alive() {
            self.alive = false;
        }
        taken
    }

    /// Heals a living entity. The dead stay dead.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        if !self.alive {
            return 0;
        }
        self.stats.heal(amount)
    }

    pub(crate) fn restore_mp(&mut self, amount: i32) -> i32 {
        if !self.alive {
            return 0;
        }
        self.stats.restore_mp(amount)
    }

    /// Brings the entity back at full HP and MP.
    pub(crate) fn revive(&mut self) {
        self.alive = true;
        self.stats.restore_full();
    }

    /// Brings a fallen entity back with a sliver of health.
    pub(crate) fn revive_at(&mut self, hp: i32) {
        self.alive = true;
        self.stats.set_hp(hp.max(1));
    }

    pub(crate) fn gain_xp(&mut self, amount: u32) -> u32 {
        self.stats.gain_xp(amount)
    }

    /// Pays for and rolls a skill. Nothing is spent when MP is short.
    ///
    /// The returned amount has not been applied to anyone yet.
    pub fn use_skill(
        &mut self,
        skill: &Skill,
        rng: &mut GameRng,
    ) -> Result<SkillOutcome, InsufficientResource> {
        self.stats.spend_mp(skill.cost)?;
        let amount = skill.roll_amount(&self.stats, rng);
        Ok(SkillOutcome {
            skill: skill.kind,
            message: format!("{} {}!", self.name, skill.announce),
            amount,
        })
    }

    pub(crate) fn add_item(&mut self, item: ItemKind) {
        self.inventory.push(item);
    }

    pub(crate) fn take_item(&mut self, index: usize) -> Option<ItemKind> {
        if index < self.inventory.len() {
            Some(self.inventory.remove(index))
        } else {
            None
        }
    }

    /// Equips an item, returning what previously occupied the slot.
    ///
    /// Gear bonuses are recomputed from the full equipment set.
    pub(crate) fn equip(&mut self, item: ItemKind) -> Result<Option<ItemKind>, IllegalAction> {
        let slot = item.slot().ok_or(IllegalAction::NotEquippable)?;
        let previous = self.equipment.slot_mut(slot).replace(item);
        self.stats.set_gear(self.equipment.gear_bonus());
        Ok(previous)
    }
}

/// Owner of every entity in a session.
///
/// Entities are never removed mid-floor, so an [`EntityId`] stays valid
/// until the arena is truncated on a floor change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityArena(Vec<Entity>);

impl EntityArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and returns its handle.
    pub fn push(&mut self, entity: Entity) -> EntityId {
        self.0.push(entity);
        EntityId(self.0.len() - 1)
    }

    /// Entity behind `id`, if the handle is valid.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.0.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.0.get_mut(id.0)
    }

    /// Number of entities ever pushed, living or dead.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no entity has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entities with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.0.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }

    /// Whether the entity exists and is alive.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_alive)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}
