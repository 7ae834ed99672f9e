//! # Item Generation
//!
//! The item table and loot rolls for chests and defeated enemies.

use crate::{Ability, GameRng, GearBonus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every item that can drop or be carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealthPotion,
    ManaPotion,
    ScrollOfFireball,
    IronSword,
    SteelSword,
    ArcaneStaff,
    LeatherArmor,
    ChainMail,
    RingOfPower,
    AmuletOfLife,
}

/// Equipment slot an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

/// What a consumable does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumable {
    /// Restore hit points
    Heal { formula: &'static str },
    /// Restore mana
    RestoreMana { formula: &'static str },
    /// Deal fire damage to one enemy; only usable in combat
    Fireball { formula: &'static str },
}

impl ItemKind {
    /// All item kinds.
    pub const ALL: [ItemKind; 10] = [
        ItemKind::HealthPotion,
        ItemKind::ManaPotion,
        ItemKind::ScrollOfFireball,
        ItemKind::IronSword,
        ItemKind::SteelSword,
        ItemKind::ArcaneStaff,
        ItemKind::LeatherArmor,
        ItemKind::ChainMail,
        ItemKind::RingOfPower,
        ItemKind::AmuletOfLife,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::HealthPotion => "Health Potion",
            ItemKind::ManaPotion => "Mana Potion",
            ItemKind::ScrollOfFireball => "Scroll of Fireball",
            ItemKind::IronSword => "Iron Sword",
            ItemKind::SteelSword => "Steel Sword",
            ItemKind::ArcaneStaff => "Arcane Staff",
            ItemKind::LeatherArmor => "Leather Armor",
            ItemKind::ChainMail => "Chain Mail",
            ItemKind::RingOfPower => "Ring of Power",
            ItemKind::AmuletOfLife => "Amulet of Life",
        }
    }

    /// The slot this item equips into, or `None` for consumables.
    pub fn slot(self) -> Option<EquipSlot> {
        match self {
            ItemKind::IronSword | ItemKind::SteelSword | ItemKind::ArcaneStaff => {
                Some(EquipSlot::Weapon)
            }
            ItemKind::LeatherArmor | ItemKind::ChainMail => Some(EquipSlot::Armor),
            ItemKind::RingOfPower | ItemKind::AmuletOfLife => Some(EquipSlot::Accessory),
            ItemKind::HealthPotion | ItemKind::ManaPotion | ItemKind::ScrollOfFireball => None,
        }
    }

    /// The effect of a consumable, or `None` for equipment.
    pub fn consumable(self) -> Option<Consumable> {
        match self {
            ItemKind::HealthPotion => Some(Consumable::Heal { formula: "2d8+4" }),
            ItemKind::ManaPotion => Some(Consumable::RestoreMana { formula: "2d6+3" }),
            ItemKind::ScrollOfFireball => Some(Consumable::Fireball { formula: "3d6" }),
            _ => None,
        }
    }

    /// Attack dice of a weapon; these replace the wielder's basic attack dice.
    pub fn attack_dice(self) -> Option<&'static str> {
        match self {
            ItemKind::IronSword => Some("1d8+1"),
            ItemKind::SteelSword => Some("1d10+2"),
            ItemKind::ArcaneStaff => Some("1d6+3"),
            _ => None,
        }
    }

    /// Passive bonus granted while equipped.
    pub fn gear_bonus(self) -> GearBonus {
        match self {
            ItemKind::LeatherArmor => GearBonus {
                armor: 2,
                ..GearBonus::default()
            },
            ItemKind::ChainMail => GearBonus {
                armor: 4,
                ..GearBonus::default()
            },
            ItemKind::RingOfPower => GearBonus::default()
                .with_ability(Ability::Strength, 2)
                .with_ability(Ability::Intelligence, 2),
            ItemKind::AmuletOfLife => GearBonus {
                max_hp: 20,
                ..GearBonus::default()
            },
            _ => GearBonus::default(),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gold and items produced by one loot roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    /// Gold found
    pub gold: u32,
    /// Items found
    pub items: Vec<ItemKind>,
}

/// Rolls loot appropriate for `level`.
///
/// Gold is `(5..=15) * level`, five times that for bosses. A single roll
/// decides potions: under 0.3 gives a health potion, under 0.15 also a mana
/// potion. Equipment drops with chance `0.1 + 0.02 * level` from a pool that
/// widens at levels 3 and 5.
pub fn generate_loot(level: u32, boss: bool, rng: &mut GameRng) -> Loot {
    let level = level.max(1);
    let mut gold = rng.range(5, 15) as u32 * level;
    if boss {
        gold *= 5;
    }

    let mut items = Vec::new();
    let potion_roll = rng.range(0, 99);
    if potion_roll < 30 {
        items.push(ItemKind::HealthPotion);
    }
    if potion_roll < 15 {
        items.push(ItemKind::ManaPotion);
    }

    if rng.chance(0.1 + level as f64 * 0.02) {
        let mut pool = vec![ItemKind::IronSword, ItemKind::LeatherArmor];
        if level >= 3 {
            pool.extend([ItemKind::SteelSword, ItemKind::ChainMail, ItemKind::ArcaneStaff]);
        }
        if level >= 5 {
            pool.extend([ItemKind::RingOfPower, ItemKind::AmuletOfLife]);
        }
        if let Some(&item) = rng.choose(&pool) {
            items.push(item);
        }
    }

    Loot { gold, items }
}
