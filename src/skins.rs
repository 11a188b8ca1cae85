//! Skin catalog and the persisted unlock record
//!
//! Skill skins carry exactly one skill. `classic` is free and can never
//! be locked.

use serde::{Deserialize, Serialize};

use crate::sim::powerup::Rarity;
use crate::sim::skill::{self, Skill};

pub const DEFAULT_SKIN_ID: &str = "classic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinCategory {
    Basic,
    Normal,
    Skill,
}

/// A purchasable avatar look
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Skin {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub rarity: Rarity,
    pub category: SkinCategory,
    /// Primary body color, 0xRRGGBB
    pub color: u32,
    pub skill: Option<&'static Skill>,
}

const fn cosmetic(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: u32,
    rarity: Rarity,
    category: SkinCategory,
    color: u32,
) -> Skin {
    Skin {
        id,
        name,
        description,
        price,
        rarity,
        category,
        color,
        skill: None,
    }
}

const fn with_skill(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: u32,
    color: u32,
    skill: &'static Skill,
) -> Skin {
    Skin {
        id,
        name,
        description,
        price,
        rarity: Rarity::Legendary,
        category: SkinCategory::Skill,
        color,
        skill: Some(skill),
    }
}

#[rustfmt::skip]
pub static SKINS: [Skin; 16] = [
    cosmetic("classic", "Classic", "The classic blue flyer", 0, Rarity::Common, SkinCategory::Basic, 0x3B82F6),
    cosmetic("fire_basic", "Blaze", "Red-hot and eager", 300, Rarity::Common, SkinCategory::Basic, 0xEF4444),
    cosmetic("frost_basic", "Frost", "Cool blue and white", 300, Rarity::Common, SkinCategory::Basic, 0x87CEEB),
    cosmetic("rainbow", "Rainbow", "Every color at once", 500, Rarity::Rare, SkinCategory::Normal, 0xF59E0B),
    cosmetic("gold", "Gold", "Solid gold luxury", 800, Rarity::Rare, SkinCategory::Normal, 0xFFD700),
    cosmetic("night", "Night Sky", "Deep blue with stars", 600, Rarity::Rare, SkinCategory::Normal, 0x1E1B4B),
    cosmetic("halloween", "Pumpkin", "Orange and spooky", 700, Rarity::Rare, SkinCategory::Normal, 0xF97316),
    cosmetic("diamond", "Diamond", "Clear crystal, rare and precious", 1000, Rarity::Epic, SkinCategory::Normal, 0xE0E7FF),
    with_skill("storm_bird", "Storm", "Dashes through the air ignoring gravity", 1200, 0x06B6D4, &skill::STORM),
    with_skill("lightning_bird", "Thunder", "Blinks forward through obstacles", 1500, 0x8B5CF6, &skill::LIGHTNING),
    with_skill("flame_bird", "Inferno", "Burns down the next obstacle", 1800, 0xFF4500, &skill::FLAME),
    with_skill("frost_bird", "Glacier", "Freezes every obstacle in place", 2000, 0x67E8F9, &skill::FROST),
    with_skill("gravity_bird", "Graviton", "Flips gravity for a few seconds", 2200, 0x9333EA, &skill::GRAVITY),
    with_skill("shield_bird", "Guardian", "Shrugs off any hit for a moment", 2400, 0xFFD700, &skill::SHIELD),
    with_skill("mini_bird", "Mini", "Shrinks to slip through tight gaps", 2600, 0xEC4899, &skill::SHRINK),
    with_skill("magnet_bird", "Magneto", "Pulls in every coin nearby", 2800, 0x8A2BE2, &skill::MAGNET),
];

pub fn skin_by_id(id: &str) -> Option<&'static Skin> {
    SKINS.iter().find(|s| s.id == id)
}

pub fn default_skin() -> &'static Skin {
    &SKINS[0]
}

/// Persisted unlock state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkinUnlocks {
    #[serde(alias = "unlockedSkins")]
    pub unlocked_ids: Vec<String>,
    #[serde(alias = "currentSkin")]
    pub current_id: String,
    #[serde(alias = "purchaseHistory")]
    pub purchase_log: Vec<String>,
}

impl Default for SkinUnlocks {
    fn default() -> Self {
        Self {
            unlocked_ids: vec![DEFAULT_SKIN_ID.to_string()],
            current_id: DEFAULT_SKIN_ID.to_string(),
            purchase_log: Vec::new(),
        }
    }
}

impl SkinUnlocks {
    /// Repair a record read from storage
    ///
    /// Unknown and duplicate ids are dropped, `classic` is always present
    /// and the current skin must be an unlocked, known skin.
    pub fn sanitize(mut self) -> Self {
        let mut seen = Vec::new();
        self.unlocked_ids.retain(|id| {
            let keep = skin_by_id(id).is_some() && !seen.contains(id);
            if keep {
                seen.push(id.clone());
            }
            keep
        });
        if !self.unlocked_ids.iter().any(|id| id == DEFAULT_SKIN_ID) {
            self.unlocked_ids.insert(0, DEFAULT_SKIN_ID.to_string());
        }
        if !self.is_unlocked(&self.current_id) || skin_by_id(&self.current_id).is_none() {
            log::warn!("Current skin `{}` not available, using classic", self.current_id);
            self.current_id = DEFAULT_SKIN_ID.to_string();
        }
        self
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        id == DEFAULT_SKIN_ID || self.unlocked_ids.iter().any(|u| u == id)
    }

    /// Record a purchase; false if already owned
    pub fn unlock(&mut self, id: &str) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked_ids.push(id.to_string());
        self.purchase_log.push(id.to_string());
        true
    }

    /// Equip an owned skin
    pub fn select(&mut self, id: &str) -> bool {
        if !self.is_unlocked(id) || skin_by_id(id).is_none() {
            return false;
        }
        self.current_id = id.to_string();
        true
    }

    pub fn current(&self) -> &'static Skin {
        skin_by_id(&self.current_id).unwrap_or_else(default_skin)
    }

    /// Owned skins in catalog order
    pub fn owned(&self) -> impl Iterator<Item = &'static Skin> + '_ {
        SKINS.iter().filter(|s| self.is_unlocked(s.id))
    }
}
