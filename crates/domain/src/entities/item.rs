//! Equipment entities - weapons, armor and carried items
//!
//! These mirror the loadout fields of a character document. They are plain
//! data structs except where an invariant has to hold: a broken armor piece
//! protects for nothing, and a weapon that tracks ammo refuses to fire empty.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FireError;
use crate::lenient;

/// Free-form keyword parameter value (e.g., `ammoMax: 6`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordParam {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl KeywordParam {
    /// Reads the value as a non-negative whole number, accepting numeric text.
    pub fn as_count(&self) -> Option<u32> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Flag(_) => return None,
        };
        (value.is_finite() && value >= 0.0).then(|| value.trunc() as u32)
    }
}

fn default_use_dc() -> i32 {
    8
}

fn use_dc_or_default<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient::optional_int(deserializer)?.unwrap_or_else(default_use_dc))
}

/// A weapon in the character's loadout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Skill used to attack with this weapon
    #[serde(default, deserialize_with = "lenient::text")]
    pub skill_id: String,
    /// Target number an attack roll has to reach
    #[serde(
        rename = "useDC",
        default = "default_use_dc",
        deserialize_with = "use_dc_or_default"
    )]
    pub use_dc: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub damage: i32,
    #[serde(default, deserialize_with = "lenient::list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::map")]
    pub keyword_params: HashMap<String, KeywordParam>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub range: Option<String>,
    /// Rounds currently loaded
    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub ammo: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub bulk: Option<u32>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, skill_id: impl Into<String>, use_dc: i32, damage: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            skill_id: skill_id.into(),
            use_dc,
            damage,
            keywords: Vec::new(),
            keyword_params: HashMap::new(),
            range: None,
            ammo: None,
            bulk: None,
        }
    }

    /// Configures a magazine and fills it.
    pub fn with_ammo_max(mut self, max: u32) -> Self {
        self.keyword_params
            .insert(AMMO_MAX_KEY.to_string(), KeywordParam::Number(max as f64));
        self.ammo = Some(max);
        self
    }

    /// Configured magazine size; 0 means the weapon does not track ammo.
    pub fn ammo_max(&self) -> u32 {
        self.keyword_params
            .get(AMMO_MAX_KEY)
            .and_then(KeywordParam::as_count)
            .unwrap_or(0)
    }

    pub fn tracks_ammo(&self) -> bool {
        self.ammo_max() > 0
    }

    /// Fails when the weapon tracks ammo and the magazine is empty.
    pub fn ensure_can_fire(&self) -> Result<(), FireError> {
        if self.tracks_ammo() && self.ammo.unwrap_or(0) == 0 {
            tracing::debug!(weapon = %self.name, "refusing to fire: out of ammo");
            return Err(FireError::OutOfAmmo {
                weapon: self.display_name().to_string(),
            });
        }
        Ok(())
    }

    /// Spends one round. Weapons without a magazine fire freely.
    pub fn fire(&mut self) -> Result<(), FireError> {
        self.ensure_can_fire()?;
        if self.tracks_ammo() {
            self.ammo = Some(self.ammo.unwrap_or(0).saturating_sub(1));
        }
        Ok(())
    }

    pub fn reload(&mut self) {
        if self.tracks_ammo() {
            self.ammo = Some(self.ammo_max());
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Attack"
        } else {
            &self.name
        }
    }
}

const AMMO_MAX_KEY: &str = "ammoMax";

/// Durability counter of an armor piece
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    #[serde(default, deserialize_with = "lenient::count")]
    pub current: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub max: u32,
}

/// Worn armor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Armor {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub protection: u32,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub durability: Durability,
    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub bulk: Option<u32>,
}

impl Armor {
    pub fn new(name: impl Into<String>, protection: u32, durability: u32) -> Self {
        Self {
            name: name.into(),
            protection,
            durability: Durability {
                current: durability,
                max: durability,
            },
            bulk: None,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.durability.current == 0
    }

    /// Protection that actually applies to an incoming hit.
    ///
    /// Broken armor protects for 0 whatever its stated value.
    pub fn effective_protection(&self, unmitigated: bool) -> u32 {
        if unmitigated || self.is_broken() {
            0
        } else {
            self.protection
        }
    }

    /// Loses one point of durability, never going below zero.
    pub fn wear(&mut self) {
        self.durability.current = self.durability.current.saturating_sub(1);
    }
}

/// A feat; only its status text matters to the rules engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feat {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Comma-separated status effects, e.g. "carrying_capacity+5, stealth+1"
    #[serde(default, deserialize_with = "lenient::text")]
    pub status_effects: String,
}

/// Kind of carried item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Item,
    Cyberware,
    Narcotics,
}

fn default_quantity() -> i64 {
    1
}

fn quantity_or_default<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient::optional_wide_int(deserializer)?.unwrap_or_else(default_quantity))
}

/// An inventory entry. Kind-specific fields are left to the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub kind: ItemKind,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_default")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient::wide_int")]
    pub bulk: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status_effects: String,
}

impl InventoryItem {
    /// Bulk contributed by the whole stack.
    pub fn total_bulk(&self) -> i64 {
        self.bulk.saturating_mul(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_without_magazine_always_fires() {
        let mut knife = Weapon::new("Knife", "melee_(sharp)", 8, 3);
        assert!(knife.fire().is_ok());
        assert!(knife.fire().is_ok());
        assert_eq!(knife.ammo, None);
    }

    #[test]
    fn test_firing_spends_one_round() {
        let mut pistol = Weapon::new("Sidearm", "pistols", 9, 4).with_ammo_max(2);
        pistol.fire().expect("first shot");
        assert_eq!(pistol.ammo, Some(1));
        pistol.fire().expect("second shot");
        assert_eq!(pistol.ammo, Some(0));
    }

    #[test]
    fn test_empty_magazine_refuses_to_fire() {
        let mut pistol = Weapon::new("Sidearm", "pistols", 9, 4).with_ammo_max(1);
        pistol.ammo = Some(0);
        assert_eq!(
            pistol.fire(),
            Err(FireError::OutOfAmmo {
                weapon: "Sidearm".to_string()
            })
        );
        assert_eq!(pistol.ammo, Some(0));
    }

    #[test]
    fn test_reload_resets_to_max() {
        let mut rifle = Weapon::new("Carbine", "rifles", 10, 6).with_ammo_max(5);
        rifle.ammo = Some(1);
        rifle.reload();
        assert_eq!(rifle.ammo, Some(5));
    }

    #[test]
    fn test_ammo_max_accepts_numeric_text() {
        let json = r#"{"name":"Shotgun","skillId":"rifles","damage":5,"keywordParams":{"ammoMax":"4"},"ammo":2}"#;
        let weapon: Weapon = serde_json::from_str(json).expect("parse");
        assert_eq!(weapon.ammo_max(), 4);
        assert_eq!(weapon.use_dc, 8);
    }

    #[test]
    fn test_malformed_weapon_fields_fall_back() {
        let json = r#"{"name":"Sidearm","skillId":"pistols","useDC":null,"damage":4.5,"ammo":-1,"bulk":"2","keywords":["Burst",3],"keywordParams":{"ammoMax":6,"odd":null}}"#;
        let weapon: Weapon = serde_json::from_str(json).expect("parse");
        assert_eq!(weapon.use_dc, 8);
        assert_eq!(weapon.damage, 4);
        assert_eq!(weapon.ammo, Some(0));
        assert_eq!(weapon.bulk, Some(2));
        assert_eq!(weapon.keywords, vec!["Burst".to_string()]);
        assert_eq!(weapon.ammo_max(), 6);
        assert!(!weapon.keyword_params.contains_key("odd"));
        assert!(weapon.ensure_can_fire().is_err());
    }

    #[test]
    fn test_malformed_armor_and_items_fall_back() {
        let armor: Armor = serde_json::from_str(r#"{"name":"Vest","protection":-2,"durability":{"current":"1","max":2.9}}"#)
            .expect("parse");
        assert_eq!(armor.protection, 0);
        assert_eq!(armor.durability, Durability { current: 1, max: 2 });

        let armor: Armor = serde_json::from_str(r#"{"durability":"worn","bulk":null}"#).expect("parse");
        assert_eq!(armor.durability, Durability::default());
        assert_eq!(armor.bulk, None);

        let item: InventoryItem = serde_json::from_str(r#"{"type":"gadget","quantity":null,"bulk":1.5,"statusEffects":null}"#)
            .expect("parse");
        assert_eq!(item.kind, ItemKind::Item);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.total_bulk(), 1);
        assert_eq!(item.status_effects, "");

        let feat: Feat = serde_json::from_str(r#"{"name":"Tough","statusEffects":null}"#).expect("parse");
        assert_eq!(feat.status_effects, "");
    }

    #[test]
    fn test_huge_stacks_saturate_bulk() {
        let item = InventoryItem {
            kind: ItemKind::Item,
            name: "Crates".into(),
            quantity: i64::MAX,
            bulk: 2,
            status_effects: String::new(),
        };
        assert_eq!(item.total_bulk(), i64::MAX);
    }

    #[test]
    fn test_broken_armor_ignores_protection() {
        let mut vest = Armor::new("Vest", 3, 1);
        assert_eq!(vest.effective_protection(false), 3);
        assert_eq!(vest.effective_protection(true), 0);
        vest.wear();
        assert!(vest.is_broken());
        assert_eq!(vest.effective_protection(false), 0);
        vest.wear();
        assert_eq!(vest.durability.current, 0);
    }

    #[test]
    fn test_inventory_bulk_scales_with_quantity() {
        let json = r#"{"type":"narcotics","name":"Stim","quantity":3,"bulk":1,"statusEffects":"ref+1"}"#;
        let item: InventoryItem = serde_json::from_str(json).expect("parse");
        assert_eq!(item.kind, ItemKind::Narcotics);
        assert_eq!(item.total_bulk(), 3);
    }
}
