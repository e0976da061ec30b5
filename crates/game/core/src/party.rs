//! Player and enemy parties.
//!
//! Only main members fight. Backup members wait outside battle and can be
//! swapped in between fights. The main party never drops below one member.

use tracing::debug;

use crate::catalog::ItemCatalog;
use crate::character::Combatant;
use crate::config::GameConfig;
use crate::equipment::{Equipment, EquipmentSlot};
use crate::error::PartyError;
use crate::item::{Item, ItemKind, KeyItem};
use crate::rng::BattleRng;

/// Where [`Party::add_character`] placed a newcomer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Main,
    Backup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    pub members: Vec<Combatant>,
    pub backup: Vec<Combatant>,
    pub inventory: Vec<Item>,
    pub equipment_inventory: Vec<Equipment>,
    pub key_items: Vec<KeyItem>,
    pub currency: u64,
    main_limit: usize,
}

impl Party {
    /// Player party. Characters beyond the main limit start in backup.
    pub fn new(mut characters: Vec<Combatant>, main_limit: usize) -> Self {
        let main_limit = main_limit.max(1);
        let backup = if characters.len() > main_limit {
            characters.split_off(main_limit)
        } else {
            Vec::new()
        };
        Self {
            members: characters,
            backup,
            main_limit,
            ..Self::default()
        }
    }

    pub fn with_config(characters: Vec<Combatant>, config: &GameConfig) -> Self {
        Self::new(characters, config.main_party_limit)
    }

    /// Enemy party: every member fights, nothing in the inventory.
    pub fn enemies(members: Vec<Combatant>) -> Self {
        let main_limit = members.len().max(1);
        Self {
            members,
            main_limit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_currency(mut self, currency: u64) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn with_inventory(mut self, inventory: Vec<Item>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn main_limit(&self) -> usize {
        self.main_limit
    }

    pub fn leader(&self) -> Option<&Combatant> {
        self.members.first()
    }

    pub fn check_alive(&self) -> bool {
        self.members.iter().any(Combatant::is_alive)
    }

    pub fn names(&self) -> Vec<String> {
        self.members.iter().map(|c| c.name.clone()).collect()
    }

    pub fn avg_level(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|c| c.level as f64).sum::<f64>() / self.members.len() as f64
    }

    pub fn get(&self, name: &str) -> Option<&Combatant> {
        self.members
            .iter()
            .chain(self.backup.iter())
            .find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Combatant> {
        self.members
            .iter_mut()
            .chain(self.backup.iter_mut())
            .find(|c| c.name == name)
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Adds a character to the main party if there is room, otherwise to backup.
    pub fn add_character(&mut self, character: Combatant) -> Placement {
        if self.members.len() < self.main_limit {
            self.members.push(character);
            Placement::Main
        } else {
            self.backup.push(character);
            Placement::Backup
        }
    }

    /// Moves a backup member into the main party. When the main party is
    /// full, `replace` names the member that goes to backup in exchange.
    pub fn move_to_main(&mut self, name: &str, replace: Option<&str>) -> Result<(), PartyError> {
        if self.members.iter().any(|c| c.name == name) {
            return Err(PartyError::AlreadyInMainParty(name.to_string()));
        }
        let index = self
            .backup
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| PartyError::UnknownMember(name.to_string()))?;

        if self.members.len() >= self.main_limit {
            let replace = replace.ok_or(PartyError::MainPartyFull)?;
            let out = self
                .members
                .iter()
                .position(|c| c.name == replace)
                .ok_or_else(|| PartyError::UnknownMember(replace.to_string()))?;
            let swapped = self.members.remove(out);
            debug!(target: "game_core::party", name = %swapped.name, "moved to backup");
            self.backup.push(swapped);
        }

        let character = self.backup.remove(index);
        self.members.push(character);
        Ok(())
    }

    pub fn move_to_backup(&mut self, name: &str) -> Result<(), PartyError> {
        if self.backup.iter().any(|c| c.name == name) {
            return Err(PartyError::AlreadyInBackup(name.to_string()));
        }
        let index = self
            .members
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| PartyError::UnknownMember(name.to_string()))?;
        if self.members.len() <= 1 {
            return Err(PartyError::LastMainMember);
        }
        let character = self.members.remove(index);
        self.backup.push(character);
        Ok(())
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.iter().any(|i| i.matches(name))
    }

    /// Removes and returns one item with this name.
    pub fn take_item(&mut self, name: &str) -> Option<Item> {
        let index = self.inventory.iter().position(|i| i.matches(name))?;
        Some(self.inventory.remove(index))
    }

    /// Distinct item names with counts, in first-seen order.
    pub fn item_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for item in &self.inventory {
            match counts.iter_mut().find(|(name, _)| *name == item.name) {
                Some((_, count)) => *count += 1,
                None => counts.push((item.name.clone(), 1)),
            }
        }
        counts
    }

    /// Moves every member's stolen items into the shared inventory.
    pub fn collect_stolen_items(&mut self) -> usize {
        let mut moved = 0;
        for member in &mut self.members {
            if let Some(data) = member.player_data_mut() {
                moved += data.temp_inventory.len();
                self.inventory.append(&mut data.temp_inventory);
            }
        }
        moved
    }

    /// One random tier-1 healing, MP-restore and offensive item.
    pub fn stock_starter_items(&mut self, catalog: &ItemCatalog, rng: &mut impl BattleRng) {
        let wanted = [ItemKind::Healing, ItemKind::MpRestore, ItemKind::Offensive];
        for kind in wanted {
            let candidates: Vec<&Item> = catalog
                .iter()
                .filter(|item| item.tier == 1 && item.kind == kind)
                .collect();
            if let Some(index) = rng.pick_index(candidates.len()) {
                self.inventory.push(candidates[index].clone());
            }
        }
    }

    pub fn add_key_item(&mut self, item: KeyItem) {
        self.key_items.push(item);
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    pub fn add_equipment(&mut self, piece: Equipment) {
        self.equipment_inventory.push(piece);
    }

    /// Equips a piece from the equipment inventory on a member. The piece it
    /// replaces goes back into the inventory.
    pub fn equip_from_inventory(&mut self, member: &str, equipment: &str) -> Result<(), PartyError> {
        let index = self
            .equipment_inventory
            .iter()
            .position(|e| e.name == equipment)
            .ok_or_else(|| PartyError::UnknownEquipment(equipment.to_string()))?;
        if self.get(member).is_none() {
            return Err(PartyError::UnknownMember(member.to_string()));
        }
        let piece = self.equipment_inventory.remove(index);
        let replaced = self.get_mut(member).and_then(|c| c.equip(piece));
        self.equipment_inventory.extend(replaced);
        Ok(())
    }

    pub fn unequip_to_inventory(&mut self, member: &str, slot: EquipmentSlot) -> Result<Option<String>, PartyError> {
        let character = self
            .get_mut(member)
            .ok_or_else(|| PartyError::UnknownMember(member.to_string()))?;
        let piece = character.unequip(slot);
        let name = piece.as_ref().map(|p| p.name.clone());
        self.equipment_inventory.extend(piece);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::BaseClass;
    use crate::element::Element;
    use crate::stats::{StatDelta, StatKind};

    fn member(name: &str) -> Combatant {
        Combatant::player(name, "Wanderer", BaseClass::Kind, 1, &GameConfig::default())
    }

    fn party_of(names: &[&str]) -> Party {
        Party::new(names.iter().map(|n| member(n)).collect(), 3)
    }

    #[test]
    fn new_splits_main_and_backup() {
        let party = party_of(&["A", "B", "C", "D"]);
        assert_eq!(party.names(), vec!["A", "B", "C"]);
        assert_eq!(party.backup.len(), 1);
        assert_eq!(party.leader().map(|c| c.name.as_str()), Some("A"));
    }

    #[test]
    fn add_character_fills_main_then_backup() {
        let mut party = party_of(&["A", "B"]);
        assert_eq!(party.add_character(member("C")), Placement::Main);
        assert_eq!(party.add_character(member("D")), Placement::Backup);
    }

    #[test]
    fn move_to_main_requires_swap_when_full() {
        let mut party = party_of(&["A", "B", "C", "D"]);
        assert_eq!(party.move_to_main("D", None), Err(PartyError::MainPartyFull));
        party.move_to_main("D", Some("B")).unwrap();
        assert_eq!(party.names(), vec!["A", "C", "D"]);
        assert_eq!(party.backup[0].name, "B");
    }

    #[test]
    fn last_main_member_stays() {
        let mut party = party_of(&["A"]);
        assert_eq!(party.move_to_backup("A"), Err(PartyError::LastMainMember));
        assert_eq!(party.move_to_backup("Z"), Err(PartyError::UnknownMember("Z".into())));
    }

    #[test]
    fn take_item_removes_one_copy() {
        let mut party = party_of(&["A"]);
        party.add_item(Item::new("Potion", "", 1, ItemKind::Healing));
        party.add_item(Item::new("Potion", "", 1, ItemKind::Healing));
        assert!(party.take_item("potion").is_some());
        assert_eq!(party.item_counts(), vec![("Potion".to_string(), 1)]);
        assert!(party.take_item("Elixir").is_none());
    }

    #[test]
    fn equip_from_inventory_swaps_pieces() {
        let mut party = party_of(&["A"]);
        let old = Equipment::new("Stick", "", EquipmentSlot::Weapon, StatDelta::single(StatKind::Attack, 1), Element::None);
        let new = Equipment::new("Spear", "", EquipmentSlot::Weapon, StatDelta::single(StatKind::Attack, 5), Element::Wind);
        party.add_equipment(old);
        party.add_equipment(new);
        party.equip_from_inventory("A", "Stick").unwrap();
        party.equip_from_inventory("A", "Spear").unwrap();

        let names: Vec<&str> = party.equipment_inventory.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Stick"]);
        assert_eq!(party.get("A").map(|c| c.attack_element()), Some(Element::Wind));
    }
}
