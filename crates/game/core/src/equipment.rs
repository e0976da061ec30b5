//! Weapons, armor and accessories.
//!
//! Equipping applies the piece's stat modifiers; unequipping subtracts the
//! same modifiers. A weapon's element overrides the wearer's innate element
//! on attack, an armor's element on defense.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::element::Element;
use crate::stats::{StatBiases, StatDelta, StatKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Accessory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub name: String,
    pub description: String,
    pub slot: EquipmentSlot,
    pub modifiers: StatDelta,
    pub element: Element,
}

impl Equipment {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        slot: EquipmentSlot,
        modifiers: StatDelta,
        element: Element,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            slot,
            modifiers,
            element,
        }
    }

    /// Rolls modifiers for a piece of `level` gear: `base × bias × √level`.
    pub fn generate(
        name: impl Into<String>,
        description: impl Into<String>,
        slot: EquipmentSlot,
        biases: &StatBiases,
        level: u32,
        element: Element,
    ) -> Self {
        const MULTIPLIERS: [f64; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];
        let modifiers = StatDelta::from_pairs(StatKind::iter().map(|kind| {
            let base = match kind {
                StatKind::MaxHp => 10.0,
                StatKind::MaxMp => 5.0,
                _ => 2.0,
            };
            let multiplier = MULTIPLIERS[usize::from(biases.get(kind)).min(MULTIPLIERS.len() - 1)];
            (kind, (base * multiplier * (level.max(1) as f64).sqrt()) as i32)
        }));
        Self::new(name, description, slot, modifiers, element)
    }
}

/// Gear currently worn by a combatant, one piece per slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub weapon: Option<Equipment>,
    pub armor: Option<Equipment>,
    pub accessory: Option<Equipment>,
}

impl Loadout {
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Equipment> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.as_ref(),
            EquipmentSlot::Armor => self.armor.as_ref(),
            EquipmentSlot::Accessory => self.accessory.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Equipment> {
        match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Accessory => &mut self.accessory,
        }
    }

    /// Puts `piece` in its slot and returns whatever was there.
    pub fn replace(&mut self, piece: Equipment) -> Option<Equipment> {
        self.slot_mut(piece.slot).replace(piece)
    }

    pub fn take(&mut self, slot: EquipmentSlot) -> Option<Equipment> {
        self.slot_mut(slot).take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        [&self.weapon, &self.armor, &self.accessory]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    /// Sum of all worn modifiers.
    pub fn total_modifiers(&self) -> StatDelta {
        StatDelta::from_pairs(self.iter().flat_map(|piece| piece.modifiers.iter().collect::<Vec<_>>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_modifiers_scale_with_root_level() {
        let biases = StatBiases::neutral().with(StatKind::Attack, 4);
        let sword = Equipment::generate("Sword", "", EquipmentSlot::Weapon, &biases, 4, Element::Fire);
        assert_eq!(sword.modifiers.get(StatKind::Attack), 6);
        assert_eq!(sword.modifiers.get(StatKind::MaxHp), 20);
        assert_eq!(sword.modifiers.get(StatKind::Luck), 4);
    }

    #[test]
    fn replace_returns_previous_piece() {
        let mut loadout = Loadout::default();
        let a = Equipment::new("A", "", EquipmentSlot::Armor, StatDelta::single(StatKind::Defense, 3), Element::None);
        let b = Equipment::new("B", "", EquipmentSlot::Armor, StatDelta::single(StatKind::Defense, 5), Element::Ice);
        assert!(loadout.replace(a.clone()).is_none());
        assert_eq!(loadout.replace(b), Some(a));
        assert_eq!(loadout.total_modifiers().get(StatKind::Defense), 5);
    }
}
