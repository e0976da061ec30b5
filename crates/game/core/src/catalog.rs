//! Injected spell and item catalogs.
//!
//! Catalogs are plain values built by `game-content` loaders (or by tests)
//! and passed by reference into the rules. Lookups are case-insensitive.

use crate::ability::{BaseClass, Spell, SpellCategory};
use crate::error::CatalogError;
use crate::item::Item;
use crate::rng::BattleRng;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCatalog {
    spells: Vec<Spell>,
}

impl SpellCatalog {
    pub fn new(spells: Vec<Spell>) -> Self {
        Self { spells }
    }

    pub fn get(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.matches(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Spell, CatalogError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownSpell(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.spells.iter().map(|s| s.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.iter()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn by_tier(&self, tier: u32) -> impl Iterator<Item = &Spell> {
        self.spells.iter().filter(move |s| s.tier == tier)
    }

    /// Keeps only the names present in the catalog, resolving each to its
    /// catalog entry. Generated enemies use this to drop invented spells.
    pub fn filter_known<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<Spell> {
        names
            .into_iter()
            .filter_map(|name| self.get(name).cloned())
            .collect()
    }

    /// One random tier-1 spell for each category the base class may use.
    pub fn starter_spells(&self, base_class: BaseClass, rng: &mut impl BattleRng) -> Vec<Spell> {
        let mut spells = Vec::new();
        for category in base_class.spell_categories() {
            let candidates: Vec<&Spell> = self
                .by_tier(1)
                .filter(|s| s.category() == *category)
                .collect();
            if let Some(index) = rng.pick_index(candidates.len()) {
                spells.push(candidates[index].clone());
            }
        }
        spells
    }

    pub fn count_in(&self, category: SpellCategory) -> usize {
        self.spells.iter().filter(|s| s.category() == category).count()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.matches(name))
    }

    /// A fresh copy of the named item.
    pub fn create(&self, name: &str) -> Result<Item, CatalogError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownItem(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|i| i.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Up to `count` distinct items chosen uniformly without replacement.
    pub fn sample(&self, count: usize, rng: &mut impl BattleRng) -> Vec<Item> {
        let mut pool: Vec<&Item> = self.items.iter().collect();
        let mut picked = Vec::new();
        while picked.len() < count {
            let Some(index) = rng.pick_index(pool.len()) else {
                break;
            };
            picked.push(pool.swap_remove(index).clone());
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::SpellEffect;
    use crate::element::Element;
    use crate::item::ItemKind;
    use crate::rng::SequenceRng;
    use crate::status::EffectTemplate;

    fn spells() -> SpellCatalog {
        SpellCatalog::new(vec![
            Spell::new("Ember", "", 1, SpellEffect::Elemental { element: Element::Fire }),
            Spell::new("Frost", "", 1, SpellEffect::Elemental { element: Element::Ice }),
            Spell::new("Lull", "", 1, SpellEffect::Status { effect: EffectTemplate::Sleep }),
            Spell::new("Mend", "", 1, SpellEffect::Healing { revives: false }),
            Spell::new("Inferno", "", 3, SpellEffect::Elemental { element: Element::Fire }),
        ])
    }

    #[test]
    fn starter_spells_pick_one_per_category() {
        let mut rng = SequenceRng::constant(0.99);
        let starters = spells().starter_spells(BaseClass::Clever, &mut rng);
        let names: Vec<&str> = starters.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Frost", "Lull"]);

        let none = spells().starter_spells(BaseClass::Carefree, &mut rng);
        assert!(none.is_empty());
    }

    #[test]
    fn filter_known_drops_invented_spells() {
        let known = spells().filter_known(["ember", "Meteor Swarm", "Inferno"]);
        let names: Vec<&str> = known.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ember", "Inferno"]);
        assert!(matches!(spells().lookup("Meteor Swarm"), Err(CatalogError::UnknownSpell(_))));
    }

    #[test]
    fn sample_never_repeats() {
        let catalog = ItemCatalog::new(vec![
            Item::new("Potion", "", 1, ItemKind::Healing),
            Item::new("Ether", "", 1, ItemKind::MpRestore),
        ]);
        let mut rng = SequenceRng::constant(0.0);
        let picked = catalog.sample(5, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0].name, picked[1].name);
    }
}
