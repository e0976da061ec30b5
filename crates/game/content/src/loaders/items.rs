//! Item catalog loader.

use std::path::Path;

use game_core::{Item, ItemCatalog, ItemKind, SpellCatalog};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_ITEMS: &str = include_str!("../../data/items.ron");

/// Item kind as written in data files. Spell books refer to spells by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKindEntry {
    Healing,
    MpRestore,
    StatusRecovery,
    Offensive,
    Revive,
    SpellBook { spell: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tier: u32,
    pub kind: ItemKindEntry,
}

impl ItemEntry {
    /// Resolves the entry; `None` when a spell book names an unknown spell.
    fn resolve(self, spells: &SpellCatalog) -> Option<Item> {
        let kind = match self.kind {
            ItemKindEntry::Healing => ItemKind::Healing,
            ItemKindEntry::MpRestore => ItemKind::MpRestore,
            ItemKindEntry::StatusRecovery => ItemKind::StatusRecovery,
            ItemKindEntry::Offensive => ItemKind::Offensive,
            ItemKindEntry::Revive => ItemKind::Revive,
            ItemKindEntry::SpellBook { spell } => {
                let Some(spell) = spells.get(&spell).cloned() else {
                    warn!(target: "game_content", item = %self.name, %spell, "spell book for unknown spell skipped");
                    return None;
                };
                ItemKind::SpellBook { spell }
            }
        };
        Some(Item::new(self.name, self.description, self.tier.max(1), kind))
    }
}

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalogFile {
    pub items: Vec<ItemEntry>,
}

/// Loader for the item catalog from RON files.
pub struct ItemLoader;

impl ItemLoader {
    pub fn load(path: &Path, spells: &SpellCatalog) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, spells)
    }

    pub fn parse(content: &str, spells: &SpellCatalog) -> LoadResult<ItemCatalog> {
        let file: ItemCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        let items = file
            .items
            .into_iter()
            .filter_map(|entry| entry.resolve(spells))
            .collect();
        Ok(ItemCatalog::new(items))
    }

    pub fn embedded(spells: &SpellCatalog) -> LoadResult<ItemCatalog> {
        Self::parse(EMBEDDED_ITEMS, spells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::SpellLoader;

    #[test]
    fn spell_books_resolve_against_spells() {
        let spells = SpellLoader::embedded().unwrap();
        let items = ItemLoader::embedded(&spells).unwrap();

        let tome = items.get("Tome of Fire").unwrap();
        match &tome.kind {
            ItemKind::SpellBook { spell } => assert_eq!(spell.name, "Fireball"),
            other => panic!("expected a spell book, got {other:?}"),
        }
        assert_eq!(items.get("potion").map(|i| i.heal_amount()), Some(50));
        assert_eq!(items.get("Phoenix Plume").map(|i| i.revive_fraction()), Some(0.5));
    }

    #[test]
    fn unknown_spell_book_is_dropped() {
        let items = ItemLoader::parse(
            r#"(items: [
                (name: "Potion", tier: 1, kind: Healing),
                (name: "Tome of Nothing", tier: 1, kind: SpellBook(spell: "Nothing")),
            ])"#,
            &SpellCatalog::default(),
        )
        .unwrap();
        assert_eq!(items.names(), vec!["Potion".to_string()]);
    }
}
