//! Snapshot handed to controllers at the decision point.
//!
//! Everything here is owned data, so a controller can hold it across an
//! await without borrowing the battle.

use super::roster::{CombatantId, Roster, Side};
use crate::ability::Targeting;
use crate::character::Combatant;
use crate::element::Element;

/// Public view of one combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantView {
    pub name: String,
    pub job_class: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub sp: i32,
    pub max_sp: i32,
    pub alive: bool,
    pub element: Element,
    pub status_effects: Vec<String>,
}

impl From<&Combatant> for CombatantView {
    fn from(c: &Combatant) -> Self {
        Self {
            name: c.name.clone(),
            job_class: c.job_class.clone(),
            level: c.level,
            hp: c.stats.hp,
            max_hp: c.stats.max_hp,
            mp: c.stats.mp,
            max_mp: c.stats.max_mp,
            sp: c.stats.sp,
            max_sp: c.stats.max_sp,
            alive: c.is_alive(),
            element: c.element,
            status_effects: c.status.names(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityOption {
    pub name: String,
    pub description: String,
    pub cost: i32,
    pub targeting: Targeting,
    /// Double Cast and Spell Echo also need a spell name.
    pub requires_spell: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemOption {
    pub name: String,
    pub description: String,
    pub count: usize,
    pub targeting: Targeting,
}

/// What the actor could do this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvailableActions {
    /// Skills the actor can afford with current SP.
    pub skills: Vec<AbilityOption>,
    /// Spells the actor can afford with current MP. Empty when silenced.
    pub spells: Vec<AbilityOption>,
    pub items: Vec<ItemOption>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionContext {
    pub actor_id: CombatantId,
    pub actor: CombatantView,
    /// Player characters may be driven by an external controller.
    pub is_player: bool,
    pub allies: Vec<CombatantView>,
    pub enemies: Vec<CombatantView>,
    pub available: AvailableActions,
    /// Forecast of upcoming actor names.
    pub turn_order: Vec<String>,
}

impl DecisionContext {
    pub(crate) fn build(roster: &Roster<'_>, actor_id: CombatantId, turn_order: Vec<String>) -> Self {
        let actor = roster.get(actor_id);
        let views = |side: Side| -> Vec<CombatantView> {
            roster.side(side).members.iter().map(CombatantView::from).collect()
        };

        let skills = actor
            .skills
            .iter()
            .filter(|s| s.sp_cost() <= actor.stats.sp)
            .map(|s| AbilityOption {
                name: s.name.clone(),
                description: s.kind.description().to_string(),
                cost: s.sp_cost(),
                targeting: s.targeting(),
                requires_spell: s.kind.requires_spell(),
            })
            .collect();

        let spells = if actor.flags.can_cast_spells {
            actor
                .affordable_spells()
                .map(|s| AbilityOption {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    cost: s.mp_cost(),
                    targeting: s.targeting(),
                    requires_spell: false,
                })
                .collect()
        } else {
            Vec::new()
        };

        let inventory = roster.side(actor_id.side);
        let items = inventory
            .item_counts()
            .into_iter()
            .filter_map(|(name, count)| {
                let item = inventory.inventory.iter().find(|i| i.name == name)?;
                Some(ItemOption {
                    description: item.description.clone(),
                    targeting: item.targeting(),
                    name,
                    count,
                })
            })
            .collect();

        Self {
            actor_id,
            actor: CombatantView::from(actor),
            is_player: actor.is_player(),
            allies: views(actor_id.side),
            enemies: views(actor_id.side.opposite()),
            available: AvailableActions {
                skills,
                spells,
                items,
            },
            turn_order,
        }
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &CombatantView> {
        self.enemies.iter().filter(|c| c.alive)
    }

    /// True if `name` belongs to any combatant in the battle, ignoring case
    /// the same way target lookup does.
    pub fn knows_combatant(&self, name: &str) -> bool {
        self.allies
            .iter()
            .chain(self.enemies.iter())
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }
}
