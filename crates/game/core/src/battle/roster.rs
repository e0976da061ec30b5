//! Combatant addressing inside a battle.
//!
//! The roster order is every ally followed by every enemy, each in party
//! order. Scheduling ties, positional targets and forecasts all use it.

use crate::character::Combatant;
use crate::party::Party;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The player's party.
    Allies,
    Enemies,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::Allies => Side::Enemies,
            Side::Enemies => Side::Allies,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId {
    pub side: Side,
    pub index: usize,
}

impl CombatantId {
    pub const fn ally(index: usize) -> Self {
        Self {
            side: Side::Allies,
            index,
        }
    }

    pub const fn enemy(index: usize) -> Self {
        Self {
            side: Side::Enemies,
            index,
        }
    }
}

/// The player party (borrowed for the battle) and the enemy party (owned).
#[derive(Debug)]
pub struct Roster<'p> {
    party: &'p mut Party,
    enemies: Party,
}

impl<'p> Roster<'p> {
    pub fn new(party: &'p mut Party, enemies: Party) -> Self {
        Self { party, enemies }
    }

    pub fn side(&self, side: Side) -> &Party {
        match side {
            Side::Allies => &*self.party,
            Side::Enemies => &self.enemies,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Party {
        match side {
            Side::Allies => &mut *self.party,
            Side::Enemies => &mut self.enemies,
        }
    }

    pub fn party(&self) -> &Party {
        &*self.party
    }

    pub fn party_mut(&mut self) -> &mut Party {
        &mut *self.party
    }

    pub fn enemies(&self) -> &Party {
        &self.enemies
    }

    pub fn into_enemies(self) -> Party {
        self.enemies
    }

    pub fn get(&self, id: CombatantId) -> &Combatant {
        &self.side(id.side).members[id.index]
    }

    pub fn get_mut(&mut self, id: CombatantId) -> &mut Combatant {
        &mut self.side_mut(id.side).members[id.index]
    }

    pub fn len(&self) -> usize {
        self.party.members.len() + self.enemies.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All ids in roster order.
    pub fn ids(&self) -> Vec<CombatantId> {
        (0..self.party.members.len())
            .map(CombatantId::ally)
            .chain((0..self.enemies.members.len()).map(CombatantId::enemy))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CombatantId, &Combatant)> {
        self.ids().into_iter().map(move |id| (id, self.get(id)))
    }

    /// Flat roster position of `id`.
    pub fn position(&self, id: CombatantId) -> usize {
        match id.side {
            Side::Allies => id.index,
            Side::Enemies => self.party.members.len() + id.index,
        }
    }

    pub fn id_at(&self, position: usize) -> Option<CombatantId> {
        let allies = self.party.members.len();
        if position < allies {
            Some(CombatantId::ally(position))
        } else if position < self.len() {
            Some(CombatantId::enemy(position - allies))
        } else {
            None
        }
    }

    /// Looks a combatant up by name, exact match first, then ignoring case.
    pub fn find(&self, name: &str) -> Option<CombatantId> {
        let name = name.trim();
        self.iter()
            .find(|(_, c)| c.name == name)
            .or_else(|| self.iter().find(|(_, c)| c.name.eq_ignore_ascii_case(name)))
            .map(|(id, _)| id)
    }

    pub fn living(&self, side: Side) -> Vec<CombatantId> {
        self.side(side)
            .members
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(index, _)| CombatantId { side, index })
            .collect()
    }

    pub fn side_alive(&self, side: Side) -> bool {
        self.side(side).check_alive()
    }
}
