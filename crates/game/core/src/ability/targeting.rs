//! Target shapes for skills, spells and items.
//!
//! A controller names a target (a combatant, `random_enemy`, a list, or a
//! roster index). The ability's [`Targeting`] then decides whether that name
//! is used as-is or expanded to a whole side.

/// How an ability selects its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Targeting {
    /// The user only; the named target is ignored.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfOnly,
    /// One ally (or the named combatant).
    Ally,
    /// Every living member of the user's side.
    Allies,
    /// One enemy (or the named combatant).
    #[default]
    Enemy,
    /// Every living member of the opposing side.
    Enemies,
}

impl Targeting {
    /// Returns true if the ability hits a whole side.
    pub const fn is_group(self) -> bool {
        matches!(self, Targeting::Allies | Targeting::Enemies)
    }

    /// Returns true if the ability is aimed at the opposing side.
    pub const fn is_hostile(self) -> bool {
        matches!(self, Targeting::Enemy | Targeting::Enemies)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Targeting::SelfOnly => "self",
            Targeting::Ally => "ally",
            Targeting::Allies => "allies",
            Targeting::Enemy => "enemy",
            Targeting::Enemies => "enemies",
        }
    }
}
