//! Stat block with clamped HP/MP/SP pools.
//!
//! All pool changes clamp silently: `hp_change`, `mp_change` and `sp_change`
//! return the delta actually applied, which is what narration reports.
//! Death is detected only through [`StatBlock::hp_change`]; restoring a dead
//! combatant goes through [`StatBlock::revive`].

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::config::GameConfig;

/// The eight tunable attributes of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    MaxMp,
    Attack,
    Defense,
    Intelligence,
    Wisdom,
    Speed,
    Luck,
}

impl StatKind {
    pub const COUNT: usize = 8;

    /// The six stats that effects such as Intimidated scale.
    pub const COMBAT: [StatKind; 6] = [
        StatKind::Attack,
        StatKind::Defense,
        StatKind::Intelligence,
        StatKind::Wisdom,
        StatKind::Speed,
        StatKind::Luck,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Title-cased label used in level-up narration ("Max Hp", "Attack").
    pub fn label(self) -> String {
        self.to_string()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Per-stat offsets. Status effects and equipment record the exact delta they
/// applied so removal restores the original values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDelta([i32; StatKind::COUNT]);

impl StatDelta {
    pub const fn zero() -> Self {
        Self([0; StatKind::COUNT])
    }

    pub fn single(kind: StatKind, amount: i32) -> Self {
        let mut delta = Self::zero();
        delta.0[kind.index()] = amount;
        delta
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (StatKind, i32)>) -> Self {
        let mut delta = Self::zero();
        for (kind, amount) in pairs {
            delta.0[kind.index()] += amount;
        }
        delta
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: StatKind, amount: i32) {
        self.0[kind.index()] = amount;
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0)
    }

    pub fn negated(&self) -> Self {
        let mut out = *self;
        for v in &mut out.0 {
            *v = -*v;
        }
        out
    }

    /// Non-zero entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i32)> + '_ {
        StatKind::iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, v)| *v != 0)
    }
}

/// Mutable numeric attributes of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    pub max_hp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub speed: i32,
    pub luck: i32,
    pub hp: i32,
    pub mp: i32,
    pub sp: i32,
    pub max_sp: i32,
    pub alive: bool,
}

impl StatBlock {
    /// Creates a block with full HP/MP and zero SP. Every other stat starts at 10.
    pub fn new(max_hp: i32, max_mp: i32) -> Self {
        let max_hp = max_hp.max(1);
        let max_mp = max_mp.max(0);
        Self {
            max_hp,
            max_mp,
            attack: 10,
            defense: 10,
            intelligence: 10,
            wisdom: 10,
            speed: 10,
            luck: 10,
            hp: max_hp,
            mp: max_mp,
            sp: 0,
            max_sp: GameConfig::DEFAULT_MAX_SP,
            alive: true,
        }
    }

    /// Builder-style setter. Raising a pool maximum also refills that pool.
    #[must_use]
    pub fn with(mut self, kind: StatKind, value: i32) -> Self {
        self.set(kind, value);
        match kind {
            StatKind::MaxHp => self.hp = self.max_hp,
            StatKind::MaxMp => self.mp = self.max_mp,
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn with_max_sp(mut self, max_sp: i32) -> Self {
        self.max_sp = max_sp.max(0);
        self.sp = self.sp.clamp(0, self.max_sp);
        self
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::MaxHp => self.max_hp,
            StatKind::MaxMp => self.max_mp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Intelligence => self.intelligence,
            StatKind::Wisdom => self.wisdom,
            StatKind::Speed => self.speed,
            StatKind::Luck => self.luck,
        }
    }

    /// Overwrites a stat. Shrinking a pool maximum clamps the current value.
    pub fn set(&mut self, kind: StatKind, value: i32) {
        match kind {
            StatKind::MaxHp => {
                self.max_hp = value.max(1);
                self.hp = self.hp.min(self.max_hp);
            }
            StatKind::MaxMp => {
                self.max_mp = value.max(0);
                self.mp = self.mp.min(self.max_mp);
            }
            StatKind::Attack => self.attack = value,
            StatKind::Defense => self.defense = value,
            StatKind::Intelligence => self.intelligence = value,
            StatKind::Wisdom => self.wisdom = value,
            StatKind::Speed => self.speed = value,
            StatKind::Luck => self.luck = value,
        }
    }

    pub fn apply_delta(&mut self, delta: &StatDelta) {
        for (kind, amount) in delta.iter() {
            self.set(kind, self.get(kind) + amount);
        }
    }

    /// Applies an HP change clamped to `[-hp, max_hp - hp]` and returns the
    /// true delta. Reaching 0 HP marks the block dead. Dead blocks ignore
    /// HP changes until revived.
    pub fn hp_change(&mut self, delta: i32) -> i32 {
        if !self.alive {
            return 0;
        }
        let applied = delta.clamp(-self.hp, self.max_hp - self.hp);
        self.hp += applied;
        self.check_dead();
        applied
    }

    /// Applies an MP change clamped to `[-mp, max_mp - mp]` and returns the true delta.
    pub fn mp_change(&mut self, delta: i32) -> i32 {
        let applied = delta.clamp(-self.mp, self.max_mp - self.mp);
        self.mp += applied;
        applied
    }

    /// Moves SP within `[0, max_sp]` and returns the true delta.
    pub fn sp_change(&mut self, delta: i32) -> i32 {
        let old = self.sp;
        self.sp = (self.sp + delta).clamp(0, self.max_sp);
        self.sp - old
    }

    pub fn reset_sp(&mut self) {
        self.sp = 0;
    }

    /// Brings a dead block back with `hp` (at least 1, at most max).
    pub fn revive(&mut self, hp: i32) {
        self.hp = hp.clamp(1, self.max_hp);
        self.alive = true;
    }

    pub fn restore_full(&mut self) {
        self.hp = self.max_hp;
        self.mp = self.max_mp;
    }

    /// Fraction of HP remaining in `[0, 1]`.
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    fn check_dead(&mut self) {
        if self.hp <= 0 {
            self.hp = 0;
            self.alive = false;
        }
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new(50, 25)
    }
}
