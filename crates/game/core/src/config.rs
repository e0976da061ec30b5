/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Number of characters that fight in the main party; the rest wait in backup.
    pub main_party_limit: usize,
    /// Chapters in a full playthrough. Completing the last one ends the game.
    pub total_chapters: u32,
    /// SP cap applied to every combatant.
    pub max_sp: i32,
    /// Hit roll parameters.
    pub base_miss_chance: f64,
    pub base_crit_chance: f64,
    /// Miss/crit adjustment per point of luck difference.
    pub luck_step: f64,
    /// Uniform damage variance applied to physical and elemental damage.
    pub damage_variance: (f64, f64),
    /// Defend action: duration in owner turns and defense bonus.
    pub defend_duration: i32,
    pub defend_bonus: i32,
    /// Forecast length shown to controllers.
    pub predicted_turns: usize,
    /// Duration of effects applied by status and buff spells.
    pub status_spell_duration: i32,
    /// Unlocks the Requiem skill for new player characters.
    pub cheat_mode: bool,
}

impl GameConfig {
    // ===== compile-time constants =====
    pub const MAX_ENEMIES: usize = 26;
    pub const MAX_STAT_BIAS: u8 = 4;
    pub const SKILL_UNLOCK_LEVELS: [u32; 2] = [20, 40];

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAIN_PARTY_LIMIT: usize = 3;
    pub const DEFAULT_TOTAL_CHAPTERS: u32 = 5;
    pub const DEFAULT_MAX_SP: i32 = 3;
    pub const DEFAULT_MISS_CHANCE: f64 = 0.05;
    pub const DEFAULT_CRIT_CHANCE: f64 = 0.05;
    pub const DEFAULT_LUCK_STEP: f64 = 0.005;
    pub const DEFAULT_DAMAGE_VARIANCE: (f64, f64) = (0.75, 1.25);
    pub const DEFAULT_DEFEND_DURATION: i32 = 1;
    pub const DEFAULT_DEFEND_BONUS: i32 = 10;
    pub const DEFAULT_PREDICTED_TURNS: usize = 10;
    pub const DEFAULT_STATUS_SPELL_DURATION: i32 = 5;

    pub fn new() -> Self {
        Self {
            main_party_limit: Self::DEFAULT_MAIN_PARTY_LIMIT,
            total_chapters: Self::DEFAULT_TOTAL_CHAPTERS,
            max_sp: Self::DEFAULT_MAX_SP,
            base_miss_chance: Self::DEFAULT_MISS_CHANCE,
            base_crit_chance: Self::DEFAULT_CRIT_CHANCE,
            luck_step: Self::DEFAULT_LUCK_STEP,
            damage_variance: Self::DEFAULT_DAMAGE_VARIANCE,
            defend_duration: Self::DEFAULT_DEFEND_DURATION,
            defend_bonus: Self::DEFAULT_DEFEND_BONUS,
            predicted_turns: Self::DEFAULT_PREDICTED_TURNS,
            status_spell_duration: Self::DEFAULT_STATUS_SPELL_DURATION,
            cheat_mode: false,
        }
    }

    pub fn with_cheat_mode(mut self, cheat_mode: bool) -> Self {
        self.cheat_mode = cheat_mode;
        self
    }

    pub fn with_main_party_limit(mut self, limit: usize) -> Self {
        self.main_party_limit = limit.max(1);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
