//! Common error infrastructure for game-core.
//!
//! Battle and story flows never fail: gameplay problems (missing MP, bad
//! targets, unknown actions) are narrated instead. The errors here cover the
//! few operations that reject input outright, such as party composition
//! changes and catalog lookups.

/// How a caller should react to an error. `Recoverable` errors can be
/// retried with different input; `Internal` ones mean a broken invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Shared classification for the error enums of this crate.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Rejected party composition changes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PartyError {
    #[error("no character named '{0}' in the party")]
    UnknownMember(String),

    #[error("the main party must keep at least one member")]
    LastMainMember,

    #[error("'{0}' is already in the main party")]
    AlreadyInMainParty(String),

    #[error("'{0}' is already in backup")]
    AlreadyInBackup(String),

    #[error("the main party is full; choose a member to swap out")]
    MainPartyFull,

    #[error("no equipment named '{0}' in the inventory")]
    UnknownEquipment(String),
}

impl GameError for PartyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MainPartyFull => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMember(_) => "PARTY_UNKNOWN_MEMBER",
            Self::LastMainMember => "PARTY_LAST_MAIN_MEMBER",
            Self::AlreadyInMainParty(_) => "PARTY_ALREADY_MAIN",
            Self::AlreadyInBackup(_) => "PARTY_ALREADY_BACKUP",
            Self::MainPartyFull => "PARTY_MAIN_FULL",
            Self::UnknownEquipment(_) => "PARTY_UNKNOWN_EQUIPMENT",
        }
    }
}

/// Lookups against injected content catalogs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown spell '{0}'")]
    UnknownSpell(String),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("unknown base class '{0}'")]
    UnknownBaseClass(String),
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSpell(_) => "CATALOG_UNKNOWN_SPELL",
            Self::UnknownItem(_) => "CATALOG_UNKNOWN_ITEM",
            Self::UnknownBaseClass(_) => "CATALOG_UNKNOWN_BASE_CLASS",
        }
    }
}
