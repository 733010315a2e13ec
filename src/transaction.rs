use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::native::NativeTransaction;

/// Transaction parameter buffer flags understood by the native client.
///
/// Discriminants are the isc_tpb codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TpbFlag {
    Consistency = 1,
    Concurrency = 2,
    Write = 9,
    ReadCommitted = 15,
    RecVersion = 17,
    NoRecVersion = 18,
}

impl TpbFlag {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Portable isolation level requested by the caller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
}

impl IsolationLevel {
    /// TPB flags for this level.
    #[must_use]
    pub fn flags(self) -> &'static [TpbFlag] {
        use TpbFlag::{Concurrency, Consistency, NoRecVersion, ReadCommitted, RecVersion, Write};
        match self {
            Self::ReadUncommitted => &[Write, ReadCommitted, RecVersion],
            Self::ReadCommitted => &[Write, ReadCommitted, NoRecVersion],
            Self::RepeatableRead | Self::Snapshot => &[Write, Concurrency],
            Self::Serializable => &[Write, Consistency],
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadUncommitted => "read uncommitted",
            Self::ReadCommitted => "read committed",
            Self::RepeatableRead => "repeatable read",
            Self::Snapshot => "snapshot",
            Self::Serializable => "serializable",
        })
    }
}

/// Settings for `begin_transaction`; an unset level falls back to the dialect default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionSettings {
    pub isolation_level: Option<IsolationLevel>,
}

impl TransactionSettings {
    #[must_use]
    pub fn with_isolation_level(isolation_level: IsolationLevel) -> Self {
        Self {
            isolation_level: Some(isolation_level),
        }
    }
}

/// Active native transaction held by a connection.
pub struct Transaction {
    pub(crate) handle: Box<dyn NativeTransaction>,
    pub(crate) isolation_level: IsolationLevel,
}

impl Transaction {
    #[must_use]
    pub fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("isolation_level", &self.isolation_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_levels_map_to_tpb_codes() {
        let codes = |level: IsolationLevel| -> Vec<u8> {
            level.flags().iter().map(|f| f.code()).collect()
        };
        assert_eq!(codes(IsolationLevel::ReadUncommitted), vec![9, 15, 17]);
        assert_eq!(codes(IsolationLevel::ReadCommitted), vec![9, 15, 18]);
        assert_eq!(codes(IsolationLevel::RepeatableRead), vec![9, 2]);
        assert_eq!(codes(IsolationLevel::Snapshot), vec![9, 2]);
        assert_eq!(codes(IsolationLevel::Serializable), vec![9, 1]);
    }

    #[test]
    fn read_committed_is_default() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
        assert_eq!(TransactionSettings::default().isolation_level, None);
        assert_eq!(
            IsolationLevel::from_str("repeatable-read", true),
            Ok(IsolationLevel::RepeatableRead)
        );
    }
}
