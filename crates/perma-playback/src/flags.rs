//! Runtime feature flags.
//!
//! Flags are evaluated on every request for the requesting principal; nothing
//! is cached, so a toggle implementation may change its answer at any time.

use std::str::FromStr;

use crate::auth::Principal;

/// Serve WACZ captures instead of WARC when both exist.
pub const WACZ_PLAYBACK: &str = "wacz-playback";

/// Evaluates feature flags for a principal.
pub trait FeatureToggle: Send + Sync {
    fn is_active(&self, flag: &str, principal: &Principal) -> bool;
}

impl<F> FeatureToggle for F
where
    F: Fn(&str, &Principal) -> bool + Send + Sync,
{
    fn is_active(&self, flag: &str, principal: &Principal) -> bool {
        self(flag, principal)
    }
}

/// Who a flag is enabled for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rollout {
    #[default]
    Off,
    On,
    /// Only staff principals.
    Staff,
}

impl Rollout {
    pub fn applies_to(self, principal: &Principal) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::Staff => principal.is_staff,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("expected one of on, off, staff; got '{0}'")]
pub struct UnknownRollout(String);

impl FromStr for Rollout {
    type Err = UnknownRollout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" | "0" => Ok(Self::Off),
            "on" | "true" | "1" => Ok(Self::On),
            "staff" => Ok(Self::Staff),
            other => Err(UnknownRollout(other.to_string())),
        }
    }
}

/// Flags backed by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredFlags {
    pub wacz_playback: Rollout,
}

impl FeatureToggle for ConfiguredFlags {
    fn is_active(&self, flag: &str, principal: &Principal) -> bool {
        match flag {
            WACZ_PLAYBACK => self.wacz_playback.applies_to(principal),
            _ => false,
        }
    }
}
