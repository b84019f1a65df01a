//! Client runtime configuration and loaders.
use std::env;

/// Behaviour switches for [`GameClient`](crate::GameClient).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Resume a previously authorized wallet session on start.
    pub restore_session: bool,
    /// Follow wallet notifications and re-derive game state on every change.
    pub follow_wallet: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            restore_session: true,
            follow_wallet: true,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `POKECHAIN_RESTORE_SESSION`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(restore) = read_env::<bool>("POKECHAIN_RESTORE_SESSION") {
            config.restore_session = restore;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}
