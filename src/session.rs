//! Mock wallet session
//!
//! Connecting produces a random address; disconnecting ends the session,
//! which stops every simulation and discards every agent.

use rand::Rng;
use std::fmt;
use tracing::info;

use crate::engine::EngineHandle;
use crate::error::Result;

/// Hex-encoded 20-byte address with a `0x` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Random mock address
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let digits: String = (0..40)
            .map(|_| HEX[rng.gen_range(0..16)] as char)
            .collect();
        Self(format!("0x{}", digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` form for headers
    pub fn truncated(&self) -> String {
        let len = self.0.len();
        format!("{}...{}", &self.0[..6], &self.0[len - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection state of the mock wallet
#[derive(Debug, Default)]
pub struct WalletSession {
    address: Option<WalletAddress>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Connect with a fresh random address; already connected sessions keep theirs
    pub fn connect(&mut self) -> &WalletAddress {
        let address = self.address.get_or_insert_with(WalletAddress::random);
        info!(address = %address.truncated(), "wallet connected");
        address
    }

    /// Disconnect and tear the agent session down
    pub async fn disconnect(&mut self, engine: &EngineHandle) -> Result<()> {
        let Some(address) = self.address.take() else {
            return Ok(());
        };

        engine.teardown_session().await?;
        info!(address = %address.truncated(), "wallet disconnected");
        Ok(())
    }
}
