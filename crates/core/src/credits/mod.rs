//! Per-user encode credits.
//!
//! A [`CreditGate`] decides whether a user may consume one encode. The
//! charge point is configurable: at enqueue time (requests beyond the
//! quota are rejected up front) or at completion (only successful encodes
//! count).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum CreditError {
    /// The user has no credits left.
    #[error("Credit quota exhausted for user {user_id}")]
    Exhausted { user_id: String },

    /// Gate misconfigured.
    #[error("Credit configuration error: {0}")]
    ConfigurationError(String),
}

/// Credits configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    /// Gate type.
    #[serde(default)]
    pub mode: CreditMode,
    /// Encodes allowed per user (fixed_quota mode).
    #[serde(default = "default_quota")]
    pub quota: u32,
    /// When a credit is consumed.
    #[serde(default)]
    pub charge_on: ChargePoint,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            mode: CreditMode::Unlimited,
            quota: default_quota(),
            charge_on: ChargePoint::Enqueue,
        }
    }
}

fn default_quota() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreditMode {
    #[default]
    Unlimited,
    FixedQuota,
}

/// When the credit for a job is consumed.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChargePoint {
    /// Charge when the job is accepted. Exhaustion rejects the request.
    #[default]
    Enqueue,
    /// Charge when the job completes successfully.
    Completion,
}

/// Gate controlling per-user encode consumption.
#[async_trait]
pub trait CreditGate: Send + Sync {
    /// Name of this gate implementation.
    fn name(&self) -> &'static str;

    /// Consume one credit if the user has any left.
    async fn try_charge(&self, user_id: &str) -> Result<(), CreditError>;

    /// Consume one credit unconditionally (used at the completion charge
    /// point, where the work has already been done).
    async fn charge(&self, user_id: &str);

    /// Return one credit, e.g. when an enqueue-charged job fails early.
    async fn refund(&self, user_id: &str);
}

/// Gate that never limits anyone.
pub struct UnlimitedCredits;

impl UnlimitedCredits {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnlimitedCredits {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditGate for UnlimitedCredits {
    fn name(&self) -> &'static str {
        "unlimited"
    }

    async fn try_charge(&self, _user_id: &str) -> Result<(), CreditError> {
        Ok(())
    }

    async fn charge(&self, _user_id: &str) {}

    async fn refund(&self, _user_id: &str) {}
}

/// In-memory per-user quota. Counts reset on restart.
pub struct FixedQuotaCredits {
    quota: u32,
    used: RwLock<HashMap<String, u32>>,
}

impl FixedQuotaCredits {
    pub fn new(quota: u32) -> Self {
        Self {
            quota,
            used: RwLock::new(HashMap::new()),
        }
    }

    /// Credits the user has left.
    pub async fn remaining(&self, user_id: &str) -> u32 {
        let used = self.used.read().await;
        self.quota
            .saturating_sub(used.get(user_id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl CreditGate for FixedQuotaCredits {
    fn name(&self) -> &'static str {
        "fixed_quota"
    }

    async fn try_charge(&self, user_id: &str) -> Result<(), CreditError> {
        let mut used = self.used.write().await;
        let count = used.entry(user_id.to_string()).or_insert(0);
        if *count >= self.quota {
            return Err(CreditError::Exhausted {
                user_id: user_id.to_string(),
            });
        }
        *count += 1;
        Ok(())
    }

    async fn charge(&self, user_id: &str) {
        let mut used = self.used.write().await;
        *used.entry(user_id.to_string()).or_insert(0) += 1;
    }

    async fn refund(&self, user_id: &str) {
        let mut used = self.used.write().await;
        if let Some(count) = used.get_mut(user_id) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Factory function to create the credit gate selected in config.
pub fn create_credit_gate(config: &CreditsConfig) -> Box<dyn CreditGate> {
    match config.mode {
        CreditMode::Unlimited => Box::new(UnlimitedCredits::new()),
        CreditMode::FixedQuota => Box::new(FixedQuotaCredits::new(config.quota)),
    }
}
