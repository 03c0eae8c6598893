use std::sync::Arc;

use clipbox_core::{
    credits::ChargePoint, Authenticator, Config, CreditGate, JobStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    job_store: Arc<dyn JobStore>,
    credit_gate: Arc<dyn CreditGate>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        job_store: Arc<dyn JobStore>,
        credit_gate: Arc<dyn CreditGate>,
    ) -> Self {
        Self {
            config,
            authenticator,
            job_store,
            credit_gate,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn job_store(&self) -> &dyn JobStore {
        self.job_store.as_ref()
    }

    pub fn credit_gate(&self) -> &dyn CreditGate {
        self.credit_gate.as_ref()
    }

    pub fn charge_on(&self) -> ChargePoint {
        self.config.credits.charge_on
    }
}
