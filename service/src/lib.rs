//! Service wiring for the balloting core.
//!
//! Loads [`ServiceConfig`], installs logging and assembles a
//! [`GovernanceEngine`] over a caller-supplied storage environment with the
//! system clock and the tracing audit sink.

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;

pub use audit::TracingAuditTrail;
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};

use arso_balloting::GovernanceEngine;
use arso_store::Environment;
use arso_types::SystemClock;
use std::sync::Arc;
use tracing::info;

/// Build an engine from validated configuration.
pub fn build_engine<E: Environment>(
    config: &ServiceConfig,
    env: Arc<E>,
) -> Result<GovernanceEngine<E>, ServiceError> {
    config.validate()?;
    let engine = GovernanceEngine::new(
        env,
        Arc::new(SystemClock),
        Arc::new(TracingAuditTrail::new()),
        config.rules,
    )?;
    info!(
        acceptance = config.rules.acceptance.is_some(),
        quorum = config.rules.quorum.is_some(),
        "governance engine ready"
    );
    Ok(engine)
}
