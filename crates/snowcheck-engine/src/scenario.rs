//! Scenario runner
//!
//! A scenario is one provisioning configuration verified on one connection.
//! The settle delay is observed once, before the first introspection query,
//! to let asynchronous metadata propagation catch up. There is no polling and
//! no retry: the first failing query ends the scenario.

use crate::verifier::{verify_database, verify_warehouse, WarehouseExpectation};
use snowcheck_catalog::{IntrospectionConnection, VerifyError};
use snowcheck_core::{ProvisioningConfig, Report, VerifySettings};
use std::time::Duration;

/// One verification run over a provisioning configuration
#[derive(Debug, Clone)]
pub struct Scenario {
    config: ProvisioningConfig,
    settle_delay: Option<Duration>,
    warehouses: Vec<WarehouseExpectation>,
}

impl Scenario {
    pub fn new(config: ProvisioningConfig) -> Self {
        Self {
            config,
            settle_delay: None,
            warehouses: Vec::new(),
        }
    }

    /// Override the settle delay configured in [`VerifySettings`]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    /// Also verify a warehouse
    pub fn with_warehouse(mut self, expected: WarehouseExpectation) -> Self {
        self.warehouses.push(expected);
        self
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Delay observed before the first query when run with `settings`
    pub fn settle_delay(&self, settings: &VerifySettings) -> Duration {
        self.settle_delay.unwrap_or_else(|| settings.settle_delay())
    }

    /// Wait out the settle delay, then verify every configured object in order
    pub async fn run<C>(&self, conn: &C, settings: &VerifySettings) -> Result<Report, VerifyError>
    where
        C: IntrospectionConnection + ?Sized,
    {
        let delay = self.settle_delay(settings);
        if !delay.is_zero() {
            tracing::debug!(?delay, "waiting for metadata to settle");
            tokio::time::sleep(delay).await;
        }

        let mut diagnostics = Vec::new();
        let mut objects_checked = 0;

        for (key, database) in &self.config.databases {
            tracing::debug!(%key, database = %database.name, "verifying configured database");
            let verification = verify_database(conn, database, settings).await?;
            objects_checked += verification.objects_checked;
            diagnostics.extend(verification.diagnostics);
        }

        for warehouse in &self.warehouses {
            objects_checked += 1;
            diagnostics.extend(verify_warehouse(conn, warehouse).await?);
        }

        let report = Report::from_diagnostics(diagnostics, objects_checked);
        tracing::info!(
            connection = conn.name(),
            objects = objects_checked,
            errors = report.summary.errors,
            "scenario finished"
        );

        Ok(report)
    }
}
