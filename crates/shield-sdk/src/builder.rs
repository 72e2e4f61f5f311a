//! Builder for OrderProcessingService

use crate::config::ServiceConfig;
use crate::service::OrderProcessingService;
use crate::store::{MemoryOrderStore, OrderStore};
use shield_runtime::{CannedInvestigator, Investigator, ReportGenerator, TemplateReportGenerator};
use std::sync::Arc;

/// Builder for [`OrderProcessingService`]
///
/// Anything not set falls back to an in-memory store, the canned
/// investigator and template reports under `config.reports_dir`.
///
/// # Example
///
/// ```rust,ignore
/// use shield_sdk::{OrderServiceBuilder, ServiceConfig};
///
/// let service = OrderServiceBuilder::new()
///     .with_config(ServiceConfig::new().with_reports_dir("/var/lib/scamshield/reports"))
///     .with_investigator(Arc::new(IntelInvestigator::new(sources)))
///     .build();
/// ```
#[derive(Default)]
pub struct OrderServiceBuilder {
    config: ServiceConfig,
    store: Option<Arc<dyn OrderStore>>,
    investigator: Option<Arc<dyn Investigator>>,
    report_generator: Option<Arc<dyn ReportGenerator>>,
}

impl OrderServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn OrderStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_investigator(mut self, investigator: Arc<dyn Investigator>) -> Self {
        self.investigator = Some(investigator);
        self
    }

    pub fn with_report_generator(mut self, generator: Arc<dyn ReportGenerator>) -> Self {
        self.report_generator = Some(generator);
        self
    }

    pub fn build(self) -> OrderProcessingService {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryOrderStore::new()));
        let investigator = self
            .investigator
            .unwrap_or_else(|| Arc::new(CannedInvestigator::new()));
        let reports_dir = self.config.reports_dir.clone();
        let report_generator = self
            .report_generator
            .unwrap_or_else(|| Arc::new(TemplateReportGenerator::new(reports_dir)));

        tracing::debug!(
            investigator = investigator.name(),
            reports_dir = %self.config.reports_dir.display(),
            "Building order processing service"
        );

        OrderProcessingService::new(self.config, store, investigator, report_generator)
    }
}
