//! ScamShield Runtime
//!
//! The work done between payment and delivery: investigating a target and
//! rendering the resulting report. Both stages sit behind traits so the
//! order service can swap implementations.

pub mod error;
pub mod investigation;
pub mod report;

pub use error::{Result, RuntimeError};
pub use investigation::{
    CannedInvestigator, IntelAuth, IntelClient, IntelInvestigator, IntelSource,
    InvestigationRequest, Investigator, LlmInvestigator,
};
pub use report::{ReportDocument, ReportGenerator, TemplateReportGenerator};
