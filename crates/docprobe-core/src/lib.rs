pub mod baseline;
pub mod check;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod naming;
pub mod profile;
pub mod suite;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use baseline::{BaselineMode, BaselineStore};
pub use config::{RenderConfig, SuiteConfig};
pub use error::ProbeError;
pub use models::{Document, Locale, PageId, RenderResult};
pub use profile::SiteProfile;
pub use suite::{Report, Scenario, Verifier};
pub use traits::Renderer;
