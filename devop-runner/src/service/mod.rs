//! Service layer
//!
//! Services prepare the work of a deploy batch: they check the target
//! environment and enumerate the release items to deploy.
//!
//! Remote lookups sit behind traits so they can be replaced in tests.

mod environment;
mod release;

// Re-export traits
pub use environment::EnvironmentSource;
pub use release::ReleaseSource;

// Re-export implementations
pub use environment::{EnvironmentError, validate_environment};
pub use release::{JiraDescriptionReleaseSource, RELEASE_LINK_MARKER, scrape_release_items};
