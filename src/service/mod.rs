//! Business logic over the entity store.

pub mod directory;
pub mod participation;
pub mod reports;

pub use directory::DirectoryService;
pub use participation::ParticipationService;
pub use reports::ReportService;
