//! Data model for analysis requests and results.
//!
//! Blocks and result pages mirror the service's JSON shape so that a raw
//! result can be deserialized, inspected, and written back out unchanged.

mod block;
mod job;
mod request;
mod result;

pub use block::{Block, BlockType, EntityType, Relationship, RelationshipType};
pub use job::{Job, JobId, JobStatus, TerminalStatus};
pub use request::{DocumentSource, FeatureSet, NotificationChannel};
pub use result::{DocumentMetadata, ResultPage, Warning};
