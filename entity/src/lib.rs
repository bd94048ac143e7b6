//! Record types shared across the workspace.
//!
//! These are plain serializable values. They travel inside event payloads and
//! are what the storage traits in `domain` hand back, so they carry no
//! persistence concerns of their own.

use uuid::Uuid;

pub mod goal_categories;
pub mod goals;
pub mod levels;
pub mod status;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
