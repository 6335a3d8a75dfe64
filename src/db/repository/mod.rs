//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection`; callers own transaction
//! boundaries. All public functions are re-exported here.

mod appointment;
mod lab_test;
mod notification;
mod revocation;
mod submission;
pub mod users;

pub use appointment::*;
pub use lab_test::*;
pub use notification::*;
pub use revocation::*;
pub use submission::*;
pub use users::*;
