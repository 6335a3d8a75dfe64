//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer credential → `Principal` extension
//! 2. Audit logger: logs after auth, has the user id

pub mod audit;
pub mod auth;
