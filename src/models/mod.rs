pub mod appointment;
pub mod enums;
pub mod lab;
pub mod notification;
pub mod professional;
pub mod submission;
pub mod user;

pub use appointment::*;
pub use enums::*;
pub use lab::*;
pub use notification::*;
pub use professional::*;
pub use submission::*;
pub use user::*;
