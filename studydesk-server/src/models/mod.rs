//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod text;
pub mod email;
pub mod status;
pub mod window;

pub use validation::ValidationError;
pub use text::{MoodLabel, PersonName, Title};
pub use email::{normalize_email, Email, NewPassword};
pub use status::{TaskStatus, TutoringRole};
pub use window::TimeWindow;
