pub mod bike_data;
pub mod controller;
pub mod session;
pub mod tag;
pub mod user;

// Re-export models for easier access
pub use bike_data::*;
pub use controller::*;
pub use session::*;
pub use tag::*;
pub use user::*;
