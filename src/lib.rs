pub mod form;
pub mod prelude;
pub mod registration;

pub use registration::{EngineOptions, RegistrationEngine};
