//! The registration form: field set, validators, location cascade and the timed
//! submission cycle built on [`crate::form::FormController`].

mod engine;
mod locations;
mod model;
mod options;
mod strength;
pub mod validators;


pub use engine::{
    EngineView, FieldValue, FieldView, Notification, RegistrationEngine, SUCCESS_MESSAGE,
    SUCCESS_TITLE,
};
pub use locations::{Cascade, Country, LocationDataset, Region};
pub use model::{
    Field, FieldKind, Gender, RegistrationForm, RegistrationFormFields, UnknownField,
};
pub use options::EngineOptions;
pub use strength::PasswordStrength;
pub use validators::RegistrationError;
