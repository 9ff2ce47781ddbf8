mod controller;
mod display;
mod validation;


pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormEvent, FormOptions, FormResult,
    FormSnapshot, Interaction, SubmitOutcome, SubmitState,
};
pub use display::Validity;
pub use regform_derive::FormModel;
pub use validation::{FieldAssignment, FieldLens, FieldValidator, FormModel, ValidationError};
