pub use crate::form::{
    FieldKey, FieldLens, FormController, FormError, FormEvent, FormModel, FormResult,
    SubmitOutcome, SubmitState, ValidationError, Validity,
};
pub use crate::registration::{
    Cascade, EngineOptions, EngineView, Field, FieldValue, FieldView, Gender, LocationDataset,
    Notification, PasswordStrength, RegistrationEngine, RegistrationError, RegistrationForm,
};
