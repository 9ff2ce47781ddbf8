use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::form::{FieldKey, FieldLens, FormModel};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// The registration field set. Every field starts empty and unchecked.
#[derive(Clone, Debug, Default, Eq, PartialEq, FormModel)]
pub struct RegistrationForm {
    #[form(key = "firstName")]
    pub first_name: String,
    #[form(key = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<Gender>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub password: String,
    #[form(key = "confirmPassword")]
    pub confirm_password: String,
    #[form(key = "termsAccepted")]
    pub terms_accepted: bool,
}

/// How a field receives input from the driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Text,
    Select,
    Choice,
    Checkbox,
}

impl FieldKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::Choice => "choice",
            Self::Checkbox => "checkbox",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Gender,
    Country,
    State,
    City,
    Password,
    ConfirmPassword,
    TermsAccepted,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Gender,
        Field::Country,
        Field::State,
        Field::City,
        Field::Password,
        Field::ConfirmPassword,
        Field::TermsAccepted,
    ];

    pub fn key(self) -> FieldKey {
        let fields = RegistrationForm::fields();
        match self {
            Field::FirstName => fields.first_name().key(),
            Field::LastName => fields.last_name().key(),
            Field::Email => fields.email().key(),
            Field::Phone => fields.phone().key(),
            Field::Gender => fields.gender().key(),
            Field::Country => fields.country().key(),
            Field::State => fields.state().key(),
            Field::City => fields.city().key(),
            Field::Password => fields.password().key(),
            Field::ConfirmPassword => fields.confirm_password().key(),
            Field::TermsAccepted => fields.terms_accepted().key(),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.key().as_str()
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Field::Gender => FieldKind::Choice,
            Field::Country | Field::State | Field::City => FieldKind::Select,
            Field::TermsAccepted => FieldKind::Checkbox,
            _ => FieldKind::Text,
        }
    }

    pub fn from_key(key: FieldKey) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownField(pub String);

impl Display for UnknownField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown registration field {:?}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| UnknownField(value.to_string()))
    }
}
