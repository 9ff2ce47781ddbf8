//! Field validators of the registration form and their dependency wiring.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::locations::LocationDataset;
use super::model::{Gender, RegistrationForm};
use crate::form::{FormController, FormModel, FormResult, ValidationError};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

static INTERNATIONAL_PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("phone pattern must compile"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistrationError {
    Required,
    InvalidEmail,
    InvalidPhone,
    PhonePrefix { expected: String },
    PhoneLength { dial_code: String, digits: usize },
    GenderRequired,
    InvalidCountry,
    InvalidState,
    InvalidCity,
    PasswordMismatch,
    TermsRequired,
}

impl ValidationError for RegistrationError {
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("This field is required"),
            Self::InvalidEmail => f.write_str("Enter a valid email address"),
            Self::InvalidPhone => f.write_str("Enter a valid international phone number"),
            Self::PhonePrefix { expected } => write!(f, "Phone must start with {expected}"),
            Self::PhoneLength { dial_code, digits } => {
                write!(f, "Phone must have {digits} digits after {dial_code}")
            }
            Self::GenderRequired => f.write_str("Please select a gender"),
            Self::InvalidCountry => f.write_str("Select a valid country"),
            Self::InvalidState => f.write_str("Select a valid state"),
            Self::InvalidCity => f.write_str("Select a valid city"),
            Self::PasswordMismatch => f.write_str("Passwords do not match"),
            Self::TermsRequired => f.write_str("You must accept the terms and conditions"),
        }
    }
}

pub type Outcome = Result<(), RegistrationError>;

pub fn required_text(_model: &RegistrationForm, value: &String) -> Outcome {
    if value.trim().is_empty() {
        Err(RegistrationError::Required)
    } else {
        Ok(())
    }
}

pub fn email(_model: &RegistrationForm, value: &String) -> Outcome {
    let value = value.trim();
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidEmail)
    }
}

/// Without a country any international number passes; with one, its dial code and
/// national digit count are enforced.
pub fn phone(dataset: &LocationDataset, country: &str, value: &str) -> Outcome {
    let normalized = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect::<String>();
    if normalized.is_empty() {
        return Err(RegistrationError::Required);
    }

    let Some(country) = dataset.country(country) else {
        return if INTERNATIONAL_PHONE_PATTERN.is_match(&normalized) {
            Ok(())
        } else {
            Err(RegistrationError::InvalidPhone)
        };
    };

    let Some(national) = normalized.strip_prefix(country.dial_code.as_str()) else {
        return Err(RegistrationError::PhonePrefix {
            expected: country.dial_code.clone(),
        });
    };
    if national.len() == country.national_digits && national.chars().all(|c| c.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(RegistrationError::PhoneLength {
            dial_code: country.dial_code.clone(),
            digits: country.national_digits,
        })
    }
}

pub fn gender(_model: &RegistrationForm, value: &Option<Gender>) -> Outcome {
    match value {
        Some(_) => Ok(()),
        None => Err(RegistrationError::GenderRequired),
    }
}

pub fn country(dataset: &LocationDataset, value: &str) -> Outcome {
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else if dataset.country(value).is_some() {
        Ok(())
    } else {
        Err(RegistrationError::InvalidCountry)
    }
}

/// Never reports an error while the state select is disabled.
pub fn state(dataset: &LocationDataset, model: &RegistrationForm, value: &str) -> Outcome {
    let cascade = dataset.cascade(&model.country, value);
    if !cascade.state_enabled {
        return Ok(());
    }
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else if cascade.offers_state(value) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidState)
    }
}

/// Never reports an error while the city select is disabled.
pub fn city(dataset: &LocationDataset, model: &RegistrationForm, value: &str) -> Outcome {
    let cascade = dataset.cascade(&model.country, &model.state);
    if !cascade.city_enabled {
        return Ok(());
    }
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else if cascade.offers_city(value) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidCity)
    }
}

pub fn password(_model: &RegistrationForm, value: &String) -> Outcome {
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else {
        Ok(())
    }
}

pub fn confirm_password(model: &RegistrationForm, value: &String) -> Outcome {
    if value.is_empty() {
        Err(RegistrationError::Required)
    } else if *value == model.password {
        Ok(())
    } else {
        Err(RegistrationError::PasswordMismatch)
    }
}

pub fn terms(_model: &RegistrationForm, value: &bool) -> Outcome {
    if *value {
        Ok(())
    } else {
        Err(RegistrationError::TermsRequired)
    }
}

/// Registers one validator per field plus the cross-field dependencies.
pub fn install(
    controller: &FormController<RegistrationForm, RegistrationError>,
    dataset: Arc<LocationDataset>,
) -> FormResult<()> {
    let fields = RegistrationForm::fields();

    controller.register_field_validator(fields.first_name(), required_text)?;
    controller.register_field_validator(fields.last_name(), required_text)?;
    controller.register_field_validator(fields.email(), email)?;
    controller.register_field_validator(fields.gender(), gender)?;
    controller.register_field_validator(fields.password(), password)?;
    controller.register_field_validator(fields.confirm_password(), confirm_password)?;
    controller.register_field_validator(fields.terms_accepted(), terms)?;

    let locations = dataset.clone();
    controller.register_field_validator(
        fields.phone(),
        move |model: &RegistrationForm, value: &String| phone(&locations, &model.country, value),
    )?;
    let locations = dataset.clone();
    controller.register_field_validator(
        fields.country(),
        move |_model: &RegistrationForm, value: &String| country(&locations, value),
    )?;
    let locations = dataset.clone();
    controller.register_field_validator(
        fields.state(),
        move |model: &RegistrationForm, value: &String| state(&locations, model, value),
    )?;
    controller.register_field_validator(
        fields.city(),
        move |model: &RegistrationForm, value: &String| city(&dataset, model, value),
    )?;

    controller.register_dependency(fields.country(), fields.phone())?;
    controller.register_dependency(fields.country(), fields.state())?;
    controller.register_dependency(fields.country(), fields.city())?;
    controller.register_dependency(fields.state(), fields.city())?;
    controller.register_dependency(fields.password(), fields.confirm_password())?;
    Ok(())
}
