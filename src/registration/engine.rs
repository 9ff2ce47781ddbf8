use std::sync::{Arc, RwLock};
use std::thread;

use futures::channel::oneshot;
use futures::executor::block_on;
use futures_timer::Delay;

use super::locations::{Cascade, LocationDataset};
use super::model::{Field, FieldKind, Gender, RegistrationForm};
use super::options::EngineOptions;
use super::strength::PasswordStrength;
use super::validators::{self, RegistrationError};
use crate::form::{
    FieldAssignment, FieldMeta, FormController, FormError, FormEvent, FormModel, FormOptions,
    FormResult, FormSnapshot, SubmitOutcome, SubmitState, Validity,
};

pub const SUCCESS_TITLE: &str = "Registration Successful";
pub const SUCCESS_MESSAGE: &str = "Your profile has been submitted successfully.";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn registration_successful() -> Self {
        Self {
            title: SUCCESS_TITLE.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.message)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(Option<Gender>),
    Checked(bool),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Choice(choice) => choice.is_none(),
            FieldValue::Checked(checked) => !checked,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldView {
    pub field: Field,
    pub value: FieldValue,
    pub enabled: bool,
    pub validity: Validity,
    /// Message shown to the user; `None` while the error is hidden or absent.
    pub error: Option<String>,
    /// Whether the validator currently accepts the value, shown or not.
    pub passes: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineView {
    pub fields: Vec<FieldView>,
    /// Options of the country select, in dataset order.
    pub country_options: Vec<String>,
    pub cascade: Cascade,
    pub strength: Option<PasswordStrength>,
    pub strength_label: String,
    pub submit_enabled: bool,
    pub submit_state: SubmitState,
    pub notification: Option<Notification>,
}

impl EngineView {
    pub fn field(&self, field: Field) -> Option<&FieldView> {
        self.fields.iter().find(|view| view.field == field)
    }
}

/// Registration form engine: field registry, validators, location cascade and the
/// simulated submission, driven by discrete interaction events.
#[derive(Clone)]
pub struct RegistrationEngine {
    controller: FormController<RegistrationForm, RegistrationError>,
    dataset: Arc<LocationDataset>,
    options: EngineOptions,
    notification: Arc<RwLock<Option<Notification>>>,
}

impl RegistrationEngine {
    pub fn new(options: EngineOptions) -> FormResult<Self> {
        Self::with_dataset(LocationDataset::builtin()?, options)
    }

    pub fn with_dataset(dataset: LocationDataset, options: EngineOptions) -> FormResult<Self> {
        let controller = FormController::new(
            RegistrationForm::default(),
            FormOptions {
                validate_first_error_only: true,
            },
        );
        let dataset = Arc::new(dataset);
        validators::install(&controller, dataset.clone())?;

        let notification = Arc::new(RwLock::new(None));
        let slot = notification.clone();
        controller.subscribe(move |event| {
            if let FormEvent::SubmitStateChanged {
                to: SubmitState::Reset,
                ..
            } = event
            {
                match slot.write() {
                    Ok(mut guard) => *guard = None,
                    Err(poisoned) => *poisoned.into_inner() = None,
                }
            }
        })?;

        let _ = controller.validate_form()?;
        Ok(Self {
            controller,
            dataset,
            options,
            notification,
        })
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn dataset(&self) -> &LocationDataset {
        &self.dataset
    }

    pub fn controller(&self) -> &FormController<RegistrationForm, RegistrationError> {
        &self.controller
    }

    pub fn subscribe(&self, listener: impl Fn(&FormEvent) + Send + Sync + 'static) -> FormResult<()> {
        self.controller.subscribe(listener)
    }

    pub fn focus(&self, field: Field) -> FormResult<()> {
        self.controller.focus(field.key())
    }

    pub fn blur(&self, field: Field) -> FormResult<()> {
        self.controller.touch_by_key(field.key())
    }

    pub fn set_text(&self, field: Field, value: impl Into<String>) -> FormResult<()> {
        let fields = RegistrationForm::fields();
        let value = value.into();
        match field {
            Field::FirstName => self.controller.set(fields.first_name(), value),
            Field::LastName => self.controller.set(fields.last_name(), value),
            Field::Email => self.controller.set(fields.email(), value),
            Field::Phone => self.controller.set(fields.phone(), value),
            Field::Password => self.controller.set(fields.password(), value),
            Field::ConfirmPassword => self.controller.set(fields.confirm_password(), value),
            other => Err(wrong_kind(other, FieldKind::Text)),
        }
    }

    /// Picks an option of a select. Values outside the current cascade are rejected and
    /// leave the field unchanged; a changed parent clears its dependents.
    pub fn select(&self, field: Field, value: impl Into<String>) -> FormResult<()> {
        let fields = RegistrationForm::fields();
        let value = value.into();
        let model = self.controller.snapshot()?.model;
        let cascade = self.dataset.cascade(&model.country, &model.state);

        match field {
            Field::Country => {
                if !value.is_empty() && self.dataset.country(&value).is_none() {
                    return Err(unavailable(field, value));
                }
                if value == model.country {
                    return Ok(());
                }
                tracing::debug!(country = %value, "country changed, clearing state and city");
                self.controller.set_many([
                    FieldAssignment::new(fields.country(), value),
                    FieldAssignment::new(fields.state(), String::new()),
                    FieldAssignment::new(fields.city(), String::new()),
                ])
            }
            Field::State => {
                if !cascade.state_enabled {
                    return Err(FormError::FieldDisabled(field.key()));
                }
                if !value.is_empty() && !cascade.offers_state(&value) {
                    return Err(unavailable(field, value));
                }
                if value == model.state {
                    return Ok(());
                }
                tracing::debug!(state = %value, "state changed, clearing city");
                self.controller.set_many([
                    FieldAssignment::new(fields.state(), value),
                    FieldAssignment::new(fields.city(), String::new()),
                ])
            }
            Field::City => {
                if !cascade.city_enabled {
                    return Err(FormError::FieldDisabled(field.key()));
                }
                if !value.is_empty() && !cascade.offers_city(&value) {
                    return Err(unavailable(field, value));
                }
                self.controller.set(fields.city(), value)
            }
            other => Err(wrong_kind(other, FieldKind::Select)),
        }
    }

    pub fn choose_gender(&self, gender: Gender) -> FormResult<()> {
        self.controller
            .set(RegistrationForm::fields().gender(), Some(gender))
    }

    pub fn check(&self, field: Field, checked: bool) -> FormResult<()> {
        match field {
            Field::TermsAccepted => self
                .controller
                .set(RegistrationForm::fields().terms_accepted(), checked),
            other => Err(wrong_kind(other, FieldKind::Checkbox)),
        }
    }

    /// Empties a field the way a user would. Disabled selects are already empty.
    pub fn clear(&self, field: Field) -> FormResult<()> {
        match field.kind() {
            FieldKind::Text => self.set_text(field, String::new()),
            FieldKind::Select => {
                if self.field(field)?.enabled {
                    self.select(field, String::new())
                } else {
                    Ok(())
                }
            }
            FieldKind::Choice => self.controller.set(RegistrationForm::fields().gender(), None),
            FieldKind::Checkbox => self.check(field, false),
        }
    }

    /// Runs the full submission cycle: `Submitting`, then `Success` with a notification
    /// after the submit delay, then `Reset` and back to `Idle` after the reset delay.
    ///
    /// An invalid form yields [`SubmitOutcome::Rejected`] and reveals every error. Once the
    /// form is `Submitting` the timed phases run on their own thread, so the cycle still
    /// completes if the returned future is dropped.
    pub async fn click_submit(&self) -> FormResult<SubmitOutcome<Notification>> {
        let Some(model) = self.controller.begin_submit()? else {
            return Ok(SubmitOutcome::Rejected);
        };

        let (done, finished) = oneshot::channel();
        let cycle = self.clone();
        let spawned = thread::Builder::new()
            .name("regform-submit".to_string())
            .spawn(move || {
                let _ = done.send(block_on(cycle.run_cycle(model)));
            });
        if let Err(error) = spawned {
            self.controller.finish_submit(false)?;
            return Err(FormError::SpawnFailed(error.to_string()));
        }

        let notification = finished.await.map_err(|_| FormError::SubmissionAborted)??;
        Ok(SubmitOutcome::Completed(notification))
    }

    async fn run_cycle(self, model: RegistrationForm) -> FormResult<Notification> {
        Delay::new(self.options.submit_delay()).await;
        let notification = Notification::registration_successful();
        *self
            .notification
            .write()
            .map_err(|_| FormError::StatePoisoned("publishing notification"))? =
            Some(notification.clone());
        self.controller.finish_submit(true)?;
        tracing::info!(email = %model.email, country = %model.country, "registration submitted");

        Delay::new(self.options.reset_delay()).await;
        self.controller.complete_reset()?;
        tracing::info!("registration form reset");
        Ok(notification)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<RegistrationForm, RegistrationError>> {
        self.controller.snapshot()
    }

    pub fn submit_enabled(&self) -> FormResult<bool> {
        self.controller.can_submit()
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        self.controller.submit_state()
    }

    pub fn notification(&self) -> FormResult<Option<Notification>> {
        Ok(self
            .notification
            .read()
            .map_err(|_| FormError::StatePoisoned("reading notification"))?
            .clone())
    }

    pub fn cascade(&self) -> FormResult<Cascade> {
        let model = self.controller.snapshot()?.model;
        Ok(self.dataset.cascade(&model.country, &model.state))
    }

    pub fn strength(&self) -> FormResult<Option<PasswordStrength>> {
        Ok(PasswordStrength::classify(
            &self.controller.snapshot()?.model.password,
        ))
    }

    pub fn field(&self, field: Field) -> FormResult<FieldView> {
        let snapshot = self.controller.snapshot()?;
        let cascade = self
            .dataset
            .cascade(&snapshot.model.country, &snapshot.model.state);
        Ok(field_view(&snapshot, &cascade, field))
    }

    pub fn view(&self) -> FormResult<EngineView> {
        let snapshot = self.controller.snapshot()?;
        let cascade = self
            .dataset
            .cascade(&snapshot.model.country, &snapshot.model.state);
        let fields = Field::ALL
            .into_iter()
            .map(|field| field_view(&snapshot, &cascade, field))
            .collect();
        let strength = PasswordStrength::classify(&snapshot.model.password);
        Ok(EngineView {
            fields,
            country_options: self.dataset.country_codes(),
            cascade,
            strength,
            strength_label: strength.map(PasswordStrength::label).unwrap_or_default(),
            submit_enabled: snapshot.can_submit(),
            submit_state: snapshot.submit_state,
            notification: self.notification()?,
        })
    }
}

fn field_view(
    snapshot: &FormSnapshot<RegistrationForm, RegistrationError>,
    cascade: &Cascade,
    field: Field,
) -> FieldView {
    let key = field.key();
    let model = &snapshot.model;
    let value = match field {
        Field::FirstName => FieldValue::Text(model.first_name.clone()),
        Field::LastName => FieldValue::Text(model.last_name.clone()),
        Field::Email => FieldValue::Text(model.email.clone()),
        Field::Phone => FieldValue::Text(model.phone.clone()),
        Field::Gender => FieldValue::Choice(model.gender),
        Field::Country => FieldValue::Text(model.country.clone()),
        Field::State => FieldValue::Text(model.state.clone()),
        Field::City => FieldValue::Text(model.city.clone()),
        Field::Password => FieldValue::Text(model.password.clone()),
        Field::ConfirmPassword => FieldValue::Text(model.confirm_password.clone()),
        Field::TermsAccepted => FieldValue::Checked(model.terms_accepted),
    };
    let enabled = match field {
        Field::State => cascade.state_enabled,
        Field::City => cascade.city_enabled,
        _ => true,
    };
    FieldView {
        field,
        value,
        enabled,
        validity: snapshot.validity(key),
        error: snapshot.displayed_error(key),
        passes: snapshot
            .field_meta
            .get(&key)
            .is_none_or(FieldMeta::is_valid),
    }
}

fn wrong_kind(field: Field, input: FieldKind) -> FormError {
    FormError::WrongFieldKind {
        field: field.key(),
        input: input.as_str(),
    }
}

fn unavailable(field: Field, value: String) -> FormError {
    FormError::OptionUnavailable {
        field: field.key(),
        value,
    }
}
