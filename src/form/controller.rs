use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::validation::ValidationError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Whether a field has lost focus at least once since the last reset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Interaction {
    #[default]
    Untouched,
    Touched,
}

/// Submission lifecycle: `Idle -> Submitting -> Success -> Reset -> Idle`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Success,
    Reset,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    /// Stop at the first failing validator of a field.
    pub validate_first_error_only: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta<E> {
    pub dirty: bool,
    pub interaction: Interaction,
    pub errors: Vec<E>,
}

impl<E> FieldMeta<E> {
    pub fn is_touched(&self) -> bool {
        self.interaction == Interaction::Touched
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E> Default for FieldMeta<E> {
    fn default() -> Self {
        Self {
            dirty: false,
            interaction: Interaction::Untouched,
            errors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub focused: Option<FieldKey>,
    pub field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

impl<T, E> FormSnapshot<T, E> {
    /// Submit is offered only from `Idle` and only while every field passes.
    pub fn can_submit(&self) -> bool {
        self.submit_state == SubmitState::Idle && self.is_valid
    }
}

/// Change notifications delivered to subscribers after the state lock is released.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormEvent {
    ValueChanged(FieldKey),
    Focused(FieldKey),
    Touched(FieldKey),
    Validated { key: FieldKey, valid: bool },
    SubmitAttempted { accepted: bool },
    SubmitStateChanged { from: SubmitState, to: SubmitState },
    Reset,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome<R> {
    Rejected,
    Completed(R),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    SubmissionInProgress,
    FieldDisabled(FieldKey),
    OptionUnavailable { field: FieldKey, value: String },
    WrongFieldKind { field: FieldKey, input: &'static str },
    DatasetInvalid(String),
    ConfigInvalid(String),
    SpawnFailed(String),
    SubmissionAborted,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid submit state transition: {from:?} -> {to:?}")
            }
            FormError::SubmissionInProgress => f.write_str("form submission is in progress"),
            FormError::FieldDisabled(field) => write!(f, "field {field} is disabled"),
            FormError::OptionUnavailable { field, value } => {
                write!(f, "{value:?} is not an available option for {field}")
            }
            FormError::WrongFieldKind { field, input } => {
                write!(f, "field {field} does not accept {input} input")
            }
            FormError::DatasetInvalid(error) => write!(f, "invalid location dataset: {error}"),
            FormError::ConfigInvalid(error) => write!(f, "invalid engine options: {error}"),
            FormError::SpawnFailed(error) => write!(f, "failed to start submission cycle: {error}"),
            FormError::SubmissionAborted => {
                f.write_str("submission cycle ended without reporting a result")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type SyncFieldValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;
pub(super) type Listener = Arc<dyn Fn(&FormEvent) + Send + Sync>;

pub(super) struct FormState<T, E> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
    pub(super) focused: Option<FieldKey>,
}

impl<T, E> FormState<T, E> {
    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta<E> {
        self.field_meta.entry(key).or_default()
    }

    pub(super) fn ensure_editable(&self) -> FormResult<()> {
        if self.submit_state == SubmitState::Idle {
            Ok(())
        } else {
            Err(FormError::SubmissionInProgress)
        }
    }

    pub(super) fn is_valid(&self) -> bool {
        self.field_meta.values().all(FieldMeta::is_valid)
    }
}

#[derive(Clone)]
pub struct FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<T, E>>>,
    pub(super) sync_field_validators:
        Arc<RwLock<BTreeMap<FieldKey, Vec<SyncFieldValidatorFn<T, E>>>>>,
    pub(super) dependencies: Arc<RwLock<BTreeMap<FieldKey, BTreeSet<FieldKey>>>>,
    pub(super) listeners: Arc<RwLock<Vec<Listener>>>,
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn new(initial: T, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                dirty_fields: BTreeSet::new(),
                field_meta: BTreeMap::new(),
                focused: None,
            })),
            sync_field_validators: Arc::new(RwLock::new(BTreeMap::new())),
            dependencies: Arc::new(RwLock::new(BTreeMap::new())),
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&FormEvent) + Send + Sync + 'static) -> FormResult<()> {
        let mut listeners = write_lock(&self.listeners, "registering form listener")?;
        listeners.push(Arc::new(listener));
        Ok(())
    }

    pub fn focus(&self, key: FieldKey) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "focusing field")?;
            state.ensure_editable()?;
            state.focused = Some(key);
        }
        self.emit(FormEvent::Focused(key))
    }

    /// Counts a submit attempt and validates the whole form under one lock.
    ///
    /// A valid form moves `Idle -> Submitting` and the model to submit is returned. An
    /// invalid form stays `Idle` with its errors revealed and yields `None`.
    pub fn begin_submit(&self) -> FormResult<Option<T>> {
        let (model, results) = {
            let mut guard = write_lock(&self.state, "preparing submit")?;
            let state = &mut *guard;
            state.ensure_editable()?;
            state.submit_count = state.submit_count.saturating_add(1);
            let results = self.validate_all(state)?;
            let model = if state.is_valid() {
                transition_submit_state(state, SubmitState::Submitting)?;
                Some(state.model.clone())
            } else {
                None
            };
            (model, results)
        };

        self.emit_validated(results)?;
        self.emit(FormEvent::SubmitAttempted {
            accepted: model.is_some(),
        })?;
        match &model {
            Some(_) => self.emit(FormEvent::SubmitStateChanged {
                from: SubmitState::Idle,
                to: SubmitState::Submitting,
            })?,
            None => tracing::debug!("submit rejected: form has invalid fields"),
        }
        Ok(model)
    }

    /// Ends the `Submitting` phase: `Success` when the submission went through, back to
    /// `Idle` otherwise.
    pub fn finish_submit(&self, succeeded: bool) -> FormResult<()> {
        let next = if succeeded {
            SubmitState::Success
        } else {
            SubmitState::Idle
        };
        {
            let mut state = write_lock(&self.state, "completing submit")?;
            transition_submit_state(&mut state, next)?;
        }
        self.emit(FormEvent::SubmitStateChanged {
            from: SubmitState::Submitting,
            to: next,
        })
    }

    /// Finishes a successful submission: `Success -> Reset -> Idle`, restoring the initial model.
    pub fn complete_reset(&self) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "entering reset")?;
            transition_submit_state(&mut state, SubmitState::Reset)?;
        }
        self.emit(FormEvent::SubmitStateChanged {
            from: SubmitState::Success,
            to: SubmitState::Reset,
        })?;

        let results = {
            let mut guard = write_lock(&self.state, "resetting form")?;
            let state = &mut *guard;
            state.model = state.initial_model.clone();
            state.submit_count = 0;
            state.dirty_fields.clear();
            state.focused = None;
            for meta in state.field_meta.values_mut() {
                meta.dirty = false;
                meta.interaction = Interaction::Untouched;
            }
            self.validate_all(state)?
        };
        self.emit(FormEvent::Reset)?;
        self.emit_validated(results)?;

        {
            let mut state = write_lock(&self.state, "leaving reset")?;
            transition_submit_state(&mut state, SubmitState::Idle)?;
        }
        self.emit(FormEvent::SubmitStateChanged {
            from: SubmitState::Reset,
            to: SubmitState::Idle,
        })
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid: state.is_valid(),
            focused: state.focused,
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn can_submit(&self) -> FormResult<bool> {
        let state = read_lock(&self.state, "reading submit availability")?;
        Ok(state.submit_state == SubmitState::Idle && state.is_valid())
    }

    pub(super) fn emit(&self, event: FormEvent) -> FormResult<()> {
        let listeners = read_lock(&self.listeners, "reading form listeners")?.clone();
        for listener in listeners {
            listener(&event);
        }
        Ok(())
    }

    pub(super) fn emit_validated(&self, results: Vec<(FieldKey, bool)>) -> FormResult<()> {
        for (key, valid) in results {
            self.emit(FormEvent::Validated { key, valid })?;
        }
        Ok(())
    }
}

pub(super) fn transition_submit_state<T, E>(
    state: &mut FormState<T, E>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Success)
            | (SubmitState::Submitting, SubmitState::Idle)
            | (SubmitState::Success, SubmitState::Reset)
            | (SubmitState::Reset, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    tracing::debug!(from = ?current, to = ?next, "submit state transition");
    state.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
