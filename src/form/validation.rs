use std::collections::BTreeSet;
use std::sync::Arc;

use super::controller::{
    FieldKey, FormController, FormEvent, FormResult, FormState, Interaction,
    SyncFieldValidatorFn, read_lock, write_lock,
};

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> String;
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Every field key of the model, in declaration order.
    fn field_keys() -> &'static [FieldKey] {
        &[]
    }
}

pub trait FieldValidator<T, L, E>: Send + Sync
where
    L: FieldLens<T>,
    E: ValidationError,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E>;
}

impl<T, L, E, F> FieldValidator<T, L, E> for F
where
    L: FieldLens<T>,
    E: ValidationError,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), E> + Send + Sync,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E> {
        (self)(model, value)
    }
}

/// A pending write of one field, built from its lens. Several assignments passed to
/// [`FormController::set_many`] land under a single state lock.
pub struct FieldAssignment<T> {
    key: FieldKey,
    write: Box<dyn FnOnce(&mut T, &T) -> bool + Send>,
}

impl<T: 'static> FieldAssignment<T> {
    pub fn new<L>(lens: L, value: L::Value) -> Self
    where
        L: FieldLens<T>,
    {
        Self {
            key: lens.key(),
            write: Box::new(move |model: &mut T, initial: &T| {
                lens.set(model, value);
                lens.get(model) != lens.get(initial)
            }),
        }
    }
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn register_field_validator<L, V>(&self, lens: L, validator: V) -> FormResult<()>
    where
        L: FieldLens<T>,
        V: FieldValidator<T, L, E> + 'static,
    {
        let key = lens.key();
        let validator = Arc::new(validator);
        let wrapped: SyncFieldValidatorFn<T, E> =
            Arc::new(move |model: &T| validator.validate(model, lens.get(model)));
        let mut validators =
            write_lock(&self.sync_field_validators, "registering field validator")?;
        validators.entry(key).or_default().push(wrapped);
        Ok(())
    }

    /// Revalidates `dependent` whenever `source` is written.
    pub fn register_dependency<S, D>(&self, source: S, dependent: D) -> FormResult<()>
    where
        S: FieldLens<T>,
        D: FieldLens<T>,
    {
        let mut dependencies = write_lock(&self.dependencies, "registering dependency")?;
        dependencies
            .entry(source.key())
            .or_default()
            .insert(dependent.key());
        Ok(())
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        self.set_many([FieldAssignment::new(lens, value)])
    }

    /// Writes every assignment, then validates the written fields and their direct
    /// dependents, all under one state lock. Listeners only see the finished result.
    pub fn set_many<I>(&self, assignments: I) -> FormResult<()>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        let (written, results) = {
            let mut guard = write_lock(&self.state, "writing form model")?;
            let state = &mut *guard;
            state.ensure_editable()?;

            let mut written = Vec::new();
            for assignment in assignments {
                let key = assignment.key;
                let is_dirty = (assignment.write)(&mut state.model, &state.initial_model);
                if is_dirty {
                    state.dirty_fields.insert(key);
                } else {
                    state.dirty_fields.remove(&key);
                }
                state.ensure_meta(key).dirty = is_dirty;
                if !written.contains(&key) {
                    written.push(key);
                }
            }

            let mut affected = written.clone();
            for dependent in self.dependents_of(&written)? {
                if !affected.contains(&dependent) {
                    affected.push(dependent);
                }
            }
            let results = self.validate_keys(state, affected)?;
            (written, results)
        };

        for key in written {
            self.emit(FormEvent::ValueChanged(key))?;
        }
        self.emit_validated(results)
    }

    /// Blur: marks the field touched, drops its focus and revalidates it.
    pub fn touch_by_key(&self, key: FieldKey) -> FormResult<()> {
        let results = {
            let mut guard = write_lock(&self.state, "touching field")?;
            let state = &mut *guard;
            state.ensure_editable()?;
            state.ensure_meta(key).interaction = Interaction::Touched;
            if state.focused == Some(key) {
                state.focused = None;
            }
            self.validate_keys(state, [key])?
        };
        self.emit(FormEvent::Touched(key))?;
        self.emit_validated(results)
    }

    pub fn validate_form(&self) -> FormResult<bool> {
        let (results, is_valid) = {
            let mut guard = write_lock(&self.state, "validating form")?;
            let state = &mut *guard;
            let results = self.validate_all(state)?;
            (results, state.is_valid())
        };
        self.emit_validated(results)?;
        Ok(is_valid)
    }

    /// Validates every field that has validators or metadata.
    pub(super) fn validate_all(
        &self,
        state: &mut FormState<T, E>,
    ) -> FormResult<Vec<(FieldKey, bool)>> {
        let mut keys = read_lock(&self.sync_field_validators, "listing validated fields")?
            .keys()
            .copied()
            .collect::<BTreeSet<FieldKey>>();
        keys.extend(state.field_meta.keys().copied());
        self.validate_keys(state, keys)
    }

    pub(super) fn validate_keys(
        &self,
        state: &mut FormState<T, E>,
        keys: impl IntoIterator<Item = FieldKey>,
    ) -> FormResult<Vec<(FieldKey, bool)>> {
        let validators = read_lock(&self.sync_field_validators, "reading field validators")?;
        let mut results = Vec::new();
        for key in keys {
            let errors = validators
                .get(&key)
                .map(|validators| self.run_validators(&state.model, validators))
                .unwrap_or_default();
            let valid = errors.is_empty();
            tracing::trace!(field = %key, valid, "field validated");
            state.ensure_meta(key).errors = errors;
            results.push((key, valid));
        }
        Ok(results)
    }

    fn dependents_of(&self, sources: &[FieldKey]) -> FormResult<BTreeSet<FieldKey>> {
        let dependencies = read_lock(&self.dependencies, "reading field dependencies")?;
        Ok(sources
            .iter()
            .filter_map(|source| dependencies.get(source))
            .flatten()
            .copied()
            .collect())
    }

    fn run_validators(&self, model: &T, validators: &[SyncFieldValidatorFn<T, E>]) -> Vec<E> {
        let mut errors = Vec::new();
        for validator in validators {
            if let Err(error) = validator(model) {
                errors.push(error);
                if self.options.validate_first_error_only {
                    break;
                }
            }
        }
        errors
    }
}
