use super::controller::{FieldKey, FieldMeta, FormSnapshot};
use super::validation::ValidationError;

/// Validity as a user sees it: errors stay silent until the field is touched or a
/// submission has been attempted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Validity {
    Untouched,
    Valid,
    Invalid,
}

impl<T, E> FormSnapshot<T, E>
where
    E: ValidationError,
{
    pub fn is_revealed(&self, key: FieldKey) -> bool {
        self.submit_count > 0 || self.field_meta.get(&key).is_some_and(FieldMeta::is_touched)
    }

    pub fn validity(&self, key: FieldKey) -> Validity {
        if !self.is_revealed(key) {
            return Validity::Untouched;
        }
        match self.field_meta.get(&key) {
            Some(meta) if !meta.is_valid() => Validity::Invalid,
            _ => Validity::Valid,
        }
    }

    pub fn displayed_error(&self, key: FieldKey) -> Option<String> {
        if !self.is_revealed(key) {
            return None;
        }
        self.field_meta
            .get(&key)
            .and_then(|meta| meta.errors.first())
            .map(ValidationError::message)
    }
}
