//! Tri-state field updates.
//!
//! An update payload has to tell apart a field that was not sent (leave the
//! stored value alone) from a field explicitly cleared. `Option<Option<T>>`
//! can encode that but reads badly at call sites, so updates use [`Patch`].

use sea_orm::ActiveValue;

/// Change requested for one nullable field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the payload: keep the stored value.
    #[default]
    Unset,
    /// Field explicitly set to null: clear the stored value.
    Null,
    /// Field set to a new value.
    Value(T),
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Value the field ends up with, given what is stored today.
    pub fn resolve(self, existing: Option<T>) -> Option<T> {
        match self {
            Self::Unset => existing,
            Self::Null => None,
            Self::Value(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Unset => Patch::Unset,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(f(value)),
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Unset => Patch::Unset,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(value),
        }
    }

    /// Column update for a nullable column. `Null` maps to `Set(None)`, so an
    /// explicit clear is never pruned together with unset fields.
    pub fn into_active_value<V>(self) -> ActiveValue<Option<V>>
    where
        V: From<T>,
        Option<V>: Into<sea_orm::Value>,
    {
        match self {
            Self::Unset => ActiveValue::NotSet,
            Self::Null => ActiveValue::Set(None),
            Self::Value(value) => ActiveValue::Set(Some(V::from(value))),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` sets the value, `None` clears it.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

/// Column update for a non-nullable column: `None` leaves it untouched.
pub(crate) fn set_if<T, V>(value: Option<T>) -> ActiveValue<V>
where
    V: From<T> + Into<sea_orm::Value>,
{
    match value {
        Some(value) => ActiveValue::Set(V::from(value)),
        None => ActiveValue::NotSet,
    }
}
