//! Set-once cells for singleton descriptor keys.

use crate::error::{Error, Result};

/// A descriptor field that may be given at most once.
///
/// `name` is the field group as reported in errors, so keys that share a
/// cell (`Cover` and `Network-Cover`) collide with each other.
#[derive(Debug)]
pub(crate) struct SetOnce<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> SetOnce<T> {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self { name, value: None }
    }

    /// Set the value, building it only when the cell is still empty.
    pub(crate) fn set_with(&mut self, build: impl FnOnce() -> Result<T>) -> Result<()> {
        if self.value.is_some() {
            return Err(Error::descriptor(format!("Duplicate key {}", self.name)));
        }
        self.value = Some(build()?);
        Ok(())
    }

    pub(crate) fn set(&mut self, value: T) -> Result<()> {
        self.set_with(|| Ok(value))
    }

    /// Take the value of a required field.
    pub(crate) fn required(self) -> Result<T> {
        self.value
            .ok_or_else(|| Error::descriptor(format!("Missing required key {}", self.name)))
    }

    pub(crate) fn into_inner(self) -> Option<T> {
        self.value
    }
}
