//! The `Person` record handed out by repositories.

use std::fmt;

/// An immutable person record.
///
/// Descriptive fields are optional so that placeholder records carrying only an
/// id can be built with [`Person::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Person {
    id: i32,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl Person {
    pub fn new(id: i32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Person {
            id,
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }

    pub fn builder() -> PersonBuilder {
        PersonBuilder::default()
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Returns true if neither name is set.
    pub fn is_placeholder(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Person(id={}, firstName={}, lastName={})",
            self.id,
            self.first_name.as_deref().unwrap_or("null"),
            self.last_name.as_deref().unwrap_or("null"),
        )
    }
}

/// Builder for [`Person`]. Unset names stay `None`.
#[derive(Debug, Clone, Default)]
pub struct PersonBuilder {
    id: i32,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl PersonBuilder {
    pub fn id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn build(self) -> Person {
        Person {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}
