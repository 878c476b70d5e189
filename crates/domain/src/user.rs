use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// A doctor or patient of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
    /// Phone number shared with the doctor of an appointment
    pub contact: Option<String>,
    pub disabled: bool,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            name: name.into(),
            email: email.into(),
            contact: None,
            disabled: false,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
