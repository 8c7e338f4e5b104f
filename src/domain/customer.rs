use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CustomerAddress, CustomerEmail, CustomerId, CustomerName, CustomerPhone, CustomerStatus,
    UserId,
};
use crate::domain::user::User;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<CustomerPhone>,
    pub address: Option<CustomerAddress>,
    pub status: CustomerStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Author of the record; immutable after creation.
    pub created_by: Option<UserId>,
}

/// Validated creation payload. Identifier and timestamps are assigned by the
/// persistence layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewCustomer {
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<CustomerPhone>,
    pub address: Option<CustomerAddress>,
    #[serde(default)]
    pub status: CustomerStatus,
}

impl NewCustomer {
    #[must_use]
    pub fn new(name: CustomerName) -> Self {
        Self {
            name,
            email: None,
            phone: None,
            address: None,
            status: CustomerStatus::default(),
        }
    }

    #[must_use]
    pub fn email(mut self, email: CustomerEmail) -> Self {
        self.email = Some(email);
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: CustomerPhone) -> Self {
        self.phone = Some(phone);
        self
    }

    #[must_use]
    pub fn address(mut self, address: CustomerAddress) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update. `None` leaves a field untouched; for the nullable contact
/// fields `Some(None)` clears the stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<CustomerName>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub email: Option<Option<CustomerEmail>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub phone: Option<Option<CustomerPhone>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub address: Option<Option<CustomerAddress>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
}

/// Distinguishes an explicit `null` from an absent field.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl UpdateCustomer {
    /// Returns `true` when the update would not change any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.status.is_none()
    }

    #[must_use]
    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn name(mut self, name: CustomerName) -> Self {
        self.name = Some(name);
        self
    }

    /// Merges the update into an existing customer in place.
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(address) = &self.address {
            customer.address = address.clone();
        }
        if let Some(status) = self.status {
            customer.status = status;
        }
    }
}

/// Customer together with the users assigned to manage it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetails {
    #[serde(flatten)]
    pub customer: Customer,
    pub managers: Vec<User>,
}
