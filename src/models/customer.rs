use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};
use crate::domain::types::{
    CustomerAddress, CustomerEmail, CustomerId, CustomerName, CustomerPhone, TypeConstraintError,
    UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`].
pub struct NewCustomer<'a> {
    pub id: String,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
/// Data used when updating a [`Customer`] record. `None` fields are skipped.
pub struct UpdateCustomer<'a> {
    pub name: Option<&'a str>,
    pub email: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub address: Option<Option<&'a str>>,
    pub status: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customer_managers)]
pub struct NewCustomerManager {
    pub customer_id: String,
    pub user_id: String,
    pub assigned_at: NaiveDateTime,
}

impl TryFrom<Customer> for DomainCustomer {
    type Error = TypeConstraintError;

    fn try_from(customer: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: customer.id.parse::<CustomerId>()?,
            name: CustomerName::new(customer.name)?,
            email: customer.email.map(CustomerEmail::new).transpose()?,
            phone: customer.phone.map(CustomerPhone::new).transpose()?,
            address: customer.address.map(CustomerAddress::new).transpose()?,
            status: customer.status.parse()?,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
            created_by: customer
                .created_by
                .as_deref()
                .map(str::parse::<UserId>)
                .transpose()?,
        })
    }
}

impl<'a> NewCustomer<'a> {
    /// Builds the insertable row, assigning a fresh id and timestamps.
    pub fn from_domain(
        customer: &'a DomainNewCustomer,
        created_by: UserId,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: CustomerId::generate().to_string(),
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(CustomerEmail::as_str),
            phone: customer.phone.as_ref().map(CustomerPhone::as_str),
            address: customer.address.as_ref().map(CustomerAddress::as_str),
            status: customer.status.as_str(),
            created_at: now,
            updated_at: now,
            created_by: Some(created_by.to_string()),
        }
    }
}

impl<'a> UpdateCustomer<'a> {
    pub fn from_domain(updates: &'a DomainUpdateCustomer, now: NaiveDateTime) -> Self {
        Self {
            name: updates.name.as_ref().map(CustomerName::as_str),
            email: updates
                .email
                .as_ref()
                .map(|email| email.as_ref().map(CustomerEmail::as_str)),
            phone: updates
                .phone
                .as_ref()
                .map(|phone| phone.as_ref().map(CustomerPhone::as_str)),
            address: updates
                .address
                .as_ref()
                .map(|address| address.as_ref().map(CustomerAddress::as_str)),
            status: updates.status.map(|status| status.as_str()),
            updated_at: now,
        }
    }
}
