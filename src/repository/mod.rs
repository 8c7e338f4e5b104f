//! Persistence layer: query builders, repository traits and the Diesel
//! implementation backing the customer API.

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerId, CustomerStatus, SortField, SortOrder, UserId, UserRole};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;

pub mod customer;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod user;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset of the page, `None` when it lies beyond what SQLite can
    /// address. Such a page is past the last row, so it holds no items.
    pub fn offset(&self) -> Option<i64> {
        self.page
            .max(1)
            .saturating_sub(1)
            .checked_mul(self.per_page)
            .and_then(|offset| i64::try_from(offset).ok())
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Row-level visibility applied to customer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every customer in the store.
    All,
    /// Customers authored by, or assigned to, the given user.
    OwnedOrAssigned(UserId),
}

#[derive(Debug, Clone)]
pub struct CustomerListQuery {
    pub visibility: Visibility,
    pub status: Option<CustomerStatus>,
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            status: None,
            search: None,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            pagination: None,
        }
    }

    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait CustomerReader {
    fn get_customer(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    fn list_customer_managers(&self, id: CustomerId) -> RepositoryResult<Vec<User>>;
    fn is_customer_visible(&self, id: CustomerId, visibility: Visibility)
    -> RepositoryResult<bool>;
}

pub trait CustomerWriter {
    fn create_customer(
        &self,
        new_customer: &NewCustomer,
        created_by: UserId,
    ) -> RepositoryResult<Customer>;
    fn update_customer(&self, id: CustomerId, updates: &UpdateCustomer)
    -> RepositoryResult<Customer>;
    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()>;
    fn assign_managers(&self, id: CustomerId, user_ids: &[UserId]) -> RepositoryResult<usize>;
}

pub trait UserReader {
    fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

pub trait UserWriter {
    /// Returns the stored user, inserting it on first sight.
    fn ensure_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user_role(&self, id: UserId, role: UserRole) -> RepositoryResult<User>;
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
