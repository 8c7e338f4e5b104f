//! In-memory [`CustomerApi`] used by the client tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::client::api::CustomerApi;
use crate::client::errors::SyncError;
use crate::domain::customer::{Customer, CustomerDetails, NewCustomer, UpdateCustomer};
use crate::domain::query::ListQuery;
use crate::domain::types::{CustomerId, CustomerName, CustomerStatus, UserId, UserRole};
use crate::domain::user::User;
use crate::dto::api::{PaginationMeta, Page};

pub fn customer(name: &str, status: CustomerStatus) -> Customer {
    let now = Utc::now().naive_utc();
    Customer {
        id: CustomerId::generate(),
        name: CustomerName::new(name).unwrap(),
        email: None,
        phone: None,
        address: None,
        status,
        created_at: now,
        updated_at: now,
        created_by: None,
    }
}

pub struct FakeApi {
    pub store: RefCell<Vec<Customer>>,
    pub user: User,
    pub list_calls: Cell<usize>,
    pub search_calls: Cell<usize>,
    pub user_calls: Cell<usize>,
    fail_next: RefCell<Option<SyncError>>,
    fetch_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub fn new(role: UserRole) -> Self {
        Self {
            store: RefCell::new(Vec::new()),
            user: User {
                id: UserId::generate(),
                email: "ann@example.com".into(),
                role,
                created_at: Utc::now().naive_utc(),
            },
            list_calls: Cell::new(0),
            search_calls: Cell::new(0),
            user_calls: Cell::new(0),
            fail_next: RefCell::new(None),
            fetch_gates: RefCell::new(VecDeque::new()),
        }
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let api = Self::new(UserRole::Admin);
        *api.store.borrow_mut() = customers;
        api
    }

    /// The next call of any kind fails with `error`.
    pub fn fail_next(&self, error: SyncError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    /// The next list or search call waits until the returned sender fires.
    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.fetch_gates.borrow_mut().push_back(rx);
        tx
    }

    fn injected(&self) -> Result<(), SyncError> {
        match self.fail_next.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn fetch(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError> {
        let gate = self.fetch_gates.borrow_mut().pop_front();
        self.injected()?;
        let term = query.search_term().map(str::to_lowercase);
        let matching: Vec<Customer> = self
            .store
            .borrow()
            .iter()
            .filter(|c| query.status.is_none_or(|s| c.status == s))
            .filter(|c| {
                term.as_deref()
                    .is_none_or(|t| c.name.as_str().to_lowercase().contains(t))
            })
            .cloned()
            .collect();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(query.offset())
            .take(query.page_size)
            .collect();
        Ok(Page {
            items,
            pagination: PaginationMeta::new(total, query.page, query.page_size),
        })
    }
}

#[async_trait(?Send)]
impl CustomerApi for FakeApi {
    async fn list(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.fetch(&query.clone().search("")).await
    }

    async fn search(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError> {
        if query.search_term().is_none() {
            return Ok(Page::empty(query.page, query.page_size));
        }
        self.search_calls.set(self.search_calls.get() + 1);
        self.fetch(query).await
    }

    async fn get(&self, id: CustomerId) -> Result<CustomerDetails, SyncError> {
        self.injected()?;
        let customer = self
            .store
            .borrow()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(SyncError::NotFound)?;
        Ok(CustomerDetails {
            customer,
            managers: vec![],
        })
    }

    async fn create(&self, new: &NewCustomer) -> Result<Customer, SyncError> {
        self.injected()?;
        let duplicate = new.email.is_some()
            && self.store.borrow().iter().any(|c| c.email == new.email);
        if duplicate {
            return Err(SyncError::Conflict("Email already in use".into()));
        }
        let mut created = customer(new.name.as_str(), new.status);
        created.email = new.email.clone();
        created.phone = new.phone.clone();
        created.address = new.address.clone();
        created.created_by = Some(self.user.id);
        self.store.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: CustomerId, update: &UpdateCustomer) -> Result<Customer, SyncError> {
        self.injected()?;
        let mut store = self.store.borrow_mut();
        let customer = store
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SyncError::NotFound)?;
        update.apply_to(customer);
        customer.updated_at = Utc::now().naive_utc();
        Ok(customer.clone())
    }

    async fn delete(&self, id: CustomerId) -> Result<(), SyncError> {
        self.injected()?;
        let mut store = self.store.borrow_mut();
        let before = store.len();
        store.retain(|c| c.id != id);
        if store.len() == before {
            return Err(SyncError::NotFound);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<User, SyncError> {
        self.user_calls.set(self.user_calls.get() + 1);
        self.injected()?;
        Ok(self.user.clone())
    }
}
