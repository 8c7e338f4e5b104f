//! List state of the customers screen and the fetches that drive it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::client::api::{CustomerApi, CustomerCollection};
use crate::client::errors::{MutationError, Operation, SyncError};
use crate::client::optimistic::{Entry, OptimisticList};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::query::ListQuery;
use crate::domain::types::{CustomerId, CustomerStatus, SortOrder};
use crate::dto::api::Page;
use crate::pagination::{Paginated, page_links};

/// Fetches one page for `query`: a search when it carries search text, a
/// plain listing otherwise. Issues exactly one request.
pub async fn fetch_page<A>(api: &A, query: &ListQuery) -> Result<Page<Customer>, SyncError>
where
    A: CustomerApi + ?Sized,
{
    if query.search_term().is_some() {
        api.search(query).await
    } else {
        api.list(query).await
    }
}

/// Searches for `text` using the paging and filters of `query`.
///
/// Blank text yields an empty page without contacting the server.
pub async fn search<A>(api: &A, text: &str, query: &ListQuery) -> Result<Page<Customer>, SyncError>
where
    A: CustomerApi + ?Sized,
{
    let query = query.clone().search(text);
    if query.search_term().is_none() {
        return Ok(Page::empty(query.page, query.page_size));
    }
    api.search(&query).await
}

/// What happened to the response of a [`CustomerList::refresh`].
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied,
    Failed(SyncError),
    /// A newer fetch was issued while this one was in flight.
    Stale,
}

pub struct CustomerList<A: CustomerApi> {
    api: Rc<A>,
    items: OptimisticList<CustomerCollection<A>>,
    query: RefCell<ListQuery>,
    total: Cell<usize>,
    error: RefCell<Option<String>>,
    loading: Cell<bool>,
    generation: Cell<u64>,
}

impl<A: CustomerApi> CustomerList<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self::with_query(api, ListQuery::default())
    }

    /// Starts from a query decoded from the URL.
    pub fn with_query(api: Rc<A>, query: ListQuery) -> Self {
        Self {
            items: OptimisticList::new(CustomerCollection::new(Rc::clone(&api))),
            api,
            query: RefCell::new(query.normalized()),
            total: Cell::new(0),
            error: RefCell::new(None),
            loading: Cell::new(false),
            generation: Cell::new(0),
        }
    }

    pub fn query(&self) -> ListQuery {
        self.query.borrow().clone()
    }

    pub fn items(&self) -> Vec<Customer> {
        self.items.items()
    }

    pub fn entries(&self) -> Vec<Entry<Customer, CustomerId>> {
        self.items.entries()
    }

    pub fn total_count(&self) -> usize {
        self.total.get()
    }

    /// Message of the last failed fetch, cleared by the next successful one.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn total_pages(&self) -> usize {
        self.query.borrow().total_pages(self.total.get())
    }

    pub fn page_links(&self) -> Vec<Option<usize>> {
        page_links(self.query.borrow().page, self.total_pages())
    }

    /// Current items with their paging block.
    pub fn view(&self) -> Paginated<Customer> {
        Paginated::new(
            self.items(),
            self.query.borrow().page,
            self.total.get(),
            self.total_pages(),
        )
    }

    /// Fetches the page described by the current query.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.loading.set(true);

        let query = self.query();
        let result = fetch_page(self.api.as_ref(), &query).await;

        if generation != self.generation.get() {
            log::debug!("Discarding response of fetch {generation}");
            return RefreshOutcome::Stale;
        }
        self.loading.set(false);

        match result {
            Ok(page) => {
                self.total.set(page.pagination.total);
                self.items.replace(page.items);
                *self.error.borrow_mut() = None;
                RefreshOutcome::Applied
            }
            Err(err) => {
                log::warn!("Failed to load customers: {err}");
                *self.error.borrow_mut() = Some(err.user_message(Operation::Load));
                RefreshOutcome::Failed(err)
            }
        }
    }

    pub async fn set_page(&self, page: usize) -> RefreshOutcome {
        self.update_query(|q| q.page = page);
        self.refresh().await
    }

    pub async fn set_page_size(&self, page_size: usize) -> RefreshOutcome {
        self.update_query(|q| {
            q.page_size = page_size;
            q.page = 1;
        });
        self.refresh().await
    }

    pub async fn set_status(&self, status: Option<CustomerStatus>) -> RefreshOutcome {
        self.update_query(|q| {
            q.status = status;
            q.page = 1;
        });
        self.refresh().await
    }

    pub async fn set_search(&self, text: impl Into<String>) -> RefreshOutcome {
        let text = text.into();
        self.update_query(|q| {
            q.search_text = text;
            q.page = 1;
        });
        self.refresh().await
    }

    /// Changes the ordering; the current page is kept.
    pub async fn set_sort(&self, field: impl Into<String>, order: SortOrder) -> RefreshOutcome {
        let field = field.into();
        self.update_query(|q| {
            q.sort_field = field;
            q.sort_order = order;
        });
        self.refresh().await
    }

    fn update_query(&self, change: impl FnOnce(&mut ListQuery)) {
        let mut query = self.query.borrow_mut();
        change(&mut query);
        *query = query.clone().normalized();
    }

    pub async fn add(&self, customer: NewCustomer) -> Result<Customer, MutationError> {
        let created = self.items.add(customer).await?;
        self.total.set(self.total.get() + 1);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: CustomerId,
        update: UpdateCustomer,
    ) -> Result<Customer, MutationError> {
        self.items.update(id, update).await
    }

    pub async fn remove(&self, id: CustomerId) -> Result<(), MutationError> {
        self.items.remove(id).await?;
        self.total.set(self.total.get().saturating_sub(1));
        Ok(())
    }
}
