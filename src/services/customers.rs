//! Customer CRUD workflows behind `/api/customers`.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::{Customer, CustomerDetails, NewCustomer, UpdateCustomer};
use crate::domain::permissions::Action;
use crate::domain::types::CustomerId;
use crate::domain::user::{SessionUser, User};
use crate::dto::api::{DeletedCustomer, Page, PaginationMeta};
use crate::forms::customer::{
    AssignManagersForm, CreateCustomerForm, CustomerListForm, CustomerListRequest,
    UpdateCustomerForm,
};
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, UserReader, UserWriter, Visibility,
};
use crate::services::session::{authorize, resolve_session};
use crate::services::{ServiceError, ServiceResult};

fn visibility(session: &SessionUser) -> Visibility {
    if session.can(Action::ViewAllCustomers) {
        Visibility::All
    } else {
        Visibility::OwnedOrAssigned(session.id)
    }
}

fn parse_customer_id(raw: &str) -> ServiceResult<CustomerId> {
    raw.parse()
        .map_err(|_| ServiceError::validation("Invalid customer ID format"))
}

/// Hides rows outside the caller's visibility behind [`ServiceError::NotFound`].
fn ensure_visible<R>(repo: &R, session: &SessionUser, id: CustomerId) -> ServiceResult<()>
where
    R: CustomerReader + ?Sized,
{
    if repo.is_customer_visible(id, visibility(session))? {
        Ok(())
    } else {
        Err(ServiceError::NotFound)
    }
}

fn query_customers<R>(
    repo: &R,
    session: &SessionUser,
    request: CustomerListRequest,
) -> ServiceResult<Page<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let mut query = CustomerListQuery::new(visibility(session))
        .sort(request.sort, request.order)
        .paginate(request.page, request.limit);
    if let Some(status) = request.status {
        query = query.status(status);
    }
    if let Some(search) = request.search {
        query = query.search(search);
    }

    let (total, items) = repo.list_customers(query)?;

    Ok(Page {
        items,
        pagination: PaginationMeta::new(total, request.page, request.limit),
    })
}

/// Lists customers visible to the caller. The `query` parameter is ignored.
pub fn list_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CustomerListForm,
) -> ServiceResult<Page<Customer>>
where
    R: CustomerReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::ViewCustomers)?;

    let mut request = CustomerListRequest::try_from(form)?;
    request.search = None;

    query_customers(repo, &session, request)
}

/// Lists customers whose name, email or phone contains the `query` text.
pub fn search_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CustomerListForm,
) -> ServiceResult<Page<Customer>>
where
    R: CustomerReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::ViewCustomers)?;

    let request = CustomerListRequest::try_from(form)?;

    query_customers(repo, &session, request)
}

pub fn get_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: &str,
) -> ServiceResult<CustomerDetails>
where
    R: CustomerReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::ViewCustomers)?;
    let id = parse_customer_id(customer_id)?;

    ensure_visible(repo, &session, id)?;
    let customer = repo.get_customer(id)?.ok_or(ServiceError::NotFound)?;
    let managers = repo.list_customer_managers(id)?;

    Ok(CustomerDetails { customer, managers })
}

pub fn create_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateCustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::CreateCustomer)?;

    let new_customer = NewCustomer::try_from(form)?;
    let customer = repo.create_customer(&new_customer, session.id)?;

    log::info!("{} created customer {}", session.email, customer.id);
    Ok(customer)
}

/// Applies a partial update. An empty update returns the stored record.
pub fn update_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: &str,
    form: UpdateCustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::EditCustomer)?;
    let id = parse_customer_id(customer_id)?;
    let updates = UpdateCustomer::try_from(form)?;

    ensure_visible(repo, &session, id)?;
    if updates.is_empty() {
        return repo.get_customer(id)?.ok_or(ServiceError::NotFound);
    }

    Ok(repo.update_customer(id, &updates)?)
}

pub fn delete_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: &str,
) -> ServiceResult<DeletedCustomer>
where
    R: CustomerReader + CustomerWriter + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::DeleteCustomer)?;
    let id = parse_customer_id(customer_id)?;

    ensure_visible(repo, &session, id)?;
    repo.delete_customer(id)?;

    log::info!("{} deleted customer {id}", session.email);
    Ok(DeletedCustomer {
        id: id.to_string(),
        deleted: true,
    })
}

/// Replaces the set of users managing a customer.
pub fn assign_managers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: &str,
    form: AssignManagersForm,
) -> ServiceResult<Vec<User>>
where
    R: CustomerReader + CustomerWriter + UserReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::AssignManagers)?;
    let id = parse_customer_id(customer_id)?;
    let user_ids = form.into_user_ids()?;

    repo.get_customer(id)?.ok_or(ServiceError::NotFound)?;
    for user_id in &user_ids {
        if repo.get_user(*user_id)?.is_none() {
            return Err(ServiceError::validation(format!("Unknown user {user_id}")));
        }
    }

    repo.assign_managers(id, &user_ids)?;
    Ok(repo.list_customer_managers(id)?)
}
