//! HTTP transport for the customer API.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::errors::SyncError;
use crate::client::optimistic::RemoteCollection;
use crate::client::query::api_params;
use crate::domain::customer::{Customer, CustomerDetails, NewCustomer, UpdateCustomer};
use crate::domain::query::ListQuery;
use crate::domain::types::CustomerId;
use crate::domain::user::User;
use crate::dto::api::{ApiEnvelope, DeletedCustomer, Page};

/// Where and how the client reaches the server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `https://crm.example.com`.
    pub base_url: String,
    /// Bearer token issued by the auth provider.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Operations of the customer API used by the client.
#[async_trait(?Send)]
pub trait CustomerApi {
    async fn list(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError>;
    /// Empty page, without a request, when the search text is blank.
    async fn search(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError>;
    async fn get(&self, id: CustomerId) -> Result<CustomerDetails, SyncError>;
    async fn create(&self, customer: &NewCustomer) -> Result<Customer, SyncError>;
    async fn update(&self, id: CustomerId, update: &UpdateCustomer)
    -> Result<Customer, SyncError>;
    async fn delete(&self, id: CustomerId) -> Result<(), SyncError>;
    async fn current_user(&self) -> Result<User, SyncError>;
}

pub struct HttpCustomerApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

fn transport_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Network(err.to_string())
    }
}

fn data_of<T>(envelope: ApiEnvelope<T>) -> Result<T, SyncError> {
    envelope
        .data
        .ok_or_else(|| SyncError::MalformedResponse("response has no data".into()))
}

fn page_of<T>(envelope: ApiEnvelope<Vec<T>>) -> Result<Page<T>, SyncError> {
    let pagination = envelope
        .pagination
        .ok_or_else(|| SyncError::MalformedResponse("list response has no pagination".into()))?;
    Ok(Page {
        items: data_of(envelope)?,
        pagination,
    })
}

impl HttpCustomerApi {
    pub fn new(config: ClientConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, SyncError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error);
            log::debug!("Request failed with {status}: {error:?}");
            return Err(SyncError::from_status(status.as_u16(), error));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;
        if !envelope.success {
            let message = envelope
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "request was not successful".into());
            return Err(SyncError::Server(message));
        }
        Ok(envelope)
    }
}

#[async_trait(?Send)]
impl CustomerApi for HttpCustomerApi {
    async fn list(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError> {
        let builder = self
            .request(Method::GET, "/customers")
            .query(&api_params(query));
        page_of(self.send(builder).await?)
    }

    async fn search(&self, query: &ListQuery) -> Result<Page<Customer>, SyncError> {
        if query.search_term().is_none() {
            return Ok(Page::empty(query.page, query.page_size));
        }
        let builder = self
            .request(Method::GET, "/customers/search")
            .query(&api_params(query));
        page_of(self.send(builder).await?)
    }

    async fn get(&self, id: CustomerId) -> Result<CustomerDetails, SyncError> {
        let builder = self.request(Method::GET, &format!("/customers/{id}"));
        data_of(self.send(builder).await?)
    }

    async fn create(&self, customer: &NewCustomer) -> Result<Customer, SyncError> {
        let builder = self.request(Method::POST, "/customers").json(customer);
        data_of(self.send(builder).await?)
    }

    async fn update(
        &self,
        id: CustomerId,
        update: &UpdateCustomer,
    ) -> Result<Customer, SyncError> {
        let builder = self
            .request(Method::PUT, &format!("/customers/{id}"))
            .json(update);
        data_of(self.send(builder).await?)
    }

    async fn delete(&self, id: CustomerId) -> Result<(), SyncError> {
        let builder = self.request(Method::DELETE, &format!("/customers/{id}"));
        let _: DeletedCustomer = data_of(self.send(builder).await?)?;
        Ok(())
    }

    async fn current_user(&self) -> Result<User, SyncError> {
        let builder = self.request(Method::GET, "/user");
        data_of(self.send(builder).await?)
    }
}

/// Customer endpoints seen as a [`RemoteCollection`].
pub struct CustomerCollection<A> {
    api: Rc<A>,
}

impl<A> CustomerCollection<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self { api }
    }
}

#[async_trait(?Send)]
impl<A: CustomerApi> RemoteCollection for CustomerCollection<A> {
    type Id = CustomerId;
    type Item = Customer;
    type Draft = NewCustomer;
    type Patch = UpdateCustomer;

    async fn create(&self, draft: &NewCustomer) -> Result<Customer, SyncError> {
        self.api.create(draft).await
    }

    async fn update(&self, id: &CustomerId, patch: &UpdateCustomer) -> Result<Customer, SyncError> {
        self.api.update(*id, patch).await
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), SyncError> {
        self.api.delete(*id).await
    }

    fn id_of(&self, item: &Customer) -> CustomerId {
        item.id
    }

    fn placeholder(&self, draft: &NewCustomer) -> Customer {
        let now = chrono::Utc::now().naive_utc();
        Customer {
            id: CustomerId::generate(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            status: draft.status,
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    fn merge(&self, item: &mut Customer, patch: &UpdateCustomer) {
        patch.apply_to(item);
    }
}
