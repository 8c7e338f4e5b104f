use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerId, SortField, SortOrder, UserId};
use crate::domain::user::User;
use crate::models::customer::{
    Customer as DbCustomer, NewCustomer as DbNewCustomer, NewCustomerManager,
    UpdateCustomer as DbUpdateCustomer,
};
use crate::models::user::User as DbUser;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository, Visibility,
};
use crate::schema::{customer_managers, customers, users};

type BoxedCustomers<'a> = customers::BoxedQuery<'a, Sqlite>;

fn apply_visibility<'a>(items: BoxedCustomers<'a>, visibility: Visibility) -> BoxedCustomers<'a> {
    match visibility {
        Visibility::All => items,
        Visibility::OwnedOrAssigned(user_id) => {
            let user_id = user_id.to_string();
            let assigned = customer_managers::table
                .filter(customer_managers::user_id.eq(user_id.clone()))
                .select(customer_managers::customer_id);
            items.filter(
                customers::created_by
                    .eq(user_id)
                    .or(customers::id.eq_any(assigned).nullable()),
            )
        }
    }
}

fn filtered(query: &CustomerListQuery) -> BoxedCustomers<'static> {
    let mut items = apply_visibility(customers::table.into_boxed(), query.visibility);

    if let Some(status) = query.status {
        items = items.filter(customers::status.eq(status.as_str()));
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        items = items.filter(
            customers::name
                .like(pattern.clone())
                .nullable()
                .or(customers::email.like(pattern.clone()))
                .or(customers::phone.like(pattern)),
        );
    }

    items
}

fn sorted(items: BoxedCustomers<'static>, field: SortField, order: SortOrder) -> BoxedCustomers<'static> {
    let items = match (field, order) {
        (SortField::Name, SortOrder::Asc) => items.order(customers::name.asc()),
        (SortField::Name, SortOrder::Desc) => items.order(customers::name.desc()),
        (SortField::Email, SortOrder::Asc) => items.order(customers::email.asc()),
        (SortField::Email, SortOrder::Desc) => items.order(customers::email.desc()),
        (SortField::Status, SortOrder::Asc) => items.order(customers::status.asc()),
        (SortField::Status, SortOrder::Desc) => items.order(customers::status.desc()),
        (SortField::CreatedAt, SortOrder::Asc) => items.order(customers::created_at.asc()),
        (SortField::CreatedAt, SortOrder::Desc) => items.order(customers::created_at.desc()),
        (SortField::UpdatedAt, SortOrder::Asc) => items.order(customers::updated_at.asc()),
        (SortField::UpdatedAt, SortOrder::Desc) => items.order(customers::updated_at.desc()),
    };
    // Stable paging across equal sort keys.
    items.then_order_by(customers::id.asc())
}

impl CustomerReader for DieselRepository {
    fn get_customer(&self, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let mut conn = self.conn()?;

        let customer = customers::table
            .find(id.to_string())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = sorted(filtered(&query), query.sort_field, query.sort_order);
        if let Some(pagination) = &query.pagination {
            let Some(offset) = pagination.offset() else {
                return Ok((total as usize, Vec::new()));
            };
            items = items.limit(pagination.limit()).offset(offset);
        }

        let customers = items
            .load::<DbCustomer>(&mut conn)?
            .into_iter()
            .map(Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, customers))
    }

    fn list_customer_managers(&self, id: CustomerId) -> RepositoryResult<Vec<User>> {
        let mut conn = self.conn()?;

        let managers = users::table
            .inner_join(customer_managers::table)
            .filter(customer_managers::customer_id.eq(id.to_string()))
            .order(users::email.asc())
            .select(users::all_columns)
            .load::<DbUser>(&mut conn)?;

        managers
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn is_customer_visible(
        &self,
        id: CustomerId,
        visibility: Visibility,
    ) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let count: i64 = apply_visibility(customers::table.into_boxed(), visibility)
            .filter(customers::id.eq(id.to_string()))
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(
        &self,
        new_customer: &NewCustomer,
        created_by: UserId,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;
        let insertable = DbNewCustomer::from_domain(new_customer, created_by, Utc::now().naive_utc());

        let created = diesel::insert_into(customers::table)
            .values(&insertable)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(Customer::try_from(created)?)
    }

    fn update_customer(
        &self,
        id: CustomerId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;
        let changeset = DbUpdateCustomer::from_domain(updates, Utc::now().naive_utc());

        let updated = diesel::update(customers::table.find(id.to_string()))
            .set(&changeset)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(Customer::try_from(updated)?)
    }

    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(customers::table.find(id.to_string())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn assign_managers(&self, id: CustomerId, user_ids: &[UserId]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let customer_id = id.to_string();
        let now = Utc::now().naive_utc();

        let mut unique = user_ids.to_vec();
        unique.sort_by_key(|user_id| user_id.to_string());
        unique.dedup();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                customer_managers::table.filter(customer_managers::customer_id.eq(&customer_id)),
            )
            .execute(conn)?;

            let rows: Vec<NewCustomerManager> = unique
                .iter()
                .map(|user_id| NewCustomerManager {
                    customer_id: customer_id.clone(),
                    user_id: user_id.to_string(),
                    assigned_at: now,
                })
                .collect();
            if rows.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(customer_managers::table)
                .values(&rows)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }
}
