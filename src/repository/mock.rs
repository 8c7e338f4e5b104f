//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerId, UserId, UserRole};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, UserListQuery, UserReader, UserWriter,
    Visibility,
};

mock! {
    pub Repository {}

    impl CustomerReader for Repository {
        fn get_customer(&self, id: CustomerId) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
        fn list_customer_managers(&self, id: CustomerId) -> RepositoryResult<Vec<User>>;
        fn is_customer_visible(
            &self,
            id: CustomerId,
            visibility: Visibility,
        ) -> RepositoryResult<bool>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(
            &self,
            new_customer: &NewCustomer,
            created_by: UserId,
        ) -> RepositoryResult<Customer>;
        fn update_customer(
            &self,
            id: CustomerId,
            updates: &UpdateCustomer,
        ) -> RepositoryResult<Customer>;
        fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()>;
        fn assign_managers(&self, id: CustomerId, user_ids: &[UserId]) -> RepositoryResult<usize>;
    }

    impl UserReader for Repository {
        fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    }

    impl UserWriter for Repository {
        fn ensure_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user_role(&self, id: UserId, role: UserRole) -> RepositoryResult<User>;
    }
}
