use pushkind_customers::domain::customer::{NewCustomer, UpdateCustomer};
use pushkind_customers::domain::types::{
    CustomerEmail, CustomerId, CustomerName, CustomerPhone, CustomerStatus, SortField, SortOrder,
    UserId, UserRole,
};
use pushkind_customers::domain::user::{NewUser, User};
use pushkind_customers::repository::errors::RepositoryError;
use pushkind_customers::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository, UserListQuery,
    UserReader, UserWriter, Visibility,
};

mod common;

fn register(repo: &DieselRepository, email: &str, role: UserRole) -> User {
    repo.ensure_user(&NewUser {
        id: UserId::generate(),
        email: email.into(),
        role,
    })
    .unwrap()
}

fn new_customer(name: &str, email: &str) -> NewCustomer {
    NewCustomer::new(CustomerName::new(name).unwrap()).email(CustomerEmail::new(email).unwrap())
}

#[test]
fn test_customer_repository_crud() {
    let test_db = common::TestDb::new("test_customer_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);

    let alice = repo
        .create_customer(
            &new_customer("Alice", "alice@example.com")
                .phone(CustomerPhone::new("+1 555 0100").unwrap())
                .status(CustomerStatus::Active),
            admin.id,
        )
        .unwrap();
    let bob = repo
        .create_customer(&new_customer("Bob", "bob@example.com"), admin.id)
        .unwrap();

    assert_eq!(alice.created_by, Some(admin.id));
    assert_eq!(bob.status, CustomerStatus::Pending);
    assert_eq!(alice.created_at, alice.updated_at);

    let (total, items) = repo
        .list_customers(CustomerListQuery::new(Visibility::All))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let updated = repo
        .update_customer(
            bob.id,
            &UpdateCustomer::default()
                .name(CustomerName::new("Bobby").unwrap())
                .status(CustomerStatus::Inactive),
        )
        .unwrap();
    assert_eq!(updated.name.as_str(), "Bobby");
    assert_eq!(updated.status, CustomerStatus::Inactive);
    assert_eq!(updated.email, bob.email);
    assert!(updated.updated_at >= bob.updated_at);
    assert_eq!(updated.created_at, bob.created_at);

    repo.delete_customer(alice.id).unwrap();
    assert!(repo.get_customer(alice.id).unwrap().is_none());

    let (total, items) = repo
        .list_customers(CustomerListQuery::new(Visibility::All))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].name.as_str(), "Bobby");
}

#[test]
fn test_clearing_contact_fields() {
    let test_db = common::TestDb::new("test_clearing_contact_fields.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);
    let customer = repo
        .create_customer(&new_customer("Carol", "carol@example.com"), admin.id)
        .unwrap();

    let update: UpdateCustomer = serde_json::from_str(r#"{"email": null}"#).unwrap();
    let updated = repo.update_customer(customer.id, &update).unwrap();

    assert_eq!(updated.email, None);
    assert_eq!(updated.name.as_str(), "Carol");
}

#[test]
fn test_duplicate_email_is_a_constraint_violation() {
    let test_db = common::TestDb::new("test_duplicate_email.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);

    repo.create_customer(&new_customer("Ann", "ann@example.com"), admin.id)
        .unwrap();
    let err = repo
        .create_customer(&new_customer("Ann Again", "ANN@example.com"), admin.id)
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}

#[test]
fn test_missing_rows_are_not_found() {
    let test_db = common::TestDb::new("test_missing_rows.db");
    let repo = DieselRepository::new(test_db.pool());
    let missing = CustomerId::generate();

    assert!(repo.get_customer(missing).unwrap().is_none());
    assert!(matches!(
        repo.delete_customer(missing),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.update_customer(
            missing,
            &UpdateCustomer::default().status(CustomerStatus::Active)
        ),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_filters_search_sort_and_paging() {
    let test_db = common::TestDb::new("test_filters_search_sort.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);

    for (name, status) in [
        ("Delta", CustomerStatus::Active),
        ("alpha", CustomerStatus::Pending),
        ("Charlie", CustomerStatus::Active),
        ("Bravo", CustomerStatus::Inactive),
    ] {
        let email = format!("{}@example.com", name.to_lowercase());
        repo.create_customer(&new_customer(name, &email).status(status), admin.id)
            .unwrap();
    }

    let (total, active) = repo
        .list_customers(CustomerListQuery::new(Visibility::All).status(CustomerStatus::Active))
        .unwrap();
    assert_eq!(total, 2);
    assert!(active.iter().all(|c| c.status == CustomerStatus::Active));

    let (total, found) = repo
        .list_customers(CustomerListQuery::new(Visibility::All).search("ALPHA"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].name.as_str(), "alpha");

    let (total, page) = repo
        .list_customers(
            CustomerListQuery::new(Visibility::All)
                .sort(SortField::Email, SortOrder::Asc)
                .paginate(2, 3),
        )
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name.as_str(), "Delta");

    let (_, by_email_desc) = repo
        .list_customers(
            CustomerListQuery::new(Visibility::All).sort(SortField::Email, SortOrder::Desc),
        )
        .unwrap();
    let emails: Vec<_> = by_email_desc
        .iter()
        .filter_map(|c| c.email.as_ref().map(|e| e.as_str().to_string()))
        .collect();
    assert_eq!(
        emails,
        vec![
            "delta@example.com",
            "charlie@example.com",
            "bravo@example.com",
            "alpha@example.com"
        ]
    );
}

#[test]
fn test_visibility_and_manager_assignment() {
    let test_db = common::TestDb::new("test_visibility.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);
    let manager = register(&repo, "manager@example.com", UserRole::Manager);
    let viewer = register(&repo, "viewer@example.com", UserRole::Viewer);

    let owned = repo
        .create_customer(&new_customer("Owned", "owned@example.com"), manager.id)
        .unwrap();
    let assigned = repo
        .create_customer(&new_customer("Assigned", "assigned@example.com"), admin.id)
        .unwrap();
    let hidden = repo
        .create_customer(&new_customer("Hidden", "hidden@example.com"), admin.id)
        .unwrap();

    assert_eq!(
        repo.assign_managers(assigned.id, &[manager.id, viewer.id, manager.id])
            .unwrap(),
        2
    );

    let managers = repo.list_customer_managers(assigned.id).unwrap();
    let mut emails: Vec<_> = managers.iter().map(|u| u.email.clone()).collect();
    emails.sort();
    assert_eq!(emails, vec!["manager@example.com", "viewer@example.com"]);

    let scope = Visibility::OwnedOrAssigned(manager.id);
    let (total, visible) = repo
        .list_customers(CustomerListQuery::new(scope))
        .unwrap();
    assert_eq!(total, 2);
    assert!(visible.iter().all(|c| c.id != hidden.id));
    assert!(repo.is_customer_visible(owned.id, scope).unwrap());
    assert!(repo.is_customer_visible(assigned.id, scope).unwrap());
    assert!(!repo.is_customer_visible(hidden.id, scope).unwrap());
    assert!(repo.is_customer_visible(hidden.id, Visibility::All).unwrap());

    let viewer_scope = Visibility::OwnedOrAssigned(viewer.id);
    let (total, _) = repo
        .list_customers(CustomerListQuery::new(viewer_scope))
        .unwrap();
    assert_eq!(total, 1);

    // Assignment replaces the previous set.
    assert_eq!(repo.assign_managers(assigned.id, &[]).unwrap(), 0);
    assert!(repo.list_customer_managers(assigned.id).unwrap().is_empty());
    assert!(!repo.is_customer_visible(assigned.id, viewer_scope).unwrap());
}

#[test]
fn test_ensure_user_and_roles() {
    let test_db = common::TestDb::new("test_ensure_user.db");
    let repo = DieselRepository::new(test_db.pool());

    let new_user = NewUser {
        id: UserId::generate(),
        email: "ann@example.com".into(),
        role: UserRole::Viewer,
    };
    let first = repo.ensure_user(&new_user).unwrap();
    let again = repo
        .ensure_user(&NewUser {
            role: UserRole::Admin,
            ..new_user.clone()
        })
        .unwrap();
    assert_eq!(first, again);
    assert_eq!(again.role, UserRole::Viewer);

    let promoted = repo.update_user_role(first.id, UserRole::Manager).unwrap();
    assert_eq!(promoted.role, UserRole::Manager);
    assert_eq!(
        repo.get_user(first.id).unwrap().map(|u| u.role),
        Some(UserRole::Manager)
    );

    assert!(matches!(
        repo.update_user_role(UserId::generate(), UserRole::Admin),
        Err(RepositoryError::NotFound)
    ));

    register(&repo, "bob@example.com", UserRole::Viewer);
    let (total, users) = repo
        .list_users(UserListQuery::new().search("bob"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(users[0].email, "bob@example.com");

    let (total, users) = repo
        .list_users(UserListQuery::new().paginate(1, 1))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(users.len(), 1);
}

#[test]
fn test_page_beyond_addressable_rows_is_empty() {
    let test_db = common::TestDb::new("test_page_beyond_addressable.db");
    let repo = DieselRepository::new(test_db.pool());
    let admin = register(&repo, "admin@example.com", UserRole::Admin);
    repo.create_customer(&new_customer("Only", "only@example.com"), admin.id)
        .unwrap();

    let (total, items) = repo
        .list_customers(CustomerListQuery::new(Visibility::All).paginate(usize::MAX, 100))
        .unwrap();
    assert_eq!(total, 1);
    assert!(items.is_empty());

    // Fits in usize but not in a SQLite integer.
    let (total, items) = repo
        .list_customers(
            CustomerListQuery::new(Visibility::All).paginate(1_152_921_504_606_846_977, 10),
        )
        .unwrap();
    assert_eq!(total, 1);
    assert!(items.is_empty());

    let (total, users) = repo
        .list_users(UserListQuery::new().paginate(usize::MAX, 2))
        .unwrap();
    assert_eq!(total, 1);
    assert!(users.is_empty());
}
