use std::str::FromStr;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::domain::query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::types::{
    CustomerAddress, CustomerEmail, CustomerName, CustomerPhone, CustomerStatus, SortField,
    SortOrder, UserId,
};
use crate::forms::{FormError, blank_as_cleared, blank_as_none, validate_phone, validate_status};

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /api/customers`.
pub struct CreateCustomerForm {
    #[validate(length(min = 1, max = 255, message = "Name is required and must be at most 255 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        length(max = 20, message = "Phone must be at most 20 characters"),
        custom(function = "validate_phone")
    )]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /api/customers/{id}`. Absent fields stay untouched; `null` or
/// blank contact fields are cleared.
pub struct UpdateCustomerForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required and must be at most 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_cleared")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "blank_as_cleared")]
    #[validate(
        length(max = 20, message = "Phone must be at most 20 characters"),
        custom(function = "validate_phone")
    )]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "blank_as_cleared")]
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<Option<String>>,
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

impl TryFrom<CreateCustomerForm> for NewCustomer {
    type Error = FormError;

    fn try_from(form: CreateCustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let mut customer =
            NewCustomer::new(CustomerName::new(form.name).map_err(FormError::field("name"))?);
        if let Some(email) = form.email {
            customer = customer.email(CustomerEmail::new(email).map_err(FormError::field("email"))?);
        }
        if let Some(phone) = form.phone {
            customer = customer.phone(CustomerPhone::new(phone).map_err(FormError::field("phone"))?);
        }
        if let Some(address) = form.address {
            customer = customer
                .address(CustomerAddress::new(address).map_err(FormError::field("address"))?);
        }
        if let Some(status) = form.status {
            customer = customer.status(
                status
                    .parse::<CustomerStatus>()
                    .map_err(FormError::field("status"))?,
            );
        }
        Ok(customer)
    }
}

impl TryFrom<UpdateCustomerForm> for UpdateCustomer {
    type Error = FormError;

    fn try_from(form: UpdateCustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(UpdateCustomer {
            name: form
                .name
                .map(CustomerName::new)
                .transpose()
                .map_err(FormError::field("name"))?,
            email: form
                .email
                .map(|email| email.map(CustomerEmail::new).transpose())
                .transpose()
                .map_err(FormError::field("email"))?,
            phone: form
                .phone
                .map(|phone| phone.map(CustomerPhone::new).transpose())
                .transpose()
                .map_err(FormError::field("phone"))?,
            address: form
                .address
                .map(|address| address.map(CustomerAddress::new).transpose())
                .transpose()
                .map_err(FormError::field("address"))?,
            status: form
                .status
                .map(|status| status.parse::<CustomerStatus>())
                .transpose()
                .map_err(FormError::field("status"))?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
/// Query string of the customer list and search endpoints. Values stay raw so
/// that malformed input is reported per parameter.
pub struct CustomerListForm {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Validated list or search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerListRequest {
    pub page: usize,
    pub limit: usize,
    pub status: Option<CustomerStatus>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_bounded(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&String>,
    default: usize,
    max: Option<usize>,
) -> usize {
    let Some(raw) = non_blank(raw) else {
        return default;
    };
    let message = match (raw.parse::<usize>(), max) {
        (Ok(value), Some(max)) if (1..=max).contains(&value) => return value,
        (Ok(value), None) if value >= 1 => return value,
        (Ok(_), Some(max)) => format!("Number must be between 1 and {max}"),
        (Ok(_), None) => "Number must be greater than 0".to_string(),
        (Err(_), _) => "Expected a whole number".to_string(),
    };
    errors.add(field, ValidationError::new("range").with_message(message.into()));
    default
}

fn parse_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&String>,
    allowed: &str,
) -> Option<T> {
    let raw = non_blank(raw)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(
                field,
                ValidationError::new("enum").with_message(format!("Expected one of {allowed}").into()),
            );
            None
        }
    }
}

impl TryFrom<CustomerListForm> for CustomerListRequest {
    type Error = FormError;

    fn try_from(form: CustomerListForm) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::new();

        let page = parse_bounded(&mut errors, "page", form.page.as_ref(), DEFAULT_PAGE, None);
        let limit = parse_bounded(
            &mut errors,
            "limit",
            form.limit.as_ref(),
            DEFAULT_PAGE_SIZE,
            Some(MAX_PAGE_SIZE),
        );
        let status = parse_choice::<CustomerStatus>(
            &mut errors,
            "status",
            form.status.as_ref(),
            "active, inactive, pending",
        );
        let sort = parse_choice::<SortField>(
            &mut errors,
            "sort",
            form.sort.as_ref(),
            "name, email, created_at, updated_at, status",
        )
        .unwrap_or_default();
        let order =
            parse_choice::<SortOrder>(&mut errors, "order", form.order.as_ref(), "asc, desc")
                .unwrap_or_default();

        if !errors.is_empty() {
            return Err(FormError::Validation(errors));
        }

        Ok(CustomerListRequest {
            page,
            limit,
            status,
            search: non_blank(form.query.as_ref()).map(str::to_string),
            sort,
            order,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `PUT /api/customers/{id}/managers`; replaces the assignment set.
pub struct AssignManagersForm {
    #[serde(default)]
    #[validate(custom(function = "validate_user_ids"))]
    pub user_ids: Vec<String>,
}

fn validate_user_ids(ids: &[String]) -> Result<(), ValidationError> {
    if ids.iter().all(|id| id.parse::<UserId>().is_ok()) {
        Ok(())
    } else {
        Err(ValidationError::new("user_ids").with_message("Invalid ID format".into()))
    }
}

impl AssignManagersForm {
    pub fn into_user_ids(self) -> Result<Vec<UserId>, FormError> {
        self.validate()?;

        self.user_ids
            .iter()
            .map(|id| id.parse::<UserId>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(FormError::field("user_ids"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_defaults_status_and_drops_blank_fields() {
        let form: CreateCustomerForm =
            serde_json::from_str(r#"{"name": "Acme", "email": "", "phone": "+1 (555) 010-20"}"#)
                .unwrap();
        let customer = NewCustomer::try_from(form).unwrap();

        assert_eq!(customer.name.as_str(), "Acme");
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone.unwrap().as_str(), "+1 (555) 010-20");
        assert_eq!(customer.status, CustomerStatus::Pending);
    }

    #[test]
    fn create_form_reports_each_invalid_field() {
        let form: CreateCustomerForm = serde_json::from_str(
            r#"{"name": "", "email": "not-an-email", "phone": "call me", "status": "archived"}"#,
        )
        .unwrap();
        let err = NewCustomer::try_from(form).unwrap_err();
        let paths: Vec<String> = err.field_errors().into_iter().map(|e| e.path).collect();

        assert_eq!(paths, vec!["email", "name", "phone", "status"]);
    }

    #[test]
    fn create_form_keeps_ampersands_in_names() {
        let form: CreateCustomerForm = serde_json::from_str(r#"{"name": "A & B"}"#).unwrap();
        let customer = NewCustomer::try_from(form).unwrap();
        assert_eq!(customer.name.as_str(), "A & B");
    }

    #[test]
    fn update_form_distinguishes_absent_and_cleared() {
        let form: UpdateCustomerForm =
            serde_json::from_str(r#"{"phone": null, "address": "", "status": "active"}"#).unwrap();
        let update = UpdateCustomer::try_from(form).unwrap();

        assert_eq!(update.name, None);
        assert_eq!(update.email, None);
        assert_eq!(update.phone, Some(None));
        assert_eq!(update.address, Some(None));
        assert_eq!(update.status, Some(CustomerStatus::Active));
    }

    #[test]
    fn list_form_defaults() {
        let request = CustomerListRequest::try_from(CustomerListForm::default()).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 10);
        assert_eq!(request.status, None);
        assert_eq!(request.search, None);
        assert_eq!(request.sort, SortField::CreatedAt);
        assert_eq!(request.order, SortOrder::Desc);
    }

    #[test]
    fn list_form_rejects_out_of_range_and_unknown_values() {
        let form: CustomerListForm =
            serde_html_form::from_str("page=0&limit=500&sort=password&order=up&status=gone")
                .unwrap();
        let err = CustomerListRequest::try_from(form).unwrap_err();
        let paths: Vec<String> = err.field_errors().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["limit", "order", "page", "sort", "status"]);
    }

    #[test]
    fn list_form_accepts_valid_values() {
        let form: CustomerListForm =
            serde_html_form::from_str("page=3&limit=25&status=active&query=%20ann%20&sort=name&order=asc")
                .unwrap();
        let request = CustomerListRequest::try_from(form).unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.limit, 25);
        assert_eq!(request.status, Some(CustomerStatus::Active));
        assert_eq!(request.search.as_deref(), Some("ann"));
        assert_eq!(request.sort, SortField::Name);
        assert_eq!(request.order, SortOrder::Asc);
    }

    #[test]
    fn assign_form_rejects_malformed_ids() {
        let form = AssignManagersForm {
            user_ids: vec![UserId::generate().to_string(), "7".to_string()],
        };
        assert!(form.into_user_ids().is_err());
    }

    #[test]
    fn empty_update_form_is_a_no_op() {
        let update = UpdateCustomer::try_from(UpdateCustomerForm::default()).unwrap();
        assert!(update.is_empty());
    }
}
