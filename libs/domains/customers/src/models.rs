//! Request and response shapes of the customer endpoints.

use axum_helpers::{Comparison, FieldFilter, TableSearch};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entity::{address, contact, content, customer, customer_type};
use crate::registry::RegistryCompany;

/// One uploaded document part, read fully into memory before the
/// registration transaction opens.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Contact row as submitted inside the `contacts` JSON form field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub register_number: String,
    #[serde(default)]
    pub position_id: i32,
    #[serde(default)]
    pub phone_number1: String,
    #[serde(default)]
    pub phone_number2: String,
    #[serde(default)]
    pub email1: String,
    #[serde(default)]
    pub email2: String,
}

/// Address row as submitted inside the `addresses` JSON form field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub city_id: i32,
    #[serde(default)]
    pub district_id: i32,
    #[serde(default)]
    pub street_id: i32,
    #[serde(default)]
    pub address_type_id: i32,
    #[serde(default)]
    pub description: String,
}

/// Reference to a customer type inside the `customer_types` JSON form field.
/// Clients send whole type objects; only the id matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeRef {
    pub id: i32,
}

/// Raw multipart onboarding form. Field-presence is kept as `Option` so the
/// country-conditional validation can tell "missing" from "empty".
#[derive(Debug, Default)]
pub struct OnboardingForm {
    pub name: Option<String>,
    pub country_id: Option<i32>,
    pub description: String,
    pub company_registry_number: Option<String>,
    pub company_name: Option<String>,
    pub city_id: Option<i32>,
    pub district_id: Option<i32>,
    pub address_description: String,
    pub payment_type_id: Option<i32>,
    pub classification_id: Option<i32>,
    pub maximum_purchase: f64,
    pub maximum_receivables: f64,
    pub one_time_purchase_limit: f64,
    pub customer_types: Option<Vec<TypeRef>>,
    pub contacts: Vec<ContactInput>,
    pub addresses: Vec<AddressInput>,
    pub director_cards: Vec<UploadedFile>,
    pub certifications: Vec<UploadedFile>,
    pub licenses: Vec<UploadedFile>,
}

/// Validated onboarding input, produced by the service from an
/// [`OnboardingForm`].
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub country_id: i32,
    pub domestic: bool,
    pub description: String,
    /// Empty for foreign customers.
    pub company_registry_number: String,
    pub company_name: String,
    pub city_id: Option<i32>,
    pub district_id: Option<i32>,
    pub address_description: String,
    pub payment_type_id: i32,
    pub classification_id: i32,
    pub maximum_purchase: f64,
    pub maximum_receivables: f64,
    pub one_time_purchase_limit: f64,
    pub type_ids: Vec<i32>,
    pub contacts: Vec<ContactInput>,
    pub addresses: Vec<AddressInput>,
    pub director_cards: Vec<UploadedFile>,
    pub certifications: Vec<UploadedFile>,
    pub licenses: Vec<UploadedFile>,
}

/// How the transactional writer should lay the registration down.
#[derive(Debug)]
pub enum RegistrationPlan {
    /// Domestic company seen for the first time: create the parent record
    /// and the branch in one transaction.
    WithNewParent(Registration),
    /// Branch of an existing parent, or a foreign customer (no parent).
    Single {
        registration: Registration,
        parent: Option<customer::Model>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: String,
    #[serde(default)]
    pub classification_id: i32,
    #[serde(default)]
    pub status_id: i32,
    #[serde(default)]
    pub payment_type_id: i32,
    #[serde(default)]
    pub country_id: i32,
    #[serde(default)]
    pub city_id: i32,
    #[serde(default)]
    pub district_id: i32,
    #[serde(default)]
    pub created_user_id: i32,
    #[serde(default)]
    pub modified_user_id: i32,
    /// Companion filters resolved against other tables before the main
    /// query runs; never translated into columns of `customers`.
    #[serde(default)]
    pub external_registry_number: String,
    #[serde(default)]
    pub external_customer_type_id: i32,
    #[serde(default)]
    pub external_contact_position_id: i32,
    #[serde(default)]
    pub external_contact_phone: String,
}

impl TableSearch for CustomerFilter {
    fn filters(&self) -> Vec<FieldFilter> {
        vec![
            FieldFilter {
                column: "name",
                cmp: Comparison::Text(self.name.clone()),
            },
            FieldFilter {
                column: "description",
                cmp: Comparison::Text(self.description.clone()),
            },
            FieldFilter {
                column: "is_active",
                cmp: Comparison::Flag(self.is_active.clone()),
            },
            FieldFilter {
                column: "classification_id",
                cmp: Comparison::Id(self.classification_id),
            },
            FieldFilter {
                column: "status_id",
                cmp: Comparison::Id(self.status_id),
            },
            FieldFilter {
                column: "payment_type_id",
                cmp: Comparison::Id(self.payment_type_id),
            },
            FieldFilter {
                column: "country_id",
                cmp: Comparison::Id(self.country_id),
            },
            FieldFilter {
                column: "city_id",
                cmp: Comparison::Id(self.city_id),
            },
            FieldFilter {
                column: "district_id",
                cmp: Comparison::Id(self.district_id),
            },
            FieldFilter {
                column: "created_user_id",
                cmp: Comparison::Id(self.created_user_id),
            },
            FieldFilter {
                column: "modified_user_id",
                cmp: Comparison::Id(self.modified_user_id),
            },
        ]
    }

    fn sortable_columns() -> &'static [&'static str] {
        &["id", "code", "name", "company_name", "created_at"]
    }
}

/// `GET /customer/get/{id}` body: the row with its dependent rows inlined.
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub parent: Option<customer::Model>,
    pub types: Vec<customer_type::Model>,
    pub contacts: Vec<contact::Model>,
    pub addresses: Vec<address::Model>,
    pub files: Vec<content::Model>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusParams {
    #[validate(range(min = 1))]
    pub customer_id: i32,
    #[validate(range(min = 1))]
    pub status_id: i32,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PortalPermissionParams {
    #[validate(range(min = 1))]
    pub customer_id: i32,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// `GET /customer/find/company/{rd}` body.
#[derive(Debug, Serialize)]
pub struct CompanyLookup {
    pub is_registered: bool,
    pub child_customers: Vec<customer::Model>,
    pub company: Option<RegistryCompany>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_refs_parse_from_whole_objects() {
        let refs: Vec<TypeRef> = serde_json::from_str(
            r#"[{"id": 2, "name": "Эмийн сан", "is_active": true}, {"id": 5}]"#,
        )
        .unwrap();
        let ids: Vec<i32> = refs.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[test]
    fn change_status_requires_a_description() {
        let params = ChangeStatusParams {
            customer_id: 1,
            status_id: 2,
            description: String::new(),
        };
        assert!(params.validate().is_err());
    }
}
