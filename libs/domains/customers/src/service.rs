//! Onboarding workflow: country-conditional validation and plan selection.

use std::sync::Arc;

use crate::error::{CustomerError, CustomerResult};
use crate::models::{OnboardingForm, Registration, RegistrationPlan};
use crate::repository::CustomerRepository;

/// Country id of Mongolia in the seeded reference data; registrations from
/// here are "domestic" and carry the company registry identity.
pub const MONGOLIA_COUNTRY_ID: i32 = 67;

/// Classification assigned to auto-created parent company records.
pub const PARENT_CLASSIFICATION_ID: i32 = 4;

/// Status ids from the customer status group (`status_type_id = 3`).
pub const STATUS_ACCOUNT_CONFIRMED: i32 = 8;
pub const STATUS_PERMISSION_CREATED: i32 = 9;

/// `status_types` row grouping the customer lifecycle statuses.
pub const CUSTOMER_STATUS_TYPE_ID: i32 = 3;

#[derive(Clone)]
pub struct CustomerService<R: CustomerRepository> {
    repository: Arc<R>,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a customer from the parsed multipart form. All validation
    /// happens here, before the repository opens a transaction.
    pub async fn register(&self, form: OnboardingForm, audit_user_id: i32) -> CustomerResult<()> {
        let registration = validate(form)?;

        let plan = if registration.domestic {
            let parent = self
                .repository
                .find_parent_by_registry_number(&registration.company_registry_number)
                .await?;
            match parent {
                None => RegistrationPlan::WithNewParent(registration),
                Some(parent) => RegistrationPlan::Single {
                    registration,
                    parent: Some(parent),
                },
            }
        } else {
            RegistrationPlan::Single {
                registration,
                parent: None,
            }
        };

        self.repository.register(plan, audit_user_id).await
    }
}

/// Country-conditional form validation. Error messages are the exact
/// operator-facing strings the front end displays.
fn validate(form: OnboardingForm) -> CustomerResult<Registration> {
    let name = require(form.name, "Харилцагч нэр оруулна уу!")?;
    let country_id = require(form.country_id, "Харилцагчийн улсыг оруулна уу")?;
    let domestic = country_id == MONGOLIA_COUNTRY_ID;

    let (company_registry_number, company_name) = if domestic {
        (
            require(form.company_registry_number, "Байгууллагын РД оруулна уу!")?,
            require(form.company_name, "Компани нэр оруулна уу!")?,
        )
    } else {
        (String::new(), String::new())
    };

    let (city_id, district_id) = if domestic {
        (
            Some(require(form.city_id, "Харилцагч аймгыг оруулна уу")?),
            Some(require(form.district_id, "Харилцагч сум/дүүрэг оруулна уу")?),
        )
    } else {
        (None, None)
    };

    let payment_type_id = require(form.payment_type_id, "Төлбөрийн нөхцөл")?;
    let classification_id = require(form.classification_id, "Ангилал сонгоно уу")?;
    let type_ids = require(form.customer_types, "Төрөл сонгоно уу")?
        .into_iter()
        .map(|t| t.id)
        .collect();

    Ok(Registration {
        name,
        country_id,
        domestic,
        description: form.description,
        company_registry_number,
        company_name,
        city_id,
        district_id,
        address_description: form.address_description,
        payment_type_id,
        classification_id,
        maximum_purchase: form.maximum_purchase,
        maximum_receivables: form.maximum_receivables,
        one_time_purchase_limit: form.one_time_purchase_limit,
        type_ids,
        contacts: form.contacts,
        addresses: form.addresses,
        director_cards: form.director_cards,
        certifications: form.certifications,
        licenses: form.licenses,
    })
}

fn require<T>(value: Option<T>, message: &str) -> CustomerResult<T> {
    value.ok_or_else(|| CustomerError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::customer;
    use crate::models::TypeRef;
    use crate::repository::MockCustomerRepository;

    fn domestic_form() -> OnboardingForm {
        OnboardingForm {
            name: Some("Салбар эмийн сан".to_string()),
            country_id: Some(MONGOLIA_COUNTRY_ID),
            company_registry_number: Some("1234567".to_string()),
            company_name: Some("Монос Фарм ХХК".to_string()),
            city_id: Some(11),
            district_id: Some(23),
            payment_type_id: Some(1),
            classification_id: Some(2),
            customer_types: Some(vec![TypeRef { id: 3 }]),
            ..Default::default()
        }
    }

    fn parent_row() -> customer::Model {
        customer::Model {
            id: 42,
            code: "202401005".to_string(),
            name: "Монос Фарм ХХК".to_string(),
            company_name: None,
            is_active: true,
            description: None,
            classification_id: Some(PARENT_CLASSIFICATION_ID),
            company_registry_number: Some("1234567".to_string()),
            country_id: Some(MONGOLIA_COUNTRY_ID),
            city_id: Some(11),
            district_id: Some(23),
            payment_type_id: Some(1),
            status_id: Some(STATUS_ACCOUNT_CONFIRMED),
            parent_id: None,
            address_description: None,
            maximum_purchase: None,
            maximum_receivables: None,
            one_time_purchase_limit: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
            created_user_id: None,
            modified_user_id: None,
        }
    }

    #[tokio::test]
    async fn domestic_without_registry_number_fails_before_any_query() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_parent_by_registry_number().times(0);
        repo.expect_register().times(0);

        let mut form = domestic_form();
        form.company_registry_number = None;

        let service = CustomerService::new(repo);
        let err = service.register(form, 1).await.unwrap_err();
        assert!(matches!(err, CustomerError::Validation(msg) if msg == "Байгууллагын РД оруулна уу!"));
    }

    #[tokio::test]
    async fn unknown_registry_number_creates_the_parent_too() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_parent_by_registry_number()
            .returning(|_| Ok(None));
        repo.expect_register()
            .withf(|plan, user_id| {
                matches!(plan, RegistrationPlan::WithNewParent(_)) && *user_id == 7
            })
            .returning(|_, _| Ok(()));

        let service = CustomerService::new(repo);
        service.register(domestic_form(), 7).await.unwrap();
    }

    #[tokio::test]
    async fn known_registry_number_attaches_to_the_existing_parent() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_parent_by_registry_number()
            .returning(|_| Ok(Some(parent_row())));
        repo.expect_register()
            .withf(|plan, _| {
                matches!(
                    plan,
                    RegistrationPlan::Single {
                        parent: Some(parent),
                        ..
                    } if parent.id == 42
                )
            })
            .returning(|_, _| Ok(()));

        let service = CustomerService::new(repo);
        service.register(domestic_form(), 1).await.unwrap();
    }

    #[tokio::test]
    async fn foreign_customer_never_touches_the_registry_index() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_parent_by_registry_number().times(0);
        repo.expect_register()
            .withf(|plan, _| {
                matches!(
                    plan,
                    RegistrationPlan::Single {
                        registration,
                        parent: None,
                    } if !registration.domestic
                )
            })
            .returning(|_, _| Ok(()));

        let mut form = domestic_form();
        form.country_id = Some(1);
        form.company_registry_number = None;
        form.company_name = None;
        form.city_id = None;
        form.district_id = None;
        form.address_description = "Beijing, Chaoyang".to_string();

        let service = CustomerService::new(repo);
        service.register(form, 1).await.unwrap();
    }

    #[tokio::test]
    async fn missing_types_reported_with_the_operator_message() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_parent_by_registry_number().times(0);
        repo.expect_register().times(0);

        let mut form = domestic_form();
        form.customer_types = None;

        let service = CustomerService::new(repo);
        let err = service.register(form, 1).await.unwrap_err();
        assert!(matches!(err, CustomerError::Validation(msg) if msg == "Төрөл сонгоно уу"));
    }
}
