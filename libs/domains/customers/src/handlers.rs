//! Customer HTTP surface.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use axum_helpers::{
    paginate, table_search, ApiError, ApiResult, AuthUser, DeleteParams, Envelope, ListBody,
    ListParams, Success,
};
use object_storage::ObjectStorage;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use validator::Validate;

use crate::entity::{
    address, contact, content, content_map, customer, customer_type, status_log, type_map,
    CUSTOMER_TABLE,
};
use crate::error::CustomerError;
use crate::models::{
    AddressInput, ChangeStatusParams, CompanyLookup, ContactInput, CustomerDetail, CustomerFilter,
    OnboardingForm, PortalPermissionParams, TypeRef, UploadedFile,
};
use crate::postgres::{self, PostgresCustomerRepository};
use crate::registry::RegistryClient;
use crate::service::{
    CustomerService, CUSTOMER_STATUS_TYPE_ID, MONGOLIA_COUNTRY_ID, STATUS_PERMISSION_CREATED,
};

#[derive(Clone)]
pub struct CustomersState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ObjectStorage>,
    pub registry: RegistryClient,
}

pub fn router() -> Router<CustomersState> {
    Router::new()
        .route("/list", post(list))
        .route("/list/active", get(list_active))
        .route("/get/{id}", get(get_one))
        .route("/find/company/{rd}", get(find_company))
        .route("/", post(create).delete(remove))
        .route("/{id}", put(update))
        .route("/permission", post(portal_permission))
        .route("/status/list", get(status_list))
        .route("/status/change", post(change_status))
        .route("/status/history/{id}", get(status_history))
        .route("/change/active/{id}", get(change_active))
}

/// Branch listing. The base query excludes parent company records (empty
/// registry number); the `external_*` companion filters resolve against
/// sibling tables first and short-circuit to an empty page when nothing
/// matches.
async fn list(
    State(state): State<CustomersState>,
    Json(params): Json<ListParams<CustomerFilter>>,
) -> ApiResult<ListBody<customer::Model>> {
    let filter = &params.filter;
    let mut query = table_search(customer::Entity::find(), filter, &params.sort)
        .filter(customer::Column::CompanyRegistryNumber.eq(""));

    if !filter.external_registry_number.is_empty() {
        let parent_ids: Vec<i32> = customer::Entity::find()
            .filter(
                customer::Column::CompanyRegistryNumber
                    .contains(&filter.external_registry_number),
            )
            .all(&state.db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();
        if parent_ids.is_empty() {
            return Ok(Envelope::ok(empty_page()));
        }
        query = query.filter(customer::Column::ParentId.is_in(parent_ids));
    }

    if filter.external_customer_type_id > 0 {
        let ids: Vec<i32> = type_map::Entity::find()
            .filter(type_map::Column::CustomerTypeId.eq(filter.external_customer_type_id))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|row| row.customer_id)
            .collect();
        if ids.is_empty() {
            return Ok(Envelope::ok(empty_page()));
        }
        query = query.filter(customer::Column::Id.is_in(ids));
    }

    if !filter.external_contact_phone.is_empty() {
        let ids: Vec<i32> = contact::Entity::find()
            .filter(
                Condition::any()
                    .add(contact::Column::PhoneNumber1.contains(&filter.external_contact_phone))
                    .add(contact::Column::PhoneNumber2.contains(&filter.external_contact_phone)),
            )
            .all(&state.db)
            .await?
            .into_iter()
            .map(|row| row.customer_id)
            .collect();
        if ids.is_empty() {
            return Ok(Envelope::ok(empty_page()));
        }
        query = query.filter(customer::Column::Id.is_in(ids));
    }

    if filter.external_contact_position_id > 0 {
        let ids: Vec<i32> = contact::Entity::find()
            .filter(contact::Column::PositionId.eq(filter.external_contact_position_id))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|row| row.customer_id)
            .collect();
        if ids.is_empty() {
            return Ok(Envelope::ok(empty_page()));
        }
        query = query.filter(customer::Column::Id.is_in(ids));
    }

    let total = query.clone().count(&state.db).await?;
    let list = paginate(query, params.page, params.size).all(&state.db).await?;
    Ok(Envelope::ok(ListBody { total, list }))
}

fn empty_page() -> ListBody<customer::Model> {
    ListBody {
        total: 0,
        list: Vec::new(),
    }
}

async fn list_active(State(state): State<CustomersState>) -> ApiResult<Vec<customer::Model>> {
    let list = customer::Entity::find()
        .filter(customer::Column::CompanyRegistryNumber.eq(""))
        .all(&state.db)
        .await?;
    Ok(Envelope::ok(list))
}

async fn get_one(
    State(state): State<CustomersState>,
    Path(id): Path<i32>,
) -> ApiResult<CustomerDetail> {
    let row = find_customer(&state.db, id).await?;

    let parent = match row.parent_id {
        Some(parent_id) => customer::Entity::find_by_id(parent_id).one(&state.db).await?,
        None => None,
    };

    let type_ids: Vec<i32> = type_map::Entity::find()
        .filter(type_map::Column::CustomerId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|map| map.customer_type_id)
        .collect();
    let types = customer_type::Entity::find()
        .filter(customer_type::Column::Id.is_in(type_ids))
        .all(&state.db)
        .await?;

    let contacts = contact::Entity::find()
        .filter(contact::Column::CustomerId.eq(id))
        .all(&state.db)
        .await?;
    let addresses = address::Entity::find()
        .filter(address::Column::CustomerId.eq(id))
        .all(&state.db)
        .await?;

    let content_ids: Vec<i32> = content_map::Entity::find()
        .filter(content_map::Column::HdrTableName.eq(CUSTOMER_TABLE))
        .filter(content_map::Column::RecordId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|map| map.content_id)
        .collect();
    let files = content::Entity::find()
        .filter(content::Column::Id.is_in(content_ids))
        .all(&state.db)
        .await?;

    Ok(Envelope::ok(CustomerDetail {
        customer: row,
        parent,
        types,
        contacts,
        addresses,
        files,
    }))
}

/// Company lookup by state registry number: merges the best-effort registry
/// record with the locally registered parent and its branches.
async fn find_company(
    State(state): State<CustomersState>,
    Path(rd): Path<String>,
) -> ApiResult<CompanyLookup> {
    let company = state.registry.company_info(&rd).await;

    let parent = customer::Entity::find()
        .filter(customer::Column::CompanyRegistryNumber.eq(rd.as_str()))
        .one(&state.db)
        .await?;

    let (is_registered, child_customers) = match parent {
        Some(parent) => (
            true,
            customer::Entity::find()
                .filter(customer::Column::ParentId.eq(parent.id))
                .all(&state.db)
                .await?,
        ),
        None => (false, Vec::new()),
    };

    Ok(Envelope::ok(CompanyLookup {
        is_registered,
        child_customers,
        company,
    }))
}

async fn create(
    State(state): State<CustomersState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Success> {
    let form = parse_onboarding(multipart).await?;
    let service = CustomerService::new(PostgresCustomerRepository::new(
        state.db.clone(),
        state.storage.clone(),
    ));
    service.register(form, user.id).await?;
    Ok(Envelope::ok(Success::ok()))
}

/// Update shares the onboarding form layout. Contact, address and type
/// attachments are replaced wholesale when the respective field is present.
async fn update(
    State(state): State<CustomersState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Success> {
    let form = parse_onboarding(multipart).await?;
    let row = find_customer(&state.db, id).await?;

    let parent = match form.company_registry_number.as_deref() {
        Some(rd) if !rd.is_empty() => {
            customer::Entity::find()
                .filter(customer::Column::CompanyRegistryNumber.eq(rd))
                .one(&state.db)
                .await?
        }
        _ => None,
    };

    let txn = state.db.begin().await?;

    let mut active = row.into_active_model();
    if let Some(name) = form.name {
        active.name = Set(name);
    }
    active.description = Set(Some(form.description));
    active.address_description = Set(Some(form.address_description));
    if let Some(country_id) = form.country_id {
        active.country_id = Set(Some(country_id));
    }
    active.city_id = Set(form.city_id);
    active.district_id = Set(form.district_id);
    if let Some(classification_id) = form.classification_id {
        active.classification_id = Set(Some(classification_id));
    }
    if let Some(payment_type_id) = form.payment_type_id {
        active.payment_type_id = Set(Some(payment_type_id));
    }
    active.maximum_purchase = Set(Some(form.maximum_purchase));
    active.maximum_receivables = Set(Some(form.maximum_receivables));
    active.one_time_purchase_limit = Set(Some(form.one_time_purchase_limit));
    active.parent_id = Set(parent.map(|p| p.id));
    active.updated_at = Set(chrono::Utc::now().into());
    active.modified_user_id = Set(Some(user.id));
    let updated = active.update(&txn).await?;

    if !form.contacts.is_empty() {
        contact::Entity::delete_many()
            .filter(contact::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        postgres::insert_contacts(&txn, updated.id, &form.contacts, user.id).await?;
    }

    if !form.addresses.is_empty() {
        address::Entity::delete_many()
            .filter(address::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        insert_update_addresses(&txn, updated.id, &form.addresses, user.id).await?;
    }

    if let Some(types) = form.customer_types {
        type_map::Entity::delete_many()
            .filter(type_map::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        let type_ids: Vec<i32> = types.iter().map(|t| t.id).collect();
        postgres::insert_type_map(&txn, updated.id, &type_ids, user.id).await?;
    }

    txn.commit().await?;
    Ok(Envelope::ok(Success::ok()))
}

/// Unlike onboarding, updated address rows carry their own city and district.
async fn insert_update_addresses(
    txn: &sea_orm::DatabaseTransaction,
    customer_id: i32,
    addresses: &[AddressInput],
    audit_user_id: i32,
) -> Result<(), CustomerError> {
    for input in addresses {
        address::ActiveModel {
            customer_id: Set(customer_id),
            country_id: Set(Some(MONGOLIA_COUNTRY_ID)),
            city_id: Set(optional_id(input.city_id)),
            district_id: Set(optional_id(input.district_id)),
            street_id: Set(optional_id(input.street_id)),
            address_type_id: Set(optional_id(input.address_type_id)),
            description: Set(Some(input.description.clone())),
            is_active: Set(true),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn remove(
    State(state): State<CustomersState>,
    Json(params): Json<DeleteParams>,
) -> ApiResult<Success> {
    for id in params.ids {
        customer::Entity::delete_by_id(id).exec(&state.db).await?;
    }
    Ok(Envelope::ok(Success::ok()))
}

/// Toggle a customer's active flag.
async fn change_active(
    State(state): State<CustomersState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<customer::Model> {
    let row = find_customer(&state.db, id).await?;
    let is_active = row.is_active;

    let mut active = row.into_active_model();
    active.is_active = Set(!is_active);
    active.updated_at = Set(chrono::Utc::now().into());
    active.modified_user_id = Set(Some(user.id));
    let updated = active.update(&state.db).await?;

    Ok(Envelope::ok(updated))
}

/// Statuses a customer can move through.
async fn status_list(
    State(state): State<CustomersState>,
) -> ApiResult<Vec<domain_reference::status::Model>> {
    let list = domain_reference::status::Entity::find()
        .filter(domain_reference::status::Column::StatusTypeId.eq(CUSTOMER_STATUS_TYPE_ID))
        .all(&state.db)
        .await?;
    Ok(Envelope::ok(list))
}

/// Move a customer to a new status and append the audit row atomically.
async fn change_status(
    State(state): State<CustomersState>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<ChangeStatusParams>,
) -> ApiResult<customer::Model> {
    params.validate()?;
    let row = find_customer(&state.db, params.customer_id).await?;

    let txn = state.db.begin().await?;

    let mut active = row.into_active_model();
    active.status_id = Set(Some(params.status_id));
    active.updated_at = Set(chrono::Utc::now().into());
    active.modified_user_id = Set(Some(user.id));
    let updated = active.update(&txn).await?;

    postgres::append_status_log(
        &txn,
        updated.id,
        params.status_id,
        &params.description,
        user.id,
    )
    .await?;

    txn.commit().await?;
    Ok(Envelope::ok(updated))
}

async fn status_history(
    State(state): State<CustomersState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<status_log::Model>> {
    let logs = status_log::Entity::find()
        .filter(status_log::Column::HdrTableName.eq(CUSTOMER_TABLE))
        .filter(status_log::Column::RecordId.eq(id))
        .order_by_asc(status_log::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Envelope::ok(logs))
}

/// Provision a customer-portal login: flips the customer to the
/// permission-created status, appends the audit row and creates the
/// `system_users` account (`person_type = 2`) in one transaction.
async fn portal_permission(
    State(state): State<CustomersState>,
    Extension(user): Extension<AuthUser>,
    Json(params): Json<PortalPermissionParams>,
) -> ApiResult<Success> {
    params.validate()?;
    let row = find_customer(&state.db, params.customer_id).await?;

    let password_hash = domain_access::password::hash_password(&params.password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let txn = state.db.begin().await?;

    let mut active = row.into_active_model();
    active.status_id = Set(Some(STATUS_PERMISSION_CREATED));
    active.updated_at = Set(chrono::Utc::now().into());
    active.modified_user_id = Set(Some(user.id));
    let updated = active.update(&txn).await?;

    postgres::append_status_log(&txn, updated.id, STATUS_PERMISSION_CREATED, "", user.id).await?;

    domain_access::system_user::ActiveModel {
        username: Set(params.username),
        password_hash: Set(password_hash),
        is_active: Set(true),
        start_date: Set(Some(chrono::Utc::now().into())),
        person_id: Set(Some(updated.id)),
        person_type: Set(Some(domain_access::system_user::PERSON_TYPE_CUSTOMER)),
        created_user_id: Set(Some(user.id)),
        modified_user_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(Envelope::ok(Success::ok()))
}

async fn find_customer(
    db: &DatabaseConnection,
    id: i32,
) -> Result<customer::Model, ApiError> {
    customer::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Бичлэг олдсонгүй".to_string()))
}

/// Read the multipart onboarding form. Numeric fields that fail to parse
/// count as present-but-zero, matching how the clients have always sent
/// them; presence itself is what the validation rules check.
async fn parse_onboarding(mut multipart: Multipart) -> Result<OnboardingForm, CustomerError> {
    let mut form = OnboardingForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CustomerError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "director_cards" | "certifications" | "licenses" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| CustomerError::Validation(e.to_string()))?
                    .to_vec();
                let file = UploadedFile {
                    filename,
                    content_type,
                    data,
                };
                match name.as_str() {
                    "director_cards" => form.director_cards.push(file),
                    "certifications" => form.certifications.push(file),
                    _ => form.licenses.push(file),
                }
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| CustomerError::Validation(e.to_string()))?;
                match name.as_str() {
                    "name" => form.name = Some(text),
                    "description" => form.description = text,
                    "company_rd" => form.company_registry_number = Some(text),
                    "company_name" => form.company_name = Some(text),
                    "address_description" => form.address_description = text,
                    "country_id" => form.country_id = Some(parse_i32(&text)),
                    "city_id" => form.city_id = Some(parse_i32(&text)),
                    "district_id" => form.district_id = Some(parse_i32(&text)),
                    "payment_type_id" => form.payment_type_id = Some(parse_i32(&text)),
                    "classification_id" => form.classification_id = Some(parse_i32(&text)),
                    "maximum_purchase" => form.maximum_purchase = parse_f64(&text),
                    "maximum_receivables" => form.maximum_receivables = parse_f64(&text),
                    "one_time_purchase_limit" => form.one_time_purchase_limit = parse_f64(&text),
                    "customer_types" => {
                        let types: Vec<TypeRef> = serde_json::from_str(&text).unwrap_or_default();
                        form.customer_types = Some(types);
                    }
                    "contacts" => {
                        form.contacts =
                            serde_json::from_str::<Vec<ContactInput>>(&text).unwrap_or_default();
                    }
                    "addresses" => {
                        form.addresses =
                            serde_json::from_str::<Vec<AddressInput>>(&text).unwrap_or_default();
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

fn parse_i32(text: &str) -> i32 {
    text.trim().parse().unwrap_or(0)
}

fn parse_f64(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

fn optional_id(id: i32) -> Option<i32> {
    (id > 0).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use axum_helpers::SortColumn;
    use sea_orm::{DbBackend, QueryTrait};

    async fn multipart_from(parts: &[(&str, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, value) in parts {
            body.push_str("--boundary\r\n");
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str("--boundary--\r\n");

        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=boundary")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn onboarding_form_fields_map_by_name() {
        let multipart = multipart_from(&[
            ("name", "Ач бор эмийн сан"),
            ("country_id", "67"),
            ("company_rd", "1234567"),
            ("maximum_purchase", "2500000"),
            (
                "contacts",
                r#"[{"last_name": "Бат", "first_name": "Дорж", "phone_number1": "99112233"}]"#,
            ),
            ("customer_types", r#"[{"id": 2}]"#),
        ])
        .await;

        let form = parse_onboarding(multipart).await.unwrap();
        assert_eq!(form.name.as_deref(), Some("Ач бор эмийн сан"));
        assert_eq!(form.country_id, Some(67));
        assert_eq!(form.company_registry_number.as_deref(), Some("1234567"));
        assert_eq!(form.maximum_purchase, 2500000.0);
        assert_eq!(form.contacts.len(), 1);
        assert_eq!(form.contacts[0].phone_number1, "99112233");
        assert_eq!(form.customer_types.as_ref().unwrap()[0].id, 2);
        assert!(form.city_id.is_none());
    }

    #[tokio::test]
    async fn unparsable_ids_count_as_present_but_zero() {
        let multipart = multipart_from(&[("country_id", "not-a-number")]).await;

        let form = parse_onboarding(multipart).await.unwrap();
        assert_eq!(form.country_id, Some(0));
    }

    #[test]
    fn listing_always_excludes_parent_records() {
        let sql = table_search(
            customer::Entity::find(),
            &CustomerFilter::default(),
            &SortColumn::default(),
        )
        .filter(customer::Column::CompanyRegistryNumber.eq(""))
        .build(DbBackend::Postgres)
        .to_string();
        assert!(sql.contains("company_registry_number"));
        assert!(sql.contains("= ''"));
        assert!(sql.contains("ORDER BY"));
    }
}
