//! Transactional registration writer over sea-orm + object storage.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use object_storage::{keys, ObjectStorage};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::codes;
use crate::entity::{address, contact, content, content_map, customer, status_log, type_map};
use crate::entity::CUSTOMER_TABLE;
use crate::error::{CustomerError, CustomerResult};
use crate::models::{Registration, RegistrationPlan, UploadedFile};
use crate::repository::CustomerRepository;
use crate::service::{PARENT_CLASSIFICATION_ID, STATUS_ACCOUNT_CONFIRMED};

/// `content_types` rows seeded for onboarding documents.
pub const CONTENT_TYPE_DIRECTOR_CARD: i32 = 1;
pub const CONTENT_TYPE_CERTIFICATION: i32 = 2;
pub const CONTENT_TYPE_LICENSE: i32 = 3;

pub struct PostgresCustomerRepository {
    db: DatabaseConnection,
    storage: Arc<dyn ObjectStorage>,
}

impl PostgresCustomerRepository {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { db, storage }
    }

    async fn register_once(&self, plan: &RegistrationPlan, audit_user_id: i32) -> CustomerResult<()> {
        let now = Utc::now();
        let stamp = codes::month_stamp(now);
        let txn = self.db.begin().await?;

        let last_code = customer::Entity::find()
            .filter(customer::Column::Code.contains(&stamp))
            .order_by_desc(customer::Column::Code)
            .one(&txn)
            .await?
            .map(|row| row.code);
        let code = codes::next_code(last_code.as_deref(), &stamp)?;

        match plan {
            RegistrationPlan::WithNewParent(registration) => {
                self.register_with_parent(&txn, registration, code, audit_user_id, now)
                    .await?;
            }
            RegistrationPlan::Single {
                registration,
                parent,
            } => {
                self.register_single(
                    &txn,
                    registration,
                    parent.as_ref(),
                    code,
                    audit_user_id,
                    now,
                )
                .await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn register_with_parent(
        &self,
        txn: &DatabaseTransaction,
        registration: &Registration,
        parent_code: String,
        audit_user_id: i32,
        now: DateTime<Utc>,
    ) -> CustomerResult<()> {
        let branch_code = codes::child_code(&parent_code)?;
        let bucket = registration.company_registry_number.clone();

        let parent = customer::ActiveModel {
            code: Set(parent_code),
            name: Set(registration.company_name.clone()),
            is_active: Set(true),
            description: Set(Some(registration.description.clone())),
            classification_id: Set(Some(PARENT_CLASSIFICATION_ID)),
            company_registry_number: Set(Some(registration.company_registry_number.clone())),
            country_id: Set(Some(registration.country_id)),
            city_id: Set(registration.city_id),
            district_id: Set(registration.district_id),
            payment_type_id: Set(Some(registration.payment_type_id)),
            status_id: Set(Some(STATUS_ACCOUNT_CONFIRMED)),
            address_description: Set(Some(registration.address_description.clone())),
            maximum_purchase: Set(Some(registration.maximum_purchase)),
            maximum_receivables: Set(Some(registration.maximum_receivables)),
            one_time_purchase_limit: Set(Some(registration.one_time_purchase_limit)),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        append_status_log(txn, parent.id, STATUS_ACCOUNT_CONFIRMED, "", audit_user_id).await?;

        // The bucket may already exist from an earlier partial attempt.
        if let Err(err) = self.storage.ensure_bucket(&bucket).await {
            tracing::warn!("bucket '{bucket}' not created: {err}");
        }

        self.upload_documents(
            txn,
            &bucket,
            None,
            &registration.director_cards,
            CONTENT_TYPE_DIRECTOR_CARD,
            parent.id,
            audit_user_id,
            now,
        )
        .await?;
        self.upload_documents(
            txn,
            &bucket,
            None,
            &registration.certifications,
            CONTENT_TYPE_CERTIFICATION,
            parent.id,
            audit_user_id,
            now,
        )
        .await?;
        insert_type_map(txn, parent.id, &registration.type_ids, audit_user_id).await?;

        let branch = customer::ActiveModel {
            code: Set(branch_code),
            name: Set(registration.name.clone()),
            company_name: Set(Some(parent.name.clone())),
            is_active: Set(true),
            description: Set(Some(registration.description.clone())),
            classification_id: Set(Some(registration.classification_id)),
            company_registry_number: Set(Some(String::new())),
            country_id: Set(Some(registration.country_id)),
            city_id: Set(registration.city_id),
            district_id: Set(registration.district_id),
            payment_type_id: Set(Some(registration.payment_type_id)),
            status_id: Set(Some(STATUS_ACCOUNT_CONFIRMED)),
            parent_id: Set(Some(parent.id)),
            address_description: Set(Some(registration.address_description.clone())),
            maximum_purchase: Set(Some(registration.maximum_purchase)),
            maximum_receivables: Set(Some(registration.maximum_receivables)),
            one_time_purchase_limit: Set(Some(registration.one_time_purchase_limit)),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        append_status_log(txn, branch.id, STATUS_ACCOUNT_CONFIRMED, "", audit_user_id).await?;
        self.upload_documents(
            txn,
            &bucket,
            Some(&registration.name),
            &registration.licenses,
            CONTENT_TYPE_LICENSE,
            branch.id,
            audit_user_id,
            now,
        )
        .await?;

        insert_contacts(txn, branch.id, &registration.contacts, audit_user_id).await?;
        insert_addresses(txn, branch.id, registration, audit_user_id).await?;
        insert_type_map(txn, branch.id, &registration.type_ids, audit_user_id).await?;

        Ok(())
    }

    async fn register_single(
        &self,
        txn: &DatabaseTransaction,
        registration: &Registration,
        parent: Option<&customer::Model>,
        code: String,
        audit_user_id: i32,
        now: DateTime<Utc>,
    ) -> CustomerResult<()> {
        let row = customer::ActiveModel {
            code: Set(code),
            name: Set(registration.name.clone()),
            company_name: Set(parent.map(|p| p.name.clone())),
            is_active: Set(true),
            description: Set(Some(registration.description.clone())),
            classification_id: Set(Some(registration.classification_id)),
            company_registry_number: Set(Some(String::new())),
            country_id: Set(Some(registration.country_id)),
            city_id: Set(registration.city_id),
            district_id: Set(registration.district_id),
            payment_type_id: Set(Some(registration.payment_type_id)),
            status_id: Set(Some(STATUS_ACCOUNT_CONFIRMED)),
            parent_id: Set(parent.map(|p| p.id)),
            address_description: Set(Some(registration.address_description.clone())),
            maximum_purchase: Set(Some(registration.maximum_purchase)),
            maximum_receivables: Set(Some(registration.maximum_receivables)),
            one_time_purchase_limit: Set(Some(registration.one_time_purchase_limit)),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        append_status_log(txn, row.id, STATUS_ACCOUNT_CONFIRMED, "", audit_user_id).await?;

        // Foreign registrations have no registry number and therefore no
        // bucket; their documents are not stored.
        if !registration.company_registry_number.is_empty() {
            let bucket = registration.company_registry_number.clone();
            if let Err(err) = self.storage.ensure_bucket(&bucket).await {
                tracing::warn!("bucket '{bucket}' not created: {err}");
            }
            self.upload_documents(
                txn,
                &bucket,
                Some(&registration.name),
                &registration.licenses,
                CONTENT_TYPE_LICENSE,
                row.id,
                audit_user_id,
                now,
            )
            .await?;
        }

        insert_contacts(txn, row.id, &registration.contacts, audit_user_id).await?;
        insert_addresses(txn, row.id, registration, audit_user_id).await?;
        insert_type_map(txn, row.id, &registration.type_ids, audit_user_id).await?;

        Ok(())
    }

    /// Upload a batch of documents and record them in `contents` plus
    /// `content_map`. A failed upload fails the registration; objects
    /// already stored stay behind when the transaction rolls back.
    #[allow(clippy::too_many_arguments)]
    async fn upload_documents(
        &self,
        txn: &DatabaseTransaction,
        bucket: &str,
        prefix: Option<&str>,
        files: &[UploadedFile],
        content_type_id: i32,
        record_id: i32,
        audit_user_id: i32,
        now: DateTime<Utc>,
    ) -> CustomerResult<()> {
        for file in files {
            let key = match prefix {
                Some(prefix) => keys::prefixed_object_key(prefix, &file.filename, now),
                None => keys::timestamped_object_key(&file.filename, now),
            };

            self.storage
                .put_object(bucket, &key, &file.content_type, &file.data)
                .await?;

            let stored = content::ActiveModel {
                file_name: Set(key.clone()),
                extension: Set(file_extension(&file.filename)),
                physical_path: Set(format!("{bucket}/{key}")),
                file_size: Set(Some(file.data.len() as f64)),
                content_type_id: Set(Some(content_type_id)),
                created_user_id: Set(Some(audit_user_id)),
                modified_user_id: Set(Some(audit_user_id)),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            content_map::ActiveModel {
                content_id: Set(stored.id),
                hdr_table_name: Set(CUSTOMER_TABLE.to_string()),
                record_id: Set(record_id),
                created_user_id: Set(Some(audit_user_id)),
                modified_user_id: Set(Some(audit_user_id)),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn find_parent_by_registry_number(
        &self,
        registry_number: &str,
    ) -> CustomerResult<Option<customer::Model>> {
        Ok(customer::Entity::find()
            .filter(customer::Column::CompanyRegistryNumber.eq(registry_number))
            .one(&self.db)
            .await?)
    }

    async fn register(&self, plan: RegistrationPlan, audit_user_id: i32) -> CustomerResult<()> {
        retry_once_on(CustomerError::is_code_conflict, || {
            self.register_once(&plan, audit_user_id)
        })
        .await
    }
}

/// Run a registration attempt and repeat it once when the first run fails
/// the `conflict` check. Two concurrent registrations can read the same
/// "last code" before either commits; the unique code index rejects the
/// loser, which then re-reads and re-allocates.
async fn retry_once_on<P, A, Fut>(conflict: P, attempt: A) -> CustomerResult<()>
where
    P: Fn(&CustomerError) -> bool,
    A: Fn() -> Fut,
    Fut: std::future::Future<Output = CustomerResult<()>>,
{
    match attempt().await {
        Err(err) if conflict(&err) => {
            tracing::warn!("account code collision, reallocating and retrying");
            attempt().await
        }
        other => other,
    }
}

pub(crate) async fn append_status_log(
    txn: &DatabaseTransaction,
    record_id: i32,
    status_id: i32,
    description: &str,
    audit_user_id: i32,
) -> CustomerResult<()> {
    status_log::ActiveModel {
        hdr_table_name: Set(CUSTOMER_TABLE.to_string()),
        record_id: Set(record_id),
        status_id: Set(status_id),
        description: Set(Some(description.to_string())),
        created_user_id: Set(Some(audit_user_id)),
        modified_user_id: Set(Some(audit_user_id)),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(())
}

pub(crate) async fn insert_contacts(
    txn: &DatabaseTransaction,
    customer_id: i32,
    contacts: &[crate::models::ContactInput],
    audit_user_id: i32,
) -> CustomerResult<()> {
    for input in contacts {
        contact::ActiveModel {
            customer_id: Set(customer_id),
            last_name: Set(input.last_name.trim().to_string()),
            first_name: Set(input.first_name.trim().to_string()),
            register_number: Set(trimmed(&input.register_number)),
            position_id: Set(optional_id(input.position_id)),
            phone_number1: Set(trimmed(&input.phone_number1)),
            phone_number2: Set(trimmed(&input.phone_number2)),
            email1: Set(trimmed(&input.email1)),
            email2: Set(trimmed(&input.email2)),
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

/// Domestic registrations write the submitted address rows pinned to the
/// customer's city and district; foreign ones get a single free-text row.
pub(crate) async fn insert_addresses(
    txn: &DatabaseTransaction,
    customer_id: i32,
    registration: &Registration,
    audit_user_id: i32,
) -> CustomerResult<()> {
    if registration.domestic {
        for input in &registration.addresses {
            address::ActiveModel {
                customer_id: Set(customer_id),
                country_id: Set(Some(registration.country_id)),
                city_id: Set(registration.city_id),
                district_id: Set(registration.district_id),
                street_id: Set(optional_id(input.street_id)),
                address_type_id: Set(optional_id(input.address_type_id)),
                description: Set(trimmed(&input.description)),
                is_active: Set(true),
                created_user_id: Set(Some(audit_user_id)),
                modified_user_id: Set(Some(audit_user_id)),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }
    } else {
        address::ActiveModel {
            customer_id: Set(customer_id),
            country_id: Set(Some(registration.country_id)),
            address_type_id: Set(Some(1)),
            description: Set(Some(registration.address_description.clone())),
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

pub(crate) async fn insert_type_map(
    txn: &DatabaseTransaction,
    customer_id: i32,
    type_ids: &[i32],
    audit_user_id: i32,
) -> CustomerResult<()> {
    for type_id in type_ids {
        type_map::ActiveModel {
            customer_id: Set(customer_id),
            customer_type_id: Set(*type_id),
            created_user_id: Set(Some(audit_user_id)),
            modified_user_id: Set(Some(audit_user_id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn optional_id(id: i32) -> Option<i32> {
    (id > 0).then_some(id)
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn conflict(err: &CustomerError) -> bool {
        matches!(err, CustomerError::Code(_))
    }

    #[tokio::test]
    async fn code_collision_reallocates_exactly_once() {
        let attempts = AtomicUsize::new(0);
        let result = retry_once_on(conflict, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(CustomerError::Code("202401017".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_collision_is_surfaced_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result = retry_once_on(conflict, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(CustomerError::Code("202401017".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(CustomerError::Code(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_conflict_errors_fail_on_the_first_attempt() {
        let attempts = AtomicUsize::new(0);
        let result = retry_once_on(CustomerError::is_code_conflict, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(CustomerError::Validation("Төрөл сонгоно уу".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(CustomerError::Validation(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn only_unique_index_violations_count_as_code_conflicts() {
        assert!(!CustomerError::Validation("x".to_string()).is_code_conflict());
        assert!(!CustomerError::Code("202401001".to_string()).is_code_conflict());
        assert!(!CustomerError::Database(sea_orm::DbErr::RecordNotInserted).is_code_conflict());
    }

    #[test]
    fn extension_keeps_the_dot() {
        assert_eq!(file_extension("contract.pdf"), Some(".pdf".to_string()));
        assert_eq!(file_extension("scan.final.JPG"), Some(".JPG".to_string()));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn blank_contact_fields_collapse_to_null() {
        assert_eq!(trimmed("  "), None);
        assert_eq!(trimmed(" 99112233 "), Some("99112233".to_string()));
    }
}
