use async_trait::async_trait;

use crate::entity::customer;
use crate::error::CustomerResult;
use crate::models::RegistrationPlan;

/// Persistence seam of the onboarding workflow. The service resolves the
/// parent company and decides the plan; the implementation owns code
/// allocation, the transaction and the document uploads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Parent company record carrying this registry number, if one exists.
    async fn find_parent_by_registry_number(
        &self,
        registry_number: &str,
    ) -> CustomerResult<Option<customer::Model>>;

    /// Execute a registration plan atomically. Uploaded objects are outside
    /// the transaction and are not removed when it rolls back.
    async fn register(&self, plan: RegistrationPlan, audit_user_id: i32) -> CustomerResult<()>;
}
