use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{DoctorFilter, DoctorPatch, DoctorWithUser, NewDoctor, NewUser, User, UserPatch},
    AppResult,
};

/// Persistence for doctors and their linked accounts.
///
/// Every method that touches both records does so atomically: a doctor never
/// exists without its account, and a failed write leaves neither behind.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    /// Insert the account and the profile referencing it
    async fn create_doctor(&self, user: NewUser, doctor: NewDoctor) -> AppResult<DoctorWithUser>;

    /// Doctors matching `filter`, oldest first. An empty filter matches everything.
    async fn list_doctors(&self, filter: &DoctorFilter) -> AppResult<Vec<DoctorWithUser>>;

    async fn find_doctor(&self, id: Uuid) -> AppResult<Option<DoctorWithUser>>;

    /// Apply both patches and stamp `updated_at`. `None` when the doctor does not exist.
    async fn update_doctor(
        &self,
        id: Uuid,
        doctor: DoctorPatch,
        user: UserPatch,
    ) -> AppResult<Option<DoctorWithUser>>;

    /// Remove the doctor and its account. `false` when the doctor does not exist.
    async fn delete_doctor(&self, id: Uuid) -> AppResult<bool>;

    /// Full account row, including the password hash. No route exposes it; it is
    /// the inspection hook for checking what a doctor write stored.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
}
