use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DoctorStore;
use crate::{
    models::{
        Doctor, DoctorFilter, DoctorPatch, DoctorWithUser, NewDoctor, NewUser, User, UserPatch,
        UserSummary,
    },
    AppError, AppResult,
};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    // Insertion order doubles as creation order
    doctors: Vec<Doctor>,
}

impl Collections {
    fn joined(&self, doctor: &Doctor) -> AppResult<DoctorWithUser> {
        let user = self.users.get(&doctor.user_id).ok_or_else(|| {
            AppError::Internal(format!(
                "Doctor {} references missing user {}",
                doctor.id, doctor.user_id
            ))
        })?;

        Ok(DoctorWithUser {
            doctor: doctor.clone(),
            user: UserSummary::from(user),
        })
    }

    fn ensure_unique(&self, user_name: Option<&str>, email: Option<&str>, except: Option<Uuid>) -> AppResult<()> {
        let clash = self.users.values().any(|u| {
            Some(u.id) != except
                && (user_name == Some(u.user_name.as_str())
                    || (email.is_some() && email == u.email.as_deref()))
        });

        if clash {
            return Err(AppError::Conflict(
                "A user with this userName or email already exists".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process-local store. Both collections sit behind one lock, so every call is atomic.
#[derive(Default)]
pub struct MemoryDoctorStore {
    inner: RwLock<Collections>,
}

impl MemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DoctorStore for MemoryDoctorStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_doctor(&self, user: NewUser, doctor: NewDoctor) -> AppResult<DoctorWithUser> {
        let mut inner = self.inner.write().await;
        inner.ensure_unique(Some(user.user_name.as_str()), user.email.as_deref(), None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            user_name: user.user_name,
            password_hash: user.password_hash,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            address: user.address,
            role_name: user.role_name,
            is_anonymous: user.is_anonymous,
            created_at: now,
            updated_at: now,
        };
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: user.id,
            certificates: doctor.certificates,
            experiences: doctor.experiences,
            skills: doctor.skills,
            work_schedule: doctor.work_schedule,
            created_at: now,
            updated_at: now,
        };

        inner.users.insert(user.id, user);
        let joined = inner.joined(&doctor)?;
        inner.doctors.push(doctor);

        Ok(joined)
    }

    async fn list_doctors(&self, filter: &DoctorFilter) -> AppResult<Vec<DoctorWithUser>> {
        let inner = self.inner.read().await;

        inner
            .doctors
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| inner.joined(d))
            .collect()
    }

    async fn find_doctor(&self, id: Uuid) -> AppResult<Option<DoctorWithUser>> {
        let inner = self.inner.read().await;

        inner
            .doctors
            .iter()
            .find(|d| d.id == id)
            .map(|d| inner.joined(d))
            .transpose()
    }

    async fn update_doctor(
        &self,
        id: Uuid,
        doctor: DoctorPatch,
        user: UserPatch,
    ) -> AppResult<Option<DoctorWithUser>> {
        let mut inner = self.inner.write().await;

        let Some(index) = inner.doctors.iter().position(|d| d.id == id) else {
            return Ok(None);
        };
        let user_id = inner.doctors[index].user_id;

        // Validate before mutating anything
        if !user.is_empty() {
            inner.ensure_unique(None, user.email.as_deref(), Some(user_id))?;
        }

        let now = Utc::now();
        if !user.is_empty() {
            if let Some(account) = inner.users.get_mut(&user_id) {
                user.apply(account);
                account.updated_at = now;
            }
        }

        let stored = &mut inner.doctors[index];
        doctor.apply(stored);
        stored.updated_at = now;

        let updated = stored.clone();
        inner.joined(&updated).map(Some)
    }

    async fn delete_doctor(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;

        let Some(index) = inner.doctors.iter().position(|d| d.id == id) else {
            return Ok(false);
        };

        let doctor = inner.doctors.remove(index);
        inner.users.remove(&doctor.user_id);

        Ok(true)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}
