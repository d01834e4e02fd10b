use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{create_pool, schema, DoctorStore};
use crate::{
    models::{
        Doctor, DoctorFilter, DoctorPatch, DoctorWithUser, NewDoctor, NewUser, Role, User,
        UserPatch, UserSummary, WorkHours, WorkSchedule,
    },
    AppError, AppResult,
};

const SELECT_DOCTORS: &str = r#"
    SELECT
        d.id,
        d.user_id,
        d.certificates,
        d.experiences,
        d.skills,
        d.work_days,
        d.work_start,
        d.work_end,
        d.created_at,
        d.updated_at,
        u.full_name AS user_full_name,
        u.email AS user_email,
        u.phone AS user_phone,
        u.role_name AS user_role_name
    FROM "Doctors" d
    JOIN "Users" u ON u.id = d.user_id
"#;

#[derive(FromRow)]
struct DoctorRow {
    id: Uuid,
    user_id: Uuid,
    certificates: Vec<String>,
    experiences: Vec<String>,
    skills: Vec<String>,
    work_days: Vec<String>,
    work_start: String,
    work_end: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_full_name: Option<String>,
    user_email: Option<String>,
    user_phone: Option<String>,
    #[sqlx(try_from = "String")]
    user_role_name: Role,
}

impl From<DoctorRow> for DoctorWithUser {
    fn from(row: DoctorRow) -> Self {
        DoctorWithUser {
            user: UserSummary {
                id: row.user_id,
                full_name: row.user_full_name,
                email: row.user_email,
                phone: row.user_phone,
                role_name: row.user_role_name,
            },
            doctor: Doctor {
                id: row.id,
                user_id: row.user_id,
                certificates: row.certificates,
                experiences: row.experiences,
                skills: row.skills,
                work_schedule: WorkSchedule {
                    days: row.work_days,
                    hours: WorkHours {
                        start: row.work_start,
                        end: row.work_end,
                    },
                },
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Unique violations on "Users" become 409s; everything else stays a database error
fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            tracing::debug!(constraint, "Unique violation on write");
            return AppError::Conflict(format!(
                "A user with this userName or email already exists ({})",
                constraint
            ));
        }
    }
    AppError::Database(e)
}

pub struct PgDoctorStore {
    pool: PgPool,
}

impl PgDoctorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the tables exist
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = create_pool(database_url).await?;
        schema::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DoctorStore for PgDoctorStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_doctor(&self, user: NewUser, doctor: NewDoctor) -> AppResult<DoctorWithUser> {
        let user_id = Uuid::new_v4();
        let doctor_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO "Users"
                (id, user_name, password_hash, email, full_name, phone, address, role_name, is_anonymous)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user_id)
        .bind(&user.user_name)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role_name.as_str())
        .bind(user.is_anonymous)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query(
            r#"
            INSERT INTO "Doctors"
                (id, user_id, certificates, experiences, skills, work_days, work_start, work_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(doctor_id)
        .bind(user_id)
        .bind(&doctor.certificates)
        .bind(&doctor.experiences)
        .bind(&doctor.skills)
        .bind(&doctor.work_schedule.days)
        .bind(&doctor.work_schedule.hours.start)
        .bind(&doctor.work_schedule.hours.end)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, %doctor_id, "Failed to commit doctor creation");
            AppError::Internal(format!("Failed to commit creation of doctor {}: {}", doctor_id, e))
        })?;

        tracing::debug!(%doctor_id, %user_id, "Doctor and user inserted");

        self.find_doctor(doctor_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Doctor {} missing after insert", doctor_id)))
    }

    async fn list_doctors(&self, filter: &DoctorFilter) -> AppResult<Vec<DoctorWithUser>> {
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL OR $1 = ANY(d.skills))
              AND ($2::text IS NULL OR $2 = ANY(d.work_days))
            ORDER BY d.created_at, d.id"#,
            SELECT_DOCTORS
        );

        let rows = sqlx::query_as::<_, DoctorRow>(&sql)
            .bind(filter.skill.as_deref())
            .bind(filter.day.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(DoctorWithUser::from).collect())
    }

    async fn find_doctor(&self, id: Uuid) -> AppResult<Option<DoctorWithUser>> {
        let sql = format!("{} WHERE d.id = $1", SELECT_DOCTORS);

        let row = sqlx::query_as::<_, DoctorRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(DoctorWithUser::from))
    }

    async fn update_doctor(
        &self,
        id: Uuid,
        doctor: DoctorPatch,
        user: UserPatch,
    ) -> AppResult<Option<DoctorWithUser>> {
        let (days, start, end) = match doctor.work_schedule {
            Some(schedule) => (
                Some(schedule.days),
                Some(schedule.hours.start),
                Some(schedule.hours.end),
            ),
            None => (None, None, None),
        };

        let mut tx = self.pool.begin().await?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE "Doctors"
            SET certificates = COALESCE($1, certificates),
                experiences = COALESCE($2, experiences),
                skills = COALESCE($3, skills),
                work_days = COALESCE($4, work_days),
                work_start = COALESCE($5, work_start),
                work_end = COALESCE($6, work_end),
                updated_at = now()
            WHERE id = $7
            RETURNING user_id
            "#,
        )
        .bind(doctor.certificates)
        .bind(doctor.experiences)
        .bind(doctor.skills)
        .bind(days)
        .bind(start)
        .bind(end)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction rolls it back
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        if !user.is_empty() {
            sqlx::query(
                r#"
                UPDATE "Users"
                SET full_name = COALESCE($1, full_name),
                    email = COALESCE($2, email),
                    phone = COALESCE($3, phone),
                    address = COALESCE($4, address),
                    updated_at = now()
                WHERE id = $5
                "#,
            )
            .bind(user.full_name)
            .bind(user.email)
            .bind(user.phone)
            .bind(user.address)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, doctor_id = %id, "Failed to commit doctor update");
            AppError::Internal(format!("Failed to commit update of doctor {}: {}", id, e))
        })?;

        self.find_doctor(id).await
    }

    async fn delete_doctor(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<Uuid> =
            sqlx::query_scalar(r#"DELETE FROM "Doctors" WHERE id = $1 RETURNING user_id"#)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query(r#"DELETE FROM "Users" WHERE id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, doctor_id = %id, "Failed to commit doctor deletion");
            AppError::Internal(format!("Failed to commit deletion of doctor {}: {}", id, e))
        })?;

        tracing::debug!(doctor_id = %id, %user_id, "Doctor and user deleted");
        Ok(true)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "Users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
