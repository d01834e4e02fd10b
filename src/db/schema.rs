use sqlx::PgPool;

/// Tables for accounts and doctor profiles. A profile is removed with its account.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "Users" (
    id UUID PRIMARY KEY,
    user_name TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    email TEXT UNIQUE,
    full_name TEXT,
    phone TEXT,
    address TEXT,
    role_name TEXT NOT NULL,
    is_anonymous BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "Doctors" (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL UNIQUE REFERENCES "Users"(id) ON DELETE CASCADE,
    certificates TEXT[] NOT NULL DEFAULT '{}',
    experiences TEXT[] NOT NULL DEFAULT '{}',
    skills TEXT[] NOT NULL DEFAULT '{}',
    work_days TEXT[] NOT NULL DEFAULT '{}',
    work_start TEXT NOT NULL DEFAULT '',
    work_end TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS doctors_skills_idx ON "Doctors" USING GIN (skills);
CREATE INDEX IF NOT EXISTS doctors_work_days_idx ON "Doctors" USING GIN (work_days);
"#;

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("Database schema ensured");
    Ok(())
}
