// src/db/pg_store.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::record_store::RecordStore,
    models::{
        auth::UserProfile,
        record::{Record, RecordKind, RecordPatch},
        shift::{MaterialUsage, Shift, ShiftStatus, TaskItem},
        workforce::{Employee, Job, Material, TenantId},
    },
};

// Linha crua da tabela `shifts`: as coleções vivem em JSONB.
#[derive(Debug, FromRow)]
struct ShiftRow {
    id: Uuid,
    tenant_id: TenantId,
    job_id: Uuid,
    job_title: String,
    date: DateTime<Utc>,
    status: ShiftStatus,
    progress: i32,
    assigned_employee_ids: Vec<Uuid>,
    employee_hours: Json<BTreeMap<Uuid, Decimal>>,
    material_usage: Json<Vec<MaterialUsage>>,
    task_checklist: Json<Vec<TaskItem>>,
    notes: String,
    created_at: DateTime<Utc>,
    created_by: Uuid,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<Uuid>,
    approved_by_name: Option<String>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            tenant_id: row.tenant_id,
            job_id: row.job_id,
            job_title: row.job_title,
            date: row.date,
            status: row.status,
            progress: row.progress,
            assigned_employee_ids: row.assigned_employee_ids,
            employee_hours: row.employee_hours.0,
            material_usage: row.material_usage.0,
            task_checklist: row.task_checklist.0,
            notes: row.notes,
            created_at: row.created_at,
            created_by: row.created_by,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            approved_by_name: row.approved_by_name,
        }
    }
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    async fn select<'e, E>(
        executor: E,
        kind: RecordKind,
        tenant: &TenantId,
        id: Option<Uuid>,
        for_update: bool,
    ) -> Result<Vec<Record>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O nome da tabela vem do enum, nunca do usuário.
        // `$2` nulo = todas as linhas do tenant.
        let mut sql = format!(
            "SELECT * FROM {} WHERE tenant_id = $1 AND ($2::uuid IS NULL OR id = $2) ORDER BY created_at",
            kind.table()
        );
        if for_update {
            sql.push_str(" FOR UPDATE");
        }

        let records = match kind {
            RecordKind::Employees => sqlx::query_as::<_, Employee>(&sql)
                .bind(tenant.as_str())
                .bind(id)
                .fetch_all(executor)
                .await?
                .into_iter()
                .map(Record::Employee)
                .collect(),
            RecordKind::Jobs => sqlx::query_as::<_, Job>(&sql)
                .bind(tenant.as_str())
                .bind(id)
                .fetch_all(executor)
                .await?
                .into_iter()
                .map(Record::Job)
                .collect(),
            RecordKind::Materials => sqlx::query_as::<_, Material>(&sql)
                .bind(tenant.as_str())
                .bind(id)
                .fetch_all(executor)
                .await?
                .into_iter()
                .map(Record::Material)
                .collect(),
            RecordKind::Shifts => sqlx::query_as::<_, ShiftRow>(&sql)
                .bind(tenant.as_str())
                .bind(id)
                .fetch_all(executor)
                .await?
                .into_iter()
                .map(|row| Record::Shift(row.into()))
                .collect(),
        };

        Ok(records)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    async fn write_new<'e, E>(executor: E, record: &Record) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match record {
            Record::Employee(e) => {
                sqlx::query(
                    r#"
                    INSERT INTO employees (id, tenant_id, name, phone, hire_date, hourly_rate, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(e.id)
                .bind(e.tenant_id.as_str())
                .bind(&e.name)
                .bind(&e.phone)
                .bind(e.hire_date)
                .bind(e.hourly_rate)
                .bind(e.created_at)
                .execute(executor)
                .await?;
            }
            Record::Job(j) => {
                sqlx::query(
                    r#"
                    INSERT INTO jobs (
                        id, tenant_id, title, location, manager, start_date,
                        estimated_labor_cost, estimated_material_cost, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(j.id)
                .bind(j.tenant_id.as_str())
                .bind(&j.title)
                .bind(&j.location)
                .bind(&j.manager)
                .bind(j.start_date)
                .bind(j.estimated_labor_cost)
                .bind(j.estimated_material_cost)
                .bind(j.created_at)
                .execute(executor)
                .await?;
            }
            Record::Material(m) => {
                sqlx::query(
                    r#"
                    INSERT INTO materials (id, tenant_id, name, unit, unit_cost, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(m.id)
                .bind(m.tenant_id.as_str())
                .bind(&m.name)
                .bind(m.unit)
                .bind(m.unit_cost)
                .bind(m.created_at)
                .execute(executor)
                .await?;
            }
            Record::Shift(s) => {
                sqlx::query(
                    r#"
                    INSERT INTO shifts (
                        id, tenant_id, job_id, job_title, date, status, progress,
                        assigned_employee_ids, employee_hours, material_usage, task_checklist,
                        notes, created_at, created_by, approved_at, approved_by, approved_by_name
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                    "#,
                )
                .bind(s.id)
                .bind(s.tenant_id.as_str())
                .bind(s.job_id)
                .bind(&s.job_title)
                .bind(s.date)
                .bind(s.status)
                .bind(s.progress)
                .bind(&s.assigned_employee_ids)
                .bind(Json(&s.employee_hours))
                .bind(Json(&s.material_usage))
                .bind(Json(&s.task_checklist))
                .bind(&s.notes)
                .bind(s.created_at)
                .bind(s.created_by)
                .bind(s.approved_at)
                .bind(s.approved_by)
                .bind(&s.approved_by_name)
                .execute(executor)
                .await?;
            }
        }
        Ok(())
    }

    // Regrava a linha inteira. O WHERE repete o tenant por segurança.
    async fn write_back<'e, E>(executor: E, record: &Record) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = match record {
            Record::Employee(e) => {
                sqlx::query(
                    r#"
                    UPDATE employees
                    SET name = $3, phone = $4, hire_date = $5, hourly_rate = $6
                    WHERE id = $1 AND tenant_id = $2
                    "#,
                )
                .bind(e.id)
                .bind(e.tenant_id.as_str())
                .bind(&e.name)
                .bind(&e.phone)
                .bind(e.hire_date)
                .bind(e.hourly_rate)
                .execute(executor)
                .await?
            }
            Record::Job(j) => {
                sqlx::query(
                    r#"
                    UPDATE jobs
                    SET title = $3, location = $4, manager = $5, start_date = $6,
                        estimated_labor_cost = $7, estimated_material_cost = $8
                    WHERE id = $1 AND tenant_id = $2
                    "#,
                )
                .bind(j.id)
                .bind(j.tenant_id.as_str())
                .bind(&j.title)
                .bind(&j.location)
                .bind(&j.manager)
                .bind(j.start_date)
                .bind(j.estimated_labor_cost)
                .bind(j.estimated_material_cost)
                .execute(executor)
                .await?
            }
            Record::Material(m) => {
                sqlx::query(
                    r#"
                    UPDATE materials
                    SET name = $3, unit = $4, unit_cost = $5
                    WHERE id = $1 AND tenant_id = $2
                    "#,
                )
                .bind(m.id)
                .bind(m.tenant_id.as_str())
                .bind(&m.name)
                .bind(m.unit)
                .bind(m.unit_cost)
                .execute(executor)
                .await?
            }
            Record::Shift(s) => {
                sqlx::query(
                    r#"
                    UPDATE shifts
                    SET date = $3, status = $4, progress = $5, assigned_employee_ids = $6,
                        employee_hours = $7, material_usage = $8, task_checklist = $9, notes = $10,
                        approved_at = $11, approved_by = $12, approved_by_name = $13
                    WHERE id = $1 AND tenant_id = $2
                    "#,
                )
                .bind(s.id)
                .bind(s.tenant_id.as_str())
                .bind(s.date)
                .bind(s.status)
                .bind(s.progress)
                .bind(&s.assigned_employee_ids)
                .bind(Json(&s.employee_hours))
                .bind(Json(&s.material_usage))
                .bind(Json(&s.task_checklist))
                .bind(&s.notes)
                .bind(s.approved_at)
                .bind(s.approved_by)
                .bind(&s.approved_by_name)
                .execute(executor)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, tenant: &TenantId, mut record: Record) -> Result<Record, AppError> {
        record.stamp_tenant(tenant);
        let (kind, id) = (record.kind(), record.id());

        // Devolve a linha como o Postgres gravou (escala de NUMERIC,
        // timestamps em microssegundos), igual ao que um `list` veria depois.
        let mut tx = self.pool.begin().await?;
        Self::write_new(&mut *tx, &record).await?;
        let stored = Self::select(&mut *tx, kind, tenant, Some(id), false)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::RecordNotFound)?;
        tx.commit().await?;

        Ok(stored)
    }

    async fn find(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<Option<Record>, AppError> {
        let rows = Self::select(&self.pool, kind, tenant, Some(id), false).await?;
        Ok(rows.into_iter().next())
    }

    async fn update(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Record, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        // A linha fica travada até o commit; o patch é aplicado em Rust para
        // reaproveitar as regras de trava/transição do turno.
        let mut tx = self.pool.begin().await?;

        let mut record = Self::select(&mut *tx, kind, tenant, Some(id), true)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::RecordNotFound)?; // rollback automático no drop

        patch.apply_to(&mut record)?;
        Self::write_back(&mut *tx, &record).await?;
        let stored = Self::select(&mut *tx, kind, tenant, Some(id), false)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::RecordNotFound)?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(stored)
    }

    async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND tenant_id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }

    async fn list(&self, tenant: &TenantId, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        Self::select(&self.pool, kind, tenant, None, false).await
    }

    // =========================================================================
    //  PERFIS
    // =========================================================================

    async fn find_profile(&self, tenant: &TenantId, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, tenant_id, name, updated_at
            FROM user_profiles
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, tenant_id, name, updated_at
            FROM user_profiles
            WHERE user_id = $1
            ORDER BY updated_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, AppError> {
        let saved = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (tenant_id, user_id, name, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (tenant_id, user_id)
            DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
            RETURNING user_id, tenant_id, name, updated_at
            "#,
        )
        .bind(profile.tenant_id.as_str())
        .bind(profile.user_id)
        .bind(&profile.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }
}
