// src/services/record_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::field_error},
    db::RecordStore,
    models::{
        auth::{BootstrapResponse, SessionUser, UpsertProfilePayload, UserProfile, DEFAULT_USER_NAME},
        record::{Record, RecordDraft, RecordKind, RecordPatch},
        shift::{Shift, UNKNOWN_JOB_TITLE},
        workforce::{Employee, Job, Material, TenantId},
    },
};

/// CRUD genérico das quatro tabelas para o tenant da sessão.
/// Validação acontece aqui, antes de qualquer chamada ao store.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    // --- CREATE ---
    pub async fn create(&self, user: &SessionUser, kind: RecordKind, payload: Value) -> Result<Record, AppError> {
        let mut draft = RecordDraft::from_json(kind, payload)?;
        draft.check()?;

        // Turno sem título: copia o da obra (snapshot, não acompanha renomeações).
        if let RecordDraft::Shift(new_shift) = &mut draft {
            if new_shift.job_title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                new_shift.job_title = Some(self.job_title_for(&user.tenant_id, new_shift.job_id).await?);
            }
        }

        let record = draft.into_record(user.tenant_id.clone(), user.id);
        self.store.insert(&user.tenant_id, record).await
    }

    // --- UPDATE ---
    pub async fn update(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: Uuid,
        payload: Value,
    ) -> Result<Record, AppError> {
        let patch = RecordPatch::from_json(kind, payload)?;

        // Aprovação só pelo endpoint próprio, para a notificação sair uma única vez.
        if let RecordPatch::Shift(shift_patch) = &patch {
            if shift_patch.touches_approval() {
                return Err(field_error("status", "approval_fields"));
            }
        }
        patch.check()?;

        self.store.update(tenant, kind, id, patch).await
    }

    // --- DELETE ---
    pub async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        self.store.delete(tenant, kind, id).await?;
        tracing::info!("🗑️ {} {} removido do tenant {}", kind, id, tenant);
        Ok(())
    }

    pub async fn list(&self, tenant: &TenantId, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        self.store.list(tenant, kind).await
    }

    pub async fn find(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<Record, AppError> {
        self.store.find(tenant, kind, id).await?.ok_or(AppError::RecordNotFound)
    }

    // --- Listas tipadas ---

    pub async fn employees(&self, tenant: &TenantId) -> Result<Vec<Employee>, AppError> {
        let rows = self.store.list(tenant, RecordKind::Employees).await?;
        Ok(rows.into_iter().filter_map(|r| match r { Record::Employee(e) => Some(e), _ => None }).collect())
    }

    pub async fn jobs(&self, tenant: &TenantId) -> Result<Vec<Job>, AppError> {
        let rows = self.store.list(tenant, RecordKind::Jobs).await?;
        Ok(rows.into_iter().filter_map(|r| match r { Record::Job(j) => Some(j), _ => None }).collect())
    }

    pub async fn materials(&self, tenant: &TenantId) -> Result<Vec<Material>, AppError> {
        let rows = self.store.list(tenant, RecordKind::Materials).await?;
        Ok(rows.into_iter().filter_map(|r| match r { Record::Material(m) => Some(m), _ => None }).collect())
    }

    pub async fn shifts(&self, tenant: &TenantId) -> Result<Vec<Shift>, AppError> {
        let rows = self.store.list(tenant, RecordKind::Shifts).await?;
        Ok(rows.into_iter().filter_map(|r| match r { Record::Shift(s) => Some(s), _ => None }).collect())
    }

    /// Obra inexistente (ou de outro tenant) vira "Lucrare necunoscută".
    pub async fn job_title_for(&self, tenant: &TenantId, job_id: Uuid) -> Result<String, AppError> {
        let job = self.store.find(tenant, RecordKind::Jobs, job_id).await?;
        Ok(match job {
            Some(Record::Job(job)) => job.title,
            _ => UNKNOWN_JOB_TITLE.to_string(),
        })
    }

    // --- BOOTSTRAP ---
    pub async fn bootstrap(&self, user: &SessionUser) -> Result<BootstrapResponse, AppError> {
        let tenant = &user.tenant_id;

        let (profile, employees, jobs, materials, mut shifts) = tokio::try_join!(
            self.store.find_profile(tenant, user.id),
            self.employees(tenant),
            self.jobs(tenant),
            self.materials(tenant),
            self.shifts(tenant),
        )?;

        // Mais recente primeiro, como a tela de relatórios espera
        shifts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(BootstrapResponse {
            user: user.clone(),
            user_name: profile
                .map(|p| p.name)
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            employees,
            jobs,
            materials,
            shifts,
        })
    }

    // --- PERFIL ---
    pub async fn upsert_profile(&self, user: &SessionUser, payload: UpsertProfilePayload) -> Result<UserProfile, AppError> {
        payload.validate()?;

        self.store
            .upsert_profile(UserProfile {
                user_id: user.id,
                tenant_id: user.tenant_id.clone(),
                name: payload.name.trim().to_string(),
                updated_at: Utc::now(),
            })
            .await
    }
}
