// src/services/shift_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{SessionUser, DEFAULT_USER_NAME},
        record::{Record, RecordKind, RecordPatch},
        shift::{NewShift, Shift, ShiftPatch, TaskItem},
        workforce::TenantId,
    },
    services::{
        notification::{notify_best_effort, NotificationOutcome, Notifier, ShiftApprovedNotice},
        record_service::RecordService,
    },
};

// Resposta da aprovação: o turno já gravado + o que aconteceu com o e-mail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub shift: Shift,
    pub notification: NotificationOutcome,
}

/// Liga as transições puras do turno ao store.
#[derive(Clone)]
pub struct ShiftService {
    records: RecordService,
    notifier: Arc<dyn Notifier>,
    notification_recipient: Option<String>,
}

impl ShiftService {
    pub fn new(records: RecordService, notifier: Arc<dyn Notifier>, notification_recipient: Option<String>) -> Self {
        Self { records, notifier, notification_recipient }
    }

    pub async fn load(&self, tenant: &TenantId, id: Uuid) -> Result<Shift, AppError> {
        self.records.find(tenant, RecordKind::Shifts, id).await?.into_shift()
    }

    /// Lê, calcula o patch com a transição e grava.
    async fn transition<F>(&self, tenant: &TenantId, id: Uuid, f: F) -> Result<Shift, AppError>
    where
        F: FnOnce(&Shift) -> Result<ShiftPatch, AppError>,
    {
        let shift = self.load(tenant, id).await?;
        let patch = f(&shift)?;
        self.records
            .store()
            .update(tenant, RecordKind::Shifts, id, RecordPatch::Shift(patch))
            .await?
            .into_shift()
    }

    // =========================================================================
    //  TRANSIÇÕES
    // =========================================================================

    pub async fn toggle_employee(&self, tenant: &TenantId, id: Uuid, employee_id: Uuid) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.toggle_employee(employee_id)).await
    }

    pub async fn set_hours(&self, tenant: &TenantId, id: Uuid, employee_id: Uuid, hours: Decimal) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.set_hours(employee_id, hours)).await
    }

    pub async fn record_material_usage(
        &self,
        tenant: &TenantId,
        id: Uuid,
        material_id: Uuid,
        quantity: Decimal,
    ) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.record_material_usage(material_id, quantity)).await
    }

    pub async fn remove_material_usage(&self, tenant: &TenantId, id: Uuid, index: usize) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.remove_material_usage(index)).await
    }

    pub async fn set_progress(&self, tenant: &TenantId, id: Uuid, value: i32) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.set_progress(value)).await
    }

    pub async fn set_notes(&self, tenant: &TenantId, id: Uuid, notes: String) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.set_notes(notes)).await
    }

    pub async fn set_checklist(&self, tenant: &TenantId, id: Uuid, tasks: Vec<TaskItem>) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.set_checklist(tasks)).await
    }

    pub async fn toggle_task(&self, tenant: &TenantId, id: Uuid, task_id: Uuid) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.toggle_task(task_id)).await
    }

    pub async fn move_date(&self, tenant: &TenantId, id: Uuid, date: NaiveDate) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| Ok(s.move_date(date))).await
    }

    pub async fn submit(&self, tenant: &TenantId, id: Uuid) -> Result<Shift, AppError> {
        self.transition(tenant, id, |s| s.submit()).await
    }

    // =========================================================================
    //  APROVAÇÃO
    // =========================================================================

    /// Grava primeiro, notifica depois (uma vez). Falha no e-mail não desfaz nada.
    pub async fn approve(
        &self,
        user: &SessionUser,
        id: Uuid,
        approver_name: Option<String>,
    ) -> Result<ApprovalResponse, AppError> {
        let approver_name = match approver_name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => self
                .records
                .store()
                .find_profile(&user.tenant_id, user.id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
        };

        let now = Utc::now();
        let shift = self
            .transition(&user.tenant_id, id, |s| s.approve(user.id, &approver_name, now))
            .await?;

        tracing::info!("✅ Raport {} aprovado por {}", shift.id, approver_name);

        let notice = ShiftApprovedNotice::for_shift(&shift, approver_name, self.notification_recipient.clone());
        let notification = notify_best_effort(self.notifier.as_ref(), &notice).await;

        Ok(ApprovalResponse { shift, notification })
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// Novo turno para a obra. `date` é o dia; a hora é a atual.
    pub async fn create_for_job(&self, user: &SessionUser, job_id: Uuid, date: Option<NaiveDate>) -> Result<Shift, AppError> {
        let now = Utc::now();
        let title = self.records.job_title_for(&user.tenant_id, job_id).await?;

        let draft = NewShift {
            job_id,
            job_title: Some(title),
            date: date.map(|d| d.and_time(now.time()).and_utc()),
            notes: None,
            task_checklist: Vec::new(),
        };

        let shift = draft.into_shift(user.tenant_id.clone(), user.id, now);
        self.records
            .store()
            .insert(&user.tenant_id, Record::Shift(shift))
            .await?
            .into_shift()
    }

    /// Uma cópia limpa por data, todas independentes.
    pub async fn duplicate_for_dates(&self, user: &SessionUser, source_id: Uuid, dates: &[NaiveDate]) -> Result<Vec<Shift>, AppError> {
        let source = self.load(&user.tenant_id, source_id).await?;
        let now = Utc::now();
        let store = self.records.store();

        let inserts = dates.iter().map(|date| {
            let copy = source.duplicate_onto(*date, user.id, now);
            let store = store.clone();
            async move { store.insert(&user.tenant_id, Record::Shift(copy)).await?.into_shift() }
        });

        let copies = try_join_all(inserts).await?;
        tracing::info!("📋 Raport {} duplicado em {} datas", source_id, copies.len());
        Ok(copies)
    }
}
