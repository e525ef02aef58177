// src/sync/remote.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{SessionUser, DEFAULT_USER_NAME},
        record::{Record, RecordDraft, RecordKind, RecordPatch},
        shift::{ShiftPatch, UNKNOWN_JOB_TITLE},
    },
    services::{
        notification::{notify_best_effort, DisabledNotifier, Notifier, ShiftApprovedNotice},
        shift_service::ApprovalResponse,
    },
};

/// Fonte da verdade vista pelo cliente. O tenant é implícito (vem da sessão).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create(&self, draft: RecordDraft) -> Result<Record, AppError>;

    async fn update(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError>;

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError>;

    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, AppError>;

    /// Grava a aprovação e dispara a notificação uma única vez.
    async fn approve(&self, id: Uuid, patch: ShiftPatch) -> Result<ApprovalResponse, AppError>;

    /// Sem rota de leitura unitária na API: filtra o `list`.
    async fn find(&self, kind: RecordKind, id: Uuid) -> Result<Record, AppError> {
        self.list(kind)
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(AppError::RecordNotFound)
    }
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn create(&self, draft: RecordDraft) -> Result<Record, AppError> {
        (**self).create(draft).await
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError> {
        (**self).update(kind, id, patch).await
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        (**self).delete(kind, id).await
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        (**self).list(kind).await
    }

    async fn approve(&self, id: Uuid, patch: ShiftPatch) -> Result<ApprovalResponse, AppError> {
        (**self).approve(id, patch).await
    }

    async fn find(&self, kind: RecordKind, id: Uuid) -> Result<Record, AppError> {
        (**self).find(kind, id).await
    }
}

// ---
// ScopedStore: acesso direto ao store, preso ao tenant de uma sessão.
// Equivale ao cliente falando com as tabelas sem passar pela API HTTP.
// ---
#[derive(Clone)]
pub struct ScopedStore {
    store: Arc<dyn RecordStore>,
    user: SessionUser,
    notifier: Arc<dyn Notifier>,
    notification_recipient: Option<String>,
}

impl ScopedStore {
    /// Sem notificador: aprovações saem com `skipped`.
    pub fn new(store: Arc<dyn RecordStore>, user: SessionUser) -> Self {
        Self {
            store,
            user,
            notifier: Arc::new(DisabledNotifier),
            notification_recipient: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, recipient: Option<String>) -> Self {
        self.notifier = notifier;
        self.notification_recipient = recipient;
        self
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }
}

#[async_trait]
impl RemoteStore for ScopedStore {
    async fn create(&self, mut draft: RecordDraft) -> Result<Record, AppError> {
        draft.check()?;

        if let RecordDraft::Shift(new_shift) = &mut draft {
            if new_shift.job_title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                let job = self.store.find(&self.user.tenant_id, RecordKind::Jobs, new_shift.job_id).await?;
                new_shift.job_title = Some(match job {
                    Some(Record::Job(job)) => job.title,
                    _ => UNKNOWN_JOB_TITLE.to_string(),
                });
            }
        }

        let record = draft.into_record(self.user.tenant_id.clone(), self.user.id);
        self.store.insert(&self.user.tenant_id, record).await
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError> {
        patch.check()?;

        // Aprovação escrita direto no store também notifica.
        if let RecordPatch::Shift(shift_patch) = &patch {
            if shift_patch.touches_approval() {
                return self.approve(id, shift_patch.clone()).await.map(|a| Record::Shift(a.shift));
            }
        }

        self.store.update(&self.user.tenant_id, kind, id, patch).await
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        self.store.delete(&self.user.tenant_id, kind, id).await
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        self.store.list(&self.user.tenant_id, kind).await
    }

    async fn approve(&self, id: Uuid, patch: ShiftPatch) -> Result<ApprovalResponse, AppError> {
        patch.check()?;
        // O store recusa turno já aprovado (ShiftLocked): a notificação não se repete.
        let shift = self
            .store
            .update(&self.user.tenant_id, RecordKind::Shifts, id, RecordPatch::Shift(patch))
            .await?
            .into_shift()?;

        let approver = shift
            .approved_by_name
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());
        tracing::info!("✅ Raport {} aprovado por {}", shift.id, approver);

        let notice = ShiftApprovedNotice::for_shift(&shift, approver, self.notification_recipient.clone());
        let notification = notify_best_effort(self.notifier.as_ref(), &notice).await;
        Ok(ApprovalResponse { shift, notification })
    }

    async fn find(&self, kind: RecordKind, id: Uuid) -> Result<Record, AppError> {
        self.store
            .find(&self.user.tenant_id, kind, id)
            .await?
            .ok_or(AppError::RecordNotFound)
    }
}
