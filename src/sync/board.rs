// src/sync/board.rs

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use futures::future::{join_all, try_join_all};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        record::{Record, RecordDraft, RecordKind, RecordPatch},
        shift::{Shift, ShiftPatch},
    },
    services::notification::NotificationOutcome,
    sync::remote::RemoteStore,
};

/// Cache local das quatro coleções do tenant.
///
/// Toda mutação é aplicada aqui primeiro (otimista) e depois enviada ao
/// remoto. Se o remoto falhar, a coleção afetada é recarregada: o cache nunca
/// fica "à frente" do servidor depois de um erro.
pub struct ShiftBoard<R> {
    remote: R,
    cache: Mutex<HashMap<RecordKind, Vec<Record>>>,
}

impl<R: RemoteStore> ShiftBoard<R> {
    pub fn new(remote: R) -> Self {
        Self { remote, cache: Mutex::new(HashMap::new()) }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Carga inicial das quatro coleções.
    pub async fn load_all(&self) -> Result<(), AppError> {
        try_join_all(RecordKind::ALL.into_iter().map(|kind| self.reconcile(kind))).await?;
        Ok(())
    }

    /// Substitui a coleção local pelo que o remoto tem.
    pub async fn reconcile(&self, kind: RecordKind) -> Result<(), AppError> {
        let rows = self.remote.list(kind).await?;
        tracing::info!("🔄 {} ressincronizado ({} registros)", kind, rows.len());
        self.cache.lock().await.insert(kind, rows);
        Ok(())
    }

    pub async fn records(&self, kind: RecordKind) -> Vec<Record> {
        self.cache.lock().await.get(&kind).cloned().unwrap_or_default()
    }

    pub async fn get(&self, kind: RecordKind, id: Uuid) -> Option<Record> {
        self.cache
            .lock()
            .await
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.id() == id))
            .cloned()
    }

    pub async fn shifts(&self) -> Vec<Shift> {
        self.records(RecordKind::Shifts)
            .await
            .into_iter()
            .filter_map(|r| r.into_shift().ok())
            .collect()
    }

    pub async fn shift(&self, id: Uuid) -> Option<Shift> {
        self.get(RecordKind::Shifts, id).await.and_then(|r| r.into_shift().ok())
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    pub async fn create(&self, draft: RecordDraft) -> Result<Record, AppError> {
        draft.check()?;
        let kind = draft.kind();

        match self.remote.create(draft).await {
            Ok(record) => {
                self.cache.lock().await.entry(kind).or_default().push(record.clone());
                Ok(record)
            }
            Err(err) => Err(self.resync_after(kind, err).await),
        }
    }

    /// Aplica o patch localmente e no remoto. Em erro remoto, recarrega a coleção.
    pub async fn apply(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError> {
        match self.apply_optimistic(kind, id, patch).await {
            Ok(record) => Ok(record),
            Err(Failure::Local(err)) => Err(err),
            Err(Failure::Remote(err)) => Err(self.resync_after(kind, err).await),
        }
    }

    pub async fn remove(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        if let Some(rows) = self.cache.lock().await.get_mut(&kind) {
            rows.retain(|r| r.id() != id);
        }

        match self.remote.delete(kind, id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.resync_after(kind, err).await),
        }
    }

    /// Fan-out: N updates independentes em paralelo, resultado por registro.
    /// Uma falha só ressincroniza o registro que falhou.
    pub async fn apply_many(
        &self,
        kind: RecordKind,
        patches: Vec<(Uuid, RecordPatch)>,
    ) -> Vec<(Uuid, Result<Record, AppError>)> {
        let calls = patches.into_iter().map(|(id, patch)| async move {
            let result = match self.apply_optimistic(kind, id, patch).await {
                Ok(record) => Ok(record),
                Err(Failure::Local(err)) => Err(err),
                Err(Failure::Remote(err)) => {
                    self.resync_record(kind, id).await;
                    Err(err)
                }
            };
            (id, result)
        });
        join_all(calls).await
    }

    async fn apply_optimistic(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, Failure> {
        self.apply_local(kind, id, &patch).await.map_err(Failure::Local)?;

        let record = self.remote.update(kind, id, patch).await.map_err(Failure::Remote)?;
        self.replace_local(record.clone()).await;
        Ok(record)
    }

    async fn apply_local(&self, kind: RecordKind, id: Uuid, patch: &RecordPatch) -> Result<(), AppError> {
        patch.check()?;

        let mut cache = self.cache.lock().await;
        if let Some(slot) = cache.get_mut(&kind).and_then(|rows| rows.iter_mut().find(|r| r.id() == id)) {
            // Trava de aprovação e transições são verificadas antes de sair da máquina.
            let mut draft = slot.clone();
            patch.clone().apply_to(&mut draft)?;
            *slot = draft;
        }
        Ok(())
    }

    async fn replace_local(&self, record: Record) {
        let mut cache = self.cache.lock().await;
        let rows = cache.entry(record.kind()).or_default();
        match rows.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => rows.push(record),
        }
    }

    async fn resync_after(&self, kind: RecordKind, err: AppError) -> AppError {
        tracing::warn!("⚠️ Falha remota em {}: {}. Recarregando do servidor.", kind, err);
        if let Err(resync_err) = self.reconcile(kind).await {
            tracing::warn!("⚠️ Ressincronização de {} falhou: {}", kind, resync_err);
        }
        err
    }

    async fn resync_record(&self, kind: RecordKind, id: Uuid) {
        match self.remote.find(kind, id).await {
            Ok(record) => self.replace_local(record).await,
            Err(err) if err.is_not_found() => {
                if let Some(rows) = self.cache.lock().await.get_mut(&kind) {
                    rows.retain(|r| r.id() != id);
                }
            }
            Err(err) => {
                tracing::warn!("⚠️ Não foi possível ressincronizar {} {}: {}", kind, id, err);
            }
        }
    }

    // =========================================================================
    //  TURNOS
    // =========================================================================

    async fn transition<F>(&self, id: Uuid, f: F) -> Result<Shift, AppError>
    where
        F: FnOnce(&Shift) -> Result<ShiftPatch, AppError>,
    {
        let shift = self.shift(id).await.ok_or(AppError::RecordNotFound)?;
        let patch = f(&shift)?;
        self.apply(RecordKind::Shifts, id, patch.into()).await?.into_shift()
    }

    pub async fn toggle_employee(&self, id: Uuid, employee_id: Uuid) -> Result<Shift, AppError> {
        self.transition(id, |s| s.toggle_employee(employee_id)).await
    }

    pub async fn set_hours(&self, id: Uuid, employee_id: Uuid, hours: Decimal) -> Result<Shift, AppError> {
        self.transition(id, |s| s.set_hours(employee_id, hours)).await
    }

    pub async fn record_material_usage(&self, id: Uuid, material_id: Uuid, quantity: Decimal) -> Result<Shift, AppError> {
        self.transition(id, |s| s.record_material_usage(material_id, quantity)).await
    }

    pub async fn remove_material_usage(&self, id: Uuid, index: usize) -> Result<Shift, AppError> {
        self.transition(id, |s| s.remove_material_usage(index)).await
    }

    pub async fn set_progress(&self, id: Uuid, value: i32) -> Result<Shift, AppError> {
        self.transition(id, |s| s.set_progress(value)).await
    }

    pub async fn set_notes(&self, id: Uuid, notes: String) -> Result<Shift, AppError> {
        self.transition(id, |s| s.set_notes(notes)).await
    }

    pub async fn toggle_task(&self, id: Uuid, task_id: Uuid) -> Result<Shift, AppError> {
        self.transition(id, |s| s.toggle_task(task_id)).await
    }

    pub async fn move_date(&self, id: Uuid, date: NaiveDate) -> Result<Shift, AppError> {
        self.transition(id, |s| Ok(s.move_date(date))).await
    }

    pub async fn submit(&self, id: Uuid) -> Result<Shift, AppError> {
        self.transition(id, |s| s.submit()).await
    }

    /// Aprova e devolve o que aconteceu com o e-mail. `Failed` é só um aviso:
    /// a aprovação já está gravada.
    pub async fn approve(
        &self,
        id: Uuid,
        approver_id: Uuid,
        approver_name: &str,
    ) -> Result<(Shift, NotificationOutcome), AppError> {
        let shift = self.shift(id).await.ok_or(AppError::RecordNotFound)?;
        let patch = shift.approve(approver_id, approver_name, Utc::now())?;
        self.apply_local(RecordKind::Shifts, id, &RecordPatch::Shift(patch.clone())).await?;

        match self.remote.approve(id, patch).await {
            Ok(approval) => {
                self.replace_local(Record::Shift(approval.shift.clone())).await;
                if let NotificationOutcome::Failed { reason } = &approval.notification {
                    tracing::warn!("⚠️ Raport {} aprovado, mas o e-mail falhou: {}", id, reason);
                }
                Ok((approval.shift, approval.notification))
            }
            Err(err) => Err(self.resync_after(RecordKind::Shifts, err).await),
        }
    }

    /// Ajuste de pontaj em lote: mesmas horas para um funcionário em vários turnos.
    pub async fn adjust_hours_bulk(
        &self,
        employee_id: Uuid,
        hours: Decimal,
        shift_ids: &[Uuid],
    ) -> Vec<(Uuid, Result<Shift, AppError>)> {
        let mut results = Vec::with_capacity(shift_ids.len());
        let mut patches = Vec::new();

        for id in shift_ids {
            let planned = match self.shift(*id).await {
                Some(shift) => shift.set_hours(employee_id, hours),
                None => Err(AppError::RecordNotFound),
            };
            match planned {
                Ok(patch) => patches.push((*id, RecordPatch::from(patch))),
                Err(err) => results.push((*id, Err(err))),
            }
        }

        for (id, outcome) in self.apply_many(RecordKind::Shifts, patches).await {
            results.push((id, outcome.and_then(Record::into_shift)));
        }
        results
    }
}

// Erro local (validação, trava) nunca chega ao remoto e não pede ressincronização.
enum Failure {
    Local(AppError),
    Remote(AppError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryRecordStore, RecordStore},
        models::{auth::SessionUser, shift::ShiftStatus, workforce::TenantId},
        services::{
            notification::{Notifier, ShiftApprovedNotice},
            shift_service::ApprovalResponse,
        },
        sync::remote::ScopedStore,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex as StdMutex,
        },
    };

    // Remoto que delega para um ScopedStore mas derruba updates de ids marcados.
    struct FlakyRemote {
        inner: ScopedStore,
        failing: StdMutex<HashSet<Uuid>>,
        updates: AtomicUsize,
    }

    impl FlakyRemote {
        fn new(inner: ScopedStore) -> Self {
            Self { inner, failing: StdMutex::new(HashSet::new()), updates: AtomicUsize::new(0) }
        }

        fn fail_on(&self, id: Uuid) {
            self.failing.lock().unwrap().insert(id);
        }
    }

    #[async_trait]
    impl RemoteStore for FlakyRemote {
        async fn create(&self, draft: RecordDraft) -> Result<Record, AppError> {
            self.inner.create(draft).await
        }

        async fn update(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(&id) {
                return Err(AppError::RemoteError("connection reset".into()));
            }
            self.inner.update(kind, id, patch).await
        }

        async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
            self.inner.delete(kind, id).await
        }

        async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, AppError> {
            self.inner.list(kind).await
        }

        async fn approve(&self, id: Uuid, patch: ShiftPatch) -> Result<ApprovalResponse, AppError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.approve(id, patch).await
        }
    }

    // Notificador que sempre falha e conta as chamadas.
    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn shift_approved(&self, _notice: &ShiftApprovedNotice) -> Result<NotificationOutcome, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::NotificationError("smtp down".into()))
        }
    }

    async fn board_with_shifts(n: usize) -> (ShiftBoard<FlakyRemote>, Arc<dyn RecordStore>, Vec<Uuid>) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let user = SessionUser { id: Uuid::new_v4(), tenant_id: TenantId::new("t1").unwrap() };
        let board = ShiftBoard::new(FlakyRemote::new(ScopedStore::new(store.clone(), user)));

        let job = board
            .create(RecordDraft::from_json(RecordKind::Jobs, json!({ "title": "Site A" })).unwrap())
            .await
            .unwrap();
        let mut ids = Vec::new();
        for _ in 0..n {
            let shift = board
                .create(RecordDraft::from_json(RecordKind::Shifts, json!({ "jobId": job.id() })).unwrap())
                .await
                .unwrap();
            ids.push(shift.id());
        }
        (board, store, ids)
    }

    #[tokio::test]
    async fn failed_remote_update_leaves_the_cache_equal_to_the_server() {
        let (board, _, ids) = board_with_shifts(1).await;
        let id = ids[0];
        board.set_progress(id, 30).await.unwrap();

        board.remote().fail_on(id);
        let err = board.set_progress(id, 90).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteError(_)));

        // Otimista seria 90; depois da falha o cache volta para o valor do servidor.
        let server = board.remote().find(RecordKind::Shifts, id).await.unwrap();
        assert_eq!(board.get(RecordKind::Shifts, id).await.unwrap(), server);
        assert_eq!(board.shift(id).await.unwrap().progress, 30);
    }

    #[tokio::test]
    async fn local_rejections_never_reach_the_remote() {
        let (board, _, ids) = board_with_shifts(1).await;
        let id = ids[0];

        let err = board.set_hours(id, Uuid::new_v4(), Decimal::from(4)).await.unwrap_err();
        assert!(matches!(err, AppError::EmployeeNotAssigned(_)));

        let err = board.record_material_usage(id, Uuid::new_v4(), Decimal::ZERO).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert_eq!(board.remote().updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn approved_shifts_are_locked_except_for_moving_the_date() {
        let (board, _, ids) = board_with_shifts(1).await;
        let id = ids[0];
        let approver = Uuid::new_v4();

        let (shift, notification) = board.approve(id, approver, "Alice").await.unwrap();
        assert!(matches!(notification, NotificationOutcome::Skipped { .. }));
        assert_eq!(shift.status, ShiftStatus::Approved);
        assert_eq!(shift.approved_by, Some(approver));

        let calls = board.remote().updates.load(Ordering::SeqCst);
        assert!(matches!(board.set_notes(id, "late".into()).await, Err(AppError::ShiftLocked)));
        assert_eq!(board.remote().updates.load(Ordering::SeqCst), calls);

        let target = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let moved = board.move_date(id, target).await.unwrap();
        assert_eq!(moved.date.date_naive(), target);
        assert_eq!(moved.status, ShiftStatus::Approved);
    }

    #[tokio::test]
    async fn bulk_adjustment_resyncs_only_the_failed_records() {
        let (board, store, ids) = board_with_shifts(3).await;
        let bob = Uuid::new_v4();
        for id in &ids {
            board.toggle_employee(*id, bob).await.unwrap();
        }

        board.remote().fail_on(ids[1]);
        let results = board.adjust_hours_bulk(bob, Decimal::from(10), &ids).await;

        assert_eq!(results.len(), 3);
        for (id, outcome) in &results {
            if *id == ids[1] {
                assert!(outcome.is_err());
            } else {
                assert_eq!(outcome.as_ref().unwrap().employee_hours[&bob], Decimal::from(10));
            }
        }

        // O registro que falhou voltou às 8h do servidor; os outros mantêm as 10h.
        let tenant = TenantId::new("t1").unwrap();
        let stored = store.find(&tenant, RecordKind::Shifts, ids[1]).await.unwrap().unwrap();
        assert_eq!(board.get(RecordKind::Shifts, ids[1]).await.unwrap(), stored);
        assert_eq!(board.shift(ids[1]).await.unwrap().employee_hours[&bob], Decimal::from(8));
        assert_eq!(board.shift(ids[0]).await.unwrap().employee_hours[&bob], Decimal::from(10));
    }

    #[tokio::test]
    async fn deleting_a_record_gone_on_the_server_resyncs_the_collection() {
        let (board, store, ids) = board_with_shifts(1).await;
        let id = ids[0];

        // Apagado por fora: o remove local funciona, o remoto devolve 404 e o cache recarrega.
        let tenant = TenantId::new("t1").unwrap();
        store.delete(&tenant, RecordKind::Shifts, id).await.unwrap();
        assert!(board.remove(RecordKind::Shifts, id).await.unwrap_err().is_not_found());
        assert!(board.shifts().await.is_empty());

        board.load_all().await.unwrap();
        assert_eq!(board.records(RecordKind::Jobs).await.len(), 1);
    }

    #[tokio::test]
    async fn direct_store_approval_notifies_exactly_once() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let user = SessionUser { id: Uuid::new_v4(), tenant_id: TenantId::new("t1").unwrap() };
        let notifier = Arc::new(CountingNotifier::default());
        let scoped = ScopedStore::new(store, user.clone()).with_notifier(notifier.clone(), Some("boss@test".into()));
        let board = ShiftBoard::new(scoped);

        let job = board
            .create(RecordDraft::from_json(RecordKind::Jobs, json!({ "title": "Site A" })).unwrap())
            .await
            .unwrap();
        let shift = board
            .create(RecordDraft::from_json(RecordKind::Shifts, json!({ "jobId": job.id() })).unwrap())
            .await
            .unwrap();

        let (approved, notification) = board.approve(shift.id(), user.id, "Alice").await.unwrap();
        assert!(approved.is_approved());
        assert!(matches!(notification, NotificationOutcome::Failed { .. }));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(board.shift(shift.id()).await.unwrap(), approved);

        // Segunda tentativa: travada localmente, nada é reenviado.
        assert!(matches!(board.approve(shift.id(), user.id, "Alice").await, Err(AppError::ShiftLocked)));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

        // Aprovação escrita como update genérico direto no store também notifica.
        let other = board
            .create(RecordDraft::from_json(RecordKind::Shifts, json!({ "jobId": job.id() })).unwrap())
            .await
            .unwrap()
            .into_shift()
            .unwrap();
        let patch = other.approve(user.id, "Bob", Utc::now()).unwrap();
        board.remote().update(RecordKind::Shifts, other.id, patch.into()).await.unwrap();
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
    }
}
