// src/db/memory_store.rs

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::record_store::RecordStore,
    models::{
        auth::UserProfile,
        record::{Record, RecordKind, RecordPatch},
        workforce::TenantId,
    },
};

#[derive(Default)]
struct Tables {
    // Vec para preservar a ordem de inserção no `list`.
    records: HashMap<RecordKind, Vec<Record>>,
    profiles: Vec<UserProfile>,
}

/// Store em memória (STORE_BACKEND=memory e testes). Clonar compartilha os dados.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, tenant: &TenantId, mut record: Record) -> Result<Record, AppError> {
        record.stamp_tenant(tenant);

        let mut tables = self.tables.write().await;
        tables.records.entry(record.kind()).or_default().push(record.clone());
        Ok(record)
    }

    async fn find(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<Option<Record>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.id() == id && r.tenant_id() == tenant))
            .cloned())
    }

    async fn update(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Record, AppError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .records
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|r| r.id() == id && r.tenant_id() == tenant))
            .ok_or(AppError::RecordNotFound)?;

        // Aplica numa cópia: se o patch for rejeitado a linha fica intacta.
        let mut updated = row.clone();
        patch.apply_to(&mut updated)?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let rows = tables.records.get_mut(&kind).ok_or(AppError::RecordNotFound)?;
        let pos = rows
            .iter()
            .position(|r| r.id() == id && r.tenant_id() == tenant)
            .ok_or(AppError::RecordNotFound)?;
        rows.remove(pos);
        Ok(())
    }

    async fn list(&self, tenant: &TenantId, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| r.tenant_id() == tenant).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_profile(&self, tenant: &TenantId, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| &p.tenant_id == tenant && p.user_id == user_id)
            .cloned())
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert_profile(&self, mut profile: UserProfile) -> Result<UserProfile, AppError> {
        profile.updated_at = Utc::now();

        let mut tables = self.tables.write().await;
        match tables
            .profiles
            .iter_mut()
            .find(|p| p.tenant_id == profile.tenant_id && p.user_id == profile.user_id)
        {
            Some(existing) => *existing = profile.clone(),
            None => tables.profiles.push(profile.clone()),
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        record::RecordDraft,
        shift::{NewShift, ShiftPatch, ShiftStatus},
        workforce::{EmployeePatch, NewEmployee},
    };
    use rust_decimal::Decimal;

    fn tenant(raw: &str) -> TenantId {
        TenantId::new(raw).unwrap()
    }

    fn bob() -> Record {
        RecordDraft::Employee(NewEmployee {
            name: "Bob".into(),
            phone: None,
            hire_date: None,
            hourly_rate: Some(Decimal::from(20)),
        })
        .into_record(tenant("ignored"), Uuid::new_v4())
    }

    #[tokio::test]
    async fn insert_stamps_the_session_tenant() {
        let store = MemoryRecordStore::new();
        let saved = store.insert(&tenant("t1"), bob()).await.unwrap();
        assert_eq!(saved.tenant_id().as_str(), "t1");
        assert_eq!(store.list(&tenant("t1"), RecordKind::Employees).await.unwrap().len(), 1);
        assert!(store.list(&tenant("t2"), RecordKind::Employees).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cross_tenant_update_and_delete_are_not_found() {
        let store = MemoryRecordStore::new();
        let saved = store.insert(&tenant("b"), bob()).await.unwrap();

        let patch = RecordPatch::Employee(EmployeePatch { name: Some("Mallory".into()), ..Default::default() });
        let err = store.update(&tenant("a"), RecordKind::Employees, saved.id(), patch).await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.delete(&tenant("a"), RecordKind::Employees, saved.id()).await.unwrap_err();
        assert!(err.is_not_found());

        // O registro de B continua intacto
        let still = store.find(&tenant("b"), RecordKind::Employees, saved.id()).await.unwrap().unwrap();
        assert_eq!(still, saved);
    }

    #[tokio::test]
    async fn rejected_patch_leaves_the_row_untouched() {
        let store = MemoryRecordStore::new();
        let t = tenant("t1");
        let shift = RecordDraft::Shift(NewShift {
            job_id: Uuid::new_v4(),
            job_title: Some("Site A".into()),
            date: None,
            notes: None,
            task_checklist: Vec::new(),
        })
        .into_record(t.clone(), Uuid::new_v4());
        let saved = store.insert(&t, shift).await.unwrap();

        let approve = ShiftPatch {
            status: Some(ShiftStatus::Approved),
            approved_by_name: Some("Alice".into()),
            ..Default::default()
        };
        store.update(&t, RecordKind::Shifts, saved.id(), approve.into()).await.unwrap();

        let late = ShiftPatch { progress: Some(50), ..Default::default() };
        let err = store.update(&t, RecordKind::Shifts, saved.id(), late.into()).await.unwrap_err();
        assert!(matches!(err, AppError::ShiftLocked));

        let row = store.find(&t, RecordKind::Shifts, saved.id()).await.unwrap().unwrap().into_shift().unwrap();
        assert_eq!(row.progress, 0);
        assert_eq!(row.status, ShiftStatus::Approved);
    }

    #[tokio::test]
    async fn profiles_are_upserted_per_tenant_and_user() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        let mut profile = UserProfile { user_id: user, tenant_id: tenant("t1"), name: "Ana".into(), updated_at: Utc::now() };
        store.upsert_profile(profile.clone()).await.unwrap();

        profile.name = "Ana Maria".into();
        store.upsert_profile(profile).await.unwrap();

        let found = store.find_profile(&tenant("t1"), user).await.unwrap().unwrap();
        assert_eq!(found.name, "Ana Maria");
        assert!(store.find_profile(&tenant("t2"), user).await.unwrap().is_none());
        assert!(store.find_profile_by_user(user).await.unwrap().is_some());
    }
}
