// src/models/shift.rs

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{ensure_non_negative, ensure_not_blank, ensure_positive, field_error},
    },
    models::workforce::{Job, TenantId},
};

/// Horas atribuídas a um funcionário recém-alocado.
pub const DEFAULT_SHIFT_HOURS: i64 = 8;

/// Título usado quando o turno aponta para uma obra que não existe.
pub const UNKNOWN_JOB_TITLE: &str = "Lucrare necunoscută";

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shift_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    #[default]
    Open,
    Submitted,
    Approved,
}

impl ShiftStatus {
    /// open -> submitted -> approved, podendo pular o submitted.
    /// Approved é terminal: não existe caminho de volta.
    pub fn can_transition_to(self, next: ShiftStatus) -> bool {
        match (self, next) {
            (ShiftStatus::Open, ShiftStatus::Submitted)
            | (ShiftStatus::Open, ShiftStatus::Approved)
            | (ShiftStatus::Submitted, ShiftStatus::Approved) => true,
            (current, next) => current == next && current != ShiftStatus::Approved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftStatus::Open => "open",
            ShiftStatus::Submitted => "submitted",
            ShiftStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub material_id: Uuid,
    #[schema(example = "3")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: Uuid,
    #[schema(example = "Turnare fundație")]
    pub label: String,
    #[serde(default)]
    pub done: bool,
}

// ---
// Shift (Raport de lucru): o obra, um dia.
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub job_id: Uuid,
    // Cópia do título no momento da criação, não acompanha renomeações.
    #[schema(example = "Site A")]
    pub job_title: String,
    pub date: DateTime<Utc>,
    pub status: ShiftStatus,
    #[schema(example = 40)]
    pub progress: i32,
    #[serde(default)]
    pub assigned_employee_ids: Vec<Uuid>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub employee_hours: BTreeMap<Uuid, Decimal>,
    #[serde(default)]
    pub material_usage: Vec<MaterialUsage>,
    #[serde(default)]
    pub task_checklist: Vec<TaskItem>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_by_name: Option<String>,
}

// Payload de criação
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
    pub job_id: Uuid,
    // Se ausente, o serviço copia o título da obra.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_checklist: Vec<TaskItem>,
}

impl NewShift {
    pub fn for_job(job: &Job) -> Self {
        Self {
            job_id: job.id,
            job_title: Some(job.title.clone()),
            date: None,
            notes: None,
            task_checklist: Vec::new(),
        }
    }

    pub fn check(&self) -> Result<(), AppError> {
        for task in &self.task_checklist {
            ensure_not_blank("taskChecklist", &task.label)?;
        }
        Ok(())
    }

    /// Monta o turno aberto, vazio, com 0% de progresso.
    pub fn into_shift(self, tenant_id: TenantId, created_by: Uuid, now: DateTime<Utc>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            tenant_id,
            job_id: self.job_id,
            job_title: self.job_title.unwrap_or_else(|| UNKNOWN_JOB_TITLE.to_string()),
            date: self.date.unwrap_or(now),
            status: ShiftStatus::Open,
            progress: 0,
            assigned_employee_ids: Vec::new(),
            employee_hours: BTreeMap::new(),
            material_usage: Vec::new(),
            task_checklist: self.task_checklist,
            notes: self.notes.unwrap_or_default(),
            created_at: now,
            created_by,
            approved_at: None,
            approved_by: None,
            approved_by_name: None,
        }
    }
}

// ---
// ShiftPatch: a "mutação" de um turno. Toda transição devolve um patch, que é
// aplicado localmente (otimista) e enviado ao store.
// ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShiftStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_employee_ids: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub employee_hours: Option<BTreeMap<Uuid, Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_usage: Option<Vec<MaterialUsage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_checklist: Option<Vec<TaskItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
}

impl ShiftPatch {
    /// Único patch aceito num turno aprovado: reagendar no calendário.
    pub fn is_date_only(&self) -> bool {
        self.date.is_some() && self == &ShiftPatch { date: self.date, ..Default::default() }
    }

    /// Campos que só o fluxo de aprovação pode escrever.
    pub fn touches_approval(&self) -> bool {
        self.status == Some(ShiftStatus::Approved)
            || self.approved_at.is_some()
            || self.approved_by.is_some()
            || self.approved_by_name.is_some()
    }

    pub fn check(&self) -> Result<(), AppError> {
        if let Some(hours) = &self.employee_hours {
            for value in hours.values() {
                ensure_non_negative("employeeHours", Some(*value))?;
            }
        }
        if let Some(usage) = &self.material_usage {
            for entry in usage {
                ensure_positive("materialUsage", entry.quantity)?;
            }
        }
        if let Some(tasks) = &self.task_checklist {
            for task in tasks {
                ensure_not_blank("taskChecklist", &task.label)?;
            }
        }
        Ok(())
    }

    /// Aplica o patch respeitando a trava de aprovação e as transições válidas.
    /// Nada é alterado se o patch for rejeitado.
    pub fn apply_to(self, shift: &mut Shift) -> Result<(), AppError> {
        if shift.status == ShiftStatus::Approved && !self.is_date_only() {
            return Err(AppError::ShiftLocked);
        }
        if let Some(next) = self.status {
            if !shift.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition { from: shift.status, to: next });
            }
        }
        self.check()?;
        let usage = self.material_usage.map(merge_usage).transpose()?;

        if let Some(date) = self.date {
            shift.date = date;
        }
        if let Some(progress) = self.progress {
            shift.progress = progress.clamp(0, 100);
        }
        if let Some(ids) = self.assigned_employee_ids {
            shift.assigned_employee_ids = dedup_ids(ids);
        }
        if let Some(hours) = self.employee_hours {
            shift.employee_hours = hours;
        }
        if let Some(usage) = usage {
            shift.material_usage = usage;
        }
        if let Some(tasks) = self.task_checklist {
            shift.task_checklist = tasks;
        }
        if let Some(notes) = self.notes {
            shift.notes = notes;
        }
        if let Some(status) = self.status {
            shift.status = status;
            if status == ShiftStatus::Approved {
                shift.approved_at = Some(self.approved_at.unwrap_or_else(Utc::now));
                shift.approved_by = self.approved_by;
                shift.approved_by_name = self.approved_by_name;
            }
        }
        Ok(())
    }
}

fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

// O mesmo material nunca aparece duas vezes: as quantidades são somadas.
fn merge_usage(usage: Vec<MaterialUsage>) -> Result<Vec<MaterialUsage>, AppError> {
    let mut merged: Vec<MaterialUsage> = Vec::with_capacity(usage.len());
    for entry in usage {
        match merged.iter_mut().find(|m| m.material_id == entry.material_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or_else(|| field_error("quantity", "out_of_range"))?;
            }
            None => merged.push(entry),
        }
    }
    Ok(merged)
}

// =============================================================================
//  TRANSIÇÕES
// =============================================================================

impl Shift {
    pub fn is_approved(&self) -> bool {
        self.status == ShiftStatus::Approved
    }

    fn ensure_editable(&self) -> Result<(), AppError> {
        if self.is_approved() {
            return Err(AppError::ShiftLocked);
        }
        Ok(())
    }

    /// Toggle estrito: aloca com 8h se ausente, remove (e apaga as horas) se presente.
    pub fn toggle_employee(&self, employee_id: Uuid) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;

        let mut ids = self.assigned_employee_ids.clone();
        let mut hours = self.employee_hours.clone();

        if let Some(pos) = ids.iter().position(|id| *id == employee_id) {
            ids.remove(pos);
            hours.remove(&employee_id);
        } else {
            ids.push(employee_id);
            hours.insert(employee_id, Decimal::from(DEFAULT_SHIFT_HOURS));
        }

        Ok(ShiftPatch {
            assigned_employee_ids: Some(ids),
            employee_hours: Some(hours),
            ..Default::default()
        })
    }

    pub fn set_hours(&self, employee_id: Uuid, hours: Decimal) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        if !self.assigned_employee_ids.contains(&employee_id) {
            return Err(AppError::EmployeeNotAssigned(employee_id));
        }
        ensure_non_negative("hours", Some(hours))?;

        let mut map = self.employee_hours.clone();
        map.insert(employee_id, hours);
        Ok(ShiftPatch { employee_hours: Some(map), ..Default::default() })
    }

    pub fn record_material_usage(&self, material_id: Uuid, quantity: Decimal) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        ensure_positive("quantity", quantity)?;

        let mut usage = self.material_usage.clone();
        usage.push(MaterialUsage { material_id, quantity });
        Ok(ShiftPatch { material_usage: Some(merge_usage(usage)?), ..Default::default() })
    }

    pub fn remove_material_usage(&self, index: usize) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        if index >= self.material_usage.len() {
            return Err(field_error("index", "out_of_range"));
        }

        let mut usage = self.material_usage.clone();
        usage.remove(index);
        Ok(ShiftPatch { material_usage: Some(usage), ..Default::default() })
    }

    pub fn set_progress(&self, value: i32) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        Ok(ShiftPatch { progress: Some(value.clamp(0, 100)), ..Default::default() })
    }

    pub fn set_notes(&self, text: impl Into<String>) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        Ok(ShiftPatch { notes: Some(text.into()), ..Default::default() })
    }

    pub fn set_checklist(&self, tasks: Vec<TaskItem>) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        for task in &tasks {
            ensure_not_blank("label", &task.label)?;
        }
        Ok(ShiftPatch { task_checklist: Some(tasks), ..Default::default() })
    }

    pub fn toggle_task(&self, task_id: Uuid) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;

        let mut tasks = self.task_checklist.clone();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(AppError::RecordNotFound)?;
        task.done = !task.done;
        Ok(ShiftPatch { task_checklist: Some(tasks), ..Default::default() })
    }

    /// Reagenda mantendo a hora do dia. Permitido em qualquer estado.
    pub fn move_date(&self, new_date: NaiveDate) -> ShiftPatch {
        ShiftPatch {
            date: Some(new_date.and_time(self.date.time()).and_utc()),
            ..Default::default()
        }
    }

    pub fn submit(&self) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        if !self.status.can_transition_to(ShiftStatus::Submitted) || self.status == ShiftStatus::Submitted {
            return Err(AppError::InvalidTransition { from: self.status, to: ShiftStatus::Submitted });
        }
        Ok(ShiftPatch { status: Some(ShiftStatus::Submitted), ..Default::default() })
    }

    /// Transição terminal.
    pub fn approve(&self, approver_id: Uuid, approver_name: &str, at: DateTime<Utc>) -> Result<ShiftPatch, AppError> {
        self.ensure_editable()?;
        ensure_not_blank("approvedByName", approver_name)?;

        Ok(ShiftPatch {
            status: Some(ShiftStatus::Approved),
            approved_at: Some(at),
            approved_by: Some(approver_id),
            approved_by_name: Some(approver_name.trim().to_string()),
            ..Default::default()
        })
    }

    /// Cópia "limpa" para outro dia: mesma obra, tudo o resto zerado.
    pub fn duplicate_onto(&self, date: NaiveDate, created_by: Uuid, now: DateTime<Utc>) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id.clone(),
            job_id: self.job_id,
            job_title: self.job_title.clone(),
            date: date.and_time(self.date.time()).and_utc(),
            status: ShiftStatus::Open,
            progress: 0,
            assigned_employee_ids: Vec::new(),
            employee_hours: BTreeMap::new(),
            material_usage: Vec::new(),
            task_checklist: Vec::new(),
            notes: String::new(),
            created_at: now,
            created_by,
            approved_at: None,
            approved_by: None,
            approved_by_name: None,
        }
    }

    /// Atalho para testes e para o cache: aplica uma transição no próprio turno.
    pub fn apply(&mut self, patch: ShiftPatch) -> Result<(), AppError> {
        patch.apply_to(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_shift() -> Shift {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 7, 30, 0).unwrap();
        NewShift {
            job_id: Uuid::new_v4(),
            job_title: Some("Site A".into()),
            date: None,
            notes: None,
            task_checklist: Vec::new(),
        }
        .into_shift(TenantId::new("t1").unwrap(), Uuid::new_v4(), now)
    }

    #[test]
    fn new_shift_starts_open_and_empty() {
        let shift = open_shift();
        assert_eq!(shift.status, ShiftStatus::Open);
        assert_eq!(shift.progress, 0);
        assert!(shift.assigned_employee_ids.is_empty());
        assert!(shift.material_usage.is_empty());
        assert_eq!(shift.notes, "");
    }

    #[test]
    fn toggling_twice_restores_the_assignment() {
        let mut shift = open_shift();
        let bob = Uuid::new_v4();

        let patch = shift.toggle_employee(bob).unwrap();
        shift.apply(patch).unwrap();
        assert_eq!(shift.assigned_employee_ids, vec![bob]);
        assert_eq!(shift.employee_hours[&bob], Decimal::from(8));

        let patch = shift.toggle_employee(bob).unwrap();
        shift.apply(patch).unwrap();
        assert!(shift.assigned_employee_ids.is_empty());
        assert!(!shift.employee_hours.contains_key(&bob));
    }

    #[test]
    fn hours_require_assignment_and_reject_negatives() {
        let mut shift = open_shift();
        let bob = Uuid::new_v4();
        assert!(matches!(
            shift.set_hours(bob, Decimal::from(6)),
            Err(AppError::EmployeeNotAssigned(id)) if id == bob
        ));

        let patch = shift.toggle_employee(bob).unwrap();
        shift.apply(patch).unwrap();
        assert!(matches!(shift.set_hours(bob, Decimal::from(-1)), Err(AppError::ValidationError(_))));

        let patch = shift.set_hours(bob, Decimal::from(6)).unwrap();
        shift.apply(patch).unwrap();
        assert_eq!(shift.employee_hours[&bob], Decimal::from(6));
    }

    #[test]
    fn material_usage_is_merged_by_material() {
        let mut shift = open_shift();
        let cement = Uuid::new_v4();

        let patch = shift.record_material_usage(cement, Decimal::from(3)).unwrap();
        shift.apply(patch).unwrap();
        let patch = shift.record_material_usage(cement, Decimal::from(2)).unwrap();
        shift.apply(patch).unwrap();

        assert_eq!(shift.material_usage, vec![MaterialUsage { material_id: cement, quantity: Decimal::from(5) }]);
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let shift = open_shift();
        assert!(shift.record_material_usage(Uuid::new_v4(), Decimal::ZERO).is_err());
        assert!(shift.record_material_usage(Uuid::new_v4(), Decimal::from(-2)).is_err());
    }

    #[test]
    fn merged_quantities_that_overflow_are_rejected() {
        let mut shift = open_shift();
        let cement = Uuid::new_v4();
        let huge = Decimal::from_i128_with_scale(60_000_000_000_000_000_000_000_000_000, 0);

        let patch = shift.record_material_usage(cement, huge).unwrap();
        shift.apply(patch).unwrap();

        let err = shift.record_material_usage(cement, huge).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // Patch bruto com duas entradas do mesmo material: nada muda.
        let raw = ShiftPatch {
            material_usage: Some(vec![
                MaterialUsage { material_id: cement, quantity: huge },
                MaterialUsage { material_id: cement, quantity: huge },
            ]),
            progress: Some(40),
            ..Default::default()
        };
        assert!(shift.apply(raw).is_err());
        assert_eq!(shift.progress, 0);
        assert_eq!(shift.material_usage[0].quantity, huge);
    }

    #[test]
    fn removing_usage_by_index() {
        let mut shift = open_shift();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        for (id, qty) in [(a, 1), (b, 2)] {
            let patch = shift.record_material_usage(id, Decimal::from(qty)).unwrap();
            shift.apply(patch).unwrap();
        }

        assert!(shift.remove_material_usage(5).is_err());
        let patch = shift.remove_material_usage(0).unwrap();
        shift.apply(patch).unwrap();
        assert_eq!(shift.material_usage.len(), 1);
        assert_eq!(shift.material_usage[0].material_id, b);
    }

    #[test]
    fn progress_is_clamped() {
        let shift = open_shift();
        assert_eq!(shift.set_progress(150).unwrap().progress, Some(100));
        assert_eq!(shift.set_progress(-3).unwrap().progress, Some(0));
        assert_eq!(shift.set_progress(35).unwrap().progress, Some(35));
    }

    #[test]
    fn approval_locks_every_edit_but_rescheduling() {
        let mut shift = open_shift();
        let approver = Uuid::new_v4();
        let at = Utc::now();
        let patch = shift.approve(approver, "Alice", at).unwrap();
        shift.apply(patch).unwrap();

        assert_eq!(shift.status, ShiftStatus::Approved);
        assert_eq!(shift.approved_by_name.as_deref(), Some("Alice"));
        assert_eq!(shift.approved_by, Some(approver));
        assert_eq!(shift.approved_at, Some(at));

        assert!(matches!(shift.set_progress(50), Err(AppError::ShiftLocked)));
        assert!(matches!(shift.toggle_employee(Uuid::new_v4()), Err(AppError::ShiftLocked)));
        assert!(matches!(shift.record_material_usage(Uuid::new_v4(), Decimal::ONE), Err(AppError::ShiftLocked)));
        assert!(matches!(shift.set_notes("late edit"), Err(AppError::ShiftLocked)));
        assert!(matches!(shift.approve(approver, "Alice", at), Err(AppError::ShiftLocked)));

        // Patches genéricos também são barrados
        let sneaky = ShiftPatch { progress: Some(90), ..Default::default() };
        assert!(matches!(sneaky.apply_to(&mut shift), Err(AppError::ShiftLocked)));
        assert_eq!(shift.progress, 0);
        assert_eq!(shift.status, ShiftStatus::Approved);

        let moved = shift.move_date(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        shift.apply(moved).unwrap();
        assert_eq!(shift.date.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
    }

    #[test]
    fn both_approval_paths_are_supported() {
        let shift = open_shift();
        assert!(shift.approve(Uuid::new_v4(), "Alice", Utc::now()).is_ok());

        let mut submitted = open_shift();
        let patch = submitted.submit().unwrap();
        submitted.apply(patch).unwrap();
        assert_eq!(submitted.status, ShiftStatus::Submitted);
        assert!(submitted.submit().is_err());

        let patch = submitted.approve(Uuid::new_v4(), "Alice", Utc::now()).unwrap();
        submitted.apply(patch).unwrap();
        assert!(submitted.is_approved());
    }

    #[test]
    fn status_transitions_never_leave_approved() {
        assert!(!ShiftStatus::Approved.can_transition_to(ShiftStatus::Open));
        assert!(!ShiftStatus::Submitted.can_transition_to(ShiftStatus::Open));
        assert!(ShiftStatus::Open.can_transition_to(ShiftStatus::Open));
    }

    #[test]
    fn move_date_keeps_time_of_day() {
        let shift = open_shift();
        let patch = shift.move_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        let date = patch.date.unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2026, 4, 1, 7, 30, 0).unwrap());
        assert!(patch.is_date_only());
    }

    #[test]
    fn checklist_tasks_toggle() {
        let mut shift = open_shift();
        let task = TaskItem { id: Uuid::new_v4(), label: "Cofraj".into(), done: false };
        let patch = shift.set_checklist(vec![task.clone()]).unwrap();
        shift.apply(patch).unwrap();

        let patch = shift.toggle_task(task.id).unwrap();
        shift.apply(patch).unwrap();
        assert!(shift.task_checklist[0].done);
        assert!(shift.toggle_task(Uuid::new_v4()).is_err());
    }

    #[test]
    fn duplicate_resets_everything_but_the_job() {
        let mut source = open_shift();
        let patch = source.toggle_employee(Uuid::new_v4()).unwrap();
        source.apply(patch).unwrap();
        let patch = source.set_progress(70).unwrap();
        source.apply(patch).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        let copy = source.duplicate_onto(day, Uuid::new_v4(), Utc::now());
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.job_id, source.job_id);
        assert_eq!(copy.job_title, source.job_title);
        assert_eq!(copy.status, ShiftStatus::Open);
        assert_eq!(copy.progress, 0);
        assert!(copy.assigned_employee_ids.is_empty());
        assert!(copy.employee_hours.is_empty());
        assert_eq!(copy.date.date_naive(), day);
    }
}
