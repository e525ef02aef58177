// src/models/record.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        shift::{NewShift, Shift, ShiftPatch},
        workforce::{
            Employee, EmployeePatch, Job, JobPatch, Material, MaterialPatch, NewEmployee, NewJob,
            NewMaterial, TenantId,
        },
    },
};

// ---
// As quatro "tabelas" do store. O nome vem na URL (/api/{table}).
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Employees,
    Jobs,
    Materials,
    Shifts,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Employees,
        RecordKind::Jobs,
        RecordKind::Materials,
        RecordKind::Shifts,
    ];

    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Employees => "employees",
            RecordKind::Jobs => "jobs",
            RecordKind::Materials => "materials",
            RecordKind::Shifts => "shifts",
        }
    }
}

impl FromStr for RecordKind {
    type Err = AppError;

    fn from_str(table: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.table() == table)
            .ok_or_else(|| AppError::UnknownTable(table.to_string()))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

// ---
// Record: um registro já persistido, de qualquer tabela.
// ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Employee(Employee),
    Job(Job),
    Material(Material),
    Shift(Shift),
}

impl Record {
    pub fn from_json(kind: RecordKind, value: Value) -> Result<Self, AppError> {
        Ok(match kind {
            RecordKind::Employees => Record::Employee(decode(value)?),
            RecordKind::Jobs => Record::Job(decode(value)?),
            RecordKind::Materials => Record::Material(decode(value)?),
            RecordKind::Shifts => Record::Shift(decode(value)?),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Employee(_) => RecordKind::Employees,
            Record::Job(_) => RecordKind::Jobs,
            Record::Material(_) => RecordKind::Materials,
            Record::Shift(_) => RecordKind::Shifts,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Record::Employee(r) => r.id,
            Record::Job(r) => r.id,
            Record::Material(r) => r.id,
            Record::Shift(r) => r.id,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        match self {
            Record::Employee(r) => &r.tenant_id,
            Record::Job(r) => &r.tenant_id,
            Record::Material(r) => &r.tenant_id,
            Record::Shift(r) => &r.tenant_id,
        }
    }

    /// O tenant vem sempre da sessão; qualquer valor anterior é sobrescrito.
    pub fn stamp_tenant(&mut self, tenant_id: &TenantId) {
        let slot = match self {
            Record::Employee(r) => &mut r.tenant_id,
            Record::Job(r) => &mut r.tenant_id,
            Record::Material(r) => &mut r.tenant_id,
            Record::Shift(r) => &mut r.tenant_id,
        };
        *slot = tenant_id.clone();
    }

    pub fn into_shift(self) -> Result<Shift, AppError> {
        match self {
            Record::Shift(shift) => Ok(shift),
            _ => Err(AppError::RecordNotFound),
        }
    }

    pub fn into_job(self) -> Result<Job, AppError> {
        match self {
            Record::Job(job) => Ok(job),
            _ => Err(AppError::RecordNotFound),
        }
    }
}

// ---
// RecordDraft: o que o cliente manda no POST. Id e tenant são gerados aqui.
// ---
#[derive(Debug, Clone)]
pub enum RecordDraft {
    Employee(NewEmployee),
    Job(NewJob),
    Material(NewMaterial),
    Shift(NewShift),
}

impl RecordDraft {
    pub fn from_json(kind: RecordKind, value: Value) -> Result<Self, AppError> {
        Ok(match kind {
            RecordKind::Employees => RecordDraft::Employee(decode(value)?),
            RecordKind::Jobs => RecordDraft::Job(decode(value)?),
            RecordKind::Materials => RecordDraft::Material(decode(value)?),
            RecordKind::Shifts => RecordDraft::Shift(decode(value)?),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordDraft::Employee(_) => RecordKind::Employees,
            RecordDraft::Job(_) => RecordKind::Jobs,
            RecordDraft::Material(_) => RecordKind::Materials,
            RecordDraft::Shift(_) => RecordKind::Shifts,
        }
    }

    pub fn check(&self) -> Result<(), AppError> {
        match self {
            RecordDraft::Employee(d) => d.check(),
            RecordDraft::Job(d) => d.check(),
            RecordDraft::Material(d) => d.check(),
            RecordDraft::Shift(d) => d.check(),
        }
    }

    pub fn to_json(&self) -> Result<Value, AppError> {
        let value = match self {
            RecordDraft::Employee(d) => serde_json::to_value(d),
            RecordDraft::Job(d) => serde_json::to_value(d),
            RecordDraft::Material(d) => serde_json::to_value(d),
            RecordDraft::Shift(d) => serde_json::to_value(d),
        };
        value.map_err(|e| AppError::InternalServerError(e.into()))
    }

    /// Materializa o registro para o tenant da sessão.
    pub fn into_record(self, tenant_id: TenantId, created_by: Uuid) -> Record {
        match self {
            RecordDraft::Employee(d) => Record::Employee(d.into_employee(tenant_id)),
            RecordDraft::Job(d) => Record::Job(d.into_job(tenant_id)),
            RecordDraft::Material(d) => Record::Material(d.into_material(tenant_id)),
            RecordDraft::Shift(d) => Record::Shift(d.into_shift(tenant_id, created_by, chrono::Utc::now())),
        }
    }
}

// ---
// RecordPatch: atualização parcial (PATCH /api/{table}/{id}).
// ---
#[derive(Debug, Clone)]
pub enum RecordPatch {
    Employee(EmployeePatch),
    Job(JobPatch),
    Material(MaterialPatch),
    Shift(ShiftPatch),
}

impl RecordPatch {
    pub fn from_json(kind: RecordKind, value: Value) -> Result<Self, AppError> {
        Ok(match kind {
            RecordKind::Employees => RecordPatch::Employee(decode(value)?),
            RecordKind::Jobs => RecordPatch::Job(decode(value)?),
            RecordKind::Materials => RecordPatch::Material(decode(value)?),
            RecordKind::Shifts => RecordPatch::Shift(decode(value)?),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordPatch::Employee(_) => RecordKind::Employees,
            RecordPatch::Job(_) => RecordKind::Jobs,
            RecordPatch::Material(_) => RecordKind::Materials,
            RecordPatch::Shift(_) => RecordKind::Shifts,
        }
    }

    pub fn check(&self) -> Result<(), AppError> {
        match self {
            RecordPatch::Employee(p) => p.check(),
            RecordPatch::Job(p) => p.check(),
            RecordPatch::Material(p) => p.check(),
            RecordPatch::Shift(p) => p.check(),
        }
    }

    pub fn to_json(&self) -> Result<Value, AppError> {
        let value = match self {
            RecordPatch::Employee(p) => serde_json::to_value(p),
            RecordPatch::Job(p) => serde_json::to_value(p),
            RecordPatch::Material(p) => serde_json::to_value(p),
            RecordPatch::Shift(p) => serde_json::to_value(p),
        };
        value.map_err(|e| AppError::InternalServerError(e.into()))
    }

    /// Aplica o patch no registro correspondente. Tabela trocada conta como "não encontrado".
    pub fn apply_to(self, record: &mut Record) -> Result<(), AppError> {
        match (self, record) {
            (RecordPatch::Employee(p), Record::Employee(r)) => {
                p.apply_to(r);
                Ok(())
            }
            (RecordPatch::Job(p), Record::Job(r)) => {
                p.apply_to(r);
                Ok(())
            }
            (RecordPatch::Material(p), Record::Material(r)) => {
                p.apply_to(r);
                Ok(())
            }
            (RecordPatch::Shift(p), Record::Shift(r)) => p.apply_to(r),
            _ => Err(AppError::RecordNotFound),
        }
    }
}

impl From<ShiftPatch> for RecordPatch {
    fn from(patch: ShiftPatch) -> Self {
        RecordPatch::Shift(patch)
    }
}
