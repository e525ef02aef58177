// src/models/workforce.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    error::AppError,
    validation::{ensure_non_negative, ensure_not_blank, not_blank},
};

// ---
// 1. Tenant (a "conta" / organização)
// ---
// Identificador opaco. Vem sempre da sessão, nunca do corpo da requisição.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::MissingTenant);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---
// 2. Employee (Angajat)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: TenantId,
    #[schema(example = "Bob Popescu")]
    pub name: String,
    #[schema(example = "+40 722 000 000")]
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[schema(example = "20.00")]
    pub hourly_rate: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Bob Popescu")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
}

impl NewEmployee {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        ensure_non_negative("hourlyRate", self.hourly_rate)
    }

    pub fn into_employee(self, tenant_id: TenantId) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id,
            name: self.name.trim().to_string(),
            phone: self.phone,
            hire_date: self.hire_date,
            hourly_rate: self.hourly_rate.unwrap_or(Decimal::ZERO),
            created_at: Utc::now(),
        }
    }
}

// Sem `id` nem `tenantId`: se vierem no payload, o serde simplesmente ignora.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
}

impl EmployeePatch {
    pub fn check(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            ensure_not_blank("name", name)?;
        }
        ensure_non_negative("hourlyRate", self.hourly_rate)
    }

    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            employee.phone = Some(phone);
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = Some(hire_date);
        }
        if let Some(rate) = self.hourly_rate {
            employee.hourly_rate = rate;
        }
    }
}

// ---
// 3. Job (Lucrare / obra)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub tenant_id: TenantId,
    #[schema(example = "Site A")]
    pub title: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub estimated_labor_cost: Option<Decimal>,
    pub estimated_material_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Site A")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_labor_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_material_cost: Option<Decimal>,
}

impl NewJob {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        ensure_non_negative("estimatedLaborCost", self.estimated_labor_cost)?;
        ensure_non_negative("estimatedMaterialCost", self.estimated_material_cost)
    }

    pub fn into_job(self, tenant_id: TenantId) -> Job {
        Job {
            id: Uuid::new_v4(),
            tenant_id,
            title: self.title.trim().to_string(),
            location: self.location,
            manager: self.manager,
            start_date: self.start_date,
            estimated_labor_cost: self.estimated_labor_cost,
            estimated_material_cost: self.estimated_material_cost,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_labor_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_material_cost: Option<Decimal>,
}

impl JobPatch {
    pub fn check(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            ensure_not_blank("title", title)?;
        }
        ensure_non_negative("estimatedLaborCost", self.estimated_labor_cost)?;
        ensure_non_negative("estimatedMaterialCost", self.estimated_material_cost)
    }

    // Renomear a obra NÃO atualiza o jobTitle dos turnos já criados.
    pub fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title.trim().to_string();
        }
        if let Some(location) = self.location {
            job.location = Some(location);
        }
        if let Some(manager) = self.manager {
            job.manager = Some(manager);
        }
        if let Some(start_date) = self.start_date {
            job.start_date = Some(start_date);
        }
        if let Some(cost) = self.estimated_labor_cost {
            job.estimated_labor_cost = Some(cost);
        }
        if let Some(cost) = self.estimated_material_cost {
            job.estimated_material_cost = Some(cost);
        }
    }
}

// ---
// 4. Material
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "material_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaterialUnit {
    #[default]
    Buc,
    Kg,
    M,
    Mp,
    Mc,
    Ml,
    L,
    Sac,
    Palet,
    Cutie,
    Set,
}

impl MaterialUnit {
    pub const ALL: [MaterialUnit; 11] = [
        MaterialUnit::Buc,
        MaterialUnit::Kg,
        MaterialUnit::M,
        MaterialUnit::Mp,
        MaterialUnit::Mc,
        MaterialUnit::Ml,
        MaterialUnit::L,
        MaterialUnit::Sac,
        MaterialUnit::Palet,
        MaterialUnit::Cutie,
        MaterialUnit::Set,
    ];

    /// Rótulo exibido nos formulários.
    pub fn label(self) -> &'static str {
        match self {
            MaterialUnit::Buc => "Bucăți",
            MaterialUnit::Kg => "Kilograme",
            MaterialUnit::M => "Metri",
            MaterialUnit::Mp => "Metri Pătrați",
            MaterialUnit::Mc => "Metri Cubi",
            MaterialUnit::Ml => "Metri Liniari",
            MaterialUnit::L => "Litri",
            MaterialUnit::Sac => "Saci",
            MaterialUnit::Palet => "Paleți",
            MaterialUnit::Cutie => "Cutii",
            MaterialUnit::Set => "Seturi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub tenant_id: TenantId,
    #[schema(example = "Cement")]
    pub name: String,
    pub unit: MaterialUnit,
    #[schema(example = "5.00")]
    pub unit_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Cement")]
    pub name: String,
    #[serde(default)]
    pub unit: MaterialUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
}

impl NewMaterial {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        ensure_non_negative("unitCost", self.unit_cost)
    }

    pub fn into_material(self, tenant_id: TenantId) -> Material {
        Material {
            id: Uuid::new_v4(),
            tenant_id,
            name: self.name.trim().to_string(),
            unit: self.unit,
            unit_cost: self.unit_cost,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<MaterialUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
}

impl MaterialPatch {
    pub fn check(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            ensure_not_blank("name", name)?;
        }
        ensure_non_negative("unitCost", self.unit_cost)
    }

    pub fn apply_to(self, material: &mut Material) {
        if let Some(name) = self.name {
            material.name = name.trim().to_string();
        }
        if let Some(unit) = self.unit {
            material.unit = unit;
        }
        if let Some(cost) = self.unit_cost {
            material.unit_cost = Some(cost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantId {
        TenantId::new("t1").unwrap()
    }

    #[test]
    fn tenant_id_rejects_blank_values() {
        assert!(matches!(TenantId::new("  "), Err(AppError::MissingTenant)));
        assert_eq!(TenantId::new(" app ").unwrap().as_str(), "app");
    }

    #[test]
    fn new_employee_requires_a_name_and_defaults_rate_to_zero() {
        let blank = NewEmployee { name: "  ".into(), phone: None, hire_date: None, hourly_rate: None };
        assert!(matches!(blank.check(), Err(AppError::ValidationError(_))));

        let ok = NewEmployee { name: " Bob ".into(), phone: None, hire_date: None, hourly_rate: None };
        ok.check().unwrap();
        let employee = ok.into_employee(tenant());
        assert_eq!(employee.name, "Bob");
        assert_eq!(employee.hourly_rate, Decimal::ZERO);
    }

    #[test]
    fn negative_rates_and_costs_are_rejected() {
        let employee = NewEmployee {
            name: "Bob".into(),
            phone: None,
            hire_date: None,
            hourly_rate: Some(Decimal::from(-5)),
        };
        assert!(employee.check().is_err());

        let patch = MaterialPatch { unit_cost: Some(Decimal::from(-1)), ..Default::default() };
        assert!(patch.check().is_err());
    }

    #[test]
    fn patch_payload_ignores_identity_fields() {
        let patch: JobPatch = serde_json::from_value(serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "tenantId": "other",
            "title": "Site B"
        }))
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Site B"));
    }

    #[test]
    fn material_units_use_their_short_codes_on_the_wire() {
        assert_eq!(serde_json::to_value(MaterialUnit::Palet).unwrap(), "palet");
        assert_eq!(MaterialUnit::ALL.len(), 11);
        assert_eq!(MaterialUnit::Mp.label(), "Metri Pătrați");
    }
}
