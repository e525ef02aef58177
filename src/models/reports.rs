// src/models/reports.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::shift::ShiftStatus;

// Custo de um turno, dividido entre mão de obra e material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCostBreakdown {
    pub shift_id: Uuid,
    #[schema(example = "200.00")]
    pub labor: Decimal,
    #[schema(example = "30.00")]
    pub material: Decimal,
    #[schema(example = "230.00")]
    pub total: Decimal,
}

// Linha da lista de relatórios (mais recente primeiro).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReportEntry {
    pub shift_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub date: DateTime<Utc>,
    pub status: ShiftStatus,
    pub progress: i32,
    pub employee_count: usize,
    pub total_hours: Decimal,
    pub cost: ShiftCostBreakdown,
}

// Agregado por obra: custo real x estimado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCostSummary {
    pub job_id: Uuid,
    pub job_title: String,
    pub shift_count: usize,
    pub labor: Decimal,
    pub material: Decimal,
    pub actual: Decimal,
    pub estimate: Decimal,
    // actual - estimate (positivo = estourou o orçamento)
    pub variance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub shift_id: Uuid,
    pub date: DateTime<Utc>,
    pub job_title: String,
    pub hours: Decimal,
}

// Pontaj: uma linha por funcionário no mês, inclusive quem não trabalhou.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetRow {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub total_hours: Decimal,
    // Turnos com lançamento de horas (dois turnos no mesmo dia contam dois).
    pub worked_days: usize,
    pub entries: usize,
    pub avg_hours: Decimal,
    pub shifts: Vec<TimesheetEntry>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimesheetQuery {
    /// Mês no formato YYYY-MM
    #[param(example = "2026-03")]
    pub month: String,
}
