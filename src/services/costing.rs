// src/services/costing.rs
//
// Cálculo de custos: funções puras sobre (turnos, funcionários, materiais).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, validation::field_error},
    models::{
        reports::{JobCostSummary, ShiftCostBreakdown, ShiftReportEntry, TimesheetEntry, TimesheetRow},
        shift::Shift,
        workforce::{Employee, Job, Material},
    },
};

// Valores gigantes passam pela validação (só exige >= 0); o estouro vira erro, não panic.
fn overflow(what: &str) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Estouro de Decimal ao calcular {}", what))
}

fn add(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, AppError> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

fn sum<I>(values: I, what: &str) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Result<Decimal, AppError>>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| add(acc, v?, what))
}

/// Σ horas × valor/hora. Funcionário sumido conta como 0.
pub fn labor_cost(shift: &Shift, employees: &[Employee]) -> Result<Decimal, AppError> {
    let lines = shift.employee_hours.iter().map(|(employee_id, hours)| {
        let rate = employees
            .iter()
            .find(|e| e.id == *employee_id)
            .map(|e| e.hourly_rate)
            .unwrap_or(Decimal::ZERO);
        hours.checked_mul(rate).ok_or_else(|| overflow("mão de obra"))
    });
    sum(lines, "mão de obra")
}

/// Σ quantidade × custo unitário. Material sem custo conta como 0.
pub fn material_cost(shift: &Shift, materials: &[Material]) -> Result<Decimal, AppError> {
    let lines = shift.material_usage.iter().map(|usage| {
        let unit_cost = materials
            .iter()
            .find(|m| m.id == usage.material_id)
            .and_then(|m| m.unit_cost)
            .unwrap_or(Decimal::ZERO);
        usage.quantity.checked_mul(unit_cost).ok_or_else(|| overflow("material"))
    });
    sum(lines, "material")
}

pub fn shift_total(shift: &Shift, employees: &[Employee], materials: &[Material]) -> Result<Decimal, AppError> {
    Ok(shift_cost_breakdown(shift, employees, materials)?.total)
}

pub fn shift_cost_breakdown(
    shift: &Shift,
    employees: &[Employee],
    materials: &[Material],
) -> Result<ShiftCostBreakdown, AppError> {
    let labor = labor_cost(shift, employees)?;
    let material = material_cost(shift, materials)?;
    Ok(ShiftCostBreakdown {
        shift_id: shift.id,
        labor,
        material,
        total: add(labor, material, "total")?,
    })
}

pub fn total_hours(shift: &Shift) -> Result<Decimal, AppError> {
    sum(shift.employee_hours.values().copied().map(Ok), "horas")
}

// --- Por obra ---

pub fn job_cost_summary(
    job: &Job,
    shifts: &[Shift],
    employees: &[Employee],
    materials: &[Material],
) -> Result<JobCostSummary, AppError> {
    let mut labor = Decimal::ZERO;
    let mut material = Decimal::ZERO;
    let mut shift_count = 0;

    for shift in shifts.iter().filter(|s| s.job_id == job.id) {
        labor = add(labor, labor_cost(shift, employees)?, "mão de obra")?;
        material = add(material, material_cost(shift, materials)?, "material")?;
        shift_count += 1;
    }

    let actual = add(labor, material, "custo real")?;
    let estimate = add(
        job.estimated_labor_cost.unwrap_or(Decimal::ZERO),
        job.estimated_material_cost.unwrap_or(Decimal::ZERO),
        "estimativa",
    )?;

    Ok(JobCostSummary {
        job_id: job.id,
        job_title: job.title.clone(),
        shift_count,
        labor,
        material,
        actual,
        estimate,
        variance: actual.checked_sub(estimate).ok_or_else(|| overflow("variação"))?,
    })
}

pub fn job_cost_report(
    jobs: &[Job],
    shifts: &[Shift],
    employees: &[Employee],
    materials: &[Material],
) -> Result<Vec<JobCostSummary>, AppError> {
    jobs.iter()
        .map(|job| job_cost_summary(job, shifts, employees, materials))
        .collect()
}

// --- Lista de relatórios ---

/// Mais recente primeiro.
pub fn shift_reports(
    shifts: &[Shift],
    employees: &[Employee],
    materials: &[Material],
) -> Result<Vec<ShiftReportEntry>, AppError> {
    let mut entries = shifts
        .iter()
        .map(|shift| {
            Ok(ShiftReportEntry {
                shift_id: shift.id,
                job_id: shift.job_id,
                job_title: shift.job_title.clone(),
                date: shift.date,
                status: shift.status,
                progress: shift.progress,
                employee_count: shift.assigned_employee_ids.len(),
                total_hours: total_hours(shift)?,
                cost: shift_cost_breakdown(shift, employees, materials)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

// --- Pontaj mensal ---

/// "2026-03" -> (2026, 3)
pub fn parse_month(raw: &str) -> Result<(i32, u32), AppError> {
    let (year, month) = raw.trim().split_once('-').ok_or_else(|| field_error("month", "out_of_range"))?;
    let year: i32 = year.parse().map_err(|_| field_error("month", "out_of_range"))?;
    let month: u32 = month.parse().map_err(|_| field_error("month", "out_of_range"))?;

    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(field_error("month", "out_of_range"));
    }
    Ok((year, month))
}

/// Uma linha por funcionário, na ordem recebida, mesmo sem horas no mês.
/// Cada turno com lançamento conta como um dia trabalhado e uma entrada.
pub fn monthly_timesheet(
    shifts: &[Shift],
    employees: &[Employee],
    year: i32,
    month: u32,
) -> Result<Vec<TimesheetRow>, AppError> {
    let in_month: Vec<&Shift> = shifts
        .iter()
        .filter(|s| s.date.year() == year && s.date.month() == month)
        .collect();

    employees
        .iter()
        .map(|employee| {
            let mut details: Vec<TimesheetEntry> = in_month
                .iter()
                .filter_map(|shift| {
                    shift.employee_hours.get(&employee.id).map(|hours| TimesheetEntry {
                        shift_id: shift.id,
                        date: shift.date,
                        job_title: shift.job_title.clone(),
                        hours: *hours,
                    })
                })
                .collect();
            details.sort_by_key(|e| e.date);

            let total_hours = sum(details.iter().map(|e| Ok(e.hours)), "pontaj")?;
            let worked_days = details.len();
            let avg_hours = if worked_days == 0 {
                Decimal::ZERO
            } else {
                (total_hours / Decimal::from(worked_days as u64)).round_dp(2)
            };

            Ok(TimesheetRow {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                total_hours,
                worked_days,
                entries: details.len(),
                avg_hours,
                shifts: details,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        shift::{MaterialUsage, NewShift},
        workforce::{MaterialUnit, TenantId},
    };
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn tenant() -> TenantId {
        TenantId::new("t1").unwrap()
    }

    fn employee(name: &str, rate: i64) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id: tenant(),
            name: name.into(),
            phone: None,
            hire_date: None,
            hourly_rate: Decimal::from(rate),
            created_at: Utc::now(),
        }
    }

    fn material(cost: Option<i64>) -> Material {
        Material {
            id: Uuid::new_v4(),
            tenant_id: tenant(),
            name: "Cement".into(),
            unit: MaterialUnit::Sac,
            unit_cost: cost.map(Decimal::from),
            created_at: Utc::now(),
        }
    }

    fn job(labor: Option<i64>, material: Option<i64>) -> Job {
        Job {
            id: Uuid::new_v4(),
            tenant_id: tenant(),
            title: "Site A".into(),
            location: None,
            manager: None,
            start_date: None,
            estimated_labor_cost: labor.map(Decimal::from),
            estimated_material_cost: material.map(Decimal::from),
            created_at: Utc::now(),
        }
    }

    fn shift_for(job: &Job, day: u32) -> Shift {
        NewShift::for_job(job).into_shift(
            tenant(),
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn shift_costs_match_the_reference_example() {
        let (e1, e2) = (employee("E1", 20), employee("E2", 15));
        let m1 = material(Some(10));
        let site = job(None, None);

        let mut shift = shift_for(&site, 10);
        shift.employee_hours.insert(e1.id, Decimal::from(4));
        shift.employee_hours.insert(e2.id, Decimal::from(8));
        shift.material_usage.push(MaterialUsage { material_id: m1.id, quantity: Decimal::from(3) });

        let employees = vec![e1, e2];
        let materials = vec![m1];
        assert_eq!(labor_cost(&shift, &employees).unwrap(), Decimal::from(200));
        assert_eq!(material_cost(&shift, &materials).unwrap(), Decimal::from(30));
        assert_eq!(shift_total(&shift, &employees, &materials).unwrap(), Decimal::from(230));
    }

    #[test]
    fn missing_employees_and_costs_count_as_zero() {
        let site = job(None, None);
        let no_cost = material(None);
        let mut shift = shift_for(&site, 10);
        shift.employee_hours.insert(Uuid::new_v4(), Decimal::from(8));
        shift.material_usage.push(MaterialUsage { material_id: no_cost.id, quantity: Decimal::from(2) });

        assert_eq!(shift_total(&shift, &[], &[no_cost]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn job_summary_compares_actual_with_estimate() {
        let bob = employee("Bob", 10);
        let site = job(Some(100), None);
        let other = job(None, None);

        let mut a = shift_for(&site, 1);
        a.employee_hours.insert(bob.id, Decimal::from(8));
        let mut b = shift_for(&site, 2);
        b.employee_hours.insert(bob.id, Decimal::from(4));
        let mut elsewhere = shift_for(&other, 2);
        elsewhere.employee_hours.insert(bob.id, Decimal::from(8));

        let summary = job_cost_summary(&site, &[a, b, elsewhere], &[bob], &[]).unwrap();
        assert_eq!(summary.shift_count, 2);
        assert_eq!(summary.actual, Decimal::from(120));
        assert_eq!(summary.estimate, Decimal::from(100));
        assert_eq!(summary.variance, Decimal::from(20));
    }

    #[test]
    fn reports_are_listed_newest_first() {
        let site = job(None, None);
        let shifts = vec![shift_for(&site, 3), shift_for(&site, 9), shift_for(&site, 5)];
        let days: Vec<u32> = shift_reports(&shifts, &[], &[]).unwrap().iter().map(|r| r.date.day()).collect();
        assert_eq!(days, vec![9, 5, 3]);
    }

    #[test]
    fn timesheet_counts_every_shift_and_lists_idle_employees() {
        let bob = employee("Bob", 10);
        let ana = employee("Ana", 12);
        let site = job(None, None);

        // Dois turnos no mesmo dia contam como dois dias trabalhados.
        let mut morning = shift_for(&site, 2);
        morning.employee_hours.insert(bob.id, Decimal::from(8));
        let mut evening = shift_for(&site, 2);
        evening.employee_hours.insert(bob.id, Decimal::from(4));
        let mut d3 = shift_for(&site, 3);
        d3.employee_hours.insert(bob.id, Decimal::from(5));
        let mut april = shift_for(&site, 3);
        april.date = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        april.employee_hours.insert(bob.id, Decimal::from(8));

        let rows = monthly_timesheet(&[morning, evening, d3, april], &[bob, ana], 2026, 3).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].employee_name, "Bob");
        assert_eq!(rows[0].total_hours, Decimal::from(17));
        assert_eq!(rows[0].worked_days, 3);
        assert_eq!(rows[0].entries, 3);
        assert_eq!(rows[0].avg_hours, Decimal::new(567, 2));
        assert_eq!(rows[0].shifts.len(), 3);

        assert_eq!(rows[1].employee_name, "Ana");
        assert_eq!(rows[1].total_hours, Decimal::ZERO);
        assert_eq!(rows[1].worked_days, 0);
        assert_eq!(rows[1].entries, 0);
        assert_eq!(rows[1].avg_hours, Decimal::ZERO);
    }

    #[test]
    fn overflowing_costs_are_errors_not_panics() {
        let huge = Decimal::from_i128_with_scale(10_000_000_000_000_000_000_000_000_000, 0);
        let mut rich = employee("Rich", 0);
        rich.hourly_rate = huge;
        let mut gold = material(None);
        gold.unit_cost = Some(huge);
        let site = job(None, None);

        let mut shift = shift_for(&site, 10);
        shift.employee_hours.insert(rich.id, Decimal::from(8));
        assert!(matches!(labor_cost(&shift, std::slice::from_ref(&rich)), Err(AppError::InternalServerError(_))));

        shift.employee_hours.clear();
        shift.material_usage.push(MaterialUsage { material_id: gold.id, quantity: Decimal::from(9) });
        assert!(material_cost(&shift, std::slice::from_ref(&gold)).is_err());
        assert!(shift_reports(std::slice::from_ref(&shift), &[], std::slice::from_ref(&gold)).is_err());
        assert!(job_cost_summary(&site, &[shift], &[], &[gold]).is_err());
    }

    #[test]
    fn month_parameter_is_validated() {
        assert_eq!(parse_month("2026-03").unwrap(), (2026, 3));
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("march").is_err());
    }
}
