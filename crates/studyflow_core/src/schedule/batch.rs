//! Study-wide scheduling with per-module failure isolation.

use crate::config::RecurrenceLimits;
use crate::model::study::ModuleHeader;
use crate::schedule::occurrence::{schedule_module, Occurrence};
use crate::schedule::ScheduleError;
use log::{info, warn};

/// One module whose alert could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    pub module_id: String,
    pub error: ScheduleError,
}

/// Merged occurrences of every schedulable module plus the failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub occurrences: Vec<Occurrence>,
    pub failures: Vec<ModuleFailure>,
}

impl ScheduleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure recorded for `module_id`, if any.
    pub fn failure_for(&self, module_id: &str) -> Option<&ScheduleError> {
        self.failures
            .iter()
            .find(|failure| failure.module_id == module_id)
            .map(|failure| &failure.error)
    }

    /// Occurrences owned by `module_id`, in timestamp order.
    pub fn occurrences_for<'a>(
        &'a self,
        module_id: &'a str,
    ) -> impl Iterator<Item = &'a Occurrence> + 'a {
        self.occurrences
            .iter()
            .filter(move |occurrence| occurrence.module() == module_id)
    }
}

/// Schedules `modules` with default limits.
pub fn schedule_modules<'a, I>(modules: I) -> ScheduleReport
where
    I: IntoIterator<Item = &'a ModuleHeader>,
{
    schedule_modules_with(modules, &RecurrenceLimits::default())
}

/// Schedules every module independently. A failing module contributes no
/// occurrences and exactly one failure entry; the batch itself never fails.
pub fn schedule_modules_with<'a, I>(modules: I, limits: &RecurrenceLimits) -> ScheduleReport
where
    I: IntoIterator<Item = &'a ModuleHeader>,
{
    let mut report = ScheduleReport::default();
    let mut scheduled = 0usize;

    for module in modules {
        match schedule_module(module, limits) {
            Ok(occurrences) => {
                scheduled += 1;
                report.occurrences.extend(occurrences);
            }
            Err(error) => {
                warn!(
                    "event=schedule_module module=schedule status=error module_id={} error_code={}",
                    module.id,
                    error.code()
                );
                report.failures.push(ModuleFailure {
                    module_id: module.id.clone(),
                    error,
                });
            }
        }
    }

    report.occurrences.sort_by_key(Occurrence::timestamp);
    info!(
        "event=schedule_batch module=schedule status=ok modules={} failed={} occurrences={}",
        scheduled,
        report.failures.len(),
        report.occurrences.len()
    );
    report
}
