//! Procedure status evaluation

use serde::Serialize;
use serde_json::Value;

use crate::{Criticality, Criterion, Procedure, Step};

/// Outcome of one criterion
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckResult {
    pub path: String,
    pub op: String,
    pub value: Value,
    pub pass: bool,
}

/// Outcome of one step
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepStatus {
    pub id: String,
    pub instruction: String,
    pub criticality: Criticality,
    pub hint: String,
    pub voice_short: String,
    pub complete: bool,
    pub checks: Vec<CheckResult>,
}

/// Completion of a whole procedure against one telemetry tree
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcedureStatusReport {
    pub procedure_id: String,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub complete: bool,
    /// First incomplete step in catalog order
    pub next_step: Option<StepStatus>,
    pub steps: Vec<StepStatus>,
}

impl CheckResult {
    fn evaluate(criterion: &Criterion, state: &Value) -> Self {
        CheckResult {
            path: criterion.path.clone(),
            op: criterion.op.clone(),
            value: criterion.value.clone().unwrap_or(Value::Null),
            pass: criterion.evaluate(state),
        }
    }
}

impl StepStatus {
    /// Every criterion is evaluated so the report lists them all; the step
    /// is complete iff all pass (vacuously true when there are none).
    pub fn evaluate(step: &Step, state: &Value) -> Self {
        let checks: Vec<CheckResult> = step
            .completion_criteria
            .iter()
            .map(|c| CheckResult::evaluate(c, state))
            .collect();
        let complete = checks.iter().all(|c| c.pass);

        StepStatus {
            id: step.id.clone(),
            instruction: step.instruction.clone(),
            criticality: step.criticality.clone(),
            hint: step.hint.clone(),
            voice_short: step.voice_short.clone(),
            complete,
            checks,
        }
    }
}

impl ProcedureStatusReport {
    pub fn evaluate(procedure_id: &str, procedure: &Procedure, state: &Value) -> Self {
        let steps: Vec<StepStatus> = procedure
            .steps
            .iter()
            .map(|s| StepStatus::evaluate(s, state))
            .collect();
        let completed_steps = steps.iter().filter(|s| s.complete).count();
        let total_steps = steps.len();
        let next_step = steps.iter().find(|s| !s.complete).cloned();

        ProcedureStatusReport {
            procedure_id: procedure_id.to_string(),
            completed_steps,
            total_steps,
            complete: completed_steps == total_steps,
            next_step,
            steps,
        }
    }

    /// Required steps that are not yet complete
    pub fn blocking_steps(&self) -> impl Iterator<Item = &StepStatus> {
        self.steps
            .iter()
            .filter(|s| !s.complete && s.criticality.is_required())
    }
}
