//! Export job types

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_wire_name_conversions;
use crate::utils::time_span;

/// Lifecycle state of a server-side job.
///
/// The server reports the full task state machine; the intermediate
/// waiting states fold into `Scheduled` and `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(alias = "Created", alias = "WaitingForActivation", alias = "WaitingToRun")]
    Scheduled,
    #[serde(alias = "WaitingForChildrenToComplete")]
    Running,
    RanToCompletion,
    Canceled,
    Faulted,
}

impl_wire_name_conversions!(TaskStatus {
    Scheduled => "Scheduled",
    Running => "Running",
    RanToCompletion => "RanToCompletion",
    Canceled => "Canceled",
    Faulted => "Faulted",
});

/// Snapshot of a job, fetched fresh on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub progress: f64,
    #[serde(default)]
    pub exception_message: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl JobStatus {
    /// Artifact id of a completed export (a string result), if any.
    pub fn artifact_id(&self) -> Option<&str> {
        self.result.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// Job handle returned when a job is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// Parameters of an export job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParameters {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `Duration::ZERO` produces a single file.
    #[serde(with = "time_span")]
    pub file_period: Duration,
    /// `None` computes (and caches) the data server-side without returning it.
    pub file_format: Option<String>,
    pub resource_paths: Vec<String>,
    pub configuration: Option<BTreeMap<String, serde_json::Value>>,
}

impl ExportParameters {
    pub fn new<I, S>(begin: DateTime<Utc>, end: DateTime<Utc>, resource_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            begin,
            end,
            file_period: Duration::ZERO,
            file_format: None,
            resource_paths: resource_paths.into_iter().map(Into::into).collect(),
            configuration: None,
        }
    }

    pub fn with_file_period(mut self, file_period: Duration) -> Self {
        self.file_period = file_period;
        self
    }

    pub fn with_file_format(mut self, file_format: impl Into<String>) -> Self {
        self.file_format = Some(file_format.into());
        self
    }

    pub fn with_configuration(mut self, configuration: BTreeMap<String, serde_json::Value>) -> Self {
        self.configuration = Some(configuration);
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn task_status_folds_waiting_states() {
        let parse = |s: &str| serde_json::from_value::<TaskStatus>(json!(s)).unwrap();
        assert_eq!(parse("Created"), TaskStatus::Scheduled);
        assert_eq!(parse("WaitingToRun"), TaskStatus::Scheduled);
        assert_eq!(parse("WaitingForChildrenToComplete"), TaskStatus::Running);
        assert_eq!(parse("RanToCompletion"), TaskStatus::RanToCompletion);
        assert_eq!(parse("Faulted"), TaskStatus::Faulted);
    }

    #[test]
    fn job_status_exposes_string_results_only() {
        let done: JobStatus = serde_json::from_value(json!({
            "status": "RanToCompletion",
            "progress": 1.0,
            "result": "artifact-1"
        }))
        .unwrap();
        assert_eq!(done.artifact_id(), Some("artifact-1"));

        let odd: JobStatus = serde_json::from_value(json!({
            "status": "RanToCompletion",
            "progress": 1.0,
            "result": { "id": "artifact-1" }
        }))
        .unwrap();
        assert_eq!(odd.artifact_id(), None);
    }

    #[test]
    fn export_parameters_wire_shape() {
        let begin = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let params = ExportParameters::new(begin, end, ["/a/b/c/T1/1_s"])
            .with_file_period(Duration::from_secs(3_600))
            .with_file_format("Nexus.Writers.Csv");

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["filePeriod"], "01:00:00");
        assert_eq!(value["fileFormat"], "Nexus.Writers.Csv");
        assert_eq!(value["resourcePaths"], json!(["/a/b/c/T1/1_s"]));
        assert!(value["configuration"].is_null());
    }
}
