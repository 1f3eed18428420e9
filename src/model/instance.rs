use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Id, Parameters};

/// Persisted record of a provisioned service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub id: Id,
    pub service_id: Id,
    pub plan_id: Id,
    /// Serialized JSON parameter document ("null" when none was supplied)
    pub parameters: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceInstance {
    pub fn new(id: Id, service_id: Id, plan_id: Id, parameters: &Parameters) -> Self {
        let now = Utc::now();
        Self {
            id,
            service_id,
            plan_id,
            parameters: encode_parameters(parameters),
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode the stored parameter document
    pub fn decoded_parameters(&self) -> serde_json::Result<Parameters> {
        decode_parameters(&self.parameters)
    }

    /// Structural comparison of the stored document against `parameters`.
    /// A stored document that no longer decodes never matches.
    pub fn parameters_match(&self, parameters: &Parameters) -> bool {
        self.decoded_parameters()
            .map(|stored| &stored == parameters)
            .unwrap_or(false)
    }

    pub fn set_parameters(&mut self, parameters: &Parameters) {
        self.parameters = encode_parameters(parameters);
    }
}

pub fn encode_parameters(parameters: &Parameters) -> String {
    parameters.to_string()
}

pub fn decode_parameters(raw: &str) -> serde_json::Result<Parameters> {
    if raw.trim().is_empty() {
        return Ok(Parameters::Null);
    }
    serde_json::from_str(raw)
}

/// Caller-facing view of an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceView {
    pub service_id: Id,
    pub plan_id: Id,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created,
    AlreadyExistsUnchanged,
}

impl ProvisionOutcome {
    pub fn unchanged(&self) -> bool {
        matches!(self, ProvisionOutcome::AlreadyExistsUnchanged)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionRequest {
    pub service_id: Id,
    pub plan_id: Id,
    #[serde(default)]
    pub parameters: Parameters,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub service_id: Id,
    #[serde(default)]
    pub plan_id: Option<Id>,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeprovisionRequest {
    pub service_id: Id,
    pub plan_id: Id,
}
