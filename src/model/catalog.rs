use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub free: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bindable: bool,
    #[serde(default)]
    pub plan_updateable: bool,
    pub plans: Vec<Plan>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown service ID '{0}'.")]
    UnknownService(Id),
    #[error("Unknown plan ID '{0}'.")]
    UnknownPlan(Id),
    #[error("Service ID '{0}' is listed more than once in the catalog.")]
    DuplicateService(Id),
    #[error("Plan ID '{plan_id}' is listed more than once for service '{service_id}'.")]
    DuplicatePlan { service_id: Id, plan_id: Id },
    #[error("Service ID '{0}' does not offer any plans.")]
    EmptyService(Id),
}

impl Service {
    /// Find a plan of this service by ID
    pub fn resolve_plan(&self, plan_id: &str) -> Result<&Plan, CatalogError> {
        self.plans
            .iter()
            .find(|plan| plan.id == plan_id)
            .ok_or_else(|| CatalogError::UnknownPlan(plan_id.to_string()))
    }
}

/// Static set of services offered by the broker. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    services: Vec<Service>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate service IDs, duplicate plan IDs within a
    /// service and services without plans.
    pub fn new(services: Vec<Service>) -> Result<Self, CatalogError> {
        let mut service_ids = HashSet::new();
        for service in &services {
            if !service_ids.insert(service.id.as_str()) {
                return Err(CatalogError::DuplicateService(service.id.clone()));
            }
            if service.plans.is_empty() {
                return Err(CatalogError::EmptyService(service.id.clone()));
            }

            let mut plan_ids = HashSet::new();
            for plan in &service.plans {
                if !plan_ids.insert(plan.id.as_str()) {
                    return Err(CatalogError::DuplicatePlan {
                        service_id: service.id.clone(),
                        plan_id: plan.id.clone(),
                    });
                }
            }
        }

        Ok(Self { services })
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn resolve_service(&self, service_id: &str) -> Result<&Service, CatalogError> {
        self.services
            .iter()
            .find(|service| service.id == service_id)
            .ok_or_else(|| CatalogError::UnknownService(service_id.to_string()))
    }

    /// Resolve a service and one of its plans. The service is checked first.
    pub fn resolve_plan(&self, service_id: &str, plan_id: &str) -> Result<(&Service, &Plan), CatalogError> {
        let service = self.resolve_service(service_id)?;
        let plan = service.resolve_plan(plan_id)?;
        Ok((service, plan))
    }
}
