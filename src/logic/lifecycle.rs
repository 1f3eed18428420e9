use log::{info, trace, warn};
use std::sync::Arc;

use crate::error::BrokerError;
use crate::metrics::InstanceMetrics;
use crate::model::{
    Catalog, Id, Parameters, ProvisionOutcome, ServiceInstance, ServiceInstanceView,
};
use crate::store::{InstanceStore, StoreError};

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Provisioning lifecycle of service instances: validates requests against the
/// catalog, decides against the stored state and commits the result.
pub struct InstanceService<S: InstanceStore> {
    catalog: Arc<Catalog>,
    store: Arc<S>,
    metrics: Arc<dyn InstanceMetrics>,
}

impl<S: InstanceStore> Clone for InstanceService<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            store: self.store.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: InstanceStore> InstanceService<S> {
    pub fn new(catalog: Arc<Catalog>, store: Arc<S>, metrics: Arc<dyn InstanceMetrics>) -> Self {
        Self {
            catalog,
            store,
            metrics,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn fetch(&self, instance_id: &Id) -> Result<ServiceInstanceView> {
        trace!("Read instance {}", instance_id);

        let instance = self
            .store
            .find(instance_id)
            .await?
            .ok_or_else(|| BrokerError::NotFound(instance_id.clone()))?;

        let parameters = instance.decoded_parameters().map_err(|e| {
            BrokerError::Store(anyhow::anyhow!(
                "Stored parameters of instance '{}' are not valid JSON: {}",
                instance_id,
                e
            ))
        })?;

        Ok(ServiceInstanceView {
            service_id: instance.service_id,
            plan_id: instance.plan_id,
            parameters,
        })
    }

    pub async fn provision(
        &self,
        instance_id: &Id,
        service_id: &Id,
        plan_id: &Id,
        parameters: &Parameters,
    ) -> Result<ProvisionOutcome> {
        info!("Provisioning instance {} as service {}.", instance_id, service_id);

        // Validation only; the resolved entries are not needed
        let _ = self.catalog.resolve_plan(service_id, plan_id)?;

        if let Some(existing) = self.store.find(instance_id).await? {
            if existing.service_id == *service_id
                && existing.plan_id == *plan_id
                && existing.parameters_match(parameters)
            {
                return Ok(ProvisionOutcome::AlreadyExistsUnchanged);
            }
            return Err(BrokerError::Conflict(format!(
                "There is already an instance {} with different settings.",
                instance_id
            )));
        }

        let instance = ServiceInstance::new(
            instance_id.clone(),
            service_id.clone(),
            plan_id.clone(),
            parameters,
        );

        // A concurrent provision of the same ID may have won since the lookup above
        if let Err(err) = self.store.insert(instance).await {
            let message = match err {
                StoreError::Conflict(message) => message,
                StoreError::Backend(e) => e.root_cause().to_string(),
            };
            warn!("Provisioning instance {} failed: {}", instance_id, message);
            return Err(BrokerError::Conflict(message));
        }

        self.metrics.provisioned(service_id);
        Ok(ProvisionOutcome::Created)
    }

    pub async fn update(
        &self,
        instance_id: &Id,
        service_id: &Id,
        plan_id: Option<&Id>,
        parameters: Option<&Parameters>,
    ) -> Result<()> {
        info!("Updating instance {} as service {}.", instance_id, service_id);

        let mut instance = self
            .store
            .find(instance_id)
            .await?
            .ok_or_else(|| BrokerError::NotFound(instance_id.clone()))?;

        if *service_id != instance.service_id {
            return Err(BrokerError::BadRequest(format!(
                "Cannot change service ID of instance '{}' from '{}' to '{}'.",
                instance_id, instance.service_id, service_id
            )));
        }

        if let Some(plan_id) = plan_id.filter(|plan_id| **plan_id != instance.plan_id) {
            let service = self.catalog.resolve_service(service_id)?;
            if !service.plan_updateable {
                return Err(BrokerError::BadRequest(format!(
                    "Service ID '{}' does not allow changing the Plan ID.",
                    service_id
                )));
            }
            service.resolve_plan(plan_id)?;
            instance.plan_id = plan_id.clone();
        }

        if let Some(parameters) = parameters {
            instance.set_parameters(parameters);
        }

        if !self.store.update(instance).await? {
            return Err(BrokerError::NotFound(instance_id.clone()));
        }
        Ok(())
    }

    pub async fn deprovision(&self, instance_id: &Id, service_id: &Id, plan_id: &Id) -> Result<()> {
        info!("Deprovisioning instance {}.", instance_id);

        let instance = self
            .store
            .find(instance_id)
            .await?
            .ok_or_else(|| BrokerError::Gone(instance_id.clone()))?;

        if instance.service_id != *service_id || instance.plan_id != *plan_id {
            return Err(BrokerError::BadRequest(format!(
                "Service and/or plan ID for instance '{}' do not match.",
                instance_id
            )));
        }

        if !self.store.delete(instance_id).await? {
            return Err(BrokerError::Gone(instance_id.clone()));
        }

        self.metrics.deprovisioned();
        Ok(())
    }
}
