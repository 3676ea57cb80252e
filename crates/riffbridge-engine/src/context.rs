//! Shared state handed to every capture entry point.

use std::sync::Arc;

use riffbridge_errors::RiffbridgeError;
use riffbridge_mappers::{ControllerBackend, MapperFactory};

use crate::config::EngineConfig;
use crate::registry::DeviceRegistry;

/// Factory, registry and config, cloned into each capture path.
#[derive(Debug, Clone)]
pub struct EngineContext {
    factory: MapperFactory,
    registry: Arc<DeviceRegistry>,
    config: EngineConfig,
}

impl EngineContext {
    /// # Errors
    ///
    /// [`RiffbridgeError::Config`] if `config` does not validate.
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn ControllerBackend>,
    ) -> Result<Self, RiffbridgeError> {
        config.validate()?;
        let factory = MapperFactory::new(backend, config.mapper.clone());
        Ok(Self {
            factory,
            registry: Arc::new(DeviceRegistry::new()),
            config,
        })
    }

    pub fn factory(&self) -> &MapperFactory {
        &self.factory
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
