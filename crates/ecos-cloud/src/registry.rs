//! Datasource → plugin constructor mapping

use crate::error::{CloudError, Result};
use crate::provider::ResourcePlugin;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub type PluginFactory = Arc<dyn Fn() -> Box<dyn ResourcePlugin> + Send + Sync>;

/// Registry of resource plugins, filled once at startup.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor. A later registration under the same name wins.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ResourcePlugin> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(plugin = %name, "registering resource plugin");
        self.factories.insert(name, Arc::new(factory));
    }

    /// Construct a fresh plugin for `name`.
    pub fn load(&self, name: &str) -> Result<Box<dyn ResourcePlugin>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| CloudError::UnsupportedDatasource {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered datasource names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl ResourcePlugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn validate_prerequisites(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_registered() {
        let mut registry = PluginRegistry::new();
        registry.register("aws_cur", || Box::new(Named("aws_cur")));

        let plugin = registry.load("aws_cur").unwrap();
        assert_eq!(plugin.name(), "aws_cur");
    }

    #[test]
    fn test_load_unknown() {
        let mut registry = PluginRegistry::new();
        registry.register("aws_cur", || Box::new(Named("aws_cur")));

        let err = registry.load("gcp_billing").err().unwrap();
        match &err {
            CloudError::UnsupportedDatasource { name, available } => {
                assert_eq!(name, "gcp_billing");
                assert_eq!(available, &vec!["aws_cur".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("unsupported datasource 'gcp_billing'"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = PluginRegistry::new();
        registry.register("aws_cur", || Box::new(Named("first")));
        registry.register("aws_cur", || Box::new(Named("second")));

        assert_eq!(registry.load("aws_cur").unwrap().name(), "second");
        assert_eq!(registry.names(), vec!["aws_cur".to_string()]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = PluginRegistry::new();
        let err = registry.load("").err().unwrap();
        assert!(err.to_string().contains("available: none"));
    }
}
