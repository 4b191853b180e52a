pub mod config;
pub mod destroy;
pub mod provision;

use ecos_cloud::{PluginRegistry, ResourcePlugin};
use ecos_config::ProjectConfig;

/// Every datasource this binary ships with.
pub fn plugin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    ecos_cloud_aws::register(&mut registry);
    registry
}

/// Resolve the datasource (`--source` first, then `data_source`) and build its plugin.
pub fn load_plugin(source: Option<&str>, cfg: &ProjectConfig) -> anyhow::Result<Box<dyn ResourcePlugin>> {
    let registry = plugin_registry();
    let name = source
        .filter(|s| !s.is_empty())
        .unwrap_or(cfg.data_source.as_str());
    if name.is_empty() {
        anyhow::bail!(
            "no datasource configured; set data_source in .ecos.yaml or pass --source (available: {})",
            registry.names().join(", ")
        );
    }
    Ok(registry.load(name)?)
}
