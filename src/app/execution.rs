//! Resolution run: read the UIPlugin, gather platform inputs, render output

use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, info};

use crate::cli::{Args, OutputFormat};
use crate::config::ConfigManager;
use crate::display::ColourManager;
use crate::monitoring::{
    CompatibilityMatrix, DependencyGate, FeatureSet, MonitoringResolver, PlatformSupport,
    PluginTarget, UIPlugin,
};
use crate::output;

pub const DEFAULT_NAMESPACE: &str = "openshift-cluster-observability-operator";
pub const DEFAULT_NAME: &str = "monitoring";

/// Read a UIPlugin document; JSON is accepted as YAML
pub fn load_plugin(path: &Path) -> Result<UIPlugin> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read UIPlugin file: {}", path.display()))?;
    let plugin: UIPlugin = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse UIPlugin file: {}", path.display()))?;
    debug!("Loaded UIPlugin {:?} of type {}", plugin.metadata.name, plugin.spec.plugin_type);
    Ok(plugin)
}

pub fn build_target(
    args: &Args,
    config: &ConfigManager,
    plugin: &UIPlugin,
) -> Result<PluginTarget> {
    let namespace = args
        .namespace
        .clone()
        .or_else(|| config.get_value("plugin", "namespace").cloned())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let name = args
        .name
        .clone()
        .or_else(|| config.get_value("plugin", "name").cloned())
        .or_else(|| plugin.metadata.name.clone())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    let image = args
        .image
        .clone()
        .or_else(|| config.get_value("plugin", "image").cloned())
        .ok_or_else(|| {
            anyhow::anyhow!("No plugin image configured: pass --image or set plugin.image")
        })?;

    Ok(PluginTarget::new(namespace, name, image))
}

/// Supported features come from --features, the config file, or a matrix lookup by cluster version
pub fn build_platform_support(args: &Args, config: &ConfigManager) -> Result<PlatformSupport> {
    let supported = match &args.features {
        Some(list) => FeatureSet::parse_list(list).map_err(|e| anyhow::anyhow!(e))?,
        None => match config.get_features()? {
            Some(features) => features,
            None => {
                let cluster_version = args
                    .cluster_version
                    .clone()
                    .or_else(|| config.get_value("compatibility", "cluster-version").cloned())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "No compatibility information: pass --features or --cluster-version"
                        )
                    })?;
                let features = CompatibilityMatrix::monitoring().features_for(&cluster_version);
                info!("Cluster version {} supports [{}]", cluster_version, features);
                features
            }
        },
    };

    let acm_version = args
        .acm_version
        .clone()
        .or_else(|| config.get_value("compatibility", "acm-version").cloned());

    let gate = match &args.min_acm_version {
        Some(min) => DependencyGate::new("acm", min.as_str()),
        None => config.get_dependency_gate(),
    };

    Ok(PlatformSupport::new(supported, acm_version).with_gate(gate))
}

/// Resolve the plugin named on the command line and render it
pub fn run_resolve(args: &Args, config: &ConfigManager) -> Result<String> {
    let plugin = load_plugin(&args.plugin_file)?;
    let target = build_target(args, config, &plugin)?;
    let platform = build_platform_support(args, config)?;

    let resolver = MonitoringResolver::new(config.get_resolver_defaults());
    let resolved = resolver.resolve_plugin(&plugin, &target, &platform)?;

    let format: OutputFormat = args.output.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let no_color = args.no_color || config.get_bool("base", "color")? == Some(false);
    output::render(&resolved, format, &ColourManager::from_flags(no_color))
}
