//! Manifest and service rendering in YAML, JSON or a human summary

use anyhow::{Context, Result};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::display::ColourManager;
use crate::monitoring::service::port_entries;
use crate::monitoring::{PluginManifest, ResolvedPlugin, ServiceDescriptor};

#[derive(Serialize)]
struct ResolvedDocument<'a> {
    manifest: &'a PluginManifest,
    service: &'a ServiceDescriptor,
}

pub fn render(
    resolved: &ResolvedPlugin,
    format: OutputFormat,
    colours: &ColourManager,
) -> Result<String> {
    match format {
        OutputFormat::Yaml => render_yaml(resolved),
        OutputFormat::Json => render_json(resolved),
        OutputFormat::Summary => Ok(render_summary(resolved, colours)),
    }
}

/// Manifest and service as two YAML documents
fn render_yaml(resolved: &ResolvedPlugin) -> Result<String> {
    let manifest = serde_yaml::to_string(&resolved.manifest)
        .context("Failed to serialize manifest to YAML")?;
    let service = serde_yaml::to_string(&resolved.service)
        .context("Failed to serialize service to YAML")?;
    Ok(format!("---\n{}---\n{}", manifest, service))
}

fn render_json(resolved: &ResolvedPlugin) -> Result<String> {
    let document = ResolvedDocument {
        manifest: &resolved.manifest,
        service: &resolved.service,
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize resolved plugin to JSON")
}

/// Format a compact table with headers, indented two spaces
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(headers.iter().map(|h| Cell::new(h)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
    }

    table
        .to_string()
        .lines()
        .map(|line| format!("  {}\n", line))
        .collect()
}

fn render_summary(resolved: &ResolvedPlugin, colours: &ColourManager) -> String {
    let manifest = &resolved.manifest;
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} ({}/{})\n",
        colours.highlight(&manifest.display_name),
        manifest.console_name,
        manifest.resource_namespace,
        manifest.name
    ));
    out.push_str(&format!("Image:    {}\n", manifest.image));
    out.push_str(&format!("Features: {}\n\n", colours.success(&resolved.features.joined())));

    out.push_str("Proxies:\n");
    let proxy_rows: Vec<Vec<String>> = manifest
        .proxies
        .iter()
        .map(|p| {
            vec![
                p.alias.clone(),
                format!("{}/{}", p.endpoint.service.namespace, p.endpoint.service.name),
                p.endpoint.service.port.to_string(),
                p.authorization.clone(),
            ]
        })
        .collect();
    out.push_str(&format_compact_table(
        &["ALIAS", "SERVICE", "PORT", "AUTHORIZATION"],
        &proxy_rows,
    ));

    out.push_str("\nService ports:\n");
    let port_rows: Vec<Vec<String>> = port_entries(&resolved.service)
        .into_iter()
        .map(|(name, port)| vec![name, port.to_string()])
        .collect();
    out.push_str(&format_compact_table(&["NAME", "PORT"], &port_rows));

    out.push_str("\nArguments:\n");
    for arg in &manifest.extra_args {
        out.push_str(&format!("  {}\n", arg));
    }
    out
}
