//! Output formatting for batch check results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//!
//! Positions in JSON and SARIF output are 1-based; diagnostics themselves
//! are 0-based.

use std::collections::BTreeSet;
use std::path::Path;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{Diagnostic, DiagnosticRule, Severity};
use crate::config::Config;
use crate::runner::CheckResult;

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

pub fn build_json(path: &str, result: &CheckResult, config: &Config) -> JsonReport {
    let diagnostics = result
        .files
        .iter()
        .flat_map(|f| f.diagnostics.iter().map(move |d| diagnostic_to_json(&f.path, d)))
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        passed: result.passed(config),
        files_scanned: result.scanned,
        errors: result.error_count(),
        warnings: result.warning_count(),
        diagnostics,
        skipped: result.skipped.iter().map(|s| s.path.clone()).collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, result: &CheckResult, config: &Config) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json(path, result, config))?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(file: &str, d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule.as_str().to_string(),
        severity: d.severity.to_string(),
        file: file.to_string(),
        line: d.range.start.line + 1,
        column: d.range.start.character + 1,
        end_line: d.range.end.line + 1,
        end_column: d.range.end.character + 1,
        message: d.message.clone(),
        fix: d.fix_code.map(|f| f.as_str().to_string()),
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "razencheck";

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "startColumn")]
    pub start_column: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
    #[serde(rename = "endColumn")]
    pub end_column: u32,
}

fn default_level(rule: DiagnosticRule) -> &'static str {
    match rule {
        DiagnosticRule::UnknownLibrary | DiagnosticRule::UnknownFunction => "error",
        _ => "warning",
    }
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.as_os_str().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // Single file scan: just the file name
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

pub fn build_sarif(base_path: &Path, result: &CheckResult) -> SarifReport {
    let rule_set: BTreeSet<DiagnosticRule> = result
        .files
        .iter()
        .flat_map(|f| f.diagnostics.iter().map(|d| d.rule))
        .collect();

    let rules = rule_set
        .into_iter()
        .map(|rule| SarifRule {
            id: rule.as_str().to_string(),
            short_description: SarifMessage {
                text: rule.description().to_string(),
            },
            default_config: SarifRuleConfig {
                level: default_level(rule).to_string(),
            },
        })
        .collect();

    let results = result
        .files
        .iter()
        .flat_map(|f| {
            f.diagnostics.iter().map(move |d| SarifResult {
                rule_id: d.rule.as_str().to_string(),
                level: map_severity_to_level(d.severity).to_string(),
                message: SarifMessage {
                    text: d.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifact {
                            uri: make_relative_path(&f.path, base_path),
                        },
                        region: SarifRegion {
                            start_line: d.range.start.line + 1,
                            start_column: d.range.start.character + 1,
                            end_line: d.range.end.line + 1,
                            end_column: d.range.end.character + 1,
                        },
                    },
                }],
            })
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &CheckResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_sarif(base_path, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_source: &str, result: &CheckResult, config: &Config) {
    println!();
    print!("  ");
    print!("{}", TOOL_NAME.cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config_source);
    println!();

    for file in result.with_findings() {
        println!("  {}", file.path.blue().bold());
        for d in &file.diagnostics {
            write_severity_tag(d.severity);
            print!(
                "{} ",
                format!(
                    "{}:{}",
                    d.range.start.line + 1,
                    d.range.start.character + 1
                )
                .dimmed()
            );
            print!("{:<22}", d.rule.as_str().dimmed());
            println!("{}", d.message);
        }
        println!();
    }

    for skipped in &result.skipped {
        println!(
            "  {} {} {}",
            "SKIP ".yellow(),
            skipped.path.blue(),
            format!("({})", skipped.reason).dimmed()
        );
    }
    if !result.skipped.is_empty() {
        println!();
    }

    write_final_status(result, config);
    println!();
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
    }
}

fn write_final_status(result: &CheckResult, config: &Config) {
    if result.passed(config) {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }

    let errors = result.error_count();
    let warnings = result.warning_count();
    print!("  {} file(s)  ", result.scanned);
    if errors > 0 {
        print!("{}", format!("{} error(s)", errors).red());
    } else {
        print!("{}", "0 errors".green());
    }
    print!("  ");
    if warnings > 0 {
        print!("{}", format!("{} warning(s)", warnings).yellow());
    } else {
        print!("{}", "0 warnings".green());
    }
    if config.fail_on_warnings {
        print!("  {}", "(fail_on_warnings)".dimmed());
    }
    println!();
}
