use gfv_core::config::{AppConfig, LoadOptions};
use gfv_store::{OperationStore, RestOperationStore};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_store_mode(&config));
            checks.push(check_store_connectivity(&config));
            checks.push(check_analysis_mode(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "store_mode",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "store_connectivity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "analysis_mode",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    // Skips are an expected outcome of degraded modes; only failures count.
    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_store_mode(config: &AppConfig) -> DoctorCheck {
    if config.store.is_configured() {
        DoctorCheck {
            name: "store_mode",
            status: CheckStatus::Pass,
            details: "remote store configured (persistent mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "store_mode",
            status: CheckStatus::Pass,
            details: "store unconfigured; console will run in local mode".to_string(),
        }
    }
}

fn check_store_connectivity(config: &AppConfig) -> DoctorCheck {
    let Some(client_result) = RestOperationStore::from_config(&config.store) else {
        return DoctorCheck {
            name: "store_connectivity",
            status: CheckStatus::Skipped,
            details: "skipped in local mode".to_string(),
        };
    };

    let store = match client_result {
        Ok(store) => store,
        Err(error) => {
            return DoctorCheck {
                name: "store_connectivity",
                status: CheckStatus::Fail,
                details: format!("store client could not be created: {error}"),
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "store_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    match runtime.block_on(store.list_all()) {
        Ok(records) => DoctorCheck {
            name: "store_connectivity",
            status: CheckStatus::Pass,
            details: format!("remote table reachable ({} records)", records.len()),
        },
        Err(error) => DoctorCheck {
            name: "store_connectivity",
            status: CheckStatus::Fail,
            details: format!("remote table request failed: {error}"),
        },
    }
}

fn check_analysis_mode(config: &AppConfig) -> DoctorCheck {
    if config.analysis.is_configured() {
        DoctorCheck {
            name: "analysis_mode",
            status: CheckStatus::Pass,
            details: format!("analysis configured with model `{}`", config.analysis.model),
        }
    } else {
        DoctorCheck {
            name: "analysis_mode",
            status: CheckStatus::Pass,
            details: "analysis unconfigured; submissions proceed without it".to_string(),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
