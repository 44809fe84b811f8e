use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Info,
    #[cfg_attr(unix, allow(dead_code))]
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_check(),
        fifo_lifecycle_check(),
        loopback_check(),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let output = DoctorOutput {
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("bagpipes doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_check() -> CheckResult {
    if cfg!(unix) {
        CheckResult::new(
            "platform",
            CheckStatus::Pass,
            "named pipes (mkfifo) available",
        )
    } else {
        CheckResult::new(
            "platform",
            CheckStatus::Fail,
            "named pipes require a Unix platform",
        )
    }
}

#[cfg(unix)]
fn fifo_lifecycle_check() -> CheckResult {
    use bagpipes_fifo::PipeNamespace;

    let result = PipeNamespace::new(std::process::id()).and_then(|ns| {
        let dir = ns.path().to_path_buf();
        let pair = ns.create_pair("doctor")?;
        ns.teardown(pair)?;
        Ok(dir)
    });

    match result {
        Ok(dir) if !dir.exists() => CheckResult::new(
            "fifo_lifecycle",
            CheckStatus::Pass,
            "create and teardown succeeded",
        ),
        Ok(dir) => CheckResult::new(
            "fifo_lifecycle",
            CheckStatus::Fail,
            format!("{} left behind after teardown", dir.display()),
        ),
        Err(err) => CheckResult::new("fifo_lifecycle", CheckStatus::Fail, err.to_string()),
    }
}

#[cfg(not(unix))]
fn fifo_lifecycle_check() -> CheckResult {
    CheckResult::new("fifo_lifecycle", CheckStatus::Skip, "not supported")
}

#[cfg(unix)]
fn loopback_check() -> CheckResult {
    use bagpipes_fifo::PipeNamespace;
    use bagpipes_frame::FramedChannel;

    fn exchange() -> Result<(), String> {
        let ns = PipeNamespace::new(std::process::id()).map_err(|e| e.to_string())?;
        let mut coordinator =
            FramedChannel::new(ns.create_pair("loopback").map_err(|e| e.to_string())?);
        let mut worker = FramedChannel::new(
            PipeNamespace::attach(&coordinator.peer_paths()).map_err(|e| e.to_string())?,
        );

        coordinator.send("ping").map_err(|e| e.to_string())?;
        let got = worker.recv().map_err(|e| e.to_string())?;
        if got.as_deref() != Some(b"ping".as_slice()) {
            return Err(format!("unexpected payload: {got:?}"));
        }

        drop(worker);
        coordinator.teardown(ns).map_err(|e| e.to_string())
    }

    match exchange() {
        Ok(()) => CheckResult::new(
            "loopback",
            CheckStatus::Pass,
            "framed round trip succeeded",
        ),
        Err(detail) => CheckResult::new("loopback", CheckStatus::Fail, detail),
    }
}

#[cfg(not(unix))]
fn loopback_check() -> CheckResult {
    CheckResult::new("loopback", CheckStatus::Skip, "not supported")
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "cli") {
        features.push("cli");
    }
    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            checks: vec![CheckResult::new("x", CheckStatus::Pass, "ok")],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }

    #[cfg(unix)]
    #[test]
    fn local_checks_pass() {
        assert!(matches!(fifo_lifecycle_check().status, CheckStatus::Pass));
        assert!(matches!(loopback_check().status, CheckStatus::Pass));
    }
}
