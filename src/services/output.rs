use crate::domain::models::{ErrorBody, JsonErr, JsonOut};
use crate::domain::outcome::Verdict;
use serde::Serialize;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// One status line per gate run: `[PASS]`, `[WARN]` or `[FAIL]`.
pub fn verdict_line(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Pass { message } => format!("[PASS] {message}"),
        Verdict::Warn { message, .. } => format!("[WARN] {message}"),
        Verdict::Skipped { reason } => format!("[WARN] {reason}; skipping verification"),
        Verdict::Fail { rejection } => format!("[FAIL] {rejection}"),
    }
}

/// Prints a verdict and returns the process exit status it maps to.
pub fn print_verdict(json: bool, verdict: &Verdict) -> anyhow::Result<i32> {
    match verdict.rejection() {
        Some(rejection) if json => print_error(json, rejection.code(), rejection.message()),
        _ => print_one(json, verdict, |v| verdict_line(v))?,
    }
    Ok(verdict.exit_code())
}

/// Failure envelope on stdout for `--json`, a tagged line on stderr otherwise.
pub fn print_error(json: bool, code: &str, message: &str) {
    if !json {
        let tag = if code == "FAIL_CLOSED" { "[FATAL]" } else { "[ERR]" };
        eprintln!("{tag} {message}");
        return;
    }
    let body = JsonErr {
        ok: false,
        error: ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
        },
    };
    match serde_json::to_string_pretty(&body) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("[ERR] {message} ({e})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::Rejection;

    #[test]
    fn verdict_lines_are_tagged() {
        assert_eq!(verdict_line(&Verdict::pass("deps clean")), "[PASS] deps clean");
        assert_eq!(
            verdict_line(&Verdict::fail(Rejection::signature("invalid signature for a.json"))),
            "[FAIL] invalid signature for a.json"
        );
        assert!(verdict_line(&Verdict::Skipped {
            reason: "no public key provided".into()
        })
        .starts_with("[WARN] no public key"));
    }
}
