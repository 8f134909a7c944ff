//! Error sanitization — turns raw CLI stderr into a single safe line.
//!
//! Raw stderr may carry interpreter tracebacks with frame listings and
//! absolute paths. Callers get one line; operators get the full text on the
//! tracing diagnostic channel (emitted by the route handler before
//! sanitization).

use regex::Regex;

/// The marker word that opens an interpreter stack trace. Must never appear
/// in a sanitized message.
const TRACE_MARKER: &str = "Traceback";

const FALLBACK: &str = "analysis process failed";

/// Produce a single-line sanitized message from raw stderr.
///
/// With a trace marker present, the message is the final non-blank
/// unindented line of the form `<ExceptionKind>: <message>` — the frame and
/// header lines above it are discarded. Without a marker, the final
/// non-blank line of the trimmed stderr is used directly (plain CLI errors
/// like `error: bad scenario`). When nothing usable survives the filters, a
/// fixed generic message that names no internals.
pub fn sanitize_stderr(stderr: &str, exit_code: i32) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return format!("{} with exit code {}", FALLBACK, exit_code);
    }

    if trimmed.contains(TRACE_MARKER) {
        let exception_re =
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*: .+").expect("valid regex");
        let last_exception_line = trimmed
            .lines()
            .rev()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .find(|line| {
                !line.starts_with(char::is_whitespace)
                    && exception_re.is_match(line)
                    && is_safe(line)
            });
        return match last_exception_line {
            Some(line) => line.to_string(),
            None => format!("{} with exit code {}", FALLBACK, exit_code),
        };
    }

    let last_line = trimmed
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(trimmed);
    if is_safe(last_line) {
        last_line.to_string()
    } else {
        format!("{} with exit code {}", FALLBACK, exit_code)
    }
}

/// Classify a nonzero exit code. Classification is by exit code alone,
/// never by stderr content.
pub fn classify_exit(
    exit_code: i32,
    message: String,
    validation_exit_codes: &[i32],
) -> crate::error::GatewayError {
    if validation_exit_codes.contains(&exit_code) {
        crate::error::GatewayError::ValidationFailure(message)
    } else {
        crate::error::GatewayError::ProcessCrash(message)
    }
}

/// A candidate line is safe when it carries neither the trace marker nor an
/// absolute path fragment.
fn is_safe(line: &str) -> bool {
    if line.contains(TRACE_MARKER) {
        return false;
    }
    !line
        .split_whitespace()
        .any(|word| word.trim_start_matches(['"', '\'', '(', '[']).starts_with('/'))
}
