//! Renders diagnostics for the two output formats the `check` loop supports.

use hdlc_diagnostics::Diagnostic;

/// One diagnostic per line: `path:line[:col]: severity[code]: message`.
pub fn render_text(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        out.push_str(&diag.path.display().to_string());
        out.push(':');
        out.push_str(&(diag.line + 1).to_string());
        if let Some(col) = diag.col {
            out.push(':');
            out.push_str(&(col + 1).to_string());
        }
        out.push_str(": ");
        out.push_str(&diag.severity.to_string());
        if let Some(code) = &diag.code {
            out.push_str(&format!("[{code}]"));
        }
        out.push_str(": ");
        out.push_str(&diag.message);
        out.push('\n');
    }
    out
}

/// The full diagnostic list as a JSON array.
pub fn render_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string())
}
