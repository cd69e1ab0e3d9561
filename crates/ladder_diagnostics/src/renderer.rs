//! Human-readable rendering of log records.

use crate::record::Record;

/// Renders records as cycle-prefixed text lines.
///
/// Produces output like:
/// ```text
/// 1042: [tb.model] error: notify mismatch
///    = note: expected NotifyResponse{id:0, key:3, volume:20}
///    = note: actual NotifyResponse{vld:0}
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Renders a single record, including a trailing newline.
    pub fn render(&self, record: &Record) -> String {
        let mut out = format!(
            "{}: [{}] {}: {}\n",
            record.cycle, record.scope, record.severity, record.message
        );
        for note in &record.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    #[test]
    fn render_plain() {
        let mut r = Record::new(Severity::Info, "Initialization complete!");
        r.cycle = 12;
        r.scope = "tb.bench".to_string();
        assert_eq!(
            TextRenderer.render(&r),
            "12: [tb.bench] info: Initialization complete!\n"
        );
    }

    #[test]
    fn render_with_notes() {
        let mut r = Record::new(Severity::Error, "notify mismatch")
            .with_note("expected A")
            .with_note("actual B");
        r.scope = "tb.model".to_string();
        let out = TextRenderer.render(&r);
        assert!(out.starts_with("0: [tb.model] error: notify mismatch\n"));
        assert!(out.contains("   = note: expected A\n"));
        assert!(out.contains("   = note: actual B\n"));
    }
}
