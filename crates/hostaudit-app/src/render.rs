//! Render use cases: Markdown from an in-memory report.

use hostaudit_types::AuditReport;

use crate::report::to_renderable;

pub fn render_markdown(report: &AuditReport) -> String {
    hostaudit_render::render_markdown(&to_renderable(report))
}
