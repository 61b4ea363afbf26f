use cloudres_core::{AppViewModel, PhaseKind, RejectedFile, ResultsTableView, RunId};
use cloudres_engine::ServiceSettings;

const COLUMN_GAP: &str = "  ";

/// One line summarizing the view, printed whenever it changes.
pub fn status_line(view: &AppViewModel) -> String {
    let mut line = format!("[{}]", view.phase.label());
    if let Some(run_id) = &view.run_id {
        line.push_str(&format!(" run {run_id}"));
    }
    if let Some(percent) = view.upload_percent {
        line.push_str(&format!(" {percent}%"));
    }
    if !view.message.is_empty() {
        line.push(' ');
        line.push_str(&view.message);
    }
    line
}

pub fn format_selection(view: &AppViewModel) -> Vec<String> {
    let total: u64 = view.files.iter().map(|file| file.byte_size).sum();
    let mut lines: Vec<String> = view
        .files
        .iter()
        .map(|file| format!("  {} ({} bytes)", file.name, format_with_commas(file.byte_size)))
        .collect();
    lines.push(format!(
        "Selected {} file(s), {} bytes",
        view.files.len(),
        format_with_commas(total)
    ));
    lines
}

pub fn format_rejected(rejected: &[RejectedFile]) -> Vec<String> {
    rejected
        .iter()
        .map(|file| format!("Skipping {}: {}", file.name, file.reason))
        .collect()
}

/// Left-aligned table with a dashed rule under the header.
pub fn format_table(table: &ResultsTableView) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &table.columns, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &table.rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Absolute report URLs for the run shown in the view. Empty without a run.
pub fn report_links(settings: &ServiceSettings, view: &AppViewModel) -> Vec<String> {
    let Some(run_id) = view.run_id.as_deref().and_then(RunId::new) else {
        return Vec::new();
    };
    view.reports
        .iter()
        .filter_map(|kind| {
            settings
                .report_url(*kind, &run_id)
                .ok()
                .map(|url| format!("{}: {}", kind.label(), url))
        })
        .collect()
}

/// Final summary once the lifecycle settled.
pub fn summary(view: &AppViewModel) -> Option<String> {
    match view.phase {
        PhaseKind::ResultsReady => Some(match &view.results {
            Some(table) if !table.rows.is_empty() => format_table(table),
            _ => format!("{}\n", view.message),
        }),
        PhaseKind::Failed => Some(format!("Failed: {}\n", view.message)),
        _ => None,
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
