//! HTML surface for the view model.
//!
//! Every string that came from the backend is untrusted and goes through
//! [`escape`] before it lands in markup.

use std::fmt::Write;

use crate::pipeline::{SystemView, TableView, ViewModel};
use crate::projector::{Bar, DetailView, RowView, SystemPanel};

/// Neutralize markup-significant characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A standalone document with all regions.
pub fn render_document(vm: &ViewModel) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>llmfit</title></head>\n<body>\n{}\n{}\n<p class=\"count\">{}</p>\n{}\n</body>\n</html>\n",
        render_system(&vm.system),
        render_table(vm),
        escape(&vm.count_label),
        vm.detail.as_ref().map(render_detail).unwrap_or_default(),
    )
}

pub fn render_system(system: &SystemView) -> String {
    match system {
        SystemView::Loading => {
            "<section id=\"system\" class=\"loading\">Detecting hardware...</section>".to_string()
        }
        SystemView::Failed(reason) => format!(
            "<section id=\"system\" class=\"error\">Error loading system info: {}</section>",
            escape(reason)
        ),
        SystemView::Loaded(panel) => render_system_panel(panel),
    }
}

fn render_system_panel(p: &SystemPanel) -> String {
    let mut html = String::from("<section id=\"system\"><dl>");
    for (label, value) in [
        ("CPU", &p.cpu),
        ("RAM", &p.ram),
        ("GPU", &p.gpu),
        ("VRAM", &p.vram),
        ("Backend", &p.backend),
        ("Ollama", &p.ollama),
    ] {
        let _ = write!(html, "<dt>{}</dt><dd>{}</dd>", label, escape(value));
    }
    html.push_str("</dl></section>");
    html
}

pub fn render_table(vm: &ViewModel) -> String {
    let mut html = String::from("<table id=\"models\"><thead><tr>");
    for col in &vm.columns {
        let _ = write!(
            html,
            "<th data-sort=\"{}\">{}{}</th>",
            col.key.field_name(),
            col.label,
            col.arrow()
        );
    }
    html.push_str("</tr></thead><tbody>");
    let span = vm.columns.len();
    match &vm.table {
        TableView::Loading => {
            let _ = write!(
                html,
                "<tr class=\"loading\"><td colspan=\"{}\">Loading models...</td></tr>",
                span
            );
        }
        TableView::Failed(reason) => {
            let _ = write!(
                html,
                "<tr class=\"error\"><td colspan=\"{}\">Error loading models: {}</td></tr>",
                span,
                escape(reason)
            );
        }
        TableView::Empty => {
            let _ = write!(
                html,
                "<tr class=\"empty\"><td colspan=\"{}\">No models match the current filters</td></tr>",
                span
            );
        }
        TableView::Rows(rows) => {
            for row in rows {
                html.push_str(&render_row(row));
            }
        }
    }
    html.push_str("</tbody></table>");
    html
}

fn render_row(r: &RowView) -> String {
    let class = if r.selected { " class=\"selected\"" } else { "" };
    format!(
        "<tr data-name=\"{key}\"{class}>\
         <td><div class=\"model-name\">{title}</div><div class=\"model-sub\">{sub}</div></td>\
         <td>{params}</td><td>{score}</td>\
         <td class=\"fit-{level}\">{icon} {label}</td>\
         <td>{tps}</td><td>{quant}</td><td>{mode}</td><td>{util}</td><td>{ctx}</td>\
         <td>{installed}</td></tr>",
        key = escape(&r.key),
        class = class,
        title = escape(&r.title),
        sub = escape(&r.subtitle),
        params = escape(&r.params),
        score = r.score,
        level = r.fit_level.as_str().to_lowercase(),
        icon = escape(&r.fit_icon),
        label = r.fit_label,
        tps = r.tps,
        quant = escape(&r.quant),
        mode = escape(&r.run_mode),
        util = r.utilization,
        ctx = r.context,
        installed = if r.installed { "✓" } else { "" },
    )
}

fn render_bar(bar: &Bar) -> String {
    format!(
        "<div class=\"bar\"><span class=\"bar-label\">{}</span>\
         <div class=\"bar-track\"><div class=\"bar-fill\" style=\"width: {:.1}%\"></div></div>\
         <span class=\"bar-value\">{}</span></div>",
        bar.label, bar.fill_pct, bar.value
    )
}

pub fn render_detail(d: &DetailView) -> String {
    let mut html = format!(
        "<aside id=\"detail\" data-name=\"{}\"><button class=\"close\">×</button><h2>{}</h2><p class=\"model-sub\">{}</p><dl>",
        escape(&d.key),
        escape(&d.title),
        escape(&d.name)
    );
    for (label, value) in [
        ("Provider", &d.provider),
        ("Parameters", &d.params),
        ("Score", &d.score),
        ("Run Mode", &d.run_mode),
        ("Quantization", &d.quant),
        ("Speed", &d.tps),
        ("Context", &d.context_tokens),
        ("Memory", &d.memory),
        ("Category", &d.category),
        ("Use Case", &d.use_case),
    ] {
        let _ = write!(html, "<dt>{}</dt><dd>{}</dd>", label, escape(value));
    }
    let _ = write!(
        html,
        "<dt>Fit</dt><dd>{} {}</dd></dl>",
        escape(&d.fit_icon),
        d.fit_label
    );
    html.push_str(&render_bar(&d.utilization));
    html.push_str("<div class=\"scores\">");
    for bar in &d.score_bars {
        html.push_str(&render_bar(bar));
    }
    html.push_str("</div>");
    if !d.notes.is_empty() {
        html.push_str("<ul class=\"notes\">");
        for note in &d.notes {
            let _ = write!(html, "<li>{}</li>", escape(note));
        }
        html.push_str("</ul>");
    }
    html.push_str("</aside>");
    html
}
