use llmfit_view::fit::FitLevel;
use llmfit_view::pipeline::{SystemView, TableView};
use llmfit_view::projector::{Bar, DetailView};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
};

use crate::tui_app::{App, FILTER_ROWS, InputMode};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // System panel
            Constraint::Length(3), // Search + filters
            Constraint::Min(0),    // Table (+ detail)
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    draw_system(frame, chunks[0], app);
    draw_filters(frame, chunks[1], app);

    if let Some(detail) = app.vm.detail.clone() {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(chunks[2]);
        draw_table(frame, main[0], app);
        draw_detail(frame, main[1], &detail);
    } else {
        draw_table(frame, chunks[2], app);
    }

    if app.input_mode == InputMode::Filters {
        draw_column_filters(frame, chunks[2], app);
    }

    draw_status(frame, chunks[3], app);
}

fn fit_color(level: FitLevel) -> Color {
    match level {
        FitLevel::Perfect => Color::Green,
        FitLevel::Good => Color::Yellow,
        FitLevel::Marginal => Color::Rgb(255, 165, 0),
        FitLevel::TooTight => Color::Red,
    }
}

fn draw_system(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::DarkGray);
    let line = match &app.vm.system {
        SystemView::Loading => Line::from(Span::styled(
            "Detecting hardware...",
            Style::default().fg(Color::DarkGray),
        )),
        SystemView::Failed(reason) => Line::from(Span::styled(
            format!("Error loading system info: {}", reason),
            Style::default().fg(Color::Red),
        )),
        SystemView::Loaded(p) => Line::from(vec![
            Span::styled("CPU ", label),
            Span::raw(p.cpu.clone()),
            Span::styled("  RAM ", label),
            Span::raw(p.ram.clone()),
            Span::styled("  GPU ", label),
            Span::raw(p.gpu.clone()),
            Span::styled("  VRAM ", label),
            Span::raw(p.vram.clone()),
            Span::styled("  Ollama ", label),
            Span::raw(p.ollama.clone()),
        ]),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " llmfit ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_filters(frame: &mut Frame, area: Rect, app: &App) {
    let filters = &app.session.view.filters;
    let searching = app.input_mode == InputMode::Search;
    let active = Style::default().fg(Color::Cyan);
    let idle = Style::default().fg(Color::DarkGray);

    let search = if filters.search_text.is_empty() && !searching {
        Span::styled("/ to search", idle)
    } else {
        Span::raw(filters.search_text.clone())
    };
    let fit = filters.fit_level.map(|l| l.text()).unwrap_or("All");
    let category = filters.category.as_deref().unwrap_or("All");

    let line = Line::from(vec![
        search,
        Span::styled("   Fit: ", idle),
        Span::styled(fit, if filters.fit_level.is_some() { active } else { idle }),
        Span::styled("  Category: ", idle),
        Span::styled(
            category,
            if filters.category.is_some() { active } else { idle },
        ),
        Span::styled("  Installed only: ", idle),
        Span::styled(
            if filters.installed_only { "yes" } else { "no" },
            if filters.installed_only { active } else { idle },
        ),
    ]);

    let border = if searching { active } else { idle };
    let title = match app.vm.active_filters {
        0 => " Search ".to_string(),
        n => format!(" Search · Filters ({}) ", n),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if searching {
        let x = area.x + 1 + cursor_column(&filters.search_text, app.cursor_position);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Terminal column of a char-indexed cursor. Wide glyphs take two cells.
fn cursor_column(text: &str, cursor_position: usize) -> u16 {
    let prefix: String = text.chars().take(cursor_position).collect();
    Span::raw(prefix).width() as u16
}

fn draw_column_filters(frame: &mut Frame, area: Rect, app: &App) {
    let height = (FILTER_ROWS.len() as u16 + 2).min(area.height);
    let width = 36.min(area.width);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = FILTER_ROWS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = app.column_filter_label(i);
            let value_style = if value == "Any" || value == "All" {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            };
            let row_style = if i == app.filter_row {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!(" {:<10}", name)),
                Span::styled(value, value_style),
            ])
            .style(row_style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Column filters ");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn placeholder(frame: &mut Frame, area: Rect, text: String, style: Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Models ");
    let p = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(p, area);
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App) {
    let rows = match &app.vm.table {
        TableView::Loading => {
            let spin = SPINNER[(app.tick_count % 4) as usize];
            placeholder(
                frame,
                area,
                format!("{} Loading models...", spin),
                Style::default().fg(Color::DarkGray),
            );
            return;
        }
        TableView::Failed(reason) => {
            placeholder(
                frame,
                area,
                format!("Error loading models: {}\n\nPress r to retry", reason),
                Style::default().fg(Color::Red),
            );
            return;
        }
        TableView::Empty => {
            placeholder(
                frame,
                area,
                "No models match the current filters".to_string(),
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        TableView::Rows(rows) => rows,
    };

    let header = Row::new(app.vm.columns.iter().map(|c| {
        let style = if c.sorted.is_some() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(format!("{}{}", c.label, c.arrow())).style(style)
    }));

    let body: Vec<Row> = rows
        .iter()
        .map(|r| {
            let name_style = if r.selected {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(r.title.clone()).style(name_style),
                Cell::from(r.params.clone()),
                Cell::from(r.score.clone()),
                Cell::from(format!("{} {}", r.fit_icon, r.fit_label))
                    .style(Style::default().fg(fit_color(r.fit_level))),
                Cell::from(r.tps.clone()),
                Cell::from(r.quant.clone()),
                Cell::from(r.run_mode.clone()),
                Cell::from(r.utilization.clone()),
                Cell::from(r.context.clone()),
                Cell::from(if r.installed { "✓" } else { "" }),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(13),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(10),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Models "),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected_row));
    frame.render_stateful_widget(table, area, &mut state);
}

fn gauge(bar: &Bar, color: Color) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((bar.fill_pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{} {}", bar.label, bar.value))
}

fn draw_detail(frame: &mut Frame, area: Rect, d: &DetailView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", d.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // fields
            Constraint::Length(1), // utilization
            Constraint::Length(1),
            Constraint::Length(1), // sub-scores
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0), // notes
        ])
        .split(inner);

    let label = Style::default().fg(Color::DarkGray);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{:<12}", name), label), Span::raw(value)])
    };
    let fields = vec![
        Line::from(Span::styled(d.name.clone(), label)),
        field("Provider", d.provider.clone()),
        field("Params", d.params.clone()),
        Line::from(vec![
            Span::styled(format!("{:<12}", "Fit"), label),
            Span::styled(
                format!("{} {}", d.fit_icon, d.fit_label),
                Style::default().fg(fit_color(d.fit_level)),
            ),
            Span::raw(format!("  score {}", d.score)),
        ]),
        field("Run mode", format!("{} · {}", d.run_mode, d.quant)),
        field("Speed", d.tps.clone()),
        field("Context", d.context_tokens.clone()),
        field("Memory", d.memory.clone()),
        field("Use case", d.use_case.clone()),
    ];
    frame.render_widget(Paragraph::new(fields), parts[0]);

    frame.render_widget(gauge(&d.utilization, Color::Magenta), parts[1]);
    for (i, bar) in d.score_bars.iter().enumerate() {
        frame.render_widget(gauge(bar, Color::Blue), parts[3 + i]);
    }

    if !d.notes.is_empty() {
        let notes: Vec<Line> = d
            .notes
            .iter()
            .map(|n| Line::from(format!("• {}", n)))
            .collect();
        let p = Paragraph::new(notes)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).title(" Notes "));
        frame.render_widget(p, parts[7]);
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.vm.count_label),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    )];
    if app.is_refreshing() {
        let spin = SPINNER[(app.tick_count % 4) as usize];
        spans.push(Span::raw(format!(" {} refreshing", spin)));
    }
    let keys = match app.input_mode {
        InputMode::Search => "  Enter/Esc done  Ctrl-U clear",
        InputMode::Filters => "  j/k row  l/Enter next value  h/Backspace reset  Esc done",
        InputMode::Normal => {
            "  / search  Enter detail  Esc close  f fit  c category  i installed  F columns  s/S sort  x clear  r refresh  I installed refresh  q quit"
        }
    };
    spans.push(Span::styled(keys, Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
