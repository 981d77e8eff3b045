use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui_app::{App, InputMode};

/// Poll for terminal input for up to one tick and apply it.
pub fn handle_events(app: &mut App) -> std::io::Result<()> {
    app.tick();

    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            // Only handle key press events (not release)
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_mode(app, key),
                InputMode::Search => handle_search_mode(app, key),
                InputMode::Filters => handle_filters_mode(app, key),
            }
        }
    }
    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home | KeyCode::Char('g') => app.home(),
        KeyCode::End | KeyCode::Char('G') => app.end(),

        // Detail
        KeyCode::Enter => app.select_current(),
        KeyCode::Esc => app.close_detail(),

        // Search
        KeyCode::Char('/') => app.enter_search(),

        // Filters
        KeyCode::Char('f') => app.cycle_fit_filter(),
        KeyCode::Char('c') => app.cycle_category(),
        KeyCode::Char('i') => app.toggle_installed_only(),
        KeyCode::Char('x') => app.clear_filters(),
        KeyCode::Char('F') => app.enter_column_filters(),

        // Sort
        KeyCode::Char('s') | KeyCode::Right => app.sort_next_column(),
        KeyCode::Left => app.sort_prev_column(),
        KeyCode::Char('S') => app.flip_sort(),

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('I') => app.refresh_installed(),

        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.exit_search(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Delete => app.search_delete(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_search()
        }
        KeyCode::Left => app.cursor_position = app.cursor_position.saturating_sub(1),
        KeyCode::Right => {
            let len = app.session.view.filters.search_text.chars().count();
            app.cursor_position = (app.cursor_position + 1).min(len);
        }
        KeyCode::Char(c) => app.search_input(c),
        _ => {}
    }
}

fn handle_filters_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('F') | KeyCode::Char('q') => app.exit_column_filters(),
        KeyCode::Up | KeyCode::Char('k') => app.filter_row_up(),
        KeyCode::Down | KeyCode::Char('j') => app.filter_row_down(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => {
            app.adjust_column_filter()
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Delete => {
            app.reset_column_filter()
        }
        _ => {}
    }
}
