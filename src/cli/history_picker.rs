use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::debug;

use crate::app::ClipDrop;
use crate::menu::MenuEntry;

pub struct HistoryPicker {
    app: Arc<ClipDrop>,
    entries: Vec<MenuEntry>,
    selected_index: usize,
    search_term: String,
}

impl HistoryPicker {
    pub fn new(app: Arc<ClipDrop>) -> Self {
        Self {
            app,
            entries: Vec::new(),
            selected_index: 0,
            search_term: String::new(),
        }
    }

    pub async fn show(&mut self) -> Result<()> {
        self.entries = self.app.menu().await;

        if self.entries.is_empty() {
            println!("No clips saved");
            return Ok(());
        }

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let picked = self.run_picker();

        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;

        // Copy only after the terminal is restored so the report is visible
        if let Some(id) = picked? {
            debug!("Picked clip {}", id);
            match self.app.copy_clip(id).await? {
                Some(outcome) => super::report_copy(&outcome),
                None => println!("Clip {} is gone", id),
            }
        }
        Ok(())
    }

    fn run_picker(&mut self) -> Result<Option<i64>> {
        loop {
            self.draw()?;

            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                match self.handle_key_event(key_event) {
                    PickerAction::Exit => return Ok(None),
                    PickerAction::Select => {
                        let picked = self
                            .filtered_entries()
                            .get(self.selected_index)
                            .map(|entry| entry.id);
                        return Ok(picked);
                    }
                    PickerAction::Continue => {}
                }
            }
        }
    }

    fn draw(&self) -> Result<()> {
        let mut out = io::stdout();
        write!(out, "\x1B[2J\x1B[H")?; // Clear screen and move cursor to top

        write!(out, "ClipDrop\r\n")?;
        write!(out, "========\r\n")?;
        write!(out, "Use ↑/↓ to navigate, Enter to copy, Esc to exit\r\n")?;

        if !self.search_term.is_empty() {
            write!(out, "Search: {}\r\n", self.search_term)?;
        }
        write!(out, "\r\n")?;

        for (i, entry) in self.filtered_entries().iter().enumerate() {
            let prefix = if i == self.selected_index { "► " } else { "  " };
            write!(out, "{}{}\r\n", prefix, entry.label)?;
        }

        out.flush()?;
        Ok(())
    }

    fn filtered_entries(&self) -> Vec<&MenuEntry> {
        if self.search_term.is_empty() {
            return self.entries.iter().collect();
        }

        let needle = self.search_term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.label.to_lowercase().contains(&needle))
            .collect()
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> PickerAction {
        match key_event.code {
            KeyCode::Esc => PickerAction::Exit,
            KeyCode::Enter => PickerAction::Select,
            KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
                PickerAction::Continue
            }
            KeyCode::Down => {
                let filtered_count = self.filtered_entries().len();
                if self.selected_index < filtered_count.saturating_sub(1) {
                    self.selected_index += 1;
                }
                PickerAction::Continue
            }
            KeyCode::Char(c) => {
                self.search_term.push(c);
                self.selected_index = 0; // Reset selection when searching
                PickerAction::Continue
            }
            KeyCode::Backspace => {
                self.search_term.pop();
                self.selected_index = 0;
                PickerAction::Continue
            }
            _ => PickerAction::Continue,
        }
    }
}

enum PickerAction {
    Continue,
    Select,
    Exit,
}

impl Drop for HistoryPicker {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}
