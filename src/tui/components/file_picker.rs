//! # File Picker Overlay
//!
//! The hidden file-selection element behind the "Attach" button. Opened with
//! Ctrl+O or a click on "Attach", dismissed with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `FilePickerState` lives in `TuiState`
//! - `FilePicker` is created each frame with borrowed state
//!
//! The selection survives closing the overlay. It is only cleared when the
//! dispatch it started has settled (`FilePickerState::clear`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::submission::Attachment;
use crate::tui::event::TuiEvent;

/// One row in the directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
}

impl PickerEntry {
    fn to_attachment(&self) -> Attachment {
        Attachment {
            path: self.path.clone(),
            name: self.name.clone(),
            size: self.size,
        }
    }
}

/// Events emitted by the picker.
#[derive(Debug, Clone, PartialEq)]
pub enum FilePickerEvent {
    /// The selection was confirmed. Carries the full selection.
    Changed(Vec<Attachment>),
    Dismiss,
}

/// Persistent state for the picker overlay.
#[derive(Default)]
pub struct FilePickerState {
    pub visible: bool,
    pub dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    /// Files toggled in the current directory listing or confirmed earlier.
    pub selection: Vec<Attachment>,
    pub list_state: ListState,
}

impl FilePickerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open at the last visited directory, or the working directory.
    pub fn open(&mut self) {
        let dir = if self.dir.as_os_str().is_empty() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            self.dir.clone()
        };
        self.open_at(&dir);
    }

    pub fn open_at(&mut self, dir: &Path) {
        let entries = match read_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to list {}: {}", dir.display(), e);
                Vec::new()
            }
        };
        self.set_entries(dir.to_path_buf(), entries);
        self.visible = true;
    }

    /// Replace the listing without touching the filesystem.
    pub fn set_entries(&mut self, dir: PathBuf, entries: Vec<PickerEntry>) {
        self.dir = dir;
        self.entries = entries;
        self.list_state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    /// Reset after the dispatch settled: the chosen files are not retained.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.visible = false;
    }

    fn highlighted(&self) -> Option<&PickerEntry> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    fn is_selected(&self, entry: &PickerEntry) -> bool {
        self.selection.iter().any(|a| a.path == entry.path)
    }

    fn toggle(&mut self, entry: PickerEntry) {
        if self.is_selected(&entry) {
            self.selection.retain(|a| a.path != entry.path);
        } else {
            self.selection.push(entry.to_attachment());
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<FilePickerEvent> {
        match event {
            TuiEvent::Escape => {
                self.visible = false;
                Some(FilePickerEvent::Dismiss)
            }
            TuiEvent::CursorUp => {
                if let Some(i) = self.list_state.selected() {
                    self.list_state.select(Some(i.saturating_sub(1)));
                }
                None
            }
            TuiEvent::CursorDown => {
                if let Some(i) = self.list_state.selected() {
                    let last = self.entries.len().saturating_sub(1);
                    self.list_state.select(Some((i + 1).min(last)));
                }
                None
            }
            TuiEvent::InputChar(' ') => {
                if let Some(entry) = self.highlighted().filter(|e| !e.is_dir).cloned() {
                    self.toggle(entry);
                }
                None
            }
            TuiEvent::Backspace => {
                if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
                    self.open_at(&parent);
                }
                None
            }
            TuiEvent::Submit => {
                let entry = self.highlighted().cloned()?;
                if entry.is_dir {
                    self.open_at(&entry.path);
                    return None;
                }
                if self.selection.is_empty() {
                    self.selection.push(entry.to_attachment());
                }
                self.visible = false;
                Some(FilePickerEvent::Changed(self.selection.clone()))
            }
            _ => None,
        }
    }
}

/// Directories first, then files, each sorted by name.
fn read_entries(dir: &Path) -> io::Result<Vec<PickerEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        entries.push(PickerEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Transient render wrapper for the picker overlay.
pub struct FilePicker<'a> {
    state: &'a mut FilePickerState,
}

impl<'a> FilePicker<'a> {
    pub fn new(state: &'a mut FilePickerState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 70, area);
        frame.render_widget(Clear, overlay);

        let help_text = " Space Toggle  Enter Open/Attach  Backspace Up  Esc Close ";
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Attach: {} ", self.state.dir.display()))
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.state.entries.is_empty() {
            let empty = Paragraph::new("Empty directory.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .entries
            .iter()
            .map(|entry| {
                let marker = if entry.is_dir {
                    "   "
                } else if self.state.is_selected(entry) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let (name, style) = if entry.is_dir {
                    (format!("{}/", entry.name), Style::default().fg(Color::Cyan))
                } else {
                    (entry.name.clone(), Style::default().fg(Color::Gray))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, style),
                    Span::raw(" "),
                    Span::styled(name, style),
                ]))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );

        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
