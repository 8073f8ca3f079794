use std::{io, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use onfs_core::{
    AssetCatalog, AssetCatalogEntry, AssetSelection, EditionTag, LoadedCar, LoadedTrack,
    RenderSession,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::console;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Editions,
    Tracks,
    Cars,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Editions => Pane::Tracks,
            Pane::Tracks => Pane::Cars,
            Pane::Cars => Pane::Editions,
        }
    }

    fn previous(self) -> Self {
        match self {
            Pane::Editions => Pane::Cars,
            Pane::Tracks => Pane::Editions,
            Pane::Cars => Pane::Tracks,
        }
    }
}

/// Terminal stand-in for the renderer: shows what is loaded and lets the
/// operator pick the next track and car from the catalog.
pub struct TerminalSession {
    xres: u32,
    yres: u32,
    theme: Theme,
}

impl TerminalSession {
    pub fn new(xres: u32, yres: u32) -> Self {
        Self {
            xres,
            yres,
            theme: Theme::default(),
        }
    }

    fn event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        state: &mut UiState<'_>,
    ) -> Result<AssetSelection> {
        loop {
            terminal.draw(|frame| self.draw(frame, state))?;
            if let Some(selection) = state.outcome.take() {
                return Ok(selection);
            }

            if !event::poll(TICK_RATE).context("failed to poll terminal events")? {
                continue;
            }
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    state.handle_key(key);
                }
            }
        }
    }

    fn draw(&self, frame: &mut Frame, state: &mut UiState<'_>) {
        let size = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(size);
        state.list_height = rows[1].height.saturating_sub(2) as usize;

        self.render_header(frame, rows[0], state);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(35),
                Constraint::Percentage(35),
            ])
            .split(rows[1]);

        let editions: Vec<String> = state
            .catalog
            .entries
            .iter()
            .map(|entry| {
                format!(
                    "{} ({}t/{}c)",
                    entry.tag.title(),
                    entry.tracks.len(),
                    entry.cars.len()
                )
            })
            .collect();
        self.render_list(
            frame,
            columns[0],
            "Editions",
            &editions,
            state.edition_cursor,
            state.pane == Pane::Editions,
            None,
        );

        let entry = state.current_entry();
        let edition = entry.map(|entry| entry.tag);
        let pending_in = |pending: &Option<(EditionTag, String)>| {
            pending
                .as_ref()
                .filter(|(tag, _)| Some(*tag) == edition)
                .map(|(_, name)| name.clone())
        };
        let pending_track = pending_in(&state.pending_track);
        let pending_car = pending_in(&state.pending_car);
        let (tracks, cars) = entry
            .map(|entry| (entry.tracks.as_slice(), entry.cars.as_slice()))
            .unwrap_or_default();

        self.render_list(
            frame,
            columns[1],
            "Tracks",
            tracks,
            state.track_cursor,
            state.pane == Pane::Tracks,
            pending_track.as_deref(),
        );
        self.render_list(
            frame,
            columns[2],
            "Cars",
            cars,
            state.car_cursor,
            state.pane == Pane::Cars,
            pending_car.as_deref(),
        );

        self.render_status(frame, rows[2], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &UiState<'_>) {
        let line = Line::from(vec![
            Span::styled(
                "OpenNFS ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}×{}  ", self.xres, self.yres),
                Style::default().fg(self.theme.muted),
            ),
            Span::raw(format!(
                "loaded track {}/{} · car {}/{}",
                state.loaded_track.0, state.loaded_track.1, state.loaded_car.0, state.loaded_car.1
            )),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        names: &[String],
        cursor: usize,
        focused: bool,
        pending: Option<&str>,
    ) {
        let items: Vec<ListItem> = if names.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "  (none)",
                Style::default().fg(self.theme.muted),
            )))]
        } else {
            names
                .iter()
                .map(|name| {
                    if pending == Some(name.as_str()) {
                        ListItem::new(Line::from(Span::styled(
                            format!("● {name}"),
                            Style::default().fg(self.theme.success),
                        )))
                    } else {
                        ListItem::new(Line::from(format!("  {name}")))
                    }
                })
                .collect()
        };

        let border_style = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title.to_string()),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.primary_fg),
            );

        let mut list_state = ListState::default();
        if !names.is_empty() {
            list_state.select(Some(cursor.min(names.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, state: &UiState<'_>) {
        let pending = match (&state.pending_track, &state.pending_car) {
            (Some((track_tag, track)), Some((car_tag, car))) => {
                format!("next: {track_tag}/{track} + {car_tag}/{car}")
            }
            _ => "next: choose a track and a car".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(state.status.clone(), Style::default().fg(self.theme.warning)),
            Span::raw("  "),
            Span::raw(pending),
            Span::styled(
                "  [tab] pane  [enter] pick  [p] load  [q] quit",
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

impl RenderSession<LoadedTrack, LoadedCar> for TerminalSession {
    fn render(
        &mut self,
        track: &LoadedTrack,
        car: &LoadedCar,
        catalog: &AssetCatalog,
    ) -> Result<AssetSelection> {
        info!(track = %track.path.display(), car = %car.path.display(), "Session started");
        let mut state = UiState::new(catalog, track, car);

        let _console = console::suspend();
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let outcome = self.event_loop(&mut terminal, &mut state);
        restore_terminal(&mut terminal)?;
        outcome
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

struct UiState<'a> {
    catalog: &'a AssetCatalog,
    loaded_track: (EditionTag, String),
    loaded_car: (EditionTag, String),
    pane: Pane,
    edition_cursor: usize,
    track_cursor: usize,
    car_cursor: usize,
    list_height: usize,
    pending_track: Option<(EditionTag, String)>,
    pending_car: Option<(EditionTag, String)>,
    status: String,
    outcome: Option<AssetSelection>,
}

impl<'a> UiState<'a> {
    fn new(catalog: &'a AssetCatalog, track: &LoadedTrack, car: &LoadedCar) -> Self {
        let mut state = Self {
            catalog,
            loaded_track: (track.tag, track.name.clone()),
            loaded_car: (car.tag, car.name.clone()),
            pane: Pane::Editions,
            edition_cursor: 0,
            track_cursor: 0,
            car_cursor: 0,
            list_height: 1,
            pending_track: Some((track.tag, track.name.clone())),
            pending_car: Some((car.tag, car.name.clone())),
            status: "Ready".to_string(),
            outcome: None,
        };
        if let Some(index) = catalog
            .entries
            .iter()
            .position(|entry| entry.tag == track.tag)
        {
            state.edition_cursor = index;
            state.track_cursor = catalog.entries[index]
                .tracks
                .iter()
                .position(|name| *name == track.name)
                .unwrap_or(0);
        }
        state
    }

    fn current_entry(&self) -> Option<&'a AssetCatalogEntry> {
        self.catalog.entries.get(self.edition_cursor)
    }

    fn pane_len(&self) -> usize {
        match self.pane {
            Pane::Editions => self.catalog.entries.len(),
            Pane::Tracks => self.current_entry().map_or(0, |entry| entry.tracks.len()),
            Pane::Cars => self.current_entry().map_or(0, |entry| entry.cars.len()),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.pane {
            Pane::Editions => &mut self.edition_cursor,
            Pane::Tracks => &mut self.track_cursor,
            Pane::Cars => &mut self.car_cursor,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.pane_len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        let next = (*cursor as isize + delta).clamp(0, len as isize - 1);
        *cursor = next as usize;
        if self.pane == Pane::Editions {
            self.track_cursor = 0;
            self.car_cursor = 0;
        }
    }

    fn move_to_end(&mut self) {
        let len = self.pane_len() as isize;
        self.move_cursor(len);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        debug!(?key, "key pressed");
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.outcome = Some(AssetSelection::terminate());
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.outcome = Some(AssetSelection::terminate());
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.pane = self.pane.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.pane = self.pane.previous()
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.move_cursor(-(self.pane_len() as isize)),
            KeyCode::Char('G') | KeyCode::End => self.move_to_end(),
            KeyCode::PageDown => self.move_cursor(self.list_height.max(1) as isize),
            KeyCode::PageUp => self.move_cursor(-(self.list_height.max(1) as isize)),
            KeyCode::Enter | KeyCode::Char(' ') => self.pick(),
            KeyCode::Char('p') | KeyCode::Char('P') => self.load(),
            _ => {}
        }
    }

    fn pick(&mut self) {
        let Some(entry) = self.current_entry() else {
            self.status = "No editions installed".to_string();
            return;
        };
        match self.pane {
            Pane::Editions => self.pane = Pane::Tracks,
            Pane::Tracks => {
                if let Some(track) = entry.tracks.get(self.track_cursor) {
                    self.status = format!("Track {}/{} picked", entry.tag, track);
                    self.pending_track = Some((entry.tag, track.clone()));
                }
            }
            Pane::Cars => {
                if let Some(car) = entry.cars.get(self.car_cursor) {
                    self.status = format!("Car {}/{} picked", entry.tag, car);
                    self.pending_car = Some((entry.tag, car.clone()));
                }
            }
        }
    }

    fn load(&mut self) {
        match (&self.pending_track, &self.pending_car) {
            (Some((track_tag, track)), Some((car_tag, car))) => {
                self.outcome = Some(AssetSelection {
                    track_tag: *track_tag,
                    track: track.clone(),
                    car_tag: *car_tag,
                    car: car.clone(),
                });
            }
            _ => self.status = "Pick a track and a car first".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn catalog() -> AssetCatalog {
        let mut nfs3 = AssetCatalogEntry::new(EditionTag::Nfs3, "/res/NFS_3");
        nfs3.tracks = vec!["trk000".to_string(), "trk001".to_string()];
        nfs3.cars = vec!["diab".to_string(), "traffic/pursuit/COP1".to_string()];
        let mut nfs4 = AssetCatalogEntry::new(EditionTag::Nfs4, "/res/NFS_4");
        nfs4.tracks = vec!["TR010".to_string()];
        nfs4.cars = vec!["F355".to_string()];
        AssetCatalog {
            entries: vec![nfs3, nfs4],
            has_lanes: true,
            has_misc: true,
            has_sfx: true,
            ignored: Vec::new(),
        }
    }

    fn loaded() -> (LoadedTrack, LoadedCar) {
        let now = Utc::now();
        (
            LoadedTrack {
                tag: EditionTag::Nfs3,
                name: "trk001".to_string(),
                path: PathBuf::from("/res/NFS_3/gamedata/tracks/trk001"),
                loaded_at: now,
            },
            LoadedCar {
                tag: EditionTag::Nfs3,
                name: "diab".to_string(),
                path: PathBuf::from("/res/NFS_3/gamedata/carmodel/diab"),
                loaded_at: now,
            },
        )
    }

    fn press(state: &mut UiState<'_>, code: KeyCode) {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn starts_on_the_loaded_track() {
        let catalog = catalog();
        let (track, car) = loaded();
        let state = UiState::new(&catalog, &track, &car);
        assert_eq!(state.edition_cursor, 0);
        assert_eq!(state.track_cursor, 1);
        assert_eq!(state.pending_car, Some((EditionTag::Nfs3, "diab".to_string())));
    }

    #[test]
    fn picks_across_editions_and_loads() {
        let catalog = catalog();
        let (track, car) = loaded();
        let mut state = UiState::new(&catalog, &track, &car);

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.pane, Pane::Tracks);
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Char('p'));

        assert_eq!(
            state.outcome,
            Some(AssetSelection {
                track_tag: EditionTag::Nfs4,
                track: "TR010".to_string(),
                car_tag: EditionTag::Nfs4,
                car: "F355".to_string(),
            })
        );
    }

    #[test]
    fn quitting_returns_the_sentinel() {
        let catalog = catalog();
        let (track, car) = loaded();
        let mut state = UiState::new(&catalog, &track, &car);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.outcome.as_ref().is_some_and(AssetSelection::is_terminal));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let catalog = catalog();
        let (track, car) = loaded();
        let mut state = UiState::new(&catalog, &track, &car);
        state.pane = Pane::Cars;
        press(&mut state, KeyCode::End);
        assert_eq!(state.car_cursor, 1);
        press(&mut state, KeyCode::Down);
        assert_eq!(state.car_cursor, 1);
        press(&mut state, KeyCode::Home);
        assert_eq!(state.car_cursor, 0);
    }
}
