//! Fuzzy picker
//!
//! Ratatui-based full-screen list with a filter line. Draws on stderr so
//! stdout stays clean for the listing itself (`iamlens s3 -j | jq ...`).

use std::io::{self, IsTerminal, Stderr, Write};

use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};

use iamlens_core::{Chooser, LensError, Result};

const PAGE: usize = 10;

/// Interactive chooser backed by the terminal
#[derive(Debug, Default)]
pub struct TerminalPicker;

impl TerminalPicker {
    pub fn new() -> Self {
        Self
    }
}

impl Chooser for TerminalPicker {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        if !self.is_available() {
            return Err(LensError::DependencyMissing(format!(
                "cannot prompt for {} without a terminal",
                prompt.to_lowercase()
            )));
        }
        if options.is_empty() {
            return Ok(None);
        }

        let screen = ScreenGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;

        let mut state = PickerState::new(prompt, options);
        let result = run_event_loop(&mut terminal, &mut state);
        drop(terminal);
        screen.finish()?;

        let choice = result?;
        tracing::debug!(prompt, choice = ?choice.map(|i| options[i].as_str()), "picker closed");
        Ok(choice)
    }

    fn is_available(&self) -> bool {
        io::stdin().is_terminal() && io::stderr().is_terminal()
    }
}

/// Raw mode plus alternate screen on stderr. Dropping the guard restores
/// the terminal, so every early return leaves it usable.
struct ScreenGuard {
    active: bool,
}

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = ScreenGuard { active: true };
        let mut stderr = io::stderr();
        execute!(stderr, EnterAlternateScreen)?;
        Ok(guard)
    }

    /// Restore now and report failures
    fn finish(mut self) -> io::Result<()> {
        self.active = false;
        restore(&mut io::stderr())
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = restore(&mut io::stderr());
        }
    }
}

/// Every step runs even if an earlier one fails; the first error wins
fn restore<W: Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(out, LeaveAlternateScreen, Show);
    raw.and(screen)
}

// ---------------------------------------------------------------------------
// Filtering state
// ---------------------------------------------------------------------------

struct PickerState<'a> {
    prompt: &'a str,
    options: &'a [String],
    query: String,
    /// Indices into `options`, best match first
    filtered: Vec<usize>,
    list_state: ListState,
}

impl<'a> PickerState<'a> {
    fn new(prompt: &'a str, options: &'a [String]) -> Self {
        let mut state = Self {
            prompt,
            options,
            query: String::new(),
            filtered: Vec::new(),
            list_state: ListState::default(),
        };
        state.update_filter();
        state
    }

    fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.update_filter();
    }

    fn pop_char(&mut self) {
        self.query.pop();
        self.update_filter();
    }

    fn clear(&mut self) {
        self.query.clear();
        self.update_filter();
    }

    fn update_filter(&mut self) {
        let mut scored: Vec<(usize, u32)> = self
            .options
            .iter()
            .enumerate()
            .filter_map(|(i, opt)| match_score(opt, &self.query).map(|s| (i, s)))
            .collect();
        // Stable: ties keep the original option order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        self.filtered = scored.into_iter().map(|(i, _)| i).collect();

        self.list_state
            .select(if self.filtered.is_empty() { None } else { Some(0) });
    }

    fn move_by(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let last = self.filtered.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(last)
        };
        self.list_state.select(Some(next));
    }

    /// Index into the original options of the highlighted entry
    fn current(&self) -> Option<usize> {
        self.list_state
            .selected()
            .and_then(|i| self.filtered.get(i).copied())
    }
}

/// Score `option` against `query` (higher = better), `None` if it doesn't match.
///
/// Case-insensitive. Prefix beats word start beats substring beats a plain
/// subsequence, so `gobj` still finds `GetObject`.
fn match_score(option: &str, query: &str) -> Option<u32> {
    if query.is_empty() {
        return Some(100);
    }
    let query = query.to_lowercase();
    let option_lower = option.to_lowercase();

    if option_lower.starts_with(&query) {
        return Some(100);
    }
    if word_starts(option).any(|i| {
        option_lower
            .get(i..)
            .map_or(false, |rest| rest.starts_with(&query))
    }) {
        return Some(75);
    }
    if option_lower.contains(&query) {
        return Some(50);
    }

    let mut chars = option_lower.chars();
    if query.chars().all(|q| chars.any(|c| c == q)) {
        return Some(25);
    }
    None
}

/// Byte offsets where a word starts: after a separator or at a lower→upper case change
fn word_starts(s: &str) -> impl Iterator<Item = usize> + '_ {
    let mut prev: Option<char> = None;
    s.char_indices().filter_map(move |(i, c)| {
        let start = match prev {
            None => false,
            Some(p) => {
                (!p.is_alphanumeric() && c.is_alphanumeric())
                    || (p.is_lowercase() && c.is_uppercase())
            }
        };
        prev = Some(c);
        start.then_some(i)
    })
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

enum Step {
    Continue,
    Done(Option<usize>),
}

fn handle_key(state: &mut PickerState<'_>, key: KeyEvent) -> Step {
    if key.kind != KeyEventKind::Press {
        return Step::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Step::Done(None),
        KeyCode::Char('c') if ctrl => return Step::Done(None),
        KeyCode::Char('u') if ctrl => state.clear(),
        KeyCode::Char('p') if ctrl => state.move_by(-1),
        KeyCode::Char('n') if ctrl => state.move_by(1),
        KeyCode::Enter => {
            if let Some(choice) = state.current() {
                return Step::Done(Some(choice));
            }
        }
        KeyCode::Char(c) => state.push_char(c),
        KeyCode::Backspace => state.pop_char(),
        KeyCode::Up => state.move_by(-1),
        KeyCode::Down => state.move_by(1),
        KeyCode::PageUp => state.move_by(-(PAGE as isize)),
        KeyCode::PageDown => state.move_by(PAGE as isize),
        _ => {}
    }
    Step::Continue
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut PickerState<'_>,
) -> Result<Option<usize>> {
    loop {
        terminal.draw(|f| draw_ui(f, state))?;

        if let Event::Key(key) = event::read()? {
            if let Step::Done(choice) = handle_key(state, key) {
                return Ok(choice);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw_ui(f: &mut ratatui::Frame, state: &mut PickerState<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // filter input
            Constraint::Min(3),    // options
            Constraint::Length(1), // status bar
        ])
        .split(f.size());

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::styled(state.query.as_str(), Style::default().fg(Color::White)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", state.prompt),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(input, chunks[0]);

    let items: Vec<ListItem> = state
        .filtered
        .iter()
        .map(|&i| ListItem::new(state.options[i].as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}/{} ", state.filtered.len(), state.options.len()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::styled(" move ", Style::default().fg(Color::DarkGray)),
        Span::styled("ENTER", Style::default().fg(Color::Yellow)),
        Span::styled(" select ", Style::default().fg(Color::DarkGray)),
        Span::styled("ESC", Style::default().fg(Color::Yellow)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(status, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_match_score_ranking() {
        assert_eq!(match_score("GetObject", ""), Some(100));
        assert_eq!(match_score("GetObject", "get"), Some(100));
        assert_eq!(match_score("GetObject", "obj"), Some(75));
        assert_eq!(match_score("access-point", "point"), Some(75));
        assert_eq!(match_score("GetObject", "tob"), Some(50));
        assert_eq!(match_score("GetObject", "gobj"), Some(25));
        assert_eq!(match_score("GetObject", "xyz"), None);
    }

    #[test]
    fn test_filter_orders_by_score() {
        let opts = options(&["[ All ]", "accesspoint", "bucket", "object"]);
        let mut state = PickerState::new("Resource type", &opts);
        assert_eq!(state.filtered, vec![0, 1, 2, 3]);

        state.push_char('o');
        state.push_char('b');
        // only "object" still matches
        assert_eq!(state.filtered.first(), Some(&3));
        assert_eq!(state.current(), Some(3));

        state.pop_char();
        state.pop_char();
        assert_eq!(state.filtered.len(), 4);
    }

    #[test]
    fn test_navigation_clamps() {
        let opts = options(&["a", "b", "c"]);
        let mut state = PickerState::new("Pick", &opts);
        state.move_by(-1);
        assert_eq!(state.current(), Some(0));
        state.move_by(PAGE as isize);
        assert_eq!(state.current(), Some(2));
        state.move_by(-1);
        assert_eq!(state.current(), Some(1));
    }

    #[test]
    fn test_keys() {
        let opts = options(&["s3", "ec2", "sqs"]);
        let mut state = PickerState::new("Service", &opts);

        assert!(matches!(handle_key(&mut state, press(KeyCode::Char('e'))), Step::Continue));
        assert!(matches!(handle_key(&mut state, press(KeyCode::Enter)), Step::Done(Some(1))));

        assert!(matches!(handle_key(&mut state, press(KeyCode::Esc)), Step::Done(None)));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(handle_key(&mut state, ctrl_c), Step::Done(None)));
    }

    #[test]
    fn test_restore_leaves_screen_and_shows_cursor() {
        let mut out = Vec::new();
        restore(&mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }

    #[test]
    fn test_enter_with_no_matches_keeps_going() {
        let opts = options(&["s3", "ec2"]);
        let mut state = PickerState::new("Service", &opts);
        state.push_char('z');
        assert!(state.current().is_none());
        assert!(matches!(handle_key(&mut state, press(KeyCode::Enter)), Step::Continue));
    }
}
