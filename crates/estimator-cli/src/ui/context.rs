//! Terminal detection and the output settings derived from it.
//!
//! [`Terminal::detect`] reads the process environment once; [`UiContext::new`]
//! combines that snapshot with the global output flags. Keeping the two apart
//! lets the rules be tested without a real terminal.

use std::io::IsTerminal;

use super::mode::OutputMode;

/// Columns assumed when neither `COLUMNS` nor the tty reports a width.
const DEFAULT_WIDTH: usize = 80;

/// Narrowest column used for wrapped scope text.
const MIN_TEXT_WIDTH: usize = 20;

/// The global `--json`, `--format`, `--no-color` and `--ascii` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFlags<'a> {
    pub json: bool,
    pub format: Option<&'a str>,
    pub no_color: bool,
    pub ascii: bool,
}

/// Snapshot of the terminal the CLI is running in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal {
    pub stdout_tty: bool,
    pub stdin_tty: bool,
    /// `TERM=dumb`
    pub dumb: bool,
    /// `NO_COLOR` is set
    pub no_color: bool,
    pub columns: Option<usize>,
}

impl Terminal {
    pub fn detect() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            stdin_tty: std::io::stdin().is_terminal(),
            dumb: std::env::var("TERM").is_ok_and(|term| term == "dumb"),
            no_color: std::env::var_os("NO_COLOR").is_some(),
            columns: columns_from_env().or_else(tty_columns),
        }
    }
}

/// Resolved output settings handed to every renderer.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// stdout is a terminal
    pub is_tty: bool,
    /// Both stdin and stdout are terminals, so confirmations can be asked
    pub interactive: bool,
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    pub fn new(flags: OutputFlags<'_>, terminal: &Terminal) -> Self {
        let mode = OutputMode::resolve(
            flags.json,
            flags.format,
            terminal.stdout_tty,
            terminal.dumb,
        );
        Self {
            is_tty: terminal.stdout_tty,
            interactive: terminal.stdout_tty && terminal.stdin_tty,
            color: terminal.stdout_tty && !terminal.dumb && !terminal.no_color && !flags.no_color,
            unicode: !flags.ascii,
            width: terminal.columns.unwrap_or(DEFAULT_WIDTH),
            mode,
        }
    }

    /// Resolve against the current process's terminal.
    pub fn from_flags(flags: OutputFlags<'_>) -> Self {
        Self::new(flags, &Terminal::detect())
    }

    /// Whether a destructive command may ask for confirmation instead of
    /// requiring `--force`.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Spinners only run on a pretty terminal; piped and JSON output stay clean.
    pub fn allows_animation(&self) -> bool {
        self.is_tty && self.mode.is_pretty()
    }

    /// Width for wrapped scope text, leaving room for a four-column indent.
    pub fn text_width(&self) -> usize {
        self.width.saturating_sub(4).max(MIN_TEXT_WIDTH)
    }
}

fn columns_from_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.trim().parse::<usize>().ok())
        .filter(|&cols| cols > 0)
}

#[cfg(unix)]
fn tty_columns() -> Option<usize> {
    use std::mem::MaybeUninit;

    let mut size = MaybeUninit::<libc::winsize>::uninit();
    // SAFETY: TIOCGWINSZ only writes into the provided winsize buffer
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, size.as_mut_ptr()) };
    if result != 0 {
        return None;
    }
    // SAFETY: ioctl returned success, so the buffer is initialized
    let size = unsafe { size.assume_init() };
    (size.ws_col > 0).then_some(size.ws_col as usize)
}

#[cfg(not(unix))]
fn tty_columns() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty() -> Terminal {
        Terminal {
            stdout_tty: true,
            stdin_tty: true,
            columns: Some(120),
            ..Default::default()
        }
    }

    #[test]
    fn test_tty_is_pretty_colored_and_interactive() {
        let ctx = UiContext::new(OutputFlags::default(), &tty());
        assert_eq!(ctx.mode, OutputMode::Pretty);
        assert!(ctx.color);
        assert!(ctx.unicode);
        assert!(ctx.is_interactive());
        assert!(ctx.allows_animation());
        assert_eq!(ctx.width, 120);
    }

    #[test]
    fn test_piped_output_is_plain_without_prompts() {
        let ctx = UiContext::new(OutputFlags::default(), &Terminal::default());
        assert_eq!(ctx.mode, OutputMode::Plain);
        assert!(!ctx.color);
        assert!(!ctx.is_interactive());
        assert!(!ctx.allows_animation());
        assert_eq!(ctx.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_json_on_tty_has_no_spinner() {
        let flags = OutputFlags {
            json: true,
            ..Default::default()
        };
        let ctx = UiContext::new(flags, &tty());
        assert_eq!(ctx.mode, OutputMode::Json);
        assert!(!ctx.allows_animation());
    }

    #[test]
    fn test_color_switches() {
        let flags = OutputFlags {
            no_color: true,
            ascii: true,
            ..Default::default()
        };
        let ctx = UiContext::new(flags, &tty());
        assert!(!ctx.color);
        assert!(!ctx.unicode);

        let env_off = Terminal {
            no_color: true,
            ..tty()
        };
        assert!(!UiContext::new(OutputFlags::default(), &env_off).color);

        let dumb = Terminal { dumb: true, ..tty() };
        let ctx = UiContext::new(OutputFlags::default(), &dumb);
        assert!(!ctx.color);
        assert_eq!(ctx.mode, OutputMode::Plain);
    }

    #[test]
    fn test_stdin_redirect_disables_prompts() {
        let terminal = Terminal {
            stdin_tty: false,
            ..tty()
        };
        assert!(!UiContext::new(OutputFlags::default(), &terminal).is_interactive());
    }

    #[test]
    fn test_text_width_has_floor() {
        let narrow = Terminal {
            columns: Some(10),
            ..tty()
        };
        assert_eq!(UiContext::new(OutputFlags::default(), &narrow).text_width(), MIN_TEXT_WIDTH);
        assert_eq!(UiContext::new(OutputFlags::default(), &tty()).text_width(), 116);
    }
}
