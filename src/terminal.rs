//! In-game terminal
//!
//! A line buffer that doubles as the engine's [`TextSink`], plus a small
//! command shell over a read-only virtual file system. Commands that unfold
//! over time return [`Scheduled`] cues instead of owning timers; the host
//! feeds due lines back through [`TextSink::write_line`].

use std::collections::VecDeque;

use rand::Rng;

use crate::cues::{Cue, Scheduled};
use crate::platform::{LineStyle, TextSink};

/// Output lines kept before the oldest scroll away
pub const MAX_LINES: usize = 200;
/// Submitted commands remembered for arrow-key recall
pub const MAX_HISTORY: usize = 100;

pub const PROMPT: &str = "root@cyberspace:~/system$ ";

const GREETING: [&str; 3] = [
    "=== CyberNET Terminal v3.7.9 ===",
    "Secure connection established.",
    "Type 'help' for available commands.",
];

const HELP: &str = "Available commands: help, clear, echo [message], date, ls, cat [file], hack, connect, decrypt, status, matrix, glitch";

const HACK_STEP_MS: f64 = 300.0;
const DECRYPT_STEP_MS: f64 = 400.0;
const HACK_GLITCH_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub text: String,
    pub style: Option<LineStyle>,
}

enum Entry {
    File(&'static str),
    Dir(Vec<(&'static str, Entry)>),
}

impl Entry {
    fn child(&self, name: &str) -> Option<&Entry> {
        match self {
            Entry::Dir(children) => children.iter().find(|(n, _)| *n == name).map(|(_, e)| e),
            Entry::File(_) => None,
        }
    }
}

fn file_system() -> Entry {
    use self::Entry::{Dir, File};
    Dir(vec![
        (
            "home",
            Dir(vec![
                (
                    "documents",
                    Dir(vec![
                        (
                            "readme.txt",
                            File("This is a secret terminal interface for the Matrix hacking game.\nUse commands to interact with the system and unlock hidden features."),
                        ),
                        (
                            "mission.log",
                            File("MISSION DETAILS:\n----------------\nObjective: Infiltrate the mainframe\nSecurity Level: Maximum\nAccess Code: ********\nStatus: In Progress"),
                        ),
                    ]),
                ),
                (
                    "games",
                    Dir(vec![(
                        "howtoplay.txt",
                        File("Use arrow keys or WASD to move.\nSpace to fire.\nEsc to pause the game."),
                    )]),
                ),
            ]),
        ),
        (
            "system",
            Dir(vec![
                (
                    "config.sys",
                    File("SYSTEM CONFIGURATION\n-------------------\nRenderer: WebGL\nAudio: Enabled\nDifficulty: Medium\nDebug: false"),
                ),
                (
                    "logs",
                    Dir(vec![(
                        "error.log",
                        File("ERROR [2023-05-15]: Failed to connect to server #127\nERROR [2023-06-02]: Memory allocation failed\nWARNING [2023-06-10]: Unauthorized access attempt detected\nERROR [2023-06-22]: Connection timeout"),
                    )]),
                ),
            ]),
        ),
    ])
}

pub struct Terminal {
    lines: VecDeque<TerminalLine>,
    history: VecDeque<String>,
    /// Position while browsing history; `history.len()` means the live input
    history_index: usize,
    stash: String,
    input: String,
    root: Entry,
    cwd: String,
    /// Remaining time a long command holds the prompt
    busy_ms: f64,
    dirty: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Self {
        let mut terminal = Self {
            lines: VecDeque::with_capacity(MAX_LINES),
            history: VecDeque::new(),
            history_index: 0,
            stash: String::new(),
            input: String::new(),
            root: file_system(),
            cwd: "/system".to_string(),
            busy_ms: 0.0,
            dirty: true,
        };
        for line in GREETING {
            terminal.push(line, Some(LineStyle::System));
        }
        terminal
    }

    pub fn lines(&self) -> impl Iterator<Item = &TerminalLine> {
        self.lines.iter()
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_busy(&self) -> bool {
        self.busy_ms > 0.0
    }

    /// Returns true once after any change to lines or input
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Count down a running command
    pub fn advance(&mut self, delta_ms: f64) {
        self.busy_ms = (self.busy_ms - delta_ms).max(0.0);
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_busy() || c.is_control() {
            return;
        }
        self.input.push(c);
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        if self.input.pop().is_some() {
            self.dirty = true;
        }
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if self.history_index == self.history.len() {
            self.stash = self.input.clone();
        }
        self.history_index = self.history_index.saturating_sub(1);
        self.input = self.history[self.history_index].clone();
        self.dirty = true;
    }

    pub fn history_down(&mut self) {
        if self.history_index + 1 < self.history.len() {
            self.history_index += 1;
            self.input = self.history[self.history_index].clone();
        } else if self.history_index + 1 == self.history.len() {
            self.history_index = self.history.len();
            self.input = std::mem::take(&mut self.stash);
        } else {
            return;
        }
        self.dirty = true;
    }

    /// Enter pressed: echo, remember and run the current input
    pub fn submit(&mut self, rng: &mut impl Rng, date: &str) -> Vec<Scheduled> {
        if self.is_busy() {
            return Vec::new();
        }
        let command = std::mem::take(&mut self.input).trim().to_string();
        self.push(&format!("{PROMPT}{command}"), None);

        if command.is_empty() {
            return Vec::new();
        }
        self.history.push_back(command.clone());
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
        self.history_index = self.history.len();
        self.execute(&command, rng, date)
    }

    /// Run one command line. Immediate output is written here; anything
    /// later is returned for the host to deliver.
    pub fn execute(&mut self, line: &str, rng: &mut impl Rng, date: &str) -> Vec<Scheduled> {
        let (cmd, arg) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest),
            None => (line, ""),
        };
        log::debug!("terminal command: {}", cmd);

        match cmd {
            "help" => self.print(HELP),
            "clear" => {
                self.lines.clear();
                self.dirty = true;
            }
            "echo" => self.print(arg),
            "date" => self.print(date),
            "ls" => self.list(),
            "cat" => self.cat(arg),
            "status" => {
                let cpu = rng.random_range(70..100);
                self.print(&format!("CPU Usage: {cpu}%"));
            }
            "hack" => return self.hack(),
            "connect" => {
                self.print("Connecting to server...");
                return vec![Scheduled::after(
                    1000.0,
                    Cue::styled("Connection established.", LineStyle::Success),
                )];
            }
            "decrypt" => return self.decrypt(rng),
            "matrix" => {
                self.print("Entering the Matrix...");
                return vec![Scheduled::after(2000.0, Cue::line("Welcome to the Matrix."))];
            }
            "glitch" => {
                self.print("Glitching the system...");
                return vec![Scheduled::after(2000.0, Cue::line("System glitch detected."))];
            }
            _ => self.print(&format!("Command not found: {cmd}")),
        }
        Vec::new()
    }

    fn print(&mut self, text: &str) {
        self.push(text, None);
    }

    fn push(&mut self, text: &str, style: Option<LineStyle>) {
        self.lines.push_back(TerminalLine {
            text: text.to_string(),
            style,
        });
        while self.lines.len() > MAX_LINES {
            self.lines.pop_front();
        }
        self.dirty = true;
    }

    fn current_dir(&self) -> Option<&Entry> {
        self.cwd
            .split('/')
            .filter(|part| !part.is_empty())
            .try_fold(&self.root, |dir, part| dir.child(part))
    }

    fn list(&mut self) {
        let listing = match self.current_dir() {
            Some(Entry::Dir(children)) if children.is_empty() => "Directory is empty".to_string(),
            Some(Entry::Dir(children)) => children
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(" "),
            _ => "Invalid directory".to_string(),
        };
        self.print(&listing);
    }

    fn cat(&mut self, file: &str) {
        if file.is_empty() {
            self.print("Usage: cat [filename]");
            return;
        }
        let content = match self.current_dir().and_then(|dir| dir.child(file)) {
            Some(Entry::File(content)) => Some(*content),
            _ => None,
        };
        match content {
            Some(content) => self.print(content),
            None => self.print(&format!("File not found: {file}")),
        }
    }

    fn hack(&mut self) -> Vec<Scheduled> {
        self.print("Hacking in progress...");
        let mut cues: Vec<Scheduled> = (1..=10)
            .map(|step| {
                Scheduled::after(
                    HACK_STEP_MS * step as f64,
                    Cue::line(format!("[{}%] Bypassing security...", step * 10)),
                )
            })
            .collect();
        let done = HACK_STEP_MS * 10.0;
        cues.push(Scheduled::after(
            done,
            Cue::styled("Hack successful! Access granted.", LineStyle::Success),
        ));
        cues.push(Scheduled::after(
            done,
            Cue::Glitch {
                duration_ms: HACK_GLITCH_MS,
            },
        ));
        self.busy_ms = done;
        cues
    }

    fn decrypt(&mut self, rng: &mut impl Rng) -> Vec<Scheduled> {
        self.print("Decrypting data...");
        let mut cues: Vec<Scheduled> = (1..=5)
            .map(|step| {
                let hex: u32 = rng.random();
                Scheduled::after(
                    DECRYPT_STEP_MS * step as f64,
                    Cue::line(format!("[{}%] 0x{:08X}", step * 20, hex)),
                )
            })
            .collect();
        let done = DECRYPT_STEP_MS * 5.0;
        cues.push(Scheduled::after(
            done,
            Cue::styled("Decryption complete. Data accessible.", LineStyle::Success),
        ));
        self.busy_ms = done;
        cues
    }
}

impl TextSink for Terminal {
    fn write_line(&mut self, message: &str, style: Option<LineStyle>) {
        self.push(message, style);
    }
}

/// Startup lines shown while the page loads, ending in [`Cue::BootComplete`]
pub fn boot_sequence() -> Vec<Scheduled> {
    const STEPS: [(&str, f64); 7] = [
        ("Initializing system core...", 600.0),
        ("Loading encryption modules...", 500.0),
        ("Establishing secure connection...", 700.0),
        ("Bypassing security measures...", 800.0),
        ("Compiling neural network...", 400.0),
        ("Generating procedural elements...", 600.0),
        ("Preparing game environment...", 400.0),
    ];

    let mut cues = Vec::with_capacity(STEPS.len() * 2 + 2);
    let mut at = 0.0;
    for (text, duration) in STEPS {
        cues.push(Scheduled::after(at, Cue::line(format!("> {text}"))));
        at += duration;
        cues.push(Scheduled::after(
            at,
            Cue::styled("[SUCCESS] Operation complete", LineStyle::Success),
        ));
    }
    cues.push(Scheduled::after(
        at,
        Cue::styled("> Initialization complete. System ready.", LineStyle::System),
    ));
    cues.push(Scheduled::after(at, Cue::BootComplete));
    cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn last(terminal: &Terminal) -> &str {
        terminal.lines().last().map(|l| l.text.as_str()).unwrap_or("")
    }

    fn run(terminal: &mut Terminal, line: &str) -> Vec<Scheduled> {
        for c in line.chars() {
            terminal.push_char(c);
        }
        terminal.submit(&mut rng(), "Mon Oct 19 2026")
    }

    #[test]
    fn test_greeting() {
        let terminal = Terminal::new();
        let lines: Vec<_> = terminal.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "=== CyberNET Terminal v3.7.9 ===");
        assert!(lines.iter().all(|l| l.style == Some(LineStyle::System)));
    }

    #[test]
    fn test_prompt_echo_and_unknown_command() {
        let mut terminal = Terminal::new();
        run(&mut terminal, "sudo rm");
        let texts: Vec<_> = terminal.lines().map(|l| l.text.clone()).collect();
        assert_eq!(texts[3], format!("{PROMPT}sudo rm"));
        assert_eq!(texts[4], "Command not found: sudo");
    }

    #[test]
    fn test_ls_and_cat_in_system_dir() {
        let mut terminal = Terminal::new();
        run(&mut terminal, "ls");
        assert_eq!(last(&terminal), "config.sys logs");

        run(&mut terminal, "cat config.sys");
        assert!(last(&terminal).starts_with("SYSTEM CONFIGURATION"));

        run(&mut terminal, "cat readme.txt");
        assert_eq!(last(&terminal), "File not found: readme.txt");

        run(&mut terminal, "cat");
        assert_eq!(last(&terminal), "Usage: cat [filename]");

        run(&mut terminal, "cat logs");
        assert_eq!(last(&terminal), "File not found: logs");
    }

    #[test]
    fn test_echo_date_help_clear() {
        let mut terminal = Terminal::new();
        run(&mut terminal, "echo hello there");
        assert_eq!(last(&terminal), "hello there");
        run(&mut terminal, "date");
        assert_eq!(last(&terminal), "Mon Oct 19 2026");
        run(&mut terminal, "help");
        assert_eq!(last(&terminal), HELP);
        run(&mut terminal, "clear");
        assert_eq!(terminal.lines().count(), 0);
    }

    #[test]
    fn test_status_reports_plausible_cpu() {
        let mut terminal = Terminal::new();
        for _ in 0..20 {
            run(&mut terminal, "status");
            let text = last(&terminal);
            let pct: u32 = text
                .trim_start_matches("CPU Usage: ")
                .trim_end_matches('%')
                .parse()
                .unwrap();
            assert!((70..100).contains(&pct));
        }
    }

    #[test]
    fn test_hack_schedules_progress_and_locks_prompt() {
        let mut terminal = Terminal::new();
        let cues = run(&mut terminal, "hack");
        assert_eq!(last(&terminal), "Hacking in progress...");
        assert_eq!(cues.len(), 12);
        assert_eq!(cues[0].cue, Cue::line("[10%] Bypassing security..."));
        assert_eq!(cues[0].delay_ms, 300.0);
        assert_eq!(cues[9].cue, Cue::line("[100%] Bypassing security..."));
        assert_eq!(cues[11].cue, Cue::Glitch { duration_ms: 1000 });

        assert!(terminal.is_busy());
        assert!(run(&mut terminal, "help").is_empty());
        assert_eq!(terminal.input(), "");

        terminal.advance(3000.0);
        assert!(!terminal.is_busy());
        run(&mut terminal, "help");
        assert_eq!(last(&terminal), HELP);
    }

    #[test]
    fn test_decrypt_prints_hex_words() {
        let mut terminal = Terminal::new();
        let cues = run(&mut terminal, "decrypt");
        assert_eq!(cues.len(), 6);
        for (i, scheduled) in cues.iter().take(5).enumerate() {
            let Cue::Line { text, .. } = &scheduled.cue else {
                panic!("expected a line");
            };
            let prefix = format!("[{}%] 0x", (i + 1) * 20);
            assert!(text.starts_with(&prefix), "{text}");
            let hex = &text[prefix.len()..];
            assert_eq!(hex.len(), 8);
            assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_delayed_replies() {
        let mut terminal = Terminal::new();
        let cues = run(&mut terminal, "connect");
        assert_eq!(
            cues,
            vec![Scheduled::after(
                1000.0,
                Cue::styled("Connection established.", LineStyle::Success)
            )]
        );
        assert_eq!(run(&mut terminal, "matrix")[0].delay_ms, 2000.0);
        assert_eq!(
            run(&mut terminal, "glitch")[0].cue,
            Cue::line("System glitch detected.")
        );
    }

    #[test]
    fn test_output_is_bounded() {
        let mut terminal = Terminal::new();
        for i in 0..(MAX_LINES + 50) {
            terminal.write_line(&format!("line {i}"), None);
        }
        assert_eq!(terminal.lines().count(), MAX_LINES);
        assert_eq!(last(&terminal), format!("line {}", MAX_LINES + 49));
    }

    #[test]
    fn test_history_is_bounded_and_browsable() {
        let mut terminal = Terminal::new();
        for i in 0..(MAX_HISTORY + 5) {
            run(&mut terminal, &format!("echo {i}"));
        }
        assert_eq!(terminal.history().count(), MAX_HISTORY);
        assert_eq!(terminal.history().next(), Some("echo 5"));

        terminal.push_char('x');
        terminal.history_up();
        assert_eq!(terminal.input(), format!("echo {}", MAX_HISTORY + 4));
        terminal.history_up();
        assert_eq!(terminal.input(), format!("echo {}", MAX_HISTORY + 3));
        terminal.history_down();
        terminal.history_down();
        assert_eq!(terminal.input(), "x");
    }

    #[test]
    fn test_empty_submit_only_echoes_prompt() {
        let mut terminal = Terminal::new();
        assert!(run(&mut terminal, "   ").is_empty());
        assert_eq!(last(&terminal), PROMPT);
        assert_eq!(terminal.history().count(), 0);
    }

    #[test]
    fn test_boot_sequence_timing() {
        let cues = boot_sequence();
        assert_eq!(cues[0].cue, Cue::line("> Initializing system core..."));
        assert_eq!(cues[1].delay_ms, 600.0);
        let end = cues.last().expect("boot has cues");
        assert_eq!(end.cue, Cue::BootComplete);
        assert_eq!(end.delay_ms, 4000.0);
    }
}
