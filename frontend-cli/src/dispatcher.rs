//! Sequences trim, listing and termination for both entry paths: the
//! one-shot command and the interactive menu.

use crate::cli::Command;
use crate::report;
use backend::{list_processes_at_or_above, terminate, trim_current_process, ProcessSystem};
use log::debug;
use std::io::{self, BufRead, Write};

/// Tokens accepted as "yes" when asking whether to terminate.
const AFFIRMATIVE: &[&str] = &["s", "si", "sí", "y", "yes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MenuIdle,
    AwaitingOption,
    AwaitingThreshold,
    AwaitingKillConfirmation { threshold_mb: u64 },
    Executing { threshold_mb: u64, kill: bool },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Trim,
    List,
    TrimAndList,
    Exit,
}

impl MenuOption {
    fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "1" | "trim" => Some(MenuOption::Trim),
            "2" | "list" => Some(MenuOption::List),
            "3" | "both" => Some(MenuOption::TrimAndList),
            "4" | "exit" | "quit" => Some(MenuOption::Exit),
            _ => None,
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

pub struct Dispatcher<S, R, W, E> {
    system: S,
    input: R,
    out: W,
    err: E,
}

impl<S, R, W, E> Dispatcher<S, R, W, E>
where
    S: ProcessSystem,
    R: BufRead,
    W: Write,
    E: Write,
{
    pub fn new(system: S, input: R, out: W, err: E) -> Self {
        Self {
            system,
            input,
            out,
            err,
        }
    }

    /// Run a single command parsed from the command line.
    pub fn run_command(&mut self, command: Command) -> io::Result<()> {
        debug!("one-shot command {:?}", command);
        match command {
            Command::Trim => self.trim(),
            Command::List { threshold_mb, kill } => self.list(threshold_mb, kill),
            Command::Alt => {
                writeln!(
                    self.out,
                    "Alternate main: trimming current process working set..."
                )?;
                self.trim()?;
                writeln!(
                    self.out,
                    "Done. Use the program with arguments to list/kill processes."
                )
            }
        }
    }

    /// Drive the menu until the user exits or input ends.
    pub fn run_interactive(&mut self) -> io::Result<()> {
        let mut state = MenuState::MenuIdle;
        while state != MenuState::Exit {
            state = self.step(state)?;
        }
        Ok(())
    }

    pub(crate) fn step(&mut self, state: MenuState) -> io::Result<MenuState> {
        let next = match state {
            MenuState::MenuIdle => {
                write!(self.out, "{}Choose an option: ", report::MENU)?;
                MenuState::AwaitingOption
            }
            MenuState::AwaitingOption => match self.read_line()? {
                None => MenuState::Exit,
                Some(line) => match MenuOption::parse(&line) {
                    Some(MenuOption::Exit) => MenuState::Exit,
                    Some(MenuOption::Trim) => {
                        self.trim()?;
                        MenuState::MenuIdle
                    }
                    Some(MenuOption::List) => MenuState::AwaitingThreshold,
                    Some(MenuOption::TrimAndList) => {
                        self.trim()?;
                        MenuState::AwaitingThreshold
                    }
                    None => {
                        writeln!(self.out, "Invalid input. Try again.")?;
                        MenuState::MenuIdle
                    }
                },
            },
            MenuState::AwaitingThreshold => {
                write!(self.out, "Threshold in MB for listing processes: ")?;
                match self.read_line()? {
                    None => MenuState::Exit,
                    Some(line) => match line.parse::<u64>() {
                        Ok(threshold_mb) => MenuState::AwaitingKillConfirmation { threshold_mb },
                        Err(_) => {
                            writeln!(self.out, "Invalid threshold. Back to the menu.")?;
                            MenuState::MenuIdle
                        }
                    },
                }
            }
            MenuState::AwaitingKillConfirmation { threshold_mb } => {
                write!(self.out, "Try to terminate the listed processes? (y/n): ")?;
                match self.read_line()? {
                    None => MenuState::Exit,
                    Some(answer) => MenuState::Executing {
                        threshold_mb,
                        kill: is_affirmative(&answer),
                    },
                }
            }
            MenuState::Executing { threshold_mb, kill } => {
                writeln!(self.out, "Processes using >= {} MB:", threshold_mb)?;
                self.list(threshold_mb, kill)?;
                MenuState::MenuIdle
            }
            MenuState::Exit => MenuState::Exit,
        };
        debug!("menu {:?} -> {:?}", state, next);
        Ok(next)
    }

    fn trim(&mut self) -> io::Result<()> {
        let result = trim_current_process(&self.system);
        report::write_trim(&mut self.out, &mut self.err, &result)
    }

    fn list(&mut self, threshold_mb: u64, kill: bool) -> io::Result<()> {
        let records = list_processes_at_or_above(&self.system, threshold_mb);
        if records.is_empty() {
            return report::write_none_found(&mut self.out, threshold_mb);
        }

        for record in &records {
            report::write_record(&mut self.out, record)?;
            if kill {
                let accepted = terminate(&self.system, record.pid);
                report::write_kill_outcome(&mut self.out, record.pid, accepted)?;
            }
        }
        report::write_summary(&mut self.out, &records)
    }

    /// Next trimmed line of input, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::fixtures::FixtureSystem;
    use backend::ProcessRecord;

    const MB: u64 = 1024 * 1024;

    fn three_records() -> FixtureSystem {
        FixtureSystem::new(vec![
            ProcessRecord::new(101, "big", 80 * MB),
            ProcessRecord::new(102, "small", 10 * MB),
            ProcessRecord::new(103, "exact", 50 * MB),
        ])
    }

    struct Run {
        out: String,
        err: String,
    }

    fn one_shot(system: &FixtureSystem, command: Command) -> Run {
        let mut out = Vec::new();
        let mut err = Vec::new();
        Dispatcher::new(system, &b""[..], &mut out, &mut err)
            .run_command(command)
            .unwrap();
        Run {
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn interactive(system: &FixtureSystem, input: &str) -> Run {
        let mut out = Vec::new();
        let mut err = Vec::new();
        Dispatcher::new(system, input.as_bytes(), &mut out, &mut err)
            .run_interactive()
            .unwrap();
        Run {
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn list_with_kill_terminates_only_qualifying_pids() {
        let system = three_records();
        let run = one_shot(
            &system,
            Command::List {
                threshold_mb: 50,
                kill: true,
            },
        );
        assert_eq!(system.terminated(), vec![101, 103]);
        assert!(run.out.contains("PID=101 name=big rssMB=80"));
        assert!(run.out.contains("PID=103 name=exact rssMB=50"));
        assert!(!run.out.contains("PID=102"));
        assert_eq!(run.out.matches(" ... OK").count(), 2);
    }

    #[test]
    fn list_without_kill_terminates_nothing() {
        let system = three_records();
        one_shot(
            &system,
            Command::List {
                threshold_mb: 50,
                kill: false,
            },
        );
        assert!(system.terminated().is_empty());
    }

    #[test]
    fn empty_listing_prints_distinct_message() {
        let system = three_records();
        let run = one_shot(
            &system,
            Command::List {
                threshold_mb: 100,
                kill: false,
            },
        );
        assert_eq!(run.out, "No processes found using >= 100 MB\n");
    }

    #[test]
    fn failed_termination_is_reported_and_the_rest_continue() {
        let system = three_records().deny(101);
        let run = one_shot(
            &system,
            Command::List {
                threshold_mb: 50,
                kill: true,
            },
        );
        assert!(run.out.contains("terminate PID 101 ... FAILED"));
        assert!(run.out.contains("terminate PID 103 ... OK"));
    }

    #[test]
    fn alt_explains_and_trims() {
        let system = FixtureSystem::new(Vec::new()).with_self_resident(4 * MB, 3 * MB);
        let run = one_shot(&system, Command::Alt);
        assert!(run.out.starts_with("Alternate main:"));
        assert!(run.out.contains("Before trim: 4096 KB"));
        assert!(run.out.contains("After  trim: 3072 KB"));
        assert!(run.err.is_empty());
    }

    #[test]
    fn unsupported_trim_is_not_an_error() {
        let system = FixtureSystem::unsupported();
        let run = one_shot(&system, Command::Trim);
        assert!(run.out.contains("Trim not available"));
        assert!(run.err.is_empty());
    }

    #[test]
    fn invalid_threshold_returns_to_menu_without_listing() {
        let system = three_records();
        let mut out = Vec::new();
        let mut dispatcher = Dispatcher::new(&system, &b"abc\n"[..], &mut out, Vec::new());
        let next = dispatcher.step(MenuState::AwaitingThreshold).unwrap();
        assert_eq!(next, MenuState::MenuIdle);
        assert_eq!(system.snapshot_count(), 0);
        drop(dispatcher);
        assert!(String::from_utf8(out).unwrap().contains("Invalid threshold"));
    }

    #[test]
    fn interactive_list_and_kill_matches_one_shot() {
        let system = three_records();
        let run = interactive(&system, "2\n50\ns\n4\n");
        assert_eq!(system.terminated(), vec![101, 103]);
        assert!(run.out.contains("Processes using >= 50 MB:"));

        let fresh = three_records();
        let shot = one_shot(
            &fresh,
            Command::List {
                threshold_mb: 50,
                kill: true,
            },
        );
        assert!(run.out.contains(&shot.out));
    }

    #[test]
    fn trim_and_list_trims_first() {
        let system = three_records().with_self_resident(8 * MB, 8 * MB);
        let run = interactive(&system, "3\n60\nn\nexit\n");
        let trim_at = run.out.find("Before trim").unwrap();
        let list_at = run.out.find("PID=101").unwrap();
        assert!(trim_at < list_at);
        assert!(system.terminated().is_empty());
    }

    #[test]
    fn bad_option_then_abc_threshold_never_lists() {
        let system = three_records();
        let run = interactive(&system, "9\n2\nabc\n4\n");
        assert!(run.out.contains("Invalid input. Try again."));
        assert!(run.out.contains("Invalid threshold. Back to the menu."));
        assert_eq!(system.snapshot_count(), 0);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let system = three_records();
        interactive(&system, "2\n");
        assert_eq!(system.snapshot_count(), 0);
    }

    #[test]
    fn affirmative_tokens() {
        for token in ["s", "S", "si", "Sí", "y", "Y", "yes", "YES"] {
            assert!(is_affirmative(token), "{token}");
        }
        for token in ["n", "no", "", "kill", "1"] {
            assert!(!is_affirmative(token), "{token}");
        }
    }
}
