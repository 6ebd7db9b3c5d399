//! Line-oriented stdin commands standing in for the buttons and the encoder.
//!
//! | line            | effect                                   |
//! |-----------------|------------------------------------------|
//! | `0`..`15`       | person button                            |
//! | `r`, `red`      | red button                               |
//! | `+`, `-`        | encoder turn; repeat for more (`+++`)    |
//! | empty, `.`, `ok`| encoder press                            |
//! | `lift`          | take the pot off the scale (simulation)  |
//! | `back [g]`      | return the pot, `g` grams lighter        |
//! | `fill <g>`      | refill the pot                           |
//! | `fail [n]`      | fail the next `n` scale reads            |
//! | `help`, `?`     | list the commands                        |
use carafe_traits::{BUTTON_COUNT, BoxError, Direction, Input, InputDevice};
use crossbeam_channel as xch;
use std::io::BufRead;
use std::thread;
use std::time::Duration;

use crate::sim::SimHandle;

pub const HELP: &str = "0..15 person | r red | + / - turn | <enter> press | lift | back [g] | fill <g> | fail [n]";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(Input),
    Lift,
    Back { poured_g: f64 },
    Fill { pot_g: f64 },
    Fail { reads: u32 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command {0:?} (try `help`)")]
pub struct ParseError(pub String);

/// Parse one line into the commands it stands for.
pub fn parse_line(line: &str) -> Result<Vec<Command>, ParseError> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("");
    let arg = words.next();
    let bad = || ParseError(line.to_string());

    if !head.is_empty() && head.chars().all(|c| c == '+') {
        return Ok(vec![Command::Input(Input::Turn(Direction::Clockwise)); head.len()]);
    }
    if !head.is_empty() && head.chars().all(|c| c == '-') {
        return Ok(vec![
            Command::Input(Input::Turn(Direction::CounterClockwise));
            head.len()
        ]);
    }

    let cmd = match head.to_ascii_lowercase().as_str() {
        "" | "." | "ok" => Command::Input(Input::Press),
        "r" | "red" => Command::Input(Input::Red),
        "lift" => Command::Lift,
        "back" => Command::Back {
            poured_g: arg
                .map(str::parse::<f64>)
                .transpose()
                .map_err(|_| bad())?
                .unwrap_or(0.0),
        },
        "fill" => Command::Fill {
            pot_g: arg.ok_or_else(bad)?.parse().map_err(|_| bad())?,
        },
        "fail" => Command::Fail {
            reads: arg
                .map(str::parse::<u32>)
                .transpose()
                .map_err(|_| bad())?
                .unwrap_or(1),
        },
        "help" | "?" => Command::Help,
        other => match other.parse::<u8>() {
            Ok(id) if id < BUTTON_COUNT => Command::Input(Input::Person(id)),
            _ => return Err(bad()),
        },
    };
    Ok(vec![cmd])
}

/// Reads commands on a background thread; inputs are handed out by `poll`.
///
/// Scale commands are applied to the `SimHandle` directly when one is attached,
/// and ignored with a warning otherwise.
pub struct KeyboardInput {
    rx: xch::Receiver<Input>,
}

impl KeyboardInput {
    pub fn stdin(sim: Option<SimHandle>) -> Self {
        Self::spawn(std::io::BufReader::new(std::io::stdin()), sim)
    }

    pub fn spawn<R: BufRead + Send + 'static>(reader: R, sim: Option<SimHandle>) -> Self {
        let (tx, rx) = xch::unbounded();
        // Detached: a thread blocked on stdin cannot be joined on shutdown
        if let Err(e) = thread::Builder::new()
            .name("keyboard".into())
            .spawn(move || read_loop(reader, sim.as_ref(), &tx))
        {
            tracing::error!(error = %e, "cannot spawn keyboard reader");
        }
        Self { rx }
    }
}

fn read_loop<R: BufRead>(reader: R, sim: Option<&SimHandle>, tx: &xch::Sender<Input>) {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "keyboard read failed");
                break;
            }
        };
        let cmds = match parse_line(&line) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("{e}");
                continue;
            }
        };
        for cmd in cmds {
            match (cmd, sim) {
                (Command::Input(input), _) => {
                    if tx.send(input).is_err() {
                        return;
                    }
                }
                (Command::Help, _) => tracing::info!("{HELP}"),
                (Command::Lift, Some(h)) => h.lift(),
                (Command::Back { poured_g }, Some(h)) => h.put_back(poured_g),
                (Command::Fill { pot_g }, Some(h)) => h.fill(pot_g),
                (Command::Fail { reads }, Some(h)) => h.fail(reads),
                (other, None) => tracing::warn!(?other, "no simulated scale attached"),
            }
        }
    }
    tracing::debug!("keyboard input closed");
}

impl InputDevice for KeyboardInput {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Input>, BoxError> {
        match self.rx.recv_timeout(timeout) {
            Ok(input) => Ok(Some(input)),
            Err(xch::RecvTimeoutError::Timeout) => Ok(None),
            Err(xch::RecvTimeoutError::Disconnected) => {
                // Input closed (EOF): behave like an idle keyboard
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}
