use carafe_hardware::keyboard::{Command, parse_line};
use carafe_hardware::{KeyboardInput, SimulatedScale};
use carafe_traits::{Direction, Input, InputDevice};
use rstest::rstest;
use std::io::Cursor;
use std::time::{Duration, Instant};

#[rstest]
#[case("", Command::Input(Input::Press))]
#[case("ok", Command::Input(Input::Press))]
#[case("  r ", Command::Input(Input::Red))]
#[case("RED", Command::Input(Input::Red))]
#[case("0", Command::Input(Input::Person(0)))]
#[case("15", Command::Input(Input::Person(15)))]
#[case("lift", Command::Lift)]
#[case("back", Command::Back { poured_g: 0.0 })]
#[case("back 180.5", Command::Back { poured_g: 180.5 })]
#[case("fill 1500", Command::Fill { pot_g: 1500.0 })]
#[case("fail", Command::Fail { reads: 1 })]
#[case("fail 25", Command::Fail { reads: 25 })]
#[case("?", Command::Help)]
fn single_commands(#[case] line: &str, #[case] want: Command) {
    assert_eq!(parse_line(line).unwrap(), vec![want]);
}

#[rstest]
#[case("+++", Direction::Clockwise, 3)]
#[case("-", Direction::CounterClockwise, 1)]
#[case("--", Direction::CounterClockwise, 2)]
fn repeated_turns(#[case] line: &str, #[case] dir: Direction, #[case] n: usize) {
    assert_eq!(
        parse_line(line).unwrap(),
        vec![Command::Input(Input::Turn(dir)); n]
    );
}

#[rstest]
#[case("16")]
#[case("fill")]
#[case("back lots")]
#[case("+-")]
#[case("brew")]
fn rejected_lines(#[case] line: &str) {
    assert!(parse_line(line).is_err());
}

fn poll_until(dev: &mut KeyboardInput, n: usize) -> Vec<Input> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut got = Vec::new();
    while got.len() < n && Instant::now() < deadline {
        if let Some(i) = dev.poll(Duration::from_millis(20)).unwrap() {
            got.push(i);
        }
    }
    got
}

#[test]
fn reader_forwards_inputs_and_skips_bad_lines() {
    let script = "3\nnonsense\n+\n\nr\n";
    let mut dev = KeyboardInput::spawn(Cursor::new(script), None);
    let got = poll_until(&mut dev, 4);
    assert_eq!(
        got,
        vec![
            Input::Person(3),
            Input::Turn(Direction::Clockwise),
            Input::Press,
            Input::Red,
        ]
    );
    // Closed input behaves like an idle keyboard
    assert_eq!(dev.poll(Duration::from_millis(5)).unwrap(), None);
}

#[test]
fn scale_commands_drive_the_simulation() {
    let (_scale, handle) = SimulatedScale::new(1.0, 1000.0);
    let script = "lift\nback 200\n7\n";
    let mut dev = KeyboardInput::spawn(Cursor::new(script), Some(handle.clone()));
    // The person button comes after the scale commands, so they have run
    assert_eq!(poll_until(&mut dev, 1), vec![Input::Person(7)]);
    assert!(handle.pot_on_scale());
    assert_eq!(handle.grams(), 800.0);
}
