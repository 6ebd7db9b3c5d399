//! Events carried by the single station queue.
use crate::detector::DomainEvent;
use carafe_traits::{ButtonId, Direction, Input};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EncoderTurn(Direction),
    EncoderPress,
    RedButton,
    PersonButton(ButtonId),
    PotRemoved,
    PotReturned,
    MugServed { volume_cg: i32 },
    /// Synthesized by the dispatcher when the inactivity timer expires.
    Timeout,
    /// The scale stopped answering; carries the last error.
    ScaleFault(String),
    ScaleRecovered,
}

impl Event {
    /// Events produced by the weight stream rather than by a person.
    pub fn is_pot_event(&self) -> bool {
        matches!(
            self,
            Event::PotRemoved | Event::PotReturned | Event::MugServed { .. }
        )
    }

    /// Short name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::EncoderTurn(_) => "encoder_turn",
            Event::EncoderPress => "encoder_press",
            Event::RedButton => "red_button",
            Event::PersonButton(_) => "person_button",
            Event::PotRemoved => "pot_removed",
            Event::PotReturned => "pot_returned",
            Event::MugServed { .. } => "mug_served",
            Event::Timeout => "timeout",
            Event::ScaleFault(_) => "scale_fault",
            Event::ScaleRecovered => "scale_recovered",
        }
    }
}

impl From<Input> for Event {
    fn from(input: Input) -> Self {
        match input {
            Input::Person(id) => Event::PersonButton(id),
            Input::Red => Event::RedButton,
            Input::Turn(dir) => Event::EncoderTurn(dir),
            Input::Press => Event::EncoderPress,
        }
    }
}

impl From<DomainEvent> for Event {
    fn from(ev: DomainEvent) -> Self {
        match ev {
            DomainEvent::PotRemoved => Event::PotRemoved,
            DomainEvent::PotReturned => Event::PotReturned,
            DomainEvent::MugServed { volume_cg } => Event::MugServed { volume_cg },
        }
    }
}

/// An event with its monotonic arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped {
    pub at: Instant,
    pub event: Event,
}

impl Stamped {
    pub fn new(at: Instant, event: impl Into<Event>) -> Self {
        Self {
            at,
            event: event.into(),
        }
    }
}
