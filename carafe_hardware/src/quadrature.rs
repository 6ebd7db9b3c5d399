//! Quadrature decoding for the rotary encoder, kept free of GPIO so it can be tested.
use carafe_traits::Direction;

/// Tracks the (CLK, DT) pair and reports one step per detent.
///
/// A detent ends when both lines are back low; the last edge before that
/// decides the direction. Skipped states (both lines flipping at once) yield nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Quadrature {
    state: (bool, bool),
}

impl Quadrature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current line levels; `Some` when a detent completed.
    pub fn update(&mut self, clk: bool, dt: bool) -> Option<Direction> {
        let next = (clk, dt);
        let dir = match (self.state, next) {
            ((false, false), (false, true)) | ((false, true), (true, true)) => {
                Some(Direction::CounterClockwise)
            }
            ((false, false), (true, false)) | ((true, false), (true, true)) => {
                Some(Direction::Clockwise)
            }
            ((false, true), (false, false)) => Some(Direction::Clockwise),
            ((true, false), (false, false)) => Some(Direction::CounterClockwise),
            _ => None,
        };
        self.state = next;
        match (dir, next) {
            (Some(d), (false, false)) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn feed(q: &mut Quadrature, seq: &[(bool, bool)]) -> Vec<Direction> {
        seq.iter().filter_map(|&(c, d)| q.update(c, d)).collect()
    }

    #[rstest]
    // CLK leads on the way in, DT lingers on the way out
    #[case(&[(true, false), (true, true), (false, true), (false, false)], Direction::Clockwise)]
    // DT leads on the way in, CLK lingers on the way out
    #[case(&[(false, true), (true, true), (true, false), (false, false)], Direction::CounterClockwise)]
    fn full_detent(#[case] seq: &[(bool, bool)], #[case] dir: Direction) {
        let mut q = Quadrature::new();
        assert_eq!(feed(&mut q, seq), vec![dir]);
    }

    #[test]
    fn half_step_back_counts_by_last_edge() {
        let mut q = Quadrature::new();
        let seq = [(true, false), (false, false), (true, false), (false, false)];
        assert_eq!(feed(&mut q, &seq), vec![Direction::CounterClockwise; 2]);
    }

    #[test]
    fn repeated_levels_yield_nothing() {
        let mut q = Quadrature::new();
        assert!(feed(&mut q, &[(false, false); 4]).is_empty());
        assert!(feed(&mut q, &[(true, true); 3]).is_empty());
    }

    #[test]
    fn two_detents_two_steps() {
        let mut q = Quadrature::new();
        let one = [(true, false), (true, true), (false, true), (false, false)];
        let seq: Vec<_> = one.iter().chain(one.iter()).copied().collect();
        assert_eq!(feed(&mut q, &seq), vec![Direction::Clockwise; 2]);
    }
}
