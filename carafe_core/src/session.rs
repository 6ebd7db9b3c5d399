//! Claim collection against a served volume.
//!
//! `PressLog` remembers person-button presses that nobody consumed yet so a
//! mug can be claimed before it is poured. `AssignmentSession` is opened when
//! a mug is served, seeded from that log, and resolved into ledger entries.
use crate::error::SessionError;
use carafe_traits::{ButtonId, LedgerEntry};
use std::collections::VecDeque;
use std::time::{Duration, Instant, SystemTime};

/// Unclaimed presses, oldest first, retained for the lookback window.
#[derive(Debug, Clone)]
pub struct PressLog {
    window: Duration,
    entries: VecDeque<(ButtonId, Instant)>,
}

impl PressLog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: VecDeque::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn record(&mut self, button: ButtonId, at: Instant) {
        self.prune(at);
        if self.window.is_zero() {
            return;
        }
        self.entries.push_back((button, at));
    }

    /// Drop entries older than the window as seen from `now`.
    pub fn prune(&mut self, now: Instant) {
        while let Some(&(_, t)) = self.entries.front() {
            if now.saturating_duration_since(t) > self.window {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ButtonId, Instant)> {
        self.entries.iter()
    }

    /// Remove and return the presses within the window ending at `at`, in
    /// press order. Presses stamped after `at` stay in the log.
    fn drain_before(&mut self, at: Instant) -> Vec<ButtonId> {
        self.prune(at);
        let mut taken = Vec::new();
        self.entries.retain(|&(id, t)| {
            if t <= at {
                taken.push(id);
                false
            } else {
                true
            }
        });
        taken
    }
}

/// Outcome of [`AssignmentSession::remove_last`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed { id: ButtonId, remaining: usize },
    /// The claimant list is empty; the session will never commit.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSession {
    volume_cg: i32,
    opened_at: Instant,
    claimants: Vec<ButtonId>,
    cancelled: bool,
}

impl AssignmentSession {
    /// Open a session for a mug served at `at`, consuming pre-claims from `log`.
    pub fn open(volume_cg: i32, at: Instant, log: &mut PressLog) -> Self {
        let mut session = Self {
            volume_cg,
            opened_at: at,
            claimants: Vec::new(),
            cancelled: false,
        };
        for id in log.drain_before(at) {
            session.add_claimant(id);
        }
        tracing::debug!(
            volume_cg,
            seeded = session.claimants.len(),
            "assignment session opened"
        );
        session
    }

    pub fn volume_cg(&self) -> i32 {
        self.volume_cg
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    pub fn claimants(&self) -> &[ButtonId] {
        &self.claimants
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Append `id` unless already claimed. Returns whether the list changed.
    pub fn add_claimant(&mut self, id: ButtonId) -> bool {
        if self.cancelled || self.claimants.contains(&id) {
            return false;
        }
        self.claimants.push(id);
        true
    }

    pub fn remove_last(&mut self) -> Removal {
        match self.claimants.pop() {
            Some(id) if !self.claimants.is_empty() => Removal::Removed {
                id,
                remaining: self.claimants.len(),
            },
            _ => {
                self.cancelled = true;
                Removal::Cancelled
            }
        }
    }

    /// Split the volume across the claimants, stamped `at`, and clear them.
    pub fn commit(&mut self, at: SystemTime) -> Result<Vec<LedgerEntry>, SessionError> {
        if self.cancelled {
            return Err(SessionError::Cancelled);
        }
        if self.claimants.is_empty() {
            return Err(SessionError::NoClaimants);
        }
        let claimants = std::mem::take(&mut self.claimants);
        let shares = split(self.volume_cg, claimants.len());
        Ok(claimants
            .into_iter()
            .zip(shares)
            .map(|(user, amount_cg)| LedgerEntry {
                user,
                amount_cg,
                at,
            })
            .collect())
    }
}

/// Split `volume_cg` into `k` shares of `volume_cg / k`; the last share
/// absorbs the remainder so the shares always sum to `volume_cg`.
pub fn split(volume_cg: i32, k: usize) -> Vec<i32> {
    if k == 0 {
        return Vec::new();
    }
    let k32 = i32::try_from(k).unwrap_or(i32::MAX);
    let share = volume_cg / k32;
    let mut shares = vec![share; k];
    let given = i64::from(share) * (k as i64 - 1);
    if let Some(last) = shares.last_mut() {
        *last = (i64::from(volume_cg) - given) as i32;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_gives_remainder_to_last() {
        assert_eq!(split(1000, 3), vec![333, 333, 334]);
        assert_eq!(split(10_000, 2), vec![5000, 5000]);
        assert_eq!(split(7, 1), vec![7]);
        assert!(split(7, 0).is_empty());
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut log = PressLog::new(Duration::from_secs(15));
        let mut s = AssignmentSession::open(500, Instant::now(), &mut log);
        assert!(s.add_claimant(3));
        assert!(!s.add_claimant(3));
        assert!(s.add_claimant(1));
        assert_eq!(s.claimants(), &[3, 1]);
    }

    #[test]
    fn remove_last_is_lifo_then_cancels() {
        let mut log = PressLog::new(Duration::from_secs(15));
        let mut s = AssignmentSession::open(500, Instant::now(), &mut log);
        s.add_claimant(4);
        s.add_claimant(9);
        assert_eq!(s.remove_last(), Removal::Removed { id: 9, remaining: 1 });
        assert_eq!(s.remove_last(), Removal::Cancelled);
        assert!(s.is_cancelled());
        assert!(!s.add_claimant(2));
        assert_eq!(s.commit(SystemTime::now()), Err(SessionError::Cancelled));
    }

    #[test]
    fn remove_last_on_empty_cancels() {
        let mut log = PressLog::new(Duration::from_secs(15));
        let mut s = AssignmentSession::open(500, Instant::now(), &mut log);
        assert_eq!(s.remove_last(), Removal::Cancelled);
    }

    #[test]
    fn commit_clears_claimants() {
        let mut log = PressLog::new(Duration::from_secs(15));
        let mut s = AssignmentSession::open(900, Instant::now(), &mut log);
        s.add_claimant(1);
        let entries = s.commit(SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount_cg, 900);
        assert!(s.claimants().is_empty());
        assert_eq!(s.commit(SystemTime::UNIX_EPOCH), Err(SessionError::NoClaimants));
    }

    #[test]
    fn zero_window_disables_lookback() {
        let now = Instant::now();
        let mut log = PressLog::new(Duration::ZERO);
        log.record(2, now);
        assert!(log.is_empty());
    }
}
