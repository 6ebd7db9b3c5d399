//! In-memory ledger. Clones share the same entries, so a test can keep a
//! handle while the dispatcher owns another.
use crate::error::StoreError;
use crate::{local_day, local_today};
use carafe_traits::{BoxError, ButtonId, Ledger, LedgerEntry, Totals};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<LedgerEntry>,
    names: HashMap<ButtonId, String>,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full disk would.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_writes = fail;
        }
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.lock().map(|i| i.entries.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory ledger poisoned".into()))
    }

    fn writable(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self.lock()?;
        if inner.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(inner)
    }
}

fn sum<'a>(entries: impl Iterator<Item = &'a LedgerEntry>) -> Totals {
    entries.fold(Totals::default(), |t, e| Totals {
        count: t.count + 1,
        amount_cg: t.amount_cg + i64::from(e.amount_cg),
    })
}

impl Ledger for MemoryLedger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), BoxError> {
        self.writable()?.entries.push(entry.clone());
        Ok(())
    }

    fn set_name(&mut self, button: ButtonId, name: &str) -> Result<(), BoxError> {
        self.writable()?.names.insert(button, name.to_string());
        Ok(())
    }

    fn name(&self, button: ButtonId) -> Result<Option<String>, BoxError> {
        Ok(self.lock()?.names.get(&button).cloned())
    }

    fn today(&self, button: ButtonId) -> Result<Totals, BoxError> {
        let today = local_today();
        let inner = self.lock()?;
        Ok(sum(inner
            .entries
            .iter()
            .filter(|e| e.user == button && local_day(e.at) == today)))
    }

    fn totals(&self) -> Result<Totals, BoxError> {
        Ok(sum(self.lock()?.entries.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn failing_writes_keep_reads_working() {
        let mut ledger = MemoryLedger::new();
        let entry = LedgerEntry {
            user: 1,
            amount_cg: 100,
            at: SystemTime::now(),
        };
        ledger.append(&entry).unwrap();
        ledger.fail_writes(true);
        assert!(ledger.append(&entry).is_err());
        assert!(ledger.set_name(1, "ANNA").is_err());
        assert_eq!(ledger.totals().unwrap().count, 1);
    }

    #[test]
    fn today_ignores_old_entries() {
        let mut ledger = MemoryLedger::new();
        let old = SystemTime::now() - Duration::from_secs(3 * 24 * 3600);
        ledger
            .append(&LedgerEntry {
                user: 2,
                amount_cg: 500,
                at: old,
            })
            .unwrap();
        ledger
            .append(&LedgerEntry {
                user: 2,
                amount_cg: 700,
                at: SystemTime::now(),
            })
            .unwrap();
        let t = ledger.today(2).unwrap();
        assert_eq!(t, Totals { count: 1, amount_cg: 700 });
    }
}
