use carafe_store::{SqliteLedger, local_day};
use carafe_traits::{Ledger, LedgerEntry, Totals};
use rstest::rstest;
use std::time::{Duration, SystemTime};

fn entry(user: u8, amount_cg: i32, at: SystemTime) -> LedgerEntry {
    LedgerEntry {
        user,
        amount_cg,
        at,
    }
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_data.db");
    let now = SystemTime::now();
    {
        let mut ledger = SqliteLedger::open(&path).unwrap();
        ledger.append(&entry(3, 12_500, now)).unwrap();
        ledger.set_name(3, "ZOE").unwrap();
    }
    let ledger = SqliteLedger::open(&path).unwrap();
    assert_eq!(ledger.name(3).unwrap().as_deref(), Some("ZOE"));
    assert_eq!(
        ledger.totals().unwrap(),
        Totals {
            count: 1,
            amount_cg: 12_500
        }
    );
}

#[test]
fn latest_name_wins() {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    assert_eq!(ledger.name(4).unwrap(), None);
    ledger.set_name(4, "ALEX").unwrap();
    ledger.set_name(4, "SAM").unwrap();
    ledger.set_name(5, "KIM").unwrap();
    assert_eq!(ledger.name(4).unwrap().as_deref(), Some("SAM"));
}

#[rstest]
#[case(0, 1, 5_000)]
#[case(1, 0, 0)]
#[case(7, 0, 0)]
fn today_counts_only_the_local_day(#[case] days_ago: u64, #[case] count: u32, #[case] cg: i64) {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let at = SystemTime::now() - Duration::from_secs(days_ago * 24 * 3600);
    ledger.append(&entry(1, 5_000, at)).unwrap();
    ledger.append(&entry(2, 9_999, SystemTime::now())).unwrap();
    assert_eq!(
        ledger.today(1).unwrap(),
        Totals {
            count,
            amount_cg: cg
        }
    );
}

#[test]
fn entries_round_trip_timestamps() {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    ledger.append(&entry(9, 333, at)).unwrap();
    ledger.append(&entry(9, 334, at)).unwrap();
    let got = ledger.entries(9).unwrap();
    assert_eq!(got, vec![entry(9, 333, at), entry(9, 334, at)]);
    let day = ledger.today_on(9, local_day(at)).unwrap();
    assert_eq!(day.amount_cg, 667);
}
