//! `self-check` and `stats` subcommands.

use crate::cli::json_mode;
use crate::station::{open_ledger, scale_only};
use carafe_config::Config;
use carafe_core::StationError;
use carafe_core::calibration::measure_zero;
use carafe_traits::{BUTTON_COUNT, ButtonId, Ledger, Totals};
use carafe_ui::text;
use serde_json::json;
use std::time::Duration;

/// Samples read from the scale during the check.
const CHECK_SAMPLES: u32 = 3;

fn storage(e: carafe_traits::BoxError) -> StationError {
    StationError::Storage(e.to_string())
}

pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let mut scale = scale_only(cfg)?;
    let timeout = Duration::from_millis(cfg.hardware.sensor_read_timeout_ms);
    let raw = measure_zero(&mut scale, CHECK_SAMPLES, timeout)?;
    let ledger = open_ledger(cfg)?;
    let totals = ledger.totals().map_err(storage)?;

    if json_mode() {
        println!(
            "{}",
            json!({
                "ok": true,
                "scale_raw": raw,
                "ledger": if cfg.storage.db_path.is_some() { "sqlite" } else { "memory" },
                "mugs": totals.count,
            })
        );
    } else {
        println!("scale: ok (raw {raw})");
        println!("ledger: ok ({})", text::mugs(totals.count));
        println!("self-check: ok");
    }
    Ok(())
}

struct Row {
    button: ButtonId,
    name: Option<String>,
    today: Totals,
}

fn row(ledger: &dyn Ledger, button: ButtonId) -> eyre::Result<Row> {
    Ok(Row {
        button,
        name: ledger.name(button).map_err(storage)?,
        today: ledger.today(button).map_err(storage)?,
    })
}

pub fn stats(cfg: &Config, button: Option<ButtonId>) -> eyre::Result<()> {
    if cfg.storage.db_path.is_none() {
        return Err(StationError::Config(
            "storage.db_path is not set; there is no ledger to read".into(),
        )
        .into());
    }
    let ledger = open_ledger(cfg)?;
    let buttons: Vec<ButtonId> = match button {
        Some(b) => vec![b],
        None => (0..BUTTON_COUNT).collect(),
    };
    let mut rows = Vec::with_capacity(buttons.len());
    for b in buttons {
        let r = row(ledger.as_ref(), b)?;
        // Without a filter, list only buttons that are named or were used today
        if button.is_some() || r.name.is_some() || r.today.count > 0 {
            rows.push(r);
        }
    }
    let totals = ledger.totals().map_err(storage)?;

    if json_mode() {
        for r in &rows {
            println!(
                "{}",
                json!({
                    "button": r.button,
                    "name": r.name,
                    "today_mugs": r.today.count,
                    "today_g": r.today.grams(),
                })
            );
        }
        println!(
            "{}",
            json!({ "total_mugs": totals.count, "total_g": totals.grams() })
        );
    } else {
        for r in &rows {
            let name = r
                .name
                .clone()
                .unwrap_or_else(|| text::button_label(r.button));
            println!(
                "{:>2}  {:<16} today: {} - {} g",
                r.button,
                name,
                text::mugs(r.today.count),
                text::grams(r.today.amount_cg)
            );
        }
        println!(
            "total: {} - {}",
            text::mugs(totals.count),
            text::litres(totals.amount_cg)
        );
    }
    Ok(())
}
