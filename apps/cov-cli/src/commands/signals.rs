// signals.rs — rolling correction-signal report.

use cov_contract::day_key::Clock;
use cov_contract::SystemClock;
use cov_cycle::{PressureReading, SnapshotStore};

pub fn execute(store: &SnapshotStore, cycle_id: &str) -> anyhow::Result<()> {
    let ledger = store.load()?;
    let signals = ledger.correction_signals(cycle_id, &SystemClock)?;

    println!(
        "correction signals, last {} days ({} rejections) as of {}",
        signals.window_days,
        signals.total_rejections,
        SystemClock.now_day_key()
    );
    print_reading("capacity pressure ", &signals.signals.capacity_pressure);
    print_reading("duration mismatch ", &signals.signals.duration_mismatch);
    print_reading("timing mismatch   ", &signals.signals.timing_mismatch);
    print_reading("energy mismatch   ", &signals.signals.energy_mismatch);
    print_reading("relevance mismatch", &signals.signals.relevance_mismatch);
    print_reading("prereq debt       ", &signals.signals.prereq_debt);

    if signals.recommendations.is_empty() {
        println!("no plan-tuning recommendations");
    } else {
        for recommendation in &signals.recommendations {
            println!("recommend: {recommendation:?}");
        }
    }
    Ok(())
}

fn print_reading(label: &str, reading: &PressureReading) {
    println!("  {label} {:.2}  {:?}", reading.value, reading.label);
}
