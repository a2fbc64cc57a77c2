use chrono::{DateTime, Local};

use crate::form::record::FormRecord;

pub const PARTITION_KEY: &str = "sheet";
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Human-readable local time, e.g. `11/2/2025, 3:04:05 PM`.
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Source of the submission timestamp.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Visible fields first, then hidden metadata. Hidden keys win on collision.
pub fn assemble(visible: &FormRecord, hidden: &FormRecord) -> FormRecord {
    let mut record = visible.clone();
    record.merge_from(hidden);
    record
}

/// [`assemble`] plus the destination partition tag and a timestamp read
/// from `clock` at call time.
pub fn assemble_partitioned(
    visible: &FormRecord,
    hidden: &FormRecord,
    partition: &str,
    clock: &dyn Clock,
) -> FormRecord {
    let mut record = assemble(visible, hidden);
    record.insert(PARTITION_KEY, partition);
    record.insert(TIMESTAMP_KEY, clock.now().format(TIMESTAMP_FORMAT).to_string());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    #[test]
    fn hidden_value_wins_on_collision() {
        let visible: FormRecord = [("Name", "A"), ("Source", "typed")].into_iter().collect();
        let hidden: FormRecord = [("Source", "website")].into_iter().collect();

        let record = assemble(&visible, &hidden);
        assert_eq!(record.get("Source"), Some("website"));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["Name", "Source"]);
    }

    #[test]
    fn partitioned_record_gets_sheet_and_timestamp() {
        let clock = FixedClock(Local.with_ymd_and_hms(2025, 1, 9, 9, 5, 7).unwrap());
        let visible: FormRecord = [("fullName", "B")].into_iter().collect();

        let record = assemble_partitioned(&visible, &FormRecord::new(), "Sheet3", &clock);
        assert_eq!(record.get(PARTITION_KEY), Some("Sheet3"));
        assert_eq!(record.get(TIMESTAMP_KEY), Some("1/9/2025, 9:05:07 AM"));
        assert_eq!(record.len(), 3);
    }
}
