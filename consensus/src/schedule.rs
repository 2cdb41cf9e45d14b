//! Fixed-interval maintenance schedule.
//!
//! Boundaries sit on a grid anchored at the stored next-maintenance-time. A
//! block that crosses the boundary moves it to the first grid point strictly
//! after the block time, skipping any intervals in which no block was
//! produced. A block before the boundary leaves it where it is.

use dpos_types::Timestamp;

use crate::collaborators::MaintenanceSchedule;
use crate::ConsensusError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalSchedule {
    interval: u64,
}

impl IntervalSchedule {
    pub fn new(interval_millis: u64) -> Result<Self, ConsensusError> {
        if interval_millis == 0 {
            return Err(ConsensusError::InvalidInterval(interval_millis));
        }
        Ok(Self {
            interval: interval_millis,
        })
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }
}

impl MaintenanceSchedule for IntervalSchedule {
    fn next_maintenance_time(&self, current: Timestamp, block_time: Timestamp) -> Timestamp {
        if current > block_time {
            return current;
        }
        let elapsed = block_time.as_millis() - current.as_millis();
        let rounds = elapsed / self.interval + 1;
        current.saturating_add(rounds.saturating_mul(self.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schedule() -> IntervalSchedule {
        IntervalSchedule::new(1000).unwrap()
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(matches!(
            IntervalSchedule::new(0),
            Err(ConsensusError::InvalidInterval(0))
        ));
    }

    #[test]
    fn before_boundary_is_unchanged() {
        let next = schedule().next_maintenance_time(Timestamp::new(5000), Timestamp::new(4999));
        assert_eq!(next, Timestamp::new(5000));
    }

    #[test]
    fn exactly_on_boundary_moves_one_interval() {
        let next = schedule().next_maintenance_time(Timestamp::new(5000), Timestamp::new(5000));
        assert_eq!(next, Timestamp::new(6000));
    }

    #[test]
    fn skipped_intervals_are_jumped() {
        let next = schedule().next_maintenance_time(Timestamp::new(5000), Timestamp::new(8500));
        assert_eq!(next, Timestamp::new(9000));
    }

    #[test]
    fn genesis_zero_anchor() {
        let next = schedule().next_maintenance_time(Timestamp::EPOCH, Timestamp::new(1234));
        assert_eq!(next, Timestamp::new(2000));
    }

    proptest! {
        #[test]
        fn next_is_monotonic_and_after_crossing_block(
            current in 0u64..1_000_000_000,
            block in 0u64..1_000_000_000,
            interval in 1u64..10_000_000,
        ) {
            let s = IntervalSchedule::new(interval).unwrap();
            let next = s.next_maintenance_time(Timestamp::new(current), Timestamp::new(block));
            prop_assert!(next >= Timestamp::new(current));
            if current <= block {
                prop_assert!(next > Timestamp::new(block));
                prop_assert!(next.as_millis() - block <= interval);
                prop_assert_eq!((next.as_millis() - current) % interval, 0);
            }
        }
    }
}
