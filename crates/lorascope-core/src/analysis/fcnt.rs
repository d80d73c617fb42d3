use super::alerts::AlertKind;

/// Largest LoRaWAN 16-bit frame counter.
pub(crate) const FCNT_MAX: u64 = 65_535;
/// A drop from above this value is treated as a rollover.
pub(crate) const ROLLOVER_THRESHOLD: u64 = 60_000;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FcntCheck {
    pub alerts: Vec<AlertKind>,
    pub missed: u64,
    pub duplicate: bool,
}

pub(crate) fn check_fcnt(previous: Option<u64>, current: Option<u64>, max_gap: u64) -> FcntCheck {
    let mut check = FcntCheck::default();
    let Some(current) = current else {
        check.alerts.push(AlertKind::FcntMissing);
        return check;
    };

    if current > FCNT_MAX {
        check.alerts.push(AlertKind::FcntOverflow);
    }

    let Some(previous) = previous else {
        return check;
    };

    if current < previous && previous <= FCNT_MAX && previous > ROLLOVER_THRESHOLD {
        check.alerts.push(AlertKind::FcntRollover);
    } else if current == previous {
        check.alerts.push(AlertKind::FcntDuplicate);
        check.duplicate = true;
    } else if current < previous {
        check.alerts.push(AlertKind::FcntBackwards);
    } else {
        let gap = current - previous;
        if gap > 1 {
            check.alerts.push(AlertKind::FcntGap);
            check.missed = gap - 1;
            if gap > max_gap {
                check.alerts.push(AlertKind::FcntLargeGap);
            }
        }
    }
    check
}
