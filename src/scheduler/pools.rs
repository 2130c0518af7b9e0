use crate::model::{Teacher, TeacherId, UnfilledAbsence};
use std::collections::VecDeque;

/// Active teachers free to cover on the absences' date. A teacher with an
/// absence row flagging at least one period is excluded from every pool:
/// they cannot both be absent and cover.
pub fn available_teachers<'a>(
    roster: &'a [Teacher],
    absences: &[UnfilledAbsence],
) -> Vec<&'a Teacher> {
    roster
        .iter()
        .filter(|t| t.active)
        .filter(|t| {
            t.id.is_some_and(|id| {
                !absences
                    .iter()
                    .any(|row| row.teacher == id && row.needs_cover())
            })
        })
        .collect()
}

/// Stable-partitions teachers into four FIFO pools keyed by their available
/// period. Input order (storage order, lowest id first) is preserved within
/// each pool; teachers with no available period are dropped. Pools are
/// consumed front-to-back, so teachers loaded first are offered on-call
/// duty first.
pub fn partition_by_available_period(teachers: &[&Teacher]) -> [VecDeque<TeacherId>; 4] {
    let mut pools: [VecDeque<TeacherId>; 4] = Default::default();
    for teacher in teachers {
        if let (Some(id), Some(period)) = (teacher.id, teacher.available) {
            pools[period.index()].push_back(id);
        }
    }
    pools
}
