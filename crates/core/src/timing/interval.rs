use stackline_protocol::{Milliseconds, TimingRow};

/// Collapse a per-sample entity assignment into one row of merged
/// `[start, end)` intervals.
///
/// `entity_at(i)` reports which entity (call node, category, ...) the
/// i-th sample carries for this row, or `None` for "nothing here".
/// Consecutive samples with the same entity merge into one interval. An
/// interval closes when the entity changes: at the new sample's time for
/// an entity-to-entity change, at the *previous* sample's time when the
/// row goes empty, so no interval ever spans a dropped sample.
///
/// The final open interval closes at the last sample's time. If that
/// would leave it zero-length (it opened on the last sample),
/// `fallback_width` is added so the sample stays visible; callers that
/// want true zero-length points pass 0.
pub fn build_timing_row<F>(
    times: &[Milliseconds],
    mut entity_at: F,
    fallback_width: Milliseconds,
) -> TimingRow
where
    F: FnMut(usize) -> Option<usize>,
{
    let mut row = TimingRow::new();
    let mut open: Option<(usize, Milliseconds)> = None;
    let mut prev_time = 0.0;

    for (i, &time) in times.iter().enumerate() {
        match (open, entity_at(i)) {
            (Some((id, _)), Some(entity)) if entity == id => {}
            (Some((id, start)), Some(entity)) => {
                row.push(start, time, id);
                open = Some((entity, time));
            }
            (Some((id, start)), None) => {
                row.push(start, prev_time, id);
                open = None;
            }
            (None, Some(entity)) => open = Some((entity, time)),
            (None, None) => {}
        }
        prev_time = time;
    }

    if let Some((id, start)) = open {
        let last = times.last().copied().unwrap_or(start);
        let end = if last > start { last } else { start + fallback_width };
        row.push(start, end, id);
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Option<usize> = Some(0);
    const B: Option<usize> = Some(1);
    const GAP: Option<usize> = None;

    fn run(times: &[Milliseconds], ids: &[Option<usize>]) -> TimingRow {
        build_timing_row(times, |i| ids[i], 1.0)
    }

    #[test]
    fn merges_runs_of_equal_entities() {
        let row = run(&[0.0, 1.0, 2.0, 3.0], &[A, A, B, B]);
        assert_eq!(row.start, vec![0.0, 2.0]);
        assert_eq!(row.end, vec![2.0, 3.0]);
        assert_eq!(row.index, vec![0, 1]);
    }

    #[test]
    fn gap_closes_at_prior_sample_time() {
        // The dropped sample at t=2 must not be spanned: the open
        // interval ends where the last real observation was.
        let row = run(&[0.0, 1.0, 2.0, 3.0], &[A, A, GAP, A]);
        assert_eq!(row.start, vec![0.0, 3.0]);
        assert_eq!(row.end, vec![1.0, 4.0]);
    }

    #[test]
    fn trailing_single_sample_gets_fallback_width() {
        let row = run(&[0.0, 1.0], &[A, B]);
        assert_eq!(row.start, vec![0.0, 1.0]);
        assert_eq!(row.end, vec![1.0, 2.0]);
    }

    #[test]
    fn zero_fallback_yields_point_interval() {
        let row = build_timing_row(&[5.0], |_| A, 0.0);
        assert_eq!(row.start, vec![5.0]);
        assert_eq!(row.end, vec![5.0]);
    }

    #[test]
    fn empty_input_yields_empty_row() {
        assert!(run(&[], &[]).is_empty());
    }

    #[test]
    fn leading_and_trailing_gaps_produce_nothing() {
        let row = run(&[0.0, 1.0, 2.0], &[GAP, A, GAP]);
        assert_eq!(row.start, vec![1.0]);
        assert_eq!(row.end, vec![1.0]);
        assert_eq!(row.index, vec![0]);
    }

    #[test]
    fn rows_are_sorted_and_non_overlapping() {
        let row = run(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[A, B, GAP, B, A, A],
        );
        for i in 0..row.len() {
            assert!(row.start[i] <= row.end[i]);
            if i + 1 < row.len() {
                assert!(row.end[i] <= row.start[i + 1]);
            }
        }
    }
}
