//! Lane packing for overlapping events.
//!
//! Events are assigned, in start order, to the lowest lane whose previous
//! occupant has already ended. Lanes are capped; an event that finds every
//! lane busy once the cap is reached lands in the skip list instead of
//! getting its own rectangle. Whenever an event starts after everything
//! placed so far has ended, the lane table is cleared and a new
//! `EventRange` begins.

use chrono::{DateTime, Duration, Utc};

use crate::event::CalendarEvent;

/// Greedy earliest-available-lane allocator.
#[derive(Debug, Clone, Copy)]
pub struct LanePacker {
    max_lanes: usize,
    min_start_gap: Option<Duration>,
    up_priority: bool,
}

/// An event with the lane it was assigned to.
#[derive(Debug, Clone, Copy)]
pub struct LaneEvent<'a> {
    pub event: &'a CalendarEvent,
    pub lane: usize,
}

/// A maximal run of chronologically overlapping events sharing lane state.
#[derive(Debug, Clone)]
pub struct EventRange<'a> {
    /// Origin of the bucket the range was packed in
    pub start: DateTime<Utc>,
    /// Sorted by (lane, start)
    pub events: Vec<LaneEvent<'a>>,
    pub max_lane: usize,
    pub max_end: DateTime<Utc>,
}

impl EventRange<'_> {
    pub fn lane_count(&self) -> usize {
        self.max_lane + 1
    }
}

/// Result of packing one bucket.
#[derive(Debug, Clone, Default)]
pub struct DrawMap<'a> {
    pub ranges: Vec<EventRange<'a>>,
    /// Events that found no lane within the cap
    pub skipped: Vec<&'a CalendarEvent>,
}

impl<'a> DrawMap<'a> {
    pub fn placed(&self) -> impl Iterator<Item = (&EventRange<'a>, &LaneEvent<'a>)> {
        self.ranges
            .iter()
            .flat_map(|range| range.events.iter().map(move |placed| (range, placed)))
    }

    pub fn placed_count(&self) -> usize {
        self.ranges.iter().map(|range| range.events.len()).sum()
    }
}

enum LaneChoice {
    Existing(usize),
    Open,
    Skip,
}

impl LanePacker {
    pub fn new(max_lanes: usize) -> Self {
        LanePacker {
            max_lanes,
            min_start_gap: None,
            up_priority: false,
        }
    }

    /// Treat a free lane as cramped when its previous occupant ended less
    /// than `gap` before the new event starts. Cramped lanes are used only
    /// when nothing better is available; a zero gap disables the rule.
    pub fn with_min_start_gap(mut self, gap: Duration) -> Self {
        self.min_start_gap = (gap > Duration::zero()).then_some(gap);
        self
    }

    /// Prefer reusing any free lane over opening a new one, even a cramped one.
    pub fn with_up_priority(mut self, up_priority: bool) -> Self {
        self.up_priority = up_priority;
        self
    }

    pub fn max_lanes(&self) -> usize {
        self.max_lanes
    }

    /// Pack `events` into lanes. `floor` is the origin of the bucket and
    /// becomes the start of every range; lanes are freed by real end times.
    pub fn pack<'a>(&self, events: &[&'a CalendarEvent], floor: DateTime<Utc>) -> DrawMap<'a> {
        let mut ordered = events.to_vec();
        ordered.sort_by_key(|event| event.start);

        let mut draw_map = DrawMap::default();
        let mut current: Option<EventRange<'a>> = None;
        let mut lane_ends: Vec<DateTime<Utc>> = Vec::with_capacity(self.max_lanes);

        for event in ordered {
            let starts_new_range = match &current {
                Some(range) => event.start > range.max_end,
                None => true,
            };
            if starts_new_range {
                draw_map.ranges.extend(current.take());
                lane_ends.clear();
            }

            let lane = match self.pick_lane(&lane_ends, event.start) {
                LaneChoice::Existing(lane) => {
                    lane_ends[lane] = event.end;
                    lane
                }
                LaneChoice::Open => {
                    lane_ends.push(event.end);
                    lane_ends.len() - 1
                }
                LaneChoice::Skip => {
                    draw_map.skipped.push(event);
                    continue;
                }
            };

            let range = current.get_or_insert_with(|| EventRange {
                start: floor,
                events: Vec::new(),
                max_lane: 0,
                max_end: event.end,
            });
            range.max_end = range.max_end.max(event.end);
            range.max_lane = range.max_lane.max(lane);
            range.events.push(LaneEvent { event, lane });
        }
        draw_map.ranges.extend(current);

        for range in &mut draw_map.ranges {
            range
                .events
                .sort_by(|a, b| a.lane.cmp(&b.lane).then(a.event.start.cmp(&b.event.start)));
        }

        if !draw_map.skipped.is_empty() {
            tracing::debug!(
                skipped = draw_map.skipped.len(),
                max_lanes = self.max_lanes,
                "lanes exhausted"
            );
        }

        draw_map
    }

    fn pick_lane(&self, lane_ends: &[DateTime<Utc>], start: DateTime<Utc>) -> LaneChoice {
        let can_open = lane_ends.len() < self.max_lanes;
        let free = lane_ends.iter().position(|end| *end <= start);

        let Some(gap) = self.min_start_gap else {
            return match free {
                Some(lane) => LaneChoice::Existing(lane),
                None if can_open => LaneChoice::Open,
                None => LaneChoice::Skip,
            };
        };

        if let Some(lane) = lane_ends.iter().position(|end| *end + gap <= start) {
            return LaneChoice::Existing(lane);
        }

        match (free, can_open) {
            (Some(lane), _) if self.up_priority => LaneChoice::Existing(lane),
            (_, true) => LaneChoice::Open,
            (Some(lane), false) => LaneChoice::Existing(lane),
            (None, false) => LaneChoice::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, minute, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(id, id, start, end)
    }

    fn lanes_by_id(draw_map: &DrawMap<'_>) -> Vec<(String, usize)> {
        let mut lanes: Vec<_> = draw_map
            .placed()
            .map(|(_, placed)| (placed.event.id.clone(), placed.lane))
            .collect();
        lanes.sort();
        lanes
    }

    #[test]
    fn test_three_overlapping_events_get_three_lanes() {
        let events = [
            event("a", at(9, 0), at(10, 0)),
            event("b", at(9, 30), at(10, 30)),
            event("c", at(9, 45), at(11, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, at(0, 0));

        assert!(draw_map.skipped.is_empty());
        assert_eq!(draw_map.ranges.len(), 1);
        assert_eq!(draw_map.ranges[0].lane_count(), 3);
        assert_eq!(
            lanes_by_id(&draw_map),
            vec![("a".into(), 0), ("b".into(), 1), ("c".into(), 2)]
        );
    }

    #[test]
    fn test_overflow_goes_to_skip_list() {
        let events: Vec<_> = (0..5)
            .map(|i| event(&format!("e{i}"), at(9, 0), at(10, 0)))
            .collect();
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, at(0, 0));

        assert_eq!(draw_map.placed_count(), 4);
        assert_eq!(draw_map.skipped.len(), 1);
        assert!(draw_map.placed().all(|(_, placed)| placed.lane < 4));
    }

    #[test]
    fn test_touching_events_reuse_lane_within_range() {
        // b touches a's end, c keeps the range open
        let events = [
            event("a", at(9, 0), at(10, 0)),
            event("c", at(9, 30), at(12, 0)),
            event("b", at(10, 0), at(11, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, at(0, 0));

        assert_eq!(draw_map.ranges.len(), 1);
        assert_eq!(
            lanes_by_id(&draw_map),
            vec![("a".into(), 0), ("b".into(), 0), ("c".into(), 1)]
        );
    }

    #[test]
    fn test_gap_in_time_starts_new_range() {
        let events = [
            event("a", at(9, 0), at(10, 0)),
            event("b", at(9, 30), at(10, 30)),
            event("c", at(11, 0), at(12, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, at(0, 0));

        assert_eq!(draw_map.ranges.len(), 2);
        assert_eq!(draw_map.ranges[0].lane_count(), 2);
        assert_eq!(draw_map.ranges[1].lane_count(), 1);
        assert_eq!(draw_map.ranges[1].events[0].event.id, "c");
    }

    #[test]
    fn test_event_touching_range_end_stays_in_range() {
        let events = [event("a", at(9, 0), at(10, 0)), event("b", at(10, 0), at(11, 0))];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, at(0, 0));

        assert_eq!(draw_map.ranges.len(), 1);
        assert_eq!(draw_map.ranges[0].max_end, at(11, 0));
        assert_eq!(draw_map.ranges[0].lane_count(), 1);
    }

    #[test]
    fn test_floor_frees_lanes_of_events_started_earlier() {
        // a and b both started before the floor and overlap each other
        let floor = at(8, 0);
        let events = [
            event("a", at(6, 0), at(8, 0)),
            event("b", at(7, 0), at(9, 0)),
            event("c", at(8, 0), at(9, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, floor);

        assert_eq!(
            lanes_by_id(&draw_map),
            vec![("a".into(), 0), ("b".into(), 1), ("c".into(), 0)]
        );
    }

    #[test]
    fn test_events_before_floor_never_share_a_lane() {
        let floor = at(12, 0);
        let events = [
            event("a", at(6, 0), at(7, 0)),
            event("b", at(6, 30), at(8, 0)),
            event("c", at(7, 30), at(13, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(4).pack(&refs, floor);

        assert_eq!(
            lanes_by_id(&draw_map),
            vec![("a".into(), 0), ("b".into(), 1), ("c".into(), 0)]
        );
        assert!(draw_map.ranges.iter().all(|range| range.start == floor));
    }

    #[test]
    fn test_min_start_gap_prefers_new_lane() {
        let events = [
            event("long", at(9, 0), at(12, 0)),
            event("a", at(9, 0), at(10, 0)),
            event("b", at(10, 10), at(11, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();

        let plain = LanePacker::new(4).pack(&refs, at(0, 0));
        assert_eq!(lanes_by_id(&plain)[1], ("b".into(), 1));

        let gapped = LanePacker::new(4)
            .with_min_start_gap(Duration::minutes(30))
            .pack(&refs, at(0, 0));
        assert_eq!(lanes_by_id(&gapped)[1], ("b".into(), 2));

        let upward = LanePacker::new(4)
            .with_min_start_gap(Duration::minutes(30))
            .with_up_priority(true)
            .pack(&refs, at(0, 0));
        assert_eq!(lanes_by_id(&upward)[1], ("b".into(), 1));
    }

    #[test]
    fn test_min_start_gap_never_causes_skip() {
        let events = [
            event("long", at(9, 0), at(12, 0)),
            event("a", at(9, 0), at(10, 0)),
            event("b", at(10, 10), at(11, 0)),
        ];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(2)
            .with_min_start_gap(Duration::minutes(30))
            .pack(&refs, at(0, 0));

        assert!(draw_map.skipped.is_empty());
        assert_eq!(lanes_by_id(&draw_map)[1], ("b".into(), 1));
    }

    #[test]
    fn test_zero_lanes_skips_everything() {
        let events = [event("a", at(9, 0), at(10, 0))];
        let refs: Vec<_> = events.iter().collect();
        let draw_map = LanePacker::new(0).pack(&refs, at(0, 0));

        assert!(draw_map.ranges.is_empty());
        assert_eq!(draw_map.skipped.len(), 1);
    }
}
