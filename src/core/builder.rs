use crate::core::availability::PresenterCalendar;
use crate::core::{Room, RoomId, Schedule, ScheduleParams, Talk, TimeSpan};
use crate::utils::error::{Result, SchedulerError};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Greedy longest-talk-first placement over rooms and conference days.
pub struct ScheduleBuilder<'a> {
    params: &'a ScheduleParams,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(params: &'a ScheduleParams) -> Self {
        Self { params }
    }

    /// Places every unscheduled talk that fits, mutating it in place.
    ///
    /// When nothing is unscheduled the persisted schedule is returned as-is and
    /// no talk is touched. Talks that fit nowhere stay unscheduled and are left
    /// out of the result.
    ///
    /// Talks that are already scheduled keep their slot: they block their room
    /// and their presenter, but are not part of the returned schedule.
    pub fn build(&self, rooms: &[Room], talks: &mut [Talk]) -> Result<Schedule> {
        if rooms.is_empty() {
            return Err(SchedulerError::NoRooms);
        }

        // 依容量由大到小排序（穩定排序，同容量保留原順序）
        let mut ordered_rooms: Vec<&Room> = rooms.iter().collect();
        ordered_rooms.sort_by(|a, b| b.capacity.cmp(&a.capacity));

        // 尚未排程的演講，依時長由長到短排序；整個執行過程共用並逐步縮減
        let mut remaining: Vec<usize> = (0..talks.len())
            .filter(|&i| talks[i].is_unscheduled())
            .collect();
        if remaining.is_empty() {
            tracing::info!("No unscheduled talks, returning the existing schedule");
            return Ok(Schedule::from_existing(rooms, talks));
        }
        remaining.sort_by(|&a, &b| talks[b].duration_minutes.cmp(&talks[a].duration_minutes));

        tracing::info!(
            "Scheduling {} talks into {} rooms over {} day(s)",
            remaining.len(),
            rooms.len(),
            self.params.conference_days
        );

        let mut schedule = Schedule::with_rooms(rooms);
        let mut calendar = PresenterCalendar::new();
        let mut booked_rooms: HashMap<RoomId, Vec<TimeSpan>> = HashMap::new();
        for talk in talks.iter() {
            if let (Some(room), Some(span)) = (talk.placement.room(), talk.placement.span()) {
                calendar.commit(talk.presenter_id, span);
                booked_rooms.entry(room).or_default().push(span);
            }
        }

        for day in 0..self.params.conference_days {
            let Some((day_start, day_end)) = self.params.day_window(day) else {
                tracing::warn!("Conference day {} is past the supported date range", day + 1);
                break;
            };

            for room in &ordered_rooms {
                let booked = booked_rooms.get(&room.id).map(Vec::as_slice).unwrap_or(&[]);
                let mut current_time = day_start;

                while current_time < day_end {
                    // 游標落在既有預約或其後的休息時間內：跳到休息結束
                    if let Some(end) = booked
                        .iter()
                        .filter(|span| span.start <= current_time && self.in_break(span, current_time))
                        .map(|span| span.end)
                        .max()
                    {
                        match self.params.after_break(end) {
                            Some(next) => current_time = next,
                            None => break,
                        }
                        continue;
                    }

                    let picked = remaining.iter().position(|&i| {
                        talks[i].span_from(current_time).is_some_and(|span| {
                            span.end <= day_end
                                && self.clears_bookings(span, booked)
                                && calendar.is_available(talks[i].presenter_id, span)
                        })
                    });

                    // 沒有可放的演講：放棄此會議室當天剩餘時段
                    let Some(pos) = picked else {
                        break;
                    };

                    let talk = &mut talks[remaining.remove(pos)];
                    let Some(span) = talk.place(room.id, current_time) else {
                        break;
                    };
                    calendar.commit(talk.presenter_id, span);
                    if let Some(record) = talk.record() {
                        tracing::debug!(
                            "Placed talk {} ({} min) in room {} at {}",
                            record.talk_id,
                            record.duration_minutes,
                            room.id,
                            record.start_time
                        );
                        schedule.push(record);
                    }

                    // 休息結束超出可表示的時間範圍時，視同此會議室當天已滿
                    match self.params.after_break(span.end) {
                        Some(next) => current_time = next,
                        None => break,
                    }
                }
            }
        }

        if !remaining.is_empty() {
            tracing::warn!("{} talk(s) did not fit and remain unscheduled", remaining.len());
        }
        tracing::info!("Placed {} talk(s)", schedule.len());

        Ok(schedule)
    }

    /// `at` is before the end of the break that follows `booking`.
    fn in_break(&self, booking: &TimeSpan, at: NaiveDateTime) -> bool {
        self.params
            .after_break(booking.end)
            .map_or(true, |free| at < free)
    }

    /// `span` does not overlap any booking and leaves a full break before the next one.
    fn clears_bookings(&self, span: TimeSpan, booked: &[TimeSpan]) -> bool {
        booked.iter().all(|booking| {
            !booking.overlaps(&span)
                && (booking.start < span.start
                    || self
                        .params
                        .after_break(span.end)
                        .is_some_and(|free| free <= booking.start))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::availability::is_available;
    use crate::core::{Placement, PlacementRecord, TimeSpan};
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    fn params(
        days: u32,
        start: (u32, u32),
        end: (u32, u32),
        break_minutes: i64,
    ) -> ScheduleParams {
        ScheduleParams {
            conference_days: days,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            day_start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            break_duration: Duration::minutes(break_minutes),
        }
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1 + day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn room(id: u32, capacity: u32) -> Room {
        Room {
            id,
            name: format!("Room {}", id),
            capacity,
        }
    }

    fn talk(id: u32, presenter_id: u32, duration_minutes: u32) -> Talk {
        Talk {
            id,
            title: format!("Talk {}", id),
            description: String::new(),
            presenter_id,
            duration_minutes,
            placement: Placement::Unscheduled,
        }
    }

    fn assert_invariants(schedule: &Schedule, p: &ScheduleParams) {
        for placements in schedule.rooms.values() {
            for pair in placements.windows(2) {
                assert!(!pair[0].span().overlaps(&pair[1].span()));
                assert!(pair[1].start_time >= pair[0].end_time + p.break_duration);
            }
        }

        let all: Vec<&PlacementRecord> = schedule.placements().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                if a.presenter_id == b.presenter_id {
                    assert!(!a.span().overlaps(&b.span()), "presenter double-booked");
                }
            }

            let date = a.start_time.date();
            assert_eq!(a.end_time.date(), date);
            assert!(a.start_time >= date.and_time(p.day_start));
            assert!(a.end_time <= date.and_time(p.day_end));
        }
    }

    #[test]
    fn test_longest_talk_first() {
        let p = params(1, (9, 0), (17, 0), 15);
        let rooms = vec![room(1, 50)];
        let mut talks = vec![talk(1, 1, 90), talk(2, 2, 30), talk(3, 3, 60)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let placed: Vec<_> = schedule
            .room(1)
            .iter()
            .map(|r| (r.talk_id, r.start_time))
            .collect();
        assert_eq!(
            placed,
            vec![(1, at(1, 9, 0)), (3, at(1, 10, 45)), (2, at(1, 12, 0))]
        );
        assert_invariants(&schedule, &p);
    }

    #[test]
    fn test_largest_room_first() {
        let p = params(1, (9, 0), (17, 0), 10);
        let rooms = vec![room(1, 50), room(2, 100)];
        let mut talks = vec![talk(1, 1, 60), talk(2, 2, 45)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(talks[0].placement.room(), Some(2));
        // 大會議室的時段足夠，兩場都放進去
        assert_eq!(schedule.room(2).len(), 2);
        assert!(schedule.room(1).is_empty());
    }

    #[test]
    fn test_equal_capacity_keeps_room_order() {
        let p = params(1, (9, 0), (10, 0), 0);
        let rooms = vec![room(5, 80), room(3, 80)];
        let mut talks = vec![talk(1, 1, 60), talk(2, 2, 60)];

        ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(talks[0].placement.room(), Some(5));
        assert_eq!(talks[1].placement.room(), Some(3));
    }

    #[test]
    fn test_equal_duration_keeps_talk_order() {
        let p = params(1, (9, 0), (10, 0), 0);
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(4, 1, 30), talk(2, 2, 30), talk(9, 3, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let ids: Vec<_> = schedule.room(1).iter().map(|r| r.talk_id).collect();
        assert_eq!(ids, vec![4, 2]);
        assert!(talks[2].is_unscheduled());
    }

    #[test]
    fn test_same_presenter_is_serialized_in_single_room() {
        let p = params(1, (9, 0), (17, 0), 15);
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(1, 7, 30), talk(2, 7, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let starts: Vec<_> = schedule.room(1).iter().map(|r| r.start_time).collect();
        assert_eq!(starts, vec![at(1, 9, 0), at(1, 9, 45)]);
        assert_invariants(&schedule, &p);
    }

    #[test]
    fn test_same_presenter_not_parallel_across_rooms() {
        let p = params(1, (9, 0), (10, 0), 0);
        let rooms = vec![room(1, 100), room(2, 50)];
        let mut talks = vec![talk(1, 7, 60), talk(2, 7, 60)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        // 第二間會議室同一時段只會遇到同一位講者，因此放不下
        assert_eq!(schedule.len(), 1);
        assert!(schedule.room(2).is_empty());
        assert!(talks[1].is_unscheduled());

        let committed: Vec<_> = schedule.placements().cloned().collect();
        assert!(!is_available(7, TimeSpan::starting_at(at(1, 9, 0), 60), &committed));
    }

    #[test]
    fn test_first_fit_abandons_rest_of_window() {
        // 講者 1 整個時段都在 room 1，room 2 只能放講者 2 的演講
        let p = params(1, (9, 0), (11, 0), 0);
        let rooms = vec![room(1, 100), room(2, 50)];
        let mut talks = vec![talk(1, 1, 120), talk(2, 1, 60), talk(3, 2, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let room1: Vec<_> = schedule.room(1).iter().map(|r| r.talk_id).collect();
        let room2: Vec<_> = schedule.room(2).iter().map(|r| r.talk_id).collect();
        assert_eq!(room1, vec![1]);
        assert_eq!(room2, vec![3]);
        // 9:30 之後沒有可放的演講，room 2 剩下的時段直接放棄
        assert!(talks[1].is_unscheduled());
    }

    #[test]
    fn test_talks_never_cross_day_end() {
        let p = params(2, (9, 0), (10, 0), 0);
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(1, 1, 45), talk(2, 2, 45), talk(3, 3, 90)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let placed: Vec<_> = schedule
            .room(1)
            .iter()
            .map(|r| (r.talk_id, r.start_time))
            .collect();
        assert_eq!(placed, vec![(1, at(1, 9, 0)), (2, at(2, 9, 0))]);
        assert!(talks[2].is_unscheduled());
        assert_invariants(&schedule, &p);
    }

    #[test]
    fn test_talk_exactly_filling_window_is_placed() {
        let p = params(1, (9, 0), (10, 0), 15);
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(1, 1, 60)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(schedule.room(1)[0].end_time, at(1, 10, 0));
    }

    #[test]
    fn test_no_rooms_is_an_error() {
        let p = params(1, (9, 0), (17, 0), 15);
        let mut talks = vec![talk(1, 1, 30)];

        let err = ScheduleBuilder::new(&p).build(&[], &mut talks).unwrap_err();

        assert!(matches!(err, SchedulerError::NoRooms));
        assert!(talks[0].is_unscheduled());
    }

    #[test]
    fn test_rerun_returns_existing_schedule_unchanged() {
        let p = params(1, (9, 0), (17, 0), 15);
        let rooms = vec![room(1, 100), room(2, 50)];
        let mut talks = vec![talk(1, 1, 60), talk(2, 2, 30), talk(3, 3, 45)];

        let first = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();
        let before = talks.clone();

        let later = params(3, (8, 0), (20, 0), 0);
        let second = ScheduleBuilder::new(&later).build(&rooms, &mut talks).unwrap();

        assert_eq!(first, second);
        assert_eq!(before, talks);
    }

    #[test]
    fn test_only_unscheduled_talks_are_placed() {
        let p = params(1, (9, 0), (17, 0), 0);
        let rooms = vec![room(1, 10)];
        let mut fixed = talk(1, 1, 30);
        fixed.place(1, at(1, 15, 0));
        let mut talks = vec![fixed.clone(), talk(2, 2, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(talks[0], fixed);
        let ids: Vec<_> = schedule.room(1).iter().map(|r| r.talk_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_existing_booking_blocks_room_and_presenter() {
        let p = params(1, (9, 0), (12, 0), 0);
        let rooms = vec![room(1, 100), room(2, 50)];
        let mut booked = talk(1, 1, 60);
        booked.place(1, at(1, 9, 0));
        let mut talks = vec![booked, talk(2, 2, 60), talk(3, 1, 60)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        let room1: Vec<_> = schedule
            .room(1)
            .iter()
            .map(|r| (r.talk_id, r.start_time))
            .collect();
        assert_eq!(room1, vec![(2, at(1, 10, 0)), (3, at(1, 11, 0))]);
        assert!(schedule.room(2).is_empty());
    }

    #[test]
    fn test_candidate_may_not_run_into_existing_booking() {
        let p = params(1, (9, 0), (12, 0), 0);
        let rooms = vec![room(1, 100)];
        let mut booked = talk(1, 1, 30);
        booked.place(1, at(1, 10, 0));
        let mut talks = vec![booked, talk(2, 2, 90), talk(3, 3, 45)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        // 90 分鐘的演講會撞到 10:00 的預約，先放 45 分鐘的
        let placed: Vec<_> = schedule
            .room(1)
            .iter()
            .map(|r| (r.talk_id, r.start_time))
            .collect();
        assert_eq!(placed, vec![(3, at(1, 9, 0))]);
        assert!(talks[1].is_unscheduled());
    }

    #[test]
    fn test_existing_booking_keeps_break_on_both_sides() {
        let p = params(1, (9, 0), (12, 0), 15);
        let rooms = vec![room(1, 100)];
        let mut booked = talk(1, 1, 30);
        booked.place(1, at(1, 10, 0));
        let mut talks = vec![booked.clone(), talk(2, 2, 60), talk(3, 3, 45)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        // 60 分鐘的演講在 09:00 會緊貼 10:00 的預約，沒有休息時間
        let placed: Vec<_> = schedule
            .room(1)
            .iter()
            .map(|r| (r.talk_id, r.start_time))
            .collect();
        assert_eq!(placed, vec![(3, at(1, 9, 0)), (2, at(1, 10, 45))]);

        let mut spans: Vec<TimeSpan> = schedule.room(1).iter().map(|r| r.span()).collect();
        spans.push(booked.placement.span().unwrap());
        spans.sort();
        for pair in spans.windows(2) {
            assert!(pair[1].start >= pair[0].end + p.break_duration);
        }
    }

    #[test]
    fn test_break_applies_when_day_opens_at_booking_end() {
        let p = params(1, (9, 0), (12, 0), 15);
        let rooms = vec![room(1, 100)];
        let mut booked = talk(1, 1, 60);
        booked.place(1, at(1, 8, 0));
        let mut talks = vec![booked, talk(2, 2, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(schedule.room(1)[0].start_time, at(1, 9, 15));
    }

    #[test]
    fn test_huge_break_ends_room_day_without_panic() {
        let mut p = params(1, (9, 0), (17, 0), 0);
        p.break_duration = Duration::minutes(1_000_000_000_000);
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(1, 1, 60), talk(2, 2, 30)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.room(1)[0].talk_id, 1);
        assert!(talks[1].is_unscheduled());
    }

    #[test]
    fn test_days_past_calendar_end_are_skipped() {
        let mut p = params(3, (9, 0), (10, 0), 0);
        p.start_date = NaiveDate::MAX;
        let rooms = vec![room(1, 10)];
        let mut talks = vec![talk(1, 1, 60), talk(2, 2, 60)];

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_eq!(schedule.len(), 1);
        assert!(talks[1].is_unscheduled());
    }

    #[test]
    fn test_many_talks_hold_invariants() {
        let p = params(2, (9, 0), (13, 0), 10);
        let rooms = vec![room(1, 30), room(2, 120), room(3, 60)];
        let durations = [20, 45, 90, 30, 60, 15, 75, 45, 30, 120, 50, 40];
        let mut talks: Vec<Talk> = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| talk(i as u32 + 1, (i as u32 % 4) + 1, d))
            .collect();

        let schedule = ScheduleBuilder::new(&p).build(&rooms, &mut talks).unwrap();

        assert_invariants(&schedule, &p);
        let scheduled = talks.iter().filter(|t| !t.is_unscheduled()).count();
        assert_eq!(scheduled, schedule.len());
    }

    #[test]
    fn test_build_is_deterministic() {
        let p = params(1, (9, 0), (12, 0), 5);
        let rooms = vec![room(1, 30), room(2, 30)];
        let make = || -> Vec<Talk> {
            vec![talk(1, 1, 30), talk(2, 1, 30), talk(3, 2, 60), talk(4, 3, 60)]
        };

        let mut a = make();
        let mut b = make();
        let first = ScheduleBuilder::new(&p).build(&rooms, &mut a).unwrap();
        let second = ScheduleBuilder::new(&p).build(&rooms, &mut b).unwrap();

        assert_eq!(first, second);
        assert_eq!(a, b);
    }
}
