use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RoomId = u32;
pub type TalkId = u32;
pub type PresenterId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Only used to order rooms, larger rooms are filled first.
    pub capacity: u32,
}

/// Half-open time span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSpan {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[cfg(test)]
    pub fn starting_at(start: NaiveDateTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }
}

/// 一場演講的排程狀態：room、start、end 必須同時存在或同時不存在
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Unscheduled,
    Scheduled {
        room: RoomId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Placement {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Placement::Scheduled { .. })
    }

    pub fn room(&self) -> Option<RoomId> {
        match self {
            Placement::Scheduled { room, .. } => Some(*room),
            Placement::Unscheduled => None,
        }
    }

    pub fn span(&self) -> Option<TimeSpan> {
        match self {
            Placement::Scheduled { start, end, .. } => Some(TimeSpan::new(*start, *end)),
            Placement::Unscheduled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub id: TalkId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub presenter_id: PresenterId,
    pub duration_minutes: u32,
    #[serde(default)]
    pub placement: Placement,
}

impl Talk {
    pub fn is_unscheduled(&self) -> bool {
        !self.placement.is_scheduled()
    }

    /// Span the talk would occupy from `start`, or `None` past the representable range.
    pub fn span_from(&self, start: NaiveDateTime) -> Option<TimeSpan> {
        let end = start.checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))?;
        Some(TimeSpan::new(start, end))
    }

    /// Places the talk in `room` starting at `start`, returning the occupied span.
    pub fn place(&mut self, room: RoomId, start: NaiveDateTime) -> Option<TimeSpan> {
        let span = self.span_from(start)?;
        self.placement = Placement::Scheduled {
            room,
            start: span.start,
            end: span.end,
        };
        Some(span)
    }

    pub fn clear_placement(&mut self) {
        self.placement = Placement::Unscheduled;
    }

    pub fn record(&self) -> Option<PlacementRecord> {
        match self.placement {
            Placement::Scheduled { room, start, end } => Some(PlacementRecord {
                room_id: room,
                talk_id: self.id,
                presenter_id: self.presenter_id,
                start_time: start,
                end_time: end,
                title: self.title.clone(),
                duration_minutes: self.duration_minutes,
            }),
            Placement::Unscheduled => None,
        }
    }
}

/// Partial edit of a talk; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub presenter_id: Option<PresenterId>,
    pub duration_minutes: Option<u32>,
}

impl TalkUpdate {
    /// 講者或時長改變時，原本的時段已不再可靠
    pub fn invalidates_placement(&self, talk: &Talk) -> bool {
        self.presenter_id.is_some_and(|p| p != talk.presenter_id)
            || self.duration_minutes.is_some_and(|d| d != talk.duration_minutes)
    }
}

/// Output unit of a scheduling run, one per scheduled talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub room_id: RoomId,
    pub talk_id: TalkId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub title: String,
    pub presenter_id: PresenterId,
    pub duration_minutes: u32,
}

impl PlacementRecord {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.end_time)
    }
}

/// Room id -> placements ordered by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub rooms: BTreeMap<RoomId, Vec<PlacementRecord>>,
}

impl Schedule {
    pub fn with_rooms(rooms: &[Room]) -> Self {
        Self {
            rooms: rooms.iter().map(|room| (room.id, Vec::new())).collect(),
        }
    }

    /// 由已持久化的演講組出現有排程（不做任何修改）
    pub fn from_existing(rooms: &[Room], talks: &[Talk]) -> Self {
        let mut schedule = Self::with_rooms(rooms);
        for record in talks.iter().filter_map(Talk::record) {
            if let Some(entries) = schedule.rooms.get_mut(&record.room_id) {
                entries.push(record);
            }
        }
        for entries in schedule.rooms.values_mut() {
            entries.sort_by_key(|record| record.start_time);
        }
        schedule
    }

    pub fn push(&mut self, record: PlacementRecord) {
        self.rooms.entry(record.room_id).or_default().push(record);
    }

    pub fn placements(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.rooms.values().flatten()
    }

    pub fn room(&self, room_id: RoomId) -> &[PlacementRecord] {
        self.rooms.get(&room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rooms.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validated parameters of one optimize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleParams {
    pub conference_days: u32,
    /// First conference day; day `n` is `start_date + (n - 1)`.
    pub start_date: NaiveDate,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub break_duration: Duration,
}

impl ScheduleParams {
    /// Start and end of conference day `day_index` (0-based), `None` past the calendar range.
    pub fn day_window(&self, day_index: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let date = self
            .start_date
            .checked_add_days(Days::new(u64::from(day_index)))?;
        Some((date.and_time(self.day_start), date.and_time(self.day_end)))
    }

    /// First instant a room is free again after a talk ending at `end`.
    pub fn after_break(&self, end: NaiveDateTime) -> Option<NaiveDateTime> {
        end.checked_add_signed(self.break_duration)
    }
}

/// Whole contents of the talk/room store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub talks: Vec<Talk>,
}

impl Snapshot {
    pub fn next_room_id(&self) -> RoomId {
        self.rooms.iter().map(|room| room.id).max().unwrap_or(0) + 1
    }

    pub fn next_talk_id(&self) -> TalkId {
        self.talks.iter().map(|talk| talk.id).max().unwrap_or(0) + 1
    }

    pub fn unscheduled_count(&self) -> usize {
        self.talks.iter().filter(|talk| talk.is_unscheduled()).count()
    }
}
