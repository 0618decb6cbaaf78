use crate::core::{Placement, Room, RoomId, Talk, TalkId, TimeSpan};
use crate::utils::error::{Result, SchedulerError};
use chrono::NaiveDateTime;

/// Puts one talk into `room_id` at `start`, replacing any earlier placement of it.
///
/// Fails with a conflict when another talk already occupies the room during the
/// requested span; the talks are left untouched in that case. Presenter
/// availability is not checked here.
pub fn schedule_talk<'t>(
    rooms: &[Room],
    talks: &'t mut [Talk],
    talk_id: TalkId,
    room_id: RoomId,
    start: NaiveDateTime,
) -> Result<&'t Talk> {
    if !rooms.iter().any(|room| room.id == room_id) {
        return Err(SchedulerError::RoomNotFound(room_id));
    }

    let index = talks
        .iter()
        .position(|talk| talk.id == talk_id)
        .ok_or(SchedulerError::TalkNotFound(talk_id))?;
    let requested = talks[index]
        .span_from(start)
        .ok_or(SchedulerError::StartOutOfRange {
            start,
            minutes: talks[index].duration_minutes,
        })?;

    if let Some((other, span)) = find_room_conflict(talks, talk_id, room_id, requested) {
        tracing::debug!(
            "Talk {} conflicts with talk {} in room {}",
            talk_id,
            other,
            room_id
        );
        return Err(SchedulerError::Conflict {
            room_id,
            conflicting_talk: other,
            start: span.start,
            end: span.end,
        });
    }

    let talk = &mut talks[index];
    talk.placement = Placement::Scheduled {
        room: room_id,
        start: requested.start,
        end: requested.end,
    };
    Ok(talk)
}

fn find_room_conflict(
    talks: &[Talk],
    talk_id: TalkId,
    room_id: RoomId,
    requested: TimeSpan,
) -> Option<(TalkId, TimeSpan)> {
    talks
        .iter()
        .filter(|talk| talk.id != talk_id && talk.placement.room() == Some(room_id))
        .filter_map(|talk| talk.placement.span().map(|span| (talk.id, span)))
        .find(|(_, span)| span.start < requested.end && span.end > requested.start)
}
