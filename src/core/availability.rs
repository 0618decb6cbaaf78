use crate::core::{PlacementRecord, PresenterId, TimeSpan};
use std::collections::HashMap;

/// Returns true when no committed placement of `presenter` overlaps `[start, end)`.
pub fn is_available(
    presenter: PresenterId,
    span: TimeSpan,
    committed: &[PlacementRecord],
) -> bool {
    !committed
        .iter()
        .filter(|record| record.presenter_id == presenter)
        .any(|record| span.overlaps(&record.span()))
}

/// Per-presenter index over the placements committed in one run.
///
/// Answers exactly like [`is_available`] over the same records, but only looks
/// at the spans of the queried presenter.
#[derive(Debug, Default)]
pub struct PresenterCalendar {
    booked: HashMap<PresenterId, Vec<TimeSpan>>,
}

impl PresenterCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_available(&self, presenter: PresenterId, span: TimeSpan) -> bool {
        self.booked
            .get(&presenter)
            .map_or(true, |spans| !spans.iter().any(|booked| span.overlaps(booked)))
    }

    pub fn commit(&mut self, presenter: PresenterId, span: TimeSpan) {
        self.booked.entry(presenter).or_default().push(span);
    }
}
