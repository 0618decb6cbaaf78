use crate::core::builder::ScheduleBuilder;
use crate::core::manual;
use crate::core::{
    PresenterId, Room, RoomId, Schedule, ScheduleParams, Talk, TalkId, TalkRepository,
    TalkUpdate,
};
use crate::utils::error::{Result, SchedulerError};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

/// Runs scheduling operations against a repository, one at a time.
///
/// Every operation loads the snapshot, works on it and commits it while
/// holding the lock, so an optimize run never interleaves with another run
/// or with a manual booking.
pub struct SchedulerEngine<R: TalkRepository> {
    repository: Mutex<R>,
    monitor: SystemMonitor,
}

impl<R: TalkRepository> SchedulerEngine<R> {
    pub fn new(repository: R) -> Self {
        Self::new_with_monitoring(repository, false)
    }

    pub fn new_with_monitoring(repository: R, monitor_enabled: bool) -> Self {
        Self {
            repository: Mutex::new(repository),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Fills every unscheduled talk that fits and commits the run as a whole.
    pub async fn optimize(&self, params: &ScheduleParams) -> Result<Schedule> {
        let repository = self.repository.lock().await;

        let mut snapshot = repository.load().await?;
        tracing::info!(
            "Loaded {} rooms and {} talks ({} unscheduled)",
            snapshot.rooms.len(),
            snapshot.talks.len(),
            snapshot.unscheduled_count()
        );
        self.monitor.log_stats("Load");

        let unscheduled_before = snapshot.unscheduled_count();
        let schedule = ScheduleBuilder::new(params).build(&snapshot.rooms, &mut snapshot.talks)?;
        self.monitor.log_stats("Build");

        // 沒有新的 placement 時不寫回，重複執行不會改動儲存內容
        if snapshot.unscheduled_count() < unscheduled_before {
            repository.commit(&snapshot).await?;
            tracing::info!("Committed {} placement(s)", schedule.len());
            self.monitor.log_stats("Commit");
        }

        Ok(schedule)
    }

    pub async fn current_schedule(&self) -> Result<Schedule> {
        let repository = self.repository.lock().await;
        let snapshot = repository.load().await?;
        Ok(Schedule::from_existing(&snapshot.rooms, &snapshot.talks))
    }

    /// Returns every talk to the unscheduled state.
    pub async fn reset(&self) -> Result<usize> {
        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        let mut cleared = 0;
        for talk in snapshot.talks.iter_mut().filter(|t| !t.is_unscheduled()) {
            talk.clear_placement();
            cleared += 1;
        }

        repository.commit(&snapshot).await?;
        tracing::info!("Schedule has been reset ({} talk(s) cleared)", cleared);
        Ok(cleared)
    }

    pub async fn schedule_talk(
        &self,
        talk_id: TalkId,
        room_id: RoomId,
        start: NaiveDateTime,
    ) -> Result<Talk> {
        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        let talk =
            manual::schedule_talk(&snapshot.rooms, &mut snapshot.talks, talk_id, room_id, start)?
                .clone();
        repository.commit(&snapshot).await?;

        tracing::info!("Scheduled talk {} in room {} at {}", talk_id, room_id, start);
        Ok(talk)
    }

    pub async fn add_room(&self, name: &str, capacity: u32) -> Result<Room> {
        validate_non_empty_string("name", name)?;

        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        if snapshot.rooms.iter().any(|room| room.name == name) {
            return Err(SchedulerError::InvalidConfigValue {
                field: "name".to_string(),
                value: name.to_string(),
                reason: "A room with this name already exists".to_string(),
            });
        }

        let room = Room {
            id: snapshot.next_room_id(),
            name: name.to_string(),
            capacity,
        };
        snapshot.rooms.push(room.clone());
        repository.commit(&snapshot).await?;

        tracing::info!("Created room {} '{}' (capacity {})", room.id, room.name, capacity);
        Ok(room)
    }

    pub async fn add_talk(
        &self,
        title: &str,
        description: &str,
        presenter_id: PresenterId,
        duration_minutes: u32,
    ) -> Result<Talk> {
        validate_non_empty_string("title", title)?;
        validate_positive_number("duration_minutes", i64::from(duration_minutes), 1)?;

        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        let talk = Talk {
            id: snapshot.next_talk_id(),
            title: title.to_string(),
            description: description.to_string(),
            presenter_id,
            duration_minutes,
            placement: Default::default(),
        };
        snapshot.talks.push(talk.clone());
        repository.commit(&snapshot).await?;

        tracing::info!("Created talk {} '{}' ({} min)", talk.id, talk.title, duration_minutes);
        Ok(talk)
    }

    /// Edits a talk in place. A new presenter or duration drops its placement.
    pub async fn update_talk(&self, talk_id: TalkId, update: TalkUpdate) -> Result<Talk> {
        if let Some(title) = &update.title {
            validate_non_empty_string("title", title)?;
        }
        if let Some(duration) = update.duration_minutes {
            validate_positive_number("duration_minutes", i64::from(duration), 1)?;
        }

        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        let talk = snapshot
            .talks
            .iter_mut()
            .find(|talk| talk.id == talk_id)
            .ok_or(SchedulerError::TalkNotFound(talk_id))?;

        if update.invalidates_placement(talk) && !talk.is_unscheduled() {
            tracing::info!("Talk {} changed presenter or duration, clearing its placement", talk_id);
            talk.clear_placement();
        }
        if let Some(title) = update.title {
            talk.title = title;
        }
        if let Some(description) = update.description {
            talk.description = description;
        }
        if let Some(presenter_id) = update.presenter_id {
            talk.presenter_id = presenter_id;
        }
        if let Some(duration) = update.duration_minutes {
            talk.duration_minutes = duration;
        }
        let talk = talk.clone();

        repository.commit(&snapshot).await?;
        tracing::info!("Updated talk {} '{}'", talk.id, talk.title);
        Ok(talk)
    }

    pub async fn remove_talk(&self, talk_id: TalkId) -> Result<()> {
        let repository = self.repository.lock().await;
        let mut snapshot = repository.load().await?;

        let before = snapshot.talks.len();
        snapshot.talks.retain(|talk| talk.id != talk_id);
        if snapshot.talks.len() == before {
            return Err(SchedulerError::TalkNotFound(talk_id));
        }

        repository.commit(&snapshot).await?;
        tracing::info!("Deleted talk {}", talk_id);
        Ok(())
    }

    pub async fn rooms(&self) -> Result<Vec<Room>> {
        Ok(self.repository.lock().await.load().await?.rooms)
    }

    pub async fn talks(&self) -> Result<Vec<Talk>> {
        Ok(self.repository.lock().await.load().await?.talks)
    }
}
