pub mod availability;
pub mod builder;
pub mod engine;
pub mod export;
pub mod manual;
pub mod request;

pub use crate::domain::model::{
    Placement, PlacementRecord, PresenterId, Room, RoomId, Schedule, ScheduleParams, Snapshot,
    Talk, TalkId, TalkUpdate, TimeSpan,
};
pub use crate::domain::ports::{ConfigProvider, Storage, TalkRepository};
pub use crate::utils::error::Result;
