use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("No rooms available")]
    NoRooms,

    #[error("Invalid time of day for {field}: '{value}' (expected HH:MM)")]
    InvalidTimeOfDay { field: String, value: String },

    #[error("Invalid conference day count: {value} (must be between 1 and 366)")]
    InvalidDayCount { value: i64 },

    #[error("Day window is empty: end {day_end} must be later than start {day_start}")]
    InvalidWindow { day_start: String, day_end: String },

    #[error("Invalid break duration: {value} minutes (must be between 0 and {max})")]
    InvalidBreak { value: i64, max: i64 },

    #[error("A {minutes}-minute talk starting at {start} ends past the supported date range")]
    StartOutOfRange { start: NaiveDateTime, minutes: u32 },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Room {room_id} is already booked for the selected time (talk {conflicting_talk} from {start} to {end})")]
    Conflict {
        room_id: u32,
        conflicting_talk: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Talk {0} not found")]
    TalkNotFound(u32),

    #[error("Room {0} not found")]
    RoomNotFound(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Conflict,
    NotFound,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SchedulerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoRooms
            | Self::InvalidTimeOfDay { .. }
            | Self::InvalidDayCount { .. }
            | Self::InvalidWindow { .. }
            | Self::InvalidBreak { .. }
            | Self::StartOutOfRange { .. } => ErrorCategory::Input,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::TalkNotFound(_) | Self::RoomNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidConfigValue { .. } | Self::ConfigValidation { .. } => {
                ErrorCategory::Configuration
            }
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conflict | ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端輸入錯誤，在排程開始前就被拒絕
    pub fn is_input_error(&self) -> bool {
        self.category() == ErrorCategory::Input
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::NoRooms => "Create at least one room with `add-room` before optimizing",
            Self::InvalidTimeOfDay { .. } => "Use 24-hour HH:MM times, e.g. 09:00",
            Self::InvalidDayCount { .. } => "Pass between 1 and 366 conference days",
            Self::InvalidWindow { .. } => "Make the day end time later than the day start time",
            Self::InvalidBreak { .. } => "Use a break no longer than the daily time window",
            Self::StartOutOfRange { .. } => "Pick a start time within the conference dates",
            Self::InvalidConfigValue { .. } | Self::ConfigValidation { .. } => {
                "Check the configuration file and command line flags"
            }
            Self::Conflict { .. } => "Pick another room or a start time outside the booked slot",
            Self::TalkNotFound(_) => "Run `list` to see the known talk ids",
            Self::RoomNotFound(_) => "Run `list` to see the known room ids",
            Self::Io(_) => "Check that the data directory exists and is writable",
            Self::Serialization(_) => "The store file is corrupt; restore it or run `reset`",
            Self::Csv(_) => "Check that the CSV output path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid scheduling request: {}", self),
            ErrorCategory::Conflict => format!("Scheduling conflict: {}", self),
            ErrorCategory::NotFound => self.to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("Could not access the schedule store: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
