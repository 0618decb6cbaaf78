use crate::core::ScheduleParams;
use crate::utils::error::{Result, SchedulerError};
use crate::utils::validation::{parse_time_of_day, Validate};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_START: &str = "09:00";
pub const DEFAULT_DAY_END: &str = "18:00";
pub const DEFAULT_BREAK_MINUTES: i64 = 15;
pub const MAX_CONFERENCE_DAYS: i64 = 366;

/// Raw optimize parameters as they arrive from the command line or a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub conference_days: i64,
    /// First conference day. Defaults to the day after the run.
    pub start_date: Option<NaiveDate>,
    pub day_start_time: String,
    pub day_end_time: String,
    pub break_duration: i64,
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self {
            conference_days: 1,
            start_date: None,
            day_start_time: DEFAULT_DAY_START.to_string(),
            day_end_time: DEFAULT_DAY_END.to_string(),
            break_duration: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl ScheduleRequest {
    /// 驗證並轉換成排程參數；`today` 只在未指定開始日期時使用
    pub fn into_params(self, today: NaiveDate) -> Result<ScheduleParams> {
        self.validate()?;

        let day_start = parse_time_of_day("day_start_time", &self.day_start_time)?;
        let day_end = parse_time_of_day("day_end_time", &self.day_end_time)?;
        let conference_days = u32::try_from(self.conference_days).map_err(|_| {
            SchedulerError::InvalidDayCount {
                value: self.conference_days,
            }
        })?;

        Ok(ScheduleParams {
            conference_days,
            start_date: self.start_date.unwrap_or(today + Duration::days(1)),
            day_start,
            day_end,
            break_duration: Duration::minutes(self.break_duration),
        })
    }
}

impl Validate for ScheduleRequest {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_CONFERENCE_DAYS).contains(&self.conference_days) {
            return Err(SchedulerError::InvalidDayCount {
                value: self.conference_days,
            });
        }

        let day_start = parse_time_of_day("day_start_time", &self.day_start_time)?;
        let day_end = parse_time_of_day("day_end_time", &self.day_end_time)?;
        if day_end <= day_start {
            return Err(SchedulerError::InvalidWindow {
                day_start: self.day_start_time.clone(),
                day_end: self.day_end_time.clone(),
            });
        }

        // 休息時間不可超過每日時段長度
        let window_minutes = (day_end - day_start).num_minutes();
        if !(0..=window_minutes).contains(&self.break_duration) {
            return Err(SchedulerError::InvalidBreak {
                value: self.break_duration,
                max: window_minutes,
            });
        }

        Ok(())
    }
}
