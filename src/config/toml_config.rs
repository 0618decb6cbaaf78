use crate::adapters::DEFAULT_STORE_FILE;
use crate::core::request::{
    ScheduleRequest, DEFAULT_BREAK_MINUTES, DEFAULT_DAY_END, DEFAULT_DAY_START,
};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SchedulerError};
use crate::utils::logger::LOG_LEVELS;
use crate::utils::validation::{validate_path, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub conference: ConferenceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceConfig {
    pub days: i64,
    pub start_date: Option<NaiveDate>,
    pub day_start_time: String,
    pub day_end_time: String,
    pub break_duration: i64,
}

impl Default for ConferenceConfig {
    fn default() -> Self {
        Self {
            days: 1,
            start_date: None,
            day_start_time: DEFAULT_DAY_START.to_string(),
            day_end_time: DEFAULT_DAY_END.to_string(),
            break_duration: DEFAULT_BREAK_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: String,
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            file_name: DEFAULT_STORE_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
    /// trace, debug, info, warn or error
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SchedulerError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SchedulerError::ConfigValidation {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以設定檔中的會議參數組出排程請求
    pub fn schedule_request(&self) -> ScheduleRequest {
        ScheduleRequest {
            conference_days: self.conference.days,
            start_date: self.conference.start_date,
            day_start_time: self.conference.day_start_time.clone(),
            day_end_time: self.conference.day_end_time.clone(),
            break_duration: self.conference.break_duration,
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_dir(&self) -> &str {
        &self.store.data_dir
    }

    fn store_file(&self) -> &str {
        &self.store.file_name
    }
}

/// 只檢查儲存與日誌設定；會議參數在命令列覆蓋後由 `ScheduleRequest` 驗證
impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("store.data_dir", &self.store.data_dir)?;
        validate_path("store.file_name", &self.store.file_name)?;

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level) {
                return Err(SchedulerError::InvalidConfigValue {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Expected one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }
        Ok(())
    }
}
