pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use command::{CliConfig, Command, OptimizeArgs};

#[cfg(feature = "cli")]
mod command {
    use super::toml_config::TomlConfig;
    use crate::core::request::ScheduleRequest;
    use crate::utils::error::Result;
    use chrono::{NaiveDate, NaiveDateTime};
    use clap::{Args, Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "talk-scheduler")]
    #[command(about = "Greedy conference talk scheduler")]
    pub struct CliConfig {
        /// Path to a TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Directory holding the schedule store
        #[arg(long)]
        pub data_dir: Option<String>,

        /// File name of the schedule store inside the data directory
        #[arg(long)]
        pub store_file: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Place every unscheduled talk
        Optimize(OptimizeArgs),
        /// Print the current schedule
        Show {
            #[arg(long)]
            csv: Option<String>,
        },
        /// Clear every placement
        Reset,
        /// Book one talk into a room at a given start
        Schedule {
            #[arg(long)]
            talk: u32,
            #[arg(long)]
            room: u32,
            /// Start time, e.g. 2025-06-02T10:00:00
            #[arg(long)]
            start: NaiveDateTime,
        },
        AddRoom {
            #[arg(long)]
            name: String,
            #[arg(long)]
            capacity: u32,
        },
        AddTalk {
            #[arg(long)]
            title: String,
            #[arg(long, default_value = "")]
            description: String,
            #[arg(long)]
            presenter: u32,
            #[arg(long)]
            duration: u32,
        },
        /// Edit a talk; changing presenter or duration unschedules it
        UpdateTalk {
            #[arg(long)]
            id: u32,
            #[arg(long)]
            title: Option<String>,
            #[arg(long)]
            description: Option<String>,
            #[arg(long)]
            presenter: Option<u32>,
            #[arg(long)]
            duration: Option<u32>,
        },
        RemoveTalk {
            #[arg(long)]
            id: u32,
        },
        /// List rooms and talks
        List,
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct OptimizeArgs {
        #[arg(long)]
        pub days: Option<i64>,
        /// First conference day (YYYY-MM-DD), defaults to tomorrow
        #[arg(long)]
        pub start_date: Option<NaiveDate>,
        /// Daily start time (HH:MM)
        #[arg(long)]
        pub day_start: Option<String>,
        /// Daily end time (HH:MM)
        #[arg(long)]
        pub day_end: Option<String>,
        #[arg(long)]
        pub break_minutes: Option<i64>,
        /// Also write the resulting schedule as CSV
        #[arg(long)]
        pub csv: Option<String>,
    }

    impl OptimizeArgs {
        /// 命令列參數覆蓋設定檔中的會議參數
        pub fn apply(&self, mut request: ScheduleRequest) -> ScheduleRequest {
            if let Some(days) = self.days {
                request.conference_days = days;
            }
            if self.start_date.is_some() {
                request.start_date = self.start_date;
            }
            if let Some(day_start) = &self.day_start {
                request.day_start_time = day_start.clone();
            }
            if let Some(day_end) = &self.day_end {
                request.day_end_time = day_end.clone();
            }
            if let Some(break_minutes) = self.break_minutes {
                request.break_duration = break_minutes;
            }
            request
        }
    }

    impl CliConfig {
        /// 載入設定檔（若有指定）並套用命令列覆蓋設定
        pub fn resolve(&self) -> Result<TomlConfig> {
            let mut config = match &self.config {
                Some(path) => TomlConfig::from_file(path)?,
                None => TomlConfig::default(),
            };

            if let Some(data_dir) = &self.data_dir {
                config.store.data_dir = data_dir.clone();
            }
            if let Some(store_file) = &self.store_file {
                config.store.file_name = store_file.clone();
            }
            if self.monitor {
                config.monitoring.get_or_insert_with(Default::default).enabled = true;
            }

            Ok(config)
        }
    }

}
