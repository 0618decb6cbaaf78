use clap::Parser;
use serde::Serialize;
use talk_scheduler::core::export;
use talk_scheduler::core::{ConfigProvider, TalkUpdate};
use talk_scheduler::utils::error::ErrorSeverity;
use talk_scheduler::utils::{logger, validation::Validate};
use talk_scheduler::{
    CliConfig, Command, JsonStore, LocalStorage, Schedule, SchedulerEngine, SchedulerError,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let resolved = cli.resolve();
    let log_level = resolved.as_ref().ok().and_then(|config| config.log_level());

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose, log_level);
    } else {
        logger::init_cli_logger(cli.verbose, log_level);
    }

    tracing::info!("Starting talk-scheduler");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match resolved {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: TomlConfig) -> Result<(), SchedulerError> {
    config.validate()?;

    let storage = LocalStorage::new(config.data_dir());
    let store = JsonStore::new(storage, config.store_file());
    let engine = SchedulerEngine::new_with_monitoring(store, config.monitoring_enabled());

    tracing::debug!("Using store {}/{}", config.data_dir(), config.store_file());

    match command {
        Command::Optimize(args) => {
            let request = args.apply(config.schedule_request());
            let today = chrono::Local::now().date_naive();
            let params = request.into_params(today)?;
            tracing::info!(
                "Optimizing {} day(s) from {} ({} - {}, {} min breaks)",
                params.conference_days,
                params.start_date,
                params.day_start,
                params.day_end,
                params.break_duration.num_minutes()
            );

            let schedule = engine.optimize(&params).await?;
            write_csv_if_requested(&schedule, args.csv.as_deref())?;
            print_json(&schedule)?;
        }
        Command::Show { csv } => {
            let schedule = engine.current_schedule().await?;
            write_csv_if_requested(&schedule, csv.as_deref())?;
            print_json(&schedule)?;
        }
        Command::Reset => {
            let cleared = engine.reset().await?;
            println!("✅ Schedule has been reset ({} talk(s) cleared)", cleared);
        }
        Command::Schedule { talk, room, start } => {
            let talk = engine.schedule_talk(talk, room, start).await?;
            print_json(&talk)?;
        }
        Command::AddRoom { name, capacity } => {
            let room = engine.add_room(&name, capacity).await?;
            print_json(&room)?;
        }
        Command::AddTalk {
            title,
            description,
            presenter,
            duration,
        } => {
            let talk = engine
                .add_talk(&title, &description, presenter, duration)
                .await?;
            print_json(&talk)?;
        }
        Command::UpdateTalk {
            id,
            title,
            description,
            presenter,
            duration,
        } => {
            let update = TalkUpdate {
                title,
                description,
                presenter_id: presenter,
                duration_minutes: duration,
            };
            let talk = engine.update_talk(id, update).await?;
            print_json(&talk)?;
        }
        Command::RemoveTalk { id } => {
            engine.remove_talk(id).await?;
            println!("✅ Talk {} deleted", id);
        }
        Command::List => {
            #[derive(Serialize)]
            struct Listing {
                rooms: Vec<talk_scheduler::core::Room>,
                talks: Vec<talk_scheduler::core::Talk>,
            }
            let listing = Listing {
                rooms: engine.rooms().await?,
                talks: engine.talks().await?,
            };
            print_json(&listing)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SchedulerError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_csv_if_requested(schedule: &Schedule, path: Option<&str>) -> Result<(), SchedulerError> {
    if let Some(path) = path {
        let file = std::fs::File::create(path)?;
        export::write_csv(schedule, file)?;
        tracing::info!("📁 CSV written to {}", path);
    }
    Ok(())
}
