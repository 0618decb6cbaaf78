use crate::core::Schedule;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize)]
struct CsvRow<'a> {
    room_id: u32,
    talk_id: u32,
    presenter_id: u32,
    title: &'a str,
    start_time: String,
    end_time: String,
    duration_minutes: u32,
}

/// 將排程輸出成 CSV，每個 placement 一列，依會議室再依開始時間排序
pub fn write_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for record in schedule.placements() {
        csv_writer.serialize(CsvRow {
            room_id: record.room_id,
            talk_id: record.talk_id,
            presenter_id: record.presenter_id,
            title: &record.title,
            start_time: record.start_time.format(TIMESTAMP_FORMAT).to_string(),
            end_time: record.end_time.format(TIMESTAMP_FORMAT).to_string(),
            duration_minutes: record.duration_minutes,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(schedule: &Schedule) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(schedule, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
