//! Run outputs: progress log and coordinate snapshots.
//!
//! The progress log is one CSV file per job with a row per pass. Coordinate
//! snapshots are written after every pass and use the same column layout as
//! the position input, so a snapshot can seed a later run.

use bevy_ecs::prelude::Entity;
use chrono::{DateTime, Local};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::components::polygoncollider::PolygonCollider;
use crate::error::SimError;
use crate::space::Space;
use crate::spawner::StructureRecord;

pub const LOG_HEADER: [&str; 7] = [
    "datetime",
    "job_id",
    "step_num",
    "total_actions",
    "overlap_pct",
    "overlap",
    "process_time",
];

pub const COORDINATE_HEADER: [&str; 5] = ["type", "x", "y", "angle", "area"];

/// Keeps the percentage finite when the starting overlap is zero.
const REDUCTION_EPSILON: f32 = 0.0001;

/// Percent reduction from `begin` to `end`, rounded to two decimals.
pub fn overlap_reduction_percent(begin: f32, end: f32) -> f32 {
    let pct = (begin - end) / (begin + REDUCTION_EPSILON) * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Compact timestamp used in output file names.
pub fn file_timestamp(now: &DateTime<Local>) -> String {
    now.format("%d%m%Y_%H%M%S").to_string()
}

/// One progress log row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub job_id: String,
    pub step_num: u32,
    pub total_actions: usize,
    pub overlap_begin: f32,
    pub overlap_end: f32,
    pub elapsed: Duration,
}

impl ProgressRow {
    pub fn to_csv(&self, now: &DateTime<Local>) -> String {
        format!(
            "{},{},{},{},{:.2},{:.2},{:.3}",
            now.format("%d/%m/%Y_%H:%M:%S"),
            self.job_id,
            self.step_num,
            self.total_actions,
            overlap_reduction_percent(self.overlap_begin, self.overlap_end),
            self.overlap_end,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Append-only per-job progress log.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    /// Create `<dir>/<timestamp>_<job_id>.csv` and write the header row.
    pub fn create(dir: impl AsRef<Path>, job_id: &str) -> Result<Self, SimError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_{}.csv", file_timestamp(&Local::now()), job_id));
        Self::create_at(path)
    }

    /// Create the log at an explicit path, truncating any existing file.
    pub fn create_at(path: impl Into<PathBuf>) -> Result<Self, SimError> {
        let path = path.into();
        let mut file = File::create(&path)?;
        writeln!(file, "{}", LOG_HEADER.join(","))?;
        debug!("Progress log at {}", path.display());
        Ok(Self { path })
    }

    pub fn append(&self, row: &ProgressRow) -> Result<(), SimError> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", row.to_csv(&Local::now()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Current state of the given structures. Entities that are not structures
/// are skipped.
pub fn snapshot(space: &Space, entities: &[Entity]) -> Vec<StructureRecord> {
    entities
        .iter()
        .filter_map(|&entity| {
            let structure = space.structure(entity)?;
            Some(StructureRecord {
                kind: structure.kind.clone(),
                position: space.position(entity)?,
                angle: space.angle(entity),
                area: space.world().get::<PolygonCollider>(entity).map(PolygonCollider::area),
            })
        })
        .collect()
}

/// `<dir>/<timestamp>_jobid_<job>_step_<n>_overlap_<int>_data.csv`
pub fn coordinates_path(
    dir: impl AsRef<Path>,
    job_id: &str,
    step_num: u32,
    mean_overlap: f32,
    now: &DateTime<Local>,
) -> PathBuf {
    dir.as_ref().join(format!(
        "{}_jobid_{}_step_{}_overlap_{}_data.csv",
        file_timestamp(now),
        job_id,
        step_num,
        mean_overlap as i64
    ))
}

/// Render records as coordinate CSV, values rounded to two decimals.
pub fn format_coordinates(records: &[StructureRecord]) -> String {
    let mut out = COORDINATE_HEADER.join(",");
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2}\n",
            r.kind,
            r.position.x,
            r.position.y,
            r.angle.unwrap_or(0.0),
            r.area.unwrap_or(0.0)
        ));
    }
    out
}

pub fn write_coordinates(path: impl AsRef<Path>, records: &[StructureRecord]) -> Result<(), SimError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_coordinates(records).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawner::parse_positions;
    use chrono::TimeZone;
    use glam::Vec2;

    #[test]
    fn test_reduction_percent() {
        assert_eq!(overlap_reduction_percent(100.0, 75.0), 25.0);
        assert_eq!(overlap_reduction_percent(0.0, 0.0), 0.0);
        assert!(overlap_reduction_percent(10.0, 12.0) < 0.0);
    }

    #[test]
    fn test_row_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let row = ProgressRow {
            job_id: "17".to_string(),
            step_num: 2,
            total_actions: 3000,
            overlap_begin: 100.0,
            overlap_end: 50.0,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(row.to_csv(&now), "09/03/2024_14:05:07,17,2,3000,50.00,50.00,1.500");
    }

    #[test]
    fn test_coordinates_path() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = coordinates_path("output", "3", 4, 66.9, &now);
        assert_eq!(
            path,
            PathBuf::from("output").join("09032024_140507_jobid_3_step_4_overlap_66_data.csv")
        );
    }

    #[test]
    fn test_coordinates_round_trip_through_parser() {
        let records = vec![StructureRecord {
            kind: "C2S2M2".to_string(),
            position: Vec2::new(1.234, 5.0),
            angle: Some(0.5),
            area: Some(12.0),
        }];
        let text = format_coordinates(&records);
        assert_eq!(text, "type,x,y,angle,area\nC2S2M2,1.23,5.00,0.50,12.00\n");
        let parsed = parse_positions(&text).unwrap();
        assert_eq!(parsed[0].kind, "C2S2M2");
        assert_eq!(parsed[0].angle, Some(0.5));
    }

    #[test]
    fn test_progress_log_writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!("grana_relax_log_{}.csv", std::process::id()));
        let log = ProgressLog::create_at(&path).unwrap();
        log.append(&ProgressRow {
            job_id: "0".to_string(),
            step_num: 0,
            total_actions: 6,
            overlap_begin: 1.0,
            overlap_end: 1.0,
            elapsed: Duration::ZERO,
        })
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], LOG_HEADER.join(","));
        assert!(lines[1].ends_with(",0,0,6,0.00,1.00,0.000"));
    }
}
