//! Scheduled clean registration

use std::path::Path;

use super::manager::{install_agent, ServiceManager};
use super::plist::{LaunchAgent, SCHEDULED_CLEAN_LABEL};
use crate::config::{BarkedPaths, Frequency, ScheduleConfig};
use crate::error::Result;
use crate::models::CleanCategory;

/// Persist the schedule record and register the launch agent that runs it
///
/// The record is written first; if that fails nothing is registered.
pub async fn save_schedule(
    manager: &dyn ServiceManager,
    paths: &BarkedPaths,
    script: &Path,
    frequency: Frequency,
    categories: &[CleanCategory],
) -> Result<ScheduleConfig> {
    let record = ScheduleConfig::new(frequency, categories);
    record.write(&paths.schedule_file())?;

    let agent = LaunchAgent::scheduled_clean(script, frequency, paths);
    install_agent(manager, &agent, &paths.plist_path(SCHEDULED_CLEAN_LABEL)).await?;
    info!(
        "Scheduled {} clean of {}",
        frequency.id(),
        record.categories.join(",")
    );
    Ok(record)
}
