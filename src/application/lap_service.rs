// Lap service - Run a per-lap computation over every lap of the selected race days
use crate::domain::event::EventWindow;
use crate::domain::laps::LapTable;
use anyhow::Context;
use std::future::Future;

/// Await `f` on the event window of every lap, day by day and lap by lap.
///
/// Results come back in the same order the laps were visited. The first
/// failure stops the walk.
pub async fn collect_lap_data<T, F, Fut>(tables: &[LapTable], mut f: F) -> anyhow::Result<Vec<T>>
where
    F: FnMut(EventWindow) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let total: usize = tables.iter().map(LapTable::lap_count).sum();
    let mut collected = Vec::with_capacity(total);

    for table in tables {
        for event in table.events() {
            let event = event?;
            let name = event.name().to_string();
            tracing::info!("Collecting {} ({}/{})", name, collected.len() + 1, total);
            let value = f(event)
                .await
                .with_context(|| format!("Failed to collect data for {}", name))?;
            collected.push(value);
        }
    }

    Ok(collected)
}
