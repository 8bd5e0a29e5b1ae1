//! Runs one live fetch cycle for a handful of airports and prints the
//! status table to stdout.

use aviationwx::{AviationWx, AviationWxError, ObservationRecord, WidgetConfig};
use chrono::Utc;

fn temps(obs: &ObservationRecord) -> String {
    match (obs.temperature_c, obs.dew_point_c) {
        (Some(t), Some(d)) => format!("{t:.0}/{d:.0}"),
        (Some(t), None) => format!("{t:.0}/-"),
        _ => "-/-".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), AviationWxError> {
    let config = WidgetConfig::builder()
        .airports("KSFO,PAO,HAF,JFK")
        .build()?;
    let widget = AviationWx::builder().config(config).build()?;

    let update = widget.fetch_cycle().await?;
    let now = Utc::now();

    for airport in &update.airports {
        let Some(obs) = &airport.observation else {
            continue;
        };
        println!(
            "{:<5} {:<4} {:>9} {:>4}SM {:<9} {:>6} {} ({} min ago)",
            airport.requested,
            obs.flight_category.to_string(),
            obs.wind_display(),
            obs.visibility_sm.as_deref().unwrap_or("?"),
            obs.ceiling_display(),
            temps(obs),
            obs.present_weather,
            obs.minutes_since(now),
        );
        for delay in airport.delays.values() {
            println!(
                "      {}: {} ({:?})",
                delay.category,
                delay.reason,
                delay.severity()
            );
        }
    }

    if !update.report.is_empty() {
        println!("{}", update.report);
    }
    Ok(())
}
