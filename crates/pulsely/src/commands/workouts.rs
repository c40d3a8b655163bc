//! Workout listing command.

use tabled::Tabled;

use pulsely_core::WorkoutFeed;
use pulsely_core::api::filters::WorkoutFilters;
use pulsely_core::api::types::Workout;

use crate::cli::{GlobalOpts, OutputFormat, WorkoutsArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TYPE")]
    workout_type: String,
    #[tabled(rename = "START")]
    start: String,
    #[tabled(rename = "DURATION")]
    duration: String,
    #[tabled(rename = "CALORIES")]
    calories: String,
    #[tabled(rename = "SOURCE")]
    source: String,
}

fn to_row(workout: &Workout) -> WorkoutRow {
    WorkoutRow {
        id: workout.id.clone(),
        workout_type: workout.workout_type.clone().unwrap_or_else(|| "-".into()),
        start: workout.start_date.clone(),
        duration: format!(
            "{:.0} {}",
            workout.duration,
            workout.duration_unit.as_deref().unwrap_or("min")
        ),
        calories: workout
            .summary
            .as_ref()
            .map_or_else(|| "-".into(), |s| format!("{:.0}", s.total_calories)),
        source: workout.source_name.clone().unwrap_or_else(|| "-".into()),
    }
}

pub async fn handle(args: WorkoutsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (start_date, end_date) = util::parse_date_range(args.start.as_deref(), args.end.as_deref())?;
    let filters = WorkoutFilters {
        start_date,
        end_date,
        limit: args.limit,
        offset: args.offset,
        workout_type: args.workout_type,
        location: args.location.map(Into::into),
        min_duration: args.min_duration,
        max_duration: args.max_duration,
        min_distance: args.min_distance,
        max_distance: args.max_distance,
        sort_by: args.sort_by.map(Into::into),
        sort_order: args.sort_order.map(Into::into),
    };

    let (_config, session) = util::establish_session(global).await?;
    let feed = WorkoutFeed::new(session.clone(), session.api_client(), filters);
    feed.refetch().await;

    let state = feed.state();
    if let Some(message) = state.error {
        return Err(CliError::Fetch { message });
    }
    let data = state.data;

    match global.output {
        OutputFormat::Json => {
            output::print_output(&output::render_json_pretty(&data), global.quiet);
            Ok(())
        }
        OutputFormat::JsonCompact => {
            output::print_output(&output::render_json_compact(&data), global.quiet);
            Ok(())
        }
        OutputFormat::Yaml => {
            output::print_output(&output::render_yaml(&data), global.quiet);
            Ok(())
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let mut out = output::render_list(&global.output, &data.workouts, to_row, |w| {
                w.id.clone()
            });
            if matches!(global.output, OutputFormat::Table) {
                if let Some(meta) = data.meta {
                    out.push_str(&format!(
                        "\n\n{} results, requested at {}",
                        meta.result_count, meta.requested_at
                    ));
                }
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
