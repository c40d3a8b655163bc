//! Heart-rate listing command.

use owo_colors::OwoColorize;
use tabled::Tabled;

use pulsely_core::HeartRateFeed;
use pulsely_core::api::filters::HeartRateFilters;
use pulsely_core::api::types::{HeartRateSample, HeartRateValue};

use crate::cli::{GlobalOpts, HeartRateArgs, OutputFormat};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AVG")]
    avg: String,
    #[tabled(rename = "MIN")]
    min: String,
    #[tabled(rename = "MAX")]
    max: String,
    #[tabled(rename = "SOURCE")]
    source: String,
}

fn fmt_value(value: Option<&HeartRateValue>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{:.0} {}", v.value, v.unit))
}

fn to_row(sample: &HeartRateSample) -> SampleRow {
    SampleRow {
        id: sample.id,
        date: sample.date.clone(),
        avg: fmt_value(sample.avg.as_ref()),
        min: fmt_value(sample.min.as_ref()),
        max: fmt_value(sample.max.as_ref()),
        source: sample.source.clone().unwrap_or_else(|| "-".into()),
    }
}

pub async fn handle(args: HeartRateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (start_date, end_date) = util::parse_date_range(args.start.as_deref(), args.end.as_deref())?;
    let filters = HeartRateFilters {
        start_date,
        end_date,
        limit: args.limit,
        offset: args.offset,
    };

    let (_config, session) = util::establish_session(global).await?;
    let feed = HeartRateFeed::new(session.clone(), session.api_client(), filters);
    feed.refetch().await;

    let state = feed.state();
    if let Some(message) = state.error {
        return Err(CliError::Fetch { message });
    }
    let data = state.data;

    // Structured formats get the whole snapshot, table/plain only the
    // requested series.
    match global.output {
        OutputFormat::Json => {
            output::print_output(&output::render_json_pretty(&data), global.quiet);
            return Ok(());
        }
        OutputFormat::JsonCompact => {
            output::print_output(&output::render_json_compact(&data), global.quiet);
            return Ok(());
        }
        OutputFormat::Yaml => {
            output::print_output(&output::render_yaml(&data), global.quiet);
            return Ok(());
        }
        OutputFormat::Table | OutputFormat::Plain => {}
    }

    let color = output::should_color(&global.color);
    let mut sections = Vec::new();

    sections.push(output::render_list(
        &global.output,
        &data.samples,
        to_row,
        |s| s.id.to_string(),
    ));

    if args.recovery && !data.recovery.is_empty() {
        if matches!(global.output, OutputFormat::Table) {
            let title = "Recovery";
            sections.push(if color {
                title.bold().to_string()
            } else {
                title.to_owned()
            });
        }
        sections.push(output::render_list(
            &global.output,
            &data.recovery,
            to_row,
            |s| s.id.to_string(),
        ));
    }

    if matches!(global.output, OutputFormat::Table) {
        if let Some(summary) = data.summary {
            let title = "Summary";
            sections.push(format!(
                "{}\n  records: {}  avg: {:.0}  min: {:.0}  max: {:.0}",
                if color {
                    title.bold().to_string()
                } else {
                    title.to_owned()
                },
                summary.total_records,
                summary.avg_heart_rate,
                summary.min_heart_rate,
                summary.max_heart_rate,
            ));
        }
        if let Some(meta) = data.meta {
            sections.push(format!(
                "{} results, requested at {}",
                meta.result_count, meta.requested_at
            ));
        }
    }

    output::print_output(&sections.join("\n\n"), global.quiet);
    Ok(())
}
