use std::collections::BTreeMap;

use clap::Parser;
use human_repr::HumanCount;
use tracing::info;

use dbbench::args::{AggregateArgs, Cli, Command, DatasizeArgs, RenderArgs};
use dbbench::backend::template_registry;
use dbbench::config::Profile;
use dbbench::error::{AppError, AppResult, ConfigError};
use dbbench::metrics::{
    elapsed_from_samples, histogram, key_window_series, percentile_curve, read_sample_log,
    summarize, time_series,
};
use dbbench::report::write_client_report;
use dbbench::{inspect, logger};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);

    match cli.command {
        Command::Render(args) => run_render(args).await,
        Command::Aggregate(args) => run_aggregate(args).await,
        Command::Datasize(args) => run_datasize(args),
    }
}

async fn run_render(args: RenderArgs) -> AppResult<()> {
    let profile = Profile::load(&args.config).await?;
    let spec = profile
        .backend_specs()?
        .into_iter()
        .find(|spec| spec.ordinal == args.ordinal)
        .ok_or_else(|| {
            AppError::config(ConfigError::InvalidValue {
                field: "ordinal",
                message: format!(
                    "member {} not in a {}-peer group",
                    args.ordinal,
                    profile.peers.len()
                ),
            })
        })?;

    let rendered = template_registry().render(&spec)?;
    if !rendered.config_text.is_empty() {
        println!("# {}", spec.config_path.display());
        println!("{}", rendered.config_text);
    }
    if let Some(identity) = &rendered.identity_file {
        println!("# {}", identity.path.display());
        println!("{}", identity.contents);
    }
    println!(
        "{} {}",
        spec.binary.display(),
        rendered.launch_args.join(" ")
    );
    Ok(())
}

async fn run_aggregate(args: AggregateArgs) -> AppResult<()> {
    let profile = Profile::load(&args.config).await?;

    let mut samples = Vec::new();
    for path in &args.samples {
        let mut part = read_sample_log(path).await?;
        info!("Loaded {} samples from {}", part.len(), path.display());
        samples.append(&mut part);
    }

    let elapsed = elapsed_from_samples(&samples);
    let summary = summarize(&samples, elapsed);
    let curve = percentile_curve(&samples);
    let buckets = histogram(&samples);
    // Per-second client counts come from the control plane when agents
    // report them; a batch run over raw logs assumes the configured count.
    let client_counts: BTreeMap<i64, u64> = BTreeMap::new();
    let series = time_series(&samples, &client_counts, profile.test.client_count);
    let windows = key_window_series(&series, profile.test.key_window);

    let paths =
        write_client_report(&args.output_dir, &summary, &curve, &buckets, &series, &windows)
            .await?;
    for path in paths.all() {
        info!("Wrote {}", path.display());
    }
    println!(
        "{} requests over {:.0}s, {:.1} req/s, {} errors",
        summary.requests,
        summary.total_seconds,
        summary.requests_per_second,
        summary.error_counts.values().sum::<u64>()
    );
    Ok(())
}

fn run_datasize(args: DatasizeArgs) -> AppResult<()> {
    let total = inspect::size(&args.dir)?;
    println!("{} ({} bytes)", total.human_count_bytes(), total);
    Ok(())
}
