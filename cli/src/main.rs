mod chart;
mod source;
mod views;

use clap::{Args, Parser, Subcommand};
use records::embedding::View;
use records::{ListFilter, NewStatus, SearchCriteria, Status, StatusUpdate, Step, StepOrder, StepPatch};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::source::{EmbeddingParams, SourceError, StatusSource};
use crate::views::{Dashboard, STAGE_FILTERS, StatusDetails};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unknown stage `{0}`; expected one of: {expected}", expected = STAGE_FILTERS.join(", "))]
    UnknownStage(String),
    #[error("page {page} is out of range (1..={pages})")]
    PageOutOfRange { page: usize, pages: usize },
}

#[derive(Parser, Debug)]
#[command(name = "tracker", about = "Status tracker dashboard and API CLI")]
struct Cli {
    #[arg(long, env = "TRACKER_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Serve the bundled sample data instead of calling the server.
    #[arg(long, env = "TRACKER_USE_MOCK", default_value_t = false)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    /// List a client's statuses.
    Dashboard {
        #[arg(long, default_value = views::DEFAULT_CLIENT_ID)]
        client_id: String,
        #[arg(long, default_value = "All")]
        stage: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one status with its steps and history.
    Show { status_id: String },
    Step(StepCommand),
    Analytics(AnalyticsCommand),
    /// Raw REST calls; responses are printed as JSON.
    Api(ApiCommand),
}

#[derive(Args, Debug)]
struct StepCommand {
    #[command(subcommand)]
    command: StepSubcommand,
}

#[derive(Subcommand, Debug)]
enum StepSubcommand {
    Complete {
        status_id: String,
        step_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    Skip {
        status_id: String,
        step_id: String,
        #[arg(long)]
        reason: String,
    },
    Block {
        status_id: String,
        step_id: String,
        #[arg(long)]
        reason: String,
    },
    /// Point the status at a different current step.
    Current { status_id: String, step_id: String },
    /// Append steps from a JSON array.
    Add {
        status_id: String,
        #[arg(long)]
        data: String,
    },
    /// Patch one step from a JSON object.
    Update {
        status_id: String,
        step_id: String,
        #[arg(long)]
        data: String,
    },
    /// Assign orders as `STEP_ID=ORDER` pairs.
    Reorder {
        status_id: String,
        #[arg(required = true, value_parser = parse_step_order)]
        orders: Vec<StepOrder>,
    },
}

#[derive(Args, Debug)]
struct AnalyticsCommand {
    #[command(subcommand)]
    command: AnalyticsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AnalyticsSubcommand {
    Summary,
    Embedding {
        #[arg(long, default_value = "2d", value_parser = parse_view)]
        view: View,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long, default_value_t = chart::DEFAULT_COLUMNS)]
        columns: usize,
        #[arg(long, default_value_t = chart::DEFAULT_ROWS)]
        rows: usize,
    },
}

#[derive(Args, Debug)]
struct ApiCommand {
    #[command(subcommand)]
    command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApiSubcommand {
    Create {
        #[arg(long)]
        data: String,
    },
    Get {
        status_id: String,
    },
    Update {
        status_id: String,
        #[arg(long)]
        data: String,
    },
    BySource {
        source_id: String,
    },
    ByTracking {
        tracking_id: String,
    },
    Client {
        client_id: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    Advisor {
        advisor_id: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    Search {
        #[arg(long, default_value = "{}")]
        data: String,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    status_type: Option<String>,
    #[arg(long)]
    stage: Option<String>,
    #[arg(long)]
    from_date: Option<String>,
    #[arg(long)]
    to_date: Option<String>,
}

impl From<FilterArgs> for ListFilter {
    fn from(args: FilterArgs) -> Self {
        Self { status_type: args.status_type, stage: args.stage, from_date: args.from_date, to_date: args.to_date }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut source = StatusSource::connect(&cli.base_url, cli.mock)?;

    match cli.command {
        Command::Ping => {
            source.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::Dashboard { client_id, stage, page } => run_dashboard(&mut source, client_id, &stage, page).await,
        Command::Show { status_id } => {
            print!("{}", StatusDetails::load(&mut source, &status_id).await.render());
            Ok(())
        }
        Command::Step(step) => run_step(&mut source, step).await,
        Command::Analytics(analytics) => run_analytics(&source, analytics).await,
        Command::Api(api) => run_api(&mut source, api).await,
    }
}

async fn run_dashboard(source: &mut StatusSource, client_id: String, stage: &str, page: usize) -> Result<(), CliError> {
    let mut dashboard = Dashboard::new(client_id);
    if !dashboard.select_stage(stage) {
        return Err(CliError::UnknownStage(stage.to_owned()));
    }
    dashboard.load(source).await;

    if page != 1 && !dashboard.error && !dashboard.change_page(page) {
        return Err(CliError::PageOutOfRange { page, pages: dashboard.total_pages() });
    }
    print!("{}", dashboard.render());
    Ok(())
}

async fn run_step(source: &mut StatusSource, step: StepCommand) -> Result<(), CliError> {
    let updated = match step.command {
        StepSubcommand::Complete { status_id, step_id, notes } => {
            source.complete_step(&status_id, &step_id, notes).await?
        }
        StepSubcommand::Skip { status_id, step_id, reason } => source.skip_step(&status_id, &step_id, &reason).await?,
        StepSubcommand::Block { status_id, step_id, reason } => {
            source.block_step(&status_id, &step_id, &reason).await?
        }
        StepSubcommand::Current { status_id, step_id } => source.set_current_step(&status_id, &step_id).await?,
        StepSubcommand::Add { status_id, data } => {
            let steps = serde_json::from_str::<Vec<Step>>(&data)?;
            source.add_steps(&status_id, steps).await?
        }
        StepSubcommand::Update { status_id, step_id, data } => {
            let patch = serde_json::from_str::<StepPatch>(&data)?;
            source.update_step(&status_id, &step_id, patch).await?
        }
        StepSubcommand::Reorder { status_id, orders } => source.reorder_steps(&status_id, orders).await?,
    };
    print!("{}", StatusDetails::loaded(updated).render());
    Ok(())
}

async fn run_analytics(source: &StatusSource, analytics: AnalyticsCommand) -> Result<(), CliError> {
    match analytics.command {
        AnalyticsSubcommand::Summary => {
            let summary = source.analytics_summary().await?;
            print!("{}", chart::render_summary(&summary));
        }
        AnalyticsSubcommand::Embedding { view, count, seed, width, height, columns, rows } => {
            let params = EmbeddingParams { view, count, seed, width, height };
            let plot = source.embedding(params).await?;
            print!("{}", chart::render_plot(&plot, columns, rows));
        }
    }
    Ok(())
}

async fn run_api(source: &mut StatusSource, api: ApiCommand) -> Result<(), CliError> {
    let json = match api.command {
        ApiSubcommand::Create { data } => {
            let body = serde_json::from_str::<NewStatus>(&data)?;
            to_json(&source.create_status(body).await?)?
        }
        ApiSubcommand::Get { status_id } => to_json(&source.get_status(&status_id).await?)?,
        ApiSubcommand::Update { status_id, data } => {
            let body = serde_json::from_str::<StatusUpdate>(&data)?;
            to_json(&source.update_status(&status_id, body).await?)?
        }
        ApiSubcommand::BySource { source_id } => to_json(&source.status_by_source(&source_id).await?)?,
        ApiSubcommand::ByTracking { tracking_id } => to_json(&source.status_by_tracking(&tracking_id).await?)?,
        ApiSubcommand::Client { client_id, filter } => {
            serde_json::to_value(source.client_statuses(&client_id, &filter.into()).await?)?
        }
        ApiSubcommand::Advisor { advisor_id, filter } => {
            serde_json::to_value(source.advisor_client_statuses(&advisor_id, &filter.into()).await?)?
        }
        ApiSubcommand::Search { data } => {
            let criteria = serde_json::from_str::<SearchCriteria>(&data)?;
            serde_json::to_value(source.search_statuses(&criteria).await?)?
        }
    };
    print_json(&json)
}

fn to_json(status: &Status) -> Result<Value, CliError> {
    Ok(serde_json::to_value(status)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn parse_step_order(raw: &str) -> Result<StepOrder, String> {
    let (step_id, order) = raw.split_once('=').ok_or_else(|| format!("expected STEP_ID=ORDER, got `{raw}`"))?;
    if step_id.is_empty() {
        return Err(format!("missing step id in `{raw}`"));
    }
    let order = order.parse::<u32>().map_err(|e| format!("invalid order in `{raw}`: {e}"))?;
    Ok(StepOrder { step_id: step_id.to_owned(), order })
}

fn parse_view(raw: &str) -> Result<View, String> {
    View::parse(raw).ok_or_else(|| format!("unknown view `{raw}`; expected 2d or cluster"))
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
