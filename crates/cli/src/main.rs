use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_client::{AuthConfig, ClientConfig, ResourceApi, ResourceClient, TracingErrorHandler};
use intake_core::engagement::{CurrentUser, SelectClientForm, WorkflowSession};
use intake_core::query::QueryOptions;
use intake_core::resource::catalog;
use intake_core::types::EntityId;
use intake_workflow::{EngagementOrchestrator, JoinPolicy, RestEngagementBackend};

#[derive(Parser, Debug)]
#[command(name = "intake", version, about = "New-engagement intake backend client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new engagement from a saved "select client" form
    Start(StartArgs),
    /// Fetch one entity and print it with its ETag
    Get(GetArgs),
    /// Fetch one page of a resource collection
    List(ListArgs),
}

#[derive(Args, Debug)]
struct StartArgs {
    /// Id of the user creating the engagement
    #[arg(long)]
    user_id: EntityId,

    /// JSON file with the select-client form values
    #[arg(long, value_name = "PATH")]
    form: PathBuf,

    /// Wait for every section create and report all failures
    #[arg(long)]
    settled: bool,
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Resource name, e.g. clientContacts
    resource: String,

    id: EntityId,

    /// Comma-separated field projection
    #[arg(long)]
    fields: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Resource name, e.g. jobRoles
    resource: String,

    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    page_number: Option<u32>,

    #[arg(long)]
    filter: Option<String>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    order_by: Option<String>,

    #[arg(long)]
    fields: Option<String>,
}

impl ListArgs {
    fn query(&self) -> QueryOptions {
        QueryOptions {
            api_version: None,
            page_size: self.page_size,
            page_number: self.page_number,
            filter: self.filter.clone(),
            search_query: self.search.clone(),
            order_by: self.order_by.clone(),
            fields: self.fields.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "intake_cli=info,intake_client=info,intake_workflow=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("loading backend configuration")?;
    let tokens = AuthConfig::from_env()
        .and_then(AuthConfig::into_provider)
        .context("loading auth configuration")?;
    let client = ResourceClient::from_config(&config, tokens, Arc::new(TracingErrorHandler))?;

    match cli.command {
        Commands::Start(args) => start(client, &config, args).await,
        Commands::Get(args) => get(client, args).await,
        Commands::List(args) => list(client, args).await,
    }
}

async fn start(client: ResourceClient, config: &ClientConfig, args: StartArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.form)
        .with_context(|| format!("reading {}", args.form.display()))?;
    let select_client: SelectClientForm =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", args.form.display()))?;
    let session = WorkflowSession {
        user: CurrentUser {
            id: args.user_id,
            display_name: None,
        },
        select_client,
    };

    let policy = if args.settled {
        JoinPolicy::Settled
    } else {
        JoinPolicy::FailFast
    };
    let backend = Arc::new(RestEngagementBackend::new(
        client,
        config.workflow_start_path.clone(),
    ));
    let id = EngagementOrchestrator::new(backend)
        .with_join_policy(policy)
        .start_workflow(&session)
        .await?;

    tracing::info!(engagement_id = id, "New engagement created");
    println!("{id}");
    Ok(())
}

async fn get(client: ResourceClient, args: GetArgs) -> Result<()> {
    let spec = catalog::find(&args.resource)?;
    let mut query = QueryOptions::new();
    query.fields = args.fields;

    let entity = ResourceApi::new(client, spec)
        .get::<serde_json::Value>(args.id, query)
        .await?;
    println!("{}", serde_json::to_string_pretty(&entity.merged())?);
    Ok(())
}

async fn list(client: ResourceClient, args: ListArgs) -> Result<()> {
    let spec = catalog::find(&args.resource)?;
    let page = ResourceApi::new(client, spec)
        .get_collection::<serde_json::Value>(args.query())
        .await?;
    println!("{}", serde_json::to_string_pretty(&page.to_json()?)?);
    Ok(())
}
