use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use log::{debug, error, info};
use netconf_client::message::{Datastore, Filter, WithDefaultsValue};
use netconf_client::transport::ssh::SshClient;
use netconf_client::transport::Client;
use std::env;
use std::time::Duration;
use tokio::signal;

const ABOUT: &str = "Netconf cli tool written in Rust\nUse NETCONF_LOG to set log filter and level";

#[derive(Debug, Parser)]
#[command(version, about = "Netconf cli tool", long_about = ABOUT)]
#[command(name = "netconf")]
struct Cli {
    #[arg(short, long, global = true, help = "Enables debug level logging")]
    debug: bool,
    #[arg(short, long, global = true, help = "Enables trace level logging")]
    trace: bool,

    #[arg(
        long,
        global = true,
        env = "NETCONF_HOST",
        help = "Host to connect, value can include port, eg. 172.30.15.1:830. Default port is 830"
    )]
    host: Option<String>,
    #[arg(short, long, global = true, env = "NETCONF_USERNAME")]
    username: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        env = "NETCONF_PASSWORD",
        hide_env_values = true
    )]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Get rpc with optional xpath filter")]
    Get(GetArgs),
    #[command(about = "Get-config rpc from specific datastore")]
    GetConfig(GetConfigArgs),
    #[command(about = "Get-schema rpc retrieving a schema from the server")]
    GetSchema(GetSchemaArgs),
    #[command(about = "Subscribe to notifications, either an RFC 5277 stream or YANG-Push")]
    Subscribe(SubscribeArgs),
}

#[derive(Debug, Args)]
struct GetArgs {
    #[arg(short, long, help = "XPath filter expression")]
    xpath: Option<String>,
    #[arg(
        long,
        value_parser = ["report-all", "report-all-tagged", "trim", "explicit"],
        env = "NETCONF_WITH_DEFAULTS"
    )]
    with_defaults: Option<String>,
    #[arg(long, help = "Repeat the get every N seconds until interrupted")]
    period: Option<u64>,
}

#[derive(Debug, Args)]
struct GetConfigArgs {
    #[arg(short, long, default_value = "running")]
    source: String,
    #[arg(
        long,
        value_parser = ["report-all", "report-all-tagged", "trim", "explicit"],
        env = "NETCONF_WITH_DEFAULTS"
    )]
    with_defaults: Option<String>,
}

#[derive(Debug, Args)]
struct GetSchemaArgs {
    identifier: String,
    #[arg(long)]
    version: Option<String>,
    #[arg(long, help = "Schema format, eg. yang or yin")]
    format: Option<String>,
}

#[derive(Debug, Args)]
struct SubscribeArgs {
    #[arg(short, long, help = "RFC 5277 notification stream name, eg. NETCONF")]
    stream: Option<String>,
    #[arg(
        short,
        long,
        conflicts_with = "stream",
        help = "YANG-Push xpath filter for a periodic subscription"
    )]
    xpath: Option<String>,
    #[arg(long, default_value_t = 3, help = "YANG-Push period in seconds")]
    period: u64,
    #[arg(
        short,
        long,
        help = "Poll get with this xpath on a second session while subscribed"
    )]
    get: Option<String>,
}

fn init_logging() {
    let env = Env::default().filter_or("NETCONF_LOG", "info");
    let mut builder = Builder::new();
    builder.target(Target::Stdout);
    builder.parse_env(env);
    builder.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.debug {
        env::set_var("NETCONF_LOG", "debug");
    }
    if cli.trace {
        env::set_var("NETCONF_LOG", "trace");
    }
    init_logging();

    let host = cli
        .host
        .clone()
        .context("No host provided, use --host or NETCONF_HOST")?;
    let username = cli.username.clone().context("No username provided")?;
    let password = cli.password.clone().context("No password provided")?;

    let mut client = SshClient::new_with_user_auth(&host, &username, &password).await?;
    info!(target: &host, "Connected to host");

    let result = match &cli.command {
        Commands::Get(args) => run_get(&host, args, &mut client).await,
        Commands::GetConfig(args) => run_get_config(&host, args, &mut client).await,
        Commands::GetSchema(args) => run_get_schema(&host, args, &mut client).await,
        Commands::Subscribe(args) => run_subscribe(&host, args, &mut client).await,
    };
    if let Err(err) = client.close().await {
        error!(target: &host, "Error closing ssh connection: {}", err);
    }
    result
}

async fn run_get(host: &str, args: &GetArgs, client: &mut SshClient) -> anyhow::Result<()> {
    let mut session = client.new_session().await?;
    debug!(
        target: host,
        "Started Netconf session with session-id: {}",
        session.session_id()
    );

    let defaults = parse_defaults(&args.with_defaults)?;
    loop {
        let filter = args.xpath.as_deref().map(Filter::xpath);
        let reply = session.get(filter, defaults).await?;
        info!(target: host, "Response:\n{}", reply);
        match args.period {
            Some(period) => tokio::time::sleep(Duration::from_secs(period)).await,
            None => break,
        }
    }
    session.close().await?;
    Ok(())
}

async fn run_get_config(
    host: &str,
    args: &GetConfigArgs,
    client: &mut SshClient,
) -> anyhow::Result<()> {
    let mut session = client.new_session().await?;
    debug!(
        target: host,
        "Started Netconf session with session-id: {}",
        session.session_id()
    );

    let source: Datastore = args.source.parse()?;
    let defaults = parse_defaults(&args.with_defaults)?;
    let reply = session.get_config(source, None, defaults).await?;
    info!(target: host, "Response:\n{}", reply);
    session.close().await?;
    Ok(())
}

async fn run_get_schema(
    host: &str,
    args: &GetSchemaArgs,
    client: &mut SshClient,
) -> anyhow::Result<()> {
    let mut session = client.new_session().await?;
    let schema = session
        .get_schema(
            &args.identifier,
            args.version.as_deref(),
            args.format.as_deref(),
        )
        .await?;
    info!(target: host, "Schema {}:\n{}", args.identifier, schema);
    session.close().await?;
    Ok(())
}

async fn run_subscribe(
    host: &str,
    args: &SubscribeArgs,
    client: &mut SshClient,
) -> anyhow::Result<()> {
    let mut session = client.new_session().await?;
    match (&args.stream, &args.xpath) {
        (Some(stream), _) => {
            session
                .create_subscription(Some(stream), None, None, None)
                .await?;
        }
        (None, Some(xpath)) => {
            let period = u32::try_from(args.period * 100).context("Period too large")?;
            session.establish_subscription(xpath, period).await?;
        }
        (None, None) => anyhow::bail!("Either --stream or --xpath is required"),
    }
    info!(target: host, "Subscription established, waiting for notifications");

    // optional polling on a second session of the same ssh connection
    let poller = match &args.get {
        Some(xpath) => {
            let mut poll_session = client.new_session().await?;
            let xpath = xpath.clone();
            let target = host.to_string();
            let period = args.period;
            Some(tokio::spawn(async move {
                loop {
                    match poll_session.get(Some(Filter::xpath(&xpath)), None).await {
                        Ok(reply) => info!(target: &target, "Get response:\n{}", reply),
                        Err(err) => {
                            error!(target: &target, "Get error: {}", err);
                            break;
                        }
                    }
                    tokio::time::sleep(Duration::from_secs(period)).await;
                }
            }))
        }
        None => None,
    };

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            notification = session.notification() => {
                let notification = notification?;
                match notification.push_update() {
                    Some(update) => info!(target: host, "{}: {}", notification.event_time, update),
                    None => info!(target: host, "{}: {}", notification.event_time, notification.content),
                }
            }
        }
    }

    if let Some(poller) = poller {
        poller.abort();
    }
    session.close().await?;
    Ok(())
}

fn parse_defaults(value: &Option<String>) -> anyhow::Result<Option<WithDefaultsValue>> {
    Ok(value
        .as_deref()
        .map(|v| v.parse::<WithDefaultsValue>())
        .transpose()?)
}
