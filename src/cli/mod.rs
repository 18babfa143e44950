use crate::{config::Settings, pipeline::TripPipeline, types::TripRequest};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI entry point for the trip-agent binary
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let matches = command().get_matches();
    execute(&matches, Settings::from_env).await
}

/// Dispatch a parsed command line; settings are loaded only by the
/// subcommands that need them.
async fn execute<F>(matches: &ArgMatches, load_settings: F) -> Result<()>
where
    F: FnOnce() -> crate::Result<Settings>,
{
    match matches.subcommand() {
        Some(("plan", args)) => {
            let request = trip_request(args)?;
            let settings = load_settings()?;
            init_tracing(&settings.log_level);
            plan(&settings, request, args.get_flag("raw")).await
        }
        #[cfg(feature = "server")]
        Some(("serve", args)) => {
            let settings = load_settings()?;
            init_tracing(&settings.log_level);
            let host = args
                .get_one::<String>("host")
                .cloned()
                .unwrap_or_else(|| settings.host.clone());
            let port = args
                .get_one::<u16>("port")
                .copied()
                .unwrap_or(settings.port);
            crate::server::serve(settings.with_bind(host, port)).await?;
            Ok(())
        }
        _ => {
            command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_level),
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub fn command() -> Command {
    let plan = Command::new("plan")
        .about("Plan one trip and print the itinerary as JSON")
        .arg(
            Arg::new("city")
                .short('c')
                .long("city")
                .value_name("CITY")
                .help("Destination city")
                .required(true),
        )
        .arg(
            Arg::new("start-date")
                .long("start-date")
                .value_name("YYYY-MM-DD")
                .required(true),
        )
        .arg(
            Arg::new("end-date")
                .long("end-date")
                .value_name("YYYY-MM-DD")
                .required(true),
        )
        .arg(
            Arg::new("days")
                .short('d')
                .long("days")
                .value_name("COUNT")
                .help("Number of travel days")
                .value_parser(value_parser!(u32))
                .required(true),
        )
        .arg(
            Arg::new("transportation")
                .short('t')
                .long("transportation")
                .value_name("MODE")
                .default_value("public transit"),
        )
        .arg(
            Arg::new("accommodation")
                .short('a')
                .long("accommodation")
                .value_name("TIER")
                .default_value("budget hotel"),
        )
        .arg(
            Arg::new("preference")
                .short('p')
                .long("preference")
                .value_name("TAG")
                .help("Preference tag; repeat for several")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("extra")
                .short('e')
                .long("extra")
                .value_name("TEXT")
                .help("Free-text extra requirements for the planner"),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Print the planner's raw reply instead of the parsed itinerary")
                .action(ArgAction::SetTrue),
        );

    let command = Command::new("trip-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-agent trip itinerary planner")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(plan);

    #[cfg(feature = "server")]
    let command = command.subcommand(
        Command::new("serve")
            .about("Run the HTTP API")
            .arg(Arg::new("host").long("host").value_name("HOST"))
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_name("PORT")
                    .value_parser(value_parser!(u16)),
            ),
    );

    command
}

pub fn trip_request(args: &ArgMatches) -> Result<TripRequest> {
    let string = |id: &str| -> Result<String> {
        args.get_one::<String>(id)
            .cloned()
            .with_context(|| format!("missing --{}", id))
    };

    let request = TripRequest {
        city: string("city")?,
        start_date: string("start-date")?,
        end_date: string("end-date")?,
        travel_days: args
            .get_one::<u32>("days")
            .copied()
            .context("missing --days")?,
        transportation: string("transportation")?,
        accommodation: string("accommodation")?,
        preferences: args
            .get_many::<String>("preference")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        free_text_input: args.get_one::<String>("extra").cloned(),
    };
    request.validate()?;
    Ok(request)
}

async fn plan(settings: &Settings, request: TripRequest, raw: bool) -> Result<()> {
    settings.log_summary();
    let (pipeline, toolset) = TripPipeline::launch(settings).await?;
    info!(city = %request.city, days = request.travel_days, "planning trip");

    let outcome = pipeline.plan_trip(request).await;
    drop(pipeline);
    toolset.shutdown().await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Trip planning failed: {}", e);
            return Err(e.into());
        }
    };

    if raw {
        println!("{}", outcome.planner_text());
        return Ok(());
    }

    let plan = outcome.into_itinerary()?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
