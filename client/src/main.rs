//! `travel-desk`: command-line view of the agent console.
//!
//! Runs the same store as the console against the configured backend,
//! dispatches the requests a screen would issue and prints the resulting slice
//! (or its error).
//!
//! ```bash
//! TRAVEL_DESK_API_URL=http://localhost:5000 travel-desk hotels --search goa
//! travel-desk --email agent@example.com --password secret1 dashboard
//! ```

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use travel_desk_api::ApiClient;
use travel_desk_api::types::{ListQuery, LoginRequest};
use travel_desk_client::app::{AppAction, AppState, AppStore, Backend, app_store};
use travel_desk_client::config::{ClientConfig, DEFAULT_LOG_FILTER};
use travel_desk_client::dashboard::{ChartPoint, DashboardSummary, minor_to_major};
use travel_desk_client::environment::ClientEnvironment;
use travel_desk_client::route::Route;
use travel_desk_client::slices::{AuthAction, BookingAction, FlightAction, HotelAction, PackageAction};
use travel_desk_runtime::metrics::describe_store_metrics;

/// How long to wait for one request to settle
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(
    name = "travel-desk",
    version,
    about = "Travel Desk agent console from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Sign in with this email before running the command
    #[arg(long, global = true, requires = "password")]
    email: Option<String>,

    /// Password for --email
    #[arg(long, global = true)]
    password: Option<String>,

    /// Page of a catalog listing
    #[arg(long, global = true, default_value_t = 1)]
    page: u32,

    /// Filter catalog listings
    #[arg(long, global = true)]
    search: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// List hotels
    Hotels,
    /// List travel packages
    Packages,
    /// List flights
    Flights,
    /// List bookings
    Bookings,
    /// Payment history
    Payments,
    /// Conversations and unread count
    Chats,
    /// Dashboard summary
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .init();
    describe_store_metrics();

    tracing::info!(api = %config.api.base_url, page_size = config.page_size, "Starting travel-desk");

    let client = ApiClient::from_config(&config.api);
    let store = app_store(ClientEnvironment::new(client));

    let outcome = run(&store, &cli, &config).await;

    store
        .shutdown(config.shutdown_timeout)
        .await
        .context("store did not shut down cleanly")?;

    outcome
}

async fn run<B: Backend>(store: &AppStore<B>, cli: &Cli, config: &ClientConfig) -> anyhow::Result<()> {
    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        let request = LoginRequest {
            email: email.clone(),
            password: password.clone(),
        };
        let outcome = dispatch(store, AppAction::Auth(AuthAction::Login { request })).await?;
        if outcome.is_rejected() {
            report_errors(store).await;
            anyhow::bail!("login failed");
        }
    }

    let mut query = ListQuery::first_page(config.page_size).with_page(cli.page);
    if let Some(search) = &cli.search {
        query = query.with_search(search.clone());
    }

    let actions = match cli.command {
        Command::Hotels => vec![AppAction::Hotels(HotelAction::Fetch { query })],
        Command::Packages => vec![AppAction::Packages(PackageAction::Fetch { query })],
        Command::Flights => vec![AppAction::Flights(FlightAction::Fetch { query })],
        Command::Bookings => vec![AppAction::Bookings(BookingAction::Fetch { query })],
        Command::Payments => Route::Payments.on_enter(config.page_size),
        Command::Chats => Route::Chat.on_enter(config.page_size),
        Command::Dashboard => Route::Dashboard.on_enter(config.page_size),
    };

    for action in actions {
        dispatch(store, action).await?;
    }

    report_errors(store).await;
    let state = store.state(Clone::clone).await;
    print_command(cli.command, &state);
    Ok(())
}

/// Send `action`, wait until its result is merged and return that result
async fn dispatch<B: Backend>(store: &AppStore<B>, action: AppAction) -> anyhow::Result<AppAction> {
    let slice = action.slice();
    let mut results = store.subscribe_actions();
    let mut handle = store.send(action).await?;
    handle
        .wait_with_timeout(REQUEST_TIMEOUT)
        .await
        .with_context(|| format!("{slice} request did not complete"))?;

    let mut outcome = None;
    while let Ok(result) = results.try_recv() {
        if result.slice() == slice && result.is_settled() {
            outcome = Some(result);
        }
    }
    outcome.with_context(|| format!("{slice} request produced no result"))
}

async fn report_errors<B: Backend>(store: &AppStore<B>) {
    let errors: Vec<(&'static str, String)> = store
        .state(|s| s.errors().into_iter().map(|(slice, e)| (slice, e.to_string())).collect())
        .await;
    for (slice, error) in errors {
        eprintln!("[{slice}] {error}");
    }
}

fn print_command(command: Command, state: &AppState) {
    match command {
        Command::Hotels => {
            for h in state.hotels.items.iter() {
                println!("{:<12} {:<28} {:<16} {:>10.2} {:>4.1}", h.id, h.name, h.city, h.price_per_night, h.rating);
            }
            print_pages(state.hotels.pagination.as_ref().map(|p| (p.page, p.total_pages, p.total)));
        },
        Command::Packages => {
            for p in state.packages.items.iter() {
                println!("{:<12} {:<28} {:<16} {:>3}d {:>10.2}", p.id, p.title, p.destination, p.duration_days, p.price);
            }
            print_pages(state.packages.pagination.as_ref().map(|p| (p.page, p.total_pages, p.total)));
        },
        Command::Flights => {
            for f in state.flights.items.iter() {
                println!(
                    "{:<12} {:<10} {} → {}  {}  {:>10.2}",
                    f.id,
                    f.flight_number,
                    f.origin,
                    f.destination,
                    f.departure_at.format("%Y-%m-%d %H:%M"),
                    f.price
                );
            }
            print_pages(state.flights.pagination.as_ref().map(|p| (p.page, p.total_pages, p.total)));
        },
        Command::Bookings => {
            for b in state.bookings.items.iter() {
                println!(
                    "{:<12} {:<8} {:<28} {:<20} {:>10.2} {}",
                    b.id,
                    b.kind.label(),
                    b.item_name,
                    b.customer_name,
                    b.amount,
                    b.status.label()
                );
            }
            print_pages(state.bookings.pagination.as_ref().map(|p| (p.page, p.total_pages, p.total)));
        },
        Command::Payments => {
            for p in state.payment.payments.iter() {
                println!(
                    "{:<12} {:<12} {:>10.2} {} {:?}",
                    p.id,
                    p.booking_id,
                    minor_to_major(p.amount_minor),
                    p.currency,
                    p.status
                );
            }
        },
        Command::Chats => {
            for c in state.chat.conversations.iter() {
                println!(
                    "{:<24} {:>3} unread  {}",
                    c.name,
                    c.unread_count,
                    c.last_message.as_deref().unwrap_or("")
                );
            }
            println!("{} unread in total", state.chat.unread_count);
        },
        Command::Dashboard => print_dashboard(&DashboardSummary::compute(state, Utc::now())),
    }
}

fn print_pages(pages: Option<(u32, u32, u64)>) {
    if let Some((page, total_pages, total)) = pages {
        println!("page {page}/{total_pages}, {total} records");
    }
}

fn print_dashboard(summary: &DashboardSummary) {
    println!(
        "hotels {}  packages {}  flights {} ({} upcoming)  bookings {} ({} pending)",
        summary.hotels,
        summary.packages,
        summary.flights,
        summary.upcoming_flights,
        summary.bookings,
        summary.pending_bookings
    );
    println!(
        "booking revenue {:.2}  payments collected {:.2}  unread messages {}",
        summary.booking_revenue, summary.payments_collected, summary.unread_messages
    );
    print_series("Bookings by status", &summary.status_breakdown);
    print_series("Revenue by kind", &summary.revenue_by_kind);
    print_series("Revenue by month", &summary.revenue_by_month);
    print_series("Top hotels", &summary.top_hotels);
    print_series("Top packages", &summary.top_packages);
}

fn print_series(title: &str, points: &[ChartPoint]) {
    if points.is_empty() {
        return;
    }
    println!("\n{title}");
    for point in points {
        println!("  {:<28} {:>12.2}", point.label, point.value);
    }
}
