//! `LightBnB` command-line host.
//!
//! Opens the database, runs one command against the storage layer, prints
//! the result as JSON, and closes the pool.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use lightbnb_core::config::{Config, load_config};
use lightbnb_core::tracing_init::init_tracing;
use lightbnb_server::accounts::{self, SignupRequest};
use lightbnb_server::storage::{LightbnbDatabase, NewProperty, PropertySearch};

#[derive(Parser, Debug)]
#[command(name = "lightbnb")]
#[command(version, about = "LightBnB booking backend")]
struct Args {
    /// Path to a JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to SQLite database file.
    #[arg(long, global = true, env = "LIGHTBNB_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LIGHTBNB_PASSWORD")]
        password: String,
    },
    /// Check an email/password pair.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LIGHTBNB_PASSWORD")]
        password: String,
    },
    /// Show a user by ID.
    Me {
        #[arg(long)]
        user_id: i64,
    },
    /// Search properties.
    Search(SearchArgs),
    /// List a guest's reservations.
    Reservations {
        #[arg(long)]
        guest_id: i64,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Add a property listing.
    AddProperty(PropertyArgs),
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    #[arg(long)]
    owner_id: Option<i64>,
    /// Substring of the city name.
    #[arg(long)]
    city: Option<String>,
    /// Minimum nightly price, in dollars.
    #[arg(long)]
    min_price: Option<f64>,
    /// Maximum nightly price, in dollars.
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<SearchArgs> for PropertySearch {
    fn from(args: SearchArgs) -> Self {
        Self {
            owner_id: args.owner_id,
            city: args.city,
            minimum_price_per_night: args.min_price,
            maximum_price_per_night: args.max_price,
            minimum_rating: args.min_rating,
            limit: args.limit,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct PropertyArgs {
    #[arg(long)]
    owner_id: i64,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    thumbnail_url: String,
    #[arg(long, default_value = "")]
    cover_url: String,
    /// Nightly price, in dollars.
    #[arg(long)]
    cost_per_night: f64,
    #[arg(long, default_value = "")]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long, default_value = "")]
    province: String,
    #[arg(long, default_value = "")]
    post_code: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value_t = 0)]
    parking_spaces: i64,
    #[arg(long, default_value_t = 0)]
    bathrooms: i64,
    #[arg(long, default_value_t = 0)]
    bedrooms: i64,
}

impl From<PropertyArgs> for NewProperty {
    fn from(args: PropertyArgs) -> Self {
        Self {
            owner_id: args.owner_id,
            title: args.title,
            description: args.description,
            thumbnail_url: args.thumbnail_url,
            cover_url: args.cover_url,
            cost_per_night: args.cost_per_night,
            street: args.street,
            city: args.city,
            province: args.province,
            post_code: args.post_code,
            country: args.country,
            parking_spaces: args.parking_spaces,
            bathrooms: args.bathrooms,
            bedrooms: args.bedrooms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = args.db_path.clone() {
        config.database.path = Some(path);
    }
    if args.log_json {
        config.logging.json = true;
    }

    init_tracing(
        &format!(
            "lightbnb_server={level},lightbnb_core={level}",
            level = config.logging.level
        ),
        config.logging.json,
    );

    let db_path = config
        .database
        .resolved_path()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine database path"))?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %db_path.display(),
        "Opening LightBnB database"
    );
    let db = LightbnbDatabase::open(&db_path, config.database.max_connections).await?;

    let result = run(&db, &config, args.command).await;
    db.close().await;
    result
}

async fn run(db: &LightbnbDatabase, config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let user = accounts::signup(
                db,
                SignupRequest {
                    name,
                    email,
                    password,
                },
            )
            .await?;
            print_json(&user)
        }
        Command::Login { email, password } => {
            let user = accounts::login(db, &email, &password).await?;
            print_json(&user)
        }
        Command::Me { user_id } => {
            let user = accounts::current_user(db, user_id)
                .await?
                .with_context(|| format!("No user with id {user_id}"))?;
            print_json(&user)
        }
        Command::Search(search) => {
            let search = PropertySearch::from(search);
            let statement = search.to_statement(config.search.default_limit)?;
            debug!(sql = %statement.sql, params = ?statement.params, "Property search");
            let listings = db.run_search(&statement).await?;
            info!(count = listings.len(), "Property search complete");
            print_json(&listings)
        }
        Command::Reservations { guest_id, limit } => {
            let rows = db
                .get_all_reservations(guest_id, limit.unwrap_or(config.search.default_limit))
                .await?;
            print_json(&rows)
        }
        Command::AddProperty(property) => {
            let created = db.create_property(&NewProperty::from(property)).await?;
            info!(property_id = created.id, "Property created");
            print_json(&created)
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
