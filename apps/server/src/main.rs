use anyhow::Context;
use clap::{Parser, Subcommand};
use realty_config::load as load_config;
use realty_database::{
    BrokerProfileUpdate, BrokerRepository, ListingRepository, ListingStatus, NewListing,
    PropertyType,
};
use realty_gateway::{build_router, AppState};
use realty_runtime::{telemetry, BackendServices};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "realty-server")]
#[command(about = "Realty listing backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print every listing and broker profile as JSON
    DumpData,
    /// Delete every listing
    ClearData,
    /// Create a demo admin with a public profile and a few listings
    SeedData {
        #[arg(long, default_value = "demo@realty.local")]
        email: String,
        #[arg(long, default_value = "demo-123456")]
        password: String,
    },
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(services).await,
        Commands::DumpData => dump_data(&services).await,
        Commands::ClearData => clear_data(&services).await,
        Commands::SeedData { email, password } => seed_data(&services, &email, &password).await,
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => create_admin(&services, &name, &email, &password).await,
    }
}

async fn run_server(services: BackendServices) -> anyhow::Result<()> {
    info!("starting realty backend");

    let state = AppState::new(
        services.authenticator.clone(),
        services.image_host.clone(),
        services.config.catalog.clone(),
    );
    let app = build_router(state);

    let http = &services.config.http;
    let address = format!("{}:{}", http.address, http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(realty_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn dump_data(services: &BackendServices) -> anyhow::Result<()> {
    let listings = ListingRepository::new(services.db_pool.clone())
        .list_all()
        .await
        .context("failed to fetch listings")?;
    let brokers = BrokerRepository::new(services.db_pool.clone())
        .list_all()
        .await
        .context("failed to fetch broker profiles")?;

    let dump = json!({ "listings": listings, "brokers": brokers });
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

async fn clear_data(services: &BackendServices) -> anyhow::Result<()> {
    let deleted = sqlx::query("DELETE FROM listings")
        .execute(&services.db_pool)
        .await
        .context("failed to delete listings")?;

    println!("Database cleared:");
    println!("- {} listings deleted", deleted.rows_affected());
    Ok(())
}

async fn create_admin(
    services: &BackendServices,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let user = services
        .authenticator
        .register_admin(name, email, password)
        .await
        .map_err(|error| anyhow::anyhow!(error.user_message()))
        .context("failed to create admin")?;

    println!("Admin created: {} ({})", email.trim(), user.public_id);
    Ok(())
}

async fn seed_data(services: &BackendServices, email: &str, password: &str) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let user = match services
        .authenticator
        .register_admin("Corretor Demonstração", email, password)
        .await
    {
        Ok(user) => user,
        Err(error) => {
            warn!(%error, "demo admin not created, reusing existing account");
            let session = services
                .authenticator
                .login_with_password(email, password)
                .await
                .map_err(|error| anyhow::anyhow!(error.user_message()))
                .context("demo admin exists with a different password")?;
            services.authenticator.logout(&session.token).await?;
            services.authenticator.user_profile(session.user_id).await?
        }
    };

    let brokers = BrokerRepository::new(services.db_pool.clone());
    brokers
        .upsert_for_user(
            user.id,
            &BrokerProfileUpdate {
                name: "Corretor Demonstração".to_string(),
                creci: "CRECI 0000-F".to_string(),
                phone: "86999990000".to_string(),
                email: email.trim().to_string(),
                instagram_username: Some("realty.demo".to_string()),
                ..BrokerProfileUpdate::default()
            },
        )
        .await
        .context("failed to seed broker profile")?;

    let listings = ListingRepository::new(services.db_pool.clone());
    let limit = services.config.catalog.featured_limit;
    let seeds = seed_listings();
    for listing in &seeds {
        listings
            .create(listing, limit)
            .await
            .with_context(|| format!("failed to insert listing {}", listing.title))?;
    }

    println!("Database seeded with demo data:");
    println!("- admin {} with a public broker profile", email.trim());
    println!("- {} listings created", seeds.len());
    println!("Run 'dump-data' to see the inserted data");
    Ok(())
}

fn seed_listings() -> Vec<NewListing> {
    let base = |title: &str, kind: PropertyType, price: Option<f64>| NewListing {
        title: title.to_string(),
        description: format!("{title} em ótima localização."),
        price,
        neighborhood: "Jóquei".to_string(),
        city: "Teresina".to_string(),
        address: Some("Avenida Dom Severino, 1000".to_string()),
        bedrooms: 0,
        bathrooms: 0,
        suites: 0,
        closets: 0,
        garage_spaces: 0,
        area: None,
        property_type: kind,
        status: ListingStatus::Available,
        featured: false,
        images: Vec::new(),
        features: Vec::new(),
    };

    vec![
        NewListing {
            bedrooms: 4,
            bathrooms: 3,
            suites: 2,
            garage_spaces: 2,
            area: Some(250.0),
            featured: true,
            features: vec!["Piscina".to_string(), "Área gourmet".to_string()],
            ..base("Casa com piscina", PropertyType::House, Some(850_000.0))
        },
        NewListing {
            bedrooms: 3,
            bathrooms: 2,
            suites: 1,
            garage_spaces: 1,
            area: Some(95.0),
            features: vec!["Varanda".to_string(), "Elevador".to_string()],
            ..base("Apartamento no Centro", PropertyType::Apartment, Some(420_000.0))
        },
        NewListing {
            neighborhood: "Fátima".to_string(),
            bedrooms: 4,
            bathrooms: 4,
            suites: 4,
            closets: 2,
            garage_spaces: 3,
            area: Some(320.0),
            featured: true,
            ..base("Cobertura duplex", PropertyType::Penthouse, None)
        },
        NewListing {
            area: Some(600.0),
            status: ListingStatus::Sold,
            ..base("Terreno em condomínio", PropertyType::Land, Some(180_000.0))
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_listings_stay_under_the_default_featured_cap() {
        let featured = seed_listings().iter().filter(|l| l.featured).count();
        assert!(featured <= realty_config::CatalogConfig::default().featured_limit);
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::parse_from(["realty-server"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from([
            "realty-server",
            "create-admin",
            "--name",
            "Ana",
            "--email",
            "ana@example.com",
            "--password",
            "segredo-1",
        ]);
        assert!(matches!(cli.command, Some(Commands::CreateAdmin { .. })));
    }
}
