//! Hotels CLI
//!
//! Command-line interface for the Hotel Booking API.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use hotels_client::HotelsClient;
use hotels_types::{
    CreateBookingRequest, CreateHotelRequest, HotelId, HotelSearchQuery, RegisterRequest,
    SortOption,
};

#[derive(Parser)]
#[command(name = "hotels")]
#[command(author, version, about = "Hotel Booking API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Hotels API
    #[arg(long, env = "HOTELS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Session token for authenticated commands
    #[arg(long, env = "HOTELS_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Register a new user and print the session token
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Log in and print the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Hotel operations
    Hotel {
        #[command(subcommand)]
        action: HotelCommands,
    },
    /// Booking operations
    Booking {
        #[command(subcommand)]
        action: BookingCommands,
    },
}

#[derive(Subcommand)]
enum HotelCommands {
    /// List all hotels
    List,
    /// Get hotel details
    Get {
        /// Hotel ID (UUID)
        id: String,
    },
    /// Search hotels
    Search {
        /// City or country
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        adults: Option<u32>,
        #[arg(long)]
        children: Option<u32>,
        /// Required facility (repeatable)
        #[arg(long = "facility")]
        facilities: Vec<String>,
        /// Accepted hotel type (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
        /// Accepted star rating (repeatable)
        #[arg(long = "stars")]
        stars: Vec<u8>,
        /// Maximum nightly price in minor units
        #[arg(long)]
        max_price: Option<i64>,
        /// star_rating, price_per_night_asc or price_per_night_desc
        #[arg(long)]
        sort: Option<SortOption>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// List a new hotel (requires a token)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        description: String,
        #[arg(long = "type")]
        hotel_type: String,
        #[arg(long)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
        /// Facilities (comma-separated)
        #[arg(long, value_delimiter = ',')]
        facilities: Vec<String>,
        /// Nightly price in minor units
        #[arg(long)]
        price: i64,
        #[arg(long)]
        stars: u8,
        /// Image URLs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        images: Vec<String>,
    },
    /// Hotels you own (requires a token)
    Mine,
}

#[derive(Subcommand)]
enum BookingCommands {
    /// Create a payment intent for a stay
    Intent {
        /// Hotel ID (UUID)
        hotel_id: String,
        #[arg(long)]
        nights: u32,
    },
    /// Confirm a booking after the payment succeeded
    Confirm {
        /// Hotel ID (UUID)
        hotel_id: String,
        #[arg(long)]
        payment_intent: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
        /// RFC 3339 timestamp, e.g. 2026-11-01T14:00:00Z
        #[arg(long)]
        check_in: DateTime<Utc>,
        #[arg(long)]
        check_out: DateTime<Utc>,
    },
    /// Hotels you have booked, with your bookings
    Mine,
}

fn parse_hotel_id(s: &str) -> Result<HotelId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid hotel ID: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = HotelsClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let auth = client
                .register(&RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&auth)?);
        }

        Commands::Login { email, password } => {
            let auth = client.login(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&auth)?);
        }

        Commands::Hotel { action } => match action {
            HotelCommands::List => {
                let hotels = client.list_hotels().await?;
                println!("{}", serde_json::to_string_pretty(&hotels)?);
            }
            HotelCommands::Get { id } => {
                let hotel = client.get_hotel(parse_hotel_id(&id)?).await?;
                println!("{}", serde_json::to_string_pretty(&hotel)?);
            }
            HotelCommands::Search {
                destination,
                adults,
                children,
                facilities,
                types,
                stars,
                max_price,
                sort,
                page,
            } => {
                let query = HotelSearchQuery {
                    destination,
                    adult_count: adults,
                    child_count: children,
                    facilities,
                    types,
                    stars,
                    max_price,
                    sort_option: sort,
                    page,
                };
                let results = client.search_hotels(&query).await?;
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            HotelCommands::Create {
                name,
                city,
                country,
                description,
                hotel_type,
                adults,
                children,
                facilities,
                price,
                stars,
                images,
            } => {
                let req = CreateHotelRequest {
                    name,
                    city,
                    country,
                    description,
                    hotel_type,
                    adult_count: adults,
                    child_count: children,
                    facilities,
                    price_per_night: price,
                    star_rating: stars,
                    image_urls: images,
                };
                let hotel = client.create_hotel(&req).await?;
                println!("{}", serde_json::to_string_pretty(&hotel)?);
            }
            HotelCommands::Mine => {
                let hotels = client.my_hotels().await?;
                println!("{}", serde_json::to_string_pretty(&hotels)?);
            }
        },

        Commands::Booking { action } => match action {
            BookingCommands::Intent { hotel_id, nights } => {
                let intent = client
                    .create_payment_intent(parse_hotel_id(&hotel_id)?, nights)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
            BookingCommands::Confirm {
                hotel_id,
                payment_intent,
                first_name,
                last_name,
                email,
                adults,
                children,
                check_in,
                check_out,
            } => {
                let req = CreateBookingRequest {
                    payment_intent_id: payment_intent,
                    first_name,
                    last_name,
                    email,
                    adult_count: adults,
                    child_count: children,
                    check_in,
                    check_out,
                };
                let booking = client
                    .create_booking(parse_hotel_id(&hotel_id)?, &req)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&booking)?);
            }
            BookingCommands::Mine => {
                let hotels = client.my_bookings().await?;
                println!("{}", serde_json::to_string_pretty(&hotels)?);
            }
        },
    }

    Ok(())
}
