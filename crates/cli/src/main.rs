//! Sajilo CLI - marketplace operations against a running sajilo-waste server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "sajilo")]
#[command(about = "Sajilo Waste marketplace CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SAJILO_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Acting user id
    #[arg(long = "as", env = "SAJILO_USER_ID", global = true)]
    user_id: Option<String>,

    /// Acting user's role
    #[arg(long, env = "SAJILO_ROLE", value_enum, default_value = "customer", global = true)]
    role: Role,
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Customer,
    Dealer,
    Rider,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Dealer => "dealer",
            Role::Rider => "rider",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Status {
    Accepted,
    PickedUp,
    Completed,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Accepted => "accepted",
            Status::PickedUp => "picked_up",
            Status::Completed => "completed",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List items open for dealers
    Available,

    /// Post a waste item for sale
    Post {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Asking price (decimal, e.g. 50 or 12.50)
        #[arg(short, long)]
        price: String,

        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lng: f64,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        quantity: Option<String>,
    },

    /// Accept an available item (dealer)
    Accept { item_id: String },

    /// Assign a rider to an accepted item (dealer)
    AssignRider { item_id: String, rider_id: String },

    /// Advance an item's status (assigned rider)
    Advance {
        item_id: String,

        #[arg(value_enum)]
        status: Status,
    },

    /// List pending pickup requests
    Pending,

    /// Offer a price on a pending pickup request (dealer)
    Offer { request_id: String, price: String },

    /// List notifications
    Notifications,

    /// Count unread notifications
    Unread,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct ItemRow {
    id: String,
    title: String,
    price: String,
    status: String,
    #[serde(default)]
    #[tabled(display_with = "display_opt")]
    poster_name: Option<String>,
}

#[derive(Deserialize, Tabled)]
struct PickupRow {
    id: String,
    pickup_date: String,
    pickup_time: String,
    location: String,
    status: String,
    #[serde(default)]
    #[tabled(display_with = "display_opt")]
    requester_name: Option<String>,
}

#[derive(Deserialize, Tabled)]
struct NotificationRow {
    id: String,
    title: String,
    message: String,
    is_read: bool,
}

fn display_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to server")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn actor(cli: &Cli) -> Result<Value> {
    let user_id = cli
        .user_id
        .as_deref()
        .context("No acting user: pass --as <user_id> or set SAJILO_USER_ID")?;
    Ok(json!({ "user_id": user_id, "role": cli.role.as_str() }))
}

fn print_table<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.yellow());
    } else {
        println!("{}", Table::new(rows));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match &cli.command {
        Commands::Available => {
            let result = call_rpc(url, "item.available.v1", json!({})).await?;
            let rows: Vec<ItemRow> = serde_json::from_value(result)?;
            print_table(rows, "No items available");
        }

        Commands::Post {
            title,
            description,
            price,
            lat,
            lng,
            category,
            quantity,
        } => {
            let params = json!({
                "actor": actor(&cli)?,
                "item": {
                    "title": title,
                    "description": description,
                    "price": price,
                    "location_lat": lat,
                    "location_lng": lng,
                    "category": category,
                    "quantity": quantity,
                },
            });

            let result = call_rpc(url, "item.create.v1", params).await?;
            let item: ItemRow = serde_json::from_value(result)?;

            println!("{}", "✓ Item posted".green().bold());
            println!();
            println!("{}", Table::new(vec![item]));
        }

        Commands::Accept { item_id } => {
            let params = json!({ "actor": actor(&cli)?, "item_id": item_id });
            let result = call_rpc(url, "item.accept.v1", params).await?;

            println!("{}", format!("✓ Item {} accepted", item_id).green().bold());
            if let Some(tx) = result["transaction"]["id"].as_str() {
                println!("  {} {}", "Transaction:".bold(), tx);
            }
        }

        Commands::AssignRider { item_id, rider_id } => {
            let params = json!({
                "actor": actor(&cli)?,
                "item_id": item_id,
                "rider_id": rider_id,
            });
            call_rpc(url, "item.assign_rider.v1", params).await?;

            println!(
                "{}",
                format!("✓ Rider {} assigned to {}", rider_id, item_id)
                    .green()
                    .bold()
            );
        }

        Commands::Advance { item_id, status } => {
            let params = json!({
                "actor": actor(&cli)?,
                "item_id": item_id,
                "status": status.as_str(),
            });
            call_rpc(url, "item.update_status.v1", params).await?;

            println!(
                "{}",
                format!("✓ Item {} is now {}", item_id, status.as_str())
                    .green()
                    .bold()
            );
        }

        Commands::Pending => {
            let result = call_rpc(url, "pickup.pending.v1", json!({})).await?;
            let rows: Vec<PickupRow> = serde_json::from_value(result)?;
            print_table(rows, "No pending pickup requests");
        }

        Commands::Offer { request_id, price } => {
            let params = json!({
                "actor": actor(&cli)?,
                "request_id": request_id,
                "price": price,
            });
            call_rpc(url, "pickup.offer.v1", params).await?;

            println!(
                "{}",
                format!("✓ Offered {} on {}", price, request_id).green().bold()
            );
        }

        Commands::Notifications => {
            let params = json!({ "actor": actor(&cli)? });
            let result = call_rpc(url, "notification.list.v1", params).await?;
            let rows: Vec<NotificationRow> = serde_json::from_value(result)?;
            print_table(rows, "No notifications");
        }

        Commands::Unread => {
            let params = json!({ "actor": actor(&cli)? });
            let result = call_rpc(url, "notification.unread_count.v1", params).await?;
            let count = result["count"].as_i64().unwrap_or(0);

            if count > 0 {
                println!("{} unread", count.to_string().cyan().bold());
            } else {
                println!("{}", "All caught up".green());
            }
        }
    }

    Ok(())
}
