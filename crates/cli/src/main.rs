use clap::{Parser, Subcommand};
use hms_client::services::Credentials;
use hms_client::{ApiClient, ClientConfig, Session};
use hms_core::formatters::{format_bytes, format_currency, format_phone_number};
use hms_core::models::{PrescriptionStatus, Priority};
use hms_core::pagination::page_markers;
use hms_core::permissions::{
    accessible_routes, can_access_resource, format_permission_name, role_permissions,
};
use hms_core::queue::{QueueFilter, QueueStatistics, Selection};
use hms_core::Role;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management client CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the token in the session file
    Login {
        /// Email address or username
        identifier: String,
        /// Password; read from standard input when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored credentials
    Logout,
    /// Show the signed-in user and session age
    Whoami,
    /// List the permissions granted to a role
    Permissions {
        /// Role name (ADMIN, DOCTOR, NURSE, RECEPTIONIST, PHARMACIST, PATIENT)
        role: Role,
    },
    /// List the navigation routes a role may open
    Routes { role: Role },
    /// Check whether a role may perform an action on a resource
    Can {
        role: Role,
        /// Resource name, e.g. prescriptions
        resource: String,
        /// Action name, e.g. dispense
        action: String,
    },
    /// Print the page-number strip for a page position
    Pages {
        /// Current page (1-based)
        current: usize,
        /// Total number of pages
        total: usize,
    },
    /// Format a value for display
    Format {
        #[command(subcommand)]
        kind: FormatKind,
    },
    /// Show the pharmacy queue
    Queue {
        /// Status to show, or "all"
        #[arg(long, default_value = "PENDING")]
        status: Selection<PrescriptionStatus>,
        /// Priority to show, or "all"
        #[arg(long, default_value = "all")]
        priority: Selection<Priority>,
        /// Match on prescription number, patient name or patient id
        #[arg(long)]
        search: Option<String>,
    },
    /// Medication catalogue
    Medications {
        #[command(subcommand)]
        action: MedicationAction,
    },
    /// Prescription records
    Prescriptions {
        #[command(subcommand)]
        action: PrescriptionAction,
    },
}

#[derive(Subcommand)]
enum FormatKind {
    Currency {
        amount: f64,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    Phone { number: String },
    Bytes {
        bytes: u64,
        #[arg(long, default_value_t = 2)]
        decimals: usize,
    },
}

#[derive(Subcommand)]
enum MedicationAction {
    /// Search the catalogue by name
    Search { query: String },
    /// Medications at or below the stock threshold
    LowStock {
        #[arg(long)]
        threshold: Option<u32>,
    },
}

#[derive(Subcommand)]
enum PrescriptionAction {
    /// Download the prescription export spreadsheet
    Export,
    /// Download the printable PDF for one prescription
    Print { id: u64 },
}

fn api() -> anyhow::Result<ApiClient> {
    let config = ClientConfig::from_env()?;
    let session = Session::for_config(&config);
    Ok(ApiClient::new(config, session)?)
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            identifier,
            password,
        } => {
            let api = api()?;
            if api.config().session_file().is_none() {
                eprintln!("HMS_SESSION_FILE is not set; the login will not outlive this command.");
            }
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let user = api
                .auth()
                .login(&Credentials::new(identifier, password))
                .await?;
            println!(
                "Signed in as {} ({})",
                user.display_name(),
                user.role.as_deref().unwrap_or("no role")
            );
        }
        Commands::Logout => {
            api()?.auth().logout().await?;
            println!("Signed out.");
        }
        Commands::Whoami => match api()?.auth().session_info()? {
            Some(info) => {
                println!("{} <{}>", info.user.display_name(), info.user.email);
                println!(
                    "signed in {} minute(s) ago{}",
                    info.duration_minutes,
                    if info.is_active { "" } else { ", session expired" }
                );
                if !info.is_active {
                    std::process::exit(1);
                }
            }
            None => {
                println!("Not signed in.");
                std::process::exit(1);
            }
        },
        Commands::Permissions { role } => {
            for permission in role_permissions(role) {
                println!("{permission:<28} {}", format_permission_name(permission));
            }
        }
        Commands::Routes { role } => {
            for route in accessible_routes(role) {
                println!("{route}");
            }
        }
        Commands::Can {
            role,
            resource,
            action,
        } => {
            let allowed = can_access_resource(role, &resource, &action);
            println!("{}", if allowed { "allowed" } else { "denied" });
            if !allowed {
                std::process::exit(1);
            }
        }
        Commands::Pages { current, total } => {
            let strip: Vec<String> = page_markers(current, total)
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("{}", strip.join(" "));
        }
        Commands::Format { kind } => match kind {
            FormatKind::Currency { amount, currency } => {
                println!("{}", format_currency(amount, &currency))
            }
            FormatKind::Phone { number } => println!("{}", format_phone_number(&number)),
            FormatKind::Bytes { bytes, decimals } => println!("{}", format_bytes(bytes, decimals)),
        },
        Commands::Queue {
            status,
            priority,
            search,
        } => {
            let entries = api()?.prescriptions().pharmacy_queue(&[]).await?;
            let filter = QueueFilter {
                status,
                priority,
                search,
            };
            let shown = filter.apply(&entries);
            if shown.is_empty() {
                println!("No prescriptions in queue.");
            }
            for entry in &shown {
                println!(
                    "{:<14} {:<24} {:<9} {:<12} {} item(s){}",
                    entry.prescription_number,
                    entry.patient_name,
                    entry.priority.as_str(),
                    entry.status.as_str(),
                    entry.total_items(),
                    if entry.has_stock_shortage() { "  [stock shortage]" } else { "" }
                );
            }
            let stats = QueueStatistics::from_entries(&entries);
            println!(
                "pending {}  in progress {}  completed {}  urgent {}",
                stats.pending, stats.in_progress, stats.completed, stats.urgent
            );
        }
        Commands::Medications { action } => {
            let medications = match action {
                MedicationAction::Search { query } => api()?.medications().search(&query).await?,
                MedicationAction::LowStock { threshold } => {
                    api()?.medications().low_stock(threshold).await?
                }
            };
            for medication in medications {
                let stock = medication
                    .stock_level
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".into());
                println!("{:<6} {:<32} stock {stock}", medication.id, medication.name);
            }
        }
        Commands::Prescriptions { action } => {
            let path = match action {
                PrescriptionAction::Export => api()?.prescriptions().export(&[]).await?,
                PrescriptionAction::Print { id } => api()?.prescriptions().print(id).await?,
            };
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}
