use clap::{Parser, Subcommand};
use sharewatch::{config::AppConfig, db, models::CompanyRole, AppState};

#[derive(Parser)]
#[command(name = "sharewatch-cli")]
#[command(about = "CLI tool for managing sharewatch companies and sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Company management commands
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    /// Profile management commands
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// API session commands
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Onboarding commands
    Onboarding {
        #[command(subcommand)]
        command: OnboardingCommands,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Create a company and its first admin
    Create {
        #[arg(short, long)]
        name: String,

        /// Email of the admin profile (created if unknown)
        #[arg(short, long)]
        admin_email: String,
    },

    /// List the members of a company
    Members {
        #[arg(short, long)]
        id: i64,
    },

    /// Delete a company with its verification and onboarding data
    Delete {
        #[arg(short, long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create a profile, optionally inside a company
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        company_id: Option<i64>,

        /// admin or member
        #[arg(short, long, default_value = "member")]
        role: String,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Issue a bearer token for a profile
    Issue {
        #[arg(short, long)]
        email: String,

        /// Lifetime in hours (defaults to SESSION_TTL_HOURS)
        #[arg(short, long)]
        ttl_hours: Option<i64>,
    },

    /// Revoke a bearer token
    Revoke {
        #[arg(short, long)]
        token: String,
    },
}

#[derive(Subcommand)]
enum OnboardingCommands {
    /// Clear every onboarding step of a company
    Reset {
        #[arg(short, long)]
        company_id: i64,
    },
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}: {}", context, err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::migrate(&pool).await?;

    let state = AppState::new(pool, &config.gateway)?;

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Company { command } => match command {
            CompanyCommands::Create { name, admin_email } => {
                match state.company_service.create_company(&name, &admin_email).await {
                    Ok(created) => {
                        println!("✅ Company created successfully!");
                        println!("  ID: {}", created.company.id);
                        println!("  Name: {}", created.company.name);
                        println!("  Admin: {} (profile {})", created.admin.email, created.admin.id);
                    }
                    Err(err) => fail("Failed to create company", err),
                }
            }

            CompanyCommands::Members { id } => match state.company_service.members(id).await {
                Ok(members) => {
                    if members.is_empty() {
                        println!("No members found.");
                    } else {
                        println!("{:<5} {:<40} {:<8} {:<20}", "ID", "Email", "Role", "Created");
                        println!("{}", "-".repeat(75));
                        for member in members {
                            println!(
                                "{:<5} {:<40} {:<8} {:<20}",
                                member.id,
                                member.email,
                                member.company_role,
                                member.created_at.as_deref().unwrap_or("N/A")
                            );
                        }
                    }
                }
                Err(err) => fail("Failed to list members", err),
            },

            CompanyCommands::Delete { id } => match state.company_service.delete_company(id).await {
                Ok(()) => println!("✅ Company {} deleted successfully!", id),
                Err(err) => fail("Failed to delete company", err),
            },
        },

        Commands::Profile { command } => match command {
            ProfileCommands::Create {
                email,
                company_id,
                role,
            } => {
                let role: CompanyRole = match role.parse() {
                    Ok(role) => role,
                    Err(err) => fail("Invalid role", err),
                };

                let result = match company_id {
                    Some(company_id) => {
                        state
                            .company_service
                            .add_member(company_id, &email, role)
                            .await
                    }
                    None => state.company_service.create_profile(&email, None).await,
                };

                match result {
                    Ok(profile) => {
                        println!("✅ Profile created successfully!");
                        println!("  ID: {}", profile.id);
                        println!("  Email: {}", profile.email);
                        match profile.company_id {
                            Some(company_id) => {
                                println!("  Company: {} ({})", company_id, profile.company_role)
                            }
                            None => println!("  Company: none"),
                        }
                    }
                    Err(err) => fail("Failed to create profile", err),
                }
            }
        },

        Commands::Session { command } => match command {
            SessionCommands::Issue { email, ttl_hours } => {
                let profile = match state.company_service.find_profile_by_email(&email).await {
                    Ok(Some(profile)) => profile,
                    Ok(None) => fail("Profile not found", &email),
                    Err(err) => fail("Failed to find profile", err),
                };

                let ttl = chrono::Duration::hours(ttl_hours.unwrap_or(config.session_ttl_hours));
                match state.auth_service.issue_session(profile.id, ttl).await {
                    Ok(session) => {
                        let expires = chrono::DateTime::from_timestamp(session.expires_at, 0)
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| session.expires_at.to_string());
                        println!("✅ Session issued for '{}' (expires {})", email, expires);
                        println!("{}", session.token);
                    }
                    Err(err) => fail("Failed to issue session", err),
                }
            }

            SessionCommands::Revoke { token } => {
                match state.auth_service.revoke_session(&token).await {
                    Ok(true) => println!("✅ Session revoked"),
                    Ok(false) => println!("ℹ️  No session matched that token"),
                    Err(err) => fail("Failed to revoke session", err),
                }
            }
        },

        Commands::Onboarding { command } => match command {
            OnboardingCommands::Reset { company_id } => {
                match state.onboarding_service.reset(company_id).await {
                    Ok(_) => println!("✅ Onboarding reset for company {}", company_id),
                    Err(err) => fail("Failed to reset onboarding", err),
                }
            }
        },
    }

    Ok(())
}
