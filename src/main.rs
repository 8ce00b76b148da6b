use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use coursetalk::cli::{UserCommands, prepare_store, run_info, run_shell, run_user_add};
use coursetalk::config::ForumConfig;
use coursetalk::seed::seed_demo;
use coursetalk::store::Store;

#[derive(Parser)]
#[command(name = "coursetalk")]
#[command(about = "Course discussion forum", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database
    Init {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the interactive forum
    Shell {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Load the demo users, course and messages first
        #[arg(long)]
        demo: bool,
    },

    /// Load the demo users, course and messages
    Seed {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Show row counts
    Info {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

impl Commands {
    fn data_dir(&self) -> &str {
        match self {
            Commands::Init { data_dir }
            | Commands::Shell { data_dir, .. }
            | Commands::Seed { data_dir }
            | Commands::Info { data_dir, .. } => data_dir,
            Commands::User { command } => match command {
                UserCommands::Add { data_dir, .. } => data_dir,
            },
        }
    }
}

fn init_tracing(config: &ForumConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("invalid log_filter '{}'", config.log_filter))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_seed_report(report: &coursetalk::seed::SeedReport) {
    println!(
        "Demo data: {} users, {} course, {} enrollments, {} messages added.",
        report.users_created,
        usize::from(report.course_created),
        report.enrollments_created,
        report.messages_created
    );
    println!("You can log in as:");
    println!("  Staff:   username 'prof_smith', password 'staff123'");
    println!("  Student: username 'student_john', password 'student123'");
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ForumConfig::load(cli.command.data_dir())?;
    init_tracing(&config)?;

    match cli.command {
        Commands::Init { .. } => {
            let store = prepare_store(&config)?;
            store.close()?;
            info!("initialized database at {}", config.db_path().display());
            println!("Database ready at {}", config.db_path().display());
        }
        Commands::Shell { demo, .. } => {
            let store = prepare_store(&config).context("failed to open the forum database")?;
            if demo {
                print_seed_report(&seed_demo(&store)?);
            }
            let result = run_shell(&store);
            store.close()?;
            result?;
        }
        Commands::Seed { .. } => {
            let store = prepare_store(&config)?;
            let report = seed_demo(&store)?;
            store.close()?;
            print_seed_report(&report);
        }
        Commands::Info { json, .. } => run_info(&config, json)?,
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                full_name,
                role,
                password_stdin,
                non_interactive,
                ..
            } => run_user_add(
                &config,
                username,
                full_name,
                role,
                password_stdin,
                non_interactive,
            )?,
        },
    }

    Ok(())
}
