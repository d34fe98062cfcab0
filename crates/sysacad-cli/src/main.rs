use chrono::Local;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::PgPool;
use sysacad_cli::seeder::{self, StudentSeedConfig};
use sysacad_config::DatabaseConfig;

#[derive(Parser)]
#[command(name = "sysacad-cli")]
#[command(about = "Sysacad CLI - Administrative tools for the student service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Insert or refresh the DNI, LC, LE and PASAPORTE document types
    SeedDocumentTypes,
    /// Seed fake students (document types must exist)
    SeedStudents {
        /// Number of students to generate
        #[arg(short = 'n', long, default_value = "25")]
        count: usize,

        /// Specialty assigned to every generated student
        #[arg(short = 's', long, default_value = "1")]
        specialty_id: i32,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match sysacad_db::init_db_pool(&DatabaseConfig::from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::SeedDocumentTypes => handle_seed_document_types(&pool).await,
        Commands::SeedStudents {
            count,
            specialty_id,
        } => handle_seed_students(&pool, count, specialty_id).await,
    }
}

async fn handle_migrate(pool: &PgPool) {
    match sysacad_db::run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("\n❌ {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed_document_types(pool: &PgPool) {
    match seeder::seed_document_types(pool).await {
        Ok(count) => println!("✅ {} document types in place", count),
        Err(e) => {
            eprintln!("\n❌ Error seeding document types: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed_students(pool: &PgPool, count: usize, specialty_id: i32) {
    if specialty_id <= 0 {
        eprintln!("❌ Specialty ID must be a positive integer.");
        std::process::exit(1);
    }

    let config = StudentSeedConfig {
        count,
        specialty_id,
    };

    match seeder::seed_students(pool, config, Local::now().date_naive()).await {
        Ok(inserted) => println!("✅ Created {} students", inserted),
        Err(e) => {
            eprintln!("\n❌ Error seeding students: {}", e);
            std::process::exit(1);
        }
    }
}
