//! Menu seeder - loads the demo catalogue into the configured database

use anyhow::Context;
use clap::Parser;
use menu_server::{
    config::Config,
    logging,
    startup,
    state::{AppState, AppStateOptions},
};

#[derive(Parser, Debug)]
#[command(
    name = "menu-seed",
    version,
    about = "Insert the built-in demo dishes (existing names are skipped)"
)]
struct Cli {
    /// Number of dishes to preview after seeding
    #[arg(long, default_value_t = 3)]
    preview: i64,

    /// Also create a superuser with this e-mail
    #[arg(long, requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for --admin-email
    #[arg(long, requires = "admin_email")]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let state = AppState::new_with_options(
        config,
        AppStateOptions {
            run_migrations: true,
            connect_redis: false,
        },
    )
    .await
    .context("Failed to initialize application state")?;

    let report = startup::seed_dishes(&state.dish_service)
        .await
        .context("Failed to seed dishes")?;
    println!(
        "Created {} new dishes ({} already present)",
        report.created, report.skipped
    );

    let preview = startup::preview(&state.dish_service, cli.preview)
        .await
        .context("Failed to load preview")?;
    if !preview.is_empty() {
        println!("\nPreview:");
        for dish in preview {
            let description: String = dish
                .description
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(60)
                .collect();
            println!("- {}: {}", dish.name, description);
        }
    }

    if let (Some(email), Some(password)) = (cli.admin_email, cli.admin_password) {
        match state.user_service.create_superuser(&email, &password).await {
            Ok(user) => println!("\nSuperuser created: {} ({})", user.email, user.id),
            Err(menu_server::Error::AlreadyExists(_)) => {
                println!("\nSuperuser {email} already exists, left unchanged")
            }
            Err(e) => return Err(e).context("Failed to create superuser"),
        }
    }

    state.db.close().await;
    Ok(())
}
