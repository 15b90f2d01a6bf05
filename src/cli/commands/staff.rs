use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::database::models::user::NewUser;
use crate::database::repository::UserRepository;
use crate::middleware::PageQuery;
use crate::types::Role;

#[derive(Subcommand)]
pub enum StaffCommands {
    #[command(about = "Create a Staff, Manager or Admin account")]
    Create {
        #[arg(help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        full_name: String,
        #[arg(long, help = "Staff, Manager or Admin", default_value = "Staff")]
        role: Role,
        #[arg(long, help = "Initial password")]
        password: String,
    },

    #[command(about = "List staff, manager and admin accounts")]
    List,
}

pub async fn handle(cmd: StaffCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        StaffCommands::Create { email, full_name, role, password } => {
            create(pool, output_format, email, full_name, role, password).await
        }
        StaffCommands::List => list(pool, output_format).await,
    }
}

async fn create(
    pool: &PgPool,
    output_format: OutputFormat,
    email: String,
    full_name: String,
    role: Role,
    password: String,
) -> anyhow::Result<()> {
    if !role.is_staff() {
        anyhow::bail!("role must be Staff, Manager or Admin, got {}", role);
    }
    let password_hash = hash_password(&password)?;
    let user = UserRepository::new(pool.clone())
        .insert(NewUser {
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            phone_number: None,
            address: None,
            image_url: None,
            password_hash: Some(password_hash),
            role,
        })
        .await?;

    output_success(
        output_format,
        &format!("{} account {} created for {}", user.role, user.id, user.email),
        Some(json!({ "user": user })),
    )
}

async fn list(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserRepository::new(pool.clone());
    let page = PageQuery {
        page_number: Some(1),
        page_size: None,
    }
    .resolve_with(1000, 1000);

    let mut rows = Vec::new();
    for role in [Role::Admin, Role::Manager, Role::Staff] {
        let (accounts, _) = users.list(None, Some(role), page).await?;
        for user in accounts {
            rows.push(serde_json::to_value(&user)?);
        }
    }

    output_rows(output_format, "staff", &rows, |row| {
        format!(
            "{:<8} {:<36} {}{}",
            row["role"].as_str().unwrap_or_default(),
            row["id"].as_str().unwrap_or_default(),
            row["email"].as_str().unwrap_or_default(),
            if row["isLockedOut"].as_bool().unwrap_or(false) { " (locked)" } else { "" },
        )
    })
}
