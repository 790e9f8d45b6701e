use anyhow::Context;
use clinic_accounts::{
    accounts::{AccountError, UserFields},
    config::SuperuserConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "clinic_accounts=debug,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    sqlx::migrate!("./migrations")
        .run(&app_state.db)
        .await
        .context("run migrations")?;
    tracing::info!("migrations applied");

    if let Some(superuser) = app_state.config.superuser.clone() {
        provision_superuser(&app_state, &superuser).await?;
    }

    Ok(())
}

async fn provision_superuser(state: &AppState, cfg: &SuperuserConfig) -> anyhow::Result<()> {
    let accounts = state.accounts();
    match accounts
        .create_superuser(&cfg.email, cfg.password.as_deref(), UserFields::default())
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, email = %user.email, "superuser provisioned");
            Ok(())
        }
        Err(AccountError::EmailTaken(email)) => {
            tracing::info!(email = %email, "superuser already present; skipping");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("provision superuser")),
    }
}
