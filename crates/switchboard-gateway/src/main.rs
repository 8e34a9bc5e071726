//! The Switchboard gateway daemon.

use std::sync::Arc;

use anyhow::Context;
use rand::RngCore;
use serde_json::json;

use switchboard_gateway::config::Config;
use switchboard_gateway::{AppState, build_router, telemetry};
use switchboard_kernel::Kernel;
use switchboard_kernel::settings::{ALLOWED_ROOTS, SAFE_MODE, SHELL_ALLOWLIST};
use switchboard_storage::Store;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format);

    if config.session_secret.is_none() {
        tracing::warn!("SESSION_SECRET is not set; using process-local sessions only");
    }

    std::fs::create_dir_all(&config.sandbox_path)
        .with_context(|| format!("failed to create sandbox at {}", config.sandbox_path.display()))?;
    let sandbox = config
        .sandbox_path
        .canonicalize()
        .with_context(|| "failed to resolve sandbox path")?;

    let store = Arc::new(
        Store::open(&config.database_path)
            .with_context(|| format!("failed to open store at {}", config.database_path.display()))?,
    );
    let kernel = Arc::new(Kernel::new(store));

    seed_settings(&kernel, &sandbox).await?;
    seed_admin(&kernel, &config).await?;

    let state = AppState::new(Arc::clone(&kernel));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(
        port = config.port,
        sandbox = %sandbox.display(),
        "switchboard gateway listening"
    );
    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}

/// First-start defaults: sandbox as the only allowed root, empty shell
/// allowlist, safe mode off. Existing values are left alone.
async fn seed_settings(kernel: &Kernel, sandbox: &std::path::Path) -> anyhow::Result<()> {
    let store = kernel.store();
    if store.get_setting(ALLOWED_ROOTS).await?.is_none() {
        store
            .set_setting(ALLOWED_ROOTS, &json!([sandbox.display().to_string()]))
            .await?;
    }
    if store.get_setting(SHELL_ALLOWLIST).await?.is_none() {
        store.set_setting(SHELL_ALLOWLIST, &json!([])).await?;
    }
    if store.get_setting(SAFE_MODE).await?.is_none() {
        store.set_setting(SAFE_MODE, &json!(false)).await?;
    }
    Ok(())
}

/// Ensure an admin account exists. When no password is configured and the
/// account has to be created, generate one and log it once.
async fn seed_admin(kernel: &Kernel, config: &Config) -> anyhow::Result<()> {
    let already_present = kernel
        .store()
        .find_user_by_username(&config.admin_username)
        .await?
        .is_some();
    if already_present {
        return Ok(());
    }

    let (password, generated) = match &config.admin_password {
        Some(password) => (password.clone(), false),
        None => {
            let mut bytes = [0u8; 16];
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            (hex::encode(bytes), true)
        }
    };
    kernel
        .ensure_admin(&config.admin_username, &password)
        .await
        .map_err(|e| anyhow::anyhow!("failed to seed admin: {e}"))?;
    if generated {
        tracing::warn!(
            username = %config.admin_username,
            password = %password,
            "created admin with a generated password; set ADMIN_PASSWORD to control it"
        );
    }
    Ok(())
}
