use super::output;
use super::{Cli, Command};
use anyhow::{Context, Result, bail};
use crm_archive::demo::seed_demo_archive;
use crm_archive::web::build_router;
use crm_archive::{
    AppConfig, ArchiveBackend, ArchiveFilter, ArchiveService, InMemoryArchiveBackend,
    RestArchiveBackend,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub async fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(token) = cli.token {
        config.backend_token = Some(token);
    }

    match cli.command {
        Command::Serve { bind } => {
            let service = rest_service(&config)?;
            serve(service, bind.unwrap_or(config.bind_addr)).await
        }
        Command::Demo { bind } => {
            let backend = InMemoryArchiveBackend::new();
            seed_demo_archive(&backend).await;
            let service = ArchiveService::from_backend(Arc::new(backend), config.archive.clone())
                .context("failed to initialize demo archive")?;
            serve(Arc::new(service), bind.unwrap_or(config.bind_addr)).await
        }
        Command::List {
            page,
            limit,
            search,
            entity_type,
            date,
        } => {
            let service = rest_service(&config)?;
            let Some(loaded) = service.fetch(page, limit).await else {
                bail!("another fetch is already in flight");
            };
            let mut filter = ArchiveFilter::new();
            if let Some(search) = search {
                filter = filter.search(search);
            }
            if let Some(entity_type) = entity_type {
                filter = filter.entity_type(entity_type);
            }
            if let Some(date) = date {
                filter = filter.date(date);
            }
            let records = service.filtered(&filter).await;
            output::print_page(&loaded, &records);
            Ok(())
        }
        Command::Restore { id } => {
            let service = rest_service(&config)?;
            let outcome = service.restore_by_id(&id).await;
            output::print_outcome("restore", &id, &outcome);
            exit_status(outcome.ok)
        }
        Command::Delete { id } => {
            let service = rest_service(&config)?;
            let outcome = service.permanent_delete_by_id(&id).await;
            output::print_outcome("permanent delete", &id, &outcome);
            exit_status(outcome.ok)
        }
        Command::Purge { yes } => {
            if !yes {
                bail!("purge permanently deletes every archived record; pass --yes to confirm");
            }
            let service = rest_service(&config)?;
            let report = service.permanent_delete_all().await;
            output::print_report(&report);
            exit_status(report.any_deleted() || !report.is_partial())
        }
    }
}

fn rest_service(config: &AppConfig) -> Result<Arc<ArchiveService>> {
    let mut backend =
        RestArchiveBackend::with_timeout(&config.backend_url, config.archive.mutation_timeout)
            .with_context(|| format!("invalid backend url {}", config.backend_url))?;
    if let Some(token) = config.backend_token.as_deref() {
        backend = backend.token(token);
    }
    let backend: Arc<dyn ArchiveBackend> = Arc::new(backend);
    let service = ArchiveService::from_backend(backend, config.archive.clone())
        .context("failed to initialize archive service")?;
    Ok(Arc::new(service))
}

async fn serve(service: Arc<ArchiveService>, bind_addr: SocketAddr) -> Result<()> {
    let app = build_router(service);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(bind_addr = %bind_addr, "archive API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn exit_status(ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        bail!("operation failed")
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
