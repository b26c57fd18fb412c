//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use agrorent_gateway::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Configuração ausente é erro do operador: loga e sai com código != 0
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("🔥 Configuração inválida: {}", e);
            std::process::exit(1);
        }
    };
    let bind_addr = config.bind_addr.clone();

    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Libera os stores de clientes que pararam de fazer requisições
    let sweeper = app_state.registry.spawn_sweeper(app_state.config.client_idle);

    let app = agrorent_gateway::router(app_state.clone());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: encerra as assinaturas dos stores de sessão
    sweeper.abort();
    app_state.registry.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao instalar o handler de Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Sinal de desligamento recebido");
}
