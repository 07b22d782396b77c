use tutorbridge::server::build_router;
use tutorbridge::util::{env_bind_addr, init_tracing, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state = AppState::from_env();
    tracing::info!(backend = %state.backend_url, "tutoring backend configured");

    let addr = env_bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("tutorbridge listening on http://{}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
