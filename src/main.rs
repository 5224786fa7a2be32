use clap::Parser;
use fb_ads_mcp::app::{App, AppOptions};
use fb_ads_mcp::cli::Cli;
use fb_ads_mcp::constants::http::DEFAULT_PORT;
use fb_ads_mcp::errors::ToolError;
use fb_ads_mcp::mcp::http;

async fn run(cli: Cli) -> Result<(), ToolError> {
    let app = App::initialize(AppOptions {
        cli: cli.overrides(),
        ..AppOptions::default()
    })?;
    let server = app.mcp_server();

    let env_port = app.config.http_port()?;
    if cli.wants_http() || env_port.is_some() {
        let port = cli.port.or(env_port).unwrap_or(DEFAULT_PORT);
        app.session.prime_from_config().await;
        let router = http::router(server, app.session.clone(), app.logger.clone());
        return http::serve(router, port, &app.logger).await;
    }

    // stdio has a single client; without a token nothing can work.
    app.session.access_token().await?;
    server.run_stdio().await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        match &err.hint {
            Some(hint) => eprintln!("fb-ads-mcp: {} ({})", err, hint),
            None => eprintln!("fb-ads-mcp: {}", err),
        }
        std::process::exit(1);
    }
}
