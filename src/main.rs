use cyberblog::configuration::get_configuration;
use cyberblog::startup::Application;
use cyberblog::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("cyberblog".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(configuration.clone()).await?;
    tracing::info!("Listening on port {}", application.port());
    application.run_until_stopped(configuration).await?;
    Ok(())
}
