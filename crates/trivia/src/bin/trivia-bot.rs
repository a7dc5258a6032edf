use trivia::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()?;
    let bot = TriviaBot::builder().config(&config).build().await?;
    tracing::info!(
        addr = %bot.local_addr()?,
        channel = %config.channel,
        difficulty = %config.difficulty,
        "trivia bot listening"
    );

    bot.run().await?;
    Ok(())
}
