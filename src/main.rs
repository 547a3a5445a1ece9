use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use discord_compat::discord::RestClient;
use discord_compat::{
    Callback, CompatBot, CompatConfig, Context, HandlerError, InjectParams, LegacyCommand, Result,
    Scope, SendOptions, TracingHost, command,
};

/// Adds two numbers together
#[command]
async fn add(ctx: Arc<Context>, a: i64, b: i64) -> std::result::Result<(), HandlerError> {
    ctx.send(format!("{} + {} = {}", a, b, a + b), SendOptions::new())
        .await?;
    Ok(())
}

/// Roll a die with the given number of sides
#[command]
async fn roll(ctx: Arc<Context>, #[hint("Range<2, 100>")] #[default(6)] sides: i64) -> std::result::Result<(), HandlerError> {
    let seed = uuid::Uuid::new_v4().as_u128();
    let value = (seed % sides as u128) as i64 + 1;
    ctx.reply(format!("rolled {} (d{})", value, sides), SendOptions::new())
        .await?;
    Ok(())
}

fn register(bot: &CompatBot, guild_id: Option<u64>) -> Result<()> {
    let scoped = |params: InjectParams| match guild_id {
        Some(id) => params.guild(id),
        None => params,
    };

    bot.add_command(
        add()
            .describe("a", "First number")
            .describe("b", "Second number")
            .inject(scoped(InjectParams::new()))
            .build()?,
    )?;

    bot.add_command(
        roll()
            .describe("sides", "How many sides the die has")
            .inject(scoped(InjectParams::new()))
            .build()?,
    )?;

    let math = LegacyCommand::builder("math")
        .help("Math helpers")
        .callback(Callback::new(|ctx: Arc<Context>, _args| async move {
            ctx.send("Try `math add`.", SendOptions::new()).await?;
            Ok::<(), HandlerError>(())
        }))
        .inject(scoped(InjectParams::new()))
        .build()?;
    bot.add_command(math.clone())?;

    bot.add_command(
        add()
            .parent(&math)
            .describe("a", "First number")
            .describe("b", "Second number")
            .inject(InjectParams::new())
            .build()?,
    )?;

    Ok(())
}

async fn run() -> Result<()> {
    let config = CompatConfig::from_env()?;
    let rest = Arc::new(RestClient::new(&config));
    let bot = CompatBot::new(Arc::new(TracingHost::default()), rest.clone());

    register(&bot, config.sync_guild_id)?;

    let application_id = match &config.application_id {
        Some(id) => id.clone(),
        None => rest.application_id().await?,
    };

    let scopes = match config.sync_guild_id {
        Some(guild_id) => vec![Scope::Guild(guild_id)],
        None => bot.tree().scopes(),
    };

    for scope in scopes {
        let payloads = bot.tree().payloads(scope);
        rest.sync_commands(&application_id, scope, &payloads).await?;
    }

    info!(commands = bot.tree().len(), "sync finished");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        e.log();
        std::process::exit(1);
    }
}
