mod common;

use serde_json::json;
use std::sync::Arc;

use common::{Call, FakeInteraction, data, option};
use discord_compat::{CommandError, Context, HandlerError, InjectParams, OptionType, SendOptions, command};

/// Adds two numbers together
///
/// Both numbers must be integers.
#[command]
async fn add(ctx: Arc<Context>, a: i64, b: i64) -> Result<(), HandlerError> {
    ctx.send((a + b).to_string(), SendOptions::new()).await?;
    Ok(())
}

#[command(name = "greet", brief = "Say hi")]
async fn greet_user(
    ctx: Arc<Context>,
    name: Option<String>,
    #[default(1)] times: i64,
) -> Result<(), CommandError> {
    let name = name.unwrap_or_else(|| "there".to_string());
    ctx.send(format!("hi {} x{}", name, times), SendOptions::new())
        .await
        .map_err(|e| CommandError::failed(e.to_string()))?;
    Ok(())
}

/// Pick a small number
#[command]
async fn pick_one(_ctx: Arc<Context>, #[hint("Range<1, 3>")] n: i64) -> Result<(), HandlerError> {
    if n == 2 {
        return Err(CommandError::failed("not two").into());
    }
    Ok(())
}

#[test]
fn builders_carry_names_docs_and_params() {
    let add = add().build().unwrap();
    assert_eq!(add.name(), "add");
    assert_eq!(add.help(), Some("Adds two numbers together\n\nBoth numbers must be integers."));
    assert_eq!(add.short_doc(), Some("Adds two numbers together"));
    let hints: Vec<_> = add.params().iter().map(|p| p.hint.as_deref()).collect();
    assert_eq!(hints, [Some("i64"), Some("i64")]);
    assert!(add.params().iter().all(|p| p.is_required()));

    let greet = greet_user().build().unwrap();
    assert_eq!(greet.name(), "greet");
    assert_eq!(greet.short_doc(), Some("Say hi"));
    assert_eq!(greet.params()[0].default, Some(serde_json::Value::Null));
    assert_eq!(greet.params()[1].default, Some(json!(1)));

    let pick = pick_one().build().unwrap();
    assert_eq!(pick.name(), "pick-one");
    assert_eq!(pick.params()[0].hint.as_deref(), Some("Range<1, 3>"));
}

#[tokio::test]
async fn generated_callbacks_run_on_both_surfaces() {
    let h = common::harness();
    let add = add()
        .describe("a", "First")
        .describe("b", "Second")
        .inject(InjectParams::new())
        .build()
        .unwrap();
    h.bot.add_command(add).unwrap();

    let interaction = FakeInteraction::new(None);
    h.bot
        .handle_interaction(
            interaction.clone(),
            &data("add", vec![option("a", 4, json!(40)), option("b", 4, json!(2))]),
        )
        .await
        .unwrap();
    assert_eq!(interaction.calls(), [Call::Respond(Some("42".into()))]);

    h.bot.process_commands(common::channel_message("!add 1 1")).await.unwrap();
    let sent = h.sink.sent.lock().unwrap().clone();
    assert_eq!(sent[0].1.content.as_deref(), Some("2"));
}

#[tokio::test]
async fn optional_parameters_and_command_errors() {
    let h = common::harness();
    let greet = greet_user()
        .describe("name", "Who to greet")
        .describe("times", "How often")
        .inject(InjectParams::new())
        .build()
        .unwrap();
    h.bot.add_command(greet.clone()).unwrap();

    let schema = greet.application_command().unwrap();
    assert_eq!(schema.description, "Say hi");
    assert!(schema.options.iter().all(|o| !o.required));

    let interaction = FakeInteraction::new(None);
    h.bot
        .handle_interaction(interaction.clone(), &data("greet", vec![]))
        .await
        .unwrap();
    assert_eq!(interaction.calls(), [Call::Respond(Some("hi there x1".into()))]);

    let pick = pick_one()
        .describe("n", "One to three")
        .inject(InjectParams::new())
        .build()
        .unwrap();
    h.bot.add_command(pick.clone()).unwrap();
    let n = &pick.application_command().unwrap().options[0];
    assert_eq!(n.kind, OptionType::Integer);
    assert_eq!(n.max_value, Some(3.0));

    h.bot.process_commands(common::channel_message("!pick-one 2")).await.unwrap();
    assert_eq!(h.host.errors(), [CommandError::failed("not two")]);
}
