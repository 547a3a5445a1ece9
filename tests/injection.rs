mod common;

use serde_json::json;
use std::sync::Arc;

use discord_compat::{
    Args, Callback, CommandBuilder, CommandTree, Context, HandlerError, InjectParams, Injector,
    LegacyCommand, Namespace, OptionOverride, OptionType, Param, Scope, describe, inject,
    override_option,
};

fn noop() -> Callback {
    Callback::new(|_ctx: Arc<Context>, _args: Args| async { Ok::<(), HandlerError>(()) })
}

fn adder() -> CommandBuilder {
    LegacyCommand::builder("add")
        .help("Adds two numbers together\n\nLonger help that never reaches the description.")
        .param(Param::new("a").hint("i64"))
        .param(Param::new("b").hint("i64"))
        .describe("a", "First number")
        .describe("b", "Second number")
        .callback(noop())
}

#[test]
fn infers_required_integer_options() {
    let h = common::harness();
    let command = adder()
        .inject(InjectParams::new().guild(123456789))
        .build()
        .unwrap();
    h.bot.add_command(command.clone()).unwrap();

    let schema = command.application_command().unwrap();
    assert_eq!(schema.name, "add");
    assert_eq!(schema.description, "Adds two numbers together");
    assert_eq!(schema.scope, Scope::Guild(123456789));
    assert_ne!(schema.id, schema.name);

    let names: Vec<_> = schema.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    for option in &schema.options {
        assert_eq!(option.kind, OptionType::Integer);
        assert!(option.required);
    }
    assert_eq!(h.bot.tree().len(), 1);
}

#[test]
fn defaults_make_options_optional() {
    let h = common::harness();
    let command = LegacyCommand::builder("greet")
        .brief("Say hello")
        .param(Param::new("times").hint("u8").default(2))
        .param(Param::new("name").hint("Option<String>").default(serde_json::Value::Null))
        .callback(noop())
        .inject(InjectParams::new().option_defaults(describe("Anything goes")))
        .build()
        .unwrap();
    h.bot.add_command(command.clone()).unwrap();

    let schema = command.application_command().unwrap();
    let times = schema.option("times").unwrap();
    assert!(!times.required);
    assert_eq!(times.default, Some(json!(2)));
    assert_eq!(times.description, "Anything goes");
    assert_eq!(schema.option("name").unwrap().kind, OptionType::String);
}

#[test]
fn overrides_win_over_inference() {
    let command = adder()
        .override_option("a", OptionOverride::new().kind(OptionType::Number).name("first"))
        .unwrap()
        .override_option("b", OptionOverride::new().optional(true).default_value(0))
        .unwrap()
        .build()
        .unwrap();

    let schema = Injector::new().inject(&command, InjectParams::new()).unwrap();
    let first = schema.option("first").unwrap();
    assert_eq!(first.param, "a");
    assert_eq!(first.kind, OptionType::Number);
    assert!(first.required);

    let b = schema.option("b").unwrap();
    assert!(!b.required);
    assert_eq!(b.default, Some(json!(0)));
}

#[test]
fn conflicting_override_is_rejected() {
    let err = adder()
        .override_option("a", OptionOverride::new().required(true).optional(false))
        .err()
        .unwrap();
    assert_eq!(err.key, "conflicting_required_optional");
}

#[test]
fn missing_description_fails_at_injection() {
    let command = LegacyCommand::builder("quiet")
        .callback(noop())
        .build()
        .unwrap();
    let err = Injector::new()
        .inject(&command, InjectParams::new())
        .unwrap_err();
    assert_eq!(err.key, "missing_description");
    assert!(command.application_command().is_none());
}

#[test]
fn missing_option_description_fails_at_injection() {
    let command = LegacyCommand::builder("echo")
        .brief("Echo text")
        .param(Param::new("text").hint("String"))
        .callback(noop())
        .build()
        .unwrap();
    let err = Injector::new()
        .inject(&command, InjectParams::new())
        .unwrap_err();
    assert_eq!(err.key, "missing_option_description");
}

#[test]
fn bounds_on_strings_are_rejected() {
    let command = LegacyCommand::builder("echo")
        .brief("Echo text")
        .param(Param::new("text").hint("String"))
        .callback(noop())
        .build()
        .unwrap();
    override_option(&command, "text", describe("Text").min_value(1.0)).unwrap();
    let err = Injector::new()
        .inject(&command, InjectParams::new())
        .unwrap_err();
    assert_eq!(err.key, "bounds_on_non_numeric");
}

#[test]
fn description_is_cut_to_one_hundred_characters() {
    let long = "é".repeat(150);
    let command = LegacyCommand::builder("long")
        .brief(long)
        .callback(noop())
        .build()
        .unwrap();
    let schema = Injector::new().inject(&command, InjectParams::new()).unwrap();
    assert_eq!(schema.description.chars().count(), 100);
}

#[test]
fn excluded_parameters_get_no_option() {
    let command = adder().param(Param::new("verbose").hint("bool").default(false)).build().unwrap();
    let schema = Injector::new()
        .inject(&command, InjectParams::new().exclude("verbose"))
        .unwrap();
    assert_eq!(schema.options.len(), 2);
    assert!(schema.option("verbose").is_none());
}

#[test]
fn unsupported_hints_become_strings() {
    let command = LegacyCommand::builder("weird")
        .brief("Weird types")
        .param(Param::new("x").hint("HashMap<String, Vec<u8>>"))
        .describe("x", "Whatever")
        .callback(noop())
        .build()
        .unwrap();
    let schema = Injector::new().inject(&command, InjectParams::new()).unwrap();
    assert_eq!(schema.option("x").unwrap().kind, OptionType::String);
}

#[test]
fn namespaces_resolve_aliases_with_local_precedence() {
    let mut global = Namespace::new();
    global.alias("Dice", "Range<1, 6>");
    global.alias("Size", "i64");
    let injector = Injector::new().with_namespace(global);

    let command = LegacyCommand::builder("roll")
        .brief("Roll")
        .param(Param::new("die").hint("Dice"))
        .param(Param::new("size").hint("Size"))
        .alias("Size", "f64")
        .describe("die", "Die")
        .describe("size", "Size")
        .callback(noop())
        .build()
        .unwrap();
    let schema = injector.inject(&command, InjectParams::new()).unwrap();

    let die = schema.option("die").unwrap();
    assert_eq!(die.kind, OptionType::Integer);
    assert_eq!((die.min_value, die.max_value), (Some(1.0), Some(6.0)));
    assert_eq!(die.payload()["max_value"], json!(6));
    assert_eq!(schema.option("size").unwrap().kind, OptionType::Number);
}

#[test]
fn second_injection_is_rejected() {
    let command = adder().build().unwrap();
    let injector = Injector::new();
    injector.inject(&command, InjectParams::new()).unwrap();
    let err = injector.inject(&command, InjectParams::new()).unwrap_err();
    assert_eq!(err.key, "already_injected");
    assert_eq!(injector.tree().len(), 1);
}

#[test]
fn inject_waits_for_a_bot() {
    let h = common::harness();
    let command = adder().build().unwrap();

    assert!(inject(&command, InjectParams::new()).unwrap().is_none());
    assert!(command.has_pending_injection());

    h.bot.add_command(command.clone()).unwrap();
    assert!(!command.has_pending_injection());
    assert!(command.application_command().is_some());
}

#[test]
fn inject_runs_immediately_once_added() {
    let h = common::harness();
    let command = adder().build().unwrap();
    h.bot.add_command(command.clone()).unwrap();
    assert!(command.application_command().is_none());

    let schema = inject(&command, InjectParams::new().name("plus")).unwrap().unwrap();
    assert_eq!(schema.name, "plus");
    assert!(h.bot.tree().get(&schema.id).is_some());
}

#[test]
fn bound_injection_uses_its_own_tree() {
    let h = common::harness();
    let tree = Arc::new(CommandTree::new("custom"));
    let injector = Injector::with_tree(tree.clone());

    let command = adder()
        .inject_with(&injector, InjectParams::new())
        .build()
        .unwrap();
    h.bot.add_command(command).unwrap();

    assert_eq!(tree.len(), 1);
    assert!(h.bot.tree().is_empty());
}

#[test]
fn children_nest_under_injected_parents() {
    let h = common::harness();
    let math = LegacyCommand::builder("math")
        .help("Math helpers")
        .callback(noop())
        .inject(InjectParams::new().guild(5))
        .build()
        .unwrap();
    h.bot.add_command(math.clone()).unwrap();

    let add = adder().parent(&math).inject(InjectParams::new()).build().unwrap();
    h.bot.add_command(add.clone()).unwrap();

    let parent = math.application_command().unwrap();
    let child = add.application_command().unwrap();
    assert_eq!(add.qualified_name(), "math add");
    assert_eq!(child.parent.as_deref(), Some(parent.id.as_str()));
    assert_eq!(child.scope, Scope::Guild(5));

    let payloads = h.bot.tree().payloads(Scope::Guild(5));
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["name"], "math");
    let sub = &payloads[0]["options"][0];
    assert_eq!(sub["type"], 1);
    assert_eq!(sub["name"], "add");
    assert_eq!(sub["options"].as_array().unwrap().len(), 2);
    assert_eq!(h.bot.tree().scopes(), [Scope::Guild(5)]);
}

#[test]
fn duplicate_names_are_rejected() {
    let h = common::harness();
    h.bot.add_command(adder().build().unwrap()).unwrap();
    let err = h.bot.add_command(adder().build().unwrap()).unwrap_err();
    assert_eq!(err.key, "command_registered");

    let tree = CommandTree::new("t");
    let injector = Injector::with_tree(Arc::new(tree));
    injector.inject(&adder().build().unwrap(), InjectParams::new()).unwrap();
    let err = injector
        .inject(&adder().build().unwrap(), InjectParams::new())
        .unwrap_err();
    assert_eq!(err.key, "duplicate_command");
}

#[test]
fn children_cannot_leave_their_parent_scope() {
    let h = common::harness();
    let math = LegacyCommand::builder("math")
        .help("Math helpers")
        .callback(noop())
        .inject(InjectParams::new())
        .build()
        .unwrap();
    h.bot.add_command(math.clone()).unwrap();

    let add = adder().parent(&math).inject(InjectParams::new().guild(5)).build().unwrap();
    let err = h.bot.add_command(add.clone()).unwrap_err();

    assert_eq!(err.key, "scope_mismatch");
    assert!(add.application_command().is_none());
    assert_eq!(h.bot.tree().len(), 1);
    let payloads = h.bot.tree().payloads(Scope::Global);
    assert!(payloads[0].get("options").map_or(true, |o| o.as_array().unwrap().is_empty()));
}

#[test]
fn builder_descriptions_use_the_override_path() {
    let command = LegacyCommand::builder("scale")
        .brief("Scale")
        .param(Param::new("factor").hint("f64"))
        .override_option("factor", OptionOverride::new().description("old").min_value(1.0))
        .unwrap()
        .describe("factor", "Scale factor")
        .callback(noop())
        .build()
        .unwrap();

    let stored = command.options().get("factor").unwrap();
    assert_eq!(stored.description.as_deref(), Some("Scale factor"));
    assert_eq!(stored.min_value, Some(1.0));

    let schema = Injector::new().inject(&command, InjectParams::new()).unwrap();
    let factor = schema.option("factor").unwrap();
    assert_eq!(factor.description, "Scale factor");
    assert_eq!(factor.kind, OptionType::Number);
}

#[test]
fn failed_injection_stays_pending_for_a_retry() {
    let h = common::harness();
    let command = LegacyCommand::builder("echo")
        .brief("Echo text")
        .param(Param::new("text").hint("String"))
        .callback(noop())
        .inject(InjectParams::new())
        .build()
        .unwrap();

    let err = h.bot.add_command(command.clone()).unwrap_err();
    assert_eq!(err.key, "missing_option_description");
    assert!(command.has_pending_injection());
    assert!(command.application_command().is_none());

    command.describe("text", "What to echo").unwrap();
    h.bot.add_command(command.clone()).unwrap();
    assert!(!command.has_pending_injection());
    assert_eq!(command.application_command().unwrap().options[0].description, "What to echo");
}
