//! Integration tests for end-to-end resolution.
//!
//! These tests drive [`App`] with an in-memory environment, config store,
//! prompter, and output sink, and check what the handlers observe.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Cursor, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use trellis::command::{Argument, Command, TreeError};
use trellis::core::config::{ConfigStore, TomlConfigStore};
use trellis::core::flags::{Flag, FlagError, FlagValue, Scope, Source};
use trellis::engine::{App, AppBuilder, ExecutionContext, Outcome, Resolution, RunError};
use trellis::ui::prompts::{LinePrompter, PromptError};

/// Shared in-memory writer, readable after the app took ownership.
#[derive(Clone, Default)]
struct Buffer(Rc<RefCell<Vec<u8>>>);

impl Buffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn config(pairs: &[(&str, &str)]) -> TomlConfigStore {
    let mut store = TomlConfigStore::new();
    for (k, v) in pairs {
        store.set(k, v);
    }
    store
}

fn builder(root: Command, out: &Buffer) -> AppBuilder {
    App::builder(root)
        .env(HashMap::<String, String>::new())
        .output(out.clone())
        .interactive(false)
}

fn ready(resolution: Resolution) -> ExecutionContext {
    match resolution {
        Resolution::Ready(ctx) => *ctx,
        other => panic!("expected a resolved context, got {other:?}"),
    }
}

fn deploy_tree() -> Command {
    Command::new("app")
        .flag(Flag::string("region").usage("root region"))
        .unwrap()
        .flag(Flag::bool("verbose").short('v'))
        .unwrap()
        .subcommand(
            Command::new("deploy")
                .alias("d")
                .alias("Ship")
                .flag(Flag::string("region").short('r'))
                .unwrap()
                .flag(Flag::bool("dry-run"))
                .unwrap()
                .flag(Flag::duration("timeout").default("30s"))
                .unwrap()
                .argument(Argument::new("target").required())
                .run(|_| Ok(())),
        )
}

mod prompting {
    use super::*;

    fn prompt_tree(validate: Option<Arc<AtomicUsize>>) -> Command {
        let mut arg = Argument::new("value").required().prompt("Enter value");
        if let Some(calls) = validate {
            arg = arg.validate(move |v| {
                calls.fetch_add(1, Ordering::SeqCst);
                if v == "bad" {
                    Err("bad value".to_string())
                } else {
                    Ok(())
                }
            });
        }
        Command::new("app").subcommand(Command::new("set").argument(arg).run(|ctx| {
            ctx.write_line(ctx.arg("value").unwrap_or_default())?;
            Ok(())
        }))
    }

    #[test]
    fn missing_argument_is_prompted() {
        let out = Buffer::default();
        let screen = Buffer::default();
        let prompter = LinePrompter::new(Cursor::new(b"custom\n".to_vec()), screen.clone());
        let mut app = builder(prompt_tree(None), &out)
            .prompter(prompter)
            .interactive(true)
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["set"]).unwrap());

        assert_eq!(screen.text(), "? Enter value: ");
        assert_eq!(ctx.arg("value"), Some("custom"));
        assert_eq!(ctx.args(), ["custom".to_string()]);
    }

    #[test]
    fn rejected_answer_is_asked_again() {
        let out = Buffer::default();
        let screen = Buffer::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let prompter = LinePrompter::new(Cursor::new(b"bad\nvalid\n".to_vec()), screen.clone());
        let mut app = builder(prompt_tree(Some(calls.clone())), &out)
            .prompter(prompter)
            .interactive(true)
            .build()
            .unwrap();

        app.run(["set"]).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            screen.text(),
            "? Enter value: ✗ bad value\n? Enter value: "
        );
        assert_eq!(out.text(), "valid\n");
    }

    #[test]
    fn supplied_argument_is_validated() {
        let out = Buffer::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = builder(prompt_tree(Some(calls)), &out).build().unwrap();

        let err = app.run(["set", "bad"]).unwrap_err();

        assert!(matches!(
            err,
            RunError::Flag(FlagError::Validation { ref name, .. }) if name == "value"
        ));
        assert!(out.text().is_empty());
    }

    #[test]
    fn closed_input_aborts_invocation() {
        let out = Buffer::default();
        let prompter = LinePrompter::new(Cursor::new(Vec::<u8>::new()), io::sink());
        let mut app = builder(prompt_tree(None), &out)
            .prompter(prompter)
            .interactive(true)
            .build()
            .unwrap();

        let err = app.run(["set"]).unwrap_err();

        assert!(matches!(err, RunError::Prompt(PromptError::Io(_))));
        assert!(out.text().is_empty());
    }

    #[test]
    fn non_interactive_names_missing_argument() {
        let out = Buffer::default();
        let prompter = LinePrompter::new(Cursor::new(b"never read\n".to_vec()), io::sink());
        let mut app = builder(prompt_tree(None), &out)
            .prompter(prompter)
            .interactive(false)
            .build()
            .unwrap();

        let err = app.run(["set"]).unwrap_err();

        assert!(matches!(
            err,
            RunError::Prompt(PromptError::NotInteractive(ref name)) if name == "value"
        ));
    }

    #[test]
    fn cancelled_prompt_is_aborted() {
        let out = Buffer::default();
        let prompter = LinePrompter::new(Cursor::new(b"x\n".to_vec()), io::sink());
        let mut app = builder(prompt_tree(None), &out)
            .prompter(prompter)
            .interactive(true)
            .build()
            .unwrap();
        app.cancellation().cancel();

        let err = app.run(["set"]).unwrap_err();

        assert!(matches!(err, RunError::Prompt(PromptError::Aborted)));
    }

    #[test]
    fn backfill_stops_at_first_optional_argument() {
        // Documented quirk: "third" is required but follows an optional
        // argument, so it is never prompted for.
        let root = Command::new("app").subcommand(
            Command::new("copy")
                .argument(Argument::new("first").required())
                .argument(Argument::new("second").default("two"))
                .argument(Argument::new("third").required())
                .run(|_| Ok(())),
        );
        let out = Buffer::default();
        let prompter = LinePrompter::new(Cursor::new(b"one\nextra\n".to_vec()), io::sink());
        let mut app = builder(root, &out)
            .prompter(prompter)
            .interactive(true)
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["copy"]).unwrap());

        assert_eq!(ctx.args(), ["one".to_string()]);
        assert_eq!(ctx.arg("first"), Some("one"));
        assert_eq!(ctx.arg("second"), Some("two"));
        assert_eq!(ctx.arg("third"), None);
    }
}

mod precedence {
    use super::*;

    #[test]
    fn env_beats_config_and_default() {
        let root = Command::new("app").subcommand(
            Command::new("show")
                .flag(Flag::string("color").default("red"))
                .unwrap()
                .run(|_| Ok(())),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out)
            .env_prefix("APP")
            .env(env(&[("APP_COLOR", "green")]))
            .config_store(config(&[("color", "blue")]))
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["show"]).unwrap());

        assert_eq!(ctx.flags().get_str("color"), Some("green"));
        assert_eq!(ctx.flags().source_of("color"), Some(Source::Env));
        let entry = ctx.flags().lookup("color").unwrap();
        assert_eq!(entry.origin.as_deref(), Some("APP_COLOR"));
    }

    #[test]
    fn explicit_env_var_beats_derived() {
        let root = Command::new("app")
            .flag(Flag::string("token").env("SERVICE_TOKEN"))
            .unwrap()
            .run(|_| Ok(()));
        let out = Buffer::default();
        let mut app = builder(root, &out)
            .env_prefix("APP")
            .env(env(&[("SERVICE_TOKEN", "explicit"), ("APP_TOKEN", "derived")]))
            .build()
            .unwrap();

        let ctx = ready(app.resolve(Vec::<String>::new()).unwrap());

        assert_eq!(ctx.flags().get_str("token"), Some("explicit"));
    }

    #[test]
    fn command_line_beats_everything() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out)
            .env(env(&[("REGION", "env")]))
            .config_store(config(&[("region", "config")]))
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["deploy", "prod", "-r", "cli"]).unwrap());

        assert_eq!(ctx.flags().get_str("region"), Some("cli"));
        assert!(ctx.flags().is_cli_set("region"));
        // The root's own registry still resolved from the environment.
        let root = ctx.flags().get(Scope::Root, "region").unwrap();
        assert_eq!(root.source, Source::Env);
    }

    #[test]
    fn root_flag_on_command_line_beats_command_env() {
        let root = Command::new("app")
            .flag(Flag::string("level"))
            .unwrap()
            .subcommand(
                Command::new("run")
                    .flag(Flag::string("mode"))
                    .unwrap()
                    .run(|_| Ok(())),
            );
        let out = Buffer::default();
        let mut app = builder(root, &out)
            .env(env(&[("MODE", "env")]))
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["run", "--level", "high"]).unwrap());

        assert_eq!(ctx.flags().get_str("level"), Some("high"));
        assert_eq!(ctx.flags().get(Scope::Root, "level").unwrap().source, Source::CommandLine);
        assert_eq!(ctx.flags().get_str("mode"), Some("env"));
    }

    #[test]
    fn command_scope_wins_a_tie() {
        let root = Command::new("app")
            .flag(Flag::string("region").default("root-default"))
            .unwrap()
            .subcommand(
                Command::new("deploy")
                    .flag(Flag::string("region").default("command-default"))
                    .unwrap()
                    .run(|_| Ok(())),
            );
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        let ctx = ready(app.resolve(["deploy"]).unwrap());

        assert_eq!(ctx.flags().get_str("region"), Some("command-default"));
        assert_eq!(ctx.flags().source_of("region"), Some(Source::Default));
    }

    #[test]
    fn config_file_is_loaded_before_resolution() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "region = \"eu-west-1\"\nformat = \"json\"\n").unwrap();

        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out)
            .config_path(&path)
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["deploy", "prod"]).unwrap());

        assert_eq!(ctx.flags().get_str("region"), Some("eu-west-1"));
        assert_eq!(ctx.flags().source_of("region"), Some(Source::Config));
        assert_eq!(ctx.format(), trellis::ui::output::OutputFormat::Json);
        assert_eq!(ctx.config_path(), Some(path.as_path()));
    }

    #[test]
    fn unreadable_config_fails_the_run() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out)
            .config_path(&path)
            .build()
            .unwrap();

        let err = app.run(["deploy", "prod"]).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn bad_env_value_is_reported_with_its_source() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out)
            .env(env(&[("TIMEOUT", "soon")]))
            .build()
            .unwrap();

        let err = app.run(["deploy", "prod"]).unwrap_err();

        match err {
            RunError::Flag(FlagError::InvalidValue { name, origin, .. }) => {
                assert_eq!(name, "timeout");
                assert_eq!(origin, Source::Env);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_env_var_does_not_shadow_default() {
        let root = Command::new("app").run(|ctx| {
            ctx.write_line(ctx.format())?;
            Ok(())
        });
        let out = Buffer::default();
        let mut app = builder(root, &out)
            .env_prefix("APP")
            .env(env(&[("APP_FORMAT", "")]))
            .build()
            .unwrap();

        assert_eq!(app.run(Vec::<String>::new()).unwrap(), Outcome::Executed);
        assert_eq!(out.text(), "text\n");
    }

    #[test]
    fn required_flag_must_come_from_somewhere() {
        let root = Command::new("app")
            .flag(Flag::string("token").required())
            .unwrap()
            .run(|_| Ok(()));
        let out = Buffer::default();

        let mut missing = builder(root.clone(), &out).build().unwrap();
        let err = missing.run(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, RunError::Flag(FlagError::MissingRequired(ref n)) if n == "token"));

        let mut from_env = builder(root, &out)
            .env(env(&[("TOKEN", "abc")]))
            .build()
            .unwrap();
        assert_eq!(from_env.run(Vec::<String>::new()).unwrap(), Outcome::Executed);
    }

    #[test]
    fn report_lists_every_resolved_flag() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out)
            .env(env(&[("VERBOSE", "1")]))
            .build()
            .unwrap();

        let ctx = ready(app.resolve(["deploy", "prod", "--dry-run"]).unwrap());
        let report = ctx.flags().report();

        let names: Vec<(Scope, &str)> = report.iter().map(|r| (r.scope, r.name.as_str())).collect();
        assert_eq!(
            names,
            [
                (Scope::Command, "dry-run"),
                (Scope::Command, "timeout"),
                (Scope::Root, "format"),
                (Scope::Root, "verbose"),
            ]
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[1]["value"], "30s");
        assert_eq!(json[3]["source"], "env");
        assert_eq!(json[3]["origin"], "VERBOSE");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn alias_resolves_like_canonical_name() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let by_name = ready(app.resolve(["deploy", "prod", "-r", "eu"]).unwrap());
        let by_alias = ready(app.resolve(["SHIP", "prod", "-r", "eu"]).unwrap());

        assert_eq!(by_name.path(), by_alias.path());
        assert_eq!(by_name.args(), by_alias.args());
        assert_eq!(by_name.flags().report(), by_alias.flags().report());
    }

    #[test]
    fn leading_binary_name_is_ignored() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let ctx = ready(app.resolve(["app", "d", "prod"]).unwrap());

        assert_eq!(ctx.path(), "app.deploy");
    }

    #[test]
    fn double_dash_keeps_flag_like_arguments() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let ctx = ready(app.resolve(["deploy", "-v", "--", "--weird"]).unwrap());

        assert_eq!(ctx.arg("target"), Some("--weird"));
        assert!(ctx.flags().get_bool("verbose"));
    }

    #[test]
    fn boolean_literal_false_still_binds_true() {
        // Documented quirk: a boolean bound on the command line is true
        // whatever literal follows `=`, as long as it parses as a bool.
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let ctx = ready(app.resolve(["deploy", "prod", "--dry-run=false"]).unwrap());
        assert!(ctx.flags().get_bool("dry-run"));

        let err = app.resolve(["deploy", "prod", "--dry-run=maybe"]).unwrap_err();
        assert!(matches!(err, RunError::Flag(FlagError::InvalidValue { .. })));
    }

    #[test]
    fn typed_values_reach_the_handler() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let ctx = ready(app.resolve(["deploy", "prod", "--timeout", "1m30s"]).unwrap());

        assert_eq!(
            ctx.flags().get_duration("timeout"),
            Some(std::time::Duration::from_secs(90))
        );
        assert_eq!(
            ctx.flags().value("timeout"),
            Some(&FlagValue::Duration(std::time::Duration::from_secs(90)))
        );
    }

    #[test]
    fn strict_command_rejects_unknown_flags() {
        let called = Arc::new(AtomicUsize::new(0));
        let seen = called.clone();
        let root = Command::new("app").subcommand(
            Command::new("build")
                .strict(true)
                .argument(Argument::new("target"))
                .run(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        let err = app.run(["build", "--fast"]).unwrap_err();

        assert!(matches!(err, RunError::Flag(FlagError::UnknownFlag(ref t)) if t == "--fast"));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lenient_command_treats_unknown_flags_as_arguments() {
        let root = Command::new("app").subcommand(
            Command::new("echo")
                .argument(Argument::new("word"))
                .run(|ctx| {
                    ctx.write_line(ctx.arg("word").unwrap_or_default())?;
                    Ok(())
                }),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        app.run(["echo", "--fast"]).unwrap();

        assert_eq!(out.text(), "--fast\n");
    }

    #[test]
    fn positional_flags_fill_before_arguments() {
        let root = Command::new("app").subcommand(
            Command::new("cp")
                .flag(Flag::string("src").positional())
                .unwrap()
                .flag(Flag::string("dst").positional())
                .unwrap()
                .argument(Argument::new("mode"))
                .run(|_| Ok(())),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        let ctx = ready(app.resolve(["cp", "--src", "a", "b", "fast"]).unwrap());

        assert_eq!(ctx.flags().get_str("src"), Some("a"));
        assert_eq!(ctx.flags().get_str("dst"), Some("b"));
        assert_eq!(ctx.arg("mode"), Some("fast"));
    }

    #[test]
    fn runs_are_independent() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let first = ready(app.resolve(["deploy", "prod", "-r", "eu", "--dry-run"]).unwrap());
        let second = ready(app.resolve(["deploy", "prod"]).unwrap());

        assert!(first.flags().get_bool("dry-run"));
        assert!(!second.flags().get_bool("dry-run"));
        assert_eq!(second.flags().get_str("region"), None);
    }
}

mod routing {
    use super::*;

    fn hooked(log: Arc<Mutex<Vec<&'static str>>>, fail_pre: bool) -> Command {
        let (pre, run, post) = (log.clone(), log.clone(), log);
        Command::new("app").subcommand(
            Command::new("job")
                .pre_run(move |_| {
                    pre.lock().unwrap().push("pre");
                    if fail_pre {
                        anyhow::bail!("not ready");
                    }
                    Ok(())
                })
                .run(move |_| {
                    run.lock().unwrap().push("run");
                    Ok(())
                })
                .post_run(move |_| {
                    post.lock().unwrap().push("post");
                    Ok(())
                }),
        )
    }

    #[test]
    fn hooks_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let out = Buffer::default();
        let mut app = builder(hooked(log.clone(), false), &out).build().unwrap();

        assert_eq!(app.run(["job"]).unwrap(), Outcome::Executed);
        assert_eq!(*log.lock().unwrap(), ["pre", "run", "post"]);
    }

    #[test]
    fn first_hook_error_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let out = Buffer::default();
        let mut app = builder(hooked(log.clone(), true), &out).build().unwrap();

        let err = app.run(["job"]).unwrap_err();

        assert_eq!(err.to_string(), "not ready");
        assert_eq!(*log.lock().unwrap(), ["pre"]);
    }

    #[test]
    fn help_flag_renders_matched_command() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        assert_eq!(app.run(["deploy", "--help"]).unwrap(), Outcome::Help);

        let text = out.text();
        assert!(text.starts_with("Usage: app deploy <target> [flags]"));
        assert!(text.contains("--dry-run"));
        assert!(text.contains("(default 30s)"));
    }

    #[test]
    fn help_skips_required_checks() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();
        assert_eq!(app.run(["deploy", "-h"]).unwrap(), Outcome::Help);
    }

    #[test]
    fn help_is_shown_despite_bad_environment_value() {
        let root = Command::new("app").subcommand(
            Command::new("go")
                .flag(Flag::int("times"))
                .unwrap()
                .run(|_| Ok(())),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out)
            .env_prefix("APP")
            .env(env(&[("APP_TIMES", "abc"), ("APP_FORMAT", "xml")]))
            .build()
            .unwrap();

        assert_eq!(app.run(["go", "--help"]).unwrap(), Outcome::Help);
        assert!(out.text().starts_with("Usage: app go [flags]"));

        let err = app.run(["go"]).unwrap_err();
        assert!(matches!(
            err,
            RunError::Flag(FlagError::Validation { .. } | FlagError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bare_group_renders_help() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        assert_eq!(app.run(Vec::<String>::new()).unwrap(), Outcome::Help);
        assert!(out.text().contains("Commands:\n  deploy"));
    }

    #[test]
    fn unknown_command_names_leftover_words() {
        let out = Buffer::default();
        let mut app = builder(deploy_tree(), &out).build().unwrap();

        let err = app.run(["destroy", "everything"]).unwrap_err();

        match &err {
            RunError::Tree(TreeError::UnknownCommand { command, parent }) => {
                assert_eq!(command, "destroy everything");
                assert_eq!(parent, "app");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn leaf_without_handler_is_an_error() {
        let root = Command::new("app").subcommand(Command::new("todo"));
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        let err = app.run(["todo"]).unwrap_err();

        assert!(matches!(err, RunError::Tree(TreeError::NoRunHandler(ref p)) if p == "app.todo"));
    }

    #[test]
    fn runnable_group_runs_itself_without_a_child() {
        let root = Command::new("app")
            .subcommand(Command::new("child").run(|ctx| {
                ctx.write_line("child")?;
                Ok(())
            }))
            .run(|ctx| {
                ctx.write_line("root")?;
                Ok(())
            });
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        app.run(Vec::<String>::new()).unwrap();
        app.run(["child"]).unwrap();
        let err = app.run(["other"]).unwrap_err();

        assert_eq!(out.text(), "root\nchild\n");
        assert!(matches!(err, RunError::Tree(TreeError::UnknownCommand { .. })));
    }

    #[test]
    fn handlers_share_the_config_store() {
        let root = Command::new("app").subcommand(
            Command::new("remember")
                .argument(Argument::new("value").required())
                .run(|ctx| {
                    let value = ctx.arg("value").unwrap_or_default().to_string();
                    ctx.config_mut().set("remembered", &value);
                    Ok(())
                }),
        );
        let out = Buffer::default();
        let mut app = builder(root, &out).build().unwrap();

        app.run(["remember", "42"]).unwrap();

        assert_eq!(app.config().get("remembered").as_deref(), Some("42"));
    }
}
