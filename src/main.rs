// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use pipeweave::coercion::DataType;
use pipeweave::config::{load_and_validate_config, Config, Runtime, RuntimeBuilder};
use pipeweave::engine::RunControl;
use pipeweave::observability::init_tracing;
use pipeweave::process::{PortRef, Process};
use pipeweave::traits::FnBody;
use pipeweave::validation::{Action, ValidationCheck};

const TEXT_NAMESPACE: &str = "text";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let (config, left, right) = match args.as_slice() {
        [_, left, right] => (Config::default(), left, right),
        [_, path, left, right] => (
            load_and_validate_config(path).with_context(|| format!("loading {}", path))?,
            left,
            right,
        ),
        _ => {
            let program = args.first().map(String::as_str).unwrap_or("pipeweave");
            eprintln!("Usage: {} [config.yaml] <left> <right>", program);
            eprintln!("Example: {} configs/runtime.yaml \"hello \" \"world\"", program);
            bail!("expected two input strings");
        }
    };

    let runtime = RuntimeBuilder::from_config(&config).build()?;
    register_text_processes(&runtime)?;

    let namespace = runtime.manager().factory(TEXT_NAMESPACE);
    let concat = namespace.get("concat").context("concat not registered")?;

    let pipeline = runtime
        .pipeline("concat_then_shout")
        .processes_from(&namespace)
        .link(("concat", "sum"), ("shout", "text"))
        .link(("shout", "text"), ("measure", "text"))
        .check(
            ValidationCheck::new()
                .bind(concat)
                .ports([("concat", "sum")])
                .predicate(|args: &[Value]| json!(args[0].as_str().is_some_and(|s| !s.is_empty())))
                .on_fail(Action::Stop, "concatenation produced an empty string"),
        )
        .build()?;

    println!("🚀 pipeweave demo");
    println!("═════════════════");
    println!("Inputs: \"{}\" + \"{}\"", left, right);
    for (index, wave) in pipeline.schedule().waves().iter().enumerate() {
        println!("  wave {}: {}", index, wave.join(", "));
    }

    let inputs = HashMap::from([
        (PortRef::new("concat", "a"), json!(left)),
        (PortRef::new("concat", "b"), json!(right)),
    ]);
    let monitor = pipeline.progress_monitor();
    let started = Instant::now();
    let summary = pipeline
        .execute_with(inputs, RunControl::new().progress(monitor.clone()))
        .await?;

    println!();
    println!(
        "✅ {} succeeded, {} failed in {} waves ({:.0}% done, {:?})",
        summary.succeeded,
        summary.failed,
        summary.waves_run,
        monitor.progress(),
        started.elapsed()
    );
    for (port, value) in pipeline.results() {
        println!("  {} = {}", port, value);
    }

    Ok(())
}

fn register_text_processes(runtime: &Runtime) -> anyhow::Result<()> {
    let namespace = runtime.manager().factory(TEXT_NAMESPACE);
    if namespace.is_locked() {
        bail!("namespace '{}' is locked", TEXT_NAMESPACE);
    }

    let concat = runtime
        .process_builder("concat")
        .title("Concatenate")
        .input("a", DataType::string())
        .input("b", DataType::string())
        .output("sum", DataType::string())
        .body(FnBody::new(2, |args| {
            let a = args[0].as_str().unwrap_or_default();
            let b = args[1].as_str().unwrap_or_default();
            Ok(json!({ "sum": format!("{a}{b}") }))
        }))
        .build()?;

    let shout = runtime
        .process_builder("shout")
        .title("Uppercase")
        .input("text", DataType::string())
        .output("text", DataType::string())
        .body(FnBody::new(1, |args| {
            Ok(json!({ "text": args[0].as_str().unwrap_or_default().to_uppercase() }))
        }))
        .build()?;

    let measure = runtime
        .process_builder("measure")
        .title("Character count")
        .input("text", DataType::string())
        .output("chars", DataType::integer())
        .body(FnBody::new(1, |args| {
            Ok(json!({ "chars": args[0].as_str().map(|s| s.chars().count()).unwrap_or_default() }))
        }))
        .build()?;

    for process in [concat, shout, measure] {
        namespace.register(Arc::new(process));
    }
    Ok(())
}
