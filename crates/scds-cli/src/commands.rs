use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use scds_sdk::{Document, Scds, ValidationResult};
use scds_server::ScdsServer;

use crate::cli::*;
use crate::config::Config;

pub fn run_command(command: Command, mut config: Config) -> anyhow::Result<()> {
    match command {
        Command::Put(args) => cmd_put(&config.open()?, args),
        Command::Get(args) => cmd_get(&config.open()?, args),
        Command::Keys => cmd_keys(&config.open()?),
        Command::Log(args) => cmd_log(&config.open()?, args),
        Command::Validate(args) => cmd_validate(&config.open()?, args),
        Command::Verify(args) => cmd_verify(&config.open()?, args),
        Command::Http(args) => {
            if let Some(host) = args.host {
                config.http.host = host;
            }
            if let Some(port) = args.port {
                config.http.port = port;
            }
            cmd_http(&config)
        }
        Command::Config => cmd_config(&config),
        Command::Subscribe(args) => cmd_subscribe(&config.open()?, args),
        Command::Unsubscribe(args) => cmd_unsubscribe(&config.open()?, args),
        Command::Subscribers => cmd_subscribers(&config.open()?),
    }
}

/// Decode a document from the argument, or from stdin when absent.
fn read_document(json: Option<&str>) -> anyhow::Result<Document> {
    match json {
        Some(text) => serde_json::from_str(text).context("decode document"),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read stdin")?;
            serde_json::from_str(&text).context("decode document from stdin")
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_put(scds: &Scds, args: DocumentArgs) -> anyhow::Result<()> {
    let value = read_document(args.json.as_deref())?;
    match scds.put(&args.key, value)? {
        Some(rev) => print_json(&rev),
        None => Ok(()),
    }
}

fn cmd_get(scds: &Scds, args: GetArgs) -> anyhow::Result<()> {
    let obj = match (args.version, args.time.as_deref()) {
        (Some(v), _) => scds.get_at_version(&args.key, v)?,
        (None, Some(t)) => scds.get_at_time_str(&args.key, t)?,
        (None, None) => scds.get(&args.key)?,
    };
    match obj {
        Some(obj) => print_json(&obj),
        None => Ok(()),
    }
}

fn cmd_keys(scds: &Scds) -> anyhow::Result<()> {
    for key in scds.keys()? {
        println!("{key}");
    }
    Ok(())
}

fn cmd_log(scds: &Scds, args: KeyArgs) -> anyhow::Result<()> {
    match scds.log(&args.key)? {
        Some(log) => print_json(&log),
        None => Ok(()),
    }
}

fn cmd_validate(scds: &Scds, args: DocumentArgs) -> anyhow::Result<()> {
    let value = read_document(args.json.as_deref())?;
    scds_types::validate_key(&args.key)?;
    let result = scds.validate(&args.key, &value);
    print_validation(&result);
    Ok(())
}

fn print_validation(result: &ValidationResult) {
    let matches = result.matches();
    if matches.is_empty() {
        println!("No schemas apply.");
        return;
    }
    println!("Schemas: {}", matches.join(", ").cyan());

    if result.is_valid() {
        println!("{} Document is valid", "✓".green().bold());
        return;
    }
    println!("{} Document is invalid", "✗".red().bold());
    for (schema, errors) in result.errors().iter() {
        println!("  {}", schema.bold());
        for e in errors {
            println!("    {}: {} ({})", e.field.yellow(), e.description, e.kind.dimmed());
        }
    }
}

fn cmd_verify(scds: &Scds, args: KeyArgs) -> anyhow::Result<()> {
    let report = scds.verify(&args.key)?;
    if report.is_valid() {
        println!(
            "{} {} history verified ({} revisions)",
            "✓".green().bold(),
            report.key.bold(),
            report.revision_count
        );
        return Ok(());
    }
    println!(
        "{} {} has {} violation(s)",
        "✗".red().bold(),
        report.key.bold(),
        report.violations.len()
    );
    for v in &report.violations {
        println!("  v{} {}", v.version.to_string().yellow(), v.description);
    }
    anyhow::bail!("history of {} is inconsistent", report.key)
}

fn cmd_http(config: &Config) -> anyhow::Result<()> {
    let scds = Arc::new(config.open()?);
    let server = ScdsServer::new(config.http.clone(), scds);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(config: &Config) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_subscribe(scds: &Scds, args: EmailArgs) -> anyhow::Result<()> {
    let created = scds.subscribe(&args.emails)?;
    match created.len() {
        1 => println!("{} Subscribed 1 new email", "✓".green()),
        n => println!("{} Subscribed {n} new emails", "✓".green()),
    }
    Ok(())
}

fn cmd_unsubscribe(scds: &Scds, args: EmailArgs) -> anyhow::Result<()> {
    match scds.unsubscribe(&args.emails)? {
        1 => println!("{} Unsubscribed 1 email", "✓".green()),
        n => println!("{} Unsubscribed {n} emails", "✓".green()),
    }
    Ok(())
}

fn cmd_subscribers(scds: &Scds) -> anyhow::Result<()> {
    let subscribers = scds.subscribers()?;
    if subscribers.is_empty() {
        println!("No subscribers.");
    }
    for sub in subscribers {
        println!("{}  {}", sub.id.to_string().dimmed(), sub.email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_document_is_decoded() {
        let doc = read_document(Some(r#"{"name": "Bob", "age": 42}"#)).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["age"], 42);
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(read_document(Some("[1, 2]")).is_err());
        assert!(read_document(Some("not json")).is_err());
    }

    #[test]
    fn commands_run_against_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data: dir.path().join("store.json"),
            ..Default::default()
        };

        let put = Command::Put(DocumentArgs {
            key: "bob".into(),
            json: Some(r#"{"name": "Bob"}"#.into()),
        });
        run_command(put, config.clone()).unwrap();

        let get = Command::Get(GetArgs {
            key: "bob".into(),
            version: Some(1),
            time: None,
        });
        run_command(get, config.clone()).unwrap();
        run_command(Command::Verify(KeyArgs { key: "bob".into() }), config.clone()).unwrap();

        let scds = config.open().unwrap();
        assert_eq!(scds.keys().unwrap(), vec!["bob"]);
    }

    #[test]
    fn invalid_key_fails_validate() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data: dir.path().join("store.json"),
            ..Default::default()
        };
        let validate = Command::Validate(DocumentArgs {
            key: "no spaces".into(),
            json: Some("{}".into()),
        });
        assert!(run_command(validate, config).is_err());
    }
}
