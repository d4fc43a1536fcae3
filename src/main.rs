use clap::{Arg, Command};
use tracing::info;

use nlsh::backend::resolve_backend;
use nlsh::config::Config;
use nlsh::context::ContextDocs;
use nlsh::environment::EnvSnapshot;
use nlsh::pipeline::{generate_command, normalize_query};
use nlsh::prompt::PromptContext;
use nlsh::status::status_report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("nlsh")
        .about("Natural language shell - turns plain English into a command")
        .long_about(
            "nlsh sends your request, plus facts about this machine, to an LLM \
             backend and prints the single command it suggests. Nothing is executed.",
        )
        .arg(
            Arg::new("query")
                .help("The request to translate, or 'status' for a status report")
                .num_args(1..),
        )
        .get_matches();

    let args: Vec<String> = matches
        .get_many::<String>("query")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Config error: {err}");
            std::process::exit(1);
        }
    };

    if args.is_empty() || args[0] == "status" {
        show_status(&config)?;
        return Ok(());
    }

    let query = normalize_query(&args.join(" "));
    info!("Processing query: {query}");

    let snapshot = EnvSnapshot::probe();
    let cwd = std::env::current_dir()?;
    let docs = ContextDocs::load(&Config::config_dir()?, &cwd);

    let ctx = PromptContext {
        system_line: snapshot.system_line(),
        tools_line: snapshot.tools_line(),
        aliases: snapshot.aliases.clone(),
        cwd: cwd.display().to_string(),
        global_context: docs.global,
        local_context: docs.local,
        rules: config.rules.clone(),
    };

    let backend = resolve_backend(&config);
    match generate_command(&backend, &ctx, &query, &snapshot.missing).await {
        Ok(command) => {
            println!("{command}");
            Ok(())
        }
        Err(err) => {
            eprintln!("API Error: {err}");
            std::process::exit(1);
        }
    }
}

fn show_status(config: &Config) -> anyhow::Result<()> {
    let snapshot = EnvSnapshot::probe();
    let cwd = std::env::current_dir()?;
    let config_dir = Config::config_dir()?;
    let global_context = config_dir.join("context.md").exists();
    let local_context = cwd.join(".nlsh-context").exists();

    print!(
        "{}",
        status_report(config, &snapshot, global_context, local_context)
    );
    Ok(())
}
