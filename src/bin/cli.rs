//! RelOpt - CLI Client

use std::env;

use anyhow::{bail, Context};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use relopt::catalog::Catalog;
use relopt::optimizer::{OptimizerConfig, UnattributedPredicates};
use relopt::sql::ParserConfig;
use relopt::{CompiledQuery, PipelineConfig, QueryPipeline};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    catalog: Option<String>,
    drop_unattributed: bool,
    no_or: bool,
    infer_joins: bool,
    json: bool,
    execute: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut iter = args.iter().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--catalog" | "-c" => {
                    let path = iter.next().context("--catalog requires a file path")?;
                    options.catalog = Some(path.clone());
                }
                "--execute" | "-e" => {
                    let query = iter.next().context("--execute requires a query")?;
                    options.execute = Some(query.clone());
                }
                "--drop-unattributed" => options.drop_unattributed = true,
                "--no-or" => options.no_or = true,
                "--infer-joins" => options.infer_joins = true,
                "--json" => options.json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => bail!("unknown argument '{}' (try --help)", other),
            }
        }

        Ok(options)
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let policy = if self.drop_unattributed {
            UnattributedPredicates::Drop
        } else {
            UnattributedPredicates::Retain
        };

        PipelineConfig::new()
            .parser(
                ParserConfig::new()
                    .allow_or(!self.no_or)
                    .infer_join_conditions(self.infer_joins),
            )
            .optimizer(OptimizerConfig::new().unattributed_predicates(policy))
    }
}

/// Output toggles changed by dot commands
struct Session {
    json: bool,
    dot: bool,
}

fn print_usage() {
    println!(
        r#"Usage: relopt-cli [OPTIONS]

Options:
  -c, --catalog <FILE>    Load the schema catalog from a JSON file
  -e, --execute <QUERY>   Compile one query and exit
      --drop-unattributed Discard WHERE conditions that span several tables
      --no-or             Reject OR in WHERE clauses
      --infer-joins       Derive missing ON conditions from foreign keys
      --json              Print results as JSON
  -h, --help              Show this message

Set RUST_LOG=debug to trace each compilation stage."#
    );
}

fn print_banner() {
    println!(
        r#"
 RelOpt - SQL to relational algebra compiler
 Type '.help' for help, '.quit' to exit
"#
    );
}

fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit RelOpt
  .tables            List all tables
  .schema [table]    Show table schema
  .json              Toggle JSON output
  .dot               Toggle Graphviz output for the operator graph

Queries end with ';' or an empty line:
  SELECT col, ... FROM table [JOIN table ON cond ...] [WHERE cond]

Example:
  SELECT Produto.Nome, Categoria.Descricao FROM Produto
  JOIN Categoria ON Produto.Categoria_idCategoria = Categoria.idCategoria
  WHERE Produto.Preco > 100;
"#
    );
}

fn print_compiled(compiled: &CompiledQuery, session: &Session) -> anyhow::Result<()> {
    if session.json {
        println!("{}", serde_json::to_string_pretty(compiled)?);
    } else if session.dot {
        print!("{}", compiled.graph.to_dot());
    } else {
        print!("{}", compiled.report());
    }
    Ok(())
}

/// Compile one query and print the result or the error
fn execute_sql(sql: &str, pipeline: &QueryPipeline, session: &Session) -> anyhow::Result<bool> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Ok(true);
    }

    match pipeline.compile(sql) {
        Ok(compiled) => {
            print_compiled(&compiled, session)?;
            Ok(true)
        }
        Err(e) if session.json => {
            let error = serde_json::json!({
                "ok": false,
                "kind": e.kind().as_str(),
                "message": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&error)?);
            Ok(false)
        }
        Err(e) => {
            eprintln!("{}: {}", e.kind(), e);
            Ok(false)
        }
    }
}

/// Handle special dot commands; returns false on quit
fn handle_special_command(cmd: &str, catalog: &Catalog, session: &mut Session) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => return false,
        Some(".tables") => {
            let tables = catalog.list_tables();
            if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
        }
        Some(".schema") => {
            let names: Vec<&str> = match parts.get(1) {
                Some(name) => vec![*name],
                None => catalog.list_tables(),
            };
            for name in names {
                match catalog.get_table_info(name) {
                    Ok(info) => println!("{}", info),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Some(".json") => {
            session.json = !session.json;
            println!("JSON output {}", if session.json { "on" } else { "off" });
        }
        Some(".dot") => {
            session.dot = !session.dot;
            println!("Graphviz output {}", if session.dot { "on" } else { "off" });
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Main REPL loop
fn run_repl(pipeline: &QueryPipeline, catalog: &Catalog, mut session: Session) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
    print_banner();

    let mut input_buffer = String::new();

    loop {
        let prompt = if input_buffer.is_empty() {
            "relopt> "
        } else {
            "   ...> "
        };

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                input_buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        let trimmed = line.trim();

        if input_buffer.is_empty() && trimmed.starts_with('.') {
            let _ = editor.add_history_entry(trimmed);
            if !handle_special_command(trimmed, catalog, &mut session) {
                break;
            }
            continue;
        }

        // Empty line runs whatever has been typed so far
        if trimmed.is_empty() {
            if !input_buffer.is_empty() {
                let sql = std::mem::take(&mut input_buffer);
                let _ = editor.add_history_entry(sql.trim());
                execute_sql(&sql, pipeline, &session)?;
            }
            continue;
        }

        input_buffer.push_str(&line);
        input_buffer.push('\n');

        if trimmed.ends_with(';') {
            let sql = std::mem::take(&mut input_buffer);
            let _ = editor.add_history_entry(sql.trim());
            execute_sql(&sql, pipeline, &session)?;
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = Options::parse(&args)?;

    let catalog = match &options.catalog {
        Some(path) => Catalog::load_from_disk(path)
            .with_context(|| format!("failed to load catalog from '{}'", path))?,
        None => Catalog::store_schema(),
    };

    let pipeline = QueryPipeline::with_config(&catalog, options.pipeline_config());
    let session = Session {
        json: options.json,
        dot: false,
    };

    match &options.execute {
        Some(sql) => {
            if !execute_sql(sql, &pipeline, &session)? {
                std::process::exit(1);
            }
            Ok(())
        }
        None => run_repl(&pipeline, &catalog, session),
    }
}
