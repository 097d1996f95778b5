use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mobileforms_form::{
  Bootstrap, Envelope, Event, FormConfig, FormDelegate, FormSession, FormState, HostView, Rect,
  Renderer,
};
use mobileforms_schema::{FieldValues, parse};

/// Mobileforms - schema-driven forms for embedding hosts
#[derive(Parser)]
#[command(name = "mobileforms")]
#[command(version, about, long_about = None)]
struct Cli {
  /// JSON file with session settings (forms_dir, validation_policy)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Directory named schemas and assets are read from (overrides the config file)
  #[arg(long, global = true)]
  forms_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Parse a schema and print its normalized form
  Check {
    /// Path to the schema file
    schema: PathBuf,
  },

  /// Validate values read from stdin against a schema
  Validate {
    /// Path to the schema file
    schema: PathBuf,
  },

  /// Run a headless session, feeding it recorded renderer messages
  Replay {
    /// Path to the schema file
    schema: PathBuf,

    /// File with one renderer message (URL or JSON) per line
    events: PathBuf,

    /// Values to pre-populate the form with
    #[arg(long)]
    data: Option<PathBuf>,

    /// Load the form read-only
    #[arg(long)]
    read_only: bool,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mobileforms=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let cli = Cli::parse();
  let config = load_config(cli.config.as_ref(), cli.forms_dir)?;

  match cli.command {
    Some(Commands::Check { schema }) => check(schema),
    Some(Commands::Validate { schema }) => validate(schema),
    Some(Commands::Replay {
      schema,
      events,
      data,
      read_only,
    }) => replay(config, schema, events, data, read_only),
    None => {
      println!("mobileforms - use --help to see available commands");
      Ok(())
    }
  }
}

fn load_config(path: Option<&PathBuf>, forms_dir: Option<PathBuf>) -> Result<FormConfig> {
  let mut config = match path {
    Some(path) => {
      let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
      FormConfig::from_json(&text)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?
    }
    None => FormConfig::default(),
  };
  if let Some(forms_dir) = forms_dir {
    config.forms_dir = forms_dir;
  }
  tracing::debug!(
    forms_dir = %config.forms_dir.display(),
    policy = ?config.validation_policy,
    "config loaded"
  );
  Ok(config)
}

fn read_schema(path: &PathBuf) -> Result<String> {
  std::fs::read_to_string(path)
    .with_context(|| format!("failed to read schema file: {}", path.display()))
}

fn check(schema: PathBuf) -> Result<()> {
  let definition = parse(&read_schema(&schema)?)
    .with_context(|| format!("invalid schema: {}", schema.display()))?;

  eprintln!("Schema OK: {} fields", definition.fields().len());
  println!("{}", serde_json::to_string_pretty(&definition)?);
  Ok(())
}

fn validate(schema: PathBuf) -> Result<()> {
  let definition = parse(&read_schema(&schema)?)
    .with_context(|| format!("invalid schema: {}", schema.display()))?;

  let values = read_values_from_stdin()?.restrict_to(&definition);
  let result = mobileforms_validation::evaluate(&definition, &values);

  eprintln!("Valid: {}", result.is_valid());
  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(())
}

fn replay(
  config: FormConfig,
  schema: PathBuf,
  events: PathBuf,
  data: Option<PathBuf>,
  read_only: bool,
) -> Result<()> {
  let view = HostView::new("replay", Rect::new(0.0, 0.0, 360.0, 640.0));
  let mut form = FormSession::initialize(view, ConsoleRenderer, config)
    .context("failed to initialize form")?
    .with_delegate(ConsoleDelegate);

  form
    .set_schema(&read_schema(&schema)?)
    .with_context(|| format!("invalid schema: {}", schema.display()))?;

  if let Some(data) = data {
    let text = std::fs::read_to_string(&data)
      .with_context(|| format!("failed to read data file: {}", data.display()))?;
    form.pre_populate(&text).context("failed to pre-populate form")?;
  }
  form.set_read_only(read_only);
  form.load().context("failed to load form")?;

  let messages = std::fs::read_to_string(&events)
    .with_context(|| format!("failed to read events file: {}", events.display()))?;
  let link = form.link();
  for line in messages.lines().map(str::trim) {
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    if !link.post(line) {
      bail!("form session closed while replaying");
    }
  }
  let handled = form.pump();
  eprintln!("Replayed {} messages", handled);

  let summary = json!({
    "values": form.values()?,
    "errors": form.errors()?,
  });
  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}

/// Prints every renderer call as a JSON line on stdout.
struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
  fn bootstrap(&self, bootstrap: &Bootstrap) {
    println!("{}", json!({"renderer": "bootstrap", "payload": bootstrap}));
  }

  fn deliver(&self, envelope: &Envelope) {
    println!("{}", json!({"renderer": "command", "payload": envelope}));
  }

  fn set_frame(&self, frame: Rect) {
    println!("{}", json!({"renderer": "frame", "payload": frame}));
  }
}

/// Prints host notifications as JSON lines on stdout.
struct ConsoleDelegate;

impl FormDelegate for ConsoleDelegate {
  fn on_submit_result(&self, result: &str) {
    let result: serde_json::Value = serde_json::from_str(result).unwrap_or(json!(result));
    println!("{}", json!({"host": "submit_result", "payload": result}));
  }

  fn on_event(&self, event: &Event, _state: &FormState) {
    println!("{}", json!({"host": "event", "payload": event}));
  }
}

fn read_values_from_stdin() -> Result<FieldValues> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, validate an empty form
    return Ok(FieldValues::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read values from stdin")?;

  if input.trim().is_empty() {
    Ok(FieldValues::new())
  } else {
    FieldValues::from_json(&input).context("failed to parse values JSON from stdin")
  }
}
