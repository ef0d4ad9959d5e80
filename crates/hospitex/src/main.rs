//! Hospitex
//!
//! Command line client for the Hospitex hospital management backend.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hospitex_client::{
    ActionController, ActionOutcome, AuthClient, ClientConfig, FilterController, HttpClient,
    ListController, ResourceClient, ResourceKind, ResourceRecord, init_logging,
};
use hospitex_storage::UserRecord;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hospitex", version)]
#[command(about = "Hospital management command line client")]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        staff_name: String,
        #[arg(long, env = "HOSPITEX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new staff account.
    Signup {
        #[arg(long)]
        staff_name: String,
        #[arg(long, env = "HOSPITEX_PASSWORD", hide_env_values = true)]
        password: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Clear the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List a collection, optionally filtered.
    List {
        resource: ResourceKind,
        /// Case-insensitive text matched against name and email.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one record.
    Get { resource: ResourceKind, id: String },
    /// Create a record.
    Create {
        resource: ResourceKind,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update a record.
    Update {
        resource: ResourceKind,
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a record.
    Delete { resource: ResourceKind, id: String },
    /// Count the records in a collection.
    Total { resource: ResourceKind },
    /// List the patients assigned to the signed-in user.
    MyPatients,
    /// List the vitals readings of one patient.
    VitalsFor { patient_id: String },
}

/// Record fields given on the command line.
#[derive(Debug, clap::Args)]
struct FieldArgs {
    /// A field as `name=value`; values that parse as JSON are sent as JSON.
    #[arg(long = "field", value_name = "NAME=VALUE")]
    fields: Vec<String>,

    /// A JSON object merged under the `--field` values.
    #[arg(long)]
    json: Option<String>,
}

impl FieldArgs {
    fn into_record(self) -> anyhow::Result<ResourceRecord> {
        let mut record = match self.json {
            Some(raw) => {
                let value: Value = serde_json::from_str(&raw).context("--json is not valid JSON")?;
                ResourceRecord::try_from(value).context("--json must be a JSON object")?
            }
            None => ResourceRecord::new(),
        };
        for field in self.fields {
            let (name, raw) = field
                .split_once('=')
                .with_context(|| format!("field '{}' is not NAME=VALUE", field))?;
            let value =
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            record.insert(name.trim(), value);
        }
        Ok(record)
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_records(records: &[ResourceRecord]) -> anyhow::Result<()> {
    let values: Vec<Value> = records.iter().cloned().map(ResourceRecord::into_value).collect();
    print_json(&Value::Array(values))
}

fn print_user(user: &UserRecord) -> anyhow::Result<()> {
    print_json(&serde_json::to_value(user)?)
}

fn into_result<T>(outcome: ActionOutcome<T>) -> anyhow::Result<T> {
    if let ActionOutcome::Failed { message, cause } = &outcome {
        info!(error = %cause, "Action failed");
        anyhow::bail!("{}", message);
    }
    Ok(outcome.into_result()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config;
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let session = config.file_session_store();
    let http = HttpClient::new(&config, session)?;
    let auth = AuthClient::new(http.clone());
    let resource = |kind| ResourceClient::new(http.clone(), kind);

    match cli.command {
        Command::Login {
            staff_name,
            password,
        } => {
            auth.login(&staff_name, &password).await?;
            if let Some(user) = auth.current_user() {
                print_user(&user)?;
            }
        }
        Command::Signup {
            staff_name,
            password,
            fields,
        } => {
            let mut form = fields.into_record()?;
            form.insert("staff_name", staff_name);
            form.insert("password", password);
            print_json(&auth.signup(&form.into_value()).await?)?;
        }
        Command::Logout => {
            auth.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match auth.current_user() {
            Some(user) if auth.is_authenticated() => print_user(&user)?,
            _ => println!("Not signed in (role: {})", auth.user_role()),
        },
        Command::List {
            resource: kind,
            search,
            role,
            department,
            status,
        } => {
            let list = ListController::new(Arc::new(resource(kind)));
            list.fetch().await;
            if let Some(error) = list.state().error {
                anyhow::bail!("{}", error);
            }

            let filter =
                FilterController::new(list.subscribe()).with_debounce(config.search_debounce());
            filter.set_role(role.unwrap_or_default());
            filter.set_department(department.unwrap_or_default());
            filter.set_status(status.unwrap_or_default());
            if let Some(text) = search.filter(|s| !s.is_empty()) {
                let mut changes = filter.subscribe();
                filter.update_search(text);
                changes.changed().await?;
            }
            print_records(&filter.filtered_list())?;
        }
        Command::Get { resource: kind, id } => {
            print_json(&resource(kind).get_by_id(&id).await?.into_value())?;
        }
        Command::Create {
            resource: kind,
            fields,
        } => {
            let actions = ActionController::new(resource(kind));
            let created = into_result(actions.create(&fields.into_record()?).await)?;
            print_json(&created.into_value())?;
        }
        Command::Update {
            resource: kind,
            id,
            fields,
        } => {
            let actions = ActionController::new(resource(kind));
            let updated = into_result(actions.update(&id, &fields.into_record()?).await)?;
            print_json(&updated.into_value())?;
        }
        Command::Delete { resource: kind, id } => {
            let actions = ActionController::new(resource(kind));
            into_result(actions.delete(&id).await)?;
            println!("Deleted {}/{}", kind, id);
        }
        Command::Total { resource: kind } => {
            println!("{}", resource(kind).total().await?);
        }
        Command::MyPatients => {
            print_records(&resource(ResourceKind::Patient).my_patients().await?)?;
        }
        Command::VitalsFor { patient_id } => {
            print_records(&resource(ResourceKind::Vital).by_patient(&patient_id).await?)?;
        }
    }

    Ok(())
}
