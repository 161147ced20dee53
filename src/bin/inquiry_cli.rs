//! Inquiry CLI - JSON bridge to the submission pipeline
//!
//! Commands: forms, schema, catalogs, validate, submit
//! Outputs JSON to stdout, logs to stderr
//! Exit code 2 on validation failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

use inquiry_forms::{
    forms::admin,
    handlers::Chain,
    notification::SystemMailHandoff,
    telemetry, FormValues, FormsConfig, LogHandler, PipelineError, ReassignmentMailer,
    SchemaRegistry, SubmissionPayload, SubmissionPipeline, SubmitHandler, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "inquiry-cli")]
#[command(about = "Inquiry Forms CLI - validate and submit inquiry forms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available forms
    Forms,

    /// Print one form's schema
    Schema {
        /// Form ID
        #[arg(short, long)]
        form: String,
    },

    /// Print the option catalogs in effect
    Catalogs,

    /// Validate form values
    Validate {
        /// Form ID
        #[arg(short, long)]
        form: String,

        /// JSON payload (form values)
        #[arg(short, long)]
        payload: String,
    },

    /// Validate and submit form values
    Submit {
        /// Form ID
        #[arg(short, long)]
        form: String,

        /// JSON payload (form values)
        #[arg(short, long)]
        payload: String,

        /// Open the default mail client for admin reassignment notices
        #[arg(long)]
        open_mail: bool,
    },
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!(r#"{{"error": "Failed to serialize output: {}"}}"#, e),
    }
}

fn fail(message: String) -> ExitCode {
    print_json(&json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn parse_values(payload: &str) -> Result<FormValues, String> {
    serde_json::from_str(payload).map_err(|e| format!("Invalid payload: {}", e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match FormsConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return fail(e.to_string()),
    };

    if let Err(e) = telemetry::init(&config.log_level) {
        eprintln!("{}", e);
    }

    let catalogs = match config.catalogs() {
        Ok(c) => c,
        Err(e) => return fail(e.to_string()),
    };

    let pipeline = SubmissionPipeline::new(SchemaRegistry::builtin(&catalogs));

    match cli.command {
        Commands::Forms => {
            let forms: Vec<_> = pipeline
                .list_forms()
                .iter()
                .map(|s| json!({
                    "id": s.id,
                    "title": s.title,
                    "fields": s.paths(),
                }))
                .collect();
            print_json(&json!({ "engine_version": ENGINE_VERSION, "forms": forms }));
            ExitCode::SUCCESS
        }

        Commands::Schema { form } => match pipeline.schema(&form) {
            Some(schema) => {
                print_json(schema);
                ExitCode::SUCCESS
            }
            None => fail(PipelineError::UnknownForm(form).to_string()),
        },

        Commands::Catalogs => {
            print_json(&catalogs);
            ExitCode::SUCCESS
        }

        Commands::Validate { form, payload } => {
            let values = match parse_values(&payload) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            match pipeline.validate(&form, &values) {
                Ok(result) => {
                    print_json(&result);
                    if result.valid {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(e) => fail(e.to_string()),
            }
        }

        Commands::Submit { form, payload, open_mail } => {
            let values = match parse_values(&payload) {
                Ok(v) => v,
                Err(e) => return fail(e),
            };

            let mailer = ReassignmentMailer::new(
                SystemMailHandoff,
                catalogs.clone(),
                config.signature.clone(),
            );
            let submitted = if open_mail && form == admin::FORM_ID {
                let notify = |p: &SubmissionPayload| mailer.handle(p);
                pipeline.submit_with(&form, &values, &Chain(LogHandler, notify))
            } else {
                pipeline.submit_with(&form, &values, &LogHandler)
            };

            match submitted {
                Ok(payload) => {
                    let mail = if payload.form == admin::FORM_ID {
                        match mailer.draft(&payload) {
                            Ok(draft) => draft.map(|d| json!({
                                "subject": d.subject,
                                "body": d.body,
                                "mailto": d.mailto_uri(),
                            })),
                            Err(e) => return fail(e.to_string()),
                        }
                    } else {
                        None
                    };
                    print_json(&json!({
                        "success": true,
                        "payload": payload,
                        "mail": mail,
                    }));
                    ExitCode::SUCCESS
                }
                Err(PipelineError::ValidationFailed(result)) => {
                    print_json(&json!({ "success": false, "validation": result }));
                    ExitCode::from(2)
                }
                Err(e) => fail(e.to_string()),
            }
        }
    }
}
