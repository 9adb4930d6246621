use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{CampClient, DEFAULT_API_URL};
use serde::Serialize;
use serde_json::Value;
use shared::{
    domain::{CompanyId, MedicationId, ParticipantId},
    protocol::MedicationInput,
};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Participants(ParticipantCommand),
    #[command(subcommand)]
    Medications(MedicationCommand),
    #[command(subcommand)]
    Attentions(AttentionCommand),
    Company { company_id: i64 },
    Stats,
}

#[derive(Subcommand, Debug)]
enum ParticipantCommand {
    List,
    Show { id: i64 },
    Profile { id: i64 },
    Confirm { id: i64 },
    Health,
    Register {
        /// Participant record as a JSON object.
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct MedicationFields {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value_t = 0)]
    stock: i64,
    #[arg(long)]
    dose: Option<String>,
}

impl From<MedicationFields> for MedicationInput {
    fn from(value: MedicationFields) -> Self {
        Self {
            name: value.name,
            description: value.description,
            stock: value.stock,
            dose: value.dose,
        }
    }
}

#[derive(Subcommand, Debug)]
enum MedicationCommand {
    List,
    Add(MedicationFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: MedicationFields,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum AttentionCommand {
    List,
    For { participant_id: i64 },
    Register {
        /// Attention record as a JSON object.
        #[arg(long)]
        data: String,
    },
}

fn parse_data(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("--data must be valid JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let cli = Cli::parse();
    let client = CampClient::new(cli.api_url);

    match cli.command {
        Command::Participants(command) => match command {
            ParticipantCommand::List => print_json(&client.list_participants().await?),
            ParticipantCommand::Show { id } => {
                print_json(&client.find_participant(ParticipantId(id)).await?)
            }
            ParticipantCommand::Profile { id } => {
                print_json(&client.find_participant_profile(ParticipantId(id)).await?)
            }
            ParticipantCommand::Confirm { id } => {
                print_json(&client.confirm_attendance(ParticipantId(id)).await?)
            }
            ParticipantCommand::Health => print_json(&client.health_participants().await?),
            ParticipantCommand::Register { data } => {
                print_json(&client.register_participant(&parse_data(&data)?).await?)
            }
        },
        Command::Medications(command) => match command {
            MedicationCommand::List => print_json(&client.list_medications().await?),
            MedicationCommand::Add(fields) => {
                print_json(&client.add_medication(&fields.into()).await?)
            }
            MedicationCommand::Update { id, fields } => print_json(
                &client
                    .update_medication(MedicationId(id), &fields.into())
                    .await?,
            ),
            MedicationCommand::Delete { id } => {
                print_json(&client.delete_medication(MedicationId(id)).await?)
            }
        },
        Command::Attentions(command) => match command {
            AttentionCommand::List => print_json(&client.attention_history().await?),
            AttentionCommand::For { participant_id } => {
                print_json(&client.attentions_for(ParticipantId(participant_id)).await?)
            }
            AttentionCommand::Register { data } => {
                print_json(&client.register_attention(&parse_data(&data)?).await?)
            }
        },
        Command::Company { company_id } => {
            print_json(&client.company_members(CompanyId(company_id)).await?)
        }
        Command::Stats => print_json(&client.stats().await?),
    }
}
