//! `wren instruction ...`

use serde_json::json;
use tabled::Tabled;
use wren_shared::{InstructionUpdate, NewInstruction};

use crate::app::{App, Connect};
use crate::cli::InstructionAction;
use crate::error::CliError;
use crate::output::truncate;

#[derive(Tabled)]
struct InstructionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Instruction")]
    instruction: String,
}

pub async fn run<C: Connect>(
    app: &mut App<'_, C>,
    action: InstructionAction,
) -> Result<(), CliError> {
    match action {
        InstructionAction::List => {
            let (session, _) = app.project_session()?;
            let instructions = session.client.list_instructions().await?;
            if app.out.is_json() {
                return app.out.json(&instructions);
            }
            if instructions.is_empty() {
                return app.out.line("No instructions found.");
            }
            let rows = instructions.into_iter().map(|i| InstructionRow {
                id: i.id,
                scope: if i.is_global {
                    "global".to_string()
                } else {
                    format!("{} question(s)", i.questions.len())
                },
                instruction: truncate(&i.instruction.replace('\n', " "), 70),
            });
            app.out.table(rows)
        }

        InstructionAction::Create {
            text,
            global,
            questions,
        } => {
            if !global && questions.is_empty() {
                return Err(CliError::invalid(
                    "must specify either --global or at least one --question",
                ));
            }
            let (session, _) = app.project_session()?;
            let created = session
                .client
                .create_instruction(&NewInstruction {
                    instruction: text,
                    questions,
                    is_global: global,
                })
                .await?;
            if app.out.is_json() {
                return app.out.json(&created);
            }
            app.out
                .success(format!("Created instruction {}", created.id))
        }

        InstructionAction::Update {
            id,
            text,
            global,
            questions,
        } => {
            let update = InstructionUpdate {
                instruction: text,
                questions: if questions.is_empty() {
                    None
                } else {
                    Some(questions)
                },
                is_global: global,
            };
            if update.is_empty() {
                return Err(CliError::invalid(
                    "no changes specified; use --text, --global, or --question",
                ));
            }
            let (session, _) = app.project_session()?;
            let updated = session.client.update_instruction(id, &update).await?;
            if app.out.is_json() {
                return app.out.json(&updated);
            }
            app.out
                .success(format!("Updated instruction {}", updated.id))
        }

        InstructionAction::Delete { id } => {
            let (session, _) = app.project_session()?;
            session.client.delete_instruction(id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted instruction {}", id))
        }
    }
}
