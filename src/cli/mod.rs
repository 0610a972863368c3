mod commands;
mod helper;
pub mod render;

use commands::{all_commands_info, Command};
use helper::CliHelper;
use rustyline::{error::ReadlineError, Editor};
use serde_json::Value;
use tracing::warn;

use crate::context::FormContext;
use crate::dialog::{CreateRecordDialog, CreateRecordProps};
use crate::fields::{OptionSlot, UserInput};
use crate::fields::reference::CREATE_RELATED_HEADER;
use crate::form::{FormError, RecordForm, Result, SubmitOutcome};
use render::render_view;

const HISTORY_FILE: &str = ".recordform_history";

// Dialog opened from a reference field of the main form
struct RelatedDialog {
    column: String,
    dialog: CreateRecordDialog,
}

pub struct FormCli {
    ctx: FormContext,
    form: RecordForm,
    related: Option<RelatedDialog>,
}

impl FormCli {
    pub fn new(ctx: FormContext, form: RecordForm) -> Self {
        FormCli {
            ctx,
            form,
            related: None,
        }
    }

    // The form commands go to: the open dialog's, else the main one
    fn active_form(&mut self) -> Result<&mut RecordForm> {
        match self.related {
            Some(ref mut related) => related.dialog.form_mut().ok_or(FormError::NotLoaded),
            None => Ok(&mut self.form),
        }
    }

    fn prompt(&self) -> String {
        let props = self.form.props();
        match self.related {
            Some(ref related) => format!(
                "{}.{}/{}> ",
                props.db,
                props.table,
                related.dialog.props().table
            ),
            None => format!("{}.{}> ", props.db, props.table),
        }
    }

    fn show(&mut self) -> Result<()> {
        let rendered = match self.related {
            Some(ref related) => format!(
                "{}\n{}",
                related.dialog.header(),
                related
                    .dialog
                    .form()
                    .map(|form| render_view(&form.render()))
                    .unwrap_or_default()
            ),
            None => render_view(&self.form.render()),
        };
        println!("{rendered}");
        Ok(())
    }

    // Interactive loop for filling in the form from a CLI
    pub async fn repl_loop(&mut self) -> rustyline::Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper {}));
        rl.load_history(HISTORY_FILE).ok();

        if let Err(e) = self.form.load().await {
            eprintln!("{e}");
        }
        self.show().ok();

        loop {
            match rl.readline(self.prompt().as_str()) {
                Ok(line) if line.starts_with('\\') => {
                    rl.add_history_entry(line.trim_end())?;
                    match line[1..].parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(cmd) => {
                            if let Err(e) = self.handle_command(cmd).await {
                                eprintln!("{e}")
                            }
                        }
                        Err(e) => eprintln!("{e}"),
                    }
                }
                Ok(line) if line.trim().is_empty() => {}
                Ok(_) => eprintln!("Commands start with a backslash, try \\?"),
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("\\q");
                    break;
                }
                Err(err) => {
                    eprintln!("Error while reading input: {err:?}",);
                    break;
                }
            }
        }

        rl.save_history(HISTORY_FILE)
    }

    // Handle a client command
    async fn handle_command(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Help => {
                println!("{}", all_commands_info());
                Ok(())
            }
            Command::Show => self.show(),
            Command::Set { column, value } => {
                self.active_form()?
                    .input(&column, UserInput::Text(value))
                    .await?;
                self.show()
            }
            Command::Check { column, checked } => {
                self.active_form()?
                    .input(&column, UserInput::Check(checked))
                    .await?;
                self.show()
            }
            Command::Pick { column, index } => {
                let form = self.active_form()?;
                let key = form
                    .options()
                    .slot(&column)
                    .as_ref()
                    .map(OptionSlot::options)
                    .and_then(|options| options.get(index).map(|o| o.key()));
                match key {
                    Some(key) => {
                        form.input(&column, UserInput::Choose(key)).await?;
                        self.show()
                    }
                    None => {
                        eprintln!("{column} has no option {index}");
                        Ok(())
                    }
                }
            }
            Command::Submit => self.submit().await,
            Command::Related { column } => self.open_related(&column).await,
            Command::Cancel => self.cancel().await,
            Command::Quit => {
                panic!("Unexpected quit, this should be handled in the repl loop")
            }
        }
    }

    async fn submit(&mut self) -> Result<()> {
        let Some(mut related) = self.related.take() else {
            let outcome = self.form.submit().await;
            self.show()?;
            if let SubmitOutcome::Navigated(path) = outcome? {
                println!("Created {path}");
            }
            return Ok(());
        };

        match related.dialog.submit().await {
            Ok(outcome) => {
                let id = match outcome {
                    SubmitOutcome::Closed(id) => id,
                    SubmitOutcome::Navigated(path) => Value::String(path.id),
                };
                self.form
                    .related_record_created(&related.column, Some(id))
                    .await?;
                self.show()
            }
            Err(e) => {
                self.related = Some(related);
                self.show()?;
                Err(e)
            }
        }
    }

    async fn cancel(&mut self) -> Result<()> {
        match self.related.take() {
            Some(mut related) => {
                related.dialog.cancel();
                self.form
                    .related_record_created(&related.column, None)
                    .await?;
                self.show()
            }
            None => {
                self.form.cancel();
                println!("Cancelled, \\q to quit");
                Ok(())
            }
        }
    }

    async fn open_related(&mut self, column: &str) -> Result<()> {
        if self.related.is_some() {
            eprintln!("A dialog is already open, \\submit or \\cancel it first");
            return Ok(());
        }

        if self.form.is_closed() {
            return Err(FormError::Closed);
        }
        let schema = self.form.schema().cloned().ok_or(FormError::NotLoaded)?;
        let target = schema
            .column(column)
            .filter(|settings| settings.reference_create)
            .and_then(|settings| settings.join_target());
        let Some((db, table)) = target else {
            warn!("{column} doesn't offer creating related records");
            eprintln!("{column} isn't a reference field with \\related");
            return Ok(());
        };

        let mut dialog = CreateRecordDialog::new(
            self.ctx.clone(),
            CreateRecordProps::new(db, table)
                .close_on_create(true)
                .with_header(CREATE_RELATED_HEADER),
        );
        dialog.open().await?;

        self.related = Some(RelatedDialog {
            column: column.to_string(),
            dialog,
        });
        self.show()
    }
}
