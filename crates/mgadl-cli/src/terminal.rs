//! Line-oriented front end for the wizard.
//!
//! Each prompt is one interaction: read a line, hand it to the controller,
//! print whatever step the session lands on.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use mgadl_core::models::responses::ResponseSet;
use mgadl_sheets::backend::Spreadsheet;
use mgadl_wizard::controller::{IdentityForm, Wizard};
use mgadl_wizard::session::{Session, Step};

/// Where `save` writes CSV downloads.
pub struct TerminalOptions {
    pub download_dir: PathBuf,
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
    options: TerminalOptions,
    /// Ask the questions again instead of offering a retry.
    editing: bool,
}

enum Flow {
    Continue,
    Quit,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W, options: TerminalOptions) -> Self {
        Self {
            input,
            output,
            options,
            editing: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive `session` until the user quits or input ends.
    pub fn run<B: Spreadsheet>(
        &mut self,
        wizard: &Wizard<B>,
        session: &mut Session,
    ) -> eyre::Result<()> {
        writeln!(self.output, "MG-ADL 설문")?;
        writeln!(self.output, "1) 비밀번호/정보 → 2) 설문 → 3) 결과/저장")?;

        loop {
            if let Some(err) = session.last_error.take() {
                writeln!(self.output, "! {err}")?;
            }
            let flow = match session.step {
                Step::AuthInfo => self.auth_step(wizard, session)?,
                Step::Survey => self.survey_step(wizard, session)?,
                Step::Result => self.result_step(wizard, session)?,
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    fn auth_step<B: Spreadsheet>(
        &mut self,
        wizard: &Wizard<B>,
        session: &mut Session,
    ) -> eyre::Result<Flow> {
        writeln!(self.output, "\n== {} ==", Step::AuthInfo)?;
        let Some(password) = self.prompt("access password")? else {
            return Ok(Flow::Quit);
        };

        let previous = session.patient.as_ref();
        let name_hint = previous.map(|p| p.name.clone()).unwrap_or_default();
        let Some(name) = self.prompt_with_default("patient name", &name_hint)? else {
            return Ok(Flow::Quit);
        };
        let dob_hint = previous.map(|p| p.dob_iso()).unwrap_or_default();
        let Some(dob_text) = self.prompt_with_default("date of birth (YYYY-MM-DD)", &dob_hint)?
        else {
            return Ok(Flow::Quit);
        };

        let dob = match dob_text.trim() {
            "" => None,
            text => match text.parse::<jiff::civil::Date>() {
                Ok(d) => Some(d),
                Err(e) => {
                    writeln!(self.output, "! invalid date '{text}': {e}")?;
                    return Ok(Flow::Continue);
                }
            },
        };

        let form = IdentityForm {
            password,
            name,
            dob,
        };
        if wizard.complete_identity(session, form).is_ok()
            && let Some(p) = &session.patient
        {
            writeln!(self.output, "patient: {} (DOB: {})", p.name, p.dob_iso())?;
        }
        Ok(Flow::Continue)
    }

    fn survey_step<B: Spreadsheet>(
        &mut self,
        wizard: &Wizard<B>,
        session: &mut Session,
    ) -> eyre::Result<Flow> {
        if session.record.is_some() && !session.sent && !self.editing {
            return self.retry_menu(wizard, session);
        }
        self.editing = false;

        writeln!(self.output, "\n== {} ==", Step::Survey)?;
        let mut responses = ResponseSet::new();
        for item in wizard.instrument().items() {
            writeln!(self.output, "\n{}", item.question)?;
            for choice in &item.choices {
                writeln!(self.output, "  {}", choice.display())?;
            }
            let previous = session.responses.get(&item.id).unwrap_or(0);
            let score = loop {
                let Some(answer) = self.prompt_with_default("score", &previous.to_string())? else {
                    return Ok(Flow::Quit);
                };
                match answer.trim().parse::<u8>() {
                    Ok(s) if item.range().contains(s) => break s,
                    _ => {
                        let range = item.range();
                        writeln!(
                            self.output,
                            "! enter a score from {} to {}",
                            range.min, range.max
                        )?;
                    }
                }
            };
            responses.set(item.id.clone(), score);
        }

        writeln!(
            self.output,
            "total: {} / {}",
            wizard.instrument().total(&responses),
            wizard.instrument().max_total()
        )?;
        // Errors are stored on the session and printed on the next loop.
        let _ = wizard.complete_survey(session, responses);
        Ok(Flow::Continue)
    }

    fn retry_menu<B: Spreadsheet>(
        &mut self,
        wizard: &Wizard<B>,
        session: &mut Session,
    ) -> eyre::Result<Flow> {
        if session.blocked {
            writeln!(
                self.output,
                "\nsaving is unavailable until the deployment configuration is fixed."
            )?;
            writeln!(self.output, "[e]dit answers  [n]ew  [q]uit")?;
        } else {
            writeln!(self.output, "\nsave failed. [r]etry  [e]dit answers  [n]ew  [q]uit")?;
        }
        let Some(choice) = self.prompt("choice")? else {
            return Ok(Flow::Quit);
        };
        match choice.trim() {
            "r" if !session.blocked => {
                let _ = wizard.retry_send(session);
            }
            "e" => self.editing = true,
            "n" => {
                wizard.reset(session);
            }
            "q" => return Ok(Flow::Quit),
            other => writeln!(self.output, "! unknown choice '{other}'")?,
        }
        Ok(Flow::Continue)
    }

    fn result_step<B: Spreadsheet>(
        &mut self,
        wizard: &Wizard<B>,
        session: &mut Session,
    ) -> eyre::Result<Flow> {
        writeln!(self.output, "\n== {} ==", Step::Result)?;
        let view = match wizard.result_view(session) {
            Ok(v) => v,
            Err(e) => {
                writeln!(self.output, "! {e}")?;
                wizard.navigate(session, Step::Result);
                return Ok(Flow::Continue);
            }
        };
        write!(self.output, "{}", view.render()?)?;

        loop {
            writeln!(
                self.output,
                "\n[s]ave CSV  [b]ack to survey  [l]ogout  [n]ew  [q]uit"
            )?;
            let Some(choice) = self.prompt("choice")? else {
                return Ok(Flow::Quit);
            };
            match choice.trim() {
                "s" => {
                    let (file_name, contents) = view.csv_download(jiff::Zoned::now().datetime());
                    let path = self.save_download(&file_name, &contents)?;
                    writeln!(self.output, "saved {}", path.display())?;
                }
                "b" => {
                    wizard.back_to_survey(session);
                    return Ok(Flow::Continue);
                }
                "l" => {
                    wizard.logout(session);
                    return Ok(Flow::Continue);
                }
                "n" => {
                    wizard.reset(session);
                    return Ok(Flow::Continue);
                }
                "q" => return Ok(Flow::Quit),
                other => writeln!(self.output, "! unknown choice '{other}'")?,
            }
        }
    }

    fn save_download(&self, file_name: &str, contents: &str) -> eyre::Result<PathBuf> {
        let dir: &Path = &self.options.download_dir;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, contents.as_bytes())?;
        tracing::info!(path = %path.display(), "csv exported");
        Ok(path)
    }

    /// Read one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> eyre::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_with_default(&mut self, label: &str, default: &str) -> eyre::Result<Option<String>> {
        let label = if default.is_empty() {
            label.to_string()
        } else {
            format!("{label} [{default}]")
        };
        Ok(self.prompt(&label)?.map(|answer| {
            if answer.trim().is_empty() {
                default.to_string()
            } else {
                answer
            }
        }))
    }
}
