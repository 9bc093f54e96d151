use mgadl_core::columns;
use mgadl_core::models::patient::PatientIdentity;
use mgadl_core::models::record::Record;
use mgadl_core::models::responses::ResponseSet;
use mgadl_export::summary::ResultSummary;
use mgadl_instruments::Instrument;
use mgadl_instruments::instruments::mg_adl::MgAdl;
use mgadl_sheets::append::{self, SheetTarget};
use mgadl_sheets::backend::Spreadsheet;

use crate::clock::{Clock, SystemClock};
use crate::error::WizardError;
use crate::session::{Session, Step};
use crate::view::ResultView;

/// Secrets and destination the wizard runs with.
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub app_password: String,
    pub salt: String,
    pub target: SheetTarget,
}

/// Fields submitted on step 1.
#[derive(Debug, Clone, Default)]
pub struct IdentityForm {
    pub password: String,
    pub name: String,
    pub dob: Option<jiff::civil::Date>,
}

/// Drives a [`Session`] through the steps. Holds no per-user state.
pub struct Wizard<B: Spreadsheet> {
    settings: WizardSettings,
    backend: B,
    instrument: Box<dyn Instrument>,
    clock: Box<dyn Clock>,
}

impl<B: Spreadsheet> Wizard<B> {
    pub fn new(settings: WizardSettings, backend: B) -> Self {
        Self {
            settings,
            backend,
            instrument: Box::new(MgAdl),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn instrument(&self) -> &dyn Instrument {
        self.instrument.as_ref()
    }

    /// Move to `requested` if its preconditions hold, otherwise to the
    /// furthest step that is allowed. Returns the step now shown.
    pub fn navigate(&self, session: &mut Session, requested: Step) -> Step {
        match guard(session, requested) {
            Ok(()) => {
                session.step = requested;
            }
            Err(WizardError::StepBlocked { shown, .. }) => {
                session.step = shown;
                session.last_error = Some(format!("{requested} is not available yet"));
            }
            Err(e) => {
                session.last_error = Some(e.to_string());
            }
        }
        session.step
    }

    /// Step 1: check the password and store the patient.
    pub fn complete_identity(
        &self,
        session: &mut Session,
        form: IdentityForm,
    ) -> Result<Step, WizardError> {
        let result = self.check_identity(form);
        let patient = record_error(session, result)?;

        if session.patient.as_ref() != Some(&patient) {
            session.clear_submission();
        }
        session.authenticated = true;
        session.patient = Some(patient);
        session.step = Step::Survey;
        session.last_error = None;
        tracing::info!("gate passed");
        Ok(session.step)
    }

    fn check_identity(&self, form: IdentityForm) -> Result<PatientIdentity, WizardError> {
        if form.password != self.settings.app_password {
            tracing::warn!("gate rejected: wrong password");
            return Err(WizardError::Authentication(
                "the access password is incorrect".to_string(),
            ));
        }
        let name = form.name.trim();
        if name.is_empty() {
            return Err(WizardError::Authentication("enter the patient's name".to_string()));
        }
        let dob = form.dob.ok_or_else(|| {
            WizardError::Authentication("select the date of birth".to_string())
        })?;

        Ok(PatientIdentity {
            name: name.to_string(),
            dob,
        })
    }

    /// Step 2: score the answers, mint a submission, and send it.
    ///
    /// Advances to [`Step::Result`] only if the append succeeds. On failure
    /// the session stays on [`Step::Survey`] with the record kept for
    /// [`Wizard::retry_send`].
    pub fn complete_survey(
        &self,
        session: &mut Session,
        responses: ResponseSet,
    ) -> Result<Step, WizardError> {
        let result = guard(session, Step::Survey);
        record_error(session, result)?;

        let result = self.capture(session, &responses);
        let record = record_error(session, result)?;

        session.responses = responses;
        session.created_at = Some(record.created_at.clone());
        session.submission_id = Some(record.submission_id.clone());
        session.record = Some(record);
        session.sent = false;
        session.blocked = false;
        session.last_append = None;

        self.send(session)
    }

    fn capture(&self, session: &Session, responses: &ResponseSet) -> Result<Record, WizardError> {
        self.instrument
            .validate_complete(responses)
            .map_err(|e| WizardError::Validation(e.to_string()))?;

        let patient = session.patient.as_ref().ok_or_else(|| WizardError::StepBlocked {
            requested: Step::Survey,
            shown: Step::AuthInfo,
        })?;
        let created_at = columns::format_timestamp(self.clock.now());

        Record::build(patient, responses, &created_at, &self.settings.salt)
            .map_err(|e| WizardError::Validation(e.to_string()))
    }

    /// Re-attempt the append for the current submission.
    ///
    /// A no-op once the submission has been sent; otherwise sends the same
    /// record, so a success after earlier failures still yields one row.
    /// Refused without touching the backend while the session is
    /// [`Session::blocked`].
    pub fn retry_send(&self, session: &mut Session) -> Result<Step, WizardError> {
        let result = guard(session, Step::Survey);
        record_error(session, result)?;
        if session.blocked && !session.sent {
            let message = session
                .last_error
                .clone()
                .unwrap_or_else(|| "the spreadsheet integration is not configured".to_string());
            return Err(WizardError::Configuration(message));
        }
        self.send(session)
    }

    fn send(&self, session: &mut Session) -> Result<Step, WizardError> {
        let Some(record) = session.record.as_ref() else {
            let err = WizardError::Validation("complete the questionnaire first".to_string());
            session.last_error = Some(err.to_string());
            return Err(err);
        };

        if session.sent {
            tracing::debug!(submission_id = %record.submission_id, "already sent, skipping");
            session.step = Step::Result;
            return Ok(session.step);
        }

        match append::append_record(&self.backend, &self.settings.target, record) {
            Ok(info) => {
                session.sent = true;
                session.blocked = false;
                session.last_append = Some(info);
                session.last_error = None;
                session.step = Step::Result;
                Ok(session.step)
            }
            Err(e) => {
                tracing::warn!(
                    submission_id = %record.submission_id,
                    error = %e,
                    "append failed"
                );
                let err = WizardError::from(e);
                session.sent = false;
                session.blocked = err.is_configuration();
                session.last_error = Some(err.to_string());
                session.step = Step::Survey;
                Err(err)
            }
        }
    }

    /// Step 3 → step 2 to edit answers. The sent submission stays until a
    /// new completion replaces it.
    pub fn back_to_survey(&self, session: &mut Session) -> Step {
        self.navigate(session, Step::Survey)
    }

    /// Drop authentication only; patient and answers stay.
    pub fn logout(&self, session: &mut Session) -> Step {
        session.authenticated = false;
        session.step = Step::AuthInfo;
        session.step
    }

    /// Clear everything and return to step 1, from any step.
    pub fn reset(&self, session: &mut Session) -> Step {
        *session = Session::default();
        tracing::info!("session reset");
        session.step
    }

    /// The result step's content. Requires a sent submission.
    pub fn result_view(&self, session: &Session) -> Result<ResultView, WizardError> {
        guard(session, Step::Result)?;
        let (Some(record), Some(written)) = (session.record.as_ref(), session.last_append.as_ref())
        else {
            return Err(WizardError::StepBlocked {
                requested: Step::Result,
                shown: Step::Survey,
            });
        };

        Ok(ResultView {
            summary: ResultSummary::build(self.instrument.as_ref(), record),
            record: record.clone(),
            written: written.clone(),
        })
    }
}

/// Preconditions for showing a step.
pub fn guard(session: &Session, requested: Step) -> Result<(), WizardError> {
    let shown = match requested {
        Step::AuthInfo => return Ok(()),
        _ if !session.authenticated || session.patient.is_none() => Step::AuthInfo,
        Step::Result if !session.sent => Step::Survey,
        _ => return Ok(()),
    };
    Err(WizardError::StepBlocked { requested, shown })
}

/// Store the error message on the session before handing the error back.
fn record_error<T>(
    session: &mut Session,
    result: Result<T, WizardError>,
) -> Result<T, WizardError> {
    if let Err(e) = &result {
        session.last_error = Some(e.to_string());
        if let WizardError::StepBlocked { shown, .. } = e {
            session.step = *shown;
        }
    }
    result
}
