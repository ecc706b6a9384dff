//! Boundary layer between the chat transport and the flow engine.
//!
//! Every incoming message is routed to exactly one handler: commands map to
//! engine operations or static replies, anything else is an answer for the
//! user's active flow. Each rejected or out-of-context input gets a single
//! clarifying reply.
//!
//! - `command` -- `/command` parsing
//! - `replies` -- user-facing texts

pub mod command;
pub mod replies;

use std::sync::Arc;

use cued_types::chat::{ChatTarget, IncomingMessage, ReplyKeyboard, TextFormat, UserId};
use cued_types::error::FlowError;
use cued_types::flow::{FlowKind, FlowStatus};

use crate::flow::engine::{AnswerOutcome, FlowEngine, Prompt};
use crate::flow::definition;
use crate::repository::RecordStore;
use crate::submission::{SubmissionHandler, SubmissionReport};
use crate::transport::ChatTransport;

pub use command::{Command, parse_command};

/// How an incoming message was handled.
#[derive(Debug)]
pub enum Dispatched {
    /// A single informational or prompt reply was sent.
    Replied,
    /// The message completed a flow.
    Submitted(SubmissionReport),
}

/// Routes incoming messages to the engine and sends the replies.
pub struct Dispatcher<R: RecordStore, T: ChatTransport> {
    engine: FlowEngine,
    submissions: SubmissionHandler<R, T>,
    transport: Arc<T>,
    /// Receives a note when a submission could not be persisted.
    operator: Option<ChatTarget>,
}

impl<R: RecordStore, T: ChatTransport> Dispatcher<R, T> {
    pub fn new(engine: FlowEngine, submissions: SubmissionHandler<R, T>, transport: Arc<T>) -> Self {
        Self {
            engine,
            submissions,
            transport,
            operator: None,
        }
    }

    /// Send persistence failures to `operator`.
    pub fn with_operator(mut self, operator: Option<ChatTarget>) -> Self {
        self.operator = operator;
        self
    }

    pub fn engine(&self) -> &FlowEngine {
        &self.engine
    }

    pub fn submissions(&self) -> &SubmissionHandler<R, T> {
        &self.submissions
    }

    /// Handle one incoming message to completion.
    #[tracing::instrument(skip_all, fields(user = %message.user, chat = %message.chat_kind))]
    pub async fn handle(&self, message: IncomingMessage) -> Dispatched {
        match parse_command(&message.text) {
            Some(command) => self.handle_command(message.user, command).await,
            None => self.handle_answer(&message).await,
        }
    }

    async fn handle_command(&self, user: UserId, command: Command) -> Dispatched {
        tracing::debug!(?command, "command received");
        match command {
            Command::Start => {
                let keyboard = replies::start_keyboard();
                self.send(user, &replies::welcome(), TextFormat::Markdown, Some(&keyboard))
                    .await;
                Dispatched::Replied
            }
            Command::Help => self.reply_markdown(user, &replies::help()).await,
            Command::StartFlow(kind) => self.start_flow(user, kind).await,
            Command::Cancel => match self.engine.cancel(user) {
                Ok(kind) => self.reply(user, &replies::cancelled(kind)).await,
                Err(_) => self.reply(user, &replies::no_active_flow()).await,
            },
            Command::Status => match self.engine.status(user) {
                FlowStatus::NotStarted => self.reply(user, &replies::no_active_flow()).await,
                FlowStatus::AwaitingStep { kind, index, of } => {
                    self.reply(user, &replies::status(kind, index, of)).await
                }
            },
            Command::Unknown(name) => self.reply(user, &replies::unknown_command(&name)).await,
        }
    }

    async fn start_flow(&self, user: UserId, kind: FlowKind) -> Dispatched {
        match self.engine.start_flow(user, kind) {
            Ok(prompt) => {
                tracing::info!(flow = %kind, "flow started");
                self.send(user, definition(kind).intro, TextFormat::Plain, None).await;
                self.reply_prompt(user, &prompt).await
            }
            Err(err) => self.reply_flow_error(user, err).await,
        }
    }

    async fn handle_answer(&self, message: &IncomingMessage) -> Dispatched {
        let user = message.user;
        match self.engine.submit_answer(user, &message.text) {
            Ok(AnswerOutcome::Next(prompt)) => self.reply_prompt(user, &prompt).await,
            Ok(AnswerOutcome::Rejected { reason, prompt }) => {
                self.reply(user, &replies::rejected(&reason, &prompt)).await
            }
            Ok(AnswerOutcome::Complete(completed)) => {
                let kind = completed.kind();
                let report = self.submissions.complete(completed, message.submitter()).await;
                self.notify_operator(&report).await;

                let text = if report.persisted.is_ok() || report.delivered() {
                    definition(kind).completion_message.to_string()
                } else {
                    replies::submission_failed(kind)
                };
                self.send(user, &text, TextFormat::Plain, None).await;
                Dispatched::Submitted(report)
            }
            Err(err) => self.reply_flow_error(user, err).await,
        }
    }

    async fn reply_flow_error(&self, user: UserId, err: FlowError) -> Dispatched {
        let text = match err {
            FlowError::Conflict { active, requested } => replies::conflict(active, requested),
            FlowError::NoActiveFlow => replies::no_active_flow(),
            FlowError::CapacityReached { limit } => {
                tracing::warn!(limit, "conversation capacity reached");
                replies::busy()
            }
        };
        self.reply(user, &text).await
    }

    async fn notify_operator(&self, report: &SubmissionReport) {
        let (Some(operator), Err(err)) = (&self.operator, &report.persisted) else {
            return;
        };
        let text = format!(
            "Submission {} ({}) from {} was not persisted: {err}",
            report.record.id, report.record.kind, report.record.submitter
        );
        if let Err(e) = self
            .transport
            .send_message(operator, &text, TextFormat::Plain)
            .await
        {
            tracing::warn!(error = %e, "failed to notify operator");
        }
    }

    async fn reply_prompt(&self, user: UserId, prompt: &Prompt) -> Dispatched {
        self.reply(user, &replies::prompt(prompt)).await
    }

    async fn reply(&self, user: UserId, text: &str) -> Dispatched {
        self.send(user, text, TextFormat::Plain, None).await;
        Dispatched::Replied
    }

    async fn reply_markdown(&self, user: UserId, text: &str) -> Dispatched {
        self.send(user, text, TextFormat::Markdown, None).await;
        Dispatched::Replied
    }

    /// Delivery failures are logged; the conversation state is unaffected.
    async fn send(
        &self,
        user: UserId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&ReplyKeyboard>,
    ) {
        let chat = ChatTarget::from(user);
        let sent = match keyboard {
            Some(keyboard) => {
                self.transport
                    .send_with_keyboard(&chat, text, format, keyboard)
                    .await
            }
            None => self.transport.send_message(&chat, text, format).await,
        };
        if let Err(e) = sent {
            tracing::warn!(user = %user, error = %e, "failed to send reply");
        }
    }
}
