//! User-facing reply texts.

use cued_types::chat::ReplyKeyboard;
use cued_types::flow::FlowKind;

use crate::flow::definition;
use crate::flow::engine::Prompt;

/// Greeting for `/start` (Markdown).
pub fn welcome() -> String {
    format!(
        "Hi there! Are you an *Applicant* or a *Recruiter*?\n\
         Use /{} if you are an Applicant, /{} to set up your recruiter profile, \
         and /{} to post a job.\n\
         Use /help to get more information.",
        definition(FlowKind::Applicant).command,
        definition(FlowKind::Recruiter).command,
        definition(FlowKind::JobPosting).command,
    )
}

/// One-time keyboard sent with the greeting, one button per flow.
pub fn start_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::one_time_row(
        FlowKind::ALL
            .into_iter()
            .map(|kind| format!("/{}", definition(kind).command)),
    )
}

/// Command overview for `/help` (Markdown).
pub fn help() -> String {
    let mut out = String::from("*Available commands*\n");
    for kind in FlowKind::ALL {
        let def = definition(kind);
        out.push_str(&format!(
            "/{} - {} ({} questions)\n",
            def.command,
            def.title,
            def.step_count()
        ));
    }
    out.push_str("/status - show your progress\n");
    out.push_str("/cancel - discard the answers you have given so far\n");
    out.push_str("/start - back to the beginning");
    out
}

/// The question text, with its position in the flow.
pub fn prompt(prompt: &Prompt) -> String {
    format!("({}/{}) {}", prompt.index + 1, prompt.of, prompt.text)
}

pub fn rejected(reason: &str, retry: &Prompt) -> String {
    format!("{reason}\n{}", prompt(retry))
}

pub fn no_active_flow() -> String {
    "There is nothing in progress. Use /start to choose what you would like to do.".to_string()
}

pub fn conflict(active: FlowKind, requested: FlowKind) -> String {
    format!(
        "You are still filling in your {}. Finish it, or use /cancel to discard it before starting a {}.",
        definition(active).title.to_lowercase(),
        definition(requested).title.to_lowercase(),
    )
}

pub fn busy() -> String {
    "Too many people are filling in forms right now. Please try again in a few minutes.".to_string()
}

pub fn unknown_command(name: &str) -> String {
    format!("Sorry, I don't know the command /{name}. Use /help to see what I can do.")
}

pub fn cancelled(kind: FlowKind) -> String {
    format!(
        "Your {} was discarded. Use /start to begin again.",
        definition(kind).title.to_lowercase()
    )
}

pub fn status(kind: FlowKind, index: usize, of: usize) -> String {
    format!(
        "You are on question {} of {} of your {}.",
        index + 1,
        of,
        definition(kind).title.to_lowercase()
    )
}

pub fn submission_failed(kind: FlowKind) -> String {
    format!(
        "Sorry, something went wrong while submitting your details. Please try again later with /{}.",
        definition(kind).command
    )
}
