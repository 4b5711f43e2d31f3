//! Rendering of command results.

use gather_application::{CollectionState, ExecutionResult};
use gather_domain::{
    ActivityItem, CollaborationRequest, EventDetail, EventSummary, FriendRequest, OperationError,
    OperationResult, UserProfile, UserSummary,
};
use gather_infrastructure::{SerializationError, to_json_stable};
use serde::Serialize;

use crate::CliError;

/// Output format chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub enum Format {
    Text,
    Json,
}

/// One-line text rendering.
pub trait Line {
    fn line(&self) -> String;
}

impl Line for UserSummary {
    fn line(&self) -> String {
        format!("{:<10} @{} ({})", self.id, self.username, self.label())
    }
}

impl Line for FriendRequest {
    fn line(&self) -> String {
        format!(
            "{:<10} from @{} at {}",
            self.id,
            self.from.username,
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

impl Line for EventSummary {
    fn line(&self) -> String {
        format!(
            "{:<10} {} {}{}",
            self.id,
            self.starts_at.format("%Y-%m-%d %H:%M"),
            self.title,
            self.venue_name
                .as_deref()
                .map(|venue| format!(" @ {venue}"))
                .unwrap_or_default()
        )
    }
}

impl Line for CollaborationRequest {
    fn line(&self) -> String {
        format!(
            "{:<10} {:?} on '{}' from @{}",
            self.id, self.role, self.event_title, self.invited_by.username
        )
    }
}

impl Line for ActivityItem {
    fn line(&self) -> String {
        let event = self
            .event
            .as_ref()
            .map(|event| format!(" '{}'", event.title))
            .unwrap_or_default();
        format!(
            "{} @{} {:?}{event}",
            self.occurred_at.format("%Y-%m-%d %H:%M"),
            self.actor.username,
            self.kind
        )
    }
}

impl Line for EventDetail {
    fn line(&self) -> String {
        let mut text = format!(
            "{}\n  by @{}, {} attending{}",
            self.summary.line(),
            self.organizer.username,
            self.attendee_count,
            if self.is_saved { ", saved" } else { "" }
        );
        if let Some(description) = &self.description {
            text.push_str("\n\n");
            text.push_str(description);
        }
        text
    }
}

impl Line for UserProfile {
    fn line(&self) -> String {
        let mut text = format!(
            "{}\n  {} friends{}",
            self.user.line(),
            self.friend_count,
            if self.is_friend { ", already friends" } else { "" }
        );
        if let Some(bio) = &self.bio {
            text.push_str("\n  ");
            text.push_str(bio);
        }
        text
    }
}

/// Unwraps a finished operation into a printable value.
pub fn finish<T>(result: ExecutionResult<T>) -> Result<T, CliError> {
    match result?.into_result() {
        Some(result) => Ok(result?),
        None => Err(CliError::Operation(OperationError::client(
            "operation did not complete",
        ))),
    }
}

/// Prints a single value.
pub fn print_value<T: Serialize + Line>(format: Format, value: &T) -> Result<(), CliError> {
    match format {
        Format::Text => println!("{}", value.line()),
        Format::Json => print!("{}", to_json_stable(value)?),
    }
    Ok(())
}

/// Prints an accumulated list, or its error.
pub fn print_list<T: Serialize + Line>(
    format: Format,
    state: CollectionState<T>,
) -> Result<(), CliError> {
    let accumulated = match state {
        OperationResult::Success(accumulated) => accumulated,
        OperationResult::Error(error) => return Err(error.into()),
        OperationResult::Idle | OperationResult::Loading => return Ok(()),
    };

    match format {
        Format::Json => print!("{}", to_json_stable(&accumulated.items)?),
        Format::Text => {
            for item in &accumulated.items {
                println!("{}", item.line());
            }
            let total = accumulated
                .total_count
                .map(|total| format!(" of {total}"))
                .unwrap_or_default();
            println!("-- {}{total}{}", accumulated.len(), if accumulated.has_more { ", more available" } else { "" });
        }
    }

    if let Some(error) = accumulated.load_more_error {
        eprintln!("warning: could not load more: {error}");
    }
    Ok(())
}

impl From<SerializationError> for CliError {
    fn from(error: SerializationError) -> Self {
        Self::Output(error.to_string())
    }
}
