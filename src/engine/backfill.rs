//! engine::backfill
//!
//! Interactive completion of missing required arguments.
//!
//! Arguments are visited in declared order starting after the last supplied
//! value. Each required one is prompted for; the loop ends at the first
//! optional argument even if a later one is marked required.

use tracing::debug;

use super::Cancellation;
use crate::command::Argument;
use crate::ui::prompts::{PromptError, PromptRequest, Prompter};

/// Prompt for required arguments not covered by `values`, appending answers.
///
/// With no prompter the first missing argument fails with
/// [`PromptError::NotInteractive`]. Any prompt error aborts the whole loop.
pub fn backfill(
    arguments: &[Argument],
    values: &mut Vec<String>,
    mut prompter: Option<&mut dyn Prompter>,
    cancel: &Cancellation,
) -> Result<(), PromptError> {
    let start = values.len();
    for arg in arguments.iter().skip(start) {
        if !arg.is_required() {
            break;
        }
        let Some(prompter) = prompter.as_mut() else {
            return Err(PromptError::NotInteractive(arg.name().to_string()));
        };

        let mut request = PromptRequest::text(arg.label()).with_default(arg.default_value());
        if let Some(validator) = arg.validator() {
            request = request.with_validator(validator.clone());
        }

        debug!(argument = arg.name(), "prompting for missing argument");
        let answer = prompter.prompt(cancel, &request)?;
        values.push(answer);
    }
    Ok(())
}
