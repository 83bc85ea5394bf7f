use anyhow::Result;
use inquire::InquireError;

use crate::translation::Usage;

mod spinner;
mod style;

pub use spinner::Spinner;
pub use style::Style;

const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Runs an interactive flow, treating Ctrl+C or Escape as a clean exit.
pub fn handle_prompt_cancellation<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match f() {
        Ok(()) => Ok(()),
        Err(e)
            if e.downcast_ref::<InquireError>()
                .is_some_and(is_prompt_cancelled) =>
        {
            println!();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Formats a USD amount, with more precision for sub-cent values.
pub fn format_cost(cost_usd: Option<f64>) -> String {
    match cost_usd {
        Some(cost) if cost < 0.01 => format!("${cost:.6}"),
        Some(cost) => format!("${cost:.4}"),
        None => "unavailable".to_string(),
    }
}

/// One-line cost footer, e.g. `cost: $0.000009 (10 in / 5 out tokens)`.
pub fn cost_line(cost_usd: Option<f64>, usage: Option<&Usage>) -> String {
    let cost = format_cost(cost_usd);
    match usage {
        Some(u) => format!(
            "cost: {cost} ({} in / {} out tokens)",
            u.input_tokens, u.output_tokens
        ),
        None => format!("cost: {cost}"),
    }
}
