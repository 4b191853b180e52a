use colored::Colorize;
use ecos_cloud::{ConfirmLevel, Confirmation, Prompter};
use std::io::Write;

/// Phrase that must be typed for a strong confirmation.
pub const DESTROY_PHRASE: &str = "destroy";

/// Asks on stdout and reads the answer from stdin.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, request: &Confirmation) -> bool {
        println!();
        if requires_phrase(request) {
            println!(
                "{}",
                "⚠ Some resources are not tagged as managed by ecos or could not be verified."
                    .yellow()
                    .bold()
            );
            print!(
                "{}? Type '{}' to confirm: ",
                request.question(),
                DESTROY_PHRASE
            );
        } else {
            print!("{}? [y/N]: ", request.question());
        }

        match read_answer() {
            Ok(answer) => is_confirmed(request, &answer),
            Err(err) => {
                tracing::warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

fn requires_phrase(request: &Confirmation) -> bool {
    matches!(
        request,
        Confirmation::Destroy {
            level: ConfirmLevel::Strong
        }
    )
}

fn read_answer() -> std::io::Result<String> {
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Whether `answer` accepts `request`.
pub fn is_confirmed(request: &Confirmation, answer: &str) -> bool {
    if requires_phrase(request) {
        answer == DESTROY_PHRASE
    } else {
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }
}
