use agenthub::models::agent::Agent;
use agenthub::models::message::ChatMessage;
use anyhow::Result;

pub mod rustyline;
pub mod thinking;

pub trait Prompt {
    fn render(&mut self, message: &ChatMessage);
    fn render_error(&mut self, error: &str);
    fn render_notice(&mut self, notice: &str);
    fn get_input(&mut self, quick_prompts: &[String]) -> Result<Input>;
    fn show_busy(&mut self);
    /// Called for every snapshot while a reply streams in.
    fn update_busy(&mut self, received_chars: usize);
    fn hide_busy(&mut self);
    fn close(&self);
    fn agent_ready(&mut self, agent: &Agent, quick_prompts: &[String]) {
        println!();
        println!("{} {}", agent.icon, agent.name);
        println!("{}", agent.description_or_default());
        if !quick_prompts.is_empty() {
            println!();
            for (i, prompt) in quick_prompts.iter().enumerate() {
                println!("  /{}  {}", i + 1, prompt);
            }
        }
        println!();
    }
    // Used for testing. Allows us to downcast to any type.
    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any;
}

#[derive(Debug, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Message text, or a note to show when asking again
}

#[derive(Debug, PartialEq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Clear,    // Delete the conversation history
    Help,     // Show the list of commands
    Exit,     // User wants to exit the session
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Input {
    fn of(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }
}

/// Interprets one line typed at the chat prompt.
///
/// `/N` picks the N-th quick prompt. Any other text, including unknown
/// slash commands, is sent as a message.
pub fn parse_input(line: &str, quick_prompts: &[String]) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::of(InputType::AskAgain);
    }

    if line.eq_ignore_ascii_case("/exit") || line.eq_ignore_ascii_case("/quit") {
        return Input::of(InputType::Exit);
    }
    if line.eq_ignore_ascii_case("/clear") {
        return Input::of(InputType::Clear);
    }
    if line.eq_ignore_ascii_case("/help") || line == "/?" {
        return Input::of(InputType::Help);
    }

    if let Some(index) = line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
        return match index.checked_sub(1).and_then(|i| quick_prompts.get(i)) {
            Some(prompt) => Input {
                input_type: InputType::Message,
                content: Some(prompt.clone()),
            },
            None => Input {
                input_type: InputType::AskAgain,
                content: Some(format!("There is no quick prompt /{}", index)),
            },
        };
    }

    Input {
        input_type: InputType::Message,
        content: Some(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts() -> Vec<String> {
        vec!["Write a haiku".to_string(), "Summarize this".to_string()]
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_input("/exit", &[]).input_type, InputType::Exit);
        assert_eq!(parse_input(" /QUIT ", &[]).input_type, InputType::Exit);
        assert_eq!(parse_input("/clear", &[]).input_type, InputType::Clear);
        assert_eq!(parse_input("/help", &[]).input_type, InputType::Help);
        assert_eq!(parse_input("   ", &[]).input_type, InputType::AskAgain);
    }

    #[test]
    fn test_quick_prompt_selection() {
        let input = parse_input("/2", &prompts());
        assert_eq!(input.input_type, InputType::Message);
        assert_eq!(input.content.as_deref(), Some("Summarize this"));

        for line in ["/0", "/3"] {
            let input = parse_input(line, &prompts());
            assert_eq!(input.input_type, InputType::AskAgain);
            assert!(input.content.is_some());
        }
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        let input = parse_input("  what is /usr/bin?  ", &prompts());
        assert_eq!(
            input,
            Input {
                input_type: InputType::Message,
                content: Some("what is /usr/bin?".to_string()),
            }
        );
    }
}
