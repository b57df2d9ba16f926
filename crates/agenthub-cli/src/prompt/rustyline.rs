use std::io::{self, Write};

use agenthub::models::message::ChatMessage;
use anyhow::Result;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::{parse_input, thinking::get_random_thinking_message, Input, InputType, Prompt, Theme};
use crate::render::print_markdown;

const PROMPT: &str = "\x1b[1m\x1b[38;5;30m> \x1b[0m";

pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: cliclack::ProgressBar,
    thinking: &'static str,
    busy: bool,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new(theme: Theme) -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: spinner(),
            thinking: get_random_thinking_message(),
            busy: false,
            theme,
        })
    }
}

fn print_help() {
    println!("Commands:");
    println!("/exit - Exit the session");
    println!("/clear - Delete the conversation with this agent");
    println!("/1 ... /5 - Send one of the quick prompts");
    println!("/? | /help - Display this help message");
    println!("Ctrl+C - Stop the reply being streamed (the unanswered message stays in the input history)");
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: &ChatMessage) {
        if message.is_assistant() {
            print_markdown(&message.content, &self.theme);
        } else {
            println!("{} {}", style("you:").dim(), message.content);
        }
        println!();
        let _ = io::stdout().flush();
    }

    fn render_error(&mut self, error: &str) {
        println!("{} {}", style("error:").red().bold(), style(error).red());
        println!();
    }

    fn render_notice(&mut self, notice: &str) {
        println!("{}", style(notice).dim());
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.thinking = get_random_thinking_message();
        self.spinner.start(format!("{}...", self.thinking));
        self.busy = true;
    }

    fn update_busy(&mut self, received_chars: usize) {
        if self.busy {
            self.spinner
                .set_message(format!("{}... ({} chars)", self.thinking, received_chars));
        }
    }

    fn hide_busy(&mut self) {
        if self.busy {
            self.spinner.stop("");
            self.busy = false;
        }
    }

    fn get_input(&mut self, quick_prompts: &[String]) -> Result<Input> {
        let line = match self.editor.readline(PROMPT) {
            Ok(line) => line,
            Err(e) => {
                match e {
                    ReadlineError::Interrupted | ReadlineError::Eof => (),
                    _ => eprintln!("Input error: {}", e),
                }
                return Ok(Input {
                    input_type: InputType::Exit,
                    content: None,
                });
            }
        };

        let input = parse_input(&line, quick_prompts);
        match input.input_type {
            InputType::Message => {
                let _ = self.editor.add_history_entry(line.trim());
            }
            InputType::Help => print_help(),
            InputType::AskAgain => {
                if let Some(note) = &input.content {
                    self.render_notice(note);
                }
            }
            InputType::Clear | InputType::Exit => (),
        }
        Ok(input)
    }

    fn close(&self) {
        // No cleanup required
    }

    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
