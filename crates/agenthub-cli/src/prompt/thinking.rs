use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Thinking",
    "Pondering",
    "Drafting a reply",
    "Gathering thoughts",
    "Consulting the agent",
    "Choosing words",
    "Connecting the dots",
    "Working on it",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(THINKING_MESSAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_comes_from_the_list() {
        for _ in 0..20 {
            assert!(THINKING_MESSAGES.contains(&get_random_thinking_message()));
        }
    }
}
