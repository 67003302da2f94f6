//! System prompt assembly and outgoing message sequencing.
//!
//! The outgoing sequence always starts with exactly one system message
//! and ends with exactly one user message carrying the current turn.

use crate::messages::{ChatMessage, Role};

/// Marker under which the caller embeds uploaded file text into the
/// message body.
pub(crate) const FILE_CONTENT_MARKER: &str = "[DATEIINHALT]";

const BASE_INSTRUCTION: &str =
    "Du bist ein hilfsreicher AI-Assistent. Antworte höflich und informativ auf Deutsch.";

/// Build the system prompt for a turn. With files attached, the base
/// instruction is extended with the file-handling block.
pub(crate) fn system_prompt(has_files: bool) -> String {
    if has_files {
        format!(
            "{BASE_INSTRUCTION}\n\nDer Benutzer hat Dateien hochgeladen. Deren Inhalt ist in der Nachricht \
             unter der Markierung {FILE_CONTENT_MARKER} eingebettet. Lies die Dateiinhalte sorgfältig, \
             beziehe dich in deiner Antwort ausdrücklich auf sie und bestätige kurz, dass du sie gelesen hast."
        )
    } else {
        BASE_INSTRUCTION.to_string()
    }
}

/// Assemble the outgoing message sequence: system prompt, replayed
/// history, current user message.
///
/// Callers differ in whether they append the current turn to their local
/// history before sending. A trailing history entry that duplicates the
/// current message is skipped, so the current turn is never sent twice.
pub(crate) fn assemble(system_prompt: String, history: &[ChatMessage], message: &str) -> Vec<ChatMessage> {
    let replay = match history.last() {
        Some(last) if last.role == Role::User && last.content == message => &history[..history.len() - 1],
        _ => history,
    };

    let mut outgoing = Vec::with_capacity(replay.len() + 2);

    outgoing.push(ChatMessage {
        role: Role::System,
        content: system_prompt,
    });

    outgoing.extend(replay.iter().cloned());

    outgoing.push(ChatMessage {
        role: Role::User,
        content: message.to_string(),
    });

    outgoing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn first_turn_produces_system_and_user() {
        let outgoing = assemble(system_prompt(false), &[], "Hallo");

        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].role, Role::System);
        assert_eq!(outgoing[1], turn(Role::User, "Hallo"));
    }

    #[test]
    fn history_is_replayed_in_order() {
        let history = vec![turn(Role::User, "A"), turn(Role::Assistant, "B")];
        let outgoing = assemble(system_prompt(false), &history, "C");

        assert_eq!(outgoing.len(), 4);
        assert_eq!(outgoing[1], turn(Role::User, "A"));
        assert_eq!(outgoing[2], turn(Role::Assistant, "B"));
        assert_eq!(outgoing[3], turn(Role::User, "C"));
    }

    #[test]
    fn pre_appended_current_turn_is_not_sent_twice() {
        let history = vec![
            turn(Role::User, "A"),
            turn(Role::Assistant, "B"),
            turn(Role::User, "C"),
        ];
        let outgoing = assemble(system_prompt(false), &history, "C");

        assert_eq!(outgoing.len(), 4);
        assert_eq!(outgoing[1], turn(Role::User, "A"));
        assert_eq!(outgoing[2], turn(Role::Assistant, "B"));
        assert_eq!(outgoing[3], turn(Role::User, "C"));
    }

    #[test]
    fn trailing_assistant_turn_is_kept_even_if_content_matches() {
        let history = vec![turn(Role::Assistant, "C")];
        let outgoing = assemble(system_prompt(false), &history, "C");

        assert_eq!(outgoing.len(), 3);
        assert_eq!(outgoing[1], turn(Role::Assistant, "C"));
    }

    #[test]
    fn file_prompt_includes_marker_instruction() {
        let prompt = system_prompt(true);

        assert!(prompt.starts_with("Du bist ein hilfsreicher AI-Assistent."));
        assert!(prompt.contains(FILE_CONTENT_MARKER));
        assert!(prompt.contains("Dateien hochgeladen"));
    }

    #[test]
    fn text_only_prompt_has_no_file_instruction() {
        let prompt = system_prompt(false);
        assert!(!prompt.contains(FILE_CONTENT_MARKER));
    }
}
