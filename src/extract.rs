use crate::message::Message;

/// Text handed to the parsers: every plain-text fragment, or every HTML
/// fragment when there is no plain text, joined verbatim. Empty text counts
/// as absent.
pub(crate) fn extract_text(message: &Message) -> Option<String> {
    let fragments = if !message.body.plain.is_empty() {
        &message.body.plain
    } else if !message.body.html.is_empty() {
        &message.body.html
    } else {
        return None;
    };
    let text = fragments.concat();
    (!text.is_empty()).then_some(text)
}
