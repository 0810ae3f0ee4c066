// client/decode.rs
// Lenient decoders for façade responses.

use quick_xml::Reader;
use quick_xml::events::Event;

const NAME_TAG: &[u8] = b"Name";

/// Collects the text of every `<Name>` element, at any depth, in document order.
///
/// The envelope around the names is ignored. Decoding never fails: the first
/// malformed token ends the scan and the names read so far are returned.
pub fn parse_all_names(data: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut names = Vec::new();

    // Text of the `<Name>` currently open, and elements nested inside it.
    // Only the name's own character data counts; nested elements are skipped.
    let mut current: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if current.is_some() {
                    depth += 1;
                } else if e.local_name().as_ref() == NAME_TAG {
                    current = Some(String::new());
                }
            }
            Ok(Event::Empty(e)) => {
                if current.is_none() && e.local_name().as_ref() == NAME_TAG {
                    names.push(String::new());
                }
            }
            Ok(Event::Text(t)) if depth == 0 => {
                if let Some(text) = current.as_mut() {
                    match t.unescape() {
                        Ok(s) => text.push_str(&s),
                        Err(_) => break,
                    }
                }
            }
            Ok(Event::CData(c)) if depth == 0 => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(_)) => {
                if depth > 0 {
                    depth -= 1;
                } else if let Some(name) = current.take() {
                    names.push(name);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
        buf.clear();
    }

    names
}

/// Summarises an error body as `"Code: Message"` by scanning for the
/// `<Code>` and `<Message>` markers.
///
/// Bodies without a `<Code>` marker come back verbatim, so raw backend
/// errors still reach the user. A missing `<Message>` leaves the message empty.
pub fn parse_s3_error(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);

    let Some((_, after_code)) = text.split_once("<Code>") else {
        return text.into_owned();
    };
    let code = after_code
        .split_once("</Code>")
        .map_or(after_code, |(code, _)| code);

    let message = text
        .split_once("<Message>")
        .map(|(_, rest)| rest.split_once("</Message>").map_or(rest, |(msg, _)| msg))
        .unwrap_or("");

    format!("{}: {}", code, message)
}
