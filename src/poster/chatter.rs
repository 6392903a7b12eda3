//! Outgoing chat transport used by the poster.

use mockall::automock;

/// Sends messages into chat rooms.
///
/// Sending is fire-and-forget: implementations log delivery failures and never
/// report them back.
#[automock]
pub trait Chatter {
    /// Sends a plain text message.
    async fn send_text(&self, room_id: &str, text: &str);
    /// Sends a message with a plain text body and an HTML rendering.
    async fn send_formatted_text(&self, room_id: &str, text: &str, html: &str);
}

/// A message captured by [`RecordingChatter`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub room_id: String,
    pub text: String,
    pub html: Option<String>,
}

/// Chatter that keeps every sent message for later inspection.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingChatter {
    sent: std::sync::Arc<std::sync::Mutex<Vec<SentMessage>>>,
}

#[cfg(test)]
impl RecordingChatter {
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Polls until at least `count` messages were sent, for up to two seconds.
    pub async fn wait_for(&self, count: usize) -> bool {
        for _ in 0..200 {
            if self.count() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }

    fn record(&self, room_id: &str, text: &str, html: Option<&str>) {
        self.sent.lock().unwrap().push(SentMessage {
            room_id: room_id.to_owned(),
            text: text.to_owned(),
            html: html.map(str::to_owned),
        });
    }
}

#[cfg(test)]
impl Chatter for RecordingChatter {
    async fn send_text(&self, room_id: &str, text: &str) {
        self.record(room_id, text, None);
    }

    async fn send_formatted_text(&self, room_id: &str, text: &str, html: &str) {
        self.record(room_id, text, Some(html));
    }
}
