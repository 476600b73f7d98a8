use std::time::{Duration, Instant};

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(1800);

/// Single transient notification, replaced by each new message
#[derive(Default)]
pub struct Toast {
    current: Option<(String, Instant)>,
}

impl Toast {
    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some((message.into(), now));
    }

    /// Message still on screen at `now`
    pub fn visible(&self, now: Instant) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|(_, shown)| now.duration_since(*shown) < TOAST_DURATION)
            .map(|(msg, _)| msg.as_str())
    }

    pub fn expire(&mut self, now: Instant) {
        if self.visible(now).is_none() {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let start = Instant::now();
        let mut toast = Toast::default();
        toast.show("Added", start);
        assert_eq!(toast.visible(start + Duration::from_millis(500)), Some("Added"));
        assert_eq!(toast.visible(start + TOAST_DURATION), None);
    }

    #[test]
    fn test_new_message_replaces_old() {
        let start = Instant::now();
        let mut toast = Toast::default();
        toast.show("Added", start);
        toast.show("Already added", start + Duration::from_millis(100));
        assert_eq!(toast.visible(start + Duration::from_millis(1850)), Some("Already added"));
    }
}
