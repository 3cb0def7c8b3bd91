//! Deferred cosmetic cues
//!
//! Terminal commands and the boot sequence print over time. Rather than
//! reaching for host timers, they hand back [`Scheduled`] cues that the host
//! pumps from its frame loop. Nothing here touches simulation state.

use crate::platform::LineStyle;

/// Something the host should present
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Line {
        text: String,
        style: Option<LineStyle>,
    },
    Glitch {
        duration_ms: u32,
    },
    /// Boot sequence finished; reveal the start screen
    BootComplete,
}

impl Cue {
    pub fn line(text: impl Into<String>) -> Self {
        Cue::Line {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: LineStyle) -> Self {
        Cue::Line {
            text: text.into(),
            style: Some(style),
        }
    }
}

/// A cue with its delay from the moment it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub delay_ms: f64,
    pub cue: Cue,
}

impl Scheduled {
    pub fn after(delay_ms: f64, cue: Cue) -> Self {
        Self { delay_ms, cue }
    }
}

struct Pending {
    due_ms: f64,
    seq: u64,
    cue: Cue,
}

/// Cues waiting for their time, released in due order
#[derive(Default)]
pub struct CueQueue {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_ms: f64, cue: Cue) {
        self.pending.push(Pending {
            due_ms: self.now_ms + delay_ms.max(0.0),
            seq: self.next_seq,
            cue,
        });
        self.next_seq += 1;
    }

    pub fn extend(&mut self, cues: impl IntoIterator<Item = Scheduled>) {
        for scheduled in cues {
            self.schedule(scheduled.delay_ms, scheduled.cue);
        }
    }

    /// Move the clock forward and take every cue that came due. Cues due at the
    /// same instant keep their scheduling order.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<Cue> {
        self.now_ms += delta_ms.max(0.0);
        let now = self.now_ms;

        let (mut due, waiting): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.cue).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(cues: &[Cue]) -> Vec<&str> {
        cues.iter()
            .filter_map(|c| match c {
                Cue::Line { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_releases_in_due_order() {
        let mut queue = CueQueue::new();
        queue.schedule(300.0, Cue::line("late"));
        queue.schedule(100.0, Cue::line("early"));
        queue.schedule(0.0, Cue::line("now"));

        assert_eq!(texts(&queue.advance(0.0)), vec!["now"]);
        assert_eq!(texts(&queue.advance(150.0)), vec!["early"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(texts(&queue.advance(1000.0)), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_instant_keeps_schedule_order() {
        let mut queue = CueQueue::new();
        queue.schedule(50.0, Cue::line("a"));
        queue.schedule(50.0, Cue::line("b"));
        queue.schedule(20.0, Cue::Glitch { duration_ms: 100 });

        let out = queue.advance(60.0);
        assert_eq!(out[0], Cue::Glitch { duration_ms: 100 });
        assert_eq!(texts(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_delay_is_relative_to_schedule_time() {
        let mut queue = CueQueue::new();
        queue.advance(1000.0);
        queue.extend([Scheduled::after(200.0, Cue::BootComplete)]);
        assert!(queue.advance(100.0).is_empty());
        assert_eq!(queue.advance(100.0), vec![Cue::BootComplete]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut queue = CueQueue::new();
        queue.schedule(10.0, Cue::line("gone"));
        queue.clear();
        assert!(queue.advance(100.0).is_empty());
    }
}
