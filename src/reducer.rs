//! Mutation reducer.
//!
//! Maps one mutation (an incoming update or a fired lifecycle timer) onto
//! the buffer and reports the timer work it implies as [`Effect`]s. The
//! reducer never touches a clock or a timer; the scheduler enacts the
//! effects afterwards, so every transition can be checked without real
//! time passing.

use crate::buffer::{DisplayEntry, EntryKey, EntryTimers, Insert, MessageBuffer, Phase, Removed};
use crate::config::LifecycleTimings;
use crate::lifecycle::TimerKind;
use crate::types::{MessageUpdate, Millis, UpdateKind};
use std::time::Duration;
use tracing::debug;

/// Input to the reducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// An update delivered by the connection adapter.
    Update(MessageUpdate),
    /// A lifecycle timer fired for an entry.
    Timer { key: EntryKey, kind: TimerKind },
}

/// Timer work requested by a reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Start a timer for `key` that fires `after` from now.
    Schedule {
        key: EntryKey,
        kind: TimerKind,
        after: Duration,
    },
    /// Cancel the still-pending timers of an entry that left the buffer.
    Cancel { key: EntryKey, timers: EntryTimers },
}

/// Result of reducing one mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reduction {
    pub effects: Vec<Effect>,
    /// Whether anything a projection can see changed.
    pub changed: bool,
}

impl Reduction {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            changed: true,
        }
    }
}

/// Apply one mutation to the buffer.
///
/// `now` is the stream time at which the mutation happens. For timers this
/// is the timer's deadline, so chained transitions line up exactly.
pub fn reduce(
    buffer: &mut MessageBuffer,
    timings: &LifecycleTimings,
    now: Millis,
    mutation: Mutation,
) -> Reduction {
    match mutation {
        Mutation::Update(update) => reduce_update(buffer, timings, now, update),
        Mutation::Timer { key, kind } => reduce_timer(buffer, timings, key, kind),
    }
}

fn reduce_update(
    buffer: &mut MessageBuffer,
    timings: &LifecycleTimings,
    now: Millis,
    update: MessageUpdate,
) -> Reduction {
    let MessageUpdate { kind, message } = update;

    match kind {
        UpdateKind::New => {
            if buffer.contains(&message.id) {
                debug!(id = %message.id, "ignoring new update for resident id");
                return Reduction::unchanged();
            }

            let key = buffer.next_key(message.id.clone());
            let entry = DisplayEntry::new(key.clone(), message, now);

            match buffer.insert(entry) {
                Insert::Added { evicted } => {
                    let mut effects = vec![
                        Effect::Schedule {
                            key: key.clone(),
                            kind: TimerKind::Settle,
                            after: timings.settle,
                        },
                        Effect::Schedule {
                            key,
                            kind: TimerKind::Fade,
                            after: timings.display_timeout,
                        },
                    ];
                    if let Some(removed) = evicted {
                        effects.push(cancel(removed));
                    }
                    Reduction::changed(effects)
                }
                Insert::Duplicate(_) => Reduction::unchanged(),
            }
        }

        UpdateKind::Edit => match buffer.find_by_id_mut(&message.id) {
            Some(entry) => {
                entry.message = message;
                entry.edited = true;
                Reduction::changed(Vec::new())
            }
            None => {
                debug!(id = %message.id, "ignoring edit for unknown id");
                Reduction::unchanged()
            }
        },

        UpdateKind::Delete => match buffer.find_by_id_mut(&message.id) {
            Some(entry) if entry.delete_requested => Reduction::unchanged(),
            Some(entry) => {
                // Hidden at once; the entry stays until its own timeline removes it
                entry.delete_requested = true;
                Reduction::changed(Vec::new())
            }
            None => {
                debug!(id = %message.id, "ignoring delete for unknown id");
                Reduction::unchanged()
            }
        },
    }
}

fn reduce_timer(
    buffer: &mut MessageBuffer,
    timings: &LifecycleTimings,
    key: EntryKey,
    kind: TimerKind,
) -> Reduction {
    match kind {
        TimerKind::Settle => match buffer.find_by_key_mut(&key) {
            Some(entry) if entry.phase == Phase::Init => {
                entry.phase = Phase::Loaded;
                Reduction::changed(Vec::new())
            }
            Some(_) => Reduction::unchanged(),
            None => stale(&key, kind),
        },

        TimerKind::Fade => match buffer.find_by_key_mut(&key) {
            Some(entry) if entry.phase == Phase::Removing => Reduction::unchanged(),
            Some(entry) => {
                entry.phase = Phase::Removing;
                Reduction::changed(vec![Effect::Schedule {
                    key,
                    kind: TimerKind::Destroy,
                    after: timings.post_fade,
                }])
            }
            None => stale(&key, kind),
        },

        TimerKind::Destroy => match buffer.remove_by_key(&key) {
            Some(removed) => Reduction::changed(vec![cancel(removed)]),
            None => stale(&key, kind),
        },
    }
}

fn cancel(removed: Removed) -> Effect {
    Effect::Cancel {
        key: removed.entry.key,
        timers: removed.timers,
    }
}

fn stale(key: &EntryKey, kind: TimerKind) -> Reduction {
    debug!(?key, ?kind, "timer fired for an entry no longer resident");
    Reduction::unchanged()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::TimerId;
    use crate::types::{Message, MessageId, Source};

    fn message(id: &str, content: &str) -> Message {
        Message::text(Source::Twitch, id, "viewer", content)
    }

    fn apply(buffer: &mut MessageBuffer, update: MessageUpdate) -> Reduction {
        reduce(
            buffer,
            &LifecycleTimings::default(),
            Millis::ZERO,
            Mutation::Update(update),
        )
    }

    fn key_of(buffer: &MessageBuffer, id: &str) -> EntryKey {
        buffer.find_by_id(&MessageId::from(id)).unwrap().key.clone()
    }

    #[test]
    fn test_new_schedules_settle_and_fade() {
        let mut buffer = MessageBuffer::new(10);
        let reduction = apply(&mut buffer, MessageUpdate::new(message("m1", "hi")));

        assert!(reduction.changed);
        let key = key_of(&buffer, "m1");
        assert_eq!(
            reduction.effects,
            vec![
                Effect::Schedule {
                    key: key.clone(),
                    kind: TimerKind::Settle,
                    after: Duration::from_millis(5),
                },
                Effect::Schedule {
                    key,
                    kind: TimerKind::Fade,
                    after: Duration::from_millis(60_000),
                },
            ]
        );
        assert_eq!(buffer.find_by_id(&"m1".into()).unwrap().phase, Phase::Init);
    }

    #[test]
    fn test_eviction_cancels_evicted_timers() {
        let mut buffer = MessageBuffer::new(1);
        apply(&mut buffer, MessageUpdate::new(message("a", "first")));
        let evicted_key = key_of(&buffer, "a");
        buffer
            .attach_timer(&evicted_key, TimerKind::Fade, TimerId(9))
            .unwrap();

        let reduction = apply(&mut buffer, MessageUpdate::new(message("b", "second")));

        let cancels: Vec<_> = reduction
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Cancel { key, timers } => Some((key.clone(), timers.fade)),
                _ => None,
            })
            .collect();
        assert_eq!(cancels, vec![(evicted_key, Some(TimerId(9)))]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_edit_replaces_content_in_place() {
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));
        apply(&mut buffer, MessageUpdate::new(message("b", "two")));

        let reduction = apply(&mut buffer, MessageUpdate::edit(message("a", "uno")));
        assert!(reduction.changed);
        assert!(reduction.effects.is_empty());

        let entries = buffer.entries();
        assert_eq!(entries[0].id().as_str(), "a");
        assert!(entries[0].edited);
        assert_eq!(entries[0].phase, Phase::Init);
        assert_eq!(
            entries[0].message.message_parts,
            message("a", "uno").message_parts
        );
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));

        let edit = apply(&mut buffer, MessageUpdate::edit(message("zzz", "x")));
        let delete = apply(&mut buffer, MessageUpdate::delete(message("zzz", "x")));

        assert_eq!(edit, Reduction::unchanged());
        assert_eq!(delete, Reduction::unchanged());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));

        let first = apply(&mut buffer, MessageUpdate::delete(message("a", "")));
        let after_first = buffer.entries();
        let second = apply(&mut buffer, MessageUpdate::delete(message("a", "")));

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(buffer.entries(), after_first);
        assert!(after_first[0].is_hidden());
    }

    #[test]
    fn test_duplicate_new_is_ignored() {
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));
        let reduction = apply(&mut buffer, MessageUpdate::new(message("a", "again")));

        assert!(!reduction.changed);
        assert!(reduction.effects.is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_timer_transitions() {
        let timings = LifecycleTimings::default();
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));
        let key = key_of(&buffer, "a");

        let timer = |kind| Mutation::Timer {
            key: key.clone(),
            kind,
        };

        assert!(reduce(&mut buffer, &timings, Millis(5), timer(TimerKind::Settle)).changed);
        assert_eq!(buffer.find_by_id(&"a".into()).unwrap().phase, Phase::Loaded);

        let fade = reduce(&mut buffer, &timings, Millis(60_000), timer(TimerKind::Fade));
        assert_eq!(
            fade.effects,
            vec![Effect::Schedule {
                key: key.clone(),
                kind: TimerKind::Destroy,
                after: Duration::from_millis(500),
            }]
        );
        assert_eq!(buffer.find_by_id(&"a".into()).unwrap().phase, Phase::Removing);

        let destroy = reduce(&mut buffer, &timings, Millis(60_500), timer(TimerKind::Destroy));
        assert!(destroy.changed);
        assert!(buffer.is_empty());

        // A second firing against the removed entry does nothing
        let again = reduce(&mut buffer, &timings, Millis(60_500), timer(TimerKind::Destroy));
        assert_eq!(again, Reduction::unchanged());
    }

    #[test]
    fn test_settle_never_regresses_fading_entry() {
        let timings = LifecycleTimings::default();
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));
        let key = key_of(&buffer, "a");

        reduce(
            &mut buffer,
            &timings,
            Millis(1),
            Mutation::Timer {
                key: key.clone(),
                kind: TimerKind::Fade,
            },
        );
        let settle = reduce(
            &mut buffer,
            &timings,
            Millis(5),
            Mutation::Timer {
                key,
                kind: TimerKind::Settle,
            },
        );

        assert!(!settle.changed);
        assert_eq!(buffer.find_by_id(&"a".into()).unwrap().phase, Phase::Removing);
    }

    #[test]
    fn test_stale_generation_timer_is_noop() {
        let timings = LifecycleTimings::default();
        let mut buffer = MessageBuffer::new(10);
        apply(&mut buffer, MessageUpdate::new(message("a", "one")));
        let old_key = key_of(&buffer, "a");

        buffer.remove_by_id(&"a".into());
        apply(&mut buffer, MessageUpdate::new(message("a", "reborn")));

        let reduction = reduce(
            &mut buffer,
            &timings,
            Millis(60_500),
            Mutation::Timer {
                key: old_key,
                kind: TimerKind::Destroy,
            },
        );
        assert!(!reduction.changed);
        assert_eq!(buffer.len(), 1);
    }
}
