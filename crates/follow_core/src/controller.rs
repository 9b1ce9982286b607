//! Follow-mode orchestration.

use shared::{
    domain::{FrameId, FramePosition},
    error::FollowError,
    protocol::Envelope,
};
use tracing::debug;

use crate::{
    producer::HintKeyProducer,
    store::{FollowAction, FollowState, Store},
    transport::ContextTree,
};

/// Alphabet hint labels are drawn from unless the embedder overrides it.
pub const DEFAULT_HINT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Orchestrates one context's side of hint-selection mode.
///
/// Owns the state store, the accumulated label set and, while an
/// activation is live, the label generator. Every entry point runs
/// synchronously to completion: store dispatches apply immediately, and an
/// internal diff loop drains the resulting reactions before the entry
/// point returns. The generator exists exactly from Counting-entry to
/// Idle-entry; its presence is what marks an activation as live.
pub struct FollowController<T> {
    tree: T,
    store: Store,
    /// Last-observed snapshot, diffed against the store after dispatches.
    prev: FollowState,
    /// Accumulated labels across all frames, generation order.
    keys: Vec<String>,
    producer: Option<HintKeyProducer>,
    charset: String,
}

impl<T: ContextTree> FollowController<T> {
    pub fn new(tree: T) -> Self {
        Self::with_charset(tree, DEFAULT_HINT_CHARSET)
    }

    pub fn with_charset(tree: T, charset: &str) -> Self {
        Self {
            tree,
            store: Store::new(),
            prev: FollowState::default(),
            keys: Vec::new(),
            producer: None,
            charset: charset.to_owned(),
        }
    }

    /// Accumulated labels, generation order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Current store snapshot.
    pub fn state(&self) -> &FollowState {
        self.store.state()
    }

    /// Transport-boundary entry point: a decoded envelope plus the frame
    /// it came from.
    ///
    /// Message kinds this controller only ever emits are ignored on
    /// arrival. The single error case is a count response with no live
    /// activation; callers log it and move on.
    pub fn on_message(&mut self, envelope: Envelope, sender: FrameId) -> Result<(), FollowError> {
        match envelope {
            Envelope::Start { new_tab } => {
                self.dispatch(FollowAction::Enable { new_tab });
                Ok(())
            }
            Envelope::ResponseCountTargets { count } => self.create(count, sender),
            Envelope::KeyPress { key } => {
                self.key_press(&key);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Keyboard entry point. Always reports the key as handled; keys
    /// outside the dispatch table and the hint alphabet cause no state
    /// action at all.
    pub fn key_press(&mut self, key: &str) -> bool {
        match key {
            "Enter" => {
                self.activate();
                self.dispatch(FollowAction::Disable);
            }
            "Escape" => self.dispatch(FollowAction::Disable),
            "Backspace" | "Delete" => self.dispatch(FollowAction::Backspace),
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if self.charset.contains(c) {
                        self.dispatch(FollowAction::KeyPress { key: c });
                    }
                }
            }
        }
        true
    }

    fn dispatch(&mut self, action: FollowAction) {
        self.store.dispatch(action);
        self.sync();
    }

    /// Drain store diffs until the snapshot is quiescent.
    ///
    /// A reaction may itself dispatch (auto-commit requests disable); the
    /// induced diff is picked up on the next pass, so the removal
    /// broadcast follows the messages of the tick that caused it.
    fn sync(&mut self) {
        loop {
            let current = self.store.state().clone();
            if current == self.prev {
                return;
            }
            let prev = std::mem::replace(&mut self.prev, current.clone());
            if !prev.enabled && current.enabled {
                self.count();
            } else if prev.enabled && !current.enabled {
                self.remove();
            } else if prev.keys != current.keys {
                self.update_hints(&current.keys);
            }
        }
    }

    /// Counting-entry: fresh generator, then a geometry-tagged count
    /// request to the owning frame and each direct child. Grandchildren
    /// are never addressed.
    fn count(&mut self) {
        self.producer = Some(HintKeyProducer::new(&self.charset));
        let view_size = self.tree.view_size();
        let children = self.tree.child_frames();
        debug!(frames = children.len() + 1, "follow: requesting target counts");

        self.tree.send_to(
            self.tree.self_frame(),
            &Envelope::RequestCountTargets {
                view_size,
                frame_position: FramePosition::ORIGIN,
            },
        );
        for child in children {
            self.tree.send_to(
                child.frame,
                &Envelope::RequestCountTargets {
                    view_size,
                    frame_position: child.position,
                },
            );
        }
    }

    /// One frame reported its target count: draw that many fresh labels
    /// from the shared generator and unicast the slice back to the origin.
    /// Slices are disjoint by construction; the generator never repeats.
    fn create(&mut self, count: usize, sender: FrameId) -> Result<(), FollowError> {
        let producer = self
            .producer
            .as_mut()
            .ok_or(FollowError::NoActiveActivation)?;
        let produced: Vec<String> = (0..count).map(|_| producer.produce()).collect();
        self.keys.extend(produced.iter().cloned());
        debug!(
            count,
            frame = sender.0,
            total = self.keys.len(),
            "follow: assigned hint labels"
        );

        self.tree.send_to(
            sender,
            &Envelope::CreateHints {
                keys_array: produced,
                new_tab: self.prev.new_tab,
            },
        );
        Ok(())
    }

    /// Typed prefix changed: re-filter, auto-commit on a unique match,
    /// and broadcast the prefix either way.
    fn update_hints(&mut self, typed: &str) {
        let shown = self.keys.iter().filter(|k| k.starts_with(typed)).count();
        if shown == 1 {
            self.activate();
            // Raw dispatch: the disable diff is reacted to after this
            // tick's own broadcasts have gone out.
            self.store.dispatch(FollowAction::Disable);
        }

        self.tree.broadcast(&Envelope::ShowHints {
            keys: typed.to_owned(),
        });
    }

    fn activate(&mut self) {
        self.tree.broadcast(&Envelope::Activate {
            keys: self.prev.keys.clone(),
        });
    }

    /// Idle-entry: labels and generator are discarded, every frame tears
    /// down its hints. A count reply landing after this point fails the
    /// generator guard in [`Self::create`].
    fn remove(&mut self) {
        self.keys.clear();
        self.producer = None;
        self.tree.broadcast(&Envelope::RemoveHints);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
