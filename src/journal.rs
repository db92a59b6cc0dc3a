use crate::chord::{Chord, ChordSnapshot};

/// Default maximum number of actions the journal retains before dropping the oldest.
pub const DEFAULT_CAP: usize = 50;

/// A single undoable transform: the chord indices it touched, their before/after snapshots, a
/// human-readable description, and the time it was recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    indices: Vec<usize>,
    before: Vec<ChordSnapshot>,
    after: Vec<ChordSnapshot>,
    description: String,
    timestamp: std::time::SystemTime,
}

impl Action {
    /// Build an action from a chord index, its snapshot before mutation, and the chord's state
    /// after mutation (the latter is taken by the caller once the transform has run).
    pub fn new(
        indices: Vec<usize>,
        before: Vec<ChordSnapshot>,
        after: Vec<ChordSnapshot>,
        description: impl Into<String>,
        timestamp: std::time::SystemTime,
    ) -> Self {
        Action {
            indices,
            before,
            after,
            description: description.into(),
            timestamp,
        }
    }

    /// The chord indices this action touched.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// A human-readable description, e.g. `"transform chord 2 to Am"`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When this action was recorded (supplied by the caller, never sampled internally).
    pub fn timestamp(&self) -> std::time::SystemTime {
        self.timestamp
    }
}

/// The undo/redo log for a document's chord list.
///
/// The cursor points one past the last applied action: positions before it are undo-able,
/// positions from it onward (if any, after an undo) are redo-able. Recording a new action while
/// the cursor isn't at the end truncates the redo tail, matching ordinary editor undo semantics.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    actions: Vec<Action>,
    cursor: usize,
    cap: usize,
}

impl Journal {
    /// A new, empty journal with the default capacity.
    pub fn new() -> Self {
        Journal {
            actions: Vec::new(),
            cursor: 0,
            cap: DEFAULT_CAP,
        }
    }

    /// A new, empty journal with an explicit capacity.
    pub fn with_cap(cap: usize) -> Self {
        Journal {
            actions: Vec::new(),
            cursor: 0,
            cap,
        }
    }

    /// Truncate any redo tail, append `action`, and drop the oldest entry if over capacity.
    pub fn record(&mut self, action: Action) {
        self.actions.truncate(self.cursor);
        self.actions.push(action);
        self.cursor = self.actions.len();
        if self.actions.len() > self.cap {
            self.actions.remove(0);
            self.cursor -= 1;
        }
    }

    /// `true` if there is an action to undo.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// `true` if there is an action to redo.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.actions.len()
    }

    /// The description of the action [`Journal::undo`] would apply, if any.
    pub fn describe_undo(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.actions[self.cursor - 1].description())
    }

    /// The description of the action [`Journal::redo`] would apply, if any.
    pub fn describe_redo(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.actions[self.cursor].description())
    }

    /// Apply the before-state of the last undone-to action to `chords`, returning `true` if an
    /// action was undone.
    pub fn undo(&mut self, chords: &mut [Chord]) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        let action = &self.actions[self.cursor];
        for (&index, snapshot) in action.indices.iter().zip(action.before.iter()) {
            if let Some(chord) = chords.get_mut(index) {
                chord.restore(snapshot.clone());
            }
        }
        true
    }

    /// Apply the after-state of the next action to `chords`, returning `true` if an action was
    /// redone.
    pub fn redo(&mut self, chords: &mut [Chord]) -> bool {
        if !self.can_redo() {
            return false;
        }
        let action = &self.actions[self.cursor];
        for (&index, snapshot) in action.indices.iter().zip(action.after.iter()) {
            if let Some(chord) = chords.get_mut(index) {
                chord.restore(snapshot.clone());
            }
        }
        self.cursor += 1;
        true
    }

    /// Discard every action.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Chord;
    use std::time::SystemTime;

    fn chord(pitches: &[u8]) -> Chord {
        Chord::synthetic(pitches.to_vec(), 0, 480)
    }

    fn transform_and_record(journal: &mut Journal, chords: &mut [Chord], index: usize, new_pitches: &[u8]) {
        let before = chords[index].snapshot();
        chords[index].update(new_pitches.to_vec(), crate::chord::name_pitches(new_pitches));
        let after = chords[index].snapshot();
        journal.record(Action::new(
            vec![index],
            vec![before],
            vec![after],
            format!("transform chord {}", index),
            SystemTime::UNIX_EPOCH,
        ));
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut chords = vec![chord(&[60, 64, 67])];
        let initial = chords[0].clone();
        let mut journal = Journal::new();

        transform_and_record(&mut journal, &mut chords, 0, &[60, 64, 69]);
        let after_transform = chords[0].clone();

        assert!(journal.undo(&mut chords));
        assert_eq!(initial, chords[0]);

        assert!(journal.redo(&mut chords));
        assert_eq!(after_transform, chords[0]);
    }

    #[test]
    fn cannot_undo_empty_journal() {
        let mut chords = vec![chord(&[60, 64, 67])];
        let mut journal = Journal::new();
        assert!(!journal.undo(&mut chords));
        assert!(!journal.can_undo());
    }

    #[test]
    fn recording_after_undo_truncates_redo_tail() {
        let mut chords = vec![chord(&[60, 64, 67])];
        let mut journal = Journal::new();
        transform_and_record(&mut journal, &mut chords, 0, &[60, 64, 69]);
        journal.undo(&mut chords);
        transform_and_record(&mut journal, &mut chords, 0, &[60, 65, 68]);
        assert!(!journal.can_redo());
    }

    #[test]
    fn capacity_drops_oldest_action() {
        let mut chords = vec![chord(&[60, 64, 67])];
        let mut journal = Journal::with_cap(2);
        transform_and_record(&mut journal, &mut chords, 0, &[60, 64, 68]);
        transform_and_record(&mut journal, &mut chords, 0, &[60, 64, 69]);
        transform_and_record(&mut journal, &mut chords, 0, &[60, 64, 70]);
        assert_eq!(2, journal.actions.len());
    }
}
