use scds_types::{Object, Revision};
use tracing::debug;

/// Fold one revision into an accumulating object state.
///
/// Sets version and time from the revision, applies additions, removals,
/// and changes to the value, and appends the revision to the history.
/// Revisions must be applied in ascending version order from
/// [`Object::empty`].
pub fn apply_revision(mut state: Object, revision: &Revision) -> Object {
    state.version = revision.version;
    state.time = revision.time;

    for (field, value) in &revision.additions {
        state.value.insert(field.clone(), value.clone());
    }
    for field in revision.removals.keys() {
        state.value.remove(field);
    }
    for (field, change) in &revision.changes {
        state.value.insert(field.clone(), change.after.clone());
    }

    state.history.push(revision.clone());
    state
}

/// Deterministic replay of object histories.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Rebuild the object from its full history.
    pub fn replay(object: &Object) -> Object {
        Self::replay_while(object, |_| true)
    }

    /// The object as of `version`.
    ///
    /// Version `0` is never found. A version past the latest clamps to the
    /// current state.
    pub fn at_version(object: &Object, version: u64) -> Option<Object> {
        if version == 0 {
            return None;
        }
        let state = Self::replay_while(object, |rev| rev.version <= version);
        debug!(key = %object.key, requested = version, resolved = state.version, "replayed to version");
        state.exists().then_some(state)
    }

    /// The object as of UNIX time `time`.
    ///
    /// A time before the first revision is not found.
    pub fn at_time(object: &Object, time: i64) -> Option<Object> {
        let state = Self::replay_while(object, |rev| rev.time <= time);
        debug!(key = %object.key, time, resolved = state.version, "replayed to time");
        state.exists().then_some(state)
    }

    fn replay_while(object: &Object, keep: impl Fn(&Revision) -> bool) -> Object {
        object
            .history
            .iter()
            .take_while(|rev| keep(rev))
            .fold(Object::empty(object.id, object.key.clone()), apply_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scds_types::{Change, Document};
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    /// Build an object by committing each state in turn, one second apart.
    fn commit_all(states: &[Document]) -> Object {
        let mut obj = Object::empty(scds_types::ObjectId::new(), "bob");
        for state in states {
            if let Some(rev) = scds_diff::diff(&obj.value, state) {
                let rev = rev.stamp(obj.version + 1, 1000 + obj.version as i64 * 10);
                obj = apply_revision(obj, &rev);
            }
        }
        obj
    }

    fn bob() -> Object {
        commit_all(&[
            doc(json!({"name": "Bob"})),
            doc(json!({"name": "Bob", "email": "bob@smith.net"})),
            doc(json!({"name": "Robert", "email": "bob@smith.net"})),
        ])
    }

    // -----------------------------------------------------------------------
    // apply_revision
    // -----------------------------------------------------------------------

    #[test]
    fn apply_sets_value_version_and_time() {
        let mut rev = Revision::default().stamp(1, 500);
        rev.additions.insert("name".into(), json!("Bob"));
        let obj = apply_revision(Object::empty(scds_types::ObjectId::new(), "bob"), &rev);
        assert_eq!(obj.version, 1);
        assert_eq!(obj.time, 500);
        assert_eq!(obj.value, doc(json!({"name": "Bob"})));
        assert_eq!(obj.history, vec![rev]);
    }

    #[test]
    fn apply_handles_all_three_categories() {
        let start = commit_all(&[doc(json!({"keep": 1, "drop": 2, "edit": 3}))]);
        let mut rev = Revision::default().stamp(2, 2000);
        rev.additions.insert("new".into(), json!(true));
        rev.removals.insert("drop".into(), json!(2));
        rev.changes.insert("edit".into(), Change::new(json!(3), json!(4)));

        let obj = apply_revision(start, &rev);
        assert_eq!(obj.value, doc(json!({"keep": 1, "edit": 4, "new": true})));
        assert_eq!(obj.version, 2);
        assert_eq!(obj.history.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Time travel
    // -----------------------------------------------------------------------

    #[test]
    fn replay_reproduces_current_state() {
        let obj = bob();
        let replayed = ReplayEngine::replay(&obj);
        assert_eq!(replayed, obj);
    }

    #[test]
    fn at_version_zero_is_not_found() {
        assert!(ReplayEngine::at_version(&bob(), 0).is_none());
    }

    #[test]
    fn at_version_truncates_history() {
        let obj = bob();
        let v2 = ReplayEngine::at_version(&obj, 2).unwrap();
        assert_eq!(v2.id, obj.id);
        assert_eq!(v2.key, "bob");
        assert_eq!(v2.version, 2);
        assert_eq!(v2.time, obj.history[1].time);
        assert_eq!(v2.value, doc(json!({"name": "Bob", "email": "bob@smith.net"})));
        assert_eq!(v2.history, obj.history[..2].to_vec());
    }

    #[test]
    fn at_version_current_and_beyond_clamp() {
        let obj = bob();
        assert_eq!(ReplayEngine::at_version(&obj, 3).unwrap().value, obj.value);
        let clamped = ReplayEngine::at_version(&obj, 99).unwrap();
        assert_eq!(clamped.version, 3);
        assert_eq!(clamped.value, obj.value);
    }

    #[test]
    fn at_time_before_creation_is_not_found() {
        let obj = bob();
        assert!(ReplayEngine::at_time(&obj, 999).is_none());
    }

    #[test]
    fn at_time_uses_inclusive_cutoff() {
        let obj = bob();
        // Revisions are committed at 1000, 1010, 1020.
        assert_eq!(ReplayEngine::at_time(&obj, 1000).unwrap().version, 1);
        assert_eq!(ReplayEngine::at_time(&obj, 1015).unwrap().version, 2);
        assert_eq!(ReplayEngine::at_time(&obj, 1020).unwrap().version, 3);
    }

    #[test]
    fn at_time_after_latest_is_current() {
        let obj = bob();
        let latest = ReplayEngine::at_time(&obj, i64::MAX).unwrap();
        assert_eq!(latest.value, obj.value);
        assert_eq!(latest.version, obj.version);
    }

    #[test]
    fn object_without_history_is_not_found() {
        let obj = bob().without_history();
        assert!(ReplayEngine::at_version(&obj, 1).is_none());
        assert!(ReplayEngine::at_time(&obj, i64::MAX).is_none());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn document() -> impl Strategy<Value = Document> {
        prop::collection::btree_map("[a-d]", (0i64..3).prop_map(Value::from), 0..4)
    }

    proptest! {
        #[test]
        fn replay_matches_materialized_value(states in prop::collection::vec(document(), 1..8)) {
            let obj = commit_all(&states);
            let replayed = ReplayEngine::replay(&obj);
            prop_assert_eq!(&replayed.value, &obj.value);
            if obj.exists() {
                let current = ReplayEngine::at_version(&obj, obj.version).unwrap();
                prop_assert_eq!(current.value, obj.value);
            }
        }

        #[test]
        fn versions_are_dense(states in prop::collection::vec(document(), 1..8)) {
            let obj = commit_all(&states);
            for (i, rev) in obj.history.iter().enumerate() {
                prop_assert_eq!(rev.version, i as u64 + 1);
                prop_assert!(!rev.is_empty());
            }
        }
    }
}
