//! Session flows against a JSON directory store.
//!
//! Load, annotate by gesture, save, reload, and browse other annotators'
//! work the way an annotation front end drives the engine.

use std::cell::RefCell;
use std::rc::Rc;

use tagspan::persist::LabelEntry;
use tagspan::{
    AnnotationRecord, DocumentFile, Error, GestureOutcome, JsonFileStore, OverlapPolicy,
    SessionConfig, Session, Span,
};
use tempfile::TempDir;

fn store_with(docs: &[(&str, &str)]) -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path(), "ann1");
    for (id, text) in docs {
        let mut doc = DocumentFile::new(*id, *text);
        doc.collection_id = "c1".into();
        doc.labels = vec![
            LabelEntry::Name("PERSON".into()),
            LabelEntry::Name("LOC".into()),
            LabelEntry::Name("NEWS".into()),
        ];
        store.write_document(&doc).unwrap();
    }
    (dir, store)
}

fn triples(session: &Session) -> Vec<(usize, usize, String)> {
    session
        .store()
        .annotations()
        .iter()
        .map(|a| (a.start(), a.end(), a.label.clone()))
        .collect()
}

#[test]
fn annotate_save_and_reload() {
    let (_dir, mut store) = store_with(&[("d1", "Bob met Alice in Paris")]);
    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();
    assert!(session.is_editable());
    assert!(!session.is_changed());

    // Bob
    session.click(0);
    session.confirm_label(0, "PERSON").unwrap();
    // Alice, dragged from the right
    session.press(4);
    session.release(4);
    session.confirm_label(4, "PERSON").unwrap();
    // in Paris
    session.press(6);
    assert_eq!(session.hover(8, true), GestureOutcome::Extended);
    assert_eq!(session.release(8), GestureOutcome::PopoverOpened);
    session.confirm_label(8, "LOC").unwrap();
    session.set_doc_label("NEWS", true).unwrap();

    assert!(session.is_changed());
    let outcome = session.save_with(&mut store, false).unwrap();
    assert!(outcome.saved);
    assert!(!session.is_changed());

    let mut reloaded = Session::new();
    reloaded.load_with(&mut store, "d1").unwrap();
    assert_eq!(
        triples(&reloaded),
        [
            (0, 3, "PERSON".to_string()),
            (8, 13, "PERSON".to_string()),
            (14, 22, "LOC".to_string()),
        ]
    );
    let news = reloaded
        .doc_labels()
        .into_iter()
        .find(|d| d.label.name == "NEWS")
        .unwrap();
    assert!(news.checked);
}

#[test]
fn relabel_and_remove_through_popover() {
    let (_dir, mut store) = store_with(&[("d1", "New York City")]);
    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();

    session.press(0);
    session.hover(2, true);
    session.hover(4, true);
    session.release(4);
    session.confirm_label(2, "LOC").unwrap();
    assert_eq!(triples(&session), [(0, 13, "LOC".to_string())]);

    // a click on an annotated, unselected token starts a new selection
    assert_eq!(session.click(2), GestureOutcome::Started);
    assert_eq!(session.request_removal(2), GestureOutcome::Cleared);
    assert_eq!(session.store().len(), 1);

    // the popover on an annotated token relabels the whole annotation
    let outcome = session.confirm_label(4, "PERSON").unwrap();
    assert_eq!(outcome, GestureOutcome::Applied { changes: 1 });
    assert_eq!(session.store().len(), 2);

    assert_eq!(
        session.request_removal(0),
        GestureOutcome::Applied { changes: 2 }
    );
    assert!(session.store().is_empty());
}

#[test]
fn forbid_policy_from_document() {
    let (_dir, mut store) = store_with(&[]);
    let mut doc = DocumentFile::new("d1", "Bob met Alice");
    doc.overlap = Some(OverlapPolicy::Forbid);
    doc.labels = vec![LabelEntry::Name("PERSON".into())];
    store.write_document(&doc).unwrap();

    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();
    assert_eq!(session.overlap(), OverlapPolicy::Forbid);

    session.click(2);
    session.confirm_label(2, "PERSON").unwrap();

    session.click(0);
    assert_eq!(session.press(2), GestureOutcome::Ignored);
    assert_eq!(session.press(4), GestureOutcome::Ignored);
    assert_eq!(session.selection().span(), Some(Span::new(0, 3)));
}

#[test]
fn config_defaults_fill_silent_documents() {
    let dir = TempDir::new().unwrap();
    let config = SessionConfig::from_toml_str(
        "overlap = \"forbid\"\n\n[[labels]]\nname = \"GENE\"\ncolor = \"#8fbc8f\"\n",
    )
    .unwrap();
    let mut store = JsonFileStore::new(dir.path(), "ann1").with_defaults(config);
    store
        .write_document(&DocumentFile::new("d1", "BRCA1 binds"))
        .unwrap();

    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();
    assert_eq!(session.overlap(), OverlapPolicy::Forbid);
    assert_eq!(session.labels().color_for("GENE"), "#8fbc8f");
}

#[test]
fn browse_other_annotators() {
    let (_dir, mut store) = store_with(&[("d1", "Bob met Alice")]);
    store
        .write_records(
            "d1",
            &[AnnotationRecord::new(
                "ann2",
                "c1",
                "d1",
                vec!["NEWS".to_string()],
                vec![tagspan::Annotation::new(Span::new(8, 13), "PERSON").unwrap()],
            )],
        )
        .unwrap();

    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();
    assert_eq!(session.others(), ["ann2".to_string()]);
    assert_eq!(session.doc_labels_of("ann2"), ["NEWS".to_string()]);

    session.click(0);
    session.confirm_label(0, "PERSON").unwrap();
    assert!(matches!(
        session.show_annotations_of(Some("ann2"), false),
        Err(Error::UnsavedChanges)
    ));

    session.show_annotations_of(Some("ann2"), true).unwrap();
    assert_eq!(session.showing(), Some("ann2"));
    assert!(!session.is_editable());
    assert_eq!(session.click(0), GestureOutcome::Suppressed);
    assert_eq!(triples(&session), [(8, 13, "PERSON".to_string())]);
    assert!(matches!(
        session.save_with(&mut store, false),
        Err(Error::ReadOnly(_))
    ));

    // back to our own, last saved state (nothing, the edit was discarded)
    session.show_annotations_of(None, false).unwrap();
    assert!(session.is_editable());
    assert!(session.store().is_empty());

    assert!(session.show_annotations_of(Some("nobody"), false).is_err());
}

#[test]
fn save_and_advance_walks_the_collection() {
    let (_dir, mut store) = store_with(&[("a", "one"), ("b", "two"), ("c", "three")]);
    let mut session = Session::new();
    let mut current = "a".to_string();
    let mut visited = Vec::new();

    loop {
        session.load_with(&mut store, &current).unwrap();
        visited.push(current.clone());
        session.set_doc_label("NEWS", true).unwrap();
        let outcome = session.save_with(&mut store, true).unwrap();
        match outcome.next_document {
            Some(next) => current = next,
            None => break,
        }
    }
    assert_eq!(visited, ["a", "b", "c"]);

    let records = store.read_records("b").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].creator_id, "ann1");
    assert_eq!(records[0].collection_id, "c1");
}

#[test]
fn observers_follow_load_edit_and_unload() {
    let (_dir, mut store) = store_with(&[("d1", "Bob met Alice"), ("d2", "Paris")]);
    let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
    let mut session = Session::new();
    let sink = Rc::clone(&seen);
    session.subscribe(move |annotations| sink.borrow_mut().push(annotations.len()));

    session.load_with(&mut store, "d1").unwrap();
    session.click(0);
    session.confirm_label(0, "PERSON").unwrap();
    session.save_with(&mut store, false).unwrap();
    session.load_with(&mut store, "d2").unwrap();

    // load, commit, load of the next document; the save itself is silent
    assert_eq!(*seen.borrow(), [0, 1, 0]);
}

#[test]
fn failed_load_leaves_session_empty() {
    let (_dir, mut store) = store_with(&[("d1", "Bob")]);
    let mut session = Session::new();
    session.load_with(&mut store, "d1").unwrap();

    assert!(session.load_with(&mut store, "missing").is_err());
    assert!(!session.is_loaded());
    assert!(!session.is_busy());
    assert_eq!(session.click(0), GestureOutcome::Suppressed);
}
