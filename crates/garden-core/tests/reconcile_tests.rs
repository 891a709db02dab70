// Host-side tests for optimistic/realtime reconciliation and text sanitising.

use garden_core::text::{collapse_whitespace, sanitize_optional, sanitize_required};
use garden_core::*;

fn msg(id: &str, text: &str, user: Option<&str>, at: &str) -> MessageRecord {
    MessageRecord {
        id: id.to_string(),
        text: text.to_string(),
        user_id: user.map(str::to_string),
        user_name: None,
        created_at: at.to_string(),
    }
}

#[test]
fn optimistic_then_confirmed_yields_one_server_record() {
    let local = vec![msg("local-1", "te recuerdo", Some("u1"), "2026-01-01T10:00:00.000Z")];
    let server = vec![msg("srv-9", "te recuerdo", Some("u1"), "2026-01-01T10:00:00.250Z")];
    let merged = merge(&local, &[], &server);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, "srv-9");
}

#[test]
fn realtime_duplicates_of_confirmed_rows_collapse_by_id() {
    let confirmed = vec![
        msg("a", "uno", None, "2026-01-01T10:00:01.000Z"),
        msg("b", "dos", None, "2026-01-01T10:00:02.000Z"),
    ];
    let incoming = vec![msg("b", "dos (edit)", None, "2026-01-01T10:00:02.000Z")];
    let merged = merge::<MessageRecord>(&[], &confirmed, &incoming);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "b");
    assert_eq!(merged[0].text, "dos (edit)", "incoming wins on id collision");
    assert_eq!(merged[1].id, "a");
}

#[test]
fn one_confirmed_row_absorbs_only_one_placeholder() {
    let local = vec![
        msg("local-1", "hola", Some("u"), "2026-01-01T10:00:00.000Z"),
        msg("local-2", "hola", Some("u"), "2026-01-01T10:00:05.000Z"),
    ];
    let server = vec![msg("s1", "hola", Some("u"), "2026-01-01T10:00:00.100Z")];
    let merged = merge(&local, &server, &[]);
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().any(|m| m.id == "s1"));
    assert!(merged.iter().any(|m| m.id == "local-2"));
}

#[test]
fn placeholders_from_other_users_are_kept() {
    let local = vec![msg("local-1", "hola", Some("me"), "2026-01-01T10:00:00.000Z")];
    let server = vec![msg("s1", "hola", Some("someone"), "2026-01-01T09:59:00.000Z")];
    let merged = merge(&local, &server, &[]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "local-1", "newest first");
}

#[test]
fn feed_drops_placeholder_when_realtime_insert_arrives() {
    let mut feed = MessageFeed::new(10);
    let local_id =
        feed.push_optimistic("  en   silencio ", Some("u1"), None, "2026-01-01T10:00:00.000Z");
    assert!(is_local_id(&local_id));
    assert_eq!(feed.records()[0].text, "en silencio");

    feed.apply_realtime(msg("srv-1", "en silencio", Some("u1"), "2026-01-01T10:00:00.300Z"));
    let records = feed.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "srv-1");
    assert_eq!(feed.pending_len(), 0);

    // a later snapshot that still contains the row changes nothing
    feed.apply_snapshot(vec![msg("srv-1", "en silencio", Some("u1"), "2026-01-01T10:00:00.300Z")]);
    assert_eq!(feed.records().len(), 1);
}

#[test]
fn feed_discards_failed_sends_and_truncates() {
    let mut feed = MessageFeed::new(2);
    let id = feed.push_optimistic("fallido", None, None, "2026-01-01T10:00:00.000Z");
    assert!(feed.discard_optimistic(&id));
    assert!(!feed.discard_optimistic(&id));
    feed.apply_snapshot(vec![
        msg("1", "a", None, "2026-01-01T10:00:01.000Z"),
        msg("2", "b", None, "2026-01-01T10:00:02.000Z"),
        msg("3", "c", None, "2026-01-01T10:00:03.000Z"),
    ]);
    let ids: Vec<String> = feed.records().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["3", "2"]);
}

#[test]
fn flowers_reconcile_by_owner_and_message() {
    let local = vec![FlowerRecord {
        message: Some("para ti".into()),
        user_id: Some("u".into()),
        created_at: "2026-01-01T10:00:00.000Z".into(),
        ..FlowerRecord::new("local-7")
    }];
    let server = vec![FlowerRecord {
        message: Some("para ti".into()),
        user_id: Some("u".into()),
        created_at: "2026-01-01T10:00:00.400Z".into(),
        ..FlowerRecord::new("9f0c1d2e-0000-4000-8000-000000000001")
    }];
    let merged = merge(&local, &server, &[]);
    assert_eq!(merged.len(), 1);
    assert!(!is_local_id(&merged[0].id));
}

#[test]
fn sanitising_collapses_and_bounds_text() {
    assert_eq!(collapse_whitespace("  hello \t\n  world  "), "hello world");
    assert_eq!(sanitize_required("text", "  hola  ", 80).as_deref(), Ok("hola"));
    assert_eq!(
        sanitize_required("text", " \n ", 80),
        Err(ValidationError::Empty { field: "text" })
    );
    assert_eq!(sanitize_optional("message", Some("   "), 140), Ok(None));
    assert_eq!(sanitize_optional("message", None, 140), Ok(None));
}

#[test]
fn length_limit_counts_characters_not_bytes() {
    let flores = "ñ".repeat(10);
    assert_eq!(sanitize_required("text", &flores, 10), Ok(flores.clone()));
    assert!(matches!(
        sanitize_required("text", &flores, 9),
        Err(ValidationError::TooLong { max: 9, actual: 10, .. })
    ));
}

#[test]
fn flower_rows_deserialize_with_missing_fields() {
    let row: FlowerRecord =
        serde_json::from_str(r#"{"id":"abc","x":1.0,"y":null,"z":2.0,"wilted":true}"#).unwrap();
    assert_eq!(row.stored_position(), None);
    assert!(!row.is_alive());
    assert_eq!(row.created_at, "");
}

#[test]
fn repeating_an_earlier_message_still_shows_the_new_send() {
    let mut feed = MessageFeed::new(10);
    feed.apply_snapshot(vec![msg(
        "srv-old",
        "te extraño",
        Some("u1"),
        "2026-01-01T10:00:00.000Z",
    )]);
    let local_id =
        feed.push_optimistic("te extraño", Some("u1"), None, "2026-03-01T10:00:00.000Z");

    let ids: Vec<String> = feed.records().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![local_id.clone(), "srv-old".to_string()]);

    // an unrelated insert must not compact the placeholder away
    feed.apply_realtime(msg("srv-x", "otro", Some("u2"), "2026-03-01T10:00:01.000Z"));
    assert_eq!(feed.pending_len(), 1);
    assert_eq!(feed.records().len(), 3);

    feed.apply_realtime(msg("srv-new", "te extraño", Some("u1"), "2026-03-01T10:00:00.200Z"));
    let ids: Vec<String> = feed.records().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["srv-x", "srv-new", "srv-old"]);
    assert_eq!(feed.pending_len(), 0);
}

#[test]
fn confirmed_send_replaces_its_placeholder_despite_clock_skew() {
    let mut feed = MessageFeed::new(10);
    let local_id = feed.push_optimistic("hola", Some("u1"), None, "2026-01-01T10:00:05.000Z");
    // server clock runs behind the visitor's
    feed.confirm(&local_id, msg("srv-1", "hola", Some("u1"), "2026-01-01T10:00:01.000Z"));
    let records = feed.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "srv-1");
    assert_eq!(feed.pending_len(), 0);
}
