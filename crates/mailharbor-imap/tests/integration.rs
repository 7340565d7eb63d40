//! End-to-end tests against scripted mock streams.
//!
//! Each test drives the engine over a `tokio_test` mock that enforces
//! the exact byte exchange, so command serialization, response routing,
//! and the folder event surface are all exercised together.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio_test::io::{Builder, Mock};

use mailharbor_imap::{
    Client, ClientGreeting, Command, FetchRange, FetchRequest, Flag, Flags, FolderAccess,
    FolderEvent, MailEngine, ModSeq, ProtocolEvent, SearchOptions, SearchQuery, StoreFlagsRequest,
    SyncState, Uid, UidSet, UidValidity, UntaggedResponse,
};

fn greeting_line(caps: &str) -> Vec<u8> {
    format!("* OK [CAPABILITY {caps}] ready\r\n").into_bytes()
}

fn login_ok(caps: &str) -> Vec<u8> {
    format!("A0001 OK [CAPABILITY {caps}] done\r\n").into_bytes()
}

/// Scripts the greeting and LOGIN exchange shared by every session.
fn session_builder(caps: &str) -> Builder {
    let mut builder = Builder::new();
    builder
        .read(&greeting_line(caps))
        .write(b"A0001 LOGIN user pass\r\n")
        .read(&login_ok(caps));
    builder
}

async fn engine_from(mock: Mock) -> MailEngine<Mock> {
    let client = match Client::from_stream(mock).await.unwrap() {
        ClientGreeting::NotAuthenticated(client) => client.login("user", "pass").await.unwrap(),
        ClientGreeting::PreAuthenticated(client) => client,
    };
    MailEngine::new(client)
}

type EventLog = Rc<RefCell<Vec<FolderEvent>>>;

fn observe(engine: &mut MailEngine<Mock>, folder: &str) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    engine.subscribe_events(
        folder,
        Box::new(move |_: &str, event: &FolderEvent| {
            sink.borrow_mut().push(event.clone());
        }),
    );
    log
}

fn uid(n: u32) -> Uid {
    Uid::new(n).unwrap()
}

#[tokio::test]
async fn open_and_fetch_flags() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 3 EXISTS\r\n\
              * 0 RECENT\r\n\
              * FLAGS (\\Seen \\Deleted)\r\n\
              * OK [UIDVALIDITY 1234] UIDs valid\r\n\
              * OK [UIDNEXT 10] predicted\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 FETCH 1:3 (UID FLAGS)\r\n")
        .read(
            b"* 1 FETCH (UID 1 FLAGS (\\Seen))\r\n\
              * 2 FETCH (UID 2 FLAGS ())\r\n\
              * 3 FETCH (UID 3 FLAGS (\\Seen))\r\n\
              A0003 OK done\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    let access = engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();
    assert_eq!(access, FolderAccess::ReadWrite);

    let summaries = engine
        .fetch_range(FetchRange::new(1, 3), &FetchRequest::flags_only())
        .await
        .unwrap();

    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0].uid, Some(uid(1)));
    assert!(summaries[0].flags.as_ref().unwrap().is_seen());
    assert!(!summaries[1].flags.as_ref().unwrap().is_seen());

    let folder = engine.folder("INBOX").unwrap();
    assert_eq!(folder.count(), 3);
    assert_eq!(folder.access(), FolderAccess::ReadWrite);
    assert_eq!(folder.uid_validity().unwrap().get(), 1234);
    assert_eq!(folder.uid_next().unwrap().get(), 10);
}

#[tokio::test]
async fn qresync_resynchronization_event_order() {
    let caps = "IMAP4rev1 CONDSTORE QRESYNC";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX (QRESYNC (1234 500 1:10))\r\n")
        .read(
            b"* 11 EXISTS\r\n\
              * VANISHED (EARLIER) 3,7\r\n\
              * 1 FETCH (UID 1 FLAGS (\\Seen) MODSEQ (600))\r\n\
              * OK [UIDVALIDITY 1234] ok\r\n\
              * OK [HIGHESTMODSEQ 600] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    let log = observe(&mut engine, "INBOX");

    let state = SyncState::new(
        UidValidity::new(1234).unwrap(),
        ModSeq::new(500).unwrap(),
    )
    .with_known_uids(UidSet::parse("1:10").unwrap());

    engine
        .open("INBOX", FolderAccess::ReadWrite, Some(&state))
        .await
        .unwrap();

    let events = log.borrow();
    let vanished_pos = events
        .iter()
        .position(|e| {
            matches!(
                e,
                FolderEvent::MessagesVanished { earlier: true, uids }
                    if uids.to_string() == "3,7"
            )
        })
        .expect("vanished event");
    let flags_pos = events
        .iter()
        .position(|e| {
            matches!(
                e,
                FolderEvent::MessageFlagsChanged {
                    uid: Some(u),
                    flags,
                    mod_seq: Some(m),
                    ..
                } if u.get() == 1 && flags.is_seen() && m.get() == 600
            )
        })
        .expect("flags event");
    let count_pos = events
        .iter()
        .position(|e| matches!(e, FolderEvent::CountChanged(11)))
        .expect("count event");

    assert!(vanished_pos < flags_pos, "vanished precedes flag change");
    assert!(flags_pos < count_pos, "flag change precedes count change");
    assert_eq!(engine.folder("INBOX").unwrap().count(), 11);
}

#[tokio::test]
async fn conditional_store_reports_conflicts_without_flag_events() {
    let caps = "IMAP4rev1 CONDSTORE";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX (CONDSTORE)\r\n")
        .read(
            b"* 6 EXISTS\r\n\
              * OK [UIDVALIDITY 1234] ok\r\n\
              * OK [HIGHESTMODSEQ 700] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 UID STORE 5:6 (UNCHANGEDSINCE 700) +FLAGS (\\Deleted)\r\n")
        .read(
            b"* 5 FETCH (UID 5 MODSEQ (701))\r\n\
              * 6 FETCH (UID 6 FLAGS (\\Deleted) MODSEQ (702))\r\n\
              A0003 OK [MODIFIED 5] conditional store done\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    let log = observe(&mut engine, "INBOX");

    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    let request = StoreFlagsRequest::add(Flags::from_vec(vec![Flag::Deleted]))
        .unchanged_since(ModSeq::new(700).unwrap());
    let unmodified = engine
        .store_flags(&UidSet::parse("5:6").unwrap(), &request)
        .await
        .unwrap();

    // The skipped message comes back as data, not as an error.
    assert_eq!(unmodified, vec![uid(5)]);

    let events = log.borrow();
    assert!(
        !events.iter().any(|e| matches!(
            e,
            FolderEvent::MessageFlagsChanged { uid: Some(u), .. } if u.get() == 5
        )),
        "no flag event for the skipped message"
    );
    assert!(events.iter().any(|e| matches!(
        e,
        FolderEvent::ModSeqChanged { uid: Some(u), .. } if u.get() == 5
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        FolderEvent::MessageFlagsChanged { uid: Some(u), .. } if u.get() == 6
    )));
}

#[tokio::test]
async fn uid_validity_change_across_reopen_discards_cache() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 1 EXISTS\r\n\
              * OK [UIDVALIDITY 1234] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 FETCH 1 (UID FLAGS)\r\n")
        .read(b"* 1 FETCH (UID 9 FLAGS ())\r\nA0003 OK done\r\n")
        .write(b"A0004 CLOSE\r\n")
        .read(b"A0004 OK closed\r\n")
        .write(b"A0005 SELECT INBOX\r\n")
        .read(
            b"* 0 EXISTS\r\n\
              * OK [UIDVALIDITY 9999] rebuilt\r\n\
              A0005 OK [READ-WRITE] Selected\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    let log = observe(&mut engine, "INBOX");

    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();
    engine
        .fetch_range(FetchRange::new(1, 1), &FetchRequest::flags_only())
        .await
        .unwrap();
    assert_eq!(engine.folder("INBOX").unwrap().cached_summaries(), 1);

    engine.close(true).await.unwrap();
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    // All cached UIDs are invalid and the discard signal is observable.
    assert_eq!(engine.folder("INBOX").unwrap().cached_summaries(), 0);
    let events = log.borrow();
    let validity_pos = events
        .iter()
        .position(|e| matches!(e, FolderEvent::UidValidityChanged(v) if v.get() == 9999))
        .expect("validity event");
    assert_eq!(events[validity_pos + 1], FolderEvent::CacheDiscarded);
}

#[tokio::test]
async fn idle_applies_pushed_updates_and_survives_done() {
    let caps = "IMAP4rev1 IDLE";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 3 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 IDLE\r\n")
        .read(b"+ idling\r\n")
        .read(b"* 4 EXISTS\r\n")
        // A keepalive must not be mistaken for the wait deadline.
        .read(b"* OK Still here\r\n")
        .write(b"DONE\r\n")
        .read(b"A0003 OK IDLE terminated\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    let log = observe(&mut engine, "INBOX");

    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    engine.idle_for(Duration::from_millis(200)).await.unwrap();

    // The pushed EXISTS was applied, the keepalive changed nothing,
    // and the session stayed selected through the full deadline.
    assert_eq!(engine.folder("INBOX").unwrap().count(), 4);
    assert_eq!(engine.selected_folder(), Some("INBOX"));
    assert!(log
        .borrow()
        .iter()
        .any(|e| matches!(e, FolderEvent::CountChanged(4))));
}

#[tokio::test]
async fn server_terminated_idle_skips_done() {
    let caps = "IMAP4rev1 IDLE";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 3 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 IDLE\r\n")
        .read(b"+ idling\r\n")
        // The server completes the IDLE on its own; no DONE may follow.
        .read(b"A0003 OK IDLE auto-terminated\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    // Returns as soon as the server ends the IDLE, well before the
    // deadline, and without writing DONE (the mock scripts none).
    engine.idle_for(Duration::from_secs(30)).await.unwrap();
    assert_eq!(engine.selected_folder(), Some("INBOX"));
}

#[tokio::test]
async fn cancelled_fetch_poisons_the_session() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 1 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        // The FETCH goes out but no response ever arrives.
        .write(b"A0003 FETCH 1 (UID FLAGS)\r\n")
        .wait(Duration::from_secs(60))
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    // Cancel the in-flight fetch by dropping its future.
    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        engine.fetch_range(FetchRange::new(1, 1), &FetchRequest::flags_only()),
    )
    .await;
    assert!(cancelled.is_err(), "fetch should still be pending");

    // Bytes were on the wire, so the session must not be reused.
    let err = engine.check().await.unwrap_err();
    assert!(matches!(err, mailharbor_imap::Error::ConnectionLost(_)));
}

#[tokio::test]
async fn copy_of_empty_set_issues_no_command() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 0 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    // No wire traffic is scripted past SELECT; an empty copy and an
    // empty-folder fetch both short-circuit client-side.
    let map = engine.copy_to(&[], "Archive").await.unwrap();
    assert!(map.is_empty());

    let summaries = engine
        .fetch_range(FetchRange::open_ended(1), &FetchRequest::summary())
        .await
        .unwrap();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn copy_returns_unique_id_map_from_copyuid() {
    let caps = "IMAP4rev1 UIDPLUS";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 3 EXISTS\r\n\
              * OK [UIDVALIDITY 1000] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 UID COPY 1:2 Archive\r\n")
        .read(b"A0003 OK [COPYUID 2000 1:2 11:12] done\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    let map = engine.copy_to(&[uid(1), uid(2)], "Archive").await.unwrap();
    assert_eq!(map.len(), 2);

    let source = mailharbor_imap::UniqueId::new(UidValidity::new(1000).unwrap(), uid(2));
    let dest = map.get(&source).unwrap();
    assert_eq!(dest.validity.get(), 2000);
    assert_eq!(dest.uid.get(), 12);
}

#[tokio::test]
async fn append_over_limit_fails_before_the_wire() {
    let mock = session_builder("IMAP4rev1 APPENDLIMIT=16").build();
    let mut engine = engine_from(mock).await;

    let request =
        mailharbor_imap::AppendRequest::new(b"this message is longer than sixteen bytes".to_vec());
    let err = engine.append("INBOX", &[request]).await.unwrap_err();
    assert!(matches!(
        err,
        mailharbor_imap::Error::AppendLimitExceeded { limit: 16, .. }
    ));
}

#[tokio::test]
async fn append_waits_for_continuation_and_reports_appenduid() {
    let caps = "IMAP4rev1 UIDPLUS";
    let mock = session_builder(caps)
        .write(b"A0002 APPEND Drafts {11}\r\n")
        .read(b"+ go ahead\r\n")
        .write(b"hello world")
        .write(b"\r\n")
        .read(b"A0002 OK [APPENDUID 77 104] done\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    let assigned = engine
        .append(
            "Drafts",
            &[mailharbor_imap::AppendRequest::new(b"hello world".to_vec())],
        )
        .await
        .unwrap();

    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].validity.get(), 77);
    assert_eq!(assigned[0].uid.get(), 104);
}

#[tokio::test]
async fn search_lowers_query_and_parses_results() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 9 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 UID SEARCH UNSEEN FROM alice\r\n")
        .read(b"* SEARCH 2 5 8\r\nA0003 OK done\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    let query = SearchQuery::And(vec![
        SearchQuery::Unseen,
        SearchQuery::From("alice".to_string()),
    ]);
    let results = engine
        .search(&query, None, SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(results.all, vec![2, 5, 8]);
}

#[tokio::test]
async fn thread_requires_advertised_algorithm() {
    let caps = "IMAP4rev1 THREAD=REFERENCES";
    let mock = session_builder(caps)
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 9 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .write(b"A0003 UID THREAD REFERENCES UTF-8 ALL\r\n")
        .read(b"* THREAD (2)(3 6 (4 23)(44 7 96))\r\nA0003 OK done\r\n")
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    // REFS was never advertised: refused before any wire traffic.
    let err = engine
        .thread(
            mailharbor_imap::ThreadingAlgorithm::Refs,
            &SearchQuery::All,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, mailharbor_imap::Error::Unsupported(_)));

    let forest = engine
        .thread(
            mailharbor_imap::ThreadingAlgorithm::References,
            &SearchQuery::All,
            None,
        )
        .await
        .unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[1].uids().len(), 7);
}

#[test]
fn pipelined_commands_interleave_untagged_updates() {
    // Scenario: NOOP and FETCH are written back to back; the server
    // interleaves `* 4 EXISTS` between their completions. The update
    // must surface before either completion, whichever tag lands first.
    let mut protocol = mailharbor_imap::Protocol::new();
    let _ = protocol
        .handle_input(b"* OK [CAPABILITY IMAP4rev1] ready\r\n")
        .unwrap();

    let noop = protocol.enqueue(&Command::Noop);
    let fetch = protocol.enqueue(&Command::Fetch {
        set: mailharbor_imap::SequenceSet::single(1).unwrap(),
        items: vec![mailharbor_imap::FetchAttribute::Flags],
        changed_since: None,
        uid: false,
    });

    // Both lines are available to write before any response arrives.
    assert!(protocol.poll_transmit().is_some());
    assert!(protocol.poll_transmit().is_some());

    let input = format!(
        "{} OK noop done\r\n* 4 EXISTS\r\n{} OK fetch done\r\n",
        noop.tag(),
        fetch.tag()
    );
    let events = protocol.handle_input(input.as_bytes()).unwrap();

    let exists_pos = events
        .iter()
        .position(|e| {
            matches!(
                e,
                ProtocolEvent::Unsolicited(UntaggedResponse::Exists(4))
            )
        })
        .expect("exists event");
    let fetch_done_pos = events
        .iter()
        .position(|e| matches!(
            e,
            ProtocolEvent::CommandComplete { handle, .. } if handle.tag() == fetch.tag()
        ))
        .expect("fetch completion");
    let noop_done_pos = events
        .iter()
        .position(|e| matches!(
            e,
            ProtocolEvent::CommandComplete { handle, .. } if handle.tag() == noop.tag()
        ))
        .expect("noop completion");

    assert!(exists_pos < fetch_done_pos);
    assert!(noop_done_pos < fetch_done_pos, "completions in tag order");
}

#[tokio::test]
async fn status_of_open_folder_is_refused() {
    let mock = session_builder("IMAP4rev1")
        .write(b"A0002 SELECT INBOX\r\n")
        .read(
            b"* 1 EXISTS\r\n\
              * OK [UIDVALIDITY 1] ok\r\n\
              A0002 OK [READ-WRITE] Selected\r\n",
        )
        .build();

    let mut engine = engine_from(mock).await;
    engine
        .open("INBOX", FolderAccess::ReadWrite, None)
        .await
        .unwrap();

    let err = engine
        .status(
            "INBOX",
            vec![mailharbor_imap::StatusAttribute::Messages],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, mailharbor_imap::Error::InvalidState(_)));
}
