//! Commands valid while a mailbox is selected.

use tokio::io::{AsyncRead, AsyncWrite};

use super::authenticated::run_append;
use super::states::{Authenticated, Selected};
use super::{
    Client, CommandOutcome, copy_uid, expunged_seqs, fetch_records, modified_set, search_results,
    thread_forest,
};
use crate::command::{Command, FetchAttribute, replace_header};
use crate::parser::FetchItem;
use crate::request::{AppendRequest, ReplaceRequest, StoreFlagsRequest, StoreLabelsRequest};
use crate::search::{OrderBy, SearchOptions, SearchQuery, SearchResults};
use crate::types::{
    Capability, MailboxName, MailboxStatus, MessageThread, ModSeq, SeqNum, SequenceSet,
    ThreadingAlgorithm, Uid, UidSet, UidValidity,
};
use crate::{Error, Result};

/// Outcome of a STORE: the echoed records plus the set the server
/// skipped because their mod-sequence exceeded the guard.
#[derive(Debug, Clone, Default)]
pub struct StoreResult {
    /// Untagged FETCH echoes (absent for `.SILENT`).
    pub records: Vec<(SeqNum, Vec<FetchItem>)>,
    /// Messages skipped by UNCHANGEDSINCE; empty when all applied.
    pub unmodified: Option<UidSet>,
}

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the selected mailbox name.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxName {
        &self.state.mailbox
    }

    /// Returns true if the mailbox was opened read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.state.read_only
    }

    /// Returns the status snapshot from selection time.
    #[must_use]
    pub fn selection_status(&self) -> &MailboxStatus {
        &self.state.status
    }

    /// Fetches message data by sequence-number set.
    pub async fn fetch(
        &mut self,
        set: &SequenceSet,
        items: Vec<FetchAttribute>,
        changed_since: Option<ModSeq>,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        let outcome = self
            .execute(&Command::Fetch {
                set: set.clone(),
                items,
                changed_since,
                uid: false,
            })
            .await?
            .check()?;
        Ok(fetch_records(&outcome))
    }

    /// Fetches message data by UID set.
    pub async fn uid_fetch(
        &mut self,
        uids: &UidSet,
        items: Vec<FetchAttribute>,
        changed_since: Option<ModSeq>,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        let outcome = self
            .execute(&Command::Fetch {
                set: uids.as_sequence_set(),
                items,
                changed_since,
                uid: true,
            })
            .await?
            .check()?;
        Ok(fetch_records(&outcome))
    }

    /// Stores flags on a UID set.
    pub async fn uid_store_flags(
        &mut self,
        uids: &UidSet,
        request: &StoreFlagsRequest,
    ) -> Result<StoreResult> {
        if request.unchanged_since.is_some() {
            self.require_capability(&Capability::CondStore)?;
        }
        let outcome = self
            .execute(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(store_result(&outcome))
    }

    /// Stores flags on a sequence-number set.
    pub async fn store_flags(
        &mut self,
        set: &SequenceSet,
        request: &StoreFlagsRequest,
    ) -> Result<StoreResult> {
        if request.unchanged_since.is_some() {
            self.require_capability(&Capability::CondStore)?;
        }
        let outcome = self
            .execute(&Command::Store {
                set: set.clone(),
                action: request.to_wire(),
                uid: false,
            })
            .await?
            .check()?;
        Ok(store_result(&outcome))
    }

    /// Stores GMail labels on a UID set (requires X-GM-EXT-1).
    pub async fn uid_store_labels(
        &mut self,
        uids: &UidSet,
        request: &StoreLabelsRequest,
    ) -> Result<StoreResult> {
        self.require_capability(&Capability::GmailExt1)?;
        let outcome = self
            .execute(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(store_result(&outcome))
    }

    /// Stores annotations on a UID set (requires ANNOTATE).
    pub async fn uid_store_annotations(
        &mut self,
        uids: &UidSet,
        request: &crate::request::StoreAnnotationsRequest,
    ) -> Result<StoreResult> {
        self.require_capability(&Capability::Annotate)?;
        let outcome = self
            .execute(&Command::Store {
                set: uids.as_sequence_set(),
                action: request.to_wire(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(store_result(&outcome))
    }

    /// Copies messages by UID, returning COPYUID data when available.
    pub async fn uid_copy(
        &mut self,
        uids: &UidSet,
        destination: &MailboxName,
    ) -> Result<Option<(UidValidity, UidSet, UidSet)>> {
        let outcome = self
            .execute(&Command::Copy {
                set: uids.as_sequence_set(),
                mailbox: destination.clone(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(copy_uid(&outcome))
    }

    /// Moves messages by UID (requires MOVE), returning COPYUID data
    /// when available.
    pub async fn uid_move(
        &mut self,
        uids: &UidSet,
        destination: &MailboxName,
    ) -> Result<Option<(UidValidity, UidSet, UidSet)>> {
        self.require_capability(&Capability::Move)?;
        let outcome = self
            .execute(&Command::Move {
                set: uids.as_sequence_set(),
                mailbox: destination.clone(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(copy_uid(&outcome))
    }

    /// Expunges all messages flagged \Deleted.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        let outcome = self.execute(&Command::Expunge).await?.check()?;
        Ok(expunged_seqs(&outcome))
    }

    /// Expunges only the given UIDs (requires UIDPLUS).
    pub async fn uid_expunge(&mut self, uids: &UidSet) -> Result<Vec<SeqNum>> {
        self.require_capability(&Capability::UidPlus)?;
        let outcome = self
            .execute(&Command::UidExpunge { uids: uids.clone() })
            .await?
            .check()?;
        Ok(expunged_seqs(&outcome))
    }

    /// Requests a checkpoint.
    pub async fn checkpoint(&mut self) -> Result<()> {
        self.execute(&Command::Check).await?.check()?;
        Ok(())
    }

    /// Searches by UID.
    ///
    /// The charset is declared only when the query carries non-ASCII
    /// text; ESEARCH return options are used when requested.
    pub async fn uid_search(
        &mut self,
        query: &SearchQuery,
        options: SearchOptions,
    ) -> Result<SearchResults> {
        let charset = query.needs_charset().then(|| "UTF-8".to_string());
        let outcome = self
            .execute(&Command::Search {
                query: query.clone(),
                options,
                charset,
                uid: true,
            })
            .await?
            .check()?;
        Ok(search_results(&outcome))
    }

    /// Searches by sequence number.
    pub async fn search(
        &mut self,
        query: &SearchQuery,
        options: SearchOptions,
    ) -> Result<SearchResults> {
        let charset = query.needs_charset().then(|| "UTF-8".to_string());
        let outcome = self
            .execute(&Command::Search {
                query: query.clone(),
                options,
                charset,
                uid: false,
            })
            .await?
            .check()?;
        Ok(search_results(&outcome))
    }

    /// Sorts matching messages by UID (requires SORT).
    pub async fn uid_sort(
        &mut self,
        order: &[OrderBy],
        query: &SearchQuery,
    ) -> Result<Vec<Uid>> {
        self.require_capability(&Capability::Sort)?;
        let outcome = self
            .execute(&Command::Sort {
                order: order.to_vec(),
                query: query.clone(),
                charset: "UTF-8".to_string(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(search_results(&outcome)
            .all
            .iter()
            .copied()
            .filter_map(Uid::new)
            .collect())
    }

    /// Threads matching messages by UID.
    ///
    /// The algorithm must be among those the server advertises via
    /// `THREAD=<algo>`; otherwise this fails before touching the wire.
    pub async fn uid_thread(
        &mut self,
        algorithm: ThreadingAlgorithm,
        query: &SearchQuery,
    ) -> Result<Vec<MessageThread>> {
        self.require_capability(&Capability::Thread(algorithm.as_str().to_string()))?;
        let outcome = self
            .execute(&Command::Thread {
                algorithm,
                query: query.clone(),
                charset: "UTF-8".to_string(),
                uid: true,
            })
            .await?
            .check()?;
        Ok(thread_forest(&outcome))
    }

    /// Appends a message to another mailbox while this one stays open.
    pub async fn append(
        &mut self,
        mailbox: &MailboxName,
        request: &AppendRequest,
    ) -> Result<CommandOutcome> {
        run_append(self, mailbox, std::slice::from_ref(request)).await
    }

    /// Replaces a message by UID (requires REPLACE, RFC 8508).
    ///
    /// The replacement's UID travels in the outcome's APPENDUID code
    /// when the server grants UIDPLUS visibility; extract it with the
    /// `append_uids` helper.
    pub async fn uid_replace(
        &mut self,
        uid: Uid,
        request: &ReplaceRequest,
    ) -> Result<CommandOutcome> {
        self.require_capability(&Capability::Replace)?;

        let non_sync = self.non_sync_literals(request.message.len());
        let tag = self.tag_gen.next();
        let mailbox = self.state.mailbox.clone();
        let header = replace_header(
            &tag,
            uid.get(),
            &mailbox,
            &request.flags,
            request.internal_date.as_deref(),
            request.message.len(),
            non_sync,
        );
        self.stream.write_command(&header).await?;

        if !non_sync {
            super::authenticated::wait_for_continuation(self, &tag).await?;
        }

        self.stream.write_raw(&request.message).await?;
        self.stream.write_raw(b"\r\n").await?;

        self.collect(&tag).await?.check()
    }

    /// Switches to another mailbox; the current one closes implicitly.
    pub async fn select(self, mailbox: &str) -> Result<(Self, MailboxStatus)> {
        let authenticated: Client<S, Authenticated> = self.transition(Authenticated);
        authenticated.select(mailbox).await
    }

    /// Closes the mailbox with implicit expunge.
    pub async fn close(mut self) -> Result<Client<S, Authenticated>> {
        self.execute(&Command::Close).await?.check()?;
        Ok(self.transition(Authenticated))
    }

    /// Closes the mailbox without expunging (requires UNSELECT).
    pub async fn unselect(mut self) -> Result<Client<S, Authenticated>> {
        if !self.has_capability(&Capability::Unselect) {
            return Err(Error::Unsupported(Capability::Unselect.to_string()));
        }
        self.execute(&Command::Unselect).await?.check()?;
        Ok(self.transition(Authenticated))
    }
}

fn store_result(outcome: &CommandOutcome) -> StoreResult {
    StoreResult {
        records: fetch_records(outcome),
        unmodified: modified_set(outcome),
    }
}
