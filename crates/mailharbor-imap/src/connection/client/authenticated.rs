//! Commands valid in the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, Selected};
use super::{Client, CommandOutcome, list_entries, mailbox_status, status_items};
use crate::command::{Command, StatusAttribute, append_header};
use crate::parser::{NamespaceEntry, StatusItem, UntaggedResponse};
use crate::request::AppendRequest;
use crate::types::{
    Capability, ListEntry, MailboxAttribute, MailboxName, MailboxStatus,
};
use crate::{Error, Result};

/// Options for SELECT/EXAMINE.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Request CONDSTORE tracking.
    pub condstore: bool,
    /// Pre-serialized QRESYNC parameter (requires QRESYNC enabled).
    pub qresync: Option<String>,
}

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Selects a mailbox read-write, returning the selected client and
    /// the full command outcome (QRESYNC deltas ride in the untagged
    /// responses).
    pub async fn select_with(
        mut self,
        mailbox: &MailboxName,
        options: SelectOptions,
    ) -> Result<(Client<S, Selected>, CommandOutcome)> {
        let outcome = self
            .execute(&Command::Select {
                mailbox: mailbox.clone(),
                condstore: options.condstore,
                qresync: options.qresync,
            })
            .await?
            .check()?;

        let status = mailbox_status(&outcome);
        let read_only = status.read_only;
        let state = Selected::new(mailbox.clone(), read_only, status);
        Ok((self.transition(state), outcome))
    }

    /// Selects a mailbox read-write.
    pub async fn select(
        self,
        mailbox: &str,
    ) -> Result<(Client<S, Selected>, MailboxStatus)> {
        let (client, _) = self
            .select_with(&MailboxName::new(mailbox), SelectOptions::default())
            .await?;
        let status = client.state.status.clone();
        Ok((client, status))
    }

    /// Opens a mailbox read-only.
    pub async fn examine_with(
        mut self,
        mailbox: &MailboxName,
        options: SelectOptions,
    ) -> Result<(Client<S, Selected>, CommandOutcome)> {
        let outcome = self
            .execute(&Command::Examine {
                mailbox: mailbox.clone(),
                condstore: options.condstore,
                qresync: options.qresync,
            })
            .await?
            .check()?;

        let mut status = mailbox_status(&outcome);
        status.read_only = true;
        let state = Selected::new(mailbox.clone(), true, status);
        Ok((self.transition(state), outcome))
    }

    /// Opens a mailbox read-only.
    pub async fn examine(
        self,
        mailbox: &str,
    ) -> Result<(Client<S, Selected>, MailboxStatus)> {
        let (client, _) = self
            .examine_with(&MailboxName::new(mailbox), SelectOptions::default())
            .await?;
        let status = client.state.status.clone();
        Ok((client, status))
    }

    /// Lists mailboxes matching a pattern.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListEntry>> {
        let outcome = self
            .execute(&Command::List {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?
            .check()?;
        Ok(list_entries(&outcome))
    }

    /// Lists subscribed mailboxes matching a pattern.
    pub async fn lsub(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListEntry>> {
        let outcome = self
            .execute(&Command::Lsub {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?
            .check()?;
        Ok(list_entries(&outcome))
    }

    /// Creates a mailbox, optionally with SPECIAL-USE attributes.
    pub async fn create(
        &mut self,
        mailbox: &MailboxName,
        special_use: Vec<MailboxAttribute>,
    ) -> Result<()> {
        if !special_use.is_empty() {
            self.require_capability(&Capability::CreateSpecialUse)?;
        }
        self.execute(&Command::Create {
            mailbox: mailbox.clone(),
            special_use,
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Deletes a mailbox.
    pub async fn delete(&mut self, mailbox: &MailboxName) -> Result<()> {
        self.execute(&Command::Delete {
            mailbox: mailbox.clone(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Renames a mailbox.
    pub async fn rename(&mut self, from: &MailboxName, to: &MailboxName) -> Result<()> {
        self.execute(&Command::Rename {
            from: from.clone(),
            to: to.clone(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Subscribes to a mailbox.
    pub async fn subscribe(&mut self, mailbox: &MailboxName) -> Result<()> {
        self.execute(&Command::Subscribe {
            mailbox: mailbox.clone(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Unsubscribes from a mailbox.
    pub async fn unsubscribe(&mut self, mailbox: &MailboxName) -> Result<()> {
        self.execute(&Command::Unsubscribe {
            mailbox: mailbox.clone(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Queries mailbox status without selecting it.
    pub async fn status(
        &mut self,
        mailbox: &MailboxName,
        items: Vec<StatusAttribute>,
    ) -> Result<Vec<StatusItem>> {
        let outcome = self
            .execute(&Command::Status {
                mailbox: mailbox.clone(),
                items,
            })
            .await?
            .check()?;
        Ok(status_items(&outcome))
    }

    /// Queries the server's namespaces (RFC 2342).
    pub async fn namespace(
        &mut self,
    ) -> Result<(Vec<NamespaceEntry>, Vec<NamespaceEntry>, Vec<NamespaceEntry>)> {
        self.require_capability(&Capability::Namespace)?;
        let outcome = self.execute(&Command::Namespace).await?.check()?;

        for resp in &outcome.untagged {
            if let UntaggedResponse::Namespace {
                personal,
                other_users,
                shared,
            } = resp
            {
                return Ok((personal.clone(), other_users.clone(), shared.clone()));
            }
        }
        Ok((Vec::new(), Vec::new(), Vec::new()))
    }

    /// Appends one message.
    pub async fn append(
        &mut self,
        mailbox: &MailboxName,
        request: &AppendRequest,
    ) -> Result<CommandOutcome> {
        run_append(self, mailbox, std::slice::from_ref(request)).await
    }

    /// Appends several messages in one MULTIAPPEND command.
    pub async fn append_multi(
        &mut self,
        mailbox: &MailboxName,
        requests: &[AppendRequest],
    ) -> Result<CommandOutcome> {
        self.require_capability(&Capability::MultiAppend)?;
        run_append(self, mailbox, requests).await
    }
}

/// Drives an APPEND (or MULTIAPPEND) with literal pacing.
///
/// Each message literal is gated on a `+` continuation unless
/// non-synchronizing literals are available.
pub(crate) async fn run_append<S, St>(
    client: &mut Client<S, St>,
    mailbox: &MailboxName,
    requests: &[AppendRequest],
) -> Result<CommandOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if requests.is_empty() {
        return Err(Error::Argument("append of zero messages".to_string()));
    }

    let tag = client.tag_gen.next();

    for (i, request) in requests.iter().enumerate() {
        let non_sync = client.non_sync_literals(request.message.len());
        let header = append_header(
            if i == 0 { &tag } else { "" },
            (i == 0).then_some(mailbox),
            &request.flags,
            request.internal_date.as_deref(),
            &request.annotations,
            request.message.len(),
            non_sync,
        );
        client.stream.write_command(&header).await?;

        if !non_sync {
            wait_for_continuation(client, &tag).await?;
        }

        client.stream.write_raw(&request.message).await?;
    }

    client.stream.write_raw(b"\r\n").await?;
    client.collect(&tag).await?.check()
}

/// Waits for the `+` continuation that authorizes a literal payload.
pub(crate) async fn wait_for_continuation<S, St>(
    client: &mut Client<S, St>,
    tag: &str,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    use crate::parser::{Response, ResponseParser};

    loop {
        let raw = client.stream.read_response().await?;
        match ResponseParser::parse(&raw)? {
            Response::Continuation { .. } => return Ok(()),
            Response::Untagged(resp) => {
                // Unsolicited updates may arrive between any two tokens.
                tracing::debug!(?resp, "untagged response while awaiting continuation");
            }
            Response::Tagged {
                tag: resp_tag,
                status,
                text,
                ..
            } => {
                if resp_tag.as_str() == tag {
                    return match status {
                        crate::types::Status::No => Err(Error::No(text)),
                        crate::types::Status::Bad => Err(Error::Bad(text)),
                        crate::types::Status::Bye => Err(Error::Bye(text)),
                        _ => Err(Error::Protocol(
                            "completion while awaiting continuation".to_string(),
                        )),
                    };
                }
                return Err(Error::Protocol(format!(
                    "completion for foreign tag {resp_tag}"
                )));
            }
        }
    }
}
