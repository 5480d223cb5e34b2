//! Rendering documents into paged messages.
//!
//! A document is rendered twice, once per format, by two fringe walkers
//! stepped in lockstep. Both walkers stop at the same committable nodes, so
//! each commit point is shared and the two streams always roll over to a new
//! page together. Every completed pair of pages becomes one message: the
//! first replies to the triggering event and the rest continue its thread.

use std::ptr;

use tracing::debug;
use warden_document::{FringeWalker, InnerNode, RenderContext, standard};
use warden_foundation::{Error, ErrorKind, EventId, Result, RoomReference};

use crate::transport::{MessageSender, OutgoingMessage, Relation};

/// Where the pages of a rendered document go.
#[derive(Clone, Debug)]
pub struct Destination<'a> {
    /// The room to send to.
    pub room: &'a RoomReference,
    /// The event the first page replies to, if any.
    pub reply_to: Option<&'a EventId>,
}

struct PageSender<'a> {
    sender: &'a dyn MessageSender,
    destination: Destination<'a>,
    sent: Vec<EventId>,
}

impl PageSender<'_> {
    async fn send(&mut self, body: String, formatted_body: String) -> Result<()> {
        let relation = match self.sent.first() {
            Some(first) => Some(Relation::Thread(first.clone())),
            None => self.destination.reply_to.cloned().map(Relation::Reply),
        };
        debug!(
            room = %self.destination.room,
            page = self.sent.len() + 1,
            plain_length = body.len(),
            html_length = formatted_body.len(),
            "sending page"
        );
        let id = self
            .sender
            .send_message(OutgoingMessage {
                room: self.destination.room.clone(),
                body,
                formatted_body,
                relation,
            })
            .await?;
        self.sent.push(id);
        Ok(())
    }
}

fn divergence(message: String) -> Error {
    Error::new(ErrorKind::WalkerDivergence(message))
}

fn stop_name(node: Option<&InnerNode>) -> String {
    node.map_or_else(|| "the end".to_string(), |node| node.tag().to_string())
}

/// Commits both buffers, rolling both streams to a new page if either
/// would overflow.
fn commit_in_lockstep(plain: &mut RenderContext, html: &mut RenderContext) -> Result<()> {
    let plain_stream = &mut plain.output;
    let html_stream = &mut html.output;
    let would_overflow =
        plain_stream.is_page_and_buffer_over_size() || html_stream.is_page_and_buffer_over_size();
    let both_empty = plain_stream.is_current_page_empty() && html_stream.is_current_page_empty();
    if would_overflow && !both_empty {
        plain_stream.force_new_page();
        html_stream.force_new_page();
    }
    plain_stream.commit()?;
    html_stream.commit()
}

/// Renders `document` and sends it to `destination`, one message per page.
///
/// Returns the ids of the messages sent, in order.
///
/// # Errors
///
/// Fails if a node has no renderer, if the two walkers stop at different
/// nodes, if a single committable node renders larger than `size_limit`, or
/// if a message cannot be sent. Pages already sent stay sent.
pub async fn render_and_send(
    document: &InnerNode,
    destination: Destination<'_>,
    sender: &dyn MessageSender,
    size_limit: usize,
) -> Result<Vec<EventId>> {
    let renderers = standard()?;
    let mut plain = FringeWalker::new(document, renderers.plain(), RenderContext::new(size_limit));
    let mut html = FringeWalker::new(document, renderers.html(), RenderContext::new(size_limit));
    let mut pages = PageSender {
        sender,
        destination,
        sent: Vec::new(),
    };

    loop {
        match (plain.increment()?, html.increment()?) {
            (None, None) => break,
            (Some(left), Some(right)) if ptr::eq(left, right) => {
                commit_in_lockstep(plain.context_mut(), html.context_mut())?;
            }
            (left, right) => {
                return Err(divergence(format!(
                    "plain stopped at {}, html stopped at {}",
                    stop_name(left),
                    stop_name(right)
                )));
            }
        }
        loop {
            let plain_output = &mut plain.context_mut().output;
            let html_output = &mut html.context_mut().output;
            if plain_output.peek_page().is_none() || html_output.peek_page().is_none() {
                break;
            }
            let (Some(body), Some(formatted_body)) =
                (plain_output.read_page(), html_output.read_page())
            else {
                break;
            };
            pages.send(body, formatted_body).await?;
        }
    }

    // Text outside any committable node is still buffered.
    commit_in_lockstep(plain.context_mut(), html.context_mut())?;
    let plain_pages = plain.context_mut().output.finish()?;
    let html_pages = html.context_mut().output.finish()?;
    if plain_pages.len() != html_pages.len() {
        return Err(divergence(format!(
            "plain has {} pages left, html has {}",
            plain_pages.len(),
            html_pages.len()
        )));
    }
    for (body, formatted_body) in plain_pages.into_iter().zip(html_pages) {
        if body.is_empty() && formatted_body.is_empty() {
            continue;
        }
        pages.send(body, formatted_body).await?;
    }
    Ok(pages.sent)
}
