//! Integration tests for commands that prompt for missing arguments

use std::sync::Arc;

use warden_foundation::{EventId, RoomReference, UserId};
use warden_interface::{CANCEL_REACTION, CONFIRM_REACTION, number_to_emoji};
use warden_runtime::{
    CommandDispatcher, Dispatch, FAILURE_REACTION, InterfaceConfig, MemoryTransport, Reaction,
    RoomEvent, RoomMessage, SUCCESS_REACTION, demo_table,
};

// =============================================================================
// Fixtures
// =============================================================================

fn control_room() -> RoomReference {
    RoomReference::parse("!control:localhost").unwrap()
}

fn moderator() -> UserId {
    UserId::parse("@mod:localhost").unwrap()
}

fn dispatcher(transport: &Arc<MemoryTransport>, timeout_ms: u64) -> CommandDispatcher {
    let table = demo_table(vec![
        RoomReference::parse("#community:localhost").unwrap(),
        RoomReference::parse("#offtopic:localhost").unwrap(),
    ])
    .unwrap();
    let config = InterfaceConfig {
        prompt_timeout_ms: timeout_ms,
        ..InterfaceConfig::default()
    };
    CommandDispatcher::new(table, config, transport.clone(), transport.clone()).unwrap()
}

fn message(id: &str, body: &str) -> RoomMessage {
    RoomMessage {
        room: control_room(),
        event_id: EventId::new(id),
        sender: moderator(),
        body: body.to_string(),
    }
}

fn react_with(sender: UserId, target: &EventId, key: &str) -> RoomEvent {
    RoomEvent::Reaction(Reaction {
        room: control_room(),
        sender,
        relates_to: target.clone(),
        key: key.to_string(),
    })
}

fn react(sender: UserId, target: &EventId, choice: usize) -> RoomEvent {
    react_with(sender, target, number_to_emoji(choice).unwrap())
}

/// Waits for a prompt, then reacts to it with `key`.
async fn answer_with(
    dispatcher: &CommandDispatcher,
    transport: &MemoryTransport,
    key: &str,
) -> (EventId, bool) {
    while dispatcher.prompts().pending_prompts() == 0 {
        tokio::task::yield_now().await;
    }
    let prompt = transport.last_message_id().unwrap();
    let handled = dispatcher
        .prompts()
        .handle_event(&react_with(moderator(), &prompt, key));
    (prompt, handled)
}

// =============================================================================
// Prompting
// =============================================================================

#[tokio::test(start_paused = true)]
async fn reactions_supply_the_missing_room() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let answer = async {
        while dispatcher.prompts().pending_prompts() == 0 {
            tokio::task::yield_now().await;
        }
        let prompt = transport.last_message_id().unwrap();
        let from_bot = react(UserId::parse("@warden:localhost").unwrap(), &prompt, 1);
        let ignored = dispatcher.prompts().handle_event(&from_bot);
        let answered = dispatcher.prompts().handle_event(&react(moderator(), &prompt, 2));
        (prompt, ignored, answered)
    };
    let add = message("$add", "!warden rooms add");
    let (outcome, (prompt, ignored, answered)) =
        tokio::join!(dispatcher.handle_message(&add), answer);
    assert_eq!(outcome.unwrap(), Dispatch::Completed);
    assert!(!ignored);
    assert!(answered);
    assert_eq!(dispatcher.prompts().pending_prompts(), 0);

    let (_, prompt_message) = transport
        .messages()
        .into_iter()
        .find(|(id, _)| *id == prompt)
        .unwrap();
    assert!(prompt_message.body.contains("#community:localhost"));
    assert!(prompt_message.body.contains("#offtopic:localhost"));
    assert_eq!(
        transport.reactions_to(&prompt),
        vec![
            number_to_emoji(1).unwrap().to_string(),
            number_to_emoji(2).unwrap().to_string(),
            CANCEL_REACTION.to_string()
        ]
    );
    assert_eq!(
        transport.reactions_to(&EventId::new("$add")),
        vec![SUCCESS_REACTION.to_string()]
    );

    let outcome = dispatcher
        .handle_message(&message("$list", "!warden rooms"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Completed);
    let (_, listing) = transport.messages().pop().unwrap();
    assert!(listing.body.contains("#offtopic:localhost"));
    assert!(!listing.body.contains("#community:localhost"));
}

#[tokio::test(start_paused = true)]
async fn unanswered_prompts_fail_the_command() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 5_000);

    let outcome = dispatcher
        .handle_message(&message("$add", "!warden rooms add"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Failed);
    assert_eq!(dispatcher.prompts().pending_prompts(), 0);
    assert_eq!(
        transport.reactions_to(&EventId::new("$add")),
        vec![FAILURE_REACTION.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn given_arguments_skip_the_prompt() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let outcome = dispatcher
        .handle_message(&message("$add", "!warden rooms add #elsewhere:localhost"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Completed);
    assert!(transport.messages().is_empty());
    assert_eq!(
        transport.reactions_to(&EventId::new("$add")),
        vec![SUCCESS_REACTION.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn the_cancel_reaction_fails_the_command() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let add = message("$add", "!warden rooms add");
    let (outcome, (_, cancelled)) = tokio::join!(
        dispatcher.handle_message(&add),
        answer_with(&dispatcher, &transport, CANCEL_REACTION)
    );
    assert!(cancelled);
    assert_eq!(outcome.unwrap(), Dispatch::Failed);
    assert_eq!(dispatcher.prompts().pending_prompts(), 0);
    assert_eq!(
        transport.reactions_to(&EventId::new("$add")),
        vec![FAILURE_REACTION.to_string()]
    );
    let (_, reply) = transport.messages().pop().unwrap();
    assert!(reply.body.contains("cancelled"), "{}", reply.body);

    let outcome = dispatcher
        .handle_message(&message("$list", "!warden rooms"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Completed);
    let (_, listing) = transport.messages().pop().unwrap();
    assert!(!listing.body.contains("#community:localhost"));
}

// =============================================================================
// Confirmation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn bans_go_ahead_once_confirmed() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let ban = message("$ban", "!warden ban coc @spam:localhost spamming");
    let (outcome, (prompt, confirmed)) = tokio::join!(
        dispatcher.handle_message(&ban),
        answer_with(&dispatcher, &transport, CONFIRM_REACTION)
    );
    assert!(confirmed);
    assert_eq!(outcome.unwrap(), Dispatch::Completed);
    assert_eq!(
        transport.reactions_to(&prompt),
        vec![CONFIRM_REACTION.to_string(), CANCEL_REACTION.to_string()]
    );

    let bodies: Vec<String> = transport
        .messages()
        .into_iter()
        .map(|(_, message)| message.body)
        .collect();
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].starts_with("Would ban [@spam:localhost]"), "{}", bodies[0]);
    assert!(bodies[1].starts_with("Banned [@spam:localhost]"), "{}", bodies[1]);
    assert_eq!(
        transport.reactions_to(&EventId::new("$ban")),
        vec![SUCCESS_REACTION.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_confirmations_do_not_ban() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let ban = message("$ban", "!warden ban coc @spam:localhost");
    let (outcome, (_, cancelled)) = tokio::join!(
        dispatcher.handle_message(&ban),
        answer_with(&dispatcher, &transport, CANCEL_REACTION)
    );
    assert!(cancelled);
    assert_eq!(outcome.unwrap(), Dispatch::Failed);
    assert!(
        !transport
            .messages()
            .iter()
            .any(|(_, message)| message.body.starts_with("Banned"))
    );
    assert_eq!(
        transport.reactions_to(&EventId::new("$ban")),
        vec![FAILURE_REACTION.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn no_confirm_skips_the_confirmation() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let outcome = dispatcher
        .handle_message(&message("$ban", "!warden ban coc @spam:localhost --no-confirm"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Completed);
    assert_eq!(dispatcher.prompts().pending_prompts(), 0);
    let (_, reply) = transport.messages().pop().unwrap();
    assert!(reply.body.starts_with("Banned [@spam:localhost]"));
}

#[tokio::test]
async fn the_bot_can_be_addressed_by_user_id() {
    let transport = Arc::new(MemoryTransport::new());
    let dispatcher = dispatcher(&transport, 600_000);

    let outcome = dispatcher
        .handle_message(&message("$add", "@warden:localhost rooms add #elsewhere:localhost"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Completed);
}
