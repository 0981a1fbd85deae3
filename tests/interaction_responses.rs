//! The interaction response state machine, against a recording client.

mod common;

use discord_structures::builders::ModalBuilder;
use discord_structures::interactions::{
    AnyInteraction, AutocompleteInteraction, ButtonInteraction, ChatInputCommandInteraction,
    CommandOptionChoice, ComponentResponses, InteractionResponses, ModalResponses,
    ModalSubmitInteraction,
};
use discord_structures::model::Context;
use discord_structures::ErrorKind;
use serde_json::{json, Value};

fn payload(kind: u8, data: Value) -> Value {
    json!({
        "id": "1197361004581261344",
        "application_id": "1097541239145476096",
        "type": kind,
        "data": data,
        "channel_id": "613425648685547543",
        "user": { "id": "53908232506183680", "username": "mason" },
        "token": "aW50ZXJhY3Rpb246",
        "message": {
            "id": "1197361004581261000",
            "channel_id": "613425648685547543",
            "content": "Pick one",
            "components": [{
                "type": 1,
                "components": [{ "type": 2, "style": 1, "custom_id": "ok", "label": "OK" }],
            }],
        },
    })
}

fn command(ctx: &Context) -> ChatInputCommandInteraction {
    match AnyInteraction::from_value(ctx, payload(2, json!({ "id": "7", "name": "ping", "type": 1 }))) {
        Ok(AnyInteraction::ChatInput(command)) => command,
        other => panic!("expected a slash command, got {:?}", other),
    }
}

fn button(ctx: &Context) -> ButtonInteraction {
    match AnyInteraction::from_value(ctx, payload(3, json!({ "custom_id": "ok", "component_type": 2 }))) {
        Ok(AnyInteraction::Button(button)) => button,
        other => panic!("expected a button, got {:?}", other),
    }
}

fn message(content: &str) -> Option<Value> {
    Some(json!({
        "id": "1197361004581261999",
        "channel_id": "613425648685547543",
        "content": content,
        "flags": 0,
    }))
}

#[tokio::test]
async fn reply_once() {
    let (ctx, rest) = common::context();
    let mut command = command(&ctx);

    command.reply(|r| r.content("Pong!").ephemeral(true)).await.unwrap();
    let request = rest.last();
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(
        request.route,
        "/interactions/1197361004581261344/aW50ZXJhY3Rpb246/callback"
    );
    assert!(!request.auth);
    assert_eq!(
        request.body,
        Some(json!({ "type": 4, "data": { "content": "Pong!", "flags": 64 } }))
    );
    assert!(command.interaction.replied);
    assert_eq!(command.interaction.ephemeral, Some(true));

    let err = command.reply(|r| r.content("again")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);
    let err = command.defer_reply(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);
    let err = command
        .show_modal(&ModalBuilder::default().custom_id("form").title("Form"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);
    assert_eq!(rest.requests().len(), 1);
}

#[tokio::test]
async fn edits_need_a_response() {
    let (ctx, rest) = common::context();
    let mut command = command(&ctx);

    let err = command.edit_reply(|r| r.content("late")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotResponded);
    let err = command.delete_reply(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotResponded);
    let err = command.follow_up(|r| r.content("more")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotResponded);
    assert!(rest.requests().is_empty());
}

#[tokio::test]
async fn deferred_reply_then_edit_and_follow_up() {
    let (ctx, rest) = common::context();
    let mut command = command(&ctx);

    command.defer_reply(true).await.unwrap();
    assert!(command.interaction.deferred);
    assert!(!command.interaction.replied);
    assert_eq!(command.interaction.ephemeral, Some(true));
    assert_eq!(rest.last().body, Some(json!({ "type": 5, "data": { "flags": 64 } })));

    rest.respond(message("Done"));
    let reply = command.edit_reply(|r| r.content("Done")).await.unwrap();
    assert_eq!(reply.content, "Done");
    assert!(command.interaction.replied);
    let request = rest.last();
    assert_eq!(request.method.as_str(), "PATCH");
    assert_eq!(
        request.route,
        "/webhooks/1097541239145476096/aW50ZXJhY3Rpb246/messages/@original"
    );
    assert!(!request.auth);

    rest.respond(message("One more thing"));
    let follow_up = command.follow_up(|r| r.content("One more thing")).await.unwrap();
    assert_eq!(follow_up.content, "One more thing");
    let request = rest.last();
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.route, "/webhooks/1097541239145476096/aW50ZXJhY3Rpb246");
    assert_eq!(request.query, vec![("wait".to_owned(), "true".to_owned())]);

    rest.respond(message("Done"));
    assert_eq!(command.fetch_reply(None).await.unwrap().content, "Done");
    assert_eq!(rest.last().method.as_str(), "GET");

    command.delete_reply(Some(follow_up.id)).await.unwrap();
    let request = rest.last();
    assert_eq!(request.method.as_str(), "DELETE");
    assert_eq!(
        request.route,
        "/webhooks/1097541239145476096/aW50ZXJhY3Rpb246/messages/1197361004581261999"
    );

    command.delete_reply(None).await.unwrap();
    assert!(rest.last().route.ends_with("/messages/@original"));
    assert_eq!(rest.requests().len(), 6);
}

#[tokio::test]
async fn fetching_an_empty_reply_is_a_decode_error() {
    let (ctx, _rest) = common::context();
    let command = command(&ctx);

    let err = command.fetch_reply(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn component_updates() {
    let (ctx, rest) = common::context();
    let mut button = button(&ctx);
    assert_eq!(button.component().and_then(|c| c.custom_id()), Some("ok"));

    button.defer_update().await.unwrap();
    assert!(button.interaction.deferred);
    assert_eq!(rest.last().body, Some(json!({ "type": 6 })));
    let err = button.update(|r| r.content("Picked")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);

    let mut button = self::button(&ctx);
    button.update(|r| r.content("Picked").clear_components()).await.unwrap();
    assert_eq!(
        rest.last().body,
        Some(json!({ "type": 7, "data": { "content": "Picked", "components": [] } }))
    );
    assert!(button.interaction.replied);
}

fn modal_submit(ctx: &Context, from_message: bool) -> ModalSubmitInteraction {
    let mut payload = payload(5, json!({ "custom_id": "feedback", "components": [] }));
    if !from_message {
        payload.as_object_mut().unwrap().remove("message");
    }
    match AnyInteraction::from_value(ctx, payload) {
        Ok(AnyInteraction::ModalSubmit(modal)) => modal,
        other => panic!("expected a modal submission, got {:?}", other),
    }
}

#[tokio::test]
async fn modal_submissions_update_only_their_message() {
    let (ctx, rest) = common::context();

    let mut detached = modal_submit(&ctx, false);
    let err = detached.defer_update().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    let err = detached.update(|r| r.content("Thanks")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    assert!(rest.requests().is_empty());
    detached.reply(|r| r.content("Thanks")).await.unwrap();

    let mut attached = modal_submit(&ctx, true);
    attached.update(|r| r.content("Thanks")).await.unwrap();
    assert_eq!(
        rest.last().body,
        Some(json!({ "type": 7, "data": { "content": "Thanks" } }))
    );
    assert_eq!(rest.requests().len(), 2);
}

#[tokio::test]
async fn modals() {
    let (ctx, rest) = common::context();
    let mut button = button(&ctx);

    let modal = ModalBuilder::default().custom_id("feedback").title("Feedback");
    button.show_modal(&modal).await.unwrap();
    assert!(button.interaction.replied);
    assert_eq!(
        rest.last().body,
        Some(json!({ "type": 9, "data": { "custom_id": "feedback", "title": "Feedback" } }))
    );
}

#[tokio::test]
async fn autocomplete_responds_once() {
    let (ctx, rest) = common::context();
    let data = json!({
        "id": "7",
        "name": "tag",
        "type": 1,
        "options": [{ "name": "name", "type": 3, "value": "ru", "focused": true }],
    });
    let mut autocomplete: AutocompleteInteraction =
        match AnyInteraction::from_value(&ctx, payload(4, data)) {
            Ok(AnyInteraction::Autocomplete(autocomplete)) => autocomplete,
            other => panic!("expected autocomplete, got {:?}", other),
        };

    let choices = [
        CommandOptionChoice::new("rust", "rust"),
        CommandOptionChoice::new("ruby", "ruby"),
    ];
    autocomplete.respond(&choices).await.unwrap();
    assert!(autocomplete.responded);
    assert_eq!(
        rest.last().body,
        Some(json!({
            "type": 8,
            "data": { "choices": [
                { "name": "rust", "value": "rust" },
                { "name": "ruby", "value": "ruby" },
            ] },
        }))
    );

    let err = autocomplete.respond(&choices).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);
    assert_eq!(rest.requests().len(), 1);
}
