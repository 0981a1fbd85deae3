//! Responding to interactions.
//!
//! An interaction gets exactly one initial response: a reply, a deferred
//! reply, a message update, a deferred update or a modal. Afterwards the
//! reply can be fetched, edited or deleted and follow-up messages can be
//! sent, which all fail before the initial response was sent.

use std::future::Future;

use serde_json::{json, Value};
use tracing::debug;

use super::{
    ButtonInteraction, ChatInputCommandInteraction, ContextMenuCommandInteraction, Interaction,
    ModalSubmitInteraction, SelectMenuInteraction,
};
use crate::builders::InteractionReply;
use crate::model::{Entity, Message, MessageData, MessageFlags, MessageId, ToJson};
use crate::rest::{self, routes, RestRequest};
use crate::{Error, Result};

/// Interaction callback types.
pub(crate) mod callback {
    pub const REPLY: u8 = 4;
    pub const DEFERRED_REPLY: u8 = 5;
    pub const DEFERRED_UPDATE: u8 = 6;
    pub const UPDATE: u8 = 7;
    pub const AUTOCOMPLETE_RESULT: u8 = 8;
    pub const MODAL: u8 = 9;
}

impl Interaction {
    /// Fail if an initial response was already sent.
    pub(crate) fn ensure_unanswered(&self) -> Result<()> {
        if self.deferred || self.replied {
            Err(Error::AlreadyReplied)
        } else {
            Ok(())
        }
    }

    /// Fail if no initial response was sent yet.
    pub(crate) fn ensure_answered(&self) -> Result<()> {
        if self.deferred || self.replied {
            Ok(())
        } else {
            Err(Error::NotReplied)
        }
    }

    /// Send an initial response.
    pub(crate) async fn callback(&self, kind: u8, data: Option<Value>) -> Result<()> {
        debug!("Responding to interaction {} with callback type {}", self.id, kind);
        let mut body = json!({ "type": kind });
        if let Some(data) = data {
            body["data"] = data;
        }
        let request = RestRequest::post(routes::interaction_callback(self.id, &self.token))
            .json(body)
            .unauthenticated();
        rest::send(self.ctx.rest(), request).await
    }

    /// The webhook route of a response message, the initial reply for `None`.
    fn webhook_message(&self, message: Option<MessageId>) -> String {
        match message {
            Some(id) => routes::webhook_message(self.application_id, &self.token, &id.to_string()),
            None => routes::webhook_message(self.application_id, &self.token, "@original"),
        }
    }
}

/// The responses every repliable interaction supports.
pub trait InteractionResponses: Send + Sync {
    /// The interaction being responded to.
    fn interaction(&self) -> &Interaction;

    /// The interaction being responded to, for recording the response.
    fn interaction_mut(&mut self) -> &mut Interaction;

    /// Acknowledge the interaction, showing a loading state until the reply
    /// is edited in.
    fn defer_reply(&mut self, ephemeral: bool) -> impl Future<Output = Result<()>> + Send {
        async move {
            let interaction = self.interaction_mut();
            interaction.ensure_unanswered()?;
            let flags = if ephemeral {
                MessageFlags::EPHEMERAL
            } else {
                MessageFlags::empty()
            };
            interaction
                .callback(callback::DEFERRED_REPLY, Some(json!({ "flags": flags.bits() })))
                .await?;
            interaction.deferred = true;
            interaction.ephemeral = Some(ephemeral);
            Ok(())
        }
    }

    /// Reply to the interaction.
    ///
    /// ```ignore
    /// interaction.reply(|r| r.content("Pong!").ephemeral(true)).await?;
    /// ```
    fn reply<F>(&mut self, f: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(InteractionReply) -> InteractionReply,
    {
        let reply = InteractionReply::build(f);
        async move {
            let interaction = self.interaction_mut();
            interaction.ensure_unanswered()?;
            let ephemeral = reply.message_flags().contains(MessageFlags::EPHEMERAL);
            interaction
                .callback(callback::REPLY, Some(reply.to_json()))
                .await?;
            interaction.replied = true;
            interaction.ephemeral = Some(ephemeral);
            Ok(())
        }
    }

    /// Fetch the reply to the interaction, or one of its follow-ups.
    fn fetch_reply(&self, message: Option<MessageId>) -> impl Future<Output = Result<Message>> + Send {
        async move {
            let interaction = self.interaction();
            let request = RestRequest::get(interaction.webhook_message(message)).unauthenticated();
            let data: MessageData = rest::fetch(interaction.ctx.rest(), request).await?;
            Ok(Message::from_data(&interaction.ctx, &data))
        }
    }

    /// Edit the reply, or fill in a deferred one.
    fn edit_reply<F>(&mut self, f: F) -> impl Future<Output = Result<Message>> + Send
    where
        F: FnOnce(InteractionReply) -> InteractionReply,
    {
        let reply = InteractionReply::build(f);
        async move {
            let interaction = self.interaction_mut();
            interaction.ensure_answered()?;
            let request = reply
                .into_request(RestRequest::patch(interaction.webhook_message(None)))
                .unauthenticated();
            let data: MessageData = rest::fetch(interaction.ctx.rest(), request).await?;
            interaction.replied = true;
            Ok(Message::from_data(&interaction.ctx, &data))
        }
    }

    /// Delete the reply, or one of the follow-ups.
    fn delete_reply(&mut self, message: Option<MessageId>) -> impl Future<Output = Result<()>> + Send {
        async move {
            let interaction = self.interaction_mut();
            interaction.ensure_answered()?;
            let request = RestRequest::delete(interaction.webhook_message(message)).unauthenticated();
            rest::send(interaction.ctx.rest(), request).await
        }
    }

    /// Send another message in response to the interaction.
    fn follow_up<F>(&self, f: F) -> impl Future<Output = Result<Message>> + Send
    where
        F: FnOnce(InteractionReply) -> InteractionReply,
    {
        let reply = InteractionReply::build(f);
        async move {
            let interaction = self.interaction();
            interaction.ensure_answered()?;
            let route = routes::webhook(interaction.application_id, &interaction.token);
            let request = reply
                .into_request(RestRequest::post(route))
                .query("wait", true)
                .unauthenticated();
            let data: MessageData = rest::fetch(interaction.ctx.rest(), request).await?;
            Ok(Message::from_data(&interaction.ctx, &data))
        }
    }
}

/// The responses of interactions with a message component.
pub trait ComponentResponses: InteractionResponses {
    /// Fail if there is no message for the interaction to update.
    fn ensure_updatable(&self) -> Result<()> {
        Ok(())
    }

    /// Acknowledge the interaction, editing the message later.
    fn defer_update(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.ensure_updatable()?;
            let interaction = self.interaction_mut();
            interaction.ensure_unanswered()?;
            interaction.callback(callback::DEFERRED_UPDATE, None).await?;
            interaction.deferred = true;
            Ok(())
        }
    }

    /// Edit the message the component is attached to.
    fn update<F>(&mut self, f: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(InteractionReply) -> InteractionReply,
    {
        let reply = InteractionReply::build(f);
        async move {
            self.ensure_updatable()?;
            let interaction = self.interaction_mut();
            interaction.ensure_unanswered()?;
            interaction
                .callback(callback::UPDATE, Some(reply.to_json()))
                .await?;
            interaction.replied = true;
            Ok(())
        }
    }
}

/// Responding with a modal, which modal submissions cannot do.
pub trait ModalResponses: InteractionResponses {
    /// Show a modal to the user.
    ///
    /// ```ignore
    /// let modal = ModalBuilder::default().custom_id("feedback").title("Feedback");
    /// interaction.show_modal(&modal).await?;
    /// ```
    fn show_modal(&mut self, modal: &impl ToJson) -> impl Future<Output = Result<()>> + Send {
        let modal = modal.to_json();
        async move {
            let interaction = self.interaction_mut();
            interaction.ensure_unanswered()?;
            interaction.callback(callback::MODAL, Some(modal)).await?;
            interaction.replied = true;
            Ok(())
        }
    }
}

macro_rules! responses {
    ($($name:ident),* $(,)?) => {
        $(
            impl InteractionResponses for $name {
                fn interaction(&self) -> &Interaction {
                    &self.interaction
                }

                fn interaction_mut(&mut self) -> &mut Interaction {
                    &mut self.interaction
                }
            }
        )*
    };
}

responses!(
    ChatInputCommandInteraction,
    ContextMenuCommandInteraction,
    ButtonInteraction,
    SelectMenuInteraction,
    ModalSubmitInteraction,
);

impl ComponentResponses for ButtonInteraction {}
impl ComponentResponses for SelectMenuInteraction {}
impl ComponentResponses for ModalSubmitInteraction {
    /// Only modals shown from a component can update its message.
    fn ensure_updatable(&self) -> Result<()> {
        if self.is_from_message() {
            Ok(())
        } else {
            Err(Error::Unsupported("updating a message from a modal not shown from one"))
        }
    }
}

impl ModalResponses for ChatInputCommandInteraction {}
impl ModalResponses for ContextMenuCommandInteraction {}
impl ModalResponses for ButtonInteraction {}
impl ModalResponses for SelectMenuInteraction {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Context;
    use crate::{ErrorKind, Rest};
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    fn interaction() -> Interaction {
        let data = serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "token": "t",
        }))
        .unwrap();
        Interaction::new(&Context::new(Offline), &data)
    }

    #[test]
    fn response_state() {
        let mut interaction = interaction();
        assert!(interaction.ensure_unanswered().is_ok());
        assert_eq!(interaction.ensure_answered().unwrap_err().kind(), ErrorKind::NotResponded);

        interaction.deferred = true;
        assert_eq!(
            interaction.ensure_unanswered().unwrap_err().kind(),
            ErrorKind::AlreadyResponded
        );
        assert!(interaction.ensure_answered().is_ok());
    }

    #[test]
    fn webhook_routes_use_the_token() {
        let interaction = interaction();
        assert_eq!(
            interaction.webhook_message(None),
            "/webhooks/2/t/messages/@original"
        );
        assert_eq!(
            interaction.webhook_message(Some(MessageId(9))),
            "/webhooks/2/t/messages/9"
        );
    }
}
